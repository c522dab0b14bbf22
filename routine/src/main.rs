//! Autonomous routine composer and simulator.
//!
//! Reads mission parameters from `routine.toml` (overridable by flags),
//! composes the routine, and either prints its plan or runs it against the
//! simulated robot.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use routine::actions::Action;
use routine::compose::compose_routine_with;
use routine::exit_codes;
use routine::io::config::{CONFIG_FILE, RoutineConfig, load_config, write_config};
use routine::io::sim::SimRobot;
use routine::logging;
use routine::scheduler::{RunOutcome, Scheduler};

#[derive(Parser)]
#[command(
    name = "routine",
    version,
    about = "Compose and simulate autonomous robot routines"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default `routine.toml`.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
        #[arg(long, default_value = CONFIG_FILE)]
        config: PathBuf,
    },
    /// Print the plan composed for the mission.
    Plan {
        #[command(flatten)]
        mission: MissionArgs,
        /// Print the outline as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Run the routine on the simulated robot and print every actuator command.
    Simulate {
        #[command(flatten)]
        mission: MissionArgs,
        /// Initial vision heading error in degrees (no target when omitted).
        #[arg(long, allow_negative_numbers = true)]
        target_offset: Option<f64>,
        /// Abandon the run after this many ticks.
        #[arg(long)]
        max_ticks: Option<u64>,
        /// Print the command log as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Config file location plus per-field overrides.
#[derive(Args, Debug, Default)]
struct MissionArgs {
    #[arg(long, default_value = CONFIG_FILE)]
    config: PathBuf,
    /// Fire at the end of the routine.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    will_shoot: Option<bool>,
    /// Aim for the low goal.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    low_score: Option<bool>,
    /// Defense slot, 1-5.
    #[arg(long, allow_negative_numbers = true)]
    position: Option<i32>,
    /// Defense code (P, S, D, C, L or a full name).
    #[arg(long)]
    defense: Option<String>,
    /// Seconds to wait before crossing.
    #[arg(long)]
    wait: Option<f64>,
    /// Wait for the turn-spot drive and shooter move before finishing.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    await_branches: Option<bool>,
}

impl MissionArgs {
    fn resolve(&self) -> Result<RoutineConfig> {
        let mut cfg = load_config(&self.config)?;
        if let Some(will_shoot) = self.will_shoot {
            cfg.mission.will_shoot = will_shoot;
        }
        if let Some(low_score) = self.low_score {
            cfg.mission.low_score = low_score;
        }
        if let Some(position) = self.position {
            cfg.mission.position = position;
        }
        if let Some(defense) = &self.defense {
            cfg.mission.defense = defense.clone();
        }
        if let Some(wait) = self.wait {
            cfg.mission.wait_secs = wait;
        }
        if let Some(await_branches) = self.await_branches {
            cfg.plan.await_parallel_branches = await_branches;
        }
        cfg.validate().context("invalid mission")?;
        Ok(cfg)
    }
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { force, config } => cmd_init(&config, force),
        Command::Plan { mission, json } => cmd_plan(&mission, json),
        Command::Simulate {
            mission,
            target_offset,
            max_ticks,
            json,
        } => cmd_simulate(&mission, target_offset, max_ticks, json),
    }
}

fn cmd_init(path: &Path, force: bool) -> Result<i32> {
    if !force && path.exists() {
        eprintln!("{} already exists (use --force to overwrite)", path.display());
        return Ok(exit_codes::OK);
    }
    write_config(path, &RoutineConfig::default())?;
    println!("wrote {}", path.display());
    Ok(exit_codes::OK)
}

fn cmd_plan(mission: &MissionArgs, json: bool) -> Result<i32> {
    let cfg = mission.resolve()?;
    let plan = compose_routine_with(&cfg.mission, &cfg.plan).context("compose routine")?;
    let outline = plan.outline();
    if json {
        let payload = serde_json::to_string_pretty(&outline).context("serialize outline")?;
        println!("{payload}");
    } else {
        print!("{}", outline.render());
    }
    Ok(exit_codes::OK)
}

fn cmd_simulate(
    mission: &MissionArgs,
    target_offset: Option<f64>,
    max_ticks: Option<u64>,
    json: bool,
) -> Result<i32> {
    let mut cfg = mission.resolve()?;
    if target_offset.is_some() {
        cfg.sim.target_offset_degrees = target_offset;
    }
    if let Some(max_ticks) = max_ticks {
        cfg.sim.max_ticks = max_ticks;
    }
    cfg.validate()?;

    let plan = compose_routine_with(&cfg.mission, &cfg.plan).context("compose routine")?;
    let mut robot = SimRobot::new(&cfg.sim);
    let mut scheduler = Scheduler::new();
    scheduler.schedule(&mut robot, Box::new(plan));
    let outcome = scheduler.run_until_idle(&mut robot, cfg.sim.max_ticks, SimRobot::advance);
    info!(?outcome, "simulation finished");

    if json {
        let payload = serde_json::to_string_pretty(robot.log()).context("serialize command log")?;
        println!("{payload}");
    } else {
        for entry in robot.log() {
            let secs = entry.at_micros as f64 / 1_000_000.0;
            println!("{secs:>8.3}s  {}", entry.command);
        }
    }

    let tick_secs = cfg.sim.tick_period_ms as f64 / 1_000.0;
    match outcome {
        RunOutcome::Complete { ticks } => {
            println!(
                "complete after {ticks} ticks ({:.3}s)",
                ticks as f64 * tick_secs
            );
            Ok(exit_codes::OK)
        }
        RunOutcome::TickLimit { ticks } => {
            println!("tick limit reached after {ticks} ticks; routine interrupted");
            Ok(exit_codes::TICK_LIMIT)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init() {
        let cli = Cli::parse_from(["routine", "init"]);
        assert!(matches!(cli.command, Command::Init { force: false, .. }));
    }

    #[test]
    fn parse_init_force() {
        let cli = Cli::parse_from(["routine", "init", "--force"]);
        assert!(matches!(cli.command, Command::Init { force: true, .. }));
    }

    #[test]
    fn parse_plan_overrides() {
        let cli = Cli::parse_from([
            "routine",
            "plan",
            "--will-shoot",
            "--low-score",
            "false",
            "--position",
            "3",
            "--defense",
            "D",
            "--wait",
            "2",
        ]);
        let Command::Plan { mission, json } = cli.command else {
            panic!("expected plan");
        };
        assert!(!json);
        assert_eq!(mission.will_shoot, Some(true));
        assert_eq!(mission.low_score, Some(false));
        assert_eq!(mission.position, Some(3));
        assert_eq!(mission.defense.as_deref(), Some("D"));
        assert_eq!(mission.wait, Some(2.0));
        assert_eq!(mission.config, PathBuf::from(CONFIG_FILE));
    }

    #[test]
    fn parse_simulate_options() {
        let cli = Cli::parse_from([
            "routine",
            "simulate",
            "--target-offset",
            "-4.5",
            "--max-ticks",
            "10",
            "--json",
        ]);
        let Command::Simulate {
            target_offset,
            max_ticks,
            json,
            ..
        } = cli.command
        else {
            panic!("expected simulate");
        };
        assert_eq!(target_offset, Some(-4.5));
        assert_eq!(max_ticks, Some(10));
        assert!(json);
    }

    #[test]
    fn overrides_replace_file_values() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("routine.toml");
        std::fs::write(&path, "[mission]\nposition = 2\ndefense = \"P\"\n").expect("write");
        let args = MissionArgs {
            config: path,
            position: Some(5),
            await_branches: Some(false),
            ..MissionArgs::default()
        };
        let cfg = args.resolve().expect("resolve");
        assert_eq!(cfg.mission.position, 5);
        assert_eq!(cfg.mission.defense, "P");
        assert!(!cfg.plan.await_parallel_branches);
    }

    #[test]
    fn negative_wait_override_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let args = MissionArgs {
            config: temp.path().join("missing.toml"),
            wait: Some(-1.0),
            ..MissionArgs::default()
        };
        assert!(args.resolve().is_err());
    }
}

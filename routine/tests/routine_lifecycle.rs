//! End-to-end routine runs on the simulated robot.
//!
//! Composes real routines, drives them through the scheduler, and checks the
//! recorded actuator commands.

use routine::actions::{Action, AutoShoot};
use routine::compose::compose_routine;
use routine::core::mission::MissionParams;
use routine::core::types::{Crossing, ShooterPosition};
use routine::io::hardware::Robot;
use routine::io::sim::{ActuatorCommand, LoggedCommand, SimRobot, SimSettings};
use routine::scheduler::{RunOutcome, Scheduler};

fn mission(
    will_shoot: bool,
    low_score: bool,
    position: i32,
    defense: &str,
    wait_secs: f64,
) -> MissionParams {
    MissionParams {
        will_shoot,
        low_score,
        position,
        defense: defense.to_string(),
        wait_secs,
    }
}

fn run(params: &MissionParams, settings: &SimSettings) -> (SimRobot, RunOutcome) {
    let plan = compose_routine(params).expect("compose");
    let mut robot = SimRobot::new(settings);
    let mut scheduler = Scheduler::new();
    scheduler.schedule(&mut robot, Box::new(plan));
    let outcome = scheduler.run_until_idle(&mut robot, settings.max_ticks, SimRobot::advance);
    (robot, outcome)
}

fn position_of(log: &[LoggedCommand], command: &ActuatorCommand) -> usize {
    log.iter()
        .position(|entry| &entry.command == command)
        .unwrap_or_else(|| panic!("missing {command:?}"))
}

#[test]
fn low_goal_routine_runs_in_order() {
    let (robot, outcome) = run(&mission(true, true, 3, "D", 2.0), &SimSettings::default());
    assert!(matches!(outcome, RunOutcome::Complete { .. }));
    assert_eq!(robot.pivot(), ShooterPosition::Lowest);

    let log = robot.log();
    let cross = position_of(
        log,
        &ActuatorCommand::Cross {
            crossing: Crossing::Drawbridge,
        },
    );
    assert_eq!(log[cross].at_micros, 2_000_000);

    let turn_spot = position_of(
        log,
        &ActuatorCommand::DriveDistance {
            speed: 0.5,
            distance: 0.0,
        },
    );
    let pivot = position_of(
        log,
        &ActuatorCommand::MovePivot {
            position: ShooterPosition::Lowest,
        },
    );
    let aim = position_of(log, &ActuatorCommand::Turn { degrees: -30.0 });
    let approach = position_of(
        log,
        &ActuatorCommand::DriveDistance {
            speed: 0.5,
            distance: 3.638,
        },
    );
    let face_goal = position_of(log, &ActuatorCommand::Turn { degrees: 90.0 });
    let first_feed = position_of(log, &ActuatorCommand::Feeder { engaged: true });

    assert!(cross < turn_spot);
    assert_eq!(log[turn_spot].at_micros, log[pivot].at_micros);
    assert!(turn_spot < aim);
    assert!(aim < approach);
    assert!(approach < face_goal);
    assert!(face_goal < first_feed);
}

#[test]
fn low_goal_shot_feeds_for_its_whole_second() {
    let (robot, _) = run(&mission(true, true, 4, "C", 0.0), &SimSettings::default());
    let log = robot.log();

    let last_turn = position_of(log, &ActuatorCommand::Turn { degrees: -90.0 });
    let shot = &log[last_turn + 1..];
    let armed = shot
        .iter()
        .position(|entry| entry.command == ActuatorCommand::Wheels { output: 0.0 })
        .expect("shot armed");
    let start = shot[armed].at_micros;

    let feeds: Vec<&LoggedCommand> = shot
        .iter()
        .filter(|entry| matches!(entry.command, ActuatorCommand::Feeder { .. }))
        .collect();
    let (release, engaged) = feeds.split_last().expect("feeder commands");
    assert!(
        engaged
            .iter()
            .all(|entry| entry.command == ActuatorCommand::Feeder { engaged: true })
    );
    assert_eq!(engaged[0].at_micros, start);
    assert_eq!(release.command, ActuatorCommand::Feeder { engaged: false });
    assert_eq!(release.at_micros, start + 1_000_000);
    assert_eq!(
        shot.last().map(|entry| &entry.command),
        Some(&ActuatorCommand::Feeder { engaged: false })
    );
}

#[test]
fn high_goal_routine_aims_at_visible_target_before_firing() {
    let settings = SimSettings {
        target_offset_degrees: Some(20.0),
        ..SimSettings::default()
    };
    let (robot, outcome) = run(&mission(true, false, 2, "P", 0.0), &settings);
    assert!(matches!(outcome, RunOutcome::Complete { .. }));

    let log = robot.log();
    let aim = position_of(log, &ActuatorCommand::Turn { degrees: 60.0 });
    let correction = position_of(log, &ActuatorCommand::Turn { degrees: -40.0 });
    let first_feed = position_of(log, &ActuatorCommand::Feeder { engaged: true });
    assert!(aim < correction);
    assert!(correction < first_feed);
}

#[test]
fn high_goal_routine_without_target_never_feeds() {
    let (robot, outcome) = run(&mission(true, false, 5, "S", 0.0), &SimSettings::default());
    assert!(matches!(outcome, RunOutcome::Complete { .. }));
    assert!(
        !robot
            .commands()
            .contains(&ActuatorCommand::Feeder { engaged: true })
    );
}

#[test]
fn tick_limit_interrupts_the_routine() {
    let settings = SimSettings {
        max_ticks: 40,
        ..SimSettings::default()
    };
    let (robot, outcome) = run(&mission(true, true, 3, "D", 0.0), &settings);
    assert_eq!(outcome, RunOutcome::TickLimit { ticks: 40 });
    // The final turn toward the goal was still live.
    assert_eq!(
        robot.commands().last(),
        Some(&ActuatorCommand::DriveStop)
    );
    assert!(
        !robot
            .commands()
            .contains(&ActuatorCommand::Wheels { output: 1.0 })
    );
}

#[test]
fn cancelling_a_running_shot_rests_the_shooter_once() {
    let mut robot = SimRobot::new(&SimSettings::default());
    let mut scheduler = Scheduler::new();
    let shot = AutoShoot::new(3.0);
    let name = shot.name();
    scheduler.schedule(&mut robot, Box::new(shot));
    for _ in 0..10 {
        scheduler.run_once(&mut robot);
        robot.advance();
    }

    assert!(scheduler.cancel(&mut robot, &name, "autonomous period ended"));
    let logged = robot.log().len();
    assert_eq!(
        robot.commands()[logged - 2..],
        [
            ActuatorCommand::Wheels { output: 0.0 },
            ActuatorCommand::Feeder { engaged: false },
        ]
    );

    scheduler.run_once(&mut robot);
    assert!(!scheduler.cancel(&mut robot, &name, "again"));
    assert_eq!(robot.log().len(), logged);
}

#[test]
fn routine_overrunning_autonomous_period_hits_tick_limit() {
    let settings = SimSettings::default();
    let params = MissionParams {
        wait_secs: 20.0,
        ..MissionParams::default()
    };
    let (robot, outcome) = run(&params, &settings);
    assert_eq!(outcome, RunOutcome::TickLimit { ticks: 750 });
    assert!(robot.now_micros() <= 15_000_000);
    assert!(
        !robot
            .commands()
            .iter()
            .any(|command| matches!(command, ActuatorCommand::Cross { .. }))
    );
}

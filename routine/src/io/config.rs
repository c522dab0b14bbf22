//! Routine configuration stored in `routine.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::decision::PlanOptions;
use crate::core::mission::MissionParams;
use crate::io::sim::SimSettings;

/// Default config file name, resolved against the working directory.
pub const CONFIG_FILE: &str = "routine.toml";

/// Routine configuration (TOML).
///
/// Every table and field is optional; missing values take the defaults of the
/// stock routine (cross the low bar, do not shoot).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RoutineConfig {
    pub mission: MissionParams,
    pub plan: PlanOptions,
    pub sim: SimSettings,
}

impl RoutineConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.mission.wait_secs.is_finite() || self.mission.wait_secs < 0.0 {
            return Err(anyhow!(
                "mission.wait_secs must be a non-negative number of seconds"
            ));
        }
        if !self.plan.drive_speed.is_finite() || self.plan.drive_speed <= 0.0 {
            return Err(anyhow!("plan.drive_speed must be > 0"));
        }
        if self.sim.tick_period_ms == 0 {
            return Err(anyhow!("sim.tick_period_ms must be > 0"));
        }
        if self.sim.max_ticks == 0 {
            return Err(anyhow!("sim.max_ticks must be > 0"));
        }
        if let Some(offset) = self.sim.target_offset_degrees {
            if !offset.is_finite() {
                return Err(anyhow!("sim.target_offset_degrees must be finite"));
            }
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `RoutineConfig::default()`.
pub fn load_config(path: &Path) -> Result<RoutineConfig> {
    if !path.exists() {
        return Ok(RoutineConfig::default());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: RoutineConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &RoutineConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

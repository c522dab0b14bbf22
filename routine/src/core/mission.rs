//! Mission parameters: the whole configuration surface of the composer.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::types::Crossing;

/// Inputs that determine which autonomous routine is built.
///
/// Read-only once handed to [`compose_routine`](crate::compose::compose_routine).
/// `position` is deliberately a plain integer: values outside `1..=5` are
/// accepted and resolve to table defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionParams {
    /// Fire a ball at the end of the routine.
    pub will_shoot: bool,
    /// Aim for the low goal instead of the high goal.
    pub low_score: bool,
    /// Field slot (1-5) of the defense being crossed.
    pub position: i32,
    /// Defense code, single letter or name, case-insensitive.
    pub defense: String,
    /// Seconds to wait before crossing.
    pub wait_secs: f64,
}

impl Default for MissionParams {
    /// Cross the low bar and do not shoot.
    fn default() -> Self {
        Self {
            will_shoot: false,
            low_score: false,
            position: 1,
            defense: "ROUGH TERRAIN".to_string(),
            wait_secs: 0.0,
        }
    }
}

impl MissionParams {
    /// Start delay for the crossing step. Negative or non-finite values collapse to zero.
    pub fn wait(&self) -> Duration {
        Duration::try_from_secs_f64(self.wait_secs).unwrap_or(Duration::ZERO)
    }
}

/// Map a defense code to its dedicated crossing strategy.
///
/// Accepts `P S D C L` and the full names, ignoring case, surrounding
/// whitespace, and `_`/`-` separators. Everything else, including defenses
/// without a dedicated strategy, maps to [`Crossing::Generic`].
pub fn crossing_for_code(code: &str) -> Crossing {
    let normalized: String = code
        .trim()
        .chars()
        .map(|ch| match ch {
            '_' | '-' => ' ',
            other => other.to_ascii_uppercase(),
        })
        .collect();
    let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");

    match normalized.as_str() {
        "P" | "PORTCULLIS" => Crossing::Portcullis,
        "S" | "SALLY PORT" | "SALLYPORT" => Crossing::SallyPort,
        "D" | "DRAWBRIDGE" => Crossing::Drawbridge,
        "C" | "CHEVAL DE FRISE" | "CHEVALDEFRISE" => Crossing::ChevalDeFrise,
        "L" | "LOW BAR" | "LOWBAR" => Crossing::LowBar,
        _ => Crossing::Generic,
    }
}

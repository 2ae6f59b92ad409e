// Engine tunables. Every struct deserializes with per-field defaults so a
// partial TOML table only overrides what it names.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::sampler::SamplerConfig;
use crate::tiebreak::POINTS_EPSILON;

// ---------------------------------------------------------------------------
// Season simulation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Monte Carlo trials per run.
    pub trials: u32,
    /// Fixed seed for reproducible runs; drawn from the OS when absent.
    pub seed: Option<u64>,
    /// Points-for tolerance used by the tie-break resolver.
    pub points_epsilon: f64,
    pub sampler: SamplerConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            trials: 10_000,
            seed: None,
            points_epsilon: POINTS_EPSILON,
            sampler: SamplerConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.trials == 0 {
            return Err(EngineError::config("simulation.trials", "must be > 0"));
        }
        if !(self.points_epsilon > 0.0) {
            return Err(EngineError::config(
                "simulation.points_epsilon",
                format!("must be > 0, got {}", self.points_epsilon),
            ));
        }
        self.sampler.validate()
    }
}

// ---------------------------------------------------------------------------
// Draft odds
// ---------------------------------------------------------------------------

/// Playoff status of a team for draft purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Eligibility {
    /// Cannot make the playoffs; picks only in the non-playoff block.
    Eliminated,
    /// Qualification still open; may land in either block.
    Bubble,
    /// Certain to make the playoffs; picks only in the playoff block.
    Clinched,
}

impl Eligibility {
    pub fn label(&self) -> &'static str {
        match self {
            Eligibility::Eliminated => "eliminated",
            Eligibility::Bubble => "bubble",
            Eligibility::Clinched => "clinched",
        }
    }
}

/// The one threshold policy mapping `make_playoffs_pct` to [`Eligibility`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityPolicy {
    pub eliminated_at_or_below: f64,
    pub clinched_at_or_above: f64,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        EligibilityPolicy {
            eliminated_at_or_below: 0.0,
            clinched_at_or_above: 100.0,
        }
    }
}

impl EligibilityPolicy {
    pub fn classify(&self, make_playoffs_pct: f64) -> Eligibility {
        if make_playoffs_pct <= self.eliminated_at_or_below {
            Eligibility::Eliminated
        } else if make_playoffs_pct >= self.clinched_at_or_above {
            Eligibility::Clinched
        } else {
            Eligibility::Bubble
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftOddsConfig {
    /// Trials while the regular season is still running.
    pub trials: u32,
    /// Trials for the playoff-block pass once the regular season is over.
    pub postseason_trials: u32,
    pub seed: Option<u64>,
    /// Points-for noise for ranking non-qualifiers, as a fraction of points.
    pub points_noise_fraction: f64,
    /// Projected-wins noise (uniform +/-) for ranking qualifiers.
    pub wins_noise: f64,
    /// Minimum percentage shown for any slot in a team's eligible range.
    pub slot_floor_pct: f64,
    /// Reorder the non-playoff block with a weighted lottery draw.
    pub lottery: bool,
    pub eligibility: EligibilityPolicy,
}

impl Default for DraftOddsConfig {
    fn default() -> Self {
        DraftOddsConfig {
            trials: 10_000,
            postseason_trials: 2_000,
            seed: None,
            points_noise_fraction: 0.05,
            wins_noise: 1.0,
            slot_floor_pct: 0.001,
            lottery: false,
            eligibility: EligibilityPolicy::default(),
        }
    }
}

impl DraftOddsConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.trials == 0 {
            return Err(EngineError::config("draft.trials", "must be > 0"));
        }
        if self.postseason_trials == 0 {
            return Err(EngineError::config("draft.postseason_trials", "must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.points_noise_fraction) {
            return Err(EngineError::config(
                "draft.points_noise_fraction",
                format!("must be between 0.0 and 1.0, got {}", self.points_noise_fraction),
            ));
        }
        if !(self.wins_noise >= 0.0) {
            return Err(EngineError::config(
                "draft.wins_noise",
                format!("must be >= 0, got {}", self.wins_noise),
            ));
        }
        if !(0.0..1.0).contains(&self.slot_floor_pct) {
            return Err(EngineError::config(
                "draft.slot_floor_pct",
                format!("must be in [0, 1), got {}", self.slot_floor_pct),
            ));
        }
        let policy = &self.eligibility;
        if !(policy.eliminated_at_or_below < policy.clinched_at_or_above) {
            return Err(EngineError::config(
                "draft.eligibility",
                format!(
                    "eliminated_at_or_below ({}) must be below clinched_at_or_above ({})",
                    policy.eliminated_at_or_below, policy.clinched_at_or_above
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
        assert!(DraftOddsConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_trials_rejected() {
        let cfg = SimulationConfig {
            trials: 0,
            ..SimulationConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("simulation.trials"));
    }

    #[test]
    fn classify_uses_single_policy() {
        let policy = EligibilityPolicy::default();
        assert_eq!(policy.classify(0.0), Eligibility::Eliminated);
        assert_eq!(policy.classify(0.1), Eligibility::Bubble);
        assert_eq!(policy.classify(50.0), Eligibility::Bubble);
        assert_eq!(policy.classify(99.9), Eligibility::Bubble);
        assert_eq!(policy.classify(100.0), Eligibility::Clinched);
    }

    #[test]
    fn partial_table_keeps_defaults() {
        let cfg: DraftOddsConfig = serde_json::from_str(r#"{ "lottery": true }"#).unwrap();
        assert!(cfg.lottery);
        assert_eq!(cfg.trials, 10_000);
        assert_eq!(cfg.eligibility, EligibilityPolicy::default());
    }

    #[test]
    fn inverted_policy_rejected() {
        let cfg = DraftOddsConfig {
            eligibility: EligibilityPolicy {
                eliminated_at_or_below: 60.0,
                clinched_at_or_above: 40.0,
            },
            ..DraftOddsConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}

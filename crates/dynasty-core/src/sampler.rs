// Single-game outcome sampling for simulated remaining weeks.
//
// Coarse single-team model: opponent strength is a uniform draw inside a
// fixed band and the team never meets another simulated team. Changing this
// shifts every downstream probability.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Tunables for [`GameOutcomeSampler`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Lower bound of the opponent-strength band.
    pub opponent_strength_min: f64,
    /// Upper bound of the opponent-strength band.
    pub opponent_strength_max: f64,
    /// Weekly score noise as a fraction of the team's average.
    pub score_noise_fraction: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            opponent_strength_min: 0.4,
            opponent_strength_max: 0.8,
            score_noise_fraction: 0.2,
        }
    }
}

impl SamplerConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.opponent_strength_min > 0.0) {
            return Err(EngineError::config(
                "sampler.opponent_strength_min",
                format!("must be > 0, got {}", self.opponent_strength_min),
            ));
        }
        if !(self.opponent_strength_max >= self.opponent_strength_min) {
            return Err(EngineError::config(
                "sampler.opponent_strength_max",
                format!(
                    "must be >= opponent_strength_min ({}), got {}",
                    self.opponent_strength_min, self.opponent_strength_max
                ),
            ));
        }
        if !(0.0..=1.0).contains(&self.score_noise_fraction) {
            return Err(EngineError::config(
                "sampler.score_noise_fraction",
                format!("must be between 0.0 and 1.0, got {}", self.score_noise_fraction),
            ));
        }
        Ok(())
    }
}

/// Result of one simulated game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameOutcome {
    pub won: bool,
    pub points: f64,
}

/// Draws one simulated week for one team.
#[derive(Debug, Clone, Copy, Default)]
pub struct GameOutcomeSampler {
    config: SamplerConfig,
}

impl GameOutcomeSampler {
    pub fn new(config: SamplerConfig) -> Self {
        GameOutcomeSampler { config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Probability of beating an opponent of the given strength.
    pub fn win_probability(avg_points: f64, opponent_strength: f64) -> f64 {
        avg_points / (avg_points + opponent_strength * 100.0)
    }

    pub fn sample<R: Rng + ?Sized>(&self, avg_points: f64, rng: &mut R) -> GameOutcome {
        let strength = self.draw_strength(rng);
        let win_prob = Self::win_probability(avg_points, strength);
        let won = rng.gen::<f64>() < win_prob;

        let spread = avg_points * self.config.score_noise_fraction;
        let noise = if spread > 0.0 {
            rng.gen_range(-spread..=spread)
        } else {
            0.0
        };

        GameOutcome {
            won,
            points: (avg_points + noise).max(0.0),
        }
    }

    fn draw_strength<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let (lo, hi) = (
            self.config.opponent_strength_min,
            self.config.opponent_strength_max,
        );
        if hi > lo {
            rng.gen_range(lo..hi)
        } else {
            lo
        }
    }
}

// Engine error type.

use thiserror::Error;

/// Contract violations reported by the simulation engine.
///
/// The engine never retries: a call either returns a complete result for its
/// inputs or one of these errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("remaining weeks must be non-negative, got {0}")]
    NegativeRemainingWeeks(i32),

    #[error("playoff teams ({playoff_teams}) exceeds the number of teams ({teams})")]
    TooManyPlayoffTeams { playoff_teams: usize, teams: usize },

    #[error("lottery weights require at least one team")]
    EmptyLottery,

    #[error("lottery of {count} teams exceeds the exact-odds limit of {max}")]
    LotteryTooLarge { count: usize, max: usize },

    #[error(
        "invalid draft slots: total_teams={total_teams}, non_playoff_slots={non_playoff_slots}, \
         standings contain {teams} teams"
    )]
    InvalidDraftSlots {
        total_teams: usize,
        non_playoff_slots: usize,
        teams: usize,
    },

    #[error("invalid config field `{field}`: {message}")]
    InvalidConfig { field: String, message: String },
}

impl EngineError {
    pub(crate) fn config(field: &str, message: impl Into<String>) -> Self {
        EngineError::InvalidConfig {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Reject a negative remaining-week count; return it as `u32` otherwise.
pub(crate) fn check_remaining_weeks(remaining_weeks: i32) -> Result<u32, EngineError> {
    u32::try_from(remaining_weeks).map_err(|_| EngineError::NegativeRemainingWeeks(remaining_weeks))
}

// League-outcome simulation engine: playoff, division and #1-seed odds from a
// partial season, and draft pick-slot odds derived from them.
//
// Pure computation: callers hand in a standings snapshot and schedule
// metadata and get plain result structs back. Randomness is seedable so runs
// can be reproduced exactly.

pub mod aggregate;
pub mod config;
pub mod draft;
pub mod error;
pub mod sampler;
pub mod simulation;
pub mod standings;
pub mod tiebreak;

mod trials;

pub use config::{DraftOddsConfig, Eligibility, EligibilityPolicy, SimulationConfig};
pub use draft::{DraftOrderAssigner, DraftSlotOdds, LotteryWeightTable};
pub use error::EngineError;
pub use sampler::{GameOutcome, GameOutcomeSampler, SamplerConfig};
pub use simulation::{DivisionConfig, SeasonSimulator, SimulationResult, TeamPrediction};
pub use standings::{
    CompletedWeek, HeadToHeadMatrix, MatchupEntry, RosterId, RosterInfo, StandingsSnapshot,
    TeamRecord,
};
pub use tiebreak::{TeamLine, TiebreakResolver};

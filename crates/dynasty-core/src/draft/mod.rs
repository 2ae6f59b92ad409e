// Draft order: lottery weights and per-team pick-slot odds.

pub mod lottery;
pub mod order;

pub use lottery::LotteryWeightTable;
pub use order::{eligible_range, DraftOrderAssigner, DraftSlotOdds};

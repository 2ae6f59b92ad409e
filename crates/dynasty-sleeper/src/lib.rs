// Sleeper league exports: raw payload types, directory loading, and the
// league view that turns them into engine input.

pub mod league;
pub mod load;
pub mod types;

pub use league::{LeagueData, ReportedStanding};
pub use load::{LeagueExport, SleeperError, WeekMatchups};

// Raw Sleeper API payloads as they appear in an exported league directory.
//
// Only the fields the engine needs are modelled; everything else in the
// payloads is ignored. Numeric fields the platform sometimes sends as strings
// or nulls are kept as `serde_json::Value` and read leniently.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// League
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLeague {
    #[serde(default)]
    pub league_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub season: String,
    #[serde(default)]
    pub total_rosters: u32,
    #[serde(default)]
    pub settings: RawLeagueSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLeagueSettings {
    #[serde(default)]
    pub playoff_teams: Option<u32>,
    #[serde(default)]
    pub divisions: Option<u32>,
    #[serde(default)]
    pub playoff_week_start: Option<u32>,
    /// Last week with final scores; absent before week 1 is scored.
    #[serde(default)]
    pub last_scored_leg: Option<u32>,
}

// ---------------------------------------------------------------------------
// Rosters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRoster {
    pub roster_id: u32,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub settings: RawRosterSettings,
    #[serde(default)]
    pub metadata: Option<RawMetadata>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRosterSettings {
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub ties: u32,
    #[serde(default)]
    pub fpts: Value,
    #[serde(default)]
    pub fpts_decimal: Value,
    #[serde(default)]
    pub division: Option<u32>,
}

impl RawRosterSettings {
    /// Season points as the platform reports them: whole points plus
    /// hundredths. Anything unreadable counts as zero.
    pub fn points_for(&self) -> f64 {
        match (lenient_number(&self.fpts), lenient_number(&self.fpts_decimal)) {
            (Some(whole), Some(hundredths)) => whole + hundredths / 100.0,
            _ => 0.0,
        }
    }
}

/// Free-form metadata shared by rosters and users.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMetadata {
    #[serde(default)]
    pub team_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawUser {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub metadata: Option<RawMetadata>,
}

// ---------------------------------------------------------------------------
// Matchups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMatchup {
    pub roster_id: u32,
    /// `null` for a bye.
    #[serde(default)]
    pub matchup_id: Option<u32>,
    #[serde(default)]
    pub points: Value,
}

impl RawMatchup {
    pub fn points(&self) -> f64 {
        lenient_number(&self.points).unwrap_or(0.0)
    }
}

/// Read a JSON number or numeric string. Null and missing read as zero.
pub(crate) fn lenient_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn non_empty(name: &Option<String>) -> Option<&str> {
    name.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl RawMetadata {
    pub fn team_name(&self) -> Option<&str> {
        non_empty(&self.team_name)
    }
}

impl RawUser {
    pub fn display_name(&self) -> Option<&str> {
        non_empty(&self.display_name)
    }
}

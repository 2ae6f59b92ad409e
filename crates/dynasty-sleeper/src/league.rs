// League view over an export: engine inputs plus the display data the
// reports need.

use std::collections::HashMap;
use std::path::Path;

use dynasty_core::{
    CompletedWeek, DivisionConfig, HeadToHeadMatrix, MatchupEntry, RosterId, RosterInfo,
    StandingsSnapshot, TeamRecord,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::load::{LeagueExport, SleeperError};
use crate::types::{RawRoster, RawUser};

/// Platform default when the league omits `playoff_week_start`.
pub const DEFAULT_PLAYOFF_WEEK_START: u32 = 15;

/// Platform default when the league omits `playoff_teams`.
pub const DEFAULT_PLAYOFF_TEAMS: u32 = 6;

/// Standings line exactly as the platform reports it on the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportedStanding {
    pub roster_id: RosterId,
    pub team_name: String,
    pub owner_name: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: f64,
}

#[derive(Debug, Clone)]
pub struct LeagueData {
    export: LeagueExport,
    users: HashMap<String, RawUser>,
}

impl LeagueData {
    pub fn new(export: LeagueExport) -> Self {
        let users = export
            .users
            .iter()
            .map(|u| (u.user_id.clone(), u.clone()))
            .collect();
        LeagueData { export, users }
    }

    pub fn load(dir: &Path) -> Result<Self, SleeperError> {
        LeagueExport::load(dir).map(Self::new)
    }

    pub fn export(&self) -> &LeagueExport {
        &self.export
    }

    pub fn league_id(&self) -> &str {
        &self.export.league.league_id
    }

    pub fn name(&self) -> &str {
        &self.export.league.name
    }

    pub fn season(&self) -> &str {
        &self.export.league.season
    }

    pub fn team_count(&self) -> usize {
        self.export.rosters.len()
    }

    // -----------------------------------------------------------------------
    // Schedule
    // -----------------------------------------------------------------------

    pub fn playoff_week_start(&self) -> u32 {
        self.export
            .league
            .settings
            .playoff_week_start
            .filter(|&w| w > 0)
            .unwrap_or(DEFAULT_PLAYOFF_WEEK_START)
    }

    /// Last scored week; falls back to the newest exported matchup week.
    pub fn last_scored_week(&self) -> u32 {
        self.export
            .league
            .settings
            .last_scored_leg
            .unwrap_or_else(|| self.export.weeks.last().map_or(0, |w| w.week))
    }

    /// Scored weeks that belong to the regular season.
    pub fn completed_regular_weeks(&self) -> u32 {
        self.last_scored_week().min(self.playoff_week_start() - 1)
    }

    /// Regular-season weeks still to play. Zero once the playoffs begin.
    pub fn remaining_weeks(&self) -> i32 {
        let regular_weeks = self.playoff_week_start() as i32 - 1;
        (regular_weeks - self.last_scored_week() as i32).max(0)
    }

    pub fn playoff_teams(&self) -> usize {
        self.export
            .league
            .settings
            .playoff_teams
            .unwrap_or(DEFAULT_PLAYOFF_TEAMS) as usize
    }

    pub fn non_playoff_slots(&self) -> usize {
        self.team_count().saturating_sub(self.playoff_teams())
    }

    pub fn division_config(&self) -> Option<DivisionConfig> {
        self.export
            .league
            .settings
            .divisions
            .filter(|&count| count > 0)
            .map(|count| DivisionConfig { count })
    }

    // -----------------------------------------------------------------------
    // Engine input
    // -----------------------------------------------------------------------

    /// Standings rebuilt from regular-season matchups. Without any matchup
    /// data the platform-reported records are used and head-to-head is empty.
    pub fn snapshot(&self) -> StandingsSnapshot {
        let rosters: Vec<RosterInfo> = self
            .export
            .rosters
            .iter()
            .map(|r| RosterInfo {
                roster_id: r.roster_id,
                division: r.settings.division,
            })
            .collect();

        let cutoff = self.completed_regular_weeks();
        let weeks: Vec<CompletedWeek> = self
            .export
            .weeks
            .iter()
            .filter(|w| w.week >= 1 && w.week <= cutoff)
            .map(|w| CompletedWeek {
                week: w.week,
                entries: w
                    .matchups
                    .iter()
                    .map(|m| MatchupEntry {
                        roster_id: m.roster_id,
                        matchup_id: m.matchup_id,
                        points: m.points(),
                    })
                    .collect(),
            })
            .collect();

        if weeks.is_empty() && cutoff > 0 {
            warn!(
                "league reports {} scored weeks but no matchups were exported; using roster records",
                cutoff
            );
            return self.reported_snapshot();
        }
        if (weeks.len() as u32) < cutoff {
            warn!(
                "only {} of {} scored weeks have matchup files",
                weeks.len(),
                cutoff
            );
        }
        debug!("building standings from {} completed weeks", weeks.len());
        StandingsSnapshot::build(&rosters, &weeks)
    }

    fn reported_snapshot(&self) -> StandingsSnapshot {
        let teams = self
            .export
            .rosters
            .iter()
            .map(|r| {
                TeamRecord::new(
                    r.roster_id,
                    r.settings.wins,
                    r.settings.losses,
                    r.settings.ties,
                    r.settings.points_for(),
                    r.settings.division,
                )
            })
            .collect();
        StandingsSnapshot::from_records(teams, HeadToHeadMatrix::new())
    }

    // -----------------------------------------------------------------------
    // Display
    // -----------------------------------------------------------------------

    fn roster(&self, roster_id: RosterId) -> Option<&RawRoster> {
        self.export.rosters.iter().find(|r| r.roster_id == roster_id)
    }

    fn owner(&self, roster: &RawRoster) -> Option<&RawUser> {
        roster.owner_id.as_ref().and_then(|id| self.users.get(id))
    }

    /// Roster team name, then the owner's team name, then the owner's display
    /// name, then `Team <id>`.
    pub fn team_name(&self, roster_id: RosterId) -> String {
        let Some(roster) = self.roster(roster_id) else {
            return format!("Team {roster_id}");
        };
        let owner = self.owner(roster);
        roster
            .metadata
            .as_ref()
            .and_then(|m| m.team_name())
            .or_else(|| owner.and_then(|u| u.metadata.as_ref()).and_then(|m| m.team_name()))
            .or_else(|| owner.and_then(|u| u.display_name()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Team {roster_id}"))
    }

    pub fn owner_name(&self, roster_id: RosterId) -> String {
        self.roster(roster_id)
            .and_then(|r| self.owner(r))
            .and_then(|u| u.display_name())
            .unwrap_or("Unknown Owner")
            .to_string()
    }

    /// Platform-reported records, best first by wins then points.
    pub fn reported_standings(&self) -> Vec<ReportedStanding> {
        let mut lines: Vec<ReportedStanding> = self
            .export
            .rosters
            .iter()
            .map(|r| ReportedStanding {
                roster_id: r.roster_id,
                team_name: self.team_name(r.roster_id),
                owner_name: self.owner_name(r.roster_id),
                wins: r.settings.wins,
                losses: r.settings.losses,
                ties: r.settings.ties,
                points_for: r.settings.points_for(),
            })
            .collect();
        lines.sort_by(|a, b| {
            b.wins
                .cmp(&a.wins)
                .then_with(|| b.points_for.total_cmp(&a.points_for))
                .then_with(|| a.roster_id.cmp(&b.roster_id))
        });
        lines
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

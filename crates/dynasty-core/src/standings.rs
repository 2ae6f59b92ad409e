// Standings snapshot: per-team records and the head-to-head matrix, built
// from completed-week matchup results.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Platform roster identifier; unique within a league.
pub type RosterId = u32;

/// Average used for a team that has not played a game yet.
pub const BASELINE_AVG_POINTS: f64 = 100.0;

// ---------------------------------------------------------------------------
// Team record
// ---------------------------------------------------------------------------

/// Current state of one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub roster_id: RosterId,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    /// Cumulative fantasy points scored in completed weeks.
    pub points_for: f64,
    /// `points_for / games_played`, or [`BASELINE_AVG_POINTS`] with no games.
    pub avg_points_per_week: f64,
    /// 1-indexed division, when the league assigns one.
    pub division: Option<u32>,
}

impl TeamRecord {
    /// Build a record, deriving the weekly average from the totals.
    pub fn new(
        roster_id: RosterId,
        wins: u32,
        losses: u32,
        ties: u32,
        points_for: f64,
        division: Option<u32>,
    ) -> Self {
        let games = wins + losses + ties;
        let avg_points_per_week = if games == 0 {
            BASELINE_AVG_POINTS
        } else {
            (points_for / games as f64).max(f64::MIN_POSITIVE)
        };
        TeamRecord {
            roster_id,
            wins,
            losses,
            ties,
            points_for,
            avg_points_per_week,
            division,
        }
    }

    pub fn games_played(&self) -> u32 {
        self.wins + self.losses + self.ties
    }
}

// ---------------------------------------------------------------------------
// Head-to-head matrix
// ---------------------------------------------------------------------------

/// Wins of one roster over another in completed weeks. Asymmetric: the entry
/// for `(a, b)` counts games `a` won against `b`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadToHeadMatrix {
    wins: HashMap<(RosterId, RosterId), u32>,
}

impl HeadToHeadMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_win(&mut self, winner: RosterId, loser: RosterId) {
        *self.wins.entry((winner, loser)).or_insert(0) += 1;
    }

    /// Games `team` has won against `opponent`; zero when they never met.
    pub fn wins(&self, team: RosterId, opponent: RosterId) -> u32 {
        self.wins.get(&(team, opponent)).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.wins.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Matchup input
// ---------------------------------------------------------------------------

/// One side of a weekly matchup as reported by the league platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupEntry {
    pub roster_id: RosterId,
    /// Sides sharing a `matchup_id` played each other; `None` is a bye.
    pub matchup_id: Option<u32>,
    pub points: f64,
}

/// All matchup entries for one completed week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedWeek {
    pub week: u32,
    pub entries: Vec<MatchupEntry>,
}

/// Roster identity and division assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterInfo {
    pub roster_id: RosterId,
    pub division: Option<u32>,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Immutable league state handed to the simulator and the draft assigner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StandingsSnapshot {
    teams: Vec<TeamRecord>,
    h2h: HeadToHeadMatrix,
}

#[derive(Default)]
struct Tally {
    wins: u32,
    losses: u32,
    ties: u32,
    points_for: f64,
}

impl StandingsSnapshot {
    /// Replay every completed week into team records and a head-to-head
    /// matrix. Structurally inconsistent pairings are skipped with a warning;
    /// the rest of the week still counts.
    pub fn build(rosters: &[RosterInfo], weeks: &[CompletedWeek]) -> Self {
        let known: HashSet<RosterId> = rosters.iter().map(|r| r.roster_id).collect();
        let mut tallies: HashMap<RosterId, Tally> = HashMap::new();
        let mut h2h = HeadToHeadMatrix::new();

        for week in weeks {
            let mut pairings: BTreeMap<u32, Vec<&MatchupEntry>> = BTreeMap::new();
            for entry in &week.entries {
                if let Some(matchup_id) = entry.matchup_id {
                    pairings.entry(matchup_id).or_default().push(entry);
                }
            }

            for (matchup_id, sides) in pairings {
                let [a, b] = sides.as_slice() else {
                    warn!(
                        "week {}: skipping matchup {} with {} sides",
                        week.week,
                        matchup_id,
                        sides.len()
                    );
                    continue;
                };
                if a.roster_id == b.roster_id
                    || !known.contains(&a.roster_id)
                    || !known.contains(&b.roster_id)
                    || !a.points.is_finite()
                    || !b.points.is_finite()
                {
                    warn!(
                        "week {}: skipping inconsistent matchup {} ({} vs {})",
                        week.week, matchup_id, a.roster_id, b.roster_id
                    );
                    continue;
                }

                tallies.entry(a.roster_id).or_default().points_for += a.points;
                tallies.entry(b.roster_id).or_default().points_for += b.points;

                if a.points > b.points {
                    tallies.entry(a.roster_id).or_default().wins += 1;
                    tallies.entry(b.roster_id).or_default().losses += 1;
                    h2h.record_win(a.roster_id, b.roster_id);
                } else if b.points > a.points {
                    tallies.entry(b.roster_id).or_default().wins += 1;
                    tallies.entry(a.roster_id).or_default().losses += 1;
                    h2h.record_win(b.roster_id, a.roster_id);
                } else {
                    tallies.entry(a.roster_id).or_default().ties += 1;
                    tallies.entry(b.roster_id).or_default().ties += 1;
                }
            }
        }

        let teams = rosters
            .iter()
            .map(|roster| {
                let tally = tallies.remove(&roster.roster_id).unwrap_or_default();
                TeamRecord::new(
                    roster.roster_id,
                    tally.wins,
                    tally.losses,
                    tally.ties,
                    tally.points_for,
                    roster.division,
                )
            })
            .collect();

        StandingsSnapshot { teams, h2h }
    }

    /// Wrap records that were built elsewhere (e.g. platform-reported totals).
    pub fn from_records(teams: Vec<TeamRecord>, h2h: HeadToHeadMatrix) -> Self {
        StandingsSnapshot { teams, h2h }
    }

    pub fn teams(&self) -> &[TeamRecord] {
        &self.teams
    }

    pub fn h2h(&self) -> &HeadToHeadMatrix {
        &self.h2h
    }

    pub fn team(&self, roster_id: RosterId) -> Option<&TeamRecord> {
        self.teams.iter().find(|t| t.roster_id == roster_id)
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// True when the snapshot cannot be simulated: duplicate roster ids or
    /// non-finite point totals.
    pub fn is_malformed(&self) -> bool {
        let mut seen = HashSet::new();
        self.teams.iter().any(|t| {
            !seen.insert(t.roster_id)
                || !t.points_for.is_finite()
                || !t.avg_points_per_week.is_finite()
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(roster_id: RosterId, matchup_id: Option<u32>, points: f64) -> MatchupEntry {
        MatchupEntry {
            roster_id,
            matchup_id,
            points,
        }
    }

    fn rosters(ids: &[RosterId]) -> Vec<RosterInfo> {
        ids.iter()
            .map(|&roster_id| RosterInfo {
                roster_id,
                division: None,
            })
            .collect()
    }

    #[test]
    fn records_wins_losses_and_points() {
        let weeks = vec![
            CompletedWeek {
                week: 1,
                entries: vec![
                    entry(1, Some(1), 120.5),
                    entry(2, Some(1), 98.0),
                    entry(3, Some(2), 110.0),
                    entry(4, Some(2), 111.0),
                ],
            },
            CompletedWeek {
                week: 2,
                entries: vec![
                    entry(1, Some(1), 100.0),
                    entry(3, Some(1), 90.0),
                    entry(2, Some(2), 105.0),
                    entry(4, Some(2), 104.0),
                ],
            },
        ];
        let snap = StandingsSnapshot::build(&rosters(&[1, 2, 3, 4]), &weeks);

        let t1 = snap.team(1).unwrap();
        assert_eq!((t1.wins, t1.losses, t1.ties), (2, 0, 0));
        assert!((t1.points_for - 220.5).abs() < 1e-9);
        assert!((t1.avg_points_per_week - 110.25).abs() < 1e-9);

        let t3 = snap.team(3).unwrap();
        assert_eq!((t3.wins, t3.losses), (0, 2));

        assert_eq!(snap.h2h().wins(1, 2), 1);
        assert_eq!(snap.h2h().wins(2, 1), 0);
        assert_eq!(snap.h2h().wins(4, 3), 1);
        assert_eq!(snap.h2h().wins(1, 4), 0);
    }

    #[test]
    fn equal_scores_are_ties_without_h2h() {
        let weeks = vec![CompletedWeek {
            week: 1,
            entries: vec![entry(1, Some(7), 100.0), entry(2, Some(7), 100.0)],
        }];
        let snap = StandingsSnapshot::build(&rosters(&[1, 2]), &weeks);
        assert_eq!(snap.team(1).unwrap().ties, 1);
        assert_eq!(snap.team(2).unwrap().ties, 1);
        assert!(snap.h2h().is_empty());
    }

    #[test]
    fn malformed_pairings_are_skipped_not_fatal() {
        let weeks = vec![CompletedWeek {
            week: 3,
            entries: vec![
                // three sides in one matchup
                entry(1, Some(1), 100.0),
                entry(2, Some(1), 90.0),
                entry(3, Some(1), 80.0),
                // unknown roster
                entry(4, Some(2), 100.0),
                entry(99, Some(2), 90.0),
                // bye week entry
                entry(5, None, 140.0),
                // valid
                entry(5, Some(3), 101.0),
                entry(6, Some(3), 99.0),
            ],
        }];
        let snap = StandingsSnapshot::build(&rosters(&[1, 2, 3, 4, 5, 6]), &weeks);
        assert_eq!(snap.team(1).unwrap().games_played(), 0);
        assert_eq!(snap.team(4).unwrap().games_played(), 0);
        assert_eq!(snap.team(5).unwrap().wins, 1);
        assert!((snap.team(5).unwrap().points_for - 101.0).abs() < 1e-9);
        assert_eq!(snap.team(6).unwrap().losses, 1);
    }

    #[test]
    fn zero_games_uses_baseline_average() {
        let snap = StandingsSnapshot::build(&rosters(&[1, 2]), &[]);
        assert_eq!(snap.len(), 2);
        for team in snap.teams() {
            assert_eq!(team.games_played(), 0);
            assert_eq!(team.avg_points_per_week, BASELINE_AVG_POINTS);
        }
    }

    #[test]
    fn divisions_carry_through() {
        let infos = vec![
            RosterInfo {
                roster_id: 1,
                division: Some(1),
            },
            RosterInfo {
                roster_id: 2,
                division: Some(2),
            },
        ];
        let snap = StandingsSnapshot::build(&infos, &[]);
        assert_eq!(snap.team(1).unwrap().division, Some(1));
        assert_eq!(snap.team(2).unwrap().division, Some(2));
    }

    #[test]
    fn detects_malformed_snapshot() {
        let dup = StandingsSnapshot::from_records(
            vec![
                TeamRecord::new(1, 1, 0, 0, 100.0, None),
                TeamRecord::new(1, 0, 1, 0, 90.0, None),
            ],
            HeadToHeadMatrix::new(),
        );
        assert!(dup.is_malformed());

        let nan = StandingsSnapshot::from_records(
            vec![TeamRecord::new(1, 1, 0, 0, f64::NAN, None)],
            HeadToHeadMatrix::new(),
        );
        assert!(nan.is_malformed());

        let ok = StandingsSnapshot::from_records(
            vec![TeamRecord::new(1, 1, 0, 0, 100.0, None)],
            HeadToHeadMatrix::new(),
        );
        assert!(!ok.is_malformed());
    }
}

// Season simulator: Monte Carlo completion of the remaining regular season.
//
// Each trial samples every remaining week for every team, ranks the league
// with the tie-break resolver, and tallies the #1 seed, division winners and
// playoff qualifiers. Tallies are merged across rayon workers and turned into
// percentages by the aggregator.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aggregate;
use crate::config::SimulationConfig;
use crate::error::{check_remaining_weeks, EngineError};
use crate::sampler::GameOutcomeSampler;
use crate::standings::{RosterId, StandingsSnapshot};
use crate::tiebreak::{TeamLine, TiebreakResolver};
use crate::trials::{resolve_seed, run_trials};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// League division setup as configured on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionConfig {
    pub count: u32,
}

/// Per-team projection returned by [`SeasonSimulator::simulate_season`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamPrediction {
    pub roster_id: RosterId,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: f64,
    pub one_seed_pct: f64,
    /// Present only when the league runs in divisional mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division_winner_pct: Option<f64>,
    pub make_playoffs_pct: f64,
    pub projected_wins: f64,
}

/// Per-team accumulator for one simulation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationResult {
    pub one_seed: u32,
    pub division_wins: u32,
    pub playoffs: u32,
    pub summed_wins: u64,
}

impl SimulationResult {
    pub fn merge(&mut self, other: &SimulationResult) {
        self.one_seed += other.one_seed;
        self.division_wins += other.division_wins;
        self.playoffs += other.playoffs;
        self.summed_wins += other.summed_wins;
    }
}

fn merge_tallies(mut a: Vec<SimulationResult>, b: Vec<SimulationResult>) -> Vec<SimulationResult> {
    for (acc, part) in a.iter_mut().zip(&b) {
        acc.merge(part);
    }
    a
}

// ---------------------------------------------------------------------------
// Division detection
// ---------------------------------------------------------------------------

/// Divisional mode needs more than one configured division and an assignment
/// for every team; anything else runs the league as a single table.
pub fn divisions_active(snapshot: &StandingsSnapshot, divisions: Option<&DivisionConfig>) -> bool {
    match divisions {
        Some(cfg) if cfg.count > 1 => snapshot.teams().iter().all(|t| t.division.is_some()),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct SeasonSimulator {
    config: SimulationConfig,
}

impl SeasonSimulator {
    pub fn new(config: SimulationConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(SeasonSimulator { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Project playoff, #1 seed and division odds for every team.
    ///
    /// Returns an empty list for an empty or malformed snapshot. The result is
    /// ordered by the tie-break criteria applied to current standings.
    pub fn simulate_season(
        &self,
        snapshot: &StandingsSnapshot,
        remaining_weeks: i32,
        playoff_teams: usize,
        divisions: Option<&DivisionConfig>,
    ) -> Result<Vec<TeamPrediction>, EngineError> {
        let remaining_weeks = check_remaining_weeks(remaining_weeks)?;

        if snapshot.is_empty() {
            return Ok(Vec::new());
        }
        if snapshot.is_malformed() {
            warn!("standings snapshot is malformed; returning no predictions");
            return Ok(Vec::new());
        }
        if playoff_teams > snapshot.len() {
            return Err(EngineError::TooManyPlayoffTeams {
                playoff_teams,
                teams: snapshot.len(),
            });
        }

        let divisional = divisions_active(snapshot, divisions);
        if divisions.is_some_and(|d| d.count > 1) && !divisional {
            warn!("division config present but not every team is assigned; ignoring divisions");
        }

        let resolver = TiebreakResolver::with_epsilon(snapshot.h2h(), self.config.points_epsilon);
        let trial = Trial::new(snapshot, &resolver, playoff_teams, divisional);

        let (tallies, trials) = if remaining_weeks == 0 {
            // Season over: evaluate the actual standings once.
            let mut tally = vec![SimulationResult::default(); snapshot.len()];
            let lines: Vec<TeamLine> = snapshot.teams().iter().map(TeamLine::from).collect();
            trial.tally(lines, &mut tally);
            (tally, 1)
        } else {
            let seed = resolve_seed(self.config.seed);
            let sampler = GameOutcomeSampler::new(self.config.sampler);
            info!(
                "simulating {} trials over {} remaining weeks for {} teams",
                self.config.trials,
                remaining_weeks,
                snapshot.len()
            );
            let tally = run_trials(
                self.config.trials,
                seed,
                || vec![SimulationResult::default(); snapshot.len()],
                |rng, acc| {
                    let lines = snapshot
                        .teams()
                        .iter()
                        .map(|team| {
                            let mut wins = team.wins;
                            let mut points = team.points_for;
                            for _ in 0..remaining_weeks {
                                let game = sampler.sample(team.avg_points_per_week, rng);
                                wins += u32::from(game.won);
                                points += game.points;
                            }
                            TeamLine {
                                roster_id: team.roster_id,
                                wins,
                                points_for: points,
                            }
                        })
                        .collect();
                    trial.tally(lines, acc);
                },
                merge_tallies,
            );
            (tally, self.config.trials)
        };

        debug!("simulation finished after {trials} trials");
        Ok(aggregate_predictions(snapshot, &resolver, &tallies, trials, divisional))
    }
}

// ---------------------------------------------------------------------------
// One trial's bookkeeping
// ---------------------------------------------------------------------------

struct Trial<'a> {
    snapshot: &'a StandingsSnapshot,
    resolver: &'a TiebreakResolver<'a>,
    playoff_teams: usize,
    division_ids: Vec<u32>,
}

impl<'a> Trial<'a> {
    fn new(
        snapshot: &'a StandingsSnapshot,
        resolver: &'a TiebreakResolver<'a>,
        playoff_teams: usize,
        divisional: bool,
    ) -> Self {
        let division_ids = if divisional {
            let ids: BTreeSet<u32> = snapshot.teams().iter().filter_map(|t| t.division).collect();
            ids.into_iter().collect()
        } else {
            Vec::new()
        };
        Trial {
            snapshot,
            resolver,
            playoff_teams,
            division_ids,
        }
    }

    /// Rank one trial's final lines and credit the counters. `lines` is in
    /// snapshot order on entry.
    fn tally(&self, mut lines: Vec<TeamLine>, acc: &mut [SimulationResult]) {
        for (slot, line) in acc.iter_mut().zip(&lines) {
            slot.summed_wins += u64::from(line.wins);
        }

        self.resolver.rank(&mut lines);
        let teams = self.snapshot.teams();
        let index_of = |id: RosterId| teams.iter().position(|t| t.roster_id == id);

        for (rank, line) in lines.iter().enumerate() {
            let Some(idx) = index_of(line.roster_id) else {
                continue;
            };
            if rank == 0 {
                acc[idx].one_seed += 1;
            }
            if rank < self.playoff_teams {
                acc[idx].playoffs += 1;
            }
        }

        // Division tie groups only count results between division members.
        for &division in &self.division_ids {
            let mut members: Vec<TeamLine> = lines
                .iter()
                .copied()
                .filter(|l| index_of(l.roster_id).is_some_and(|idx| teams[idx].division == Some(division)))
                .collect();
            self.resolver.rank(&mut members);
            if let Some(idx) = members.first().and_then(|l| index_of(l.roster_id)) {
                acc[idx].division_wins += 1;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

fn aggregate_predictions(
    snapshot: &StandingsSnapshot,
    resolver: &TiebreakResolver<'_>,
    tallies: &[SimulationResult],
    trials: u32,
    divisional: bool,
) -> Vec<TeamPrediction> {
    let mut predictions: Vec<TeamPrediction> = snapshot
        .teams()
        .iter()
        .zip(tallies)
        .map(|(team, tally)| TeamPrediction {
            roster_id: team.roster_id,
            wins: team.wins,
            losses: team.losses,
            ties: team.ties,
            points_for: team.points_for,
            one_seed_pct: aggregate::percent(tally.one_seed, trials),
            division_winner_pct: divisional
                .then(|| aggregate::percent(tally.division_wins, trials)),
            make_playoffs_pct: aggregate::percent(tally.playoffs, trials),
            projected_wins: aggregate::average(tally.summed_wins, trials),
        })
        .collect();

    let order = resolver.ranked_ids(
        &snapshot.teams().iter().map(TeamLine::from).collect::<Vec<_>>(),
    );
    predictions.sort_by_key(|p| order.iter().position(|&id| id == p.roster_id));
    predictions
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

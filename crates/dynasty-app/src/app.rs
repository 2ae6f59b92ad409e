// Command orchestration: load a league export, run the engine, build reports.
//
// Season predictions and draft odds are cached per league and per set of
// inputs, so repeated dashboard refreshes within the staleness window skip
// the Monte Carlo runs.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use dynasty_core::{
    DraftOddsConfig, DraftOrderAssigner, SeasonSimulator, SimulationConfig, StandingsSnapshot,
    TeamRecord,
};
use dynasty_sleeper::LeagueData;
use serde::Serialize;
use tracing::{info, warn};

use crate::cache::{CacheKey, ResultCache};
use crate::config::Config;
use crate::report::{DraftOddsReport, DraftOddsRow, PredictionReport, PredictionRow, StandingsReport};

/// Per-invocation overrides from the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub league_dir: Option<PathBuf>,
    pub trials: Option<u32>,
    pub seed: Option<u64>,
}

/// Everything besides league id and command that shapes a prediction.
#[derive(Serialize)]
struct PredictionInputs<'a> {
    simulation: &'a SimulationConfig,
    remaining_weeks: i32,
    playoff_teams: usize,
    divisions: Option<u32>,
    teams: &'a [TeamRecord],
}

#[derive(Serialize)]
struct DraftInputs<'a> {
    draft: &'a DraftOddsConfig,
    predictions: &'a PredictionReport,
    non_playoff_slots: usize,
}

pub struct Dashboard {
    config: Config,
    cache: ResultCache,
}

impl Dashboard {
    pub fn new(config: Config, cache: ResultCache) -> Self {
        Dashboard { config, cache }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load the export named on the command line, or the configured one.
    pub fn load_league(&self, options: &RunOptions) -> anyhow::Result<LeagueData> {
        let dir: &Path = match (&options.league_dir, &self.config.league.export_dir) {
            (Some(dir), _) => dir,
            (None, Some(dir)) => dir,
            (None, None) => bail!("no league export given; pass --league-dir or set league.export_dir"),
        };
        LeagueData::load(dir).with_context(|| format!("failed to load league export from {}", dir.display()))
    }

    fn simulation_config(&self, options: &RunOptions) -> SimulationConfig {
        let mut config = self.config.simulation.clone();
        if let Some(trials) = options.trials {
            config.trials = trials;
        }
        if options.seed.is_some() {
            config.seed = options.seed;
        }
        config
    }

    fn draft_config(&self, options: &RunOptions) -> DraftOddsConfig {
        let mut config = self.config.draft.clone();
        if let Some(trials) = options.trials {
            config.trials = trials;
        }
        if options.seed.is_some() {
            config.seed = options.seed;
        }
        config
    }

    /// Playoff team count: config override first, then the platform setting.
    pub fn playoff_teams(&self, data: &LeagueData) -> usize {
        self.config
            .league
            .playoff_teams
            .unwrap_or_else(|| data.playoff_teams())
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    pub fn standings(&self, data: &LeagueData) -> StandingsReport {
        StandingsReport::new(data)
    }

    pub fn predict(&self, data: &LeagueData, options: &RunOptions) -> anyhow::Result<PredictionReport> {
        let snapshot = data.snapshot();
        self.predict_with(data, &snapshot, options)
    }

    fn predict_with(
        &self,
        data: &LeagueData,
        snapshot: &StandingsSnapshot,
        options: &RunOptions,
    ) -> anyhow::Result<PredictionReport> {
        let simulation = self.simulation_config(options);
        let remaining_weeks = data.remaining_weeks();
        let playoff_teams = self.playoff_teams(data);
        let divisions = data.division_config();

        let key = CacheKey::new(
            data.league_id(),
            "predict",
            &PredictionInputs {
                simulation: &simulation,
                remaining_weeks,
                playoff_teams,
                divisions: divisions.map(|d| d.count),
                teams: snapshot.teams(),
            },
        )?;
        if let Some(report) = self.cache.get::<PredictionReport>(&key) {
            info!("using cached predictions for league {}", data.league_id());
            return Ok(report);
        }

        let trials = simulation.trials;
        let simulator = SeasonSimulator::new(simulation).context("invalid simulation settings")?;
        let predictions = simulator
            .simulate_season(snapshot, remaining_weeks, playoff_teams, divisions.as_ref())
            .context("season simulation failed")?;
        if predictions.is_empty() && !snapshot.is_empty() {
            warn!("standings could not be simulated; check the export for duplicate rosters");
        }

        let report = PredictionReport {
            league: data.name().to_string(),
            remaining_weeks,
            playoff_teams,
            trials: if remaining_weeks == 0 { 1 } else { trials },
            teams: predictions
                .into_iter()
                .map(|p| PredictionRow {
                    team_name: data.team_name(p.roster_id),
                    prediction: p,
                })
                .collect(),
        };
        self.store(&key, &report);
        Ok(report)
    }

    pub fn draft_odds(&self, data: &LeagueData, options: &RunOptions) -> anyhow::Result<DraftOddsReport> {
        let snapshot = data.snapshot();
        let predictions = self.predict_with(data, &snapshot, options)?;
        let draft = self.draft_config(options);
        let total_teams = snapshot.len();
        let playoff_teams = self.playoff_teams(data);
        if playoff_teams > total_teams {
            bail!("league has {total_teams} teams but {playoff_teams} playoff spots");
        }
        let non_playoff_slots = total_teams - playoff_teams;

        let key = CacheKey::new(
            data.league_id(),
            "draft-odds",
            &DraftInputs {
                draft: &draft,
                predictions: &predictions,
                non_playoff_slots,
            },
        )?;
        if let Some(report) = self.cache.get::<DraftOddsReport>(&key) {
            info!("using cached draft odds for league {}", data.league_id());
            return Ok(report);
        }

        let lottery = draft.lottery;
        let assigner = DraftOrderAssigner::new(draft).context("invalid draft settings")?;
        let team_predictions: Vec<_> = predictions.teams.iter().map(|t| t.prediction.clone()).collect();
        let odds = assigner
            .assign_draft_order(
                &snapshot,
                &team_predictions,
                total_teams,
                non_playoff_slots,
                predictions.remaining_weeks,
            )
            .context("draft order assignment failed")?;

        let report = DraftOddsReport {
            league: data.name().to_string(),
            remaining_weeks: predictions.remaining_weeks,
            non_playoff_slots,
            lottery,
            teams: odds
                .iter()
                .map(|o| DraftOddsRow::new(o, data.team_name(o.roster_id)))
                .collect(),
        };
        self.store(&key, &report);
        Ok(report)
    }

    fn store<T: Serialize>(&self, key: &CacheKey, report: &T) {
        if let Err(e) = self.cache.put(key, report) {
            warn!("failed to cache result: {e}");
        }
    }
}

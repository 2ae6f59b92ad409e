// Configuration loading and parsing (league.toml, engine.toml).

use dynasty_core::{DraftOddsConfig, EligibilityPolicy, EngineError, SamplerConfig, SimulationConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

impl From<EngineError> for ConfigError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidConfig { field, message } => {
                ConfigError::ValidationError { field, message }
            }
            other => ConfigError::ValidationError {
                field: "engine".into(),
                message: other.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub simulation: SimulationConfig,
    pub draft: DraftOddsConfig,
    pub cache: CacheConfig,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    /// Export directory used when a command is run without `--league-dir`.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
    /// Overrides the platform's playoff team count.
    #[serde(default)]
    pub playoff_teams: Option<usize>,
    /// Weighted lottery for the non-playoff block of the draft.
    #[serde(default)]
    pub draft_lottery: bool,
}

// ---------------------------------------------------------------------------
// engine.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire engine.toml file.
#[derive(Debug, Clone, Deserialize)]
struct EngineFile {
    simulation: SimulationSection,
    #[serde(default)]
    sampler: SamplerConfig,
    draft: DraftSection,
    #[serde(default)]
    cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct SimulationSection {
    trials: u32,
    #[serde(default)]
    seed: Option<u64>,
    points_epsilon: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct DraftSection {
    trials: u32,
    postseason_trials: u32,
    #[serde(default)]
    seed: Option<u64>,
    points_noise_fraction: f64,
    wins_noise: f64,
    slot_floor_pct: f64,
    #[serde(default)]
    eligibility: EligibilityPolicy,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Results older than this are recomputed.
    pub max_age_secs: u64,
    /// Defaults to the platform cache directory.
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            enabled: true,
            max_age_secs: 300,
            dir: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/engine.toml` relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    let league_path = config_dir.join("league.toml");
    let league_file: LeagueFile = parse_file(&league_path)?;
    let league = league_file.league;

    let engine_path = config_dir.join("engine.toml");
    let engine: EngineFile = parse_file(&engine_path)?;

    let simulation = SimulationConfig {
        trials: engine.simulation.trials,
        seed: engine.simulation.seed,
        points_epsilon: engine.simulation.points_epsilon,
        sampler: engine.sampler,
    };
    let draft = DraftOddsConfig {
        trials: engine.draft.trials,
        postseason_trials: engine.draft.postseason_trials,
        seed: engine.draft.seed,
        points_noise_fraction: engine.draft.points_noise_fraction,
        wins_noise: engine.draft.wins_noise,
        slot_floor_pct: engine.draft.slot_floor_pct,
        lottery: league.draft_lottery,
        eligibility: engine.draft.eligibility,
    };

    let config = Config {
        league,
        simulation,
        draft,
        cache: engine.cache,
    };

    validate(&config)?;

    Ok(config)
}

/// Files under `config/` that a run reads, each with a shipped copy in
/// `defaults/`.
pub const CONFIG_FILES: [&str; 2] = ["league.toml", "engine.toml"];

/// Where a run started from `base_dir` writes its log.
pub fn log_file_path(base_dir: &Path) -> PathBuf {
    base_dir.join("logs").join("dynasty.log")
}

/// Copy each of [`CONFIG_FILES`] missing from `config/` out of `defaults/`.
/// Files the user already has are never touched. Returns the copied paths.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");
    let copy_error = |message: String| ConfigError::DefaultsCopyError { message };

    let missing: Vec<&str> = CONFIG_FILES
        .into_iter()
        .filter(|file| !config_dir.join(file).is_file())
        .collect();
    if missing.is_empty() {
        return Ok(Vec::new());
    }

    if let Some(file) = missing.iter().find(|file| !defaults_dir.join(file).is_file()) {
        return Err(copy_error(format!(
            "config/{file} is missing and {} has no default for it; \
             pass --config-dir pointing at a directory with config/ or defaults/",
            defaults_dir.display()
        )));
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_error(format!("failed to create {}: {e}", config_dir.display())))?;

    let mut copied = Vec::with_capacity(missing.len());
    for file in missing {
        let target = config_dir.join(file);
        std::fs::copy(defaults_dir.join(file), &target)
            .map_err(|e| copy_error(format!("failed to write {}: {e}", target.display())))?;
        info!("created {} from defaults", target.display());
        copied.push(target);
    }

    Ok(copied)
}

/// Copy missing defaults, then load everything under `base_dir`.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.name.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.name".into(),
            message: "must not be empty".into(),
        });
    }

    if config.league.playoff_teams == Some(0) {
        return Err(ConfigError::ValidationError {
            field: "league.playoff_teams".into(),
            message: "must be > 0 when set".into(),
        });
    }

    config.simulation.validate()?;
    config.draft.validate()?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

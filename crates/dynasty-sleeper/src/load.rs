// Reading an exported Sleeper league from disk.
//
// Layout of an export directory:
//
//   league.json
//   rosters.json
//   users.json
//   matchups/week_1.json, week_2.json, ...
//
// The matchups directory is optional; a league exported before week 1 has
// none.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::types::{RawLeague, RawMatchup, RawRoster, RawUser};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SleeperError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Export bundle
// ---------------------------------------------------------------------------

/// Matchup payload for one week.
#[derive(Debug, Clone)]
pub struct WeekMatchups {
    pub week: u32,
    pub matchups: Vec<RawMatchup>,
}

/// Every payload of one exported league, unprocessed.
#[derive(Debug, Clone)]
pub struct LeagueExport {
    pub league: RawLeague,
    pub rosters: Vec<RawRoster>,
    pub users: Vec<RawUser>,
    /// Sorted by week.
    pub weeks: Vec<WeekMatchups>,
}

impl LeagueExport {
    /// Load an export directory. Any unreadable or malformed file fails the
    /// whole load.
    pub fn load(dir: &Path) -> Result<Self, SleeperError> {
        let league: RawLeague = read_json(&dir.join("league.json"))?;
        let rosters: Vec<RawRoster> = read_json(&dir.join("rosters.json"))?;
        let users: Vec<RawUser> = read_json(&dir.join("users.json"))?;
        let weeks = load_weeks(&dir.join("matchups"))?;

        info!(
            "loaded league '{}' from {}: {} rosters, {} users, {} matchup weeks",
            league.name,
            dir.display(),
            rosters.len(),
            users.len(),
            weeks.len()
        );

        Ok(LeagueExport {
            league,
            rosters,
            users,
            weeks,
        })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SleeperError> {
    let text = fs::read_to_string(path).map_err(|source| SleeperError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| SleeperError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Week number from a `week_<n>.json` file name.
fn week_number(file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix("week_")?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

fn load_weeks(dir: &Path) -> Result<Vec<WeekMatchups>, SleeperError> {
    if !dir.is_dir() {
        debug!("no matchups directory at {}", dir.display());
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir).map_err(|source| SleeperError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut weeks = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SleeperError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name();
        let Some(week) = name.to_str().and_then(week_number) else {
            debug!("skipping {:?} in matchups directory", name);
            continue;
        };
        let matchups: Vec<RawMatchup> = read_json(&entry.path())?;
        weeks.push(WeekMatchups { week, matchups });
    }
    weeks.sort_by_key(|w| w.week);
    Ok(weeks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_numbers_parse_from_file_names() {
        assert_eq!(week_number("week_1.json"), Some(1));
        assert_eq!(week_number("week_14.json"), Some(14));
        assert_eq!(week_number("week_x.json"), None);
        assert_eq!(week_number("week_3.json.bak"), None);
        assert_eq!(week_number("notes.txt"), None);
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let err = LeagueExport::load(Path::new("/nonexistent/dynasty/export")).unwrap_err();
        assert!(matches!(err, SleeperError::Io { .. }));
        assert!(err.to_string().contains("league.json"));
    }

    #[test]
    fn missing_matchups_directory_means_no_weeks() {
        let weeks = load_weeks(Path::new("/nonexistent/dynasty/matchups")).unwrap();
        assert!(weeks.is_empty());
    }
}

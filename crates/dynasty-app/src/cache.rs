// Result cache: JSON files of previously computed reports, keyed by league,
// command and the tunables that shaped the result.
//
// Entries carry their creation time; anything older than the configured
// window is treated as a miss and recomputed by the caller.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::config::CacheConfig;

/// Upper bound on the staleness window (one year).
const MAX_AGE_CAP_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize cache entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Identifies one cached result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    league_id: String,
    command: String,
    fingerprint: String,
}

impl CacheKey {
    /// `params` is everything besides the league and command that changes the
    /// output: trial counts, seeds, tunables, the export's scored week.
    /// The fingerprint is the first 8 bytes of a SHA-256 over the params'
    /// JSON, so file names stay the same across toolchain upgrades.
    pub fn new<P: Serialize>(league_id: &str, command: &str, params: &P) -> Result<Self, CacheError> {
        let encoded = serde_json::to_vec(params)?;
        let digest = Sha256::digest(&encoded);
        Ok(CacheKey {
            league_id: league_id.to_string(),
            command: command.to_string(),
            fingerprint: hex::encode(&digest[..8]),
        })
    }

    fn file_name(&self) -> String {
        let league: String = self
            .league_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("{}-{}-{}.json", league, self.command, self.fingerprint)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    created_at: DateTime<Utc>,
    payload: T,
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ResultCache {
    dir: Option<PathBuf>,
    max_age: Duration,
}

impl ResultCache {
    pub fn from_config(config: &CacheConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        let dir = config.dir.clone().or_else(default_cache_dir);
        if dir.is_none() {
            warn!("no cache directory available; caching disabled");
        }
        ResultCache {
            dir,
            max_age: Duration::seconds(
                i64::try_from(config.max_age_secs)
                    .unwrap_or(MAX_AGE_CAP_SECS)
                    .min(MAX_AGE_CAP_SECS),
            ),
        }
    }

    pub fn in_dir(dir: &Path, max_age_secs: i64) -> Self {
        ResultCache {
            dir: Some(dir.to_path_buf()),
            max_age: Duration::seconds(max_age_secs.clamp(0, MAX_AGE_CAP_SECS)),
        }
    }

    pub fn disabled() -> Self {
        ResultCache {
            dir: None,
            max_age: Duration::zero(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    /// Fresh cached payload for `key`, if any.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        self.get_at(key, Utc::now())
    }

    fn get_at<T: DeserializeOwned>(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<T> {
        let path = self.dir.as_ref()?.join(key.file_name());
        let text = fs::read_to_string(&path).ok()?;
        let entry: CacheEntry<T> = match serde_json::from_str(&text) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("ignoring unreadable cache entry {}: {}", path.display(), e);
                return None;
            }
        };
        let age = now - entry.created_at;
        if age > self.max_age {
            debug!("cache entry {} is stale ({}s old)", path.display(), age.num_seconds());
            return None;
        }
        debug!("cache hit {}", path.display());
        Some(entry.payload)
    }

    /// Store `payload` under `key`. A disabled cache accepts and drops it.
    pub fn put<T: Serialize>(&self, key: &CacheKey, payload: &T) -> Result<(), CacheError> {
        self.put_at(key, payload, Utc::now())
    }

    fn put_at<T: Serialize>(
        &self,
        key: &CacheKey,
        payload: &T,
        created_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        let Some(dir) = &self.dir else {
            return Ok(());
        };
        fs::create_dir_all(dir).map_err(|source| CacheError::Io {
            path: dir.clone(),
            source,
        })?;
        let path = dir.join(key.file_name());
        let text = serde_json::to_string(&CacheEntry {
            created_at,
            payload,
        })?;
        fs::write(&path, text).map_err(|source| CacheError::Io { path, source })
    }
}

fn default_cache_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "dynasty").map(|dirs| dirs.cache_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dynasty_cache_{name}"));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn key(command: &str, trials: u32) -> CacheKey {
        CacheKey::new("league-1", command, &trials).unwrap()
    }

    #[test]
    fn round_trip_within_window() {
        let dir = scratch("round_trip");
        let cache = ResultCache::in_dir(&dir, 300);
        cache.put(&key("predict", 100), &vec![1.5, 2.5]).unwrap();
        let hit: Option<Vec<f64>> = cache.get(&key("predict", 100));
        assert_eq!(hit, Some(vec![1.5, 2.5]));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn stale_entries_miss() {
        let dir = scratch("stale");
        let cache = ResultCache::in_dir(&dir, 300);
        let then = Utc::now() - Duration::seconds(301);
        cache.put_at(&key("predict", 100), &7u32, then).unwrap();
        assert_eq!(cache.get::<u32>(&key("predict", 100)), None);
        assert_eq!(
            cache.get_at::<u32>(&key("predict", 100), then + Duration::seconds(10)),
            Some(7)
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn different_params_are_different_entries() {
        let dir = scratch("params");
        let cache = ResultCache::in_dir(&dir, 300);
        cache.put(&key("predict", 100), &1u32).unwrap();
        assert_eq!(cache.get::<u32>(&key("predict", 200)), None);
        assert_eq!(cache.get::<u32>(&key("draft-odds", 100)), None);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn corrupt_entry_is_a_miss() {
        let dir = scratch("corrupt");
        fs::create_dir_all(&dir).unwrap();
        let k = key("predict", 1);
        fs::write(dir.join(k.file_name()), "{ not json").unwrap();
        let cache = ResultCache::in_dir(&dir, 300);
        assert_eq!(cache.get::<u32>(&k), None);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn disabled_cache_never_hits() {
        let cache = ResultCache::disabled();
        assert!(!cache.is_enabled());
        cache.put(&key("predict", 1), &1u32).unwrap();
        assert_eq!(cache.get::<u32>(&key("predict", 1)), None);
    }

    #[test]
    fn file_names_are_filesystem_safe() {
        let k = CacheKey::new("a/b:c", "standings", &()).unwrap();
        let name = k.file_name();
        assert!(name.starts_with("a_b_c-standings-"));
        assert!(name.ends_with(".json"));
    }

    #[test]
    fn file_names_are_stable_across_builds() {
        // SHA-256 of the JSON "100", first 8 bytes
        assert_eq!(key("predict", 100).file_name(), "league_1-predict-ad57366865126e55.json");
    }
}

//! Runtime settings read from the environment once at startup.

use std::env;
use std::path::PathBuf;

use crate::data::DEFAULT_CREATURES_PATH;

pub const BIND_ENV: &str = "BESTIARY_BIND";
pub const DATA_ENV: &str = "BESTIARY_DATA";
pub const WORKERS_ENV: &str = "BESTIARY_WORKERS";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub data_path: PathBuf,
    /// Matchup worker threads; 0 means every core.
    pub workers: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            data_path: PathBuf::from(DEFAULT_CREATURES_PATH),
            workers: 0,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            bind_addr: non_blank(BIND_ENV).unwrap_or(defaults.bind_addr),
            data_path: non_blank(DATA_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            workers: non_blank(WORKERS_ENV)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.workers),
        }
    }
}

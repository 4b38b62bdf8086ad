//! Settings shared by recognition and word ranking.

use crate::dictionary::Dictionary;
use crate::solver::Strategy;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// All tunables in one place. Every field has a default, so a JSON config only needs to name
/// the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Folder holding one template folder per category
    pub template_dir: PathBuf,
    /// Per channel colour tolerance for region detection
    pub color_tolerance: u8,
    /// Minimum tile area; pixels, or a fraction of the image area when in `[0, 1]`
    pub tile_min_area: f64,
    /// Tiles lie below this fraction of the image height
    pub tile_top_fraction: f64,
    /// Tiles keep this distance from the bottom edge; pixels or fraction
    pub tile_bottom_margin: f64,
    pub slot_min_area: f64,
    /// Inset from every edge for board slots; pixels or fraction
    pub slot_margin: f64,
    /// When set, annotated screenshots and region previews are written here
    pub debug_dir: Option<PathBuf>,
    /// Maximum number of dictionary queries in flight
    pub concurrency: usize,
    pub fetch_attempts: u32,
    /// Pause between attempts, in milliseconds
    pub fetch_delay_ms: u64,
    pub dictionary: Dictionary,
    pub strategy: Strategy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            template_dir: PathBuf::from("templates"),
            color_tolerance: 10,
            tile_min_area: 2000.0,
            tile_top_fraction: 0.5,
            tile_bottom_margin: 0.0,
            slot_min_area: 2000.0,
            slot_margin: 0.02,
            debug_dir: None,
            concurrency: 5,
            fetch_attempts: 3,
            fetch_delay_ms: 1000,
            dictionary: Dictionary::Yawl,
            strategy: Strategy::Bold97,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a JSON config file. Unknown dictionary or strategy names are rejected here.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Config, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::ConfigReadError {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| Error::ConfigParseError {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn with_template_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.template_dir = dir.into();
        self
    }

    pub fn with_debug_dir<P: Into<PathBuf>>(mut self, dir: Option<P>) -> Self {
        self.debug_dir = dir.map(Into::into);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_fetch_retry(mut self, attempts: u32, delay_ms: u64) -> Self {
        self.fetch_attempts = attempts;
        self.fetch_delay_ms = delay_ms;
        self
    }

    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }
}

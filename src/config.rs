// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::browse::DEFAULT_BROWSE_ROWS;
use crate::drilldown::{DrilldownLimits, DEFAULT_DETAIL_ROWS, DEFAULT_TABLE_ROWS};
use crate::keywords::{
    KeywordExtractor, KeywordParams, Stopwords, WindowScan, DEFAULT_CHART_N, DEFAULT_MAX_WINDOW,
    DEFAULT_MIN_FREQUENCY, DEFAULT_MIN_WINDOW, DEFAULT_TOP_N,
};

pub const ENV_CONFIG_PATH: &str = "DASHBOARD_CONFIG_PATH";
pub const ENV_DATA_PATH: &str = "REVIEWS_DATA_PATH";
pub const ENV_DEBUG_ROUTES: &str = "DASHBOARD_DEBUG_ROUTES";

pub const DEFAULT_CONFIG_PATH: &str = "config/dashboard.toml";
pub const DEFAULT_DATA_PATH: &str = "data/reviews.csv";

fn default_data_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_PATH)
}
fn default_min_frequency() -> usize {
    DEFAULT_MIN_FREQUENCY
}
fn default_min_window() -> usize {
    DEFAULT_MIN_WINDOW
}
fn default_max_window() -> usize {
    DEFAULT_MAX_WINDOW
}
fn default_top_n() -> usize {
    DEFAULT_TOP_N
}
fn default_chart_n() -> usize {
    DEFAULT_CHART_N
}
fn default_table_rows() -> usize {
    DEFAULT_TABLE_ROWS
}
fn default_detail_rows() -> usize {
    DEFAULT_DETAIL_ROWS
}
fn default_browse_rows() -> usize {
    DEFAULT_BROWSE_ROWS
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// CSV snapshot the store is built from.
    pub data_path: PathBuf,
    pub keywords: KeywordsConfig,
    pub drilldown: DrilldownConfig,
    pub browse: BrowseConfig,
    /// Mounts `/metrics`.
    pub debug_routes: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            keywords: KeywordsConfig::default(),
            drilldown: DrilldownConfig::default(),
            browse: BrowseConfig::default(),
            debug_routes: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordsConfig {
    #[serde(default = "default_min_frequency")]
    pub min_frequency: usize,
    #[serde(default = "default_min_window")]
    pub min_window: usize,
    #[serde(default = "default_max_window")]
    pub max_window: usize,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_chart_n")]
    pub chart_n: usize,
    #[serde(default)]
    pub extra_stopwords: Vec<String>,
}

impl Default for KeywordsConfig {
    fn default() -> Self {
        Self {
            min_frequency: default_min_frequency(),
            min_window: default_min_window(),
            max_window: default_max_window(),
            top_n: default_top_n(),
            chart_n: default_chart_n(),
            extra_stopwords: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DrilldownConfig {
    #[serde(default = "default_table_rows")]
    pub table_rows: usize,
    #[serde(default = "default_detail_rows")]
    pub detail_rows: usize,
}

impl Default for DrilldownConfig {
    fn default() -> Self {
        Self {
            table_rows: default_table_rows(),
            detail_rows: default_detail_rows(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrowseConfig {
    #[serde(default = "default_browse_rows")]
    pub rows: usize,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            rows: default_browse_rows(),
        }
    }
}

impl DashboardConfig {
    /// Parse one TOML file, then sanitize. No env overrides here.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading dashboard config from {}", path.display()))?;
        let cfg: DashboardConfig = toml::from_str(&content)
            .with_context(|| format!("parsing dashboard config {}", path.display()))?;
        Ok(cfg.sanitized())
    }

    /// Load config using env var + fallbacks:
    /// 1) $DASHBOARD_CONFIG_PATH
    /// 2) config/dashboard.toml
    /// 3) built-in defaults
    ///
    /// then apply `REVIEWS_DATA_PATH` / `DASHBOARD_DEBUG_ROUTES`.
    pub fn load_default() -> Result<Self> {
        let base = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!(
                    "{ENV_CONFIG_PATH} points to non-existent path {}",
                    pb.display()
                ));
            }
            Self::load_from(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from(&default_p)?
            } else {
                info!("no dashboard config file, using defaults");
                Self::default()
            }
        };
        Ok(base.with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(p) = std::env::var(ENV_DATA_PATH) {
            if !p.trim().is_empty() {
                self.data_path = PathBuf::from(p.trim());
            }
        }
        if let Ok(v) = std::env::var(ENV_DEBUG_ROUTES) {
            self.debug_routes = v.trim() == "1";
        }
        self
    }

    fn sanitized(mut self) -> Self {
        let k = &mut self.keywords;
        if k.min_frequency == 0 {
            warn!("keywords.min_frequency must be >= 1, using default");
            k.min_frequency = default_min_frequency();
        }
        if k.min_window == 0 {
            warn!("keywords.min_window must be >= 1, using default");
            k.min_window = default_min_window();
        }
        if k.max_window < k.min_window {
            warn!(
                min_window = k.min_window,
                max_window = k.max_window,
                "keywords.max_window below min_window, clamping"
            );
            k.max_window = k.min_window.max(default_max_window());
        }
        if k.top_n == 0 {
            k.top_n = default_top_n();
        }
        if k.chart_n == 0 {
            k.chart_n = default_chart_n();
        }
        if self.drilldown.table_rows == 0 {
            self.drilldown.table_rows = default_table_rows();
        }
        if self.browse.rows == 0 {
            self.browse.rows = default_browse_rows();
        }
        self
    }

    pub fn drilldown_limits(&self) -> DrilldownLimits {
        DrilldownLimits {
            table_rows: self.drilldown.table_rows,
            detail_rows: self.drilldown.detail_rows,
        }
    }

    pub fn keyword_extractor(&self) -> KeywordExtractor {
        let k = &self.keywords;
        KeywordExtractor::new(
            KeywordParams {
                min_frequency: k.min_frequency,
                top_n: k.top_n,
                chart_n: k.chart_n,
            },
            Stopwords::builtin().extend(&k.extra_stopwords),
            WindowScan {
                min: k.min_window,
                max: k.max_window,
            },
        )
    }
}

//! Configuration file support for flag-id.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/flag-id/config.toml` (lowest priority)
//! - Project-local: `.flag-id.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use flag_id_core::{BucketCount, EdgeConfig, Error};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Reference corpus settings.
    pub corpus: CorpusConfig,
    /// Match cascade settings.
    pub matching: MatchingConfig,
    /// Edge detection settings.
    pub edges: EdgesConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
}

/// Reference corpus configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Directory holding one image per reference flag.
    pub dir: Option<PathBuf>,
    /// Also read flags from subdirectories of `dir`.
    pub recursive: Option<bool>,
}

/// Match cascade configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Buckets per color channel (power of two, 1-256).
    pub buckets_per_dimension: Option<u16>,
    /// Neighbor bucket radius for retrieval (0 = exact bucket only).
    pub neighbor_radius: Option<u8>,
    /// Dominant-color ratio tolerance.
    pub ratio_tolerance: Option<f32>,
    /// Edge-density tolerance.
    pub edge_tolerance: Option<f32>,
    /// Tolerance mode: "absolute" or "relative".
    pub tolerance_mode: Option<String>,
    /// Resize images to this height before edge detection.
    pub normalize_height: Option<u32>,
}

/// Edge detection configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct EdgesConfig {
    /// Gaussian kernel size (odd).
    pub kernel_size: Option<u32>,
    /// Gaussian standard deviation.
    pub gaussian_deviation: Option<f32>,
    /// Canny low threshold.
    pub threshold_low: Option<f32>,
    /// Canny high threshold.
    pub threshold_high: Option<f32>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/flag-id/config.toml`
    /// 2. Project-local: `.flag-id.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored, unreadable or malformed ones are
    /// logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if a merged value is out of range.
    pub fn load() -> Result<Self, Error> {
        let mut config = Self::default();

        // Load XDG config (lowest priority)
        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        // Load project-local config (higher priority, merged)
        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        config.validate().map_err(Error::InvalidConfiguration)?;
        Ok(config)
    }

    /// Validate configuration values are within acceptable ranges.
    fn validate(&self) -> Result<(), String> {
        if let Some(b) = self.matching.buckets_per_dimension {
            BucketCount::new(b).map_err(|_| {
                format!("matching.buckets_per_dimension must be a power of two in 1-256, got {b}")
            })?;
        }
        for (name, value) in [
            ("matching.ratio_tolerance", self.matching.ratio_tolerance),
            ("matching.edge_tolerance", self.matching.edge_tolerance),
        ] {
            if let Some(t) = value {
                if !t.is_finite() || t < 0.0 {
                    return Err(format!("{name} must be a finite value >= 0, got {t}"));
                }
            }
        }
        if let Some(ref mode) = self.matching.tolerance_mode {
            if mode != "absolute" && mode != "relative" {
                return Err(format!(
                    "matching.tolerance_mode must be 'absolute' or 'relative', got '{mode}'"
                ));
            }
        }

        let edges = self.edge_config(None);
        edges.validate().map_err(|e| match e {
            Error::InvalidConfiguration(msg) => msg,
            other => other.to_string(),
        })?;
        if self.matching.normalize_height == Some(0) {
            return Err("matching.normalize_height must be positive".to_string());
        }

        // Output format validation
        if let Some(ref f) = self.output.format {
            if f != "json" && f != "jsonl" {
                return Err(format!(
                    "output.format must be 'json' or 'jsonl', got '{f}'"
                ));
            }
        }

        Ok(())
    }

    /// Edge detection settings with hardcoded fallbacks.
    pub fn edge_config(&self, normalize_height: Option<u32>) -> EdgeConfig {
        let defaults = EdgeConfig::default();
        EdgeConfig {
            kernel_size: self.edges.kernel_size.unwrap_or(defaults.kernel_size),
            gaussian_deviation: self
                .edges
                .gaussian_deviation
                .unwrap_or(defaults.gaussian_deviation),
            threshold_low: self.edges.threshold_low.unwrap_or(defaults.threshold_low),
            threshold_high: self.edges.threshold_high.unwrap_or(defaults.threshold_high),
            normalize_height,
        }
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        // General
        self.general.recursive = other.general.recursive.or(self.general.recursive);

        // Corpus
        self.corpus.dir = other.corpus.dir.or_else(|| self.corpus.dir.take());
        self.corpus.recursive = other.corpus.recursive.or(self.corpus.recursive);

        // Matching
        let m = other.matching;
        self.matching.buckets_per_dimension = m
            .buckets_per_dimension
            .or(self.matching.buckets_per_dimension);
        self.matching.neighbor_radius = m.neighbor_radius.or(self.matching.neighbor_radius);
        self.matching.ratio_tolerance = m.ratio_tolerance.or(self.matching.ratio_tolerance);
        self.matching.edge_tolerance = m.edge_tolerance.or(self.matching.edge_tolerance);
        self.matching.tolerance_mode = m
            .tolerance_mode
            .or_else(|| self.matching.tolerance_mode.take());
        self.matching.normalize_height = m.normalize_height.or(self.matching.normalize_height);

        // Edges
        self.edges.kernel_size = other.edges.kernel_size.or(self.edges.kernel_size);
        self.edges.gaussian_deviation = other
            .edges
            .gaussian_deviation
            .or(self.edges.gaussian_deviation);
        self.edges.threshold_low = other.edges.threshold_low.or(self.edges.threshold_low);
        self.edges.threshold_high = other.edges.threshold_high.or(self.edges.threshold_high);

        // Output
        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("flag-id").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.flag-id.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".flag-id.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::badge::{Palette, Thresholds, DEFAULT_PALETTE};
use crate::coverage::MetricKind;

pub const CONFIG_FILE: &str = "shield-badge.toml";
pub const DEFAULT_OUTPUT_FILE: &str = "coverage.shield.badge.md";
pub const DEFAULT_SUBJECT: &str = "coverage";

static README_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)readme\.md").expect("readme regex is valid"));

/// Reporter options as written in `shield-badge.toml` or given on the command line.
///
/// Every key is optional; `ReporterConfig::from_options` fills in defaults.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "snake_case")]
pub struct ReporterOptions {
    /// Output directory for the badge file
    pub dir: Option<PathBuf>,
    /// Badge file name
    pub file: Option<String>,
    /// Badge subject text
    pub subject: Option<String>,
    /// lines, statements, functions or branches
    pub coverage_type: Option<String>,
    /// `[low, high]` thresholds
    pub range: Option<Vec<f64>>,
    /// Must look like `README.md` (any case) to enable patching
    pub readme_filename: Option<String>,
    pub readme_dir: Option<PathBuf>,
}

impl ReporterOptions {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_optional(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Overlay every option set in `other` on top of `self`
    pub fn merge(self, other: ReporterOptions) -> Self {
        Self {
            dir: other.dir.or(self.dir),
            file: other.file.or(self.file),
            subject: other.subject.or(self.subject),
            coverage_type: other.coverage_type.or(self.coverage_type),
            range: other.range.or(self.range),
            readme_filename: other.readme_filename.or(self.readme_filename),
            readme_dir: other.readme_dir.or(self.readme_dir),
        }
    }
}

/// Validated reporter configuration, immutable after construction
#[derive(Debug, Clone, PartialEq)]
pub struct ReporterConfig {
    pub dir: PathBuf,
    pub file: String,
    pub subject: String,
    pub coverage_type: MetricKind,
    pub thresholds: Thresholds,
    pub palette: Palette,
    pub readme_filename: Option<String>,
    pub readme_dir: Option<PathBuf>,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self::from_options(ReporterOptions::default())
    }
}

impl ReporterConfig {
    pub fn from_options(opts: ReporterOptions) -> Self {
        let coverage_type = opts
            .coverage_type
            .as_deref()
            .map(MetricKind::parse_lenient)
            .unwrap_or_default();

        let thresholds = match opts.range.as_deref() {
            None => Thresholds::DEFAULT,
            Some(&[low, high]) => Thresholds::new(low, high).unwrap_or_else(|| {
                warn!(low, high, "invalid badge range, using [50, 80]");
                Thresholds::DEFAULT
            }),
            Some(other) => {
                warn!(?other, "badge range must have two values, using [50, 80]");
                Thresholds::DEFAULT
            }
        };

        let readme_filename = opts.readme_filename.filter(|name| README_RE.is_match(name));

        Self {
            dir: non_empty_path(opts.dir).unwrap_or_else(current_dir),
            file: non_empty(opts.file).unwrap_or_else(|| DEFAULT_OUTPUT_FILE.to_string()),
            subject: non_empty(opts.subject).unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            coverage_type,
            thresholds,
            palette: DEFAULT_PALETTE,
            readme_filename,
            readme_dir: non_empty_path(opts.readme_dir),
        }
    }

    /// Where the badge artifact is written
    pub fn output_path(&self) -> PathBuf {
        self.dir.join(&self.file)
    }

    /// README to patch, `None` when the feature is disabled
    pub fn readme_path(&self) -> Option<PathBuf> {
        let filename = self.readme_filename.as_ref()?;
        let base = self.readme_dir.clone().unwrap_or_else(current_dir);
        Some(base.join(filename))
    }
}

// Empty values count as unset
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn non_empty_path(value: Option<PathBuf>) -> Option<PathBuf> {
    value.filter(|p| !p.as_os_str().is_empty())
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

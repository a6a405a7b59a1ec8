//! shield-badge - coverage shield badges for your README
//!
//! A library for turning coverage reports into shields.io badges:
//! - Color-tiered badge url and markdown from a coverage percentage
//! - Idempotent badge insertion/update in a markdown document
//! - LCOV, Cobertura and istanbul json-summary parsing
//! - A registrable reporter that writes the badge file and patches the README

pub mod badge;
pub mod config;
pub mod coverage;
pub mod patch;
pub mod reporter;
pub mod store;

pub use badge::{badge_markdown, badge_url, Badge, ColorTier, Palette, Thresholds};
pub use config::{ReporterConfig, ReporterOptions};
pub use coverage::{parse_coverage, CoverageData, CoverageFormat, CoverageSummary, Metric, MetricKind};
pub use patch::{patch, patch_file, PatchOutcome, PatchResult};
pub use reporter::{Artifact, Report, ReportRegistry, ShieldBadgeReporter};
pub use store::{FileStore, TokioFileStore};

//! Shield badge reporter and the registry reporters plug into

use anyhow::{Context, Result};
use async_trait::async_trait;
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::badge::Badge;
use crate::config::ReporterConfig;
use crate::coverage::CoverageSummary;
use crate::patch::{patch_file, PatchResult};
use crate::store::{FileStore, TokioFileStore};

pub const README_NOT_CONFIGURED: &str =
    "The readmeFilename config property was not set (or not set properly)";

/// A report that turns a merged coverage summary into an artifact
#[async_trait]
pub trait Report: Send + Sync {
    fn identifier(&self) -> &'static str;

    fn synopsis(&self) -> String;

    async fn produce_artifact(&self, summary: &CoverageSummary) -> Result<Artifact>;
}

/// What a report produced
#[derive(Debug, Clone)]
pub struct Artifact {
    pub path: PathBuf,
    pub badge: Badge,
    /// README name for messages, when configured
    pub readme_filename: Option<String>,
    pub readme: PatchResult,
}

impl Artifact {
    pub fn print_summary(&self) {
        println!("  {} {}", "badge:".dimmed(), self.path.display().to_string().green());
        println!("  {} {}", "url:".dimmed(), self.badge.url);
        println!("  {} {}", "markdown:".dimmed(), self.badge.markdown);

        let Some(ref readme) = self.readme_filename else {
            return;
        };

        if self.readme.succeeded {
            println!(
                "  {} The shield badge has been {} in your {} file",
                "✓".green(),
                self.readme.outcome.verb(),
                readme
            );
        } else {
            println!(
                "  {} Error while adding/updating the shield badge in your {} file: {}",
                "✗".red(),
                readme,
                self.readme.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}

/// Writes a shields.io coverage badge and keeps it current in the README
pub struct ShieldBadgeReporter {
    config: ReporterConfig,
    store: Arc<dyn FileStore>,
}

impl ShieldBadgeReporter {
    pub const IDENTIFIER: &'static str = "shield-badge";

    pub fn new(config: ReporterConfig) -> Self {
        Self::with_store(config, Arc::new(TokioFileStore))
    }

    pub fn with_store(config: ReporterConfig, store: Arc<dyn FileStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    /// Badge for an explicit percentage
    pub fn badge_for(&self, percentage: f64) -> Badge {
        Badge::build(
            percentage,
            &self.config.subject,
            &self.config.thresholds,
            &self.config.palette,
        )
    }

    /// Badge for the configured metric of `summary`
    pub fn badge(&self, summary: &CoverageSummary) -> Badge {
        self.badge_for(summary.metric(self.config.coverage_type).pct)
    }

    /// Patch the configured README, or report that none is configured
    pub async fn replace_in_readme(&self, markdown: &str) -> PatchResult {
        match self.config.readme_path() {
            Some(path) => patch_file(self.store.as_ref(), &path, markdown).await,
            None => PatchResult::failed(README_NOT_CONFIGURED),
        }
    }
}

#[async_trait]
impl Report for ShieldBadgeReporter {
    fn identifier(&self) -> &'static str {
        Self::IDENTIFIER
    }

    fn synopsis(&self) -> String {
        "generates the url to get a shield.io badge representing the lines coverage percentage."
            .to_string()
    }

    async fn produce_artifact(&self, summary: &CoverageSummary) -> Result<Artifact> {
        let badge = self.badge(summary);
        let path = self.config.output_path();
        debug!(
            metric = %self.config.coverage_type,
            pct = badge.percentage,
            tier = %badge.tier,
            "badge built"
        );

        self.store
            .write(&path, &badge.artifact_contents())
            .await
            .with_context(|| format!("Failed to write badge file: {}", path.display()))?;
        info!(path = %path.display(), "badge written");

        let readme = self.replace_in_readme(&badge.markdown).await;
        if self.config.readme_filename.is_some() {
            info!(
                succeeded = readme.succeeded,
                outcome = ?readme.outcome,
                error = readme.error.as_deref().unwrap_or(""),
                "readme badge patch"
            );
        }

        Ok(Artifact {
            path,
            badge,
            readme_filename: self.config.readme_filename.clone(),
            readme,
        })
    }
}

/// Reports registered with the host pipeline, keyed by identifier
#[derive(Default)]
pub struct ReportRegistry {
    reports: BTreeMap<&'static str, Box<dyn Report>>,
}

impl ReportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a report, returning any report it replaced
    pub fn register(&mut self, report: Box<dyn Report>) -> Option<Box<dyn Report>> {
        self.reports.insert(report.identifier(), report)
    }

    pub fn create(&self, identifier: &str) -> Option<&dyn Report> {
        self.reports.get(identifier).map(|r| r.as_ref())
    }

    pub fn identifiers(&self) -> Vec<&'static str> {
        self.reports.keys().copied().collect()
    }
}

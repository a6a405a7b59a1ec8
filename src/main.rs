use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use shield_badge::config::CONFIG_FILE;
use shield_badge::{
    parse_coverage, patch_file, CoverageFormat, Report, ReportRegistry, ReporterConfig,
    ReporterOptions, ShieldBadgeReporter, TokioFileStore,
};

#[derive(Parser)]
#[command(name = "shield-badge")]
#[command(about = "Coverage shield badge generator with README patching")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (default: shield-badge.toml, optional)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    options: OptionArgs,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Flags overriding the config file
#[derive(Args)]
struct OptionArgs {
    /// Badge subject text
    #[arg(long, global = true)]
    subject: Option<String>,

    /// Coverage metric: lines, statements, functions, branches
    #[arg(long, global = true)]
    coverage_type: Option<String>,

    /// Low threshold (needs --high)
    #[arg(long, global = true, requires = "high")]
    low: Option<f64>,

    /// High threshold (needs --low)
    #[arg(long, global = true, requires = "low")]
    high: Option<f64>,

    /// Output directory for the badge file
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Badge file name
    #[arg(long, global = true)]
    file: Option<String>,

    /// README file name to patch (must be readme.md, any case)
    #[arg(long, global = true)]
    readme: Option<String>,

    /// Directory holding the README
    #[arg(long, global = true)]
    readme_dir: Option<PathBuf>,
}

impl OptionArgs {
    fn into_options(self) -> ReporterOptions {
        ReporterOptions {
            dir: self.dir,
            file: self.file,
            subject: self.subject,
            coverage_type: self.coverage_type,
            range: self.low.zip(self.high).map(|(low, high)| vec![low, high]),
            readme_filename: self.readme,
            readme_dir: self.readme_dir,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build the badge from a coverage report, write it and patch the README
    Report {
        /// Coverage file (lcov.info, cobertura.xml, coverage-summary.json)
        #[arg(short, long)]
        input: PathBuf,

        /// Coverage format (guessed from the extension if omitted)
        #[arg(long)]
        format: Option<String>,
    },

    /// Print the badge url and markdown for a percentage
    Url {
        percentage: f64,
    },

    /// Insert or update the badge in a markdown file
    Patch {
        /// Markdown file to patch
        target: PathBuf,

        percentage: f64,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "shield_badge=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file_options = match cli.config {
        Some(ref path) => ReporterOptions::load(path)?,
        None => ReporterOptions::load_optional(&PathBuf::from(CONFIG_FILE))?,
    };
    let options = file_options.merge(cli.options.into_options());
    let config = ReporterConfig::from_options(options);

    match cli.command {
        Commands::Report { input, format } => cmd_report(config, input, format).await,
        Commands::Url { percentage } => cmd_url(config, percentage),
        Commands::Patch { target, percentage } => cmd_patch(config, target, percentage).await,
    }
}

async fn cmd_report(config: ReporterConfig, input: PathBuf, format: Option<String>) -> Result<()> {
    let format = match format {
        Some(name) => name.parse::<CoverageFormat>()?,
        None => CoverageFormat::from_path(&input).with_context(|| {
            format!(
                "Cannot guess the coverage format of {}; pass --format",
                input.display()
            )
        })?,
    };

    let data = parse_coverage(&input, format)?;

    let mut registry = ReportRegistry::new();
    registry.register(Box::new(ShieldBadgeReporter::new(config)));
    let report = registry
        .create(ShieldBadgeReporter::IDENTIFIER)
        .context("shield-badge report is not registered")?;

    println!("\n{} {}", "🛡".cyan(), report.synopsis().dimmed());
    let artifact = report.produce_artifact(&data.total).await?;
    artifact.print_summary();

    Ok(())
}

fn cmd_url(config: ReporterConfig, percentage: f64) -> Result<()> {
    let reporter = ShieldBadgeReporter::new(config);
    let badge = reporter.badge_for(percentage);

    println!("{}", badge.url);
    println!("{}", badge.markdown);

    Ok(())
}

async fn cmd_patch(config: ReporterConfig, target: PathBuf, percentage: f64) -> Result<()> {
    let reporter = ShieldBadgeReporter::new(config);
    let badge = reporter.badge_for(percentage);

    let result = patch_file(&TokioFileStore, &target, &badge.markdown).await;
    if result.succeeded {
        println!(
            "{} The shield badge has been {} in {}",
            "✓".green(),
            result.outcome.verb(),
            target.display()
        );
    } else {
        println!(
            "{} Error while adding/updating the shield badge in {}: {}",
            "✗".red(),
            target.display(),
            result.error.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(())
}

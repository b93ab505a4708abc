//! arches-migrate CLI - Convert an Arches v3 JSON export to v4 CSV imports
//!
//! ```bash
//! arches-migrate export.json                       # mappings/ and resources/graphdiffs/
//! arches-migrate export.json -o out -m maps -g diffs
//! arches-migrate export.json --model "Heritage Resource" --concept-ids
//! arches-migrate export.json -vv --log-format json
//! ```
//!
//! Exit codes: `0` success, `1` configuration or input error, `2` when at
//! least one resource model failed.

use arches_migrate::{parse_source_file, MatchStrategy, MigrationDriver, MigrationOptions, RunSummary};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "arches-migrate", version)]
#[command(about = "Convert an Arches v3 JSON resource export into Arches v4 CSV import files", long_about = None)]
struct Cli {
    /// v3 JSON export
    v3_data: PathBuf,

    /// Output directory
    #[arg(short, long, env = "ARCHES_MIGRATE_OUTPUT", default_value = ".")]
    output: PathBuf,

    /// Directory of mapping archives (.zip) or .mapping files
    #[arg(short, long, env = "ARCHES_MIGRATE_MAPPINGS", default_value = "mappings")]
    mappings: PathBuf,

    /// Directory of graph-diff rename tables
    #[arg(short, long, env = "ARCHES_MIGRATE_GRAPH_DIFFS", default_value = "resources/graphdiffs")]
    graph_diffs: PathBuf,

    /// Only migrate this resource model
    #[arg(long, env = "ARCHES_MIGRATE_MODEL")]
    model: Option<String>,

    /// Quote string values holding '<', '>' or ','
    #[arg(long, env = "ARCHES_MIGRATE_QUOTE_STRINGS")]
    quote_strings: bool,

    /// Write concept UUIDs instead of labels
    #[arg(long, env = "ARCHES_MIGRATE_CONCEPT_IDS")]
    concept_ids: bool,

    /// Prefix CSV files with a UTF-8 byte order mark
    #[arg(long, env = "ARCHES_MIGRATE_BOM")]
    bom: bool,

    /// How derived names are matched
    #[arg(long, value_enum, env = "ARCHES_MIGRATE_MATCH_STRATEGY", default_value_t = MatchStrategy::Fuzzy)]
    match_strategy: MatchStrategy,

    /// Warn about matches scoring below this (0-100)
    #[arg(long, env = "ARCHES_MIGRATE_LOW_CONFIDENCE", default_value_t = 80,
          value_parser = clap::value_parser!(u8).range(0..=100))]
    low_confidence: u8,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Errors only
    #[arg(short, long)]
    quiet: bool,

    /// Log line format
    #[arg(long, value_enum, env = "ARCHES_MIGRATE_LOG_FORMAT", default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

impl Cli {
    fn options(&self) -> MigrationOptions {
        MigrationOptions {
            output_dir: self.output.clone(),
            mappings_dir: self.mappings.clone(),
            graph_diffs_dir: self.graph_diffs.clone(),
            model_filter: self.model.clone(),
            quote_strings: self.quote_strings,
            concept_identifiers: self.concept_ids,
            write_bom: self.bom,
            match_strategy: self.match_strategy,
            low_confidence_threshold: self.low_confidence,
        }
    }

    fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "error",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    setup_logging(cli.log_level(), cli.log_format);

    match run(&cli) {
        Ok(summary) => {
            print_summary(&summary);
            if summary.has_failures() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> arches_migrate::MigrationResult<RunSummary> {
    eprintln!("📄 Reading: {}", cli.v3_data.display());
    let parsed = parse_source_file(&cli.v3_data)?;
    eprintln!("   Encoding: {}", parsed.encoding);
    eprintln!("   Resources: {}", parsed.export.resources.len());

    let driver = MigrationDriver::from_options(cli.options())?;
    eprintln!("   Models: {}", driver.mappings().names().join(", "));

    driver.run(parsed.export.resources)
}

fn print_summary(summary: &RunSummary) {
    eprintln!("\n📦 Models:");
    for report in &summary.models {
        match &report.error {
            None => {
                eprintln!(
                    "   ✅ {}: {} resources → {} rows",
                    report.model, report.resources, report.rows
                );
                if report.dropped_fields > 0 || report.format_errors > 0 {
                    eprintln!(
                        "      {} fields dropped, {} values skipped",
                        report.dropped_fields, report.format_errors
                    );
                }
                if let Some(path) = &report.csv_path {
                    eprintln!("      💾 {}", path.display());
                }
            }
            Some(err) => eprintln!("   ❌ {}: {}", report.model, err),
        }
    }

    let failed = summary.failed().count();
    if failed > 0 {
        eprintln!("\n⚠️  {} of {} models failed", failed, summary.models.len());
    } else {
        eprintln!("\n✨ Done! {} rows written", summary.total_rows());
    }
}

/// `RUST_LOG` wins over the verbosity flags.
fn setup_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Text => subscriber.init(),
    }
}

//! MarketPulse: marketing attribution and efficiency reports from ad-platform
//! and business CSV exports.

mod report;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use marketpulse_core::config::{AppConfig, ReportFormat};
use marketpulse_core::{Channel, DatasetFilter, PulseError, SourceKind};
use marketpulse_pipeline::{DataLoader, Pipeline};
use tracing::{info, warn};

use crate::report::{export_csv, Report};

#[derive(Parser, Debug)]
#[command(name = "marketpulse")]
#[command(about = "Marketing attribution and efficiency analytics over CSV exports")]
#[command(version)]
struct Cli {
    /// Human-readable logs instead of JSON
    #[arg(long, global = true, default_value_t = false)]
    plain_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the pipeline and print the full analytics report
    Report {
        /// Folder holding the four CSV exports (overrides config)
        #[arg(long, env = "MARKETPULSE__DATA_DIR")]
        data_dir: Option<PathBuf>,

        /// First date to include (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last date to include (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Restrict channel analyses to these channels; repeatable
        #[arg(long = "channel")]
        channels: Vec<Channel>,

        /// Output format (overrides config)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Also write the filtered dataset to this CSV file
        #[arg(long)]
        export_csv: Option<PathBuf>,
    },
    /// Check that every source file is present and parses
    Validate {
        /// Folder holding the four CSV exports (overrides config)
        #[arg(long, env = "MARKETPULSE__DATA_DIR")]
        data_dir: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => ReportFormat::Json,
            OutputFormat::Text => ReportFormat::Text,
        }
    }
}

fn init_tracing(plain: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "marketpulse=info,marketpulse_pipeline=info,marketpulse_reporting=info".into()
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if plain {
        builder.compact().init();
    } else {
        builder.json().init();
    }
}

fn load_config() -> AppConfig {
    AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    })
}

fn run_report(
    mut config: AppConfig,
    filter: DatasetFilter,
    format: Option<OutputFormat>,
    export: Option<PathBuf>,
) -> anyhow::Result<()> {
    filter.validate()?;
    if let Some(format) = format {
        config.report.format = format.into();
    }

    let pipeline = Pipeline::from_config(&config);
    let run = pipeline.run()?;
    let dataset = run.final_dataset.filter(&filter);
    info!(
        rows = dataset.len(),
        filtered = !filter.is_empty(),
        "Building report"
    );

    let report = Report::build(&run, &dataset);
    match config.report.format {
        ReportFormat::Json => println!("{}", report.to_json()?),
        ReportFormat::Text => print!("{}", report.to_text()),
    }

    if let Some(path) = export {
        export_csv(&dataset, &path)?;
        info!(path = %path.display(), rows = dataset.len(), "Exported dataset");
    }
    Ok(())
}

fn run_validate(config: AppConfig) -> anyhow::Result<()> {
    let loader = DataLoader::new(config.data_dir);
    let manifest = loader.discover()?;
    let sources = loader.load(&manifest)?;

    for source in SourceKind::ALL {
        match (manifest.get(source), sources.get(source)) {
            (Some(path), Some(table)) => {
                println!("{:<14} {} ({} rows)", source.file_name(), path.display(), table.len())
            }
            _ => println!("{:<14} missing", source.file_name()),
        }
    }

    DataLoader::validate_data_files(&sources)?;
    println!("All sources present in {}", loader.data_dir().display());
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.plain_logs);

    let mut config = load_config();

    let result = match cli.command {
        Command::Report {
            data_dir,
            start,
            end,
            channels,
            format,
            export_csv,
        } => {
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            let filter = DatasetFilter {
                start,
                end,
                channels,
            };
            run_report(config, filter, format, export_csv)
        }
        Command::Validate { data_dir } => {
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            run_validate(config)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        if let Some(hint) = e.downcast_ref::<PulseError>().and_then(PulseError::hint) {
            eprintln!("{hint}");
        }
        std::process::exit(1);
    }
}

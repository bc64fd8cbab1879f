//! questframe CLI
//!
//! Command-line interface for questframe operations:
//! - Interpolate macros in a query
//! - Decode a result document into a frame
//! - Inspect supported wire types and macros
//! - Print the connection string for the configured datasource

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use questframe::config::{generate_default_config, Config, LoggingConfig};
use questframe::convert::{Frame, MemoryCursor, ResultDocument, UnknownColumnPolicy, Value};
use questframe::driver::{client_version, connection_string, Driver};
use questframe::macros::QueryContext;
use questframe::time::{parse_interval, TimeRange};

#[derive(Parser)]
#[command(name = "questframe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "QuestDB query macros and typed result decoding")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Expand macros in a query
    Interpolate {
        /// Raw SQL containing $__ macros
        sql: String,
        /// Range start (RFC 3339)
        #[arg(long)]
        from: String,
        /// Range end (RFC 3339)
        #[arg(long)]
        to: String,
        /// Sample interval (e.g. 500ms, 30s, 15m, 1h, 1d)
        #[arg(short, long, default_value = "1m")]
        interval: String,
    },

    /// Decode a JSON result document
    Decode {
        /// Path to the result document
        path: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Skip columns with unsupported wire types instead of failing
        #[arg(long)]
        skip_unknown: bool,
    },

    /// List supported wire types
    Types,

    /// List registered macros
    Macros,

    /// Print the connection string for the configured datasource
    ConnectionString {
        /// Host version reported in the application name
        #[arg(long)]
        host_version: Option<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
    Table,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging)?;

    match cli.command {
        Commands::Interpolate {
            sql,
            from,
            to,
            interval,
        } => {
            let driver = Driver::new(config.driver_settings());
            let range = TimeRange::parse_rfc3339(&from, &to)?;
            let interval = parse_interval(&interval)?;
            let ctx = QueryContext::new(range).with_interval(interval);

            println!("{}", driver.interpolate(&sql, &ctx)?);
        }

        Commands::Decode {
            path,
            format,
            skip_unknown,
        } => {
            let mut settings = config.driver_settings();
            if skip_unknown {
                settings = settings.unknown_columns(UnknownColumnPolicy::Skip);
            }
            let driver = Driver::new(settings);
            let frame = decode_file(&driver, &path)?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&frame)?),
                OutputFormat::Csv => print_csv(&frame)?,
                OutputFormat::Table => print_table(&frame),
            }
        }

        Commands::Types => {
            let driver = Driver::new(config.driver_settings());
            println!("{:<12} {:<12} {}", "Wire type", "Field type", "Scan");
            println!("{}", "-".repeat(34));
            for converter in driver.converters().iter() {
                println!(
                    "{:<12} {:<12} {:?}",
                    converter.type_name(),
                    converter.field_type().to_string(),
                    converter.scan_shape()
                );
            }
        }

        Commands::Macros => {
            let driver = Driver::new(config.driver_settings());
            for name in driver.macros().names() {
                println!("$__{}", name);
            }
        }

        Commands::ConnectionString { host_version } => {
            let mut datasource = config.datasource.clone();
            datasource
                .validate()
                .context("Datasource configuration is incomplete")?;
            datasource.password = "********".to_string();

            let application_name = client_version(host_version.as_deref());
            println!("{}", connection_string(&datasource, &application_name)?);
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("questframe={}", logging.level)));

    // stdout carries command output, so logs go to stderr or a file
    let writer = match &logging.file {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(io::stderr),
    };

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format.as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init(),
        "pretty" => registry
            .with(tracing_subscriber::fmt::layer().with_writer(writer))
            .init(),
        other => bail!("Unknown log format: {} (expected pretty or json)", other),
    }

    Ok(())
}

fn decode_file(driver: &Driver, path: &Path) -> anyhow::Result<Frame> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read result document {:?}", path))?;
    let document = ResultDocument::from_json(&content)?;
    let mut cursor = MemoryCursor::from_document(document)?;

    let frame = driver.decode(&mut cursor)?;
    tracing::info!(
        columns = frame.columns().len(),
        rows = frame.row_count(),
        "Decoded {:?}",
        path
    );
    Ok(frame)
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn print_csv(frame: &Frame) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    writer.write_record(frame.columns().iter().map(|c| c.name.as_str()))?;

    for index in 0..frame.row_count() {
        if let Some(row) = frame.row(index) {
            writer.write_record(row.into_iter().map(cell_text))?;
        }
    }

    writer.flush()?;
    Ok(())
}

fn print_table(frame: &Frame) {
    if frame.columns().is_empty() {
        println!("No columns");
        return;
    }

    let rows: Vec<Vec<String>> = (0..frame.row_count())
        .filter_map(|index| frame.row(index))
        .map(|row| {
            row.into_iter()
                .map(|v| match v {
                    Value::Null => "-".to_string(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = frame
        .columns()
        .iter()
        .enumerate()
        .map(|(i, column)| {
            rows.iter()
                .map(|row| row[i].len())
                .chain(std::iter::once(column.name.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = frame
        .columns()
        .iter()
        .zip(&widths)
        .map(|(column, width)| format!("{:<width$}", column.name, width = *width))
        .collect();
    println!("{}", header.join(" | "));
    println!(
        "{}",
        "-".repeat(widths.iter().sum::<usize>() + 3 * (widths.len() - 1))
    );

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        println!("{}", cells.join(" | "));
    }

    if rows.is_empty() {
        println!("No rows");
    }
}

//! # agentkpi-cli
//!
//! Command-line front end for the daily agent KPI pipeline.

use agentkpi_pipeline::{build_db, KpiTable, PipelineError, SourceSheet, Statistics};
use anyhow::{Context, Result};
use arrow::util::pretty::pretty_format_batches;
use chrono::{DateTime, Local};
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// agentkpi - Build a daily per-agent KPI table from a call-center workbook
#[derive(Parser)]
#[command(name = "agentkpi")]
#[command(author, version, about = "Daily agent KPI builder", long_about = None)]
struct Cli {
    /// Workbook with the sheets CHO, CHT, CHD and CHE
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Where to write the KPI table (.xlsx, or .csv)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Number of rows to preview
    #[arg(
        short = 'n',
        long = "rows",
        default_value_t = 20,
        env = "AGENTKPI_PREVIEW_ROWS"
    )]
    rows: usize,

    /// Preview format (table, csv, json)
    #[arg(short = 'f', long = "format", default_value = "table")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output format for the preview.
#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// JSON records
    Json,
    /// CSV output
    Csv,
    /// Pretty table output (default)
    #[default]
    Table,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

/// Run the pipeline, print the summary and preview, and write the output file.
fn run(cli: &Cli) -> Result<()> {
    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("Failed to read workbook: {}", cli.input.display()))?;

    let (table, stats) = build_db(&bytes)?;

    print_statistics(&stats);
    println!();
    println!("{}", render_preview(&table, cli.rows, cli.format)?);

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(Local::now()));
    write_output(&table, &output)?;
    info!(path = %output.display(), records = table.len(), "wrote KPI table");
    println!(
        "\n{} {} ({} records)",
        "Saved".green().bold(),
        output.display(),
        table.len()
    );
    Ok(())
}

/// `daily_agent_db_<YYYYMMDD_HHMMSS>.xlsx` in the working directory
fn default_output_path(now: DateTime<Local>) -> PathBuf {
    PathBuf::from(format!(
        "daily_agent_db_{}.xlsx",
        now.format("%Y%m%d_%H%M%S")
    ))
}

fn write_output(table: &KpiTable, path: &Path) -> Result<()> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let written = if is_csv {
        table.save_as_csv(path)
    } else {
        table.save_as_xlsx(path)
    };
    written.with_context(|| format!("Failed to write {}", path.display()))
}

fn print_statistics(stats: &Statistics) {
    println!("{}", "Summary".cyan().bold());
    print!("{}", format_statistics(stats));
}

/// One `label: value` line per statistic
fn format_statistics(stats: &Statistics) -> String {
    let mut lines: Vec<(String, String)> = SourceSheet::ALL
        .iter()
        .map(|source| {
            (
                format!("{} rows:", source.sheet_name()),
                stats.source_rows(*source).to_string(),
            )
        })
        .collect();
    lines.push(("Total records:".to_string(), stats.total_records.to_string()));
    lines.push(("Unique agents:".to_string(), stats.unique_agents.to_string()));
    lines.push(("Date range:".to_string(), stats.date_range_label()));

    lines
        .into_iter()
        .map(|(label, value)| format!("  {label:<16}{value}\n"))
        .collect()
}

/// Render the first `rows` rows of the table in the requested format.
fn render_preview(table: &KpiTable, rows: usize, format: OutputFormat) -> Result<String> {
    let head = table.preview(rows);
    if head.is_empty() {
        return Ok("(empty table)".to_string());
    }

    let rendered = match format {
        OutputFormat::Table => {
            let batch = head.sheet().to_record_batch()?;
            pretty_format_batches(&[batch])?.to_string()
        }
        OutputFormat::Csv => head.to_csv_string().trim_end().to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(&head.records())?,
    };
    Ok(rendered)
}

fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<PipelineError>() {
        Some(pipeline) => {
            eprintln!(
                "{} {}",
                format!("{} error:", pipeline.kind().as_str()).red().bold(),
                pipeline
            );
            eprintln!("{} {}", "hint:".yellow(), pipeline.hint());
        }
        None => eprintln!("{} {err:#}", "error:".red().bold()),
    }
}

//! Process command - build the report for a single invoice file.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use billsheet_core::{BillProcessor, Report};

use super::{extension_of, load_config, process_file, INPUT_EXTENSIONS};
use crate::export::{self, OutputFormat};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or extracted text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output directory (default: from configuration)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "xlsx")]
    format: OutputFormat,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let extension = extension_of(&args.input);
    if !INPUT_EXTENSIONS.contains(&extension.as_str()) {
        anyhow::bail!("Unsupported file format: {}", extension);
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Extracting invoice lines...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let processor = BillProcessor::from_config(&config.classifier)?;
    let document = process_file(&args.input, &processor)?;

    pb.finish_and_clear();

    let report = Report::from_documents([&document]);

    if !report.warnings().is_empty() {
        eprintln!("{}", style("Warnings:").yellow());
        for row in report.warnings() {
            eprintln!("  {}: {} --> {}", row.kind, row.line, row.details);
        }
    }

    match args.format {
        OutputFormat::Text => print!("{}", export::format_text(&report)),
        OutputFormat::Xlsx => {
            let dir = export::report_dir(&config.export, args.output_dir.as_deref());
            let path = export::workbook_path(&dir);
            export::write_xlsx_report(&report, &path, &config.export)?;
            println!(
                "{} {} items written to {}",
                style("✓").green(),
                report.items().len(),
                path.display()
            );
        }
        OutputFormat::Csv => {
            let dir = export::report_dir(&config.export, args.output_dir.as_deref());
            export::write_csv_report(&report, &dir, &config.export)?;
            println!(
                "{} {} items written to {}",
                style("✓").green(),
                report.items().len(),
                dir.display()
            );
        }
        OutputFormat::Json => {
            let dir = export::report_dir(&config.export, args.output_dir.as_deref());
            let path = export::write_json_report(&report, &dir)?;
            println!(
                "{} {} items written to {}",
                style("✓").green(),
                report.items().len(),
                path.display()
            );
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

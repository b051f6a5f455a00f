//! Batch processing command for multiple invoice files.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use billsheet_core::{BillProcessor, ProcessedDocument, Report};

use super::{extension_of, load_config, process_file, INPUT_EXTENSIONS};
use crate::export::{self, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory (default: from configuration)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for the combined report
    #[arg(short, long, value_enum, default_value = "xlsx")]
    format: OutputFormat,

    /// Also write a per-file status CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct FileResult {
    index: usize,
    path: PathBuf,
    document: Option<ProcessedDocument>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Expand glob pattern
    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| INPUT_EXTENSIONS.contains(&extension_of(p).as_str()))
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let processor = Arc::new(BillProcessor::from_config(&config.classifier)?);
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (index, path) in files.into_iter().enumerate() {
        let processor = Arc::clone(&processor);
        let semaphore = Arc::clone(&semaphore);

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let file_start = Instant::now();

            let task_path = path.clone();
            let outcome =
                tokio::task::spawn_blocking(move || process_file(&task_path, &processor)).await?;

            let processing_time_ms = file_start.elapsed().as_millis() as u64;
            let (document, error) = match outcome {
                Ok(document) => (Some(document), None),
                Err(e) => (None, Some(e.to_string())),
            };

            anyhow::Ok(FileResult {
                index,
                path,
                document,
                error,
                processing_time_ms,
            })
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let result = joined??;

        if let Some(error_msg) = &result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                tasks.abort_all();
                anyhow::bail!("Processing failed: {}", error_msg);
            }
        }

        overall_pb.inc(1);
        results.push(result);
    }

    overall_pb.finish_with_message("Complete");

    // Documents go into the report in input order, whatever order they finished in
    results.sort_by_key(|r| r.index);

    let report = Report::from_documents(results.iter().filter_map(|r| r.document.as_ref()));
    let dir = export::report_dir(&config.export, args.output_dir.as_deref());

    match args.format {
        OutputFormat::Text => print!("{}", export::format_text(&report)),
        OutputFormat::Xlsx => {
            let path = export::workbook_path(&dir);
            export::write_xlsx_report(&report, &path, &config.export)?;
            println!("{} Report written to {}", style("✓").green(), path.display());
        }
        OutputFormat::Csv => {
            export::write_csv_report(&report, &dir, &config.export)?;
            println!("{} Report written to {}", style("✓").green(), dir.display());
        }
        OutputFormat::Json => {
            let path = export::write_json_report(&report, &dir)?;
            println!("{} Report written to {}", style("✓").green(), path.display());
        }
    }

    if args.summary {
        let summary_path = match args.format {
            OutputFormat::Xlsx => export::sibling_path(&dir, "_files.csv"),
            _ => dir.join("files.csv"),
        };
        write_file_summary(&summary_path, &results)?;
        println!(
            "{} File summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let successful = results.iter().filter(|r| r.document.is_some()).count();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed, {} items, {} warnings",
        style(successful).green(),
        style(failed.len()).red(),
        report.items().len(),
        style(report.warnings().len()).yellow()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn write_file_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "invoice_number",
        "items",
        "mismatched",
        "skipped",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");

        if let Some(doc) = &result.document {
            wtr.write_record([
                filename,
                "success",
                doc.metadata.invoice_number.as_deref().unwrap_or(""),
                &doc.result.items.len().to_string(),
                &doc.result.mismatched.len().to_string(),
                &doc.result.skipped.len().to_string(),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    debug!("Wrote {}", path.display());
    Ok(())
}

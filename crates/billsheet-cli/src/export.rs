//! Report export: an xlsx workbook, one CSV per sheet, a JSON document, or a text summary.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::debug;

use billsheet_core::models::config::ExportConfig;
use billsheet_core::report::{OUT_OF_RANGE, SUMMARY_COLUMNS, WARNING_COLUMNS};
use billsheet_core::{Report, SummaryRow, WarningRow};

pub const ITEMS_SHEET: &str = "InvoiceItems";
pub const SUMMARY_SHEET: &str = "BillSummary";
pub const WARNINGS_SHEET: &str = "Warnings";
pub const JSON_REPORT: &str = "report.json";

/// Columns written as numbers in the workbook.
const NUMERIC_COLUMNS: [&str; 5] = [
    "Quantity",
    "Packet Quantity",
    "Unit Price",
    "Total Price",
    "Unit Price Per Item",
];

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Single workbook with one worksheet per sheet
    Xlsx,
    /// One CSV file per sheet
    Csv,
    /// Single JSON document
    Json,
    /// Plain text summary on stdout
    Text,
}

/// Timestamped report path, without extension, under the configured (or overridden) output directory.
///
/// CSV output uses it as a directory, xlsx output as the workbook name.
pub fn report_dir(config: &ExportConfig, output_dir: Option<&Path>) -> PathBuf {
    let base = output_dir.unwrap_or(&config.output_dir);
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    base.join(format!("{}_{}", config.file_prefix, timestamp))
}

/// `report_dir` with `suffix` appended to its final component.
pub fn sibling_path(report_dir: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(report_dir.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

pub fn workbook_path(report_dir: &Path) -> PathBuf {
    sibling_path(report_dir, ".xlsx")
}

/// Items sheet header and rows, without the Ship To column when it is disabled.
fn item_sheet(report: &Report, config: &ExportConfig) -> (Vec<&'static str>, Vec<Vec<String>>) {
    let columns = report.items().columns();
    let ship_to = columns.iter().position(|c| *c == "Ship To");
    let keep = |index: usize| config.include_ship_to || Some(index) != ship_to;

    let header = columns
        .iter()
        .enumerate()
        .filter(|(i, _)| keep(*i))
        .map(|(_, c)| *c)
        .collect();
    let rows = report
        .items()
        .records()
        .map(|cells| {
            cells
                .into_iter()
                .enumerate()
                .filter(|(i, _)| keep(*i))
                .map(|(_, c)| c)
                .collect()
        })
        .collect();

    (header, rows)
}

fn sheet_file(dir: &Path, sheet: &str) -> PathBuf {
    dir.join(format!("{}.csv", sheet))
}

fn write_csv_sheet<H, R>(path: &Path, header: &[H], rows: R) -> anyhow::Result<()>
where
    H: AsRef<[u8]>,
    R: IntoIterator<Item = Vec<String>>,
{
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(header)?;
    for row in rows {
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the report sheets as CSV files. Returns the written paths.
///
/// The items sheet is always written; summary and warnings only when non-empty.
pub fn write_csv_report(
    report: &Report,
    dir: &Path,
    config: &ExportConfig,
) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let (header, rows) = item_sheet(report, config);
    let items_path = sheet_file(dir, ITEMS_SHEET);
    write_csv_sheet(&items_path, header.as_slice(), rows)?;
    written.push(items_path);

    if !report.summary().is_empty() {
        let path = sheet_file(dir, SUMMARY_SHEET);
        write_csv_sheet(&path, &SUMMARY_COLUMNS[..], report.summary().iter().map(SummaryRow::cells))?;
        written.push(path);
    }

    if !report.warnings().is_empty() {
        let path = sheet_file(dir, WARNINGS_SHEET);
        write_csv_sheet(&path, &WARNING_COLUMNS[..], report.warnings().iter().map(WarningRow::cells))?;
        written.push(path);
    }

    for path in &written {
        debug!("Wrote {}", path.display());
    }

    Ok(written)
}

fn write_worksheet(
    sheet: &mut Worksheet,
    name: &str,
    header: &[&str],
    rows: impl IntoIterator<Item = Vec<String>>,
    bold: &Format,
) -> Result<(), XlsxError> {
    sheet.set_name(name)?;

    for (col, title) in header.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, bold)?;
    }

    for (row, cells) in rows.into_iter().enumerate() {
        let row = row as u32 + 1;
        for (col, cell) in cells.iter().enumerate() {
            let numeric = NUMERIC_COLUMNS.contains(&header[col]);
            match cell.parse::<f64>() {
                Ok(value) if numeric => sheet.write_number(row, col as u16, value)?,
                _ if cell.is_empty() => continue,
                _ => sheet.write_string(row, col as u16, cell)?,
            };
        }
    }

    Ok(())
}

/// Write the report as one workbook with bold header rows.
///
/// InvoiceItems is always present; BillSummary and Warnings only when non-empty.
pub fn write_xlsx_report(report: &Report, path: &Path, config: &ExportConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let (header, rows) = item_sheet(report, config);
    write_worksheet(workbook.add_worksheet(), ITEMS_SHEET, &header, rows, &bold)?;

    if !report.summary().is_empty() {
        write_worksheet(
            workbook.add_worksheet(),
            SUMMARY_SHEET,
            &SUMMARY_COLUMNS,
            report.summary().iter().map(SummaryRow::cells),
            &bold,
        )?;
    }

    if !report.warnings().is_empty() {
        write_worksheet(
            workbook.add_worksheet(),
            WARNINGS_SHEET,
            &WARNING_COLUMNS,
            report.warnings().iter().map(WarningRow::cells),
            &bold,
        )?;
    }

    workbook.save(path)?;
    debug!("Wrote {}", path.display());
    Ok(())
}

/// Write the whole report as one JSON file.
pub fn write_json_report(report: &Report, dir: &Path) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(JSON_REPORT);
    fs::write(&path, serde_json::to_string_pretty(report)?)?;
    debug!("Wrote {}", path.display());
    Ok(path)
}

pub fn format_text(report: &Report) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Documents: {}  Items: {}  Warnings: {}\n",
        report.document_count(),
        report.items().len(),
        report.warnings().len()
    ));
    output.push('\n');

    output.push_str("Items:\n");
    for item in report.items().rows() {
        let line = &item.line;
        output.push_str(&format!(
            "  [{}] {} x {} {} @ {} = {}\n",
            line.section,
            line.quantity,
            line.product_code,
            line.description,
            line.unit_price,
            line.total_price
        ));
    }

    if !report.summary().is_empty() {
        output.push_str("\nBill summary:\n");
        for row in report.summary() {
            output.push_str(&format!(
                "  {} {} {} / {}: {}\n",
                row.invoice_number,
                row.quote_date,
                row.sold_to,
                row.section,
                row.total_price
                    .map(|total| total.to_string())
                    .unwrap_or_else(|| OUT_OF_RANGE.to_string())
            ));
        }
    }

    if !report.warnings().is_empty() {
        output.push_str("\nWarnings:\n");
        for row in report.warnings() {
            output.push_str(&format!("  {}: {} --> {}\n", row.kind, row.line, row.details));
        }
    }

    let total = report
        .grand_total()
        .map(|total| total.to_string())
        .unwrap_or_else(|| OUT_OF_RANGE.to_string());
    output.push_str(&format!("\nTotal: {}\n", total));
    output
}

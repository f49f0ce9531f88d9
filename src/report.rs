//! The report module writes stored slug results to a file for review.

use anyhow::{Context, Result, bail};
use log::info;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};

use crate::ReportFormat;
use crate::slug::SlugResult;
use crate::storage::Storage;

/// Writes every stored result of the database to the output file.
///
/// # Arguments
///
/// * `db_path` - Path to the database holding the results of an optimization run
/// * `output_path` - Path to the output file, replaced if it exists
/// * `format` - JSON array or tab-separated table
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if any operation fails
///
/// # Errors
///
/// Returns an error if:
/// * Database operations fail
/// * File operations fail
/// * A TSV field contains a tab or line break
pub fn report(db_path: &str, output_path: &str, format: ReportFormat) -> Result<()> {
    let storage = Storage::new(db_path)?;

    info!("Reporting results from database {db_path} to {output_path}...");

    let results = storage.list_results()?;

    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(output_path)
        .with_context(|| format!("Failed to open report file: {output_path}"))?;
    let mut writer = BufWriter::new(file);

    match format {
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &results)?;
            writeln!(writer)?;
        }
        ReportFormat::Tsv => write_tsv(&mut writer, &results)?,
    }
    writer.flush()?;

    info!("Reported {} results to {output_path}", results.len());
    Ok(())
}

fn write_tsv(writer: &mut impl Write, results: &[SlugResult]) -> Result<()> {
    writeln!(writer, "id\toriginal_url\tcurrent_slug\tproposed_slug")?;
    for result in results {
        let fields = [
            result.original_url(),
            result.current_slug(),
            result.proposed_slug(),
        ];
        if fields.iter().any(|field| field.contains(['\t', '\n', '\r'])) {
            bail!(
                "Result {} has a tab or line break and cannot be written as TSV",
                result.id()
            );
        }
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            result.id(),
            result.original_url(),
            result.current_slug(),
            result.proposed_slug()
        )?;
    }

    Ok(())
}

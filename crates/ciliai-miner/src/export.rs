//! CSV export of a run report: one row per gene.

use std::io::Write;

use ciliai_common::{CiliaiError, Result};
use serde::Serialize;

use crate::models::RunReport;

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    gene: &'a str,
    length_role: &'a str,
    frequency_role: &'a str,
    article_count: usize,
    evidence_count: usize,
    curated_count: usize,
    first_reference: &'a str,
    error: &'a str,
}

pub fn write_csv<W: Write>(report: &RunReport, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    for (gene, result) in &report.results {
        let first_reference = result
            .articles()
            .first()
            .map(|a| a.ref_link.as_str())
            .or_else(|| result.curated.iter().find_map(|c| c.ref_link.as_deref()))
            .unwrap_or("");

        wtr.serialize(CsvRow {
            gene,
            length_role: result.summary.length.as_str(),
            frequency_role: result.summary.frequency.as_str(),
            article_count: result.found_article_count(),
            evidence_count: result.evidence().filter(|ev| ev.gene.eq_ignore_ascii_case(gene)).count()
                + result.curated.len(),
            curated_count: result.curated.len(),
            first_reference,
            error: result.error.as_deref().unwrap_or(""),
        })
        .map_err(csv_error)?;
    }

    wtr.flush()?;
    Ok(())
}

fn csv_error(e: csv::Error) -> CiliaiError {
    CiliaiError::Other(e.into())
}

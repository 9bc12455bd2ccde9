//! Record normalization
//!
//! Maps heterogeneous source tables (DESeq2- or edgeR-shaped headers) onto
//! the canonical [`Record`] layout. Each measured field resolves through a
//! fallback chain of known column aliases; rows without meaningful
//! expression support are dropped.

use super::types::{ColumnDescriptor, NormalizeError, RawTable, Record, EXPRESSION_FLOOR};
use rayon::prelude::*;

/// Canonical measured fields, in published column order.
const MEASURED_FIELDS: [&str; 6] = [
    "feature",
    "symbol",
    "baseMean",
    "log2FoldChange",
    "pvalue",
    "padj",
];

/// Alias columns consumed by the fallback chains. These never appear as
/// pass-through extras.
const ALIAS_FIELDS: [&str; 4] = ["PValue", "FDR", "logCPM", "logFC"];

/// Normalize a raw table into records plus the column descriptor set.
///
/// Fails with [`NormalizeError::NoFeaturesFound`] when no row survives the
/// expression floor; the caller commits nothing in that case.
pub fn normalize_table(
    table: &RawTable,
) -> Result<(Vec<Record>, Vec<ColumnDescriptor>), NormalizeError> {
    let extra_headers: Vec<&str> = table
        .headers()
        .iter()
        .map(String::as_str)
        .filter(|h| !MEASURED_FIELDS.contains(h) && !ALIAS_FIELDS.contains(h))
        .collect();

    let records: Vec<Record> = table
        .rows()
        .par_iter()
        .filter_map(|row| normalize_row(table, row, &extra_headers))
        .collect();

    if records.is_empty() {
        return Err(NormalizeError::NoFeaturesFound);
    }

    log::info!(
        "normalized {} of {} rows ({} extra columns)",
        records.len(),
        table.len(),
        extra_headers.len()
    );

    let mut columns: Vec<ColumnDescriptor> = MEASURED_FIELDS
        .iter()
        .map(|name| ColumnDescriptor {
            name: (*name).to_string(),
            measured: true,
        })
        .collect();
    columns.extend(extra_headers.iter().map(|name| ColumnDescriptor {
        name: (*name).to_string(),
        measured: false,
    }));

    Ok((records, columns))
}

fn normalize_row(table: &RawTable, row: &[String], extra_headers: &[&str]) -> Option<Record> {
    let base_mean =
        first_numeric(table, row, &["baseMean", "logCPM"]).unwrap_or(EXPRESSION_FLOOR);
    if base_mean <= EXPRESSION_FLOOR {
        return None;
    }

    let feature = table.field(row, "feature").unwrap_or_default().to_string();
    let symbol_field = table.field(row, "symbol").filter(|s| !s.is_empty());
    let symbol = symbol_field.unwrap_or(&feature).to_string();
    let symbols: Vec<String> = symbol.split(';').map(str::to_string).collect();

    let extra = extra_headers
        .iter()
        .map(|name| table.field(row, name).unwrap_or_default().to_string())
        .collect();

    Some(Record {
        feature,
        symbol,
        symbols,
        base_mean,
        log2_fold_change: first_numeric(table, row, &["log2FoldChange", "logFC"]).unwrap_or(0.0),
        pvalue: first_numeric(table, row, &["pvalue", "PValue"]).unwrap_or(f64::NAN),
        padj: first_numeric(table, row, &["padj", "FDR"]).unwrap_or(f64::NAN),
        extra,
    })
}

/// First column in `names` whose cell parses as a finite number.
fn first_numeric(table: &RawTable, row: &[String], names: &[&str]) -> Option<f64> {
    names
        .iter()
        .filter_map(|name| table.field(row, name))
        .filter_map(|cell| cell.trim().parse::<f64>().ok())
        .find(|v| v.is_finite())
}

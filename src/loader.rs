//! Dataset loading
//!
//! Parses delimited text (TSV or CSV, sniffed from the header line) into a
//! [`RawTable`], runs normalization and gene indexing off the UI thread, and
//! owns the bundled sample datasets and the selection CSV export.

use crate::explorer::{
    normalize_table, GeneIndex, LoadedDataset, NormalizeError, RawTable,
};
use once_cell::sync::Lazy;
use std::io::Write;
use std::sync::mpsc::{channel, Receiver};
use std::thread;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse table: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// A bundled dataset selectable from the menu. Each carries a default gene
/// search seed applied on load.
pub struct SampleDataset {
    pub name: &'static str,
    pub seed: &'static str,
    pub content: &'static str,
}

pub static SAMPLE_DATASETS: Lazy<Vec<SampleDataset>> = Lazy::new(|| {
    vec![
        SampleDataset {
            name: "DESeq2 example",
            seed: "PER1;CACNB2",
            content: include_str!("../assets/deseq2_example.tsv"),
        },
        SampleDataset {
            name: "edgeR example",
            seed: "MYC",
            content: include_str!("../assets/edger_example.csv"),
        },
    ]
});

/// Parse delimited text into a raw table. The delimiter is sniffed from the
/// header line: tab wins over comma, so plain-text exports behave like TSV.
pub fn parse_table(content: &str) -> Result<RawTable, LoadError> {
    let header_line = content.lines().next().unwrap_or_default();
    let delimiter = if header_line.contains('\t') { b'\t' } else { b',' };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let mut table = RawTable::new(headers);

    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(str::to_string).collect());
    }

    Ok(table)
}

/// Parse, normalize, and index a dataset. The complete pipeline behind a
/// load; everything either succeeds into a committable [`LoadedDataset`] or
/// fails without side effects.
pub fn load_dataset(
    name: String,
    content: &str,
    seed_symbols: String,
) -> Result<LoadedDataset, LoadError> {
    let table = parse_table(content)?;
    let (records, columns) = normalize_table(&table)?;
    let gene_index = GeneIndex::build(&records);

    log::info!("loaded '{}': {} records", name, records.len());
    Ok(LoadedDataset {
        name,
        records,
        columns,
        gene_index,
        seed_symbols,
    })
}

/// Run [`load_dataset`] on a worker thread; the receiver delivers the result
/// once, polled from the frame loop.
pub fn spawn_load(
    name: String,
    content: String,
    seed_symbols: String,
) -> Receiver<Result<LoadedDataset, LoadError>> {
    let (tx, rx) = channel();
    thread::spawn(move || {
        let result = load_dataset(name, &content, seed_symbols);
        let _ = tx.send(result);
    });
    rx
}

/// Write the currently visible rows as CSV, all columns (measured and
/// extras) in published order. NaN measurements export as `NA`.
pub fn write_selection<W: Write>(
    writer: W,
    state: &crate::explorer::ExplorerState,
) -> Result<(), LoadError> {
    let columns = state.columns();
    let mut out = csv::Writer::from_writer(writer);

    out.write_record(columns.iter().map(|c| c.name.as_str()))?;

    for &id in state.visible_rows() {
        let record = state.record(id);
        let mut extra = record.extra.iter();
        let row: Vec<String> = columns
            .iter()
            .map(|column| {
                if column.measured {
                    match column.name.as_str() {
                        "feature" => record.feature.clone(),
                        "symbol" => record.symbol.clone(),
                        "baseMean" => number_cell(record.base_mean),
                        "log2FoldChange" => number_cell(record.log2_fold_change),
                        "pvalue" => number_cell(record.pvalue),
                        _ => number_cell(record.padj),
                    }
                } else {
                    extra.next().cloned().unwrap_or_default()
                }
            })
            .collect();
        out.write_record(&row)?;
    }

    out.flush()?;
    Ok(())
}

/// Export the current selection to a file, the grid's `selection.csv`.
pub fn export_selection(
    path: &std::path::Path,
    state: &crate::explorer::ExplorerState,
) -> Result<(), LoadError> {
    let file = std::fs::File::create(path)?;
    write_selection(file, state)
}

fn number_cell(value: f64) -> String {
    if value.is_nan() {
        "NA".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::{BrushSelection, ExplorerState};

    #[test]
    fn test_parse_table_sniffs_tsv() {
        let table = parse_table("feature\tsymbol\tbaseMean\ng1\tTP53\t5\n").unwrap();
        assert_eq!(table.headers(), &["feature", "symbol", "baseMean"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.field(&table.rows()[0], "symbol"), Some("TP53"));
    }

    #[test]
    fn test_parse_table_sniffs_csv() {
        let table = parse_table("feature,symbol,baseMean\ng1,TP53,5\n").unwrap();
        assert_eq!(table.headers().len(), 3);
        assert_eq!(table.field(&table.rows()[0], "baseMean"), Some("5"));
    }

    #[test]
    fn test_load_dataset_pipeline() {
        let content = "feature\tsymbol\tbaseMean\tlog2FoldChange\tpadj\n\
                       g1\tTP53;WRAP53\t5\t2\t0.01\n\
                       g2\tMYC\t0.0001\t1\t0.5\n";
        let loaded = load_dataset("test".to_string(), content, "TP53".to_string()).unwrap();

        // g2 sits below the expression floor
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].symbols, vec!["TP53", "WRAP53"]);
        assert!(loaded.gene_index.get("WRAP53").is_some());
    }

    #[test]
    fn test_load_dataset_no_features() {
        let content = "feature\tsymbol\ng1\tTP53\n";
        let err = load_dataset("empty".to_string(), content, String::new()).unwrap_err();
        assert!(matches!(err, LoadError::Normalize(NormalizeError::NoFeaturesFound)));
    }

    #[test]
    fn test_sample_datasets_all_load() {
        for sample in SAMPLE_DATASETS.iter() {
            let loaded =
                load_dataset(sample.name.to_string(), sample.content, sample.seed.to_string())
                    .unwrap();
            assert!(!loaded.records.is_empty(), "{} yielded no records", sample.name);
        }
    }

    #[test]
    fn test_write_selection_round_trips_visible_rows() {
        let content = "feature\tsymbol\tbaseMean\tlog2FoldChange\tpadj\tstat\n\
                       g1\tTP53\t50\t2\t0.01\t3.5\n\
                       g2\tMYC\t5\t-1\tNA\t-1.2\n";
        let loaded = load_dataset("t".to_string(), content, String::new()).unwrap();
        let mut state = ExplorerState::default();
        state.commit(loaded);
        state.sync_brush(&BrushSelection::from_corners((0.0, -3.0), (100.0, 3.0)));

        let mut buf = Vec::new();
        write_selection(&mut buf, &state).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "feature,symbol,baseMean,log2FoldChange,pvalue,padj,stat"
        );
        // Published order: log2FoldChange descending after a sync
        assert_eq!(lines.next().unwrap(), "g1,TP53,50,2,NA,0.01,3.5");
        assert_eq!(lines.next().unwrap(), "g2,MYC,5,-1,NA,NA,-1.2");
    }
}

//! Shared data types for the explorer core

use std::collections::HashMap;
use thiserror::Error;

/// Smallest baseMean considered "expressed". Rows at or below this value are
/// dropped during normalization; it is an inclusion gate, not a user filter.
pub const EXPRESSION_FLOOR: f64 = 0.001;

/// A normalized differential-expression row.
///
/// `base_mean` is guaranteed to be greater than [`EXPRESSION_FLOOR`] and
/// `log2_fold_change` is always finite; `pvalue` and `padj` may be NaN when
/// the source table carried no usable value.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub feature: String,
    /// Primary display symbol (the symbol field, or the feature id when the
    /// source has no symbol column).
    pub symbol: String,
    /// The symbol field split on `;`, in source order.
    pub symbols: Vec<String>,
    pub base_mean: f64,
    pub log2_fold_change: f64,
    pub pvalue: f64,
    pub padj: f64,
    /// Pass-through source columns, aligned with the dataset's extra
    /// [`ColumnDescriptor`]s. Unvalidated.
    pub extra: Vec<String>,
}

/// One column of the published row set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    /// True for the six measured fields; false for pass-through extras
    /// (hidden in the grid by default).
    pub measured: bool,
}

/// A parsed but not yet normalized table: headers plus string cells, exactly
/// as the loader produced them.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();
        Self {
            headers,
            index,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell value for a named column, or None when the column does not exist
    /// or the row is ragged.
    pub fn field<'a>(&'a self, row: &'a [String], name: &str) -> Option<&'a str> {
        let col = *self.index.get(name)?;
        row.get(col).map(String::as_str)
    }
}

/// Normalization failure. Missing numeric fields are not errors (they resolve
/// through per-field fallback chains); the only hard failure is a table that
/// yields zero usable rows.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("no features found")]
    NoFeaturesFound,
}

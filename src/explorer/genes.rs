//! Gene symbol index
//!
//! Built once per dataset load from every record's symbol list; read-only
//! afterward. The search list holds entry ids so membership is by identity,
//! matching the "no duplicate entries" contract.

use super::types::Record;
use std::collections::BTreeMap;

/// A unique symbol and the number of records carrying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneEntry {
    pub symbol: String,
    pub count: usize,
}

/// Deduplicated, counted symbol index, entries sorted by symbol.
#[derive(Debug, Clone, Default)]
pub struct GeneIndex {
    entries: Vec<GeneEntry>,
    by_symbol: std::collections::HashMap<String, usize>,
}

impl GeneIndex {
    pub fn build(records: &[Record]) -> Self {
        log::info!("indexing unique symbols");

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for record in records {
            for symbol in &record.symbols {
                *counts.entry(symbol).or_insert(0) += 1;
            }
        }

        let entries: Vec<GeneEntry> = counts
            .into_iter()
            .map(|(symbol, count)| GeneEntry {
                symbol: symbol.to_string(),
                count,
            })
            .collect();
        let by_symbol = entries
            .iter()
            .enumerate()
            .map(|(id, e)| (e.symbol.clone(), id))
            .collect();

        log::info!("indexed {} unique symbols", entries.len());
        Self { entries, by_symbol }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[GeneEntry] {
        &self.entries
    }

    pub fn entry(&self, id: usize) -> &GeneEntry {
        &self.entries[id]
    }

    /// Entry id for an exact symbol, if indexed.
    pub fn get(&self, symbol: &str) -> Option<usize> {
        self.by_symbol.get(symbol).copied()
    }
}

/// Resolve each token of `text` (split on whitespace or `;`) against the
/// index and append entries not already in `list`. Unresolved tokens are
/// silently ignored; nothing is ever removed.
pub fn add_symbols(index: &GeneIndex, list: &mut Vec<usize>, text: &str) {
    for token in text.split(|c: char| c.is_whitespace() || c == ';') {
        if token.is_empty() {
            continue;
        }
        if let Some(id) = index.get(token) {
            if !list.contains(&id) {
                list.push(id);
            }
        }
    }
}

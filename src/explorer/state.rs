//! Explorer state container
//!
//! One owned container for everything reactive: dataset, filter state, gene
//! index and search list, cutoff parameters, and the published row set.
//! Collaborators never write fields directly; all mutation goes through the
//! named operations here so behavior stays deterministic and testable.

use super::filter::{DimensionKey, FilterEngine, ValueRange};
use super::genes::{self, GeneEntry, GeneIndex};
use super::selection::{self, BrushSelection};
use super::thresholds::{self, CutoffParams};
use super::types::{ColumnDescriptor, Record};

/// Everything a successful load produces. Assembled off the UI thread by
/// the loader pipeline and committed atomically; a failed load never
/// constructs one, so prior state is untouched by construction.
#[derive(Debug)]
pub struct LoadedDataset {
    pub name: String,
    pub records: Vec<Record>,
    pub columns: Vec<ColumnDescriptor>,
    pub gene_index: GeneIndex,
    /// Default gene-search seed for this dataset (may be empty).
    pub seed_symbols: String,
}

pub struct ExplorerState {
    name: String,
    records: Vec<Record>,
    columns: Vec<ColumnDescriptor>,
    filter: FilterEngine,
    gene_index: GeneIndex,
    gene_list: Vec<usize>,
    /// Published row set: record ids visible under the current filter
    /// state, in published order.
    visible: Vec<u32>,
    cutoff: CutoffParams,
}

impl Default for ExplorerState {
    fn default() -> Self {
        Self {
            name: String::new(),
            records: Vec::new(),
            columns: Vec::new(),
            filter: FilterEngine::build(&[]),
            gene_index: GeneIndex::default(),
            gene_list: Vec::new(),
            visible: Vec::new(),
            cutoff: CutoffParams::default(),
        }
    }
}

impl ExplorerState {
    /// Swap in a freshly loaded dataset wholesale: new filter indexes with
    /// default ranges, new gene index, cleared gene list (reseeded from the
    /// dataset's default search string), republished row set.
    pub fn commit(&mut self, loaded: LoadedDataset) {
        log::info!(
            "committing dataset '{}' ({} records)",
            loaded.name,
            loaded.records.len()
        );

        self.name = loaded.name;
        self.records = loaded.records;
        self.columns = loaded.columns;
        self.filter = FilterEngine::build(&self.records);
        self.gene_index = loaded.gene_index;
        self.gene_list.clear();
        self.visible = self.filter.top(DimensionKey::BaseMean, None);
        genes::add_symbols(&self.gene_index, &mut self.gene_list, &loaded.seed_symbols);
    }

    /// Apply a brush gesture and republish the visible row set.
    pub fn sync_brush(&mut self, brush: &BrushSelection) {
        selection::sync(&mut self.filter, brush);
        self.visible = self.filter.top(DimensionKey::Log2FoldChange, None);
    }

    /// Resolve `text` against the gene index and append new entries to the
    /// search list.
    pub fn add_symbols(&mut self, text: &str) {
        genes::add_symbols(&self.gene_index, &mut self.gene_list, text);
    }

    pub fn set_cutoff(&mut self, cutoff: CutoffParams) {
        self.cutoff = cutoff;
    }

    pub fn has_data(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, id: u32) -> &Record {
        &self.records[id as usize]
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// The externally visible row set, as record ids in published order.
    pub fn visible_rows(&self) -> &[u32] {
        &self.visible
    }

    pub fn range(&self, dim: DimensionKey) -> ValueRange {
        self.filter.range(dim)
    }

    pub fn cutoff(&self) -> CutoffParams {
        self.cutoff
    }

    pub fn gene_index(&self) -> &GeneIndex {
        &self.gene_index
    }

    pub fn gene_list(&self) -> impl Iterator<Item = &GeneEntry> {
        self.gene_list.iter().map(|&id| self.gene_index.entry(id))
    }

    pub fn gene_list_len(&self) -> usize {
        self.gene_list.len()
    }

    /// Searched symbols in highlight-rank order.
    pub fn searched_symbols(&self) -> Vec<String> {
        self.gene_list().map(|e| e.symbol.clone()).collect()
    }

    /// Cutoff-passing record counts, (up, down).
    pub fn up_down_counts(&self) -> (usize, usize) {
        thresholds::up_down_counts(&self.records, &self.cutoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(feature: &str, symbol: &str, base_mean: f64, log2_fold_change: f64) -> Record {
        Record {
            feature: feature.to_string(),
            symbol: symbol.to_string(),
            symbols: symbol.split(';').map(str::to_string).collect(),
            base_mean,
            log2_fold_change,
            pvalue: f64::NAN,
            padj: 0.01,
            extra: Vec::new(),
        }
    }

    fn loaded(seed: &str) -> LoadedDataset {
        let records = vec![
            rec("g1", "TP53", 50.0, 2.0),
            rec("g2", "BRCA1;TP53", 5.0, -1.0),
            rec("g3", "MYC", 500.0, 0.5),
        ];
        let gene_index = GeneIndex::build(&records);
        LoadedDataset {
            name: "test".to_string(),
            records,
            columns: Vec::new(),
            gene_index,
            seed_symbols: seed.to_string(),
        }
    }

    #[test]
    fn test_commit_publishes_by_base_mean_descending() {
        let mut state = ExplorerState::default();
        state.commit(loaded(""));

        assert!(state.has_data());
        assert_eq!(state.visible_rows(), &[2, 0, 1]);
        assert_eq!(state.range(DimensionKey::BaseMean).lo, 0.01);
    }

    #[test]
    fn test_commit_reseeds_gene_list() {
        let mut state = ExplorerState::default();
        state.commit(loaded("TP53 NOPE"));
        assert_eq!(state.searched_symbols(), vec!["TP53"]);

        // A new load clears the list and seeds afresh
        state.commit(loaded("MYC"));
        assert_eq!(state.searched_symbols(), vec!["MYC"]);
    }

    #[test]
    fn test_sync_brush_republishes_by_fold_change() {
        let mut state = ExplorerState::default();
        state.commit(loaded(""));

        state.sync_brush(&BrushSelection::from_corners((0.0, -2.0), (100.0, 2.0)));
        // g3 (baseMean 500) is brushed out; remaining ordered by l2fc desc
        assert_eq!(state.visible_rows(), &[0, 1]);

        state.sync_brush(&BrushSelection::Cleared);
        assert_eq!(state.visible_rows().len(), 3);
    }

    #[test]
    fn test_add_symbols_is_idempotent_through_state() {
        let mut state = ExplorerState::default();
        state.commit(loaded(""));

        state.add_symbols("TP53;BRCA1");
        let once = state.gene_list_len();
        state.add_symbols("TP53;BRCA1");
        assert_eq!(state.gene_list_len(), once);
        assert_eq!(once, 2);
    }

    #[test]
    fn test_up_down_counts_follow_cutoff() {
        let mut state = ExplorerState::default();
        state.commit(loaded(""));

        // Defaults: padj <= 0.1, |l2fc| > 0 — all three pass
        assert_eq!(state.up_down_counts(), (2, 1));

        state.set_cutoff(CutoffParams {
            log_padj_cut: -1.0,
            fold_change_cut: 1.0,
        });
        assert_eq!(state.up_down_counts(), (1, 0));
    }
}

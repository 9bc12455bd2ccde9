//! Threshold predicates
//!
//! Pure functions over a single record, safe to evaluate for every point on
//! every redraw. Nothing here mutates shared state.

use super::types::Record;
use serde::{Deserialize, Serialize};

/// User-adjustable cutoff parameters. The FDR cutoff is driven by a
/// log-scale control, so the raw slider value is stored and the linear
/// cutoff derived on demand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutoffParams {
    /// log10 of the adjusted-p cutoff; the slider runs -5..=0.
    pub log_padj_cut: f64,
    /// Minimum |log2 fold change| (exclusive).
    pub fold_change_cut: f64,
}

impl Default for CutoffParams {
    fn default() -> Self {
        Self {
            log_padj_cut: -1.0,
            fold_change_cut: 0.0,
        }
    }
}

impl CutoffParams {
    /// Linear adjusted-p cutoff: `10^log_padj_cut`.
    pub fn padj_cut(&self) -> f64 {
        10f64.powf(self.log_padj_cut)
    }
}

/// Significance test: adjusted p at or below the cutoff AND absolute fold
/// change strictly above the cutoff. A NaN `padj` never passes.
pub fn passes_cutoff(record: &Record, padj_cut: f64, fold_change_cut: f64) -> bool {
    record.padj <= padj_cut && record.log2_fold_change.abs() > fold_change_cut
}

/// Position in `searched` of the first of the record's symbols that appears
/// there, or `None` when the record matches no searched symbol. The rank
/// selects the highlight color.
pub fn highlight_rank(record: &Record, searched: &[String]) -> Option<usize> {
    record
        .symbols
        .iter()
        .find_map(|symbol| searched.iter().position(|s| s == symbol))
}

/// Counts of cutoff-passing records with positive / non-positive fold
/// change.
pub fn up_down_counts(records: &[Record], params: &CutoffParams) -> (usize, usize) {
    let padj_cut = params.padj_cut();
    let passing = records
        .iter()
        .filter(|r| passes_cutoff(r, padj_cut, params.fold_change_cut));
    let (mut up, mut down) = (0, 0);
    for record in passing {
        if record.log2_fold_change > 0.0 {
            up += 1;
        } else {
            down += 1;
        }
    }
    (up, down)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(log2_fold_change: f64, padj: f64) -> Record {
        Record {
            feature: "g".to_string(),
            symbol: "g".to_string(),
            symbols: vec!["g".to_string()],
            base_mean: 5.0,
            log2_fold_change,
            pvalue: f64::NAN,
            padj,
            extra: Vec::new(),
        }
    }

    #[test]
    fn test_cutoff_spec_scenario() {
        // padj=0.01, l2fc=2 against pAdjCut=0.1, foldChangeCut=0
        assert!(passes_cutoff(&rec(2.0, 0.01), 0.1, 0.0));
    }

    #[test]
    fn test_cutoff_requires_both_conditions() {
        assert!(!passes_cutoff(&rec(2.0, 0.5), 0.1, 0.0)); // padj too high
        assert!(!passes_cutoff(&rec(0.5, 0.01), 0.1, 1.0)); // |l2fc| too low
        assert!(!passes_cutoff(&rec(-1.0, 0.01), 0.1, 1.0)); // exclusive bound
        assert!(passes_cutoff(&rec(-1.5, 0.01), 0.1, 1.0)); // negative fold change counts
    }

    #[test]
    fn test_nan_padj_never_passes() {
        assert!(!passes_cutoff(&rec(3.0, f64::NAN), 0.1, 0.0));
    }

    #[test]
    fn test_cutoff_is_pure() {
        let r = rec(2.0, 0.01);
        let first = passes_cutoff(&r, 0.1, 0.0);
        for _ in 0..10 {
            assert_eq!(passes_cutoff(&r, 0.1, 0.0), first);
        }
    }

    #[test]
    fn test_padj_cut_derivation() {
        let params = CutoffParams {
            log_padj_cut: -2.0,
            fold_change_cut: 0.0,
        };
        assert!((params.padj_cut() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_highlight_rank_first_match_wins() {
        let searched = vec!["BRCA1".to_string(), "TP53".to_string()];
        let mut r = rec(0.0, f64::NAN);
        r.symbols = vec!["TP53".to_string(), "BRCA1".to_string()];

        // TP53 is the record's first symbol with any match; its rank in the
        // searched list is 1
        assert_eq!(highlight_rank(&r, &searched), Some(1));
    }

    #[test]
    fn test_highlight_rank_none_without_match() {
        let searched = vec!["MYC".to_string()];
        assert_eq!(highlight_rank(&rec(0.0, f64::NAN), &searched), None);
        assert_eq!(highlight_rank(&rec(0.0, f64::NAN), &[]), None);
    }

    #[test]
    fn test_up_down_counts_partition_passing_set() {
        let records = vec![
            rec(2.0, 0.01),
            rec(1.0, 0.02),
            rec(-1.5, 0.01),
            rec(3.0, 0.9),       // fails padj
            rec(0.0, 0.01),      // fails fold change at cut 0 (exclusive)
        ];
        let params = CutoffParams::default(); // padj <= 0.1, |l2fc| > 0

        assert_eq!(up_down_counts(&records, &params), (2, 1));
    }
}

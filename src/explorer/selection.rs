//! Brush-to-filter synchronization
//!
//! Translates the chart's 2-D brush rectangle into per-dimension filter
//! ranges. The axis mapping is fixed: brush x spans baseMean, brush y spans
//! log2FoldChange. A chart with swapped axes would change only [`sync`].

use super::filter::{DimensionKey, FilterEngine, ValueRange};

/// Outcome of a brush gesture, in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BrushSelection {
    /// The brush was cleared (empty rectangle).
    Cleared,
    /// A rectangle spanning the given x and y extents, each `lo <= hi`.
    Extent { x: [f64; 2], y: [f64; 2] },
}

impl BrushSelection {
    /// Build an extent from two opposite corners, normalizing each axis to
    /// `lo <= hi`.
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self::Extent {
            x: [a.0.min(b.0), a.0.max(b.0)],
            y: [a.1.min(b.1), a.1.max(b.1)],
        }
    }
}

/// Apply a brush to the filter state: an extent sets both dimension ranges,
/// a cleared brush restores both defaults. Idempotent.
pub fn sync(filter: &mut FilterEngine, brush: &BrushSelection) {
    match brush {
        BrushSelection::Cleared => filter.reset_ranges(),
        BrushSelection::Extent { x, y } => {
            filter.set_range(DimensionKey::BaseMean, ValueRange::new(x[0], x[1]));
            filter.set_range(DimensionKey::Log2FoldChange, ValueRange::new(y[0], y[1]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::filter::{
        DEFAULT_BASE_MEAN_RANGE, DEFAULT_LOG2_FOLD_CHANGE_RANGE,
    };
    use crate::explorer::types::Record;

    fn rec(base_mean: f64, log2_fold_change: f64) -> Record {
        Record {
            feature: "g".to_string(),
            symbol: "g".to_string(),
            symbols: vec!["g".to_string()],
            base_mean,
            log2_fold_change,
            pvalue: f64::NAN,
            padj: f64::NAN,
            extra: Vec::new(),
        }
    }

    #[test]
    fn test_extent_sets_both_ranges() {
        let records = vec![rec(5.0, 0.0), rec(20.0, 1.0), rec(5.0, 3.0)];
        let mut filter = FilterEngine::build(&records);

        sync(
            &mut filter,
            &BrushSelection::from_corners((0.0, -2.0), (10.0, 2.0)),
        );

        assert_eq!(
            filter.range(DimensionKey::BaseMean),
            ValueRange::new(0.0, 10.0)
        );
        assert_eq!(
            filter.range(DimensionKey::Log2FoldChange),
            ValueRange::new(-2.0, 2.0)
        );
        // Only the record inside both extents remains visible
        assert_eq!(filter.visible(), vec![0]);
    }

    #[test]
    fn test_corners_normalize_in_any_order() {
        let mut filter = FilterEngine::build(&[rec(5.0, 0.0)]);

        sync(
            &mut filter,
            &BrushSelection::from_corners((10.0, 2.0), (0.0, -2.0)),
        );

        assert_eq!(
            filter.range(DimensionKey::BaseMean),
            ValueRange::new(0.0, 10.0)
        );
        assert_eq!(
            filter.range(DimensionKey::Log2FoldChange),
            ValueRange::new(-2.0, 2.0)
        );
    }

    #[test]
    fn test_clear_resets_defaults_regardless_of_prior_state() {
        let mut filter = FilterEngine::build(&[rec(5.0, 0.0), rec(0.02, -4.0)]);
        sync(
            &mut filter,
            &BrushSelection::from_corners((1.0, -1.0), (2.0, 1.0)),
        );

        sync(&mut filter, &BrushSelection::Cleared);
        assert_eq!(
            filter.range(DimensionKey::BaseMean),
            DEFAULT_BASE_MEAN_RANGE
        );
        assert_eq!(
            filter.range(DimensionKey::Log2FoldChange),
            DEFAULT_LOG2_FOLD_CHANGE_RANGE
        );
    }

    #[test]
    fn test_sync_is_idempotent() {
        let records = vec![rec(5.0, 0.0), rec(20.0, 1.0), rec(8.0, -1.5)];
        let mut filter = FilterEngine::build(&records);
        let brush = BrushSelection::from_corners((0.0, -2.0), (10.0, 2.0));

        sync(&mut filter, &brush);
        let first = filter.visible();
        sync(&mut filter, &brush);
        assert_eq!(filter.visible(), first);

        sync(&mut filter, &BrushSelection::Cleared);
        let cleared = filter.visible();
        sync(&mut filter, &BrushSelection::Cleared);
        assert_eq!(filter.visible(), cleared);
    }
}

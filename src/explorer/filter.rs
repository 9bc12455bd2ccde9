//! Indexed range filtering over the two numeric dimensions
//!
//! Each dimension keeps a by-record value table plus an index of record ids
//! sorted by value, so a range query is two binary searches and a walk over
//! the matching slice. Indexes are rebuilt wholesale on dataset load; there
//! is no incremental per-row update.

use super::types::Record;

/// The two filterable projections of a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionKey {
    BaseMean,
    Log2FoldChange,
}

/// Inclusive numeric range `[lo, hi]`. Unbounded ends use infinities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub lo: f64,
    pub hi: f64,
}

impl ValueRange {
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lo && value <= self.hi
    }
}

/// Default baseMean range: everything meaningfully expressed.
pub const DEFAULT_BASE_MEAN_RANGE: ValueRange = ValueRange::new(0.01, f64::INFINITY);
/// Default log2FoldChange range: unbounded.
pub const DEFAULT_LOG2_FOLD_CHANGE_RANGE: ValueRange =
    ValueRange::new(f64::NEG_INFINITY, f64::INFINITY);

#[derive(Debug, Clone)]
struct DimensionIndex {
    /// Projection value per record id.
    values: Vec<f64>,
    /// Record ids sorted ascending by projection value.
    sorted: Vec<u32>,
    range: ValueRange,
}

impl DimensionIndex {
    fn build(values: Vec<f64>, range: ValueRange) -> Self {
        let mut sorted: Vec<u32> = (0..values.len() as u32).collect();
        // Neither dimension is ever NaN by the normalizer invariant, so
        // total_cmp agrees with the numeric order here.
        sorted.sort_by(|a, b| values[*a as usize].total_cmp(&values[*b as usize]));
        Self {
            values,
            sorted,
            range,
        }
    }

    fn in_range(&self, id: u32) -> bool {
        self.range.contains(self.values[id as usize])
    }

    /// Ids inside the current range, ascending by value. An inverted range
    /// (`lo > hi`) matches nothing.
    fn range_slice(&self) -> &[u32] {
        let lo = self
            .sorted
            .partition_point(|&id| self.values[id as usize] < self.range.lo);
        let hi = self
            .sorted
            .partition_point(|&id| self.values[id as usize] <= self.range.hi);
        &self.sorted[lo..hi.max(lo)]
    }
}

/// Range filters over both dimensions of a loaded dataset. The visible set
/// is always the logical AND of the two active ranges.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    base_mean: DimensionIndex,
    log2_fold_change: DimensionIndex,
}

impl FilterEngine {
    pub fn build(records: &[Record]) -> Self {
        Self {
            base_mean: DimensionIndex::build(
                records.iter().map(|r| r.base_mean).collect(),
                DEFAULT_BASE_MEAN_RANGE,
            ),
            log2_fold_change: DimensionIndex::build(
                records.iter().map(|r| r.log2_fold_change).collect(),
                DEFAULT_LOG2_FOLD_CHANGE_RANGE,
            ),
        }
    }

    pub fn default_range(dim: DimensionKey) -> ValueRange {
        match dim {
            DimensionKey::BaseMean => DEFAULT_BASE_MEAN_RANGE,
            DimensionKey::Log2FoldChange => DEFAULT_LOG2_FOLD_CHANGE_RANGE,
        }
    }

    fn index(&self, dim: DimensionKey) -> &DimensionIndex {
        match dim {
            DimensionKey::BaseMean => &self.base_mean,
            DimensionKey::Log2FoldChange => &self.log2_fold_change,
        }
    }

    fn other(&self, dim: DimensionKey) -> &DimensionIndex {
        match dim {
            DimensionKey::BaseMean => &self.log2_fold_change,
            DimensionKey::Log2FoldChange => &self.base_mean,
        }
    }

    /// Replace one dimension's active range. The other dimension is
    /// untouched.
    pub fn set_range(&mut self, dim: DimensionKey, range: ValueRange) {
        match dim {
            DimensionKey::BaseMean => self.base_mean.range = range,
            DimensionKey::Log2FoldChange => self.log2_fold_change.range = range,
        }
    }

    /// Both dimensions back to their documented defaults.
    pub fn reset_ranges(&mut self) {
        self.base_mean.range = Self::default_range(DimensionKey::BaseMean);
        self.log2_fold_change.range = Self::default_range(DimensionKey::Log2FoldChange);
    }

    pub fn range(&self, dim: DimensionKey) -> ValueRange {
        self.index(dim).range
    }

    /// All record ids satisfying both ranges. Ordering is stable for a fixed
    /// filter state but otherwise unspecified; callers wanting a particular
    /// order use [`FilterEngine::top`].
    pub fn visible(&self) -> Vec<u32> {
        self.top(DimensionKey::BaseMean, None)
    }

    /// Record ids satisfying both ranges, ordered by `dim`'s value
    /// descending, optionally capped at `limit`.
    pub fn top(&self, dim: DimensionKey, limit: Option<usize>) -> Vec<u32> {
        let other = self.other(dim);
        let matching = self
            .index(dim)
            .range_slice()
            .iter()
            .rev()
            .copied()
            .filter(|&id| other.in_range(id));
        match limit {
            Some(n) => matching.take(n).collect(),
            None => matching.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(feature: &str, base_mean: f64, log2_fold_change: f64) -> Record {
        Record {
            feature: feature.to_string(),
            symbol: feature.to_string(),
            symbols: vec![feature.to_string()],
            base_mean,
            log2_fold_change,
            pvalue: f64::NAN,
            padj: f64::NAN,
            extra: Vec::new(),
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            rec("a", 0.005, -3.0),
            rec("b", 0.5, -1.0),
            rec("c", 2.0, 0.5),
            rec("d", 10.0, 2.0),
            rec("e", 100.0, 4.0),
        ]
    }

    fn as_set(ids: &[u32]) -> std::collections::BTreeSet<u32> {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_default_ranges_apply_base_mean_floor() {
        let engine = FilterEngine::build(&sample());
        // "a" sits below the 0.01 default floor
        assert_eq!(as_set(&engine.visible()), as_set(&[1, 2, 3, 4]));
    }

    #[test]
    fn test_visible_equals_brute_force_and() {
        let records = sample();
        let mut engine = FilterEngine::build(&records);
        engine.set_range(DimensionKey::BaseMean, ValueRange::new(0.0, 10.0));
        engine.set_range(DimensionKey::Log2FoldChange, ValueRange::new(-2.0, 2.0));

        let expected: std::collections::BTreeSet<u32> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| {
                (0.0..=10.0).contains(&r.base_mean)
                    && (-2.0..=2.0).contains(&r.log2_fold_change)
            })
            .map(|(i, _)| i as u32)
            .collect();

        assert_eq!(as_set(&engine.visible()), expected);
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let mut engine = FilterEngine::build(&sample());
        engine.set_range(DimensionKey::BaseMean, ValueRange::new(0.5, 10.0));
        engine.set_range(DimensionKey::Log2FoldChange, ValueRange::new(-1.0, 2.0));

        // "b" at baseMean=0.5/l2fc=-1.0 and "d" at 10.0/2.0 sit exactly on
        // the bounds
        assert_eq!(as_set(&engine.visible()), as_set(&[1, 2, 3]));
    }

    #[test]
    fn test_set_range_leaves_other_dimension_alone() {
        let mut engine = FilterEngine::build(&sample());
        engine.set_range(DimensionKey::Log2FoldChange, ValueRange::new(0.0, 5.0));
        assert_eq!(
            engine.range(DimensionKey::BaseMean),
            DEFAULT_BASE_MEAN_RANGE
        );

        engine.set_range(DimensionKey::BaseMean, ValueRange::new(1.0, 50.0));
        assert_eq!(
            engine.range(DimensionKey::Log2FoldChange),
            ValueRange::new(0.0, 5.0)
        );
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut engine = FilterEngine::build(&sample());
        engine.set_range(DimensionKey::BaseMean, ValueRange::new(1.0, 2.0));
        engine.set_range(DimensionKey::Log2FoldChange, ValueRange::new(0.0, 1.0));

        engine.reset_ranges();
        assert_eq!(
            engine.range(DimensionKey::BaseMean),
            DEFAULT_BASE_MEAN_RANGE
        );
        assert_eq!(
            engine.range(DimensionKey::Log2FoldChange),
            DEFAULT_LOG2_FOLD_CHANGE_RANGE
        );
    }

    #[test]
    fn test_top_orders_descending_and_caps() {
        let engine = FilterEngine::build(&sample());

        let all = engine.top(DimensionKey::BaseMean, None);
        assert_eq!(all, vec![4, 3, 2, 1]);

        let capped = engine.top(DimensionKey::Log2FoldChange, Some(2));
        assert_eq!(capped, vec![4, 3]);
    }

    #[test]
    fn test_ordering_stable_for_fixed_state() {
        let mut engine = FilterEngine::build(&sample());
        engine.set_range(DimensionKey::Log2FoldChange, ValueRange::new(-2.0, 4.0));
        assert_eq!(engine.visible(), engine.visible());
        assert_eq!(
            engine.top(DimensionKey::Log2FoldChange, None),
            engine.top(DimensionKey::Log2FoldChange, None)
        );
    }
}

//! Interactive filtering and render-scheduling core
//!
//! Everything stateful lives here: dataset normalization, the two indexed
//! filter dimensions, threshold predicates, brush synchronization, the gene
//! index, and the debounced render scheduler. The UI shell, chart painter,
//! and file loader are collaborators reached only through the types and
//! operations re-exported below.

pub mod filter;
pub mod genes;
pub mod normalize;
pub mod render;
pub mod schedule;
pub mod selection;
pub mod state;
pub mod thresholds;
pub mod types;

pub use filter::{DimensionKey, FilterEngine, ValueRange};
pub use genes::{add_symbols, GeneEntry, GeneIndex};
pub use normalize::normalize_table;
pub use render::{run_render_pass, ChartRenderer, PointStyle};
pub use schedule::{RenderPass, RenderScheduler, QUIET_INTERVAL};
pub use selection::BrushSelection;
pub use state::{ExplorerState, LoadedDataset};
pub use thresholds::{highlight_rank, passes_cutoff, CutoffParams};
pub use types::{ColumnDescriptor, NormalizeError, RawTable, Record, EXPRESSION_FLOOR};

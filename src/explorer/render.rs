//! Chart renderer capability
//!
//! The core never touches a drawing library; it dispatches scheduled render
//! passes through this trait, and the shell provides the concrete painter.

use super::schedule::RenderPass;
use super::types::Record;

/// Reactive styling inputs consumed by the chart on every pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PointStyle {
    pub padj_cut: f64,
    pub fold_change_cut: f64,
    /// Point opacity, 0..=1.
    pub alpha: f32,
    /// Searched symbols in highlight-rank order.
    pub searched: Vec<String>,
    /// Density (hex-binned) mode instead of individual points.
    pub density: bool,
}

pub trait ChartRenderer {
    /// Complete chart reconstruction: recompute bounds and the cached point
    /// set from the dataset.
    fn draw(&mut self, records: &[Record], style: &PointStyle);

    /// Restyle point colors/visibility without rebuilding chart structure.
    fn update_points(&mut self, records: &[Record], style: &PointStyle);
}

/// Execute one scheduled pass against the collaborator.
pub fn run_render_pass(
    pass: RenderPass,
    chart: &mut dyn ChartRenderer,
    records: &[Record],
    style: &PointStyle,
) {
    match pass {
        RenderPass::Full => chart.draw(records, style),
        RenderPass::PointsOnly => chart.update_points(records, style),
    }
}

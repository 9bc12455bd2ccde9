//! Scatter/density chart
//!
//! Concrete [`ChartRenderer`]: `draw` rebuilds axis bounds and the cached
//! point set, `update_points` restyles in place, and the per-frame `ui`
//! pass paints from the cache and turns drag gestures into brush
//! selections in data coordinates.

use crate::explorer::{
    highlight_rank, passes_cutoff, BrushSelection, ChartRenderer, PointStyle, Record,
};
use eframe::egui;
use std::collections::HashMap;

/// Highlight colors by searched-gene rank, cycled past ten.
const HIGHLIGHT_PALETTE: [egui::Color32; 10] = [
    egui::Color32::from_rgb(31, 119, 180),
    egui::Color32::from_rgb(255, 127, 14),
    egui::Color32::from_rgb(44, 160, 44),
    egui::Color32::from_rgb(214, 39, 40),
    egui::Color32::from_rgb(148, 103, 189),
    egui::Color32::from_rgb(140, 86, 75),
    egui::Color32::from_rgb(227, 119, 194),
    egui::Color32::from_rgb(127, 127, 127),
    egui::Color32::from_rgb(188, 189, 34),
    egui::Color32::from_rgb(23, 190, 207),
];

const SIGNIFICANT_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 60, 50);
const BACKGROUND_COLOR: egui::Color32 = egui::Color32::from_rgb(24, 24, 28);
const POINT_COLOR: egui::Color32 = egui::Color32::from_rgb(130, 130, 140);

pub fn highlight_color(rank: usize) -> egui::Color32 {
    HIGHLIGHT_PALETTE[rank % HIGHLIGHT_PALETTE.len()]
}

/// One cached, styled point. `x` is log10(baseMean), `y` the fold change;
/// display fields are copied in so the tooltip needs no dataset access.
struct ChartPoint {
    x: f64,
    y: f64,
    symbol: String,
    base_mean: f64,
    padj: f64,
    significant: bool,
    highlight: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    x: [f64; 2],
    y: [f64; 2],
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            x: [-2.0, 5.0],
            y: [-4.0, 4.0],
        }
    }
}

pub struct ScatterChart {
    points: Vec<ChartPoint>,
    bounds: Bounds,
    density: bool,
    alpha: f32,
    /// Committed brush rectangle in data coordinates (baseMean and fold
    /// change extents), kept so the overlay survives resizes.
    brush: Option<([f64; 2], [f64; 2])>,
    drag_anchor: Option<egui::Pos2>,
    drag_pos: Option<egui::Pos2>,
}

impl Default for ScatterChart {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            bounds: Bounds::default(),
            density: true,
            alpha: 0.8,
            brush: None,
            drag_anchor: None,
            drag_pos: None,
        }
    }
}

impl ChartRenderer for ScatterChart {
    fn draw(&mut self, records: &[Record], style: &PointStyle) {
        self.bounds = compute_bounds(records);
        self.brush = None;
        self.points = records
            .iter()
            .map(|r| ChartPoint {
                x: r.base_mean.log10(),
                y: r.log2_fold_change,
                symbol: r.symbol.clone(),
                base_mean: r.base_mean,
                padj: r.padj,
                significant: false,
                highlight: None,
            })
            .collect();
        self.restyle(records, style);
    }

    fn update_points(&mut self, records: &[Record], style: &PointStyle) {
        if records.len() != self.points.len() {
            // Structure changed underneath us; a restyle alone cannot cover it
            self.draw(records, style);
            return;
        }
        self.restyle(records, style);
    }
}

impl ScatterChart {
    fn restyle(&mut self, records: &[Record], style: &PointStyle) {
        self.density = style.density;
        self.alpha = style.alpha;
        for (point, record) in self.points.iter_mut().zip(records) {
            point.significant = passes_cutoff(record, style.padj_cut, style.fold_change_cut);
            point.highlight = highlight_rank(record, &style.searched);
        }
    }

    /// Paint the chart and handle brush gestures. Returns a selection when
    /// a drag ends or a click clears the active brush.
    pub fn ui(&mut self, ui: &mut egui::Ui) -> Option<BrushSelection> {
        let height = ui.available_height().clamp(240.0, 560.0);
        let width = ui.available_width();
        let (response, painter) =
            ui.allocate_painter(egui::vec2(width, height), egui::Sense::click_and_drag());
        let rect = response.rect.shrink2(egui::vec2(44.0, 24.0));

        painter.rect_filled(response.rect, 2.0, BACKGROUND_COLOR);

        if self.points.is_empty() {
            painter.text(
                response.rect.center(),
                egui::Align2::CENTER_CENTER,
                "Load a dataset to begin",
                egui::FontId::proportional(14.0),
                egui::Color32::GRAY,
            );
            return None;
        }

        self.paint_axes(&painter, rect);
        if self.density {
            self.paint_density(&painter, rect);
        } else {
            self.paint_scatter(&painter, rect);
        }
        self.paint_highlights(&painter, rect);
        self.paint_brush(&painter, rect);
        self.hover_tooltip(&response, rect);

        self.handle_gestures(&response, rect)
    }

    fn to_screen(&self, rect: egui::Rect, x: f64, y: f64) -> egui::Pos2 {
        let bx = self.bounds.x;
        let by = self.bounds.y;
        let fx = ((x - bx[0]) / (bx[1] - bx[0])) as f32;
        let fy = ((y - by[0]) / (by[1] - by[0])) as f32;
        egui::pos2(
            rect.left() + fx * rect.width(),
            rect.bottom() - fy * rect.height(),
        )
    }

    /// Screen position back to (log10 baseMean, fold change).
    fn from_screen(&self, rect: egui::Rect, pos: egui::Pos2) -> (f64, f64) {
        let bx = self.bounds.x;
        let by = self.bounds.y;
        let fx = ((pos.x - rect.left()) / rect.width()) as f64;
        let fy = ((rect.bottom() - pos.y) / rect.height()) as f64;
        (bx[0] + fx * (bx[1] - bx[0]), by[0] + fy * (by[1] - by[0]))
    }

    fn paint_axes(&self, painter: &egui::Painter, rect: egui::Rect) {
        let axis_stroke = egui::Stroke::new(1.0, egui::Color32::from_gray(90));
        let grid_stroke = egui::Stroke::new(0.5, egui::Color32::from_gray(45));

        painter.line_segment([rect.left_bottom(), rect.right_bottom()], axis_stroke);
        painter.line_segment([rect.left_top(), rect.left_bottom()], axis_stroke);

        // x ticks at integer exponents of baseMean
        let k_lo = self.bounds.x[0].ceil() as i32;
        let k_hi = self.bounds.x[1].floor() as i32;
        for k in k_lo..=k_hi {
            let p = self.to_screen(rect, k as f64, self.bounds.y[0]);
            painter.line_segment(
                [egui::pos2(p.x, rect.top()), egui::pos2(p.x, rect.bottom())],
                grid_stroke,
            );
            painter.text(
                egui::pos2(p.x, rect.bottom() + 4.0),
                egui::Align2::CENTER_TOP,
                exponent_label(k),
                egui::FontId::proportional(10.0),
                egui::Color32::GRAY,
            );
        }

        // y ticks at integer fold changes, thinned to at most ~9 labels
        let span = (self.bounds.y[1] - self.bounds.y[0]).max(1.0);
        let step = (span / 8.0).ceil().max(1.0) as i64;
        let y_lo = self.bounds.y[0].ceil() as i64;
        let y_hi = self.bounds.y[1].floor() as i64;
        for v in (y_lo..=y_hi).filter(|v| v % step == 0) {
            let p = self.to_screen(rect, self.bounds.x[0], v as f64);
            painter.line_segment(
                [egui::pos2(rect.left(), p.y), egui::pos2(rect.right(), p.y)],
                grid_stroke,
            );
            painter.text(
                egui::pos2(rect.left() - 5.0, p.y),
                egui::Align2::RIGHT_CENTER,
                format!("{}", v),
                egui::FontId::proportional(10.0),
                egui::Color32::GRAY,
            );
        }

        painter.text(
            egui::pos2(rect.right(), rect.bottom() + 14.0),
            egui::Align2::RIGHT_TOP,
            "baseMean (log scale)",
            egui::FontId::proportional(10.0),
            egui::Color32::LIGHT_GRAY,
        );
        painter.text(
            egui::pos2(rect.left() + 4.0, rect.top()),
            egui::Align2::LEFT_TOP,
            "log2 fold change",
            egui::FontId::proportional(10.0),
            egui::Color32::LIGHT_GRAY,
        );
    }

    fn paint_scatter(&self, painter: &egui::Painter, rect: egui::Rect) {
        let alpha = (self.alpha * 255.0) as u8;
        for point in self.points.iter().filter(|p| p.highlight.is_none()) {
            let color = if point.significant {
                SIGNIFICANT_COLOR
            } else {
                POINT_COLOR
            };
            painter.circle_filled(
                self.to_screen(rect, point.x, point.y),
                2.0,
                with_alpha(color, alpha),
            );
        }
    }

    fn paint_density(&self, painter: &egui::Painter, rect: egui::Rect) {
        let radius: f32 = 7.0;
        let hex_w = radius * 3f32.sqrt();
        let row_h = radius * 1.5;

        // Offset-row binning: odd rows shift half a cell
        let mut bins: HashMap<(i32, i32), usize> = HashMap::new();
        for point in &self.points {
            let pos = self.to_screen(rect, point.x, point.y);
            let row = ((pos.y - rect.top()) / row_h).floor() as i32;
            let offset = if row % 2 != 0 { hex_w / 2.0 } else { 0.0 };
            let col = ((pos.x - rect.left() - offset) / hex_w).floor() as i32;
            *bins.entry((col, row)).or_insert(0) += 1;
        }

        let max_count = bins.values().copied().max().unwrap_or(1) as f64;
        let alpha = (self.alpha * 255.0) as u8;
        for ((col, row), count) in bins {
            let offset = if row % 2 != 0 { hex_w / 2.0 } else { 0.0 };
            let center = egui::pos2(
                rect.left() + offset + col as f32 * hex_w + hex_w / 2.0,
                rect.top() + row as f32 * row_h + radius / 2.0,
            );
            let t = (count as f64).ln_1p() / max_count.ln_1p();
            painter.add(egui::Shape::convex_polygon(
                hexagon(center, radius),
                with_alpha(density_color(t), alpha),
                egui::Stroke::NONE,
            ));
        }
    }

    fn paint_highlights(&self, painter: &egui::Painter, rect: egui::Rect) {
        for point in &self.points {
            if let Some(rank) = point.highlight {
                let pos = self.to_screen(rect, point.x, point.y);
                painter.circle_filled(pos, 4.0, highlight_color(rank));
                painter.circle_stroke(
                    pos,
                    4.0,
                    egui::Stroke::new(1.0, egui::Color32::WHITE),
                );
            }
        }
    }

    fn paint_brush(&self, painter: &egui::Painter, rect: egui::Rect) {
        let screen_rect = if let (Some(anchor), Some(pos)) = (self.drag_anchor, self.drag_pos) {
            Some(egui::Rect::from_two_pos(anchor, pos))
        } else {
            self.brush.map(|(x, y)| {
                let a = self.to_screen(rect, x[0].log10(), y[0]);
                let b = self.to_screen(rect, x[1].log10(), y[1]);
                egui::Rect::from_two_pos(a, b)
            })
        };

        if let Some(r) = screen_rect {
            painter.rect_filled(
                r,
                0.0,
                egui::Color32::from_rgba_unmultiplied(120, 160, 255, 32),
            );
            painter.rect_stroke(
                r,
                0.0,
                egui::Stroke::new(1.0, egui::Color32::from_rgb(150, 180, 255)),
                egui::StrokeKind::Inside,
            );
        }
    }

    fn hover_tooltip(&self, response: &egui::Response, rect: egui::Rect) {
        if self.drag_anchor.is_some() {
            return;
        }
        let Some(pointer) = response.hover_pos() else {
            return;
        };

        let mut best: Option<(f32, &ChartPoint)> = None;
        for point in &self.points {
            let d = self.to_screen(rect, point.x, point.y).distance(pointer);
            if d < 8.0 && best.map(|(bd, _)| d < bd).unwrap_or(true) {
                best = Some((d, point));
            }
        }

        if let Some((_, point)) = best {
            let padj = if point.padj.is_nan() {
                "NA".to_string()
            } else {
                format!("{:.3e}", point.padj)
            };
            response.clone().on_hover_text(format!(
                "{}\nbaseMean: {:.2}\nlog2FC: {:.3}\nFDR: {}",
                point.symbol, point.base_mean, point.y, padj
            ));
        }
    }

    fn handle_gestures(
        &mut self,
        response: &egui::Response,
        rect: egui::Rect,
    ) -> Option<BrushSelection> {
        if response.drag_started() {
            self.drag_anchor = response.interact_pointer_pos();
            self.drag_pos = self.drag_anchor;
        } else if response.dragged() {
            self.drag_pos = response.interact_pointer_pos();
        }

        if response.drag_stopped() {
            let (anchor, pos) = (self.drag_anchor.take(), self.drag_pos.take());
            if let (Some(anchor), Some(pos)) = (anchor, pos) {
                let dragged_rect = egui::Rect::from_two_pos(anchor, pos);
                if dragged_rect.width() < 3.0 || dragged_rect.height() < 3.0 {
                    // Degenerate drag counts as clearing the brush
                    self.brush = None;
                    return Some(BrushSelection::Cleared);
                }

                let (ax, ay) = self.from_screen(rect, anchor);
                let (bx, by) = self.from_screen(rect, pos);
                // x is log10(baseMean); the selection carries linear units
                let x = [10f64.powf(ax.min(bx)), 10f64.powf(ax.max(bx))];
                let y = [ay.min(by), ay.max(by)];
                self.brush = Some((x, y));
                return Some(BrushSelection::from_corners((x[0], y[0]), (x[1], y[1])));
            }
        }

        if response.clicked() && self.brush.is_some() {
            self.brush = None;
            return Some(BrushSelection::Cleared);
        }

        None
    }
}

fn compute_bounds(records: &[Record]) -> Bounds {
    if records.is_empty() {
        return Bounds::default();
    }

    let (mut x_lo, mut x_hi) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_lo, mut y_hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for record in records {
        let x = record.base_mean.log10();
        x_lo = x_lo.min(x);
        x_hi = x_hi.max(x);
        y_lo = y_lo.min(record.log2_fold_change);
        y_hi = y_hi.max(record.log2_fold_change);
    }

    let x_pad = ((x_hi - x_lo) * 0.04).max(0.1);
    let y_pad = ((y_hi - y_lo) * 0.04).max(0.2);
    Bounds {
        x: [x_lo - x_pad, x_hi + x_pad],
        y: [y_lo - y_pad, y_hi + y_pad],
    }
}

fn hexagon(center: egui::Pos2, radius: f32) -> Vec<egui::Pos2> {
    (0..6)
        .map(|i| {
            let angle = std::f32::consts::FRAC_PI_3 * i as f32 + std::f32::consts::FRAC_PI_6;
            egui::pos2(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
        .collect()
}

/// Density ramp: deep blue at sparse bins up to warm yellow at the fullest.
fn density_color(t: f64) -> egui::Color32 {
    let lo = (40.0, 70.0, 140.0);
    let hi = (250.0, 210.0, 80.0);
    let r = (lo.0 + (hi.0 - lo.0) * t).clamp(0.0, 255.0) as u8;
    let g = (lo.1 + (hi.1 - lo.1) * t).clamp(0.0, 255.0) as u8;
    let b = (lo.2 + (hi.2 - lo.2) * t).clamp(0.0, 255.0) as u8;
    egui::Color32::from_rgb(r, g, b)
}

fn with_alpha(color: egui::Color32, alpha: u8) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

fn exponent_label(k: i32) -> String {
    match k {
        -2 => "0.01".to_string(),
        -1 => "0.1".to_string(),
        0..=4 => format!("{}", 10f64.powi(k) as i64),
        _ => format!("1e{}", k),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(base_mean: f64, log2_fold_change: f64) -> Record {
        Record {
            feature: "g".to_string(),
            symbol: "g".to_string(),
            symbols: vec!["g".to_string()],
            base_mean,
            log2_fold_change,
            pvalue: f64::NAN,
            padj: 0.01,
            extra: Vec::new(),
        }
    }

    fn style(searched: &[&str]) -> PointStyle {
        PointStyle {
            padj_cut: 0.1,
            fold_change_cut: 0.0,
            alpha: 0.8,
            searched: searched.iter().map(|s| s.to_string()).collect(),
            density: false,
        }
    }

    #[test]
    fn test_draw_caches_and_styles_points() {
        let records = vec![rec(10.0, 2.0), rec(100.0, 0.0)];
        let mut chart = ScatterChart::default();
        chart.draw(&records, &style(&[]));

        assert_eq!(chart.points.len(), 2);
        assert!(chart.points[0].significant);
        assert!(!chart.points[1].significant); // |l2fc| not above 0
        assert!((chart.points[0].x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_update_points_restyles_without_rebounds() {
        let records = vec![rec(10.0, 2.0), rec(100.0, -3.0)];
        let mut chart = ScatterChart::default();
        chart.draw(&records, &style(&[]));
        let bounds_before = (chart.bounds.x, chart.bounds.y);

        let mut tight = style(&[]);
        tight.fold_change_cut = 2.5;
        chart.update_points(&records, &tight);

        assert!(!chart.points[0].significant);
        assert!(chart.points[1].significant);
        assert_eq!((chart.bounds.x, chart.bounds.y), bounds_before);
    }

    #[test]
    fn test_highlight_follows_searched_order() {
        let mut records = vec![rec(10.0, 1.0), rec(20.0, -1.0)];
        records[0].symbols = vec!["TP53".to_string()];
        records[1].symbols = vec!["MYC".to_string()];

        let mut chart = ScatterChart::default();
        chart.draw(&records, &style(&["MYC", "TP53"]));

        assert_eq!(chart.points[0].highlight, Some(1));
        assert_eq!(chart.points[1].highlight, Some(0));
    }

    #[test]
    fn test_palette_cycles() {
        assert_eq!(highlight_color(0), highlight_color(10));
        assert_ne!(highlight_color(0), highlight_color(1));
    }
}

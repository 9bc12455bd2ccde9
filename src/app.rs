//! Main application state and UI

use eframe::egui;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Receiver;
use std::time::Instant;

use crate::chart::{highlight_color, ScatterChart};
use crate::explorer::{
    run_render_pass, CutoffParams, ExplorerState, LoadedDataset, PointStyle, RenderScheduler,
};
use crate::loader::{self, LoadError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum PlotMode {
    Scatter,
    Density,
}

/// View settings persisted to JSON (everything adjustable without reloading
/// the dataset).
#[derive(Serialize, Deserialize)]
struct ViewSettings {
    cutoff: CutoffParams,
    alpha: f32,
    plot_mode: PlotMode,
    genes: Vec<String>,
}

/// Application state
pub struct VolcanoApp {
    // Dataset state
    state: ExplorerState,
    loading: Option<String>,
    load_rx: Option<Receiver<Result<LoadedDataset, LoadError>>>,
    load_error: Option<String>,

    // View controls
    alpha: f32,
    plot_mode: PlotMode,
    gene_query: String,
    show_extra_columns: bool,

    // Render pipeline
    scheduler: RenderScheduler,
    chart: ScatterChart,

    // Save/Load
    settings_error: Option<String>,
    export_error: Option<String>,
}

impl Default for VolcanoApp {
    fn default() -> Self {
        Self {
            state: ExplorerState::default(),
            loading: None,
            load_rx: None,
            load_error: None,
            alpha: 0.8,
            plot_mode: PlotMode::Density,
            gene_query: String::new(),
            show_extra_columns: false,
            scheduler: RenderScheduler::new(),
            chart: ScatterChart::default(),
            settings_error: None,
            export_error: None,
        }
    }
}

impl VolcanoApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let mut app = Self::default();
        // Open on the first bundled dataset, like starting with a selection
        if let Some(sample) = loader::SAMPLE_DATASETS.first() {
            app.start_load(
                sample.name.to_string(),
                sample.content.to_string(),
                sample.seed.to_string(),
            );
        }
        app
    }

    fn start_load(&mut self, name: String, content: String, seed: String) {
        log::info!("loading dataset '{}'", name);
        self.loading = Some(name.clone());
        self.load_error = None;
        self.load_rx = Some(loader::spawn_load(name, content, seed));
    }

    fn check_load_progress(&mut self) {
        let Some(rx) = &self.load_rx else {
            return;
        };
        let Ok(result) = rx.try_recv() else {
            return;
        };

        self.load_rx = None;
        let name = self.loading.take().unwrap_or_default();
        match result {
            Ok(loaded) => {
                self.state.commit(loaded);
                self.scheduler.request_draw(Instant::now());
            }
            Err(LoadError::Normalize(_)) => {
                self.load_error = Some(format!("Failed to find any features in {}", name));
            }
            Err(e) => {
                self.load_error = Some(format!("Failed to load {}: {}", name, e));
            }
        }
    }

    fn open_dataset_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Tables", &["tsv", "csv", "txt"])
            .pick_file()
        {
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "file".to_string());
                    self.start_load(name, content, String::new());
                }
                Err(e) => {
                    self.load_error = Some(format!("Failed to read file: {}", e));
                }
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped.into_iter().next() else {
            return;
        };

        if let Some(path) = &file.path {
            match std::fs::read_to_string(path) {
                Ok(content) => {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "file".to_string());
                    self.start_load(name, content, String::new());
                }
                Err(e) => {
                    self.load_error = Some(format!("Failed to read file: {}", e));
                }
            }
        } else if let Some(bytes) = &file.bytes {
            let content = String::from_utf8_lossy(bytes).to_string();
            let name = if file.name.is_empty() {
                "dropped".to_string()
            } else {
                file.name.clone()
            };
            self.start_load(name, content, String::new());
        }
    }

    fn export_selection(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV", &["csv"])
            .set_file_name("selection.csv")
            .save_file()
        {
            match loader::export_selection(&path, &self.state) {
                Ok(()) => self.export_error = None,
                Err(e) => self.export_error = Some(format!("Export failed: {}", e)),
            }
        }
    }

    fn save_view_settings(&mut self) {
        let settings = ViewSettings {
            cutoff: self.state.cutoff(),
            alpha: self.alpha,
            plot_mode: self.plot_mode,
            genes: self.state.searched_symbols(),
        };

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name("view_settings.json")
            .save_file()
        {
            match serde_json::to_string_pretty(&settings) {
                Ok(json) => {
                    if let Err(e) = std::fs::write(&path, json) {
                        self.settings_error = Some(format!("Failed to write file: {}", e));
                    } else {
                        self.settings_error = None;
                    }
                }
                Err(e) => {
                    self.settings_error = Some(format!("Failed to serialize: {}", e));
                }
            }
        }
    }

    fn load_view_settings(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        {
            match std::fs::read_to_string(&path) {
                Ok(json) => match serde_json::from_str::<ViewSettings>(&json) {
                    Ok(settings) => {
                        self.state.set_cutoff(settings.cutoff);
                        self.alpha = settings.alpha;
                        let structural = settings.plot_mode != self.plot_mode;
                        self.plot_mode = settings.plot_mode;
                        self.state.add_symbols(&settings.genes.join(" "));
                        self.settings_error = None;
                        let now = Instant::now();
                        if structural {
                            self.scheduler.request_draw(now);
                        } else {
                            self.scheduler.request_update(now);
                        }
                    }
                    Err(e) => {
                        self.settings_error = Some(format!("Failed to parse: {}", e));
                    }
                },
                Err(e) => {
                    self.settings_error = Some(format!("Failed to read file: {}", e));
                }
            }
        }
    }

    fn point_style(&self) -> PointStyle {
        let cutoff = self.state.cutoff();
        PointStyle {
            padj_cut: cutoff.padj_cut(),
            fold_change_cut: cutoff.fold_change_cut,
            alpha: self.alpha,
            searched: self.state.searched_symbols(),
            density: self.plot_mode == PlotMode::Density,
        }
    }

    /// Fire at most one debounced render pass, then keep the frame loop
    /// awake until the next pending deadline.
    fn dispatch_render(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        if let Some(pass) = self.scheduler.poll(now) {
            let style = self.point_style();
            run_render_pass(pass, &mut self.chart, self.state.records(), &style);
        }
        if let Some(deadline) = self.scheduler.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(Instant::now()));
        }
    }
}

impl eframe::App for VolcanoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.load_rx.is_some() {
            self.check_load_progress();
            ctx.request_repaint();
        }
        self.handle_dropped_files(ctx);

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Dataset...").clicked() {
                        self.open_dataset_dialog();
                        ui.close_menu();
                    }
                    ui.menu_button("Sample Datasets", |ui| {
                        for sample in loader::SAMPLE_DATASETS.iter() {
                            if ui.button(sample.name).clicked() {
                                self.start_load(
                                    sample.name.to_string(),
                                    sample.content.to_string(),
                                    sample.seed.to_string(),
                                );
                                ui.close_menu();
                            }
                        }
                    });
                    ui.separator();
                    let can_export = self.state.has_data();
                    if ui
                        .add_enabled(can_export, egui::Button::new("Export Selection..."))
                        .clicked()
                    {
                        self.export_selection();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Save View Settings...").clicked() {
                        self.save_view_settings();
                        ui.close_menu();
                    }
                    if ui.button("Load View Settings...").clicked() {
                        self.load_view_settings();
                        ui.close_menu();
                    }
                });
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(ref name) = self.loading {
                    ui.spinner();
                    ui.label(format!("Loading {}...", name));
                } else if self.scheduler.is_dirty() {
                    ui.spinner();
                    ui.label("Updating...");
                } else if self.state.has_data() {
                    let (up, down) = self.state.up_down_counts();
                    let parts = vec![
                        self.state.name().to_string(),
                        format!("{} features", self.state.records().len()),
                        format!("{} selected", self.state.visible_rows().len()),
                        format!("{} up / {} down", up, down),
                    ];
                    ui.label(parts.join(" | "));
                } else {
                    ui.label("Open a dataset or drop a TSV/CSV file to begin");
                }
            });
        });

        // Row table
        egui::TopBottomPanel::bottom("table")
            .resizable(true)
            .default_height(230.0)
            .show(ctx, |ui| {
                self.show_grid(ui);
            });

        // Controls
        egui::SidePanel::left("controls")
            .default_width(230.0)
            .show(ctx, |ui| {
                self.show_controls(ui);
            });

        // Chart
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(ref error) = self.load_error {
                ui.colored_label(egui::Color32::RED, error);
            }
            if let Some(brush) = self.chart.ui(ui) {
                self.state.sync_brush(&brush);
            }
        });

        self.dispatch_render(ctx);
    }
}

impl VolcanoApp {
    fn show_controls(&mut self, ui: &mut egui::Ui) {
        ui.add_space(4.0);
        ui.heading("Thresholds");
        ui.separator();

        let mut cutoff = self.state.cutoff();
        let mut thresholds_changed = false;

        ui.label("FDR cutoff:");
        thresholds_changed |= ui
            .add(
                egui::Slider::new(&mut cutoff.log_padj_cut, -5.0..=0.0)
                    .step_by(1.0)
                    .custom_formatter(|v, _| format!("1e{}", v as i64)),
            )
            .changed();

        ui.label("Fold change cutoff:");
        thresholds_changed |= ui
            .add(egui::Slider::new(&mut cutoff.fold_change_cut, 0.0..=5.0).step_by(1.0))
            .changed();

        ui.label("Opacity:");
        let alpha_changed = ui
            .add(egui::Slider::new(&mut self.alpha, 0.0..=1.0).step_by(0.01))
            .changed();

        if thresholds_changed {
            self.state.set_cutoff(cutoff);
        }
        if thresholds_changed || alpha_changed {
            self.scheduler.request_update(Instant::now());
        }

        ui.add_space(8.0);
        ui.label("Plot:");
        let mut mode_changed = false;
        ui.horizontal(|ui| {
            mode_changed |= ui
                .radio_value(&mut self.plot_mode, PlotMode::Density, "Density")
                .changed();
            mode_changed |= ui
                .radio_value(&mut self.plot_mode, PlotMode::Scatter, "Scatter")
                .changed();
        });
        if mode_changed {
            self.scheduler.request_draw(Instant::now());
        }

        if self.state.has_data() {
            let (up, down) = self.state.up_down_counts();
            ui.add_space(4.0);
            ui.label(format!("Above cutoff: {} up, {} down", up, down));
        }

        ui.add_space(10.0);
        ui.heading("Search Genes");
        ui.separator();
        if self.state.has_data() {
            ui.colored_label(
                egui::Color32::GRAY,
                format!("{} unique symbols", self.state.gene_index().len()),
            );
        }

        let mut add_query = false;
        ui.horizontal(|ui| {
            let edit = ui.add(
                egui::TextEdit::singleline(&mut self.gene_query)
                    .hint_text("TP53; BRCA1 ...")
                    .desired_width(150.0),
            );
            if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                add_query = true;
            }
            if ui.button("Add").clicked() {
                add_query = true;
            }
        });
        if add_query && !self.gene_query.is_empty() {
            let query = self.gene_query.clone();
            self.state.add_symbols(&query);
            self.gene_query.clear();
            self.scheduler.request_update(Instant::now());
        }

        let gene_rows: Vec<(usize, String, usize)> = self
            .state
            .gene_list()
            .enumerate()
            .map(|(rank, e)| (rank, e.symbol.clone(), e.count))
            .collect();

        if gene_rows.is_empty() {
            ui.colored_label(egui::Color32::GRAY, "No genes searched");
        } else {
            for (rank, symbol, count) in &gene_rows {
                ui.horizontal(|ui| {
                    ui.colored_label(highlight_color(*rank), "\u{25CF}");
                    ui.label(format!("{} ({})", symbol, count));
                });
            }
            if ui.button("Copy gene list").clicked() {
                let text = gene_rows
                    .iter()
                    .map(|(_, symbol, _)| symbol.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                ui.ctx().copy_text(text);
            }
        }

        if let Some(ref error) = self.settings_error {
            ui.colored_label(egui::Color32::RED, error);
        }
        if let Some(ref error) = self.export_error {
            ui.colored_label(egui::Color32::RED, error);
        }
    }

    fn show_grid(&mut self, ui: &mut egui::Ui) {
        if !self.state.has_data() {
            ui.colored_label(egui::Color32::GRAY, "No rows to show");
            return;
        }

        ui.horizontal(|ui| {
            ui.label(format!("{} rows", self.state.visible_rows().len()));
            let has_extras = self.state.columns().iter().any(|c| !c.measured);
            if has_extras {
                ui.checkbox(&mut self.show_extra_columns, "Show extra columns");
            }
        });

        let columns: Vec<(String, bool)> = self
            .state
            .columns()
            .iter()
            .filter(|c| c.measured || self.show_extra_columns)
            .map(|c| (c.name.clone(), c.measured))
            .collect();

        // Clicking a symbol adds it to the search list; applied after the
        // row loop to keep the borrow simple
        let mut clicked_symbol: Option<String> = None;

        let text_height = ui.text_style_height(&egui::TextStyle::Body) + 4.0;
        let row_ids = self.state.visible_rows().to_vec();

        // Header
        ui.horizontal(|ui| {
            for (name, _) in &columns {
                ui.add_sized(
                    [col_width(name), text_height],
                    egui::Label::new(egui::RichText::new(name).strong()),
                );
            }
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("row_table")
            .auto_shrink([false, false])
            .show_rows(ui, text_height, row_ids.len(), |ui, range| {
                for row in range {
                    let record = self.state.record(row_ids[row]);
                    let mut extra = record.extra.iter();
                    ui.horizontal(|ui| {
                        for (name, measured) in &columns {
                            let width = col_width(name);
                            if *measured && name == "symbol" {
                                let link = ui.add_sized(
                                    [width, text_height],
                                    egui::Link::new(&record.symbol),
                                );
                                if link.clicked() {
                                    clicked_symbol = Some(record.symbol.clone());
                                }
                            } else {
                                let text = if *measured {
                                    measured_cell(record, name)
                                } else {
                                    extra.next().cloned().unwrap_or_default()
                                };
                                ui.add_sized(
                                    [width, text_height],
                                    egui::Label::new(text).truncate(),
                                );
                            }
                        }
                    });
                }
            });

        if let Some(symbol) = clicked_symbol {
            self.state.add_symbols(&symbol);
            self.scheduler.request_update(Instant::now());
        }
    }
}

fn col_width(name: &str) -> f32 {
    match name {
        "feature" => 150.0,
        "symbol" => 120.0,
        _ => 100.0,
    }
}

fn measured_cell(record: &crate::explorer::Record, name: &str) -> String {
    match name {
        "feature" => record.feature.clone(),
        "baseMean" => format_number(record.base_mean),
        "log2FoldChange" => format_number(record.log2_fold_change),
        "pvalue" => format_number(record.pvalue),
        "padj" => format_number(record.padj),
        _ => record.symbol.clone(),
    }
}

fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NA".to_string()
    } else if value != 0.0 && value.abs() < 0.001 {
        format!("{:.2e}", value)
    } else {
        format!("{:.3}", value)
    }
}

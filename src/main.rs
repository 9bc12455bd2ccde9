use eframe::egui;
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod app;
mod chart;
mod explorer;
mod loader;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 860.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Volcano Explorer",
        options,
        Box::new(|cc| Ok(Box::new(app::VolcanoApp::new(cc)))),
    )
}

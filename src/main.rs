//! Paperdrop - batch DOCX to PDF converter
//!
//! Drag and drop (or browse for) docx files, pick an output folder, and
//! convert the batch with LibreOffice while a progress bar tracks the run.

mod app;
mod core;
mod ui;

use app::PaperdropApp;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    tracing::info!("Starting Paperdrop...");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 420.0])
            .with_min_inner_size([480.0, 320.0])
            .with_title("Paperdrop")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Paperdrop",
        native_options,
        Box::new(|cc| Ok(Box::new(PaperdropApp::new(cc)))),
    )
}

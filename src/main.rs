#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use planner::app::PlannerApp;
use planner::store::{LocalStore, TaskStore};

fn main() -> eframe::Result<()> {
    env_logger::init();

    let local = LocalStore::default_location().unwrap_or_else(|e| {
        log::error!("falling back to the working directory: {e}");
        LocalStore::at("tasks.json")
    });
    let store = TaskStore::local(local);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 680.0])
            .with_min_inner_size([800.0, 480.0])
            .with_title("Rust Planner App"),
        ..Default::default()
    };

    eframe::run_native(
        "Rust Planner App",
        options,
        Box::new(move |cc| Ok(Box::new(PlannerApp::new(cc, store)))),
    )
}

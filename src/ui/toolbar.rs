use egui::{menu, RichText, Ui};

use crate::app::PlannerApp;
use crate::ui::theme;

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut PlannerApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  Help  ").size(12.0), |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        // Right-aligned backend indicator.
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let backend = if app.store.is_remote() {
                match app.store.remote_user() {
                    Some(user) => format!("Synced · {user}"),
                    None => "Connecting...".to_string(),
                }
            } else {
                "Local store".to_string()
            };
            ui.label(
                RichText::new(backend)
                    .size(11.0)
                    .color(theme::TEXT_SECONDARY),
            );
        });
    });
}

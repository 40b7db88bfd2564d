//! File list panel: queued documents plus the action buttons

use eframe::egui;

use crate::app::PaperdropApp;

const BUTTON_COLUMN_WIDTH: f32 = 110.0;

/// File list panel
pub struct FileListPanel;

impl FileListPanel {
    /// Show the file list and the Browse/Remove/Clear/Convert column
    pub fn show(ui: &mut egui::Ui, app: &mut PaperdropApp) {
        let busy = app.job.is_some();

        ui.horizontal_top(|ui| {
            let list_width = (ui.available_width() - BUTTON_COLUMN_WIDTH - 12.0).max(120.0);

            ui.vertical(|ui| {
                ui.set_width(list_width);
                Self::show_list(ui, app, busy);
            });

            ui.separator();

            ui.vertical(|ui| {
                ui.set_width(BUTTON_COLUMN_WIDTH);
                Self::show_buttons(ui, app, busy);
            });
        });
    }

    /// Show the scrollable list of queued paths with click-to-select rows
    fn show_list(ui: &mut egui::Ui, app: &mut PaperdropApp, busy: bool) {
        egui::ScrollArea::vertical()
            .id_salt("file_list_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let entries = app.file_list.snapshot();
                if entries.is_empty() {
                    ui.weak("No files queued. Drop .docx files here or click Browse.");
                    return;
                }

                for path in entries {
                    let is_selected = app.selected.contains(&path);
                    let clicked = ui
                        .selectable_label(is_selected, path.display().to_string())
                        .clicked();
                    if clicked && !busy {
                        if is_selected {
                            app.selected.remove(&path);
                        } else {
                            app.selected.insert(path);
                        }
                    }
                }
            });
    }

    /// Show the action button column
    fn show_buttons(ui: &mut egui::Ui, app: &mut PaperdropApp, busy: bool) {
        let full = egui::vec2(BUTTON_COLUMN_WIDTH, 0.0);

        if ui
            .add_enabled(!busy, egui::Button::new("Browse").min_size(full))
            .clicked()
        {
            app.browse_files();
        }

        if ui
            .add_enabled(
                !busy && !app.selected.is_empty(),
                egui::Button::new("Remove").min_size(full),
            )
            .on_hover_text("Remove selected files (Del)")
            .clicked()
        {
            app.remove_selected();
        }

        if ui
            .add_enabled(
                !busy && !app.file_list.is_empty(),
                egui::Button::new("Clear").min_size(full),
            )
            .clicked()
        {
            app.clear_list();
        }

        ui.add_space(48.0);

        if ui
            .add_enabled(app.can_convert(), egui::Button::new("Convert").min_size(full))
            .clicked()
        {
            app.convert_clicked();
        }
    }
}

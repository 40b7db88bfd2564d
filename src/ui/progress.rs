//! Conversion progress and run summary panel

use eframe::egui;

use crate::app::PaperdropApp;

/// Bottom status panel: progress while a run is active, summary afterwards
pub struct ProgressPanel;

impl ProgressPanel {
    pub fn show(ui: &mut egui::Ui, app: &mut PaperdropApp) {
        ui.add_space(4.0);
        if app.job.is_some() {
            Self::show_running(ui, app);
        } else if app.last_summary.is_some() {
            Self::show_summary(ui, app);
        } else {
            ui.weak(format!("{} file(s) queued", app.file_list.len()));
        }
        ui.add_space(4.0);
    }

    /// Progress bar, current-file label, and the cancel control
    fn show_running(ui: &mut egui::Ui, app: &mut PaperdropApp) {
        let Some(ref mut job) = app.job else {
            return;
        };

        let label = job
            .current
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "Starting...".to_string());
        ui.label(label);

        ui.horizontal(|ui| {
            let total = job.handle.total().max(1);
            let bar = egui::ProgressBar::new(job.done as f32 / total as f32)
                .text(format!("{} / {}", job.done, job.handle.total()))
                .desired_width(ui.available_width() - 90.0);
            ui.add(bar);

            if job.cancel_requested {
                ui.weak("Cancelling...");
            } else if ui.button("Cancel").clicked() {
                job.handle.cancel();
                job.cancel_requested = true;
                tracing::info!("Cancellation requested");
            }
        });
    }

    /// Outcome of the last run, with failures expandable
    fn show_summary(ui: &mut egui::Ui, app: &PaperdropApp) {
        let Some(ref summary) = app.last_summary else {
            return;
        };

        ui.horizontal(|ui| {
            let status = if summary.cancelled { "Cancelled" } else { "Done" };
            ui.label(format!(
                "{}: {} succeeded, {} failed, {} skipped",
                status,
                summary.succeeded,
                summary.failed.len(),
                summary.skipped
            ));

            if let Some(ref dir) = app.last_target {
                if ui.button("Open folder").clicked() {
                    if let Err(e) = open::that(dir) {
                        tracing::warn!("Failed to open {}: {}", dir.display(), e);
                    }
                }
            }
        });

        if !summary.failed.is_empty() {
            egui::CollapsingHeader::new("Failures")
                .id_salt("failure_list")
                .show(ui, |ui| {
                    for (path, reason) in &summary.failed {
                        ui.label(format!("{}: {}", path.display(), reason));
                    }
                });
        }
    }
}

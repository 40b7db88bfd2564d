//! Main application state and UI coordination

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use eframe::egui;

use crate::core::config::AppConfig;
use crate::core::engine::{ConvertEngine, LibreOffice};
use crate::core::file_list::FileList;
use crate::core::job::{spawn_job, JobEvent, JobHandle, JobSummary};
use crate::ui::{file_list::FileListPanel, progress::ProgressPanel};

/// A conversion run in flight
pub struct RunningJob {
    /// Worker handle: event stream plus the cancel control
    pub handle: JobHandle,
    /// Files finished so far (succeeded or failed)
    pub done: usize,
    /// Source currently being converted, for the progress label
    pub current: Option<PathBuf>,
    /// Cancel was clicked; the worker stops after the file in flight
    pub cancel_requested: bool,
}

/// Main application state
pub struct PaperdropApp {
    /// Queued source documents
    pub file_list: FileList,
    /// Paths currently selected in the list view
    pub selected: HashSet<PathBuf>,
    /// Application configuration
    pub config: AppConfig,
    /// Detected conversion engine, if any
    pub engine: Option<Arc<dyn ConvertEngine>>,
    /// Converter binary shown in the UI
    pub engine_binary: Option<PathBuf>,
    /// Run in flight, if any
    pub job: Option<RunningJob>,
    /// Outcome of the most recent run
    pub last_summary: Option<JobSummary>,
    /// Output directory of the most recent run
    pub last_target: Option<PathBuf>,
    /// Note shown after a rejected drop
    pub drop_rejected: Option<String>,
}

impl PaperdropApp {
    /// Create a new application instance
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        // Load config or use defaults
        let config = AppConfig::load().unwrap_or_default();

        let detected = LibreOffice::detect(config.engine_path.as_deref());
        if detected.is_none() {
            tracing::warn!("No LibreOffice install found; conversion disabled");
        }
        let engine_binary = detected.as_ref().map(|e| e.binary().to_path_buf());
        let engine: Option<Arc<dyn ConvertEngine>> =
            detected.map(|e| Arc::new(e) as Arc<dyn ConvertEngine>);

        Self {
            file_list: FileList::new(),
            selected: HashSet::new(),
            config,
            engine,
            engine_binary,
            job: None,
            last_summary: None,
            last_target: None,
            drop_rejected: None,
        }
    }

    /// Whether the Convert action is currently available
    pub fn can_convert(&self) -> bool {
        !self.file_list.is_empty() && self.engine.is_some() && self.job.is_none()
    }

    /// Add files picked from the browse dialog
    pub fn browse_files(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("DOCX Files", &["docx"])
            .set_title("Select DOCX files")
            .pick_files();

        if let Some(paths) = picked {
            for path in paths {
                self.file_list.add(path);
            }
            self.drop_rejected = None;
        }
    }

    /// Remove every selected entry from the list
    pub fn remove_selected(&mut self) {
        let selected: Vec<PathBuf> = self.selected.iter().cloned().collect();
        self.file_list.remove_selected(&selected);
        self.selected.clear();
    }

    /// Empty the list and selection
    pub fn clear_list(&mut self) {
        self.file_list.clear();
        self.selected.clear();
    }

    /// Ask for a target folder and start a conversion run
    pub fn convert_clicked(&mut self) {
        if !self.can_convert() {
            return;
        }

        let mut dialog = rfd::FileDialog::new().set_title("Select output folder");
        if let Some(ref dir) = self.config.last_output_dir {
            dialog = dialog.set_directory(dir);
        }
        if let Some(target) = dialog.pick_folder() {
            self.start_job(target);
        }
    }

    /// Spawn the worker for the current list
    fn start_job(&mut self, target_dir: PathBuf) {
        let Some(ref engine) = self.engine else {
            return;
        };

        self.config.set_last_output_dir(target_dir.clone());
        self.last_summary = None;
        self.last_target = Some(target_dir.clone());

        let batch = self.file_list.snapshot();
        tracing::info!(
            "Starting conversion of {} file(s) into {}",
            batch.len(),
            target_dir.display()
        );
        let handle = spawn_job(batch, target_dir, engine.clone());
        self.job = Some(RunningJob {
            handle,
            done: 0,
            current: None,
            cancel_requested: false,
        });
    }

    /// Drain worker events and retire the job once it reports a summary
    fn poll_job(&mut self) {
        let Some(ref mut job) = self.job else {
            return;
        };

        let mut finished = None;
        for event in job.handle.poll() {
            match event {
                JobEvent::FileStarted { source, .. } => {
                    job.current = Some(source);
                }
                JobEvent::FileFinished { .. } => {
                    job.done += 1;
                }
                JobEvent::Finished(summary) => {
                    finished = Some(summary);
                }
            }
        }

        if let Some(summary) = finished {
            tracing::info!(
                "Run finished: {} succeeded, {} failed, {} skipped",
                summary.succeeded,
                summary.failed.len(),
                summary.skipped
            );
            if self.config.clear_after_convert && summary.failed.is_empty() && !summary.cancelled {
                self.clear_list();
            }
            self.last_summary = Some(summary);
            self.job = None;
        }
    }

    /// Handle drag-and-drop input for the whole window.
    ///
    /// Acceptance is all-or-nothing: a hovered batch containing any non-DOCX
    /// item is refused outright and nothing is added on drop.
    fn handle_drops(&mut self, ctx: &egui::Context) {
        let hovered: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .hovered_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });

        if !hovered.is_empty() {
            let accepted = FileList::accepts_batch(&hovered);
            let text = if accepted {
                "Drop to add files"
            } else {
                "Only .docx files are accepted"
            };
            let painter = ctx.layer_painter(egui::LayerId::new(
                egui::Order::Foreground,
                egui::Id::new("drop_overlay"),
            ));
            let rect = ctx.screen_rect();
            painter.rect_filled(rect, egui::CornerRadius::ZERO, egui::Color32::from_black_alpha(140));
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                text,
                egui::FontId::proportional(22.0),
                if accepted {
                    egui::Color32::WHITE
                } else {
                    egui::Color32::LIGHT_RED
                },
            );
        }

        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });

        if !dropped.is_empty() {
            let added = self.file_list.add_batch(&dropped);
            if added == 0 && !FileList::accepts_batch(&dropped) {
                let refused = dropped
                    .iter()
                    .filter(|p| !crate::core::file_list::is_supported(p))
                    .count();
                self.drop_rejected = Some(format!(
                    "Drop rejected: {} of {} item(s) are not .docx",
                    refused,
                    dropped.len()
                ));
            } else {
                self.drop_rejected = None;
            }
        }
    }
}

impl eframe::App for PaperdropApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_job();
        if self.job.is_some() {
            // Keep frames coming while the worker is running
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        self.handle_drops(ctx);

        // Handle keyboard shortcuts
        ctx.input(|i| {
            if i.key_pressed(egui::Key::Delete) && self.job.is_none() {
                self.remove_selected();
            }
        });

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.heading("Paperdrop");
            ui.label("Quickly add docx files: drag and drop or browse.");
            match self.engine_binary {
                Some(ref bin) => {
                    ui.weak(format!("Converter: {}", bin.display()));
                }
                None => {
                    ui.colored_label(
                        egui::Color32::LIGHT_RED,
                        "LibreOffice not found - install it or set its path in the config file.",
                    );
                }
            }
            if let Some(ref note) = self.drop_rejected {
                ui.colored_label(egui::Color32::LIGHT_RED, note);
            }
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ProgressPanel::show(ui, self);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            FileListPanel::show(ui, self);
        });
    }
}

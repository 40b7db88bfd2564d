//! Conversion job orchestration
//!
//! A job snapshots the file list and target directory, then converts each
//! document sequentially on a dedicated worker thread. The worker never
//! touches UI state: progress flows back over an mpsc channel drained on the
//! UI thread, and cancellation is a shared atomic token checked between
//! files. A failing document is recorded and the batch moves on.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use crate::core::engine::{ConvertEngine, ConvertError};

/// Upper bound on the numbered-suffix search for a free output name
pub const MAX_NAME_PROBES: u32 = 1000;

/// Cooperative cancellation token shared between the UI and the worker
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect at the next between-files check.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Progress events sent from the worker to the UI thread
#[derive(Debug)]
pub enum JobEvent {
    /// Conversion of one source document has begun
    FileStarted { index: usize, source: PathBuf },
    /// Conversion of one source document has ended
    FileFinished {
        index: usize,
        source: PathBuf,
        result: Result<PathBuf, ConvertError>,
    },
    /// The whole batch is done; no further events follow
    Finished(JobSummary),
}

/// Outcome of a completed or cancelled batch
#[derive(Debug, Clone, Default)]
pub struct JobSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: Vec<(PathBuf, String)>,
    /// Files never attempted because the run was cancelled first
    pub skipped: usize,
    pub cancelled: bool,
}

/// Handle held by the UI while a job runs
pub struct JobHandle {
    events: Receiver<JobEvent>,
    cancel: CancelToken,
    total: usize,
}

impl JobHandle {
    /// Number of files in the batch
    pub fn total(&self) -> usize {
        self.total
    }

    /// Signal the worker to stop after the file in flight
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Drain pending events without blocking
    pub fn poll(&self) -> Vec<JobEvent> {
        self.events.try_iter().collect()
    }
}

/// Start a conversion run on a background thread.
///
/// The batch is processed in list order; the returned handle is the only way
/// to observe progress or request cancellation.
pub fn spawn_job(
    batch: Vec<PathBuf>,
    target_dir: PathBuf,
    engine: Arc<dyn ConvertEngine>,
) -> JobHandle {
    let (tx, rx) = mpsc::channel();
    let cancel = CancelToken::new();
    let total = batch.len();

    let worker_cancel = cancel.clone();
    thread::spawn(move || {
        let summary = run_batch(&batch, &target_dir, engine.as_ref(), &worker_cancel, &tx);
        // Receiver gone means the UI shut down mid-run; nothing to report to.
        let _ = tx.send(JobEvent::Finished(summary));
    });

    JobHandle { events: rx, cancel, total }
}

/// Sequentially convert every file in the batch, reporting per-file events.
fn run_batch(
    batch: &[PathBuf],
    target_dir: &Path,
    engine: &dyn ConvertEngine,
    cancel: &CancelToken,
    tx: &Sender<JobEvent>,
) -> JobSummary {
    let mut summary = JobSummary {
        total: batch.len(),
        ..JobSummary::default()
    };

    for (index, source) in batch.iter().enumerate() {
        if cancel.is_cancelled() {
            summary.cancelled = true;
            break;
        }

        tracing::info!("Converting {}", source.display());
        if tx
            .send(JobEvent::FileStarted { index, source: source.clone() })
            .is_err()
        {
            break;
        }

        let result = resolve_output_path(target_dir, source)
            .and_then(|target| engine.convert(source, &target).map(|()| target));

        match &result {
            Ok(target) => {
                summary.succeeded += 1;
                tracing::info!("Wrote {}", target.display());
            }
            Err(e) => {
                summary.failed.push((source.clone(), e.to_string()));
                tracing::error!("Failed to convert {}: {}", source.display(), e);
            }
        }

        if tx
            .send(JobEvent::FileFinished { index, source: source.clone(), result })
            .is_err()
        {
            break;
        }
    }

    summary.skipped = summary.total - summary.succeeded - summary.failed.len();
    summary
}

/// Find a free output path for `source` under `dir`.
///
/// Starts at `{base}.pdf` and probes `{base}(1).pdf`, `(2)`, ... The search
/// is capped so a directory full of stale numbered outputs cannot stall the
/// run. Not atomic against concurrent external writers; acceptable for a
/// single-user desktop tool.
pub fn resolve_output_path(dir: &Path, source: &Path) -> Result<PathBuf, ConvertError> {
    resolve_output_path_capped(dir, source, MAX_NAME_PROBES)
}

fn resolve_output_path_capped(
    dir: &Path,
    source: &Path,
    cap: u32,
) -> Result<PathBuf, ConvertError> {
    let base = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut candidate = dir.join(format!("{}.pdf", base));
    let mut counter = 0u32;
    while candidate.exists() {
        counter += 1;
        if counter > cap {
            return Err(ConvertError::NoFreeName { dir: dir.to_path_buf(), base });
        }
        candidate = dir.join(format!("{}({}).pdf", base, counter));
    }
    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Engine stand-in that writes a marker file and can be scripted to fail
    /// on chosen sources or to trip the cancel token after N conversions.
    struct FakeEngine {
        fail_on: Vec<&'static str>,
        cancel_after: Option<(usize, CancelToken)>,
        converted: Mutex<usize>,
    }

    impl FakeEngine {
        fn new() -> Self {
            Self {
                fail_on: Vec::new(),
                cancel_after: None,
                converted: Mutex::new(0),
            }
        }

        fn failing_on(names: Vec<&'static str>) -> Self {
            Self { fail_on: names, ..Self::new() }
        }

        fn cancelling_after(count: usize, token: CancelToken) -> Self {
            Self { cancel_after: Some((count, token)), ..Self::new() }
        }
    }

    impl ConvertEngine for FakeEngine {
        fn convert(&self, source: &Path, target: &Path) -> Result<(), ConvertError> {
            let name = source.file_name().unwrap().to_string_lossy();
            if self.fail_on.iter().any(|f| *f == name) {
                return Err(ConvertError::Engine("scripted failure".into()));
            }
            std::fs::write(target, b"%PDF-fake")?;

            let mut done = self.converted.lock().unwrap();
            *done += 1;
            if let Some((count, token)) = &self.cancel_after {
                if *done == *count {
                    token.cancel();
                }
            }
            Ok(())
        }
    }

    fn sources(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|n| {
                let p = dir.join(n);
                std::fs::write(&p, b"docx").unwrap();
                p
            })
            .collect()
    }

    fn run(
        batch: &[PathBuf],
        target: &Path,
        engine: &dyn ConvertEngine,
        cancel: &CancelToken,
    ) -> (JobSummary, Vec<JobEvent>) {
        let (tx, rx) = mpsc::channel();
        let summary = run_batch(batch, target, engine, cancel, &tx);
        drop(tx);
        (summary, rx.try_iter().collect())
    }

    #[test]
    fn test_collision_probe_numbering() {
        let dir = tempfile::tempdir().unwrap();
        let source = Path::new("/docs/report.docx");

        let first = resolve_output_path(dir.path(), source).unwrap();
        assert_eq!(first, dir.path().join("report.pdf"));

        std::fs::write(dir.path().join("report.pdf"), b"x").unwrap();
        let second = resolve_output_path(dir.path(), source).unwrap();
        assert_eq!(second, dir.path().join("report(1).pdf"));

        std::fs::write(dir.path().join("report(1).pdf"), b"x").unwrap();
        let third = resolve_output_path(dir.path(), source).unwrap();
        assert_eq!(third, dir.path().join("report(2).pdf"));
    }

    #[test]
    fn test_probe_cap_exhaustion() {
        let dir = tempfile::tempdir().unwrap();
        let source = Path::new("/docs/report.docx");

        std::fs::write(dir.path().join("report.pdf"), b"x").unwrap();
        for n in 1..=3 {
            std::fs::write(dir.path().join(format!("report({}).pdf", n)), b"x").unwrap();
        }

        let err = resolve_output_path_capped(dir.path(), source, 3).unwrap_err();
        match err {
            ConvertError::NoFreeName { base, .. } => assert_eq!(base, "report"),
            other => panic!("expected NoFreeName, got {:?}", other),
        }
    }

    #[test]
    fn test_probe_exhaustion_recorded_as_per_file_failure() {
        let src_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let batch = sources(src_dir.path(), &["a.docx", "b.docx"]);

        // Every numbered name for "a" up to the cap is already taken
        std::fs::write(out_dir.path().join("a.pdf"), b"x").unwrap();
        for n in 1..=MAX_NAME_PROBES {
            std::fs::write(out_dir.path().join(format!("a({}).pdf", n)), b"x").unwrap();
        }

        let (summary, _) =
            run(&batch, out_dir.path(), &FakeEngine::new(), &CancelToken::new());

        assert_eq!(summary.failed.len(), 1);
        assert!(summary.failed[0].0.ends_with("a.docx"));
        assert!(summary.failed[0].1.contains("no free output name"));
        // The rest of the batch still runs
        assert_eq!(summary.succeeded, 1);
        assert!(out_dir.path().join("b.pdf").exists());
    }

    #[test]
    fn test_batch_converts_all_in_order() {
        let src_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let batch = sources(src_dir.path(), &["a.docx", "b.docx", "c.docx"]);

        let (summary, events) =
            run(&batch, out_dir.path(), &FakeEngine::new(), &CancelToken::new());

        assert_eq!(summary.succeeded, 3);
        assert!(summary.failed.is_empty());
        assert_eq!(summary.skipped, 0);
        assert!(!summary.cancelled);
        for name in ["a.pdf", "b.pdf", "c.pdf"] {
            assert!(out_dir.path().join(name).exists());
        }

        // Started/finished pairs in list order
        let starts: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                JobEvent::FileStarted { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(starts, vec![0, 1, 2]);
    }

    #[test]
    fn test_engine_failure_does_not_abort_batch() {
        let src_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let batch = sources(src_dir.path(), &["a.docx", "b.docx", "c.docx", "d.docx", "e.docx"]);

        let engine = FakeEngine::failing_on(vec!["c.docx"]);
        let (summary, _) = run(&batch, out_dir.path(), &engine, &CancelToken::new());

        assert_eq!(summary.succeeded, 4);
        assert_eq!(summary.failed.len(), 1);
        assert!(summary.failed[0].0.ends_with("c.docx"));
        assert!(out_dir.path().join("d.pdf").exists());
        assert!(out_dir.path().join("e.pdf").exists());
    }

    #[test]
    fn test_cancel_between_files() {
        let src_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let batch = sources(
            src_dir.path(),
            &["a.docx", "b.docx", "c.docx", "d.docx", "e.docx"],
        );

        let token = CancelToken::new();
        let engine = FakeEngine::cancelling_after(2, token.clone());
        let (summary, _) = run(&batch, out_dir.path(), &engine, &token);

        assert!(summary.cancelled);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.skipped, 3);
        assert!(out_dir.path().join("b.pdf").exists());
        assert!(!out_dir.path().join("c.pdf").exists());
    }

    #[test]
    fn test_two_runs_number_deterministically() {
        let src_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let batch = sources(src_dir.path(), &["name.docx"]);
        let engine = FakeEngine::new();

        let (first, _) = run(&batch, out_dir.path(), &engine, &CancelToken::new());
        let (second, _) = run(&batch, out_dir.path(), &engine, &CancelToken::new());

        assert_eq!(first.succeeded + second.succeeded, 2);
        assert!(out_dir.path().join("name.pdf").exists());
        assert!(out_dir.path().join("name(1).pdf").exists());
    }

    #[test]
    fn test_spawn_job_reports_finished() {
        let src_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let batch = sources(src_dir.path(), &["a.docx"]);

        let handle = spawn_job(
            batch,
            out_dir.path().to_path_buf(),
            Arc::new(FakeEngine::new()),
        );
        assert_eq!(handle.total(), 1);

        // The worker owns the sender; the iterator ends once it finishes.
        let mut finished = None;
        for event in handle.events.iter() {
            if let JobEvent::Finished(summary) = event {
                finished = Some(summary);
            }
        }
        let summary = finished.expect("job should report a summary");
        assert_eq!(summary.succeeded, 1);
    }
}

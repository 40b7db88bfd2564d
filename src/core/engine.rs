//! External conversion engine integration
//!
//! The actual DOCX to PDF rendering is delegated to LibreOffice running in
//! headless mode. The engine is behind a trait so the conversion loop can be
//! exercised in tests without a LibreOffice install.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

/// Errors surfaced while converting a single document
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("converter executable not found: {0}")]
    EngineMissing(String),

    #[error("conversion failed: {0}")]
    Engine(String),

    #[error("no free output name for {base} in {}", dir.display())]
    NoFreeName { dir: PathBuf, base: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A synchronous document converter.
///
/// `convert` must either produce a valid PDF at `target` or return an error;
/// it must not leave a partial file at `target`.
pub trait ConvertEngine: Send + Sync {
    fn convert(&self, source: &Path, target: &Path) -> Result<(), ConvertError>;
}

/// Candidate binary names probed when no override is configured
const SOFFICE_CANDIDATES: &[&str] = &["soffice", "libreoffice"];

/// LibreOffice headless conversion engine
pub struct LibreOffice {
    binary: PathBuf,
}

impl LibreOffice {
    /// Create an engine around a known binary path
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }

    /// Locate a working LibreOffice binary.
    ///
    /// Tries the configured override first, then the well-known names on
    /// PATH, accepting the first one that answers `--version`.
    pub fn detect(override_path: Option<&Path>) -> Option<Self> {
        let candidates: Vec<PathBuf> = override_path
            .map(|p| vec![p.to_path_buf()])
            .unwrap_or_else(|| SOFFICE_CANDIDATES.iter().map(PathBuf::from).collect());

        for candidate in candidates {
            let ok = Command::new(&candidate)
                .arg("--version")
                .output()
                .map(|out| out.status.success())
                .unwrap_or(false);
            if ok {
                tracing::info!("Using converter: {}", candidate.display());
                return Some(Self::new(candidate));
            }
        }
        None
    }

    /// Path of the binary in use
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Create a unique scratch directory for one conversion call.
    ///
    /// LibreOffice only accepts an output directory, never a filename, so
    /// each call converts into its own scratch dir and the result is renamed
    /// onto the requested target afterwards.
    fn scratch_dir() -> Result<PathBuf, ConvertError> {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!("paperdrop-{}-{}", std::process::id(), n));
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

impl ConvertEngine for LibreOffice {
    fn convert(&self, source: &Path, target: &Path) -> Result<(), ConvertError> {
        let scratch = Self::scratch_dir()?;

        let output = Command::new(&self.binary)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(&scratch)
            .arg(source)
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    ConvertError::EngineMissing(self.binary.display().to_string())
                }
                _ => ConvertError::Io(e),
            })?;

        let result = if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ConvertError::Engine(format!(
                "exit code {:?}: {}",
                output.status.code(),
                stderr.trim()
            )))
        } else {
            let stem = source
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let produced = scratch.join(format!("{}.pdf", stem));

            if produced.exists() {
                move_file(&produced, target)
            } else {
                // LibreOffice reports success but writes nothing for inputs
                // it cannot parse; its diagnostics go to stdout.
                let stdout = String::from_utf8_lossy(&output.stdout);
                Err(ConvertError::Engine(format!(
                    "no output produced: {}",
                    stdout.trim()
                )))
            }
        };

        let _ = std::fs::remove_dir_all(&scratch);
        result
    }
}

/// Move a file, falling back to copy-and-delete when the scratch directory
/// sits on a different filesystem than the target.
fn move_file(from: &Path, to: &Path) -> Result<(), ConvertError> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to)?;
    let _ = std::fs::remove_file(from);
    Ok(())
}

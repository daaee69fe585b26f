// SPDX-License-Identifier: MPL-2.0
//! Report export: atomic file writes, clipboard, file dialog.
//!
//! Every export attempt moves through the stages of [`ExportStage`]:
//! `Idle → BuildingReport → Serializing → WritingTemp → Committed`, or
//! to `Failed` from any intermediate stage. File output is atomic — the
//! serialized report goes to a temporary file in the destination
//! directory which is renamed over the final path only once fully
//! written, so the destination is never observed half-written. Failures
//! before the rename remove the temporary file.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tempfile::NamedTempFile;

use crate::report::DiagnosticReport;

/// Maximum clipboard payload (10 MB). Larger contents can hang or fail
/// the platform clipboard.
pub const MAX_CLIPBOARD_SIZE_BYTES: usize = 10 * 1024 * 1024;

/// Stage of an export attempt. `Committed` and `Failed` are the only
/// terminal stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    /// Nothing started yet.
    Idle,
    /// Draining and assembling the report.
    BuildingReport,
    /// Encoding the report as JSON.
    Serializing,
    /// Writing the temporary file.
    WritingTemp,
    /// Renamed into place; the export succeeded.
    Committed,
    /// Aborted; temporary state already cleaned up.
    Failed,
}

/// Failure of a single export attempt.
///
/// Producer-side problems never reach this type; everything here is
/// returned to the export caller, which owns user-facing presentation.
#[derive(Debug)]
pub enum ExportError {
    /// Temp-file create/write/rename failure.
    Io(io::Error),
    /// The report could not be encoded as JSON.
    Serialization(serde_json::Error),
    /// The user dismissed the save dialog. Not a failure.
    Cancelled,
    /// The platform clipboard rejected the content or is unavailable.
    Clipboard(String),
    /// Serialized content exceeds the clipboard limit.
    ContentTooLarge {
        /// Actual size in bytes.
        size: usize,
        /// Allowed maximum in bytes.
        max_size: usize,
    },
}

impl ExportError {
    /// The stage an error of this kind aborts. Clipboard export has no
    /// temp-file stage, so its failures map to `Serializing`.
    #[must_use]
    pub fn failed_stage(&self) -> ExportStage {
        match self {
            Self::Cancelled => ExportStage::Idle,
            Self::Serialization(_) | Self::Clipboard(_) | Self::ContentTooLarge { .. } => {
                ExportStage::Serializing
            }
            Self::Io(_) => ExportStage::WritingTemp,
        }
    }
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Serialization(err) => write!(f, "serialization error: {err}"),
            Self::Cancelled => write!(f, "export cancelled"),
            Self::Clipboard(msg) => write!(f, "clipboard error: {msg}"),
            #[allow(clippy::cast_precision_loss)] // display only
            Self::ContentTooLarge { size, max_size } => {
                let size_mb = *size as f64 / (1024.0 * 1024.0);
                let max_mb = *max_size as f64 / (1024.0 * 1024.0);
                write!(
                    f,
                    "content too large for clipboard: {size_mb:.1} MB exceeds {max_mb:.1} MB limit"
                )
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::Cancelled | Self::Clipboard(_) | Self::ContentTooLarge { .. } => None,
        }
    }
}

impl From<io::Error> for ExportError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}

/// Builds the report filename for a given moment:
/// `glimpse_diagnostics_YYYYMMDD_HHMMSS.json`, zero-padded.
///
/// Filenames use local time throughout — they are a user-facing
/// artifact and should sort the way the user experienced the session.
/// Report *contents* use UTC; the two are never mixed.
#[must_use]
pub fn generate_filename(timestamp: DateTime<Local>) -> String {
    format!(
        "glimpse_diagnostics_{}.json",
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

/// [`generate_filename`] stamped with the current local time.
#[must_use]
pub fn default_filename() -> String {
    generate_filename(Local::now())
}

/// Default directory offered for report saves: the user's Documents
/// folder, or the current directory when none exists.
#[must_use]
pub fn default_export_directory() -> PathBuf {
    dirs::document_dir().unwrap_or_else(|| std::env::current_dir().unwrap_or_default())
}

/// Writes `contents` to `path` atomically.
///
/// A temporary file is created in the destination directory, fully
/// written and flushed, then renamed over `path`. If anything fails
/// before the rename the temporary file is removed and `path` is left
/// exactly as it was.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created, written,
/// or renamed into place.
pub fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    // Dropping a NamedTempFile deletes it, which covers every failure
    // path below, including a failed rename (persist hands the file
    // back inside the error).
    let mut temp = NamedTempFile::new_in(directory)?;
    temp.write_all(contents.as_bytes())?;
    temp.flush()?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Serializes `report` and writes it atomically to `path`.
///
/// # Errors
///
/// Returns [`ExportError::Serialization`] if encoding fails and
/// [`ExportError::Io`] if the atomic write fails. In both cases no file
/// appears at `path` and no temporary file is left behind.
pub fn export_to_file(report: &DiagnosticReport, path: &Path) -> Result<PathBuf, ExportError> {
    let json = report.to_json()?;
    write_atomic(path, &json)?;
    Ok(path.to_path_buf())
}

/// Exports `report` to [`default_export_directory`] under
/// [`default_filename`], for callers that have no destination in hand
/// and no user to ask.
///
/// # Errors
///
/// Same as [`export_to_file`].
pub fn export_to_default_location(report: &DiagnosticReport) -> Result<PathBuf, ExportError> {
    let path = default_export_directory().join(default_filename());
    export_to_file(report, &path)
}

/// Asks the user for a destination via the native save dialog, then
/// exports there.
///
/// The dialog starts in [`default_export_directory`] with
/// [`default_filename`] pre-filled.
///
/// # Errors
///
/// Returns [`ExportError::Cancelled`] when the user dismisses the
/// dialog — a distinct outcome, not an I/O failure — and otherwise the
/// errors of [`export_to_file`].
pub fn export_with_dialog(report: &DiagnosticReport) -> Result<PathBuf, ExportError> {
    let path = rfd::FileDialog::new()
        .set_directory(default_export_directory())
        .set_file_name(default_filename())
        .add_filter("JSON", &["json"])
        .save_file()
        .ok_or(ExportError::Cancelled)?;

    export_to_file(report, &path)
}

/// Destination for clipboard export. The platform binding sits behind
/// this trait so export logic stays testable off-desktop.
pub trait ClipboardSink {
    /// Places a UTF-8 string on the clipboard.
    ///
    /// # Errors
    ///
    /// Returns a platform-specific description on failure.
    fn set_text(&mut self, contents: &str) -> Result<(), String>;
}

/// [`ClipboardSink`] backed by the system clipboard via `arboard`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, contents: &str) -> Result<(), String> {
        let mut clipboard = arboard::Clipboard::new().map_err(|err| err.to_string())?;
        clipboard.set_text(contents).map_err(|err| err.to_string())
    }
}

/// Serializes `report` and hands it to `sink`.
///
/// # Errors
///
/// Returns [`ExportError::ContentTooLarge`] when the JSON exceeds
/// [`MAX_CLIPBOARD_SIZE_BYTES`], [`ExportError::Clipboard`] when the
/// sink rejects the content, and [`ExportError::Serialization`] when
/// encoding fails.
pub fn export_to_clipboard_with(
    report: &DiagnosticReport,
    sink: &mut dyn ClipboardSink,
) -> Result<(), ExportError> {
    let json = report.to_json()?;

    if json.len() > MAX_CLIPBOARD_SIZE_BYTES {
        return Err(ExportError::ContentTooLarge {
            size: json.len(),
            max_size: MAX_CLIPBOARD_SIZE_BYTES,
        });
    }

    sink.set_text(&json).map_err(ExportError::Clipboard)
}

/// [`export_to_clipboard_with`] against the system clipboard.
///
/// # Errors
///
/// See [`export_to_clipboard_with`].
pub fn export_to_clipboard(report: &DiagnosticReport) -> Result<(), ExportError> {
    export_to_clipboard_with(report, &mut SystemClipboard)
}

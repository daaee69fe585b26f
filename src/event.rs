// SPDX-License-Identifier: MPL-2.0
//! Diagnostic event model.
//!
//! Every diagnostic occurrence is one [`DiagnosticEvent`]: a monotonic
//! timestamp plus a [`DiagnosticEventKind`] tagged union. Events are
//! immutable once constructed; the collector's buffer owns them from
//! ingestion until eviction or drain.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::classify::{resolve_category, DiagnosticCategory};
use crate::resource::ResourceSample;

/// Media kind, as far as diagnostics cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    /// Still image.
    Image,
    /// Video with optional audio.
    Video,
    /// Animated image (GIF, animated WebP).
    Animation,
}

/// Coarse size bucket, the privacy-safe stand-in for an exact byte count.
///
/// The mapping is irreversible: a bucket cannot be turned back into a
/// size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeCategory {
    /// Under 1 MB.
    Small,
    /// 1–10 MB.
    Medium,
    /// 10–100 MB.
    Large,
    /// Over 100 MB.
    VeryLarge,
}

impl SizeCategory {
    /// Buckets an exact byte count.
    #[must_use]
    pub fn from_bytes(bytes: u64) -> Self {
        const MB: u64 = 1024 * 1024;
        match bytes {
            b if b < MB => Self::Small,
            b if b < 10 * MB => Self::Medium,
            b if b < 100 * MB => Self::Large,
            _ => Self::VeryLarge,
        }
    }
}

/// A size-bearing field: exact at capture time, bucketed after
/// anonymization.
///
/// Events record the exact byte count so the value stays useful for
/// in-process inspection; the anonymizer generalizes it to a
/// [`SizeCategory`] before anything leaves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MediaSize {
    /// Exact byte count, pre-anonymization. Serializes as `{"bytes": n}`.
    Exact {
        /// Size in bytes.
        bytes: u64,
    },
    /// Generalized bucket, post-anonymization. Serializes as
    /// `{"category": "..."}`.
    Category {
        /// The size bucket.
        category: SizeCategory,
    },
}

impl MediaSize {
    /// Returns the generalized form of this size.
    ///
    /// Already-generalized sizes pass through unchanged, which makes the
    /// transform idempotent.
    #[must_use]
    pub fn generalized(self) -> Self {
        match self {
            Self::Exact { bytes } => Self::Category {
                category: SizeCategory::from_bytes(bytes),
            },
            categorized @ Self::Category { .. } => categorized,
        }
    }
}

/// User-initiated actions worth correlating with problems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UserAction {
    /// Open a media file.
    OpenMedia {
        /// How the file arrived (`file_dialog`, `drag_drop`, `cli`).
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },
    /// Move to the next file in the directory.
    NavigateNext,
    /// Move to the previous file in the directory.
    NavigatePrevious,
    /// Delete the current file.
    DeleteMedia,
    /// Toggle play/pause.
    TogglePlayback,
    /// Seek to a position in the video.
    Seek {
        /// Target position in seconds.
        position_secs: f64,
    },
    /// Change playback speed.
    SetPlaybackSpeed {
        /// New speed multiplier.
        speed: f64,
    },
    /// Change the volume.
    SetVolume {
        /// Volume level (0.0–1.5).
        volume: f32,
    },
    /// Toggle mute.
    ToggleMute,
    /// Zoom in.
    ZoomIn,
    /// Zoom out.
    ZoomOut,
    /// Reset zoom to 100%.
    ResetZoom,
    /// Toggle fullscreen.
    ToggleFullscreen,
    /// Rotate 90° clockwise.
    RotateClockwise,
    /// Rotate 90° counter-clockwise.
    RotateCounterClockwise,
    /// Capture the current video frame as an image.
    CaptureFrame,
    /// Save a copy of the current media.
    SaveCopy,
    /// Open the settings screen.
    OpenSettings,
    /// Leave the settings screen.
    CloseSettings,
}

/// Application state transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AppStateEvent {
    /// A media load began.
    MediaLoadingStarted {
        /// What is being loaded.
        media_type: MediaType,
        /// File size (exact until anonymized).
        size: MediaSize,
    },
    /// A media load finished.
    MediaLoaded {
        /// What was loaded.
        media_type: MediaType,
        /// File size (exact until anonymized).
        size: MediaSize,
    },
    /// A media load failed.
    MediaFailed {
        /// What failed to load.
        media_type: MediaType,
        /// Free-text failure description.
        reason: String,
    },
    /// Video playback started.
    PlaybackStarted {
        /// Position in seconds.
        position_secs: f64,
    },
    /// Video playback paused.
    PlaybackPaused {
        /// Position in seconds.
        position_secs: f64,
    },
    /// Playback reached the end of the stream.
    PlaybackFinished,
    /// The window entered fullscreen.
    FullscreenEntered,
    /// The window left fullscreen.
    FullscreenExited,
}

/// Internal operations with their measured duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum AppOperation {
    /// Full image decode.
    DecodeImage {
        /// Wall-clock duration in milliseconds.
        duration_ms: u64,
        /// Decoded file size (exact until anonymized).
        size: MediaSize,
    },
    /// Single video frame decode.
    DecodeVideoFrame {
        /// Wall-clock duration in milliseconds.
        duration_ms: u64,
    },
    /// Directory scan for sibling media files.
    ScanDirectory {
        /// Wall-clock duration in milliseconds.
        duration_ms: u64,
        /// Number of entries found.
        entry_count: usize,
    },
    /// Thumbnail generation.
    GenerateThumbnail {
        /// Wall-clock duration in milliseconds.
        duration_ms: u64,
    },
    /// Image save to disk.
    SaveImage {
        /// Wall-clock duration in milliseconds.
        duration_ms: u64,
        /// Whether the save succeeded.
        success: bool,
    },
    /// Video seek, from request to first decoded frame.
    VideoSeek {
        /// Wall-clock duration in milliseconds.
        duration_ms: u64,
        /// Seek distance in seconds.
        distance_secs: f64,
    },
}

impl AppOperation {
    /// Returns the operation's measured duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        match self {
            Self::DecodeImage { duration_ms, .. }
            | Self::DecodeVideoFrame { duration_ms }
            | Self::ScanDirectory { duration_ms, .. }
            | Self::GenerateThumbnail { duration_ms }
            | Self::SaveImage { duration_ms, .. }
            | Self::VideoSeek { duration_ms, .. } => *duration_ms,
        }
    }
}

/// A warning: something went wrong without failing the operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarningEvent {
    /// i18n-style message key (e.g. `warning-metadata-skipped`).
    pub message_key: String,
    /// Explicit category, when the call site knows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<DiagnosticCategory>,
    /// Free-text values that would fill the localized template.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl WarningEvent {
    /// Creates a warning with no explicit category; the classifier
    /// infers one from the key at report time.
    #[must_use]
    pub fn new(message_key: impl Into<String>) -> Self {
        Self {
            message_key: message_key.into(),
            category: None,
            args: Vec::new(),
        }
    }

    /// Creates a warning with an explicit category.
    #[must_use]
    pub fn with_category(category: DiagnosticCategory, message_key: impl Into<String>) -> Self {
        Self {
            message_key: message_key.into(),
            category: Some(category),
            args: Vec::new(),
        }
    }

    /// Attaches free-text argument values.
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Returns the effective category: explicit tag, else inferred.
    #[must_use]
    pub fn effective_category(&self) -> DiagnosticCategory {
        resolve_category(self.category, &self.message_key)
    }

    /// Returns a copy with the category pinned to its effective value.
    #[must_use]
    pub fn resolved(&self) -> Self {
        Self {
            category: Some(self.effective_category()),
            ..self.clone()
        }
    }
}

/// An error: an operation failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEvent {
    /// i18n-style message key (e.g. `error-decode-failed`).
    pub message_key: String,
    /// Explicit category, when the call site knows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<DiagnosticCategory>,
    /// Free-text values that would fill the localized template.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl ErrorEvent {
    /// Creates an error with no explicit category; the classifier infers
    /// one from the key at report time.
    #[must_use]
    pub fn new(message_key: impl Into<String>) -> Self {
        Self {
            message_key: message_key.into(),
            category: None,
            args: Vec::new(),
        }
    }

    /// Creates an error with an explicit category.
    #[must_use]
    pub fn with_category(category: DiagnosticCategory, message_key: impl Into<String>) -> Self {
        Self {
            message_key: message_key.into(),
            category: Some(category),
            args: Vec::new(),
        }
    }

    /// Attaches free-text argument values.
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Returns the effective category: explicit tag, else inferred.
    #[must_use]
    pub fn effective_category(&self) -> DiagnosticCategory {
        resolve_category(self.category, &self.message_key)
    }

    /// Returns a copy with the category pinned to its effective value.
    #[must_use]
    pub fn resolved(&self) -> Self {
        Self {
            category: Some(self.effective_category()),
            ..self.clone()
        }
    }
}

/// The tagged union of everything diagnostics can record.
///
/// Serializes with a `type` discriminant and the kind-specific fields
/// flattened beside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticEventKind {
    /// A user-initiated action.
    UserAction {
        /// The action performed.
        #[serde(flatten)]
        action: UserAction,
        /// Optional free-text context.
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
    /// An application state transition.
    AppState {
        /// The transition.
        #[serde(flatten)]
        state: AppStateEvent,
    },
    /// An internal operation with its duration.
    Operation {
        /// The operation.
        #[serde(flatten)]
        operation: AppOperation,
    },
    /// A non-fatal problem.
    Warning {
        /// The warning.
        #[serde(flatten)]
        event: WarningEvent,
    },
    /// A failed operation.
    Error {
        /// The error.
        #[serde(flatten)]
        event: ErrorEvent,
    },
    /// A CPU/RAM measurement.
    ResourceSnapshot {
        /// The measurement.
        #[serde(flatten)]
        sample: ResourceSample,
    },
}

impl DiagnosticEventKind {
    /// The kind name used for summary counters and the JSON `type` tag.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::UserAction { .. } => "user_action",
            Self::AppState { .. } => "app_state",
            Self::Operation { .. } => "operation",
            Self::Warning { .. } => "warning",
            Self::Error { .. } => "error",
            Self::ResourceSnapshot { .. } => "resource_snapshot",
        }
    }

    /// Returns a copy with warning/error categories pinned to their
    /// effective values. Other kinds pass through unchanged.
    #[must_use]
    pub fn with_resolved_categories(&self) -> Self {
        match self {
            Self::Warning { event } => Self::Warning {
                event: event.resolved(),
            },
            Self::Error { event } => Self::Error {
                event: event.resolved(),
            },
            other => other.clone(),
        }
    }
}

/// One diagnostic occurrence: a monotonic timestamp plus its kind.
#[derive(Debug, Clone)]
pub struct DiagnosticEvent {
    /// When the event occurred (monotonic; authoritative for chronology).
    pub timestamp: Instant,
    /// What occurred.
    pub kind: DiagnosticEventKind,
}

impl DiagnosticEvent {
    /// Creates an event stamped with the current instant.
    #[must_use]
    pub fn new(kind: DiagnosticEventKind) -> Self {
        Self {
            timestamp: Instant::now(),
            kind,
        }
    }

    /// Creates an event with an explicit timestamp.
    #[must_use]
    pub fn with_timestamp(kind: DiagnosticEventKind, timestamp: Instant) -> Self {
        Self { timestamp, kind }
    }
}

// SPDX-License-Identifier: MPL-2.0
//! In-process diagnostics for the Glimpse media viewer.
//!
//! The crate captures user actions, state transitions, operations,
//! warnings/errors, and periodic CPU/RAM samples during normal use,
//! retains them in a bounded in-memory buffer, and on demand produces a
//! privacy-safe JSON report written to disk or the clipboard.
//!
//! # Architecture
//!
//! - [`DiagnosticsCollector`] owns the retained buffer and is the only
//!   consumer of the ingestion channel.
//! - [`DiagnosticsHandle`] is the cheap, shareable producer side; its
//!   `log_*` methods never block and never fail toward the caller.
//! - [`Anonymizer`] is a pure transform that strips paths, network
//!   identities, and exact sizes from a snapshot before export.
//! - [`build_report`] assembles metadata, system info, anonymized
//!   events, and summary statistics into a [`DiagnosticReport`].
//! - [`export_to_file`] writes a report atomically;
//!   [`export_to_clipboard`] hands it to the platform clipboard.
//!
//! # Example
//!
//! ```no_run
//! use glimpse_diagnostics::{
//!     export_to_file, Anonymizer, BufferCapacity, DiagnosticsCollector, HostSystemInfo,
//!     UserAction,
//! };
//!
//! let mut collector = DiagnosticsCollector::new(BufferCapacity::default());
//! let handle = collector.handle();
//!
//! // From anywhere in the application, on any thread:
//! handle.log_action(UserAction::NavigateNext);
//!
//! // On demand, build and export a report:
//! let report = collector.build_report(&Anonymizer::new(), &HostSystemInfo);
//! export_to_file(&report, "glimpse_diagnostics.json".as_ref())?;
//! # Ok::<(), glimpse_diagnostics::ExportError>(())
//! ```
//!
//! # Privacy
//!
//! Warning/error arguments are scrubbed of absolute paths the moment
//! they are logged; everything else that could identify a user (IPs,
//! domains, e-mail addresses, the username, exact file sizes) is
//! replaced with salted hash tokens or coarse buckets when the report
//! is built. Numeric resource samples are exempt, so summary statistics
//! stay exact.

mod anonymize;
mod buffer;
mod classify;
mod collector;
mod event;
mod export;
mod report;
mod resource;
mod sanitize;
mod settings;

pub use anonymize::Anonymizer;
pub use buffer::{capacity_bounds, BufferCapacity, RetainedBuffer};
pub use classify::{resolve_category, DiagnosticCategory};
pub use collector::{DiagnosticsCollector, DiagnosticsHandle};
pub use event::{
    AppOperation, AppStateEvent, DiagnosticEvent, DiagnosticEventKind, ErrorEvent, MediaSize,
    MediaType, SizeCategory, UserAction, WarningEvent,
};
pub use export::{
    default_export_directory, default_filename, export_to_clipboard, export_to_clipboard_with,
    export_to_default_location, export_to_file, export_with_dialog, generate_filename,
    write_atomic, ClipboardSink, ExportError, ExportStage, SystemClipboard,
    MAX_CLIPBOARD_SIZE_BYTES,
};
pub use report::{
    build_report, DiagnosticReport, HostSystemInfo, ReportMetadata, ReportSummary, ResourceStats,
    SerializableEvent, SystemInfo, SystemInfoProvider,
};
pub use resource::{
    sampling_bounds, ResourceSample, ResourceSampler, SamplingInterval,
};
pub use sanitize::scrub_message;
pub use settings::{load_from_path, save_to_path, DiagnosticsSettings, SettingsError};

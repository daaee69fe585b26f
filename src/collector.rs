// SPDX-License-Identifier: MPL-2.0
//! Event collection: non-blocking producers, single consumer.
//!
//! Producers anywhere in the application hold a [`DiagnosticsHandle`] and
//! call its `log_*` methods; each call is a channel send that never
//! blocks and never reports failure upward. The [`DiagnosticsCollector`]
//! is the channel's only consumer and the retained buffer's only
//! mutator: [`DiagnosticsCollector::drain`] moves queued events into the
//! buffer (evicting oldest-first at capacity) and
//! [`DiagnosticsCollector::snapshot`] hands out ordered copies for
//! report building. An in-progress export therefore never blocks, and is
//! never blocked by, concurrent instrumentation calls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::anonymize::Anonymizer;
use crate::buffer::{BufferCapacity, RetainedBuffer};
use crate::event::{
    AppOperation, AppStateEvent, DiagnosticEvent, DiagnosticEventKind, ErrorEvent, UserAction,
    WarningEvent,
};
use crate::report::{DiagnosticReport, SystemInfoProvider};
use crate::resource::ResourceSample;
use crate::sanitize::scrub_message;

/// Producer-side reference to a collector.
///
/// Cheap to clone and freely shareable across threads. Every logging
/// method checks the collector's enable switch, then performs one
/// non-blocking channel send; if the collector is gone or collection is
/// disabled the event is silently dropped. Diagnostics must never affect
/// host-application correctness, so no failure surfaces here.
#[derive(Clone, Debug)]
pub struct DiagnosticsHandle {
    event_tx: Sender<DiagnosticEvent>,
    enabled: Arc<AtomicBool>,
}

impl DiagnosticsHandle {
    /// Logs a user action.
    pub fn log_action(&self, action: UserAction) {
        self.log_action_with_details(action, None);
    }

    /// Logs a user action with free-text context.
    pub fn log_action_with_details(&self, action: UserAction, details: Option<String>) {
        self.submit(DiagnosticEventKind::UserAction { action, details });
    }

    /// Logs an application state transition.
    pub fn log_state(&self, state: AppStateEvent) {
        self.submit(DiagnosticEventKind::AppState { state });
    }

    /// Logs an internal operation with its duration.
    pub fn log_operation(&self, operation: AppOperation) {
        self.submit(DiagnosticEventKind::Operation { operation });
    }

    /// Logs a warning. Argument values are scrubbed of absolute paths
    /// before the event enters the channel.
    pub fn log_warning(&self, warning: WarningEvent) {
        let scrubbed = WarningEvent {
            args: warning.args.iter().map(|arg| scrub_message(arg)).collect(),
            ..warning
        };
        self.submit(DiagnosticEventKind::Warning { event: scrubbed });
    }

    /// Logs an error. Argument values are scrubbed of absolute paths
    /// before the event enters the channel.
    pub fn log_error(&self, error: ErrorEvent) {
        let scrubbed = ErrorEvent {
            args: error.args.iter().map(|arg| scrub_message(arg)).collect(),
            ..error
        };
        self.submit(DiagnosticEventKind::Error { event: scrubbed });
    }

    /// Logs a CPU/RAM sample.
    pub fn log_resource_snapshot(&self, sample: ResourceSample) {
        self.submit(DiagnosticEventKind::ResourceSnapshot { sample });
    }

    fn submit(&self, kind: DiagnosticEventKind) {
        if !self.enabled.load(Ordering::Relaxed) {
            return;
        }
        // Unbounded channel: send never blocks and only fails when the
        // collector has been torn down, in which case the event is lost
        // by design.
        let _ = self.event_tx.send(DiagnosticEvent::new(kind));
    }
}

/// Owner of the retained buffer and sole consumer of the ingestion
/// channel.
pub struct DiagnosticsCollector {
    buffer: RetainedBuffer<DiagnosticEvent>,
    event_rx: Receiver<DiagnosticEvent>,
    event_tx: Sender<DiagnosticEvent>,
    enabled: Arc<AtomicBool>,
    /// Monotonic collection start, the zero point for event timestamps.
    started_at: Instant,
    /// Wall-clock collection start, for report metadata.
    started_at_utc: DateTime<Utc>,
}

impl DiagnosticsCollector {
    /// Creates a collector with the given retention capacity.
    /// Collection starts enabled.
    #[must_use]
    pub fn new(capacity: BufferCapacity) -> Self {
        let (event_tx, event_rx) = unbounded();
        Self {
            buffer: RetainedBuffer::new(capacity),
            event_rx,
            event_tx,
            enabled: Arc::new(AtomicBool::new(true)),
            started_at: Instant::now(),
            started_at_utc: Utc::now(),
        }
    }

    /// Mints a producer handle bound to this collector's channel and
    /// enable switch.
    #[must_use]
    pub fn handle(&self) -> DiagnosticsHandle {
        DiagnosticsHandle {
            event_tx: self.event_tx.clone(),
            enabled: Arc::clone(&self.enabled),
        }
    }

    /// Moves every queued event into the retained buffer, applying
    /// oldest-first eviction. Returns how many events were moved.
    ///
    /// After a drain the buffer holds exactly the most recent
    /// `min(total_sent, capacity)` events in send order.
    pub fn drain(&mut self) -> usize {
        let mut moved = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            self.buffer.push(event);
            moved += 1;
        }
        moved
    }

    /// Returns an ordered copy of the retained buffer without mutating
    /// it. Call [`DiagnosticsCollector::drain`] first to include queued
    /// events.
    #[must_use]
    pub fn snapshot(&self) -> Vec<DiagnosticEvent> {
        self.buffer.snapshot()
    }

    /// Number of retained events (queued events not included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// True when no events are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Retention capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Discards all retained events.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Flips the collection switch. Takes effect on the very next `log`
    /// call of every handle; events already queued still drain. Calling
    /// with the current value is a no-op.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Current state of the collection switch.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// How long this collector has been running.
    #[must_use]
    pub fn collection_duration(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Monotonic collection start; the zero point for serialized event
    /// timestamps.
    #[must_use]
    pub(crate) fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Wall-clock collection start, for report metadata.
    #[must_use]
    pub(crate) fn started_at_utc(&self) -> DateTime<Utc> {
        self.started_at_utc
    }

    /// Drains, snapshots, and assembles a complete anonymized report.
    ///
    /// Equivalent to calling [`crate::build_report`] with this
    /// collector.
    #[must_use]
    pub fn build_report(
        &mut self,
        anonymizer: &Anonymizer,
        system_info: &dyn SystemInfoProvider,
    ) -> DiagnosticReport {
        crate::report::build_report(self, anonymizer, system_info)
    }
}

impl Default for DiagnosticsCollector {
    fn default() -> Self {
        Self::new(BufferCapacity::default())
    }
}

// SPDX-License-Identifier: MPL-2.0
//! Report assembly: summary statistics, metadata, system context.
//!
//! A [`DiagnosticReport`] is created fresh per export request and never
//! mutated afterwards. Building one drains and snapshots the collector,
//! resolves warning/error categories, computes the summary from the raw
//! numeric fields, anonymizes the events, and attaches freshly queried
//! metadata and system information.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sysinfo::System;
use uuid::Uuid;

use crate::anonymize::Anonymizer;
use crate::collector::DiagnosticsCollector;
use crate::event::DiagnosticEventKind;

/// Report metadata, stamped at build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Unique report identifier (UUID v4).
    pub report_id: String,
    /// When the report was generated (RFC 3339, UTC).
    pub generated_at: String,
    /// Version of Glimpse that generated the report.
    pub app_version: String,
    /// When collection started (RFC 3339, UTC).
    pub collection_started_at: String,
    /// Collection duration in milliseconds.
    pub collection_duration_ms: u64,
    /// Number of events in the report.
    pub event_count: usize,
}

impl ReportMetadata {
    /// Creates metadata with a fresh id and generation timestamp.
    #[must_use]
    pub fn new(
        collection_started_at: DateTime<Utc>,
        collection_duration_ms: u64,
        event_count: usize,
    ) -> Self {
        Self {
            report_id: Uuid::new_v4().to_string(),
            generated_at: Utc::now().to_rfc3339(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            collection_started_at: collection_started_at.to_rfc3339(),
            collection_duration_ms,
            event_count,
        }
    }
}

/// Host context attached to every report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system family (`linux`, `windows`, `macos`).
    pub os: String,
    /// Operating system version.
    pub os_version: String,
    /// CPU architecture (`x86_64`, `aarch64`).
    pub cpu_arch: String,
    /// Logical CPU core count.
    pub cpu_cores: usize,
    /// Total RAM in megabytes.
    pub ram_total_mb: u64,
}

/// Source of [`SystemInfo`], queried once per report build.
///
/// The seam exists so tests can build reports with a fixed host context
/// instead of probing the machine they run on.
pub trait SystemInfoProvider {
    /// Returns the host context for the report being built.
    fn system_info(&self) -> SystemInfo;
}

/// [`SystemInfoProvider`] backed by the actual host, via `sysinfo`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostSystemInfo;

impl SystemInfoProvider for HostSystemInfo {
    fn system_info(&self) -> SystemInfo {
        let sys = System::new_all();
        SystemInfo {
            os: std::env::consts::OS.to_string(),
            os_version: System::os_version().unwrap_or_else(|| "unknown".to_string()),
            cpu_arch: std::env::consts::ARCH.to_string(),
            cpu_cores: sys.cpus().len(),
            ram_total_mb: sys.total_memory() / (1024 * 1024),
        }
    }
}

/// An event ready for JSON export: relative timestamp plus flattened
/// kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableEvent {
    /// Milliseconds since collection started.
    pub timestamp_ms: u64,
    /// The event payload, flattened beside the timestamp.
    #[serde(flatten)]
    pub kind: DiagnosticEventKind,
}

impl SerializableEvent {
    /// Converts a monotonic event timestamp into milliseconds relative
    /// to `collection_start`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // ms since start fits in u64
    pub fn new(
        event_timestamp: Instant,
        collection_start: Instant,
        kind: DiagnosticEventKind,
    ) -> Self {
        let timestamp_ms = event_timestamp
            .saturating_duration_since(collection_start)
            .as_millis() as u64;
        Self { timestamp_ms, kind }
    }
}

/// CPU/RAM statistics over a report's resource samples.
///
/// Present only when at least one sample exists, so none of the fields
/// needs to be optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceStats {
    /// Lowest sampled CPU usage percentage.
    pub cpu_min: f32,
    /// Highest sampled CPU usage percentage.
    pub cpu_max: f32,
    /// Mean sampled CPU usage percentage.
    pub cpu_avg: f32,
    /// Lowest sampled RAM usage in megabytes.
    pub ram_min_mb: u64,
    /// Highest sampled RAM usage in megabytes.
    pub ram_max_mb: u64,
    /// Mean sampled RAM usage in megabytes.
    pub ram_avg_mb: u64,
}

/// Running accumulator for resource statistics; one fold per sample,
/// averages derived once at the end.
#[derive(Debug, Default)]
struct ResourceAccumulator {
    count: u64,
    cpu_min: f32,
    cpu_max: f32,
    cpu_sum: f64,
    ram_min_mb: u64,
    ram_max_mb: u64,
    ram_sum_mb: u64,
}

impl ResourceAccumulator {
    fn fold(&mut self, cpu_percent: f32, ram_bytes: u64) {
        let ram_mb = ram_bytes / (1024 * 1024);
        if self.count == 0 {
            self.cpu_min = cpu_percent;
            self.cpu_max = cpu_percent;
            self.ram_min_mb = ram_mb;
            self.ram_max_mb = ram_mb;
        } else {
            self.cpu_min = self.cpu_min.min(cpu_percent);
            self.cpu_max = self.cpu_max.max(cpu_percent);
            self.ram_min_mb = self.ram_min_mb.min(ram_mb);
            self.ram_max_mb = self.ram_max_mb.max(ram_mb);
        }
        self.cpu_sum += f64::from(cpu_percent);
        self.ram_sum_mb += ram_mb;
        self.count += 1;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn finish(self) -> Option<ResourceStats> {
        if self.count == 0 {
            return None;
        }
        Some(ResourceStats {
            cpu_min: self.cpu_min,
            cpu_max: self.cpu_max,
            cpu_avg: (self.cpu_sum / self.count as f64) as f32,
            ram_min_mb: self.ram_min_mb,
            ram_max_mb: self.ram_max_mb,
            ram_avg_mb: self.ram_sum_mb / self.count,
        })
    }
}

/// Per-kind counts plus optional resource statistics.
///
/// `event_counts` is a `BTreeMap` so identical buffer contents always
/// serialize identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Count of events keyed by kind name (`user_action`, `warning`, …).
    pub event_counts: BTreeMap<String, usize>,
    /// Resource statistics; absent when the report has no samples.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_stats: Option<ResourceStats>,
}

impl ReportSummary {
    /// Computes the summary in a single pass over the events.
    ///
    /// Resource samples feed the min/max/sum/count accumulator as they
    /// are counted; averages are derived once after the pass. An empty
    /// input yields empty counts and no resource statistics.
    #[must_use]
    pub fn from_events(events: &[SerializableEvent]) -> Self {
        let mut event_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut resources = ResourceAccumulator::default();

        for event in events {
            if let DiagnosticEventKind::ResourceSnapshot { sample } = &event.kind {
                resources.fold(sample.cpu_percent, sample.ram_bytes);
            }
            *event_counts.entry(event.kind.kind_name().to_string()).or_insert(0) += 1;
        }

        Self {
            event_counts,
            resource_stats: resources.finish(),
        }
    }
}

/// The complete exportable report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    /// Report metadata.
    pub metadata: ReportMetadata,
    /// Host context.
    pub system_info: SystemInfo,
    /// Anonymized events, oldest first.
    pub events: Vec<SerializableEvent>,
    /// Summary statistics; omitted from JSON when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ReportSummary>,
}

impl DiagnosticReport {
    /// Assembles a report from already-prepared parts.
    #[must_use]
    pub fn new(
        metadata: ReportMetadata,
        system_info: SystemInfo,
        events: Vec<SerializableEvent>,
        summary: Option<ReportSummary>,
    ) -> Self {
        Self {
            metadata,
            system_info,
            events,
            summary,
        }
    }

    /// Serializes the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Drains the collector and assembles a complete anonymized report.
///
/// The summary is computed from the raw (pre-anonymization) events; the
/// anonymizer never touches numeric resource fields, so the statistics
/// are identical either way, and the raw pass keeps the data flow in one
/// direction.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // ms duration fits in u64
pub fn build_report(
    collector: &mut DiagnosticsCollector,
    anonymizer: &Anonymizer,
    system_info: &dyn SystemInfoProvider,
) -> DiagnosticReport {
    collector.drain();

    let collection_start = collector.started_at();
    let raw: Vec<SerializableEvent> = collector
        .snapshot()
        .iter()
        .map(|event| {
            SerializableEvent::new(
                event.timestamp,
                collection_start,
                event.kind.with_resolved_categories(),
            )
        })
        .collect();

    let summary = ReportSummary::from_events(&raw);
    let events = anonymizer.anonymize_events(&raw);

    let metadata = ReportMetadata::new(
        collector.started_at_utc(),
        collector.collection_duration().as_millis() as u64,
        events.len(),
    );

    DiagnosticReport::new(metadata, system_info.system_info(), events, Some(summary))
}

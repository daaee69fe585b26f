// SPDX-License-Identifier: MPL-2.0
//! End-to-end tests for the capture → anonymize → export pipeline.

use std::fs;

use glimpse_diagnostics::{
    build_report, export_to_file, Anonymizer, AppOperation, AppStateEvent, BufferCapacity,
    DiagnosticCategory, DiagnosticsCollector, ErrorEvent, ExportError, MediaSize, MediaType,
    ResourceSample, SystemInfo, SystemInfoProvider, UserAction, WarningEvent,
};

struct FixedHost;

impl SystemInfoProvider for FixedHost {
    fn system_info(&self) -> SystemInfo {
        SystemInfo {
            os: "linux".to_string(),
            os_version: "6.1".to_string(),
            cpu_arch: "x86_64".to_string(),
            cpu_cores: 8,
            ram_total_mb: 16_384,
        }
    }
}

fn populated_collector() -> DiagnosticsCollector {
    let collector = DiagnosticsCollector::new(BufferCapacity::default());
    let handle = collector.handle();

    handle.log_action_with_details(
        UserAction::OpenMedia {
            source: Some("file_dialog".to_string()),
        },
        Some("picked /home/someone/pictures/cat.jpg".to_string()),
    );
    handle.log_state(AppStateEvent::MediaLoaded {
        media_type: MediaType::Image,
        size: MediaSize::Exact {
            bytes: 3 * 1024 * 1024,
        },
    });
    handle.log_operation(AppOperation::DecodeImage {
        duration_ms: 21,
        size: MediaSize::Exact {
            bytes: 3 * 1024 * 1024,
        },
    });
    handle.log_warning(
        WarningEvent::new("warning-network-slow")
            .with_args(vec!["mirror nas.example.com responded late".to_string()]),
    );
    handle.log_error(ErrorEvent::with_category(
        DiagnosticCategory::ConfigurationIssue,
        "error-network-unreachable",
    ));
    handle.log_resource_snapshot(ResourceSample::new(10.0, 1024 * 1024 * 1024));
    handle.log_resource_snapshot(ResourceSample::new(20.0, 2 * 1024 * 1024 * 1024));
    handle.log_resource_snapshot(ResourceSample::new(30.0, 3 * 1024 * 1024 * 1024));

    collector
}

#[test]
fn exported_file_reflects_report_contents() {
    let mut collector = populated_collector();
    let anonymizer = Anonymizer::with_seed_and_username(11, Some("someone"));
    let report = build_report(&mut collector, &anonymizer, &FixedHost);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    export_to_file(&report, &path).expect("export succeeds");

    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

    // metadata.event_count equals the number of exported events.
    let events = parsed["events"].as_array().expect("events array");
    assert_eq!(
        parsed["metadata"]["event_count"].as_u64().unwrap() as usize,
        events.len()
    );
    assert_eq!(events.len(), 8);

    // Every event carries a timestamp and a type tag, in capture order.
    let types: Vec<_> = events
        .iter()
        .map(|event| {
            assert!(event.get("timestamp_ms").is_some());
            event["type"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(
        types,
        vec![
            "user_action",
            "app_state",
            "operation",
            "warning",
            "error",
            "resource_snapshot",
            "resource_snapshot",
            "resource_snapshot"
        ]
    );

    // System info comes from the injected provider.
    assert_eq!(parsed["system_info"]["os"], "linux");
    assert_eq!(parsed["system_info"]["cpu_cores"], 8);

    // Summary: per-kind counts and exact resource statistics.
    let summary = &parsed["summary"];
    assert_eq!(summary["event_counts"]["resource_snapshot"], 3);
    assert_eq!(summary["event_counts"]["user_action"], 1);
    let stats = &summary["resource_stats"];
    assert_eq!(stats["cpu_min"], 10.0);
    assert_eq!(stats["cpu_max"], 30.0);
    assert_eq!(stats["cpu_avg"], 20.0);
    assert_eq!(stats["ram_min_mb"], 1024);
    assert_eq!(stats["ram_max_mb"], 3072);
    assert_eq!(stats["ram_avg_mb"], 2048);
}

#[test]
fn exported_file_contains_no_private_data() {
    let mut collector = populated_collector();
    let anonymizer = Anonymizer::with_seed_and_username(11, Some("someone"));
    let report = build_report(&mut collector, &anonymizer, &FixedHost);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    export_to_file(&report, &path).expect("export succeeds");
    let contents = fs::read_to_string(&path).unwrap();

    // The absolute path, the domain, and exact byte sizes are gone.
    assert!(!contents.contains("/home/"));
    assert!(!contents.contains("cat.jpg"));
    assert!(!contents.contains("example.com"));
    assert!(!contents.contains("3145728"));
    assert!(contents.contains("<path:"));
    assert!(contents.contains("<domain:"));
    assert!(contents.contains("\"category\": \"medium\""));
}

#[test]
fn categories_are_resolved_in_exported_json() {
    let mut collector = populated_collector();
    let anonymizer = Anonymizer::with_seed_and_username(11, None);
    let report = build_report(&mut collector, &anonymizer, &FixedHost);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    export_to_file(&report, &path).expect("export succeeds");
    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

    let events = parsed["events"].as_array().unwrap();
    // Warning had no explicit tag: inferred from its -network- key.
    assert_eq!(events[3]["category"], "network_error");
    // Error carried an explicit tag that beats its -network- key.
    assert_eq!(events[4]["category"], "configuration_issue");
}

#[test]
fn retention_and_disable_behave_across_the_pipeline() {
    let mut collector = DiagnosticsCollector::new(BufferCapacity::new(100));
    let handle = collector.handle();

    for _ in 0..150 {
        handle.log_action(UserAction::NavigateNext);
    }
    collector.drain();
    assert_eq!(collector.len(), 100);

    collector.set_enabled(false);
    for _ in 0..50 {
        handle.log_action(UserAction::ZoomIn);
    }
    collector.drain();
    assert_eq!(collector.len(), 100, "disabled logging must change nothing");

    let anonymizer = Anonymizer::with_seed_and_username(1, None);
    let report = build_report(&mut collector, &anonymizer, &FixedHost);
    assert_eq!(report.metadata.event_count, 100);
}

#[test]
fn failed_export_never_corrupts_an_existing_report() {
    let mut collector = populated_collector();
    let anonymizer = Anonymizer::with_seed_and_username(11, None);
    let report = build_report(&mut collector, &anonymizer, &FixedHost);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    export_to_file(&report, &path).expect("first export succeeds");
    let original = fs::read_to_string(&path).unwrap();

    // A failing export elsewhere must not disturb the existing file or
    // leave temp files next to it.
    let bad_path = dir.path().join("missing").join("report.json");
    let result = export_to_file(&report, &bad_path);
    assert!(matches!(result, Err(ExportError::Io(_))));
    assert!(!bad_path.exists());

    assert_eq!(fs::read_to_string(&path).unwrap(), original);
    let entries: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("report.json")]);
}

#[test]
fn report_json_round_trips_into_typed_report() {
    let mut collector = populated_collector();
    let anonymizer = Anonymizer::with_seed_and_username(11, None);
    let report = build_report(&mut collector, &anonymizer, &FixedHost);

    let json = report.to_json().unwrap();
    let back: glimpse_diagnostics::DiagnosticReport = serde_json::from_str(&json).unwrap();

    assert_eq!(back.metadata.report_id, report.metadata.report_id);
    assert_eq!(back.events, report.events);
    assert_eq!(back.summary, report.summary);
}

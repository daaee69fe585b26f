// SPDX-License-Identifier: MPL-2.0
//! Category resolution for warning and error events.
//!
//! Warnings and errors carry an i18n-style message key (e.g.
//! `error-decode-failed`) and an optional explicit category chosen at the
//! call site. [`resolve_category`] turns that pair into a definite
//! [`DiagnosticCategory`]: the explicit tag wins, otherwise the key is
//! matched against an ordered substring-rule table, otherwise the result
//! is [`DiagnosticCategory::Other`]. Resolution is pure and never fails.

use serde::{Deserialize, Serialize};

/// Category of a warning or error event.
///
/// Closed enumeration shared by warnings and errors. Categories drive
/// report triage without exposing the localized message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCategory {
    /// A configuration value was missing or invalid.
    ConfigurationIssue,
    /// File read/write failure.
    IoError,
    /// Media decoding failure.
    DecodeError,
    /// Export or save operation failure.
    ExportError,
    /// AI model loading or inference failure.
    AiModelError,
    /// Internal invariant violation.
    InternalError,
    /// The media format is not supported.
    UnsupportedFormat,
    /// Permission was denied for an operation.
    PermissionDenied,
    /// A requested file was not found.
    FileNotFound,
    /// A network-related failure.
    NetworkError,
    /// Anything not covered by a specific category.
    Other,
}

/// Ordered key-substring rules for category inference, first match wins.
///
/// `-decod` covers both `-decode` and `-decoding` keys. `-io` comes last
/// among the specific rules so that more precise substrings take
/// precedence (e.g. a `-config-io` key classifies as a configuration
/// issue).
const CATEGORY_RULES: &[(&str, DiagnosticCategory)] = &[
    ("-config", DiagnosticCategory::ConfigurationIssue),
    ("-network", DiagnosticCategory::NetworkError),
    ("-permission", DiagnosticCategory::PermissionDenied),
    ("-not-found", DiagnosticCategory::FileNotFound),
    ("-unsupported", DiagnosticCategory::UnsupportedFormat),
    ("-decod", DiagnosticCategory::DecodeError),
    ("-export", DiagnosticCategory::ExportError),
    ("-save", DiagnosticCategory::ExportError),
    ("-model", DiagnosticCategory::AiModelError),
    ("-internal", DiagnosticCategory::InternalError),
    ("-io", DiagnosticCategory::IoError),
];

/// Resolves the effective category of a warning or error.
///
/// Two-stage resolution: an explicit category always wins; otherwise the
/// message key is scanned against the rule table in order and the
/// first matching rule decides. Keys that match no rule resolve to
/// [`DiagnosticCategory::Other`] — an unmatched key is not an error.
#[must_use]
pub fn resolve_category(
    explicit: Option<DiagnosticCategory>,
    message_key: &str,
) -> DiagnosticCategory {
    if let Some(category) = explicit {
        return category;
    }

    CATEGORY_RULES
        .iter()
        .find(|(needle, _)| message_key.contains(needle))
        .map_or(DiagnosticCategory::Other, |(_, category)| *category)
}

// SPDX-License-Identifier: MPL-2.0
//! Export-time anonymization.
//!
//! [`Anonymizer`] is a pure transform over a snapshot of serializable
//! events: path-like substrings, IPv4 addresses, e-mail addresses,
//! recognized domain names, and the local username become salted hash
//! tokens; exact byte sizes collapse into [`SizeCategory`] buckets.
//! Numeric resource fields are never touched, so summary statistics are
//! identical whether they are computed before or after this transform.
//!
//! Guarantees: same event count in and out, order preserved, no field
//! changes shape, and the transform is idempotent — no replacement token
//! re-matches any rule.
//!
//! Each instance carries its own session salt, so hashes are stable
//! within one report but cannot be correlated across reports.
//!
//! [`SizeCategory`]: crate::event::SizeCategory

use std::net::Ipv4Addr;
use std::sync::LazyLock;

use regex::Regex;

use crate::event::{AppOperation, AppStateEvent, DiagnosticEventKind, ErrorEvent, WarningEvent};
use crate::report::SerializableEvent;
use crate::sanitize::path_pattern;

/// IPv4 candidates; validated with [`Ipv4Addr`] before replacement.
static IPV4: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").expect("ipv4 pattern should compile"));

/// E-mail addresses.
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
        .expect("email pattern should compile")
});

/// Dot-separated name candidates; gated on [`KNOWN_TLDS`] so filenames
/// like `photo.jpg` pass through.
static DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}\b")
        .expect("domain pattern should compile")
});

/// TLDs treated as real domains. Anything else (notably file
/// extensions) is left alone.
const KNOWN_TLDS: &[&str] = &[
    "com", "org", "net", "edu", "gov", "int", "io", "dev", "app", "cloud", "tech", "co", "info",
    "biz", "me", "uk", "de", "fr", "jp", "cn", "au", "ca", "nl", "br", "in", "it", "es",
];

/// Privacy transform applied to every report before it leaves the
/// process.
#[derive(Debug, Clone)]
pub struct Anonymizer {
    /// Session salt for the keyed hash (32 bytes).
    salt: [u8; 32],
    /// Pre-compiled pattern matching the local username, if known.
    username_pattern: Option<Regex>,
    /// Pre-computed replacement for the local username.
    username_replacement: Option<String>,
    /// Caller-supplied sensitive patterns, replaced with `<redacted>`.
    extra_patterns: Vec<Regex>,
}

impl Anonymizer {
    /// Creates an anonymizer with a cryptographically random session
    /// salt. The local username is read from `USER`/`USERNAME`.
    ///
    /// # Panics
    ///
    /// Panics if the operating system cannot provide random bytes.
    #[must_use]
    pub fn new() -> Self {
        let mut salt = [0u8; 32];
        getrandom::fill(&mut salt).expect("OS should provide random bytes");
        let username = std::env::var("USER").or_else(|_| std::env::var("USERNAME")).ok();
        Self::build(salt, username.as_deref())
    }

    /// Creates an anonymizer with a deterministic salt, for tests that
    /// need reproducible hashes. The local username is still detected.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        let username = std::env::var("USER").or_else(|_| std::env::var("USERNAME")).ok();
        Self::build(Self::salt_from_seed(seed), username.as_deref())
    }

    /// Deterministic salt and a fixed (or absent) username.
    #[must_use]
    pub fn with_seed_and_username(seed: u64, username: Option<&str>) -> Self {
        Self::build(Self::salt_from_seed(seed), username)
    }

    /// Adds a sensitive pattern whose matches are replaced with
    /// `<redacted>`. The pattern must not match its own replacement,
    /// otherwise idempotency is lost.
    #[must_use]
    pub fn with_pattern(mut self, pattern: Regex) -> Self {
        self.extra_patterns.push(pattern);
        self
    }

    fn salt_from_seed(seed: u64) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&seed.to_le_bytes());
        hasher.update(b"glimpse_diagnostics_anonymizer_seed");
        *hasher.finalize().as_bytes()
    }

    fn build(salt: [u8; 32], username: Option<&str>) -> Self {
        let (username_replacement, username_pattern) = match username {
            Some(name) if !name.is_empty() => {
                let replacement = format!("<user:{}>", Self::hash_with_salt(&salt, name));
                let escaped = regex::escape(name);
                let pattern = Regex::new(&format!(r"(?i)\b{escaped}\b")).ok();
                (Some(replacement), pattern)
            }
            _ => (None, None),
        };

        Self {
            salt,
            username_pattern,
            username_replacement,
            extra_patterns: Vec::new(),
        }
    }

    fn hash_with_salt(salt: &[u8; 32], value: &str) -> String {
        let mut hasher = blake3::Hasher::new_keyed(salt);
        hasher.update(value.as_bytes());
        hasher.finalize().to_hex()[..8].to_string()
    }

    /// Salted 8-hex-character hash of `value`, stable for this
    /// instance's lifetime.
    fn hash_value(&self, value: &str) -> String {
        Self::hash_with_salt(&self.salt, value)
    }

    /// Anonymizes a snapshot of events. Count and order are preserved.
    #[must_use]
    pub fn anonymize_events(&self, events: &[SerializableEvent]) -> Vec<SerializableEvent> {
        events
            .iter()
            .map(|event| SerializableEvent {
                timestamp_ms: event.timestamp_ms,
                kind: self.anonymize_kind(&event.kind),
            })
            .collect()
    }

    /// Anonymizes one event kind.
    #[must_use]
    pub fn anonymize_kind(&self, kind: &DiagnosticEventKind) -> DiagnosticEventKind {
        match kind {
            DiagnosticEventKind::UserAction { action, details } => {
                DiagnosticEventKind::UserAction {
                    action: action.clone(),
                    details: details.as_ref().map(|text| self.anonymize_string(text)),
                }
            }
            DiagnosticEventKind::AppState { state } => DiagnosticEventKind::AppState {
                state: self.anonymize_state(state),
            },
            DiagnosticEventKind::Operation { operation } => DiagnosticEventKind::Operation {
                operation: Self::anonymize_operation(operation),
            },
            DiagnosticEventKind::Warning { event } => DiagnosticEventKind::Warning {
                event: WarningEvent {
                    args: event.args.iter().map(|arg| self.anonymize_string(arg)).collect(),
                    ..event.clone()
                },
            },
            DiagnosticEventKind::Error { event } => DiagnosticEventKind::Error {
                event: ErrorEvent {
                    args: event.args.iter().map(|arg| self.anonymize_string(arg)).collect(),
                    ..event.clone()
                },
            },
            // Numeric resource fields are exempt from anonymization.
            DiagnosticEventKind::ResourceSnapshot { sample } => {
                DiagnosticEventKind::ResourceSnapshot {
                    sample: sample.clone(),
                }
            }
        }
    }

    fn anonymize_state(&self, state: &AppStateEvent) -> AppStateEvent {
        match state {
            AppStateEvent::MediaLoadingStarted { media_type, size } => {
                AppStateEvent::MediaLoadingStarted {
                    media_type: *media_type,
                    size: size.generalized(),
                }
            }
            AppStateEvent::MediaLoaded { media_type, size } => AppStateEvent::MediaLoaded {
                media_type: *media_type,
                size: size.generalized(),
            },
            AppStateEvent::MediaFailed { media_type, reason } => AppStateEvent::MediaFailed {
                media_type: *media_type,
                reason: self.anonymize_string(reason),
            },
            other => other.clone(),
        }
    }

    fn anonymize_operation(operation: &AppOperation) -> AppOperation {
        match operation {
            AppOperation::DecodeImage { duration_ms, size } => AppOperation::DecodeImage {
                duration_ms: *duration_ms,
                size: size.generalized(),
            },
            other => other.clone(),
        }
    }

    /// Anonymizes one free-text string.
    ///
    /// Order matters: paths go first (a path would otherwise feed the
    /// domain rule its dotted filename), then caller patterns, the
    /// username, e-mail addresses (before bare domains, so the address
    /// is replaced as a whole), IPv4 addresses, and finally domains.
    #[must_use]
    pub fn anonymize_string(&self, input: &str) -> String {
        let mut result = path_pattern()
            .replace_all(input, |caps: &regex::Captures| {
                format!("<path:{}>", self.hash_value(&caps[0]))
            })
            .into_owned();

        for pattern in &self.extra_patterns {
            result = pattern.replace_all(&result, "<redacted>").into_owned();
        }

        if let (Some(pattern), Some(replacement)) =
            (&self.username_pattern, &self.username_replacement)
        {
            result = pattern.replace_all(&result, replacement.as_str()).into_owned();
        }

        result = EMAIL
            .replace_all(&result, |caps: &regex::Captures| {
                format!("<email:{}>", self.hash_value(&caps[0]))
            })
            .into_owned();

        result = IPV4
            .replace_all(&result, |caps: &regex::Captures| {
                let candidate = &caps[0];
                if candidate.parse::<Ipv4Addr>().is_ok() {
                    format!("<ip:{}>", self.hash_value(candidate))
                } else {
                    candidate.to_string()
                }
            })
            .into_owned();

        DOMAIN
            .replace_all(&result, |caps: &regex::Captures| {
                let candidate = &caps[0];
                let tld = candidate.rsplit('.').next().unwrap_or("");
                if !KNOWN_TLDS.contains(&tld.to_lowercase().as_str()) {
                    return candidate.to_string();
                }
                let name = &candidate[..candidate.len() - tld.len() - 1];
                format!("<domain:{}>.{tld}", self.hash_value(name))
            })
            .into_owned()
    }
}

impl Default for Anonymizer {
    fn default() -> Self {
        Self::new()
    }
}

// SPDX-License-Identifier: MPL-2.0
//! Log-time scrubbing of absolute file paths.
//!
//! Free-text argument values attached to warnings and errors may embed
//! absolute paths (error messages from the OS usually do). Those are
//! scrubbed the moment an event is logged, before it ever reaches the
//! retained buffer, so a path can never linger in memory waiting for the
//! export-time anonymizer.

use std::sync::LazyLock;

use regex::Regex;

/// Unix directory roots that mark the start of a user-revealing path.
const UNIX_PATH_ROOTS: &[&str] = &["home", "Users", "tmp", "var", "etc", "opt", "mnt", "media"];

/// Matches absolute paths: the Unix roots above, `~/` shortcuts, Windows
/// drive paths and UNC shares. A path runs until whitespace or a common
/// string delimiter.
static ABSOLUTE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    let tail = r#"[^\s"'()\[\]]+"#;
    let unix = UNIX_PATH_ROOTS
        .iter()
        .map(|root| format!("/{root}/{tail}"))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r"(?:{unix}|~/{tail}|[A-Za-z]:\\{tail}|\\\\{tail})");
    Regex::new(&pattern).expect("path pattern should compile")
});

/// Returns the compiled absolute-path pattern, shared with the
/// export-time anonymizer.
pub(crate) fn path_pattern() -> &'static Regex {
    &ABSOLUTE_PATH
}

/// Replaces every absolute path in `input` with a `<path>` placeholder.
///
/// The placeholder keeps the sentence structure readable while carrying
/// no user data. Strings without paths pass through unchanged.
///
/// # Examples
///
/// ```
/// use glimpse_diagnostics::scrub_message;
///
/// assert_eq!(
///     scrub_message("cannot open /home/someone/pictures/cat.jpg"),
///     "cannot open <path>"
/// );
/// assert_eq!(scrub_message("unsupported pixel format"), "unsupported pixel format");
/// ```
#[must_use]
pub fn scrub_message(input: &str) -> String {
    ABSOLUTE_PATH.replace_all(input, "<path>").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrubs_unix_home_path() {
        assert_eq!(
            scrub_message("failed to open /home/someone/photos/trip.png"),
            "failed to open <path>"
        );
    }

    #[test]
    fn scrubs_macos_users_path() {
        assert_eq!(
            scrub_message("cannot read /Users/jo/Documents/a.tiff"),
            "cannot read <path>"
        );
    }

    #[test]
    fn scrubs_tmp_and_var_paths() {
        assert_eq!(
            scrub_message("cache at /tmp/glimpse-381/frame.bin is stale"),
            "cache at <path> is stale"
        );
        assert_eq!(
            scrub_message("log at /var/log/glimpse.log rotated"),
            "log at <path> rotated"
        );
    }

    #[test]
    fn scrubs_home_shortcut() {
        assert_eq!(
            scrub_message("settings at ~/.config/glimpse/settings.toml"),
            "settings at <path>"
        );
    }

    #[test]
    fn scrubs_windows_drive_path() {
        assert_eq!(
            scrub_message("cannot write C:\\Users\\jo\\out.jpg"),
            "cannot write <path>"
        );
    }

    #[test]
    fn scrubs_windows_unc_path() {
        assert_eq!(
            scrub_message("share \\\\nas\\photos\\x.png unreachable"),
            "share <path> unreachable"
        );
    }

    #[test]
    fn scrubs_multiple_paths_in_one_message() {
        assert_eq!(
            scrub_message("copy /home/a/src.jpg to /tmp/dst.jpg failed"),
            "copy <path> to <path> failed"
        );
    }

    #[test]
    fn keeps_quotes_around_scrubbed_path() {
        assert_eq!(
            scrub_message("file \"/home/a/b.png\" missing"),
            "file \"<path>\" missing"
        );
    }

    #[test]
    fn leaves_plain_messages_alone() {
        assert_eq!(scrub_message("decoder returned no frames"), "decoder returned no frames");
        assert_eq!(scrub_message(""), "");
    }

    #[test]
    fn scrubbing_is_idempotent() {
        let once = scrub_message("open /home/a/b.png failed");
        assert_eq!(scrub_message(&once), once);
    }
}

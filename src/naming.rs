//! Deterministic on-disk names for pages and their resources.

use std::sync::OnceLock;

use regex::Regex;
use sha2::{Digest, Sha256};
use url::Url;

/// Upper bound for a resource filename, extension included.
pub const MAX_FILENAME_LEN: usize = 150;

const HASH_SUFFIX_LEN: usize = 8;

fn scheme_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("valid scheme regex"))
}

fn separator_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9]+").expect("valid separator regex"))
}

/// Collapses every run of non-alphanumeric characters into a single `-`
/// and trims hyphens from both ends.
pub fn hyphenate(input: &str) -> String {
    separator_run()
        .replace_all(input, "-")
        .trim_matches('-')
        .to_string()
}

/// `https://ru.hexlet.io/courses` -> `ru-hexlet-io-courses.html`
///
/// Takes the URL as the user typed it, not its normalized form: host case is
/// kept and percent-encodable characters are dropped rather than escaped.
pub fn page_filename(raw_url: &str) -> String {
    let without_scheme = scheme_prefix().replace(raw_url.trim(), "");
    format!("{}.html", hyphenate(&without_scheme))
}

/// `ru-hexlet-io-courses.html` -> `ru-hexlet-io-courses_files`
pub fn resources_dir_name(page_filename: &str) -> String {
    let stem = page_filename.strip_suffix(".html").unwrap_or(page_filename);
    format!("{stem}_files")
}

/// Builds the filename for a downloaded resource from its host and path.
///
/// Query and fragment never take part. The extension is read from the last
/// segment of the path and survives truncation; the hyphenated body is cut
/// so the whole name fits in [`MAX_FILENAME_LEN`], with a short digest of the
/// URL appended whenever a cut happens.
pub fn resource_filename(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    let (stem, extension) = match split_extension(url.path()) {
        // no room left for any body next to the digest
        (_, extension) if extension.len() + HASH_SUFFIX_LEN + 1 >= MAX_FILENAME_LEN => (url.path(), ""),
        split => split,
    };

    let body = hyphenate(&format!("{host}{stem}"));
    fit_length(body, extension, url)
}

fn split_extension(path: &str) -> (&str, &str) {
    let segment_start = path.rfind('/').map_or(0, |i| i + 1);
    let segment = &path[segment_start..];

    if let Some(dot) = segment.rfind('.') {
        let extension = &segment[dot..];
        if extension.len() > 1 && extension[1..].chars().all(|c| c.is_ascii_alphanumeric()) {
            let split_at = segment_start + dot;
            return (&path[..split_at], extension);
        }
    }

    (path, "")
}

fn fit_length(body: String, extension: &str, url: &Url) -> String {
    if body.len() + extension.len() <= MAX_FILENAME_LEN {
        return format!("{body}{extension}");
    }

    let digest = Sha256::digest(url.as_str().as_bytes());
    let suffix: String = digest
        .iter()
        .take(HASH_SUFFIX_LEN / 2)
        .map(|byte| format!("{byte:02x}"))
        .collect();

    // body is ASCII after hyphenation, so byte slicing is safe
    let keep = MAX_FILENAME_LEN - (extension.len() + HASH_SUFFIX_LEN + 1);
    let truncated = body[..keep.min(body.len())].trim_end_matches('-');

    format!("{truncated}-{suffix}{extension}")
}

//! Artifact naming conventions.
//!
//! Uploads are stored as `{unix_timestamp}_{sanitized_name}`, or
//! `{unix_timestamp}-{n}_{sanitized_name}` when that key is already taken.
//! Processed outputs are stored as `processed_{upload_key}`, and downloads
//! are offered as `imputed_{sanitized_name}`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Prefix of processed artifact keys.
pub const PROCESSED_PREFIX: &str = "processed_";

/// Prefix of the name suggested for downloads.
pub const DOWNLOAD_PREFIX: &str = "imputed_";

/// Upload timestamp prefix, e.g. `1700000000_` or `1700000000-2_`.
static UPLOAD_TIMESTAMP_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+(?:-\d+)?_").expect("Invalid regex: UPLOAD_TIMESTAMP_PREFIX")
});

/// Reduce a client-supplied filename to a safe flat name.
///
/// Keeps only the last path component, turns whitespace into `_`, drops
/// anything outside `[A-Za-z0-9._-]` and trims leading/trailing `.` and `_`.
/// May return an empty string.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let cleaned: String = base
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                Some(c)
            } else {
                None
            }
        })
        .collect();

    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Case-insensitive extension check; `extension` is given without the dot.
pub fn has_extension(filename: &str, extension: &str) -> bool {
    let extension = extension.trim_start_matches('.');
    match filename.rsplit_once('.') {
        Some((stem, ext)) => !stem.is_empty() && ext.eq_ignore_ascii_case(extension),
        None => false,
    }
}

/// Storage key for an upload taken at `timestamp` (seconds since epoch).
///
/// `attempt` disambiguates uploads of the same name within one second;
/// attempt 0 gives the plain `{timestamp}_{name}` key.
pub fn upload_key(timestamp: i64, attempt: u32, sanitized_name: &str) -> String {
    if attempt == 0 {
        format!("{timestamp}_{sanitized_name}")
    } else {
        format!("{timestamp}-{attempt}_{sanitized_name}")
    }
}

/// Storage key of the processed artifact for `upload_key`.
pub fn processed_key(upload_key: &str) -> String {
    format!("{PROCESSED_PREFIX}{upload_key}")
}

/// Name suggested to the client when downloading `processed_key`.
///
/// ```rust,ignore
/// assert_eq!(download_name("processed_1700000000_my_data.csv"), "imputed_my_data.csv");
/// ```
pub fn download_name(processed_key: &str) -> String {
    let upload = processed_key
        .strip_prefix(PROCESSED_PREFIX)
        .unwrap_or(processed_key);
    let base = UPLOAD_TIMESTAMP_PREFIX.replace(upload, "");
    format!("{DOWNLOAD_PREFIX}{base}")
}

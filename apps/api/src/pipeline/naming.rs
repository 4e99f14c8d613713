//! Filename handling for uploads and the deterministic artifact names
//! derived from a run's base name.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "docx", "doc", "txt"];

const ENRICHED_SUFFIX: &str = "_enriched";
const PROCESSED_SUFFIX: &str = "_processed";

static RE_UNSAFE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.-]").unwrap());

/// True if the filename has an extension in [`ALLOWED_EXTENSIONS`].
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Reduces a client-supplied filename to a safe, flat file name.
///
/// Non-ASCII characters are dropped, path separators and whitespace runs
/// become `_`, anything outside `[A-Za-z0-9_.-]` is removed and leading or
/// trailing `.`/`_` are stripped. May return an empty string.
pub fn sanitize_filename(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    RE_UNSAFE
        .replace_all(&joined, "")
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// Filename stem used as the key for every artifact of a run.
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("upload")
        .to_string()
}

/// Lower-cased extension, if any.
pub fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

/// `<parsed_dir>/<base>_enriched.json`
pub fn enriched_json_path(parsed_dir: &Path, base: &str) -> PathBuf {
    parsed_dir.join(format!("{base}{ENRICHED_SUFFIX}.json"))
}

/// `<base>_processed.docx`
pub fn processed_file_name(base: &str) -> String {
    format!("{base}{PROCESSED_SUFFIX}.docx")
}

/// Recovers a run's base name from an artifact file name by dropping the
/// extension and a trailing `_enriched`.
pub fn base_from_artifact(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    stem.strip_suffix(ENRICHED_SUFFIX).unwrap_or(stem).to_string()
}

/// URL the front end serves a rendered document from.
pub fn download_url(file_name: &str) -> String {
    format!("/download/{file_name}")
}

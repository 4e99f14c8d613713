//! Builds the placeholder mapping for the document template from an
//! enriched CV document.
//!
//! The document shape comes from the external parser, so every lookup
//! accepts a handful of aliases and falls back to `"None"`.

use serde_json::Value;

use crate::collaborators::location::{LocationCategory, CATEGORY_FIELD};
use crate::formatting::PlaceholderMap;

const MISSING: &str = "None";
const LIST_SEPARATOR: &str = "; ";

const NAME_POINTERS: [&str; 5] = [
    "/full_name",
    "/name",
    "/personal_details/full_name",
    "/personal_details/name",
    "/contact/name",
];
const LOCATION_POINTERS: [&str; 4] = [
    "/current_location",
    "/location",
    "/personal_details/location",
    "/contact/location",
];
const BLURB_POINTERS: [&str; 3] = ["/blurb", "/summary", "/profile"];

const EMPLOYER_KEYS: [&str; 4] = ["company", "employer", "organization", "organisation"];
const TITLE_KEYS: [&str; 4] = ["title", "position", "job_title", "role"];
const QUALIFICATION_KEYS: [&str; 4] = ["degree", "qualification", "title", "name"];

/// Extracts the raw (not yet normalized) placeholder mapping.
pub fn extract_placeholders(doc: &Value) -> PlaceholderMap {
    let mut mapping = PlaceholderMap::new();

    mapping.insert("{FullName}".into(), first_string(doc, &NAME_POINTERS));
    mapping.insert("{CurrentLocation}".into(), first_string(doc, &LOCATION_POINTERS));
    mapping.insert("{Blurb}".into(), first_string(doc, &BLURB_POINTERS));

    let experience = section(doc, "experience");
    let position = experience
        .first()
        .and_then(|job| field(job, &TITLE_KEYS))
        .or_else(|| doc.get("position").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| MISSING.to_string());
    mapping.insert("{Position}".into(), position);

    for (category, employers_key, positions_key) in [
        (LocationCategory::Nz, "{NZEmployers}", "{NZPositions}"),
        (
            LocationCategory::International,
            "{InternationalEmployers}",
            "{InternationalPositions}",
        ),
    ] {
        let jobs: Vec<&Value> = experience
            .iter()
            .filter(|job| category_of(job) == Some(category))
            .collect();
        mapping.insert(employers_key.into(), join_field(&jobs, &EMPLOYER_KEYS));
        mapping.insert(positions_key.into(), join_field(&jobs, &TITLE_KEYS));
    }

    let education = section(doc, "education");
    let qualifications: Vec<&Value> = education.iter().collect();
    mapping.insert(
        "{Qualifications}".into(),
        join_field(&qualifications, &QUALIFICATION_KEYS),
    );

    mapping
}

fn section<'a>(doc: &'a Value, key: &str) -> &'a [Value] {
    doc.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn category_of(job: &Value) -> Option<LocationCategory> {
    job.get(CATEGORY_FIELD)
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
}

fn first_string(doc: &Value, pointers: &[&str]) -> String {
    pointers
        .iter()
        .filter_map(|p| doc.pointer(p).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
        .unwrap_or_else(|| MISSING.to_string())
}

fn field(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| item.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
}

fn join_field(items: &[&Value], keys: &[&str]) -> String {
    let values: Vec<String> = items.iter().filter_map(|item| field(item, keys)).collect();
    if values.is_empty() {
        MISSING.to_string()
    } else {
        values.join(LIST_SEPARATOR)
    }
}

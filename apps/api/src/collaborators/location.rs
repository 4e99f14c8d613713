//! Location classification for the candidate and the `experience` section.
//!
//! Each free-text location is classified as New Zealand, international or
//! unknown and the result stored under `location_category`, on the document
//! itself and on every job. The placeholder extractor splits employers and
//! positions on the per-job field.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::LocationClassifier;

pub const CATEGORY_FIELD: &str = "location_category";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationCategory {
    #[serde(rename = "NZ")]
    Nz,
    International,
    Unknown,
}

const NZ_NAMES: &[&str] = &[
    "new zealand",
    "aotearoa",
    "nz",
    "auckland",
    "wellington",
    "christchurch",
    "hamilton",
    "tauranga",
    "dunedin",
    "palmerston north",
    "napier",
    "hastings",
    "nelson",
    "rotorua",
    "new plymouth",
    "whangarei",
    "invercargill",
    "whanganui",
    "gisborne",
    "queenstown",
    "timaru",
    "blenheim",
    "lower hutt",
    "upper hutt",
    "porirua",
    "taupo",
    "masterton",
    "waikato",
    "canterbury",
    "otago",
    "southland",
    "northland",
    "marlborough",
    "taranaki",
    "manawatu",
    "hawke's bay",
    "bay of plenty",
];

/// Names that place a location in New Zealand outright.
const NZ_COUNTRY_NAMES: &[&str] = &["new zealand", "aotearoa", "nz"];

/// Countries, states and provinces that share town names with New Zealand.
/// Any of these without an explicit NZ marker makes a location international.
const FOREIGN_NAMES: &[&str] = &[
    "australia",
    "new south wales",
    "nsw",
    "queensland",
    "qld",
    "tasmania",
    "western australia",
    "south australia",
    "united kingdom",
    "uk",
    "england",
    "scotland",
    "wales",
    "ireland",
    "northern ireland",
    "kent",
    "yorkshire",
    "lancashire",
    "surrey",
    "canada",
    "ontario",
    "quebec",
    "british columbia",
    "bc",
    "alberta",
    "manitoba",
    "nova scotia",
    "new brunswick",
    "usa",
    "us",
    "united states",
    "america",
    "florida",
    "california",
    "texas",
    "new york",
    "ohio",
    "virginia",
    "georgia",
    "washington",
    "massachusetts",
    "illinois",
    "colorado",
    "oregon",
    "india",
    "china",
    "singapore",
    "hong kong",
    "japan",
    "germany",
    "france",
    "netherlands",
    "south africa",
    "fiji",
    "samoa",
    "tonga",
    "philippines",
    "malaysia",
    "uae",
    "dubai",
];

const LOCATION_KEYS: [&str; 3] = ["location", "city", "country"];
const CANDIDATE_LOCATION_KEYS: [&str; 2] = ["current_location", "location"];

/// Gazetteer-backed classifier. An explicit NZ marker wins, then a foreign
/// country or region, then a New Zealand place name. Anything else with a
/// location is international.
#[derive(Debug, Default, Clone)]
pub struct RegionClassifier;

impl RegionClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, location: &str) -> LocationCategory {
        let lowered = location.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.is_empty() {
            return LocationCategory::Unknown;
        }

        let joined = tokens.join(" ");
        let names_any = |names: &[&str]| names.iter().any(|name| contains_name(&joined, name));

        if names_any(NZ_COUNTRY_NAMES) {
            LocationCategory::Nz
        } else if names_any(FOREIGN_NAMES) {
            LocationCategory::International
        } else if names_any(NZ_NAMES) {
            LocationCategory::Nz
        } else {
            LocationCategory::International
        }
    }

    fn job_location(job: &Value) -> Option<String> {
        let parts: Vec<&str> = LOCATION_KEYS
            .iter()
            .filter_map(|k| job.get(*k).and_then(Value::as_str))
            .filter(|s| !s.trim().is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

impl LocationClassifier for RegionClassifier {
    fn enrich(&self, mut doc: Value) -> Value {
        let candidate = CANDIDATE_LOCATION_KEYS
            .iter()
            .filter_map(|k| doc.get(*k).and_then(Value::as_str))
            .find(|s| !s.trim().is_empty())
            .map(|loc| self.classify(loc));
        if let Some(category) = candidate {
            set_category(&mut doc, category);
        }

        let Some(jobs) = doc.get_mut("experience").and_then(Value::as_array_mut) else {
            debug!("No experience section to classify");
            return doc;
        };

        for job in jobs.iter_mut() {
            let category = Self::job_location(job)
                .map(|loc| self.classify(&loc))
                .unwrap_or(LocationCategory::Unknown);
            set_category(job, category);
        }

        doc
    }
}

/// Whole-token match of `name` inside space-joined `tokens`.
fn contains_name(tokens: &str, name: &str) -> bool {
    tokens == name
        || tokens.starts_with(&format!("{name} "))
        || tokens.ends_with(&format!(" {name}"))
        || tokens.contains(&format!(" {name} "))
}

fn set_category(target: &mut Value, category: LocationCategory) {
    if let (Some(obj), Ok(value)) = (target.as_object_mut(), serde_json::to_value(category)) {
        obj.insert(CATEGORY_FIELD.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_nz_cities_and_regions() {
        let c = RegionClassifier::new();
        assert_eq!(c.classify("Auckland, New Zealand"), LocationCategory::Nz);
        assert_eq!(c.classify("Palmerston North"), LocationCategory::Nz);
        assert_eq!(c.classify("Hawke's Bay, NZ"), LocationCategory::Nz);
    }

    #[test]
    fn test_classify_international_and_unknown() {
        let c = RegionClassifier::new();
        assert_eq!(c.classify("Sydney, Australia"), LocationCategory::International);
        // "nz" must match as a whole token only
        assert_eq!(c.classify("Zurich, Switzerland"), LocationCategory::International);
        assert_eq!(c.classify("  , "), LocationCategory::Unknown);
    }

    #[test]
    fn test_foreign_towns_sharing_nz_names_are_international() {
        let c = RegionClassifier::new();
        for location in [
            "Hamilton, Ontario, Canada",
            "Wellington, Florida, USA",
            "Canterbury, Kent, UK",
            "Nelson, BC, Canada",
        ] {
            assert_eq!(
                c.classify(location),
                LocationCategory::International,
                "{location}"
            );
        }
    }

    #[test]
    fn test_explicit_nz_marker_wins_over_shared_names() {
        let c = RegionClassifier::new();
        assert_eq!(c.classify("Victoria Street, Wellington, NZ"), LocationCategory::Nz);
        assert_eq!(c.classify("Hamilton, Waikato"), LocationCategory::Nz);
    }

    #[test]
    fn test_foreign_job_lands_in_international_placeholders() {
        let doc = json!({
            "experience": [
                {"company": "Shopify", "title": "Developer", "city": "Hamilton", "country": "Canada"},
                {"company": "Xero", "title": "Engineer", "location": "Hamilton"}
            ]
        });

        let out = RegionClassifier::new().enrich(doc);
        let mapping = crate::formatting::placeholders::extract_placeholders(&out);
        assert_eq!(mapping["{NZEmployers}"], "Xero");
        assert_eq!(mapping["{InternationalEmployers}"], "Shopify");
    }

    #[test]
    fn test_enrich_tags_every_experience_entry() {
        let doc = json!({
            "name": "Jane",
            "experience": [
                {"company": "Xero", "location": "Wellington"},
                {"company": "Google", "city": "London", "country": "UK"},
                {"company": "Remote Co"}
            ]
        });

        let out = RegionClassifier::new().enrich(doc);
        let jobs = out["experience"].as_array().unwrap();
        assert_eq!(jobs[0][CATEGORY_FIELD], "NZ");
        assert_eq!(jobs[1][CATEGORY_FIELD], "International");
        assert_eq!(jobs[2][CATEGORY_FIELD], "Unknown");
        assert_eq!(out["name"], "Jane");
    }

    #[test]
    fn test_enrich_tags_candidate_location() {
        let doc = json!({"name": "Jane", "current_location": "Christchurch"});
        let out = RegionClassifier::new().enrich(doc);
        assert_eq!(out[CATEGORY_FIELD], "NZ");
    }

    #[test]
    fn test_enrich_without_experience_is_identity() {
        let doc = json!({"name": "Jane", "experience": "n/a"});
        assert_eq!(RegionClassifier::new().enrich(doc.clone()), doc);
    }
}

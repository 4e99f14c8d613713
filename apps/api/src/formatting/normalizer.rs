//! Text Normalizer: pure formatting rules applied to placeholder values
//! before they are substituted into the output document template.
//!
//! Two field classes:
//! - list fields: `;`-separated items → title-cased, de-duplicated bullet list
//! - scalar fields: whole value title-cased
//!
//! Every function here is side-effect free. `normalize_placeholders` is
//! idempotent: feeding its output back in yields the same mapping.

use std::collections::HashSet;

use crate::formatting::PlaceholderMap;

/// Placeholders rendered as bullet lists.
pub const LIST_FIELDS: [&str; 5] = [
    "{InternationalEmployers}",
    "{NZEmployers}",
    "{NZPositions}",
    "{InternationalPositions}",
    "{Qualifications}",
];

/// Placeholders that are title-cased as a whole.
pub const SCALAR_FIELDS: [&str; 3] = ["{FullName}", "{Position}", "{CurrentLocation}"];

pub const BULLET: &str = "• ";

/// Value a list field collapses to when nothing survives filtering.
pub const EMPTY_LIST: &str = "None";

/// Normalizes every known field in the mapping. Unknown keys pass through.
pub fn normalize_placeholders(mut mapping: PlaceholderMap) -> PlaceholderMap {
    for key in LIST_FIELDS {
        if let Some(value) = mapping.get_mut(key) {
            if let Some(formatted) = format_list_field(value) {
                *value = formatted;
            }
        }
    }

    for key in SCALAR_FIELDS {
        if let Some(value) = mapping.get_mut(key) {
            if let Some(formatted) = format_scalar_field(value) {
                *value = formatted;
            }
        }
    }

    mapping
}

/// Formats a `;`-separated list as a bullet list.
///
/// Returns `None` when the value must be left untouched (empty or "none").
pub fn format_list_field(raw: &str) -> Option<String> {
    if is_blank_or_none(raw) {
        return None;
    }

    let mut seen = HashSet::new();
    let mut items = Vec::new();
    for item in split_items(raw) {
        let titled = title_case(item);
        if seen.insert(titled.to_lowercase()) {
            items.push(titled);
        }
    }

    if items.is_empty() {
        return Some(EMPTY_LIST.to_string());
    }

    Some(
        items
            .iter()
            .map(|item| format!("{BULLET}{item}"))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

/// Title-cases a scalar value. Returns `None` for empty or "none" values.
pub fn format_scalar_field(raw: &str) -> Option<String> {
    if is_blank_or_none(raw) {
        return None;
    }
    Some(title_case(raw))
}

/// Upper-cases a letter that follows a non-letter and lower-cases every
/// other letter. Non-letters are copied through.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_is_letter = false;
    for c in input.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

fn is_blank_or_none(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none")
}

/// Splits on `;` and on line breaks so an already formatted bullet list
/// re-splits into the same items.
fn split_items(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|c| c == ';' || c == '\n')
        .map(|item| {
            let item = item.trim();
            item.strip_prefix(BULLET.trim_end())
                .map(str::trim_start)
                .unwrap_or(item)
        })
        .filter(|item| !item.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pairs: &[(&str, &str)]) -> PlaceholderMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_dedup_is_case_insensitive_and_keeps_first_seen_order() {
        assert_eq!(
            format_list_field("abc; ABC; Xyz").as_deref(),
            Some("• Abc\n• Xyz")
        );
    }

    #[test]
    fn test_list_field_drops_empty_segments() {
        assert_eq!(
            format_list_field(" senior developer ;; ;lead engineer;").as_deref(),
            Some("• Senior Developer\n• Lead Engineer")
        );
    }

    #[test]
    fn test_list_field_with_only_separators_becomes_none_literal() {
        assert_eq!(format_list_field(" ; ;; ").as_deref(), Some("None"));
    }

    #[test]
    fn test_none_and_empty_are_left_untouched() {
        let input = mapping(&[
            ("{NZEmployers}", ""),
            ("{InternationalEmployers}", "NONE"),
            ("{FullName}", "none"),
            ("{Position}", "  "),
        ]);
        assert_eq!(normalize_placeholders(input.clone()), input);
    }

    #[test]
    fn test_scalar_fields_are_title_cased() {
        let out = normalize_placeholders(mapping(&[
            ("{FullName}", "JOHN DOE"),
            ("{Position}", "SOFTWARE ENGINEER"),
            ("{CurrentLocation}", "SYDNEY, AUSTRALIA"),
        ]));
        assert_eq!(out["{FullName}"], "John Doe");
        assert_eq!(out["{Position}"], "Software Engineer");
        assert_eq!(out["{CurrentLocation}"], "Sydney, Australia");
    }

    #[test]
    fn test_unlisted_keys_pass_through() {
        let out = normalize_placeholders(mapping(&[("{Blurb}", "a; A; b")]));
        assert_eq!(out["{Blurb}"], "a; A; b");
    }

    #[test]
    fn test_punctuated_employer_names() {
        let out = normalize_placeholders(mapping(&[(
            "{NZEmployers}",
            "KEANGMAN, ENTERPRISES LTD.; NZ Company; nz company; ABC",
        )]));
        assert_eq!(
            out["{NZEmployers}"],
            "• Keangman, Enterprises Ltd.\n• Nz Company\n• Abc"
        );
    }

    #[test]
    fn test_title_case_word_boundaries() {
        assert_eq!(title_case("o'neil"), "O'Neil");
        assert_eq!(title_case("3rd floor"), "3Rd Floor");
        assert_eq!(title_case("mary-jane SMITH"), "Mary-Jane Smith");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let inputs = [
            "ABC Company; abc company; XYZ Corp; xyz corp",
            "Senior Developer; Senior Developer; Lead Engineer",
            "; ;",
            "none",
            "",
            "bachelor of science",
        ];
        for raw in inputs {
            let once = normalize_placeholders(mapping(&[
                ("{Qualifications}", raw),
                ("{FullName}", raw),
            ]));
            let twice = normalize_placeholders(once.clone());
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }
}

//! Shared helpers for reading typed values out of document objects.
//!
//! Missing optional keys yield empty values; present keys with the wrong
//! shape yield [`EntityError::WrongType`].

use std::collections::{BTreeMap, BTreeSet};

use crate::{Document, DocumentMap, EntityError, Geometry};

pub(crate) fn object(document: &Document) -> Result<&DocumentMap, EntityError> {
    document.as_object().ok_or(EntityError::NotAnObject {
        found: document.kind(),
    })
}

pub(crate) fn optional_string(
    map: &DocumentMap,
    field: &'static str,
) -> Result<Option<String>, EntityError> {
    match map.get(field) {
        None | Some(Document::Null) => Ok(None),
        Some(Document::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(EntityError::WrongType {
            field,
            expected: "a string",
        }),
    }
}

pub(crate) fn optional_bool(
    map: &DocumentMap,
    field: &'static str,
) -> Result<Option<bool>, EntityError> {
    match map.get(field) {
        None | Some(Document::Null) => Ok(None),
        Some(Document::Bool(value)) => Ok(Some(*value)),
        Some(_) => Err(EntityError::WrongType {
            field,
            expected: "a boolean",
        }),
    }
}

pub(crate) fn optional_number(
    map: &DocumentMap,
    field: &'static str,
) -> Result<Option<f64>, EntityError> {
    match map.get(field) {
        None | Some(Document::Null) => Ok(None),
        Some(Document::Number(value)) if value.is_finite() => Ok(Some(*value)),
        Some(_) => Err(EntityError::WrongType {
            field,
            expected: "a finite number",
        }),
    }
}

/// Read a list of strings.
///
/// Translations flatten lists into delimited strings, so a string value is
/// split on `separator` and trimmed.
pub(crate) fn string_list(
    map: &DocumentMap,
    field: &'static str,
    separator: char,
) -> Result<Vec<String>, EntityError> {
    let wrong_type = EntityError::WrongType {
        field,
        expected: "a list of strings",
    };
    match map.get(field) {
        None | Some(Document::Null) => Ok(Vec::new()),
        Some(Document::String(joined)) => Ok(joined
            .split(separator)
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_owned)
            .collect()),
        Some(Document::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_owned).ok_or(wrong_type.clone()))
            .collect(),
        Some(_) => Err(wrong_type),
    }
}

pub(crate) fn string_map(
    map: &DocumentMap,
    field: &'static str,
) -> Result<BTreeMap<String, String>, EntityError> {
    let wrong_type = EntityError::WrongType {
        field,
        expected: "an object of strings",
    };
    match map.get(field) {
        None | Some(Document::Null) => Ok(BTreeMap::new()),
        Some(Document::Object(entries)) => entries
            .iter()
            .map(|(key, value)| {
                value
                    .as_str()
                    .map(|text| (key.clone(), text.to_owned()))
                    .ok_or(wrong_type.clone())
            })
            .collect(),
        Some(_) => Err(wrong_type),
    }
}

pub(crate) fn geometry_set(
    map: &DocumentMap,
    field: &'static str,
) -> Result<BTreeSet<Geometry>, EntityError> {
    string_list(map, field, ',')?
        .into_iter()
        .map(|name| {
            name.parse::<Geometry>()
                .map_err(|_| EntityError::UnknownGeometry { name })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn map_with(field: &str, value: Document) -> DocumentMap {
        DocumentMap::from([(field.to_owned(), value)])
    }

    #[rstest]
    fn string_lists_accept_delimited_translations() {
        let map = map_with("terms", Document::from("eatery, diner ,,food"));
        let terms = string_list(&map, "terms", ',').expect("terms parse");
        assert_eq!(terms, ["eatery", "diner", "food"]);
    }

    #[rstest]
    fn string_lists_reject_mixed_arrays() {
        let map = map_with(
            "terms",
            Document::from(vec![Document::from("a"), Document::from(1.0)]),
        );
        assert!(matches!(
            string_list(&map, "terms", ','),
            Err(EntityError::WrongType { field: "terms", .. })
        ));
    }

    #[rstest]
    fn geometry_sets_reject_unknown_names() {
        let map = map_with(
            "geometry",
            Document::from(vec![Document::from("point"), Document::from("blob")]),
        );
        assert_eq!(
            geometry_set(&map, "geometry"),
            Err(EntityError::UnknownGeometry {
                name: "blob".to_owned()
            })
        );
    }

    #[rstest]
    fn non_finite_numbers_are_rejected() {
        let map = map_with("matchScore", Document::Number(f64::NAN));
        assert!(optional_number(&map, "matchScore").is_err());
    }
}

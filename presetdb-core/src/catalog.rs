//! Supporting catalog entities: fields, categories and address formats.

use std::collections::{BTreeMap, BTreeSet};

use crate::{Document, DocumentMap, EntityError, Geometry, OPTIONS_KEY, STRINGS_KEY, parse};

/// Reusable attribute editor descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Identifier within the field catalog, e.g. `cuisine`.
    pub id: String,
    /// Primary tag key edited by the field.
    pub key: String,
    /// Additional tag keys edited together, if any.
    pub keys: Vec<String>,
    /// Editor type such as `combo` or `check`.
    pub field_type: String,
    /// Localized label; falls back to the key.
    pub label: String,
    /// Localized placeholder text.
    pub placeholder: Option<String>,
    /// Allowed value codes.
    pub options: Vec<String>,
    /// Display strings keyed by option code.
    pub strings: BTreeMap<String, String>,
    /// Geometry classes the field applies to; empty means all.
    pub geometry: BTreeSet<Geometry>,
    /// Whether the field is offered for every feature.
    pub universal: bool,
}

impl Field {
    /// Convert a merged field catalog entry.
    ///
    /// # Errors
    /// Returns [`EntityError`] when neither `key` nor `keys` names a tag key,
    /// or when a value has the wrong shape.
    pub fn from_document(id: &str, document: &Document) -> Result<Self, EntityError> {
        let map = parse::object(document)?;
        let keys = parse::string_list(map, "keys", ',')?;
        let key = match parse::optional_string(map, "key")? {
            Some(key) => key,
            None => keys
                .first()
                .cloned()
                .ok_or(EntityError::MissingField { field: "key" })?,
        };
        let label = parse::optional_string(map, "label")?.unwrap_or_else(|| key.clone());
        Ok(Self {
            id: id.to_owned(),
            keys,
            field_type: parse::optional_string(map, "type")?.unwrap_or_else(|| "text".to_owned()),
            label,
            placeholder: parse::optional_string(map, "placeholder")?,
            options: option_codes(map)?,
            strings: option_strings(map)?,
            geometry: parse::geometry_set(map, "geometry")?,
            universal: parse::optional_bool(map, "universal")?.unwrap_or(false),
            key,
        })
    }

    /// Display string for an option code, falling back to the code itself.
    pub fn option_label<'a>(&'a self, code: &'a str) -> &'a str {
        self.strings.get(code).map_or(code, String::as_str)
    }
}

fn option_codes(map: &DocumentMap) -> Result<Vec<String>, EntityError> {
    match map.get(OPTIONS_KEY) {
        // Untranslated catalogs may carry options as a code → label object.
        Some(Document::Object(entries)) => Ok(entries.keys().cloned().collect()),
        _ => parse::string_list(map, OPTIONS_KEY, ','),
    }
}

/// Read display strings for options.
///
/// They come either from a translation overlay (code → label, or code →
/// `{ "title": label }`) or from a baseline `strings.options` object.
fn option_strings(map: &DocumentMap) -> Result<BTreeMap<String, String>, EntityError> {
    let wrong_type = EntityError::WrongType {
        field: STRINGS_KEY,
        expected: "an object of option labels",
    };
    let entries = match map.get(STRINGS_KEY) {
        None | Some(Document::Null) => match map.get(OPTIONS_KEY) {
            Some(Document::Object(entries)) => entries,
            _ => return Ok(BTreeMap::new()),
        },
        Some(Document::Object(entries)) => match entries.get(OPTIONS_KEY) {
            Some(Document::Object(nested)) => nested,
            _ => entries,
        },
        Some(_) => return Err(wrong_type),
    };
    let mut strings = BTreeMap::new();
    for (code, label) in entries {
        let text = match label {
            Document::String(text) => text.as_str(),
            Document::Object(_) => label
                .get("title")
                .and_then(Document::as_str)
                .ok_or(wrong_type.clone())?,
            _ => return Err(wrong_type),
        };
        strings.insert(code.clone(), text.to_owned());
    }
    Ok(strings)
}

/// Named grouping of features.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    /// Identifier, e.g. `category-building`.
    pub id: String,
    /// Localized display name; falls back to the identifier.
    pub name: String,
    /// Icon identifier.
    pub icon: Option<String>,
    /// Geometry classes the category is offered for.
    pub geometry: BTreeSet<Geometry>,
    /// Member feature identifiers, in display order.
    pub members: Vec<String>,
}

impl Category {
    /// Convert a merged category catalog entry.
    ///
    /// # Errors
    /// Returns [`EntityError`] when a value has the wrong shape.
    pub fn from_document(id: &str, document: &Document) -> Result<Self, EntityError> {
        let map = parse::object(document)?;
        Ok(Self {
            id: id.to_owned(),
            name: parse::optional_string(map, "name")?.unwrap_or_else(|| id.to_owned()),
            icon: parse::optional_string(map, "icon")?,
            geometry: parse::geometry_set(map, "geometry")?,
            members: parse::string_list(map, "members", ',')?,
        })
    }
}

/// Country-specific layout of address fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressFormat {
    /// Lowercase country codes using this layout; empty for the default.
    pub country_codes: Vec<String>,
    /// Rows of address field keys.
    pub format: Vec<Vec<String>>,
}

impl AddressFormat {
    /// Convert an address format entry.
    ///
    /// # Errors
    /// Returns [`EntityError`] when `format` is missing or not a list of rows.
    pub fn from_document(document: &Document) -> Result<Self, EntityError> {
        let map = parse::object(document)?;
        let wrong_type = EntityError::WrongType {
            field: "format",
            expected: "a list of lists of strings",
        };
        let rows = map
            .get("format")
            .ok_or(EntityError::MissingField { field: "format" })?
            .as_array()
            .ok_or(wrong_type.clone())?;
        let format = rows
            .iter()
            .map(|row| {
                row.as_array()
                    .ok_or(wrong_type.clone())?
                    .iter()
                    .map(|key| key.as_str().map(str::to_owned).ok_or(wrong_type.clone()))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        let country_codes = parse::string_list(map, "countryCodes", ',')?
            .into_iter()
            .map(|code| code.to_lowercase())
            .collect();
        Ok(Self {
            country_codes,
            format,
        })
    }

    /// Report whether this is the fallback layout.
    pub fn is_default(&self) -> bool {
        self.country_codes.is_empty()
    }
}

/// Common words localized for the active language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleStrings {
    /// Affirmative label.
    pub yes: String,
    /// Negative label.
    pub no: String,
    /// Label for unknown values.
    pub unknown: String,
}

impl Default for LocaleStrings {
    fn default() -> Self {
        Self {
            yes: "Yes".to_owned(),
            no: "No".to_owned(),
            unknown: "???".to_owned(),
        }
    }
}

impl LocaleStrings {
    /// Field whose option strings supply `yes` and `no`.
    pub const YES_NO_FIELD: &'static str = "internet_access";
    /// Field whose placeholder supplies `unknown`.
    pub const UNKNOWN_FIELD: &'static str = "opening_hours";

    /// Derive localized labels from a loaded field catalog.
    pub fn from_fields(fields: &BTreeMap<String, Field>) -> Self {
        let defaults = Self::default();
        let yes_no = fields.get(Self::YES_NO_FIELD);
        let label = |code: &str| yes_no.and_then(|field| field.strings.get(code)).cloned();
        Self {
            yes: label("yes").unwrap_or(defaults.yes),
            no: label("no").unwrap_or(defaults.no),
            unknown: fields
                .get(Self::UNKNOWN_FIELD)
                .and_then(|field| field.placeholder.clone())
                .unwrap_or(defaults.unknown),
        }
    }
}

//! Generic document trees and localized overlay merging.
//!
//! Catalog sources arrive as already-deserialized trees. They are converted
//! once into [`Document`] so the rest of the engine never inspects raw JSON.
//! [`merge`] layers a translation document onto a language-neutral baseline.
//!
//! # Examples
//! ```
//! use std::collections::BTreeMap;
//! use presetdb_core::{Document, merge};
//!
//! let base = Document::Object(BTreeMap::from([
//!     ("name".into(), Document::from("Restaurant")),
//!     ("icon".into(), Document::from("maki-restaurant")),
//! ]));
//! let overlay = Document::Object(BTreeMap::from([
//!     ("name".into(), Document::from("Ristorante")),
//! ]));
//!
//! let merged = merge(base, Some(&overlay));
//! assert_eq!(merged.get("name").and_then(Document::as_str), Some("Ristorante"));
//! assert_eq!(merged.get("icon").and_then(Document::as_str), Some("maki-restaurant"));
//! ```

use std::collections::BTreeMap;

/// Key whose baseline value is preserved verbatim during a merge.
pub const OPTIONS_KEY: &str = "options";

/// Sibling key receiving the overlay's display strings for `options`.
pub const STRINGS_KEY: &str = "strings";

/// Ordered mapping used for document objects.
pub type DocumentMap = BTreeMap<String, Document>;

/// A parsed, dynamically-shaped document node.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Document {
    /// Explicit null or absent value.
    #[default]
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Numeric scalar.
    Number(f64),
    /// String scalar.
    String(String),
    /// Ordered list of nodes.
    Array(Vec<Document>),
    /// Mapping from string keys to nodes.
    Object(DocumentMap),
}

impl Document {
    /// Look up `key` when the node is an object.
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Borrow the node as an object.
    pub fn as_object(&self) -> Option<&DocumentMap> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow the node as a list.
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow the node as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Read the node as a boolean.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Read the node as a number.
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Report whether the node is [`Document::Null`].
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the node's variant, used in error messages.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

impl From<&str> for Document {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Document {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Document {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Document {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Vec<Self>> for Document {
    fn from(items: Vec<Self>) -> Self {
        Self::Array(items)
    }
}

impl From<DocumentMap> for Document {
    fn from(map: DocumentMap) -> Self {
        Self::Object(map)
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Value> for Document {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(flag),
            // Integers beyond f64 precision are not expected in catalog data.
            Value::Number(number) => number.as_f64().map_or(Self::Null, Self::Number),
            Value::String(text) => Self::String(text),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(key, item)| (key, Self::from(item)))
                    .collect(),
            ),
        }
    }
}

/// Merge a localized `overlay` onto `base`.
///
/// Without an overlay the base is returned unchanged. Objects are merged key
/// by key; any other pairing, including a type mismatch, lets the overlay win.
/// Under an `options` key the base value is kept and the overlay's value is
/// exposed under a sibling `strings` key instead.
pub fn merge(base: Document, overlay: Option<&Document>) -> Document {
    let Some(overlay) = overlay else {
        return base;
    };
    match (base, overlay) {
        (Document::Object(base_map), Document::Object(overlay_map)) => {
            Document::Object(merge_objects(base_map, overlay_map))
        }
        (_, replacement) => replacement.clone(),
    }
}

fn merge_objects(base: DocumentMap, overlay: &DocumentMap) -> DocumentMap {
    let mut merged = DocumentMap::new();
    let mut option_strings = None;
    for (key, value) in base {
        if key == OPTIONS_KEY {
            option_strings = overlay.get(OPTIONS_KEY).cloned();
            merged.insert(key, value);
        } else {
            let translated = merge(value, overlay.get(&key));
            merged.insert(key, translated);
        }
    }
    if let Some(strings) = option_strings {
        merged.insert(STRINGS_KEY.to_owned(), strings);
    }
    for (key, value) in overlay {
        merged
            .entry(key.clone())
            .or_insert_with(|| value.clone());
    }
    merged
}

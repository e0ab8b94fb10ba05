//! Document sources feeding the catalog loader.
//!
//! A [`DocumentProvider`] hands out parsed documents by logical name, e.g.
//! `presets.json` or `translations/de.json`. Failures are reported per
//! document so callers decide which ones are fatal.

use std::collections::BTreeMap;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs_utf8;
use presetdb_core::Document;
use presetdb_fs::{display_path, open_utf8_dir, read_utf8_file};
use thiserror::Error;

/// Errors returned by [`DocumentProvider::fetch`].
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No document exists under the requested name.
    #[error("document `{name}` not found")]
    NotFound {
        /// Logical document name.
        name: String,
    },
    /// The document exists but could not be read.
    #[error("failed to read document `{name}` at {path}")]
    Io {
        /// Logical document name.
        name: String,
        /// Location the provider tried to read.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The document was read but is not valid JSON.
    #[error("failed to parse document `{name}`")]
    Parse {
        /// Logical document name.
        name: String,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Supplies parsed documents by logical name.
///
/// Implementations must be shareable with the augmentation worker thread.
pub trait DocumentProvider: Send + Sync {
    /// Fetch and parse the document called `name`.
    ///
    /// # Errors
    /// Returns [`ProviderError`] when the document is missing, unreadable or
    /// malformed.
    fn fetch(&self, name: &str) -> Result<Document, ProviderError>;
}

/// Reads JSON documents from files beneath a root directory.
///
/// Names are resolved relative to the root through a capability handle, so
/// a name cannot reach outside it.
#[derive(Debug)]
pub struct DirectoryProvider {
    root: Utf8PathBuf,
    dir: fs_utf8::Dir,
}

impl DirectoryProvider {
    /// Open `root` for reading.
    ///
    /// # Errors
    /// Returns [`io::Error`] when the directory cannot be opened.
    pub fn open(root: impl Into<Utf8PathBuf>) -> io::Result<Self> {
        let root = root.into();
        let dir = open_utf8_dir(&root)?;
        Ok(Self { root, dir })
    }

    /// Root directory documents are read from.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

impl DocumentProvider for DirectoryProvider {
    fn fetch(&self, name: &str) -> Result<Document, ProviderError> {
        let text = read_utf8_file(&self.dir, Utf8Path::new(name)).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ProviderError::NotFound {
                    name: name.to_owned(),
                }
            } else {
                ProviderError::Io {
                    name: name.to_owned(),
                    path: display_path(&self.root, name),
                    source,
                }
            }
        })?;
        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|source| ProviderError::Parse {
                name: name.to_owned(),
                source,
            })?;
        Ok(Document::from(value))
    }
}

/// Serves documents held in memory; used for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    documents: BTreeMap<String, Document>,
}

impl MemoryProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a document.
    #[must_use]
    pub fn with_document(mut self, name: impl Into<String>, document: impl Into<Document>) -> Self {
        self.insert(name, document);
        self
    }

    /// Add or replace a document in place.
    pub fn insert(&mut self, name: impl Into<String>, document: impl Into<Document>) {
        self.documents.insert(name.into(), document.into());
    }
}

impl DocumentProvider for MemoryProvider {
    fn fetch(&self, name: &str) -> Result<Document, ProviderError> {
        self.documents
            .get(name)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                name: name.to_owned(),
            })
    }
}

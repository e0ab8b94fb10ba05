//! Test helpers locating the shared preset catalog fixture.

use camino::Utf8PathBuf;
use std::fs;
use tempfile::TempDir;

/// Directory holding the JSON catalog used by the data crate's tests.
pub(super) fn fixture_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../presetdb-data/tests/fixtures/presets")
}

/// A temporary workspace with a regular file where a directory is expected.
pub(super) struct NotADirectory {
    _dir: TempDir,
    pub(super) path: Utf8PathBuf,
}

impl NotADirectory {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        let path = root.join("presets.json");
        fs::write(&path, b"{}").expect("write placeholder");
        Self { _dir: dir, path }
    }
}

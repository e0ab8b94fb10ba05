//! Shared filesystem helpers built on `cap-std` and `camino`.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use std::io;

/// Open a UTF-8 directory path using ambient authority.
///
/// Paths read through the returned handle cannot escape the directory.
pub fn open_utf8_dir(path: &Utf8Path) -> io::Result<fs_utf8::Dir> {
    fs_utf8::Dir::open_ambient_dir(path, ambient_authority())
}

/// Read a UTF-8 text file relative to `dir`.
pub fn read_utf8_file(dir: &fs_utf8::Dir, relative: &Utf8Path) -> io::Result<String> {
    dir.read_to_string(relative)
}

/// Resolve an ambient directory for the given path and return the directory with the entry name.
pub fn open_dir_and_entry(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let entry = path
        .file_name()
        .ok_or_else(|| io::Error::other("target should include a file name"))?
        .to_owned();
    let dir = open_utf8_dir(parent)?;
    Ok((dir, entry))
}

/// Return whether a path exists and is a directory using capability-based IO.
pub fn dir_is_dir(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_dir_and_entry(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_dir())
}

/// Join a logical document name onto a root for display in diagnostics.
pub fn display_path(root: &Utf8Path, relative: &str) -> Utf8PathBuf {
    root.join(relative)
}

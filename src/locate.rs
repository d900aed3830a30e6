use crate::error::BridgeError;
use log::trace;
use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::path::{Path, PathBuf};

/// Where a library will be opened from.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum Location {
    /// A file found in one of the configured search directories.
    Path(PathBuf),
    /// A bare file name, left to the platform loader's own search rules.
    System(String),
}

impl Location {
    pub fn display(&self) -> String {
        match self {
            Location::Path(path) => path.display().to_string(),
            Location::System(name) => name.clone(),
        }
    }
}

/// Maps a logical library name to this platform's file name:
/// `raw` becomes `libraw.so`, `libraw.dylib` or `raw.dll`.
pub fn map_library_name(name: &str) -> String {
    format!("{}{}{}", DLL_PREFIX, name, DLL_SUFFIX)
}

fn validate_name(name: &str) -> Result<(), BridgeError> {
    if name.is_empty() {
        return Err(BridgeError::library_load(name, "library name is empty"));
    }

    if name.contains(['/', '\\', '\0']) {
        return Err(BridgeError::library_load(
            name,
            "library name must not contain path separators or NUL",
        ));
    }

    Ok(())
}

/// Resolves a logical library name to the location it should be loaded
/// from. Search directories are tried in order; if none contains the
/// mapped file, the platform loader gets the bare file name.
pub fn locate(name: &str, search_paths: &[PathBuf]) -> Result<Location, BridgeError> {
    validate_name(name)?;

    let file_name = map_library_name(name);

    for dir in search_paths {
        let candidate = dir.join(&file_name);
        trace!("probing: {}", candidate.display());

        if is_file(&candidate) {
            return Ok(Location::Path(candidate));
        }
    }

    trace!("{}: deferring to the platform loader", file_name);

    Ok(Location::System(file_name))
}

fn is_file(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file()).unwrap_or(false)
}

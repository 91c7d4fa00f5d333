/// Persistence layer for Scout-Edge.
///
/// Every store document is rewritten as a whole on each mutation. The bytes
/// are written to a sibling temporary file, flushed to disk, then renamed
/// over the target, so a reader observes either the previous document or
/// the new one and never a truncated file.
///
/// # Usage
///
/// ```ignore
/// persistence::save_json(&data, Path::new("data/memory/alpha_trends.json"))?;
/// let data: TrendStoreData = persistence::load_json(path)?;
/// ```
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ScoutError, ScoutResult};

/// Extension used for the in-flight copy of a document.
const TEMP_EXTENSION: &str = "tmp";

fn temp_path_for(path: &Path) -> PathBuf {
    path.with_extension(TEMP_EXTENSION)
}

/// Serialize `value` as pretty JSON and atomically replace `path` with it.
///
/// # Errors
///
/// - `ScoutError::Serialization` if the value cannot be encoded (the target
///   file is not touched)
/// - `ScoutError::Io` if the directory, temporary file or rename fails
pub fn save_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> ScoutResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| ScoutError::io(parent, e))?;
        }
    }

    // Encode before touching the filesystem
    let bytes = serde_json::to_vec_pretty(value)?;

    let temp_path = temp_path_for(path);
    let written = File::create(&temp_path)
        .and_then(|mut file| {
            file.write_all(&bytes)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&temp_path, path));

    if let Err(e) = written {
        // Best effort: a stale temp file is harmless but untidy
        let _ = fs::remove_file(&temp_path);
        return Err(ScoutError::io(path, e));
    }

    Ok(())
}

/// Read and decode a JSON document.
///
/// # Errors
///
/// - `ScoutError::Io` if the file is missing or unreadable
/// - `ScoutError::Serialization` if the content is not valid JSON for `T`
pub fn load_json<T: DeserializeOwned>(path: &Path) -> ScoutResult<T> {
    let bytes = fs::read(path).map_err(|e| ScoutError::io(path, e))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Check if a document exists at the given path.
pub fn exists(path: &Path) -> bool {
    path.is_file()
}

//! Table file I/O
//!
//! Tables are pretty-printed JSON documents. Writes go to a sibling
//! `.json.tmp` file which is synced and then renamed over the target, so a
//! reader sees either the old table or the new one, never a partial write.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::BillTrackerError;

/// Read a JSON document; a missing file yields `T::default()`
pub fn read_json<T, P>(path: P) -> Result<T, BillTrackerError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(storage_error("open", path, e)),
    };

    serde_json::from_reader(BufReader::new(file)).map_err(|e| storage_error("parse", path, e))
}

/// Replace a JSON document atomically
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), BillTrackerError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| storage_error("create directory", parent, e))?;
    }

    let temp_path = temp_path_for(path);
    if let Err(e) = write_synced(&temp_path, data) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        storage_error("replace", path, e)
    })
}

fn write_synced<T: Serialize>(path: &Path, data: &T) -> Result<(), BillTrackerError> {
    let file = File::create(path).map_err(|e| storage_error("create", path, e))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| storage_error("serialize", path, e))?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|e| storage_error("write", path, e))?;

    writer
        .get_ref()
        .sync_all()
        .map_err(|e| storage_error("sync", path, e))
}

/// `bills.json` -> `bills.json.tmp`, in the same directory
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn storage_error(action: &str, path: &Path, err: impl std::fmt::Display) -> BillTrackerError {
    BillTrackerError::Storage(format!("Failed to {} {}: {}", action, path.display(), err))
}

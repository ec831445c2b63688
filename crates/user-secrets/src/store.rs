//! Store - the per-project secrets.json file

use crate::error::{Result, SecretsError};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Content of a freshly created store: an empty object with one indented
/// blank line to type into
pub const EMPTY_STORE: &str = "{\n  \n}";

/// Make sure the store file at `path` exists.
///
/// Missing parent directories are created. An existing file is left
/// untouched. Returns `true` if the file was created by this call.
pub fn ensure_store_file(path: &Path) -> Result<bool> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| SecretsError::io(dir, e))?;
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(SecretsError::io(path, e)),
    };

    file.write_all(EMPTY_STORE.as_bytes())
        .map_err(|e| SecretsError::io(path, e))?;

    Ok(true)
}

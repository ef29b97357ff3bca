//! Side-car `.lmp` files next to the module.

use std::ffi::OsString;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::MAP_EXTENSION;

/// `<module-path>.lmp`; the extension is appended, never substituted.
#[must_use]
pub fn sidecar_path(module: &Path) -> PathBuf
{
    let mut name = OsString::from(module.as_os_str());
    name.push(".");
    name.push(MAP_EXTENSION);
    PathBuf::from(name)
}

/// Write `blob` to the side-car of `module`, returning the path written.
///
/// ## Errors
///
/// Returns the underlying I/O error if the file cannot be created.
pub fn write_sidecar(module: &Path, blob: &[u8]) -> io::Result<PathBuf>
{
    let path = sidecar_path(module);
    debug!(path = %path.display(), "Writing symbol buffer to file");
    fs::write(&path, blob)?;
    Ok(path)
}

/// Read the side-car of `module`; `Ok(None)` if there is none.
///
/// ## Errors
///
/// Returns I/O errors other than "not found".
pub fn read_sidecar(module: &Path) -> io::Result<Option<Vec<u8>>>
{
    match fs::read(sidecar_path(module)) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

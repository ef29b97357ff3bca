//! # Blob Store
//!
//! Where encoded line maps live between the build and the run.
//!
//! A blob is stored either inside the module image ([`embedded`]) or in a
//! side-car file next to it ([`sidecar`]). Lookups try the embedded resource
//! first and fall back to the side-car.

pub mod embedded;
pub mod sidecar;

use std::io::{self, ErrorKind};
use std::path::Path;

pub use embedded::{embed, read_embedded, read_embedded_file};
pub use sidecar::{read_sidecar, sidecar_path, write_sidecar};

/// Resource type of an embedded line map.
pub const RESOURCE_TYPE: &str = "LMP";

/// Resource name of an embedded line map.
pub const RESOURCE_NAME: &str = "LMPDATA";

/// Resource language of an embedded line map.
pub const RESOURCE_LANG: u16 = 0;

/// Extension appended to the module path for side-car files.
pub const MAP_EXTENSION: &str = "lmp";

/// Find the blob for `module`: embedded resource first, side-car second
///
/// Returns `Ok(None)` when the module carries no map and has no side-car. A
/// missing module image is not an error as long as its side-car can be read.
///
/// ## Errors
///
/// Returns I/O errors other than "not found" from either location.
pub fn read_blob(module: &Path) -> io::Result<Option<Vec<u8>>>
{
    match read_embedded_file(module) {
        Ok(Some(blob)) => return Ok(Some(blob)),
        Ok(None) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }

    read_sidecar(module)
}

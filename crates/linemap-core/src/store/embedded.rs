//! Line map blobs embedded in the module image.
//!
//! The builder appends the blob to the end of the image followed by a fixed
//! footer:
//!
//! ```text
//! [ original image ][ blob ][ blob_len: u64 LE ][ lang: u16 LE ][ "LMP\0LMPDATA\0" ]
//! ```
//!
//! ELF, Mach-O and PE loaders ignore bytes past the last mapped segment, so the
//! image still runs. Re-embedding strips an existing trailer first.
//!
//! Maps placed into a dedicated object section by other tooling (for example
//! `objcopy --add-section .lmpdata=app.lmp`) are found too, through `object`.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use object::{Object, ObjectSection, ReadCache, ReadRef};
use tracing::debug;

use super::{RESOURCE_LANG, RESOURCE_NAME, RESOURCE_TYPE};
use crate::error::Result;

/// Resource type and name, NUL-terminated, as they appear at the very end of the image.
pub const TRAILER_TAG: &[u8; 12] = b"LMP\0LMPDATA\0";

const FOOTER_LEN: usize = 8 + 2 + TRAILER_TAG.len();

/// Section names searched when the image has no trailer.
pub const SECTION_NAMES: &[&str] = &[".lmpdata", "__lmpdata"];

/// Blob length recorded in a footer, if the footer is a line map trailer.
fn parse_footer(footer: &[u8; FOOTER_LEN]) -> Option<u64>
{
    if &footer[10..] != TRAILER_TAG {
        return None;
    }

    let lang = u16::from_le_bytes([footer[8], footer[9]]);
    if lang != RESOURCE_LANG {
        return None;
    }

    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&footer[..8]);
    Some(u64::from_le_bytes(len_bytes))
}

/// The embedded blob, if the image ends with a well-formed trailer.
#[must_use]
pub fn find_trailer(image: &[u8]) -> Option<&[u8]>
{
    let footer_start = image.len().checked_sub(FOOTER_LEN)?;
    let footer: &[u8; FOOTER_LEN] = image[footer_start..].try_into().ok()?;
    let blob_len = usize::try_from(parse_footer(footer)?).ok()?;
    let blob_start = footer_start.checked_sub(blob_len)?;

    Some(&image[blob_start..footer_start])
}

/// Read the trailer blob from the end of a seekable image
///
/// Only the footer and the blob itself are read, never the rest of the image.
///
/// ## Errors
///
/// Returns the underlying I/O error from seeking or reading.
pub fn read_trailer<R: Read + Seek>(reader: &mut R) -> io::Result<Option<Vec<u8>>>
{
    let image_len = reader.seek(SeekFrom::End(0))?;
    let Some(footer_start) = image_len.checked_sub(FOOTER_LEN as u64) else {
        return Ok(None);
    };

    let mut footer = [0u8; FOOTER_LEN];
    reader.seek(SeekFrom::Start(footer_start))?;
    reader.read_exact(&mut footer)?;

    let Some(blob_len) = parse_footer(&footer) else {
        return Ok(None);
    };
    let (Some(blob_start), Ok(blob_len)) = (footer_start.checked_sub(blob_len), usize::try_from(blob_len)) else {
        return Ok(None);
    };

    let mut blob = vec![0u8; blob_len];
    reader.seek(SeekFrom::Start(blob_start))?;
    reader.read_exact(&mut blob)?;
    Ok(Some(blob))
}

/// The image without any line map trailer.
#[must_use]
pub fn strip_trailer(image: &[u8]) -> &[u8]
{
    match find_trailer(image) {
        Some(blob) => &image[..image.len() - FOOTER_LEN - blob.len()],
        None => image,
    }
}

/// Copy of `image` with `blob` attached as its line map trailer, replacing any previous one.
#[must_use]
pub fn append_trailer(image: &[u8], blob: &[u8]) -> Vec<u8>
{
    let base = strip_trailer(image);
    let mut out = Vec::with_capacity(base.len() + blob.len() + FOOTER_LEN);
    out.extend_from_slice(base);
    out.extend_from_slice(blob);
    out.extend_from_slice(&(blob.len() as u64).to_le_bytes());
    out.extend_from_slice(&RESOURCE_LANG.to_le_bytes());
    out.extend_from_slice(TRAILER_TAG);
    out
}

/// Contents of a `.lmpdata` section, if the image is an object file that has one.
#[must_use]
pub fn find_section(image: &[u8]) -> Option<Vec<u8>>
{
    section_data(image)
}

fn section_data<'data, R: ReadRef<'data>>(data: R) -> Option<Vec<u8>>
{
    let file = object::File::parse(data).ok()?;
    let section = SECTION_NAMES.iter().find_map(|name| file.section_by_name(name))?;
    match section.uncompressed_data() {
        Ok(data) => Some(data.into_owned()),
        Err(err) => {
            debug!("unreadable line map section: {err}");
            None
        }
    }
}

/// Embedded blob of an image: the trailer wins over a section.
#[must_use]
pub fn read_embedded(image: &[u8]) -> Option<Vec<u8>>
{
    if let Some(blob) = find_trailer(image) {
        return Some(blob.to_vec());
    }
    find_section(image)
}

/// Embedded blob of the module file at `path`
///
/// Checks the trailer with two small reads; only when there is none is the
/// file parsed as an object, through a read cache that loads the headers and
/// the section on demand.
///
/// ## Errors
///
/// Returns the I/O error if the file cannot be opened or read.
pub fn read_embedded_file(path: &Path) -> io::Result<Option<Vec<u8>>>
{
    let mut file = File::open(path)?;
    if let Some(blob) = read_trailer(&mut file)? {
        return Ok(Some(blob));
    }

    let cache = ReadCache::new(file);
    Ok(section_data(&cache))
}

/// Embed `blob` into the image at `module`, writing the result to `output`
///
/// When `output` differs from `module` the module is copied first so the
/// output keeps the module's permissions.
///
/// ## Errors
///
/// Returns an I/O error if the module cannot be read or the output written.
pub fn embed(module: &Path, output: &Path, blob: &[u8]) -> Result<()>
{
    debug!(
        resource_type = RESOURCE_TYPE,
        resource_name = RESOURCE_NAME,
        "Writing symbol buffer to resource"
    );

    let image = fs::read(module)?;
    if module != output {
        fs::copy(module, output)?;
    }
    fs::write(output, append_trailer(&image, blob))?;
    Ok(())
}

//! # Persistence Codec
//!
//! Turns a [`LineMap`] into the opaque blob that gets embedded into a module (or
//! written next to it) and back.
//!
//! ## Pipeline
//!
//! ```text
//! encode: LineMap -> CBOR (serde/ciborium) -> gzip (flate2) -> AES-256-CBC (aes/cbc)
//! decode: AES-256-CBC -> gunzip -> CBOR -> LineMap
//! ```
//!
//! ## Obfuscation, not encryption
//!
//! The key and IV below are compiled into every build and checked into source.
//! The cipher step only keeps source paths from showing up in a hex dump of the
//! binary. It provides no confidentiality, and swapping it for a checksum or
//! removing it would only break reading older blobs.
//!
//! ## Format version
//!
//! The CBOR document carries a `version` field. Decoding rejects any version
//! other than [`FORMAT_VERSION`] so a future layout change fails soft instead
//! of misreading records.

use std::io::{Read, Write};

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CodecError;
use crate::map::LineMap;
use crate::table::{LineRecord, LineTable, NameTable, Symbol, SymbolTable};

/// Version tag written into every blob.
pub const FORMAT_VERSION: u32 = 1;

const KEY: [u8; 32] = [
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32,
];

const IV: [u8; 16] = [65, 2, 68, 26, 7, 178, 200, 3, 65, 110, 68, 13, 69, 16, 200, 219];

type Encryptor = cbc::Encryptor<Aes256>;
type Decryptor = cbc::Decryptor<Aes256>;

#[derive(Serialize)]
struct PersistedRef<'a>
{
    version: u32,
    symbols: Vec<&'a Symbol>,
    lines: &'a [LineRecord],
    names: &'a [String],
}

#[derive(Deserialize)]
struct Persisted
{
    version: u32,
    symbols: Vec<Symbol>,
    lines: Vec<LineRecord>,
    names: Vec<String>,
}

/// Encode a line map into an obfuscated blob.
///
/// ## Errors
///
/// Returns [`CodecError::Serialize`] or [`CodecError::Compress`] if a stage of
/// the pipeline fails. Both indicate a bug or an out-of-memory condition rather
/// than bad input.
pub fn encode(map: &LineMap) -> Result<Vec<u8>, CodecError>
{
    let serialized = serialize(map, FORMAT_VERSION)?;
    let compressed = compress(&serialized)?;
    debug!(
        serialized = serialized.len(),
        compressed = compressed.len(),
        "Encrypting symbol buffer"
    );
    Ok(encrypt(&compressed))
}

/// Decode a blob produced by [`encode`].
///
/// A zero-length blob decodes to an empty map.
///
/// ## Errors
///
/// Any corruption (truncated data, bad padding, invalid gzip stream, malformed
/// CBOR, unknown version) is reported as a [`CodecError`]. Runtime callers treat
/// every one of these as "this module has no line map".
pub fn decode(blob: &[u8]) -> Result<LineMap, CodecError>
{
    if blob.is_empty() {
        return Ok(LineMap::new());
    }

    let compressed = decrypt(blob)?;
    let serialized = decompress(&compressed)?;
    deserialize(&serialized)
}

fn serialize(map: &LineMap, version: u32) -> Result<Vec<u8>, CodecError>
{
    let persisted = PersistedRef {
        version,
        symbols: map.symbols().iter().collect(),
        lines: map.lines().as_slice(),
        names: map.names().as_slice(),
    };

    let mut buffer = Vec::new();
    ciborium::into_writer(&persisted, &mut buffer).map_err(|err| CodecError::Serialize(err.to_string()))?;
    Ok(buffer)
}

fn deserialize(bytes: &[u8]) -> Result<LineMap, CodecError>
{
    let persisted: Persisted = ciborium::from_reader(bytes).map_err(|err| CodecError::Deserialize(err.to_string()))?;
    if persisted.version != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion(persisted.version));
    }

    Ok(LineMap::from_parts(
        persisted.symbols.into_iter().collect::<SymbolTable>(),
        LineTable::from_records(persisted.lines),
        NameTable::from_names(persisted.names),
    ))
}

fn compress(bytes: &[u8]) -> Result<Vec<u8>, CodecError>
{
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).map_err(CodecError::Compress)?;
    encoder.finish().map_err(CodecError::Compress)
}

fn decompress(bytes: &[u8]) -> Result<Vec<u8>, CodecError>
{
    let mut decoder = GzDecoder::new(bytes);
    let mut buffer = Vec::new();
    decoder.read_to_end(&mut buffer).map_err(CodecError::Decompress)?;
    Ok(buffer)
}

fn encrypt(bytes: &[u8]) -> Vec<u8>
{
    Encryptor::new(&KEY.into(), &IV.into()).encrypt_padded_vec_mut::<Pkcs7>(bytes)
}

fn decrypt(bytes: &[u8]) -> Result<Vec<u8>, CodecError>
{
    Decryptor::new(&KEY.into(), &IV.into())
        .decrypt_padded_vec_mut::<Pkcs7>(bytes)
        .map_err(|_| CodecError::Decrypt)
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::types::Address;

    fn sample() -> LineMap
    {
        let mut map = LineMap::new();
        map.add_symbol(Symbol::new(0x0600_0001, "Main", 0));
        map.add_address_to_line(12, Address::new(0), ".../src/main.rs", "app");
        map.add_address_to_line(13, Address::new(8), ".../src/main.rs", "app");
        map
    }

    #[test]
    fn test_blob_is_block_aligned_and_opaque()
    {
        let blob = encode(&sample()).unwrap();
        assert_eq!(blob.len() % 16, 0);
        // Neither the gzip magic nor any path text survives the cipher step.
        assert_ne!(&blob[..2], &[0x1f, 0x8b]);
        assert!(!blob.windows(7).any(|window| window == b"main.rs"));
    }

    #[test]
    fn test_pipeline_stages_invert()
    {
        let serialized = serialize(&sample(), FORMAT_VERSION).unwrap();
        let compressed = compress(&serialized).unwrap();
        assert_eq!(decompress(&compressed).unwrap(), serialized);
        assert_eq!(decrypt(&encrypt(&compressed)).unwrap(), compressed);
    }

    #[test]
    fn test_rejects_other_versions()
    {
        let serialized = serialize(&sample(), FORMAT_VERSION + 1).unwrap();
        let blob = encrypt(&compress(&serialized).unwrap());

        match decode(&blob) {
            Err(CodecError::UnsupportedVersion(version)) => assert_eq!(version, FORMAT_VERSION + 1),
            other => panic!("expected UnsupportedVersion, got {other:?}"),
        }
    }

    #[test]
    fn test_misaligned_blob_fails_decrypt()
    {
        assert!(matches!(decode(&[1, 2, 3]), Err(CodecError::Decrypt)));
    }

    #[test]
    fn test_encrypted_garbage_fails_decompress()
    {
        let blob = encrypt(b"definitely not gzip");
        assert!(matches!(decode(&blob), Err(CodecError::Decompress(_))));
    }
}

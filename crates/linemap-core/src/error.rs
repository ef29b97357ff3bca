//! # Error Types
//!
//! Error handling for building, encoding and loading line maps.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! Only the build side surfaces errors to a caller. Everything on the runtime
//! resolution path is absorbed locally and reported as "unresolved", because the
//! resolver usually runs while the host is already handling another failure.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for line map operations
///
/// ## Error Categories
///
/// 1. **Structural build failures**: SymbolEnumerationFailed, LineEnumerationFailed
/// 2. **Input errors**: ModuleNotFound, InvalidArgument
/// 3. **Blob errors**: Codec (encode/decode pipeline)
/// 4. **I/O errors**: Io (reading modules, writing resources and side-car files)
#[derive(Error, Debug)]
pub enum LineMapError
{
    /// The symbol source could not enumerate the module's symbols
    ///
    /// The builder clears its line map before returning this error, so the
    /// caller never sees a half-populated symbol table.
    #[error("Unable to enumerate symbols: {0}")]
    SymbolEnumerationFailed(String),

    /// The symbol source could not enumerate the module's line records
    ///
    /// Like `SymbolEnumerationFailed`, the line map is cleared first. Symbols
    /// that were already collected are discarded too.
    #[error("Unable to enumerate lines: {0}")]
    LineEnumerationFailed(String),

    /// The module file to process does not exist
    #[error("Module not found: {}", .0.display())]
    ModuleNotFound(PathBuf),

    /// The module path given to the builder is empty or names a directory
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The blob could not be encoded or decoded
    #[error("Line map codec error: {0}")]
    Codec(#[from] CodecError),

    /// I/O error (for file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures inside the persistence pipeline (serialize, compress, encrypt and back).
#[derive(Error, Debug)]
pub enum CodecError
{
    #[error("failed to serialize line map: {0}")]
    Serialize(String),

    #[error("failed to deserialize line map: {0}")]
    Deserialize(String),

    #[error("failed to compress line map: {0}")]
    Compress(#[source] std::io::Error),

    #[error("failed to decompress line map: {0}")]
    Decompress(#[source] std::io::Error),

    /// Wrong length or bad padding after decryption
    #[error("failed to decrypt line map blob")]
    Decrypt,

    /// The blob was written by a newer (or older) encoder
    #[error("unsupported line map format version {0}")]
    UnsupportedVersion(u32),
}

/// Convenience type alias for `Result<T, LineMapError>`
///
/// ```rust
/// use linemap_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, LineMapError>;

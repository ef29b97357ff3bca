//! # Symbol Sources
//!
//! The builder never reads debug information itself. It drives a
//! [`SymbolSource`], which enumerates the module's symbols and line rows and
//! hands them over one at a time through a callback.
//!
//! [`DwarfSymbolSource`] is the implementation for ELF, Mach-O and PE images
//! carrying DWARF. Hosts with their own debug database (a managed runtime's
//! symbol store, say) implement the trait themselves.

pub mod dwarf;

pub use dwarf::DwarfSymbolSource;
use thiserror::Error;

/// A symbol as reported by the source, before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSymbol
{
    pub id: u64,
    pub name: String,
    pub address: u64,
    /// Function or metadata-bearing symbol; anything else is a compiler artifact
    /// the builder skips.
    pub is_function: bool,
}

/// A line row as reported by the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine
{
    pub address: u64,
    /// Raw line number. Wider than a record's `u32` so out-of-range rows can be
    /// rejected per record instead of silently truncated.
    pub line: u64,
    /// Full source path as stored in the debug information
    pub source_file: String,
    /// Compilation unit, object file or type that contains the code
    pub container: String,
}

/// Structural failure of a symbol source
///
/// Returned from an enumeration as a whole. Per-row problems are not errors
/// here; the builder validates rows and skips bad ones.
#[derive(Error, Debug)]
pub enum SourceError
{
    #[error("failed to parse module: {0}")]
    Parse(String),

    #[error("DWARF error: {0}")]
    Dwarf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Enumerates the symbols and line rows of one module.
pub trait SymbolSource
{
    /// Call `visit` once per symbol.
    ///
    /// ## Errors
    ///
    /// Returns a [`SourceError`] if the symbol table cannot be enumerated at all.
    fn enumerate_symbols(&self, visit: &mut dyn FnMut(RawSymbol)) -> Result<(), SourceError>;

    /// Call `visit` once per line row, in ascending address order.
    ///
    /// ## Errors
    ///
    /// Returns a [`SourceError`] if the line information cannot be enumerated at all.
    fn enumerate_lines(&self, visit: &mut dyn FnMut(RawLine)) -> Result<(), SourceError>;
}

//! # Line Map
//!
//! The per-module aggregate of symbol, line and name tables.
//!
//! A `LineMap` is either built fresh by the [`LineMapBuilder`](crate::builder::LineMapBuilder),
//! populated record by record, or decoded from a blob by the resolver. Decoded
//! maps are shared behind an `Arc` and never mutated again.

use std::fmt;

use crate::table::{LineRecord, LineTable, NameTable, Symbol, SymbolTable};
use crate::types::{Address, SymbolId, OFFSET_UNKNOWN};

/// Source position a call-site resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLine
{
    pub line: u32,
    /// Shortened source path as stored in the map (e.g. `.../src/debugger/mod.rs`)
    pub source_file: String,
}

impl fmt::Display for ResolvedLine
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}: line {}", self.source_file, self.line)
    }
}

/// Line number map for one compiled module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineMap
{
    symbols: SymbolTable,
    lines: LineTable,
    names: NameTable,
}

impl LineMap
{
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    pub(crate) fn from_parts(symbols: SymbolTable, lines: LineTable, names: NameTable) -> Self
    {
        Self { symbols, lines, names }
    }

    #[must_use]
    pub fn symbols(&self) -> &SymbolTable
    {
        &self.symbols
    }

    #[must_use]
    pub fn lines(&self) -> &LineTable
    {
        &self.lines
    }

    #[must_use]
    pub fn names(&self) -> &NameTable
    {
        &self.names
    }

    /// True when all three tables are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.symbols.is_empty() && self.lines.is_empty() && self.names.is_empty()
    }

    /// Reset all three tables, typically before a rebuild.
    pub fn clear(&mut self)
    {
        self.symbols.clear();
        self.lines.clear();
        self.names.clear();
    }

    /// Record a symbol, replacing (and returning) any previous one with the same id.
    pub fn add_symbol(&mut self, symbol: Symbol) -> Option<Symbol>
    {
        self.symbols.insert(symbol)
    }

    /// Append a line record, interning its source file and container names.
    pub fn add_address_to_line(&mut self, line: u32, address: Address, source_file: &str, object_name: &str)
        -> LineRecord
    {
        let record = LineRecord {
            address,
            line,
            source_file_index: self.names.add(source_file),
            object_name_index: self.names.add(object_name),
        };
        self.lines.push(record);
        record
    }

    /// Source file name of a record, `""` if its index is dangling.
    #[must_use]
    pub fn source_file(&self, record: &LineRecord) -> &str
    {
        self.names.get(record.source_file_index)
    }

    /// Container (object/type) name of a record, `""` if its index is dangling.
    #[must_use]
    pub fn object_name(&self, record: &LineRecord) -> &str
    {
        self.names.get(record.object_name_index)
    }

    /// Resolve a call-site inside this module
    ///
    /// Returns `None` when the symbol is unknown, the offset is
    /// [`OFFSET_UNKNOWN`], `symbol.address + offset` does not fit in an address,
    /// or the target lies before the first line record.
    #[must_use]
    pub fn resolve(&self, symbol_id: SymbolId, offset: i64) -> Option<ResolvedLine>
    {
        let symbol = self.symbols.get(symbol_id)?;
        if offset == OFFSET_UNKNOWN {
            return None;
        }

        let target = symbol.address.checked_offset(offset)?;
        let record = self.lines.floor(target)?;

        Some(ResolvedLine {
            line: record.line,
            source_file: self.source_file(record).to_owned(),
        })
    }
}

//! Per-module symbol table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Address, SymbolId};

/// A function symbol and the code address its body starts at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol
{
    pub id: SymbolId,
    pub name: String,
    /// Base offset of the symbol's code within the module
    pub address: Address,
}

impl Symbol
{
    pub fn new(id: u64, name: impl Into<String>, address: u64) -> Self
    {
        Self {
            id: SymbolId(id),
            name: name.into(),
            address: Address::new(address),
        }
    }
}

/// Symbols of one module keyed by id
///
/// Backed by a `BTreeMap` so iteration (and therefore the encoded blob) is
/// deterministic for a given set of symbols.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable
{
    symbols: BTreeMap<SymbolId, Symbol>,
}

impl SymbolTable
{
    #[must_use]
    pub fn new() -> Self
    {
        Self { symbols: BTreeMap::new() }
    }

    /// Insert a symbol, returning the previous entry with the same id if any.
    pub fn insert(&mut self, symbol: Symbol) -> Option<Symbol>
    {
        self.symbols.insert(symbol.id, symbol)
    }

    #[must_use]
    pub fn get(&self, id: SymbolId) -> Option<&Symbol>
    {
        self.symbols.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: SymbolId) -> bool
    {
        self.symbols.contains_key(&id)
    }

    /// First symbol (in id order) whose base address is exactly `address`.
    #[must_use]
    pub fn at_address(&self, address: Address) -> Option<&Symbol>
    {
        self.symbols.values().find(|symbol| symbol.address == address)
    }

    #[must_use]
    pub fn len(&self) -> usize
    {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.symbols.is_empty()
    }

    /// Symbols in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol>
    {
        self.symbols.values()
    }

    pub fn clear(&mut self)
    {
        self.symbols.clear();
    }
}

impl FromIterator<Symbol> for SymbolTable
{
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self
    {
        let mut table = SymbolTable::new();
        for symbol in iter {
            table.insert(symbol);
        }
        table
    }
}

//! Shared fixtures for integration tests

#![allow(dead_code)]

use linemap_core::source::{RawLine, RawSymbol, SourceError, SymbolSource};
use linemap_core::table::Symbol;
use linemap_core::{Address, LineMap};

/// In-memory symbol source; optionally fails one of the enumerations after
/// reporting everything it has.
#[derive(Default)]
pub struct FakeSource
{
    pub symbols: Vec<RawSymbol>,
    pub lines: Vec<RawLine>,
    pub fail_symbols: bool,
    pub fail_lines: bool,
}

impl FakeSource
{
    pub fn function(mut self, id: u64, name: &str, address: u64) -> Self
    {
        self.symbols.push(RawSymbol {
            id,
            name: name.to_string(),
            address,
            is_function: true,
        });
        self
    }

    pub fn data(mut self, id: u64, name: &str, address: u64) -> Self
    {
        self.symbols.push(RawSymbol {
            id,
            name: name.to_string(),
            address,
            is_function: false,
        });
        self
    }

    pub fn line(mut self, address: u64, line: u64, source_file: &str, container: &str) -> Self
    {
        self.lines.push(RawLine {
            address,
            line,
            source_file: source_file.to_string(),
            container: container.to_string(),
        });
        self
    }
}

impl SymbolSource for FakeSource
{
    fn enumerate_symbols(&self, visit: &mut dyn FnMut(RawSymbol)) -> Result<(), SourceError>
    {
        for symbol in &self.symbols {
            visit(symbol.clone());
        }
        if self.fail_symbols {
            return Err(SourceError::Parse("symbol table truncated".to_string()));
        }
        Ok(())
    }

    fn enumerate_lines(&self, visit: &mut dyn FnMut(RawLine)) -> Result<(), SourceError>
    {
        for line in &self.lines {
            visit(line.clone());
        }
        if self.fail_lines {
            return Err(SourceError::Dwarf("line program truncated".to_string()));
        }
        Ok(())
    }
}

/// A small two-method program.
pub fn sample_source() -> FakeSource
{
    FakeSource::default()
        .function(0x0600_0001, "Main", 0)
        .function(0x0600_0002, "Run", 40)
        .data(0x0400_0001, "s_counter", 200)
        .line(0, 50, "C:\\Users\\dev\\src\\TestApp1\\Program.cs", "TestApp1.Program")
        .line(6, 51, "C:\\Users\\dev\\src\\TestApp1\\Program.cs", "TestApp1.Program")
        .line(12, 0x00FE_EFEE, "C:\\Users\\dev\\src\\TestApp1\\Program.cs", "TestApp1.Program")
        .line(40, 10, "C:\\Users\\dev\\src\\TestApp1\\Worker.cs", "TestApp1.Worker")
}

/// The map built from `sample_source`, assembled by hand.
pub fn sample_map() -> LineMap
{
    let mut map = LineMap::new();
    map.add_symbol(Symbol::new(0x0600_0001, "Main", 0));
    map.add_symbol(Symbol::new(0x0600_0002, "Run", 40));
    map.add_address_to_line(50, Address::new(0), "...\\src\\TestApp1\\Program.cs", "TestApp1.Program");
    map.add_address_to_line(51, Address::new(6), "...\\src\\TestApp1\\Program.cs", "TestApp1.Program");
    map.add_address_to_line(10, Address::new(40), "...\\src\\TestApp1\\Worker.cs", "TestApp1.Worker");
    map
}

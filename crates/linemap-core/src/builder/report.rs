//! Human-readable dump of a line map.
//!
//! Diagnostic only: the report is never read back. It lists symbols sorted by
//! name, line records sorted by source file, line and address, and the name
//! table with indices.

use std::fmt::{self, Write};

use crate::map::LineMap;
use crate::table::{LineRecord, Symbol};

const RULE: &str = "========";

/// Render the report for `map`.
#[must_use]
pub fn render(map: &LineMap) -> String
{
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, map);
    out
}

fn write_report(out: &mut String, map: &LineMap) -> fmt::Result
{
    write_symbols(out, map)?;
    write_lines(out, map)?;
    write_names(out, map)
}

fn write_symbols(out: &mut String, map: &LineMap) -> fmt::Result
{
    writeln!(out, "{RULE}")?;
    writeln!(out, "SYMBOLS:")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "   {:<10}  {:<10}  {}  ", "Token", "Address", "Symbol")?;
    writeln!(out, "   {:<10}  {:<10}  {}  ", "-----", "-------", "------")?;

    let mut symbols: Vec<(String, &Symbol)> = map
        .symbols()
        .iter()
        .map(|symbol| (qualified_name(map, symbol), symbol))
        .collect();
    symbols.sort_by(|a, b| a.0.cmp(&b.0));

    for (name, symbol) in symbols {
        writeln!(
            out,
            "   {:<10X}  {:<10}  {}",
            symbol.id.value(),
            symbol.address.value(),
            name
        )?;
    }
    Ok(())
}

fn write_lines(out: &mut String, map: &LineMap) -> fmt::Result
{
    writeln!(out, "{RULE}")?;
    writeln!(out, "LINE NUMBERS:")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "   {:<10}  {:<11}  {:<10}  {}", "Address", "Line number", "Token", "Symbol/FileName")?;
    writeln!(out, "   {:<10}  {:<11}  {:<10}  {}", "-------", "-----------", "-----", "---------------")?;

    let mut records: Vec<&LineRecord> = map.lines().iter().collect();
    records.sort_by(|a, b| {
        map.source_file(a)
            .cmp(map.source_file(b))
            .then(a.line.cmp(&b.line))
            .then(a.address.cmp(&b.address))
    });

    // A symbol stays current until the next record that starts another one.
    let mut current: Option<&Symbol> = None;
    for record in records {
        if let Some(symbol) = map.symbols().at_address(record.address) {
            current = Some(symbol);
        }

        let token = current.map_or(0, |symbol| symbol.id.value());
        let mut name = format!("{}:{}", map.source_file(record), map.object_name(record));
        if let Some(symbol) = current {
            name.push('.');
            name.push_str(&symbol.name);
        }

        writeln!(
            out,
            "   {:<10}  {:<11}  {:<10X}  {}",
            record.address.value(),
            record.line,
            token,
            name
        )?;
    }
    Ok(())
}

fn write_names(out: &mut String, map: &LineMap) -> fmt::Result
{
    writeln!(out, "{RULE}")?;
    writeln!(out, "NAMES:")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "   {:<10}  {}", "Index", "Name")?;
    writeln!(out, "   {:<10}  {}", "-----", "----")?;
    for (index, name) in map.names().iter().enumerate() {
        writeln!(out, "   {index:<10}  {name}")?;
    }
    Ok(())
}

/// `Object.Symbol` when a line record starts at the symbol's address, else the bare name.
fn qualified_name(map: &LineMap, symbol: &Symbol) -> String
{
    let object = map
        .lines()
        .iter()
        .find(|record| record.address == symbol.address)
        .map_or("", |record| map.object_name(record));

    if object.is_empty() {
        symbol.name.clone()
    } else {
        format!("{object}.{}", symbol.name)
    }
}

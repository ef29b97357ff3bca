//! DWARF-backed symbol source.
//!
//! Symbols come from the object file's symbol table (falling back to the
//! dynamic symbol table for stripped images), line rows from the DWARF line
//! programs of every compilation unit.
//!
//! ## Symbol ids
//!
//! Native images have no metadata tokens, so a symbol's id is its index in the
//! symbol table. The runtime side must report the same index for a frame,
//! which is what a native unwinder adapter gets from the same table.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gimli::{AttributeValue, Dwarf, EndianArcSlice, FileEntry, LineProgramHeader, Reader, RunTimeEndian, SectionId, Unit};
use object::{Object, ObjectSection, ObjectSymbol, SymbolKind};
use once_cell::sync::OnceCell;
use rustc_demangle::try_demangle;
use tracing::{debug, warn};

use super::{RawLine, RawSymbol, SourceError, SymbolSource};

type OwnedReader = EndianArcSlice<RunTimeEndian>;
type OwnedDwarf = Dwarf<OwnedReader>;

const DWARF_SECTIONS: &[(&str, &[&str])] = &[
    (".debug_abbrev", &[".debug_abbrev", "__debug_abbrev"]),
    (".debug_addr", &[".debug_addr", "__debug_addr"]),
    (".debug_info", &[".debug_info", "__debug_info"]),
    (".debug_line", &[".debug_line", "__debug_line"]),
    (".debug_line_str", &[".debug_line_str", "__debug_line_str"]),
    (".debug_ranges", &[".debug_ranges", "__debug_ranges"]),
    (".debug_rnglists", &[".debug_rnglists", "__debug_rnglists"]),
    (".debug_str", &[".debug_str", "__debug_str"]),
    (".debug_str_offsets", &[".debug_str_offsets", "__debug_str_offsets"]),
];

/// Symbol source reading a module image with DWARF line information.
pub struct DwarfSymbolSource
{
    path: PathBuf,
    data: Arc<[u8]>,
    endian: RunTimeEndian,
    debug_sections: HashMap<&'static str, Arc<[u8]>>,
    dwarf_cache: OnceCell<OwnedDwarf>,
}

impl DwarfSymbolSource
{
    /// Read and parse the module at `path`
    ///
    /// DWARF sections are copied out eagerly; the `Dwarf` itself is loaded on
    /// the first line enumeration.
    ///
    /// ## Errors
    ///
    /// Returns [`SourceError::Io`] if the file cannot be read and
    /// [`SourceError::Parse`] if it is not an object file `object` understands.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SourceError>
    {
        let path = path.into();
        let data = Arc::<[u8]>::from(fs::read(&path)?);

        let (endian, debug_sections) = {
            let file = parse_object(&path, &data)?;
            let endian = if file.is_little_endian() {
                RunTimeEndian::Little
            } else {
                RunTimeEndian::Big
            };

            let mut sections = HashMap::new();
            for (canonical, aliases) in DWARF_SECTIONS {
                sections.insert(*canonical, load_section_bytes(&file, aliases)?);
            }
            (endian, sections)
        };

        Ok(Self {
            path,
            data,
            endian,
            debug_sections,
            dwarf_cache: OnceCell::new(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path
    {
        &self.path
    }

    fn dwarf(&self) -> Result<&OwnedDwarf, SourceError>
    {
        self.dwarf_cache
            .get_or_try_init(|| load_dwarf(&self.debug_sections, self.endian))
    }

    /// Line rows of every unit, sorted by address
    ///
    /// Only unit and line-program structure errors fail the enumeration. A row
    /// whose file entry is missing or whose path cannot be resolved is logged
    /// and skipped.
    fn collect_lines(dwarf: &OwnedDwarf) -> Result<Vec<RawLine>, SourceError>
    {
        let mut lines = Vec::new();

        let mut units = dwarf.units();
        while let Some(header) = units.next().map_err(|err| map_dwarf_error("reading unit header", &err))? {
            let unit = dwarf.unit(header).map_err(|err| map_dwarf_error("parsing unit", &err))?;
            let Some(program) = unit.line_program.clone() else {
                continue;
            };

            let container = match unit.name.as_ref().map(reader_to_string).transpose() {
                Ok(name) => name.unwrap_or_default(),
                Err(err) => {
                    warn!("unreadable compilation unit name, using an empty container: {err}");
                    String::new()
                }
            };

            let mut rows = program.rows();
            while let Some((header, row)) = rows.next_row().map_err(|err| map_dwarf_error("reading line row", &err))? {
                if row.end_sequence() {
                    continue;
                }
                // Line 0 marks compiler-generated code with no source position.
                let Some(line) = row.line() else {
                    continue;
                };
                let Some(file) = row.file(header) else {
                    warn!(address = row.address(), line = line.get(), "line row has no file entry, skipping");
                    continue;
                };

                let source_file = Self::file_path(dwarf, &unit, header, file);
                push_row(&mut lines, row.address(), line.get(), source_file, &container);
            }
        }

        // Line programs are sorted per sequence only; units can interleave.
        lines.sort_by_key(|line| line.address);
        Ok(lines)
    }

    fn file_path(
        dwarf: &OwnedDwarf,
        unit: &Unit<OwnedReader>,
        header: &LineProgramHeader<OwnedReader>,
        file: &FileEntry<OwnedReader>,
    ) -> Result<String, SourceError>
    {
        let name = attr_to_string(dwarf, unit, file.path_name())?;
        if is_absolute(&name) {
            return Ok(name);
        }

        let directory = match file.directory(header) {
            Some(attr) => attr_to_string(dwarf, unit, attr)?,
            None => String::new(),
        };

        if directory.is_empty() {
            Ok(name)
        } else {
            let separator = if directory.contains('\\') { '\\' } else { '/' };
            Ok(format!("{}{separator}{name}", directory.trim_end_matches(['/', '\\'])))
        }
    }
}

impl SymbolSource for DwarfSymbolSource
{
    fn enumerate_symbols(&self, visit: &mut dyn FnMut(RawSymbol)) -> Result<(), SourceError>
    {
        let file = parse_object(&self.path, &self.data)?;

        let mut visited = visit_symbols(file.symbols(), visit);
        if visited == 0 {
            debug!(path = %self.path.display(), "no static symbols, using dynamic symbol table");
            visited = visit_symbols(file.dynamic_symbols(), visit);
        }

        debug!(count = visited, "enumerated object symbols");
        Ok(())
    }

    fn enumerate_lines(&self, visit: &mut dyn FnMut(RawLine)) -> Result<(), SourceError>
    {
        let lines = Self::collect_lines(self.dwarf()?)?;
        debug!(count = lines.len(), "enumerated line rows");
        for line in lines {
            visit(line);
        }
        Ok(())
    }
}

/// Keep a row whose source path resolved. A bad path costs only its row.
fn push_row(
    lines: &mut Vec<RawLine>,
    address: u64,
    line: u64,
    source_file: Result<String, SourceError>,
    container: &str,
)
{
    match source_file {
        Ok(source_file) => {
            lines.push(RawLine {
                address,
                line,
                source_file,
                container: container.to_owned(),
            });
        }
        Err(err) => warn!(address, line, "skipping line row: {err}"),
    }
}

fn load_dwarf(sections: &HashMap<&'static str, Arc<[u8]>>, endian: RunTimeEndian) -> Result<OwnedDwarf, SourceError>
{
    Dwarf::load(|id: SectionId| {
        let data = sections.get(id.name()).cloned().unwrap_or_else(|| Arc::<[u8]>::from(Vec::new()));
        Ok::<_, gimli::Error>(EndianArcSlice::new(data, endian))
    })
    .map_err(|err| map_dwarf_error("failed to load DWARF", &err))
}

fn visit_symbols<'data, S>(symbols: impl Iterator<Item = S>, visit: &mut dyn FnMut(RawSymbol)) -> usize
where
    S: ObjectSymbol<'data>,
{
    let mut count = 0;
    for symbol in symbols {
        let Ok(raw) = symbol.name() else {
            continue;
        };
        if raw.is_empty() {
            continue;
        }

        count += 1;
        visit(RawSymbol {
            id: symbol.index().0 as u64,
            name: demangle(raw),
            address: symbol.address(),
            is_function: symbol.kind() == SymbolKind::Text && symbol.is_definition(),
        });
    }
    count
}

fn demangle(raw: &str) -> String
{
    // `{:#}` drops the trailing hash of legacy Rust symbols.
    try_demangle(raw).map_or_else(|_| raw.to_string(), |demangled| format!("{demangled:#}"))
}

fn parse_object<'data>(path: &Path, data: &'data [u8]) -> Result<object::File<'data>, SourceError>
{
    object::File::parse(data).map_err(|err| SourceError::Parse(format!("failed to parse {}: {err}", path.display())))
}

fn load_section_bytes(file: &object::File<'_>, names: &[&str]) -> Result<Arc<[u8]>, SourceError>
{
    for name in names {
        if let Some(section) = file.section_by_name(name) {
            let data = section
                .uncompressed_data()
                .map_err(|err| SourceError::Parse(format!("failed to read {name}: {err}")))?;
            return Ok(match data {
                Cow::Borrowed(bytes) => Arc::<[u8]>::from(bytes.to_vec()),
                Cow::Owned(vec) => vec.into(),
            });
        }
    }

    Ok(Arc::<[u8]>::from(Vec::new()))
}

fn attr_to_string(
    dwarf: &OwnedDwarf,
    unit: &Unit<OwnedReader>,
    value: AttributeValue<OwnedReader>,
) -> Result<String, SourceError>
{
    let reader = dwarf
        .attr_string(unit, value)
        .map_err(|err| map_dwarf_error("resolving DWARF string", &err))?;
    reader_to_string(&reader)
}

fn reader_to_string(reader: &OwnedReader) -> Result<String, SourceError>
{
    reader
        .to_string_lossy()
        .map(Cow::into_owned)
        .map_err(|err| map_dwarf_error("decoding DWARF string", &err))
}

fn is_absolute(path: &str) -> bool
{
    path.starts_with('/') || path.starts_with('\\') || path.as_bytes().get(1) == Some(&b':')
}

fn map_dwarf_error(context: &str, err: &gimli::Error) -> SourceError
{
    SourceError::Dwarf(format!("{context}: {err}"))
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_demangle_strips_hash()
    {
        assert_eq!(demangle("_ZN4core3fmt5write17h0123456789abcdefE"), "core::fmt::write");
        assert_eq!(demangle("main"), "main");
    }

    #[test]
    fn test_is_absolute()
    {
        assert!(is_absolute("/usr/src/app/main.rs"));
        assert!(is_absolute("C:\\src\\Program.cs"));
        assert!(!is_absolute("src/main.rs"));
    }

    /// One DWARF 5 unit whose line program has two files: file 0 names
    /// `good.rs` in `.debug_line_str`, file 1 points past the end of it.
    /// Rows: 0x1000 line 1 in file 1, 0x1004 line 2 in file 0.
    fn dwarf_with_bad_file_entry() -> OwnedDwarf
    {
        let abbrev: &[u8] = &[
            0x01, 0x11, 0x00, // code 1: DW_TAG_compile_unit, no children
            0x10, 0x17, // DW_AT_stmt_list, DW_FORM_sec_offset
            0x00, 0x00, 0x00,
        ];
        let info: &[u8] = &[
            13, 0, 0, 0, // unit_length
            5, 0, // version
            0x01, // DW_UT_compile
            8,    // address_size
            0, 0, 0, 0, // debug_abbrev_offset
            0x01, // abbrev code
            0, 0, 0, 0, // stmt_list
        ];
        let line: &[u8] = &[
            75, 0, 0, 0, // unit_length
            5, 0, // version
            8, 0, // address_size, segment_selector_size
            43, 0, 0, 0, // header_length
            1, 1, 1, 0xfb, 14, 13, // min_inst, max_ops, default_is_stmt, line_base, line_range, opcode_base
            0, 1, 1, 1, 1, 0, 0, 0, 1, 0, 0, 1, // standard_opcode_lengths
            1, 0x01, 0x08, // directory format: DW_LNCT_path, DW_FORM_string
            1, b'/', b's', b'r', b'c', 0, // one directory
            2, 0x01, 0x1f, 0x02, 0x0f, // file format: path line_strp, directory_index udata
            2, // two files
            0, 0, 0, 0, 0, // file 0: "good.rs", directory 0
            0, 1, 0, 0, 0, // file 1: offset 0x100, directory 0
            0x00, 0x09, 0x02, 0x00, 0x10, 0, 0, 0, 0, 0, 0, // DW_LNE_set_address 0x1000
            0x01, // DW_LNS_copy (file 1, line 1)
            0x04, 0x00, // DW_LNS_set_file 0
            0x02, 0x04, // DW_LNS_advance_pc 4
            0x03, 0x01, // DW_LNS_advance_line 1
            0x01, // DW_LNS_copy (file 0, line 2)
            0x02, 0x04, // DW_LNS_advance_pc 4
            0x00, 0x01, 0x01, // DW_LNE_end_sequence
        ];

        let mut sections: HashMap<&'static str, Arc<[u8]>> = HashMap::new();
        sections.insert(".debug_abbrev", Arc::from(abbrev));
        sections.insert(".debug_info", Arc::from(info));
        sections.insert(".debug_line", Arc::from(line));
        sections.insert(".debug_line_str", Arc::from(b"good.rs\0".as_slice()));
        load_dwarf(&sections, RunTimeEndian::Little).unwrap()
    }

    #[test]
    fn test_unresolvable_file_name_skips_only_its_row()
    {
        let lines = DwarfSymbolSource::collect_lines(&dwarf_with_bad_file_entry()).unwrap();
        assert_eq!(
            lines,
            vec![RawLine {
                address: 0x1004,
                line: 2,
                source_file: "/src/good.rs".to_string(),
                container: String::new(),
            }]
        );
    }

    #[test]
    fn test_push_row_drops_failed_paths()
    {
        let mut lines = Vec::new();
        push_row(&mut lines, 0x10, 3, Err(SourceError::Dwarf("bad line_strp offset".to_string())), "app");
        push_row(&mut lines, 0x20, 4, Ok("src/main.rs".to_string()), "app");

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].address, 0x20);
        assert_eq!(lines[0].container, "app");
    }

    #[test]
    fn test_open_rejects_non_object()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-a-binary");
        fs::write(&path, b"plain text").unwrap();

        assert!(matches!(DwarfSymbolSource::open(&path), Err(SourceError::Parse(_))));
        assert!(matches!(
            DwarfSymbolSource::open(dir.path().join("missing")),
            Err(SourceError::Io(_))
        ));
    }
}

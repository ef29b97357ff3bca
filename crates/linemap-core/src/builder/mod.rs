//! # Line Map Builder
//!
//! Offline half of the system: extract a line map from a module's debug
//! information and persist it next to (or inside) the module.
//!
//! ## Pipeline
//!
//! 1. [`LineMapBuilder::collect`] clears the map and drives a
//!    [`SymbolSource`]: function symbols first, then line rows.
//! 2. [`LineMapBuilder::write`] encodes the map with the [codec](crate::codec)
//!    and hands the blob to the [store](crate::store), either embedded into the
//!    image or as a `.lmp` side-car. An optional report is written alongside.
//!
//! A structural failure of the source aborts the build and leaves the map
//! empty. A bad individual row only costs that row.

pub mod report;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::codec;
use crate::error::{LineMapError, Result};
use crate::map::LineMap;
use crate::source::{RawLine, SymbolSource};
use crate::store;
use crate::table::Symbol;
use crate::types::Address;

/// Line number the compilers emit for hidden sequence points.
pub const HIDDEN_LINE: u64 = 0x00FE_EFEE;

/// Extension appended to the module path for the report.
pub const REPORT_EXTENSION: &str = "linemapreport";

/// Where the encoded map goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmbedMode
{
    /// Append to the module image (or to a copy at `output`).
    #[default]
    Resource,
    /// Write a `<module>.lmp` side-car file.
    File,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions
{
    pub mode: EmbedMode,
    /// Also write a human-readable `<module>.linemapreport`.
    pub report: bool,
    /// Alternate destination; defaults to the module itself.
    pub output: Option<PathBuf>,
}

/// Why a single line row was skipped.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecordError
{
    #[error("line {line} at {address} does not fit in 32 bits")]
    LineOutOfRange
    {
        line: u64, address: Address
    },

    #[error("line {line} at {address} has no source file")]
    MissingSourceFile
    {
        line: u64, address: Address
    },
}

/// Builds and persists the line map of one module.
#[derive(Debug)]
pub struct LineMapBuilder
{
    module: PathBuf,
    options: BuildOptions,
    map: LineMap,
}

impl LineMapBuilder
{
    /// Create a builder for the module at `module`.
    ///
    /// ## Errors
    ///
    /// Returns [`LineMapError::InvalidArgument`] for an empty path or a
    /// directory and [`LineMapError::ModuleNotFound`] if nothing exists at
    /// `module`.
    pub fn new(module: impl Into<PathBuf>, options: BuildOptions) -> Result<Self>
    {
        let module = module.into();
        if module.as_os_str().is_empty() {
            return Err(LineMapError::InvalidArgument("module path is empty".to_string()));
        }
        if module.is_dir() {
            return Err(LineMapError::InvalidArgument(format!(
                "{} is a directory, not a module",
                module.display()
            )));
        }
        if !module.is_file() {
            return Err(LineMapError::ModuleNotFound(module));
        }

        Ok(Self {
            module,
            options,
            map: LineMap::new(),
        })
    }

    #[must_use]
    pub fn module(&self) -> &Path
    {
        &self.module
    }

    #[must_use]
    pub fn options(&self) -> &BuildOptions
    {
        &self.options
    }

    /// The map collected so far (empty before [`collect`](Self::collect)).
    #[must_use]
    pub fn line_map(&self) -> &LineMap
    {
        &self.map
    }

    /// Consume the builder, keeping its map.
    #[must_use]
    pub fn into_line_map(self) -> LineMap
    {
        self.map
    }

    /// Destination of the blob before any side-car extension is applied.
    #[must_use]
    pub fn output_path(&self) -> &Path
    {
        self.options.output.as_deref().unwrap_or(&self.module)
    }

    /// Path of the report for this module.
    #[must_use]
    pub fn report_path(&self) -> PathBuf
    {
        let mut name = self.module.clone().into_os_string();
        name.push(".");
        name.push(REPORT_EXTENSION);
        PathBuf::from(name)
    }

    /// Populate the line map from `source`
    ///
    /// ## Errors
    ///
    /// Returns [`LineMapError::SymbolEnumerationFailed`] or
    /// [`LineMapError::LineEnumerationFailed`] when the source fails as a
    /// whole. The map is empty afterwards in both cases.
    pub fn collect(&mut self, source: &dyn SymbolSource) -> Result<&LineMap>
    {
        self.map.clear();

        let result = populate(&mut self.map, source);
        if let Err(err) = &result {
            error!(module = %self.module.display(), "{err}");
            self.map.clear();
        }

        info!("Retrieved {} symbols", self.map.symbols().len());
        info!("Retrieved {} lines", self.map.lines().len());
        info!("Retrieved {} strings", self.map.names().len());

        result.map(|()| &self.map)
    }

    /// Encode the collected map and store it according to the options
    ///
    /// Returns the path the blob was written to.
    ///
    /// ## Errors
    ///
    /// Returns a codec error if encoding fails and an I/O error if the
    /// image, side-car or report cannot be written.
    pub fn write(&self) -> Result<PathBuf>
    {
        let blob = codec::encode(&self.map)?;
        debug!(bytes = blob.len(), "encoded line map");

        let written = match self.options.mode {
            EmbedMode::File => store::write_sidecar(self.output_path(), &blob)?,
            EmbedMode::Resource => {
                let output = self.output_path();
                store::embed(&self.module, output, &blob)?;
                output.to_path_buf()
            }
        };

        if self.options.report {
            let path = self.report_path();
            debug!(path = %path.display(), "Writing report");
            fs::write(&path, report::render(&self.map))?;
        }

        Ok(written)
    }

    /// [`collect`](Self::collect) then [`write`](Self::write).
    ///
    /// ## Errors
    ///
    /// Any error from either step.
    pub fn run(&mut self, source: &dyn SymbolSource) -> Result<PathBuf>
    {
        self.collect(source)?;
        self.write()
    }
}

fn populate(map: &mut LineMap, source: &dyn SymbolSource) -> Result<()>
{
    source
        .enumerate_symbols(&mut |raw| {
            if !raw.is_function {
                return;
            }
            if let Some(previous) = map.add_symbol(Symbol::new(raw.id, raw.name, raw.address)) {
                warn!(id = %previous.id, name = %previous.name, "duplicate symbol id, keeping the later one");
            }
        })
        .map_err(|err| LineMapError::SymbolEnumerationFailed(err.to_string()))?;

    source
        .enumerate_lines(&mut |raw| {
            if raw.line == HIDDEN_LINE {
                return;
            }
            if let Err(err) = add_line(map, &raw) {
                warn!("Unable to enum lines: {err}");
            }
        })
        .map_err(|err| LineMapError::LineEnumerationFailed(err.to_string()))
}

/// Validate one row and append it to `map`.
///
/// ## Errors
///
/// Returns a [`RecordError`] describing why the row was rejected; `map` is
/// left untouched in that case.
pub fn add_line(map: &mut LineMap, raw: &RawLine) -> std::result::Result<(), RecordError>
{
    let address = Address::new(raw.address);
    if raw.source_file.is_empty() {
        return Err(RecordError::MissingSourceFile { line: raw.line, address });
    }
    let line = u32::try_from(raw.line).map_err(|_| RecordError::LineOutOfRange { line: raw.line, address })?;

    map.add_address_to_line(line, address, &shorten_source_path(&raw.source_file), &raw.container);
    Ok(())
}

/// Keep at most the last two directories of a source path
///
/// `C:\src\app\Program.cs` has three directory components and becomes
/// `...\src\app\Program.cs`; `proj/app/main.rs` becomes `.../app/main.rs`;
/// anything shorter is reduced to the file name. `/` and `\` both separate,
/// and the path's own separator is used in the result.
#[must_use]
pub fn shorten_source_path(path: &str) -> String
{
    let separator = if path.contains('\\') { '\\' } else { '/' };
    let parts: Vec<&str> = path.split(['/', '\\']).collect();

    let keep = match parts.len() {
        0..=2 => return parts.last().copied().unwrap_or_default().to_string(),
        3 => 2,
        _ => 3,
    };

    let mut short = String::from("...");
    for part in &parts[parts.len() - keep..] {
        short.push(separator);
        short.push_str(part);
    }
    short
}

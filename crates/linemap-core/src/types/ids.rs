//! Call-site identity types.
//!
//! A captured call-site is the triple `(ModuleIdentity, SymbolId, code offset)`.
//! How a host runtime obtains these (reflection, unwinder, symbol index) is the
//! job of an adapter outside this crate; the engine only ever sees the opaque values.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Code offset value meaning "the capturing runtime could not tell where in the
/// symbol's body execution was".
pub const OFFSET_UNKNOWN: i64 = -1;

/// Per-module symbol identifier
///
/// For managed runtimes this is a metadata token, for native images the index of
/// the symbol in the object file's symbol table. Ids are unique within a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub u64);

impl SymbolId
{
    pub const fn new(value: u64) -> Self
    {
        SymbolId(value)
    }

    pub const fn value(self) -> u64
    {
        self.0
    }
}

impl From<u64> for SymbolId
{
    fn from(value: u64) -> Self
    {
        SymbolId(value)
    }
}

impl fmt::Display for SymbolId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{:X}", self.0)
    }
}

/// Identity of a compiled module (executable or library)
///
/// The identity is the module's file path as the host sees it. It keys the
/// resolver cache and locates the embedded resource or side-car file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleIdentity(PathBuf);

impl ModuleIdentity
{
    pub fn new(path: impl Into<PathBuf>) -> Self
    {
        ModuleIdentity(path.into())
    }

    /// Path of the module image on disk.
    pub fn path(&self) -> &Path
    {
        &self.0
    }
}

impl From<PathBuf> for ModuleIdentity
{
    fn from(path: PathBuf) -> Self
    {
        ModuleIdentity(path)
    }
}

impl From<&Path> for ModuleIdentity
{
    fn from(path: &Path) -> Self
    {
        ModuleIdentity(path.to_path_buf())
    }
}

impl From<&str> for ModuleIdentity
{
    fn from(path: &str) -> Self
    {
        ModuleIdentity(PathBuf::from(path))
    }
}

impl fmt::Display for ModuleIdentity
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.0.display())
    }
}

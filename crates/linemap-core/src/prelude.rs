//! Common module for library exports

pub use crate::builder::{BuildOptions, EmbedMode, LineMapBuilder};
pub use crate::error::{LineMapError, Result};
pub use crate::map::{LineMap, ResolvedLine};
pub use crate::resolver::{MapLoader, Resolver};
pub use crate::source::{DwarfSymbolSource, RawLine, RawSymbol, SymbolSource};
pub use crate::table::{LineRecord, Symbol};
pub use crate::types::{Address, ModuleIdentity, SymbolId, OFFSET_UNKNOWN};

//! # linemap-core
//!
//! Line number maps for stripped release binaries.
//!
//! A release build ships without its debug database, so a captured stack
//! frame only carries a module, a symbol id and a code offset. This crate
//! closes the gap in two steps:
//!
//! - **Build time**: [`LineMapBuilder`] walks the module's debug information
//!   through a [`SymbolSource`](source::SymbolSource), collects a compact
//!   [`LineMap`] and stores it, encoded by the [`codec`], inside the module
//!   image or in a `.lmp` side-car file ([`store`]).
//! - **Run time**: [`Resolver`] loads each module's map once and turns
//!   `(module, symbol id, offset)` into a source file and line.
//!
//! ## Tables
//!
//! A map is three tables ([`table`]): function symbols keyed by id, line
//! records ordered by address, and an interned string table shared by both.

pub mod builder;
pub mod codec;
pub mod error;
pub mod map;
pub mod prelude;
pub mod resolver;
pub mod source;
pub mod store;
pub mod table;
pub mod types;

pub use builder::{BuildOptions, EmbedMode, LineMapBuilder};
// Re-export commonly used types
pub use error::{CodecError, LineMapError, Result};
pub use map::{LineMap, ResolvedLine};
pub use resolver::{FsMapLoader, MapLoader, Resolver};
pub use types::{Address, ModuleIdentity, SymbolId, OFFSET_UNKNOWN};

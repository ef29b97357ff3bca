//! # Tables
//!
//! The three tables a [`LineMap`](crate::LineMap) is made of:
//!
//! - [`NameTable`]: interned source file and container names
//! - [`SymbolTable`]: symbol id to name and base address
//! - [`LineTable`]: address-ordered line records pointing into the name table

pub mod lines;
pub mod names;
pub mod symbols;

pub use lines::{LineRecord, LineTable};
pub use names::NameTable;
pub use symbols::{Symbol, SymbolTable};

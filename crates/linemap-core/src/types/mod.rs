//! # Types
//!
//! Small value types shared by the tables, the builder and the resolver.

pub mod address;
pub mod ids;

// Re-export all public types
pub use address::Address;
pub use ids::{ModuleIdentity, SymbolId, OFFSET_UNKNOWN};

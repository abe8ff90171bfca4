//! Utility modules shared across the analysis engine:
//! - Error types for the host-facing boundary
//! - Symbol interning for array base names

pub mod errors;
pub mod intern;

pub use errors::{LoopDepError, LoopDepResult};
pub use intern::{intern, resolve, Symbol, SymbolInterner};

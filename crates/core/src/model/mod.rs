//! Lowered IR consumed by the analysis, and the records it produces.
//!
//! This module contains:
//! - `SourceLocation`, `AccessKind`, `AccessRecord`: what ends up in the list
//! - Declarations, expressions, statements, basic blocks and functions as the
//!   host compiler hands them over after whole-program analysis
//! - Loading of translation units from JSON/YAML

mod ir;
mod load;
mod location;

pub use ir::*;
pub use load::*;
pub use location::*;

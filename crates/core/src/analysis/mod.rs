//! The memory access analysis.
//!
//! - `oracle`: alias/escape queries and the bundled unit-level engine
//! - `reference`: splitting a memory reference into base + bit range
//! - `classify`: which assignment operands are worth reporting
//! - `calls`: calls to known string/memory primitives
//! - `walker`: visiting statements and feeding the sink

pub mod calls;
pub mod classify;
pub mod oracle;
pub mod reference;
pub mod walker;

pub use calls::{is_interesting_call, is_known_primitive, KNOWN_PRIMITIVES};
pub use classify::{Classification, ExprClassifier, SkipReason};
pub use oracle::{AliasOracle, FunctionAliasOracle, PointsToQuery, UnitAliasOracle};
pub use reference::{inner_reference, Base, InnerReference, BITS_PER_UNIT};
pub use walker::{FunctionSummary, StatementWalker};

pub mod analyze;
pub mod info;

pub use analyze::*;
pub use info::*;

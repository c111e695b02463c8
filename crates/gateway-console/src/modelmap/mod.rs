//! Model mapping sequences: persistence filtering, picker support, derived counts.

pub mod apply;
pub mod picker;
pub mod stats;

pub use apply::*;
pub use picker::*;
pub use stats::*;

//! Console helpers shared by the binary

pub mod progress;
pub mod styling;

pub use progress::*;
pub use styling::*;

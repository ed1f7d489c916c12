//! Data models

pub mod survey;
pub mod prediction;

pub use survey::*;
pub use prediction::*;

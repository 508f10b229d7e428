//! Type definitions for ccdaily

mod error;
mod usage;

pub use error::*;
pub use usage::*;

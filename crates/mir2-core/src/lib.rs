#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

mod error;
mod reader;

// Flat API hierarchy of common traits and types

pub use self::error::*;
pub use self::reader::*;

#![cfg_attr(doc, doc = include_str!("../README.md"))]

#[macro_use]
extern crate tracing;

mod archive;
mod error;
mod info;
mod library;

pub use self::archive::Wis;
pub use self::error::{WisError, WisErrorExt, WisErrorKind, WisResult};
pub use self::info::ImageInfo;
pub use self::library::ImageLibrary;

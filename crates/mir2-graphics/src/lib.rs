#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod palette;
pub mod rle;
pub mod texture;

mod rectangle;

pub use self::palette::Palette;
pub use self::texture::{Rgb8Image, Texture};

//! PPTX (Office Open XML) writer backend for slide deck generation.
//!
//! Produces a single-slide .pptx package: a ZIP archive of XML parts.

mod parts;
mod slide;
pub mod units;
pub mod writer;

pub use writer::{PptxWriter, WrittenDeck};

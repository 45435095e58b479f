//! Core slide description model and paragraph flattening
//! for slide deck generation.

pub mod color;
pub mod error;
pub mod flatten;
mod lenient;
pub mod types;

pub use error::{Error, Result};
pub use flatten::{
    BulletGlyph, ElementContent, FlattenedElement, Fragment, FragmentOptions, ParagraphFlattener,
    DEFAULT_FONT_FACE,
};
pub use types::{
    Alignment, Border, BoundingBox, Bullet, BulletKind, Paragraph, Run, ShapeKind,
    SlideDescription, SlideElement, SlideSize, TextStyle, Underline,
};

//! Domain types describing the content of a slide.
//!
//! Every type deserializes from camelCase JSON. Optional fields fall back to
//! defaults instead of failing, so a sparse description still loads. An
//! explicit `null`, or a value of the wrong type or range, counts as absent.

use crate::error::{Error, Result};
use crate::lenient;
use serde::{Deserialize, Serialize};

/// Slide description bundled with the crate, rendered when no input is given.
pub const SAMPLE_SLIDE_JSON: &str = include_str!("../assets/sample_slide.json");

/// Font size used when a run does not declare one, in points.
pub const DEFAULT_FONT_SIZE: f64 = 18.0;

/// Bullet character used when a bullet marker leaves it empty.
pub const DEFAULT_BULLET_CHAR: &str = "\u{2022}";

/// A complete description of the single slide to generate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideDescription {
    /// Document title, written to the package metadata.
    #[serde(default)]
    pub title: Option<String>,

    /// Slide dimensions.
    #[serde(default)]
    pub size: SlideSize,

    /// Background color (`RRGGBB` or `#RRGGBB`).
    #[serde(default)]
    pub background: Option<String>,

    /// Elements in paint order.
    #[serde(default)]
    pub elements: Vec<SlideElement>,
}

impl SlideDescription {
    /// Parse a description from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidDescription(e.to_string()))
    }

    /// Load the bundled sample slide.
    pub fn sample() -> Result<Self> {
        Self::from_json(SAMPLE_SLIDE_JSON)
    }
}

/// Slide dimensions in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideSize {
    pub width: f64,
    pub height: f64,
}

impl Default for SlideSize {
    /// 16:9 widescreen.
    fn default() -> Self {
        Self {
            width: 13.333,
            height: 7.5,
        }
    }
}

/// Position and size of an element, in inches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// A positioned box on the slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideElement {
    /// Identity of the element within the slide.
    pub id: u32,

    /// Where the element sits on the slide.
    #[serde(flatten)]
    pub bounds: BoundingBox,

    /// Element-level text styling, used for empty lines.
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub text_style: TextStyle,

    /// Horizontal alignment of every paragraph in the element.
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub align: Alignment,

    /// Preset geometry of the shape.
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub shape: ShapeKind,

    /// Solid fill color.
    #[serde(default)]
    pub fill: Option<String>,

    /// Outline.
    #[serde(default)]
    pub border: Option<Border>,

    /// Text content. Empty means the element is drawn as a plain shape.
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub paragraphs: Vec<Paragraph>,
}

/// Default text styling for an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    #[serde(deserialize_with = "lenient::font_size")]
    pub font_size: f64,
    #[serde(deserialize_with = "lenient::string")]
    pub color: String,
    #[serde(deserialize_with = "lenient::flag")]
    pub bold: bool,
    #[serde(deserialize_with = "lenient::flag")]
    pub italic: bool,
    #[serde(deserialize_with = "lenient::string")]
    pub font_face: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            color: String::new(),
            bold: false,
            italic: false,
            font_face: String::new(),
        }
    }
}

/// Outline drawn around an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Border {
    /// Line color (`RRGGBB` or `#RRGGBB`). Unreadable colors draw no line.
    #[serde(default, deserialize_with = "lenient::string")]
    pub color: String,

    /// Line thickness in points.
    #[serde(default = "default_border_thickness")]
    pub thickness: f64,
}

fn default_border_thickness() -> f64 {
    1.0
}

/// A logical line group inside an element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    /// Plain text of the paragraph. Informational only; runs are authoritative.
    #[serde(default, deserialize_with = "lenient::string")]
    pub text: String,

    /// Indent level applied to the bullet. Negative or fractional levels read as 0.
    #[serde(default, alias = "indentLevel", deserialize_with = "lenient::level")]
    pub level: u32,

    /// Bullet marker, if the paragraph is a list item.
    #[serde(default)]
    pub bullet: Option<Bullet>,

    /// Styled spans, in reading order.
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// Create a paragraph from runs, without a bullet.
    pub fn new(runs: Vec<Run>) -> Self {
        let text = runs.iter().map(|r| r.text.as_str()).collect();
        Self {
            text,
            level: 0,
            bullet: None,
            runs,
        }
    }

    /// Attach a bullet marker at the given indent level.
    pub fn with_bullet(mut self, bullet: Bullet, level: u32) -> Self {
        self.bullet = Some(bullet);
        self.level = level;
        self
    }
}

/// List marker of a paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bullet {
    /// Marker kind. Only character bullets exist.
    #[serde(default, rename = "type", deserialize_with = "lenient::null_as_default")]
    pub kind: BulletKind,

    /// Literal marker character.
    #[serde(default, rename = "char", deserialize_with = "lenient::string")]
    pub character: String,

    /// Font face of the marker character.
    #[serde(default, deserialize_with = "lenient::string")]
    pub font: String,
}

impl Bullet {
    /// Create a character bullet.
    pub fn character(character: impl Into<String>, font: impl Into<String>) -> Self {
        Self {
            kind: BulletKind::Char,
            character: character.into(),
            font: font.into(),
        }
    }
}

impl Default for Bullet {
    fn default() -> Self {
        Self::character(DEFAULT_BULLET_CHAR, "")
    }
}

/// Kind of bullet marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletKind {
    #[default]
    #[serde(rename = "char")]
    Char,
}

/// A contiguous span of styled text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Run {
    #[serde(deserialize_with = "lenient::string")]
    pub text: String,

    /// Font size in points.
    #[serde(deserialize_with = "lenient::font_size")]
    pub font_size: f64,

    /// Text color (`RRGGBB` or `#RRGGBB`).
    #[serde(deserialize_with = "lenient::string")]
    pub color: String,

    #[serde(deserialize_with = "lenient::flag")]
    pub bold: bool,
    #[serde(deserialize_with = "lenient::flag")]
    pub italic: bool,

    /// Font family. Empty selects the default face.
    #[serde(deserialize_with = "lenient::string")]
    pub font_face: String,

    #[serde(deserialize_with = "lenient::null_as_default")]
    pub underline: Underline,

    /// Baseline offset in percent; positive raises the text.
    #[serde(deserialize_with = "lenient::offset")]
    pub baseline: i32,

    /// Render a line break right after this run.
    #[serde(deserialize_with = "lenient::flag")]
    pub break_line: bool,
}

impl Default for Run {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: DEFAULT_FONT_SIZE,
            color: String::new(),
            bold: false,
            italic: false,
            font_face: String::new(),
            underline: Underline::None,
            baseline: 0,
            break_line: false,
        }
    }
}

impl Run {
    /// Create a run with default styling.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Mark this run as ending its line.
    pub fn with_break(mut self) -> Self {
        self.break_line = true;
        self
    }
}

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl From<String> for Alignment {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "center" | "ctr" => Self::Center,
            "right" | "r" => Self::Right,
            "justify" | "just" => Self::Justify,
            _ => Self::Left,
        }
    }
}

impl From<Alignment> for String {
    fn from(value: Alignment) -> Self {
        match value {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
        .to_string()
    }
}

/// Preset geometry of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShapeKind {
    #[default]
    Rect,
    RoundRect,
    Ellipse,
    Line,
}

impl From<String> for ShapeKind {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "roundrect" | "round_rect" | "rounded" => Self::RoundRect,
            "ellipse" | "oval" | "circle" => Self::Ellipse,
            "line" => Self::Line,
            _ => Self::Rect,
        }
    }
}

impl From<ShapeKind> for String {
    fn from(value: ShapeKind) -> Self {
        match value {
            ShapeKind::Rect => "rect",
            ShapeKind::RoundRect => "roundRect",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Line => "line",
        }
        .to_string()
    }
}

/// Underline style of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Underline {
    #[default]
    None,
    Single,
    Double,
}

impl From<String> for Underline {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "single" | "sng" => Self::Single,
            "double" | "dbl" => Self::Double,
            _ => Self::None,
        }
    }
}

impl From<Underline> for String {
    fn from(value: Underline) -> Self {
        match value {
            Underline::None => "none",
            Underline::Single => "single",
            Underline::Double => "double",
        }
        .to_string()
    }
}

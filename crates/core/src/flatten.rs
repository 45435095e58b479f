//! Paragraph flattening.
//!
//! Turns the paragraph/run tree of a slide element into the flat fragment
//! list a renderer consumes. Only the first run of a paragraph carries the
//! paragraph's bullet and indent; later runs are continuations. A paragraph
//! without runs becomes a single empty fragment that breaks the line, even
//! when it declares a bullet.

use crate::color::{normalize_hex_or, DEFAULT_TEXT_COLOR};
use crate::types::{
    Bullet, Paragraph, Run, SlideDescription, SlideElement, Underline, DEFAULT_BULLET_CHAR,
    DEFAULT_FONT_SIZE,
};
use serde::Serialize;

/// Font face used when a run leaves its face empty.
pub const DEFAULT_FONT_FACE: &str = "Arial";

/// One styled unit of text plus its layout flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    pub text: String,
    pub options: FragmentOptions,
}

impl Fragment {
    /// Whether this fragment starts a bulleted line.
    pub fn has_bullet(&self) -> bool {
        self.options.bullet.is_some()
    }

    /// Whether a line break follows this fragment.
    pub fn breaks_line(&self) -> bool {
        self.options.break_line
    }

    /// The empty line-breaking fragment emitted for a paragraph without runs.
    fn blank_line() -> Self {
        Self {
            text: String::new(),
            options: FragmentOptions {
                font_size: DEFAULT_FONT_SIZE,
                color: DEFAULT_TEXT_COLOR.to_string(),
                bold: false,
                italic: false,
                font_face: DEFAULT_FONT_FACE.to_string(),
                underline: Underline::None,
                baseline: 0,
                bullet: None,
                indent_level: 0,
                break_line: true,
            },
        }
    }
}

/// Rendering options attached to a fragment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentOptions {
    /// Font size in points.
    pub font_size: f64,

    /// Upper-case `RRGGBB`.
    pub color: String,

    pub bold: bool,
    pub italic: bool,
    pub font_face: String,
    pub underline: Underline,
    pub baseline: i32,

    /// Bullet glyph, present only on the first fragment of a bulleted paragraph.
    pub bullet: Option<BulletGlyph>,

    /// Indent level; zero unless `bullet` is set.
    pub indent_level: u32,

    pub break_line: bool,
}

/// The marker drawn in front of a bulleted line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletGlyph {
    pub character: String,
    pub font: Option<String>,
}

impl From<&Bullet> for BulletGlyph {
    fn from(bullet: &Bullet) -> Self {
        let character = if bullet.character.is_empty() {
            DEFAULT_BULLET_CHAR.to_string()
        } else {
            bullet.character.clone()
        };
        let font = Some(bullet.font.clone()).filter(|f| !f.is_empty());
        Self { character, font }
    }
}

/// What an element hands to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "fragments", rename_all = "camelCase")]
pub enum ElementContent {
    /// Text to lay out inside the element. Never empty.
    Text(Vec<Fragment>),
    /// The element has no paragraphs; draw the bare shape.
    ShapeOnly,
}

impl ElementContent {
    /// Fragments to render, empty for shape-only elements.
    pub fn fragments(&self) -> &[Fragment] {
        match self {
            ElementContent::Text(fragments) => fragments,
            ElementContent::ShapeOnly => &[],
        }
    }

    pub fn is_shape_only(&self) -> bool {
        matches!(self, ElementContent::ShapeOnly)
    }
}

/// A slide element paired with its flattened content.
#[derive(Debug, Clone, Serialize)]
pub struct FlattenedElement<'a> {
    pub element: &'a SlideElement,
    pub content: ElementContent,
}

/// Flattens paragraphs into renderable fragments.
#[derive(Debug, Clone)]
pub struct ParagraphFlattener {
    /// Face substituted when a run has none.
    default_font_face: String,
}

impl Default for ParagraphFlattener {
    fn default() -> Self {
        Self {
            default_font_face: DEFAULT_FONT_FACE.to_string(),
        }
    }
}

impl ParagraphFlattener {
    /// Create a flattener that falls back to [`DEFAULT_FONT_FACE`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different fallback font face. An empty name keeps the default.
    pub fn with_default_font_face(mut self, face: impl Into<String>) -> Self {
        let face = face.into();
        if !face.trim().is_empty() {
            self.default_font_face = face;
        }
        self
    }

    /// Flatten every element of a slide, in order.
    pub fn flatten_slide<'a>(&self, slide: &'a SlideDescription) -> Vec<FlattenedElement<'a>> {
        slide
            .elements
            .iter()
            .map(|element| FlattenedElement {
                element,
                content: self.flatten_element(element),
            })
            .collect()
    }

    /// Flatten one element.
    ///
    /// Returns [`ElementContent::ShapeOnly`] when the element has no
    /// paragraphs, otherwise a non-empty fragment list.
    pub fn flatten_element(&self, element: &SlideElement) -> ElementContent {
        if element.paragraphs.is_empty() {
            log::trace!("Element {} has no paragraphs, drawing shape only", element.id);
            return ElementContent::ShapeOnly;
        }

        let fragments: Vec<Fragment> = element
            .paragraphs
            .iter()
            .flat_map(|p| self.flatten_paragraph(p))
            .collect();

        log::trace!(
            "Element {} flattened into {} fragments",
            element.id,
            fragments.len()
        );

        ElementContent::Text(fragments)
    }

    /// Flatten one paragraph. Always yields at least one fragment.
    pub fn flatten_paragraph(&self, paragraph: &Paragraph) -> Vec<Fragment> {
        if paragraph.runs.is_empty() {
            return vec![Fragment::blank_line()];
        }

        paragraph
            .runs
            .iter()
            .enumerate()
            .map(|(idx, run)| {
                let lead = if idx == 0 { paragraph.bullet.as_ref() } else { None };
                let indent_level = if lead.is_some() { paragraph.level } else { 0 };
                self.fragment(run, lead.map(BulletGlyph::from), indent_level)
            })
            .collect()
    }

    fn fragment(&self, run: &Run, bullet: Option<BulletGlyph>, indent_level: u32) -> Fragment {
        let font_face = if run.font_face.trim().is_empty() {
            self.default_font_face.clone()
        } else {
            run.font_face.clone()
        };

        let font_size = if run.font_size.is_finite() && run.font_size > 0.0 {
            run.font_size
        } else {
            DEFAULT_FONT_SIZE
        };

        Fragment {
            text: run.text.clone(),
            options: FragmentOptions {
                font_size,
                color: normalize_hex_or(&run.color, DEFAULT_TEXT_COLOR),
                bold: run.bold,
                italic: run.italic,
                font_face,
                underline: run.underline,
                baseline: run.baseline,
                bullet,
                indent_level,
                break_line: run.break_line,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundingBox, SlideElement};

    fn element(paragraphs: Vec<Paragraph>) -> SlideElement {
        SlideElement {
            id: 1,
            bounds: BoundingBox {
                x: 0.5,
                y: 0.5,
                w: 4.0,
                h: 1.0,
            },
            text_style: Default::default(),
            align: Default::default(),
            shape: Default::default(),
            fill: None,
            border: None,
            paragraphs,
        }
    }

    fn texts(fragments: &[Fragment]) -> Vec<&str> {
        fragments.iter().map(|f| f.text.as_str()).collect()
    }

    #[test]
    fn test_single_plain_run() {
        let flattener = ParagraphFlattener::new();
        let content = flattener.flatten_element(&element(vec![Paragraph::new(vec![Run::new(
            "Hello",
        )])]));

        let fragments = content.fragments();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].text, "Hello");
        assert!(!fragments[0].has_bullet());
        assert_eq!(fragments[0].options.indent_level, 0);
        assert!(!fragments[0].breaks_line());
    }

    #[test]
    fn test_bullet_only_on_first_run() {
        let flattener = ParagraphFlattener::new();
        let paragraph = Paragraph::new(vec![Run::new("A"), Run::new("B"), Run::new("C")])
            .with_bullet(Bullet::default(), 1);

        let fragments = flattener.flatten_paragraph(&paragraph);

        assert_eq!(texts(&fragments), vec!["A", "B", "C"]);
        assert!(fragments[0].has_bullet());
        assert_eq!(fragments[0].options.indent_level, 1);
        for fragment in &fragments[1..] {
            assert!(!fragment.has_bullet());
            assert_eq!(fragment.options.indent_level, 0);
        }
    }

    #[test]
    fn test_no_bullet_means_no_bullet_anywhere() {
        let flattener = ParagraphFlattener::new();
        let mut paragraph = Paragraph::new(vec![Run::new("x"), Run::new("y")]);
        paragraph.level = 3;

        let fragments = flattener.flatten_paragraph(&paragraph);

        assert!(fragments.iter().all(|f| !f.has_bullet()));
        assert!(fragments.iter().all(|f| f.options.indent_level == 0));
    }

    #[test]
    fn test_empty_paragraph_is_blank_line() {
        let flattener = ParagraphFlattener::new();
        let fragments = flattener.flatten_paragraph(&Paragraph::default());

        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].text, "");
        assert!(fragments[0].breaks_line());
        assert!(!fragments[0].has_bullet());
        assert_eq!(fragments[0].options.indent_level, 0);
    }

    #[test]
    fn test_empty_paragraph_drops_declared_bullet() {
        let flattener = ParagraphFlattener::new();
        let paragraph = Paragraph::new(Vec::new()).with_bullet(Bullet::default(), 2);

        let fragments = flattener.flatten_paragraph(&paragraph);

        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].breaks_line());
        assert!(!fragments[0].has_bullet());
        assert_eq!(fragments[0].options.indent_level, 0);
    }

    #[test]
    fn test_break_flag_follows_each_run() {
        let flattener = ParagraphFlattener::new();
        let paragraph = Paragraph::new(vec![
            Run::new("first").with_break(),
            Run::new("second"),
            Run::new("third").with_break(),
        ])
        .with_bullet(Bullet::default(), 0);

        let breaks: Vec<bool> = flattener
            .flatten_paragraph(&paragraph)
            .iter()
            .map(|f| f.breaks_line())
            .collect();

        assert_eq!(breaks, vec![true, false, true]);
    }

    #[test]
    fn test_concatenation_preserves_order() {
        let flattener = ParagraphFlattener::new();
        let p1 = Paragraph::new(vec![Run::new("one"), Run::new("two")])
            .with_bullet(Bullet::default(), 0);
        let p2 = Paragraph::default();
        let p3 = Paragraph::new(vec![Run::new("three").with_break()]);

        let whole = flattener.flatten_element(&element(vec![p1.clone(), p2.clone(), p3.clone()]));

        let mut pieces = flattener.flatten_paragraph(&p1);
        pieces.extend(flattener.flatten_paragraph(&p2));
        pieces.extend(flattener.flatten_paragraph(&p3));

        assert_eq!(whole, ElementContent::Text(pieces));
        assert_eq!(texts(whole.fragments()), vec!["one", "two", "", "three"]);
    }

    #[test]
    fn test_no_paragraphs_is_shape_only() {
        let flattener = ParagraphFlattener::new();
        let content = flattener.flatten_element(&element(Vec::new()));

        assert_eq!(content, ElementContent::ShapeOnly);
        assert!(content.is_shape_only());
        assert!(content.fragments().is_empty());
    }

    #[test]
    fn test_only_blank_paragraphs_still_produce_text() {
        let flattener = ParagraphFlattener::new();
        let content =
            flattener.flatten_element(&element(vec![Paragraph::default(), Paragraph::default()]));

        assert!(!content.is_shape_only());
        assert_eq!(content.fragments().len(), 2);
    }

    #[test]
    fn test_run_styling_and_face_fallback() {
        let flattener = ParagraphFlattener::new();
        let run = Run {
            text: "Styled".to_string(),
            font_size: 24.0,
            color: "#c00000".to_string(),
            bold: true,
            italic: true,
            underline: Underline::Single,
            baseline: 30,
            ..Run::default()
        };

        let fragments = flattener.flatten_paragraph(&Paragraph::new(vec![run]));
        let options = &fragments[0].options;

        assert_eq!(options.font_size, 24.0);
        assert_eq!(options.color, "C00000");
        assert!(options.bold);
        assert!(options.italic);
        assert_eq!(options.font_face, DEFAULT_FONT_FACE);
        assert_eq!(options.underline, Underline::Single);
        assert_eq!(options.baseline, 30);
    }

    #[test]
    fn test_custom_default_face() {
        let flattener = ParagraphFlattener::new().with_default_font_face("Calibri");
        let fragments = flattener.flatten_paragraph(&Paragraph::new(vec![Run::new("x")]));
        assert_eq!(fragments[0].options.font_face, "Calibri");

        let flattener = ParagraphFlattener::new().with_default_font_face("  ");
        let fragments = flattener.flatten_paragraph(&Paragraph::new(vec![Run::new("x")]));
        assert_eq!(fragments[0].options.font_face, DEFAULT_FONT_FACE);
    }

    #[test]
    fn test_declared_face_is_kept() {
        let flattener = ParagraphFlattener::new();
        let run = Run {
            font_face: "Georgia".to_string(),
            ..Run::new("serif")
        };
        let fragments = flattener.flatten_paragraph(&Paragraph::new(vec![run]));
        assert_eq!(fragments[0].options.font_face, "Georgia");
    }

    #[test]
    fn test_bullet_glyph_defaults() {
        let flattener = ParagraphFlattener::new();
        let paragraph = Paragraph::new(vec![Run::new("item")])
            .with_bullet(Bullet::character("", ""), 0);

        let fragments = flattener.flatten_paragraph(&paragraph);
        let glyph = fragments[0].options.bullet.as_ref().unwrap();

        assert_eq!(glyph.character, DEFAULT_BULLET_CHAR);
        assert_eq!(glyph.font, None);
    }

    #[test]
    fn test_bullet_glyph_keeps_declared_marker() {
        let flattener = ParagraphFlattener::new();
        let paragraph = Paragraph::new(vec![Run::new("item")])
            .with_bullet(Bullet::character("\u{2713}", "Segoe UI Symbol"), 1);

        let fragments = flattener.flatten_paragraph(&paragraph);
        let glyph = fragments[0].options.bullet.as_ref().unwrap();

        assert_eq!(glyph.character, "\u{2713}");
        assert_eq!(glyph.font.as_deref(), Some("Segoe UI Symbol"));
    }

    #[test]
    fn test_unreadable_size_and_color_fall_back() {
        let flattener = ParagraphFlattener::new();
        let run = Run {
            font_size: -4.0,
            color: "purple".to_string(),
            ..Run::new("x")
        };
        let fragments = flattener.flatten_paragraph(&Paragraph::new(vec![run]));

        assert_eq!(fragments[0].options.font_size, DEFAULT_FONT_SIZE);
        assert_eq!(fragments[0].options.color, DEFAULT_TEXT_COLOR);
    }

    #[test]
    fn test_flatten_slide_keeps_element_order() {
        let flattener = ParagraphFlattener::new();
        let slide = SlideDescription::sample().unwrap();

        let flattened = flattener.flatten_slide(&slide);

        let ids: Vec<u32> = flattened.iter().map(|f| f.element.id).collect();
        let expected: Vec<u32> = slide.elements.iter().map(|e| e.id).collect();
        assert_eq!(ids, expected);
        for f in &flattened {
            assert_eq!(f.content.is_shape_only(), f.element.paragraphs.is_empty());
        }
    }

    #[test]
    fn test_source_is_not_mutated() {
        let flattener = ParagraphFlattener::new();
        let slide = SlideDescription::sample().unwrap();
        let before = slide.clone();

        let _ = flattener.flatten_slide(&slide);

        assert_eq!(slide, before);
    }
}

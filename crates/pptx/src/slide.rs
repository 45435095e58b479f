//! Slide part generation.
//!
//! Lays flattened elements out as DrawingML shapes. Fragments are grouped
//! into `<a:p>` paragraphs: a paragraph ends right after a fragment that
//! breaks the line, and a bulleted fragment opens a new one.
//!
//! A vertical tab inside run text is a soft line break (`<a:br/>`). Other
//! characters XML 1.0 cannot carry are dropped.

use crate::units::{
    baseline_to_drawingml, extent_to_emu, font_size_to_centipoints, inches_to_emu, points_to_emu,
};
use deck_core::color::normalize_hex;
use deck_core::{
    Alignment, ElementContent, Error, FlattenedElement, Fragment, FragmentOptions, Result,
    ShapeKind, SlideDescription, SlideElement, Underline,
};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::borrow::Cow;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

/// Left margin added per bullet indent level, in EMU (0.375").
const BULLET_MARGIN_EMU: i64 = 342_900;

/// Default body insets, in EMU.
const INSET_LR_EMU: &str = "91440";
const INSET_TB_EMU: &str = "45720";

/// Shape id of the slide's group shape; element shapes are numbered after it.
const SP_TREE_ID: u32 = 1;

/// Soft line break inside a run.
const VERTICAL_TAB: char = '\u{000B}';

/// Render `ppt/slides/slide1.xml`.
pub(crate) fn slide_xml(slide: &SlideDescription, elements: &[FlattenedElement<'_>]) -> Result<String> {
    let mut xml = XmlBuilder::new();

    xml.decl()?;
    xml.start(
        "p:sld",
        &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P)],
    )?;
    xml.start("p:cSld", &[])?;

    if let Some(color) = slide.background.as_deref().and_then(normalize_hex) {
        xml.start("p:bg", &[])?;
        xml.start("p:bgPr", &[])?;
        solid_fill(&mut xml, &color)?;
        xml.empty("a:effectLst", &[])?;
        xml.end("p:bgPr")?;
        xml.end("p:bg")?;
    }

    xml.start("p:spTree", &[])?;
    write_group_header(&mut xml)?;

    for (idx, flattened) in elements.iter().enumerate() {
        write_shape(&mut xml, idx, flattened.element, &flattened.content)?;
    }

    xml.end("p:spTree")?;
    xml.end("p:cSld")?;
    xml.start("p:clrMapOvr", &[])?;
    xml.empty("a:masterClrMapping", &[])?;
    xml.end("p:clrMapOvr")?;
    xml.end("p:sld")?;

    xml.finish()
}

/// Split fragments into the runs of each rendered paragraph.
pub(crate) fn group_lines(fragments: &[Fragment]) -> Vec<&[Fragment]> {
    let mut lines = Vec::new();
    let mut start = 0;

    for (idx, fragment) in fragments.iter().enumerate() {
        if fragment.has_bullet() && idx > start {
            lines.push(&fragments[start..idx]);
            start = idx;
        }
        if fragment.breaks_line() {
            lines.push(&fragments[start..=idx]);
            start = idx + 1;
        }
    }

    if start < fragments.len() {
        lines.push(&fragments[start..]);
    }

    lines
}

fn write_group_header(xml: &mut XmlBuilder) -> Result<()> {
    let id = SP_TREE_ID.to_string();
    xml.start("p:nvGrpSpPr", &[])?;
    xml.empty("p:cNvPr", &[("id", id.as_str()), ("name", "")])?;
    xml.empty("p:cNvGrpSpPr", &[])?;
    xml.empty("p:nvPr", &[])?;
    xml.end("p:nvGrpSpPr")?;

    xml.start("p:grpSpPr", &[])?;
    xml.start("a:xfrm", &[])?;
    xml.empty("a:off", &[("x", "0"), ("y", "0")])?;
    xml.empty("a:ext", &[("cx", "0"), ("cy", "0")])?;
    xml.empty("a:chOff", &[("x", "0"), ("y", "0")])?;
    xml.empty("a:chExt", &[("cx", "0"), ("cy", "0")])?;
    xml.end("a:xfrm")?;
    xml.end("p:grpSpPr")
}

fn write_shape(
    xml: &mut XmlBuilder,
    idx: usize,
    element: &SlideElement,
    content: &ElementContent,
) -> Result<()> {
    // Numbered by paint order; element ids may repeat.
    let shape_id = (idx as u64 + u64::from(SP_TREE_ID) + 1).to_string();
    let name = match content {
        ElementContent::Text(_) => format!("Text {}", element.id),
        ElementContent::ShapeOnly => format!("Shape {}", element.id),
    };

    xml.start("p:sp", &[])?;
    xml.start("p:nvSpPr", &[])?;
    xml.empty("p:cNvPr", &[("id", shape_id.as_str()), ("name", name.as_str())])?;
    if content.is_shape_only() {
        xml.empty("p:cNvSpPr", &[])?;
    } else {
        xml.empty("p:cNvSpPr", &[("txBox", "1")])?;
    }
    xml.empty("p:nvPr", &[])?;
    xml.end("p:nvSpPr")?;

    write_shape_properties(xml, element)?;

    if let ElementContent::Text(fragments) = content {
        write_text_body(xml, element, fragments)?;
    }

    xml.end("p:sp")
}

fn write_shape_properties(xml: &mut XmlBuilder, element: &SlideElement) -> Result<()> {
    let bounds = &element.bounds;
    let x = inches_to_emu(bounds.x).to_string();
    let y = inches_to_emu(bounds.y).to_string();
    let cx = extent_to_emu(bounds.w).to_string();
    let cy = extent_to_emu(bounds.h).to_string();

    xml.start("p:spPr", &[])?;
    xml.start("a:xfrm", &[])?;
    xml.empty("a:off", &[("x", x.as_str()), ("y", y.as_str())])?;
    xml.empty("a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    xml.end("a:xfrm")?;

    xml.start("a:prstGeom", &[("prst", preset_geometry(element.shape))])?;
    xml.empty("a:avLst", &[])?;
    xml.end("a:prstGeom")?;

    match element.fill.as_deref().and_then(normalize_hex) {
        Some(color) => solid_fill(xml, &color)?,
        None => xml.empty("a:noFill", &[])?,
    }

    let border = element
        .border
        .as_ref()
        .and_then(|b| normalize_hex(&b.color).map(|color| (color, b.thickness)));
    match border {
        Some((color, thickness)) => {
            let w = points_to_emu(thickness).to_string();
            xml.start("a:ln", &[("w", w.as_str())])?;
            solid_fill(xml, &color)?;
            xml.end("a:ln")?;
        }
        None => {
            xml.start("a:ln", &[])?;
            xml.empty("a:noFill", &[])?;
            xml.end("a:ln")?;
        }
    }

    xml.end("p:spPr")
}

fn write_text_body(xml: &mut XmlBuilder, element: &SlideElement, fragments: &[Fragment]) -> Result<()> {
    xml.start("p:txBody", &[])?;
    xml.start(
        "a:bodyPr",
        &[
            ("wrap", "square"),
            ("lIns", INSET_LR_EMU),
            ("tIns", INSET_TB_EMU),
            ("rIns", INSET_LR_EMU),
            ("bIns", INSET_TB_EMU),
            ("rtlCol", "0"),
            ("anchor", "t"),
        ],
    )?;
    xml.empty("a:normAutofit", &[])?;
    xml.end("a:bodyPr")?;
    xml.empty("a:lstStyle", &[])?;

    for line in group_lines(fragments) {
        write_paragraph(xml, element, line)?;
    }

    xml.end("p:txBody")
}

fn write_paragraph(xml: &mut XmlBuilder, element: &SlideElement, line: &[Fragment]) -> Result<()> {
    let algn = alignment_code(element.align);
    xml.start("a:p", &[])?;

    match line.first().and_then(|f| f.options.bullet.as_ref().map(|b| (f, b))) {
        Some((lead, glyph)) => {
            let level = lead.options.indent_level;
            let lvl = level.min(8).to_string();
            let mar_l = (BULLET_MARGIN_EMU * (i64::from(level) + 1)).to_string();
            let indent = (-BULLET_MARGIN_EMU).to_string();
            xml.start(
                "a:pPr",
                &[
                    ("marL", mar_l.as_str()),
                    ("lvl", lvl.as_str()),
                    ("indent", indent.as_str()),
                    ("algn", algn),
                ],
            )?;
            if let Some(font) = glyph.font.as_deref() {
                xml.empty("a:buFont", &[("typeface", font)])?;
            }
            xml.empty("a:buChar", &[("char", glyph.character.as_str())])?;
            xml.end("a:pPr")?;
        }
        None => {
            xml.start("a:pPr", &[("algn", algn)])?;
            xml.empty("a:buNone", &[])?;
            xml.end("a:pPr")?;
        }
    }

    for fragment in line.iter().filter(|f| !f.text.is_empty()) {
        write_run(xml, fragment)?;
    }

    // Size the paragraph mark like its last run so blank lines keep their height.
    let end_size = line
        .last()
        .filter(|f| !f.text.is_empty())
        .map(|f| f.options.font_size)
        .unwrap_or(element.text_style.font_size);
    let sz = font_size_to_centipoints(end_size).to_string();
    xml.empty(
        "a:endParaRPr",
        &[("lang", "en-US"), ("sz", sz.as_str()), ("dirty", "0")],
    )?;

    xml.end("a:p")
}

fn write_run(xml: &mut XmlBuilder, fragment: &Fragment) -> Result<()> {
    for (i, segment) in fragment.text.split(VERTICAL_TAB).enumerate() {
        if i > 0 {
            xml.start("a:br", &[])?;
            write_run_properties(xml, &fragment.options)?;
            xml.end("a:br")?;
        }
        if segment.is_empty() {
            continue;
        }
        xml.start("a:r", &[])?;
        write_run_properties(xml, &fragment.options)?;
        xml.start("a:t", &[])?;
        xml.text(segment)?;
        xml.end("a:t")?;
        xml.end("a:r")?;
    }
    Ok(())
}

fn write_run_properties(xml: &mut XmlBuilder, options: &FragmentOptions) -> Result<()> {
    let sz = font_size_to_centipoints(options.font_size).to_string();
    let baseline = baseline_to_drawingml(options.baseline).to_string();

    let mut attrs: Vec<(&str, &str)> = vec![("lang", "en-US"), ("sz", sz.as_str())];
    if options.bold {
        attrs.push(("b", "1"));
    }
    if options.italic {
        attrs.push(("i", "1"));
    }
    match options.underline {
        Underline::None => {}
        Underline::Single => attrs.push(("u", "sng")),
        Underline::Double => attrs.push(("u", "dbl")),
    }
    if options.baseline != 0 {
        attrs.push(("baseline", baseline.as_str()));
    }
    attrs.push(("dirty", "0"));

    xml.start("a:rPr", &attrs)?;
    solid_fill(xml, &options.color)?;
    xml.empty("a:latin", &[("typeface", options.font_face.as_str())])?;
    xml.empty("a:cs", &[("typeface", options.font_face.as_str())])?;
    xml.end("a:rPr")
}

fn solid_fill(xml: &mut XmlBuilder, color: &str) -> Result<()> {
    xml.start("a:solidFill", &[])?;
    xml.empty("a:srgbClr", &[("val", color)])?;
    xml.end("a:solidFill")
}

fn preset_geometry(shape: ShapeKind) -> &'static str {
    match shape {
        ShapeKind::Rect => "rect",
        ShapeKind::RoundRect => "roundRect",
        ShapeKind::Ellipse => "ellipse",
        ShapeKind::Line => "line",
    }
}

fn alignment_code(align: Alignment) -> &'static str {
    match align {
        Alignment::Left => "l",
        Alignment::Center => "ctr",
        Alignment::Right => "r",
        Alignment::Justify => "just",
    }
}

/// Drop characters XML 1.0 does not allow, keeping tab, newline and CR.
fn xml_safe(text: &str) -> Cow<'_, str> {
    fn allowed(c: char) -> bool {
        !matches!(
            c,
            '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
        )
    }

    if text.chars().all(allowed) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|c| allowed(*c)).collect())
    }
}

/// Thin wrapper over the quick-xml writer that maps its errors into ours.
/// Text and attribute values pass through [`xml_safe`].
pub(crate) struct XmlBuilder {
    writer: Writer<Vec<u8>>,
}

impl XmlBuilder {
    pub(crate) fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    pub(crate) fn decl(&mut self) -> Result<()> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
    }

    pub(crate) fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let elem = Self::element(name, attrs);
        self.write(Event::Start(elem))
    }

    pub(crate) fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let elem = Self::element(name, attrs);
        self.write(Event::Empty(elem))
    }

    pub(crate) fn end(&mut self, name: &str) -> Result<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    pub(crate) fn text(&mut self, text: &str) -> Result<()> {
        let text = xml_safe(text);
        self.write(Event::Text(BytesText::new(&text)))
    }

    pub(crate) fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| Error::XmlError(format!("Generated XML is not UTF-8: {}", e)))
    }

    fn element<'a>(name: &'a str, attrs: &[(&str, &str)]) -> BytesStart<'a> {
        let mut elem = BytesStart::new(name);
        for (key, value) in attrs {
            elem.push_attribute((*key, xml_safe(value).as_ref()));
        }
        elem
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::XmlError(e.to_string()))
    }
}

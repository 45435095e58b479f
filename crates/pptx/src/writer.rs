//! PPTX package writer.

use crate::parts;
use crate::slide::slide_xml;
use deck_core::{Error, ParagraphFlattener, Result, SlideDescription};
use std::fs::File;
use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Summary of a deck written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenDeck {
    /// Where the deck was written.
    pub path: PathBuf,
    /// Number of shapes placed on the slide.
    pub shape_count: usize,
    /// Size of the file in bytes.
    pub bytes: u64,
}

/// Writes a slide description as a single-slide PPTX package.
pub struct PptxWriter {
    flattener: ParagraphFlattener,
}

impl PptxWriter {
    /// Create a writer using the default paragraph flattener.
    pub fn new() -> Self {
        Self {
            flattener: ParagraphFlattener::new(),
        }
    }

    /// Use a configured flattener, e.g. one with a different fallback face.
    pub fn with_flattener(mut self, flattener: ParagraphFlattener) -> Self {
        self.flattener = flattener;
        self
    }

    /// Write the deck to a file, replacing any existing one.
    ///
    /// The package is rendered in memory first, so a rendering failure leaves
    /// an existing file untouched.
    pub fn save(&self, slide: &SlideDescription, path: impl AsRef<Path>) -> Result<WrittenDeck> {
        let path = path.as_ref();
        let package = self.to_bytes(slide)?;

        let mut file = File::create(path)?;
        file.write_all(&package)?;
        file.sync_all()?;
        let bytes = package.len() as u64;

        log::info!("Wrote {} ({} bytes)", path.display(), bytes);

        Ok(WrittenDeck {
            path: path.to_path_buf(),
            shape_count: slide.elements.len(),
            bytes,
        })
    }

    /// Serialize the deck into memory.
    pub fn to_bytes(&self, slide: &SlideDescription) -> Result<Vec<u8>> {
        let cursor = self.write_to(slide, Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }

    /// Write the deck to any seekable sink, returning the sink when done.
    pub fn write_to<W: Write + Seek>(&self, slide: &SlideDescription, sink: W) -> Result<W> {
        let flattened = self.flattener.flatten_slide(slide);
        let text_boxes = flattened
            .iter()
            .filter(|f| !f.content.is_shape_only())
            .count();
        log::debug!(
            "Rendering {} elements ({} with text)",
            flattened.len(),
            text_boxes
        );

        let slide_part = slide_xml(slide, &flattened)?;
        let presentation_part = parts::presentation_xml(slide.size);
        let core_part = parts::core_props_xml(slide.title.as_deref());
        let app_part = parts::app_props_xml();

        let entries: [(&str, &str); 15] = [
            (parts::CONTENT_TYPES_PATH, parts::CONTENT_TYPES_XML),
            (parts::ROOT_RELS_PATH, parts::ROOT_RELS_XML),
            (parts::CORE_PROPS_PATH, core_part.as_str()),
            (parts::APP_PROPS_PATH, app_part.as_str()),
            (parts::PRESENTATION_PATH, presentation_part.as_str()),
            (parts::PRESENTATION_RELS_PATH, parts::PRESENTATION_RELS_XML),
            (parts::PRES_PROPS_PATH, parts::PRES_PROPS_XML),
            (parts::VIEW_PROPS_PATH, parts::VIEW_PROPS_XML),
            (parts::TABLE_STYLES_PATH, parts::TABLE_STYLES_XML),
            (parts::THEME_PATH, parts::THEME_XML),
            (parts::MASTER_PATH, parts::MASTER_XML),
            (parts::MASTER_RELS_PATH, parts::MASTER_RELS_XML),
            (parts::LAYOUT_PATH, parts::LAYOUT_XML),
            (parts::LAYOUT_RELS_PATH, parts::LAYOUT_RELS_XML),
            (parts::SLIDE_PATH, slide_part.as_str()),
        ];

        let mut zip = ZipWriter::new(sink);
        for (path, content) in entries {
            write_entry(&mut zip, path, content)?;
        }
        write_entry(&mut zip, parts::SLIDE_RELS_PATH, parts::SLIDE_RELS_XML)?;

        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))
    }
}

impl Default for PptxWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Add one deflated entry to the archive.
fn write_entry<W: Write + Seek>(zip: &mut ZipWriter<W>, path: &str, content: &str) -> Result<()> {
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(path, options)
        .map_err(|e| Error::ZipError(format!("Failed to start '{}': {}", path, e)))?;
    zip.write_all(content.as_bytes())
        .map_err(|e| Error::ZipError(format!("Failed to write '{}': {}", path, e)))?;

    log::trace!("Packed {} ({} bytes)", path, content.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_entry(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_package_contains_required_parts() {
        let slide = SlideDescription::sample().unwrap();
        let bytes = PptxWriter::new().to_bytes(&slide).unwrap();

        let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<&str> = archive.file_names().collect();

        for required in [
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/core.xml",
            "docProps/app.xml",
            "ppt/presentation.xml",
            "ppt/_rels/presentation.xml.rels",
            "ppt/slides/slide1.xml",
            "ppt/slides/_rels/slide1.xml.rels",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            "ppt/theme/theme1.xml",
        ] {
            assert!(names.contains(&required), "missing {}", required);
        }
    }

    #[test]
    fn test_content_types_written_first() {
        let slide = SlideDescription::sample().unwrap();
        let bytes = PptxWriter::new().to_bytes(&slide).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        assert_eq!(archive.by_index(0).unwrap().name(), "[Content_Types].xml");
    }

    #[test]
    fn test_slide_part_carries_fragment_text() {
        let slide = SlideDescription::sample().unwrap();
        let bytes = PptxWriter::new().to_bytes(&slide).unwrap();
        let xml = read_entry(&bytes, "ppt/slides/slide1.xml");

        assert!(xml.contains("<a:t>Quarterly Platform Review</a:t>"));
        assert!(xml.contains("<a:t>Latency down </a:t>"));
        assert!(xml.contains("<a:t>99.98</a:t>"));
    }

    #[test]
    fn test_title_written_to_core_properties() {
        let slide = SlideDescription::sample().unwrap();
        let bytes = PptxWriter::new().to_bytes(&slide).unwrap();
        let xml = read_entry(&bytes, "docProps/core.xml");

        assert!(xml.contains("<dc:title>Quarterly Platform Review</dc:title>"));
    }

    #[test]
    fn test_custom_flattener_face_reaches_slide() {
        let slide = SlideDescription::from_json(
            r#"{ "elements": [ { "id": 1, "x": 0, "y": 0, "w": 2, "h": 1,
                 "paragraphs": [ { "runs": [ { "text": "plain" } ] } ] } ] }"#,
        )
        .unwrap();
        let writer = PptxWriter::new()
            .with_flattener(ParagraphFlattener::new().with_default_font_face("Verdana"));
        let bytes = writer.to_bytes(&slide).unwrap();
        let xml = read_entry(&bytes, "ppt/slides/slide1.xml");

        assert!(xml.contains(r#"<a:latin typeface="Verdana"/>"#));
    }

    #[test]
    fn test_empty_slide_still_packages() {
        let slide = SlideDescription::from_json("{}").unwrap();
        let bytes = PptxWriter::new().to_bytes(&slide).unwrap();
        let xml = read_entry(&bytes, "ppt/slides/slide1.xml");

        assert!(xml.contains("<p:spTree>"));
        assert!(!xml.contains("<p:sp>"));
    }

    #[test]
    fn test_save_reports_written_deck() {
        let slide = SlideDescription::sample().unwrap();
        let path = std::env::temp_dir().join(format!("deck-pptx-save-{}.pptx", std::process::id()));

        let written = PptxWriter::new().save(&slide, &path).unwrap();

        assert_eq!(written.path, path);
        assert_eq!(written.shape_count, slide.elements.len());
        assert_eq!(written.bytes, std::fs::metadata(&path).unwrap().len());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_save_replaces_existing_file_with_rendered_package() {
        let slide = SlideDescription::sample().unwrap();
        let path =
            std::env::temp_dir().join(format!("deck-pptx-replace-{}.pptx", std::process::id()));
        std::fs::write(&path, vec![b'x'; 1 << 20]).unwrap();

        let writer = PptxWriter::new();
        let written = writer.save(&slide, &path).unwrap();
        let on_disk = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(written.bytes, on_disk.len() as u64);
        assert!(on_disk.len() < 1 << 20);
        assert_eq!(
            read_entry(&on_disk, "ppt/slides/slide1.xml"),
            read_entry(&writer.to_bytes(&slide).unwrap(), "ppt/slides/slide1.xml")
        );
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let slide = SlideDescription::sample().unwrap();
        let path = std::env::temp_dir()
            .join("deck-pptx-missing-dir")
            .join("nested")
            .join("slide.pptx");

        let err = PptxWriter::new().save(&slide, &path).unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
    }
}

//! CLI tool for generating a PowerPoint slide from a slide description.

use anyhow::{Context, Result};
use clap::Parser;
use deck_core::{ParagraphFlattener, SlideDescription};
use deck_pptx::{PptxWriter, WrittenDeck};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Output file written when no path is given.
const DEFAULT_OUTPUT: &str = "slide.pptx";

/// Generate a single-slide PowerPoint deck from a JSON slide description.
#[derive(Parser, Debug)]
#[command(name = "slide-deck")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Slide description (.json). Defaults to the bundled sample slide
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Font face used for runs that declare none
    #[arg(long)]
    default_font: Option<String>,

    /// Print the flattened text fragments as JSON instead of writing a deck
    #[arg(long)]
    dump_fragments: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let slide = match load_description(args.input.as_deref()) {
        Ok(slide) => slide,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut flattener = ParagraphFlattener::new();
    if let Some(face) = &args.default_font {
        flattener = flattener.with_default_font_face(face.as_str());
    }

    if args.dump_fragments {
        return match dump_fragments(&slide, &flattener) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {:#}", e);
                ExitCode::FAILURE
            }
        };
    }

    report(write_deck(&slide, flattener, &args.output))
}

/// Load the slide description from a file, or the bundled sample.
fn load_description(input: Option<&Path>) -> Result<SlideDescription> {
    let slide = match input {
        Some(path) => {
            log::debug!("Reading slide description from {}", path.display());
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            SlideDescription::from_json(&json)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        }
        None => {
            log::debug!("Using bundled sample slide");
            SlideDescription::sample().context("Bundled sample slide is invalid")?
        }
    };

    log::debug!("Loaded {} elements", slide.elements.len());
    Ok(slide)
}

/// Flatten every element and render the result as pretty JSON.
fn dump_fragments(slide: &SlideDescription, flattener: &ParagraphFlattener) -> Result<String> {
    let flattened = flattener.flatten_slide(slide);
    serde_json::to_string_pretty(&flattened).context("Failed to serialize fragments")
}

/// Render and write the deck. The outcome is reported once by the caller.
fn write_deck(
    slide: &SlideDescription,
    flattener: ParagraphFlattener,
    output: &Path,
) -> Result<WrittenDeck> {
    let writer = PptxWriter::new().with_flattener(flattener);
    let written = writer
        .save(slide, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(written)
}

/// Report the write outcome on the terminal.
fn report(outcome: Result<WrittenDeck>) -> ExitCode {
    match outcome {
        Ok(written) => {
            println!("Presentation written to {}", written.path.display());
            log::debug!(
                "{} shapes, {} bytes",
                written.shape_count,
                written.bytes
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to write presentation: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_default_output_path() {
        let args = Args::parse_from(["slide-deck"]);
        assert_eq!(args.output, PathBuf::from("slide.pptx"));
        assert!(args.input.is_none());
        assert!(!args.dump_fragments);
    }

    #[test]
    fn test_load_bundled_sample() {
        let slide = load_description(None).unwrap();
        assert!(!slide.elements.is_empty());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = load_description(Some(Path::new("/nonexistent/slide.json"))).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read"));
    }

    #[test]
    fn test_dump_fragments_marks_shape_only() {
        let slide = load_description(None).unwrap();
        let json = dump_fragments(&slide, &ParagraphFlattener::new()).unwrap();

        assert!(json.contains(r#""kind": "shapeOnly""#));
        assert!(json.contains(r#""kind": "text""#));
        assert!(json.contains(r#""breakLine": true"#));
    }

    #[test]
    fn test_write_deck_failure_is_reported() {
        let slide = load_description(None).unwrap();
        let outcome = write_deck(
            &slide,
            ParagraphFlattener::new(),
            Path::new("/nonexistent/dir/slide.pptx"),
        );

        let message = format!("{:#}", outcome.unwrap_err());
        assert!(message.contains("Failed to write /nonexistent/dir/slide.pptx"));
    }
}

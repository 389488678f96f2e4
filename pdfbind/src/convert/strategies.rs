//! Conversion strategies.
//!
//! Each strategy maps input bytes to output bytes. They are synchronous
//! and CPU-bound; callers run them on a blocking thread.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use regex::Regex;
use std::sync::LazyLock;

use super::dispatcher::Strategy;
use crate::compose::pages::add_generated_page;
use crate::error::{PdfBindError, Result};
use crate::toc::render::{add_content_stream, add_font_resources};
use crate::toc::{FontFace, PageGeometry, Point, Primitive, Rgb, text_width};

const TEXT_FONT_SIZE: f32 = 12.0;
const TEXT_LINE_HEIGHT: f32 = 18.0;
const OUTPUT_VERSION: &str = "1.7";

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").expect("valid regex"));
static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("valid regex"));
static HEADING_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#+ ").expect("valid regex"));

impl Strategy {
    /// Run the strategy over `input`.
    ///
    /// # Errors
    ///
    /// Returns an error when the input cannot be decoded or the output
    /// document cannot be serialized.
    pub fn apply(&self, input: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::ImageCopy => Ok(input.to_vec()),
            Self::ImageToPdf => image_to_pdf(input),
            Self::MarkdownToPdf => render_text_pdf(&markdown_lines(&decode_text(input))),
            Self::TextToPdf => render_text_pdf(&text_lines(&decode_text(input))),
            Self::MarkdownToText => Ok(markdown_to_text(&decode_text(input)).into_bytes()),
        }
    }
}

fn decode_text(input: &[u8]) -> String {
    String::from_utf8_lossy(input).replace("\r\n", "\n")
}

/// Split plain text into lines.
pub fn text_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

/// Flatten markdown into display lines.
///
/// Paragraphs are separated by blank lines. `# ` and `## ` headings are
/// upper-cased, `- ` items become bullets, and every paragraph is followed
/// by an empty line.
pub fn markdown_lines(markdown: &str) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in PARAGRAPH_BREAK.split(markdown) {
        if let Some(heading) = paragraph
            .strip_prefix("# ")
            .or_else(|| paragraph.strip_prefix("## "))
        {
            lines.extend(heading.lines().map(|line| line.trim().to_uppercase()));
            lines.push(String::new());
        } else if paragraph.starts_with("- ") {
            for item in paragraph.lines() {
                let item = item.strip_prefix("- ").unwrap_or(item);
                lines.push(format!("\u{2022} {}", item.trim()));
            }
            lines.push(String::new());
        } else if !paragraph.trim().is_empty() {
            lines.extend(paragraph.lines().map(str::to_string));
            lines.push(String::new());
        }
    }

    lines
}

/// Strip markdown syntax, leaving plain text.
///
/// Fenced code blocks are dropped entirely; heading markers, emphasis
/// markers and backticks are removed.
pub fn markdown_to_text(markdown: &str) -> String {
    let text = CODE_FENCE.replace_all(markdown, "");
    let text = HEADING_MARKER.replace_all(&text, "");
    text.replace("**", "").replace(['*', '`'], "")
}

/// Break `line` into pieces no wider than `max_width`, splitting at spaces.
///
/// A single word wider than `max_width` is kept whole.
pub fn wrap_line(line: &str, max_width: f32, size: f32) -> Vec<String> {
    let mut wrapped = Vec::new();
    let mut current = String::new();

    for word in line.split(' ') {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if text_width(&candidate, size) > max_width && !current.is_empty() {
            wrapped.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }

    wrapped.push(current);
    wrapped
}

/// Geometry of text pages: A4, 50pt margins, 12pt Helvetica on 18pt lines.
pub fn text_page_geometry() -> PageGeometry {
    PageGeometry::a4().with_text(TEXT_LINE_HEIGHT, TEXT_FONT_SIZE)
}

/// Lay out lines top to bottom, wrapping and breaking pages as needed.
///
/// Empty lines advance the cursor without drawing. There is always at
/// least one page.
pub fn layout_text(lines: &[String], geometry: &PageGeometry) -> Vec<Vec<Primitive>> {
    let top = geometry.height - geometry.margin_top;
    let max_width = geometry.content_width();
    let mut pages = vec![Vec::new()];
    let mut y = top;

    for line in lines {
        for piece in wrap_line(line, max_width, geometry.font_size) {
            if y < geometry.margin_bottom + geometry.line_height {
                pages.push(Vec::new());
                y = top;
            }
            if !piece.is_empty() {
                if let Some(page) = pages.last_mut() {
                    page.push(Primitive::Text {
                        text: piece,
                        font: FontFace::Regular,
                        size: geometry.font_size,
                        origin: Point::new(geometry.margin_left, y),
                        color: Rgb::gray(0.0),
                    });
                }
            }
            y -= geometry.line_height;
        }
    }

    pages
}

/// Render lines as a paginated text PDF.
///
/// # Errors
///
/// Returns an error if content encoding or serialization fails.
pub fn render_text_pdf(lines: &[String]) -> Result<Vec<u8>> {
    let geometry = text_page_geometry();
    let mut doc = Document::with_version(OUTPUT_VERSION);
    let pages_id = doc.new_object_id();
    let fonts = add_font_resources(&mut doc);

    let mut kids = Vec::new();
    for primitives in layout_text(lines, &geometry) {
        let content_id = add_content_stream(&mut doc, &primitives)?;
        kids.push(add_generated_page(&mut doc, pages_id, &geometry, content_id, &fonts));
    }

    finish_single_tree(doc, pages_id, kids)
}

/// Embed a PNG or JPEG as one page the size of the image.
///
/// # Errors
///
/// Returns an error if the image cannot be decoded.
pub fn image_to_pdf(input: &[u8]) -> Result<Vec<u8>> {
    let image = image::load_from_memory(input)
        .map_err(|e| PdfBindError::other(format!("Cannot decode image: {e}")))?;
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut doc = Document::with_version(OUTPUT_VERSION);
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        rgb.into_raw(),
    ));

    let (w, h) = (width as f32, height as f32);
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(w),
                    0.into(),
                    0.into(),
                    Object::Real(h),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), Object::Real(w), Object::Real(h)],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
    });

    finish_single_tree(doc, pages_id, vec![page_id])
}

fn finish_single_tree(mut doc: Document, pages_id: ObjectId, kids: Vec<ObjectId>) -> Result<Vec<u8>> {
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids.into_iter().map(Object::Reference).collect::<Vec<_>>(),
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| PdfBindError::composition_io(e.to_string()))?;
    Ok(bytes)
}

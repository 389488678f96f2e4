//! Turn laid-out primitives into PDF content streams.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};

use super::layout::{Primitive, Rgb};
use super::metrics::{FontFace, encode_win_ansi};
use crate::error::Result;

/// Control-point distance for approximating a quarter circle with a cubic Bezier.
const BEZIER_CIRCLE: f32 = 0.552_284_8;

fn real(value: f32) -> Object {
    Object::Real(value)
}

fn fill_color(color: Rgb) -> Operation {
    Operation::new("rg", vec![real(color.r), real(color.g), real(color.b)])
}

fn stroke_color(color: Rgb) -> Operation {
    Operation::new("RG", vec![real(color.r), real(color.g), real(color.b)])
}

fn push_circle(ops: &mut Vec<Operation>, cx: f32, cy: f32, r: f32) {
    let k = r * BEZIER_CIRCLE;
    ops.push(Operation::new("m", vec![real(cx + r), real(cy)]));
    let quarters = [
        [cx + r, cy + k, cx + k, cy + r, cx, cy + r],
        [cx - k, cy + r, cx - r, cy + k, cx - r, cy],
        [cx - r, cy - k, cx - k, cy - r, cx, cy - r],
        [cx + k, cy - r, cx + r, cy - k, cx + r, cy],
    ];
    for quarter in quarters {
        ops.push(Operation::new("c", quarter.iter().copied().map(real).collect()));
    }
    ops.push(Operation::new("f", vec![]));
}

/// Build the drawing operations for `primitives`, wrapped in `q`/`Q`.
pub fn content_for(primitives: &[Primitive]) -> Content {
    let mut ops = vec![Operation::new("q", vec![])];

    for primitive in primitives {
        match primitive {
            Primitive::Text {
                text,
                font,
                size,
                origin,
                color,
            } => {
                ops.push(fill_color(*color));
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![Object::Name(font.resource_name().as_bytes().to_vec()), real(*size)],
                ));
                ops.push(Operation::new("Td", vec![real(origin.x), real(origin.y)]));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
            Primitive::Line {
                from,
                to,
                thickness,
                color,
            } => {
                ops.push(stroke_color(*color));
                ops.push(Operation::new("w", vec![real(*thickness)]));
                ops.push(Operation::new("m", vec![real(from.x), real(from.y)]));
                ops.push(Operation::new("l", vec![real(to.x), real(to.y)]));
                ops.push(Operation::new("S", vec![]));
            }
            Primitive::Dot {
                center,
                radius,
                color,
            } => {
                ops.push(fill_color(*color));
                push_circle(&mut ops, center.x, center.y, *radius);
            }
        }
    }

    ops.push(Operation::new("Q", vec![]));
    Content { operations: ops }
}

/// Encode `primitives` as a content stream object in `doc`.
pub fn add_content_stream(doc: &mut Document, primitives: &[Primitive]) -> Result<ObjectId> {
    let bytes = content_for(primitives).encode()?;
    Ok(doc.add_object(Stream::new(dictionary! {}, bytes)))
}

/// Font dictionary naming both Helvetica faces, adding the font objects to `doc`.
pub fn add_font_resources(doc: &mut Document) -> Dictionary {
    let mut fonts = Dictionary::new();
    for face in [FontFace::Regular, FontFace::Bold] {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(face.resource_name(), font_id);
    }
    fonts
}

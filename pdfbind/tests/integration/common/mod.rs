//! Shared helpers for the integration tests.
//!
//! Fixtures are generated on the fly with lopdf so no binary files need to
//! live in the repository.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

/// Build a document with one page per entry of `rotations`. Each page draws
/// `"<label> <n>"` so pages can be recognised after merging.
pub fn build_pdf(label: &str, rotations: &[Option<i64>]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for (index, rotation) in rotations.iter().enumerate() {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(format!("{label} {}", index + 1))],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        };
        if let Some(degrees) = rotation {
            page.set("Rotate", *degrees);
        }
        kids.push(Object::Reference(doc.add_object(page)));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Write a `pages`-page PDF named `name` into `dir`.
pub fn write_pdf(dir: &Path, name: &str, pages: usize) -> PathBuf {
    let stem = name.trim_end_matches(".pdf");
    write_rotated_pdf(dir, name, &vec![None; pages], stem)
}

/// Write a PDF with the given per-page rotations.
pub fn write_rotated_pdf(
    dir: &Path,
    name: &str,
    rotations: &[Option<i64>],
    label: &str,
) -> PathBuf {
    let path = dir.join(name);
    let mut doc = build_pdf(label, rotations);
    doc.save(&path).unwrap();
    path
}

/// Load a PDF written by a test.
pub fn load(path: &Path) -> Document {
    Document::load_mem(&std::fs::read(path).unwrap()).unwrap()
}

/// Page ids in page order.
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Every string shown with `Tj` on a page, in drawing order.
pub fn page_texts(doc: &Document, page_id: ObjectId) -> Vec<String> {
    let content = doc.get_page_content(page_id).unwrap();
    Content::decode(&content)
        .unwrap()
        .operations
        .into_iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        })
        .collect()
}

/// The `/Rotate` value written on a page, if any.
pub fn page_rotation(doc: &Document, page_id: ObjectId) -> Option<i64> {
    doc.get_dictionary(page_id)
        .ok()?
        .get(b"Rotate")
        .ok()?
        .as_i64()
        .ok()
}

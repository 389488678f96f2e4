//! Document outline for assembled documents.
//!
//! One top-level outline item is created per source document, pointing at
//! the first page that source contributed.

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};

use crate::error::Result;

/// A single outline item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineItem {
    /// Text shown in the viewer's outline panel.
    pub title: String,
    /// Destination page.
    pub page_id: ObjectId,
}

impl OutlineItem {
    /// Create an outline item.
    pub fn new(title: impl Into<String>, page_id: ObjectId) -> Self {
        Self {
            title: title.into(),
            page_id,
        }
    }
}

/// Encode a title as a PDF text string.
///
/// ASCII titles are written as-is; anything else as UTF-16BE with a byte
/// order mark.
pub fn text_string(title: &str) -> Object {
    if title.is_ascii() {
        return Object::String(title.as_bytes().to_vec(), StringFormat::Literal);
    }

    let mut bytes = vec![0xFE, 0xFF];
    for unit in title.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Replace the document outline with a flat list of `items`.
///
/// Returns the number of items written. An empty list leaves the document
/// untouched.
pub fn write_outline(doc: &mut Document, items: &[OutlineItem]) -> Result<usize> {
    if items.is_empty() {
        return Ok(0);
    }

    let outline_id = doc.new_object_id();
    let item_ids: Vec<ObjectId> = items.iter().map(|_| doc.new_object_id()).collect();

    for (index, (item, &item_id)) in items.iter().zip(&item_ids).enumerate() {
        let mut dict = Dictionary::new();
        dict.set("Title", text_string(&item.title));
        dict.set("Parent", outline_id);
        dict.set(
            "Dest",
            vec![
                Object::Reference(item.page_id),
                Object::Name(b"XYZ".to_vec()),
                Object::Null,
                Object::Null,
                Object::Null,
            ],
        );
        if index > 0 {
            dict.set("Prev", item_ids[index - 1]);
        }
        if let Some(next) = item_ids.get(index + 1) {
            dict.set("Next", *next);
        }
        doc.objects.insert(item_id, Object::Dictionary(dict));
    }

    let mut outline = Dictionary::new();
    outline.set("Type", Object::Name(b"Outlines".to_vec()));
    outline.set("Count", item_ids.len() as i64);
    outline.set("First", item_ids[0]);
    outline.set("Last", item_ids[item_ids.len() - 1]);
    doc.objects.insert(outline_id, Object::Dictionary(outline));

    doc.catalog_mut()?.set("Outlines", outline_id);

    Ok(items.len())
}

/// Titles of the outline items in order, decoded as lossy UTF-8/UTF-16.
pub fn outline_titles(doc: &Document) -> Vec<String> {
    let mut titles = Vec::new();
    let Some(mut current) = doc
        .catalog()
        .ok()
        .and_then(|c| c.get(b"Outlines").and_then(Object::as_reference).ok())
        .and_then(|id| doc.get_dictionary(id).ok())
        .and_then(|outline| outline.get(b"First").and_then(Object::as_reference).ok())
    else {
        return titles;
    };

    // Bounded by the object count in case of a cyclic Next chain.
    for _ in 0..doc.objects.len() {
        let Ok(item) = doc.get_dictionary(current) else {
            break;
        };
        if let Ok(Object::String(bytes, _)) = item.get(b"Title") {
            titles.push(decode_text_string(bytes));
        }
        match item.get(b"Next").and_then(Object::as_reference) {
            Ok(next) => current = next,
            Err(_) => break,
        }
    }
    titles
}

pub(crate) fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

//! Page preparation for the assembled document.
//!
//! Source pages are moved under a new page tree root. Anything a page
//! inherited from its old tree has to be copied onto the page first, or it
//! would be lost with the old parent.

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};

use crate::error::{PdfBindError, Result};
use crate::source::{SourcePage, inherited_attribute};
use crate::toc::PageGeometry;

/// Inheritable page attributes copied onto each page before re-parenting.
const INHERITED_KEYS: [&[u8]; 3] = [b"Resources", b"MediaBox", b"CropBox"];

/// How page rotation is written to the assembled document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationPolicy {
    /// Write the canonical angle (0, 90, 180 or 270) explicitly.
    Normalize,
    /// Copy whatever `/Rotate` the page had, own or inherited.
    Preserve,
}

impl RotationPolicy {
    /// Pick the policy for a `normalize_rotation` flag.
    pub fn from_flag(normalize: bool) -> Self {
        if normalize {
            Self::Normalize
        } else {
            Self::Preserve
        }
    }
}

/// Detach a source page from its old tree and hang it under `parent`.
///
/// `page.id` must refer to an object in `doc`.
pub fn adopt_page(
    doc: &mut Document,
    page: &SourcePage,
    parent: ObjectId,
    policy: RotationPolicy,
) -> Result<()> {
    let mut inherited = Vec::new();
    {
        let dict = doc.get_dictionary(page.id)?;
        for key in INHERITED_KEYS {
            if !dict.has(key)
                && let Some(value) = inherited_attribute(doc, page.id, key)
            {
                inherited.push((key, value));
            }
        }
    }

    let dict = doc
        .get_object_mut(page.id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| {
            PdfBindError::composition_io(format!("page {} is not a dictionary: {e}", page.number))
        })?;

    for (key, value) in inherited {
        dict.set(key.to_vec(), value);
    }

    match (policy, page.raw_rotation) {
        (RotationPolicy::Normalize, _) => {
            dict.set("Rotate", page.rotation.as_degrees());
        }
        (RotationPolicy::Preserve, Some(raw)) => {
            dict.set("Rotate", raw);
        }
        (RotationPolicy::Preserve, None) => {
            dict.remove(b"Rotate");
        }
    }

    dict.set("Parent", parent);
    Ok(())
}

/// Add a page with the given content stream and font resources.
pub fn add_generated_page(
    doc: &mut Document,
    parent: ObjectId,
    geometry: &PageGeometry,
    content_id: ObjectId,
    fonts: &Dictionary,
) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            Object::Real(geometry.width),
            Object::Real(geometry.height),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "Font" => fonts.clone(),
        },
    })
}

/// Horizontal extent and bottom edge of a page, from its media box.
///
/// Pages without a readable media box are treated as `fallback`.
pub fn page_frame(doc: &Document, page_id: ObjectId, fallback: &PageGeometry) -> (f32, f32, f32) {
    let values: Option<Vec<f32>> = inherited_attribute(doc, page_id, b"MediaBox").and_then(|b| {
        b.as_array()
            .ok()
            .map(|items| items.iter().filter_map(|v| v.as_float().ok()).collect())
    });

    match values.as_deref() {
        Some([x0, y0, x1, _y1]) => (x0.min(*x1), x0.max(*x1), *y0),
        _ => (0.0, fallback.width, 0.0),
    }
}

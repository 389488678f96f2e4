//! Page footer stamping.
//!
//! Footers read "page i of N", so they can only be drawn once the
//! assembled document is complete. [`stamp_footers`] is that final pass:
//! it walks every page, resolves the page's [`DeferredFooter`] against the
//! total and appends the result as an extra content stream.

use lopdf::content::Operation;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use tracing::debug;

use super::pages::page_frame;
use crate::error::Result;
use crate::source::inherited_attribute;
use crate::toc::render::{add_font_resources, content_for};
use crate::toc::{DeferredFooter, PageGeometry};

/// Stamp a footer on every page of `doc`.
///
/// The first `leading.len()` pages use the footers in `leading` (the
/// generated TOC pages); every later page uses `default`. Each footer is
/// centered on its page's media box. Returns the number of stamped pages.
pub fn stamp_footers(
    doc: &mut Document,
    leading: &[DeferredFooter],
    default: DeferredFooter,
    fallback: &PageGeometry,
) -> Result<usize> {
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
    let total = page_ids.len();
    if total == 0 {
        return Ok(0);
    }

    let fonts = add_font_resources(doc);
    let save_id = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));

    for (index, page_id) in page_ids.iter().copied().enumerate() {
        let footer = leading.get(index).copied().unwrap_or(default);
        let (left, right, bottom) = page_frame(doc, page_id, fallback);
        let placed = DeferredFooter {
            baseline: footer.baseline + bottom,
            ..footer
        };
        let primitive = placed.resolve(left, right, index + 1, total);

        let mut content = content_for(&[primitive]);
        content.operations.insert(0, Operation::new("Q", vec![]));
        // Leading newline keeps the restore operator apart from the page's last token.
        let mut bytes = b"\n".to_vec();
        bytes.extend(content.encode()?);
        let footer_id = doc.add_object(Stream::new(dictionary! {}, bytes));

        let resources = footer_resources(doc, page_id, &fonts);
        let dict = doc.get_object_mut(page_id).and_then(Object::as_dict_mut)?;

        let mut contents = vec![Object::Reference(save_id)];
        match dict.get(b"Contents") {
            Ok(Object::Reference(id)) => contents.push(Object::Reference(*id)),
            Ok(Object::Array(items)) => contents.extend(items.iter().cloned()),
            _ => {}
        }
        contents.push(Object::Reference(footer_id));

        dict.set("Contents", contents);
        dict.set("Resources", resources);
    }

    debug!(pages = total, "stamped page footers");
    Ok(total)
}

/// The page's resources with the footer fonts added, as an inline dictionary.
fn footer_resources(doc: &Document, page_id: ObjectId, fonts: &Dictionary) -> Dictionary {
    let mut resources = match inherited_attribute(doc, page_id, b"Resources") {
        Some(Object::Dictionary(dict)) => dict,
        _ => Dictionary::new(),
    };

    let mut page_fonts = match resources.get(b"Font") {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        Ok(Object::Reference(id)) => doc
            .get_dictionary(*id)
            .cloned()
            .unwrap_or_else(|_| Dictionary::new()),
        _ => Dictionary::new(),
    };

    for (name, font) in fonts.iter() {
        page_fonts.set(name.clone(), font.clone());
    }
    resources.set("Font", page_fonts);
    resources
}

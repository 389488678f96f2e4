//! Document information dictionary.

use chrono::{DateTime, Utc};
use lopdf::{Dictionary, Document, Object, StringFormat};

use super::bookmarks::{decode_text_string, text_string};
use crate::config::Metadata;

/// Value written as `/Producer` and `/Creator`.
pub const PRODUCER: &str = concat!("pdfbind ", env!("CARGO_PKG_VERSION"));

/// Format a timestamp as a PDF date string (`D:YYYYMMDDHHmmSS+00'00'`).
pub fn format_pdf_date(time: DateTime<Utc>) -> String {
    time.format("D:%Y%m%d%H%M%S+00'00'").to_string()
}

/// Write an Info dictionary with `metadata`, producer and timestamps.
///
/// Any existing Info dictionary is replaced.
pub fn write_info(doc: &mut Document, metadata: &Metadata, now: DateTime<Utc>) {
    let mut info = Dictionary::new();

    let fields = [
        ("Title", &metadata.title),
        ("Author", &metadata.author),
        ("Subject", &metadata.subject),
        ("Keywords", &metadata.keywords),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            info.set(key, text_string(value));
        }
    }

    let producer = Object::String(PRODUCER.as_bytes().to_vec(), StringFormat::Literal);
    info.set("Producer", producer.clone());
    info.set("Creator", producer);

    let date = Object::String(format_pdf_date(now).into_bytes(), StringFormat::Literal);
    info.set("CreationDate", date.clone());
    info.set("ModDate", date);

    let info_id = doc.add_object(info);
    doc.trailer.set("Info", info_id);
}

/// Read title, author, subject and keywords back from the Info dictionary.
pub fn read_info(doc: &Document) -> Metadata {
    let Some(info) = doc
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
        .ok()
        .and_then(|id| doc.get_dictionary(id).ok())
    else {
        return Metadata::default();
    };

    Metadata::new(
        string_field(info, b"Title"),
        string_field(info, b"Author"),
        string_field(info, b"Subject"),
        string_field(info, b"Keywords"),
    )
}

fn string_field(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key) {
        Ok(Object::String(bytes, _)) => Some(decode_text_string(bytes)),
        _ => None,
    }
}

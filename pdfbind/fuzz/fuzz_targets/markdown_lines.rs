#![no_main]

use libfuzzer_sys::fuzz_target;
use pdfbind::convert::strategies::{markdown_lines, markdown_to_text, text_lines};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let _ = markdown_lines(&text);
    let _ = text_lines(&text);

    let plain = markdown_to_text(&text);
    assert!(!plain.contains("**"));
});

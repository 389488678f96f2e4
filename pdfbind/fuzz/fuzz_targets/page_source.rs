#![no_main]

use libfuzzer_sys::fuzz_target;
use pdfbind::source::PageSource;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must either parse or fail cleanly; page walking on a
    // parsed document must never panic or loop.
    if let Ok(source) = PageSource::from_bytes("fuzz", data) {
        let pages = source.pages();
        assert!(pages.len() <= source.page_count());
        for (index, page) in pages.iter().enumerate() {
            assert_eq!(page.number as usize, index + 1);
        }
    }
});

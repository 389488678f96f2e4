//! Single-file conversions through `convert_file`.

use std::path::Path;
use std::sync::Mutex;

use pdfbind::config::ConvertConfig;
use pdfbind::convert::{FormatKind, convert_file};
use pdfbind::error::PdfBindError;
use rstest::rstest;
use tempfile::TempDir;

use crate::common::{load, page_ids, page_texts};

fn out_config(dir: &TempDir) -> ConvertConfig {
    ConvertConfig {
        output_dir: dir.path().join("outputs"),
    }
}

fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn write_png(path: &Path, width: u32, height: u32) {
    let image = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 40) as u8, (y * 40) as u8, 128])
    });
    image.save(path).unwrap();
}

#[tokio::test]
async fn test_text_to_pdf_keeps_lines() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "letter.txt", b"Dear reader,\n\nThanks for all the fish.\n");
    let progress = Mutex::new(Vec::new());

    let output = convert_file(&input, FormatKind::Pdf, &out_config(&dir), |p| {
        progress.lock().unwrap().push(p);
    })
    .await
    .unwrap();

    assert_eq!(output.extension().unwrap(), "pdf");
    assert!(output.file_name().unwrap().to_string_lossy().starts_with("letter_"));
    assert_eq!(progress.into_inner().unwrap(), vec![10, 30, 80, 95]);

    let doc = load(&output);
    let ids = page_ids(&doc);
    assert_eq!(ids.len(), 1);
    let texts = page_texts(&doc, ids[0]);
    assert!(texts.contains(&"Dear reader,".to_string()));
    assert!(texts.contains(&"Thanks for all the fish.".to_string()));
}

#[tokio::test]
async fn test_long_text_breaks_pages() {
    let dir = TempDir::new().unwrap();
    let body: String = (1..=200).map(|i| format!("line {i}\n")).collect();
    let input = write(&dir, "long.txt", body.as_bytes());

    let output = convert_file(&input, FormatKind::Pdf, &out_config(&dir), |_| {})
        .await
        .unwrap();

    let doc = load(&output);
    let ids = page_ids(&doc);
    assert!(ids.len() > 1);
    assert_eq!(page_texts(&doc, ids[0]).first().map(String::as_str), Some("line 1"));
    assert_eq!(
        page_texts(&doc, *ids.last().unwrap()).last().map(String::as_str),
        Some("line 200")
    );
}

#[tokio::test]
async fn test_markdown_to_pdf_uppercases_headings() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "readme.md", b"# Usage\n\nRun it.\n\n- one\n- two\n");

    let output = convert_file(&input, FormatKind::Pdf, &out_config(&dir), |_| {})
        .await
        .unwrap();

    let doc = load(&output);
    let texts = page_texts(&doc, page_ids(&doc)[0]);
    assert!(texts.contains(&"USAGE".to_string()));
    assert!(texts.contains(&"Run it.".to_string()));
}

#[tokio::test]
async fn test_markdown_to_text_strips_markup() {
    let dir = TempDir::new().unwrap();
    let input = write(
        &dir,
        "notes.markdown",
        b"## Title\n\nSome **bold** and `code`.\n\n```\nfenced\n```\n",
    );

    let output = convert_file(&input, FormatKind::Text, &out_config(&dir), |_| {})
        .await
        .unwrap();

    assert_eq!(output.extension().unwrap(), "txt");
    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.contains("Title"));
    assert!(text.contains("Some bold and code."));
    assert!(!text.contains('#'));
    assert!(!text.contains('`'));
    assert!(!text.contains("fenced"));
}

#[tokio::test]
async fn test_png_to_pdf_embeds_image() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("photo.png");
    write_png(&input, 6, 4);

    let output = convert_file(&input, FormatKind::Pdf, &out_config(&dir), |_| {})
        .await
        .unwrap();

    let doc = load(&output);
    assert_eq!(page_ids(&doc).len(), 1);
    let image = doc
        .objects
        .values()
        .filter_map(|object| object.as_stream().ok())
        .find(|stream| {
            stream
                .dict
                .get(b"Subtype")
                .and_then(|s| s.as_name())
                .is_ok_and(|name| name == b"Image")
        })
        .expect("image XObject");
    assert_eq!(image.dict.get(b"Width").unwrap().as_i64().unwrap(), 6);
    assert_eq!(image.dict.get(b"Height").unwrap().as_i64().unwrap(), 4);
}

#[tokio::test]
async fn test_image_to_image_copies_bytes() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("icon.png");
    write_png(&input, 2, 2);

    let output = convert_file(&input, FormatKind::Jpeg, &out_config(&dir), |_| {})
        .await
        .unwrap();

    assert_eq!(output.extension().unwrap(), "jpg");
    assert_eq!(std::fs::read(&output).unwrap(), std::fs::read(&input).unwrap());
}

#[rstest]
#[case("doc.pdf", FormatKind::Docx)]
#[case("photo.webp", FormatKind::Pdf)]
#[case("notes.txt", FormatKind::Markdown)]
#[tokio::test]
async fn test_unsupported_pairs(#[case] name: &str, #[case] target: FormatKind) {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, name, b"irrelevant");

    let result = convert_file(&input, target, &out_config(&dir), |_| {}).await;
    assert!(matches!(result, Err(PdfBindError::UnsupportedConversion { .. })));
    assert!(!dir.path().join("outputs").exists());
}

#[tokio::test]
async fn test_corrupt_image_fails_conversion() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "broken.jpg", b"not really a jpeg");

    let result = convert_file(&input, FormatKind::Pdf, &out_config(&dir), |_| {}).await;
    match result {
        Err(PdfBindError::ConversionFailed { path, .. }) => assert_eq!(path, input),
        other => panic!("expected ConversionFailed, got {other:?}"),
    }
}

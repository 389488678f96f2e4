//! Binding documents end to end: load, plan the TOC, compose, write.

use pdfbind::compose::merge_documents;
use pdfbind::config::{CompressionLevel, MergeConfig, Metadata};
use tempfile::TempDir;

use crate::common::{load, page_ids, page_rotation, page_texts, write_pdf, write_rotated_pdf};

fn config(dir: &TempDir, inputs: Vec<std::path::PathBuf>) -> MergeConfig {
    let mut config = MergeConfig::new(inputs, dir.path().join("bound.pdf"));
    config.compression = CompressionLevel::None;
    config.quiet = true;
    config
}

#[tokio::test]
async fn test_merge_with_toc_places_contents_first() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "alpha.pdf", 2);
    let b = write_pdf(dir.path(), "beta.pdf", 3);

    let mut config = config(&dir, vec![a, b]);
    config.include_toc = true;

    let outcome = merge_documents(&config).await.unwrap();
    assert!(outcome.written);
    assert_eq!(outcome.statistics.files_merged, 2);
    assert_eq!(outcome.statistics.toc_pages, 1);
    assert_eq!(outcome.statistics.source_pages, 5);
    assert_eq!(outcome.statistics.total_pages, 6);

    let doc = load(&config.output);
    let ids = page_ids(&doc);
    assert_eq!(ids.len(), 6);

    let toc = page_texts(&doc, ids[0]);
    assert!(toc.iter().any(|t| t == "Contents"));
    assert!(toc.iter().any(|t| t == "alpha"));
    assert!(toc.iter().any(|t| t == "beta"));
    // alpha starts right after the single TOC page, beta after alpha's two pages.
    assert!(toc.iter().any(|t| t == "2"));
    assert!(toc.iter().any(|t| t == "4"));

    assert!(page_texts(&doc, ids[1]).iter().any(|t| t == "alpha 1"));
    assert!(page_texts(&doc, ids[3]).iter().any(|t| t == "beta 1"));
    assert!(page_texts(&doc, ids[5]).iter().any(|t| t == "beta 3"));
}

#[tokio::test]
async fn test_every_page_gets_a_footer() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", 1);
    let b = write_pdf(dir.path(), "b.pdf", 2);

    let mut config = config(&dir, vec![a, b]);
    config.include_toc = true;
    merge_documents(&config).await.unwrap();

    let doc = load(&config.output);
    let ids = page_ids(&doc);
    for (index, id) in ids.iter().enumerate() {
        let expected = format!("page {} of {}", index + 1, ids.len());
        assert!(
            page_texts(&doc, *id).contains(&expected),
            "missing footer on page {}",
            index + 1
        );
    }
}

#[tokio::test]
async fn test_footers_can_be_disabled() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", 2);

    let mut config = config(&dir, vec![a]);
    config.page_footers = false;
    merge_documents(&config).await.unwrap();

    let doc = load(&config.output);
    for id in page_ids(&doc) {
        assert!(!page_texts(&doc, id).iter().any(|t| t.starts_with("page ")));
    }
}

#[tokio::test]
async fn test_custom_titles_replace_file_names() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "ch01.pdf", 1);
    let b = write_pdf(dir.path(), "ch02.pdf", 1);

    let mut config = config(&dir, vec![a, b]);
    config.include_toc = true;
    config.toc_titles = vec!["Introduction".to_string()];
    merge_documents(&config).await.unwrap();

    let doc = load(&config.output);
    let toc = page_texts(&doc, page_ids(&doc)[0]);
    assert!(toc.iter().any(|t| t == "Introduction"));
    assert!(toc.iter().any(|t| t == "ch02"));
    assert!(!toc.iter().any(|t| t == "ch01"));
}

#[tokio::test]
async fn test_long_toc_spills_onto_continuation_pages() {
    let dir = TempDir::new().unwrap();
    let inputs: Vec<_> = (0..80)
        .map(|i| write_pdf(dir.path(), &format!("section{i:02}.pdf"), 1))
        .collect();

    let mut config = config(&dir, inputs);
    config.include_toc = true;
    config.page_footers = false;

    let outcome = merge_documents(&config).await.unwrap();
    let toc_pages = outcome.statistics.toc_pages;
    assert!(toc_pages > 1);
    assert_eq!(outcome.statistics.total_pages, toc_pages + 80);

    let doc = load(&config.output);
    let ids = page_ids(&doc);
    let first = page_texts(&doc, ids[0]);
    let second = page_texts(&doc, ids[1]);
    assert!(first.iter().any(|t| t == "Contents"));
    assert!(second.iter().any(|t| t == "Contents (continued)"));

    // The first source starts on the page after the whole TOC.
    let first_target = (toc_pages + 1).to_string();
    assert!(first.contains(&first_target));
    assert!(
        page_texts(&doc, ids[toc_pages])
            .iter()
            .any(|t| t == "section00 1")
    );
}

#[tokio::test]
async fn test_rotation_normalized_or_preserved() {
    let dir = TempDir::new().unwrap();
    let rotated = write_rotated_pdf(dir.path(), "r.pdf", &[Some(-90), Some(450), None], "r");

    let config_normalized = config(&dir, vec![rotated.clone()]);
    merge_documents(&config_normalized).await.unwrap();
    let doc = load(&config_normalized.output);
    let angles: Vec<_> = page_ids(&doc)
        .into_iter()
        .map(|id| page_rotation(&doc, id))
        .collect();
    assert_eq!(angles, vec![Some(270), Some(90), Some(0)]);

    let mut config_raw = config(&dir, vec![rotated]);
    config_raw.output = dir.path().join("raw.pdf");
    config_raw.normalize_rotation = false;
    merge_documents(&config_raw).await.unwrap();
    let doc = load(&config_raw.output);
    let angles: Vec<_> = page_ids(&doc)
        .into_iter()
        .map(|id| page_rotation(&doc, id))
        .collect();
    assert_eq!(angles, vec![Some(-90), Some(450), None]);
}

#[tokio::test]
async fn test_bookmarks_and_metadata() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", 2);
    let b = write_pdf(dir.path(), "b.pdf", 1);

    let mut config = config(&dir, vec![a, b]);
    config.bookmarks = true;
    config.metadata = Metadata::new(Some("Bound".to_string()), Some("Tester".to_string()), None, None);

    let outcome = merge_documents(&config).await.unwrap();
    assert_eq!(outcome.statistics.bookmarks_added, 2);

    let doc = load(&config.output);
    let catalog = doc.catalog().unwrap();
    assert!(catalog.has(b"Outlines"));

    let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
    let info = doc.get_dictionary(info_id).unwrap();
    assert_eq!(info.get(b"Title").unwrap().as_str().unwrap(), b"Bound");
    assert_eq!(info.get(b"Author").unwrap().as_str().unwrap(), b"Tester");
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", 3);

    let mut config = config(&dir, vec![a]);
    config.dry_run = true;
    config.include_toc = true;

    let outcome = merge_documents(&config).await.unwrap();
    assert!(!outcome.written);
    assert_eq!(outcome.statistics.total_pages, 4);
    assert!(!config.output.exists());
}

#[tokio::test]
async fn test_many_jobs_keep_input_order() {
    let dir = TempDir::new().unwrap();
    let inputs: Vec<_> = (0..6)
        .map(|i| write_pdf(dir.path(), &format!("doc{i}.pdf"), i + 1))
        .collect();

    let mut config = config(&dir, inputs.clone());
    config.jobs = Some(4);
    config.page_footers = false;

    let outcome = merge_documents(&config).await.unwrap();
    assert_eq!(outcome.merged_files, inputs);

    let doc = load(&config.output);
    let firsts: Vec<String> = page_ids(&doc)
        .into_iter()
        .map(|id| page_texts(&doc, id).remove(0))
        .filter(|t| t.ends_with(" 1"))
        .collect();
    assert_eq!(
        firsts,
        vec!["doc0 1", "doc1 1", "doc2 1", "doc3 1", "doc4 1", "doc5 1"]
    );
}

#[tokio::test]
async fn test_non_ascii_file_names_become_titles() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "说明书", 2);
    let b = write_pdf(dir.path(), "目录.pdf", 1);

    let mut config = config(&dir, vec![a, b]);
    config.include_toc = true;
    config.bookmarks = true;

    let outcome = merge_documents(&config).await.unwrap();
    assert_eq!(outcome.statistics.files_merged, 2);
    assert_eq!(outcome.statistics.bookmarks_added, 2);
    assert_eq!(outcome.statistics.total_pages, 4);
}

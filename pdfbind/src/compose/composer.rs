//! Assembly of source documents and TOC pages into one PDF.

use chrono::Utc;
use lopdf::{Document, Object, ObjectId, dictionary};
use std::path::Path;
use tracing::{debug, info};

use super::bookmarks::{OutlineItem, write_outline};
use super::footer::stamp_footers;
use super::metadata::write_info;
use super::pages::{RotationPolicy, add_generated_page, adopt_page};
use crate::config::{CompressionLevel, MergeConfig, Metadata};
use crate::error::{PdfBindError, Result};
use crate::source::PageSource;
use crate::toc::render::{add_content_stream, add_font_resources};
use crate::toc::{DeferredFooter, LaidOutPage, PageGeometry, TocStyle, default_title};

/// PDF version of assembled documents.
const OUTPUT_VERSION: &str = "1.7";

/// Options for one composition.
#[derive(Debug, Clone)]
pub struct ComposeOptions {
    /// Insert the TOC pages before the first source page.
    pub include_toc: bool,
    /// Write explicit canonical rotation on every source page.
    pub normalize_rotation: bool,
    /// Stamp "page i of N" on every page.
    pub page_footers: bool,
    /// Add one outline item per source.
    pub bookmarks: bool,
    /// Outline titles by source position; missing ones come from the label.
    pub titles: Vec<String>,
    /// Stream compression.
    pub compression: CompressionLevel,
    /// Info dictionary values.
    pub metadata: Metadata,
    /// Geometry of generated pages.
    pub geometry: PageGeometry,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            include_toc: false,
            normalize_rotation: true,
            page_footers: true,
            bookmarks: false,
            titles: Vec::new(),
            compression: CompressionLevel::default(),
            metadata: Metadata::default(),
            geometry: PageGeometry::default(),
        }
    }
}

impl From<&MergeConfig> for ComposeOptions {
    fn from(config: &MergeConfig) -> Self {
        Self {
            include_toc: config.include_toc,
            normalize_rotation: config.normalize_rotation,
            page_footers: config.page_footers,
            bookmarks: config.bookmarks,
            titles: config.toc_titles.clone(),
            compression: config.compression,
            metadata: config.metadata.clone(),
            geometry: config.geometry,
        }
    }
}

/// A finished document, serialized.
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    /// The complete PDF file.
    pub bytes: Vec<u8>,
    /// Total number of pages.
    pub page_count: usize,
    /// Number of generated TOC pages at the front.
    pub toc_page_count: usize,
    /// Pages contributed by each source, in order.
    pub source_page_counts: Vec<usize>,
    /// Number of outline items written.
    pub bookmarks_added: usize,
}

impl AssembledDocument {
    /// Pages that came from source documents.
    pub fn source_pages(&self) -> usize {
        self.source_page_counts.iter().sum()
    }

    /// Parse the bytes back into a document.
    ///
    /// # Errors
    ///
    /// Returns [`PdfBindError::UnreadableDocument`] if the bytes do not parse.
    pub fn to_document(&self) -> Result<Document> {
        Document::load_mem(&self.bytes)
            .map_err(|e| PdfBindError::unreadable_document("assembled document", e.to_string()))
    }
}

/// Merges sources and TOC pages into one document.
#[derive(Debug, Clone, Default)]
pub struct DocumentComposer {
    style: TocStyle,
}

impl DocumentComposer {
    /// Create a composer with the default TOC style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a composer whose footers follow `style`.
    pub fn with_style(style: TocStyle) -> Self {
        Self { style }
    }

    /// Assemble `sources` (and `toc_pages` if enabled) into one document.
    ///
    /// Target page numbers inside `toc_pages` must already include the TOC's
    /// own length; see [`plan_toc`](crate::toc::plan_toc). Source pages keep
    /// their order and the sources keep theirs. Footers are stamped in a
    /// final pass once the page count is known.
    ///
    /// # Errors
    ///
    /// Returns [`PdfBindError::NoDocuments`] when there is nothing to
    /// compose, [`PdfBindError::SourceUnreadable`] when a source's page tree
    /// is broken, and [`PdfBindError::CompositionIo`] if serialization fails.
    /// Nothing is returned on error.
    pub fn compose(
        &self,
        sources: Vec<PageSource>,
        toc_pages: &[LaidOutPage],
        options: &ComposeOptions,
    ) -> Result<AssembledDocument> {
        if sources.is_empty() {
            return Err(PdfBindError::NoDocuments);
        }

        let mut doc = Document::with_version(OUTPUT_VERSION);
        let pages_id = doc.new_object_id();
        let mut kids: Vec<ObjectId> = Vec::new();

        let toc_pages: &[LaidOutPage] = if options.include_toc { toc_pages } else { &[] };
        if !toc_pages.is_empty() {
            let fonts = add_font_resources(&mut doc);
            for page in toc_pages {
                let content_id = add_content_stream(&mut doc, &page.primitives)?;
                kids.push(add_generated_page(
                    &mut doc,
                    pages_id,
                    &options.geometry,
                    content_id,
                    &fonts,
                ));
            }
        }

        let policy = RotationPolicy::from_flag(options.normalize_rotation);
        let mut source_page_counts = Vec::with_capacity(sources.len());
        let mut outline = Vec::new();

        for (index, source) in sources.into_iter().enumerate() {
            let label = source.label().to_string();
            let mut source_doc = source.into_document();
            source_doc.renumber_objects_with(doc.max_id + 1);

            let renumbered = PageSource::from_document(label.clone(), source_doc);
            let pages = renumbered.pages();
            let mut source_doc = renumbered.into_document();

            for page in &pages {
                adopt_page(&mut source_doc, page, pages_id, policy).map_err(|e| {
                    PdfBindError::SourceUnreadable {
                        label: label.clone(),
                        reason: e.to_string(),
                    }
                })?;
            }

            if let Some(first) = pages.first() {
                let title = options
                    .titles
                    .get(index)
                    .filter(|t| !t.trim().is_empty())
                    .cloned()
                    .unwrap_or_else(|| default_title(Path::new(&label)));
                outline.push(OutlineItem::new(title, first.id));
            }

            debug!(source = %label, pages = pages.len(), "appended source pages");
            doc.max_id = doc.max_id.max(source_doc.max_id);
            doc.objects.extend(source_doc.objects);
            kids.extend(pages.iter().map(|p| p.id));
            source_page_counts.push(pages.len());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids.into_iter().map(Object::Reference).collect::<Vec<_>>(),
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let bookmarks_added = if options.bookmarks {
            write_outline(&mut doc, &outline)?
        } else {
            0
        };

        write_info(&mut doc, &options.metadata, Utc::now());

        if options.page_footers {
            let leading: Vec<DeferredFooter> = toc_pages.iter().map(|p| p.footer).collect();
            stamp_footers(
                &mut doc,
                &leading,
                self.style.footer(&options.geometry),
                &options.geometry,
            )?;
        }

        let page_count = doc.get_pages().len();
        let bytes = finish(doc, options.compression)?;

        info!(
            pages = page_count,
            toc_pages = toc_pages.len(),
            bytes = bytes.len(),
            "composed document"
        );

        Ok(AssembledDocument {
            bytes,
            page_count,
            toc_page_count: toc_pages.len(),
            source_page_counts,
            bookmarks_added,
        })
    }
}

/// Drop unreachable objects, compress and serialize.
fn finish(mut doc: Document, compression: CompressionLevel) -> Result<Vec<u8>> {
    doc.prune_objects();

    match compression {
        CompressionLevel::None => {}
        CompressionLevel::Standard => doc.compress(),
        CompressionLevel::Maximum => {
            doc.compress();
            doc.delete_zero_length_streams();
            doc.prune_objects();
        }
    }
    doc.renumber_objects();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| PdfBindError::composition_io(e.to_string()))?;
    Ok(bytes)
}

//! TOC entries and page-number planning.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::geometry::PageGeometry;
use super::layout::{LaidOutPage, TocLayoutEngine};
use crate::error::{PdfBindError, Result};

/// Upper bound on re-planning rounds before the last layout is accepted.
const MAX_PLANNING_ROUNDS: usize = 8;

/// One row of the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TocEntry {
    title: String,
    target_page: u32,
}

impl TocEntry {
    /// Create an entry.
    ///
    /// # Errors
    ///
    /// Returns [`PdfBindError::EmptyEntryTitle`] for a blank title and
    /// [`PdfBindError::InvalidTargetPage`] for page 0.
    pub fn new(title: impl Into<String>, target_page: u32) -> Result<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(PdfBindError::EmptyEntryTitle);
        }
        if target_page == 0 {
            return Err(PdfBindError::InvalidTargetPage {
                title,
                page: target_page,
            });
        }
        Ok(Self { title, target_page })
    }

    /// Entry title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// 1-based page number in the assembled document.
    pub fn target_page(&self) -> u32 {
        self.target_page
    }
}

/// Title derived from a file name: the stem with a trailing `.pdf` removed.
///
/// Falls back to the whole file name, then to `"Untitled"`.
pub fn default_title(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    // `get` rejects split points inside a multi-byte character.
    let stem = match name.len().checked_sub(4) {
        Some(at) if name.get(at..).is_some_and(|ext| ext.eq_ignore_ascii_case(".pdf")) => {
            &name[..at]
        }
        _ => name.as_str(),
    };

    let title = stem.trim();
    if title.is_empty() {
        "Untitled".to_string()
    } else {
        title.to_string()
    }
}

/// A source as seen by the planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSource {
    /// Title shown in the TOC.
    pub title: String,
    /// Number of pages the source contributes.
    pub page_count: u32,
}

impl PlannedSource {
    /// Create a planner input.
    pub fn new(title: impl Into<String>, page_count: u32) -> Self {
        Self {
            title: title.into(),
            page_count,
        }
    }
}

/// Result of [`plan_toc`].
#[derive(Debug, Clone)]
pub struct TocPlan {
    /// Entries with final target pages.
    pub entries: Vec<TocEntry>,
    /// Laid-out TOC pages.
    pub pages: Vec<LaidOutPage>,
}

impl TocPlan {
    /// Number of pages the TOC occupies.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

fn entries_for(sources: &[PlannedSource], reserved: u32) -> Result<Vec<TocEntry>> {
    let mut next_page = reserved + 1;
    let mut entries = Vec::with_capacity(sources.len());
    for source in sources {
        if source.page_count == 0 {
            continue;
        }
        entries.push(TocEntry::new(source.title.clone(), next_page)?);
        next_page += source.page_count;
    }
    Ok(entries)
}

/// Compute TOC entries whose target pages account for the TOC's own length.
///
/// A single TOC page is reserved first. If the layout needs more pages,
/// entries are rebuilt with the larger reservation and laid out again,
/// until the page count stops changing. Sources without pages get no
/// entry.
///
/// # Errors
///
/// Fails on an empty title or invalid geometry.
pub fn plan_toc(
    sources: &[PlannedSource],
    engine: &TocLayoutEngine,
    geometry: &PageGeometry,
) -> Result<TocPlan> {
    let mut reserved = 1u32;
    let mut plan = None;

    for round in 0..MAX_PLANNING_ROUNDS {
        let entries = entries_for(sources, reserved)?;
        let pages = engine.layout(&entries, geometry)?;
        let used = pages.len() as u32;
        debug!(round, reserved, used, "planned table of contents");

        let stable = used == reserved || entries.is_empty();
        plan = Some(TocPlan { entries, pages });
        if stable {
            break;
        }
        reserved = used.max(1);
    }

    plan.ok_or_else(|| PdfBindError::other("table of contents planning did not run"))
}

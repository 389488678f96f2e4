//! Routing from (source, target) format pairs to conversion strategies.

use serde::Serialize;
use std::fmt;

use super::format::FormatKind;
use crate::error::{PdfBindError, Result};

/// A conversion procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Copy image bytes unchanged.
    ImageCopy,
    /// Embed a PNG or JPEG as a single PDF page.
    ImageToPdf,
    /// Lay out markdown as paginated PDF text.
    MarkdownToPdf,
    /// Lay out plain text as paginated PDF text.
    TextToPdf,
    /// Strip markdown syntax.
    MarkdownToText,
}

impl Strategy {
    /// Short name for listings and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ImageCopy => "image-copy",
            Self::ImageToPdf => "image-to-pdf",
            Self::MarkdownToPdf => "markdown-to-pdf",
            Self::TextToPdf => "text-to-pdf",
            Self::MarkdownToText => "markdown-to-text",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The routing table. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dispatcher;

impl Dispatcher {
    /// Pick the strategy converting `source` into `target`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfBindError::UnsupportedConversion`] for pairs with no
    /// strategy.
    pub fn route(source: FormatKind, target: FormatKind) -> Result<Strategy> {
        use FormatKind::*;

        match (source, target) {
            (s, t) if s.is_image() && t.is_image() => Ok(Strategy::ImageCopy),
            (Png | Jpeg, Pdf) => Ok(Strategy::ImageToPdf),
            (Markdown, Pdf) => Ok(Strategy::MarkdownToPdf),
            (Text, Pdf) => Ok(Strategy::TextToPdf),
            (Markdown, Text) => Ok(Strategy::MarkdownToText),
            _ => Err(PdfBindError::unsupported_conversion(source, target)),
        }
    }

    /// Every routable pair with its strategy.
    pub fn supported_pairs() -> Vec<(FormatKind, FormatKind, Strategy)> {
        FormatKind::ALL
            .iter()
            .flat_map(|&source| {
                FormatKind::ALL.iter().filter_map(move |&target| {
                    Self::route(source, target)
                        .ok()
                        .map(|strategy| (source, target, strategy))
                })
            })
            .collect()
    }

    /// Formats `source` can be converted into.
    pub fn targets_for(source: FormatKind) -> Vec<FormatKind> {
        FormatKind::ALL
            .into_iter()
            .filter(|&target| Self::route(source, target).is_ok())
            .collect()
    }
}

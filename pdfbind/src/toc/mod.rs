//! Table-of-contents generation.
//!
//! The pipeline has three stages, each usable on its own:
//! - [`plan_toc`] assigns target pages to entries, accounting for the
//!   pages the TOC itself occupies.
//! - [`TocLayoutEngine`] paginates entries into [`LaidOutPage`]s.
//! - [`render`] converts laid-out pages into PDF content streams.

pub mod entries;
pub mod geometry;
pub mod layout;
pub mod metrics;
pub mod render;

pub use entries::{PlannedSource, TocEntry, TocPlan, default_title, plan_toc};
pub use geometry::PageGeometry;
pub use layout::{
    DeferredFooter, LaidOutPage, Point, Primitive, Rgb, TocLayoutEngine, TocStyle, leader_dots,
};
pub use metrics::{FontFace, text_width};

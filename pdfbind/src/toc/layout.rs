//! Table-of-contents pagination.
//!
//! [`TocLayoutEngine::layout`] turns an ordered list of [`TocEntry`] rows
//! into positioned drawing primitives, one [`LaidOutPage`] per generated
//! page. Layout is pure: nothing here touches a PDF document. Page footers
//! depend on the final page count of the assembled document, so each page
//! only carries a [`DeferredFooter`] that the composer resolves in its
//! finalization pass.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::entries::TocEntry;
use super::geometry::PageGeometry;
use super::metrics::{FontFace, text_width};
use crate::error::{PdfBindError, Result};

/// An RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
}

impl Rgb {
    /// Build a color from components.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// A neutral gray.
    pub const fn gray(level: f32) -> Self {
        Self::new(level, level, level)
    }
}

/// A point in page space (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
}

impl Point {
    /// Build a point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A positioned drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// A single line of text starting at `origin` (baseline).
    Text {
        /// The characters to draw.
        text: String,
        /// Font to draw with.
        font: FontFace,
        /// Font size in points.
        size: f32,
        /// Baseline start.
        origin: Point,
        /// Fill color.
        color: Rgb,
    },
    /// A straight stroked line.
    Line {
        /// Start point.
        from: Point,
        /// End point.
        to: Point,
        /// Stroke width.
        thickness: f32,
        /// Stroke color.
        color: Rgb,
    },
    /// A filled circle.
    Dot {
        /// Circle center.
        center: Point,
        /// Circle radius.
        radius: f32,
        /// Fill color.
        color: Rgb,
    },
}

impl Primitive {
    /// Lowest vertical coordinate the primitive reaches.
    pub fn min_y(&self) -> f32 {
        match self {
            Self::Text { origin, .. } => origin.y,
            Self::Line { from, to, .. } => from.y.min(to.y),
            Self::Dot { center, radius, .. } => center.y - radius,
        }
    }
}

/// The footer of a page, waiting for the document's final page count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeferredFooter {
    /// Baseline height of the footer text.
    pub baseline: f32,
    /// Font size.
    pub size: f32,
    /// Fill color.
    pub color: Rgb,
}

impl DeferredFooter {
    /// Footer text for 1-based page `index` of `total`.
    pub fn label(index: usize, total: usize) -> String {
        format!("page {index} of {total}")
    }

    /// Produce the footer text, centered between `left` and `right`.
    pub fn resolve(&self, left: f32, right: f32, index: usize, total: usize) -> Primitive {
        let text = Self::label(index, total);
        let width = text_width(&text, self.size);
        Primitive::Text {
            origin: Point::new(left + (right - left - width) / 2.0, self.baseline),
            text,
            font: FontFace::Regular,
            size: self.size,
            color: self.color,
        }
    }
}

/// One generated TOC page.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutPage {
    /// Drawing operations in paint order.
    pub primitives: Vec<Primitive>,
    /// Indices (into the input entry list) of the rows on this page.
    pub entries: Vec<usize>,
    /// True for every page after the first.
    pub continuation: bool,
    /// Footer to stamp once the total page count is known.
    pub footer: DeferredFooter,
}

impl LaidOutPage {
    /// Text primitives on the page, in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Number of leader dots on the page.
    pub fn dot_count(&self) -> usize {
        self.primitives
            .iter()
            .filter(|p| matches!(p, Primitive::Dot { .. }))
            .count()
    }
}

/// Visual parameters of a generated TOC.
#[derive(Debug, Clone, PartialEq)]
pub struct TocStyle {
    /// Heading on the first page.
    pub heading: String,
    /// Heading on continuation pages.
    pub continued_heading: String,
    /// Font size of the first-page heading.
    pub heading_size: f32,
    /// Font size of continuation headings.
    pub continued_heading_size: f32,
    /// Space between the top margin and the rule on the first page.
    pub heading_height: f32,
    /// Space between the top margin and the rule on continuation pages.
    pub continued_heading_height: f32,
    /// Space between the rule and the first row.
    pub rule_gap: f32,
    /// Rule stroke width on the first page.
    pub rule_thickness: f32,
    /// Rule stroke width on continuation pages.
    pub continued_rule_thickness: f32,
    /// Font size of page numbers.
    pub number_size: f32,
    /// Gap between the leader and the text on either side.
    pub leader_gap: f32,
    /// Distance between leader dots.
    pub dot_pitch: f32,
    /// Radius of a leader dot.
    pub dot_radius: f32,
    /// Height of dots above the row baseline.
    pub dot_rise: f32,
    /// Font size of the footer.
    pub footer_size: f32,
    /// Distance of the footer baseline below the bottom margin.
    pub footer_drop: f32,
    /// Heading color.
    pub heading_color: Rgb,
    /// Color of the first-page rule.
    pub rule_color: Rgb,
    /// Color of continuation rules.
    pub continued_rule_color: Rgb,
    /// Entry title color.
    pub title_color: Rgb,
    /// Page number color.
    pub number_color: Rgb,
    /// Leader dot color.
    pub dot_color: Rgb,
    /// Footer color.
    pub footer_color: Rgb,
}

impl Default for TocStyle {
    fn default() -> Self {
        Self {
            heading: "Contents".to_string(),
            continued_heading: "Contents (continued)".to_string(),
            heading_size: 32.0,
            continued_heading_size: 28.0,
            heading_height: 30.0,
            continued_heading_height: 40.0,
            rule_gap: 25.0,
            rule_thickness: 2.0,
            continued_rule_thickness: 1.0,
            number_size: 11.0,
            leader_gap: 10.0,
            dot_pitch: 8.0,
            dot_radius: 1.5,
            dot_rise: 5.0,
            footer_size: 9.0,
            footer_drop: 10.0,
            heading_color: Rgb::gray(0.0),
            rule_color: Rgb::gray(0.3),
            continued_rule_color: Rgb::gray(0.5),
            title_color: Rgb::gray(0.2),
            number_color: Rgb::new(0.2, 0.4, 0.8),
            dot_color: Rgb::gray(0.6),
            footer_color: Rgb::gray(0.5),
        }
    }
}

impl TocStyle {
    /// Footer placed below the bottom margin of `geometry`.
    pub fn footer(&self, geometry: &PageGeometry) -> DeferredFooter {
        DeferredFooter {
            baseline: geometry.margin_bottom - self.footer_drop,
            size: self.footer_size,
            color: self.footer_color,
        }
    }
}

/// X positions of leader dots between `start` and `end`.
///
/// The count is `floor((end - start) / pitch)` with a minimum of one, so a
/// zero-width leader still gets a dot at `start`. A leader whose end lies
/// before its start (the title overran the row) gets no dots at all.
pub fn leader_dots(start: f32, end: f32, pitch: f32) -> Vec<f32> {
    let width = end - start;
    if width < 0.0 || pitch <= 0.0 {
        return Vec::new();
    }

    let count = ((width / pitch).floor() as usize).max(1);
    (0..count).map(|i| start + i as f32 * pitch).collect()
}

/// Paginates TOC entries onto generated pages.
#[derive(Debug, Clone, Default)]
pub struct TocLayoutEngine {
    style: TocStyle,
}

impl TocLayoutEngine {
    /// Create an engine with the default style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a custom style.
    pub fn with_style(style: TocStyle) -> Self {
        Self { style }
    }

    /// The style in use.
    pub fn style(&self) -> &TocStyle {
        &self.style
    }

    /// Lay out `entries` on as many pages as they need.
    ///
    /// Rows keep their input order, are never split across pages and never
    /// reach below the bottom margin. No entries produce no pages.
    ///
    /// # Errors
    ///
    /// Returns [`PdfBindError::InvalidGeometry`] if `geometry` fails
    /// validation or is too short to hold a heading, its rule and one row.
    pub fn layout(&self, entries: &[TocEntry], geometry: &PageGeometry) -> Result<Vec<LaidOutPage>> {
        geometry.validate()?;
        self.check_room(geometry)?;

        let mut pages = Vec::new();
        if entries.is_empty() {
            return Ok(pages);
        }

        let mut page = self.start_page(geometry, false);
        let mut y = self.first_row_y(geometry, false);

        for (index, entry) in entries.iter().enumerate() {
            if y < geometry.margin_bottom + geometry.line_height {
                pages.push(page);
                page = self.start_page(geometry, true);
                y = self.first_row_y(geometry, true);
            }

            self.place_row(&mut page, entry, geometry, y);
            page.entries.push(index);
            y -= geometry.line_height;
        }
        pages.push(page);

        debug!(entries = entries.len(), pages = pages.len(), "laid out table of contents");
        Ok(pages)
    }

    /// Both page kinds must fit their first row above the bottom margin.
    fn check_room(&self, geometry: &PageGeometry) -> Result<()> {
        let lowest = geometry.margin_bottom + geometry.line_height;
        for continuation in [false, true] {
            let y = self.first_row_y(geometry, continuation);
            if y < lowest {
                return Err(PdfBindError::invalid_geometry(format!(
                    "height {} leaves no room for a table of contents row \
                     (first row at {y}, lowest allowed {lowest})",
                    geometry.height
                )));
            }
        }
        Ok(())
    }

    fn first_row_y(&self, geometry: &PageGeometry, continuation: bool) -> f32 {
        let heading_height = if continuation {
            self.style.continued_heading_height
        } else {
            self.style.heading_height
        };
        geometry.height - geometry.margin_top - heading_height - self.style.rule_gap
    }

    fn start_page(&self, geometry: &PageGeometry, continuation: bool) -> LaidOutPage {
        let style = &self.style;
        let (heading, size, heading_height, thickness, rule_color) = if continuation {
            (
                &style.continued_heading,
                style.continued_heading_size,
                style.continued_heading_height,
                style.continued_rule_thickness,
                style.continued_rule_color,
            )
        } else {
            (
                &style.heading,
                style.heading_size,
                style.heading_height,
                style.rule_thickness,
                style.rule_color,
            )
        };

        let top = geometry.height - geometry.margin_top;
        let rule_y = top - heading_height;

        LaidOutPage {
            primitives: vec![
                Primitive::Text {
                    text: heading.clone(),
                    font: FontFace::Bold,
                    size,
                    origin: Point::new(geometry.margin_left, top),
                    color: style.heading_color,
                },
                Primitive::Line {
                    from: Point::new(geometry.margin_left, rule_y),
                    to: Point::new(geometry.right_edge(), rule_y),
                    thickness,
                    color: rule_color,
                },
            ],
            entries: Vec::new(),
            continuation,
            footer: style.footer(geometry),
        }
    }

    fn place_row(&self, page: &mut LaidOutPage, entry: &TocEntry, geometry: &PageGeometry, y: f32) {
        let style = &self.style;
        let title_width = text_width(entry.title(), geometry.font_size);
        let number = entry.target_page().to_string();
        let number_width = text_width(&number, style.number_size);
        let number_x = geometry.right_edge() - number_width;

        page.primitives.push(Primitive::Text {
            text: entry.title().to_string(),
            font: FontFace::Regular,
            size: geometry.font_size,
            origin: Point::new(geometry.margin_left, y),
            color: style.title_color,
        });

        page.primitives.push(Primitive::Text {
            text: number,
            font: FontFace::Regular,
            size: style.number_size,
            origin: Point::new(number_x, y),
            color: style.number_color,
        });

        let start = geometry.margin_left + title_width + style.leader_gap;
        let end = number_x - style.leader_gap;
        for x in leader_dots(start, end, style.dot_pitch) {
            page.primitives.push(Primitive::Dot {
                center: Point::new(x, y + style.dot_rise),
                radius: style.dot_radius,
                color: style.dot_color,
            });
        }
    }
}

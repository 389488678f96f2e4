//! Page geometry for generated pages.

use serde::{Deserialize, Serialize};

use crate::error::{PdfBindError, Result};

/// A4 width in points.
pub const A4_WIDTH: f32 = 595.28;
/// A4 height in points.
pub const A4_HEIGHT: f32 = 841.89;
/// Default margin on every side.
pub const DEFAULT_MARGIN: f32 = 50.0;
/// Default distance between TOC rows.
pub const DEFAULT_LINE_HEIGHT: f32 = 28.0;
/// Default font size of TOC entry titles.
pub const DEFAULT_FONT_SIZE: f32 = 14.0;

/// Size and margins of a generated page, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    /// Page width.
    pub width: f32,
    /// Page height.
    pub height: f32,
    /// Top margin.
    pub margin_top: f32,
    /// Left margin.
    pub margin_left: f32,
    /// Right margin.
    pub margin_right: f32,
    /// Bottom margin.
    pub margin_bottom: f32,
    /// Vertical advance between rows.
    pub line_height: f32,
    /// Font size of body text.
    pub font_size: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageGeometry {
    /// A4 portrait with 50pt margins and 28pt rows.
    pub fn a4() -> Self {
        Self {
            width: A4_WIDTH,
            height: A4_HEIGHT,
            margin_top: DEFAULT_MARGIN,
            margin_left: DEFAULT_MARGIN,
            margin_right: DEFAULT_MARGIN,
            margin_bottom: DEFAULT_MARGIN,
            line_height: DEFAULT_LINE_HEIGHT,
            font_size: DEFAULT_FONT_SIZE,
        }
    }

    /// Same page with every margin set to `margin`.
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin_top = margin;
        self.margin_left = margin;
        self.margin_right = margin;
        self.margin_bottom = margin;
        self
    }

    /// Same page with a different row advance and body font size.
    pub fn with_text(mut self, line_height: f32, font_size: f32) -> Self {
        self.line_height = line_height;
        self.font_size = font_size;
        self
    }

    /// Horizontal space between the margins.
    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    /// Vertical space between the margins.
    pub fn content_height(&self) -> f32 {
        self.height - self.margin_top - self.margin_bottom
    }

    /// X coordinate of the right margin.
    pub fn right_edge(&self) -> f32 {
        self.width - self.margin_right
    }

    /// Check that the geometry leaves room for content.
    ///
    /// # Errors
    ///
    /// Returns [`PdfBindError::InvalidGeometry`] if a value is not finite,
    /// a margin is negative, the margins consume the whole page, or the
    /// line height or font size is not positive.
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.width,
            self.height,
            self.margin_top,
            self.margin_left,
            self.margin_right,
            self.margin_bottom,
            self.line_height,
            self.font_size,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(PdfBindError::invalid_geometry("values must be finite"));
        }

        if [
            self.margin_top,
            self.margin_left,
            self.margin_right,
            self.margin_bottom,
        ]
        .iter()
        .any(|m| *m < 0.0)
        {
            return Err(PdfBindError::invalid_geometry("margins must not be negative"));
        }

        if self.content_width() <= 0.0 {
            return Err(PdfBindError::invalid_geometry(format!(
                "width {} does not exceed left + right margins",
                self.width
            )));
        }

        if self.content_height() <= 0.0 {
            return Err(PdfBindError::invalid_geometry(format!(
                "height {} does not exceed top + bottom margins",
                self.height
            )));
        }

        if self.line_height <= 0.0 {
            return Err(PdfBindError::invalid_geometry("line height must be positive"));
        }

        if self.font_size <= 0.0 {
            return Err(PdfBindError::invalid_geometry("font size must be positive"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_a4() {
        let geometry = PageGeometry::default();
        assert_eq!(geometry.width, 595.28);
        assert_eq!(geometry.height, 841.89);
        assert_eq!(geometry.margin_left, 50.0);
        assert_eq!(geometry.line_height, 28.0);
        assert!(geometry.validate().is_ok());
    }

    #[test]
    fn test_content_width() {
        let geometry = PageGeometry::a4();
        assert!((geometry.content_width() - 495.28).abs() < 1e-3);
    }

    #[test]
    fn test_margins_wider_than_page() {
        let geometry = PageGeometry::a4().with_margin(300.0);
        assert!(geometry.validate().is_err());
    }

    #[test]
    fn test_zero_line_height() {
        let geometry = PageGeometry::a4().with_text(0.0, 14.0);
        assert!(geometry.validate().is_err());
    }

    #[test]
    fn test_negative_margin() {
        let mut geometry = PageGeometry::a4();
        geometry.margin_bottom = -1.0;
        assert!(geometry.validate().is_err());
    }

    #[test]
    fn test_non_finite() {
        let mut geometry = PageGeometry::a4();
        geometry.width = f32::NAN;
        assert!(geometry.validate().is_err());
    }
}

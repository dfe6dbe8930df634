//! Layout configuration shared by pagination, preview and export.

use crate::types::CanvasSize;

/// Entries (headers + items) per page used for page-break decisions.
pub const MAX_LINES_PER_PAGE: usize = 20;
/// Nominal preview canvas width, used until a live size is known.
pub const PREVIEW_WIDTH: f32 = 900.0;
/// Nominal preview canvas height.
pub const PREVIEW_HEIGHT: f32 = 520.0;

/// Pixel geometry of a rendered page. Export maps this space onto the slide.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Entry budget per page (clamped to at least 2).
    max_lines: usize,
    /// Domain band height.
    pub header_height: f32,
    /// Gap between the band and the first entry.
    pub content_gap: f32,
    /// Space reserved below the content when mapping to a slide.
    pub bottom_margin: f32,
    /// Vertical advance of a subdomain header.
    pub subheader_line: f32,
    /// Extra advance after each wrapped body line (added to the font size).
    pub line_spacing: f32,
    /// Extra advance after each item.
    pub subheader_spacing: f32,
    /// Left/right text margin.
    pub text_margin_x: f32,
    /// Indent of bulleted item lines relative to headers.
    pub bullet_indent: f32,
    /// Height of the timestamp band drawn above an item on export.
    pub timestamp_band: f32,
    /// Domain title size in the preview band (points).
    pub title_size: f32,
    /// Subdomain header size in the preview (points).
    pub subheader_size: f32,
    /// Default position of a newly added image.
    pub image_origin: (f32, f32),
    /// Bounding box for the thumbnail generated when an image is added.
    pub thumbnail_max: u32,
    /// Minimum width and height of a resized image.
    pub min_image_side: f32,
    /// Largest width or height an image may be resized to.
    pub max_image_side: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_lines: MAX_LINES_PER_PAGE,
            header_height: 48.0,
            content_gap: 14.0,
            bottom_margin: 20.0,
            subheader_line: 22.0,
            line_spacing: 6.0,
            subheader_spacing: 8.0,
            text_margin_x: 24.0,
            bullet_indent: 16.0,
            timestamp_band: 20.0,
            title_size: 16.0,
            subheader_size: 13.0,
            image_origin: (60.0, 78.0),
            thumbnail_max: 360,
            min_image_side: 30.0,
            max_image_side: 4.0 * PREVIEW_WIDTH,
        }
    }
}

impl LayoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-page entry budget.
    pub fn with_max_lines(mut self, lines: usize) -> Self {
        // A header plus one item is the smallest page that makes progress.
        self.max_lines = lines.max(2);
        self
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Y coordinate of the first entry below the domain band.
    pub fn content_top(&self) -> f32 {
        self.header_height + self.content_gap
    }

    /// Width available to wrapped item text on a canvas of the given width.
    pub fn wrap_width(&self, canvas: CanvasSize) -> f32 {
        (canvas.width - 2.0 * self.text_margin_x - 10.0).max(1.0)
    }

    /// Height available to entries on a canvas, below the band and above the margin.
    pub fn content_height(&self, canvas: CanvasSize) -> f32 {
        (canvas.height - self.content_top() - self.bottom_margin).max(1.0)
    }

    /// Vertical advance of one wrapped body line at the given font size.
    pub fn body_line_height(&self, font_size: f32) -> f32 {
        font_size + self.line_spacing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_lines_clamped() {
        assert_eq!(LayoutConfig::new().max_lines(), 20);
        assert_eq!(LayoutConfig::new().with_max_lines(5).max_lines(), 5);
        assert_eq!(LayoutConfig::new().with_max_lines(0).max_lines(), 2);
    }

    #[test]
    fn test_derived_geometry() {
        let layout = LayoutConfig::new();
        let canvas = CanvasSize::new(PREVIEW_WIDTH, PREVIEW_HEIGHT);
        assert_eq!(layout.content_top(), 62.0);
        assert_eq!(layout.wrap_width(canvas), 842.0);
        assert_eq!(layout.content_height(canvas), 438.0);
        assert_eq!(layout.body_line_height(12.0), 18.0);
    }

    #[test]
    fn test_tiny_canvas_never_negative() {
        let layout = LayoutConfig::new();
        let canvas = CanvasSize::new(20.0, 30.0);
        assert_eq!(layout.wrap_width(canvas), 1.0);
        assert_eq!(layout.content_height(canvas), 1.0);
    }
}

//! In-memory slide deck: shapes positioned in EMU, plus the embedded media.

use crate::units::{Emu, SLIDE_HEIGHT, SLIDE_WIDTH};
use image::GenericImageView;
use livret_core::{Error, Result, Rgb};
use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Image encodings PowerPoint embeds as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
}

impl MediaFormat {
    pub const ALL: [MediaFormat; 4] = [Self::Png, Self::Jpeg, Self::Gif, Self::Bmp];

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
        }
    }

    /// Detect the format from magic bytes.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF8") {
            Some(Self::Gif)
        } else if bytes.starts_with(b"BM") {
            Some(Self::Bmp)
        } else {
            None
        }
    }
}

/// An embedded image.
#[derive(Debug, Clone)]
pub struct Media {
    pub data: Vec<u8>,
    pub format: MediaFormat,
    pub width_px: u32,
    pub height_px: u32,
}

impl Media {
    /// Width / height of the source pixels.
    pub fn aspect(&self) -> f64 {
        if self.height_px == 0 {
            1.0
        } else {
            self.width_px as f64 / self.height_px as f64
        }
    }
}

pub type MediaId = usize;

/// Position and size of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub x: Emu,
    pub y: Emu,
    pub cx: Emu,
    pub cy: Emu,
}

impl Frame {
    pub fn new(x: Emu, y: Emu, cx: Emu, cy: Emu) -> Self {
        Self { x, y, cx, cy }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// A run of uniformly formatted Arial text.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    /// Points.
    pub size: f64,
    pub bold: bool,
    pub underline: bool,
    pub color: Option<Rgb>,
}

impl Run {
    pub fn new(text: impl Into<String>, size: f64) -> Self {
        Self {
            text: text.into(),
            size,
            bold: false,
            underline: false,
            color: None,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub align: Option<Align>,
    pub level: u8,
}

impl Paragraph {
    pub fn new(run: Run) -> Self {
        Self {
            runs: vec![run],
            align: None,
            level: 0,
        }
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    pub fn level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Solid rectangle without outline.
    Rect { frame: Frame, fill: Rgb },
    Text {
        frame: Frame,
        paragraphs: Vec<Paragraph>,
        wrap: bool,
    },
    Picture {
        frame: Frame,
        media: MediaId,
        name: String,
    },
}

impl Shape {
    pub fn frame(&self) -> Frame {
        match self {
            Self::Rect { frame, .. } | Self::Text { frame, .. } | Self::Picture { frame, .. } => {
                *frame
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slide {
    pub shapes: Vec<Shape>,
}

impl Slide {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rect(&mut self, frame: Frame, fill: Rgb) {
        self.shapes.push(Shape::Rect { frame, fill });
    }

    /// A word-wrapped text box.
    pub fn add_text(&mut self, frame: Frame, paragraphs: Vec<Paragraph>) {
        self.shapes.push(Shape::Text {
            frame,
            paragraphs,
            wrap: true,
        });
    }

    pub fn add_picture(&mut self, frame: Frame, media: MediaId, name: impl Into<String>) {
        self.shapes.push(Shape::Picture {
            frame,
            media,
            name: name.into(),
        });
    }

    /// Paragraph texts of every text box, in insertion order.
    pub fn texts(&self) -> Vec<String> {
        self.shapes
            .iter()
            .filter_map(|shape| match shape {
                Shape::Text { paragraphs, .. } => Some(paragraphs),
                _ => None,
            })
            .flat_map(|paragraphs| paragraphs.iter().map(Paragraph::text))
            .collect()
    }

    pub fn picture_count(&self) -> usize {
        self.shapes
            .iter()
            .filter(|s| matches!(s, Shape::Picture { .. }))
            .count()
    }
}

/// Slides in order plus their shared media.
#[derive(Debug, Clone)]
pub struct Deck {
    pub width: Emu,
    pub height: Emu,
    pub title: String,
    slides: Vec<Slide>,
    media: Vec<Media>,
    by_path: HashMap<PathBuf, MediaId>,
}

impl Default for Deck {
    fn default() -> Self {
        Self {
            width: SLIDE_WIDTH,
            height: SLIDE_HEIGHT,
            title: String::new(),
            slides: Vec::new(),
            media: Vec::new(),
            by_path: HashMap::new(),
        }
    }
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn media(&self) -> &[Media] {
        &self.media
    }

    pub fn media_by_id(&self, id: MediaId) -> Option<&Media> {
        self.media.get(id)
    }

    /// Embed an image file, once per path.
    ///
    /// The image is decoded to validate it and read its size; formats other
    /// than PNG, JPEG, GIF and BMP are re-encoded as PNG.
    pub fn add_image(&mut self, path: impl AsRef<Path>) -> Result<MediaId> {
        let path = path.as_ref();
        if let Some(id) = self.by_path.get(path) {
            return Ok(*id);
        }

        let bytes = fs::read(path).map_err(|e| Error::image(path, e))?;
        let decoded = image::load_from_memory(&bytes).map_err(|e| Error::image(path, e))?;
        let (width_px, height_px) = decoded.dimensions();

        let (data, format) = match MediaFormat::detect(&bytes) {
            Some(format) => (bytes, format),
            None => {
                let mut png = Vec::new();
                decoded
                    .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
                    .map_err(|e| Error::image(path, e))?;
                (png, MediaFormat::Png)
            }
        };

        let id = self.media.len();
        self.media.push(Media {
            data,
            format,
            width_px,
            height_px,
        });
        self.by_path.insert(path.to_path_buf(), id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    #[test]
    fn test_detect_magic() {
        assert_eq!(MediaFormat::detect(b"\x89PNG\r\n"), Some(MediaFormat::Png));
        assert_eq!(MediaFormat::detect(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(MediaFormat::Jpeg));
        assert_eq!(MediaFormat::detect(b"GIF89a"), Some(MediaFormat::Gif));
        assert_eq!(MediaFormat::detect(b"II*\0"), None);
    }

    #[test]
    fn test_add_image_dedupes_by_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.png");
        RgbaImage::from_pixel(40, 20, Rgba([0, 0, 0, 255])).save(&path).unwrap();
        let mut deck = Deck::new();
        let a = deck.add_image(&path).unwrap();
        let b = deck.add_image(&path).unwrap();
        assert_eq!(a, b);
        assert_eq!(deck.media().len(), 1);
        assert_eq!(deck.media()[0].format, MediaFormat::Png);
        assert_eq!(deck.media()[0].aspect(), 2.0);
    }

    #[test]
    fn test_tiff_is_reencoded_as_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.tiff");
        RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255])).save(&path).unwrap();
        let mut deck = Deck::new();
        let id = deck.add_image(&path).unwrap();
        let media = deck.media_by_id(id).unwrap();
        assert_eq!(media.format, MediaFormat::Png);
        assert!(media.data.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn test_missing_image_is_error() {
        let mut deck = Deck::new();
        assert!(matches!(
            deck.add_image("/nonexistent/a.png"),
            Err(Error::ImageError { .. })
        ));
    }

    #[test]
    fn test_slide_texts() {
        let mut slide = Slide::new();
        slide.add_rect(Frame::new(0, 0, 10, 10), Rgb::BLACK);
        slide.add_text(
            Frame::new(0, 0, 10, 10),
            vec![Paragraph::new(Run::new("a", 12.0)), Paragraph::new(Run::new("b", 12.0))],
        );
        assert_eq!(slide.texts(), vec!["a", "b"]);
        assert_eq!(slide.picture_count(), 0);
    }
}

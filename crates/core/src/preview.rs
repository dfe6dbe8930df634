//! On-screen rendering of one page as a list of draw operations.

use crate::catalog::Catalog;
use crate::config::LayoutConfig;
use crate::cover::{
    find_banner, CoverGeometry, InchRect, BANNER_TOP_STEM, COVER_GREY, COVER_TITLE,
    INFO_BOX_OLIVE, INFO_SIZE, PAGE_WIDTH_IN, TITLE_SIZE,
};
use crate::metrics::{wrap_text, ArialMetrics, TextMeasure};
use crate::overlay::OverlayStore;
use crate::paginate::{LineEntry, PageId, Pagination};
use crate::section::PersonalInfo;
use crate::types::{palette_color, CanvasSize, FontSpec, Rgb, DEFAULT_BODY_SIZE};
use std::path::{Path, PathBuf};

const EMPTY_MESSAGE: &str = "Aucune page à afficher";
const COVER_CAPTION: &str = "Couverture";
const CANVAS_DPI: f64 = 96.0;
const EMPTY_TEXT_COLOR: Rgb = Rgb::new(0x66, 0x66, 0x66);

/// Where a text run's (x, y) point sits relative to the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    TopLeft,
    MiddleLeft,
    Center,
}

/// A single drawing primitive in canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Rgb,
    },
    Text {
        x: f32,
        y: f32,
        text: String,
        font: FontSpec,
        color: Rgb,
        anchor: TextAnchor,
    },
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        source: PathBuf,
    },
}

/// The rendered preview of the current page.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub size: CanvasSize,
    pub ops: Vec<DrawOp>,
    /// Navigation caption shown under the canvas.
    pub caption: String,
    /// True when text ran past the bottom of the canvas.
    pub overflow: bool,
}

impl Scene {
    /// Text runs in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Caption for the page at `position` in the flat index.
pub fn page_caption(pagination: &Pagination, position: Option<usize>) -> String {
    let Some((pos, id)) = position.and_then(|p| pagination.flat().get(p).map(|id| (p, id))) else {
        return "Page 0/0 — Aucune page (ajoutez des compétences)".to_string();
    };
    format!(
        "Page {}/{} — Domaine: {} — p.{}/{}",
        pos + 1,
        pagination.page_count(),
        id.domain,
        id.index + 1,
        pagination.pages(&id.domain).len()
    )
}

/// Draws pages with the same wrap widths the exporter uses.
#[derive(Debug, Clone)]
pub struct PreviewRenderer<M = ArialMetrics> {
    layout: LayoutConfig,
    measure: M,
}

impl PreviewRenderer<ArialMetrics> {
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            layout,
            measure: ArialMetrics::new(),
        }
    }
}

impl<M: TextMeasure> PreviewRenderer<M> {
    pub fn with_measure<N: TextMeasure>(self, measure: N) -> PreviewRenderer<N> {
        PreviewRenderer {
            layout: self.layout,
            measure,
        }
    }

    /// Render the page at `position` of the flat index on a canvas of `canvas` size.
    pub fn render(
        &self,
        catalog: &Catalog,
        pagination: &Pagination,
        overlays: &OverlayStore,
        position: Option<usize>,
        canvas: CanvasSize,
    ) -> Scene {
        let mut scene = Scene {
            size: canvas,
            ops: Vec::new(),
            caption: page_caption(pagination, position),
            overflow: false,
        };

        let current = position.and_then(|p| pagination.flat().get(p));
        let Some((id, page)) = current.and_then(|id| pagination.page(id).map(|page| (id, page)))
        else {
            scene.ops.push(DrawOp::Text {
                x: canvas.width / 2.0,
                y: canvas.height / 2.0,
                text: EMPTY_MESSAGE.to_string(),
                font: FontSpec::regular(14.0),
                color: EMPTY_TEXT_COLOR,
                anchor: TextAnchor::Center,
            });
            return scene;
        };

        let (color, body_size) = match catalog.domain(&id.domain) {
            Some(domain) => (domain.color, domain.body_font_size),
            None => (palette_color(0), DEFAULT_BODY_SIZE),
        };
        let layout = &self.layout;

        scene.ops.push(DrawOp::Rect {
            x: 0.0,
            y: 0.0,
            width: canvas.width,
            height: layout.header_height,
            fill: color,
        });
        scene.ops.push(DrawOp::Text {
            x: layout.text_margin_x,
            y: layout.header_height / 2.0,
            text: id.domain.clone(),
            font: FontSpec::bold(layout.title_size),
            color: Rgb::WHITE,
            anchor: TextAnchor::MiddleLeft,
        });

        let body_font = FontSpec::regular(body_size as f32);
        let header_font = FontSpec::bold(layout.subheader_size).underlined();
        let wrap_width = layout.wrap_width(canvas);
        let x = layout.text_margin_x;
        let mut y = layout.content_top();

        for entry in &page.entries {
            match entry {
                LineEntry::Header(subdomain) => {
                    scene.ops.push(DrawOp::Text {
                        x,
                        y,
                        text: subdomain.clone(),
                        font: header_font,
                        color,
                        anchor: TextAnchor::TopLeft,
                    });
                    y += layout.subheader_line;
                }
                LineEntry::Item(item) => {
                    let lines = wrap_text(&self.measure, &item.text, wrap_width, &body_font);
                    for (i, line) in lines.iter().enumerate() {
                        let prefix = if i == 0 { "• " } else { "  " };
                        scene.ops.push(DrawOp::Text {
                            x: x + layout.bullet_indent,
                            y,
                            text: format!("{}{}", prefix, line),
                            font: body_font,
                            color: Rgb::BLACK,
                            anchor: TextAnchor::TopLeft,
                        });
                        y += layout.body_line_height(body_font.size);
                    }
                    y += layout.subheader_spacing;
                }
            }
        }
        scene.overflow = y > canvas.height;
        if scene.overflow {
            log::debug!("Preview of {} overflows the canvas ({} > {})", id, y, canvas.height);
        }

        for overlay in overlays.for_page(id) {
            scene.ops.push(DrawOp::Image {
                x: overlay.x,
                y: overlay.y,
                width: overlay.width,
                height: overlay.height,
                source: overlay.source.clone(),
            });
        }

        scene
    }

    /// Render the cover page scaled to the canvas width.
    ///
    /// Uses the banner image from `assets` when one decodes, otherwise the
    /// grey title band. An unreadable photo is left out.
    pub fn render_cover(
        &self,
        info: &PersonalInfo,
        assets: Option<&Path>,
        canvas: CanvasSize,
    ) -> Scene {
        let banner = assets
            .and_then(|dir| find_banner(dir, BANNER_TOP_STEM))
            .and_then(|path| aspect_of(&path).map(|aspect| (path, aspect)));
        let photo = info
            .photo
            .as_ref()
            .and_then(|path| aspect_of(path).map(|aspect| (path.clone(), aspect)));
        let geometry = CoverGeometry::new(
            banner.as_ref().map(|(_, aspect)| *aspect),
            photo.as_ref().map(|(_, aspect)| *aspect),
        );

        let px_per_inch = canvas.width as f64 / PAGE_WIDTH_IN;
        let scale = |rect: InchRect| {
            (
                (rect.x * px_per_inch) as f32,
                (rect.y * px_per_inch) as f32,
                (rect.w * px_per_inch) as f32,
                (rect.h * px_per_inch) as f32,
            )
        };
        let font_size = |pt: f64| (pt * px_per_inch / CANVAS_DPI) as f32;

        let mut ops = Vec::new();
        let (x, y, width, height) = scale(geometry.banner);
        match banner {
            Some((source, _)) => ops.push(DrawOp::Image {
                x,
                y,
                width,
                height,
                source,
            }),
            None => {
                ops.push(DrawOp::Rect {
                    x,
                    y,
                    width,
                    height,
                    fill: COVER_GREY,
                });
                ops.push(DrawOp::Text {
                    x: width / 2.0,
                    y: height / 2.0,
                    text: COVER_TITLE.to_string(),
                    font: FontSpec::bold(font_size(TITLE_SIZE)),
                    color: Rgb::WHITE,
                    anchor: TextAnchor::Center,
                });
            }
        }

        let (x, y, width, height) = scale(geometry.info_box);
        ops.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill: INFO_BOX_OLIVE,
        });
        let (text_x, mut text_y, _, _) = scale(geometry.info_text);
        let line_height = (INFO_SIZE / 72.0 * 1.2 * px_per_inch) as f32;
        for line in info.cover_lines() {
            ops.push(DrawOp::Text {
                x: text_x,
                y: text_y,
                text: line,
                font: FontSpec::bold(font_size(INFO_SIZE)),
                color: Rgb::WHITE,
                anchor: TextAnchor::TopLeft,
            });
            text_y += line_height;
        }

        if let (Some((source, _)), Some(rect)) = (photo, geometry.photo) {
            let (x, y, width, height) = scale(rect);
            ops.push(DrawOp::Image {
                x,
                y,
                width,
                height,
                source,
            });
        }

        Scene {
            size: canvas,
            ops,
            caption: COVER_CAPTION.to_string(),
            overflow: (geometry.info_box.bottom() * px_per_inch) as f32 > canvas.height,
        }
    }

    /// Render a specific page, regardless of the navigation position.
    pub fn render_page(
        &self,
        catalog: &Catalog,
        pagination: &Pagination,
        overlays: &OverlayStore,
        page: &PageId,
        canvas: CanvasSize,
    ) -> Scene {
        let position = pagination.flat_position(page);
        self.render(catalog, pagination, overlays, position, canvas)
    }
}

/// Width over height of an image file, read from its header.
fn aspect_of(path: &Path) -> Option<f64> {
    match image::image_dimensions(path) {
        Ok((w, h)) if w > 0 && h > 0 => Some(w as f64 / h as f64),
        Ok(_) => None,
        Err(e) => {
            log::warn!("Cannot read {}: {}", path.display(), e);
            None
        }
    }
}

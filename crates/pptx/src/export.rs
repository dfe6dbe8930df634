//! Document exporter.
//!
//! Re-walks the pagination into slides. Vertical layout is computed in the
//! live preview's pixel space, with the same word wrap as the preview, and
//! mapped proportionally onto the slide's content area. A logical page may
//! therefore span several slides when wrapped text runs past the content
//! height.

use crate::deck::{Align, Deck, Frame, MediaId, Paragraph, Run, Slide};
use crate::units::{emu_to_px, inches, Emu, SLIDE_HEIGHT, SLIDE_WIDTH};
use crate::writer::PptxWriter;
use livret_core::cover::{
    find_banner, CoverGeometry, InchRect, BANNER_BOTTOM_STEM, BANNER_TOP_STEM, COVER_GREY,
    COVER_TITLE, INFO_BOX_OLIVE, INFO_SIZE, TITLE_SIZE,
};
use livret_core::paginate::{LineEntry, PageId};
use livret_core::{
    wrap_text, ArialMetrics, CanvasSize, Descriptions, Domain, FontSpec, LayoutConfig, Pagination,
    ProjectState, Result, Rgb, SectionKey, SectionRecord, SelectedItem, TextMeasure,
};
use serde::Serialize;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

const PHOTO_FRAME_GREY: Rgb = Rgb::new(0xF5, 0xF5, 0xF5);
const SYNTHESIS_RED: Rgb = Rgb::new(0xFF, 0x00, 0x00);

const SYNTHESIS_TITLE: &str = "Synthèse";
const SUMMARY_TITLE: &str = "Bilan";

/// Point size of the domain description inside the banner.
const DESCRIPTION_SIZE: f32 = 10.0;
const TIMESTAMP_SIZE: f64 = 10.0;
const SUMMARY_SIZE: f32 = 12.0;

/// Export settings that are not part of the project.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Directory holding the optional cover banner images.
    pub assets_dir: Option<PathBuf>,
    /// Prefix exported items with the student's first name.
    pub personalize: bool,
    pub descriptions: Descriptions,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            assets_dir: None,
            personalize: true,
            descriptions: Descriptions::new(),
        }
    }
}

impl ExportOptions {
    pub fn with_assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = Some(dir.into());
        self
    }

    pub fn with_personalize(mut self, personalize: bool) -> Self {
        self.personalize = personalize;
        self
    }

    pub fn with_descriptions(mut self, descriptions: Descriptions) -> Self {
        self.descriptions = descriptions;
        self
    }
}

/// An image left out of the deck.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedImage {
    pub path: PathBuf,
    pub reason: String,
}

/// What an export produced, including the parts it had to skip.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportReport {
    pub slides: usize,
    pub skipped_images: Vec<SkippedImage>,
    /// Items taller than an empty slide, placed anyway.
    pub forced_items: usize,
}

/// Deck under construction plus the running report.
struct Output {
    deck: Deck,
    report: ExportReport,
}

impl Output {
    /// Embed an image, or record why it was skipped.
    fn embed(&mut self, path: &Path) -> Option<(MediaId, f64)> {
        match self.deck.add_image(path) {
            Ok(id) => {
                let aspect = self.deck.media_by_id(id).map_or(1.0, |m| m.aspect());
                Some((id, aspect))
            }
            Err(e) => {
                log::warn!("Skipping image {}: {}", path.display(), e);
                self.report.skipped_images.push(SkippedImage {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    fn push(&mut self, slide: Slide) {
        self.deck.push_slide(slide);
    }
}

/// Slide area the preview content band maps onto.
#[derive(Debug, Clone, Copy)]
struct ContentArea {
    left: Emu,
    top: Emu,
    width: Emu,
    height: Emu,
    /// Preview y of the first entry.
    origin_px: f32,
    /// Preview height of the content band.
    extent_px: f32,
}

impl ContentArea {
    fn map_y(&self, y_px: f32) -> Emu {
        self.top + self.map_h(y_px - self.origin_px)
    }

    fn map_h(&self, h_px: f32) -> Emu {
        (h_px as f64 / self.extent_px as f64 * self.height as f64).round() as Emu
    }
}

/// Wrapped item text and the preview height it needs.
struct ItemExtent {
    lines: Vec<String>,
    band_px: f32,
    lines_px: f32,
    needed_px: f32,
}

/// Vertical cursor of the slide being filled.
struct Cursor<'a> {
    slide: Slide,
    y: f32,
    last_timestamp: Option<&'a str>,
    has_content: bool,
    has_item: bool,
}

impl<'a> Cursor<'a> {
    fn new(slide: Slide, y: f32) -> Self {
        Self {
            slide,
            y,
            last_timestamp: None,
            has_content: false,
            has_item: false,
        }
    }
}

/// Builds the report deck from a project.
pub struct ReportExporter<M: TextMeasure = ArialMetrics> {
    layout: LayoutConfig,
    options: ExportOptions,
    measure: M,
}

impl ReportExporter<ArialMetrics> {
    pub fn new(layout: LayoutConfig, options: ExportOptions) -> Self {
        Self {
            layout,
            options,
            measure: ArialMetrics::new(),
        }
    }
}

impl<M: TextMeasure> ReportExporter<M> {
    pub fn with_measure<N: TextMeasure>(self, measure: N) -> ReportExporter<N> {
        ReportExporter {
            layout: self.layout,
            options: self.options,
            measure,
        }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Export the project and write the package to `sink`.
    pub fn export<W: Write + Seek>(
        &self,
        state: &ProjectState,
        pagination: &Pagination,
        sink: W,
    ) -> Result<ExportReport> {
        let (deck, report) = self.build(state, pagination);
        PptxWriter::new().write(&deck, sink)?;
        Ok(report)
    }

    pub fn export_to_path(
        &self,
        state: &ProjectState,
        pagination: &Pagination,
        path: impl AsRef<Path>,
    ) -> Result<ExportReport> {
        let (deck, report) = self.build(state, pagination);
        PptxWriter::new().save(&deck, path)?;
        Ok(report)
    }

    /// Lay out the whole deck: cover, domain pages, then section syntheses.
    ///
    /// Never fails; images that cannot be read are left out and listed in
    /// the report.
    pub fn build(&self, state: &ProjectState, pagination: &Pagination) -> (Deck, ExportReport) {
        let mut deck = Deck::new();
        deck.title = state
            .personal
            .default_export_filename()
            .trim_end_matches(".pptx")
            .to_string();
        let mut out = Output {
            deck,
            report: ExportReport::default(),
        };

        self.cover_slide(&mut out, state);
        self.domain_slides(&mut out, state, pagination);
        for (key, record) in state.sections.completed() {
            self.synthesis_slide(&mut out, key, record);
        }

        out.report.slides = out.deck.slides().len();
        log::info!(
            "Built {} slides ({} images skipped, {} oversized items)",
            out.report.slides,
            out.report.skipped_images.len(),
            out.report.forced_items
        );
        (out.deck, out.report)
    }

    /// Height of a domain banner holding `description` wrapped for `canvas`.
    pub fn banner_height(&self, description: &str, canvas: CanvasSize) -> Emu {
        let lines = self.description_lines(description, canvas).len();
        let line_in = DESCRIPTION_SIZE as f64 / 72.0 * 1.25;
        inches((0.65 + lines as f64 * line_in + 0.1).max(1.2))
    }

    /// Description wrapped line by line; an empty source line stays one line.
    fn description_lines(&self, description: &str, canvas: CanvasSize) -> Vec<String> {
        let description = description.trim();
        if description.is_empty() {
            return Vec::new();
        }
        let width = (canvas.width - 40.0).max(50.0);
        let font = FontSpec::regular(DESCRIPTION_SIZE);
        description
            .lines()
            .flat_map(|line| {
                let wrapped = wrap_text(&self.measure, line, width, &font);
                if wrapped.is_empty() {
                    vec![String::new()]
                } else {
                    wrapped
                }
            })
            .collect()
    }

    fn asset(&self, stem: &str) -> Option<PathBuf> {
        find_banner(self.options.assets_dir.as_ref()?, stem)
    }

    fn cover_slide(&self, out: &mut Output, state: &ProjectState) {
        let mut slide = Slide::new();

        let banner = self.asset(BANNER_TOP_STEM).and_then(|path| out.embed(&path));
        let photo = state.personal.photo.as_ref().and_then(|path| out.embed(path));
        let geometry = CoverGeometry::new(
            banner.map(|(_, aspect)| aspect),
            photo.map(|(_, aspect)| aspect),
        );
        let margin = inches(geometry.margin);

        let banner_frame = inch_frame(geometry.banner);
        match banner {
            Some((media, _)) => slide.add_picture(banner_frame, media, BANNER_TOP_STEM),
            None => {
                slide.add_rect(banner_frame, COVER_GREY);
                slide.add_text(
                    banner_frame,
                    vec![
                        Paragraph::new(Run::new(COVER_TITLE, TITLE_SIZE).bold().color(Rgb::WHITE))
                            .align(Align::Center),
                    ],
                );
            }
        }

        // Student info box
        slide.add_rect(inch_frame(geometry.info_box), INFO_BOX_OLIVE);
        let info: Vec<Paragraph> = state
            .personal
            .cover_lines()
            .into_iter()
            .map(|line| Paragraph::new(Run::new(line, INFO_SIZE).bold().color(Rgb::WHITE)))
            .collect();
        if !info.is_empty() {
            slide.add_text(inch_frame(geometry.info_text), info);
        }
        if let (Some((media, _)), Some(rect)) = (photo, geometry.photo) {
            slide.add_picture(inch_frame(rect), media, "photo");
        }

        // One column per section
        let row_top = inches(geometry.sections_top());
        let col_w = (SLIDE_WIDTH - 2 * margin) / SectionKey::ALL.len() as Emu;
        for (i, key) in SectionKey::ALL.iter().enumerate() {
            let record = state.sections.get(*key);
            let x = margin + i as Emu * col_w;
            let inner_w = col_w - inches(0.1);

            let mut paragraphs = vec![Paragraph::new(Run::new(key.label(), 12.0).bold())];
            paragraphs.extend(record.filled_fields().into_iter().map(|(label, value)| {
                Paragraph::new(Run::new(format!("{}: {}", label, value), 10.0)).level(1)
            }));
            slide.add_text(Frame::new(x, row_top, inner_w, inches(1.0)), paragraphs);

            let frame = Frame::new(x, row_top + inches(1.05), inner_w, inches(1.6));
            slide.add_rect(frame, PHOTO_FRAME_GREY);
            if let Some(photo) = &record.photo {
                if let Some((media, aspect)) = out.embed(photo) {
                    slide.add_picture(fit_centered(frame, aspect), media, key.code());
                }
            }
        }

        if let Some((media, aspect)) = self
            .asset(BANNER_BOTTOM_STEM)
            .and_then(|path| out.embed(&path))
        {
            let height = (SLIDE_WIDTH as f64 / aspect).round() as Emu;
            slide.add_picture(
                Frame::new(0, SLIDE_HEIGHT - height, SLIDE_WIDTH, height),
                media,
                BANNER_BOTTOM_STEM,
            );
        }

        out.push(slide);
    }

    fn domain_slides(&self, out: &mut Output, state: &ProjectState, pagination: &Pagination) {
        let canvas = state.canvas;
        let first_name = state.personal.first_name.trim();
        let first_name = if self.options.personalize { first_name } else { "" };

        for domain_pages in pagination.domains() {
            let Some(domain) = state.catalog.domain(&domain_pages.domain) else {
                log::warn!("Domain '{}' missing from catalog, not exported", domain_pages.domain);
                continue;
            };
            let description = self
                .options
                .descriptions
                .domain(&domain.name)
                .unwrap_or_default();
            let banner_h = self.banner_height(description, canvas);

            for (index, page) in domain_pages.pages.iter().enumerate() {
                let page_id = PageId::new(domain.name.clone(), index);
                let area = self.content_area(banner_h, canvas);
                let slides = self.page_slides(
                    out,
                    domain,
                    description,
                    banner_h,
                    area,
                    &page.entries,
                    first_name,
                    canvas,
                );
                log::debug!("{} exported on {} slide(s)", page_id, slides.len());

                let mut slides = slides.into_iter();
                if let Some(mut first) = slides.next() {
                    self.page_images(out, &mut first, state, &page_id);
                    out.push(first);
                }
                for slide in slides {
                    out.push(slide);
                }
            }
        }
    }

    fn content_area(&self, banner_h: Emu, canvas: CanvasSize) -> ContentArea {
        let top = banner_h + inches(0.1);
        ContentArea {
            left: inches(0.6),
            top,
            width: SLIDE_WIDTH - inches(1.2),
            height: SLIDE_HEIGHT - top - inches(0.9),
            origin_px: self.layout.content_top(),
            extent_px: self.layout.content_height(canvas),
        }
    }

    /// Slides for one logical page, breaking when wrapped text overflows.
    #[allow(clippy::too_many_arguments)]
    fn page_slides(
        &self,
        out: &mut Output,
        domain: &Domain,
        description: &str,
        banner_h: Emu,
        area: ContentArea,
        entries: &[LineEntry],
        first_name: &str,
        canvas: CanvasSize,
    ) -> Vec<Slide> {
        let max_y = area.origin_px + area.extent_px;
        let header_px = self.layout.subheader_line;
        let new_slide = || {
            let mut slide = Slide::new();
            self.domain_banner(&mut slide, domain, description, banner_h, canvas);
            Cursor::new(slide, area.origin_px)
        };

        let mut done = Vec::new();
        let mut cursor = new_slide();
        let mut current_sub: Option<&str> = None;

        for (i, entry) in entries.iter().enumerate() {
            match entry {
                LineEntry::Header(sub) => {
                    // Keep the header with the item that follows it.
                    let next_px = match entries.get(i + 1) {
                        Some(LineEntry::Item(item)) => {
                            self.item_extent(
                                item,
                                domain,
                                first_name,
                                cursor.last_timestamp,
                                canvas,
                            )
                            .needed_px
                        }
                        _ => 0.0,
                    };
                    if cursor.has_content && cursor.y + header_px + next_px > max_y {
                        done.push(std::mem::replace(&mut cursor, new_slide()).slide);
                    }
                    self.subdomain_header(&mut cursor, &area, domain, sub);
                    current_sub = Some(sub.as_str());
                }
                LineEntry::Item(item) => {
                    let mut extent = self.item_extent(
                        item,
                        domain,
                        first_name,
                        cursor.last_timestamp,
                        canvas,
                    );
                    if cursor.y + extent.needed_px > max_y && cursor.has_item {
                        done.push(std::mem::replace(&mut cursor, new_slide()).slide);
                        if let Some(sub) = current_sub {
                            self.subdomain_header(&mut cursor, &area, domain, sub);
                        }
                        extent = self.item_extent(item, domain, first_name, None, canvas);
                    }
                    if cursor.y + extent.needed_px > max_y {
                        log::warn!(
                            "Item '{}' is taller than a slide, placing it anyway",
                            item.text
                        );
                        out.report.forced_items += 1;
                    }
                    self.place_item(&mut cursor, &area, item, extent, domain);
                }
            }
        }

        done.push(cursor.slide);
        done
    }

    fn item_extent(
        &self,
        item: &SelectedItem,
        domain: &Domain,
        first_name: &str,
        last_timestamp: Option<&str>,
        canvas: CanvasSize,
    ) -> ItemExtent {
        let text = if first_name.is_empty() {
            format!("• {}", item.text)
        } else {
            format!("• {} {}", first_name, item.text)
        };
        let size = domain.body_font_size as f32;
        let lines = wrap_text(
            &self.measure,
            &text,
            self.layout.wrap_width(canvas),
            &FontSpec::regular(size),
        );
        let lines_px = lines.len() as f32 * self.layout.body_line_height(size);

        let timestamp = item.timestamp.as_deref().map(str::trim).unwrap_or_default();
        let band_px = if !timestamp.is_empty() && Some(timestamp) != last_timestamp {
            self.layout.timestamp_band
        } else {
            0.0
        };

        ItemExtent {
            lines,
            band_px,
            lines_px,
            needed_px: band_px + lines_px + self.layout.subheader_spacing,
        }
    }

    fn subdomain_header(&self, cursor: &mut Cursor, area: &ContentArea, domain: &Domain, sub: &str) {
        let height = area.map_h(self.layout.subheader_line).max(inches(0.4));
        cursor.slide.add_text(
            Frame::new(area.left, area.map_y(cursor.y), area.width, height),
            vec![Paragraph::new(
                Run::new(sub, self.layout.subheader_size as f64)
                    .bold()
                    .underline()
                    .color(domain.color),
            )],
        );
        cursor.y += self.layout.subheader_line;
        cursor.has_content = true;
    }

    fn place_item<'a>(
        &self,
        cursor: &mut Cursor<'a>,
        area: &ContentArea,
        item: &'a SelectedItem,
        extent: ItemExtent,
        domain: &Domain,
    ) {
        if extent.band_px > 0.0 {
            let timestamp = item.timestamp.as_deref().map(str::trim).unwrap_or_default();
            let frame = Frame::new(
                area.left,
                area.map_y(cursor.y),
                area.width,
                area.map_h(extent.band_px),
            );
            cursor.slide.add_rect(frame, Rgb::BLACK);
            cursor.slide.add_text(
                frame,
                vec![Paragraph::new(Run::new(timestamp, TIMESTAMP_SIZE).color(Rgb::WHITE))
                    .align(Align::Center)],
            );
            cursor.y += extent.band_px;
            cursor.last_timestamp = Some(timestamp);
        }

        let size = domain.body_font_size as f64;
        let indent = inches(0.2);
        cursor.slide.add_text(
            Frame::new(
                area.left + indent,
                area.map_y(cursor.y),
                area.width - indent,
                area.map_h(extent.lines_px).max(inches(0.3)),
            ),
            extent
                .lines
                .into_iter()
                .map(|line| Paragraph::new(Run::new(line, size).color(Rgb::BLACK)))
                .collect(),
        );
        cursor.y += extent.lines_px + self.layout.subheader_spacing;
        cursor.has_content = true;
        cursor.has_item = true;
    }

    /// Coloured band with the domain name and its wrapped description.
    fn domain_banner(
        &self,
        slide: &mut Slide,
        domain: &Domain,
        description: &str,
        banner_h: Emu,
        canvas: CanvasSize,
    ) {
        slide.add_rect(Frame::new(0, 0, SLIDE_WIDTH, banner_h), domain.color);
        let text_w = SLIDE_WIDTH - inches(0.8);
        slide.add_text(
            Frame::new(inches(0.4), inches(0.05), text_w, inches(0.6)),
            vec![Paragraph::new(
                Run::new(domain.name.as_str(), 20.0).bold().color(Rgb::WHITE),
            )],
        );

        if !self.description_lines(description, canvas).is_empty() {
            let desc_top = inches(0.65);
            slide.add_text(
                Frame::new(inches(0.4), desc_top, text_w, banner_h - desc_top),
                description
                    .trim()
                    .lines()
                    .map(|line| {
                        Paragraph::new(
                            Run::new(line, DESCRIPTION_SIZE as f64).color(Rgb::WHITE),
                        )
                    })
                    .collect(),
            );
        }
    }

    /// Overlays of a page, scaled from the preview canvas to the slide.
    fn page_images(&self, out: &mut Output, slide: &mut Slide, state: &ProjectState, page: &PageId) {
        let canvas = state.canvas;
        let sx = SLIDE_WIDTH as f64 / canvas.width.max(1.0) as f64;
        let sy = SLIDE_HEIGHT as f64 / canvas.height.max(1.0) as f64;
        for overlay in state.overlays.for_page(page) {
            let Some((media, _)) = out.embed(&overlay.source) else {
                continue;
            };
            let name = overlay
                .source
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            slide.add_picture(
                Frame::new(
                    (overlay.x as f64 * sx).round() as Emu,
                    (overlay.y as f64 * sy).round() as Emu,
                    (overlay.width as f64 * sx).round() as Emu,
                    (overlay.height as f64 * sy).round() as Emu,
                ),
                media,
                name,
            );
        }
    }

    fn synthesis_slide(&self, out: &mut Output, key: SectionKey, record: &SectionRecord) {
        let mut slide = Slide::new();
        let band = Frame::new(0, 0, SLIDE_WIDTH, inches(0.8));
        slide.add_rect(band, SYNTHESIS_RED);
        slide.add_text(
            band,
            vec![Paragraph::new(Run::new(SYNTHESIS_TITLE, 20.0).color(Rgb::BLACK))
                .align(Align::Center)],
        );

        let margin = inches(0.6);
        let width = SLIDE_WIDTH - 2 * margin;
        slide.add_text(
            Frame::new(margin, band.cy + inches(0.2), width, inches(0.6)),
            vec![Paragraph::new(Run::new(key.label(), 18.0)).align(Align::Center)],
        );

        let top = band.cy + inches(1.0);
        let available = SLIDE_HEIGHT - top - inches(0.9);
        if record.second_enabled {
            let box_h = available / 2 - inches(0.2);
            self.summary_box(&mut slide, Frame::new(margin, top, width, box_h), &record.summary);
            self.summary_box(
                &mut slide,
                Frame::new(margin, top + box_h + inches(0.2), width, box_h),
                &record.second_summary,
            );
        } else {
            self.summary_box(&mut slide, Frame::new(margin, top, width, available), &record.summary);
        }

        log::debug!("Synthesis slide for {}", key.code());
        out.push(slide);
    }

    /// "Bilan" title plus the narrative, sized from its wrapped line count.
    fn summary_box(&self, slide: &mut Slide, frame: Frame, text: &str) {
        slide.add_text(
            Frame::new(frame.x, frame.y, frame.cx, inches(0.4)),
            vec![Paragraph::new(Run::new(SUMMARY_TITLE, 14.0).bold())],
        );

        let font = FontSpec::regular(SUMMARY_SIZE);
        let width_px = emu_to_px(frame.cx);
        let lines: usize = text
            .lines()
            .map(|line| wrap_text(&self.measure, line, width_px, &font).len().max(1))
            .sum();
        let line_in = SUMMARY_SIZE as f64 / 72.0 * 1.25;
        let max_h = (frame.cy - inches(0.45)).max(inches(0.8));
        let height = inches(lines.max(1) as f64 * line_in).clamp(inches(0.8), max_h);

        slide.add_text(
            Frame::new(frame.x, frame.y + inches(0.45), frame.cx, height),
            text.lines()
                .map(|line| Paragraph::new(Run::new(line, SUMMARY_SIZE as f64)))
                .collect(),
        );
    }
}

/// Largest frame of the given aspect that fits `outer`, centred in it.
fn inch_frame(rect: InchRect) -> Frame {
    Frame::new(inches(rect.x), inches(rect.y), inches(rect.w), inches(rect.h))
}

fn fit_centered(outer: Frame, aspect: f64) -> Frame {
    let outer_aspect = outer.cx as f64 / outer.cy.max(1) as f64;
    let (cx, cy) = if outer_aspect > aspect {
        ((outer.cy as f64 * aspect).round() as Emu, outer.cy)
    } else {
        (outer.cx, (outer.cx as f64 / aspect).round() as Emu)
    };
    Frame::new(
        outer.x + (outer.cx - cx) / 2,
        outer.y + (outer.cy - cy) / 2,
        cx,
        cy,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::DeckReader;
    use image::{Rgba, RgbaImage};
    use livret_core::overlay::OverlayAnchor;
    use livret_core::{Catalog, Paginator, SectionField, Timestamp};
    use std::io::Cursor as IoCursor;
    use tempfile::TempDir;

    fn state_with(catalog: &str, picks: &[(&str, &str, &[&str])]) -> ProjectState {
        let mut state = ProjectState::new(&LayoutConfig::new());
        state.catalog = Catalog::parse(catalog);
        let ts = Timestamp::new("Mars", "2024");
        for &(domain, sub, texts) in picks {
            state.selection.add_batch(domain, sub, texts, &ts).unwrap();
        }
        state
    }

    fn paginate(state: &ProjectState) -> Pagination {
        Paginator::new().paginate(&state.catalog.domain_order(), state.selection.items())
    }

    fn exporter() -> ReportExporter {
        ReportExporter::new(LayoutConfig::new(), ExportOptions::default())
    }

    fn png(dir: &TempDir, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.path().join(name);
        RgbaImage::from_pixel(w, h, Rgba([10, 20, 30, 255])).save(&path).unwrap();
        path
    }

    #[test]
    fn test_slide_order() {
        let mut state = state_with(
            "##-Domaine Langage\n#-Oral\nXX parler\n##-Domaine Agir\n#-Jeux\nXX courir\n",
            &[("Agir", "Jeux", &["courir"]), ("Langage", "Oral", &["parler"])],
        );
        state.personal.first_name = "Léa".into();
        let record = state.sections.get_mut(SectionKey::Ms);
        for field in SectionField::ALL {
            record.set_field(field, "x");
        }
        let pagination = paginate(&state);

        let mut buffer = IoCursor::new(Vec::new());
        let report = exporter().export(&state, &pagination, &mut buffer).unwrap();
        assert_eq!(report.slides, 4);
        buffer.set_position(0);

        let outline = DeckReader::new().read(buffer).unwrap();
        assert_eq!(outline.slides.len(), 4);
        assert!(outline.slides[0].contains(COVER_TITLE));
        assert!(outline.slides[0].contains("Prénom: Léa"));
        // Catalog order, not selection order
        assert!(outline.slides[1].contains("Langage"));
        assert!(outline.slides[1].contains("• Léa parler"));
        assert!(outline.slides[2].contains("Agir"));
        assert!(outline.slides[3].contains(SYNTHESIS_TITLE));
        assert!(outline.slides[3].contains("MOYENNE SECTION"));
    }

    #[test]
    fn test_personalize_off() {
        let mut state = state_with("##-Domaine Agir\n#-Jeux\nXX courir\n", &[("Agir", "Jeux", &["courir"])]);
        state.personal.first_name = "Léa".into();
        let exporter = ReportExporter::new(
            LayoutConfig::new(),
            ExportOptions::default().with_personalize(false),
        );
        let (deck, _) = exporter.build(&state, &paginate(&state));
        assert!(deck.slides()[1].texts().contains(&"• courir".to_string()));
    }

    #[test]
    fn test_banner_grows_with_description() {
        let exporter = exporter();
        let canvas = CanvasSize::new(900.0, 520.0);
        assert_eq!(exporter.banner_height("", canvas), inches(1.2));

        let description = vec!["aaaa"; 60].join(" ");
        assert_eq!(exporter.description_lines(&description, canvas).len(), 3);
        let expected = inches(0.65 + 3.0 * 10.0 / 72.0 * 1.25 + 0.1);
        let height = exporter.banner_height(&description, canvas);
        assert!((height - expected).abs() <= 1);
        assert!(height > inches(1.2));
    }

    #[test]
    fn test_timestamp_band_once_per_slide() {
        let state = state_with(
            "##-Domaine Agir\n#-Jeux\nXX courir\nXX sauter\n",
            &[("Agir", "Jeux", &["courir", "sauter"])],
        );
        let (deck, _) = exporter().build(&state, &paginate(&state));
        let texts = deck.slides()[1].texts();
        assert_eq!(texts.iter().filter(|t| t.as_str() == "Mars 2024").count(), 1);
    }

    #[test]
    fn test_overflow_repeats_header_on_next_slide() {
        // 20 entries fit the line budget but not the visual height.
        let texts: Vec<String> = (0..19)
            .map(|i| format!("compétence numéro {} avec un texte assez long pour remplir une ligne entière de la zone d'aperçu et même déborder sur une seconde ligne", i))
            .collect();
        let catalog = format!(
            "##-Domaine Agir\n#-Jeux\n{}",
            texts.iter().map(|t| format!("XX {}\n", t)).collect::<String>()
        );
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let state = state_with(&catalog, &[("Agir", "Jeux", refs.as_slice())]);
        let pagination = paginate(&state);
        assert_eq!(pagination.page_count(), 1);

        let (deck, report) = exporter().build(&state, &pagination);
        assert_eq!(report.forced_items, 0);
        let domain_slides = &deck.slides()[1..];
        assert!(domain_slides.len() > 1);
        for slide in domain_slides {
            assert!(slide.texts().contains(&"Jeux".to_string()));
        }
        let placed: usize = domain_slides
            .iter()
            .map(|s| s.texts().iter().filter(|t| t.starts_with("• ")).count())
            .sum();
        assert_eq!(placed, 19);
    }

    #[test]
    fn test_oversized_item_is_forced() {
        let long = vec!["mot"; 2000].join(" ");
        let catalog = format!("##-Domaine Agir\n#-Jeux\nXX {}\n", long);
        let state = state_with(&catalog, &[("Agir", "Jeux", &[long.as_str()])]);
        let (deck, report) = exporter().build(&state, &paginate(&state));
        assert_eq!(report.forced_items, 1);
        assert_eq!(deck.slides().len(), 2);
    }

    #[test]
    fn test_images_only_on_first_slide_and_missing_skipped() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with("##-Domaine Agir\n#-Jeux\nXX courir\n", &[("Agir", "Jeux", &["courir"])]);
        let good = png(&dir, "good.png", 90, 52);
        let gone = png(&dir, "gone.png", 10, 10);
        let anchor = OverlayAnchor::Page(PageId::new("Agir", 0));
        state.overlays.add(anchor.clone(), &good).unwrap();
        state.overlays.add(anchor, &gone).unwrap();
        std::fs::remove_file(&gone).unwrap();

        let (deck, report) = exporter().build(&state, &paginate(&state));
        assert_eq!(report.skipped_images.len(), 1);
        assert_eq!(report.skipped_images[0].path, gone);
        assert_eq!(deck.slides()[1].picture_count(), 1);

        // 900x520 canvas onto a 10x7.5 in slide
        let overlay = &state.overlays.get(&OverlayAnchor::Page(PageId::new("Agir", 0)))[0];
        let frame = deck.slides()[1]
            .shapes
            .iter()
            .find_map(|s| match s {
                crate::deck::Shape::Picture { frame, .. } => Some(*frame),
                _ => None,
            })
            .unwrap();
        let expected_x = (overlay.x as f64 * SLIDE_WIDTH as f64 / 900.0).round() as Emu;
        assert_eq!(frame.x, expected_x);
    }

    #[test]
    fn test_cover_uses_banner_asset() {
        let dir = TempDir::new().unwrap();
        png(&dir, "banniere-top.png", 1000, 100);
        let state = state_with("##-Domaine Agir\nXX courir\n", &[]);
        let exporter = ReportExporter::new(
            LayoutConfig::new(),
            ExportOptions::default().with_assets_dir(dir.path()),
        );
        let (deck, report) = exporter.build(&state, &paginate(&state));
        assert!(report.skipped_images.is_empty());
        let cover = &deck.slides()[0];
        assert_eq!(cover.picture_count(), 1);
        assert!(!cover.texts().contains(&COVER_TITLE.to_string()));
        assert_eq!(cover.shapes[0].frame().cy, SLIDE_WIDTH / 10);
    }

    #[test]
    fn test_cover_follows_shared_geometry() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with("##-Domaine Agir\nXX courir\n", &[]);
        state.personal.last_name = "Dupont".into();
        state.personal.photo = Some(png(&dir, "photo.png", 30, 60));

        let (deck, _) = exporter().build(&state, &paginate(&state));
        let cover = &deck.slides()[0];
        let geometry = CoverGeometry::new(None, Some(0.5));

        let info_box = cover.shapes.iter().find_map(|s| match s {
            crate::deck::Shape::Rect { frame, fill } if *fill == INFO_BOX_OLIVE => Some(*frame),
            _ => None,
        });
        assert_eq!(info_box, Some(inch_frame(geometry.info_box)));
        let photo = cover.shapes.iter().find_map(|s| match s {
            crate::deck::Shape::Picture { frame, name, .. } if name == "photo" => Some(*frame),
            _ => None,
        });
        assert_eq!(photo, geometry.photo.map(inch_frame));
        assert!(cover.texts().contains(&"Nom: Dupont".to_string()));
    }

    #[test]
    fn test_second_summary_splits_height() {
        let mut state = state_with("##-Domaine Agir\nXX courir\n", &[]);
        let record = state.sections.get_mut(SectionKey::Gs);
        record.set_completed(true);
        record.summary = "Premier bilan".into();
        record.second_summary = "Second bilan\nsur deux lignes".into();
        record.second_enabled = true;

        let (deck, _) = exporter().build(&state, &paginate(&state));
        assert_eq!(deck.slides().len(), 2);
        let texts = deck.slides()[1].texts();
        assert_eq!(texts.iter().filter(|t| t.as_str() == SUMMARY_TITLE).count(), 2);
        assert!(texts.contains(&"sur deux lignes".to_string()));
    }

    #[test]
    fn test_fit_centered() {
        let outer = Frame::new(0, 0, 200, 100);
        assert_eq!(fit_centered(outer, 1.0), Frame::new(50, 0, 100, 100));
        assert_eq!(fit_centered(outer, 4.0), Frame::new(0, 25, 200, 50));
    }
}

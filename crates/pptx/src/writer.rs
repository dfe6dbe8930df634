//! PPTX package writer.
//!
//! Produces the smallest package PowerPoint and LibreOffice open without
//! repair: one master, one blank layout, one theme, the slides and their
//! media.

use crate::deck::{Align, Deck, Frame, MediaFormat, MediaId, Paragraph, Shape, Slide};
use livret_core::{Error, Result, Rgb};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_PKG_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";

const MASTER_ID: u32 = 2_147_483_648;
const FIRST_SLIDE_ID: usize = 256;

/// Writes a [`Deck`] as a `.pptx` package.
#[derive(Debug, Default)]
pub struct PptxWriter;

impl PptxWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write the package to a file, replacing it.
    pub fn save(&self, deck: &Deck, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        let mut out = BufWriter::new(file);
        self.write(deck, &mut out)?;
        out.flush()?;
        log::info!(
            "Wrote {} slides to {}",
            deck.slides().len(),
            path.display()
        );
        Ok(())
    }

    /// Write the package to any seekable sink.
    pub fn write<W: Write + Seek>(&self, deck: &Deck, sink: W) -> Result<()> {
        let mut zip = ZipWriter::new(sink);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let put = |zip: &mut ZipWriter<W>, name: &str, data: &[u8]| -> Result<()> {
            zip.start_file(name, options)
                .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", name, e)))?;
            zip.write_all(data)?;
            Ok(())
        };

        put(&mut zip, "[Content_Types].xml", &content_types_xml(deck)?)?;
        put(&mut zip, "_rels/.rels", ROOT_RELS.as_bytes())?;
        put(&mut zip, "docProps/core.xml", &core_props_xml(&deck.title)?)?;
        put(&mut zip, "docProps/app.xml", &app_props_xml(deck.slides().len())?)?;
        put(&mut zip, "ppt/presentation.xml", &presentation_xml(deck)?)?;
        put(
            &mut zip,
            "ppt/_rels/presentation.xml.rels",
            &presentation_rels_xml(deck.slides().len())?,
        )?;
        put(&mut zip, "ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER.as_bytes())?;
        put(
            &mut zip,
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            SLIDE_MASTER_RELS.as_bytes(),
        )?;
        put(&mut zip, "ppt/slideLayouts/slideLayout1.xml", SLIDE_LAYOUT.as_bytes())?;
        put(
            &mut zip,
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            SLIDE_LAYOUT_RELS.as_bytes(),
        )?;
        put(&mut zip, "ppt/theme/theme1.xml", THEME.as_bytes())?;

        for (index, slide) in deck.slides().iter().enumerate() {
            let number = index + 1;
            let media = slide_media(slide);
            put(
                &mut zip,
                &format!("ppt/slides/slide{}.xml", number),
                &slide_xml(slide, &media)?,
            )?;
            put(
                &mut zip,
                &format!("ppt/slides/_rels/slide{}.xml.rels", number),
                &slide_rels_xml(deck, &media)?,
            )?;
        }

        for (id, media) in deck.media().iter().enumerate() {
            put(&mut zip, &media_path(id, media.format), &media.data)?;
        }

        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))?;
        log::debug!(
            "Packaged {} slides and {} media files",
            deck.slides().len(),
            deck.media().len()
        );
        Ok(())
    }
}

fn media_path(id: MediaId, format: MediaFormat) -> String {
    format!("ppt/media/image{}.{}", id + 1, format.extension())
}

/// Media referenced by a slide, in first-use order. Relationship ids are
/// `rId2` onwards, `rId1` being the layout.
fn slide_media(slide: &Slide) -> Vec<MediaId> {
    let mut used = Vec::new();
    for shape in &slide.shapes {
        if let Shape::Picture { media, .. } = shape {
            if !used.contains(media) {
                used.push(*media);
            }
        }
    }
    used
}

fn rel_type(kind: &str) -> String {
    format!("{}/{}", REL_BASE, kind)
}

/// Thin helper over the quick-xml writer.
struct Xml {
    writer: Writer<Vec<u8>>,
}

impl Xml {
    fn new() -> Result<Self> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(Self { writer })
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut elem = BytesStart::new(name);
        for attr in attrs {
            elem.push_attribute(*attr);
        }
        self.writer.write_event(Event::Start(elem))?;
        Ok(())
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut elem = BytesStart::new(name);
        for attr in attrs {
            elem.push_attribute(*attr);
        }
        self.writer.write_event(Event::Empty(elem))?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    fn leaf(&mut self, name: &str, text: &str) -> Result<()> {
        self.start(name, &[])?;
        self.text(text)?;
        self.end(name)
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

fn content_types_xml(deck: &Deck) -> Result<Vec<u8>> {
    let mut x = Xml::new()?;
    x.start("Types", &[("xmlns", NS_CONTENT_TYPES)])?;
    x.empty(
        "Default",
        &[
            ("Extension", "rels"),
            ("ContentType", "application/vnd.openxmlformats-package.relationships+xml"),
        ],
    )?;
    x.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
    for format in MediaFormat::ALL {
        x.empty(
            "Default",
            &[("Extension", format.extension()), ("ContentType", format.content_type())],
        )?;
    }

    let mut parts = vec![
        ("/ppt/presentation.xml".to_string(), CT_PRESENTATION),
        ("/ppt/slideMasters/slideMaster1.xml".to_string(), CT_MASTER),
        ("/ppt/slideLayouts/slideLayout1.xml".to_string(), CT_LAYOUT),
        ("/ppt/theme/theme1.xml".to_string(), CT_THEME),
        (
            "/docProps/core.xml".to_string(),
            "application/vnd.openxmlformats-package.core-properties+xml",
        ),
        (
            "/docProps/app.xml".to_string(),
            "application/vnd.openxmlformats-officedocument.extended-properties+xml",
        ),
    ];
    for number in 1..=deck.slides().len() {
        parts.push((format!("/ppt/slides/slide{}.xml", number), CT_SLIDE));
    }
    for (part, content_type) in &parts {
        x.empty("Override", &[("PartName", part), ("ContentType", content_type)])?;
    }

    x.end("Types")?;
    Ok(x.finish())
}

fn core_props_xml(title: &str) -> Result<Vec<u8>> {
    let mut x = Xml::new()?;
    x.start(
        "cp:coreProperties",
        &[
            (
                "xmlns:cp",
                "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
            ),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    )?;
    x.leaf("dc:title", title)?;
    x.leaf("dc:creator", "livret")?;
    x.end("cp:coreProperties")?;
    Ok(x.finish())
}

fn app_props_xml(slides: usize) -> Result<Vec<u8>> {
    let mut x = Xml::new()?;
    x.start(
        "Properties",
        &[(
            "xmlns",
            "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties",
        )],
    )?;
    x.leaf("Application", "livret")?;
    x.leaf("Slides", &slides.to_string())?;
    x.end("Properties")?;
    Ok(x.finish())
}

fn presentation_xml(deck: &Deck) -> Result<Vec<u8>> {
    let mut x = Xml::new()?;
    x.start(
        "p:presentation",
        &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P), ("saveSubsetFonts", "1")],
    )?;

    x.start("p:sldMasterIdLst", &[])?;
    x.empty("p:sldMasterId", &[("id", &MASTER_ID.to_string()), ("r:id", "rId1")])?;
    x.end("p:sldMasterIdLst")?;

    if !deck.slides().is_empty() {
        x.start("p:sldIdLst", &[])?;
        for index in 0..deck.slides().len() {
            let id = (FIRST_SLIDE_ID + index).to_string();
            let rid = format!("rId{}", index + 2);
            x.empty("p:sldId", &[("id", &id), ("r:id", &rid)])?;
        }
        x.end("p:sldIdLst")?;
    }

    x.empty(
        "p:sldSz",
        &[
            ("cx", &deck.width.to_string()),
            ("cy", &deck.height.to_string()),
        ],
    )?;
    x.empty("p:notesSz", &[("cx", "6858000"), ("cy", "9144000")])?;
    x.end("p:presentation")?;
    Ok(x.finish())
}

fn presentation_rels_xml(slides: usize) -> Result<Vec<u8>> {
    let mut x = Xml::new()?;
    x.start("Relationships", &[("xmlns", NS_PKG_RELS)])?;
    x.empty(
        "Relationship",
        &[
            ("Id", "rId1"),
            ("Type", &rel_type("slideMaster")),
            ("Target", "slideMasters/slideMaster1.xml"),
        ],
    )?;
    for index in 0..slides {
        x.empty(
            "Relationship",
            &[
                ("Id", &format!("rId{}", index + 2)),
                ("Type", &rel_type("slide")),
                ("Target", &format!("slides/slide{}.xml", index + 1)),
            ],
        )?;
    }
    x.empty(
        "Relationship",
        &[
            ("Id", &format!("rId{}", slides + 2)),
            ("Type", &rel_type("theme")),
            ("Target", "theme/theme1.xml"),
        ],
    )?;
    x.end("Relationships")?;
    Ok(x.finish())
}

fn slide_rels_xml(deck: &Deck, media: &[MediaId]) -> Result<Vec<u8>> {
    let mut x = Xml::new()?;
    x.start("Relationships", &[("xmlns", NS_PKG_RELS)])?;
    x.empty(
        "Relationship",
        &[
            ("Id", "rId1"),
            ("Type", &rel_type("slideLayout")),
            ("Target", "../slideLayouts/slideLayout1.xml"),
        ],
    )?;
    for (k, id) in media.iter().enumerate() {
        let format = deck
            .media_by_id(*id)
            .map(|m| m.format)
            .ok_or_else(|| Error::ExportError(format!("Unknown media #{}", id)))?;
        let target = format!("../media/image{}.{}", id + 1, format.extension());
        x.empty(
            "Relationship",
            &[
                ("Id", &format!("rId{}", k + 2)),
                ("Type", &rel_type("image")),
                ("Target", &target),
            ],
        )?;
    }
    x.end("Relationships")?;
    Ok(x.finish())
}

fn slide_xml(slide: &Slide, media: &[MediaId]) -> Result<Vec<u8>> {
    let mut x = Xml::new()?;
    x.start("p:sld", &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P)])?;
    x.start("p:cSld", &[])?;
    x.start("p:spTree", &[])?;

    x.start("p:nvGrpSpPr", &[])?;
    x.empty("p:cNvPr", &[("id", "1"), ("name", "")])?;
    x.empty("p:cNvGrpSpPr", &[])?;
    x.empty("p:nvPr", &[])?;
    x.end("p:nvGrpSpPr")?;
    x.start("p:grpSpPr", &[])?;
    write_xfrm(&mut x, Frame::new(0, 0, 0, 0), true)?;
    x.end("p:grpSpPr")?;

    for (index, shape) in slide.shapes.iter().enumerate() {
        // id 1 is the group itself
        let id = index + 2;
        match shape {
            Shape::Rect { frame, fill } => write_rect(&mut x, id, *frame, *fill)?,
            Shape::Text {
                frame,
                paragraphs,
                wrap,
            } => write_text_box(&mut x, id, *frame, paragraphs, *wrap)?,
            Shape::Picture {
                frame,
                media: media_id,
                name,
            } => {
                let position = media.iter().position(|m| m == media_id).ok_or_else(|| {
                    Error::ExportError(format!("Media #{} not related to slide", media_id))
                })?;
                write_picture(&mut x, id, *frame, position + 2, name)?;
            }
        }
    }

    x.end("p:spTree")?;
    x.end("p:cSld")?;
    x.start("p:clrMapOvr", &[])?;
    x.empty("a:masterClrMapping", &[])?;
    x.end("p:clrMapOvr")?;
    x.end("p:sld")?;
    Ok(x.finish())
}

fn write_xfrm(x: &mut Xml, frame: Frame, group: bool) -> Result<()> {
    x.start("a:xfrm", &[])?;
    x.empty("a:off", &[("x", &frame.x.to_string()), ("y", &frame.y.to_string())])?;
    x.empty("a:ext", &[("cx", &frame.cx.to_string()), ("cy", &frame.cy.to_string())])?;
    if group {
        x.empty("a:chOff", &[("x", "0"), ("y", "0")])?;
        x.empty("a:chExt", &[("cx", "0"), ("cy", "0")])?;
    }
    x.end("a:xfrm")
}

fn write_rect_geometry(x: &mut Xml) -> Result<()> {
    x.start("a:prstGeom", &[("prst", "rect")])?;
    x.empty("a:avLst", &[])?;
    x.end("a:prstGeom")
}

fn write_solid_fill(x: &mut Xml, color: Rgb) -> Result<()> {
    x.start("a:solidFill", &[])?;
    x.empty("a:srgbClr", &[("val", &color.hex_digits())])?;
    x.end("a:solidFill")
}

fn write_rect(x: &mut Xml, id: usize, frame: Frame, fill: Rgb) -> Result<()> {
    let id_str = id.to_string();
    let name = format!("Rectangle {}", id);
    x.start("p:sp", &[])?;
    x.start("p:nvSpPr", &[])?;
    x.empty("p:cNvPr", &[("id", &id_str), ("name", &name)])?;
    x.empty("p:cNvSpPr", &[])?;
    x.empty("p:nvPr", &[])?;
    x.end("p:nvSpPr")?;

    x.start("p:spPr", &[])?;
    write_xfrm(x, frame, false)?;
    write_rect_geometry(x)?;
    write_solid_fill(x, fill)?;
    x.start("a:ln", &[])?;
    x.empty("a:noFill", &[])?;
    x.end("a:ln")?;
    x.end("p:spPr")?;
    x.end("p:sp")
}

fn write_text_box(
    x: &mut Xml,
    id: usize,
    frame: Frame,
    paragraphs: &[Paragraph],
    wrap: bool,
) -> Result<()> {
    let id_str = id.to_string();
    let name = format!("TextBox {}", id);
    x.start("p:sp", &[])?;
    x.start("p:nvSpPr", &[])?;
    x.empty("p:cNvPr", &[("id", &id_str), ("name", &name)])?;
    x.empty("p:cNvSpPr", &[("txBox", "1")])?;
    x.empty("p:nvPr", &[])?;
    x.end("p:nvSpPr")?;

    x.start("p:spPr", &[])?;
    write_xfrm(x, frame, false)?;
    write_rect_geometry(x)?;
    x.empty("a:noFill", &[])?;
    x.end("p:spPr")?;

    x.start("p:txBody", &[])?;
    x.empty(
        "a:bodyPr",
        &[("wrap", if wrap { "square" } else { "none" }), ("rtlCol", "0")],
    )?;
    x.empty("a:lstStyle", &[])?;
    if paragraphs.is_empty() {
        x.empty("a:p", &[])?;
    }
    for paragraph in paragraphs {
        write_paragraph(x, paragraph)?;
    }
    x.end("p:txBody")?;
    x.end("p:sp")
}

fn write_paragraph(x: &mut Xml, paragraph: &Paragraph) -> Result<()> {
    x.start("a:p", &[])?;

    let level = paragraph.level.to_string();
    let mut ppr: Vec<(&str, &str)> = Vec::new();
    match paragraph.align {
        Some(Align::Center) => ppr.push(("algn", "ctr")),
        Some(Align::Left) => ppr.push(("algn", "l")),
        None => {}
    }
    if paragraph.level > 0 {
        ppr.push(("lvl", level.as_str()));
    }
    if !ppr.is_empty() {
        x.empty("a:pPr", &ppr)?;
    }

    for run in &paragraph.runs {
        let size = ((run.size * 100.0).round() as i64).to_string();
        let mut rpr: Vec<(&str, &str)> = vec![("lang", "fr-FR"), ("sz", size.as_str())];
        if run.bold {
            rpr.push(("b", "1"));
        }
        if run.underline {
            rpr.push(("u", "sng"));
        }
        rpr.push(("dirty", "0"));

        x.start("a:r", &[])?;
        x.start("a:rPr", &rpr)?;
        if let Some(color) = run.color {
            write_solid_fill(x, color)?;
        }
        x.empty("a:latin", &[("typeface", livret_core::FontSpec::FAMILY)])?;
        x.end("a:rPr")?;
        x.leaf("a:t", &run.text)?;
        x.end("a:r")?;
    }

    x.end("a:p")
}

fn write_picture(x: &mut Xml, id: usize, frame: Frame, rel: usize, name: &str) -> Result<()> {
    let id_str = id.to_string();
    let title = format!("Picture {}", id);
    let rid = format!("rId{}", rel);
    x.start("p:pic", &[])?;
    x.start("p:nvPicPr", &[])?;
    x.empty("p:cNvPr", &[("id", &id_str), ("name", &title), ("descr", name)])?;
    x.start("p:cNvPicPr", &[])?;
    x.empty("a:picLocks", &[("noChangeAspect", "1")])?;
    x.end("p:cNvPicPr")?;
    x.empty("p:nvPr", &[])?;
    x.end("p:nvPicPr")?;

    x.start("p:blipFill", &[])?;
    x.empty("a:blip", &[("r:embed", &rid)])?;
    x.start("a:stretch", &[])?;
    x.empty("a:fillRect", &[])?;
    x.end("a:stretch")?;
    x.end("p:blipFill")?;

    x.start("p:spPr", &[])?;
    write_xfrm(x, frame, false)?;
    write_rect_geometry(x)?;
    x.end("p:spPr")?;
    x.end("p:pic")
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/></Relationships>"#;

const SLIDE_MASTER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst><p:txStyles><p:titleStyle/><p:bodyStyle/><p:otherStyle/></p:txStyles></p:sldMaster>"#;

const SLIDE_MASTER_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="../theme/theme1.xml"/></Relationships>"#;

const SLIDE_LAYOUT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="blank" preserve="1"><p:cSld name="Blank"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#;

const SLIDE_LAYOUT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/></Relationships>"#;

const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Livret"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="1F497D"/></a:dk2><a:lt2><a:srgbClr val="EEECE1"/></a:lt2><a:accent1><a:srgbClr val="4F81BD"/></a:accent1><a:accent2><a:srgbClr val="C0504D"/></a:accent2><a:accent3><a:srgbClr val="9BBB59"/></a:accent3><a:accent4><a:srgbClr val="8064A2"/></a:accent4><a:accent5><a:srgbClr val="4BACC6"/></a:accent5><a:accent6><a:srgbClr val="F79646"/></a:accent6><a:hlink><a:srgbClr val="0000FF"/></a:hlink><a:folHlink><a:srgbClr val="800080"/></a:folHlink></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Arial"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Arial"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst><a:lnStyleLst><a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="25400"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="38100"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst></a:fmtScheme></a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>"#;

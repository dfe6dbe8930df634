//! SVG serialisation of a preview [`Scene`].

use crate::preview::{DrawOp, Scene, TextAnchor};
use crate::types::FontSpec;
use crate::{Error, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Font sizes are in points; the canvas is at 96 dpi.
const PX_PER_PT: f32 = 96.0 / 72.0;

fn num(v: f32) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    format!("{}", rounded)
}

/// Render a scene as a standalone SVG document.
pub fn scene_to_svg(scene: &Scene) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let width = num(scene.size.width);
    let height = num(scene.size.height);
    let view_box = format!("0 0 {} {}", width, height);
    let mut root = BytesStart::new("svg");
    root.push_attribute(("xmlns", "http://www.w3.org/2000/svg"));
    root.push_attribute(("width", width.as_str()));
    root.push_attribute(("height", height.as_str()));
    root.push_attribute(("viewBox", view_box.as_str()));
    writer.write_event(Event::Start(root))?;

    let mut background = BytesStart::new("rect");
    background.push_attribute(("width", "100%"));
    background.push_attribute(("height", "100%"));
    background.push_attribute(("fill", "#FFFFFF"));
    writer.write_event(Event::Empty(background))?;

    for op in &scene.ops {
        match op {
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                fill,
            } => {
                let mut rect = BytesStart::new("rect");
                rect.push_attribute(("x", num(*x).as_str()));
                rect.push_attribute(("y", num(*y).as_str()));
                rect.push_attribute(("width", num(*width).as_str()));
                rect.push_attribute(("height", num(*height).as_str()));
                rect.push_attribute(("fill", fill.to_string().as_str()));
                writer.write_event(Event::Empty(rect))?;
            }
            DrawOp::Text {
                x,
                y,
                text,
                font,
                color,
                anchor,
            } => {
                let (text_anchor, baseline) = match anchor {
                    TextAnchor::TopLeft => ("start", "hanging"),
                    TextAnchor::MiddleLeft => ("start", "middle"),
                    TextAnchor::Center => ("middle", "middle"),
                };
                let mut elem = BytesStart::new("text");
                elem.push_attribute(("x", num(*x).as_str()));
                elem.push_attribute(("y", num(*y).as_str()));
                elem.push_attribute(("font-family", FontSpec::FAMILY));
                elem.push_attribute(("font-size", num(font.size * PX_PER_PT).as_str()));
                if font.bold {
                    elem.push_attribute(("font-weight", "bold"));
                }
                if font.underline {
                    elem.push_attribute(("text-decoration", "underline"));
                }
                elem.push_attribute(("fill", color.to_string().as_str()));
                elem.push_attribute(("text-anchor", text_anchor));
                elem.push_attribute(("dominant-baseline", baseline));
                elem.push_attribute(("xml:space", "preserve"));
                writer.write_event(Event::Start(elem))?;
                writer.write_event(Event::Text(BytesText::new(text)))?;
                writer.write_event(Event::End(BytesEnd::new("text")))?;
            }
            DrawOp::Image {
                x,
                y,
                width,
                height,
                source,
            } => {
                let href = source.to_string_lossy();
                let mut image = BytesStart::new("image");
                image.push_attribute(("href", href.as_ref()));
                image.push_attribute(("x", num(*x).as_str()));
                image.push_attribute(("y", num(*y).as_str()));
                image.push_attribute(("width", num(*width).as_str()));
                image.push_attribute(("height", num(*height).as_str()));
                image.push_attribute(("preserveAspectRatio", "none"));
                writer.write_event(Event::Empty(image))?;
            }
        }
    }

    writer.write_event(Event::End(BytesEnd::new("svg")))?;
    String::from_utf8(writer.into_inner()).map_err(|e| Error::XmlError(e.to_string()))
}

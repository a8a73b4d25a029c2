// SVG output sink
//
// Serializes the drawing calls of a transcode into a standalone SVG
// document. Elements are written straight into string buffers; clip regions
// and tiled brushes go to `<defs>` and are referenced by id.

use crate::common::{DecodeError, Result};
use crate::images::metafile::path::{RectF, Shape};
use crate::images::metafile::sink::{
    FillRule, LineCap, LineJoin, OutputSink, Paint, ShapeStyle, Stroke, TextRun,
};
use crate::images::svg_utils::{map_font_family, write_color_hex, write_num, write_xml_escaped};
use base64::Engine;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;

/// SVG document writer implementing [`OutputSink`]
#[derive(Debug, Default)]
pub struct SvgWriter {
    width: f64,
    height: f64,
    defs: String,
    body: String,
    next_id: usize,
    /// Id of the clipPath in effect
    clip: Option<String>,
    group_open: bool,
    patterns: Vec<(Arc<RgbaImage>, String)>,
}

/// Write ` name="value"` with a formatted number
#[inline]
fn write_attr(buf: &mut String, name: &str, value: f64) {
    buf.push(' ');
    buf.push_str(name);
    buf.push_str("=\"");
    write_num(buf, value);
    buf.push('"');
}

fn write_shape_element(buf: &mut String, shape: &Shape) {
    match shape {
        Shape::Rect(r) => {
            buf.push_str("<rect");
            write_rect_attrs(buf, r);
        },
        Shape::RoundRect { rect, rx, ry } => {
            buf.push_str("<rect");
            write_rect_attrs(buf, rect);
            write_attr(buf, "rx", *rx);
            write_attr(buf, "ry", *ry);
        },
        Shape::Ellipse(r) => {
            let c = r.center();
            buf.push_str("<ellipse");
            write_attr(buf, "cx", c.x);
            write_attr(buf, "cy", c.y);
            write_attr(buf, "rx", r.width / 2.0);
            write_attr(buf, "ry", r.height / 2.0);
        },
        Shape::Path(p) => {
            buf.push_str("<path d=\"");
            buf.push_str(&p.to_svg_data());
            buf.push('"');
        },
    }
}

fn write_rect_attrs(buf: &mut String, r: &RectF) {
    write_attr(buf, "x", r.x);
    write_attr(buf, "y", r.y);
    write_attr(buf, "width", r.width);
    write_attr(buf, "height", r.height);
}

fn write_stroke(buf: &mut String, stroke: &Stroke) {
    let Some(color) = stroke.color else {
        return;
    };
    buf.push_str(" stroke=\"");
    write_color_hex(buf, color);
    buf.push('"');
    write_attr(buf, "stroke-width", stroke.width);
    match stroke.cap {
        LineCap::Round => buf.push_str(" stroke-linecap=\"round\""),
        LineCap::Square => buf.push_str(" stroke-linecap=\"square\""),
        LineCap::Butt => {},
    }
    match stroke.join {
        LineJoin::Round => buf.push_str(" stroke-linejoin=\"round\""),
        LineJoin::Bevel => buf.push_str(" stroke-linejoin=\"bevel\""),
        LineJoin::Miter => {
            if (stroke.miter_limit - 4.0).abs() > f64::EPSILON {
                write_attr(buf, "stroke-miterlimit", stroke.miter_limit.max(1.0));
            }
        },
    }
    if !stroke.dashes.is_empty() {
        buf.push_str(" stroke-dasharray=\"");
        for (i, dash) in stroke.dashes.iter().enumerate() {
            if i > 0 {
                buf.push(' ');
            }
            write_num(buf, *dash);
        }
        buf.push('"');
    }
}

fn encode_png(image: &RgbaImage) -> Result<String> {
    let mut png = Cursor::new(Vec::new());
    image
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|e| DecodeError::output(format!("PNG encoding failed: {e}")))?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(png.into_inner());
    Ok(format!("data:image/png;base64,{encoded}"))
}

impl SvgWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn close_group(&mut self) {
        if self.group_open {
            self.body.push_str("</g>\n");
            self.group_open = false;
        }
    }

    fn open_clip_group(&mut self) {
        self.close_group();
        if let Some(id) = &self.clip {
            self.body.push_str("<g clip-path=\"url(#");
            self.body.push_str(id);
            self.body.push_str(")\">\n");
            self.group_open = true;
        }
    }

    /// Define a clipPath, optionally nested in the clip in effect
    fn define_clip(&mut self, shape: &Shape, parent: Option<String>) {
        let id = self.next_id("clip");
        self.defs.push_str("<clipPath id=\"");
        self.defs.push_str(&id);
        self.defs.push('"');
        if let Some(parent) = parent {
            self.defs.push_str(" clip-path=\"url(#");
            self.defs.push_str(&parent);
            self.defs.push_str(")\"");
        }
        self.defs.push('>');
        write_shape_element(&mut self.defs, shape);
        self.defs.push_str("/></clipPath>\n");
        self.clip = Some(id);
        self.open_clip_group();
    }

    /// Pattern id for a tile, reusing an earlier identical one
    fn pattern_id(&mut self, tile: &Arc<RgbaImage>) -> Result<String> {
        if let Some((_, id)) = self
            .patterns
            .iter()
            .find(|(known, _)| Arc::ptr_eq(known, tile) || **known == **tile)
        {
            return Ok(id.clone());
        }
        let id = self.next_id("pattern");
        let (w, h) = (f64::from(tile.width()), f64::from(tile.height()));
        self.defs.push_str("<pattern id=\"");
        self.defs.push_str(&id);
        self.defs.push_str("\" patternUnits=\"userSpaceOnUse\"");
        write_attr(&mut self.defs, "width", w);
        write_attr(&mut self.defs, "height", h);
        self.defs.push_str("><image");
        write_attr(&mut self.defs, "width", w);
        write_attr(&mut self.defs, "height", h);
        self.defs.push_str(" href=\"");
        self.defs.push_str(&encode_png(tile)?);
        self.defs.push_str("\"/></pattern>\n");
        self.patterns.push((Arc::clone(tile), id.clone()));
        Ok(id)
    }

    /// Complete document
    pub fn finish(mut self) -> String {
        self.close_group();
        let mut svg = String::with_capacity(self.defs.len() + self.body.len() + 256);
        svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        svg.push('\n');
        svg.push_str(r#"<svg xmlns="http://www.w3.org/2000/svg""#);
        write_attr(&mut svg, "width", self.width);
        write_attr(&mut svg, "height", self.height);
        svg.push_str(" viewBox=\"0 0 ");
        write_num(&mut svg, self.width);
        svg.push(' ');
        write_num(&mut svg, self.height);
        svg.push_str("\">\n");
        if !self.defs.is_empty() {
            svg.push_str("<defs>\n");
            svg.push_str(&self.defs);
            svg.push_str("</defs>\n");
        }
        svg.push_str(&self.body);
        svg.push_str("</svg>\n");
        svg
    }
}

impl OutputSink for SvgWriter {
    fn set_canvas_size(&mut self, width: f64, height: f64) -> Result<()> {
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn draw(&mut self, shape: &Shape, style: &ShapeStyle) -> Result<()> {
        let stroke = style.stroke.as_ref().filter(|s| s.is_visible());
        if style.fill.is_none() && stroke.is_none() {
            return Ok(());
        }
        let fill = match &style.fill {
            Some(Paint::Tile(tile)) => Some(format!("url(#{})", self.pattern_id(tile)?)),
            _ => None,
        };

        let body = &mut self.body;
        write_shape_element(body, shape);
        match (&style.fill, fill) {
            (None, _) => body.push_str(" fill=\"none\""),
            (Some(_), Some(url)) => {
                body.push_str(" fill=\"");
                body.push_str(&url);
                body.push('"');
            },
            (Some(Paint::Solid(color)), None) => {
                body.push_str(" fill=\"");
                write_color_hex(body, *color);
                body.push('"');
            },
            (Some(Paint::Tile(_)), None) => {},
        }
        if style.fill.is_some() && style.fill_rule == FillRule::EvenOdd {
            body.push_str(" fill-rule=\"evenodd\"");
        }
        if let Some(stroke) = stroke {
            write_stroke(body, stroke);
        }
        body.push_str("/>\n");
        Ok(())
    }

    fn draw_image(&mut self, image: &RgbaImage, dest: RectF) -> Result<()> {
        if image.width() == 0 || image.height() == 0 {
            return Ok(());
        }
        let href = encode_png(image)?;
        self.body.push_str("<image");
        write_rect_attrs(&mut self.body, &dest);
        self.body.push_str(" preserveAspectRatio=\"none\" href=\"");
        self.body.push_str(&href);
        self.body.push_str("\"/>\n");
        Ok(())
    }

    fn draw_text(&mut self, run: &TextRun) -> Result<()> {
        if run.text.is_empty() {
            return Ok(());
        }
        let body = &mut self.body;
        body.push_str("<text xml:space=\"preserve\"");
        write_attr(body, "x", run.x);
        write_attr(body, "y", run.y);

        body.push_str(" font-family=\"");
        let generic = map_font_family(&run.font.family);
        if generic == run.font.family {
            write_xml_escaped(body, generic);
        } else {
            body.push('\'');
            write_xml_escaped(body, &run.font.family);
            body.push_str("', ");
            body.push_str(generic);
        }
        body.push('"');
        write_attr(body, "font-size", run.font.size);
        if run.font.weight != 400 && run.font.weight != 0 {
            write_attr(body, "font-weight", f64::from(run.font.weight));
        }
        if run.font.italic {
            body.push_str(" font-style=\"italic\"");
        }
        match (run.font.underline, run.font.strikeout) {
            (true, true) => body.push_str(" text-decoration=\"underline line-through\""),
            (true, false) => body.push_str(" text-decoration=\"underline\""),
            (false, true) => body.push_str(" text-decoration=\"line-through\""),
            (false, false) => {},
        }
        body.push_str(" fill=\"");
        write_color_hex(body, run.color);
        body.push('"');
        if run.rotation != 0.0 {
            body.push_str(" transform=\"rotate(");
            write_num(body, run.rotation);
            body.push(' ');
            write_num(body, run.x);
            body.push(' ');
            write_num(body, run.y);
            body.push_str(")\"");
        }
        body.push('>');
        write_xml_escaped(body, &run.text);
        body.push_str("</text>\n");
        Ok(())
    }

    fn set_clip(&mut self, clip: Option<&Shape>) -> Result<()> {
        match clip {
            Some(shape) => self.define_clip(shape, None),
            None => {
                self.clip = None;
                self.close_group();
            },
        }
        Ok(())
    }

    fn intersect_clip(&mut self, shape: &Shape) -> Result<()> {
        let parent = self.clip.clone();
        self.define_clip(shape, parent);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::metafile::path::{Path, PointF};
    use crate::images::metafile::sink::FontSpec;
    use crate::images::metafile::types::Color;
    use image::Rgba;
    use smallvec::smallvec;

    fn solid(color: Color) -> ShapeStyle {
        ShapeStyle {
            fill: Some(Paint::Solid(color)),
            stroke: None,
            fill_rule: FillRule::NonZero,
        }
    }

    fn pen(width: f64) -> Stroke {
        Stroke {
            color: Some(Color::BLACK),
            width,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 10.0,
            dashes: smallvec![4.0, 2.0],
        }
    }

    #[test]
    fn test_document_frame() {
        let mut writer = SvgWriter::new();
        writer.set_canvas_size(100.0, 50.5).unwrap();
        let svg = writer.finish();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains(r#"width="100" height="50.5" viewBox="0 0 100 50.5""#));
        assert!(!svg.contains("<defs>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_rect_with_stroke() {
        let mut writer = SvgWriter::new();
        let style = ShapeStyle {
            stroke: Some(pen(2.0)),
            fill_rule: FillRule::EvenOdd,
            ..solid(Color::rgb(255, 0, 0))
        };
        writer
            .draw(&Shape::Rect(RectF::new(10.0, 10.0, 40.0, 40.0)), &style)
            .unwrap();
        let svg = writer.finish();
        assert!(svg.contains(
            r##"<rect x="10" y="10" width="40" height="40" fill="#ff0000" fill-rule="evenodd" stroke="#000000" stroke-width="2" stroke-miterlimit="10" stroke-dasharray="4 2"/>"##
        ));
    }

    #[test]
    fn test_invisible_shape_is_skipped() {
        let mut writer = SvgWriter::new();
        let style = ShapeStyle {
            fill: None,
            stroke: Some(Stroke {
                color: None,
                ..pen(1.0)
            }),
            fill_rule: FillRule::NonZero,
        };
        writer
            .draw(&Shape::Ellipse(RectF::new(0.0, 0.0, 4.0, 2.0)), &style)
            .unwrap();
        assert!(!writer.finish().contains("<ellipse"));
    }

    #[test]
    fn test_path_stroke_only() {
        let mut path = Path::new();
        path.move_to(PointF::new(0.0, 0.0));
        path.line_to(PointF::new(5.0, 5.0));
        let mut writer = SvgWriter::new();
        let style = ShapeStyle {
            fill: None,
            stroke: Some(pen(1.0)),
            fill_rule: FillRule::EvenOdd,
        };
        writer.draw(&Shape::Path(path), &style).unwrap();
        let svg = writer.finish();
        assert!(svg.contains(r#"<path d="M0 0L5 5" fill="none" stroke="#));
        assert!(!svg.contains("fill-rule"));
    }

    #[test]
    fn test_clips_chain_for_intersection() {
        let mut writer = SvgWriter::new();
        writer
            .set_clip(Some(&Shape::Rect(RectF::new(0.0, 0.0, 10.0, 10.0))))
            .unwrap();
        writer
            .intersect_clip(&Shape::Rect(RectF::new(5.0, 5.0, 10.0, 10.0)))
            .unwrap();
        writer
            .draw(&Shape::Rect(RectF::new(0.0, 0.0, 20.0, 20.0)), &solid(Color::BLACK))
            .unwrap();
        writer.set_clip(None).unwrap();
        writer
            .draw(&Shape::Rect(RectF::new(1.0, 1.0, 2.0, 2.0)), &solid(Color::BLACK))
            .unwrap();
        let svg = writer.finish();
        assert!(svg.contains(r#"<clipPath id="clip1">"#));
        assert!(svg.contains(r#"<clipPath id="clip2" clip-path="url(#clip1)">"#));
        assert!(svg.contains(r#"<g clip-path="url(#clip2)">"#));
        assert_eq!(svg.matches("<g ").count(), svg.matches("</g>").count());
        // the last rectangle follows the closed group
        let closed = svg.rfind("</g>").unwrap();
        assert!(svg.rfind(r#"<rect x="1""#).unwrap() > closed);
    }

    #[test]
    fn test_tile_patterns_are_shared() {
        let tile = Arc::new(RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255])));
        let style = ShapeStyle {
            fill: Some(Paint::Tile(Arc::clone(&tile))),
            stroke: None,
            fill_rule: FillRule::NonZero,
        };
        let copy = ShapeStyle {
            fill: Some(Paint::Tile(Arc::new((*tile).clone()))),
            ..style.clone()
        };
        let mut writer = SvgWriter::new();
        let rect = Shape::Rect(RectF::new(0.0, 0.0, 16.0, 16.0));
        writer.draw(&rect, &style).unwrap();
        writer.draw(&rect, &copy).unwrap();
        let svg = writer.finish();
        assert_eq!(svg.matches("<pattern ").count(), 1);
        assert_eq!(svg.matches(r#"fill="url(#pattern1)""#).count(), 2);
        assert!(svg.contains("data:image/png;base64,"));
    }

    #[test]
    fn test_image_embedding() {
        let mut writer = SvgWriter::new();
        let image = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        writer
            .draw_image(&image, RectF::new(1.0, 2.0, 30.0, 40.0))
            .unwrap();
        let svg = writer.finish();
        assert!(svg.contains(
            r#"<image x="1" y="2" width="30" height="40" preserveAspectRatio="none" href="data:image/png;base64,"#
        ));
    }

    #[test]
    fn test_text_attributes() {
        let mut writer = SvgWriter::new();
        let run = TextRun {
            text: "a<b".to_string(),
            x: 5.0,
            y: 20.0,
            font: FontSpec {
                family: "Times New Roman".to_string(),
                size: 16.0,
                weight: 700,
                italic: true,
                underline: true,
                strikeout: false,
            },
            color: Color::rgb(0, 0, 255),
            rotation: -45.0,
        };
        writer.draw_text(&run).unwrap();
        let svg = writer.finish();
        assert!(svg.contains(r#"font-family="'Times New Roman', serif""#));
        assert!(svg.contains(r#"font-size="16" font-weight="700" font-style="italic""#));
        assert!(svg.contains(r#"text-decoration="underline""#));
        assert!(svg.contains(r##"fill="#0000ff" transform="rotate(-45 5 20)">a&lt;b</text>"##));
    }
}

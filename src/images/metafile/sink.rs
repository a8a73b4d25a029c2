//! Drawing primitives consumed by the transcoder.
//!
//! A sink receives output-space geometry only; every conversion from
//! logical units has already happened in the device context. Errors
//! returned by a sink abort the transcode.

use super::path::{Path, RectF, Shape};
use super::types::Color;
use crate::common::Result;
use image::RgbaImage;
use smallvec::SmallVec;
use std::sync::Arc;

/// Fill rule used for self-intersecting shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    /// ALTERNATE
    #[default]
    EvenOdd,
    /// WINDING
    NonZero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Round,
    Square,
    Butt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Round,
    Bevel,
    Miter,
}

/// How an area is painted
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// Raster repeated at its native size from the output origin
    Tile(Arc<RgbaImage>),
}

/// Stroke descriptor built from the selected pen
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    /// `None` for a null pen, which strokes with nothing
    pub color: Option<Color>,
    pub width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f64,
    pub dashes: SmallVec<[f64; 6]>,
}

impl Stroke {
    /// Whether the stroke leaves a visible mark
    pub fn is_visible(&self) -> bool {
        self.color.is_some() && self.width > 0.0
    }
}

/// Fill and stroke applied together to one shape
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapeStyle {
    pub fill: Option<Paint>,
    pub stroke: Option<Stroke>,
    pub fill_rule: FillRule,
}

/// Font attributes in output units
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size: f64,
    pub weight: u32,
    pub italic: bool,
    pub underline: bool,
    pub strikeout: bool,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "Arial".to_string(),
            size: 12.0,
            weight: 400,
            italic: false,
            underline: false,
            strikeout: false,
        }
    }
}

/// A positioned string
///
/// `x`/`y` is the baseline start, already placed along the rotated
/// baseline. When `rotation` is non-zero the glyphs are turned by that many
/// degrees (positive turns +x towards +y) around that start.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font: FontSpec,
    pub color: Color,
    pub rotation: f64,
}

/// Measured extent of a string
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextExtent {
    pub width: f64,
    pub height: f64,
    pub ascent: f64,
}

impl TextExtent {
    /// Estimate from average glyph proportions of common proportional fonts
    pub fn approximate(text: &str, font: &FontSpec) -> Self {
        let count = text.chars().count() as f64;
        Self {
            width: count * font.size * 0.55,
            height: font.size,
            ascent: font.size * 0.8,
        }
    }

    pub fn descent(&self) -> f64 {
        self.height - self.ascent
    }
}

/// External rendering collaborator
pub trait OutputSink {
    /// Called once the header fixes the drawing size
    fn set_canvas_size(&mut self, _width: f64, _height: f64) -> Result<()> {
        Ok(())
    }

    /// Fill and/or stroke one shape
    fn draw(&mut self, shape: &Shape, style: &ShapeStyle) -> Result<()>;

    /// Draw a raster scaled into `dest`
    fn draw_image(&mut self, image: &RgbaImage, dest: RectF) -> Result<()>;

    fn draw_text(&mut self, run: &TextRun) -> Result<()>;

    /// Replace the clip; `None` removes clipping
    fn set_clip(&mut self, clip: Option<&Shape>) -> Result<()>;

    /// Intersect the current clip with `shape`
    fn intersect_clip(&mut self, shape: &Shape) -> Result<()>;

    /// Text measurement service used for alignment
    fn measure_text(&self, text: &str, font: &FontSpec) -> TextExtent {
        TextExtent::approximate(text, font)
    }
}

/// One call observed by a [`RecordingSink`]
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    CanvasSize { width: f64, height: f64 },
    Draw { shape: Shape, style: ShapeStyle },
    Image { width: u32, height: u32, dest: RectF },
    Text(TextRun),
    SetClip(Option<Shape>),
    IntersectClip(Shape),
}

/// Sink that keeps every call in order
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<SinkCall>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the fill/stroke calls
    pub fn draws(&self) -> impl Iterator<Item = (&Shape, &ShapeStyle)> {
        self.calls.iter().filter_map(|c| match c {
            SinkCall::Draw { shape, style } => Some((shape, style)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.calls.iter().filter_map(|c| match c {
            SinkCall::Text(run) => Some(run),
            _ => None,
        })
    }

    /// Number of calls that put ink on the canvas
    pub fn drawing_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    SinkCall::Draw { .. } | SinkCall::Image { .. } | SinkCall::Text(_)
                )
            })
            .count()
    }
}

impl OutputSink for RecordingSink {
    fn set_canvas_size(&mut self, width: f64, height: f64) -> Result<()> {
        self.calls.push(SinkCall::CanvasSize { width, height });
        Ok(())
    }

    fn draw(&mut self, shape: &Shape, style: &ShapeStyle) -> Result<()> {
        self.calls.push(SinkCall::Draw {
            shape: shape.clone(),
            style: style.clone(),
        });
        Ok(())
    }

    fn draw_image(&mut self, image: &RgbaImage, dest: RectF) -> Result<()> {
        self.calls.push(SinkCall::Image {
            width: image.width(),
            height: image.height(),
            dest,
        });
        Ok(())
    }

    fn draw_text(&mut self, run: &TextRun) -> Result<()> {
        self.calls.push(SinkCall::Text(run.clone()));
        Ok(())
    }

    fn set_clip(&mut self, clip: Option<&Shape>) -> Result<()> {
        self.calls.push(SinkCall::SetClip(clip.cloned()));
        Ok(())
    }

    fn intersect_clip(&mut self, shape: &Shape) -> Result<()> {
        self.calls.push(SinkCall::IntersectClip(shape.clone()));
        Ok(())
    }
}

/// Sink that merges all drawn geometry into one path for hosts that render
/// the outline themselves. Text, rasters and clipping are ignored.
#[derive(Debug, Default)]
pub struct PathSink {
    path: Path,
    width: f64,
    height: f64,
}

impl PathSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn canvas_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn into_path(self) -> Path {
        self.path
    }
}

impl OutputSink for PathSink {
    fn set_canvas_size(&mut self, width: f64, height: f64) -> Result<()> {
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn draw(&mut self, shape: &Shape, style: &ShapeStyle) -> Result<()> {
        let inked = style.fill.is_some() || style.stroke.as_ref().is_some_and(Stroke::is_visible);
        if inked {
            self.path.append(&shape.to_path(), false);
        }
        Ok(())
    }

    fn draw_image(&mut self, _image: &RgbaImage, _dest: RectF) -> Result<()> {
        Ok(())
    }

    fn draw_text(&mut self, _run: &TextRun) -> Result<()> {
        Ok(())
    }

    fn set_clip(&mut self, _clip: Option<&Shape>) -> Result<()> {
        Ok(())
    }

    fn intersect_clip(&mut self, _shape: &Shape) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_sink_skips_invisible_shapes() {
        let mut sink = PathSink::new();
        let rect = Shape::Rect(RectF::new(0.0, 0.0, 1.0, 1.0));
        sink.draw(&rect, &ShapeStyle::default()).unwrap();
        assert!(sink.path.is_empty());

        let style = ShapeStyle {
            fill: Some(Paint::Solid(Color::BLACK)),
            ..ShapeStyle::default()
        };
        sink.draw(&rect, &style).unwrap();
        assert_eq!(sink.into_path().segments().len(), 5);
    }

    #[test]
    fn test_approximate_extent() {
        let font = FontSpec {
            size: 10.0,
            ..FontSpec::default()
        };
        let extent = TextExtent::approximate("abcd", &font);
        assert!((extent.width - 22.0).abs() < 1e-9);
        assert!((extent.ascent - 8.0).abs() < 1e-9);
        assert!((extent.descent() - 2.0).abs() < 1e-9);
    }
}

//! Closed shapes and the arc family.

use super::{Converter, wmf_point_at, wmf_rect_at};
use crate::common::{DecodeError, Result};
use crate::images::metafile::device_context::{ArcDirection, DeviceContext};
use crate::images::metafile::path::{Path, PointF, Shape, arc_sweep, ellipse_angle};
use crate::images::metafile::record::Record;
use crate::images::metafile::sink::OutputSink;
use crate::images::metafile::types::{Point, Rect, Size};

/// Draw with the current pen, and the current brush when `filled`
fn emit(dc: &mut DeviceContext, sink: &mut dyn OutputSink, shape: &Shape, filled: bool) -> Result<()> {
    sink.draw(shape, &dc.style(filled))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub bounds: Rect,
}

impl Rectangle {
    pub fn parse_emf(rec: &Record) -> Result<Self> {
        Ok(Self {
            bounds: rec.rect_long_at(0)?,
        })
    }

    pub fn parse_wmf(rec: &Record) -> Result<Self> {
        Ok(Self {
            bounds: wmf_rect_at(rec, 0)?,
        })
    }

    fn shape(&self, dc: &DeviceContext) -> Shape {
        Shape::Rect(dc.to_output_rect(&self.bounds))
    }
}

impl Converter for Rectangle {
    fn render(&self, dc: &mut DeviceContext, sink: &mut dyn OutputSink) -> Result<()> {
        emit(dc, sink, &self.shape(dc), true)
    }

    fn supports_path(&self) -> bool {
        true
    }

    fn render_to_path(&self, dc: &mut DeviceContext) -> Result<()> {
        let shape = self.shape(dc);
        dc.path.append_shape(&shape, false);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundRect {
    pub bounds: Rect,
    /// Width and height of the corner ellipse
    pub corner: Size,
}

impl RoundRect {
    pub fn parse_emf(rec: &Record) -> Result<Self> {
        Ok(Self {
            bounds: rec.rect_long_at(0)?,
            corner: rec.dimension_long_at(16)?,
        })
    }

    pub fn parse_wmf(rec: &Record) -> Result<Self> {
        Ok(Self {
            corner: Size::new(i32::from(rec.i16_at(2)?), i32::from(rec.i16_at(0)?)),
            bounds: wmf_rect_at(rec, 4)?,
        })
    }

    fn shape(&self, dc: &DeviceContext) -> Shape {
        Shape::RoundRect {
            rect: dc.to_output_rect(&self.bounds),
            rx: dc.scale_x(f64::from(self.corner.width)).abs() / 2.0,
            ry: dc.scale_y(f64::from(self.corner.height)).abs() / 2.0,
        }
    }
}

impl Converter for RoundRect {
    fn render(&self, dc: &mut DeviceContext, sink: &mut dyn OutputSink) -> Result<()> {
        emit(dc, sink, &self.shape(dc), true)
    }

    fn supports_path(&self) -> bool {
        true
    }

    fn render_to_path(&self, dc: &mut DeviceContext) -> Result<()> {
        let shape = self.shape(dc);
        dc.path.append_shape(&shape, false);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub bounds: Rect,
}

impl Ellipse {
    pub fn parse_emf(rec: &Record) -> Result<Self> {
        Ok(Self {
            bounds: rec.rect_long_at(0)?,
        })
    }

    pub fn parse_wmf(rec: &Record) -> Result<Self> {
        Ok(Self {
            bounds: wmf_rect_at(rec, 0)?,
        })
    }

    fn shape(&self, dc: &DeviceContext) -> Shape {
        Shape::Ellipse(dc.to_output_rect(&self.bounds))
    }
}

impl Converter for Ellipse {
    fn render(&self, dc: &mut DeviceContext, sink: &mut dyn OutputSink) -> Result<()> {
        emit(dc, sink, &self.shape(dc), true)
    }

    fn supports_path(&self) -> bool {
        true
    }

    fn render_to_path(&self, dc: &mut DeviceContext) -> Result<()> {
        let shape = self.shape(dc);
        dc.path.append_shape(&shape, false);
        Ok(())
    }
}

/// Which boundary points are joined, and how
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcKind {
    /// Open arc
    Arc,
    /// Open arc joined to the current position, which moves to the arc end
    ArcTo,
    /// Arc closed by the chord between its end points
    Chord,
    /// Arc closed through the ellipse center
    Pie,
}

impl ArcKind {
    fn filled(self) -> bool {
        matches!(self, Self::Chord | Self::Pie)
    }
}

/// ARC, ARCTO, CHORD and PIE
///
/// The arc runs along the ellipse inscribed in `bounds`, from the point
/// where the radial through `start` meets it to the one through `end`, in
/// the current arc direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcShape {
    pub kind: ArcKind,
    pub bounds: Rect,
    pub start: Point,
    pub end: Point,
}

impl ArcShape {
    pub fn parse_emf(rec: &Record, kind: ArcKind) -> Result<Self> {
        Ok(Self {
            kind,
            bounds: rec.rect_long_at(0)?,
            start: rec.point_long_at(16)?,
            end: rec.point_long_at(24)?,
        })
    }

    pub fn parse_wmf(rec: &Record, kind: ArcKind) -> Result<Self> {
        Ok(Self {
            kind,
            end: wmf_point_at(rec, 0)?,
            start: wmf_point_at(rec, 4)?,
            bounds: wmf_rect_at(rec, 8)?,
        })
    }

    /// Geometry of the figure. `from_cursor` prefixes the ArcTo lead-in line.
    fn build(&self, dc: &DeviceContext, from_cursor: bool) -> Path {
        let rect = dc.to_output_rect(&self.bounds);
        let center = rect.center();
        let start = ellipse_angle(&rect, dc.to_output(self.start));
        let end = ellipse_angle(&rect, dc.to_output(self.end));
        let positive = (dc.arc_direction == ArcDirection::Clockwise) ^ dc.flips_orientation();
        let sweep = arc_sweep(start, end, positive);
        let (rx, ry) = (rect.width / 2.0, rect.height / 2.0);

        let mut path = Path::new();
        match self.kind {
            ArcKind::Arc | ArcKind::Chord => path.arc(center, rx, ry, start, sweep, false),
            ArcKind::ArcTo => {
                if from_cursor {
                    path.move_to(dc.to_output(dc.position));
                }
                path.arc(center, rx, ry, start, sweep, true);
            },
            ArcKind::Pie => {
                path.move_to(center);
                path.arc(center, rx, ry, start, sweep, true);
            },
        }
        if self.kind.filled() {
            path.close();
        }
        path
    }

    fn finish(&self, dc: &mut DeviceContext, end: Option<PointF>) {
        if let (ArcKind::ArcTo, Some(end)) = (self.kind, end) {
            dc.position = dc.to_window(end);
        }
    }
}

impl Converter for ArcShape {
    fn render(&self, dc: &mut DeviceContext, sink: &mut dyn OutputSink) -> Result<()> {
        let path = self.build(dc, true);
        let end = path.current_point();
        emit(dc, sink, &Shape::Path(path), self.kind.filled())?;
        self.finish(dc, end);
        Ok(())
    }

    fn supports_path(&self) -> bool {
        true
    }

    fn render_to_path(&self, dc: &mut DeviceContext) -> Result<()> {
        let connect = self.kind == ArcKind::ArcTo;
        if connect && dc.path.path().current_point().is_none() {
            let p = dc.to_output(dc.position);
            dc.path.move_to(p);
        }
        let path = self.build(dc, false);
        let end = path.current_point();
        dc.path.append_shape(&Shape::Path(path), connect);
        self.finish(dc, end);
        Ok(())
    }
}

/// Line from the current position to a circular arc, then along the arc.
/// Angles are degrees counter-clockwise from the x-axis as seen on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleArc {
    pub center: Point,
    pub radius: u32,
    pub start_angle: f32,
    pub sweep_angle: f32,
}

impl AngleArc {
    pub fn parse_emf(rec: &Record) -> Result<Self> {
        let start_angle = rec.f32_at(12)?;
        let sweep_angle = rec.f32_at(16)?;
        if !start_angle.is_finite() || !sweep_angle.is_finite() {
            return Err(DecodeError::invalid_format(format!(
                "AngleArc angles {start_angle} / {sweep_angle}"
            )));
        }
        Ok(Self {
            center: rec.point_long_at(0)?,
            radius: rec.u32_at(8)?,
            start_angle,
            sweep_angle,
        })
    }

    fn build(&self, dc: &DeviceContext, from_cursor: bool) -> Path {
        let center = dc.to_output(self.center);
        let radius = f64::from(self.radius);
        let rx = dc.scale_x(radius).abs();
        let ry = dc.scale_y(radius).abs();
        let mut path = Path::new();
        if from_cursor {
            path.move_to(dc.to_output(dc.position));
        }
        path.arc(
            center,
            rx,
            ry,
            -f64::from(self.start_angle).to_radians(),
            -f64::from(self.sweep_angle).to_radians(),
            true,
        );
        path
    }
}

impl Converter for AngleArc {
    fn render(&self, dc: &mut DeviceContext, sink: &mut dyn OutputSink) -> Result<()> {
        let path = self.build(dc, true);
        let end = path.current_point();
        sink.draw(&Shape::Path(path), &dc.style(false))?;
        if let Some(end) = end {
            dc.position = dc.to_window(end);
        }
        Ok(())
    }

    fn supports_path(&self) -> bool {
        true
    }

    fn render_to_path(&self, dc: &mut DeviceContext) -> Result<()> {
        if dc.path.path().current_point().is_none() {
            let p = dc.to_output(dc.position);
            dc.path.move_to(p);
        }
        let path = self.build(dc, false);
        let end = path.current_point();
        dc.path.append_shape(&Shape::Path(path), true);
        if let Some(end) = end {
            dc.position = dc.to_window(end);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Payload;
    use super::*;
    use crate::images::metafile::path::{RectF, Segment};
    use crate::images::metafile::sink::RecordingSink;

    #[test]
    fn test_rectangle_emf() {
        let rec = Payload::new().i32(10).i32(10).i32(50).i32(50).record(43);
        let mut sink = RecordingSink::new();
        Rectangle::parse_emf(&rec)
            .unwrap()
            .render(&mut DeviceContext::new(), &mut sink)
            .unwrap();
        let (shape, style) = sink.draws().next().unwrap();
        assert_eq!(shape, &Shape::Rect(RectF::new(10.0, 10.0, 40.0, 40.0)));
        assert!(style.fill.is_some());
        assert!(style.stroke.is_some());
    }

    #[test]
    fn test_wmf_rectangle_parameter_order() {
        let rec = Payload::new().i16(40).i16(30).i16(20).i16(10).record(0x041B);
        let rect = Rectangle::parse_wmf(&rec).unwrap();
        assert_eq!(rect.bounds, Rect::new(10, 20, 30, 40));
    }

    #[test]
    fn test_round_rect_radii() {
        let rec = Payload::new()
            .i32(0)
            .i32(0)
            .i32(100)
            .i32(50)
            .i32(20)
            .i32(10)
            .record(44);
        let mut sink = RecordingSink::new();
        RoundRect::parse_emf(&rec)
            .unwrap()
            .render(&mut DeviceContext::new(), &mut sink)
            .unwrap();
        let (shape, _) = sink.draws().next().unwrap();
        let Shape::RoundRect { rx, ry, .. } = shape else {
            panic!("expected a rounded rectangle")
        };
        assert_eq!((*rx, *ry), (10.0, 5.0));
    }

    #[test]
    fn test_pie_starts_at_center_and_closes() {
        let arc = ArcShape {
            kind: ArcKind::Pie,
            bounds: Rect::new(0, 0, 100, 100),
            start: Point::new(100, 50),
            end: Point::new(50, 0),
        };
        let mut sink = RecordingSink::new();
        arc.render(&mut DeviceContext::new(), &mut sink).unwrap();
        let (shape, style) = sink.draws().next().unwrap();
        assert!(style.fill.is_some());
        let Shape::Path(path) = shape else {
            panic!("expected a path")
        };
        assert_eq!(path.segments()[0], Segment::MoveTo(PointF::new(50.0, 50.0)));
        assert_eq!(path.segments().last(), Some(&Segment::Close));
    }

    #[test]
    fn test_arc_to_moves_cursor_to_arc_end() {
        let arc = ArcShape {
            kind: ArcKind::ArcTo,
            bounds: Rect::new(0, 0, 100, 100),
            start: Point::new(100, 50),
            end: Point::new(50, 0),
        };
        let mut dc = DeviceContext::new();
        let mut sink = RecordingSink::new();
        arc.render(&mut dc, &mut sink).unwrap();
        assert_eq!(dc.position, Point::new(50, 0));
    }

    #[test]
    fn test_angle_arc_quarter_turn() {
        let arc = AngleArc {
            center: Point::new(50, 50),
            radius: 10,
            start_angle: 0.0,
            sweep_angle: 90.0,
        };
        let mut dc = DeviceContext::new();
        arc.render(&mut dc, &mut RecordingSink::new()).unwrap();
        // counter-clockwise on screen ends above the center
        assert_eq!(dc.position, Point::new(50, 40));
    }

    #[test]
    fn test_angle_arc_rejects_non_finite_sweep() {
        let rec = Payload::new()
            .i32(50)
            .i32(50)
            .u32(10)
            .f32(0.0)
            .f32(f32::INFINITY)
            .record(41);
        let err = AngleArc::parse_emf(&rec).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_angle_arc_huge_sweep_is_one_turn() {
        let rec = Payload::new()
            .i32(50)
            .i32(50)
            .u32(10)
            .f32(0.0)
            .f32(3.6e7)
            .record(41);
        let mut sink = RecordingSink::new();
        AngleArc::parse_emf(&rec)
            .unwrap()
            .render(&mut DeviceContext::new(), &mut sink)
            .unwrap();
        let (shape, _) = sink.draws().next().unwrap();
        let Shape::Path(path) = shape else {
            panic!("expected a path");
        };
        let cubics = path
            .segments()
            .iter()
            .filter(|s| matches!(s, Segment::CubicTo(..)))
            .count();
        assert_eq!(cubics, 4);
    }
}

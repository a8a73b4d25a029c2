//! Cursor and poly-line records: MoveTo, LineTo, the Poly* family and PolyDraw.

use super::{Converter, PointWidth, PointsPayload, PolyPointsPayload, wmf_point_at};
use crate::common::{DecodeError, Result};
use crate::images::metafile::device_context::DeviceContext;
use crate::images::metafile::path::{Path, Shape};
use crate::images::metafile::record::Record;
use crate::images::metafile::sink::OutputSink;
use crate::images::metafile::types::Point;

/// Make sure the open path has a current point, starting at the cursor
fn ensure_path_start(dc: &mut DeviceContext) {
    if dc.path.path().current_point().is_none() {
        let start = dc.to_output(dc.position);
        dc.path.move_to(start);
    }
}

/// Update the current position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveTo {
    pub point: Point,
}

impl MoveTo {
    pub fn parse_emf(rec: &Record) -> Result<Self> {
        Ok(Self {
            point: rec.point_long_at(0)?,
        })
    }

    pub fn parse_wmf(rec: &Record) -> Result<Self> {
        Ok(Self {
            point: wmf_point_at(rec, 0)?,
        })
    }
}

impl Converter for MoveTo {
    fn render(&self, dc: &mut DeviceContext, _sink: &mut dyn OutputSink) -> Result<()> {
        dc.position = self.point;
        Ok(())
    }

    fn supports_path(&self) -> bool {
        true
    }

    fn render_to_path(&self, dc: &mut DeviceContext) -> Result<()> {
        dc.position = self.point;
        let p = dc.to_output(self.point);
        dc.path.move_to(p);
        Ok(())
    }
}

/// Line from the current position, which then moves to the end point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineTo {
    pub point: Point,
}

impl LineTo {
    pub fn parse_emf(rec: &Record) -> Result<Self> {
        Ok(Self {
            point: rec.point_long_at(0)?,
        })
    }

    pub fn parse_wmf(rec: &Record) -> Result<Self> {
        Ok(Self {
            point: wmf_point_at(rec, 0)?,
        })
    }
}

impl Converter for LineTo {
    fn render(&self, dc: &mut DeviceContext, sink: &mut dyn OutputSink) -> Result<()> {
        let mut path = Path::new();
        path.move_to(dc.to_output(dc.position));
        path.line_to(dc.to_output(self.point));
        sink.draw(&Shape::Path(path), &dc.style(false))?;
        dc.position = self.point;
        Ok(())
    }

    fn supports_path(&self) -> bool {
        true
    }

    fn render_to_path(&self, dc: &mut DeviceContext) -> Result<()> {
        ensure_path_start(dc);
        let p = dc.to_output(self.point);
        dc.path.line_to(p);
        dc.position = self.point;
        Ok(())
    }
}

/// Render policy of a single point list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolyKind {
    /// Open, stroked, ignores the cursor
    Polyline,
    /// Closed, filled and stroked
    Polygon,
    /// Continues from the cursor and moves it
    PolylineTo,
    /// Start point then groups of control, control, end
    PolyBezier,
    /// Groups of three continuing from the cursor
    PolyBezierTo,
}

impl PolyKind {
    fn continues(self) -> bool {
        matches!(self, Self::PolylineTo | Self::PolyBezierTo)
    }

    fn filled(self) -> bool {
        self == Self::Polygon
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Poly {
    pub kind: PolyKind,
    pub payload: PointsPayload,
}

impl Poly {
    pub fn parse_emf(rec: &Record, kind: PolyKind, width: PointWidth) -> Result<Self> {
        Ok(Self {
            kind,
            payload: PointsPayload::parse_emf(rec, width)?,
        })
    }

    pub fn parse_wmf(rec: &Record, kind: PolyKind) -> Result<Self> {
        Ok(Self {
            kind,
            payload: PointsPayload::parse_wmf(rec)?,
        })
    }

    /// Output-space geometry, `None` when there is nothing to draw
    fn build(&self, dc: &DeviceContext) -> Option<Path> {
        let points = &self.payload.points;
        let mut path = Path::new();
        let rest: &[Point] = if self.kind.continues() {
            if points.is_empty() {
                return None;
            }
            path.move_to(dc.to_output(dc.position));
            points
        } else {
            let min = if self.kind == PolyKind::PolyBezier { 4 } else { 2 };
            if points.len() < min {
                return None;
            }
            path.move_to(dc.to_output(points[0]));
            &points[1..]
        };
        match self.kind {
            PolyKind::PolyBezier | PolyKind::PolyBezierTo => {
                for group in rest.chunks_exact(3) {
                    path.cubic_to(
                        dc.to_output(group[0]),
                        dc.to_output(group[1]),
                        dc.to_output(group[2]),
                    );
                }
            },
            _ => {
                for &p in rest {
                    path.line_to(dc.to_output(p));
                }
            },
        }
        if self.kind == PolyKind::Polygon {
            path.close();
        }
        Some(path)
    }

    fn advance_cursor(&self, dc: &mut DeviceContext) {
        if !self.kind.continues() {
            return;
        }
        let last = match self.kind {
            PolyKind::PolyBezierTo => {
                let used = self.payload.count() / 3 * 3;
                used.checked_sub(1).map(|i| self.payload.points[i])
            },
            _ => self.payload.points.last().copied(),
        };
        if let Some(p) = last {
            dc.position = p;
        }
    }
}

impl Converter for Poly {
    fn render(&self, dc: &mut DeviceContext, sink: &mut dyn OutputSink) -> Result<()> {
        if let Some(path) = self.build(dc) {
            sink.draw(&Shape::Path(path), &dc.style(self.kind.filled()))?;
        }
        self.advance_cursor(dc);
        Ok(())
    }

    fn supports_path(&self) -> bool {
        true
    }

    fn render_to_path(&self, dc: &mut DeviceContext) -> Result<()> {
        if self.kind.continues() {
            ensure_path_start(dc);
        }
        if let Some(path) = self.build(dc) {
            dc.path.append_shape(&Shape::Path(path), self.kind.continues());
        }
        self.advance_cursor(dc);
        Ok(())
    }
}

/// Several point lists drawn as one shape
#[derive(Debug, Clone, PartialEq)]
pub struct PolyPoly {
    /// Closed and filled when set
    pub polygons: bool,
    pub payload: PolyPointsPayload,
}

impl PolyPoly {
    pub fn parse_emf(rec: &Record, polygons: bool, width: PointWidth) -> Result<Self> {
        Ok(Self {
            polygons,
            payload: PolyPointsPayload::parse_emf(rec, width)?,
        })
    }

    pub fn parse_wmf(rec: &Record) -> Result<Self> {
        Ok(Self {
            polygons: true,
            payload: PolyPointsPayload::parse_wmf(rec)?,
        })
    }

    fn build(&self, dc: &DeviceContext) -> Path {
        let mut path = Path::new();
        for poly in self.payload.polys() {
            let Some((first, rest)) = poly.split_first() else {
                continue;
            };
            path.move_to(dc.to_output(*first));
            for &p in rest {
                path.line_to(dc.to_output(p));
            }
            if self.polygons {
                path.close();
            }
        }
        path
    }
}

impl Converter for PolyPoly {
    fn render(&self, dc: &mut DeviceContext, sink: &mut dyn OutputSink) -> Result<()> {
        let path = self.build(dc);
        if !path.is_empty() {
            sink.draw(&Shape::Path(path), &dc.style(self.polygons))?;
        }
        Ok(())
    }

    fn supports_path(&self) -> bool {
        true
    }

    fn render_to_path(&self, dc: &mut DeviceContext) -> Result<()> {
        let path = self.build(dc);
        dc.path.append_shape(&Shape::Path(path), false);
        Ok(())
    }
}

const PT_CLOSEFIGURE: u8 = 0x01;
const PT_LINETO: u8 = 0x02;
const PT_BEZIERTO: u8 = 0x04;
const PT_MOVETO: u8 = 0x06;

/// Points with an explicit per-point type tag
#[derive(Debug, Clone, PartialEq)]
pub struct PolyDraw {
    pub payload: PointsPayload,
    pub types: Vec<u8>,
}

impl PolyDraw {
    pub fn parse_emf(rec: &Record, width: PointWidth) -> Result<Self> {
        let payload = PointsPayload::parse_emf(rec, width)?;
        let types = rec
            .bytes_at(20 + payload.count() * width.bytes(), payload.count())?
            .to_vec();
        Ok(Self { payload, types })
    }

    fn build(&self, dc: &DeviceContext) -> Result<(Path, Point)> {
        let mut path = Path::new();
        path.move_to(dc.to_output(dc.position));
        let mut last = dc.position;
        let points = &self.payload.points;
        let mut i = 0;
        while i < points.len() {
            let tag = self.types[i];
            match tag & !PT_CLOSEFIGURE {
                PT_MOVETO => {
                    path.move_to(dc.to_output(points[i]));
                    last = points[i];
                },
                PT_LINETO => {
                    path.line_to(dc.to_output(points[i]));
                    last = points[i];
                },
                PT_BEZIERTO => {
                    if i + 2 >= points.len() {
                        return Err(DecodeError::invalid_format("truncated PolyDraw bezier"));
                    }
                    path.cubic_to(
                        dc.to_output(points[i]),
                        dc.to_output(points[i + 1]),
                        dc.to_output(points[i + 2]),
                    );
                    i += 2;
                    last = points[i];
                },
                other => {
                    return Err(DecodeError::invalid_format(format!(
                        "unknown PolyDraw point type {other:#x}"
                    )));
                },
            }
            if self.types[i] & PT_CLOSEFIGURE != 0 {
                path.close();
            }
            i += 1;
        }
        Ok((path, last))
    }
}

impl Converter for PolyDraw {
    fn render(&self, dc: &mut DeviceContext, sink: &mut dyn OutputSink) -> Result<()> {
        let (path, last) = self.build(dc)?;
        sink.draw(&Shape::Path(path), &dc.style(false))?;
        dc.position = last;
        Ok(())
    }

    fn supports_path(&self) -> bool {
        true
    }

    fn render_to_path(&self, dc: &mut DeviceContext) -> Result<()> {
        ensure_path_start(dc);
        let (path, last) = self.build(dc)?;
        dc.path.append_shape(&Shape::Path(path), true);
        dc.position = last;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Payload;
    use super::*;
    use crate::images::metafile::path::{PointF, Segment};
    use crate::images::metafile::sink::RecordingSink;

    fn points16(points: &[(i16, i16)]) -> Payload {
        let mut p = Payload::new().bytes(&[0u8; 16]).u32(points.len() as u32);
        for &(x, y) in points {
            p = p.i16(x).i16(y);
        }
        p
    }

    #[test]
    fn test_line_to_updates_position() {
        let mut dc = DeviceContext::new();
        let mut sink = RecordingSink::new();
        MoveTo { point: Point::new(1, 2) }.render(&mut dc, &mut sink).unwrap();
        LineTo { point: Point::new(5, 6) }.render(&mut dc, &mut sink).unwrap();
        assert_eq!(dc.position, Point::new(5, 6));
        let (shape, style) = sink.draws().next().unwrap();
        assert!(style.fill.is_none());
        let Shape::Path(path) = shape else {
            panic!("expected a path")
        };
        assert_eq!(
            path.segments(),
            &[
                Segment::MoveTo(PointF::new(1.0, 2.0)),
                Segment::LineTo(PointF::new(5.0, 6.0))
            ]
        );
    }

    #[test]
    fn test_wmf_line_to_field_order() {
        let rec = Payload::new().i16(20).i16(10).record(0x0213);
        assert_eq!(LineTo::parse_wmf(&rec).unwrap().point, Point::new(10, 20));
    }

    #[test]
    fn test_polygon_is_closed_and_filled() {
        let rec = points16(&[(0, 0), (10, 0), (10, 10)]).record(86);
        let poly = Poly::parse_emf(&rec, PolyKind::Polygon, PointWidth::Short).unwrap();
        let mut dc = DeviceContext::new();
        let mut sink = RecordingSink::new();
        poly.render(&mut dc, &mut sink).unwrap();
        let (shape, style) = sink.draws().next().unwrap();
        assert!(style.fill.is_some());
        let Shape::Path(path) = shape else {
            panic!("expected a path")
        };
        assert_eq!(path.segments().last(), Some(&Segment::Close));
    }

    #[test]
    fn test_polyline_to_continues_from_cursor() {
        let rec = points16(&[(4, 4), (8, 0)]).record(89);
        let poly = Poly::parse_emf(&rec, PolyKind::PolylineTo, PointWidth::Short).unwrap();
        let mut dc = DeviceContext::new();
        dc.position = Point::new(1, 1);
        let mut sink = RecordingSink::new();
        poly.render(&mut dc, &mut sink).unwrap();
        assert_eq!(dc.position, Point::new(8, 0));
        let (shape, _) = sink.draws().next().unwrap();
        let Shape::Path(path) = shape else {
            panic!("expected a path")
        };
        assert_eq!(path.segments()[0], Segment::MoveTo(PointF::new(1.0, 1.0)));
        assert_eq!(path.segments().len(), 3);
    }

    #[test]
    fn test_poly_bezier_to_in_path_mode() {
        let rec = points16(&[(1, 0), (2, 0), (3, 0)]).record(88);
        let poly = Poly::parse_emf(&rec, PolyKind::PolyBezierTo, PointWidth::Short).unwrap();
        let mut dc = DeviceContext::new();
        dc.path.begin();
        poly.render_to_path(&mut dc).unwrap();
        assert_eq!(dc.position, Point::new(3, 0));
        assert!(
            dc.path
                .path()
                .segments()
                .iter()
                .any(|s| matches!(s, Segment::CubicTo(..)))
        );
    }

    #[test]
    fn test_short_polyline_draws_nothing() {
        let rec = points16(&[(1, 1)]).record(87);
        let poly = Poly::parse_emf(&rec, PolyKind::Polyline, PointWidth::Short).unwrap();
        let mut sink = RecordingSink::new();
        poly.render(&mut DeviceContext::new(), &mut sink).unwrap();
        assert_eq!(sink.drawing_calls(), 0);
    }

    #[test]
    fn test_poly_draw_types() {
        let rec = points16(&[(0, 0), (5, 0), (5, 5)])
            .bytes(&[PT_MOVETO, PT_LINETO, PT_LINETO | PT_CLOSEFIGURE])
            .record(92);
        let draw = PolyDraw::parse_emf(&rec, PointWidth::Short).unwrap();
        let mut dc = DeviceContext::new();
        let mut sink = RecordingSink::new();
        draw.render(&mut dc, &mut sink).unwrap();
        assert_eq!(dc.position, Point::new(5, 5));
        let (shape, _) = sink.draws().next().unwrap();
        let Shape::Path(path) = shape else {
            panic!("expected a path")
        };
        assert_eq!(path.segments().last(), Some(&Segment::Close));
    }
}

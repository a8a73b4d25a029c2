//! Record converters.
//!
//! Each converter parses its own field layout from a [`Record`] (one
//! constructor per format it appears in) and renders itself against the
//! device context, either into the sink or, for geometry records while a
//! path bracket is open, into the path buffer.

pub mod blit;
pub mod clip;
pub mod drawing;
pub mod header;
pub mod objects;
pub mod path;
pub mod shapes;
pub mod state;
pub mod text;

use super::device_context::DeviceContext;
use super::record::Record;
use super::sink::OutputSink;
use super::types::{Point, Rect};
use crate::common::{DecodeError, Result};
use smallvec::SmallVec;
use std::fmt::Debug;

/// A parsed record ready to be replayed
pub trait Converter: Debug {
    /// Draw into the sink or update drawing state
    fn render(&self, dc: &mut DeviceContext, sink: &mut dyn OutputSink) -> Result<()>;

    /// Whether the record adds geometry to an open path instead of drawing
    fn supports_path(&self) -> bool {
        false
    }

    /// Append this record's geometry to the open path buffer
    fn render_to_path(&self, _dc: &mut DeviceContext) -> Result<()> {
        Ok(())
    }
}

pub type ConverterBox = Box<dyn Converter>;

/// Constructor stored in an opcode table
pub type ParseFn = fn(&Record) -> Result<ConverterBox>;

#[inline]
pub(crate) fn boxed<C: Converter + 'static>(converter: C) -> ConverterBox {
    Box::new(converter)
}

/// Record that is understood but has no visible effect
#[derive(Debug, Clone, Copy, Default)]
pub struct Noop;

impl Converter for Noop {
    fn render(&self, _dc: &mut DeviceContext, _sink: &mut dyn OutputSink) -> Result<()> {
        Ok(())
    }
}

/// Width of the stored point coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointWidth {
    /// POINTS (2 x i16)
    Short,
    /// POINTL (2 x i32)
    Long,
}

impl PointWidth {
    pub const fn bytes(self) -> usize {
        match self {
            Self::Short => 4,
            Self::Long => 8,
        }
    }

    fn read(self, rec: &Record, offset: usize) -> Result<Point> {
        match self {
            Self::Short => rec.point_at(offset),
            Self::Long => rec.point_long_at(offset),
        }
    }
}

/// Point list shared by the poly record family
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointsPayload {
    pub points: SmallVec<[Point; 16]>,
}

impl PointsPayload {
    /// Read `count` points starting at `offset`
    pub fn read(rec: &Record, offset: usize, count: usize, width: PointWidth) -> Result<Self> {
        let available = rec.size().saturating_sub(offset) / width.bytes();
        if count > available {
            return Err(DecodeError::invalid_format(format!(
                "{count} points declared, room for {available}"
            )));
        }
        let mut points = SmallVec::with_capacity(count);
        for i in 0..count {
            points.push(width.read(rec, offset + i * width.bytes())?);
        }
        Ok(Self { points })
    }

    /// EMF layout: bounds RECTL, u32 count, points
    pub fn parse_emf(rec: &Record, width: PointWidth) -> Result<Self> {
        let count = rec.u32_at(16)? as usize;
        Self::read(rec, 20, count, width)
    }

    /// WMF layout: i16 count, POINTS
    pub fn parse_wmf(rec: &Record) -> Result<Self> {
        let count = rec.i16_at(0)?.max(0) as usize;
        Self::read(rec, 2, count, PointWidth::Short)
    }

    pub fn count(&self) -> usize {
        self.points.len()
    }
}

/// Point lists with per-polygon counts (PolyPolyline, PolyPolygon)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolyPointsPayload {
    pub counts: SmallVec<[usize; 8]>,
    pub points: PointsPayload,
}

impl PolyPointsPayload {
    /// Iterate the sub-polygons
    pub fn polys(&self) -> impl Iterator<Item = &[Point]> {
        let mut start: usize = 0;
        self.counts.iter().map(move |&n| {
            let end = start.saturating_add(n).min(self.points.points.len());
            let poly = &self.points.points[start.min(end)..end];
            start = end;
            poly
        })
    }

    /// EMF layout: bounds, u32 nPolys, u32 total, counts, points
    pub fn parse_emf(rec: &Record, width: PointWidth) -> Result<Self> {
        let polys = rec.u32_at(16)? as usize;
        let total = rec.u32_at(20)? as usize;
        let counts = read_counts(rec, 24, polys, |r, o| Ok(r.u32_at(o)? as usize), 4)?;
        let points = PointsPayload::read(rec, 24 + polys * 4, total, width)?;
        Ok(Self { counts, points })
    }

    /// WMF layout: u16 nPolys, u16 counts, POINTS
    pub fn parse_wmf(rec: &Record) -> Result<Self> {
        let polys = rec.u16_at(0)? as usize;
        let counts = read_counts(rec, 2, polys, |r, o| Ok(r.u16_at(o)? as usize), 2)?;
        let total = counts.iter().sum();
        let points = PointsPayload::read(rec, 2 + polys * 2, total, PointWidth::Short)?;
        Ok(Self { counts, points })
    }
}

fn read_counts(
    rec: &Record,
    offset: usize,
    count: usize,
    read: impl Fn(&Record, usize) -> Result<usize>,
    width: usize,
) -> Result<SmallVec<[usize; 8]>> {
    if count > rec.size().saturating_sub(offset) / width {
        return Err(DecodeError::invalid_format(format!(
            "{count} polygon counts exceed the record"
        )));
    }
    (0..count).map(|i| read(rec, offset + i * width)).collect()
}

/// WMF stores parameters in reverse: y before x
pub(crate) fn wmf_point_at(rec: &Record, offset: usize) -> Result<Point> {
    Ok(Point::new(
        i32::from(rec.i16_at(offset + 2)?),
        i32::from(rec.i16_at(offset)?),
    ))
}

/// WMF rectangle parameters: bottom, right, top, left
pub(crate) fn wmf_rect_at(rec: &Record, offset: usize) -> Result<Rect> {
    Ok(Rect::new(
        i32::from(rec.i16_at(offset + 6)?),
        i32::from(rec.i16_at(offset + 4)?),
        i32::from(rec.i16_at(offset + 2)?),
        i32::from(rec.i16_at(offset)?),
    ))
}

/// Record offsets in EMF are relative to the record start, which includes
/// the 8-byte type/size header that [`Record`] strips.
#[inline]
pub(crate) fn emf_offset(offset: u32) -> Result<usize> {
    (offset as usize)
        .checked_sub(8)
        .ok_or_else(|| DecodeError::invalid_format(format!("offset {offset} inside record header")))
}


#[cfg(test)]
mod tests {
    use super::test_support::Payload;
    use super::*;

    #[test]
    fn test_points_payload_emf() {
        let rec = Payload::new()
            .bytes(&[0u8; 16])
            .u32(2)
            .i16(1)
            .i16(2)
            .i16(-3)
            .i16(4)
            .record(86);
        let payload = PointsPayload::parse_emf(&rec, PointWidth::Short).unwrap();
        assert_eq!(payload.points.as_slice(), &[Point::new(1, 2), Point::new(-3, 4)]);
    }

    #[test]
    fn test_points_payload_rejects_overlong_count() {
        let rec = Payload::new().i16(100).i16(1).i16(1).record(0x0325);
        assert!(PointsPayload::parse_wmf(&rec).is_err());
    }

    #[test]
    fn test_poly_points_wmf() {
        let rec = Payload::new()
            .u16(2)
            .u16(1)
            .u16(2)
            .i16(0)
            .i16(0)
            .i16(5)
            .i16(5)
            .i16(6)
            .i16(6)
            .record(0x0538);
        let payload = PolyPointsPayload::parse_wmf(&rec).unwrap();
        let polys: Vec<_> = payload.polys().collect();
        assert_eq!(polys.len(), 2);
        assert_eq!(polys[0], &[Point::new(0, 0)]);
        assert_eq!(polys[1], &[Point::new(5, 5), Point::new(6, 6)]);
    }

    #[test]
    fn test_emf_offset() {
        assert_eq!(emf_offset(76).unwrap(), 68);
        assert!(emf_offset(4).is_err());
    }
}

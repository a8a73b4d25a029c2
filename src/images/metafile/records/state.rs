//! Attribute setters, window/viewport records, world transforms and the
//! SaveDC/RestoreDC stack.

use super::{Converter, wmf_point_at};
use crate::common::{DecodeError, Result};
use crate::images::metafile::device_context::{
    ArcDirection, BackgroundMode, DeviceContext, PolyFillMode, TextAlign,
};
use crate::images::metafile::record::Record;
use crate::images::metafile::sink::OutputSink;
use crate::images::metafile::types::{Color, Point, Size, XForm};

/// Numerator/denominator pairs of the Scale*Ext records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtScale {
    pub x_num: i32,
    pub x_denom: i32,
    pub y_num: i32,
    pub y_denom: i32,
}

impl ExtScale {
    pub fn parse_emf(rec: &Record) -> Result<Self> {
        Ok(Self {
            x_num: rec.i32_at(0)?,
            x_denom: rec.i32_at(4)?,
            y_num: rec.i32_at(8)?,
            y_denom: rec.i32_at(12)?,
        })
    }

    pub fn parse_wmf(rec: &Record) -> Result<Self> {
        Ok(Self {
            y_denom: i32::from(rec.i16_at(0)?),
            y_num: i32::from(rec.i16_at(2)?),
            x_denom: i32::from(rec.i16_at(4)?),
            x_num: i32::from(rec.i16_at(6)?),
        })
    }

    fn apply(&self, ext: Size) -> Result<Size> {
        if self.x_denom == 0 || self.y_denom == 0 {
            return Err(DecodeError::invalid_format("extent scale with zero denominator"));
        }
        Ok(Size::new(
            (i64::from(ext.width) * i64::from(self.x_num) / i64::from(self.x_denom)) as i32,
            (i64::from(ext.height) * i64::from(self.y_num) / i64::from(self.y_denom)) as i32,
        ))
    }
}

/// A record that only changes device context state
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    MapMode(u32),
    BkMode(u32),
    BkColor(Color),
    TextColor(Color),
    TextAlign(u32),
    PolyFillMode(u32),
    Rop2(u32),
    StretchBltMode(u32),
    ArcDirection(u32),
    /// Stored as an integer in the record, kept as a float
    MiterLimit(f64),
    WindowExt(Size),
    WindowOrg(Point),
    ViewportExt(Size),
    ViewportOrg(Point),
    OffsetWindowOrg(Point),
    OffsetViewportOrg(Point),
    ScaleWindowExt(ExtScale),
    ScaleViewportExt(ExtScale),
    SaveDc,
    RestoreDc(i32),
    ModifyWorldTransform { xform: XForm, mode: u32 },
    SetWorldTransform(XForm),
}

impl StateChange {
    pub fn emf_miter_limit(rec: &Record) -> Result<Self> {
        Ok(Self::MiterLimit(f64::from(rec.u32_at(0)?)))
    }

    pub fn emf_modify_world_transform(rec: &Record) -> Result<Self> {
        Ok(Self::ModifyWorldTransform {
            xform: rec.transform_at(0)?,
            mode: rec.u32_at(24)?,
        })
    }

    /// WMF extents are stored height first
    pub fn wmf_size_at(rec: &Record, offset: usize) -> Result<Size> {
        let p = wmf_point_at(rec, offset)?;
        Ok(Size::new(p.x, p.y))
    }
}

impl Converter for StateChange {
    fn render(&self, dc: &mut DeviceContext, sink: &mut dyn OutputSink) -> Result<()> {
        match *self {
            Self::MapMode(mode) => dc.set_map_mode(mode)?,
            Self::BkMode(mode) => {
                dc.bk_mode = BackgroundMode::from_u32(mode).ok_or_else(|| {
                    DecodeError::invalid_format(format!("unknown background mode {mode}"))
                })?;
            },
            Self::BkColor(color) => dc.bk_color = color,
            Self::TextColor(color) => dc.text_color = color,
            Self::TextAlign(align) => dc.text_align = TextAlign(align),
            Self::PolyFillMode(mode) => {
                dc.fill_mode = PolyFillMode::from_u32(mode).ok_or_else(|| {
                    DecodeError::invalid_format(format!("unknown polygon fill mode {mode}"))
                })?;
            },
            Self::Rop2(rop) => dc.rop2 = rop,
            Self::StretchBltMode(mode) => dc.stretch_mode = mode,
            Self::ArcDirection(dir) => {
                dc.arc_direction = match dir {
                    1 => ArcDirection::CounterClockwise,
                    2 => ArcDirection::Clockwise,
                    other => {
                        return Err(DecodeError::invalid_format(format!(
                            "unknown arc direction {other}"
                        )));
                    },
                };
            },
            Self::MiterLimit(limit) => dc.set_miter_limit(limit),
            Self::WindowExt(ext) => dc.window_ext = ext,
            Self::WindowOrg(org) => dc.window_org = org,
            Self::ViewportExt(ext) => dc.viewport_ext = ext,
            Self::ViewportOrg(org) => dc.viewport_org = org,
            Self::OffsetWindowOrg(delta) => {
                dc.window_org = Point::new(
                    dc.window_org.x.saturating_add(delta.x),
                    dc.window_org.y.saturating_add(delta.y),
                );
            },
            Self::OffsetViewportOrg(delta) => {
                dc.viewport_org = Point::new(
                    dc.viewport_org.x.saturating_add(delta.x),
                    dc.viewport_org.y.saturating_add(delta.y),
                );
            },
            Self::ScaleWindowExt(scale) => dc.window_ext = scale.apply(dc.window_ext)?,
            Self::ScaleViewportExt(scale) => dc.viewport_ext = scale.apply(dc.viewport_ext)?,
            Self::SaveDc => dc.save(),
            Self::RestoreDc(n) => {
                dc.restore(n)?;
                dc.region.apply(sink)?;
            },
            Self::ModifyWorldTransform { xform, mode } => dc.modify_world_transform(xform, mode)?,
            Self::SetWorldTransform(xform) => dc.set_world_transform(xform),
        }
        Ok(())
    }
}

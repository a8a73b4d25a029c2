//! GDI object lifecycle: Create*, SelectObject and DeleteObject.

use super::{Converter, emf_offset};
use crate::common::encoding::decode_ansi;
use crate::common::{DecodeError, Result};
use crate::images::metafile::bitmap::{decode_packed_dib, read_dib};
use crate::images::metafile::device_context::DeviceContext;
use crate::images::metafile::gdi_objects::{
    Brush, BrushStyle, Font, GdiObject, HatchStyle, Pen, PenStyle,
};
use crate::images::metafile::record::Record;
use crate::images::metafile::sink::OutputSink;
use crate::images::metafile::types::Color;
use image::{Rgba, RgbaImage};
use tracing::warn;

/// Build a brush from LOGBRUSH fields
fn logical_brush(style: u32, color: Color, hatch: u32) -> Brush {
    match BrushStyle::from_u32(style) {
        BrushStyle::Null => Brush::null(),
        BrushStyle::Hatched => Brush::hatched(color, HatchStyle::from_u32(hatch)),
        style => Brush {
            style,
            color,
            ..Brush::default()
        },
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatePen {
    /// Explicit table slot (EMF); WMF takes the smallest free one
    pub id: Option<u32>,
    pub pen: Pen,
}

impl CreatePen {
    pub fn parse_emf(rec: &Record) -> Result<Self> {
        Ok(Self {
            id: Some(rec.u32_at(0)?),
            pen: Pen::new(rec.u32_at(4)?, rec.i32_at(8)?, rec.color_at(16)?),
        })
    }

    /// EXTLOGPEN; user-style dash entries are kept, DIB pattern pens are
    /// stroked with their color
    pub fn parse_emf_ext(rec: &Record) -> Result<Self> {
        let style = rec.u32_at(20)?;
        let width = rec.u32_at(24)? as i32;
        let brush_style = BrushStyle::from_u32(rec.u32_at(28)?);
        let color = rec.color_at(32)?;
        let mut pen = if brush_style == BrushStyle::Null {
            Pen::null()
        } else {
            Pen::new(style, width, color)
        };
        if pen.style == PenStyle::UserStyle {
            let entries = rec.u32_at(40)? as usize;
            if entries > rec.size().saturating_sub(44) / 4 {
                return Err(DecodeError::invalid_format("pen style entries exceed the record"));
            }
            for i in 0..entries {
                pen.user_dashes.push(rec.u32_at(44 + i * 4)?);
            }
        }
        Ok(Self {
            id: Some(rec.u32_at(0)?),
            pen,
        })
    }

    pub fn parse_wmf(rec: &Record) -> Result<Self> {
        Ok(Self {
            id: None,
            pen: Pen::new(
                u32::from(rec.u16_at(0)?),
                i32::from(rec.i16_at(2)?),
                rec.color_at(6)?,
            ),
        })
    }
}

impl Converter for CreatePen {
    fn render(&self, dc: &mut DeviceContext, _sink: &mut dyn OutputSink) -> Result<()> {
        dc.add_object(self.id, GdiObject::Pen(self.pen.clone()));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateBrush {
    pub id: Option<u32>,
    pub brush: Brush,
}

impl CreateBrush {
    pub fn parse_emf(rec: &Record) -> Result<Self> {
        Ok(Self {
            id: Some(rec.u32_at(0)?),
            brush: logical_brush(rec.u32_at(4)?, rec.color_at(8)?, rec.u32_at(12)?),
        })
    }

    /// CREATEDIBPATTERNBRUSHPT and CREATEMONOBRUSH
    pub fn parse_emf_pattern(rec: &Record, style: BrushStyle) -> Result<Self> {
        let usage = rec.u32_at(4)?;
        let image = read_dib(
            rec,
            emf_offset(rec.u32_at(8)?)?,
            rec.u32_at(12)? as usize,
            emf_offset(rec.u32_at(16)?)?,
            rec.u32_at(20)? as usize,
            usage,
        )?;
        Ok(Self {
            id: Some(rec.u32_at(0)?),
            brush: Brush::pattern(style, image),
        })
    }

    pub fn parse_wmf(rec: &Record) -> Result<Self> {
        Ok(Self {
            id: None,
            brush: logical_brush(
                u32::from(rec.u16_at(0)?),
                rec.color_at(2)?,
                u32::from(rec.u16_at(6)?),
            ),
        })
    }

    /// DIBCREATEPATTERNBRUSH: style, color usage, packed DIB
    ///
    /// WMF objects have no explicit ids, so a pattern that cannot be decoded
    /// still creates a brush to keep later ids aligned.
    pub fn parse_wmf_dib_pattern(rec: &Record) -> Result<Self> {
        let usage = u32::from(rec.u16_at(2)?);
        let data = rec.data().get(4..).unwrap_or_default();
        let brush = match decode_packed_dib(data, usage) {
            Ok(image) => Brush::pattern(BrushStyle::DibPatternPt, image),
            Err(err) if err.is_recoverable() => {
                warn!("DIB pattern brush replaced by a solid brush: {err}");
                Brush::solid(Color::BLACK)
            },
            Err(err) => return Err(err),
        };
        Ok(Self { id: None, brush })
    }

    /// CREATEPATTERNBRUSH: a monochrome Bitmap16 followed by its scan lines
    pub fn parse_wmf_pattern(rec: &Record) -> Result<Self> {
        let brush = match mono_bitmap16(rec) {
            Ok(image) => Brush::pattern(BrushStyle::MonoPattern, image),
            Err(err) if err.is_recoverable() => {
                warn!("pattern brush replaced by a solid brush: {err}");
                Brush::solid(Color::BLACK)
            },
            Err(err) => return Err(err),
        };
        Ok(Self { id: None, brush })
    }
}

/// Decode a 1-plane 1-bit Bitmap16 whose scan lines start at byte 32.
fn mono_bitmap16(rec: &Record) -> Result<RgbaImage> {
    const BITS_OFFSET: usize = 32;
    let width = rec.i16_at(2)?.max(0) as u32;
    let height = rec.i16_at(4)?.max(0) as u32;
    let stride = rec.i16_at(6)?.max(0) as usize;
    let planes = rec.byte_at(8)?;
    let bits_pixel = rec.byte_at(9)?;
    if planes != 1 || bits_pixel != 1 {
        return Err(DecodeError::unsupported(format!(
            "{planes}-plane {bits_pixel}-bit pattern bitmap"
        )));
    }
    if width == 0 || height == 0 || stride < (width as usize).div_ceil(8) {
        return Err(DecodeError::invalid_format(format!(
            "pattern bitmap {width}x{height} with {stride}-byte scan lines"
        )));
    }
    let len = stride
        .checked_mul(height as usize)
        .ok_or_else(|| DecodeError::invalid_format("pattern bitmap too large"))?;
    let bits = rec.bytes_at(BITS_OFFSET, len)?;
    Ok(RgbaImage::from_fn(width, height, |x, y| {
        let byte = bits[y as usize * stride + (x / 8) as usize];
        let v = if byte & (0x80 >> (x % 8)) != 0 { 255 } else { 0 };
        Rgba([v, v, v, 255])
    }))
}

impl Converter for CreateBrush {
    fn render(&self, dc: &mut DeviceContext, _sink: &mut dyn OutputSink) -> Result<()> {
        dc.add_object(self.id, GdiObject::Brush(self.brush.clone()));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateFont {
    pub id: Option<u32>,
    pub font: Font,
}

impl CreateFont {
    /// EXTCREATEFONTINDIRECTW: object index then LOGFONTW
    pub fn parse_emf(rec: &Record) -> Result<Self> {
        let available = rec.size().saturating_sub(32) / 2;
        let face = rec.chars_at(32, available.min(32))?;
        let face = face.split('\0').next().unwrap_or_default().to_string();
        Ok(Self {
            id: Some(rec.u32_at(0)?),
            font: Font {
                height: rec.i32_at(4)?,
                width: rec.i32_at(8)?,
                escapement: rec.i32_at(12)?,
                orientation: rec.i32_at(16)?,
                weight: rec.i32_at(20)?,
                italic: rec.byte_at(24)? != 0,
                underline: rec.byte_at(25)? != 0,
                strikeout: rec.byte_at(26)? != 0,
                charset: rec.byte_at(27)?,
                face_name: face,
            },
        })
    }

    /// LOGFONT16 with an ANSI face name
    pub fn parse_wmf(rec: &Record) -> Result<Self> {
        let charset = rec.byte_at(13)?;
        let available = rec.size().saturating_sub(18).min(32);
        let face = decode_ansi(rec.bytes_at(18, available)?, charset);
        Ok(Self {
            id: None,
            font: Font {
                height: i32::from(rec.i16_at(0)?),
                width: i32::from(rec.i16_at(2)?),
                escapement: i32::from(rec.i16_at(4)?),
                orientation: i32::from(rec.i16_at(6)?),
                weight: i32::from(rec.i16_at(8)?),
                italic: rec.byte_at(10)? != 0,
                underline: rec.byte_at(11)? != 0,
                strikeout: rec.byte_at(12)? != 0,
                charset,
                face_name: face,
            },
        })
    }
}

impl Converter for CreateFont {
    fn render(&self, dc: &mut DeviceContext, _sink: &mut dyn OutputSink) -> Result<()> {
        dc.add_object(self.id, GdiObject::Font(self.font.clone()));
        Ok(())
    }
}

/// Palettes and regions: only the table slot matters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreatePlaceholder {
    pub id: Option<u32>,
}

impl Converter for CreatePlaceholder {
    fn render(&self, dc: &mut DeviceContext, _sink: &mut dyn OutputSink) -> Result<()> {
        dc.add_object(self.id, GdiObject::Placeholder);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectObject {
    pub id: u32,
}

impl SelectObject {
    pub fn parse_emf(rec: &Record) -> Result<Self> {
        Ok(Self { id: rec.u32_at(0)? })
    }

    pub fn parse_wmf(rec: &Record) -> Result<Self> {
        Ok(Self {
            id: u32::from(rec.u16_at(0)?),
        })
    }
}

impl Converter for SelectObject {
    fn render(&self, dc: &mut DeviceContext, sink: &mut dyn OutputSink) -> Result<()> {
        let is_region = dc.region_object(self.id).is_some();
        dc.select_object(self.id)?;
        if is_region {
            dc.region.apply(sink)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeleteObject {
    pub id: u32,
}

impl DeleteObject {
    pub fn parse_emf(rec: &Record) -> Result<Self> {
        Ok(Self { id: rec.u32_at(0)? })
    }

    pub fn parse_wmf(rec: &Record) -> Result<Self> {
        Ok(Self {
            id: u32::from(rec.u16_at(0)?),
        })
    }
}

impl Converter for DeleteObject {
    fn render(&self, dc: &mut DeviceContext, _sink: &mut dyn OutputSink) -> Result<()> {
        dc.delete_object(self.id)
    }
}

//! Raster transfers: BitBlt, StretchBlt, StretchDIBits and the WMF DIB blits.

use super::{Converter, emf_offset};
use crate::common::{DecodeError, Result};
use crate::images::metafile::bitmap::{decode_packed_dib, read_dib};
use crate::images::metafile::device_context::DeviceContext;
use crate::images::metafile::path::{RectF, Shape};
use crate::images::metafile::record::Record;
use crate::images::metafile::sink::{OutputSink, Paint, ShapeStyle};
use crate::images::metafile::types::Color;
use image::RgbaImage;
use image::imageops;

/// Ternary raster operations that make sense without a source bitmap
pub const PATCOPY: u32 = 0x00F0_0021;
pub const BLACKNESS: u32 = 0x0000_0042;
pub const WHITENESS: u32 = 0x00FF_0062;

/// Position and extent in logical (destination) or pixel (source) units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Area {
    pub x: i32,
    pub y: i32,
    pub cx: i32,
    pub cy: i32,
}

impl Area {
    pub const fn new(x: i32, y: i32, cx: i32, cy: i32) -> Self {
        Self { x, y, cx, cy }
    }
}

#[derive(Clone)]
pub struct Blit {
    pub dest: Area,
    pub src: Area,
    pub rop: u32,
    pub image: Option<RgbaImage>,
}

impl std::fmt::Debug for Blit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blit")
            .field("dest", &self.dest)
            .field("src", &self.src)
            .field("rop", &format_args!("{:#010x}", self.rop))
            .field("image", &self.image.as_ref().map(|i| i.dimensions()))
            .finish()
    }
}

/// Decode the source bitmap of an EMF blit, `None` when the record has none
fn emf_source(rec: &Record, usage_at: usize, bmi_at: usize) -> Result<Option<RgbaImage>> {
    let bmi_size = rec.u32_at(bmi_at + 4)? as usize;
    if bmi_size == 0 {
        return Ok(None);
    }
    let image = read_dib(
        rec,
        emf_offset(rec.u32_at(bmi_at)?)?,
        bmi_size,
        emf_offset(rec.u32_at(bmi_at + 8)?)?,
        rec.u32_at(bmi_at + 12)? as usize,
        rec.u32_at(usage_at)?,
    )?;
    Ok(Some(image))
}

/// A WMF blit record carries no bitmap when its size is the bare
/// parameter count encoded in the high byte of the function number.
fn wmf_has_bitmap(rec: &Record) -> bool {
    let bare = ((rec.record_type() >> 8) as usize + 3) * 2;
    rec.size() + 6 != bare
}

/// Packed DIB filling the rest of a WMF record from `offset`
fn wmf_packed_dib(rec: &Record, offset: usize) -> Result<RgbaImage> {
    let len = rec.size().checked_sub(offset).ok_or_else(|| {
        DecodeError::invalid_format(format!(
            "{}-byte blit record has no room for a bitmap at {offset}",
            rec.size()
        ))
    })?;
    decode_packed_dib(rec.bytes_at(offset, len)?, 0)
}

fn wmf_i32(rec: &Record, offset: usize) -> Result<i32> {
    Ok(i32::from(rec.i16_at(offset)?))
}

impl Blit {
    pub fn parse_emf_bitblt(rec: &Record) -> Result<Self> {
        let dest = Area::new(rec.i32_at(16)?, rec.i32_at(20)?, rec.i32_at(24)?, rec.i32_at(28)?);
        Ok(Self {
            dest,
            src: Area::new(rec.i32_at(36)?, rec.i32_at(40)?, dest.cx, dest.cy),
            rop: rec.u32_at(32)?,
            image: emf_source(rec, 72, 76)?,
        })
    }

    pub fn parse_emf_stretchblt(rec: &Record) -> Result<Self> {
        Ok(Self {
            dest: Area::new(rec.i32_at(16)?, rec.i32_at(20)?, rec.i32_at(24)?, rec.i32_at(28)?),
            src: Area::new(rec.i32_at(36)?, rec.i32_at(40)?, rec.i32_at(92)?, rec.i32_at(96)?),
            rop: rec.u32_at(32)?,
            image: emf_source(rec, 72, 76)?,
        })
    }

    pub fn parse_emf_stretchdibits(rec: &Record) -> Result<Self> {
        Ok(Self {
            dest: Area::new(rec.i32_at(16)?, rec.i32_at(20)?, rec.i32_at(64)?, rec.i32_at(68)?),
            src: Area::new(rec.i32_at(24)?, rec.i32_at(28)?, rec.i32_at(32)?, rec.i32_at(36)?),
            rop: rec.u32_at(60)?,
            image: emf_source(rec, 56, 40)?,
        })
    }

    /// META_DIBBITBLT
    pub fn parse_wmf_dib_bitblt(rec: &Record) -> Result<Self> {
        let rop = rec.u32_at(0)?;
        let (ys, xs) = (wmf_i32(rec, 4)?, wmf_i32(rec, 6)?);
        if wmf_has_bitmap(rec) {
            let (h, w) = (wmf_i32(rec, 8)?, wmf_i32(rec, 10)?);
            let dest = Area::new(wmf_i32(rec, 14)?, wmf_i32(rec, 12)?, w, h);
            let image = wmf_packed_dib(rec, 16)?;
            Ok(Self {
                dest,
                src: Area::new(xs, ys, w, h),
                rop,
                image: Some(image),
            })
        } else {
            let (h, w) = (wmf_i32(rec, 10)?, wmf_i32(rec, 12)?);
            Ok(Self {
                dest: Area::new(wmf_i32(rec, 16)?, wmf_i32(rec, 14)?, w, h),
                src: Area::new(xs, ys, w, h),
                rop,
                image: None,
            })
        }
    }

    /// META_DIBSTRETCHBLT
    pub fn parse_wmf_dib_stretchblt(rec: &Record) -> Result<Self> {
        let rop = rec.u32_at(0)?;
        let src = Area::new(
            wmf_i32(rec, 10)?,
            wmf_i32(rec, 8)?,
            wmf_i32(rec, 6)?,
            wmf_i32(rec, 4)?,
        );
        // the bitmap-less form has a reserved word before the destination
        let (base, image) = if wmf_has_bitmap(rec) {
            (12, Some(wmf_packed_dib(rec, 20)?))
        } else {
            (14, None)
        };
        Ok(Self {
            dest: Area::new(
                wmf_i32(rec, base + 6)?,
                wmf_i32(rec, base + 4)?,
                wmf_i32(rec, base + 2)?,
                wmf_i32(rec, base)?,
            ),
            src,
            rop,
            image,
        })
    }

    /// META_STRETCHDIB
    pub fn parse_wmf_stretchdib(rec: &Record) -> Result<Self> {
        let usage = u32::from(rec.u16_at(4)?);
        Ok(Self {
            rop: rec.u32_at(0)?,
            src: Area::new(
                wmf_i32(rec, 12)?,
                wmf_i32(rec, 10)?,
                wmf_i32(rec, 8)?,
                wmf_i32(rec, 6)?,
            ),
            dest: Area::new(
                wmf_i32(rec, 20)?,
                wmf_i32(rec, 18)?,
                wmf_i32(rec, 16)?,
                wmf_i32(rec, 14)?,
            ),
            image: Some(decode_packed_dib(
                rec.bytes_at(22, rec.size().saturating_sub(22))?,
                usage,
            )?),
        })
    }

    fn dest_rect(&self, dc: &DeviceContext) -> RectF {
        let d = self.dest;
        RectF::from_corners(
            dc.to_output_f(f64::from(d.x), f64::from(d.y)),
            dc.to_output_f(
                f64::from(d.x) + f64::from(d.cx),
                f64::from(d.y) + f64::from(d.cy),
            ),
        )
    }

    /// Source rectangle clamped to the image, `None` when nothing is left
    fn crop(&self, image: &RgbaImage) -> Option<RgbaImage> {
        let (w, h) = (image.width() as i64, image.height() as i64);
        let x = i64::from(self.src.x).clamp(0, w);
        let y = i64::from(self.src.y).clamp(0, h);
        let cx = i64::from(self.src.cx).abs().min(w - x);
        let cy = i64::from(self.src.cy).abs().min(h - y);
        if cx <= 0 || cy <= 0 {
            return None;
        }
        if x == 0 && y == 0 && cx == w && cy == h {
            return Some(image.clone());
        }
        Some(imageops::crop_imm(image, x as u32, y as u32, cx as u32, cy as u32).to_image())
    }
}

impl Converter for Blit {
    fn render(&self, dc: &mut DeviceContext, sink: &mut dyn OutputSink) -> Result<()> {
        let dest = self.dest_rect(dc);
        if let Some(image) = &self.image {
            if let Some(sub) = self.crop(image) {
                sink.draw_image(&sub, dest)?;
            }
            return Ok(());
        }
        let paint = match self.rop {
            PATCOPY => dc.fill(),
            BLACKNESS => Some(Paint::Solid(Color::BLACK)),
            WHITENESS => Some(Paint::Solid(Color::WHITE)),
            other => {
                return Err(DecodeError::unsupported(format!(
                    "raster operation {other:#010x} without a source bitmap"
                )));
            },
        };
        let style = ShapeStyle {
            fill: paint,
            stroke: None,
            fill_rule: dc.fill_mode.fill_rule(),
        };
        sink.draw(&Shape::Rect(dest), &style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::metafile::sink::{RecordingSink, SinkCall};
    use image::Rgba;

    fn blit(image: Option<RgbaImage>, src: Area, rop: u32) -> Blit {
        Blit {
            dest: Area::new(10, 10, 20, 20),
            src,
            rop,
            image,
        }
    }

    #[test]
    fn test_short_wmf_dib_blits_fail_recoverably() {
        let err = Blit::parse_wmf_dib_stretchblt(&Record::new(0x0B41, vec![0; 16])).unwrap_err();
        assert!(err.is_recoverable());
        let err = Blit::parse_wmf_dib_bitblt(&Record::new(0x0940, vec![0; 14])).unwrap_err();
        assert!(err.is_recoverable());
        let err = wmf_packed_dib(&Record::new(0x0940, vec![0; 12]), 16).unwrap_err();
        assert!(matches!(err.kind(), crate::common::ErrorKind::InvalidFormat(_)));
    }

    #[test]
    fn test_source_is_clamped_to_image() {
        let image = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        let b = blit(Some(image), Area::new(2, 2, 10, 10), 0x00CC_0020);
        let mut sink = RecordingSink::new();
        b.render(&mut DeviceContext::new(), &mut sink).unwrap();
        assert_eq!(
            sink.calls,
            vec![SinkCall::Image {
                width: 2,
                height: 2,
                dest: RectF::new(10.0, 10.0, 20.0, 20.0)
            }]
        );
    }

    #[test]
    fn test_source_outside_image_draws_nothing() {
        let image = RgbaImage::new(4, 4);
        let b = blit(Some(image), Area::new(8, 8, 2, 2), 0x00CC_0020);
        let mut sink = RecordingSink::new();
        b.render(&mut DeviceContext::new(), &mut sink).unwrap();
        assert!(sink.calls.is_empty());
    }

    #[test]
    fn test_blackness_without_bitmap() {
        let b = blit(None, Area::default(), BLACKNESS);
        let mut sink = RecordingSink::new();
        b.render(&mut DeviceContext::new(), &mut sink).unwrap();
        let (shape, style) = sink.draws().next().unwrap();
        assert_eq!(shape, &Shape::Rect(RectF::new(10.0, 10.0, 20.0, 20.0)));
        assert_eq!(style.fill, Some(Paint::Solid(Color::BLACK)));
        assert!(style.stroke.is_none());
    }

    #[test]
    fn test_unknown_rop_without_bitmap_is_recoverable() {
        let b = blit(None, Area::default(), 0x0055_0009);
        let err = b
            .render(&mut DeviceContext::new(), &mut RecordingSink::new())
            .unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_wmf_bitmapless_patblt_layout() {
        // DIBBITBLT without a bitmap: rop, ySrc, xSrc, reserved, h, w, yDest, xDest
        let mut data = Vec::new();
        data.extend_from_slice(&PATCOPY.to_le_bytes());
        for v in [0i16, 0, 0, 5, 6, 7, 8] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let rec = Record::new(0x0940, data);
        let b = Blit::parse_wmf_dib_bitblt(&rec).unwrap();
        assert!(b.image.is_none());
        assert_eq!(b.dest, Area::new(8, 7, 6, 5));
    }
}

//! One metafile record and bounds-checked access to its payload.
//!
//! EMF and WMF records differ only in their outer header. By the time a
//! [`Record`] exists the header has been consumed: `size` is the payload
//! length and every offset is relative to the first payload byte.

use super::types::{Color, Point, Rect, Size, XForm};
use crate::common::{DecodeError, Result};
use crate::common::binary::{
    parse_utf16le_string_len, read_bytes, read_f32_le, read_i16_le, read_i32_le, read_u16_le,
    read_u32_le,
};
use std::io::Read;

/// Immutable record payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    record_type: u32,
    data: Vec<u8>,
}

impl Record {
    pub fn new(record_type: u32, data: Vec<u8>) -> Self {
        Self { record_type, data }
    }

    /// Read a `len`-byte payload from a stream. A stream that ends early
    /// yields a recoverable truncation error; other I/O errors are fatal.
    pub fn read_from<R: Read>(reader: &mut R, record_type: u32, len: usize) -> Result<Self> {
        let mut data = Vec::with_capacity(len.min(1 << 16));
        reader.take(len as u64).read_to_end(&mut data)?;
        if data.len() < len {
            return Err(DecodeError::invalid_format(format!(
                "record type {record_type:#x} truncated: {} of {len} bytes",
                data.len()
            )));
        }
        Ok(Self { record_type, data })
    }

    #[inline]
    pub fn record_type(&self) -> u32 {
        self.record_type
    }

    /// Payload length in bytes
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn byte_at(&self, offset: usize) -> Result<u8> {
        Ok(read_bytes(&self.data, offset, 1)?[0])
    }

    #[inline]
    pub fn u16_at(&self, offset: usize) -> Result<u16> {
        Ok(read_u16_le(&self.data, offset)?)
    }

    #[inline]
    pub fn i16_at(&self, offset: usize) -> Result<i16> {
        Ok(read_i16_le(&self.data, offset)?)
    }

    /// Unsigned 32-bit field, widened so callers never see a negative value
    #[inline]
    pub fn u32_at(&self, offset: usize) -> Result<u32> {
        Ok(read_u32_le(&self.data, offset)?)
    }

    #[inline]
    pub fn i32_at(&self, offset: usize) -> Result<i32> {
        Ok(read_i32_le(&self.data, offset)?)
    }

    #[inline]
    pub fn f32_at(&self, offset: usize) -> Result<f32> {
        Ok(read_f32_le(&self.data, offset)?)
    }

    /// Packed `0x00BBGGRR` color
    #[inline]
    pub fn color_at(&self, offset: usize) -> Result<Color> {
        Ok(Color::from_colorref(self.u32_at(offset)?))
    }

    /// 16-bit RECT stored as left, top, right, bottom
    pub fn rect_at(&self, offset: usize) -> Result<Rect> {
        Ok(Rect::new(
            i32::from(self.i16_at(offset)?),
            i32::from(self.i16_at(offset + 2)?),
            i32::from(self.i16_at(offset + 4)?),
            i32::from(self.i16_at(offset + 6)?),
        ))
    }

    /// 32-bit RECTL stored as left, top, right, bottom
    pub fn rect_long_at(&self, offset: usize) -> Result<Rect> {
        Ok(Rect::new(
            self.i32_at(offset)?,
            self.i32_at(offset + 4)?,
            self.i32_at(offset + 8)?,
            self.i32_at(offset + 12)?,
        ))
    }

    /// 16-bit POINTS stored as x, y
    pub fn point_at(&self, offset: usize) -> Result<Point> {
        Ok(Point::new(
            i32::from(self.i16_at(offset)?),
            i32::from(self.i16_at(offset + 2)?),
        ))
    }

    /// 32-bit POINTL stored as x, y
    pub fn point_long_at(&self, offset: usize) -> Result<Point> {
        Ok(Point::new(self.i32_at(offset)?, self.i32_at(offset + 4)?))
    }

    pub fn dimension_at(&self, offset: usize) -> Result<Size> {
        Ok(Size::new(
            i32::from(self.i16_at(offset)?),
            i32::from(self.i16_at(offset + 2)?),
        ))
    }

    pub fn dimension_long_at(&self, offset: usize) -> Result<Size> {
        Ok(Size::new(self.i32_at(offset)?, self.i32_at(offset + 4)?))
    }

    #[inline]
    pub fn bytes_at(&self, offset: usize, count: usize) -> Result<&[u8]> {
        Ok(read_bytes(&self.data, offset, count)?)
    }

    /// `count` UTF-16LE code units
    pub fn chars_at(&self, offset: usize, count: usize) -> Result<String> {
        Ok(parse_utf16le_string_len(&self.data, offset, count)?)
    }

    /// XFORM: six IEEE-754 singles `eM11, eM12, eM21, eM22, eDx, eDy`
    pub fn transform_at(&self, offset: usize) -> Result<XForm> {
        let mut values = [0f32; 6];
        for (i, value) in values.iter_mut().enumerate() {
            *value = self.f32_at(offset + i * 4)?;
        }
        Ok(XForm::from_f32(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorKind;

    fn record(bytes: &[u8]) -> Record {
        Record::new(1, bytes.to_vec())
    }

    #[test]
    fn test_field_access() {
        let rec = record(&[
            0x0A, 0x00, 0xF6, 0xFF, // point (10, -10)
            0x40, 0x80, 0xFF, 0x00, // color
        ]);
        assert_eq!(rec.point_at(0).unwrap(), Point::new(10, -10));
        assert_eq!(rec.color_at(4).unwrap(), Color::rgb(0x40, 0x80, 0xFF));
        assert_eq!(rec.u16_at(2).unwrap(), 0xFFF6);
        assert_eq!(rec.i16_at(2).unwrap(), -10);
    }

    #[test]
    fn test_out_of_bounds_is_recoverable() {
        let rec = record(&[0u8; 6]);
        let err = rec.u32_at(4).unwrap_err();
        assert!(err.is_recoverable());
        assert!(matches!(
            err.kind(),
            ErrorKind::OutOfBounds {
                offset: 4,
                width: 4,
                size: 6
            }
        ));
        assert!(rec.rect_long_at(0).is_err());
        assert!(rec.bytes_at(2, 4).is_ok());
        assert!(rec.bytes_at(3, 4).is_err());
    }

    #[test]
    fn test_rect_long_and_transform() {
        let mut bytes = Vec::new();
        for v in [1i32, 2, 3, 4] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        for v in [1.0f32, 0.0, 0.0, 2.0, 5.0, -5.0] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let rec = record(&bytes);
        assert_eq!(rec.rect_long_at(0).unwrap(), Rect::new(1, 2, 3, 4));
        assert_eq!(
            rec.transform_at(16).unwrap(),
            XForm([1.0, 0.0, 0.0, 2.0, 5.0, -5.0])
        );
    }

    #[test]
    fn test_read_from_stream() {
        let mut input: &[u8] = &[1, 2, 3, 4, 5];
        let rec = Record::read_from(&mut input, 7, 4).unwrap();
        assert_eq!(rec.data(), &[1, 2, 3, 4]);
        assert_eq!(input, &[5]);

        let err = Record::read_from(&mut input, 7, 4).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_chars_at() {
        let rec = record(&[0x48, 0x00, 0x69, 0x00]);
        assert_eq!(rec.chars_at(0, 2).unwrap(), "Hi");
        assert!(rec.chars_at(0, 3).is_err());
    }
}

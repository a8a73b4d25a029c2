// EMF stream reader
//
// Reads the EMR_HEADER record and then yields the remaining records one at a
// time from any `Read` source.

use super::constants::{ENHMETA_SIGNATURE, EmrType};
use crate::common::{DecodeError, Result};
use crate::images::metafile::Record;
use crate::images::metafile::device_context::DEFAULT_DPI;
use crate::images::metafile::records::header::Header;
use crate::images::metafile::types::{Rect, Size};
use std::io::Read;
use zerocopy::FromBytes;
use zerocopy::little_endian::{I32, U16, U32};

/// A header record larger than this is not taken for an EMF header
const MAX_HEADER_SIZE: u32 = 5000;

const INVALID_HEADER: &str = "Invalid Enhanced Metafile Format: Invalid header";

/// Decoded EMR_HEADER fields
#[derive(Debug, Clone, PartialEq)]
pub struct EmfHeader {
    /// Bounds in device units, right/bottom made exclusive
    pub bounds: Rect,
    /// Frame in .01 millimeter units
    pub frame: Rect,
    /// Number of records including the header
    pub num_records: u32,
    pub num_handles: u16,
    /// Reference device size in pixels
    pub device: Size,
    /// Reference device size in millimeters
    pub millimeters: Size,
}

/// Raw EMR_HEADER prefix for zerocopy parsing (88 bytes)
#[allow(dead_code)]
#[derive(Debug, Clone, FromBytes)]
#[repr(C)]
struct RawEmfHeader {
    record_type: U32,
    record_size: U32,
    bounds_left: I32,
    bounds_top: I32,
    bounds_right: I32,
    bounds_bottom: I32,
    frame_left: I32,
    frame_top: I32,
    frame_right: I32,
    frame_bottom: I32,
    signature: U32,
    version: U32,
    size: U32,
    num_records: U32,
    num_handles: U16,
    reserved: U16,
    description_size: U32,
    description_offset: U32,
    num_palette: U32,
    device_width: I32,
    device_height: I32,
    device_width_mm: I32,
    device_height_mm: I32,
}

impl EmfHeader {
    /// Parse a complete header record, type and size words included
    pub fn parse(data: &[u8]) -> Result<Self> {
        let (raw, _) = RawEmfHeader::read_from_prefix(data)
            .map_err(|_| DecodeError::invalid_header(INVALID_HEADER))?;
        if raw.record_type.get() != EmrType::Header as u32 {
            return Err(DecodeError::invalid_header(INVALID_HEADER));
        }
        if raw.signature.get() != ENHMETA_SIGNATURE {
            return Err(DecodeError::invalid_header(format!(
                "Invalid Enhanced Metafile Format: signature {:#010x}",
                raw.signature.get()
            )));
        }
        Ok(Self {
            bounds: Rect::new(
                raw.bounds_left.get(),
                raw.bounds_top.get(),
                raw.bounds_right.get().saturating_add(1),
                raw.bounds_bottom.get().saturating_add(1),
            ),
            frame: Rect::new(
                raw.frame_left.get(),
                raw.frame_top.get(),
                raw.frame_right.get(),
                raw.frame_bottom.get(),
            ),
            num_records: raw.num_records.get(),
            num_handles: raw.num_handles.get(),
            device: Size::new(raw.device_width.get(), raw.device_height.get()),
            millimeters: Size::new(raw.device_width_mm.get(), raw.device_height_mm.get()),
        })
    }

    /// Reference device resolution, rounded to whole dots per inch
    pub fn dpi(&self) -> (u32, u32) {
        fn axis(pixels: i32, mm: i32) -> u32 {
            if pixels <= 0 || mm <= 0 {
                return DEFAULT_DPI;
            }
            (f64::from(pixels) * 25.4 / f64::from(mm) + 0.5) as u32
        }
        (
            axis(self.device.width, self.millimeters.width),
            axis(self.device.height, self.millimeters.height),
        )
    }

    pub fn to_header(&self) -> Header {
        let (dpi_x, dpi_y) = self.dpi();
        Header::new(self.bounds, dpi_x, dpi_y)
    }
}

/// Read the 8-byte type/size prefix, `None` at a clean end of stream
fn read_prefix<R: Read>(reader: &mut R) -> std::io::Result<Option<(u32, u32)>> {
    let mut buf = [0u8; 8];
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(std::io::ErrorKind::UnexpectedEof.into()),
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {},
            Err(e) => return Err(e),
        }
    }
    let [t0, t1, t2, t3, s0, s1, s2, s3] = buf;
    Ok(Some((
        u32::from_le_bytes([t0, t1, t2, t3]),
        u32::from_le_bytes([s0, s1, s2, s3]),
    )))
}

/// Record stream of an EMF file
pub struct EmfReader<R> {
    reader: R,
    header: EmfHeader,
    remaining: u32,
    done: bool,
}

impl<R: Read> EmfReader<R> {
    /// Consume and validate the header record. Every failure here is fatal.
    pub fn new(mut reader: R) -> Result<Self> {
        let (record_type, size) = match read_prefix(&mut reader) {
            Ok(Some(prefix)) => prefix,
            _ => return Err(DecodeError::invalid_header(INVALID_HEADER)),
        };
        if record_type != EmrType::Header as u32 || !(88..MAX_HEADER_SIZE).contains(&size) {
            return Err(DecodeError::invalid_header(INVALID_HEADER));
        }
        let mut data = vec![0u8; size as usize];
        data[..4].copy_from_slice(&record_type.to_le_bytes());
        data[4..8].copy_from_slice(&size.to_le_bytes());
        reader
            .read_exact(&mut data[8..])
            .map_err(|_| DecodeError::invalid_header(INVALID_HEADER))?;
        let header = EmfHeader::parse(&data)?;
        Ok(Self {
            reader,
            remaining: header.num_records.saturating_sub(1),
            header,
            done: false,
        })
    }

    pub fn header(&self) -> &EmfHeader {
        &self.header
    }

    fn read_record(&mut self) -> Result<Record> {
        let Some((record_type, size)) = read_prefix(&mut self.reader)? else {
            return Err(DecodeError::invalid_format("stream ended before EMR_EOF"));
        };
        if size < 8 {
            return Err(DecodeError::invalid_format(format!(
                "record type {record_type} declares size {size}"
            )));
        }
        Record::read_from(&mut self.reader, record_type, size as usize - 8)
    }
}

impl<R: Read> Iterator for EmfReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        match self.read_record() {
            Ok(record) => {
                if record.record_type() == EmrType::Eof as u32 {
                    self.done = true;
                }
                Some(Ok(record))
            },
            Err(err) => {
                self.done = true;
                // a short prefix is a truncation, not a broken source
                let err = match err.kind() {
                    crate::common::ErrorKind::Io(io)
                        if io.kind() == std::io::ErrorKind::UnexpectedEof =>
                    {
                        DecodeError::invalid_format("stream ended inside a record header")
                    },
                    _ => err,
                };
                Some(Err(err))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(num_records: u32) -> Vec<u8> {
        let mut data = Vec::new();
        for v in [1u32, 88, 0, 0, 99, 49, 0, 0, 2646, 1323] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        for v in [ENHMETA_SIGNATURE, 0x10000, 0, num_records] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(&[1, 0, 0, 0]);
        for v in [0u32, 0, 0, 1920, 1080, 508, 286] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data
    }

    #[test]
    fn test_header_fields() {
        let data = header_bytes(1);
        let reader = EmfReader::new(data.as_slice()).unwrap();
        let header = reader.header();
        assert_eq!(header.bounds, Rect::new(0, 0, 100, 50));
        assert_eq!(header.num_records, 1);
        assert_eq!(header.dpi(), (96, 96));
    }

    #[test]
    fn test_bad_signature_is_fatal() {
        let mut data = header_bytes(1);
        data[40] = 0;
        let err = EmfReader::new(data.as_slice()).err().unwrap();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_wrong_first_record_is_fatal() {
        let err = EmfReader::new(&[2u8, 0, 0, 0, 88, 0, 0, 0][..]).err().unwrap();
        assert!(!err.is_recoverable());
        assert!(EmfReader::new(&[][..]).is_err());
    }

    #[test]
    fn test_stops_at_eof_record() {
        let mut data = header_bytes(10);
        data.extend_from_slice(&[14, 0, 0, 0, 20, 0, 0, 0]);
        data.extend_from_slice(&[0u8; 12]);
        data.extend_from_slice(&[27, 0, 0, 0, 16, 0, 0, 0]);
        data.extend_from_slice(&[0u8; 8]);
        let records: Vec<_> = EmfReader::new(data.as_slice()).unwrap().collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].as_ref().unwrap().record_type(), 14);
    }

    #[test]
    fn test_truncated_record_is_recoverable() {
        let mut data = header_bytes(3);
        data.extend_from_slice(&[43, 0, 0, 0, 24, 0, 0, 0, 1, 2]);
        let records: Vec<_> = EmfReader::new(data.as_slice()).unwrap().collect();
        assert_eq!(records.len(), 1);
        assert!(records[0].as_ref().unwrap_err().is_recoverable());
    }
}

// WMF stream reader
//
// The file header is not a regular record: it is the 18-byte METAHEADER,
// optionally preceded by the 22-byte Aldus placeable header. Records follow
// as `u32 size in words, u16 function, parameters` until a zero function.

use super::constants::{APM_HEADER_SIZE, APM_SIGNATURE, WMF_HEADER_SIZE};
use crate::common::{DecodeError, Result};
use crate::images::metafile::Record;
use crate::images::metafile::device_context::DEFAULT_DPI;
use crate::images::metafile::records::header::Header;
use crate::images::metafile::types::Rect;
use std::io::Read;
use zerocopy::FromBytes;
use zerocopy::little_endian::{I16, U16, U32};

const INVALID_HEADER: &str = "Not a valid WMF file";

/// Extent used when no placeable header gives one
const DEFAULT_EXTENT: i32 = 1000;

/// Aldus placeable header (22 bytes)
#[allow(dead_code)]
#[derive(Debug, Clone, FromBytes)]
#[repr(C)]
struct RawPlaceableHeader {
    key: U32,
    handle: U16,
    left: I16,
    top: I16,
    right: I16,
    bottom: I16,
    inch: U16,
    reserved: U32,
    checksum: U16,
}

/// METAHEADER (18 bytes)
#[allow(dead_code)]
#[derive(Debug, Clone, FromBytes)]
#[repr(C)]
struct RawWmfHeader {
    file_type: U16,
    header_size: U16,
    version: U16,
    file_size: U32,
    num_objects: U16,
    max_record: U32,
    num_params: U16,
}

/// Placement rectangle of an APM file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub left: i16,
    pub top: i16,
    pub right: i16,
    pub bottom: i16,
    /// Metafile units per inch
    pub inch: u16,
}

/// Decoded file header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WmfHeader {
    pub placement: Option<Placement>,
    pub version: u16,
    /// File size in 16-bit words
    pub file_size: u32,
    pub num_objects: u16,
    /// Largest record in 16-bit words
    pub max_record: u32,
}

impl WmfHeader {
    /// The placement origin is ignored; only the extent sizes the canvas
    pub fn to_header(&self) -> Header {
        match self.placement {
            Some(p) => {
                let width = i32::from(p.right) - i32::from(p.left);
                let height = i32::from(p.bottom) - i32::from(p.top);
                let dpi = u32::from(p.inch);
                Header::new(Rect::new(0, 0, width, height), dpi, dpi)
            },
            None => Header::new(
                Rect::new(0, 0, DEFAULT_EXTENT, DEFAULT_EXTENT),
                DEFAULT_DPI,
                DEFAULT_DPI,
            ),
        }
    }
}

fn read_block<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader
        .read_exact(buf)
        .map_err(|_| DecodeError::invalid_header(INVALID_HEADER))
}

/// Record stream of a WMF or APM file
pub struct WmfReader<R> {
    reader: R,
    header: WmfHeader,
    done: bool,
}

impl<R: Read> WmfReader<R> {
    /// Consume and validate the file header. Every failure here is fatal.
    pub fn new(mut reader: R) -> Result<Self> {
        let mut apm = [0u8; APM_HEADER_SIZE];
        let mut standard = [0u8; WMF_HEADER_SIZE];

        read_block(&mut reader, &mut apm[..4])?;
        let placement = if u32::from_le_bytes([apm[0], apm[1], apm[2], apm[3]]) == APM_SIGNATURE {
            read_block(&mut reader, &mut apm[4..])?;
            read_block(&mut reader, &mut standard)?;
            let raw = RawPlaceableHeader::read_from_bytes(&apm)
                .map_err(|_| DecodeError::invalid_header(INVALID_HEADER))?;
            Some(Placement {
                left: raw.left.get(),
                top: raw.top.get(),
                right: raw.right.get(),
                bottom: raw.bottom.get(),
                inch: raw.inch.get(),
            })
        } else {
            standard[..4].copy_from_slice(&apm[..4]);
            read_block(&mut reader, &mut standard[4..])?;
            None
        };

        let raw = RawWmfHeader::read_from_bytes(&standard)
            .map_err(|_| DecodeError::invalid_header(INVALID_HEADER))?;
        // Disk metafiles only; the header is always nine words
        if raw.file_type.get() != 1 || raw.header_size.get() != 9 {
            return Err(DecodeError::invalid_header(INVALID_HEADER));
        }

        Ok(Self {
            reader,
            header: WmfHeader {
                placement,
                version: raw.version.get(),
                file_size: raw.file_size.get(),
                num_objects: raw.num_objects.get(),
                max_record: raw.max_record.get(),
            },
            done: false,
        })
    }

    pub fn header(&self) -> &WmfHeader {
        &self.header
    }

    fn read_record(&mut self) -> Result<Option<Record>> {
        let mut prefix = [0u8; 6];
        if self.reader.read_exact(&mut prefix).is_err() {
            return Err(DecodeError::invalid_format("stream ended before META_EOF"));
        }
        let [s0, s1, s2, s3, f0, f1] = prefix;
        let words = u32::from_le_bytes([s0, s1, s2, s3]);
        let function = u16::from_le_bytes([f0, f1]);
        if function == 0 {
            return Ok(None);
        }
        if words < 3 {
            return Err(DecodeError::invalid_format(format!(
                "record function {function:#06x} declares {words} words"
            )));
        }
        let len = (u64::from(words) * 2 - 6) as usize;
        Record::read_from(&mut self.reader, u32::from(function), len).map(Some)
    }
}

impl<R: Read> Iterator for WmfReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            },
            Err(err) => {
                self.done = true;
                Some(Err(err))
            },
        }
    }
}

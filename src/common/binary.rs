//! Binary data parsing utilities shared across formats.
//!
//! This module provides bounds-checked little-endian readers and the
//! UTF-16LE string decoding used by metafile records.

use zerocopy::{F32, FromBytes, I16, I32, LE, U16, U32};

/// Binary parsing error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryError {
    /// Not enough data to read the requested type
    InsufficientData {
        offset: usize,
        width: usize,
        available: usize,
    },
}

impl std::fmt::Display for BinaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryError::InsufficientData {
                offset,
                width,
                available,
            } => {
                write!(
                    f,
                    "Insufficient data: {} bytes at offset {}, got {}",
                    width, offset, available
                )
            },
        }
    }
}

impl std::error::Error for BinaryError {}

/// Result type for binary operations
pub type BinaryResult<T> = Result<T, BinaryError>;

/// Borrow `width` bytes starting at `offset`, failing instead of panicking
/// when the range runs past the end of `data`.
///
/// # Examples
///
/// ```
/// use metafile_transcoder::common::binary::read_bytes;
/// let data = [1u8, 2, 3, 4];
/// assert_eq!(read_bytes(&data, 1, 2).unwrap(), &[2, 3]);
/// assert!(read_bytes(&data, 3, 2).is_err());
/// ```
#[inline]
pub fn read_bytes(data: &[u8], offset: usize, width: usize) -> BinaryResult<&[u8]> {
    match offset.checked_add(width) {
        Some(end) if end <= data.len() => Ok(&data[offset..end]),
        _ => Err(BinaryError::InsufficientData {
            offset,
            width,
            available: data.len(),
        }),
    }
}

/// Read a little-endian u16 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use metafile_transcoder::common::binary::read_u16_le;
/// let data = [0x34, 0x12, 0x78, 0x56];
/// assert_eq!(read_u16_le(&data, 0).unwrap(), 0x1234);
/// assert_eq!(read_u16_le(&data, 2).unwrap(), 0x5678);
/// ```
#[inline]
pub fn read_u16_le(data: &[u8], offset: usize) -> BinaryResult<u16> {
    let bytes = read_bytes(data, offset, 2)?;
    Ok(U16::<LE>::read_from_bytes(bytes).map_or(0, |v| v.get()))
}

/// Read a little-endian i16 from a byte slice at the given offset.
#[inline]
pub fn read_i16_le(data: &[u8], offset: usize) -> BinaryResult<i16> {
    let bytes = read_bytes(data, offset, 2)?;
    Ok(I16::<LE>::read_from_bytes(bytes).map_or(0, |v| v.get()))
}

/// Read a little-endian u32 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use metafile_transcoder::common::binary::read_u32_le;
/// let data = [0x20, 0x45, 0x4D, 0x46];
/// assert_eq!(read_u32_le(&data, 0).unwrap(), 0x464D4520);
/// ```
#[inline]
pub fn read_u32_le(data: &[u8], offset: usize) -> BinaryResult<u32> {
    let bytes = read_bytes(data, offset, 4)?;
    Ok(U32::<LE>::read_from_bytes(bytes).map_or(0, |v| v.get()))
}

/// Read a little-endian i32 from a byte slice at the given offset.
#[inline]
pub fn read_i32_le(data: &[u8], offset: usize) -> BinaryResult<i32> {
    let bytes = read_bytes(data, offset, 4)?;
    Ok(I32::<LE>::read_from_bytes(bytes).map_or(0, |v| v.get()))
}

/// Read a little-endian IEEE-754 single from a byte slice at the given offset.
#[inline]
pub fn read_f32_le(data: &[u8], offset: usize) -> BinaryResult<f32> {
    let bytes = read_bytes(data, offset, 4)?;
    Ok(F32::<LE>::read_from_bytes(bytes).map_or(0.0, |v| v.get()))
}

/// Decode `char_count` UTF-16LE code units starting at `offset`.
///
/// Unpaired surrogates become U+FFFD. A string running past the end of the
/// slice is an error rather than a silently shortened result.
///
/// # Examples
///
/// ```
/// use metafile_transcoder::common::binary::parse_utf16le_string_len;
/// let data = vec![0x48, 0x00, 0x65, 0x00, 0x6C, 0x00, 0x6C, 0x00, 0x6F, 0x00];
/// assert_eq!(parse_utf16le_string_len(&data, 0, 5).unwrap(), "Hello");
/// assert_eq!(parse_utf16le_string_len(&data, 0, 3).unwrap(), "Hel");
/// ```
pub fn parse_utf16le_string_len(
    data: &[u8],
    offset: usize,
    char_count: usize,
) -> BinaryResult<String> {
    let bytes = read_bytes(data, offset, char_count.saturating_mul(2))?;
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
    Ok(char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_past_end() {
        let data = [0u8; 6];
        assert_eq!(
            read_u32_le(&data, 4),
            Err(BinaryError::InsufficientData {
                offset: 4,
                width: 4,
                available: 6
            })
        );
        assert!(read_bytes(&data, usize::MAX, 2).is_err());
    }

    #[test]
    fn test_signed_reads() {
        let data = [0xFF, 0xFF, 0x9C, 0xFF, 0xFF, 0xFF];
        assert_eq!(read_i16_le(&data, 0).unwrap(), -1);
        assert_eq!(read_i16_le(&data, 2).unwrap(), -100);
        assert_eq!(read_i32_le(&data, 2).unwrap(), -100);
    }

    #[test]
    fn test_read_f32() {
        let data = 1.5f32.to_le_bytes();
        assert_eq!(read_f32_le(&data, 0).unwrap(), 1.5);
    }
}

/// Device-independent bitmap decoding
///
/// Turns the BITMAPINFO + pixel array pairs embedded in blit and pattern
/// brush records into RGBA rasters. Uncompressed layouts are decoded here;
/// RLE-compressed bitmaps are wrapped in a synthesized BMP container and
/// JPEG/PNG payloads are passed straight to `image`.
///
/// References:
/// - [MS-WMF] 2.2.2.3 (BitmapInfoHeader), 2.2.2.2 (BitmapCoreHeader)
/// - [MS-WMF] 2.1.1.3 (Compression), 2.1.1.4 (ColorUsage)
use super::record::Record;
use super::types::Color;
use crate::common::binary::{read_bytes, read_i32_le, read_u16_le, read_u32_le};
use crate::common::{DecodeError, ErrorKind, Result};
use image::{ImageFormat, Rgba, RgbaImage};

pub const BI_RGB: u32 = 0;
pub const BI_RLE8: u32 = 1;
pub const BI_RLE4: u32 = 2;
pub const BI_BITFIELDS: u32 = 3;
pub const BI_JPEG: u32 = 4;
pub const BI_PNG: u32 = 5;

/// Palette entries are RGBQUADs
pub const DIB_RGB_COLORS: u32 = 0;
/// Palette entries are 16-bit indices into the logical palette
pub const DIB_PAL_COLORS: u32 = 1;

const CORE_HEADER_SIZE: usize = 12;
const INFO_HEADER_SIZE: usize = 40;
const MAX_PIXELS: u64 = 1 << 26;

/// Number of palette entries a DIB carries.
///
/// Indexed depths default to a full `2^bit_count` table when the declared
/// count is zero; deeper bitmaps carry exactly the declared count.
///
/// # Examples
///
/// ```
/// use metafile_transcoder::images::metafile::bitmap::palette_entries;
/// assert_eq!(palette_entries(8, 0), 256);
/// assert_eq!(palette_entries(24, 0), 0);
/// ```
pub fn palette_entries(bit_count: u16, colors_used: u32) -> usize {
    if bit_count <= 8 && colors_used == 0 {
        1usize << bit_count
    } else {
        colors_used as usize
    }
}

/// Parsed BITMAPINFOHEADER or BITMAPCOREHEADER
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DibHeader {
    pub header_size: usize,
    pub width: u32,
    pub height: u32,
    /// Rows run top to bottom (negative height in the header)
    pub top_down: bool,
    pub bit_count: u16,
    pub compression: u32,
    pub colors_used: u32,
}

impl DibHeader {
    pub fn parse(bmi: &[u8]) -> Result<Self> {
        let header_size = read_u32_le(bmi, 0)? as usize;
        if header_size == CORE_HEADER_SIZE {
            let bit_count = read_u16_le(bmi, 10)?;
            return Ok(Self {
                header_size,
                width: u32::from(read_u16_le(bmi, 4)?),
                height: u32::from(read_u16_le(bmi, 6)?),
                top_down: false,
                bit_count,
                compression: BI_RGB,
                colors_used: 0,
            });
        }
        if header_size < INFO_HEADER_SIZE {
            return Err(DecodeError::invalid_format(format!(
                "unknown bitmap header size {header_size}"
            )));
        }
        let width = read_i32_le(bmi, 4)?;
        let height = read_i32_le(bmi, 8)?;
        Ok(Self {
            header_size,
            width: width.unsigned_abs(),
            height: height.unsigned_abs(),
            top_down: height < 0,
            bit_count: read_u16_le(bmi, 14)?,
            compression: read_u32_le(bmi, 16)?,
            colors_used: read_u32_le(bmi, 32)?,
        })
    }

    pub fn is_core(&self) -> bool {
        self.header_size == CORE_HEADER_SIZE
    }

    /// Palette entries implied by this header
    pub fn palette_len(&self) -> usize {
        if self.is_core() {
            if self.bit_count <= 8 { 1 << self.bit_count } else { 0 }
        } else {
            palette_entries(self.bit_count, self.colors_used)
        }
    }

    /// Offset of the first palette entry
    fn palette_offset(&self) -> usize {
        if self.compression == BI_BITFIELDS && self.header_size == INFO_HEADER_SIZE {
            self.header_size + 12
        } else {
            self.header_size
        }
    }

    fn entry_size(&self, usage: u32) -> usize {
        match (self.is_core(), usage) {
            (_, DIB_PAL_COLORS) => 2,
            (true, _) => 3,
            (false, _) => 4,
        }
    }

    /// Size of header, masks and palette together
    pub fn info_size(&self, usage: u32) -> usize {
        self.palette_offset() + self.palette_len() * self.entry_size(usage)
    }

    fn stride(&self) -> usize {
        ((self.width as usize * self.bit_count as usize + 31) / 32) * 4
    }
}

/// Decode a bitmap whose header and bits live at separate record offsets,
/// as in EMF blit and brush records.
pub fn read_dib(
    rec: &Record,
    bmi_offset: usize,
    bmi_size: usize,
    bits_offset: usize,
    bits_size: usize,
    usage: u32,
) -> Result<RgbaImage> {
    let bmi = rec.bytes_at(bmi_offset, bmi_size)?;
    let bits = rec.bytes_at(bits_offset, bits_size)?;
    decode_dib(bmi, bits, usage)
}

/// Decode a packed DIB (header, palette, then bits) as stored in WMF records.
pub fn decode_packed_dib(data: &[u8], usage: u32) -> Result<RgbaImage> {
    let header = DibHeader::parse(data)?;
    let split = header.info_size(usage).min(data.len());
    decode_dib(&data[..split], &data[split..], usage)
}

/// Decode a DIB from its BITMAPINFO and pixel array.
pub fn decode_dib(bmi: &[u8], bits: &[u8], usage: u32) -> Result<RgbaImage> {
    let header = DibHeader::parse(bmi)?;
    if usage == DIB_PAL_COLORS && header.bit_count <= 8 {
        return Err(DecodeError::unsupported(
            "palette-indexed DIB color table (DIB_PAL_COLORS)",
        ));
    }
    match header.compression {
        BI_RGB | BI_BITFIELDS => decode_uncompressed(&header, bmi, bits),
        BI_RLE8 | BI_RLE4 => decode_via_container(&header, bmi, bits),
        BI_JPEG => Ok(image::load_from_memory_with_format(bits, ImageFormat::Jpeg)?.to_rgba8()),
        BI_PNG => Ok(image::load_from_memory_with_format(bits, ImageFormat::Png)?.to_rgba8()),
        other => Err(DecodeError::unsupported(format!(
            "bitmap compression {other}"
        ))),
    }
}

fn read_palette(header: &DibHeader, bmi: &[u8]) -> Result<Vec<Color>> {
    let entry = header.entry_size(DIB_RGB_COLORS);
    let offset = header.palette_offset();
    let count = header.palette_len();
    let table = read_bytes(bmi, offset, count * entry)?;
    Ok(table
        .chunks_exact(entry)
        .map(|q| Color::rgb(q[2], q[1], q[0]))
        .collect())
}

/// Channel mask with its shift and maximum value
#[derive(Debug, Clone, Copy)]
struct Channel {
    mask: u32,
    shift: u32,
    max: u32,
}

impl Channel {
    fn new(mask: u32) -> Self {
        let shift = if mask == 0 { 0 } else { mask.trailing_zeros() };
        let bits = mask.count_ones();
        let max = ((1u64 << bits) - 1) as u32;
        Self { mask, shift, max }
    }

    #[inline]
    fn extract(&self, pixel: u32) -> u8 {
        if self.max == 0 {
            return 0;
        }
        let v = (pixel & self.mask) >> self.shift;
        ((u64::from(v) * 255) / u64::from(self.max)) as u8
    }
}

fn channel_masks(header: &DibHeader, bmi: &[u8]) -> Result<[Channel; 3]> {
    if header.compression == BI_BITFIELDS {
        Ok([
            Channel::new(read_u32_le(bmi, INFO_HEADER_SIZE)?),
            Channel::new(read_u32_le(bmi, INFO_HEADER_SIZE + 4)?),
            Channel::new(read_u32_le(bmi, INFO_HEADER_SIZE + 8)?),
        ])
    } else {
        Ok([
            Channel::new(0x7C00),
            Channel::new(0x03E0),
            Channel::new(0x001F),
        ])
    }
}

fn check_dimensions(header: &DibHeader) -> Result<()> {
    let pixels = u64::from(header.width) * u64::from(header.height);
    if pixels == 0 || pixels > MAX_PIXELS {
        return Err(DecodeError::invalid_format(format!(
            "bitmap dimensions {}x{} out of range",
            header.width, header.height
        )));
    }
    Ok(())
}

fn decode_uncompressed(header: &DibHeader, bmi: &[u8], bits: &[u8]) -> Result<RgbaImage> {
    check_dimensions(header)?;
    let stride = header.stride();
    let needed = stride * header.height as usize;
    let bits = read_bytes(bits, 0, needed).map_err(|_| {
        DecodeError::recoverable(ErrorKind::OutOfBounds {
            offset: 0,
            width: needed,
            size: bits.len(),
        })
    })?;

    let palette = if header.bit_count <= 8 {
        read_palette(header, bmi)?
    } else {
        Vec::new()
    };
    let masks = match header.bit_count {
        16 | 32 => Some(channel_masks(header, bmi)?),
        _ => None,
    };
    let lookup = |index: usize| palette.get(index).copied().unwrap_or(Color::BLACK);

    let mut img = RgbaImage::new(header.width, header.height);
    for row in 0..header.height {
        let src = &bits[row as usize * stride..(row as usize + 1) * stride];
        let y = if header.top_down {
            row
        } else {
            header.height - 1 - row
        };
        for x in 0..header.width {
            let xi = x as usize;
            let color = match header.bit_count {
                1 => lookup(usize::from((src[xi / 8] >> (7 - (xi % 8))) & 1)),
                4 => {
                    let shift = if xi % 2 == 0 { 4 } else { 0 };
                    lookup(usize::from((src[xi / 2] >> shift) & 0x0F))
                },
                8 => lookup(usize::from(src[xi])),
                16 => {
                    let p = u32::from(u16::from_le_bytes([src[xi * 2], src[xi * 2 + 1]]));
                    rgb_from_masks(masks, p)
                },
                24 => Color::rgb(src[xi * 3 + 2], src[xi * 3 + 1], src[xi * 3]),
                32 if header.compression == BI_BITFIELDS => {
                    let o = xi * 4;
                    let p = u32::from_le_bytes([src[o], src[o + 1], src[o + 2], src[o + 3]]);
                    rgb_from_masks(masks, p)
                },
                32 => Color::rgb(src[xi * 4 + 2], src[xi * 4 + 1], src[xi * 4]),
                other => {
                    return Err(DecodeError::unsupported(format!(
                        "bitmap depth {other}"
                    )));
                },
            };
            img.put_pixel(x, y, Rgba([color.r, color.g, color.b, 255]));
        }
    }
    Ok(img)
}

#[inline]
fn rgb_from_masks(masks: Option<[Channel; 3]>, pixel: u32) -> Color {
    match masks {
        Some([r, g, b]) => Color::rgb(r.extract(pixel), g.extract(pixel), b.extract(pixel)),
        None => Color::BLACK,
    }
}

/// Wrap the DIB in a BMP file so the `image` decoder handles run-length
/// compression. The palette is padded to the size the header implies.
fn decode_via_container(header: &DibHeader, bmi: &[u8], bits: &[u8]) -> Result<RgbaImage> {
    check_dimensions(header)?;
    if header.palette_len() > 256 {
        return Err(DecodeError::invalid_format(format!(
            "{} palette entries for a run-length bitmap",
            header.palette_len()
        )));
    }
    let palette_bytes = header.palette_len() * 4;
    let header_bytes = read_bytes(bmi, 0, header.header_size)?;
    let available = bmi.len().saturating_sub(header.header_size).min(palette_bytes);

    let pixel_offset = 14 + header.header_size + palette_bytes;
    let file_size = pixel_offset + bits.len();
    let mut bmp = Vec::with_capacity(file_size);
    bmp.extend_from_slice(b"BM");
    bmp.extend_from_slice(&(file_size as u32).to_le_bytes());
    bmp.extend_from_slice(&[0u8; 4]);
    bmp.extend_from_slice(&(pixel_offset as u32).to_le_bytes());
    bmp.extend_from_slice(header_bytes);
    bmp.extend_from_slice(&bmi[header.header_size..header.header_size + available]);
    bmp.resize(pixel_offset, 0);
    bmp.extend_from_slice(bits);

    Ok(image::load_from_memory_with_format(&bmp, ImageFormat::Bmp)?.to_rgba8())
}

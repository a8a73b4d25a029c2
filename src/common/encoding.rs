//! Code page selection for ANSI text records.
//!
//! Metafile text records written through the "A" entry points store single-
//! or multi-byte strings in the code page implied by the selected font's
//! character set.

use encoding_rs::Encoding;

/// Map a LOGFONT character set to the `encoding_rs` encoding used to decode
/// text written with that font.
///
/// # Examples
/// ```
/// use metafile_transcoder::common::encoding::charset_to_encoding;
///
/// assert_eq!(charset_to_encoding(128).name(), "Shift_JIS");
/// assert_eq!(charset_to_encoding(0).name(), "windows-1252");
/// ```
#[inline]
pub fn charset_to_encoding(charset: u8) -> &'static Encoding {
    match charset {
        128 => encoding_rs::SHIFT_JIS,    // SHIFTJIS_CHARSET
        129 => encoding_rs::EUC_KR,       // HANGUL_CHARSET
        130 => encoding_rs::EUC_KR,       // JOHAB_CHARSET (approximation)
        134 => encoding_rs::GBK,          // GB2312_CHARSET
        136 => encoding_rs::BIG5,         // CHINESEBIG5_CHARSET
        161 => encoding_rs::WINDOWS_1253, // GREEK_CHARSET
        162 => encoding_rs::WINDOWS_1254, // TURKISH_CHARSET
        163 => encoding_rs::WINDOWS_1258, // VIETNAMESE_CHARSET
        177 => encoding_rs::WINDOWS_1255, // HEBREW_CHARSET
        178 => encoding_rs::WINDOWS_1256, // ARABIC_CHARSET
        186 => encoding_rs::WINDOWS_1257, // BALTIC_CHARSET
        204 => encoding_rs::WINDOWS_1251, // RUSSIAN_CHARSET
        222 => encoding_rs::WINDOWS_874,  // THAI_CHARSET
        238 => encoding_rs::WINDOWS_1250, // EASTEUROPE_CHARSET
        77 => encoding_rs::MACINTOSH,     // MAC_CHARSET
        _ => encoding_rs::WINDOWS_1252,   // ANSI_CHARSET, DEFAULT_CHARSET, ...
    }
}

/// Decode ANSI bytes using the code page of `charset`, stopping at the first
/// NUL byte.
///
/// # Examples
/// ```
/// use metafile_transcoder::common::encoding::decode_ansi;
///
/// assert_eq!(decode_ansi(b"caf\xE9\0junk", 0), "café");
/// ```
pub fn decode_ansi(bytes: &[u8], charset: u8) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let (text, _) = charset_to_encoding(charset).decode_without_bom_handling(&bytes[..end]);
    text.into_owned()
}

//! Shared SVG utilities for metafile conversion
//!
//! All functions write directly to an output buffer instead of returning
//! freshly allocated strings.
//!
//! # Performance Optimizations
//!
//! - **Zero-allocation number formatting**: Uses `itoa` for integers and `ryu` for floats
//! - **Inline color conversion**: Writes hex colors directly without intermediate strings

use crate::images::metafile::types::Color;
use std::fmt::Write;

/// Fast number formatter that writes directly to a string buffer.
/// Uses itoa for integers and ryu for floats, rounding to two decimals.
///
/// # Examples
///
/// ```
/// use metafile_transcoder::images::svg_utils::write_num;
///
/// let mut buf = String::new();
/// write_num(&mut buf, 10.0);  // writes "10"
/// write_num(&mut buf, 10.5);  // writes "10.5"
/// write_num(&mut buf, 10.123); // writes "10.12"
/// assert_eq!(buf, "1010.510.12");
/// ```
#[inline]
pub fn write_num(buf: &mut String, n: f64) {
    let rounded = (n * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 && rounded.abs() < 1e15 {
        let mut buffer = itoa::Buffer::new();
        // -0 prints as 0
        buf.push_str(buffer.format(rounded as i64));
    } else if rounded.is_finite() {
        let mut buffer = ryu::Buffer::new();
        let s = buffer.format(rounded);
        if s.contains('.') && !s.contains('e') {
            buf.push_str(s.trim_end_matches('0').trim_end_matches('.'));
        } else {
            buf.push_str(s);
        }
    } else {
        buf.push('0');
    }
}

/// Write a color in #rrggbb format directly to a buffer.
///
/// # Examples
///
/// ```
/// use metafile_transcoder::images::metafile::types::Color;
/// use metafile_transcoder::images::svg_utils::write_color_hex;
///
/// let mut buf = String::new();
/// write_color_hex(&mut buf, Color::from_colorref(0x0000FF)); // red in COLORREF
/// assert_eq!(buf, "#ff0000");
/// ```
#[inline]
pub fn write_color_hex(buf: &mut String, color: Color) {
    let _ = write!(buf, "#{:02x}{:02x}{:02x}", color.r, color.g, color.b);
}

/// Write `text` with the five XML special characters escaped.
pub fn write_xml_escaped(buf: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '<' => buf.push_str("&lt;"),
            '>' => buf.push_str("&gt;"),
            '&' => buf.push_str("&amp;"),
            '"' => buf.push_str("&quot;"),
            '\'' => buf.push_str("&apos;"),
            // characters not allowed in XML 1.0
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {},
            c => buf.push(c),
        }
    }
}

/// Map a Windows font face to a CSS generic family when one fits.
pub fn map_font_family(name: &str) -> &str {
    match name {
        // Serif fonts
        "Times New Roman" | "Times" | "Georgia" | "Garamond" | "MS Serif" => "serif",
        // Sans-serif fonts
        "Arial" | "Helvetica" | "Verdana" | "Tahoma" | "Trebuchet MS" | "Arial Black"
        | "MS Sans Serif" | "Segoe UI" => "sans-serif",
        // Monospace fonts
        "Courier New" | "Courier" | "Consolas" | "Monaco" | "Lucida Console" | "Fixedsys" => {
            "monospace"
        },
        // Cursive fonts
        "Comic Sans MS" | "Brush Script MT" => "cursive",
        // Fantasy fonts
        "Impact" | "Papyrus" => "fantasy",
        // Keep original name for other fonts
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_num() {
        let mut buf = String::new();
        write_num(&mut buf, 10.0);
        assert_eq!(buf, "10");

        buf.clear();
        write_num(&mut buf, 10.5);
        assert_eq!(buf, "10.5");

        buf.clear();
        write_num(&mut buf, 10.123);
        assert_eq!(buf, "10.12");

        buf.clear();
        write_num(&mut buf, 10.126);
        assert_eq!(buf, "10.13");

        buf.clear();
        write_num(&mut buf, -0.001);
        assert_eq!(buf, "0");
    }

    #[test]
    fn test_write_color_hex() {
        let mut buf = String::new();
        write_color_hex(&mut buf, Color::from_colorref(0x00FF00));
        assert_eq!(buf, "#00ff00");

        buf.clear();
        write_color_hex(&mut buf, Color::from_colorref(0xFF0000));
        assert_eq!(buf, "#0000ff");
    }

    #[test]
    fn test_write_xml_escaped() {
        let mut buf = String::new();
        write_xml_escaped(&mut buf, "Hello <world> & \"friends\"");
        assert_eq!(buf, "Hello &lt;world&gt; &amp; &quot;friends&quot;");
    }

    #[test]
    fn test_map_font_family() {
        assert_eq!(map_font_family("Arial"), "sans-serif");
        assert_eq!(map_font_family("Symbol"), "Symbol");
    }
}

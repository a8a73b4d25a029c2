//! WMF record function codes
//!
//! Function numbers as stored in the `rdFunction` word of every record. The
//! low byte identifies the call, the high byte is the parameter count hint.

use phf::phf_map;

/// Key of the Aldus placeable header
pub const APM_SIGNATURE: u32 = 0x9AC6_CDD7;
pub const APM_HEADER_SIZE: usize = 22;
pub const WMF_HEADER_SIZE: usize = 18;

/// Opcode the file header is reported under; it is not a real record
pub const HEADER_FUNCTION: u16 = 0xFFFF;

pub mod function {
    pub const EOF: u16 = 0x0000;
    pub const SAVE_DC: u16 = 0x001E;
    pub const REALIZE_PALETTE: u16 = 0x0035;
    pub const SET_PAL_ENTRIES: u16 = 0x0037;
    pub const CREATE_PALETTE: u16 = 0x00F7;
    pub const SET_BK_MODE: u16 = 0x0102;
    pub const SET_MAP_MODE: u16 = 0x0103;
    pub const SET_ROP2: u16 = 0x0104;
    pub const SET_REL_ABS: u16 = 0x0105;
    pub const SET_POLY_FILL_MODE: u16 = 0x0106;
    pub const SET_STRETCH_BLT_MODE: u16 = 0x0107;
    pub const SET_TEXT_CHAR_EXTRA: u16 = 0x0108;
    pub const RESTORE_DC: u16 = 0x0127;
    pub const INVERT_REGION: u16 = 0x012A;
    pub const PAINT_REGION: u16 = 0x012B;
    pub const SELECT_CLIP_REGION: u16 = 0x012C;
    pub const SELECT_OBJECT: u16 = 0x012D;
    pub const SET_TEXT_ALIGN: u16 = 0x012E;
    pub const RESIZE_PALETTE: u16 = 0x0139;
    pub const DIB_CREATE_PATTERN_BRUSH: u16 = 0x0142;
    pub const SET_LAYOUT: u16 = 0x0149;
    pub const DELETE_OBJECT: u16 = 0x01F0;
    pub const CREATE_PATTERN_BRUSH: u16 = 0x01F9;
    pub const SET_BK_COLOR: u16 = 0x0201;
    pub const SET_TEXT_COLOR: u16 = 0x0209;
    pub const SET_TEXT_JUSTIFICATION: u16 = 0x020A;
    pub const SET_WINDOW_ORG: u16 = 0x020B;
    pub const SET_WINDOW_EXT: u16 = 0x020C;
    pub const SET_VIEWPORT_ORG: u16 = 0x020D;
    pub const SET_VIEWPORT_EXT: u16 = 0x020E;
    pub const OFFSET_WINDOW_ORG: u16 = 0x020F;
    pub const OFFSET_VIEWPORT_ORG: u16 = 0x0211;
    pub const LINE_TO: u16 = 0x0213;
    pub const MOVE_TO: u16 = 0x0214;
    pub const OFFSET_CLIP_RGN: u16 = 0x0220;
    pub const FILL_REGION: u16 = 0x0228;
    pub const SET_MAPPER_FLAGS: u16 = 0x0231;
    pub const SELECT_PALETTE: u16 = 0x0234;
    pub const CREATE_PEN_INDIRECT: u16 = 0x02FA;
    pub const CREATE_FONT_INDIRECT: u16 = 0x02FB;
    pub const CREATE_BRUSH_INDIRECT: u16 = 0x02FC;
    pub const POLYGON: u16 = 0x0324;
    pub const POLYLINE: u16 = 0x0325;
    pub const SCALE_WINDOW_EXT: u16 = 0x0410;
    pub const SCALE_VIEWPORT_EXT: u16 = 0x0412;
    pub const EXCLUDE_CLIP_RECT: u16 = 0x0415;
    pub const INTERSECT_CLIP_RECT: u16 = 0x0416;
    pub const ELLIPSE: u16 = 0x0418;
    pub const FLOOD_FILL: u16 = 0x0419;
    pub const RECTANGLE: u16 = 0x041B;
    pub const SET_PIXEL: u16 = 0x041F;
    pub const FRAME_REGION: u16 = 0x0429;
    pub const ANIMATE_PALETTE: u16 = 0x0436;
    pub const TEXT_OUT: u16 = 0x0521;
    pub const POLY_POLYGON: u16 = 0x0538;
    pub const EXT_FLOOD_FILL: u16 = 0x0548;
    pub const ROUND_RECT: u16 = 0x061C;
    pub const PAT_BLT: u16 = 0x061D;
    pub const ESCAPE: u16 = 0x0626;
    pub const DRAW_TEXT: u16 = 0x062F;
    pub const CREATE_REGION: u16 = 0x06FF;
    pub const ARC: u16 = 0x0817;
    pub const PIE: u16 = 0x081A;
    pub const CHORD: u16 = 0x0830;
    pub const BIT_BLT: u16 = 0x0922;
    pub const DIB_BIT_BLT: u16 = 0x0940;
    pub const EXT_TEXT_OUT: u16 = 0x0A32;
    pub const STRETCH_BLT: u16 = 0x0B23;
    pub const DIB_STRETCH_BLT: u16 = 0x0B41;
    pub const SET_DIB_TO_DEV: u16 = 0x0D33;
    pub const STRETCH_DIB: u16 = 0x0F43;
    /// Written by some producers for 16-bit Bezier runs
    pub const POLY_BEZIER16: u16 = 0x1000;
}

/// Display names of every known function, used in log lines
pub static FUNCTION_NAMES: phf::Map<u16, &'static str> = phf_map! {
    0x0000u16 => "META_EOF",
    0x001Eu16 => "META_SAVEDC",
    0x0035u16 => "META_REALIZEPALETTE",
    0x0037u16 => "META_SETPALENTRIES",
    0x00F7u16 => "META_CREATEPALETTE",
    0x0102u16 => "META_SETBKMODE",
    0x0103u16 => "META_SETMAPMODE",
    0x0104u16 => "META_SETROP2",
    0x0105u16 => "META_SETRELABS",
    0x0106u16 => "META_SETPOLYFILLMODE",
    0x0107u16 => "META_SETSTRETCHBLTMODE",
    0x0108u16 => "META_SETTEXTCHAREXTRA",
    0x0127u16 => "META_RESTOREDC",
    0x012Au16 => "META_INVERTREGION",
    0x012Bu16 => "META_PAINTREGION",
    0x012Cu16 => "META_SELECTCLIPREGION",
    0x012Du16 => "META_SELECTOBJECT",
    0x012Eu16 => "META_SETTEXTALIGN",
    0x0139u16 => "META_RESIZEPALETTE",
    0x0142u16 => "META_DIBCREATEPATTERNBRUSH",
    0x0149u16 => "META_SETLAYOUT",
    0x01F0u16 => "META_DELETEOBJECT",
    0x01F9u16 => "META_CREATEPATTERNBRUSH",
    0x0201u16 => "META_SETBKCOLOR",
    0x0209u16 => "META_SETTEXTCOLOR",
    0x020Au16 => "META_SETTEXTJUSTIFICATION",
    0x020Bu16 => "META_SETWINDOWORG",
    0x020Cu16 => "META_SETWINDOWEXT",
    0x020Du16 => "META_SETVIEWPORTORG",
    0x020Eu16 => "META_SETVIEWPORTEXT",
    0x020Fu16 => "META_OFFSETWINDOWORG",
    0x0211u16 => "META_OFFSETVIEWPORTORG",
    0x0213u16 => "META_LINETO",
    0x0214u16 => "META_MOVETO",
    0x0220u16 => "META_OFFSETCLIPRGN",
    0x0228u16 => "META_FILLREGION",
    0x0231u16 => "META_SETMAPPERFLAGS",
    0x0234u16 => "META_SELECTPALETTE",
    0x02FAu16 => "META_CREATEPENINDIRECT",
    0x02FBu16 => "META_CREATEFONTINDIRECT",
    0x02FCu16 => "META_CREATEBRUSHINDIRECT",
    0x0324u16 => "META_POLYGON",
    0x0325u16 => "META_POLYLINE",
    0x0410u16 => "META_SCALEWINDOWEXT",
    0x0412u16 => "META_SCALEVIEWPORTEXT",
    0x0415u16 => "META_EXCLUDECLIPRECT",
    0x0416u16 => "META_INTERSECTCLIPRECT",
    0x0418u16 => "META_ELLIPSE",
    0x0419u16 => "META_FLOODFILL",
    0x041Bu16 => "META_RECTANGLE",
    0x041Fu16 => "META_SETPIXEL",
    0x0429u16 => "META_FRAMEREGION",
    0x0436u16 => "META_ANIMATEPALETTE",
    0x0521u16 => "META_TEXTOUT",
    0x0538u16 => "META_POLYPOLYGON",
    0x0548u16 => "META_EXTFLOODFILL",
    0x061Cu16 => "META_ROUNDRECT",
    0x061Du16 => "META_PATBLT",
    0x0626u16 => "META_ESCAPE",
    0x062Fu16 => "META_DRAWTEXT",
    0x06FFu16 => "META_CREATEREGION",
    0x0817u16 => "META_ARC",
    0x081Au16 => "META_PIE",
    0x0830u16 => "META_CHORD",
    0x0922u16 => "META_BITBLT",
    0x0940u16 => "META_DIBBITBLT",
    0x0A32u16 => "META_EXTTEXTOUT",
    0x0B23u16 => "META_STRETCHBLT",
    0x0B41u16 => "META_DIBSTRETCHBLT",
    0x0D33u16 => "META_SETDIBTODEV",
    0x0F43u16 => "META_STRETCHDIB",
    0x1000u16 => "META_POLYBEZIER16",
};

/// Display name of a record function
pub fn record_name(function: u32) -> &'static str {
    if function == u32::from(HEADER_FUNCTION) {
        return "META_HEADER";
    }
    u16::try_from(function)
        .ok()
        .and_then(|f| FUNCTION_NAMES.get(&f).copied())
        .unwrap_or("META_UNKNOWN")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(record_name(u32::from(function::LINE_TO)), "META_LINETO");
        assert_eq!(record_name(u32::from(function::DIB_STRETCH_BLT)), "META_DIBSTRETCHBLT");
        assert_eq!(record_name(0xFFFF), "META_HEADER");
        assert_eq!(record_name(0x0999), "META_UNKNOWN");
        assert_eq!(record_name(0x1_0213), "META_UNKNOWN");
    }

    #[test]
    fn test_function_codes_are_named() {
        for code in [
            function::SAVE_DC,
            function::SET_VIEWPORT_ORG,
            function::CREATE_REGION,
            function::STRETCH_DIB,
            function::POLY_BEZIER16,
        ] {
            assert!(FUNCTION_NAMES.contains_key(&code), "{code:#06x}");
        }
        assert_eq!(FUNCTION_NAMES.len(), 72);
    }
}

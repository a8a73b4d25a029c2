// WMF opcode table

use super::constants::{FUNCTION_NAMES, function as f};
use crate::common::Result;
use crate::images::metafile::Record;
use crate::images::metafile::records::blit::Blit;
use crate::images::metafile::records::clip::{IntersectClipRect, SelectClipRegion};
use crate::images::metafile::records::drawing::{LineTo, MoveTo, Poly, PolyKind, PolyPoly};
use crate::images::metafile::records::objects::{
    CreateBrush, CreateFont, CreatePen, CreatePlaceholder, DeleteObject, SelectObject,
};
use crate::images::metafile::records::shapes::{ArcKind, ArcShape, Ellipse, Rectangle, RoundRect};
use crate::images::metafile::records::state::{ExtScale, StateChange};
use crate::images::metafile::records::text::TextOut;
use crate::images::metafile::records::{Noop, boxed, wmf_point_at};
use crate::images::metafile::transcoder::{Handler, OpcodeTable};
use once_cell::sync::Lazy;

macro_rules! convert {
    ($rec:ident => $converter:expr) => {
        Handler::Convert(|$rec| Ok(boxed($converter)))
    };
}

/// Single 16-bit mode parameter
fn u16_param(rec: &Record) -> Result<u32> {
    Ok(u32::from(rec.u16_at(0)?))
}

fn handler(function: u16) -> Handler {
    match function {
        f::SET_BK_MODE => convert!(r => StateChange::BkMode(u16_param(r)?)),
        f::SET_MAP_MODE => convert!(r => StateChange::MapMode(u16_param(r)?)),
        f::SET_ROP2 => convert!(r => StateChange::Rop2(u16_param(r)?)),
        f::SET_POLY_FILL_MODE => convert!(r => StateChange::PolyFillMode(u16_param(r)?)),
        f::SET_STRETCH_BLT_MODE => convert!(r => StateChange::StretchBltMode(u16_param(r)?)),
        f::SET_TEXT_ALIGN => convert!(r => StateChange::TextAlign(u16_param(r)?)),
        f::SET_BK_COLOR => convert!(r => StateChange::BkColor(r.color_at(0)?)),
        f::SET_TEXT_COLOR => convert!(r => StateChange::TextColor(r.color_at(0)?)),
        f::SET_WINDOW_ORG => convert!(r => StateChange::WindowOrg(wmf_point_at(r, 0)?)),
        f::SET_WINDOW_EXT => convert!(r => StateChange::WindowExt(StateChange::wmf_size_at(r, 0)?)),
        f::SET_VIEWPORT_ORG => convert!(r => StateChange::ViewportOrg(wmf_point_at(r, 0)?)),
        f::SET_VIEWPORT_EXT => {
            convert!(r => StateChange::ViewportExt(StateChange::wmf_size_at(r, 0)?))
        },
        f::OFFSET_WINDOW_ORG => convert!(r => StateChange::OffsetWindowOrg(wmf_point_at(r, 0)?)),
        f::OFFSET_VIEWPORT_ORG => {
            convert!(r => StateChange::OffsetViewportOrg(wmf_point_at(r, 0)?))
        },
        f::SCALE_WINDOW_EXT => convert!(r => StateChange::ScaleWindowExt(ExtScale::parse_wmf(r)?)),
        f::SCALE_VIEWPORT_EXT => {
            convert!(r => StateChange::ScaleViewportExt(ExtScale::parse_wmf(r)?))
        },
        f::SAVE_DC => convert!(_r => StateChange::SaveDc),
        f::RESTORE_DC => convert!(r => StateChange::RestoreDc(i32::from(r.i16_at(0)?))),

        f::MOVE_TO => convert!(r => MoveTo::parse_wmf(r)?),
        f::LINE_TO => convert!(r => LineTo::parse_wmf(r)?),
        f::POLYLINE => convert!(r => Poly::parse_wmf(r, PolyKind::Polyline)?),
        f::POLYGON => convert!(r => Poly::parse_wmf(r, PolyKind::Polygon)?),
        f::POLY_BEZIER16 => convert!(r => Poly::parse_wmf(r, PolyKind::PolyBezier)?),
        f::POLY_POLYGON => convert!(r => PolyPoly::parse_wmf(r)?),
        f::RECTANGLE => convert!(r => Rectangle::parse_wmf(r)?),
        f::ROUND_RECT => convert!(r => RoundRect::parse_wmf(r)?),
        f::ELLIPSE => convert!(r => Ellipse::parse_wmf(r)?),
        f::ARC => convert!(r => ArcShape::parse_wmf(r, ArcKind::Arc)?),
        f::CHORD => convert!(r => ArcShape::parse_wmf(r, ArcKind::Chord)?),
        f::PIE => convert!(r => ArcShape::parse_wmf(r, ArcKind::Pie)?),

        f::CREATE_PEN_INDIRECT => convert!(r => CreatePen::parse_wmf(r)?),
        f::CREATE_BRUSH_INDIRECT => convert!(r => CreateBrush::parse_wmf(r)?),
        f::CREATE_PATTERN_BRUSH => convert!(r => CreateBrush::parse_wmf_pattern(r)?),
        f::DIB_CREATE_PATTERN_BRUSH => convert!(r => CreateBrush::parse_wmf_dib_pattern(r)?),
        f::CREATE_FONT_INDIRECT => convert!(r => CreateFont::parse_wmf(r)?),
        // Occupy a table slot so later implicit ids stay aligned
        f::CREATE_PALETTE | f::CREATE_REGION => convert!(_r => CreatePlaceholder { id: None }),
        f::SELECT_OBJECT => convert!(r => SelectObject::parse_wmf(r)?),
        f::DELETE_OBJECT => convert!(r => DeleteObject::parse_wmf(r)?),

        f::INTERSECT_CLIP_RECT => convert!(r => IntersectClipRect::parse_wmf(r)?),
        f::SELECT_CLIP_REGION => convert!(r => SelectClipRegion::parse_wmf(r)?),

        f::DIB_BIT_BLT => convert!(r => Blit::parse_wmf_dib_bitblt(r)?),
        f::DIB_STRETCH_BLT => convert!(r => Blit::parse_wmf_dib_stretchblt(r)?),
        f::STRETCH_DIB => convert!(r => Blit::parse_wmf_stretchdib(r)?),

        f::TEXT_OUT => convert!(r => TextOut::parse_wmf(r)?),
        f::EXT_TEXT_OUT => convert!(r => TextOut::parse_wmf_ext(r)?),

        // Consumed without effect
        f::ESCAPE
        | f::ANIMATE_PALETTE
        | f::SELECT_PALETTE
        | f::REALIZE_PALETTE
        | f::RESIZE_PALETTE => convert!(_r => Noop),

        // META_EOF ends the stream before dispatch. The rest are regions,
        // pixel operations and device dependent blits.
        _ => Handler::Unsupported,
    }
}

pub(crate) static WMF_OPCODES: Lazy<OpcodeTable> = Lazy::new(|| {
    FUNCTION_NAMES
        .keys()
        .map(|&function| (u32::from(function), handler(function)))
        .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_function_is_accounted_for() {
        for function in FUNCTION_NAMES.keys() {
            assert!(WMF_OPCODES.contains_key(&u32::from(*function)), "{function:#06x}");
        }
        assert_eq!(WMF_OPCODES.len(), FUNCTION_NAMES.len());
    }

    #[test]
    fn test_handler_kinds() {
        let is_convert = |function: u16| {
            matches!(WMF_OPCODES.get(&u32::from(function)), Some(Handler::Convert(_)))
        };
        assert!(is_convert(f::DIB_STRETCH_BLT));
        assert!(is_convert(f::ESCAPE));
        assert!(is_convert(f::CREATE_REGION));
        assert!(!is_convert(f::BIT_BLT));
        assert!(!is_convert(f::FLOOD_FILL));
        assert!(!is_convert(f::EOF));
    }
}

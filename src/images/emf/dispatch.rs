// EMF opcode table
//
// Every EMR_* type maps to a converter constructor or to an explicit
// `Unsupported` marker.

use super::constants::EmrType;
use crate::images::metafile::gdi_objects::BrushStyle;
use crate::images::metafile::records::blit::Blit;
use crate::images::metafile::records::clip::{ExtSelectClipRegion, IntersectClipRect, SelectClipPath};
use crate::images::metafile::records::drawing::{
    LineTo, MoveTo, Poly, PolyDraw, PolyKind, PolyPoly,
};
use crate::images::metafile::records::header::Eof;
use crate::images::metafile::records::objects::{
    CreateBrush, CreateFont, CreatePen, CreatePlaceholder, DeleteObject, SelectObject,
};
use crate::images::metafile::records::path::PathOp;
use crate::images::metafile::records::shapes::{
    AngleArc, ArcKind, ArcShape, Ellipse, Rectangle, RoundRect,
};
use crate::images::metafile::records::state::{ExtScale, StateChange};
use crate::images::metafile::records::text::TextOut;
use crate::images::metafile::records::{PointWidth, boxed};
use crate::images::metafile::transcoder::{Handler, OpcodeTable};
use once_cell::sync::Lazy;

macro_rules! convert {
    ($rec:ident => $converter:expr) => {
        Handler::Convert(|$rec| Ok(boxed($converter)))
    };
}

fn handler(kind: EmrType) -> Handler {
    use EmrType as E;
    use PointWidth::{Long, Short};

    match kind {
        // Read by the reader before the loop starts
        E::Header => Handler::Unsupported,
        E::Eof => convert!(_r => Eof),

        E::MoveToEx => convert!(r => MoveTo::parse_emf(r)?),
        E::LineTo => convert!(r => LineTo::parse_emf(r)?),
        E::Polyline => convert!(r => Poly::parse_emf(r, PolyKind::Polyline, Long)?),
        E::Polyline16 => convert!(r => Poly::parse_emf(r, PolyKind::Polyline, Short)?),
        E::Polygon => convert!(r => Poly::parse_emf(r, PolyKind::Polygon, Long)?),
        E::Polygon16 => convert!(r => Poly::parse_emf(r, PolyKind::Polygon, Short)?),
        E::PolyLineTo => convert!(r => Poly::parse_emf(r, PolyKind::PolylineTo, Long)?),
        E::PolyLineTo16 => convert!(r => Poly::parse_emf(r, PolyKind::PolylineTo, Short)?),
        E::PolyBezier => convert!(r => Poly::parse_emf(r, PolyKind::PolyBezier, Long)?),
        E::PolyBezier16 => convert!(r => Poly::parse_emf(r, PolyKind::PolyBezier, Short)?),
        E::PolyBezierTo => convert!(r => Poly::parse_emf(r, PolyKind::PolyBezierTo, Long)?),
        E::PolyBezierTo16 => convert!(r => Poly::parse_emf(r, PolyKind::PolyBezierTo, Short)?),
        E::PolyPolyline => convert!(r => PolyPoly::parse_emf(r, false, Long)?),
        E::PolyPolyline16 => convert!(r => PolyPoly::parse_emf(r, false, Short)?),
        E::PolyPolygon => convert!(r => PolyPoly::parse_emf(r, true, Long)?),
        E::PolyPolygon16 => convert!(r => PolyPoly::parse_emf(r, true, Short)?),
        E::PolyDraw => convert!(r => PolyDraw::parse_emf(r, Long)?),
        E::PolyDraw16 => convert!(r => PolyDraw::parse_emf(r, Short)?),

        E::Rectangle => convert!(r => Rectangle::parse_emf(r)?),
        E::RoundRect => convert!(r => RoundRect::parse_emf(r)?),
        E::Ellipse => convert!(r => Ellipse::parse_emf(r)?),
        E::Arc => convert!(r => ArcShape::parse_emf(r, ArcKind::Arc)?),
        E::ArcTo => convert!(r => ArcShape::parse_emf(r, ArcKind::ArcTo)?),
        E::Chord => convert!(r => ArcShape::parse_emf(r, ArcKind::Chord)?),
        E::Pie => convert!(r => ArcShape::parse_emf(r, ArcKind::Pie)?),
        E::AngleArc => convert!(r => AngleArc::parse_emf(r)?),

        E::SetMapMode => convert!(r => StateChange::MapMode(r.u32_at(0)?)),
        E::SetBkMode => convert!(r => StateChange::BkMode(r.u32_at(0)?)),
        E::SetBkColor => convert!(r => StateChange::BkColor(r.color_at(0)?)),
        E::SetTextColor => convert!(r => StateChange::TextColor(r.color_at(0)?)),
        E::SetTextAlign => convert!(r => StateChange::TextAlign(r.u32_at(0)?)),
        E::SetPolyFillMode => convert!(r => StateChange::PolyFillMode(r.u32_at(0)?)),
        E::SetRop2 => convert!(r => StateChange::Rop2(r.u32_at(0)?)),
        E::SetStretchBltMode => convert!(r => StateChange::StretchBltMode(r.u32_at(0)?)),
        E::SetArcDirection => convert!(r => StateChange::ArcDirection(r.u32_at(0)?)),
        E::SetMiterLimit => convert!(r => StateChange::emf_miter_limit(r)?),
        E::SetWindowExtEx => convert!(r => StateChange::WindowExt(r.dimension_long_at(0)?)),
        E::SetWindowOrgEx => convert!(r => StateChange::WindowOrg(r.point_long_at(0)?)),
        E::SetViewportExtEx => convert!(r => StateChange::ViewportExt(r.dimension_long_at(0)?)),
        E::SetViewportOrgEx => convert!(r => StateChange::ViewportOrg(r.point_long_at(0)?)),
        E::ScaleWindowExtEx => convert!(r => StateChange::ScaleWindowExt(ExtScale::parse_emf(r)?)),
        E::ScaleViewportExtEx => {
            convert!(r => StateChange::ScaleViewportExt(ExtScale::parse_emf(r)?))
        },
        E::SaveDc => convert!(_r => StateChange::SaveDc),
        E::RestoreDc => convert!(r => StateChange::RestoreDc(r.i32_at(0)?)),
        E::SetWorldTransform => convert!(r => StateChange::SetWorldTransform(r.transform_at(0)?)),
        E::ModifyWorldTransform => convert!(r => StateChange::emf_modify_world_transform(r)?),

        E::CreatePen => convert!(r => CreatePen::parse_emf(r)?),
        E::ExtCreatePen => convert!(r => CreatePen::parse_emf_ext(r)?),
        E::CreateBrushIndirect => convert!(r => CreateBrush::parse_emf(r)?),
        E::CreateMonoBrush => convert!(r => CreateBrush::parse_emf_pattern(r, BrushStyle::MonoPattern)?),
        E::CreateDIBPatternBrushPt => {
            convert!(r => CreateBrush::parse_emf_pattern(r, BrushStyle::DibPatternPt)?)
        },
        E::ExtCreateFontIndirectW => convert!(r => CreateFont::parse_emf(r)?),
        E::CreatePalette => convert!(r => CreatePlaceholder { id: Some(r.u32_at(0)?) }),
        E::SelectObject => convert!(r => SelectObject::parse_emf(r)?),
        E::DeleteObject => convert!(r => DeleteObject::parse_emf(r)?),

        E::IntersectClipRect => convert!(r => IntersectClipRect::parse_emf(r)?),
        E::ExtSelectClipRgn => convert!(r => ExtSelectClipRegion::parse_emf(r)?),
        E::SelectClipPath => convert!(r => SelectClipPath::parse_emf(r)?),

        E::BeginPath => convert!(_r => PathOp::Begin),
        E::EndPath => convert!(_r => PathOp::End),
        E::AbortPath => convert!(_r => PathOp::Abort),
        E::CloseFigure => convert!(_r => PathOp::CloseFigure),
        E::FillPath => convert!(_r => PathOp::Fill),
        E::StrokePath => convert!(_r => PathOp::Stroke),
        E::StrokeAndFillPath => convert!(_r => PathOp::StrokeAndFill),
        E::FlattenPath => convert!(_r => PathOp::Flatten),

        E::BitBlt => convert!(r => Blit::parse_emf_bitblt(r)?),
        E::StretchBlt => convert!(r => Blit::parse_emf_stretchblt(r)?),
        E::StretchDIBits => convert!(r => Blit::parse_emf_stretchdibits(r)?),

        E::ExtTextOutA => convert!(r => TextOut::parse_emf(r, false)?),
        E::ExtTextOutW => convert!(r => TextOut::parse_emf(r, true)?),

        // Regions, palettes, pixel operations, color management, escapes
        // and the blits that need a source device
        E::SetBrushOrgEx | E::SetPixelV | E::SetMapperFlags | E::SetColorAdjustment | E::OffsetClipRgn
        | E::SetMetaRgn | E::ExcludeClipRect | E::SelectPalette | E::SetPaletteEntries | E::ResizePalette
        | E::RealizePalette | E::ExtFloodFill | E::WidenPath | E::Comment | E::FillRgn | E::FrameRgn
        | E::InvertRgn | E::PaintRgn | E::MaskBlt | E::PlgBlt | E::SetDIBitsToDevice | E::PolyTextOutA
        | E::PolyTextOutW | E::SetIcmMode | E::CreateColorSpace | E::SetColorSpace | E::DeleteColorSpace
        | E::GlsRecord | E::GlsBoundedRecord | E::PixelFormat | E::DrawEscape | E::ExtEscape | E::StartDoc
        | E::SmallTextOut | E::ForceUfiMapping | E::NamedEscape | E::ColorCorrectPalette
        | E::SetIcmProfileA | E::SetIcmProfileW | E::AlphaBlend | E::SetLayout | E::TransparentBlt
        | E::GradientFill | E::SetLinkedUfis | E::SetTextJustification | E::ColorMatchToTargetW
        | E::CreateColorSpaceW => Handler::Unsupported,
    }
}

pub(crate) static EMF_OPCODES: Lazy<OpcodeTable> = Lazy::new(|| {
    EmrType::ALL
        .iter()
        .map(|&kind| (kind as u32, handler(kind)))
        .collect()
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::metafile::Record;

    #[test]
    fn test_every_opcode_is_accounted_for() {
        for opcode in 1..=122u32 {
            let defined = EmrType::from_u32(opcode).is_some();
            assert_eq!(EMF_OPCODES.contains_key(&opcode), defined, "opcode {opcode}");
        }
        assert_eq!(EMF_OPCODES.len(), EmrType::ALL.len());
    }

    #[test]
    fn test_drawing_records_have_converters() {
        for kind in [
            EmrType::Rectangle,
            EmrType::Polygon16,
            EmrType::ExtTextOutW,
            EmrType::StretchDIBits,
            EmrType::SaveDc,
        ] {
            assert!(
                matches!(EMF_OPCODES.get(&(kind as u32)), Some(Handler::Convert(_))),
                "{}",
                kind.name()
            );
        }
        assert!(matches!(
            EMF_OPCODES.get(&(EmrType::Comment as u32)),
            Some(Handler::Unsupported)
        ));
    }

    #[test]
    fn test_constructor_rejects_short_payload() {
        let Some(Handler::Convert(parse)) = EMF_OPCODES.get(&(EmrType::Rectangle as u32)) else {
            panic!("no rectangle converter");
        };
        let err = parse(&Record::new(EmrType::Rectangle as u32, vec![0; 6])).unwrap_err();
        assert!(err.is_recoverable());
    }
}

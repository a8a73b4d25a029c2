//! Text output: EMF ExtTextOutA/W, WMF ExtTextOut and TextOut.

use super::{Converter, emf_offset, wmf_point_at};
use crate::common::encoding::decode_ansi;
use crate::common::{DecodeError, Result};
use crate::images::metafile::device_context::DeviceContext;
use crate::images::metafile::path::{PointF, Shape};
use crate::images::metafile::record::Record;
use crate::images::metafile::sink::{OutputSink, Paint, ShapeStyle, TextRun};
use crate::images::metafile::types::{Point, Rect, XForm};
use bitflags::bitflags;

bitflags! {
    /// ExtTextOut options (ETO_*)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TextOutOptions: u32 {
        const OPAQUE = 0x0002;
        const CLIPPED = 0x0004;
        const GLYPH_INDEX = 0x0010;
        const RTLREADING = 0x0080;
        const NO_RECT = 0x0100;
        const PDY = 0x2000;
    }
}

impl TextOutOptions {
    /// Whether the record carries a rectangle that is actually used
    fn uses_rect(self) -> bool {
        self.intersects(Self::OPAQUE | Self::CLIPPED)
    }
}

/// String as stored in the record
#[derive(Debug, Clone, PartialEq)]
pub enum TextPayload {
    Wide(String),
    /// Code page bytes, decoded with the charset of the selected font
    Ansi(Vec<u8>),
}

impl TextPayload {
    pub fn decode(&self, charset: u8) -> String {
        match self {
            Self::Wide(s) => s.clone(),
            Self::Ansi(bytes) => decode_ansi(bytes, charset),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextOut {
    pub reference: Point,
    pub options: TextOutOptions,
    pub rect: Option<Rect>,
    pub text: TextPayload,
}

impl TextOut {
    /// EMR_EXTTEXTOUTA / EMR_EXTTEXTOUTW: bounds, graphics mode, scales, EMRTEXT
    pub fn parse_emf(rec: &Record, wide: bool) -> Result<Self> {
        let reference = rec.point_long_at(28)?;
        let count = rec.u32_at(36)? as usize;
        let options = TextOutOptions::from_bits_retain(rec.u32_at(44)?);
        if options.contains(TextOutOptions::GLYPH_INDEX) {
            return Err(DecodeError::unsupported("glyph index text output"));
        }
        let offset = emf_offset(rec.u32_at(40)?)?;
        let text = if wide {
            TextPayload::Wide(rec.chars_at(offset, count)?)
        } else {
            TextPayload::Ansi(rec.bytes_at(offset, count)?.to_vec())
        };
        let rect = if options.uses_rect() {
            Some(rec.rect_long_at(48)?)
        } else {
            None
        };
        Ok(Self {
            reference,
            options,
            rect,
            text,
        })
    }

    /// META_EXTTEXTOUT: y, x, count, options, optional rect, string
    pub fn parse_wmf_ext(rec: &Record) -> Result<Self> {
        let reference = wmf_point_at(rec, 0)?;
        let count = rec.i16_at(4)?.max(0) as usize;
        let options = TextOutOptions::from_bits_retain(u32::from(rec.u16_at(6)?));
        let (rect, offset) = if options.uses_rect() {
            (Some(rec.rect_at(8)?), 16)
        } else {
            (None, 8)
        };
        Ok(Self {
            reference,
            options,
            rect,
            text: TextPayload::Ansi(rec.bytes_at(offset, count)?.to_vec()),
        })
    }

    /// META_TEXTOUT: length, string padded to a word, y, x
    pub fn parse_wmf(rec: &Record) -> Result<Self> {
        let count = rec.i16_at(0)?.max(0) as usize;
        let text = rec.bytes_at(2, count)?.to_vec();
        let padded = (count + 1) & !1;
        Ok(Self {
            reference: wmf_point_at(rec, 2 + padded)?,
            options: TextOutOptions::empty(),
            rect: None,
            text: TextPayload::Ansi(text),
        })
    }
}

impl Converter for TextOut {
    fn render(&self, dc: &mut DeviceContext, sink: &mut dyn OutputSink) -> Result<()> {
        let text = self.text.decode(dc.font.charset);
        let font = dc.font_spec();
        let extent = sink.measure_text(&text, &font);
        let align = dc.text_align;
        let updates_cp = align.updates_cp();
        let anchor = dc.to_output(if updates_cp { dc.position } else { self.reference });

        let clip_rect = self.rect.map(|r| Shape::Rect(dc.to_output_rect(&r)));
        if let (true, Some(shape)) = (self.options.contains(TextOutOptions::OPAQUE), &clip_rect) {
            let style = ShapeStyle {
                fill: Some(Paint::Solid(dc.bk_color)),
                stroke: None,
                fill_rule: dc.fill_mode.fill_rule(),
            };
            sink.draw(shape, &style)?;
        }
        let clipped = self.options.contains(TextOutOptions::CLIPPED) && clip_rect.is_some();
        if let (true, Some(shape)) = (clipped, &clip_rect) {
            sink.intersect_clip(shape)?;
        }

        // Offsets from the reference point along and across the baseline
        let dx = if align.is_center() {
            -extent.width / 2.0
        } else if align.is_right() {
            -extent.width
        } else {
            0.0
        };
        let dy = if align.is_baseline() {
            0.0
        } else if align.is_bottom() {
            -extent.descent()
        } else {
            extent.ascent
        };
        let rotation = -f64::from(dc.font.escapement) / 10.0;
        let turn = XForm::rotate(rotation);
        let (ox, oy) = turn.apply(dx, dy);

        if !text.is_empty() {
            sink.draw_text(&TextRun {
                text,
                x: anchor.x + ox,
                y: anchor.y + oy,
                font,
                color: dc.text_color,
                rotation,
            })?;
        }
        if clipped {
            dc.region.apply(sink)?;
        }

        if updates_cp {
            let advance = if align.is_center() {
                0.0
            } else if align.is_right() {
                -extent.width
            } else {
                extent.width
            };
            let (ax, ay) = turn.apply(advance, 0.0);
            let end = PointF::new(anchor.x + ax, anchor.y + ay);
            dc.position = dc.to_window(end);
        }
        Ok(())
    }
}

//! Clipping records.

use super::{Converter, wmf_rect_at};
use crate::common::{DecodeError, Result};
use crate::images::metafile::device_context::DeviceContext;
use crate::images::metafile::gdi_objects::Region;
use crate::images::metafile::path::Shape;
use crate::images::metafile::record::Record;
use crate::images::metafile::sink::OutputSink;
use crate::images::metafile::types::Rect;

/// Region combination modes
pub const RGN_AND: u32 = 1;
pub const RGN_COPY: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectClipRect {
    pub rect: Rect,
}

impl IntersectClipRect {
    pub fn parse_emf(rec: &Record) -> Result<Self> {
        Ok(Self {
            rect: rec.rect_long_at(0)?,
        })
    }

    pub fn parse_wmf(rec: &Record) -> Result<Self> {
        Ok(Self {
            rect: wmf_rect_at(rec, 0)?,
        })
    }
}

impl Converter for IntersectClipRect {
    fn render(&self, dc: &mut DeviceContext, sink: &mut dyn OutputSink) -> Result<()> {
        let shape = Shape::Rect(dc.to_output_rect(&self.rect));
        sink.intersect_clip(&shape)?;
        dc.region.intersect(shape);
        Ok(())
    }
}

/// Install a stored region as the clip; an id that resolves to no region
/// (including 0) removes clipping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectClipRegion {
    pub id: u32,
}

impl SelectClipRegion {
    pub fn parse_wmf(rec: &Record) -> Result<Self> {
        Ok(Self {
            id: u32::from(rec.u16_at(0)?),
        })
    }
}

impl Converter for SelectClipRegion {
    fn render(&self, dc: &mut DeviceContext, sink: &mut dyn OutputSink) -> Result<()> {
        dc.region = match self.id {
            0 => Region::default(),
            id => dc.region_object(id).cloned().unwrap_or_default(),
        };
        dc.region.apply(sink)
    }
}

/// EMR_EXTSELECTCLIPRGN; only the "reset to no clip" form is understood
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtSelectClipRegion {
    pub mode: u32,
    pub data_size: u32,
}

impl ExtSelectClipRegion {
    pub fn parse_emf(rec: &Record) -> Result<Self> {
        Ok(Self {
            data_size: rec.u32_at(0)?,
            mode: rec.u32_at(4)?,
        })
    }
}

impl Converter for ExtSelectClipRegion {
    fn render(&self, dc: &mut DeviceContext, sink: &mut dyn OutputSink) -> Result<()> {
        if self.mode != RGN_COPY || self.data_size != 0 {
            return Err(DecodeError::unsupported(format!(
                "clip region data with mode {}",
                self.mode
            )));
        }
        dc.region = Region::default();
        dc.region.apply(sink)
    }
}

/// EMR_SELECTCLIPPATH: the current path becomes (or narrows) the clip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectClipPath {
    pub mode: u32,
}

impl SelectClipPath {
    pub fn parse_emf(rec: &Record) -> Result<Self> {
        Ok(Self {
            mode: rec.u32_at(0)?,
        })
    }
}

impl Converter for SelectClipPath {
    fn render(&self, dc: &mut DeviceContext, sink: &mut dyn OutputSink) -> Result<()> {
        if self.mode != RGN_AND && self.mode != RGN_COPY {
            return Err(DecodeError::unsupported(format!(
                "clip path mode {}",
                self.mode
            )));
        }
        let shape = Shape::Path(dc.path.take());
        if self.mode == RGN_COPY {
            dc.region = Region {
                shapes: vec![shape],
            };
            dc.region.apply(sink)
        } else {
            sink.intersect_clip(&shape)?;
            dc.region.intersect(shape);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::metafile::gdi_objects::GdiObject;
    use crate::images::metafile::path::{PointF, RectF};
    use crate::images::metafile::sink::{RecordingSink, SinkCall};

    #[test]
    fn test_intersect_clip_rect() {
        let mut dc = DeviceContext::new();
        let mut sink = RecordingSink::new();
        IntersectClipRect {
            rect: Rect::new(0, 0, 10, 20),
        }
        .render(&mut dc, &mut sink)
        .unwrap();
        let expected = Shape::Rect(RectF::new(0.0, 0.0, 10.0, 20.0));
        assert_eq!(sink.calls, vec![SinkCall::IntersectClip(expected.clone())]);
        assert_eq!(dc.region.shapes, vec![expected]);
    }

    #[test]
    fn test_select_clip_region() {
        let mut dc = DeviceContext::new();
        let region = Region {
            shapes: vec![Shape::Rect(RectF::new(1.0, 1.0, 2.0, 2.0))],
        };
        dc.add_object(Some(3), GdiObject::Region(region.clone()));
        let mut sink = RecordingSink::new();
        SelectClipRegion { id: 3 }.render(&mut dc, &mut sink).unwrap();
        assert_eq!(dc.region, region);

        SelectClipRegion { id: 9 }.render(&mut dc, &mut sink).unwrap();
        assert!(dc.region.is_empty());
        assert_eq!(sink.calls.last(), Some(&SinkCall::SetClip(None)));
    }

    #[test]
    fn test_ext_select_clip_region_reset_only() {
        let mut dc = DeviceContext::new();
        let mut sink = RecordingSink::new();
        let reset = ExtSelectClipRegion {
            mode: RGN_COPY,
            data_size: 0,
        };
        reset.render(&mut dc, &mut sink).unwrap();
        let combine = ExtSelectClipRegion {
            mode: RGN_AND,
            data_size: 32,
        };
        assert!(combine.render(&mut dc, &mut sink).unwrap_err().is_recoverable());
    }

    #[test]
    fn test_select_clip_path_copy() {
        let mut dc = DeviceContext::new();
        dc.path.begin();
        dc.path.move_to(PointF::new(0.0, 0.0));
        dc.path.line_to(PointF::new(5.0, 5.0));
        dc.path.end();
        let mut sink = RecordingSink::new();
        SelectClipPath { mode: RGN_COPY }
            .render(&mut dc, &mut sink)
            .unwrap();
        assert_eq!(dc.region.shapes.len(), 1);
        assert!(dc.path.path().is_empty());
        assert_eq!(sink.calls.len(), 2);
    }
}

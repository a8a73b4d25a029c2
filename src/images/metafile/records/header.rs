//! File header and end-of-file records.

use super::Converter;
use crate::common::Result;
use crate::images::metafile::device_context::DeviceContext;
use crate::images::metafile::sink::OutputSink;
use crate::images::metafile::types::{Rect, Size};

/// Output frame decoded from the format-specific file header
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Header {
    /// Picture bounds with an exclusive right/bottom edge
    pub bounds: Rect,
    pub dpi_x: u32,
    pub dpi_y: u32,
}

impl Header {
    pub fn new(bounds: Rect, dpi_x: u32, dpi_y: u32) -> Self {
        Self {
            bounds,
            dpi_x,
            dpi_y,
        }
    }

    pub fn width(&self) -> f64 {
        f64::from(self.bounds.width())
    }

    pub fn height(&self) -> f64 {
        f64::from(self.bounds.height())
    }
}

impl Converter for Header {
    fn render(&self, dc: &mut DeviceContext, sink: &mut dyn OutputSink) -> Result<()> {
        dc.bounds = self.bounds;
        dc.set_dpi(self.dpi_x, self.dpi_y);
        dc.viewport_ext = Size::new(self.bounds.width(), self.bounds.height());
        sink.set_canvas_size(self.width(), self.height())
    }
}

/// End of the record stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Eof;

impl Converter for Eof {
    fn render(&self, _dc: &mut DeviceContext, _sink: &mut dyn OutputSink) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::metafile::sink::{RecordingSink, SinkCall};

    #[test]
    fn test_header_sets_frame() {
        let header = Header::new(Rect::new(0, 0, 200, 100), 100, 100);
        let mut dc = DeviceContext::new();
        let mut sink = RecordingSink::new();
        header.render(&mut dc, &mut sink).unwrap();
        assert_eq!(dc.bounds, Rect::new(0, 0, 200, 100));
        assert_eq!(dc.dpi(), (100, 100));
        assert_eq!(dc.viewport_ext, Size::new(200, 100));
        assert_eq!(
            sink.calls,
            vec![SinkCall::CanvasSize {
                width: 200.0,
                height: 100.0
            }]
        );
    }

    #[test]
    fn test_dpi_is_clamped() {
        let mut dc = DeviceContext::new();
        Header::new(Rect::new(0, 0, 10, 10), 10, 10)
            .render(&mut dc, &mut RecordingSink::new())
            .unwrap();
        assert_eq!(dc.dpi(), (60, 60));
    }
}

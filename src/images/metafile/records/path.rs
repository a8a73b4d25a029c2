//! Path bracket records: BeginPath through StrokeAndFillPath.

use super::Converter;
use crate::common::Result;
use crate::images::metafile::device_context::DeviceContext;
use crate::images::metafile::path::Shape;
use crate::images::metafile::sink::OutputSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOp {
    Begin,
    End,
    Abort,
    CloseFigure,
    Fill,
    Stroke,
    StrokeAndFill,
    Flatten,
}

impl PathOp {
    /// Hand the path over to the sink, consuming the buffer
    fn draw(self, dc: &mut DeviceContext, sink: &mut dyn OutputSink) -> Result<()> {
        let style = match self {
            Self::Fill => dc.fill_style(),
            Self::Stroke => dc.style(false),
            _ => dc.style(true),
        };
        let path = dc.path.take();
        if path.is_empty() {
            return Ok(());
        }
        sink.draw(&Shape::Path(path), &style)
    }
}

impl Converter for PathOp {
    fn render(&self, dc: &mut DeviceContext, sink: &mut dyn OutputSink) -> Result<()> {
        match self {
            Self::Begin => dc.path.begin(),
            Self::End => dc.path.end(),
            Self::Abort => dc.path.abort(),
            Self::CloseFigure => dc.path.close_figure(),
            Self::Flatten => dc.path.flatten(),
            Self::Fill | Self::Stroke | Self::StrokeAndFill => self.draw(dc, sink)?,
        }
        Ok(())
    }
}

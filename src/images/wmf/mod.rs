// Windows Metafile (WMF) transcoder
//
// WMF is the 16-bit recorded drawing format for Windows, the predecessor of
// EMF. Files may carry an Aldus placeable header (APM) in front of the
// standard header giving the picture extent and units per inch.
//
// References:
// - [MS-WMF]: Windows Metafile Format Specification
// - https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-wmf/

pub mod constants;
pub(crate) mod dispatch;
pub mod parser;

pub use constants::{FUNCTION_NAMES, record_name};
pub use parser::{Placement, WmfHeader, WmfReader};

use crate::common::Result;
use crate::images::metafile::sink::OutputSink;
use crate::images::metafile::transcoder::{
    self, Format, OpcodeTable, TranscodeOptions, TranscodeSummary,
};
use crate::images::svg::SvgWriter;
use std::io::Read;
use tracing::debug;

/// Converter table keyed by META_* function number
pub fn opcode_table() -> &'static OpcodeTable {
    &dispatch::WMF_OPCODES
}

fn format() -> Format {
    Format {
        name: "WMF",
        table: opcode_table(),
        record_name,
        header_opcode: u32::from(constants::HEADER_FUNCTION),
    }
}

/// Replays WMF and APM records into an output sink
#[derive(Debug, Clone, Default)]
pub struct WmfTranscoder {
    options: TranscodeOptions,
}

impl WmfTranscoder {
    pub fn new(options: TranscodeOptions) -> Self {
        Self { options }
    }

    /// Decode a complete WMF stream
    ///
    /// A header that is neither APM nor a disk metafile header yields a
    /// non-recoverable error before anything reaches the sink.
    pub fn transcode<R: Read>(
        &self,
        reader: R,
        sink: &mut dyn OutputSink,
    ) -> Result<TranscodeSummary> {
        let records = WmfReader::new(reader)?;
        debug!("WMF header: {:?}", records.header());
        let header = records.header().to_header();
        transcoder::run(&format(), &self.options, header, records, sink)
    }
}

/// Convert WMF or APM data to an SVG document
///
/// # Example
/// ```no_run
/// use metafile_transcoder::images::wmf::wmf_to_svg;
///
/// let wmf_data = std::fs::read("image.wmf")?;
/// let svg = wmf_to_svg(&wmf_data)?;
/// std::fs::write("output.svg", svg)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn wmf_to_svg(wmf_data: &[u8]) -> Result<String> {
    let mut writer = SvgWriter::new();
    WmfTranscoder::default().transcode(wmf_data, &mut writer)?;
    Ok(writer.finish())
}

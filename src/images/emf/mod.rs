// Enhanced Metafile (EMF) transcoder
//
// EMF is the 32-bit recorded drawing format for Windows. Each record carries
// its own type and byte size; the first record is EMR_HEADER with the bounds,
// record count and reference device size.
//
// References:
// - [MS-EMF]: Enhanced Metafile Format Specification
// - https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-emf/

pub mod constants;
pub(crate) mod dispatch;
pub mod parser;

pub use constants::{EmrType, record_name};
pub use parser::{EmfHeader, EmfReader};

use crate::common::Result;
use crate::images::metafile::sink::OutputSink;
use crate::images::metafile::transcoder::{
    self, Format, OpcodeTable, TranscodeOptions, TranscodeSummary,
};
use crate::images::svg::SvgWriter;
use std::io::Read;
use tracing::debug;

/// Converter table keyed by EMR_* record type
pub fn opcode_table() -> &'static OpcodeTable {
    &dispatch::EMF_OPCODES
}

fn format() -> Format {
    Format {
        name: "EMF",
        table: opcode_table(),
        record_name,
        header_opcode: EmrType::Header as u32,
    }
}

/// Replays EMF records into an output sink
#[derive(Debug, Clone, Default)]
pub struct EmfTranscoder {
    options: TranscodeOptions,
}

impl EmfTranscoder {
    pub fn new(options: TranscodeOptions) -> Self {
        Self { options }
    }

    /// Decode a complete EMF stream
    ///
    /// Header failures are returned as non-recoverable errors before anything
    /// reaches the sink.
    pub fn transcode<R: Read>(
        &self,
        reader: R,
        sink: &mut dyn OutputSink,
    ) -> Result<TranscodeSummary> {
        let records = EmfReader::new(reader)?;
        let header = records.header();
        debug!(
            "EMF header: bounds {:?}, {} records, dpi {:?}",
            header.bounds,
            header.num_records,
            header.dpi()
        );
        let header = header.to_header();
        transcoder::run(&format(), &self.options, header, records, sink)
    }
}

/// Convert EMF data to an SVG document
///
/// # Example
/// ```no_run
/// use metafile_transcoder::images::emf::emf_to_svg;
///
/// let emf_data = std::fs::read("image.emf")?;
/// let svg = emf_to_svg(&emf_data)?;
/// std::fs::write("output.svg", svg)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn emf_to_svg(emf_data: &[u8]) -> Result<String> {
    let mut writer = SvgWriter::new();
    EmfTranscoder::default().transcode(emf_data, &mut writer)?;
    Ok(writer.finish())
}

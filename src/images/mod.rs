// Metafile conversion
//
// Replays Windows metafiles (EMF and WMF) into an output sink. The SVG writer
// turns them into standalone SVG documents; the path sink merges their
// geometry into one outline.
//
// # Architecture
//
// - `emf`: Enhanced Metafile reader and opcode table
// - `wmf`: Windows Metafile reader and opcode table
// - `metafile`: the shared playback engine both formats run through
// - `svg`: SVG document writer
// - `svg_utils`: number, color and text formatting for SVG output
//
// # Example: auto-detecting the format
//
// ```no_run
// use metafile_transcoder::images::metafile_to_svg;
//
// let data = std::fs::read("clipart.wmf")?;
// let svg = metafile_to_svg(&data)?;
// std::fs::write("clipart.svg", svg)?;
// # Ok::<(), Box<dyn std::error::Error>>(())
// ```

pub mod emf;
pub mod metafile;
pub mod svg;
pub mod svg_utils;
pub mod wmf;

pub use emf::{EmfTranscoder, emf_to_svg};
pub use svg::SvgWriter;
pub use wmf::{WmfTranscoder, wmf_to_svg};

use crate::common::error::ErrorKind;
use crate::common::{DecodeError, Result};
use metafile::sink::{OutputSink, PathSink};
use metafile::{Path, TranscodeOptions};
use std::path::Path as FsPath;
use tracing::debug;

/// Whether an attempt failed on the file header, so another format may fit
fn is_header_error(err: &DecodeError) -> bool {
    !err.is_recoverable() && matches!(err.kind(), ErrorKind::InvalidHeader(_))
}

/// Decode `data` as EMF, then as WMF, into a fresh sink per attempt
///
/// A header rejection from the first attempt is not logged. When both
/// formats reject the header nothing has been drawn and the error is fatal.
pub fn transcode_auto<S, F>(data: &[u8], options: &TranscodeOptions, mut new_sink: F) -> Result<S>
where
    S: OutputSink,
    F: FnMut() -> S,
{
    let mut sink = new_sink();
    match EmfTranscoder::new(options.clone()).transcode(data, &mut sink) {
        Ok(_) => return Ok(sink),
        Err(err) if is_header_error(&err) => {},
        Err(err) => return Err(err),
    }

    let mut sink = new_sink();
    match WmfTranscoder::new(options.clone()).transcode(data, &mut sink) {
        Ok(_) => Ok(sink),
        Err(err) if is_header_error(&err) => {
            debug!("input is neither EMF nor WMF");
            Err(DecodeError::invalid_header("Unrecognized metafile format"))
        },
        Err(err) => Err(err),
    }
}

/// Convert EMF or WMF data to an SVG document
pub fn metafile_to_svg(data: &[u8]) -> Result<String> {
    transcode_auto(data, &TranscodeOptions::default(), SvgWriter::new).map(SvgWriter::finish)
}

/// Read a metafile from disk and convert it to an SVG document
pub fn metafile_file_to_svg(path: impl AsRef<FsPath>) -> Result<String> {
    let data = std::fs::read(path.as_ref())?;
    metafile_to_svg(&data)
}

/// Merge every drawn shape of an EMF or WMF into one output-space path
pub fn metafile_to_path(data: &[u8]) -> Result<Path> {
    transcode_auto(data, &TranscodeOptions::default(), PathSink::new).map(PathSink::into_path)
}

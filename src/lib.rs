//! Metafile Transcoder - replay Windows metafiles into vector output
//!
//! This library decodes Windows Metafiles (WMF, including the Aldus
//! placeable variant) and Enhanced Metafiles (EMF) and replays their drawing
//! records against an output sink: a complete SVG document, a single merged
//! path, or any host-provided [`OutputSink`](images::metafile::OutputSink).
//!
//! # Features
//!
//! - **Both formats**: EMF and WMF share one playback engine and one device
//!   context model
//! - **Fault tolerant**: a malformed record is logged and skipped, only a bad
//!   file header aborts the run
//! - **Format auto-sensing**: try EMF, then WMF, without noisy logs
//! - **Raster support**: DIB blits and pattern brushes are decoded and
//!   embedded as PNG
//!
//! # Example - Converting a metafile to SVG
//!
//! ```no_run
//! use metafile_transcoder::images::metafile_to_svg;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("drawing.emf")?;
//! let svg = metafile_to_svg(&data)?;
//! std::fs::write("drawing.svg", svg)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Replaying into a custom sink
//!
//! ```no_run
//! use metafile_transcoder::images::metafile::{RecordingSink, TranscodeOptions};
//! use metafile_transcoder::images::wmf::WmfTranscoder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("clipart.wmf")?;
//! let mut sink = RecordingSink::new();
//! let summary = WmfTranscoder::new(TranscodeOptions::diagnostic())
//!     .transcode(data.as_slice(), &mut sink)?;
//! println!(
//!     "{} records, {} unhandled, {} drawing calls",
//!     summary.records,
//!     summary.unhandled,
//!     sink.drawing_calls()
//! );
//! # Ok(())
//! # }
//! ```

/// Shared binary readers, text decoding and error types
pub mod common;

/// EMF and WMF decoders, the playback engine and output writers
pub mod images;

// Re-export commonly used types for convenience
pub use common::{DecodeError, ErrorKind, Result};
pub use images::metafile::{OutputSink, TranscodeOptions, TranscodeSummary};
pub use images::{
    EmfTranscoder, SvgWriter, WmfTranscoder, emf_to_svg, metafile_file_to_svg, metafile_to_path,
    metafile_to_svg, wmf_to_svg,
};

//! Record loop shared by the EMF and WMF transcoders.
//!
//! A format front end reads its file header into a [`Header`], yields the
//! remaining records, and supplies an opcode table. The loop dispatches each
//! record to its converter, renders it against a fresh [`DeviceContext`] and
//! applies the failure policy: recoverable errors fail only the current
//! record, everything else aborts the run.

use super::device_context::DeviceContext;
use super::record::Record;
use super::records::header::Header;
use super::records::{Converter, ParseFn};
use super::sink::OutputSink;
use crate::common::{DecodeError, ErrorKind, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, trace, warn};

/// Per-run settings
#[derive(Debug, Clone, Default)]
pub struct TranscodeOptions {
    /// Log every handled record at `info` together with its parsed form
    pub diagnostic: bool,
    /// Polled once per record; raising it aborts with [`ErrorKind::Cancelled`]
    pub cancel: Option<Arc<AtomicBool>>,
}

impl TranscodeOptions {
    pub fn diagnostic() -> Self {
        Self {
            diagnostic: true,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Outcome counters of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TranscodeSummary {
    /// Records read, the file header included
    pub records: usize,
    pub handled: usize,
    /// Records with no converter
    pub unhandled: usize,
    /// Records whose parse or render failed recoverably
    pub failed: usize,
    /// Canvas size from the header
    pub width: f64,
    pub height: f64,
}

/// Opcode table entry
#[derive(Clone, Copy)]
pub enum Handler {
    Convert(ParseFn),
    /// Known opcode without a rendering
    Unsupported,
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Convert(_) => f.write_str("Convert"),
            Self::Unsupported => f.write_str("Unsupported"),
        }
    }
}

pub type OpcodeTable = HashMap<u32, Handler>;

/// What the loop needs to know about a format
pub(crate) struct Format {
    pub name: &'static str,
    pub table: &'static OpcodeTable,
    pub record_name: fn(u32) -> &'static str,
    /// Opcode the header is reported under
    pub header_opcode: u32,
}

pub(crate) fn run<I>(
    format: &Format,
    options: &TranscodeOptions,
    header: Header,
    records: I,
    sink: &mut dyn OutputSink,
) -> Result<TranscodeSummary>
where
    I: IntoIterator<Item = Result<Record>>,
{
    let mut dc = DeviceContext::new();
    let mut summary = TranscodeSummary {
        width: header.width(),
        height: header.height(),
        ..TranscodeSummary::default()
    };

    header.render(&mut dc, sink)?;
    summary.records = 1;
    summary.handled = 1;
    log_handled(format, options, 0, "rendered", format.header_opcode, &header);

    for (index, item) in (1..).zip(records) {
        if options.is_cancelled() {
            return Err(DecodeError::fatal(ErrorKind::Cancelled));
        }
        let rec = match item {
            Ok(rec) => rec,
            Err(err) if err.is_recoverable() => {
                warn!("{} transcoder, stream ends at record {index}: {err}", format.name);
                break;
            },
            Err(err) => return Err(err),
        };
        summary.records += 1;
        let opcode = rec.record_type();
        let name = (format.record_name)(opcode);

        let parse = match format.table.get(&opcode) {
            Some(Handler::Convert(parse)) => *parse,
            Some(Handler::Unsupported) | None => {
                debug!(
                    "{} transcoder, record {index} unhandled metafile record type {opcode} = {name}",
                    format.name
                );
                summary.unhandled += 1;
                continue;
            },
        };

        let outcome = parse(&rec).and_then(|converter| {
            let to_path = dc.path.is_open() && converter.supports_path();
            if to_path {
                converter.render_to_path(&mut dc)?;
            } else {
                converter.render(&mut dc, sink)?;
            }
            Ok((converter, to_path))
        });
        match outcome {
            Ok((converter, to_path)) => {
                summary.handled += 1;
                let what = if to_path { "rendered to path" } else { "rendered" };
                log_handled(format, options, index, what, opcode, converter.as_ref());
            },
            Err(err) if err.is_recoverable() => {
                summary.failed += 1;
                warn!(
                    "{} transcoder, record {index} exception while processing metafile record type {opcode} = {name}: {err}",
                    format.name
                );
            },
            Err(err) => return Err(err),
        }
    }
    Ok(summary)
}

fn log_handled(
    format: &Format,
    options: &TranscodeOptions,
    index: usize,
    what: &str,
    opcode: u32,
    converter: &dyn Converter,
) {
    let name = (format.record_name)(opcode);
    if options.diagnostic {
        info!(
            "{} transcoder, record {index} {what} metafile record type {opcode} = {name}",
            format.name
        );
        info!("{converter:?}");
    } else {
        trace!(
            "{} transcoder, record {index} {what} metafile record type {opcode} = {name}",
            format.name
        );
    }
}

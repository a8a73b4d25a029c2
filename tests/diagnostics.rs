mod common;

use common::EmfBuilder;
use metafile_transcoder::images::emf::EmfTranscoder;
use metafile_transcoder::images::metafile::TranscodeOptions;
use metafile_transcoder::images::metafile::sink::RecordingSink;
use std::io;
use std::sync::{Arc, Mutex};
use tracing::Level;

const EMR_RECTANGLE: u32 = 43;
const EMR_COMMENT: u32 = 70;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn run_logged(options: TranscodeOptions, level: Level) -> String {
    let data = EmfBuilder::new(0, 0, 99, 99)
        .words(EMR_RECTANGLE, &[1, 1, 5, 5])
        .record(EMR_COMMENT, &[0, 0, 0, 0])
        .record(EMR_RECTANGLE, &[1])
        .finish();
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(level)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        EmfTranscoder::new(options)
            .transcode(data.as_slice(), &mut RecordingSink::new())
            .unwrap();
    });
    let bytes = capture.0.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn test_diagnostic_mode_logs_records() {
    let log = run_logged(TranscodeOptions::diagnostic(), Level::INFO);
    assert!(log.contains("EMF transcoder, record 0 rendered metafile record type 1 = EMR_HEADER"));
    assert!(log.contains("EMF transcoder, record 1 rendered metafile record type 43 = EMR_RECTANGLE"));
    assert!(log.contains("Rectangle"));
    assert!(log.contains(
        "EMF transcoder, record 3 exception while processing metafile record type 43 = EMR_RECTANGLE"
    ));
    // unhandled records stay at debug
    assert!(!log.contains("unhandled"));
}

#[test]
fn test_quiet_mode_logs_only_problems() {
    let log = run_logged(TranscodeOptions::default(), Level::INFO);
    assert!(!log.contains("rendered"));
    assert!(log.contains("exception while processing"));

    let log = run_logged(TranscodeOptions::default(), Level::DEBUG);
    assert!(log.contains("EMF transcoder, record 2 unhandled metafile record type 70 = EMR_COMMENT"));
}

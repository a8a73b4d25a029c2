mod common;

use common::{EmfBuilder, ext_text_out_w};
use metafile_transcoder::images::emf::{EmfTranscoder, emf_to_svg};
use metafile_transcoder::images::metafile::path::{RectF, Shape};
use metafile_transcoder::images::metafile::sink::{Paint, RecordingSink, SinkCall};
use metafile_transcoder::images::metafile::types::Color;
use metafile_transcoder::images::metafile::TranscodeOptions;

const EMR_SETWINDOWORGEX: u32 = 10;
const EMR_SAVEDC: u32 = 33;
const EMR_RESTOREDC: u32 = 34;
const EMR_SELECTOBJECT: u32 = 37;
const EMR_CREATEBRUSHINDIRECT: u32 = 39;
const EMR_RECTANGLE: u32 = 43;
const EMR_COMMENT: u32 = 70;
const EMR_EXTTEXTOUTW: u32 = 84;

fn transcode(data: &[u8]) -> RecordingSink {
    let mut sink = RecordingSink::new();
    EmfTranscoder::new(TranscodeOptions::default())
        .transcode(data, &mut sink)
        .unwrap();
    sink
}

#[test]
fn test_rectangle_end_to_end() {
    let data = EmfBuilder::new(0, 0, 99, 99)
        .words(EMR_RECTANGLE, &[10, 10, 50, 50])
        .finish();
    let sink = transcode(&data);

    assert_eq!(
        sink.calls[0],
        SinkCall::CanvasSize {
            width: 100.0,
            height: 100.0
        }
    );
    let draws: Vec<_> = sink.draws().collect();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].0, &Shape::Rect(RectF::new(10.0, 10.0, 40.0, 40.0)));
    assert!(draws[0].1.stroke.as_ref().is_some_and(|s| s.is_visible()));
}

#[test]
fn test_summary_counts() {
    let data = EmfBuilder::new(0, 0, 99, 99)
        .words(EMR_RECTANGLE, &[0, 0, 5, 5])
        .record(EMR_COMMENT, &[0, 0, 0, 0])
        .record(EMR_RECTANGLE, &[1, 2])
        .finish();
    let summary = EmfTranscoder::default()
        .transcode(data.as_slice(), &mut RecordingSink::new())
        .unwrap();
    // header, two rectangles, comment, EOF
    assert_eq!(summary.records, 5);
    assert_eq!(summary.handled, 3);
    assert_eq!(summary.unhandled, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!((summary.width, summary.height), (100.0, 100.0));
}

#[test]
fn test_selected_brush_fills() {
    let red = 0x0000_00FF;
    let data = EmfBuilder::new(0, 0, 99, 99)
        .words(EMR_CREATEBRUSHINDIRECT, &[1, 0, red, 0])
        .words(EMR_SELECTOBJECT, &[1])
        .words(EMR_RECTANGLE, &[0, 0, 20, 20])
        .finish();
    let sink = transcode(&data);
    let (_, style) = sink.draws().next().unwrap();
    assert_eq!(style.fill, Some(Paint::Solid(Color::rgb(255, 0, 0))));
}

#[test]
fn test_save_restore_round_trip() {
    let data = EmfBuilder::new(0, 0, 99, 99)
        .record(EMR_SAVEDC, &[])
        .words(EMR_SETWINDOWORGEX, &[5, 5])
        .words(EMR_RECTANGLE, &[10, 10, 20, 20])
        .words(EMR_RESTOREDC, &[-1])
        .words(EMR_RECTANGLE, &[10, 10, 20, 20])
        .finish();
    let sink = transcode(&data);
    let shapes: Vec<_> = sink.draws().map(|(shape, _)| shape.clone()).collect();
    assert_eq!(
        shapes,
        vec![
            Shape::Rect(RectF::new(5.0, 5.0, 10.0, 10.0)),
            Shape::Rect(RectF::new(10.0, 10.0, 10.0, 10.0)),
        ]
    );
}

#[test]
fn test_unbalanced_restore_is_skipped() {
    let data = EmfBuilder::new(0, 0, 99, 99)
        .words(EMR_RESTOREDC, &[-1])
        .words(EMR_RECTANGLE, &[1, 1, 2, 2])
        .finish();
    let mut sink = RecordingSink::new();
    let summary = EmfTranscoder::default()
        .transcode(data.as_slice(), &mut sink)
        .unwrap();
    assert_eq!(summary.failed, 1);
    assert_eq!(sink.draws().count(), 1);
}

#[test]
fn test_wide_text() {
    let data = EmfBuilder::new(0, 0, 99, 99)
        .record(EMR_EXTTEXTOUTW, &ext_text_out_w(10, 20, "Hi there"))
        .finish();
    let sink = transcode(&data);
    let runs: Vec<_> = sink.texts().collect();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].text, "Hi there");
    assert_eq!(runs[0].x, 10.0);
    assert_eq!(runs[0].color, Color::BLACK);
}

#[test]
fn test_svg_output() {
    let data = EmfBuilder::new(0, 0, 99, 49)
        .words(EMR_RECTANGLE, &[10, 10, 50, 40])
        .record(EMR_EXTTEXTOUTW, &ext_text_out_w(5, 5, "a & b"))
        .finish();
    let svg = emf_to_svg(&data).unwrap();
    assert!(svg.contains(r#"viewBox="0 0 100 50""#));
    assert!(svg.contains(r##"<rect x="10" y="10" width="40" height="30" fill="#ffffff""##));
    assert!(svg.contains(">a &amp; b</text>"));
}

#[test]
fn test_malformed_header_is_fatal() {
    let mut data = EmfBuilder::new(0, 0, 99, 99).finish();
    data[40] ^= 0xFF;
    let err = emf_to_svg(&data).unwrap_err();
    assert!(!err.is_recoverable());

    let err = emf_to_svg(&data[..40]).unwrap_err();
    assert!(!err.is_recoverable());
}

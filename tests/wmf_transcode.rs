mod common;

use common::WmfBuilder;
use metafile_transcoder::images::metafile::path::{PointF, RectF, Segment, Shape};
use metafile_transcoder::images::metafile::sink::{Paint, RecordingSink};
use metafile_transcoder::images::metafile::types::Color;
use metafile_transcoder::images::wmf::{WmfTranscoder, wmf_to_svg};

const META_SAVEDC: u16 = 0x001E;
const META_SETMAPMODE: u16 = 0x0103;
const META_RESTOREDC: u16 = 0x0127;
const META_SELECTOBJECT: u16 = 0x012D;
const META_SETWINDOWORG: u16 = 0x020B;
const META_SETWINDOWEXT: u16 = 0x020C;
const META_LINETO: u16 = 0x0213;
const META_CREATEBRUSHINDIRECT: u16 = 0x02FC;
const META_RECTANGLE: u16 = 0x041B;
const META_TEXTOUT: u16 = 0x0521;
const META_BITBLT: u16 = 0x0922;
const MM_LOENGLISH: i16 = 4;
const MM_ANISOTROPIC: i16 = 8;

fn transcode(data: &[u8]) -> RecordingSink {
    let mut sink = RecordingSink::new();
    WmfTranscoder::default().transcode(data, &mut sink).unwrap();
    sink
}

/// String parameter words, padded to an even length
fn text_words(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair.get(1).copied().unwrap_or(0)]))
        .collect()
}

#[test]
fn test_loenglish_line_flips_y() {
    let data = WmfBuilder::placeable(0, 0, 1000, 1000, 100)
        .record(META_SETMAPMODE, &[MM_LOENGLISH])
        .record(META_LINETO, &[-100, 100])
        .finish();
    let sink = transcode(&data);
    let (shape, _) = sink.draws().next().unwrap();
    let Shape::Path(path) = shape else {
        panic!("expected a path, got {shape:?}");
    };
    assert_eq!(
        path.segments(),
        &[
            Segment::MoveTo(PointF::new(0.0, 0.0)),
            Segment::LineTo(PointF::new(100.0, 100.0)),
        ]
    );
}

#[test]
fn test_anisotropic_window_scales() {
    // 10x10 window stretched over the 1000x1000 default viewport
    let data = WmfBuilder::standard()
        .record(META_SETMAPMODE, &[MM_ANISOTROPIC])
        .record(META_SETWINDOWEXT, &[10, 10])
        .record(META_RECTANGLE, &[2, 2, 1, 1])
        .finish();
    let sink = transcode(&data);
    let (shape, _) = sink.draws().next().unwrap();
    assert_eq!(shape, &Shape::Rect(RectF::new(100.0, 100.0, 100.0, 100.0)));
}

#[test]
fn test_brush_gets_first_free_slot() {
    let data = WmfBuilder::standard()
        // BS_SOLID, COLORREF 0x00FF0000 (blue), no hatch
        .record(META_CREATEBRUSHINDIRECT, &[0, 0, 0x00FF, 0])
        .record(META_SELECTOBJECT, &[0])
        .record(META_RECTANGLE, &[20, 20, 0, 0])
        .finish();
    let sink = transcode(&data);
    let (_, style) = sink.draws().next().unwrap();
    assert_eq!(style.fill, Some(Paint::Solid(Color::rgb(0, 0, 255))));
}

#[test]
fn test_save_restore_round_trip() {
    let data = WmfBuilder::standard()
        .record(META_SAVEDC, &[])
        .record(META_SETWINDOWORG, &[5, 5])
        .record(META_RESTOREDC, &[-1])
        .record(META_RECTANGLE, &[20, 20, 10, 10])
        .finish();
    let sink = transcode(&data);
    let (shape, _) = sink.draws().next().unwrap();
    assert_eq!(shape, &Shape::Rect(RectF::new(10.0, 10.0, 10.0, 10.0)));
}

#[test]
fn test_ansi_text_out() {
    let mut params = vec![6];
    params.extend(text_words(b"Caf\xE9 1"));
    params.extend([40, 30]);
    let data = WmfBuilder::standard()
        .record(META_TEXTOUT, &params)
        .finish();
    let sink = transcode(&data);
    let run = sink.texts().next().unwrap();
    assert_eq!(run.text, "Café 1");
    assert_eq!(run.x, 30.0);
}

#[test]
fn test_unhandled_records_are_counted() {
    let data = WmfBuilder::standard()
        .record(META_BITBLT, &[0; 8])
        .record(META_RECTANGLE, &[1])
        .record(META_RECTANGLE, &[2, 2, 1, 1])
        .finish();
    let mut sink = RecordingSink::new();
    let summary = WmfTranscoder::default()
        .transcode(data.as_slice(), &mut sink)
        .unwrap();
    assert_eq!(summary.records, 4);
    assert_eq!(summary.unhandled, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(sink.draws().count(), 1);
}

#[test]
fn test_svg_canvas_from_placement() {
    let data = WmfBuilder::placeable(0, 0, 400, 300, 96)
        .record(META_RECTANGLE, &[20, 20, 0, 0])
        .finish();
    let svg = wmf_to_svg(&data).unwrap();
    assert!(svg.contains(r#"width="400" height="300" viewBox="0 0 400 300""#));
    assert!(svg.contains(r#"<rect x="0" y="0" width="20" height="20""#));
}

#[test]
fn test_malformed_header_is_fatal() {
    let mut data = WmfBuilder::standard().finish();
    // header size word
    data[2] = 4;
    let err = wmf_to_svg(&data).unwrap_err();
    assert!(!err.is_recoverable());

    let err = wmf_to_svg(&[0x01, 0x00, 0x09]).unwrap_err();
    assert!(!err.is_recoverable());
}

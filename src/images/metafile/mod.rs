//! Format-independent metafile playback engine.
//!
//! Both EMF and WMF replay their records through the same machinery:
//!
//! - [`record`]: bounds-checked field access to one record payload
//! - [`device_context`]: the drawing state machine and coordinate mapping
//! - [`gdi_objects`]: pens, brushes, fonts and regions
//! - [`path`]: output-space geometry and the BeginPath/EndPath buffer
//! - [`bitmap`]: DIB decoding for blits and pattern brushes
//! - [`records`]: one converter per operation
//! - [`sink`]: the drawing interface output writers implement
//! - [`transcoder`]: the shared record loop

pub mod bitmap;
pub mod device_context;
pub mod gdi_objects;
pub mod path;
pub mod record;
pub mod records;
pub mod sink;
pub mod transcoder;
pub mod types;

pub use device_context::DeviceContext;
pub use path::{Path, PointF, RectF, Shape};
pub use record::Record;
pub use sink::{OutputSink, PathSink, RecordingSink, SinkCall};
pub use transcoder::{TranscodeOptions, TranscodeSummary};

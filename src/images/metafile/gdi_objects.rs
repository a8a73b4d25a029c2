// GDI object emulation for metafile playback
//
// Pens, brushes, fonts and regions are created by records, stored in the
// object table under an integer id, and selected into the device context.
// Each knows how to turn itself into the drawing descriptors of the sink.

use super::path::Shape;
use super::sink::{FontSpec, LineCap, LineJoin, OutputSink, Paint, Stroke};
use super::types::Color;
use crate::common::Result;
use image::{Rgba, RgbaImage};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

/// Pen styles from GDI (low four bits of the style word)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum PenStyle {
    #[default]
    Solid = 0,
    Dash = 1,
    Dot = 2,
    DashDot = 3,
    DashDotDot = 4,
    Null = 5,
    InsideFrame = 6,
    UserStyle = 7,
    Alternate = 8,
}

impl PenStyle {
    pub fn from_u32(value: u32) -> Self {
        match value & 0x0F {
            1 => Self::Dash,
            2 => Self::Dot,
            3 => Self::DashDot,
            4 => Self::DashDotDot,
            5 => Self::Null,
            6 => Self::InsideFrame,
            7 => Self::UserStyle,
            8 => Self::Alternate,
            _ => Self::Solid,
        }
    }
}

/// Pen object for stroking
#[derive(Debug, Clone, PartialEq)]
pub struct Pen {
    pub style: PenStyle,
    pub cap: LineCap,
    pub join: LineJoin,
    /// Width in logical units
    pub width: i32,
    pub color: Color,
    /// Dash and gap lengths of a user-style pen, in logical units
    pub user_dashes: SmallVec<[u32; 8]>,
}

impl Default for Pen {
    fn default() -> Self {
        Self::new(0, 1, Color::BLACK)
    }
}

impl Pen {
    /// Decode a pen from its style word
    pub fn new(style: u32, width: i32, color: Color) -> Self {
        let cap = match (style >> 8) & 0x0F {
            1 => LineCap::Square,
            2 => LineCap::Butt,
            _ => LineCap::Round,
        };
        let join = match (style >> 12) & 0x0F {
            1 => LineJoin::Bevel,
            2 => LineJoin::Miter,
            _ => LineJoin::Round,
        };
        Self {
            style: PenStyle::from_u32(style),
            cap,
            join,
            width,
            color,
            user_dashes: SmallVec::new(),
        }
    }

    pub fn null() -> Self {
        Self::new(PenStyle::Null as u32, 0, Color::BLACK)
    }

    pub fn is_null(&self) -> bool {
        self.style == PenStyle::Null
    }

    /// Build the stroke descriptor. `width` is the device-space width
    /// and `dash_unit` converts user-style lengths to device space.
    pub fn to_stroke(&self, width: f64, dash_unit: f64, miter_limit: f64) -> Stroke {
        if self.is_null() {
            return Stroke {
                color: None,
                width: 0.0,
                cap: self.cap,
                join: self.join,
                miter_limit,
                dashes: SmallVec::new(),
            };
        }
        let w = width.max(1.0);
        let dashes: SmallVec<[f64; 6]> = match self.style {
            PenStyle::Dash => SmallVec::from_slice(&[w * 10.0, w * 10.0]),
            PenStyle::Dot | PenStyle::Alternate => SmallVec::from_slice(&[w, w * 2.0]),
            PenStyle::DashDot => SmallVec::from_slice(&[w * 10.0, w * 2.0, w, w * 2.0]),
            PenStyle::DashDotDot => {
                SmallVec::from_slice(&[w * 10.0, w * 2.0, w, w * 2.0, w, w * 2.0])
            },
            PenStyle::UserStyle => self
                .user_dashes
                .iter()
                .map(|&d| (f64::from(d) * dash_unit).abs().max(1.0))
                .collect(),
            _ => SmallVec::new(),
        };
        Stroke {
            color: Some(self.color),
            width: w,
            cap: self.cap,
            join: self.join,
            miter_limit,
            dashes,
        }
    }
}

/// Brush styles from GDI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum BrushStyle {
    #[default]
    Solid = 0,
    Null = 1,
    Hatched = 2,
    Pattern = 3,
    Indexed = 4,
    DibPattern = 5,
    DibPatternPt = 6,
    Pattern8x8 = 7,
    DibPattern8x8 = 8,
    MonoPattern = 9,
}

impl BrushStyle {
    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => Self::Null,
            2 => Self::Hatched,
            3 => Self::Pattern,
            4 => Self::Indexed,
            5 => Self::DibPattern,
            6 => Self::DibPatternPt,
            7 => Self::Pattern8x8,
            8 => Self::DibPattern8x8,
            9 => Self::MonoPattern,
            _ => Self::Solid,
        }
    }
}

/// Hatch orientations of a hatched brush
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HatchStyle {
    #[default]
    Horizontal,
    Vertical,
    /// Top-left to bottom-right
    FDiagonal,
    /// Bottom-left to top-right
    BDiagonal,
    Cross,
    DiagCross,
}

impl HatchStyle {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => Self::Horizontal,
            1 => Self::Vertical,
            2 => Self::FDiagonal,
            3 => Self::BDiagonal,
            4 => Self::Cross,
            _ => Self::DiagCross,
        }
    }

    fn covers(self, x: u32, y: u32) -> bool {
        let horizontal = y == 4;
        let vertical = x == 4;
        let fdiag = x == y;
        let bdiag = x == 7 - y;
        match self {
            Self::Horizontal => horizontal,
            Self::Vertical => vertical,
            Self::FDiagonal => fdiag,
            Self::BDiagonal => bdiag,
            Self::Cross => horizontal || vertical,
            Self::DiagCross => fdiag || bdiag,
        }
    }

    /// 8x8 two-color tile
    pub fn tile(self, fg: Color, bg: Color) -> RgbaImage {
        RgbaImage::from_fn(8, 8, |x, y| {
            let c = if self.covers(x, y) { fg } else { bg };
            Rgba([c.r, c.g, c.b, 255])
        })
    }
}

/// Brush object for filling
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Brush {
    pub style: BrushStyle,
    pub color: Color,
    pub hatch: HatchStyle,
    pub pattern: Option<Arc<RgbaImage>>,
}

impl Brush {
    pub fn solid(color: Color) -> Self {
        Self {
            style: BrushStyle::Solid,
            color,
            ..Self::default()
        }
    }

    pub fn null() -> Self {
        Self {
            style: BrushStyle::Null,
            ..Self::default()
        }
    }

    pub fn hatched(color: Color, hatch: HatchStyle) -> Self {
        Self {
            style: BrushStyle::Hatched,
            color,
            hatch,
            pattern: None,
        }
    }

    pub fn pattern(style: BrushStyle, image: RgbaImage) -> Self {
        Self {
            style,
            color: Color::BLACK,
            hatch: HatchStyle::default(),
            pattern: Some(Arc::new(image)),
        }
    }

    /// Fill paint under the given text and background colors, `None` for
    /// a hollow brush
    pub fn paint(&self, text_color: Color, bk_color: Color) -> Option<Paint> {
        match self.style {
            BrushStyle::Null => None,
            // indexed brushes carry no palette here and fill like solid ones
            BrushStyle::Solid | BrushStyle::Indexed => Some(Paint::Solid(self.color)),
            BrushStyle::Hatched => Some(Paint::Tile(Arc::new(
                self.hatch.tile(self.color, bk_color),
            ))),
            BrushStyle::MonoPattern => match &self.pattern {
                Some(img) => Some(Paint::Tile(Arc::new(remap_mono(img, text_color, bk_color)))),
                None => Some(Paint::Solid(self.color)),
            },
            BrushStyle::Pattern
            | BrushStyle::DibPattern
            | BrushStyle::DibPatternPt
            | BrushStyle::Pattern8x8
            | BrushStyle::DibPattern8x8 => match &self.pattern {
                Some(img) => Some(Paint::Tile(Arc::clone(img))),
                None => Some(Paint::Solid(self.color)),
            },
        }
    }
}

/// Black pixels take the text color, all others the background color
fn remap_mono(img: &RgbaImage, text_color: Color, bk_color: Color) -> RgbaImage {
    let mut out = img.clone();
    for px in out.pixels_mut() {
        let c = if px[0] == 0 && px[1] == 0 && px[2] == 0 {
            text_color
        } else {
            bk_color
        };
        *px = Rgba([c.r, c.g, c.b, 255]);
    }
    out
}

/// Logical font
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    /// Cell or character height in logical units; negative means character height
    pub height: i32,
    pub width: i32,
    /// Tenths of a degree
    pub escapement: i32,
    pub orientation: i32,
    pub weight: i32,
    pub italic: bool,
    pub underline: bool,
    pub strikeout: bool,
    pub charset: u8,
    pub face_name: String,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            height: 0,
            width: 0,
            escapement: 0,
            orientation: 0,
            weight: 400,
            italic: false,
            underline: false,
            strikeout: false,
            charset: 0,
            face_name: "Arial".to_string(),
        }
    }
}

impl Font {
    pub const DEFAULT_SIZE: f64 = 12.0;

    fn named(face: &str) -> Self {
        Self {
            face_name: face.to_string(),
            ..Self::default()
        }
    }

    /// Font description for a device-space size; zero selects the default size
    pub fn to_spec(&self, size: f64) -> FontSpec {
        FontSpec {
            family: self.face_name.clone(),
            size: if size > 0.0 { size } else { Self::DEFAULT_SIZE },
            weight: if self.weight <= 0 {
                400
            } else {
                self.weight as u32
            },
            italic: self.italic,
            underline: self.underline,
            strikeout: self.strikeout,
        }
    }
}

/// Clip region: the intersection of its shapes, no shapes meaning no clip
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Region {
    pub shapes: Vec<Shape>,
}

impl Region {
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn intersect(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// Reset the sink's clip to this region
    pub fn apply(&self, sink: &mut dyn OutputSink) -> Result<()> {
        sink.set_clip(None)?;
        for shape in &self.shapes {
            sink.intersect_clip(shape)?;
        }
        Ok(())
    }
}

/// Entry of the object table
#[derive(Debug, Clone, PartialEq)]
pub enum GdiObject {
    Pen(Pen),
    Brush(Brush),
    Font(Font),
    Region(Region),
    /// Palettes and other objects that only occupy an id
    Placeholder,
}

/// Stock object ids (high bit set) usable with SelectObject
pub mod stock {
    use super::{Brush, Color, Font, GdiObject, Pen};

    pub const WHITE_BRUSH: u32 = 0x80000000;
    pub const LTGRAY_BRUSH: u32 = 0x80000001;
    pub const GRAY_BRUSH: u32 = 0x80000002;
    pub const DKGRAY_BRUSH: u32 = 0x80000003;
    pub const BLACK_BRUSH: u32 = 0x80000004;
    pub const NULL_BRUSH: u32 = 0x80000005;
    pub const WHITE_PEN: u32 = 0x80000006;
    pub const BLACK_PEN: u32 = 0x80000007;
    pub const NULL_PEN: u32 = 0x80000008;
    pub const OEM_FIXED_FONT: u32 = 0x8000000A;
    pub const ANSI_FIXED_FONT: u32 = 0x8000000B;
    pub const ANSI_VAR_FONT: u32 = 0x8000000C;
    pub const SYSTEM_FONT: u32 = 0x8000000D;
    pub const DEVICE_DEFAULT_FONT: u32 = 0x8000000E;
    pub const DEFAULT_PALETTE: u32 = 0x8000000F;
    pub const SYSTEM_FIXED_FONT: u32 = 0x80000010;
    pub const DEFAULT_GUI_FONT: u32 = 0x80000011;
    pub const DC_BRUSH: u32 = 0x80000012;
    pub const DC_PEN: u32 = 0x80000013;

    /// Check if value is a stock object
    #[inline]
    pub const fn is_stock_object(value: u32) -> bool {
        (value & 0x80000000) != 0
    }

    /// The object a stock id stands for
    pub fn lookup(id: u32) -> Option<GdiObject> {
        let object = match id {
            WHITE_BRUSH | DC_BRUSH => GdiObject::Brush(Brush::solid(Color::WHITE)),
            LTGRAY_BRUSH => GdiObject::Brush(Brush::solid(Color::rgb(0xC0, 0xC0, 0xC0))),
            GRAY_BRUSH => GdiObject::Brush(Brush::solid(Color::rgb(0x80, 0x80, 0x80))),
            DKGRAY_BRUSH => GdiObject::Brush(Brush::solid(Color::rgb(0x40, 0x40, 0x40))),
            BLACK_BRUSH => GdiObject::Brush(Brush::solid(Color::BLACK)),
            NULL_BRUSH => GdiObject::Brush(Brush::null()),
            WHITE_PEN => GdiObject::Pen(Pen::new(0, 1, Color::WHITE)),
            BLACK_PEN | DC_PEN => GdiObject::Pen(Pen::default()),
            NULL_PEN => GdiObject::Pen(Pen::null()),
            OEM_FIXED_FONT | ANSI_FIXED_FONT | SYSTEM_FIXED_FONT => {
                GdiObject::Font(Font::named("Courier New"))
            },
            ANSI_VAR_FONT | DEFAULT_GUI_FONT => GdiObject::Font(Font::named("MS Sans Serif")),
            SYSTEM_FONT | DEVICE_DEFAULT_FONT => GdiObject::Font(Font::named("System")),
            DEFAULT_PALETTE => GdiObject::Placeholder,
            _ => return None,
        };
        Some(object)
    }
}

/// GDI object table keyed by record-assigned ids
#[derive(Debug, Clone, Default)]
pub struct ObjectTable {
    objects: HashMap<u32, GdiObject>,
}

impl ObjectTable {
    /// Create new empty object table
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object under the smallest unused id and return that id
    pub fn add(&mut self, object: GdiObject) -> u32 {
        let id = (0u32..)
            .find(|id| !self.objects.contains_key(id))
            .unwrap_or_default();
        self.objects.insert(id, object);
        id
    }

    /// Store an object under an explicit id, replacing any previous one
    pub fn insert(&mut self, id: u32, object: GdiObject) {
        self.objects.insert(id, object);
    }

    /// Get object by id
    pub fn get(&self, id: u32) -> Option<&GdiObject> {
        self.objects.get(&id)
    }

    /// Remove object by id
    pub fn remove(&mut self, id: u32) -> Option<GdiObject> {
        self.objects.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

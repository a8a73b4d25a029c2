// Device Context (DC) state for metafile playback
//
// The device context holds every piece of drawing state a record may read
// or change: the logical-to-output coordinate mapping, selected objects,
// colors and modes, the object table, the saved-state stack and the path
// buffer. One context lives for exactly one transcode run.

use super::gdi_objects::{Brush, Font, GdiObject, ObjectTable, Pen, Region, stock};
use super::path::{PathBuffer, PointF, RectF};
use super::sink::{FillRule, FontSpec, Paint, ShapeStyle, Stroke};
use super::types::{Color, Point, Rect, Size, XForm};
use crate::common::{DecodeError, Result};

/// Mapping modes (MM_*)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum MapMode {
    #[default]
    Text = 1,
    LoMetric = 2,
    HiMetric = 3,
    LoEnglish = 4,
    HiEnglish = 5,
    Twips = 6,
    Isotropic = 7,
    Anisotropic = 8,
}

impl MapMode {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Text),
            2 => Some(Self::LoMetric),
            3 => Some(Self::HiMetric),
            4 => Some(Self::LoEnglish),
            5 => Some(Self::HiEnglish),
            6 => Some(Self::Twips),
            7 => Some(Self::Isotropic),
            8 => Some(Self::Anisotropic),
            _ => None,
        }
    }

    /// Logical units per inch of the fixed-scale modes
    pub fn units_per_inch(self) -> Option<f64> {
        match self {
            Self::LoMetric => Some(254.0),
            Self::HiMetric => Some(2540.0),
            Self::LoEnglish => Some(100.0),
            Self::HiEnglish => Some(1000.0),
            Self::Twips => Some(1440.0),
            _ => None,
        }
    }
}

/// Text alignment flags (TA_*)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextAlign(pub u32);

impl TextAlign {
    pub const NOUPDATECP: u32 = 0x0000;
    pub const UPDATECP: u32 = 0x0001;
    pub const LEFT: u32 = 0x0000;
    pub const RIGHT: u32 = 0x0002;
    pub const CENTER: u32 = 0x0006;
    pub const TOP: u32 = 0x0000;
    pub const BOTTOM: u32 = 0x0008;
    pub const BASELINE: u32 = 0x0018;
    pub const RTLREADING: u32 = 0x0100;

    pub fn is_center(&self) -> bool {
        (self.0 & 0x0006) == Self::CENTER
    }

    pub fn is_right(&self) -> bool {
        (self.0 & 0x0006) == Self::RIGHT
    }

    pub fn is_bottom(&self) -> bool {
        (self.0 & 0x0018) == Self::BOTTOM
    }

    pub fn is_baseline(&self) -> bool {
        (self.0 & 0x0018) == Self::BASELINE
    }

    pub fn updates_cp(&self) -> bool {
        (self.0 & Self::UPDATECP) != 0
    }
}

/// Background mix mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum BackgroundMode {
    #[default]
    Transparent = 1,
    Opaque = 2,
}

impl BackgroundMode {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Transparent),
            2 => Some(Self::Opaque),
            _ => None,
        }
    }
}

/// Polygon fill mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum PolyFillMode {
    #[default]
    Alternate = 1,
    Winding = 2,
}

impl PolyFillMode {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Alternate),
            2 => Some(Self::Winding),
            _ => None,
        }
    }

    pub fn fill_rule(&self) -> FillRule {
        match self {
            Self::Alternate => FillRule::EvenOdd,
            Self::Winding => FillRule::NonZero,
        }
    }
}

/// Arc drawing direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum ArcDirection {
    #[default]
    CounterClockwise = 1,
    Clockwise = 2,
}

/// World transform combination modes (MWT_*)
pub const MWT_IDENTITY: u32 = 1;
pub const MWT_LEFTMULTIPLY: u32 = 2;
pub const MWT_RIGHTMULTIPLY: u32 = 3;

const MIN_DPI: u32 = 60;
pub const DEFAULT_DPI: u32 = 96;

/// Device Context state
///
/// Positions are kept in window (logical) units; everything handed to a
/// sink goes through [`DeviceContext::to_output`] first.
#[derive(Debug, Clone)]
pub struct DeviceContext {
    // Output frame
    pub bounds: Rect,
    dpi_x: u32,
    dpi_y: u32,

    // Current position
    pub position: Point,

    // Viewport and Window
    pub window_org: Point,
    pub window_ext: Size,
    pub viewport_org: Point,
    pub viewport_ext: Size,
    pub map_mode: MapMode,

    // Transforms
    pub transform: XForm,

    // Colors
    pub bk_color: Color,
    pub text_color: Color,

    // Modes
    pub bk_mode: BackgroundMode,
    pub text_align: TextAlign,
    pub fill_mode: PolyFillMode,
    pub arc_direction: ArcDirection,
    pub miter_limit: f64,
    pub stretch_mode: u32,
    pub rop2: u32,

    // Selected objects
    pub pen: Pen,
    pub brush: Brush,
    pub font: Font,
    pub region: Region,
    selected: Selection,

    pub path: PathBuffer,

    objects: ObjectTable,
    saved: Vec<DeviceContext>,
}

/// Ids of the objects currently selected, for DeleteObject
#[derive(Debug, Clone, Copy, Default)]
struct Selection {
    pen: Option<u32>,
    brush: Option<u32>,
    font: Option<u32>,
    region: Option<u32>,
}

impl Default for DeviceContext {
    fn default() -> Self {
        Self {
            bounds: Rect::new(0, 0, 100, 100),
            dpi_x: DEFAULT_DPI,
            dpi_y: DEFAULT_DPI,
            position: Point::default(),
            window_org: Point::default(),
            window_ext: Size::new(1000, 1000),
            viewport_org: Point::default(),
            viewport_ext: Size::new(1000, 1000),
            map_mode: MapMode::Text,
            transform: XForm::IDENTITY,
            bk_color: Color::WHITE,
            text_color: Color::BLACK,
            bk_mode: BackgroundMode::Transparent,
            text_align: TextAlign(TextAlign::LEFT | TextAlign::TOP),
            fill_mode: PolyFillMode::Alternate,
            arc_direction: ArcDirection::CounterClockwise,
            miter_limit: 10.0,
            stretch_mode: 3, // COLORONCOLOR
            rop2: 13,        // R2_COPYPEN
            pen: Pen::default(),
            brush: Brush::solid(Color::WHITE),
            font: Font::default(),
            region: Region::default(),
            selected: Selection::default(),
            path: PathBuffer::new(),
            objects: ObjectTable::new(),
            saved: Vec::new(),
        }
    }
}

impl DeviceContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dpi(&self) -> (u32, u32) {
        (self.dpi_x, self.dpi_y)
    }

    /// Set both resolutions, never below 60 dpi
    pub fn set_dpi(&mut self, dpi_x: u32, dpi_y: u32) {
        self.dpi_x = dpi_x.max(MIN_DPI);
        self.dpi_y = dpi_y.max(MIN_DPI);
    }

    pub fn set_map_mode(&mut self, mode: u32) -> Result<()> {
        self.map_mode = MapMode::from_u32(mode)
            .ok_or_else(|| DecodeError::invalid_format(format!("unknown mapping mode {mode}")))?;
        Ok(())
    }

    pub fn set_miter_limit(&mut self, limit: f64) {
        self.miter_limit = limit.max(1.0);
    }

    // ---- coordinate mapping ----

    /// Map a horizontal window-units magnitude to output units
    pub fn scale_x(&self, v: f64) -> f64 {
        let scaled = match self.map_mode {
            MapMode::Text => v,
            MapMode::Isotropic | MapMode::Anisotropic => {
                if self.window_ext.width != 0 {
                    v * f64::from(self.viewport_ext.width) / f64::from(self.window_ext.width)
                } else {
                    v
                }
            },
            mode => v * f64::from(self.dpi_x) / mode.units_per_inch().unwrap_or(1.0),
        };
        scaled * self.transform.a()
    }

    /// Map a vertical window-units magnitude to output units. The metric,
    /// english and twips modes have y growing upwards.
    ///
    /// `MM_ISOTROPIC` keeps one unit the same length on both axes: y is
    /// scaled by the magnitude of the x extent ratio, and only the sign of
    /// the y extents is honored. Window 1000x500 to viewport 100x100 maps a
    /// 200-unit vertical span to 20 output units, not 40.
    pub fn scale_y(&self, v: f64) -> f64 {
        let scaled = match self.map_mode {
            MapMode::Text => v,
            MapMode::Anisotropic => {
                if self.window_ext.height != 0 {
                    v * f64::from(self.viewport_ext.height) / f64::from(self.window_ext.height)
                } else {
                    v
                }
            },
            MapMode::Isotropic => v * self.isotropic_y_ratio(),
            mode => -v * f64::from(self.dpi_y) / mode.units_per_inch().unwrap_or(1.0),
        };
        scaled * self.transform.d()
    }

    /// Isotropic y ratio: the x magnitude with the sign of the y extents
    fn isotropic_y_ratio(&self) -> f64 {
        if self.window_ext.width == 0 || self.window_ext.height == 0 {
            return 1.0;
        }
        let magnitude =
            (f64::from(self.viewport_ext.width) / f64::from(self.window_ext.width)).abs();
        let sign = f64::from(self.viewport_ext.height).signum()
            * f64::from(self.window_ext.height).signum();
        magnitude * sign
    }

    pub fn to_output_x(&self, v: f64) -> f64 {
        self.scale_x(v - f64::from(self.window_org.x))
            + self.transform.e()
            + f64::from(self.viewport_org.x)
            - f64::from(self.bounds.left)
    }

    pub fn to_output_y(&self, v: f64) -> f64 {
        self.scale_y(v - f64::from(self.window_org.y))
            + self.transform.f()
            + f64::from(self.viewport_org.y)
            - f64::from(self.bounds.top)
    }

    #[inline]
    pub fn to_output(&self, p: Point) -> PointF {
        self.to_output_f(f64::from(p.x), f64::from(p.y))
    }

    #[inline]
    pub fn to_output_f(&self, x: f64, y: f64) -> PointF {
        PointF::new(self.to_output_x(x), self.to_output_y(y))
    }

    /// Output rectangle spanned by two logical corners
    pub fn to_output_rect(&self, r: &Rect) -> RectF {
        RectF::from_corners(
            self.to_output(Point::new(r.left, r.top)),
            self.to_output(Point::new(r.right, r.bottom)),
        )
    }

    fn unscale(scaled: f64, factor: f64) -> f64 {
        if factor == 0.0 { scaled } else { scaled / factor }
    }

    /// Inverse of [`Self::to_output_x`]
    pub fn to_window_x(&self, o: f64) -> f64 {
        let scaled = o - self.transform.e() - f64::from(self.viewport_org.x)
            + f64::from(self.bounds.left);
        Self::unscale(scaled, self.scale_x(1.0)) + f64::from(self.window_org.x)
    }

    /// Inverse of [`Self::to_output_y`]
    pub fn to_window_y(&self, o: f64) -> f64 {
        let scaled = o - self.transform.f() - f64::from(self.viewport_org.y)
            + f64::from(self.bounds.top);
        Self::unscale(scaled, self.scale_y(1.0)) + f64::from(self.window_org.y)
    }

    /// Output point back to the nearest logical point
    pub fn to_window(&self, p: PointF) -> Point {
        Point::new(
            self.to_window_x(p.x).round() as i32,
            self.to_window_y(p.y).round() as i32,
        )
    }

    /// Whether the mapping mirrors one axis, which reverses turning direction
    pub fn flips_orientation(&self) -> bool {
        self.scale_x(1.0) * self.scale_y(1.0) < 0.0
    }

    // ---- world transform ----

    pub fn set_world_transform(&mut self, xform: XForm) {
        self.transform = xform;
    }

    pub fn modify_world_transform(&mut self, xform: XForm, mode: u32) -> Result<()> {
        self.transform = match mode {
            MWT_IDENTITY => XForm::IDENTITY,
            MWT_LEFTMULTIPLY => xform.then(&self.transform),
            MWT_RIGHTMULTIPLY => self.transform.then(&xform),
            other => {
                return Err(DecodeError::invalid_format(format!(
                    "unknown world transform mode {other}"
                )));
            },
        };
        Ok(())
    }

    // ---- save / restore ----

    /// Push a snapshot of the drawing state. The object table is not part
    /// of the snapshot.
    pub fn save(&mut self) {
        let objects = std::mem::take(&mut self.objects);
        let saved = std::mem::take(&mut self.saved);
        let snapshot = self.clone();
        self.objects = objects;
        self.saved = saved;
        self.saved.push(snapshot);
    }

    pub fn saved_depth(&self) -> usize {
        self.saved.len()
    }

    /// Restore a snapshot. Negative `n` is relative to the top of the stack
    /// (`-1` is the last save); positive `n` selects the n-th entry from the
    /// bottom and drops everything above it.
    pub fn restore(&mut self, n: i32) -> Result<()> {
        let len = self.saved.len();
        let snapshot = if n < 0 {
            let count = n.unsigned_abs() as usize;
            if count > len {
                None
            } else {
                self.saved.truncate(len - count + 1);
                self.saved.pop()
            }
        } else if n > 0 {
            let index = (n - 1) as usize;
            if index < len {
                self.saved.truncate(index + 1);
                self.saved.pop()
            } else {
                None
            }
        } else {
            None
        };
        let snapshot = snapshot.ok_or_else(|| {
            DecodeError::invalid_format(format!("RestoreDC({n}) with {len} saved states"))
        })?;
        let objects = std::mem::take(&mut self.objects);
        let saved = std::mem::take(&mut self.saved);
        *self = snapshot;
        self.objects = objects;
        self.saved = saved;
        Ok(())
    }

    // ---- object table ----

    pub fn objects(&self) -> &ObjectTable {
        &self.objects
    }

    /// Store a new object under `id`, or under the smallest free id
    pub fn add_object(&mut self, id: Option<u32>, object: GdiObject) -> u32 {
        match id {
            Some(id) => {
                self.objects.insert(id, object);
                id
            },
            None => self.objects.add(object),
        }
    }

    /// Make the object `id` current. Stock ids are resolved without the table.
    pub fn select_object(&mut self, id: u32) -> Result<()> {
        let (object, table_id) = if stock::is_stock_object(id) {
            let object = stock::lookup(id)
                .ok_or_else(|| DecodeError::invalid_format(format!("unknown stock object {id:#x}")))?;
            (object, None)
        } else {
            let object = self
                .objects
                .get(id)
                .cloned()
                .ok_or_else(|| DecodeError::invalid_format(format!("no object with id {id}")))?;
            (object, Some(id))
        };
        match object {
            GdiObject::Pen(pen) => {
                self.pen = pen;
                self.selected.pen = table_id;
            },
            GdiObject::Brush(brush) => {
                self.brush = brush;
                self.selected.brush = table_id;
            },
            GdiObject::Font(font) => {
                self.font = font;
                self.selected.font = table_id;
            },
            GdiObject::Region(region) => {
                self.region = region;
                self.selected.region = table_id;
            },
            GdiObject::Placeholder => {},
        }
        Ok(())
    }

    /// Remove an object; a deleted selection falls back to the default
    pub fn delete_object(&mut self, id: u32) -> Result<()> {
        if stock::is_stock_object(id) {
            return Ok(());
        }
        self.objects
            .remove(id)
            .ok_or_else(|| DecodeError::invalid_format(format!("no object with id {id}")))?;
        if self.selected.pen == Some(id) {
            self.pen = Pen::default();
            self.selected.pen = None;
        }
        if self.selected.brush == Some(id) {
            self.brush = Brush::solid(Color::WHITE);
            self.selected.brush = None;
        }
        if self.selected.font == Some(id) {
            self.font = Font::default();
            self.selected.font = None;
        }
        if self.selected.region == Some(id) {
            self.region = Region::default();
            self.selected.region = None;
        }
        Ok(())
    }

    /// Region stored under `id`, if that id holds one
    pub fn region_object(&self, id: u32) -> Option<&Region> {
        match self.objects.get(id) {
            Some(GdiObject::Region(region)) => Some(region),
            _ => None,
        }
    }

    // ---- drawing descriptors ----

    /// Stroke descriptor of the current pen
    pub fn stroke(&self) -> Stroke {
        let width = self.scale_x(f64::from(self.pen.width)).abs();
        let unit = self.scale_x(1.0).abs();
        self.pen.to_stroke(width, unit, self.miter_limit)
    }

    /// Fill paint of the current brush
    pub fn fill(&self) -> Option<Paint> {
        self.brush.paint(self.text_color, self.bk_color)
    }

    /// Style for a shape drawn with the current pen and, for closed
    /// shapes, the current brush
    pub fn style(&self, filled: bool) -> ShapeStyle {
        ShapeStyle {
            fill: if filled { self.fill() } else { None },
            stroke: Some(self.stroke()),
            fill_rule: self.fill_mode.fill_rule(),
        }
    }

    /// Style for filling only
    pub fn fill_style(&self) -> ShapeStyle {
        ShapeStyle {
            fill: self.fill(),
            stroke: None,
            fill_rule: self.fill_mode.fill_rule(),
        }
    }

    /// Current font in output units
    pub fn font_spec(&self) -> FontSpec {
        let size = self.scale_y(f64::from(self.font.height)).abs();
        self.font.to_spec(size)
    }
}

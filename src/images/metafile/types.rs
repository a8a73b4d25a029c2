/// Value types shared by the EMF and WMF record families
///
/// References:
/// - [MS-WMF] 2.2.2 (ColorRef, PointS, RectS)
/// - [MS-EMF] 2.2.28 (Xform), [MS-WMF] 2.2.2.19 (RectL/PointL/SizeL)

/// RGB color decoded from a packed COLORREF (`0x00BBGGRR`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Decode a COLORREF; the high byte (palette flags) is ignored
    #[inline]
    pub const fn from_colorref(value: u32) -> Self {
        Self {
            r: (value & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: ((value >> 16) & 0xFF) as u8,
        }
    }

    #[inline]
    pub const fn to_colorref(self) -> u32 {
        (self.r as u32) | ((self.g as u32) << 8) | ((self.b as u32) << 16)
    }

    #[inline]
    pub const fn is_black(self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }
}

/// Logical point in window units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Logical extent in window units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Logical rectangle given by its edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    #[inline]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[inline]
    pub const fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    #[inline]
    pub const fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }
}

/// Two-dimensional affine transform stored as `[a, b, c, d, e, f]`
///
/// A point maps as `x' = a*x + c*y + e`, `y' = b*x + d*y + f`, i.e. the
/// row-vector convention of XFORM with `eM11 = a`, `eM12 = b`, `eM21 = c`,
/// `eM22 = d`, `eDx = e`, `eDy = f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XForm(pub [f64; 6]);

impl Default for XForm {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl XForm {
    pub const IDENTITY: XForm = XForm([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    #[inline]
    pub fn from_f32(values: [f32; 6]) -> Self {
        Self(values.map(f64::from))
    }

    #[inline]
    pub fn translate(dx: f64, dy: f64) -> Self {
        Self([1.0, 0.0, 0.0, 1.0, dx, dy])
    }

    /// Rotation by `degrees`, positive turning +x towards +y
    pub fn rotate(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self([cos, sin, -sin, cos, 0.0, 0.0])
    }

    #[inline]
    pub fn a(&self) -> f64 {
        self.0[0]
    }

    #[inline]
    pub fn d(&self) -> f64 {
        self.0[3]
    }

    #[inline]
    pub fn e(&self) -> f64 {
        self.0[4]
    }

    #[inline]
    pub fn f(&self) -> f64 {
        self.0[5]
    }

    /// Check if this is the identity transform
    pub fn is_identity(&self) -> bool {
        self.approx_eq(&Self::IDENTITY, 1e-9)
    }

    pub fn approx_eq(&self, other: &XForm, epsilon: f64) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }

    /// Product `self * other`: apply `self` first, then `other`.
    pub fn then(&self, other: &XForm) -> XForm {
        let [l11, l12, l21, l22, l31, l32] = self.0;
        let [r11, r12, r21, r22, r31, r32] = other.0;
        XForm([
            l11 * r11 + l12 * r21,
            l11 * r12 + l12 * r22,
            l21 * r11 + l22 * r21,
            l21 * r12 + l22 * r22,
            l31 * r11 + l32 * r21 + r31,
            l31 * r12 + l32 * r22 + r32,
        ])
    }

    /// Inverse transform, or `None` for a singular matrix
    pub fn inverse(&self) -> Option<XForm> {
        let [a, b, c, d, e, f] = self.0;
        let det = a * d - b * c;
        if det.abs() < f64::EPSILON {
            return None;
        }
        let ia = d / det;
        let ib = -b / det;
        let ic = -c / det;
        let id = a / det;
        Some(XForm([
            ia,
            ib,
            ic,
            id,
            -(e * ia + f * ic),
            -(e * ib + f * id),
        ]))
    }

    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + c * y + e, b * x + d * y + f)
    }
}

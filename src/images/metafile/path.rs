/// Output-space geometry and the path buffer used while a path bracket is open
///
/// Every coordinate in this module is already converted to output units.
/// The SVG serialization follows the compact SVGO-like form (repeated
/// commands omitted, two decimal places).
use crate::images::svg_utils::write_num;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Point in output space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

impl PointF {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in output space with non-negative extent
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectF {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanned by two opposite corners in any order
    pub fn from_corners(a: PointF, b: PointF) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> PointF {
        PointF::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn union(&self, other: &RectF) -> RectF {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        RectF::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

/// One drawing command of a [`Path`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(PointF),
    LineTo(PointF),
    /// Cubic Bezier: two control points and the end point
    CubicTo(PointF, PointF, PointF),
    Close,
}

impl Segment {
    fn end_point(&self) -> Option<PointF> {
        match self {
            Self::MoveTo(p) | Self::LineTo(p) | Self::CubicTo(_, _, p) => Some(*p),
            Self::Close => None,
        }
    }
}

/// General path made of sub-figures
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    segments: Vec<Segment>,
    current: Option<PointF>,
    figure_start: Option<PointF>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last point written, `None` before the first move
    pub fn current_point(&self) -> Option<PointF> {
        self.current
    }

    pub fn move_to(&mut self, p: PointF) {
        self.segments.push(Segment::MoveTo(p));
        self.current = Some(p);
        self.figure_start = Some(p);
    }

    /// Line to `p`; starts a figure at `p` when there is no current point
    pub fn line_to(&mut self, p: PointF) {
        if self.current.is_none() {
            self.move_to(p);
            return;
        }
        self.segments.push(Segment::LineTo(p));
        self.current = Some(p);
    }

    pub fn cubic_to(&mut self, c1: PointF, c2: PointF, p: PointF) {
        if self.current.is_none() {
            self.move_to(c1);
        }
        self.segments.push(Segment::CubicTo(c1, c2, p));
        self.current = Some(p);
    }

    /// Close the current figure; the pen returns to the figure start
    pub fn close(&mut self) {
        if self.current.is_some() && !matches!(self.segments.last(), Some(Segment::Close)) {
            self.segments.push(Segment::Close);
            self.current = self.figure_start;
        }
    }

    /// Forget the current point so the next command opens a new figure
    pub fn start_new_figure(&mut self) {
        self.current = None;
    }

    /// Append every segment of `other`. With `connect`, the leading move of
    /// `other` becomes a line from the current point.
    pub fn append(&mut self, other: &Path, connect: bool) {
        for (i, seg) in other.segments.iter().enumerate() {
            match *seg {
                Segment::MoveTo(p) if i == 0 && connect && self.current.is_some() => {
                    self.line_to(p)
                },
                Segment::MoveTo(p) => self.move_to(p),
                Segment::LineTo(p) => self.line_to(p),
                Segment::CubicTo(c1, c2, p) => self.cubic_to(c1, c2, p),
                Segment::Close => self.close(),
            }
        }
    }

    /// Segments of the last figure, starting at its move
    pub fn current_figure(&self) -> &[Segment] {
        let start = self
            .segments
            .iter()
            .rposition(|s| matches!(s, Segment::MoveTo(_)))
            .unwrap_or(0);
        &self.segments[start..]
    }

    /// Replace every curve by straight chords
    pub fn flatten(&self) -> Path {
        const STEPS: usize = 16;
        let mut out = Path::new();
        let mut last = PointF::default();
        for seg in &self.segments {
            match *seg {
                Segment::CubicTo(c1, c2, p) => {
                    for i in 1..=STEPS {
                        let t = i as f64 / STEPS as f64;
                        let mt = 1.0 - t;
                        let x = mt * mt * mt * last.x
                            + 3.0 * mt * mt * t * c1.x
                            + 3.0 * mt * t * t * c2.x
                            + t * t * t * p.x;
                        let y = mt * mt * mt * last.y
                            + 3.0 * mt * mt * t * c1.y
                            + 3.0 * mt * t * t * c2.y
                            + t * t * t * p.y;
                        out.line_to(PointF::new(x, y));
                    }
                },
                Segment::MoveTo(p) => out.move_to(p),
                Segment::LineTo(p) => out.line_to(p),
                Segment::Close => out.close(),
            }
            if let Some(p) = seg.end_point() {
                last = p;
            } else if let Some(p) = out.current {
                last = p;
            }
        }
        out
    }

    /// Bounding box of all points, control points included
    pub fn bounds(&self) -> Option<RectF> {
        let mut points = self.segments.iter().flat_map(|s| match *s {
            Segment::MoveTo(p) | Segment::LineTo(p) => vec![p],
            Segment::CubicTo(a, b, c) => vec![a, b, c],
            Segment::Close => Vec::new(),
        });
        let first = points.next()?;
        let (mut min, mut max) = (first, first);
        for p in points {
            min = PointF::new(min.x.min(p.x), min.y.min(p.y));
            max = PointF::new(max.x.max(p.x), max.y.max(p.y));
        }
        Some(RectF::from_corners(min, max))
    }

    /// SVG path data
    pub fn to_svg_data(&self) -> String {
        let mut out = String::with_capacity(self.segments.len() * 12);
        let mut prev = None;
        for seg in &self.segments {
            let (cmd, coords): (char, &[f64]) = match seg {
                Segment::MoveTo(p) => ('M', &[p.x, p.y]),
                Segment::LineTo(p) => ('L', &[p.x, p.y]),
                Segment::CubicTo(a, b, c) => ('C', &[a.x, a.y, b.x, b.y, c.x, c.y]),
                Segment::Close => ('z', &[]),
            };
            if prev != Some(cmd) || cmd == 'z' || cmd == 'M' {
                out.push(cmd);
            } else {
                out.push(' ');
            }
            for (i, v) in coords.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_num(&mut out, *v);
            }
            prev = Some(cmd);
        }
        out
    }

    /// Append an elliptical arc around `center` from `start` radians sweeping
    /// `sweep` radians, using cubic segments of at most a quarter turn.
    /// Sweeps beyond one full turn are clamped to it; a non-finite sweep
    /// draws nothing past the start point.
    pub fn arc(&mut self, center: PointF, rx: f64, ry: f64, start: f64, sweep: f64, connect: bool) {
        let sweep = if sweep.is_finite() { sweep.clamp(-TAU, TAU) } else { 0.0 };
        let at = |t: f64| PointF::new(center.x + rx * t.cos(), center.y + ry * t.sin());
        let first = at(start);
        if connect && self.current.is_some() {
            self.line_to(first);
        } else {
            self.move_to(first);
        }
        let pieces = (sweep.abs() / FRAC_PI_2).ceil().max(1.0) as usize;
        let step = sweep / pieces as f64;
        let k = 4.0 / 3.0 * (step / 4.0).tan();
        let mut t0 = start;
        for _ in 0..pieces {
            let t1 = t0 + step;
            let (p0, p3) = (at(t0), at(t1));
            let c1 = PointF::new(p0.x - k * rx * t0.sin(), p0.y + k * ry * t0.cos());
            let c2 = PointF::new(p3.x + k * rx * t1.sin(), p3.y - k * ry * t1.cos());
            self.cubic_to(c1, c2, p3);
            t0 = t1;
        }
    }
}

/// Parameter angle of the point where the ray from the ellipse center
/// through `p` meets the ellipse inscribed in `rect`.
pub fn ellipse_angle(rect: &RectF, p: PointF) -> f64 {
    let c = rect.center();
    let rx = (rect.width / 2.0).max(f64::EPSILON);
    let ry = (rect.height / 2.0).max(f64::EPSILON);
    ((p.y - c.y) / ry).atan2((p.x - c.x) / rx)
}

/// Signed sweep from `start` to `end`. Positive sweeps turn +x towards +y.
/// Equal angles give a full turn.
pub fn arc_sweep(start: f64, end: f64, positive: bool) -> f64 {
    let mut sweep = (end - start) % TAU;
    if positive {
        if sweep <= 0.0 {
            sweep += TAU;
        }
    } else if sweep >= 0.0 {
        sweep -= TAU;
    }
    sweep
}

/// Output-space shape handed to a sink in a single draw call
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect(RectF),
    RoundRect { rect: RectF, rx: f64, ry: f64 },
    Ellipse(RectF),
    Path(Path),
}

impl Shape {
    /// Equivalent general path
    pub fn to_path(&self) -> Path {
        let mut path = Path::new();
        match self {
            Shape::Rect(r) => {
                path.move_to(PointF::new(r.x, r.y));
                path.line_to(PointF::new(r.right(), r.y));
                path.line_to(PointF::new(r.right(), r.bottom()));
                path.line_to(PointF::new(r.x, r.bottom()));
                path.close();
            },
            Shape::Ellipse(r) => {
                path.arc(r.center(), r.width / 2.0, r.height / 2.0, 0.0, TAU, false);
                path.close();
            },
            Shape::RoundRect { rect: r, rx, ry } => {
                let rx = rx.min(r.width / 2.0);
                let ry = ry.min(r.height / 2.0);
                path.move_to(PointF::new(r.x + rx, r.y));
                path.line_to(PointF::new(r.right() - rx, r.y));
                path.arc(PointF::new(r.right() - rx, r.y + ry), rx, ry, -FRAC_PI_2, FRAC_PI_2, true);
                path.line_to(PointF::new(r.right(), r.bottom() - ry));
                path.arc(PointF::new(r.right() - rx, r.bottom() - ry), rx, ry, 0.0, FRAC_PI_2, true);
                path.line_to(PointF::new(r.x + rx, r.bottom()));
                path.arc(PointF::new(r.x + rx, r.bottom() - ry), rx, ry, FRAC_PI_2, FRAC_PI_2, true);
                path.line_to(PointF::new(r.x, r.y + ry));
                path.arc(PointF::new(r.x + rx, r.y + ry), rx, ry, PI, FRAC_PI_2, true);
                path.close();
            },
            Shape::Path(p) => return p.clone(),
        }
        path
    }

    pub fn bounds(&self) -> Option<RectF> {
        match self {
            Shape::Rect(r) | Shape::Ellipse(r) | Shape::RoundRect { rect: r, .. } => Some(*r),
            Shape::Path(p) => p.bounds(),
        }
    }
}

/// Geometry collected between BeginPath and EndPath
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathBuffer {
    path: Path,
    open: bool,
}

impl PathBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard any previous content and start accepting geometry
    pub fn begin(&mut self) {
        self.path = Path::new();
        self.open = true;
    }

    /// Stop accepting geometry; the content stays available
    pub fn end(&mut self) {
        self.open = false;
    }

    /// Discard everything without rendering
    pub fn abort(&mut self) {
        self.path = Path::new();
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hand the accumulated geometry over, leaving the buffer empty and closed
    pub fn take(&mut self) -> Path {
        self.open = false;
        std::mem::take(&mut self.path)
    }

    pub fn move_to(&mut self, p: PointF) {
        self.path.move_to(p);
    }

    pub fn line_to(&mut self, p: PointF) {
        self.path.line_to(p);
    }

    pub fn curve_to(&mut self, c1: PointF, c2: PointF, p: PointF) {
        self.path.cubic_to(c1, c2, p);
    }

    pub fn append_shape(&mut self, shape: &Shape, connect: bool) {
        self.path.append(&shape.to_path(), connect);
    }

    pub fn close_figure(&mut self) {
        self.path.close();
    }

    pub fn start_new_figure(&mut self) {
        self.path.start_new_figure();
    }

    pub fn current_figure(&self) -> &[Segment] {
        self.path.current_figure()
    }

    /// Replace curves by chords in place
    pub fn flatten(&mut self) {
        self.path = self.path.flatten();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arc_sweep_is_clamped() {
        let cubics = |sweep: f64| {
            let mut path = Path::new();
            path.arc(PointF::new(0.0, 0.0), 5.0, 5.0, 0.0, sweep, false);
            path.segments()
                .iter()
                .filter(|s| matches!(s, Segment::CubicTo(..)))
                .count()
        };
        assert_eq!(cubics(100.0 * TAU), 4);
        assert_eq!(cubics(-1e30), 4);
        assert_eq!(cubics(f64::NAN), 1);
    }

    #[test]
    fn test_simple_path() {
        let mut path = Path::new();
        path.move_to(PointF::new(10.0, 20.0));
        path.line_to(PointF::new(30.0, 40.0));
        path.close();
        assert_eq!(path.to_svg_data(), "M10 20L30 40z");
    }

    #[test]
    fn test_repeated_commands_are_elided() {
        let mut path = Path::new();
        path.move_to(PointF::new(0.0, 0.0));
        path.line_to(PointF::new(1.5, 0.0));
        path.line_to(PointF::new(1.5, 2.125));
        assert_eq!(path.to_svg_data(), "M0 0L1.5 0 1.5 2.13");
    }

    #[test]
    fn test_append_connect() {
        let mut path = Path::new();
        path.move_to(PointF::new(0.0, 0.0));
        let rect = Shape::Rect(RectF::new(10.0, 10.0, 5.0, 5.0));
        path.append(&rect.to_path(), true);
        assert_eq!(path.segments()[1], Segment::LineTo(PointF::new(10.0, 10.0)));

        let mut other = Path::new();
        other.append(&rect.to_path(), true);
        assert_eq!(other.segments()[0], Segment::MoveTo(PointF::new(10.0, 10.0)));
    }

    #[test]
    fn test_current_figure() {
        let mut buffer = PathBuffer::new();
        buffer.begin();
        buffer.move_to(PointF::new(0.0, 0.0));
        buffer.line_to(PointF::new(1.0, 0.0));
        buffer.close_figure();
        buffer.move_to(PointF::new(5.0, 5.0));
        buffer.line_to(PointF::new(6.0, 5.0));
        assert_eq!(buffer.current_figure().len(), 2);
        assert!(buffer.is_open());
        let path = buffer.take();
        assert!(!buffer.is_open());
        assert_eq!(path.segments().len(), 5);
    }

    #[test]
    fn test_full_ellipse_bounds() {
        let path = Shape::Ellipse(RectF::new(0.0, 0.0, 20.0, 10.0)).to_path();
        let b = path.bounds().unwrap();
        assert!((b.x - 0.0).abs() < 1e-9 && (b.width - 20.0).abs() < 1e-9);
        // quarter-turn pieces keep control points on the bounding box
        assert!((b.height - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_arc_sweep_direction() {
        assert!((arc_sweep(0.0, FRAC_PI_2, true) - FRAC_PI_2).abs() < 1e-12);
        assert!((arc_sweep(0.0, FRAC_PI_2, false) + 3.0 * FRAC_PI_2).abs() < 1e-12);
        assert!((arc_sweep(1.0, 1.0, true) - TAU).abs() < 1e-12);
        assert!((arc_sweep(1.0, 1.0, false) + TAU).abs() < 1e-12);
    }

    #[test]
    fn test_flatten_removes_curves() {
        let mut path = Path::new();
        path.arc(PointF::new(0.0, 0.0), 10.0, 10.0, 0.0, PI, false);
        let flat = path.flatten();
        assert!(
            flat.segments()
                .iter()
                .all(|s| !matches!(s, Segment::CubicTo(..)))
        );
        let end = flat.current_point().unwrap();
        assert!((end.x + 10.0).abs() < 1e-9 && end.y.abs() < 1e-9);
    }
}

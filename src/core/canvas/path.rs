//! Procedurally generated path geometry.
//!
//! Paths are produced from the canvas size (plus seeded jitter) and are
//! immutable until the next resize, when the whole set is regenerated.

use fastrand::Rng;

use crate::core::geometry::{Point, Size};

/// Column (fraction of width) where circuit traces turn toward the centre.
pub const CIRCUIT_BEND_X: f64 = 0.42;

#[derive(Debug, Clone, PartialEq)]
pub enum Path {
    Polyline(Vec<Point>),
    Quadratic { from: Point, ctrl: Point, to: Point },
    Cubic {
        from: Point,
        c1: Point,
        c2: Point,
        to: Point,
    },
}

impl Path {
    /// Point at fraction `t` along the path.  Polylines are walked by arc
    /// length so signals move at constant speed across segments.
    pub fn point_at(&self, t: f64) -> Point {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Path::Polyline(points) => polyline_point_at(points, t),
            Path::Quadratic { from, ctrl, to } => {
                let u = 1.0 - t;
                *from * (u * u) + *ctrl * (2.0 * u * t) + *to * (t * t)
            }
            Path::Cubic { from, c1, c2, to } => {
                let u = 1.0 - t;
                *from * (u * u * u)
                    + *c1 * (3.0 * u * u * t)
                    + *c2 * (3.0 * u * t * t)
                    + *to * (t * t * t)
            }
        }
    }

    pub fn start(&self) -> Point {
        self.point_at(0.0)
    }

    pub fn end(&self) -> Point {
        self.point_at(1.0)
    }

    /// Points to stroke.  Polylines return their own vertices; curves are
    /// sampled into `segments` pieces.
    pub fn flatten(&self, segments: usize) -> Vec<Point> {
        match self {
            Path::Polyline(points) => points.clone(),
            _ => {
                let segments = segments.max(1);
                (0..=segments)
                    .map(|i| self.point_at(i as f64 / segments as f64))
                    .collect()
            }
        }
    }

    /// Approximate length (exact for polylines).
    pub fn length(&self) -> f64 {
        self.flatten(24)
            .windows(2)
            .map(|w| w[0].distance(w[1]))
            .sum()
    }
}

fn polyline_point_at(points: &[Point], t: f64) -> Point {
    match points {
        [] => Point::default(),
        [only] => *only,
        _ => {
            let total: f64 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
            if total <= 0.0 {
                return points[0];
            }
            let mut remaining = t * total;
            for w in points.windows(2) {
                let seg = w[0].distance(w[1]);
                if remaining <= seg && seg > 0.0 {
                    return w[0].lerp(w[1], remaining / seg);
                }
                remaining -= seg;
            }
            points[points.len() - 1]
        }
    }
}

// ───────────────────────────────────────── generators ────────

/// Builds a path set for a canvas of the given size.
pub trait PathGenerator: Send {
    fn generate(&self, size: Size, density: f64, rng: &mut Rng) -> Vec<Path>;

    /// Where signals converge, if the layout has such a point.
    fn focal_point(&self, _size: Size) -> Option<Point> {
        None
    }
}

/// How many paths a base count becomes at `density`; never zero.
pub fn scaled_count(base: usize, density: f64) -> usize {
    let density = if density.is_finite() { density.max(0.0) } else { 1.0 };
    ((base as f64 * density).round() as usize).max(1)
}

/// Right-angle PCB-style traces: in from the left edge, a bend at
/// [`CIRCUIT_BEND_X`], a 45° run toward the vertical centre, then out to a
/// pad.
#[derive(Debug, Clone)]
pub struct CircuitTraces {
    pub base_count: usize,
}

impl Default for CircuitTraces {
    fn default() -> Self {
        Self { base_count: 14 }
    }
}

impl PathGenerator for CircuitTraces {
    fn generate(&self, size: Size, density: f64, rng: &mut Rng) -> Vec<Path> {
        if size.is_empty() {
            return Vec::new();
        }
        let count = scaled_count(self.base_count, density);
        let spacing = size.height / count as f64;
        let center_y = size.height / 2.0;
        let bend_x = size.width * CIRCUIT_BEND_X;

        (0..count)
            .map(|i| {
                let jitter = (rng.f64() - 0.5) * 0.6 * spacing;
                let y0 = ((i as f64 + 0.5) * spacing + jitter).clamp(0.0, size.height);
                let pull = 0.3 + rng.f64() * 0.4;
                let y1 = y0 + (center_y - y0) * pull;
                let diag_x = bend_x + (y1 - y0).abs().min(size.width * 0.2);
                let end_x = (size.width * (0.72 + rng.f64() * 0.23)).max(diag_x);
                Path::Polyline(vec![
                    Point::new(0.0, y0),
                    Point::new(bend_x, y0),
                    Point::new(diag_x, y1),
                    Point::new(end_x, y1),
                ])
            })
            .collect()
    }
}

/// Curved "axon" paths from the canvas edges into a shared focal point.
#[derive(Debug, Clone)]
pub struct NeuralPaths {
    pub base_count: usize,
    /// Focal point as fractions of width/height.
    pub focus: (f64, f64),
}

impl Default for NeuralPaths {
    fn default() -> Self {
        Self {
            base_count: 18,
            focus: (0.5, 0.5),
        }
    }
}

impl PathGenerator for NeuralPaths {
    fn generate(&self, size: Size, density: f64, rng: &mut Rng) -> Vec<Path> {
        if size.is_empty() {
            return Vec::new();
        }
        let count = scaled_count(self.base_count, density);
        let to = Point::new(size.width * self.focus.0, size.height * self.focus.1);

        (0..count)
            .map(|_| {
                let along = rng.f64();
                let from = match rng.usize(0..4) {
                    0 => Point::new(along * size.width, 0.0),
                    1 => Point::new(size.width, along * size.height),
                    2 => Point::new(along * size.width, size.height),
                    _ => Point::new(0.0, along * size.height),
                };
                let mid = from.lerp(to, 0.5);
                let dir = to - from;
                let normal = Point::new(-dir.y, dir.x);
                let bow = (rng.f64() - 0.5) * 0.5;
                Path::Quadratic {
                    from,
                    ctrl: mid + normal * bow,
                    to,
                }
            })
            .collect()
    }

    fn focal_point(&self, size: Size) -> Option<Point> {
        Some(Point::new(size.width * self.focus.0, size.height * self.focus.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        a.distance(b) < 1e-9
    }

    #[test]
    fn polyline_walks_by_arc_length() {
        let path = Path::Polyline(vec![
            Point::new(0.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(30.0, 10.0),
        ]);
        assert_eq!(path.length(), 40.0);
        assert!(close(path.point_at(0.5), Point::new(20.0, 0.0)));
        assert!(close(path.point_at(0.875), Point::new(30.0, 5.0)));
        assert!(close(path.end(), Point::new(30.0, 10.0)));
    }

    #[test]
    fn curves_hit_their_endpoints() {
        let quad = Path::Quadratic {
            from: Point::new(0.0, 0.0),
            ctrl: Point::new(50.0, 100.0),
            to: Point::new(100.0, 0.0),
        };
        assert!(close(quad.start(), Point::new(0.0, 0.0)));
        assert!(close(quad.end(), Point::new(100.0, 0.0)));
        assert!(close(quad.point_at(0.5), Point::new(50.0, 50.0)));

        let cubic = Path::Cubic {
            from: Point::new(0.0, 0.0),
            c1: Point::new(0.0, 10.0),
            c2: Point::new(10.0, 10.0),
            to: Point::new(10.0, 0.0),
        };
        assert!(close(cubic.end(), Point::new(10.0, 0.0)));
        assert_eq!(cubic.flatten(8).len(), 9);
    }

    #[test]
    fn degenerate_polylines_do_not_panic() {
        assert_eq!(Path::Polyline(vec![]).point_at(0.3), Point::default());
        let p = Point::new(4.0, 4.0);
        assert_eq!(Path::Polyline(vec![p, p]).point_at(0.7), p);
    }

    #[test]
    fn circuit_bend_scales_with_width() {
        let traces = CircuitTraces::default();
        let narrow = traces.generate(Size::new(1000.0, 600.0), 1.0, &mut Rng::with_seed(7));
        let wide = traces.generate(Size::new(2000.0, 600.0), 1.0, &mut Rng::with_seed(7));
        assert_eq!(narrow.len(), wide.len());
        for (n, w) in narrow.iter().zip(&wide) {
            let (Path::Polyline(n), Path::Polyline(w)) = (n, w) else {
                panic!("circuit traces are polylines");
            };
            assert!((n[1].x - 420.0).abs() < 1e-9);
            assert!((w[1].x - 840.0).abs() < 1e-9);
        }
    }

    #[test]
    fn density_scales_path_count() {
        let traces = CircuitTraces { base_count: 10 };
        let size = Size::new(800.0, 400.0);
        assert_eq!(traces.generate(size, 1.0, &mut Rng::with_seed(1)).len(), 10);
        assert_eq!(traces.generate(size, 0.5, &mut Rng::with_seed(1)).len(), 5);
        assert_eq!(traces.generate(size, 0.0, &mut Rng::with_seed(1)).len(), 1);
    }

    #[test]
    fn neural_paths_converge_on_focus() {
        let neural = NeuralPaths::default();
        let size = Size::new(640.0, 480.0);
        let focus = neural.focal_point(size).expect("focal point");
        for path in neural.generate(size, 1.0, &mut Rng::with_seed(3)) {
            assert!(close(path.end(), focus));
        }
    }

    #[test]
    fn empty_canvas_has_no_paths() {
        let size = Size::new(0.0, 300.0);
        assert!(CircuitTraces::default().generate(size, 1.0, &mut Rng::new()).is_empty());
        assert!(NeuralPaths::default().generate(size, 1.0, &mut Rng::new()).is_empty());
    }
}

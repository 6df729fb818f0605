use super::core::{Point3, Vec3};

/// A parametric curve over the unit domain `[0, 1]`.
pub trait Curve3 {
    fn point_at(&self, t: f64) -> Point3;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line3 {
    pub start: Point3,
    pub end: Point3,
}

impl Line3 {
    #[must_use]
    pub const fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn direction(self) -> Vec3 {
        self.end.sub_point(self.start)
    }
}

impl Curve3 for Line3 {
    fn point_at(&self, t: f64) -> Point3 {
        let t = t.clamp(0.0, 1.0);
        if t == 1.0 {
            return self.end;
        }
        self.start.add_vec(self.direction().mul_scalar(t))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticBezier3 {
    pub p0: Point3,
    pub p1: Point3,
    pub p2: Point3,
}

impl QuadraticBezier3 {
    #[must_use]
    pub const fn new(p0: Point3, p1: Point3, p2: Point3) -> Self {
        Self { p0, p1, p2 }
    }
}

impl Curve3 for QuadraticBezier3 {
    fn point_at(&self, t: f64) -> Point3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        point_weighted_sum(&[
            (self.p0, u * u),
            (self.p1, 2.0 * u * t),
            (self.p2, t * t),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier3 {
    pub p0: Point3,
    pub p1: Point3,
    pub p2: Point3,
    pub p3: Point3,
}

impl CubicBezier3 {
    #[must_use]
    pub const fn new(p0: Point3, p1: Point3, p2: Point3, p3: Point3) -> Self {
        Self { p0, p1, p2, p3 }
    }
}

impl Curve3 for CubicBezier3 {
    fn point_at(&self, t: f64) -> Point3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let u2 = u * u;
        let t2 = t * t;
        point_weighted_sum(&[
            (self.p0, u2 * u),
            (self.p1, 3.0 * u2 * t),
            (self.p2, 3.0 * u * t2),
            (self.p3, t2 * t),
        ])
    }
}

/// Samples `steps + 1` points at uniform parameter spacing, endpoints included.
#[must_use]
pub fn tessellate_curve_uniform(curve: &impl Curve3, steps: usize) -> Vec<Point3> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| curve.point_at(i as f64 / steps as f64))
        .collect()
}

/// Sum of the chord lengths between consecutive points.
#[must_use]
pub fn polyline_length(points: &[Point3]) -> f64 {
    points
        .windows(2)
        .map(|pair| pair[1].distance_to(pair[0]))
        .sum()
}

fn point_weighted_sum(terms: &[(Point3, f64)]) -> Point3 {
    let (x, y, z) = terms.iter().fold((0.0, 0.0, 0.0), |(x, y, z), (p, w)| {
        (x + p.x * w, y + p.y * w, z + p.z * w)
    });
    Point3::new(x, y, z)
}

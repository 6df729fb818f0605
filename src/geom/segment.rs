//! One authored stretch of a scene path.
//!
//! The curve kind is never stored separately: it follows from how many
//! control points the segment carries (none, one or two).

use serde::{Deserialize, Serialize};

use super::core::Point3;
use super::curve::{CubicBezier3, Curve3, Line3, QuadraticBezier3, tessellate_curve_uniform};

/// Semantic label attached to a segment by the scene author.
///
/// Tags do not influence sampling; hosts use them to pick decorations
/// (bridges, tunnels, orbit legs) for the stretch under the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentTag {
    #[default]
    Track,
    Bridge,
    Tunnel,
    Station,
    Orbit,
}

impl SegmentTag {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Track => "track",
            Self::Bridge => "bridge",
            Self::Tunnel => "tunnel",
            Self::Station => "station",
            Self::Orbit => "orbit",
        }
    }
}

/// Evaluable shape of a segment, derived from its control points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentShape {
    Line(Line3),
    Quadratic(QuadraticBezier3),
    Cubic(CubicBezier3),
}

impl Curve3 for SegmentShape {
    fn point_at(&self, t: f64) -> Point3 {
        match self {
            Self::Line(curve) => curve.point_at(t),
            Self::Quadratic(curve) => curve.point_at(t),
            Self::Cubic(curve) => curve.point_at(t),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSegment {
    pub start: Point3,
    pub end: Point3,
    pub control1: Option<Point3>,
    pub control2: Option<Point3>,
    pub tag: SegmentTag,
}

impl CurveSegment {
    #[must_use]
    pub const fn line(start: Point3, end: Point3) -> Self {
        Self {
            start,
            end,
            control1: None,
            control2: None,
            tag: SegmentTag::Track,
        }
    }

    #[must_use]
    pub const fn quadratic(start: Point3, control: Point3, end: Point3) -> Self {
        Self {
            start,
            end,
            control1: Some(control),
            control2: None,
            tag: SegmentTag::Track,
        }
    }

    #[must_use]
    pub const fn cubic(start: Point3, control1: Point3, control2: Point3, end: Point3) -> Self {
        Self {
            start,
            end,
            control1: Some(control1),
            control2: Some(control2),
            tag: SegmentTag::Track,
        }
    }

    #[must_use]
    pub const fn with_tag(mut self, tag: SegmentTag) -> Self {
        self.tag = tag;
        self
    }

    /// A lone `control2` is promoted to the quadratic control point.
    #[must_use]
    pub fn shape(&self) -> SegmentShape {
        match (self.control1, self.control2) {
            (Some(c1), Some(c2)) => {
                SegmentShape::Cubic(CubicBezier3::new(self.start, c1, c2, self.end))
            }
            (Some(c), None) | (None, Some(c)) => {
                SegmentShape::Quadratic(QuadraticBezier3::new(self.start, c, self.end))
            }
            (None, None) => SegmentShape::Line(Line3::new(self.start, self.end)),
        }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.start.is_finite()
            && self.end.is_finite()
            && self.control1.is_none_or(Point3::is_finite)
            && self.control2.is_none_or(Point3::is_finite)
    }

    /// Polyline approximation with `steps` chords.
    #[must_use]
    pub fn tessellate(&self, steps: usize) -> Vec<Point3> {
        tessellate_curve_uniform(&self.shape(), steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_count_selects_shape() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(4.0, 0.0, 0.0);
        let c = Point3::new(2.0, 2.0, 0.0);

        assert!(matches!(CurveSegment::line(a, b).shape(), SegmentShape::Line(_)));
        assert!(matches!(
            CurveSegment::quadratic(a, c, b).shape(),
            SegmentShape::Quadratic(_)
        ));
        assert!(matches!(
            CurveSegment::cubic(a, c, c, b).shape(),
            SegmentShape::Cubic(_)
        ));

        let only_second = CurveSegment {
            control2: Some(c),
            ..CurveSegment::line(a, b)
        };
        assert!(matches!(only_second.shape(), SegmentShape::Quadratic(_)));
    }

    #[test]
    fn tessellation_keeps_anchors() {
        let segment = CurveSegment::quadratic(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(5.0, 0.0, 5.0),
            Point3::new(10.0, 0.0, 0.0),
        );
        let points = segment.tessellate(20);
        assert_eq!(points.len(), 21);
        assert_eq!(points[0], segment.start);
        assert_eq!(points[20], segment.end);
    }

    #[test]
    fn non_finite_control_is_detected() {
        let segment = CurveSegment::quadratic(
            Point3::ORIGIN,
            Point3::new(f64::NAN, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        );
        assert!(!segment.is_finite());
        assert!(CurveSegment::line(Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0)).is_finite());
    }
}

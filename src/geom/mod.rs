//! Geometry primitives and the path sampler shared by both scenes.

mod core;
mod curve;
mod path;
mod segment;

pub use self::core::{Point3, Tolerance, Vec3};
pub use curve::{
    CubicBezier3, Curve3, Line3, QuadraticBezier3, polyline_length, tessellate_curve_uniform,
};
pub use path::{Path, PathError, SegmentCursor, clamp_progress};
pub use segment::{CurveSegment, SegmentShape, SegmentTag};

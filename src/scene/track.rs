//! Railway geometry generated from the path centreline.

use serde::Serialize;

use crate::geom::{Path, Point3, Tolerance, Vec3};
use crate::quality::{QualityTier, TierTable};

/// Multiplier on the authored tie spacing. Cheaper tiers space ties wider.
pub const TIE_SPACING_SCALE: TierTable<f64> = TierTable::new(2.0, 1.4, 1.0);

/// Smallest usable tie spacing. Non-zero spacings below it are raised to it.
pub const MIN_TIE_SPACING: f64 = 0.1;

/// Upper bound on ties for one track, however long.
pub const MAX_TIES: usize = 10_000;

/// One sleeper: centre position plus yaw about the world up axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TieInstance {
    pub position: [f64; 3],
    pub yaw: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackGeometry {
    pub centerline: Vec<[f64; 3]>,
    pub left_rail: Vec<[f64; 3]>,
    pub right_rail: Vec<[f64; 3]>,
    pub ties: Vec<TieInstance>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackStyle {
    /// Distance between the two rails.
    pub gauge: f64,
    /// Tie spacing at the highest tier.
    pub tie_spacing: f64,
}

impl Default for TrackStyle {
    fn default() -> Self {
        Self {
            gauge: 1.2,
            tie_spacing: 0.8,
        }
    }
}

/// Builds rails and ties once for a path. Rails are offset sideways in the
/// horizontal plane so banking never tilts the gauge.
#[must_use]
pub fn build_track(path: &Path, style: TrackStyle, tier: QualityTier) -> TrackGeometry {
    let centerline = path.joined_points();
    let half_gauge = style.gauge.abs() * 0.5;
    let tangents = polyline_tangents(&centerline);

    let mut left_rail = Vec::with_capacity(centerline.len());
    let mut right_rail = Vec::with_capacity(centerline.len());
    let mut last_side = Vec3::X;
    for (point, tangent) in centerline.iter().zip(&tangents) {
        let side = horizontal_side(*tangent).unwrap_or(last_side);
        last_side = side;
        left_rail.push(point.add_vec(side.mul_scalar(half_gauge)).to_array());
        right_rail.push(point.add_vec(side.mul_scalar(-half_gauge)).to_array());
    }

    let spacing = style.tie_spacing * TIE_SPACING_SCALE.get(tier);
    let ties = place_ties(&centerline, spacing);

    log::debug!(
        "track built: {} centreline points, {} ties ({})",
        centerline.len(),
        ties.len(),
        tier.as_str()
    );

    TrackGeometry {
        centerline: centerline.iter().map(|p| p.to_array()).collect(),
        left_rail,
        right_rail,
        ties,
    }
}

/// Ties every `spacing` units of arc length, the first half a spacing in.
/// Stops at `MAX_TIES`.
fn place_ties(points: &[Point3], spacing: f64) -> Vec<TieInstance> {
    if !spacing.is_finite() || spacing <= 0.0 {
        return Vec::new();
    }
    let spacing = spacing.max(MIN_TIE_SPACING);

    let mut ties = Vec::new();
    let mut next = spacing * 0.5;
    let mut walked = 0.0;
    for pair in points.windows(2) {
        let chord = pair[1].sub_point(pair[0]);
        let length = chord.length();
        if Tolerance::ZERO_LENGTH.is_zero_length(length) {
            continue;
        }
        let yaw = chord.yaw();
        while next <= walked + length {
            if ties.len() == MAX_TIES {
                log::warn!("tie limit of {MAX_TIES} reached, track end left bare");
                return ties;
            }
            let local = (next - walked) / length;
            ties.push(TieInstance {
                position: pair[0].lerp(pair[1], local).to_array(),
                yaw,
            });
            next += spacing;
        }
        walked += length;
    }
    ties
}

fn polyline_tangents(points: &[Point3]) -> Vec<Vec3> {
    let last = points.len().saturating_sub(1);
    (0..points.len())
        .map(|i| {
            let prev = points[i.saturating_sub(1)];
            let next = points[(i + 1).min(last)];
            next.sub_point(prev)
        })
        .collect()
}

/// Unit vector to the left of `tangent` in the XZ plane.
fn horizontal_side(tangent: Vec3) -> Option<Vec3> {
    Vec3::new(tangent.z, 0.0, -tangent.x).normalized()
}

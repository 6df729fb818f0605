//! Connection lines between constellation stars and the markers that flow
//! along them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::geom::{Curve3, Point3, QuadraticBezier3, tessellate_curve_uniform};
use crate::quality::{QualityTier, TierTable};

use super::node::{NodeId, NodeSet};

/// Samples per connection curve.
pub const CONNECTION_SAMPLES: TierTable<usize> = TierTable::new(20, 30, 50);

/// Flow markers riding each link. The overlay is off on the lowest tier.
pub const FLOW_MARKERS_PER_LINK: TierTable<usize> = TierTable::new(0, 1, 2);

/// Inward pull of the control point, as a share of the endpoint distance.
pub const CURVE_PULL: f64 = 0.15;

/// Share of a marker's run spent fading in (and, mirrored, fading out).
const FLOW_FADE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStrength {
    Primary,
    #[default]
    Secondary,
}

impl LinkStrength {
    #[must_use]
    pub const fn opacity(self) -> f64 {
        match self {
            Self::Primary => 0.8,
            Self::Secondary => 0.35,
        }
    }

    #[must_use]
    pub const fn width(self) -> f64 {
        match self {
            Self::Primary => 2.0,
            Self::Secondary => 1.0,
        }
    }

    /// Seconds for one marker to travel the whole link.
    #[must_use]
    pub const fn flow_period(self) -> f64 {
        match self {
            Self::Primary => 2.5,
            Self::Secondary => 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionLink {
    pub from: NodeId,
    pub to: NodeId,
    pub strength: LinkStrength,
}

impl ConnectionLink {
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>, strength: LinkStrength) -> Self {
        Self {
            from: NodeId::new(from),
            to: NodeId::new(to),
            strength,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionCurve {
    pub from: String,
    pub to: String,
    pub strength: LinkStrength,
    pub points: Vec<[f64; 3]>,
    pub opacity: f64,
    pub width: f64,
    #[serde(skip)]
    pub curve: QuadraticBezier3,
}

/// Midpoint of `a`..`b` moved towards `origin` by `CURVE_PULL` of the
/// endpoint distance. A midpoint sitting on the origin stays put.
#[must_use]
pub fn connection_control_point(a: Point3, b: Point3, origin: Point3) -> Point3 {
    let mid = a.midpoint(b);
    let inward = origin.sub_point(mid);
    let Some(direction) = inward.normalized() else {
        return mid;
    };
    mid.add_vec(direction.mul_scalar(a.distance_to(b) * CURVE_PULL))
}

/// Builds one curve per valid link. Links naming unknown nodes, self links
/// and repeated pairs are skipped.
#[must_use]
pub fn build_connections(
    nodes: &NodeSet,
    links: &[ConnectionLink],
    origin: Point3,
    tier: QualityTier,
) -> Vec<ConnectionCurve> {
    let samples = CONNECTION_SAMPLES.get(tier);
    let mut seen = HashSet::new();
    let mut curves = Vec::with_capacity(links.len());

    for link in links {
        let (Some(a), Some(b)) = (nodes.get(&link.from), nodes.get(&link.to)) else {
            log::warn!("skipping link {} -> {}: unknown node", link.from, link.to);
            continue;
        };
        if a.id == b.id {
            log::warn!("skipping self link on {}", a.id);
            continue;
        }
        let key = if a.id < b.id {
            (a.id.clone(), b.id.clone())
        } else {
            (b.id.clone(), a.id.clone())
        };
        if !seen.insert(key) {
            log::debug!("skipping repeated link {} -> {}", a.id, b.id);
            continue;
        }

        let control = connection_control_point(a.position, b.position, origin);
        let curve = QuadraticBezier3::new(a.position, control, b.position);
        curves.push(ConnectionCurve {
            from: a.id.to_string(),
            to: b.id.to_string(),
            strength: link.strength,
            points: tessellate_curve_uniform(&curve, samples)
                .into_iter()
                .map(Point3::to_array)
                .collect(),
            opacity: link.strength.opacity(),
            width: link.strength.width(),
            curve,
        });
    }

    log::debug!("constellation: {} connection curves at {samples} samples", curves.len());
    curves
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlowMarker {
    pub position: [f64; 3],
    pub opacity: f64,
}

/// Opacity envelope over a marker's run: ramps up near `t = 0`, down near
/// `t = 1`, full in between.
#[must_use]
pub fn flow_fade(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    (t / FLOW_FADE).min((1.0 - t) / FLOW_FADE).min(1.0)
}

/// Marker positions at `elapsed` seconds. Markers on one link are spread
/// evenly over its period and evaluated on the curve itself.
#[must_use]
pub fn flow_markers(curves: &[ConnectionCurve], elapsed: f64, tier: QualityTier) -> Vec<FlowMarker> {
    let per_link = FLOW_MARKERS_PER_LINK.get(tier);
    if per_link == 0 || !elapsed.is_finite() {
        return Vec::new();
    }

    let mut markers = Vec::with_capacity(curves.len() * per_link);
    for curve in curves {
        let period = curve.strength.flow_period();
        for slot in 0..per_link {
            let phase = (elapsed / period + slot as f64 / per_link as f64).rem_euclid(1.0);
            markers.push(FlowMarker {
                position: curve.curve.point_at(phase).to_array(),
                opacity: flow_fade(phase) * curve.opacity,
            });
        }
    }
    markers
}

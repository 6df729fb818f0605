//! The two authored scenes shipped with the engine.

use std::collections::BTreeMap;

use crate::document::{LinkSpec, LookAtSpec, NodeSpec, SceneConfig, SceneDocument, SegmentSpec};
use crate::geom::SegmentTag;
use crate::scene::constellation::LinkStrength;
use crate::scene::director::SceneKind;
use crate::scene::particles::ParticleMotion;

/// Cubic handle length for a quarter circle of unit radius.
const QUARTER_ARC_HANDLE: f64 = 0.552_284_749_831;

const ORBIT_RADIUS: f64 = 32.0;
const ORBIT_HEIGHT: f64 = 10.0;

fn segment(start: [f64; 3], end: [f64; 3], tag: SegmentTag) -> SegmentSpec {
    SegmentSpec {
        start,
        end,
        control1: None,
        control2: None,
        tag,
    }
}

fn curve(start: [f64; 3], control: [f64; 3], end: [f64; 3], tag: SegmentTag) -> SegmentSpec {
    SegmentSpec {
        control1: Some(control),
        ..segment(start, end, tag)
    }
}

fn node(id: &str, position: [f64; 3], category: &str, meta: &[(&str, &str)]) -> NodeSpec {
    NodeSpec {
        id: id.to_string(),
        position,
        category: category.to_string(),
        metadata: meta
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect::<BTreeMap<_, _>>(),
    }
}

fn link(from: &str, to: &str, strength: LinkStrength) -> LinkSpec {
    LinkSpec {
        from: from.to_string(),
        to: to.to_string(),
        strength,
    }
}

/// Scroll-driven railway: the train runs through six stations, crossing a
/// bridge and a tunnel on the way.
#[must_use]
pub fn journey_railway() -> SceneDocument {
    let segments = vec![
        segment([0.0, 0.0, 0.0], [0.0, 0.0, -24.0], SegmentTag::Station),
        curve([0.0, 0.0, -24.0], [0.0, 0.0, -40.0], [16.0, 0.0, -44.0], SegmentTag::Track),
        curve([16.0, 0.0, -44.0], [28.0, 2.0, -47.0], [40.0, 2.0, -44.0], SegmentTag::Bridge),
        SegmentSpec {
            control1: Some([52.0, 2.0, -41.0]),
            control2: Some([56.0, 0.0, -60.0]),
            ..segment([40.0, 2.0, -44.0], [44.0, 0.0, -76.0], SegmentTag::Track)
        },
        segment([44.0, 0.0, -76.0], [30.0, 0.0, -100.0], SegmentTag::Tunnel),
        curve([30.0, 0.0, -100.0], [20.0, 0.0, -118.0], [36.0, 0.0, -130.0], SegmentTag::Track),
        segment([36.0, 0.0, -130.0], [60.0, 0.0, -136.0], SegmentTag::Station),
    ];

    let nodes = vec![
        node("school", [-3.0, 0.0, -6.0], "education", &[("title", "School")]),
        node("university", [-3.0, 0.0, -30.0], "education", &[("title", "University")]),
        node("internship", [32.0, 2.0, -41.0], "work", &[("title", "Internship")]),
        node("first-job", [52.0, 0.0, -68.0], "work", &[("title", "First job")]),
        node("open-source", [24.0, 0.0, -112.0], "community", &[("title", "Open source")]),
        node("today", [58.0, 0.0, -132.0], "work", &[("title", "Today")]),
    ];

    log::debug!("preset: journey railway");
    SceneDocument {
        kind: SceneKind::Railway,
        segments,
        nodes,
        links: Vec::new(),
        config: SceneConfig {
            particle_count: 300,
            particle_motion: ParticleMotion::Rise,
            ..SceneConfig::default()
        },
    }
}

/// Closed circular orbit at `height`, built from four cubic quarter arcs.
fn orbit(radius: f64, height: f64) -> Vec<SegmentSpec> {
    let k = radius * QUARTER_ARC_HANDLE;
    let anchors = [
        [radius, height, 0.0],
        [0.0, height, radius],
        [-radius, height, 0.0],
        [0.0, height, -radius],
    ];
    // handle directions leaving each anchor counter-clockwise (seen from +Y)
    let tangents = [[0.0, 0.0, 1.0], [-1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [1.0, 0.0, 0.0]];

    (0..4)
        .map(|i| {
            let j = (i + 1) % 4;
            let (a, b) = (anchors[i], anchors[j]);
            let (ta, tb) = (tangents[i], tangents[j]);
            SegmentSpec {
                control1: Some([a[0] + ta[0] * k, height, a[2] + ta[2] * k]),
                control2: Some([b[0] - tb[0] * k, height, b[2] - tb[2] * k]),
                ..segment(a, b, SegmentTag::Orbit)
            }
        })
        .collect()
}

/// Time-driven constellation: the camera circles the technology stars while
/// always looking at the centre.
#[must_use]
pub fn tech_constellation() -> SceneDocument {
    let nodes = vec![
        node("rust", [0.0, 2.0, 0.0], "language", &[("title", "Rust")]),
        node("typescript", [9.0, 4.0, 5.0], "language", &[("title", "TypeScript")]),
        node("wasm", [-6.0, 5.0, 7.0], "runtime", &[("title", "WebAssembly")]),
        node("react", [12.0, -2.0, -6.0], "frontend", &[("title", "React")]),
        node("threejs", [4.0, 7.0, -11.0], "frontend", &[("title", "three.js")]),
        node("postgres", [-11.0, -3.0, -4.0], "data", &[("title", "PostgreSQL")]),
        node("docker", [-4.0, -6.0, 10.0], "infra", &[("title", "Docker")]),
    ];

    let links = vec![
        link("rust", "wasm", LinkStrength::Primary),
        link("rust", "postgres", LinkStrength::Primary),
        link("typescript", "react", LinkStrength::Primary),
        link("wasm", "typescript", LinkStrength::Primary),
        link("react", "threejs", LinkStrength::Secondary),
        link("rust", "docker", LinkStrength::Secondary),
        link("postgres", "docker", LinkStrength::Secondary),
        link("typescript", "threejs", LinkStrength::Secondary),
    ];

    log::debug!("preset: tech constellation");
    SceneDocument {
        kind: SceneKind::Constellation,
        segments: orbit(ORBIT_RADIUS, ORBIT_HEIGHT),
        nodes,
        links,
        config: SceneConfig {
            follow_offset: [0.0, 0.0, 0.0],
            look_at: LookAtSpec::Fixed {
                point: [0.0, 0.0, 0.0],
            },
            detail_offset: [0.0, 1.5, 5.0],
            time_period: 80.0,
            particle_count: 1500,
            particle_motion: ParticleMotion::Drift,
            ..SceneConfig::default()
        },
    }
}

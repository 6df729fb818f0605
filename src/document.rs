//! Serialisable scene description and its validation into runtime types.
//!
//! Hosts hand a [`SceneDocument`] over from JS; every config field has a
//! default so a document only needs segments (and nodes to be useful).

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::geom::{CurveSegment, PathError, Point3, SegmentTag, Vec3};
use crate::quality::QualityTier;
use crate::scene::camera::{CameraRig, Easing, LookAtMode};
use crate::scene::constellation::{ConnectionLink, LinkStrength};
use crate::scene::director::{ParticleSettings, SceneDirector, SceneKind, SceneSetup};
use crate::scene::node::{NodeError, NodeSet, SceneNode};
use crate::scene::particles::{MAX_PARTICLES, ParticleMotion};
use crate::scene::progress::ProgressDriver;
use crate::scene::track::{MIN_TIE_SPACING, TrackStyle};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DocumentError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Node(#[from] NodeError),
    #[error("config field `{field}` is invalid: {value}")]
    InvalidConfig { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSpec {
    pub start: [f64; 3],
    pub end: [f64; 3],
    #[serde(default)]
    pub control1: Option<[f64; 3]>,
    #[serde(default)]
    pub control2: Option<[f64; 3]>,
    #[serde(default)]
    pub tag: SegmentTag,
}

impl From<&SegmentSpec> for CurveSegment {
    fn from(spec: &SegmentSpec) -> Self {
        Self {
            start: Point3::from_array(spec.start),
            end: Point3::from_array(spec.end),
            control1: spec.control1.map(Point3::from_array),
            control2: spec.control2.map(Point3::from_array),
            tag: spec.tag,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    pub id: String,
    pub position: [f64; 3],
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSpec {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub strength: LinkStrength,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum LookAtSpec {
    #[default]
    Target,
    Fixed {
        point: [f64; 3],
    },
}

/// Tuning knobs shared by both scene kinds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneConfig {
    pub follow_offset: [f64; 3],
    pub look_at: LookAtSpec,
    /// Share of the remaining distance covered per 60 Hz frame in follow mode.
    pub smoothing: f64,
    pub detail_offset: [f64; 3],
    pub enter_duration: f64,
    pub exit_duration: f64,
    pub easing: Easing,
    /// Seconds per revolution for time-driven scenes.
    pub time_period: f64,
    pub particle_count: usize,
    pub particle_seed: u64,
    pub particle_motion: ParticleMotion,
    pub track_gauge: f64,
    pub tie_spacing: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let rig = CameraRig::default();
        let track = TrackStyle::default();
        Self {
            follow_offset: rig.follow_offset.to_array(),
            look_at: LookAtSpec::Target,
            smoothing: rig.smoothing,
            detail_offset: rig.detail_offset.to_array(),
            enter_duration: rig.enter_duration,
            exit_duration: rig.exit_duration,
            easing: rig.easing,
            time_period: 60.0,
            particle_count: 400,
            particle_seed: 7,
            particle_motion: ParticleMotion::Drift,
            track_gauge: track.gauge,
            tie_spacing: track.tie_spacing,
        }
    }
}

impl SceneConfig {
    #[allow(clippy::cast_precision_loss)]
    fn validate(&self) -> Result<(), DocumentError> {
        let checks = [
            ("smoothing", self.smoothing, self.smoothing > 0.0 && self.smoothing <= 1.0),
            ("enterDuration", self.enter_duration, self.enter_duration >= 0.0),
            ("exitDuration", self.exit_duration, self.exit_duration >= 0.0),
            ("timePeriod", self.time_period, self.time_period > 0.0),
            ("trackGauge", self.track_gauge, self.track_gauge >= 0.0),
            // zero disables ties
            (
                "tieSpacing",
                self.tie_spacing,
                self.tie_spacing == 0.0 || self.tie_spacing >= MIN_TIE_SPACING,
            ),
            (
                "particleCount",
                self.particle_count as f64,
                self.particle_count <= MAX_PARTICLES,
            ),
        ];
        for (field, value, ok) in checks {
            if !value.is_finite() || !ok {
                return Err(DocumentError::InvalidConfig { field, value });
            }
        }

        let look_at = match self.look_at {
            LookAtSpec::Target => [0.0; 3],
            LookAtSpec::Fixed { point } => point,
        };
        let vectors = [
            ("followOffset", self.follow_offset),
            ("detailOffset", self.detail_offset),
            ("lookAt", look_at),
        ];
        for (field, vector) in vectors {
            if let Some(value) = vector.iter().copied().find(|v| !v.is_finite()) {
                return Err(DocumentError::InvalidConfig { field, value });
            }
        }
        Ok(())
    }

    fn rig(&self) -> CameraRig {
        CameraRig {
            follow_offset: Vec3::from_array(self.follow_offset),
            look_at: match self.look_at {
                LookAtSpec::Target => LookAtMode::Target,
                LookAtSpec::Fixed { point } => LookAtMode::Fixed(Point3::from_array(point)),
            },
            smoothing: self.smoothing,
            detail_offset: Vec3::from_array(self.detail_offset),
            enter_duration: self.enter_duration,
            exit_duration: self.exit_duration,
            easing: self.easing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    #[serde(default)]
    pub kind: SceneKind,
    pub segments: Vec<SegmentSpec>,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
    #[serde(default)]
    pub config: SceneConfig,
}

impl SceneDocument {
    /// Validates nodes and config. Railway scenes are scroll-driven,
    /// constellations rotate on the configured time period.
    ///
    /// # Errors
    /// Invalid config values, duplicate node ids and non-finite node
    /// positions.
    pub fn to_setup(&self) -> Result<SceneSetup, DocumentError> {
        self.config.validate()?;

        let nodes = NodeSet::new(
            self.nodes
                .iter()
                .map(|spec| SceneNode {
                    id: spec.id.as_str().into(),
                    position: Point3::from_array(spec.position),
                    category: spec.category.clone(),
                    metadata: spec.metadata.clone(),
                })
                .collect(),
        )?;

        let driver = match self.kind {
            SceneKind::Railway => ProgressDriver::scroll(),
            SceneKind::Constellation => ProgressDriver::time(self.config.time_period),
        };

        Ok(SceneSetup {
            kind: self.kind,
            segments: self.segments.iter().map(CurveSegment::from).collect(),
            nodes,
            links: self
                .links
                .iter()
                .map(|link| ConnectionLink::new(link.from.as_str(), link.to.as_str(), link.strength))
                .collect(),
            rig: self.config.rig(),
            driver,
            track: TrackStyle {
                gauge: self.config.track_gauge,
                tie_spacing: self.config.tie_spacing,
            },
            particles: ParticleSettings {
                base_count: self.config.particle_count,
                seed: self.config.particle_seed,
                motion: self.config.particle_motion,
            },
        })
    }

    /// # Errors
    /// Everything [`to_setup`](Self::to_setup) rejects, plus path errors.
    pub fn build(&self, tier: QualityTier) -> Result<SceneDirector, DocumentError> {
        let setup = self.to_setup()?;
        Ok(SceneDirector::new(setup, tier)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::director::StaticGeometry;

    fn parse(json: &str) -> SceneDocument {
        serde_json::from_str(json).expect("valid document json")
    }

    #[test]
    fn minimal_document_uses_defaults() {
        let doc = parse(r#"{ "segments": [ { "start": [0, 0, 0], "end": [10, 0, 0] } ] }"#);
        assert_eq!(doc.kind, SceneKind::Railway);
        assert_eq!(doc.config, SceneConfig::default());
        assert!((doc.config.smoothing - 0.05).abs() < 1e-12);

        let director = doc.build(QualityTier::Low).expect("scene");
        assert!(matches!(director.static_geometry(), StaticGeometry::Railway { .. }));
        assert!((director.path().total_length() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn full_document_round_trips_into_a_constellation() {
        let doc = parse(
            r#"{
                "kind": "constellation",
                "segments": [
                    { "start": [20, 4, 0], "end": [0, 4, 20], "control1": [20, 4, 11], "control2": [11, 4, 20], "tag": "orbit" },
                    { "start": [0, 4, 20], "end": [-20, 4, 0], "control1": [-11, 4, 20], "control2": [-20, 4, 11], "tag": "orbit" }
                ],
                "nodes": [
                    { "id": "rust", "position": [4, 1, 0], "category": "backend", "metadata": { "level": "daily" } },
                    { "id": "wasm", "position": [0, 1, 4] }
                ],
                "links": [ { "from": "rust", "to": "wasm", "strength": "primary" } ],
                "config": {
                    "followOffset": [0, 0, 0],
                    "lookAt": { "mode": "fixed", "point": [0, 1, 0] },
                    "easing": "easeOutCubic",
                    "timePeriod": 90,
                    "particleMotion": "drift"
                }
            }"#,
        );
        assert_eq!(doc.segments[0].tag, SegmentTag::Orbit);
        assert_eq!(doc.links[0].strength, LinkStrength::Primary);
        assert_eq!(doc.config.easing, Easing::EaseOutCubic);

        let setup = doc.to_setup().expect("valid");
        assert_eq!(setup.rig.look_at, LookAtMode::Fixed(Point3::new(0.0, 1.0, 0.0)));
        assert!(matches!(setup.driver, ProgressDriver::Time(driver) if driver.period() == 90.0));
        assert_eq!(setup.nodes.len(), 2);

        let director = doc.build(QualityTier::Medium).expect("scene");
        match director.static_geometry() {
            StaticGeometry::Constellation { connections, .. } => assert_eq!(connections.len(), 1),
            other => panic!("expected constellation, got {other:?}"),
        }
    }

    #[test]
    fn empty_segments_surface_as_path_error() {
        let doc = parse(r#"{ "segments": [] }"#);
        assert_eq!(
            doc.build(QualityTier::High).err(),
            Some(DocumentError::Path(PathError::Empty))
        );
    }

    #[test]
    fn duplicate_nodes_surface_as_node_error() {
        let doc = parse(
            r#"{
                "segments": [ { "start": [0, 0, 0], "end": [1, 0, 0] } ],
                "nodes": [ { "id": "a", "position": [0, 0, 0] }, { "id": "a", "position": [1, 0, 0] } ]
            }"#,
        );
        assert!(matches!(
            doc.to_setup(),
            Err(DocumentError::Node(NodeError::DuplicateId(_)))
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let doc = parse(
            r#"{
                "segments": [ { "start": [0, 0, 0], "end": [1, 0, 0] } ],
                "config": { "smoothing": 1.5 }
            }"#,
        );
        let err = doc.to_setup().err().expect("invalid smoothing");
        assert_eq!(
            err,
            DocumentError::InvalidConfig {
                field: "smoothing",
                value: 1.5
            }
        );
        assert_eq!(err.to_string(), "config field `smoothing` is invalid: 1.5");
    }

    #[test]
    fn scale_limits_are_enforced() {
        let doc = parse(
            r#"{
                "segments": [ { "start": [0, 0, 0], "end": [100, 0, 0] } ],
                "config": { "tieSpacing": 1e-5 }
            }"#,
        );
        assert_eq!(
            doc.to_setup().err(),
            Some(DocumentError::InvalidConfig {
                field: "tieSpacing",
                value: 1e-5
            })
        );

        let doc = parse(
            r#"{
                "segments": [ { "start": [0, 0, 0], "end": [100, 0, 0] } ],
                "config": { "particleCount": 1000000000 }
            }"#,
        );
        assert!(matches!(
            doc.to_setup().err(),
            Some(DocumentError::InvalidConfig { field: "particleCount", .. })
        ));

        let doc = parse(
            r#"{
                "segments": [ { "start": [0, 0, 0], "end": [100, 0, 0] } ],
                "config": { "tieSpacing": 0 }
            }"#,
        );
        assert!(doc.to_setup().is_ok());
    }
}

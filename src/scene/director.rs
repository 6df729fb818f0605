//! Per-scene glue: owns every runtime piece and runs the frame.
//!
//! Within one `update` the driver is advanced first, the path is sampled at
//! the driver's progress next, and the camera reads that sample last.
//! Selection input is applied between frames and only ever reaches the
//! camera through a [`SelectionEffect`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geom::{CurveSegment, Path, PathError, Point3, SegmentTag};
use crate::quality::{QualityTier, TierTable};

use super::camera::{CameraChoreographer, CameraEvent, CameraPose, CameraRig};
use super::constellation::{ConnectionCurve, ConnectionLink, FlowMarker, build_connections, flow_markers};
use super::node::{NodeId, NodeSet};
use super::particles::{ParticleField, ParticleMotion, ParticleSample, ParticleVolume};
use super::progress::ProgressDriver;
use super::selection::{SelectionEffect, SelectionMachine, SelectionState};
use super::track::{TrackGeometry, TrackStyle, build_track};

/// Chords per segment when tessellating the scene path.
pub const PATH_TESSELLATION_STEPS: TierTable<usize> = TierTable::new(20, 60, 100);

/// Extra room around the scene bounds for the particle volume.
const PARTICLE_PADDING: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SceneKind {
    #[default]
    Railway,
    Constellation,
}

impl SceneKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Railway => "railway",
            Self::Constellation => "constellation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSettings {
    pub base_count: usize,
    pub seed: u64,
    pub motion: ParticleMotion,
}

/// Everything needed to assemble a scene, already validated apart from the
/// path itself.
#[derive(Debug, Clone)]
pub struct SceneSetup {
    pub kind: SceneKind,
    pub segments: Vec<CurveSegment>,
    pub nodes: NodeSet,
    pub links: Vec<ConnectionLink>,
    pub rig: CameraRig,
    pub driver: ProgressDriver,
    pub track: TrackStyle,
    pub particles: ParticleSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeExport {
    pub id: String,
    pub position: [f64; 3],
    pub category: String,
    pub metadata: BTreeMap<String, String>,
}

/// Geometry built once at mount.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StaticGeometry {
    Railway {
        tier: QualityTier,
        track: TrackGeometry,
        nodes: Vec<NodeExport>,
    },
    Constellation {
        tier: QualityTier,
        orbit: Vec<[f64; 3]>,
        connections: Vec<ConnectionCurve>,
        nodes: Vec<NodeExport>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseExport {
    pub position: [f64; 3],
    pub look_at: [f64; 3],
}

impl From<CameraPose> for PoseExport {
    fn from(pose: CameraPose) -> Self {
        Self {
            position: pose.position.to_array(),
            look_at: pose.look_at.to_array(),
        }
    }
}

/// Object carried along the path (the train, or the orbit anchor).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoverState {
    pub position: [f64; 3],
    pub heading: [f64; 3],
    pub yaw: f64,
    pub segment_index: usize,
    pub segment_tag: SegmentTag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FrameEvent {
    DetailReached { node: String },
    FollowResumed,
}

impl From<CameraEvent> for FrameEvent {
    fn from(event: CameraEvent) -> Self {
        match event {
            CameraEvent::DetailReached(node) => Self::DetailReached {
                node: node.to_string(),
            },
            CameraEvent::FollowResumed => Self::FollowResumed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameState {
    pub progress: f64,
    pub camera: PoseExport,
    pub camera_mode: &'static str,
    pub mover: MoverState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_node: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovered: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<FrameEvent>,
}

#[derive(Debug, Clone)]
pub struct SceneDirector {
    kind: SceneKind,
    tier: QualityTier,
    path: Path,
    nodes: NodeSet,
    selection: SelectionMachine,
    camera: CameraChoreographer,
    driver: ProgressDriver,
    geometry: StaticGeometry,
    connections: Vec<ConnectionCurve>,
    particles: ParticleField,
    elapsed: f64,
    torn_down: bool,
}

impl SceneDirector {
    /// Builds the path at the tier's tessellation density plus all static
    /// geometry, and places the camera at the follow pose for `t = 0`.
    ///
    /// # Errors
    /// Fails only when the path cannot be built.
    pub fn new(setup: SceneSetup, tier: QualityTier) -> Result<Self, PathError> {
        let SceneSetup {
            kind,
            segments,
            nodes,
            links,
            rig,
            driver,
            track,
            particles,
        } = setup;

        let path = Path::build(segments, PATH_TESSELLATION_STEPS.get(tier))?;
        let node_exports = export_nodes(&nodes);

        let (geometry, connections) = match kind {
            SceneKind::Railway => (
                StaticGeometry::Railway {
                    tier,
                    track: build_track(&path, track, tier),
                    nodes: node_exports,
                },
                Vec::new(),
            ),
            SceneKind::Constellation => {
                // curves bend toward the world origin whatever the camera looks at
                let connections = build_connections(&nodes, &links, Point3::ORIGIN, tier);
                (
                    StaticGeometry::Constellation {
                        tier,
                        orbit: path.joined_points().into_iter().map(Point3::to_array).collect(),
                        connections: connections.clone(),
                        nodes: node_exports,
                    },
                    connections,
                )
            }
        };

        let volume = ParticleVolume::enclosing(
            path.joined_points()
                .into_iter()
                .chain(nodes.iter().map(|node| node.position)),
            PARTICLE_PADDING,
        );
        let particles = ParticleField::scatter(
            particles.base_count,
            tier,
            volume,
            particles.motion,
            particles.seed,
        );

        let camera = CameraChoreographer::new(rig, path.position_at_progress(driver.progress()));

        log::debug!(
            "scene {} ready: {} segments, {} nodes, length {:.2}, tier {}",
            kind.as_str(),
            path.segments().len(),
            nodes.len(),
            path.total_length(),
            tier.as_str()
        );

        Ok(Self {
            kind,
            tier,
            path,
            nodes,
            selection: SelectionMachine::new(),
            camera,
            driver,
            geometry,
            connections,
            particles,
            elapsed: 0.0,
            torn_down: false,
        })
    }

    #[must_use]
    pub fn kind(&self) -> SceneKind {
        self.kind
    }

    #[must_use]
    pub fn tier(&self) -> QualityTier {
        self.tier
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn nodes(&self) -> &NodeSet {
        &self.nodes
    }

    #[must_use]
    pub fn camera(&self) -> &CameraChoreographer {
        &self.camera
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionState {
        self.selection.state()
    }

    #[must_use]
    pub fn selected_node(&self) -> Option<&NodeId> {
        self.selection.selected()
    }

    #[must_use]
    pub fn static_geometry(&self) -> &StaticGeometry {
        &self.geometry
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        self.driver.progress()
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Scroll input for scroll-bound scenes. Time-bound scenes ignore it.
    pub fn set_scroll(&mut self, scroll_offset: f64, document_height: f64, viewport_height: f64) {
        if self.torn_down {
            return;
        }
        self.driver
            .set_scroll(scroll_offset, document_height, viewport_height);
    }

    /// Runs one frame: driver, then path sample, then camera.
    pub fn update(&mut self, delta_seconds: f64) -> FrameState {
        if self.torn_down {
            return self.frame_state(None);
        }
        if delta_seconds.is_finite() && delta_seconds > 0.0 {
            self.elapsed += delta_seconds;
        }

        self.driver.advance(delta_seconds);
        let target = self.path.position_at_progress(self.driver.progress());
        let event = self.camera.update(delta_seconds, target);
        if let Some(event) = &event {
            log::debug!("frame event: {event:?}");
        }
        self.frame_state(event.map(FrameEvent::from))
    }

    /// Nearest node to the current follow target, by straight-line distance.
    #[must_use]
    pub fn active_node(&self) -> Option<&NodeId> {
        let target = self.path.position_at_progress(self.driver.progress());
        self.nodes.nearest_to(target).map(|node| &node.id)
    }

    pub fn pointer_enter(&mut self, id: &str) {
        if self.torn_down {
            return;
        }
        let Some(id) = self.known(id) else {
            return;
        };
        self.selection.pointer_enter(id);
    }

    pub fn pointer_leave(&mut self, id: &str) {
        if self.torn_down {
            return;
        }
        self.selection.pointer_leave(&NodeId::from(id));
    }

    /// Click or tap on a node. Unknown ids, and any input after teardown,
    /// are ignored. Returns whether the camera was asked to move.
    pub fn click(&mut self, id: &str) -> bool {
        if self.torn_down {
            return false;
        }
        let Some(id) = self.known(id) else {
            return false;
        };
        match self.selection.click(id) {
            Some(effect) => {
                self.apply(effect);
                true
            }
            None => false,
        }
    }

    /// Explicit close gesture. A no-op unless a node is selected.
    pub fn close_detail(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        match self.selection.close() {
            Some(effect) => {
                self.apply(effect);
                true
            }
            None => false,
        }
    }

    /// Flow marker positions at the current scene time. Empty for railway
    /// scenes.
    #[must_use]
    pub fn flow_markers(&self) -> Vec<FlowMarker> {
        flow_markers(&self.connections, self.elapsed, self.tier)
    }

    #[must_use]
    pub fn particles(&self) -> Vec<ParticleSample> {
        self.particles.sample(self.elapsed)
    }

    /// Unmount: any camera transition is cancelled with the saved pose
    /// restored, selection is dropped, and later updates no longer move
    /// anything.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        let restored = self.camera.cancel();
        self.selection.reset();
        self.driver.set_paused(false);
        self.torn_down = true;
        log::debug!("scene {} torn down (pose restored: {restored})", self.kind.as_str());
    }

    fn known(&self, id: &str) -> Option<NodeId> {
        let id = NodeId::from(id);
        if self.nodes.contains(&id) {
            Some(id)
        } else {
            log::debug!("ignoring pointer input for unknown node `{id}`");
            None
        }
    }

    fn apply(&mut self, effect: SelectionEffect) {
        match effect {
            SelectionEffect::EnterDetail(node) | SelectionEffect::SwitchDetail { to: node, .. } => {
                let Some(position) = self.nodes.get(&node).map(|n| n.position) else {
                    return;
                };
                self.driver.set_paused(true);
                self.camera.enter_detail(node, position);
            }
            SelectionEffect::ExitDetail(_) => {
                self.camera.exit_detail();
                self.driver.set_paused(false);
            }
        }
    }

    fn frame_state(&self, event: Option<FrameEvent>) -> FrameState {
        let progress = self.driver.progress();
        let cursor = self.path.segment_at_progress(progress);
        let heading = self.path.heading_at_progress(progress);
        FrameState {
            progress,
            camera: self.camera.pose().into(),
            camera_mode: self.camera.mode().name(),
            mover: MoverState {
                position: self.path.position_at_progress(progress).to_array(),
                heading: heading.to_array(),
                yaw: heading.yaw(),
                segment_index: cursor.index,
                segment_tag: cursor.tag,
            },
            active_node: self.active_node().map(ToString::to_string),
            hovered: self.selection.hovered().map(ToString::to_string),
            selected: self.selection.selected().map(ToString::to_string),
            event,
        }
    }
}

fn export_nodes(nodes: &NodeSet) -> Vec<NodeExport> {
    nodes
        .iter()
        .map(|node| NodeExport {
            id: node.id.to_string(),
            position: node.position.to_array(),
            category: node.category.clone(),
            metadata: node.metadata.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Vec3;
    use crate::scene::camera::{CameraMode, LookAtMode};
    use crate::scene::constellation::LinkStrength;
    use crate::scene::node::SceneNode;

    const FRAME: f64 = 1.0 / 60.0;

    fn railway() -> SceneSetup {
        SceneSetup {
            kind: SceneKind::Railway,
            segments: vec![
                CurveSegment::line(Point3::ORIGIN, Point3::new(10.0, 0.0, 0.0)),
                CurveSegment::line(Point3::new(10.0, 0.0, 0.0), Point3::new(10.0, 0.0, 10.0))
                    .with_tag(SegmentTag::Bridge),
            ],
            nodes: NodeSet::new(vec![
                SceneNode::new("school", Point3::new(0.0, 0.0, -2.0), "education"),
                SceneNode::new("job", Point3::new(10.0, 0.0, 8.0), "work"),
            ])
            .expect("valid nodes"),
            links: Vec::new(),
            rig: CameraRig::default(),
            driver: ProgressDriver::scroll(),
            track: TrackStyle::default(),
            particles: ParticleSettings {
                base_count: 100,
                seed: 3,
                motion: ParticleMotion::Rise,
            },
        }
    }

    fn constellation() -> SceneSetup {
        SceneSetup {
            kind: SceneKind::Constellation,
            segments: vec![
                CurveSegment::line(Point3::new(20.0, 5.0, 0.0), Point3::new(0.0, 5.0, 20.0)),
                CurveSegment::line(Point3::new(0.0, 5.0, 20.0), Point3::new(-20.0, 5.0, 0.0)),
            ],
            nodes: NodeSet::new(vec![
                SceneNode::new("rust", Point3::new(5.0, 0.0, 0.0), "backend"),
                SceneNode::new("wasm", Point3::new(0.0, 0.0, 5.0), "backend"),
            ])
            .expect("valid nodes"),
            links: vec![ConnectionLink::new("rust", "wasm", LinkStrength::Primary)],
            rig: CameraRig {
                follow_offset: Vec3::ZERO,
                look_at: LookAtMode::Fixed(Point3::ORIGIN),
                ..CameraRig::default()
            },
            driver: ProgressDriver::time(10.0),
            track: TrackStyle::default(),
            particles: ParticleSettings {
                base_count: 100,
                seed: 3,
                motion: ParticleMotion::Drift,
            },
        }
    }

    fn next_event(director: &mut SceneDirector) -> Option<FrameEvent> {
        (0..300).find_map(|_| director.update(FRAME).event)
    }

    #[test]
    fn empty_path_is_rejected() {
        let setup = SceneSetup {
            segments: Vec::new(),
            ..railway()
        };
        assert!(matches!(
            SceneDirector::new(setup, QualityTier::High),
            Err(PathError::Empty)
        ));
    }

    #[test]
    fn tier_drives_path_density() {
        let low = SceneDirector::new(railway(), QualityTier::Low).expect("scene");
        let high = SceneDirector::new(railway(), QualityTier::High).expect("scene");
        assert_eq!(low.path().polylines()[0].len(), 21);
        assert_eq!(high.path().polylines()[0].len(), 101);
        assert_eq!(low.particles().len(), 30);
        assert_eq!(high.particles().len(), 100);
    }

    #[test]
    fn scroll_moves_the_mover_and_camera_follows() {
        let mut director = SceneDirector::new(railway(), QualityTier::Medium).expect("scene");
        let start = director.update(FRAME);
        assert_eq!(start.mover.position, [0.0, 0.0, 0.0]);
        assert_eq!(start.active_node.as_deref(), Some("school"));

        director.set_scroll(900.0, 2000.0, 1000.0);
        let frame = director.update(FRAME);
        assert!((frame.progress - 0.9).abs() < 1e-12);
        assert!((frame.mover.position[0] - 10.0).abs() < 1e-9);
        assert!((frame.mover.position[2] - 8.0).abs() < 1e-9);
        assert_eq!(frame.mover.segment_index, 1);
        assert_eq!(frame.mover.segment_tag, SegmentTag::Bridge);
        assert_eq!(frame.active_node.as_deref(), Some("job"));
        assert_eq!(frame.camera_mode, "follow");
        // eased, not snapped
        assert!(frame.camera.position[0] < 10.0);
        assert!(frame.camera.position[0] > 0.0);
    }

    #[test]
    fn click_round_trip_restores_the_camera() {
        let mut director = SceneDirector::new(railway(), QualityTier::Medium).expect("scene");
        director.set_scroll(250.0, 2000.0, 1000.0);
        for _ in 0..30 {
            director.update(FRAME);
        }
        let before = director.camera().pose();

        assert!(director.click("job"));
        assert_eq!(
            next_event(&mut director),
            Some(FrameEvent::DetailReached {
                node: "job".to_string()
            })
        );
        assert_eq!(
            director.camera().mode(),
            &CameraMode::Detail {
                node: NodeId::from("job")
            }
        );

        assert!(director.close_detail());
        assert_eq!(next_event(&mut director), Some(FrameEvent::FollowResumed));
        assert_eq!(director.camera().pose(), before);
        assert!(director.camera().saved_pose().is_none());
    }

    #[test]
    fn unknown_nodes_are_ignored() {
        let mut director = SceneDirector::new(railway(), QualityTier::Low).expect("scene");
        director.pointer_enter("nowhere");
        assert!(!director.click("nowhere"));
        assert_eq!(director.selection(), &SelectionState::Idle);
        assert!(!director.close_detail());
    }

    #[test]
    fn time_driver_pauses_while_selected() {
        let mut director = SceneDirector::new(constellation(), QualityTier::High).expect("scene");
        for _ in 0..60 {
            director.update(FRAME);
        }
        let before = director.progress();
        assert!(before > 0.0);

        director.click("rust");
        for _ in 0..60 {
            director.update(FRAME);
        }
        assert_eq!(director.progress(), before);

        director.close_detail();
        director.update(FRAME);
        assert!(director.progress() > before);
    }

    #[test]
    fn constellation_exports_connections_and_markers() {
        let director = SceneDirector::new(constellation(), QualityTier::High).expect("scene");
        match director.static_geometry() {
            StaticGeometry::Constellation { connections, nodes, .. } => {
                assert_eq!(connections.len(), 1);
                assert_eq!(connections[0].points.len(), 51);
                assert_eq!(nodes.len(), 2);
            }
            other => panic!("expected constellation geometry, got {other:?}"),
        }
        assert_eq!(director.flow_markers().len(), 2);
        assert_eq!(director.camera().pose().look_at, Point3::ORIGIN);
    }

    #[test]
    fn teardown_mid_tween_restores_and_freezes() {
        let mut director = SceneDirector::new(railway(), QualityTier::Medium).expect("scene");
        let before = director.camera().pose();
        director.click("school");
        for _ in 0..10 {
            director.update(FRAME);
        }
        assert_ne!(director.camera().pose(), before);

        director.teardown();
        assert!(director.is_torn_down());
        assert_eq!(director.camera().pose(), before);
        assert_eq!(director.selected_node(), None);

        director.set_scroll(1000.0, 2000.0, 1000.0);
        let frame = director.update(FRAME);
        assert_eq!(frame.camera.position, before.position.to_array());
        assert_eq!(frame.camera_mode, "follow");
        assert_eq!(frame.progress, 0.0);
    }

    #[test]
    fn input_after_teardown_is_dropped() {
        let mut director = SceneDirector::new(railway(), QualityTier::Medium).expect("scene");
        director.click("job");
        director.teardown();

        director.pointer_enter("school");
        assert!(!director.click("school"));
        assert!(!director.close_detail());
        assert_eq!(director.selection(), &SelectionState::Idle);

        let frame = director.update(FRAME);
        assert_eq!(frame.camera_mode, "follow");
        assert_eq!(frame.hovered, None);
        assert_eq!(frame.selected, None);
    }

    #[test]
    fn connections_bend_toward_the_world_origin() {
        let setup = SceneSetup {
            nodes: NodeSet::new(vec![
                SceneNode::new("rust", Point3::new(0.0, 0.0, 10.0), "backend"),
                SceneNode::new("wasm", Point3::new(10.0, 0.0, 10.0), "backend"),
            ])
            .expect("valid nodes"),
            rig: CameraRig {
                follow_offset: Vec3::ZERO,
                look_at: LookAtMode::Fixed(Point3::new(5.0, 0.0, 20.0)),
                ..CameraRig::default()
            },
            ..constellation()
        };
        let director = SceneDirector::new(setup, QualityTier::High).expect("scene");
        let StaticGeometry::Constellation { connections, .. } = director.static_geometry() else {
            panic!("expected constellation geometry");
        };
        let middle = connections[0].points[25];
        assert!(middle[2] < 10.0, "{middle:?}");
    }
}

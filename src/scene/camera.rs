//! Camera choreography: path following and detail zooms.
//!
//! The choreographer is the only writer of the camera pose. In `Follow` it
//! eases towards a pose derived from the current follow target every
//! frame. Selecting a node snapshots the pose and tweens to a fixed framing
//! of the node; closing tweens back to the snapshot. At most one tween is in
//! flight and a new request always replaces it.

use serde::Deserialize;

use crate::geom::{Point3, Vec3};

use super::node::NodeId;

/// Frame rate the smoothing factor is expressed against.
const REFERENCE_FPS: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Point3,
    pub look_at: Point3,
}

impl CameraPose {
    #[must_use]
    pub const fn new(position: Point3, look_at: Point3) -> Self {
        Self { position, look_at }
    }

    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            look_at: self.look_at.lerp(other.look_at, t),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    Linear,
    EaseInOutQuad,
    #[default]
    EaseInOutCubic,
    EaseOutCubic,
}

impl Easing {
    /// Maps linear progress in `[0, 1]` to eased progress. Both ends are
    /// fixed points of every curve.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Time-bounded eased interpolation between two poses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: CameraPose,
    to: CameraPose,
    elapsed: f64,
    duration: f64,
    easing: Easing,
}

impl Tween {
    #[must_use]
    pub fn new(from: CameraPose, to: CameraPose, duration: f64, easing: Easing) -> Self {
        let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        Self {
            from,
            to,
            elapsed: 0.0,
            duration,
            easing,
        }
    }

    pub fn advance(&mut self, delta_seconds: f64) {
        if delta_seconds.is_finite() && delta_seconds > 0.0 {
            self.elapsed = (self.elapsed + delta_seconds).min(self.duration);
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Linear fraction of the duration that has elapsed.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        }
    }

    /// Current pose. A finished tween yields its target exactly.
    #[must_use]
    pub fn pose(&self) -> CameraPose {
        if self.is_finished() {
            return self.to;
        }
        self.from.lerp(self.to, self.easing.apply(self.fraction()))
    }

    #[must_use]
    pub fn target(&self) -> CameraPose {
        self.to
    }
}

/// What the camera aims at while following.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LookAtMode {
    /// The follow target itself (railway: look at the train).
    Target,
    /// A fixed world point (constellation: look at the centre while orbiting).
    Fixed(Point3),
}

/// Static camera tuning for one scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub follow_offset: Vec3,
    pub look_at: LookAtMode,
    /// Share of the remaining distance covered per 60 Hz frame.
    pub smoothing: f64,
    /// Camera position relative to a selected node.
    pub detail_offset: Vec3,
    pub enter_duration: f64,
    pub exit_duration: f64,
    pub easing: Easing,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            follow_offset: Vec3::new(0.0, 6.0, 14.0),
            look_at: LookAtMode::Target,
            smoothing: 0.05,
            detail_offset: Vec3::new(0.0, 2.5, 6.0),
            enter_duration: 1.3,
            exit_duration: 1.0,
            easing: Easing::EaseInOutCubic,
        }
    }
}

impl CameraRig {
    #[must_use]
    pub fn follow_pose(&self, target: Point3) -> CameraPose {
        let look_at = match self.look_at {
            LookAtMode::Target => target,
            LookAtMode::Fixed(point) => point,
        };
        CameraPose::new(target.add_vec(self.follow_offset), look_at)
    }

    #[must_use]
    pub fn detail_pose(&self, node_position: Point3) -> CameraPose {
        CameraPose::new(node_position.add_vec(self.detail_offset), node_position)
    }

    /// Per-frame smoothing factor adjusted for the actual frame time, so a
    /// 30 Hz display converges as fast in wall time as a 60 Hz one.
    #[must_use]
    pub fn smoothing_for(&self, delta_seconds: f64) -> f64 {
        if !delta_seconds.is_finite() || delta_seconds <= 0.0 {
            return 0.0;
        }
        let alpha = self.smoothing.clamp(0.0, 1.0);
        1.0 - (1.0 - alpha).powf(delta_seconds * REFERENCE_FPS)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CameraMode {
    Follow,
    EnteringDetail { node: NodeId, tween: Tween },
    Detail { node: NodeId },
    ExitingDetail { tween: Tween },
}

impl CameraMode {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Follow => "follow",
            Self::EnteringDetail { .. } => "enteringDetail",
            Self::Detail { .. } => "detail",
            Self::ExitingDetail { .. } => "exitingDetail",
        }
    }
}

/// Transitions completed during an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraEvent {
    DetailReached(NodeId),
    FollowResumed,
}

#[derive(Debug, Clone)]
pub struct CameraChoreographer {
    rig: CameraRig,
    pose: CameraPose,
    mode: CameraMode,
    saved_pose: Option<CameraPose>,
}

impl CameraChoreographer {
    /// Starts in `Follow`, already at the follow pose for `target`.
    #[must_use]
    pub fn new(rig: CameraRig, target: Point3) -> Self {
        Self {
            pose: rig.follow_pose(target),
            rig,
            mode: CameraMode::Follow,
            saved_pose: None,
        }
    }

    #[must_use]
    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    #[must_use]
    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    #[must_use]
    pub fn mode(&self) -> &CameraMode {
        &self.mode
    }

    /// Snapshot taken when detail mode was first entered. Present only
    /// outside `Follow`.
    #[must_use]
    pub fn saved_pose(&self) -> Option<CameraPose> {
        self.saved_pose
    }

    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        matches!(
            self.mode,
            CameraMode::EnteringDetail { .. } | CameraMode::ExitingDetail { .. }
        )
    }

    /// Node the camera is framing or heading to.
    #[must_use]
    pub fn detail_node(&self) -> Option<&NodeId> {
        match &self.mode {
            CameraMode::EnteringDetail { node, .. } | CameraMode::Detail { node } => Some(node),
            _ => None,
        }
    }

    /// Starts a zoom onto `node`. From `Follow` the current pose is saved
    /// first; from any detail state the existing snapshot is kept and the
    /// tween starts at the current pose, replacing any tween in flight.
    pub fn enter_detail(&mut self, node: NodeId, node_position: Point3) {
        match self.mode {
            CameraMode::Follow => self.saved_pose = Some(self.pose),
            _ => {
                self.saved_pose.get_or_insert(self.pose);
            }
        }
        let tween = Tween::new(
            self.pose,
            self.rig.detail_pose(node_position),
            self.rig.enter_duration,
            self.rig.easing,
        );
        log::debug!("camera: entering detail for {node}");
        self.mode = CameraMode::EnteringDetail { node, tween };
    }

    /// Starts the return to the saved pose. Ignored outside detail states.
    pub fn exit_detail(&mut self) {
        if !matches!(
            self.mode,
            CameraMode::EnteringDetail { .. } | CameraMode::Detail { .. }
        ) {
            return;
        }
        match self.saved_pose {
            Some(saved) => {
                log::debug!("camera: exiting detail");
                self.mode = CameraMode::ExitingDetail {
                    tween: Tween::new(self.pose, saved, self.rig.exit_duration, self.rig.easing),
                };
            }
            None => self.mode = CameraMode::Follow,
        }
    }

    /// Advances one frame. `follow_target` is only read in `Follow`.
    pub fn update(&mut self, delta_seconds: f64, follow_target: Point3) -> Option<CameraEvent> {
        match &mut self.mode {
            CameraMode::Follow => {
                let desired = self.rig.follow_pose(follow_target);
                let alpha = self.rig.smoothing_for(delta_seconds);
                self.pose = self.pose.lerp(desired, alpha);
                None
            }
            CameraMode::EnteringDetail { node, tween } => {
                tween.advance(delta_seconds);
                self.pose = tween.pose();
                if tween.is_finished() {
                    let node = node.clone();
                    log::debug!("camera: detail reached for {node}");
                    self.mode = CameraMode::Detail { node: node.clone() };
                    Some(CameraEvent::DetailReached(node))
                } else {
                    None
                }
            }
            CameraMode::Detail { .. } => None,
            CameraMode::ExitingDetail { tween } => {
                tween.advance(delta_seconds);
                self.pose = tween.pose();
                if tween.is_finished() {
                    self.saved_pose = None;
                    self.mode = CameraMode::Follow;
                    log::debug!("camera: follow resumed");
                    Some(CameraEvent::FollowResumed)
                } else {
                    None
                }
            }
        }
    }

    /// Teardown mid-flight: restores the saved pose immediately and returns
    /// to `Follow`, so no half-tweened pose survives. Returns whether a pose
    /// was restored.
    pub fn cancel(&mut self) -> bool {
        self.mode = CameraMode::Follow;
        match self.saved_pose.take() {
            Some(saved) => {
                self.pose = saved;
                true
            }
            None => false,
        }
    }
}

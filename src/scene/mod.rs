//! Runtime scene pieces and the director that runs them each frame.

pub mod camera;
pub mod constellation;
pub mod director;
pub mod node;
pub mod particles;
pub mod progress;
pub mod selection;
pub mod track;

pub use camera::{CameraChoreographer, CameraMode, CameraPose, CameraRig, Easing, LookAtMode};
pub use constellation::{ConnectionLink, LinkStrength};
pub use director::{FrameEvent, FrameState, SceneDirector, SceneKind, SceneSetup, StaticGeometry};
pub use node::{NodeId, NodeSet, SceneNode};
pub use progress::ProgressDriver;
pub use selection::{SelectionMachine, SelectionState};

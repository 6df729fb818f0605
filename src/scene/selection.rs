//! Pointer interaction state for scene nodes.
//!
//! One value for the whole scene: at most one node is hovered or selected.
//! Every transition that matters to the camera is reported as a
//! [`SelectionEffect`]; the machine itself never touches the camera.

use super::node::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Hovered(NodeId),
    Selected(NodeId),
}

/// Camera work requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEffect {
    /// Zoom from the overview onto `node`.
    EnterDetail(NodeId),
    /// Move straight from one detail framing to another.
    SwitchDetail { from: NodeId, to: NodeId },
    /// Return from `node` to the overview.
    ExitDetail(NodeId),
}

#[derive(Debug, Clone, Default)]
pub struct SelectionMachine {
    state: SelectionState,
}

impl SelectionMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    #[must_use]
    pub fn selected(&self) -> Option<&NodeId> {
        match &self.state {
            SelectionState::Selected(id) => Some(id),
            _ => None,
        }
    }

    #[must_use]
    pub fn hovered(&self) -> Option<&NodeId> {
        match &self.state {
            SelectionState::Hovered(id) => Some(id),
            _ => None,
        }
    }

    /// Hover is ignored while a node is selected.
    pub fn pointer_enter(&mut self, id: NodeId) {
        match &self.state {
            SelectionState::Idle | SelectionState::Hovered(_) => {
                log::debug!("hover {id}");
                self.state = SelectionState::Hovered(id);
            }
            SelectionState::Selected(_) => {}
        }
    }

    /// Only leaving the hovered node clears the hover.
    pub fn pointer_leave(&mut self, id: &NodeId) {
        if matches!(&self.state, SelectionState::Hovered(current) if current == id) {
            self.state = SelectionState::Idle;
        }
    }

    /// Click or tap. Clicking the already selected node changes nothing.
    pub fn click(&mut self, id: NodeId) -> Option<SelectionEffect> {
        let effect = match &self.state {
            SelectionState::Idle | SelectionState::Hovered(_) => {
                SelectionEffect::EnterDetail(id.clone())
            }
            SelectionState::Selected(current) if *current == id => return None,
            SelectionState::Selected(current) => SelectionEffect::SwitchDetail {
                from: current.clone(),
                to: id.clone(),
            },
        };
        log::debug!("select {id}");
        self.state = SelectionState::Selected(id);
        Some(effect)
    }

    /// Explicit close (button or Escape). A no-op unless something is selected.
    pub fn close(&mut self) -> Option<SelectionEffect> {
        match std::mem::take(&mut self.state) {
            SelectionState::Selected(id) => {
                log::debug!("close {id}");
                Some(SelectionEffect::ExitDetail(id))
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Drops any hover or selection without reporting an effect.
    pub fn reset(&mut self) {
        self.state = SelectionState::Idle;
    }
}

//! Selectable scene nodes: railway stations and constellation stars.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::geom::Point3;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    pub position: Point3,
    /// Free-form grouping used by the host for styling ("education", "frontend").
    pub category: String,
    /// Opaque key/value pairs passed through to the detail overlay.
    pub metadata: BTreeMap<String, String>,
}

impl SceneNode {
    #[must_use]
    pub fn new(id: impl Into<String>, position: Point3, category: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(id),
            position,
            category: category.into(),
            metadata: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NodeError {
    #[error("duplicate node id `{0}`")]
    DuplicateId(NodeId),
    #[error("node `{0}` has a non-finite position")]
    NonFinitePosition(NodeId),
}

/// Ordered node collection with id lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeSet {
    nodes: Vec<SceneNode>,
    index: HashMap<NodeId, usize>,
}

impl NodeSet {
    /// # Errors
    /// Rejects duplicate ids and non-finite positions.
    pub fn new(nodes: Vec<SceneNode>) -> Result<Self, NodeError> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (position, node) in nodes.iter().enumerate() {
            if !node.position.is_finite() {
                return Err(NodeError::NonFinitePosition(node.id.clone()));
            }
            if index.insert(node.id.clone(), position).is_some() {
                return Err(NodeError::DuplicateId(node.id.clone()));
            }
        }
        Ok(Self { nodes, index })
    }

    #[must_use]
    pub fn get(&self, id: &NodeId) -> Option<&SceneNode> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, SceneNode> {
        self.nodes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nearest node by straight-line distance, not by distance along the path.
    /// Ties keep the node listed first.
    #[must_use]
    pub fn nearest_to(&self, point: Point3) -> Option<&SceneNode> {
        self.nodes.iter().fold(None, |best: Option<(&SceneNode, f64)>, node| {
            let distance = node.position.distance_squared_to(point);
            match best {
                Some((_, best_distance)) if best_distance <= distance => best,
                _ => Some((node, distance)),
            }
        })
        .map(|(node, _)| node)
    }
}

impl<'a> IntoIterator for &'a NodeSet {
    type Item = &'a SceneNode;
    type IntoIter = std::slice::Iter<'a, SceneNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

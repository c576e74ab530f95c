//! Capabilities the modeling host provides to the engine
//!
//! The engine never touches a scene graph directly. A host exposes its
//! selection, duplicates entities, applies transforms and brackets the work
//! in an undoable transaction through the [`Host`] trait.
use std::fmt;

use thiserror::Error;

use crate::geometry::{BoundingBox, Edge, Pose};
use crate::transform::Transform;

/// Identity of a shared geometry definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefinitionId(pub u64);

impl fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "definition#{}", self.0)
    }
}

/// An entity that can be copied and placed: a group or component instance
pub trait Duplicable {
    fn transform(&self) -> Transform;

    /// Bounding box in the definition's local frame
    fn bounding_box(&self) -> BoundingBox;

    fn definition_id(&self) -> DefinitionId;

    fn pose(&self) -> Pose {
        Pose::new(self.transform(), self.bounding_box())
    }
}

/// One item of the host's current selection
#[derive(Debug, Clone, PartialEq)]
pub enum Selected<E> {
    Edge(Edge),
    Entity(E),
    /// Anything the engine does not operate on (faces, guides, ...)
    Other,
}

/// The edges and duplicable entities of a selection
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<E> {
    pub edges: Vec<Edge>,
    pub entities: Vec<E>,
}

impl<E> Default for Selection<E> {
    fn default() -> Self {
        Self {
            edges: Vec::new(),
            entities: Vec::new(),
        }
    }
}

impl<E> FromIterator<Selected<E>> for Selection<E> {
    fn from_iter<I: IntoIterator<Item = Selected<E>>>(items: I) -> Self {
        let mut selection = Self::default();
        for item in items {
            match item {
                Selected::Edge(edge) => selection.edges.push(edge),
                Selected::Entity(entity) => selection.entities.push(entity),
                Selected::Other => {}
            }
        }
        selection
    }
}

/// Which host call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStage {
    Begin,
    Duplicate,
    Transform,
    Commit,
    Abort,
}

impl fmt::Display for HostStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HostStage::Begin => "begin operation",
            HostStage::Duplicate => "duplicate entity",
            HostStage::Transform => "apply transform",
            HostStage::Commit => "commit operation",
            HostStage::Abort => "abort operation",
        };
        f.write_str(name)
    }
}

/// A failure reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{stage} failed: {message}")]
pub struct HostError {
    pub stage: HostStage,
    pub message: String,
}

impl HostError {
    pub fn new(stage: HostStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

pub type HostResult<T> = Result<T, HostError>;

/// Scene, selection and transaction access.
///
/// All calls are synchronous and made from the host's modeling thread.
pub trait Host {
    type Entity: Duplicable;

    /// Current selection, in host order
    fn selection(&self) -> Vec<Selected<Self::Entity>>;

    fn clear_selection(&mut self);

    /// Add a new instance of the source's definition, with the source's transform
    fn duplicate(&mut self, source: &Self::Entity) -> HostResult<Self::Entity>;

    fn set_transform(&mut self, entity: &Self::Entity, transform: Transform) -> HostResult<()>;

    /// Open a named undo step. Only one may be open at a time.
    fn begin(&mut self, name: &str) -> HostResult<()>;

    fn commit(&mut self) -> HostResult<()>;

    /// Undo everything done since [`Host::begin`]
    fn abort(&mut self) -> HostResult<()>;
}

/// A blocking message surface for the user
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_selection_filters_items() {
        let edge = Edge::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0));
        let items = vec![
            Selected::Other,
            Selected::Entity("a"),
            Selected::Edge(edge),
            Selected::Entity("b"),
        ];
        let selection: Selection<&str> = items.into_iter().collect();
        assert_eq!(selection.edges, vec![edge]);
        assert_eq!(selection.entities, vec!["a", "b"]);
    }

    #[test]
    fn test_host_error_message() {
        let err = HostError::new(HostStage::Duplicate, "out of memory");
        assert_eq!(err.to_string(), "duplicate entity failed: out of memory");
    }
}

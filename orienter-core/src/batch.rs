//! Batch orchestration: one undoable step per invocation
//!
//! A batch validates the selection, opens a transaction, copies and places
//! the source once per target, and commits. Any host failure aborts the whole
//! transaction, so either every copy persists or none does. The selection is
//! cleared once the transaction has been committed or aborted.
use std::fmt;

use thiserror::Error;

use crate::align::reset_rotations;
use crate::geometry::distinct_endpoints;
use crate::host::{Duplicable, Host, HostError, HostResult, Selection};
use crate::placement::{place_at_vertex, Recipe, Scaling};

/// What a batch does with the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    /// A copy per edge, origin on the edge start.
    Origin,
    /// A copy per edge, centered on the edge midpoint.
    Center,
    /// A copy per edge, Z extent stretched to the edge length.
    ZScale,
    /// A copy per edge, uniformly scaled to the edge length.
    UniformScale,
    /// A copy per distinct edge endpoint, centered on it.
    Vertex,
    /// Every selected entity rotated back to the world axes, in place.
    ResetRotations,
}

impl BatchMode {
    /// Name of the undo step the batch runs in
    pub fn operation_name(&self) -> &'static str {
        match self {
            BatchMode::Origin => "Orienter: Local Origin",
            BatchMode::Center => "Orienter: Edges Center",
            BatchMode::ZScale => "Orienter: Z-Scaling",
            BatchMode::UniformScale => "Orienter: Uniform Scaling",
            BatchMode::Vertex => "Orienter: Vertex Placing",
            BatchMode::ResetRotations => "Orienter: Reset Rotations",
        }
    }

    pub fn requires_edges(&self) -> bool {
        !matches!(self, BatchMode::ResetRotations)
    }

    /// The placement recipe for edge-driven modes
    pub fn recipe(&self) -> Option<Recipe> {
        match self {
            BatchMode::Origin => Some(Recipe::Origin),
            BatchMode::Center => Some(Recipe::Center),
            BatchMode::ZScale => Some(Recipe::Scaled(Scaling::AlongZ)),
            BatchMode::UniformScale => Some(Recipe::Scaled(Scaling::Uniform)),
            BatchMode::Vertex | BatchMode::ResetRotations => None,
        }
    }
}

/// What a selection lacked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Missing {
    pub edges: bool,
    pub entities: bool,
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.entities, self.edges) {
            (true, true) => f.write_str("entities & edges"),
            (true, false) => f.write_str("entities"),
            (false, true) => f.write_str("edges"),
            (false, false) => f.write_str("nothing"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    /// Nothing was changed and no transaction was opened.
    #[error("invalid selection: missing {0}")]
    InvalidSelection(Missing),
    /// The transaction was rolled back.
    #[error(transparent)]
    Host(#[from] HostError),
}

pub type BatchResult<T> = Result<T, BatchError>;

/// Summary of a committed batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub mode: BatchMode,
    /// Edges, vertices or entities visited
    pub targets: usize,
    pub copies_created: usize,
    /// Entities transformed in place
    pub entities_updated: usize,
    pub skipped_degenerate: usize,
}

impl BatchReport {
    fn new(mode: BatchMode) -> Self {
        Self {
            mode,
            targets: 0,
            copies_created: 0,
            entities_updated: 0,
            skipped_degenerate: 0,
        }
    }
}

/// Check that a selection has what `mode` needs
pub fn validate<E>(selection: &Selection<E>, mode: BatchMode) -> BatchResult<()> {
    let missing = Missing {
        edges: mode.requires_edges() && selection.edges.is_empty(),
        entities: selection.entities.is_empty(),
    };
    if missing.edges || missing.entities {
        return Err(BatchError::InvalidSelection(missing));
    }
    Ok(())
}

/// Run one batch against the host's current selection
pub fn run<H: Host>(host: &mut H, mode: BatchMode) -> BatchResult<BatchReport> {
    let selection: Selection<H::Entity> = host.selection().into_iter().collect();
    if let Err(err) = validate(&selection, mode) {
        log::debug!("{}: {err}", mode.operation_name());
        return Err(err);
    }

    host.begin(mode.operation_name())?;
    log::debug!("{}: started", mode.operation_name());

    let outcome = process(host, &selection, mode).and_then(|report| {
        host.commit()?;
        Ok(report)
    });

    match &outcome {
        Ok(report) => log::debug!("{}: committed {report:?}", mode.operation_name()),
        Err(err) => {
            log::warn!("{}: aborting: {err}", mode.operation_name());
            if let Err(abort_err) = host.abort() {
                log::error!("{}: {abort_err}", mode.operation_name());
            }
        }
    }

    host.clear_selection();
    outcome.map_err(BatchError::from)
}

fn process<H: Host>(
    host: &mut H,
    selection: &Selection<H::Entity>,
    mode: BatchMode,
) -> HostResult<BatchReport> {
    let mut report = BatchReport::new(mode);

    if mode == BatchMode::ResetRotations {
        for entity in &selection.entities {
            report.targets += 1;
            let reset = reset_rotations(&entity.pose());
            host.set_transform(entity, reset.transform)?;
            report.entities_updated += 1;
        }
        return Ok(report);
    }

    // Placement modes copy the first selected entity only
    let Some(source) = selection.entities.first() else {
        return Ok(report);
    };
    let pose = source.pose();

    match mode.recipe() {
        Some(recipe) => {
            for edge in &selection.edges {
                report.targets += 1;
                let Some(placed) = recipe.apply(&pose, edge) else {
                    log::debug!("skipping zero-length edge at {:?}", edge.start);
                    report.skipped_degenerate += 1;
                    continue;
                };
                let copy = host.duplicate(source)?;
                host.set_transform(&copy, placed.transform)?;
                report.copies_created += 1;
            }
        }
        None => {
            for vertex in distinct_endpoints(&selection.edges) {
                report.targets += 1;
                let placed = place_at_vertex(&pose, &vertex);
                let copy = host.duplicate(source)?;
                host.set_transform(&copy, placed.transform)?;
                report.copies_created += 1;
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BoundingBox, Edge};
    use crate::host::{DefinitionId, HostStage, Selected};
    use crate::transform::Transform;
    use nalgebra::Point3;

    /// Records every host call
    #[derive(Default)]
    struct RecordingHost {
        selection: Vec<Selected<Block>>,
        calls: Vec<String>,
        fail_commit: bool,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Block;

    impl Duplicable for Block {
        fn transform(&self) -> Transform {
            Transform::identity()
        }

        fn bounding_box(&self) -> BoundingBox {
            BoundingBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
        }

        fn definition_id(&self) -> DefinitionId {
            DefinitionId(1)
        }
    }

    impl Host for RecordingHost {
        type Entity = Block;

        fn selection(&self) -> Vec<Selected<Block>> {
            self.selection.clone()
        }

        fn clear_selection(&mut self) {
            self.calls.push("clear".into());
            self.selection.clear();
        }

        fn duplicate(&mut self, _source: &Block) -> HostResult<Block> {
            self.calls.push("duplicate".into());
            Ok(Block)
        }

        fn set_transform(&mut self, _entity: &Block, _transform: Transform) -> HostResult<()> {
            self.calls.push("transform".into());
            Ok(())
        }

        fn begin(&mut self, name: &str) -> HostResult<()> {
            self.calls.push(format!("begin {name}"));
            Ok(())
        }

        fn commit(&mut self) -> HostResult<()> {
            self.calls.push("commit".into());
            if self.fail_commit {
                return Err(HostError::new(HostStage::Commit, "disk full"));
            }
            Ok(())
        }

        fn abort(&mut self) -> HostResult<()> {
            self.calls.push("abort".into());
            Ok(())
        }
    }

    fn edge(x: f64) -> Selected<Block> {
        Selected::Edge(Edge::new(Point3::new(x, 0.0, 0.0), Point3::new(x, 1.0, 0.0)))
    }

    #[test]
    fn test_invalid_selection_opens_no_transaction() {
        let mut host = RecordingHost {
            selection: vec![edge(0.0)],
            ..Default::default()
        };
        let err = run(&mut host, BatchMode::Center).unwrap_err();
        assert_eq!(
            err,
            BatchError::InvalidSelection(Missing {
                edges: false,
                entities: true
            })
        );
        assert!(host.calls.is_empty());
    }

    #[test]
    fn test_missing_display() {
        let both = Missing {
            edges: true,
            entities: true,
        };
        assert_eq!(both.to_string(), "entities & edges");
    }

    #[test]
    fn test_call_sequence() {
        let mut host = RecordingHost {
            selection: vec![Selected::Entity(Block), edge(0.0), edge(2.0)],
            ..Default::default()
        };
        let report = run(&mut host, BatchMode::Origin).unwrap();
        assert_eq!(report.copies_created, 2);
        assert_eq!(
            host.calls,
            vec![
                "begin Orienter: Local Origin",
                "duplicate",
                "transform",
                "duplicate",
                "transform",
                "commit",
                "clear"
            ]
        );
    }

    #[test]
    fn test_commit_failure_aborts() {
        let mut host = RecordingHost {
            selection: vec![Selected::Entity(Block), edge(0.0)],
            fail_commit: true,
            ..Default::default()
        };
        let err = run(&mut host, BatchMode::Center).unwrap_err();
        assert!(matches!(err, BatchError::Host(HostError { stage: HostStage::Commit, .. })));
        assert_eq!(host.calls[host.calls.len() - 2..], ["abort", "clear"]);
    }

    #[test]
    fn test_reset_rotations_needs_no_edges() {
        let mut host = RecordingHost {
            selection: vec![Selected::Entity(Block), Selected::Entity(Block)],
            ..Default::default()
        };
        let report = run(&mut host, BatchMode::ResetRotations).unwrap();
        assert_eq!(report.entities_updated, 2);
        assert_eq!(report.copies_created, 0);
    }

    #[test]
    fn test_recipes_by_mode() {
        assert_eq!(BatchMode::ZScale.recipe(), Some(Recipe::Scaled(Scaling::AlongZ)));
        assert_eq!(BatchMode::Vertex.recipe(), None);
        assert!(!BatchMode::ResetRotations.requires_edges());
    }
}

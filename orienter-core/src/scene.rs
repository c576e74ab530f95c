//! In-memory scene: a self-contained [`Host`] implementation.
//!
//! Definitions hold a bounding box (and optionally the mesh it came from),
//! instances reference a definition and carry a transform. A single
//! transaction can be open at a time; aborting it restores the snapshot taken
//! when it began.
use std::collections::BTreeMap;

use crate::geometry::{BoundingBox, Edge, Mesh};
use crate::host::{DefinitionId, Duplicable, Host, HostError, HostResult, HostStage, Selected};
use crate::transform::Transform;

/// Handle of an instance placed in a [`MemoryScene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub name: String,
    pub bounds: BoundingBox,
    pub mesh: Option<Mesh>,
}

/// Snapshot of an instance, as handed out through the selection
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub id: InstanceId,
    pub definition: DefinitionId,
    pub transform: Transform,
    pub bounds: BoundingBox,
}

impl Duplicable for Instance {
    fn transform(&self) -> Transform {
        self.transform
    }

    fn bounding_box(&self) -> BoundingBox {
        self.bounds
    }

    fn definition_id(&self) -> DefinitionId {
        self.definition
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SelectionItem {
    Edge(Edge),
    Instance(InstanceId),
}

#[derive(Debug, Clone)]
struct Transaction {
    name: String,
    instances: BTreeMap<InstanceId, Instance>,
    duplicates: usize,
}

#[derive(Debug, Default)]
pub struct MemoryScene {
    definitions: BTreeMap<DefinitionId, Definition>,
    instances: BTreeMap<InstanceId, Instance>,
    selection: Vec<SelectionItem>,
    transaction: Option<Transaction>,
    undo_stack: Vec<String>,
    next_definition: u64,
    next_instance: u64,
    fail_duplicate_on: Option<usize>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_definition(&mut self, name: impl Into<String>, bounds: BoundingBox) -> DefinitionId {
        self.insert_definition(Definition {
            name: name.into(),
            bounds,
            mesh: None,
        })
    }

    /// Register a mesh as a definition, `None` if it has no vertices
    pub fn add_mesh_definition(
        &mut self,
        name: impl Into<String>,
        mesh: Mesh,
    ) -> Option<DefinitionId> {
        let bounds = mesh.bounds()?;
        Some(self.insert_definition(Definition {
            name: name.into(),
            bounds,
            mesh: Some(mesh),
        }))
    }

    fn insert_definition(&mut self, definition: Definition) -> DefinitionId {
        self.next_definition += 1;
        let id = DefinitionId(self.next_definition);
        self.definitions.insert(id, definition);
        id
    }

    pub fn definition(&self, id: DefinitionId) -> Option<&Definition> {
        self.definitions.get(&id)
    }

    /// Place an instance of `definition`, `None` if the definition is unknown
    pub fn add_instance(
        &mut self,
        definition: DefinitionId,
        transform: Transform,
    ) -> Option<InstanceId> {
        let bounds = self.definitions.get(&definition)?.bounds;
        self.next_instance += 1;
        let id = InstanceId(self.next_instance);
        self.instances.insert(
            id,
            Instance {
                id,
                definition,
                transform,
                bounds,
            },
        );
        Some(id)
    }

    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(&id)
    }

    /// All instances, oldest first
    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        self.instances.values()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn select_edge(&mut self, edge: Edge) {
        self.selection.push(SelectionItem::Edge(edge));
    }

    pub fn select_instance(&mut self, id: InstanceId) {
        self.selection.push(SelectionItem::Instance(id));
    }

    pub fn selection_len(&self) -> usize {
        self.selection.len()
    }

    /// Names of committed undo steps, oldest first
    pub fn undo_steps(&self) -> &[String] {
        &self.undo_stack
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    /// Make the `n`th duplication (1-based) of the next transactions fail
    pub fn fail_duplicate_on(&mut self, n: usize) {
        self.fail_duplicate_on = Some(n);
    }
}

impl Host for MemoryScene {
    type Entity = Instance;

    fn selection(&self) -> Vec<Selected<Instance>> {
        self.selection
            .iter()
            .map(|item| match item {
                SelectionItem::Edge(edge) => Selected::Edge(*edge),
                SelectionItem::Instance(id) => match self.instances.get(id) {
                    Some(instance) => Selected::Entity(instance.clone()),
                    None => Selected::Other,
                },
            })
            .collect()
    }

    fn clear_selection(&mut self) {
        self.selection.clear();
    }

    fn duplicate(&mut self, source: &Instance) -> HostResult<Instance> {
        if let Some(transaction) = self.transaction.as_mut() {
            transaction.duplicates += 1;
            if self.fail_duplicate_on == Some(transaction.duplicates) {
                return Err(HostError::new(
                    HostStage::Duplicate,
                    format!("could not add instance of {}", source.definition),
                ));
            }
        }

        let id = self
            .add_instance(source.definition, source.transform)
            .ok_or_else(|| {
                HostError::new(HostStage::Duplicate, format!("unknown {}", source.definition))
            })?;
        self.instances
            .get(&id)
            .cloned()
            .ok_or_else(|| HostError::new(HostStage::Duplicate, "instance vanished"))
    }

    fn set_transform(&mut self, entity: &Instance, transform: Transform) -> HostResult<()> {
        let instance = self
            .instances
            .get_mut(&entity.id)
            .ok_or_else(|| {
                HostError::new(HostStage::Transform, format!("no instance {:?}", entity.id))
            })?;
        instance.transform = transform;
        Ok(())
    }

    fn begin(&mut self, name: &str) -> HostResult<()> {
        if let Some(open) = &self.transaction {
            return Err(HostError::new(
                HostStage::Begin,
                format!("operation '{}' is still open", open.name),
            ));
        }
        self.transaction = Some(Transaction {
            name: name.to_owned(),
            instances: self.instances.clone(),
            duplicates: 0,
        });
        Ok(())
    }

    fn commit(&mut self) -> HostResult<()> {
        let transaction = self
            .transaction
            .take()
            .ok_or_else(|| HostError::new(HostStage::Commit, "no open operation"))?;
        self.undo_stack.push(transaction.name);
        Ok(())
    }

    fn abort(&mut self) -> HostResult<()> {
        let transaction = self
            .transaction
            .take()
            .ok_or_else(|| HostError::new(HostStage::Abort, "no open operation"))?;
        self.instances = transaction.instances;
        Ok(())
    }
}

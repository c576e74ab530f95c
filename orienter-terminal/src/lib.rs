//! Terminal host for Orienter
//!
//! A [`Session`] holds an in-memory scene with one source instance. Each run
//! selects the source together with the target edges and invokes a command.
use orienter_core::scene::{Instance, InstanceId};
use orienter_core::{commands, CommandId, Edge, MemoryScene, Mesh, Notifier, Outcome, Transform};

pub mod input;
pub mod notifier;
pub mod report;
pub mod source;

pub use notifier::TerminalNotifier;
pub use report::RunReport;
pub use source::{SourceError, SourceSpec};

pub struct Session {
    scene: MemoryScene,
    source: InstanceId,
}

impl Session {
    /// Register `mesh` as a definition and place one instance at `transform`
    pub fn new(name: &str, mesh: Mesh, transform: Transform) -> Result<Self, SourceError> {
        let mut scene = MemoryScene::new();
        let definition = scene.add_mesh_definition(name, mesh).ok_or(SourceError::Empty)?;
        let source = scene.add_instance(definition, transform).ok_or(SourceError::Empty)?;
        Ok(Self { scene, source })
    }

    pub fn scene(&self) -> &MemoryScene {
        &self.scene
    }

    pub fn source(&self) -> Option<&Instance> {
        self.scene.instance(self.source)
    }

    /// Instances created by previous runs
    pub fn copies(&self) -> impl Iterator<Item = &Instance> + '_ {
        self.scene.instances().filter(move |instance| instance.id != self.source)
    }

    pub fn run<N: Notifier>(&mut self, id: CommandId, edges: &[Edge], notifier: &mut N) -> Outcome {
        self.scene.select_instance(self.source);
        for edge in edges {
            self.scene.select_edge(*edge);
        }
        log::debug!("running {} with {} edge(s)", id.key(), edges.len());
        commands::invoke(id, &mut self.scene, notifier)
    }
}

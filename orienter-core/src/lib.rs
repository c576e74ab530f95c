//! Orienter Core - copy and place instances along edges
//!
//! The geometric engine (transforms, axis alignment, placement recipes) is
//! pure and host-independent. A modeling host plugs in through the
//! [`host::Host`] trait; the batch orchestrator runs each command as a single
//! all-or-nothing undo step against it.

// Deny unwrap/expect in library code; tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod align;
pub mod batch;
pub mod channel;
pub mod commands;
pub mod geometry;
pub mod host;
pub mod placement;
pub mod scene;
pub mod settings;
pub mod stl;
pub mod transform;

// Re-export commonly used types
pub use batch::{BatchError, BatchMode, BatchReport};
pub use commands::{CommandId, Outcome};
pub use geometry::{BoundingBox, Edge, Mesh, Pose, Triangle};
pub use host::{DefinitionId, Duplicable, Host, HostError, Notifier, Selected};
pub use placement::{Recipe, Scaling};
pub use scene::MemoryScene;
pub use settings::{Config, SettingsStore};
pub use transform::Transform;

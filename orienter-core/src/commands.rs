//! Command table: what the toolbar, menus and context menu offer
//!
//! Wiring these to real widgets is up to the host; this module only maps a
//! command to its labels and to the work it performs.
use std::time::Instant;

use crate::batch::{self, BatchError, BatchMode, BatchReport};
use crate::host::{Host, Notifier};
use crate::settings::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    OriginPlacement,
    CenterPlacement,
    ZScaling,
    UniformScaling,
    VertexPlacement,
    ResetRotations,
    Settings,
}

impl CommandId {
    pub const ALL: [CommandId; 7] = [
        CommandId::OriginPlacement,
        CommandId::CenterPlacement,
        CommandId::ZScaling,
        CommandId::UniformScaling,
        CommandId::VertexPlacement,
        CommandId::ResetRotations,
        CommandId::Settings,
    ];

    /// Stable identifier, used on the command line
    pub fn key(&self) -> &'static str {
        match self {
            CommandId::OriginPlacement => "origin",
            CommandId::CenterPlacement => "center",
            CommandId::ZScaling => "zscale",
            CommandId::UniformScaling => "uscale",
            CommandId::VertexPlacement => "vertex",
            CommandId::ResetRotations => "reset",
            CommandId::Settings => "settings",
        }
    }

    pub fn from_key(key: &str) -> Option<CommandId> {
        Self::ALL.into_iter().find(|id| id.key() == key)
    }

    pub fn title(&self) -> &'static str {
        match self {
            CommandId::OriginPlacement => "Origin Placement",
            CommandId::CenterPlacement => "Center Placement",
            CommandId::ZScaling => "Z-axis Scaling",
            CommandId::UniformScaling => "Uniform Scaling",
            CommandId::VertexPlacement => "Vertex Placement",
            CommandId::ResetRotations => "Reset Rotations",
            CommandId::Settings => "Orienter Settings",
        }
    }

    /// Toolbar tooltip, the title itself
    pub fn tooltip(&self) -> &'static str {
        self.title()
    }

    pub fn status_text(&self) -> &'static str {
        match self {
            CommandId::OriginPlacement => {
                "Copy the selected group/component along edges, its origin on each edge start."
            }
            CommandId::CenterPlacement => {
                "Copy the selected group/component along edges, \
                 its bounding box centered on each edge midpoint."
            }
            CommandId::ZScaling => {
                "Copy along edges, centered on each midpoint, \
                 stretching the Z axis to the edge length."
            }
            CommandId::UniformScaling => {
                "Copy along edges, centered on each midpoint, scaling uniformly to the edge length."
            }
            CommandId::VertexPlacement => {
                "Place copies of the selected group/component at the selected vertices."
            }
            CommandId::ResetRotations => {
                "Rotate the selected groups/components back to the world axes."
            }
            CommandId::Settings => "Settings",
        }
    }

    /// The batch a command runs, `None` for the settings dialog
    pub fn batch_mode(&self) -> Option<BatchMode> {
        match self {
            CommandId::OriginPlacement => Some(BatchMode::Origin),
            CommandId::CenterPlacement => Some(BatchMode::Center),
            CommandId::ZScaling => Some(BatchMode::ZScale),
            CommandId::UniformScaling => Some(BatchMode::UniformScale),
            CommandId::VertexPlacement => Some(BatchMode::Vertex),
            CommandId::ResetRotations => Some(BatchMode::ResetRotations),
            CommandId::Settings => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Command(CommandId),
    Separator,
}

/// Toolbar and menu layout
pub const MENU_LAYOUT: &[MenuEntry] = &[
    MenuEntry::Command(CommandId::OriginPlacement),
    MenuEntry::Command(CommandId::CenterPlacement),
    MenuEntry::Command(CommandId::ZScaling),
    MenuEntry::Command(CommandId::UniformScaling),
    MenuEntry::Command(CommandId::VertexPlacement),
    MenuEntry::Separator,
    MenuEntry::Command(CommandId::ResetRotations),
    MenuEntry::Separator,
    MenuEntry::Command(CommandId::Settings),
];

/// Context menu entries, empty unless enabled in `config`
pub fn context_menu(config: &Config) -> &'static [MenuEntry] {
    if config.context_menu {
        MENU_LAYOUT
    } else {
        &[]
    }
}

#[derive(Debug)]
pub enum Outcome {
    Completed(BatchReport),
    /// The presentation layer should show the settings dialog.
    OpenSettings,
    /// The user has already been notified.
    Failed(BatchError),
}

/// Message shown to the user for a failed batch
pub fn failure_message(mode: BatchMode, error: &BatchError) -> String {
    match error {
        BatchError::InvalidSelection(_) if mode.requires_edges() => {
            "Please select at least one edge and a group or component.".to_string()
        }
        BatchError::InvalidSelection(_) => {
            "Please select at least one group or component.".to_string()
        }
        BatchError::Host(e) => format!("Error: {}", e.message),
    }
}

/// Run a command against the host, notifying the user on failure
pub fn invoke<H, N>(id: CommandId, host: &mut H, notifier: &mut N) -> Outcome
where
    H: Host,
    N: Notifier,
{
    let Some(mode) = id.batch_mode() else {
        return Outcome::OpenSettings;
    };

    let started = Instant::now();
    let result = batch::run(host, mode);
    let elapsed = started.elapsed().as_secs_f64();

    match result {
        Ok(report) => {
            log::info!(
                "{}: {} target(s), {} copies, {} updated, {} skipped in {elapsed:.3} s",
                id.key(),
                report.targets,
                report.copies_created,
                report.entities_updated,
                report.skipped_degenerate,
            );
            Outcome::Completed(report)
        }
        Err(error) => {
            log::info!("{}: failed after {elapsed:.3} s: {error}", id.key());
            notifier.notify(&failure_message(mode, &error));
            Outcome::Failed(error)
        }
    }
}

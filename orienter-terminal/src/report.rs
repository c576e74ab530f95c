//! Run reports, printed as styled text or JSON
use std::io::{self, Write};

use crossterm::{
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
};
use nalgebra::{Point3, Vector3};
use orienter_core::channel::PluginInfo;
use orienter_core::scene::Instance;
use orienter_core::{CommandId, Config, Duplicable, Outcome};
use serde::Serialize;

use crate::Session;

/// Final placement of one instance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedInstance {
    pub id: u64,
    pub origin: [f64; 3],
    /// Bounding-box center
    pub center: [f64; 3],
    pub x_axis: [f64; 3],
    pub y_axis: [f64; 3],
    pub z_axis: [f64; 3],
    pub scale: [f64; 3],
}

impl PlacedInstance {
    pub fn from_instance(instance: &Instance) -> Self {
        let transform = instance.transform();
        Self {
            id: instance.id.0,
            origin: point(transform.origin()),
            center: point(instance.pose().center()),
            x_axis: vector(transform.x_axis()),
            y_axis: vector(transform.y_axis()),
            z_axis: vector(transform.z_axis()),
            scale: vector(transform.scale()),
        }
    }
}

fn point(p: Point3<f64>) -> [f64; 3] {
    [p.x, p.y, p.z]
}

fn vector(v: Vector3<f64>) -> [f64; 3] {
    [v.x, v.y, v.z]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub command: &'static str,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub undo_step: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub skipped_degenerate: usize,
    pub copies: Vec<PlacedInstance>,
    /// Entities transformed in place
    pub updated: Vec<PlacedInstance>,
}

impl RunReport {
    pub fn new(id: CommandId, session: &Session, outcome: &Outcome) -> Self {
        let mut report = Self {
            command: id.key(),
            completed: false,
            undo_step: None,
            error: None,
            skipped_degenerate: 0,
            copies: session.copies().map(PlacedInstance::from_instance).collect(),
            updated: Vec::new(),
        };

        match outcome {
            Outcome::Completed(batch) => {
                report.completed = true;
                report.undo_step = session.scene().undo_steps().last().cloned();
                report.skipped_degenerate = batch.skipped_degenerate;
                if batch.entities_updated > 0 {
                    report.updated =
                        session.source().map(PlacedInstance::from_instance).into_iter().collect();
                }
            }
            Outcome::Failed(error) => report.error = Some(error.to_string()),
            Outcome::OpenSettings => {}
        }
        report
    }
}

fn format_triple(values: &[f64; 3]) -> String {
    format!("({:.4}, {:.4}, {:.4})", values[0], values[1], values[2])
}

fn print_instance<W: Write>(out: &mut W, label: &str, placed: &PlacedInstance) -> io::Result<()> {
    queue!(
        out,
        SetForegroundColor(Color::Cyan),
        Print(format!("  {label} #{}", placed.id)),
        ResetColor,
        Print(format!(
            "  origin {}  center {}\r\n",
            format_triple(&placed.origin),
            format_triple(&placed.center)
        )),
        Print(format!(
            "      z-axis {}  scale {}\r\n",
            format_triple(&placed.z_axis),
            format_triple(&placed.scale)
        )),
    )
}

/// Human-readable report
pub fn print_pretty<W: Write>(out: &mut W, report: &RunReport) -> io::Result<()> {
    let (color, status) = if report.completed {
        (Color::Green, "done")
    } else {
        (Color::Red, "failed")
    };

    queue!(
        out,
        SetAttribute(Attribute::Bold),
        Print(report.command),
        SetAttribute(Attribute::Reset),
        Print(": "),
        SetForegroundColor(color),
        Print(status),
        ResetColor,
    )?;
    if let Some(step) = &report.undo_step {
        queue!(out, Print(format!(" ({step})")))?;
    }
    queue!(out, Print("\r\n"))?;

    if let Some(error) = &report.error {
        queue!(out, Print(format!("  {error}\r\n")))?;
    }
    for placed in &report.copies {
        print_instance(out, "copy", placed)?;
    }
    for placed in &report.updated {
        print_instance(out, "updated", placed)?;
    }
    if report.skipped_degenerate > 0 {
        queue!(
            out,
            SetForegroundColor(Color::DarkGrey),
            Print(format!("  {} zero-length edge(s) skipped\r\n", report.skipped_degenerate)),
            ResetColor,
        )?;
    }

    out.flush()
}

/// Current settings with product information
pub fn print_settings<W: Write>(
    out: &mut W,
    config: &Config,
    info: &PluginInfo,
    location: &str,
) -> io::Result<()> {
    queue!(
        out,
        SetAttribute(Attribute::Bold),
        Print(format!("{} {}", info.name, info.version)),
        SetAttribute(Attribute::Reset),
        Print(format!("  {}\r\n", info.description)),
        SetForegroundColor(Color::DarkGrey),
        Print(format!("  {location}\r\n")),
        ResetColor,
    )?;

    let values = serde_json::to_value(config).map_err(io::Error::other)?;
    for key in Config::KEYS {
        let value = values.get(*key).cloned().unwrap_or_default();
        queue!(
            out,
            SetForegroundColor(Color::Cyan),
            Print(format!("  {key}")),
            ResetColor,
            Print(format!(" = {value}\r\n")),
        )?;
    }

    out.flush()
}

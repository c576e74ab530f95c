//! Orienter command line
//!
//! Copies a source definition along the edges listed in a text file and
//! prints where each copy ended up.
//!
//! ```text
//! orienter center --source box:1,1,2 --edges edges.txt
//! orienter reset --source part.stl --rotate 30,0,45 --json
//! orienter settings set context_menu=true
//! ```
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use nalgebra::{Point3, Rotation3, Vector3};
use orienter_core::channel::{self, PluginInfo, SettingsRequest};
use orienter_core::settings::FileBackend;
use orienter_core::{CommandId, Outcome, SettingsStore, Transform};
use orienter_terminal::{input, report, RunReport, Session, SourceSpec, TerminalNotifier};
use serde_json::Value;

/// Copy and orient groups/components along edges
#[derive(Parser)]
#[command(name = "orienter")]
#[command(version, long_about = None)]
struct Cli {
    /// Log per-step detail
    #[arg(long, global = true)]
    verbose: bool,

    /// Settings file (defaults to the user configuration directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy with the local origin on each edge start, Z along the edge
    Origin(PlaceArgs),
    /// Copy centered on each edge midpoint, Z along the edge
    Center(PlaceArgs),
    /// Like `center`, stretching Z to the edge length
    Zscale(PlaceArgs),
    /// Like `center`, scaling uniformly to the edge length
    Uscale(PlaceArgs),
    /// Copy centered on every distinct edge endpoint
    Vertex(PlaceArgs),
    /// Rotate the source back to the world axes
    Reset(PlaceArgs),
    /// Show or change the settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

impl Commands {
    fn placement(&self) -> Option<(CommandId, &PlaceArgs)> {
        match self {
            Commands::Origin(args) => Some((CommandId::OriginPlacement, args)),
            Commands::Center(args) => Some((CommandId::CenterPlacement, args)),
            Commands::Zscale(args) => Some((CommandId::ZScaling, args)),
            Commands::Uscale(args) => Some((CommandId::UniformScaling, args)),
            Commands::Vertex(args) => Some((CommandId::VertexPlacement, args)),
            Commands::Reset(args) => Some((CommandId::ResetRotations, args)),
            Commands::Settings { .. } => None,
        }
    }
}

#[derive(Args)]
struct PlaceArgs {
    /// STL file, or `box:W,H,D` for a generated box
    #[arg(long)]
    source: SourceSpec,

    /// Target edges, one `x1 y1 z1 x2 y2 z2` per line
    #[arg(long)]
    edges: Option<PathBuf>,

    /// Position of the source instance
    #[arg(
        long,
        value_parser = input::parse_point,
        allow_hyphen_values = true,
        default_value = "0,0,0"
    )]
    at: Point3<f64>,

    /// Rotation of the source instance, Euler angles in degrees
    #[arg(
        long,
        value_parser = input::parse_triple,
        allow_hyphen_values = true,
        default_value = "0,0,0"
    )]
    rotate: [f64; 3],

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the current settings
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Change one setting, e.g. `context_menu=true`
    Set {
        #[arg(value_parser = input::parse_assignment)]
        assignment: (String, Value),
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match &cli.command {
        Commands::Settings { action } => settings(cli.settings.clone(), action),
        command => match command.placement() {
            Some((id, args)) => place(id, args),
            None => Ok(ExitCode::SUCCESS),
        },
    }
}

fn place(id: CommandId, args: &PlaceArgs) -> Result<ExitCode> {
    let mesh = args
        .source
        .load()
        .with_context(|| format!("failed to load source '{}'", args.source))?;

    let edges = match &args.edges {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            input::parse_edges(&text)
                .with_context(|| format!("invalid edge file {}", path.display()))?
        }
        None => Vec::new(),
    };

    let [rx, ry, rz] = args.rotate;
    let rotation = Rotation3::from_euler_angles(rx.to_radians(), ry.to_radians(), rz.to_radians());
    let transform = Transform::from_parts(args.at, &rotation, Vector3::repeat(1.0));
    let mut session = Session::new(&args.source.name(), mesh, transform)?;

    let mut notifier = TerminalNotifier::stderr();
    let outcome = session.run(id, &edges, &mut notifier);
    let report = RunReport::new(id, &session, &outcome);

    let mut stdout = io::stdout();
    if args.json {
        serde_json::to_writer_pretty(&mut stdout, &report)?;
        writeln!(stdout)?;
    } else {
        report::print_pretty(&mut stdout, &report)?;
    }

    Ok(match outcome {
        Outcome::Failed(_) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

fn settings(path: Option<PathBuf>, action: &SettingsAction) -> Result<ExitCode> {
    let backend = match path {
        Some(path) => FileBackend::new(path),
        None => FileBackend::user_default()?,
    };
    let location = backend.path().display().to_string();
    let mut store = SettingsStore::load(backend)
        .with_context(|| format!("failed to load settings from {location}"))?;

    match action {
        SettingsAction::Show { json: true } => {
            let snapshot = channel::handle(&mut store, SettingsRequest::Load);
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        SettingsAction::Show { json: false } => {
            let info = PluginInfo::current();
            report::print_settings(&mut io::stdout(), store.config(), &info, &location)?;
        }
        SettingsAction::Set {
            assignment: (key, value),
        } => {
            if store.set(key, value.clone())? {
                println!("{key} = {value}");
            } else {
                println!("{key} unchanged");
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for creating, editing, inspecting and replaying maps.

mod config;
mod map_transfer;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mapwright_core::{CellCoord, Round, Symmetry};
use mapwright_system_editor::{Brush, BrushKind, FieldKind, FieldValue, Mirroring};
use mapwright_system_playback::Timeline;
use mapwright_world::{query, StaticMap, World};

use config::CliConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "Mapwright map editing and replay tools", long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Creates a blank map and prints its transfer string.
    NewMap {
        /// Number of columns.
        #[arg(long)]
        width: u32,
        /// Number of rows.
        #[arg(long)]
        height: u32,
        /// Symmetry tag: 0 rotational, 1 horizontal, 2 vertical.
        #[arg(long)]
        symmetry: Option<u8>,
    },
    /// Prints layer counts for a map transfer string.
    Inspect {
        /// Transfer string produced by `new-map` or `edit`.
        transfer: String,
    },
    /// Applies one brush stroke to a map and prints the new transfer string.
    Edit {
        /// Transfer string of the map to edit.
        transfer: String,
        /// Brush to apply.
        #[arg(long, value_enum)]
        brush: BrushArg,
        /// Column of the brush centre.
        #[arg(long)]
        x: u32,
        /// Row of the brush centre.
        #[arg(long)]
        y: u32,
        /// Remove content instead of adding it.
        #[arg(long)]
        remove: bool,
        /// Radius for area brushes.
        #[arg(long)]
        radius: Option<u32>,
        /// Relative team (0 or 1) for team brushes.
        #[arg(long)]
        team: Option<u8>,
        /// Option value for the brush's selector (resource, direction or paint type).
        #[arg(long)]
        option: Option<u8>,
        /// Edit only the given cell, not its mirror.
        #[arg(long)]
        no_mirror: bool,
    },
    /// Replays a JSON round log against a map and prints a state summary.
    Replay {
        /// File holding the map transfer string.
        #[arg(long)]
        map: PathBuf,
        /// JSON file holding the decoded rounds.
        #[arg(long)]
        rounds: PathBuf,
        /// Number of rounds to apply; defaults to all.
        #[arg(long)]
        round: Option<usize>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum BrushArg {
    Walls,
    Clouds,
    Currents,
    Ruins,
    Resources,
    Paint,
}

impl From<BrushArg> for BrushKind {
    fn from(brush: BrushArg) -> Self {
        match brush {
            BrushArg::Walls => Self::Walls,
            BrushArg::Clouds => Self::Clouds,
            BrushArg::Currents => Self::Currents,
            BrushArg::Ruins => Self::Ruins,
            BrushArg::Resources => Self::Resources,
            BrushArg::Paint => Self::Paint,
        }
    }
}

/// Entry point for the Mapwright command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::NewMap {
            width,
            height,
            symmetry,
        } => new_map(&config, width, height, symmetry),
        Command::Inspect { transfer } => inspect(&transfer),
        Command::Edit {
            transfer,
            brush,
            x,
            y,
            remove,
            radius,
            team,
            option,
            no_mirror,
        } => {
            let mut brush = Brush::new(brush.into());
            configure_brush(&mut brush, remove, radius, team, option)?;
            let mirroring = if no_mirror {
                Mirroring::Off
            } else {
                Mirroring::Symmetric
            };
            edit(&transfer, &brush, CellCoord::new(x, y), mirroring)
        }
        Command::Replay { map, rounds, round } => replay(&config, &map, &rounds, round),
    }
}

fn new_map(config: &CliConfig, width: u32, height: u32, symmetry: Option<u8>) -> Result<()> {
    if width == 0 || height == 0 {
        anyhow::bail!("map dimensions must be positive, got {width}x{height}");
    }
    let symmetry = match symmetry {
        Some(tag) => Symmetry::from_tag(tag).context("invalid --symmetry")?,
        None => config.default_symmetry,
    };
    let map = StaticMap::blank(width, height, symmetry);
    println!("{}", map_transfer::encode(&map)?);
    Ok(())
}

fn inspect(transfer: &str) -> Result<()> {
    let map = map_transfer::decode(transfer).context("failed to decode map transfer string")?;
    let dimension = map.dimension();
    let count = |flags: &[bool]| flags.iter().filter(|flag| **flag).count();
    let nonzero = |values: &[u8]| values.iter().filter(|value| **value != 0).count();

    println!("name: {}", map.name());
    println!("size: {}x{}", dimension.width(), dimension.height());
    println!("symmetry: {:?}", map.symmetry());
    println!("walls: {}", count(map.walls()));
    println!("clouds: {}", count(map.clouds()));
    println!("currents: {}", nonzero(map.currents()));
    println!("resource wells: {}", nonzero(map.resources()));
    println!("islands: {}", map.island_cells().len());
    println!("ruins: {}", map.ruins().len());
    println!("painted cells: {}", nonzero(map.initial_paint()));
    Ok(())
}

fn configure_brush(
    brush: &mut Brush,
    remove: bool,
    radius: Option<u32>,
    team: Option<u8>,
    option: Option<u8>,
) -> Result<()> {
    brush.set_field("should_add", FieldValue::AddRemove(!remove))?;
    if let Some(radius) = radius {
        brush
            .set_field("radius", FieldValue::PositiveInteger(radius))
            .with_context(|| format!("invalid --radius for the {} brush", brush.name()))?;
    }
    if let Some(team) = team {
        brush
            .set_field("team", FieldValue::Team(team))
            .with_context(|| format!("invalid --team for the {} brush", brush.name()))?;
    }
    if let Some(option) = option {
        let selector = brush
            .fields()
            .iter()
            .find(|field| field.kind() == FieldKind::SingleSelect)
            .map(|field| field.name())
            .with_context(|| format!("{} brush does not take --option", brush.name()))?;
        brush.set_field(selector, FieldValue::Select(option))?;
    }
    Ok(())
}

fn edit(transfer: &str, brush: &Brush, center: CellCoord, mirroring: Mirroring) -> Result<()> {
    let map = map_transfer::decode(transfer).context("failed to decode map transfer string")?;
    let mut world = World::new(map);
    let record = brush
        .apply(&mut world, center, mirroring)
        .with_context(|| format!("failed to apply {} brush", brush.name()))?;
    if record.is_none() {
        tracing::warn!(
            target: "mapwright::cli",
            brush = brush.name(),
            x = center.x(),
            y = center.y(),
            "edit.unchanged"
        );
    }
    println!("{}", map_transfer::encode(query::terrain(&world))?);
    Ok(())
}

fn replay(
    config: &CliConfig,
    map_path: &Path,
    rounds_path: &Path,
    target: Option<usize>,
) -> Result<()> {
    let transfer = fs::read_to_string(map_path)
        .with_context(|| format!("failed to read map at {}", map_path.display()))?;
    let map = map_transfer::decode(&transfer)
        .with_context(|| format!("failed to decode map at {}", map_path.display()))?;
    let log = fs::read_to_string(rounds_path)
        .with_context(|| format!("failed to read rounds at {}", rounds_path.display()))?;
    let rounds: Vec<Round> = serde_json::from_str(&log)
        .with_context(|| format!("failed to parse rounds at {}", rounds_path.display()))?;

    let mut timeline = Timeline::new(World::new(map), config.playback)?;
    let available = rounds.len();
    for round in rounds {
        timeline.push_round(round);
    }
    let target = target.unwrap_or(available);
    timeline
        .seek(target)
        .with_context(|| format!("failed to replay to round {target}"))?;

    tracing::info!(
        target: "mapwright::cli",
        applied = timeline.applied(),
        recorded = available,
        "replay.finished"
    );

    let summary = query::summary(timeline.world());
    println!("size: {}x{}", summary.width, summary.height);
    println!("rounds applied: {}", summary.rounds_applied);
    println!("bodies: A {} / B {}", summary.bodies[0], summary.bodies[1]);
    println!("towers: A {} / B {}", summary.towers[0], summary.towers[1]);
    println!(
        "painted cells: A {} / B {}",
        summary.painted_cells[0], summary.painted_cells[1]
    );
    println!(
        "islands owned: A {} / B {}",
        summary.islands_owned[0], summary.islands_owned[1]
    );
    println!(
        "resource wells: {} ({} upgraded)",
        summary.wells, summary.upgraded_wells
    );
    Ok(())
}

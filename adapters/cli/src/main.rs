#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line host that carves Warren levels and answers route queries.

mod layout_snapshot;
mod render;

use anyhow::{anyhow, Context};
use clap::Parser;
use glam::Vec3;
use rand::Rng;
use warren_core::GeneratorConfig;
use warren_rendering::wall_layout;
use warren_system_generation::generate;
use warren_system_navigation::{find_path, NoPathFound};

use crate::layout_snapshot::WallLayoutSnapshot;

/// Command-line arguments mirroring the generator configuration surface.
#[derive(Debug, Parser)]
#[command(
    name = "warren",
    about = "Carves a connected room layout and answers route queries over it"
)]
struct Args {
    /// Side length of the square playable area in world units.
    #[arg(long, default_value_t = 16.0)]
    area_size: f32,
    /// Side length of a single square cell in world units.
    #[arg(long, default_value_t = 1.0)]
    cell_size: f32,
    /// Smallest room size drawn, in cells per axis.
    #[arg(long, default_value_t = 2)]
    min_room_size: u32,
    /// Exclusive upper bound of the room size draw, in cells per axis.
    #[arg(long, default_value_t = 6)]
    max_room_size: u32,
    /// Probability that a wall closes between two adjacent rooms.
    #[arg(long, default_value_t = 0.5)]
    wall_density: f32,
    /// Seed for the random source; drawn from entropy when omitted.
    #[arg(long)]
    seed: Option<i64>,
    /// Route query between two world points, written as "x,z:x,z".
    #[arg(long)]
    route: Option<String>,
    /// Print the wall layout as an encoded single-line snapshot.
    #[arg(long)]
    export_layout: bool,
    /// Decode an exported layout snapshot and print its summary instead of
    /// generating a level.
    #[arg(long, value_name = "SNAPSHOT", conflicts_with_all = ["route", "export_layout"])]
    inspect_layout: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if let Some(encoded) = &args.inspect_layout {
        let snapshot = WallLayoutSnapshot::decode(encoded)?;
        println!(
            "layout snapshot: seed {}, {}x{} cells of size {}, {} wall segments, {} caps",
            snapshot.seed,
            snapshot.side,
            snapshot.side,
            snapshot.cell_size,
            snapshot.layout.segments.len(),
            snapshot.layout.caps.len(),
        );
        return Ok(());
    }

    let seed = args
        .seed
        .unwrap_or_else(|| rand::thread_rng().gen_range(0..i64::MAX));
    let config = GeneratorConfig {
        area_size: args.area_size,
        cell_size: args.cell_size,
        min_room_size: args.min_room_size,
        max_room_size: args.max_room_size,
        wall_density: args.wall_density,
        seed,
    };

    let level = generate(&config).context("level generation failed")?;
    let grid = level.grid();

    println!(
        "seed {seed}: {}x{} cells, {} rooms, {} repaired, {} walls carved open",
        grid.side(),
        grid.side(),
        level.room_count(),
        level.repaired_rooms(),
        level.carved_openings(),
    );
    print!("{}", render::render_ascii(grid, level.anchor()));

    if let Some(query) = &args.route {
        let (from, to) = parse_route(query)?;
        // The terminal host carries no scene geometry, so nothing blocks sight.
        let clear = |_: Vec3, _: Vec3| false;
        match find_path(grid, from, to, &clear) {
            Ok(path) => {
                println!("route with {} waypoints:", path.points().len());
                for point in path.points() {
                    println!("  ({:.2}, {:.2})", point.x, point.z);
                }
            }
            Err(NoPathFound) => println!("no route between {from} and {to}"),
        }
    }

    if args.export_layout {
        let snapshot = WallLayoutSnapshot {
            side: grid.side(),
            cell_size: grid.cell_size(),
            seed: u64::try_from(seed.max(0)).unwrap_or(0),
            layout: wall_layout(grid),
        };
        println!("{}", snapshot.encode());
    }

    Ok(())
}

fn parse_route(query: &str) -> anyhow::Result<(Vec3, Vec3)> {
    let (from, to) = query
        .split_once(':')
        .ok_or_else(|| anyhow!("route query must look like \"x,z:x,z\""))?;
    Ok((parse_point(from)?, parse_point(to)?))
}

fn parse_point(text: &str) -> anyhow::Result<Vec3> {
    let (x, z) = text
        .split_once(',')
        .ok_or_else(|| anyhow!("point '{text}' must look like \"x,z\""))?;
    let x: f32 = x
        .trim()
        .parse()
        .with_context(|| format!("invalid x coordinate in '{text}'"))?;
    let z: f32 = z
        .trim()
        .parse()
        .with_context(|| format!("invalid z coordinate in '{text}'"))?;
    Ok(Vec3::new(x, 0.0, z))
}

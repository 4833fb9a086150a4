#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic procedural generator that carves a connected room layout.
//!
//! Rooms are seeded at random unassigned cells and flood-grown column by
//! column inside a size-bounded box. Walls between different rooms close
//! with a configurable probability as cells are claimed. After every room,
//! the navigation system probes reachability from the start-room anchor;
//! when the new room is cut off, a corridor is carved toward the anchor
//! until the rooms connect. The finished grid is fully reachable from the
//! anchor for any wall density.
//!
//! All randomness flows through [`UniformSource`], so a fixed seed and
//! identical parameters reproduce the grid bit for bit.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use warren_core::{
    CellCoord, ConfigError, Direction, GeneratorConfig, GridError, LevelParams, RoomId,
};
use warren_grid::Grid;
use warren_system_navigation::route_exists;

/// Injected random collaborator producing uniform floats in `[0, 1)`.
///
/// The generator derives every integer draw from these floats, so the float
/// sequence is the whole determinism contract.
pub trait UniformSource {
    /// Next uniform draw in `[0, 1)`.
    fn next_uniform(&mut self) -> f32;
}

/// Seeded ChaCha-backed implementation of [`UniformSource`].
#[derive(Clone, Debug)]
pub struct ChaChaUniform {
    rng: ChaCha8Rng,
}

impl ChaChaUniform {
    /// Creates a source that replays the same draw sequence for equal seeds.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl UniformSource for ChaChaUniform {
    fn next_uniform(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }
}

/// Result of a completed generation pass.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedLevel {
    grid: Grid,
    anchor: CellCoord,
    room_count: u32,
    carved_openings: u32,
    repaired_rooms: u32,
}

impl GeneratedLevel {
    /// The carved grid, fully assigned and connected.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Consumes the level, yielding the carved grid.
    #[must_use]
    pub fn into_grid(self) -> Grid {
        self.grid
    }

    /// First cell claimed by the first room; the fixed reference point every
    /// connectivity repair carved toward.
    #[must_use]
    pub const fn anchor(&self) -> CellCoord {
        self.anchor
    }

    /// Number of rooms carved into the grid.
    #[must_use]
    pub const fn room_count(&self) -> u32 {
        self.room_count
    }

    /// Number of previously closed walls opened by corridor repairs.
    #[must_use]
    pub const fn carved_openings(&self) -> u32 {
        self.carved_openings
    }

    /// Number of rooms that required a corridor repair to reach the anchor.
    #[must_use]
    pub const fn repaired_rooms(&self) -> u32 {
        self.repaired_rooms
    }
}

/// Failures of a generation pass.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum GenerationError {
    /// The host configuration failed normalisation.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A grid mutation addressed a coordinate outside the lattice.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// A carved corridor still failed to connect the room to the anchor.
    ///
    /// This cannot happen while the carving invariants hold; observing it
    /// means the pass produced a broken grid and must be treated as fatal.
    #[error("room {} at {target:?} is unreachable from the anchor {anchor:?} after corridor repair", room.get())]
    UnreachableAfterRepair {
        /// Room that remained disconnected.
        room: RoomId,
        /// Start-room anchor cell.
        anchor: CellCoord,
        /// Probe target within the disconnected room.
        target: CellCoord,
    },
}

/// Carves a complete level from the host configuration.
///
/// One-shot: normalises the configuration, seeds the uniform source, and
/// runs the full generation pass.
pub fn generate(config: &GeneratorConfig) -> Result<GeneratedLevel, GenerationError> {
    let params = config.normalized()?;
    let mut source = ChaChaUniform::seeded(params.seed());
    generate_with(&params, &mut source)
}

/// Carves a complete level using an injected random source.
pub fn generate_with<R: UniformSource>(
    params: &LevelParams,
    source: &mut R,
) -> Result<GeneratedLevel, GenerationError> {
    Carver::new(params, source).run()
}

struct Carver<'a, R> {
    params: &'a LevelParams,
    source: &'a mut R,
    grid: Grid,
    anchor: Option<CellCoord>,
    carved_openings: u32,
    repaired_rooms: u32,
}

impl<'a, R: UniformSource> Carver<'a, R> {
    fn new(params: &'a LevelParams, source: &'a mut R) -> Self {
        Self {
            grid: Grid::new(params.side(), params.cell_size()),
            params,
            source,
            anchor: None,
            carved_openings: 0,
            repaired_rooms: 0,
        }
    }

    fn run(mut self) -> Result<GeneratedLevel, GenerationError> {
        let mut room = RoomId::FIRST;
        let mut room_count = 0u32;

        while let Some(seed) = self.pick_unassigned_seed() {
            let accepted = self.grow_room(seed, room)?;
            room_count = room_count.saturating_add(1);
            log::debug!(
                "room {} grew {} cells from seed {seed:?}",
                room.get(),
                accepted.len()
            );

            match self.anchor {
                None => self.anchor = accepted.first().copied(),
                Some(anchor) => self.ensure_connected(anchor, room, &accepted)?,
            }

            room = room.next();
        }

        let anchor = self.anchor.unwrap_or(CellCoord::new(0, 0));
        Ok(GeneratedLevel {
            grid: self.grid,
            anchor,
            room_count,
            carved_openings: self.carved_openings,
            repaired_rooms: self.repaired_rooms,
        })
    }

    /// Uniform pick over the still-unassigned cells in row-major order.
    fn pick_unassigned_seed(&mut self) -> Option<CellCoord> {
        let unassigned: Vec<CellCoord> = self
            .grid
            .cells()
            .filter(|cell| cell.room().is_none())
            .map(|cell| cell.coord())
            .collect();

        if unassigned.is_empty() {
            return None;
        }

        let draw = self.source.next_uniform();
        let index = ((draw * unassigned.len() as f32) as usize).min(unassigned.len() - 1);
        Some(unassigned[index])
    }

    /// Uniform draw over `[min_room_size, max_room_size)`, or the minimum
    /// when the interval is empty.
    fn draw_room_size(&mut self) -> u32 {
        let min = self.params.min_room_size();
        let max = self.params.max_room_size();
        if max <= min {
            return min;
        }

        let span = max - min;
        let draw = self.source.next_uniform();
        min + ((draw * span as f32) as u32).min(span - 1)
    }

    /// Grows one room column by column inside its bounding box and returns
    /// the claimed coordinates in acceptance order.
    fn grow_room(&mut self, seed: CellCoord, room: RoomId) -> Result<Vec<CellCoord>, GridError> {
        let size = self.draw_room_size();
        let limit = self.grid.side().saturating_sub(1);

        // The box spans exactly `size` cells per axis around the seed,
        // clamped per side to the grid bounds.
        let half = size / 2;
        let lo_column = seed.column().saturating_sub(half);
        let hi_column = seed.column().saturating_add(size - 1 - half).min(limit);
        let lo_row = seed.row().saturating_sub(half);
        let hi_row = seed.row().saturating_add(size - 1 - half).min(limit);

        let mut accepted = Vec::new();
        let mut previous_rows: Vec<u32> = Vec::new();

        for column in lo_column..=hi_column {
            let rows = if previous_rows.is_empty() {
                self.first_column_run(column, lo_row, hi_row)
            } else {
                self.connected_rows(column, lo_row, hi_row, &previous_rows)
            };

            if rows.is_empty() {
                if previous_rows.is_empty() {
                    // No run yet; the seed cell guarantees a later column has one.
                    continue;
                }
                // A column without connectable cells ends the room; skipping
                // ahead could split the room into disconnected pieces.
                break;
            }

            for &row in &rows {
                let coord = CellCoord::new(column, row);
                self.claim(coord, room)?;
                accepted.push(coord);
            }

            previous_rows = rows;
        }

        Ok(accepted)
    }

    /// First maximal contiguous run of unassigned cells found scanning the
    /// column top to bottom.
    fn first_column_run(&self, column: u32, lo_row: u32, hi_row: u32) -> Vec<u32> {
        let mut run = Vec::new();
        for row in lo_row..=hi_row {
            if self.grid.room_of(CellCoord::new(column, row)).is_none() {
                run.push(row);
            } else if !run.is_empty() {
                break;
            }
        }
        run
    }

    /// Rows of the previous column that stay unassigned in this column, then
    /// extended upward and downward through unassigned cells until an
    /// assigned cell is hit on each side.
    fn connected_rows(
        &self,
        column: u32,
        lo_row: u32,
        hi_row: u32,
        previous: &[u32],
    ) -> Vec<u32> {
        let core: Vec<u32> = previous
            .iter()
            .copied()
            .filter(|&row| self.grid.room_of(CellCoord::new(column, row)).is_none())
            .collect();

        let (Some(&top), Some(&bottom)) = (core.first(), core.last()) else {
            return Vec::new();
        };

        let mut rows = Vec::with_capacity(core.len());
        for row in (lo_row..top).rev() {
            if self.grid.room_of(CellCoord::new(column, row)).is_none() {
                rows.push(row);
            } else {
                break;
            }
        }
        rows.reverse();
        rows.extend_from_slice(&core);
        for row in bottom + 1..=hi_row {
            if self.grid.room_of(CellCoord::new(column, row)).is_none() {
                rows.push(row);
            } else {
                break;
            }
        }

        rows
    }

    /// Claims a cell for a room and rolls the wall-closure draws against
    /// every neighbour that already belongs to a different room.
    ///
    /// Walls never close within one room nor against unassigned cells, and
    /// no draw is consumed for those edges.
    fn claim(&mut self, coord: CellCoord, room: RoomId) -> Result<(), GridError> {
        if !self.grid.assign_room(coord, room)? {
            return Ok(());
        }

        for direction in Direction::ALL {
            let Some(next) = self.grid.neighbor(coord, direction) else {
                continue;
            };
            let Some(other) = self.grid.room_of(next) else {
                continue;
            };
            if other == room {
                continue;
            }

            let draw = self.source.next_uniform();
            if draw < self.params.wall_density() {
                self.grid.set_open(coord, direction, false)?;
            }
        }

        Ok(())
    }

    /// Probes reachability from the anchor and carves a corridor when the
    /// freshly grown room is cut off.
    fn ensure_connected(
        &mut self,
        anchor: CellCoord,
        room: RoomId,
        accepted: &[CellCoord],
    ) -> Result<(), GenerationError> {
        let Some(&target) = accepted.first() else {
            return Ok(());
        };

        if route_exists(&self.grid, anchor, target) {
            return Ok(());
        }

        self.repaired_rooms = self.repaired_rooms.saturating_add(1);
        let Some(&start) = accepted
            .iter()
            .min_by_key(|coord| coord.manhattan_distance(anchor))
        else {
            return Ok(());
        };
        log::debug!(
            "room {} cut off from anchor {anchor:?}; carving from {start:?}",
            room.get()
        );

        self.carve_corridor(anchor, room, start)?;

        if route_exists(&self.grid, anchor, target) {
            Ok(())
        } else {
            log::error!(
                "room {} still unreachable from {anchor:?} after carving",
                room.get()
            );
            Err(GenerationError::UnreachableAfterRepair {
                room,
                anchor,
                target,
            })
        }
    }

    /// Steps from `start` toward the anchor, opening the wall in the chosen
    /// direction each step. Unassigned cells reached on the way are absorbed
    /// into the room; reaching a cell of another room ends the carve.
    ///
    /// Every step shrinks the Manhattan distance to the anchor by one, so
    /// the walk is bounded by the initial distance; running past it means an
    /// invariant broke and the pass fails closed.
    fn carve_corridor(
        &mut self,
        anchor: CellCoord,
        room: RoomId,
        start: CellCoord,
    ) -> Result<(), GenerationError> {
        let mut cursor = start;
        let mut remaining_steps = start.manhattan_distance(anchor);

        while cursor != anchor {
            if remaining_steps == 0 {
                return Err(GenerationError::UnreachableAfterRepair {
                    room,
                    anchor,
                    target: start,
                });
            }
            remaining_steps -= 1;

            let direction = carve_direction(cursor, anchor);
            let was_open = self.grid.is_open(cursor, direction);
            self.grid
                .set_open(cursor, direction, true)
                .map_err(GenerationError::from)?;
            if !was_open {
                self.carved_openings = self.carved_openings.saturating_add(1);
            }

            let Some(next) = self.grid.neighbor(cursor, direction) else {
                return Err(GenerationError::UnreachableAfterRepair {
                    room,
                    anchor,
                    target: start,
                });
            };

            match self.grid.room_of(next) {
                None => {
                    self.claim(next, room)?;
                    cursor = next;
                }
                Some(other) if other != room => break,
                Some(_) => cursor = next,
            }
        }

        Ok(())
    }
}

/// Direction of the next carve step: the axis with the greater remaining
/// absolute distance wins, ties go horizontal.
fn carve_direction(from: CellCoord, toward: CellCoord) -> Direction {
    let columns = i64::from(toward.column()) - i64::from(from.column());
    let rows = i64::from(toward.row()) - i64::from(from.row());

    if columns != 0 && columns.abs() >= rows.abs() {
        if columns > 0 {
            Direction::East
        } else {
            Direction::West
        }
    } else if rows > 0 {
        Direction::South
    } else {
        Direction::North
    }
}

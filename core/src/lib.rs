#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Warren level generator.
//!
//! This crate defines the vocabulary that connects the grid model, the
//! generation and navigation systems, and the presentation adapters: cell
//! coordinates, edge directions, room identifiers, the generator
//! configuration surface, and the typed errors those components report.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Returns the neighbouring coordinate in the provided direction, if it
    /// does not underflow the coordinate space.
    ///
    /// Callers that hold a grid are expected to bound the result against the
    /// grid side; this helper only guards the zero edge.
    #[must_use]
    pub fn stepped(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::North => self
                .row
                .checked_sub(1)
                .map(|row| Self::new(self.column, row)),
            Direction::East => self
                .column
                .checked_add(1)
                .map(|column| Self::new(column, self.row)),
            Direction::South => self
                .row
                .checked_add(1)
                .map(|row| Self::new(self.column, row)),
            Direction::West => self
                .column
                .checked_sub(1)
                .map(|column| Self::new(column, self.row)),
        }
    }
}

/// Cardinal directions naming the four edges that leave a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// Toward increasing column indices.
    East,
    /// Toward increasing row indices.
    South,
    /// Toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in the stable scan order used across the workspace.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Returns the opposite direction.
    ///
    /// `reverse` is an involution: `d.reverse().reverse() == d` for every
    /// direction, which is what lets both sides of a shared wall be mutated
    /// together.
    #[must_use]
    pub const fn reverse(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Dense index of the direction within per-cell edge storage.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }
}

/// Identifier assigned to a carved room. Identifiers start at one; a cell
/// without a room is represented as `Option::None`, never as a reserved id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(u32);

impl RoomId {
    /// First identifier handed out by the generator.
    pub const FIRST: RoomId = RoomId(1);

    /// Creates a room identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Identifier that follows this one in allocation order.
    #[must_use]
    pub const fn next(self) -> RoomId {
        RoomId(self.0.saturating_add(1))
    }
}

/// Host-facing generation parameters, prior to normalisation.
///
/// The host hands this surface to the generator once; `normalized` turns it
/// into validated [`LevelParams`] by clamping the playable area down to a
/// whole number of cells, clamping the wall density into `[0, 1]`, and
/// floor-clamping a negative seed request to zero.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Side length of the square playable area in world units.
    pub area_size: f32,
    /// Side length of a single square cell in world units.
    pub cell_size: f32,
    /// Inclusive lower bound of the target room size draw, in cells per axis.
    pub min_room_size: u32,
    /// Exclusive upper bound of the target room size draw, in cells per axis.
    pub max_room_size: u32,
    /// Probability that a wall closes between two adjacent rooms.
    pub wall_density: f32,
    /// Seed requested for the uniform random source. Negative values clamp
    /// to zero during normalisation.
    pub seed: i64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            area_size: 16.0,
            cell_size: 1.0,
            min_room_size: 2,
            max_room_size: 6,
            wall_density: 0.5,
            seed: 0,
        }
    }
}

impl GeneratorConfig {
    /// Validates the configuration and resolves the derived grid geometry.
    pub fn normalized(&self) -> Result<LevelParams, ConfigError> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(ConfigError::NonPositiveCellSize {
                cell_size: self.cell_size,
            });
        }

        if !self.area_size.is_finite() || self.area_size < self.cell_size {
            return Err(ConfigError::AreaTooSmall {
                area_size: self.area_size,
                cell_size: self.cell_size,
            });
        }

        if self.min_room_size == 0 {
            return Err(ConfigError::ZeroRoomSize);
        }

        if self.max_room_size < self.min_room_size {
            return Err(ConfigError::InvertedRoomSizes {
                min: self.min_room_size,
                max: self.max_room_size,
            });
        }

        let side = (self.area_size / self.cell_size).floor() as u32;
        let wall_density = self.wall_density.clamp(0.0, 1.0);
        let seed = u64::try_from(self.seed.max(0)).unwrap_or(0);

        Ok(LevelParams {
            side,
            cell_size: self.cell_size,
            min_room_size: self.min_room_size,
            max_room_size: self.max_room_size,
            wall_density,
            seed,
        })
    }
}

/// Validated generation parameters with the derived grid geometry resolved.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelParams {
    side: u32,
    cell_size: f32,
    min_room_size: u32,
    max_room_size: u32,
    wall_density: f32,
    seed: u64,
}

impl LevelParams {
    /// Number of cells along each axis of the square grid.
    #[must_use]
    pub const fn side(&self) -> u32 {
        self.side
    }

    /// Side length of a single square cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Inclusive lower bound of the target room size draw.
    #[must_use]
    pub const fn min_room_size(&self) -> u32 {
        self.min_room_size
    }

    /// Exclusive upper bound of the target room size draw.
    #[must_use]
    pub const fn max_room_size(&self) -> u32 {
        self.max_room_size
    }

    /// Probability that a wall closes between two adjacent rooms, in `[0, 1]`.
    #[must_use]
    pub const fn wall_density(&self) -> f32 {
        self.wall_density
    }

    /// Seed for the uniform random source.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

/// Reasons a [`GeneratorConfig`] fails normalisation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Error)]
pub enum ConfigError {
    /// The cell size must be a positive finite length.
    #[error("cell size {cell_size} is not a positive finite length")]
    NonPositiveCellSize {
        /// Requested cell side length.
        cell_size: f32,
    },
    /// The playable area must hold at least one whole cell.
    #[error("area size {area_size} does not hold a single cell of size {cell_size}")]
    AreaTooSmall {
        /// Requested area side length.
        area_size: f32,
        /// Requested cell side length.
        cell_size: f32,
    },
    /// Rooms must target at least one cell per axis.
    #[error("minimum room size must be at least one cell")]
    ZeroRoomSize,
    /// The room size range must not be inverted.
    #[error("room size range is inverted: min {min} exceeds max {max}")]
    InvertedRoomSizes {
        /// Requested inclusive lower bound.
        min: u32,
        /// Requested exclusive upper bound.
        max: u32,
    },
}

/// Errors reported by bounds-checked grid lookups.
///
/// Only direct integer indexing can fail; the clamped world-position lookup
/// always resolves to a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum GridError {
    /// The requested coordinate lies outside the `side × side` lattice.
    #[error("coordinate ({column}, {row}) lies outside the {side}x{side} grid")]
    InvalidCoordinate {
        /// Requested column index.
        column: u32,
        /// Requested row index.
        row: u32,
        /// Number of cells along each grid axis.
        side: u32,
    },
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative cell lattice for Warren levels.
//!
//! The grid is created once at generation start and never resized. The
//! generator is its only writer while a level is being carved; afterwards the
//! navigation system reads it through shared borrows. Edge passability is
//! stored on both adjacent cells and mutated through [`Grid::set_open`],
//! which keeps the two sides of every wall in agreement.

use glam::Vec3;
use warren_core::{CellCoord, Direction, GridError, RoomId};

/// One grid unit: room membership plus the passability of the four edges
/// leaving it.
///
/// The centre position is derived from the coordinate and the grid geometry,
/// never stored.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    coord: CellCoord,
    room: Option<RoomId>,
    open: [bool; 4],
}

impl Cell {
    /// Coordinate of the cell within the lattice.
    #[must_use]
    pub const fn coord(&self) -> CellCoord {
        self.coord
    }

    /// Room the cell belongs to, if it has been assigned yet.
    #[must_use]
    pub const fn room(&self) -> Option<RoomId> {
        self.room
    }

    /// Whether the edge leaving the cell in the provided direction is open.
    #[must_use]
    pub const fn is_open(&self, direction: Direction) -> bool {
        self.open[direction.index()]
    }
}

/// Square `side × side` lattice of [`Cell`]s.
///
/// Interior edges start open; edges on the grid boundary start closed and
/// stay closed — the mutation API refuses edges that would leave the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    side: u32,
    cell_size: f32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates an unassigned grid with the provided geometry.
    #[must_use]
    pub fn new(side: u32, cell_size: f32) -> Self {
        let capacity_u64 = u64::from(side) * u64::from(side);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        let mut cells = Vec::with_capacity(capacity);

        for row in 0..side {
            for column in 0..side {
                let mut open = [false; 4];
                open[Direction::North.index()] = row > 0;
                open[Direction::East.index()] = column + 1 < side;
                open[Direction::South.index()] = row + 1 < side;
                open[Direction::West.index()] = column > 0;
                cells.push(Cell {
                    coord: CellCoord::new(column, row),
                    room: None,
                    open,
                });
            }
        }

        Self {
            side,
            cell_size,
            cells,
        }
    }

    /// Number of cells along each axis.
    #[must_use]
    pub const fn side(&self) -> u32 {
        self.side
    }

    /// Side length of a single square cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Bounds-checked lookup by integer coordinate.
    pub fn cell(&self, coord: CellCoord) -> Result<&Cell, GridError> {
        self.index(coord)
            .and_then(|index| self.cells.get(index))
            .ok_or(GridError::InvalidCoordinate {
                column: coord.column(),
                row: coord.row(),
                side: self.side,
            })
    }

    /// Room membership of the cell at the provided coordinate.
    ///
    /// `None` covers both an out-of-bounds coordinate and a cell that has not
    /// been assigned yet; use [`Grid::cell`] when the distinction matters.
    #[must_use]
    pub fn room_of(&self, coord: CellCoord) -> Option<RoomId> {
        self.index(coord)
            .and_then(|index| self.cells.get(index))
            .and_then(|cell| cell.room)
    }

    /// Neighbouring coordinate in the provided direction.
    ///
    /// `None` means the edge leaves the grid — distinct from a neighbour
    /// that exists but is impassable.
    #[must_use]
    pub fn neighbor(&self, coord: CellCoord, direction: Direction) -> Option<CellCoord> {
        let next = coord.stepped(direction)?;
        (next.column() < self.side && next.row() < self.side).then_some(next)
    }

    /// Whether the edge leaving `coord` in `direction` is open.
    ///
    /// Out-of-bounds coordinates report a closed edge.
    #[must_use]
    pub fn is_open(&self, coord: CellCoord, direction: Direction) -> bool {
        self.index(coord)
            .and_then(|index| self.cells.get(index))
            .map_or(false, |cell| cell.is_open(direction))
    }

    /// Opens or closes the interior edge leaving `coord` in `direction`.
    ///
    /// Both sides of the wall are updated together, so the adjacency flags of
    /// the two cells can never disagree. Edges that would leave the grid are
    /// rejected, which is what keeps boundary edges permanently closed.
    pub fn set_open(
        &mut self,
        coord: CellCoord,
        direction: Direction,
        open: bool,
    ) -> Result<(), GridError> {
        let index = self.index(coord).ok_or(GridError::InvalidCoordinate {
            column: coord.column(),
            row: coord.row(),
            side: self.side,
        })?;

        let Some(next) = self.neighbor(coord, direction) else {
            return Err(GridError::InvalidCoordinate {
                column: off_grid_column(coord, direction),
                row: off_grid_row(coord, direction),
                side: self.side,
            });
        };
        let next_index = self.index(next).ok_or(GridError::InvalidCoordinate {
            column: next.column(),
            row: next.row(),
            side: self.side,
        })?;

        self.cells[index].open[direction.index()] = open;
        self.cells[next_index].open[direction.reverse().index()] = open;
        Ok(())
    }

    /// Assigns the cell to a room if it has no room yet.
    ///
    /// Returns whether the assignment took effect. Membership is monotonic: a
    /// cell that already belongs to a room keeps it, so identifiers can never
    /// be reassigned or cleared through this API.
    pub fn assign_room(&mut self, coord: CellCoord, room: RoomId) -> Result<bool, GridError> {
        let index = self.index(coord).ok_or(GridError::InvalidCoordinate {
            column: coord.column(),
            row: coord.row(),
            side: self.side,
        })?;

        let cell = &mut self.cells[index];
        if cell.room.is_some() {
            return Ok(false);
        }

        cell.room = Some(room);
        Ok(true)
    }

    /// World-space centre of the cell at the provided coordinate.
    ///
    /// The grid is centred on the world origin; the vertical axis is always
    /// zero for grid logic.
    #[must_use]
    pub fn center_position(&self, coord: CellCoord) -> Vec3 {
        let half_side = self.side as f32 / 2.0;
        Vec3::new(
            self.cell_size * (coord.column() as f32 + 0.5 - half_side),
            0.0,
            self.cell_size * (coord.row() as f32 + 0.5 - half_side),
        )
    }

    /// Resolves a world position to the cell containing it.
    ///
    /// Never fails: the computed index is clamped into `[0, side - 1]` per
    /// axis, so positions outside the playable area resolve to the nearest
    /// edge cell.
    #[must_use]
    pub fn cell_at_world(&self, position: Vec3) -> CellCoord {
        let half_side = self.side as f32 / 2.0;
        let limit = self.side.saturating_sub(1) as f32;
        let column = ((position.x / self.cell_size) + half_side)
            .floor()
            .clamp(0.0, limit) as u32;
        let row = ((position.z / self.cell_size) + half_side)
            .floor()
            .clamp(0.0, limit) as u32;
        CellCoord::new(column, row)
    }

    /// Iterator over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    fn index(&self, coord: CellCoord) -> Option<usize> {
        if coord.column() < self.side && coord.row() < self.side {
            let row = usize::try_from(coord.row()).ok()?;
            let column = usize::try_from(coord.column()).ok()?;
            let side = usize::try_from(self.side).ok()?;
            Some(row * side + column)
        } else {
            None
        }
    }
}

fn off_grid_column(coord: CellCoord, direction: Direction) -> u32 {
    match direction {
        Direction::East => coord.column().saturating_add(1),
        Direction::West => coord.column().wrapping_sub(1),
        Direction::North | Direction::South => coord.column(),
    }
}

fn off_grid_row(coord: CellCoord, direction: Direction) -> u32 {
    match direction {
        Direction::South => coord.row().saturating_add(1),
        Direction::North => coord.row().wrapping_sub(1),
        Direction::East | Direction::West => coord.row(),
    }
}

/// Read-only queries over a grid.
pub mod query {
    use std::collections::VecDeque;

    use warren_core::{CellCoord, Direction};

    use super::Grid;

    /// Breadth-first flood fill over open edges between assigned cells.
    ///
    /// Returns the reachable coordinates in visit order, starting with
    /// `start` itself. An unassigned or out-of-bounds start yields an empty
    /// result.
    #[must_use]
    pub fn reachable_cells(grid: &Grid, start: CellCoord) -> Vec<CellCoord> {
        if grid.room_of(start).is_none() {
            return Vec::new();
        }

        let cell_count = usize::try_from(u64::from(grid.side()) * u64::from(grid.side()))
            .unwrap_or(0);
        let mut visited = vec![false; cell_count];
        let mut out = Vec::new();
        let mut queue = VecDeque::new();

        if let Some(index) = grid.index(start) {
            visited[index] = true;
            queue.push_back(start);
        }

        while let Some(coord) = queue.pop_front() {
            out.push(coord);

            for direction in Direction::ALL {
                if !grid.is_open(coord, direction) {
                    continue;
                }

                let Some(next) = grid.neighbor(coord, direction) else {
                    continue;
                };

                if grid.room_of(next).is_none() {
                    continue;
                }

                let Some(next_index) = grid.index(next) else {
                    continue;
                };

                if visited[next_index] {
                    continue;
                }

                visited[next_index] = true;
                queue.push_back(next);
            }
        }

        out
    }

    /// Number of cells that have been assigned to a room.
    #[must_use]
    pub fn assigned_cells(grid: &Grid) -> usize {
        grid.cells().filter(|cell| cell.room().is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warren_core::RoomId;

    #[test]
    fn new_grid_closes_boundary_edges_and_opens_interior_ones() {
        let grid = Grid::new(3, 1.0);

        let corner = CellCoord::new(0, 0);
        assert!(!grid.is_open(corner, Direction::North));
        assert!(!grid.is_open(corner, Direction::West));
        assert!(grid.is_open(corner, Direction::East));
        assert!(grid.is_open(corner, Direction::South));

        let center = CellCoord::new(1, 1);
        for direction in Direction::ALL {
            assert!(grid.is_open(center, direction));
        }
    }

    #[test]
    fn neighbor_is_none_at_the_boundary() {
        let grid = Grid::new(3, 1.0);

        assert_eq!(grid.neighbor(CellCoord::new(0, 0), Direction::North), None);
        assert_eq!(grid.neighbor(CellCoord::new(2, 2), Direction::East), None);
        assert_eq!(
            grid.neighbor(CellCoord::new(1, 1), Direction::West),
            Some(CellCoord::new(0, 1))
        );
    }

    #[test]
    fn set_open_updates_both_sides_of_the_wall() {
        let mut grid = Grid::new(3, 1.0);
        let coord = CellCoord::new(0, 1);

        grid.set_open(coord, Direction::East, false)
            .expect("interior edge");

        assert!(!grid.is_open(coord, Direction::East));
        assert!(!grid.is_open(CellCoord::new(1, 1), Direction::West));

        grid.set_open(CellCoord::new(1, 1), Direction::West, true)
            .expect("interior edge");

        assert!(grid.is_open(coord, Direction::East));
        assert!(grid.is_open(CellCoord::new(1, 1), Direction::West));
    }

    #[test]
    fn set_open_rejects_edges_leaving_the_grid() {
        let mut grid = Grid::new(3, 1.0);

        assert!(grid
            .set_open(CellCoord::new(0, 0), Direction::North, true)
            .is_err());
        assert!(!grid.is_open(CellCoord::new(0, 0), Direction::North));
    }

    #[test]
    fn cell_lookup_reports_out_of_bounds_coordinates() {
        let grid = Grid::new(3, 1.0);

        assert!(grid.cell(CellCoord::new(1, 2)).is_ok());
        assert_eq!(
            grid.cell(CellCoord::new(3, 0)),
            Err(warren_core::GridError::InvalidCoordinate {
                column: 3,
                row: 0,
                side: 3,
            })
        );
    }

    #[test]
    fn room_assignment_is_monotonic() {
        let mut grid = Grid::new(2, 1.0);
        let coord = CellCoord::new(1, 0);

        assert!(grid.assign_room(coord, RoomId::new(1)).expect("in bounds"));
        assert!(!grid.assign_room(coord, RoomId::new(2)).expect("in bounds"));
        assert_eq!(grid.room_of(coord), Some(RoomId::new(1)));
    }

    #[test]
    fn center_position_is_symmetric_about_the_origin() {
        let grid = Grid::new(4, 2.0);

        let first = grid.center_position(CellCoord::new(0, 0));
        let last = grid.center_position(CellCoord::new(3, 3));

        assert_eq!(first, glam::Vec3::new(-3.0, 0.0, -3.0));
        assert_eq!(last, glam::Vec3::new(3.0, 0.0, 3.0));
    }

    #[test]
    fn world_lookup_inverts_center_position() {
        let grid = Grid::new(5, 1.5);

        for row in 0..5 {
            for column in 0..5 {
                let coord = CellCoord::new(column, row);
                let center = grid.center_position(coord);
                assert_eq!(grid.cell_at_world(center), coord);
            }
        }
    }

    #[test]
    fn world_lookup_clamps_positions_outside_the_area() {
        let grid = Grid::new(4, 1.0);

        let far = glam::Vec3::new(100.0, 0.0, -100.0);
        assert_eq!(grid.cell_at_world(far), CellCoord::new(3, 0));
    }

    #[test]
    fn flood_fill_respects_walls_and_unassigned_cells() {
        let mut grid = Grid::new(2, 1.0);
        let room = RoomId::new(1);

        for coord in [
            CellCoord::new(0, 0),
            CellCoord::new(1, 0),
            CellCoord::new(0, 1),
        ] {
            assert!(grid.assign_room(coord, room).expect("in bounds"));
        }

        grid.set_open(CellCoord::new(0, 0), Direction::South, false)
            .expect("interior edge");

        let reachable = query::reachable_cells(&grid, CellCoord::new(0, 0));
        assert_eq!(
            reachable,
            vec![CellCoord::new(0, 0), CellCoord::new(1, 0)],
            "the closed wall and the unassigned cell must both stop the fill",
        );
    }

    #[test]
    fn flood_fill_from_unassigned_cell_is_empty() {
        let grid = Grid::new(2, 1.0);
        assert!(query::reachable_cells(&grid, CellCoord::new(0, 0)).is_empty());
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wall-renderer contract for Warren adapters.
//!
//! The generator leaves its result in the grid's edge flags; this crate
//! turns those flags into the renderable layout an external wall renderer
//! consumes: one segment per closed interior edge plus caps wherever a run
//! of consecutive closed edges along a grid line starts or ends. The layout
//! is a pure sink — nothing here feeds back into generation.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use warren_core::{CellCoord, Direction};
use warren_grid::Grid;

/// Orientation of a wall segment in plan view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallOrientation {
    /// The wall lies on a row boundary and runs along the x axis.
    RowBoundary,
    /// The wall lies on a column boundary and runs along the z axis.
    ColumnBoundary,
}

/// One renderable wall piece covering a single closed interior edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WallSegment {
    /// Cell on the north or west side of the closed edge.
    pub cell: CellCoord,
    /// Boundary of the cell the wall covers.
    pub orientation: WallOrientation,
    /// World-space midpoint of the segment.
    pub position: Vec3,
    /// World-space length of the segment.
    pub length: f32,
}

/// Post placed where a run of consecutive closed edges starts or ends.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WallCap {
    /// World-space position of the cap on the grid-line corner.
    pub position: Vec3,
}

/// Complete renderable wall set extracted from a grid.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WallLayout {
    /// One segment per closed interior edge.
    pub segments: Vec<WallSegment>,
    /// End caps at the boundaries of every maximal closed run.
    pub caps: Vec<WallCap>,
}

impl WallLayout {
    /// Whether the layout holds neither segments nor caps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.caps.is_empty()
    }
}

/// Extracts the renderable wall layout from a grid.
///
/// Every closed interior edge is emitted exactly once, keyed by the cell on
/// its north or west side. Caps land on the grid-line corners where a
/// maximal run of closed edges begins and ends — a single closed edge gets
/// one cap on each side.
#[must_use]
pub fn wall_layout(grid: &Grid) -> WallLayout {
    let mut layout = WallLayout::default();
    let side = grid.side();

    // Row boundaries: south edges of each row, scanned left to right.
    for row in 0..side.saturating_sub(1) {
        let mut run_start: Option<u32> = None;
        for column in 0..=side {
            let closed = column < side
                && !grid.is_open(CellCoord::new(column, row), Direction::South);
            if closed {
                if run_start.is_none() {
                    run_start = Some(column);
                }
                layout.segments.push(row_boundary_segment(grid, column, row));
            } else if let Some(start) = run_start.take() {
                layout.caps.push(corner_cap(grid, start, row + 1));
                layout.caps.push(corner_cap(grid, column, row + 1));
            }
        }
    }

    // Column boundaries: east edges of each column, scanned top to bottom.
    for column in 0..side.saturating_sub(1) {
        let mut run_start: Option<u32> = None;
        for row in 0..=side {
            let closed =
                row < side && !grid.is_open(CellCoord::new(column, row), Direction::East);
            if closed {
                if run_start.is_none() {
                    run_start = Some(row);
                }
                layout
                    .segments
                    .push(column_boundary_segment(grid, column, row));
            } else if let Some(start) = run_start.take() {
                layout.caps.push(corner_cap(grid, column + 1, start));
                layout.caps.push(corner_cap(grid, column + 1, row));
            }
        }
    }

    layout
}

fn row_boundary_segment(grid: &Grid, column: u32, row: u32) -> WallSegment {
    let cell_size = grid.cell_size();
    let half_side = grid.side() as f32 / 2.0;
    WallSegment {
        cell: CellCoord::new(column, row),
        orientation: WallOrientation::RowBoundary,
        position: Vec3::new(
            cell_size * (column as f32 + 0.5 - half_side),
            0.0,
            cell_size * (row as f32 + 1.0 - half_side),
        ),
        length: cell_size,
    }
}

fn column_boundary_segment(grid: &Grid, column: u32, row: u32) -> WallSegment {
    let cell_size = grid.cell_size();
    let half_side = grid.side() as f32 / 2.0;
    WallSegment {
        cell: CellCoord::new(column, row),
        orientation: WallOrientation::ColumnBoundary,
        position: Vec3::new(
            cell_size * (column as f32 + 1.0 - half_side),
            0.0,
            cell_size * (row as f32 + 0.5 - half_side),
        ),
        length: cell_size,
    }
}

/// World position of the grid-line corner at the provided boundary indices.
fn corner_cap(grid: &Grid, corner_column: u32, corner_row: u32) -> WallCap {
    let cell_size = grid.cell_size();
    let half_side = grid.side() as f32 / 2.0;
    WallCap {
        position: Vec3::new(
            cell_size * (corner_column as f32 - half_side),
            0.0,
            cell_size * (corner_row as f32 - half_side),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warren_core::RoomId;

    fn assigned_grid(side: u32) -> Grid {
        let mut grid = Grid::new(side, 1.0);
        for row in 0..side {
            for column in 0..side {
                assert!(grid
                    .assign_room(CellCoord::new(column, row), RoomId::FIRST)
                    .expect("in bounds"));
            }
        }
        grid
    }

    #[test]
    fn open_grid_yields_an_empty_layout() {
        let grid = assigned_grid(3);
        assert!(wall_layout(&grid).is_empty());
    }

    #[test]
    fn one_segment_per_closed_edge_with_caps_on_both_sides() {
        let mut grid = assigned_grid(3);
        grid.set_open(CellCoord::new(1, 1), Direction::East, false)
            .expect("interior edge");

        let layout = wall_layout(&grid);

        assert_eq!(layout.segments.len(), 1, "both cell sides share one wall");
        let segment = layout.segments[0];
        assert_eq!(segment.cell, CellCoord::new(1, 1));
        assert_eq!(segment.orientation, WallOrientation::ColumnBoundary);
        assert_eq!(segment.position, Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(layout.caps.len(), 2);
        assert_eq!(layout.caps[0].position, Vec3::new(0.5, 0.0, -0.5));
        assert_eq!(layout.caps[1].position, Vec3::new(0.5, 0.0, 0.5));
    }

    #[test]
    fn runs_emit_caps_only_at_their_boundaries() {
        let mut grid = assigned_grid(4);
        for column in 0..3 {
            grid.set_open(CellCoord::new(column, 0), Direction::South, false)
                .expect("interior edge");
        }

        let layout = wall_layout(&grid);

        assert_eq!(layout.segments.len(), 3);
        assert!(layout
            .segments
            .iter()
            .all(|segment| segment.orientation == WallOrientation::RowBoundary));
        // One maximal run of three edges: caps at the run's two corners only.
        assert_eq!(layout.caps.len(), 2);
        assert_eq!(layout.caps[0].position, Vec3::new(-2.0, 0.0, -1.0));
        assert_eq!(layout.caps[1].position, Vec3::new(1.0, 0.0, -1.0));
    }

    #[test]
    fn separate_runs_on_one_line_each_get_their_own_caps() {
        let mut grid = assigned_grid(5);
        for column in [0, 1, 3] {
            grid.set_open(CellCoord::new(column, 2), Direction::South, false)
                .expect("interior edge");
        }

        let layout = wall_layout(&grid);

        assert_eq!(layout.segments.len(), 3);
        assert_eq!(layout.caps.len(), 4, "two runs, each capped at both ends");
    }

    #[test]
    fn runs_reaching_the_grid_edge_still_close_their_cap() {
        let mut grid = assigned_grid(3);
        for column in 0..3 {
            grid.set_open(CellCoord::new(column, 1), Direction::South, false)
                .expect("interior edge");
        }

        let layout = wall_layout(&grid);

        assert_eq!(layout.segments.len(), 3);
        assert_eq!(layout.caps.len(), 2);
        assert_eq!(layout.caps[0].position, Vec3::new(-1.5, 0.0, 0.5));
        assert_eq!(layout.caps[1].position, Vec3::new(1.5, 0.0, 0.5));
    }
}

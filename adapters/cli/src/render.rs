use warren_core::{CellCoord, Direction};
use warren_grid::Grid;

/// Renders the grid as boxed ASCII art, one glyph per cell.
///
/// Closed edges draw as wall strokes, the anchor draws as `@`, and every
/// other cell shows the last digit of its room id.
pub(crate) fn render_ascii(grid: &Grid, anchor: CellCoord) -> String {
    let side = grid.side();
    let mut out = String::new();

    for row in 0..side {
        for column in 0..side {
            out.push('+');
            let open = grid.is_open(CellCoord::new(column, row), Direction::North);
            out.push_str(if open { "   " } else { "---" });
        }
        out.push_str("+\n");

        for column in 0..side {
            let coord = CellCoord::new(column, row);
            let open = grid.is_open(coord, Direction::West);
            out.push(if open { ' ' } else { '|' });
            out.push(' ');
            out.push(cell_glyph(grid, coord, anchor));
            out.push(' ');
        }
        out.push_str("|\n");
    }

    for _ in 0..side {
        out.push_str("+---");
    }
    out.push_str("+\n");
    out
}

fn cell_glyph(grid: &Grid, coord: CellCoord, anchor: CellCoord) -> char {
    if coord == anchor {
        return '@';
    }

    match grid.room_of(coord) {
        None => '.',
        Some(room) => char::from_digit(room.get() % 10, 10).unwrap_or('?'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warren_core::RoomId;

    #[test]
    fn render_marks_walls_rooms_and_anchor() {
        let mut grid = Grid::new(2, 1.0);
        for row in 0..2 {
            for column in 0..2 {
                assert!(grid
                    .assign_room(CellCoord::new(column, row), RoomId::FIRST)
                    .expect("in bounds"));
            }
        }
        grid.set_open(CellCoord::new(0, 0), Direction::East, false)
            .expect("interior edge");

        let rendered = render_ascii(&grid, CellCoord::new(0, 0));

        let expected = "\
+---+---+
| @ | 1 |
+   +   +
| 1   1 |
+---+---+
";
        assert_eq!(rendered, expected);
    }
}

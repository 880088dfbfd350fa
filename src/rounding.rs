//! Corner rounding decisions for the rounded pixel style.
//!
//! Each module looks at its 3x3 neighbourhood. A dark module rounds the corners that stick out
//! of its dark region (convex corners), a light module rounds the corners where a dark region
//! wraps around it (concave corners), which makes connected dark regions read as one smooth blob.

use crate::grid::ModuleGrid;

/// Which corners of a single module are drawn rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CornerRounding {
    /// Left-top.
    pub lt: bool,
    /// Right-top.
    pub rt: bool,
    /// Left-bottom.
    pub lb: bool,
    /// Right-bottom.
    pub rb: bool,
}

impl CornerRounding {
    pub const NONE: CornerRounding = CornerRounding { lt: false, rt: false, lb: false, rb: false };

    pub fn any(&self) -> bool {
        self.lt || self.rt || self.lb || self.rb
    }

    /// The same corner set seen after turning the grid by 180 degrees.
    pub fn rotated_half_turn(self) -> Self {
        CornerRounding { lt: self.rb, rt: self.lb, lb: self.rt, rb: self.lt }
    }
}

/// Computes the corner rounding of the module at column `x`, row `y`.
///
/// Out-of-range neighbours count as light. A diagonal neighbour only counts as dark when both
/// orthogonal neighbours next to it are dark too, so diagonally touching but otherwise
/// disconnected modules do not carve into the light module between them.
pub fn corner_rounding(grid: &ModuleGrid, x: usize, y: usize) -> CornerRounding {
    let (x, y) = (x as i64, y as i64);
    let dark = |dx: i64, dy: i64| grid.is_dark_at(x + dx, y + dy);

    let left = dark(-1, 0);
    let top = dark(0, -1);
    let right = dark(1, 0);
    let bottom = dark(0, 1);

    if dark(0, 0) {
        CornerRounding {
            lt: !left && !top,
            rt: !right && !top,
            lb: !left && !bottom,
            rb: !right && !bottom,
        }
    } else {
        CornerRounding {
            lt: left && top && dark(-1, -1),
            rt: right && top && dark(1, -1),
            lb: left && bottom && dark(-1, 1),
            rb: right && bottom && dark(1, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> ModuleGrid {
        let rows: Vec<Vec<bool>> =
            rows.iter().map(|r| r.chars().map(|c| c == '#').collect()).collect();
        ModuleGrid::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_isolated_dark_module_rounds_everywhere() {
        let g = grid(&["...", ".#.", "..."]);
        let corners = corner_rounding(&g, 1, 1);
        assert_eq!(corners, CornerRounding { lt: true, rt: true, lb: true, rb: true });
    }

    #[test]
    fn test_dark_module_in_a_row_keeps_joined_sides() {
        let g = grid(&["...", "###", "..."]);
        assert_eq!(corner_rounding(&g, 1, 1), CornerRounding::NONE);
        assert_eq!(
            corner_rounding(&g, 0, 1),
            CornerRounding { lt: true, rt: false, lb: true, rb: false }
        );
    }

    #[test]
    fn test_light_module_in_concave_corner() {
        let g = grid(&["##.", "#..", "..."]);
        assert_eq!(
            corner_rounding(&g, 1, 1),
            CornerRounding { lt: true, rt: false, lb: false, rb: false }
        );
    }

    #[test]
    fn test_disconnected_diagonal_does_not_round() {
        // The diagonal is dark but only one orthogonal neighbour is.
        let g = grid(&["#..", "#..", "..."]);
        assert_eq!(corner_rounding(&g, 1, 1), CornerRounding::NONE);
        // Both orthogonal neighbours dark but the diagonal itself light.
        let g = grid(&[".#.", "#..", "..."]);
        assert_eq!(corner_rounding(&g, 1, 1), CornerRounding::NONE);
    }

    #[test]
    fn test_edge_neighbours_count_as_light() {
        let g = grid(&["#"]);
        let all = CornerRounding { lt: true, rt: true, lb: true, rb: true };
        assert_eq!(corner_rounding(&g, 0, 0), all);
        let g = grid(&["."]);
        assert!(!corner_rounding(&g, 0, 0).any());
    }

    #[test]
    fn test_half_turn_symmetry() {
        // Deterministic pseudo-random grids.
        let mut state: u32 = 0x2545_f491;
        for size in [1usize, 2, 5, 11, 21] {
            let g = ModuleGrid::from_fn(size, |_, _| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state & 1 == 1
            });
            let rotated = g.rotated_half_turn();
            for y in 0..size {
                for x in 0..size {
                    let expected = corner_rounding(&g, x, y).rotated_half_turn();
                    let actual = corner_rounding(&rotated, size - 1 - x, size - 1 - y);
                    assert_eq!(actual, expected, "size {size}, cell ({x}, {y})");
                }
            }
        }
    }
}

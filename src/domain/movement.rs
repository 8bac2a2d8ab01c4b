/// Movement resolver: one pixel per step, sliding around corners.
///
/// ## Step rule
///
/// For a direction with forward offset `f`:
///   1. Forward cell walkable        → go straight.
///   2. Otherwise look at the two cells diagonally ahead (`f` plus each
///      lateral offset). Exactly one walkable → slide onto it.
///   3. Both or neither walkable     → stay put.
///
/// Rule 3 deliberately refuses to pick a side when both diagonals are
/// open: the avatar only slides when the wall leaves a single way round.
///
/// All reads go through `LayoutGrid::is_walkable`, so a position never
/// lands on the outer ring and neighbour reads never leave the grid.

use super::layout::LayoutGrid;
use crate::error::{Error, Result};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit step in image coordinates (y grows downward).
    pub fn offset(self) -> (i64, i64) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// The two sideways offsets tried when the way ahead is blocked.
    /// Vertical moves try left then right; horizontal moves try up then down.
    pub fn laterals(self) -> [(i64, i64); 2] {
        match self {
            Direction::Up | Direction::Down => [(-1, 0), (1, 0)],
            Direction::Left | Direction::Right => [(0, -1), (0, 1)],
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub fn new(x: u32, y: u32) -> Self {
        Position { x, y }
    }

    fn shifted(self, dx: i64, dy: i64) -> (i64, i64) {
        (self.x as i64 + dx, self.y as i64 + dy)
    }

    pub fn manhattan(self, x: u32, y: u32) -> u64 {
        (self.x as i64 - x as i64).unsigned_abs() + (self.y as i64 - y as i64).unsigned_abs()
    }
}

/// Result of resolving one step.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Step {
    Straight(Position),
    Slide(Position),
    Blocked,
}

impl Step {
    /// Where the avatar ends up, given where it started.
    pub fn target(self, from: Position) -> Position {
        match self {
            Step::Straight(p) | Step::Slide(p) => p,
            Step::Blocked => from,
        }
    }
}

/// Resolve a single step from `pos` towards `dir`.
///
/// `pos` must be walkable; the result is `pos` itself or a walkable cell
/// at Chebyshev distance 1.
pub fn resolve(grid: &LayoutGrid, pos: Position, dir: Direction) -> Step {
    let (fx, fy) = dir.offset();
    let (ax, ay) = pos.shifted(fx, fy);
    if grid.is_walkable(ax, ay) {
        return Step::Straight(Position::new(ax as u32, ay as u32));
    }

    let [(l1x, l1y), (l2x, l2y)] = dir.laterals();
    let (ox, oy) = pos.shifted(fx + l1x, fy + l1y);
    let (px, py) = pos.shifted(fx + l2x, fy + l2y);
    let one = grid.is_walkable(ox, oy);
    let other = grid.is_walkable(px, py);

    match (one, other) {
        (true, false) => Step::Slide(Position::new(ox as u32, oy as u32)),
        (false, true) => Step::Slide(Position::new(px as u32, py as u32)),
        _ => Step::Blocked,
    }
}

/// Single step, returning the new position.
pub fn step(grid: &LayoutGrid, pos: Position, dir: Direction) -> Position {
    resolve(grid, pos, dir).target(pos)
}

/// Repeat the single step `count` times. A block part-way simply stops
/// progress; the remaining repetitions are no-ops.
pub fn step_burst(grid: &LayoutGrid, pos: Position, dir: Direction, count: u32) -> Position {
    (0..count).fold(pos, |p, _| step(grid, p, dir))
}

/// Choose where the avatar starts.
///
/// With a requested coordinate: keep it if walkable, else snap to the
/// nearest walkable cell. Without one: the walkable cell farthest from the
/// image centre. Distances are Manhattan; ties go to the first cell in
/// row-major order.
pub fn start_position(grid: &LayoutGrid, requested: Option<(u32, u32)>) -> Result<Position> {
    match requested {
        Some((x, y)) if grid.is_walkable(x as i64, y as i64) => Ok(Position::new(x, y)),
        Some((x, y)) => {
            let anchor = Position::new(x, y);
            grid.walkable_cells()
                .map(|(cx, cy)| (anchor.manhattan(cx, cy), cx, cy))
                .fold(None, |best: Option<(u64, u32, u32)>, cand| match best {
                    Some(b) if b.0 <= cand.0 => Some(b),
                    _ => Some(cand),
                })
                .map(|(_, cx, cy)| Position::new(cx, cy))
                .ok_or(Error::NoWalkableCell)
        }
        None => {
            let centre = Position::new(grid.width() / 2, grid.height() / 2);
            grid.walkable_cells()
                .map(|(cx, cy)| (centre.manhattan(cx, cy), cx, cy))
                .fold(None, |best: Option<(u64, u32, u32)>, cand| match best {
                    Some(b) if b.0 >= cand.0 => Some(b),
                    _ => Some(cand),
                })
                .map(|(_, cx, cy)| Position::new(cx, cy))
                .ok_or(Error::NoWalkableCell)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::layout::{grid_from, LayoutGrid};

    // Fixtures are drawn with '#' = wall, '.' = air. The outer ring is
    // never walkable, so every fixture carries a border of its own.

    const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    fn p(x: u32, y: u32) -> Position {
        Position::new(x, y)
    }

    // ── Straight moves ──

    #[test]
    fn open_field_moves_straight_each_way() {
        let g = LayoutGrid::all_air(5, 5);
        assert_eq!(resolve(&g, p(2, 2), Direction::Up), Step::Straight(p(2, 1)));
        assert_eq!(resolve(&g, p(2, 2), Direction::Down), Step::Straight(p(2, 3)));
        assert_eq!(resolve(&g, p(2, 2), Direction::Left), Step::Straight(p(1, 2)));
        assert_eq!(resolve(&g, p(2, 2), Direction::Right), Step::Straight(p(3, 2)));
    }

    // ── Corner slides ──

    #[test]
    fn up_slides_right_when_only_right_diagonal_open() {
        let g = grid_from(&[
            "#####",
            "###.#",
            "##..#",
            "#####",
        ]);
        assert_eq!(resolve(&g, p(2, 2), Direction::Up), Step::Slide(p(3, 1)));
    }

    #[test]
    fn up_slides_left_when_only_left_diagonal_open() {
        let g = grid_from(&[
            "#####",
            "#.###",
            "##..#",
            "#####",
        ]);
        assert_eq!(resolve(&g, p(2, 2), Direction::Up), Step::Slide(p(1, 1)));
    }

    #[test]
    fn corner_slide_around_single_opening() {
        // Around (5,5): ahead (5,4) is wall, (4,4) wall, (6,4) open.
        let g = grid_from(&[
            "########",
            "########",
            "########",
            "########",
            "######.#",
            "#.....##",
            "########",
        ]);
        assert_eq!(resolve(&g, p(5, 5), Direction::Up), Step::Slide(p(6, 4)));

        // Open (4,4) as well: two ways round, so no move.
        let g = grid_from(&[
            "########",
            "########",
            "########",
            "########",
            "####.#.#",
            "#.....##",
            "########",
        ]);
        assert_eq!(resolve(&g, p(5, 5), Direction::Up), Step::Blocked);
    }

    #[test]
    fn right_slides_down_around_wall() {
        let g = grid_from(&[
            "#####",
            "#.#.#",
            "#...#",
            "#####",
        ]);
        // Right from (1,1): (2,1) wall, (2,0) border, (2,2) air
        assert_eq!(resolve(&g, p(1, 1), Direction::Right), Step::Slide(p(2, 2)));
    }

    #[test]
    fn left_slides_up_around_wall() {
        let g = grid_from(&[
            "#####",
            "#...#",
            "#.#.#",
            "#####",
        ]);
        // Left from (3,2): (2,2) wall, (2,1) air, (2,3) border
        assert_eq!(resolve(&g, p(3, 2), Direction::Left), Step::Slide(p(2, 1)));
    }

    #[test]
    fn down_slides_left_around_wall() {
        let g = grid_from(&[
            "#####",
            "#...#",
            "#..##",
            "#####",
        ]);
        // Down from (3,1): (3,2) wall, (2,2) air, (4,2) border
        assert_eq!(resolve(&g, p(3, 1), Direction::Down), Step::Slide(p(2, 2)));
    }

    // ── Blocked: both / neither diagonal ──

    #[test]
    fn both_diagonals_open_is_blocked() {
        let g = grid_from(&[
            "#####",
            "#.#.#",
            "#...#",
            "#####",
        ]);
        assert_eq!(resolve(&g, p(2, 2), Direction::Up), Step::Blocked);
        assert_eq!(step(&g, p(2, 2), Direction::Up), p(2, 2));
    }

    #[test]
    fn neither_diagonal_open_is_blocked() {
        let g = grid_from(&[
            "#####",
            "#####",
            "#...#",
            "#####",
        ]);
        assert_eq!(resolve(&g, p(2, 2), Direction::Up), Step::Blocked);
    }

    #[test]
    fn blocked_move_is_idempotent() {
        let g = grid_from(&[
            "#####",
            "#####",
            "#...#",
            "#####",
        ]);
        let once = step(&g, p(2, 2), Direction::Up);
        let twice = step(&g, once, Direction::Up);
        assert_eq!(once, p(2, 2));
        assert_eq!(twice, once);
    }

    #[test]
    fn border_ring_stops_movement() {
        let g = LayoutGrid::all_air(3, 3);
        for dir in ALL {
            assert_eq!(resolve(&g, p(1, 1), dir), Step::Blocked);
        }
    }

    #[test]
    fn every_step_stays_on_air_within_one_cell() {
        let g = grid_from(&[
            "#########",
            "#..#....#",
            "#.##.##.#",
            "#....#..#",
            "##.#...##",
            "#...#.#.#",
            "#########",
        ]);
        let cells: Vec<_> = g.walkable_cells().collect();
        for &(x, y) in &cells {
            for dir in ALL {
                let q = step(&g, p(x, y), dir);
                assert!(g.is_walkable(q.x as i64, q.y as i64));
                let dx = (q.x as i64 - x as i64).abs();
                let dy = (q.y as i64 - y as i64).abs();
                assert!(dx <= 1 && dy <= 1, "jump from ({x},{y}) to {q:?}");
            }
        }
    }

    // ── Bursts ──

    #[test]
    fn burst_moves_count_steps() {
        let g = LayoutGrid::all_air(20, 5);
        assert_eq!(step_burst(&g, p(2, 2), Direction::Right, 5), p(7, 2));
        assert_eq!(step_burst(&g, p(2, 2), Direction::Right, 10), p(12, 2));
    }

    #[test]
    fn burst_halts_at_wall() {
        let g = grid_from(&[
            "##########",
            "#....#####",
            "##########",
        ]);
        assert_eq!(step_burst(&g, p(1, 1), Direction::Right, 10), p(4, 1));
    }

    #[test]
    fn burst_of_zero_is_noop() {
        let g = LayoutGrid::all_air(5, 5);
        assert_eq!(step_burst(&g, p(2, 2), Direction::Up, 0), p(2, 2));
    }

    // ── Start position ──

    #[test]
    fn requested_walkable_start_is_kept() {
        let g = LayoutGrid::all_air(10, 10);
        assert_eq!(start_position(&g, Some((4, 6))).unwrap(), p(4, 6));
    }

    #[test]
    fn requested_wall_start_snaps_to_nearest_air() {
        let g = grid_from(&[
            "######",
            "#.####",
            "####.#",
            "######",
        ]);
        // (3,2): distance 1 to (4,2), 3 to (1,1)
        assert_eq!(start_position(&g, Some((3, 2))).unwrap(), p(4, 2));
    }

    #[test]
    fn requested_start_outside_grid_snaps_inside() {
        let g = LayoutGrid::all_air(6, 6);
        assert_eq!(start_position(&g, Some((100, 100))).unwrap(), p(4, 4));
    }

    #[test]
    fn default_start_is_farthest_from_centre() {
        let g = LayoutGrid::all_air(7, 7);
        // centre (3,3); corners of the interior are at distance 4,
        // first in row-major order is (1,1)
        assert_eq!(start_position(&g, None).unwrap(), p(1, 1));
    }

    #[test]
    fn default_start_skips_walls() {
        let g = grid_from(&[
            "#######",
            "###.###",
            "#.....#",
            "###.###",
            "#######",
        ]);
        // centre (3,2): (1,2) and (5,2) at 2, (3,1)/(3,3) at 1
        assert_eq!(start_position(&g, None).unwrap(), p(1, 2));
    }

    #[test]
    fn no_air_is_an_error() {
        let g = grid_from(&["###", "###", "###"]);
        assert!(matches!(start_position(&g, None), Err(Error::NoWalkableCell)));
        assert!(matches!(start_position(&g, Some((1, 1))), Err(Error::NoWalkableCell)));
    }
}

use veil_core::CellCoord;
use veil_system_pathfinding::find_path;

fn open_grid(_: CellCoord) -> bool {
    false
}

#[test]
fn obstacle_free_path_has_manhattan_length() {
    let start = CellCoord::new(2, 3);
    let goal = CellCoord::new(9, 7);
    let path = find_path(start, goal, 12, 10, open_grid);

    assert_eq!(path.first(), Some(&start));
    assert_eq!(path.last(), Some(&goal));
    assert_eq!(
        path.len() as u32,
        start.manhattan_distance(goal) + 1,
        "uniform-cost A* must find a shortest route on an open grid",
    );
}

#[test]
fn path_detours_around_a_wall_line() {
    // Vertical wall at x == 4 with a single gap at y == 6.
    let is_wall = |cell: CellCoord| cell.x() == 4 && cell.y() != 6;
    let start = CellCoord::new(1, 1);
    let goal = CellCoord::new(8, 1);
    let path = find_path(start, goal, 10, 10, is_wall);

    assert_eq!(path.last(), Some(&goal));
    assert!(path.contains(&CellCoord::new(4, 6)), "must route via the gap");
    assert!(path.iter().all(|cell| !is_wall(*cell)));
}

#[test]
fn walled_off_goal_degrades_to_closest_approach() {
    // The goal at (8,8) sits inside a sealed box; everything else is open.
    let is_wall = |cell: CellCoord| {
        let boxed_x = (7..=9).contains(&cell.x());
        let boxed_y = (7..=9).contains(&cell.y());
        boxed_x && boxed_y && cell != CellCoord::new(8, 8)
    };
    let start = CellCoord::new(0, 0);
    let goal = CellCoord::new(8, 8);
    let path = find_path(start, goal, 12, 12, is_wall);

    assert!(!path.is_empty(), "a degraded path must be returned");
    let tail = *path.last().expect("non-empty path has a tail");
    assert_ne!(tail, goal);
    assert!(
        tail.manhattan_distance(goal) < start.manhattan_distance(goal),
        "the degraded path must end closer to the target than the start",
    );
}

#[test]
fn no_progress_possible_yields_empty_path() {
    // Start boxed in at (0,0) by walls on both exits.
    let is_wall = |cell: CellCoord| cell == CellCoord::new(1, 0) || cell == CellCoord::new(0, 1);
    let path = find_path(CellCoord::new(0, 0), CellCoord::new(5, 5), 8, 8, is_wall);
    assert!(path.is_empty());
}

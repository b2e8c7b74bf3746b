use crate::config::GridLayout;

/// Centre of the cell for the `index`-th territory. Depends only on the
/// index, so identical input order always yields identical coordinates.
pub fn grid_position(index: usize, grid: &GridLayout) -> (f64, f64) {
    let columns = grid.columns.max(1);
    let col = (index % columns) as f64;
    let row = (index / columns) as f64;
    (
        col * grid.spacing_x + grid.origin_x,
        row * grid.spacing_y + grid.origin_y,
    )
}

/// Width and height that fit `count` cells with the origin as margin on
/// every side.
pub fn canvas_extent(count: usize, grid: &GridLayout) -> (f64, f64) {
    if count == 0 {
        return (0.0, 0.0);
    }
    let columns = grid.columns.max(1);
    let used_cols = count.min(columns);
    let rows = (count + columns - 1) / columns;
    (
        (used_cols - 1) as f64 * grid.spacing_x + 2.0 * grid.origin_x,
        (rows - 1) as f64 * grid.spacing_y + 2.0 * grid.origin_y,
    )
}

// occupancy.rs — Cell grid that enforces a minimum distance between corners.
//
// Corner candidates are visited strongest first. A candidate is accepted
// only if no previously accepted corner lies closer than `min_distance`.
// Bucketing accepted corners into cells of side `min_distance` means any
// conflicting corner sits in the candidate's own cell or one of its eight
// neighbours, so each check touches at most nine short lists instead of
// every accepted corner.

use crate::point::Point2f;

/// Spatial hash of accepted corner positions.
pub struct SpacingGrid {
    /// Accepted points, bucketed per cell (row-major).
    cells: Vec<Vec<Point2f>>,
    cols: usize,
    rows: usize,
    cell_size: f32,
    min_distance_sq: f32,
}

impl SpacingGrid {
    /// Create a grid over a `width`×`height` image.
    ///
    /// # Panics
    /// Panics if `min_distance` is not positive.
    pub fn new(width: usize, height: usize, min_distance: f32) -> Self {
        assert!(min_distance > 0.0, "min_distance must be > 0 (got {min_distance})");
        let cell_size = min_distance;
        let cols = ((width as f32 / cell_size).ceil() as usize).max(1);
        let rows = ((height as f32 / cell_size).ceil() as usize).max(1);
        SpacingGrid {
            cells: vec![Vec::new(); cols * rows],
            cols,
            rows,
            cell_size,
            min_distance_sq: min_distance * min_distance,
        }
    }

    /// Accept `p` if it keeps the minimum distance to every accepted point.
    ///
    /// Returns whether the point was accepted.
    pub fn try_insert(&mut self, p: Point2f) -> bool {
        let (col, row) = self.cell_of(p);

        let c0 = col.saturating_sub(1);
        let c1 = (col + 1).min(self.cols - 1);
        let r0 = row.saturating_sub(1);
        let r1 = (row + 1).min(self.rows - 1);

        for r in r0..=r1 {
            for c in c0..=c1 {
                let too_close = self.cells[r * self.cols + c]
                    .iter()
                    .any(|&q| q.distance_sq(p) < self.min_distance_sq);
                if too_close {
                    return false;
                }
            }
        }

        self.cells[row * self.cols + col].push(p);
        true
    }

    fn cell_of(&self, p: Point2f) -> (usize, usize) {
        let col = ((p.x.max(0.0) / self.cell_size) as usize).min(self.cols - 1);
        let row = ((p.y.max(0.0) / self.cell_size) as usize).min(self.rows - 1);
        (col, row)
    }
}

#[cfg(test)]
impl SpacingGrid {
    fn len(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    fn is_empty(&self) -> bool {
        self.cells.iter().all(Vec::is_empty)
    }

    fn dims(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }
}

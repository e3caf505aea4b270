// grid.rs - Toroidal board for Conway's Game of Life

use std::io::Read;

/// Default board extent when no initial-state file is given.
pub const DEFAULT_SIZE: usize = 50;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum GridError {
    #[error("board dimensions must be positive, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} board")]
    OutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("malformed board input: {0}")]
    Malformed(String),
}

/// One generation of cells on a torus: the grid wraps from the last row back
/// to the first and from the last column back to the first.
///
/// Cells are stored row-major, one byte each, strictly 0 (dead) or 1 (alive).
/// The board moves by default; copying is only available through an explicit
/// `clone()`, so there is never more than one writer per buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// Build a board with every cell dead except `live_cells`.
    ///
    /// Duplicate coordinates are fine (the cell is simply alive); any
    /// coordinate at or beyond the extent is rejected before a board exists.
    pub fn new(rows: usize, cols: usize, live_cells: &[(usize, usize)]) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::InvalidDimensions { rows, cols });
        }
        let mut board = Self {
            rows,
            cols,
            cells: vec![0; rows * cols],
        };
        for &(row, col) in live_cells {
            if row >= rows || col >= cols {
                return Err(GridError::OutOfRange {
                    row,
                    col,
                    rows,
                    cols,
                });
            }
            board.cells[row * cols + col] = 1;
        }
        Ok(board)
    }

    /// Read an initial board from the plain-text format:
    ///
    /// ```text
    /// <rows> <cols>
    /// <n_living_cells>
    /// <row_1> <col_1>
    /// ...
    /// ```
    ///
    /// Values are whitespace-separated; extra whitespace is insignificant.
    pub fn from_reader<R: Read>(mut input: R) -> Result<Self, GridError> {
        let mut text = String::new();
        input
            .read_to_string(&mut text)
            .map_err(|err| GridError::Malformed(format!("read failed: {err}")))?;
        let mut tokens = text.split_whitespace();
        let mut next = |what: &str| -> Result<usize, GridError> {
            let token = tokens
                .next()
                .ok_or_else(|| GridError::Malformed(format!("missing {what}")))?;
            token
                .parse()
                .map_err(|_| GridError::Malformed(format!("expected {what}, got `{token}`")))
        };

        let rows = next("row count")?;
        let cols = next("column count")?;
        let count = next("living-cell count")?;
        // A board never holds more distinct cells than its extent, so an
        // absurd count cannot drive the allocation.
        let mut live_cells = Vec::with_capacity(count.min(rows.saturating_mul(cols)));
        for _ in 0..count {
            live_cells.push((next("cell row")?, next("cell column")?));
        }
        Self::new(rows, cols, &live_cells)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Checked cell read: 1 if (row, col) is alive, 0 if dead.
    pub fn get(&self, row: usize, col: usize) -> Result<u8, GridError> {
        if row >= self.rows || col >= self.cols {
            return Err(GridError::OutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(self.at(row, col))
    }

    /// Flip one cell between alive and dead.
    pub fn toggle(&mut self, row: usize, col: usize) -> Result<(), GridError> {
        self.get(row, col)?;
        self.cells[row * self.cols + col] ^= 1;
        Ok(())
    }

    pub fn live_count(&self) -> usize {
        self.cells.iter().map(|&cell| cell as usize).sum()
    }

    // Callers must pass indices already reduced modulo rows/cols.
    fn at(&self, row: usize, col: usize) -> u8 {
        self.cells[row * self.cols + col]
    }

    fn live_neighbours(&self, row: usize, col: usize) -> u8 {
        // Indices for the surrounding cells on the torus.
        let left = (col + self.cols - 1) % self.cols;
        let right = (col + 1) % self.cols;
        let below = (row + self.rows - 1) % self.rows;
        let above = (row + 1) % self.rows;

        self.at(below, left)
            + self.at(below, col)
            + self.at(below, right)
            + self.at(row, left)
            + self.at(row, right)
            + self.at(above, left)
            + self.at(above, col)
            + self.at(above, right)
    }

    /// Compute one row of the successor generation. Reads only the current
    /// generation, so rows may be computed in any order or in parallel.
    pub(crate) fn next_row(&self, row: usize) -> Vec<u8> {
        (0..self.cols)
            .map(|col| next_state(self.at(row, col), self.live_neighbours(row, col)))
            .collect()
    }

    /// Advance the board one generation.
    ///
    /// The successor is written into a fresh buffer and swapped in at the
    /// end, so no cell ever sees an already-updated neighbour.
    pub fn update(&mut self) {
        let mut next = Vec::with_capacity(self.cells.len());
        for row in 0..self.rows {
            next.extend_from_slice(&self.next_row(row));
        }
        self.cells = next;
    }

    /// Publish a successor generation assembled elsewhere (the coroutine
    /// driver in `main.rs`). A wrong-sized buffer is a contract bug, not a
    /// runtime condition.
    pub(crate) fn publish(&mut self, next: Vec<u8>) {
        debug_assert_eq!(next.len(), self.cells.len());
        self.cells = next;
    }
}

/// The classic rule set as a total function of (current state, live
/// neighbours):
///   - Underpopulation: a live cell with fewer than two neighbours dies
///   - Stasis:          a live cell with two or three neighbours survives
///   - Overpopulation:  a live cell with more than three neighbours dies
///   - Reproduction:    a dead cell with exactly three neighbours is born
fn next_state(cell: u8, live_neighbours: u8) -> u8 {
    match (cell, live_neighbours) {
        (1, 2) | (1, 3) => 1,
        (0, 3) => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: usize, cols: usize, live: &[(usize, usize)]) -> Grid {
        Grid::new(rows, cols, live).unwrap()
    }

    fn live_cells(board: &Grid) -> Vec<(usize, usize)> {
        let mut live = Vec::new();
        for row in 0..board.rows() {
            for col in 0..board.cols() {
                if board.get(row, col).unwrap() == 1 {
                    live.push((row, col));
                }
            }
        }
        live
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert_eq!(
            Grid::new(0, 10, &[]),
            Err(GridError::InvalidDimensions { rows: 0, cols: 10 })
        );
        assert_eq!(
            Grid::new(10, 0, &[]),
            Err(GridError::InvalidDimensions { rows: 10, cols: 0 })
        );
    }

    #[test]
    fn rejects_cells_at_or_beyond_extent() {
        assert_eq!(
            Grid::new(4, 6, &[(4, 0)]),
            Err(GridError::OutOfRange {
                row: 4,
                col: 0,
                rows: 4,
                cols: 6
            })
        );
        assert_eq!(
            Grid::new(4, 6, &[(0, 6)]),
            Err(GridError::OutOfRange {
                row: 0,
                col: 6,
                rows: 4,
                cols: 6
            })
        );
    }

    #[test]
    fn duplicate_live_cells_are_idempotent() {
        let board = board(3, 3, &[(1, 1), (1, 1), (1, 1)]);
        assert_eq!(board.get(1, 1), Ok(1));
        assert_eq!(board.live_count(), 1);
    }

    #[test]
    fn get_checks_bounds() {
        let board = board(3, 5, &[]);
        assert_eq!(board.get(2, 4), Ok(0));
        assert_eq!(
            board.get(3, 0),
            Err(GridError::OutOfRange {
                row: 3,
                col: 0,
                rows: 3,
                cols: 5
            })
        );
        assert_eq!(
            board.get(0, 5),
            Err(GridError::OutOfRange {
                row: 0,
                col: 5,
                rows: 3,
                cols: 5
            })
        );
    }

    #[test]
    fn buffer_length_matches_extent_across_updates() {
        let mut board = board(7, 11, &[(3, 4), (3, 5), (3, 6)]);
        assert_eq!(board.cells.len(), 7 * 11);
        for _ in 0..5 {
            board.update();
            assert_eq!(board.cells.len(), 7 * 11);
            assert!(board.cells.iter().all(|&cell| cell <= 1));
        }
    }

    #[test]
    fn rule_table_is_exhaustive() {
        for n in 0..=8u8 {
            let survives = n == 2 || n == 3;
            let born = n == 3;
            assert_eq!(next_state(1, n), survives as u8, "live cell, n = {n}");
            assert_eq!(next_state(0, n), born as u8, "dead cell, n = {n}");
        }
    }

    #[test]
    fn neighbour_count_is_bounded() {
        // Fully populated board: every cell sees the maximum of 8.
        let mut all = Vec::new();
        for row in 0..4 {
            for col in 0..4 {
                all.push((row, col));
            }
        }
        let board = board(4, 4, &all);
        for row in 0..4 {
            for col in 0..4 {
                assert_eq!(board.live_neighbours(row, col), 8);
            }
        }
    }

    #[test]
    fn single_cell_torus_is_its_own_neighbour() {
        // On a 1x1 board all 8 wrapped neighbour coordinates are (0, 0).
        let mut lone = board(1, 1, &[(0, 0)]);
        assert_eq!(lone.live_neighbours(0, 0), 8);
        lone.update();
        assert_eq!(lone.get(0, 0), Ok(0)); // overpopulated by itself

        let mut empty = board(1, 1, &[]);
        assert_eq!(empty.live_neighbours(0, 0), 0);
        empty.update();
        assert_eq!(empty.get(0, 0), Ok(0));
    }

    #[test]
    fn corner_neighbours_wrap_to_opposite_edges() {
        let board = board(5, 5, &[(0, 0)]);
        // The live corner is visible from every cell that wraps around to it.
        assert_eq!(board.live_neighbours(4, 4), 1);
        assert_eq!(board.live_neighbours(0, 4), 1);
        assert_eq!(board.live_neighbours(4, 0), 1);
        assert_eq!(board.live_neighbours(1, 1), 1);
        // Not visible two steps away.
        assert_eq!(board.live_neighbours(2, 2), 0);
    }

    #[test]
    fn block_is_a_still_life() {
        let mut board = board(6, 6, &[(2, 2), (2, 3), (3, 2), (3, 3)]);
        let before = board.clone();
        board.update();
        assert_eq!(board, before);
    }

    #[test]
    fn blinker_oscillates_with_period_two() {
        let mut board = board(5, 5, &[(2, 1), (2, 2), (2, 3)]);
        let horizontal = board.clone();

        board.update();
        assert_eq!(live_cells(&board), vec![(1, 2), (2, 2), (3, 2)]);

        board.update();
        assert_eq!(board, horizontal);
    }

    #[test]
    fn glider_translates_one_cell_per_four_updates() {
        let glider = [(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)];
        let offset = |dr: usize, dc: usize| -> Vec<(usize, usize)> {
            glider.iter().map(|&(r, c)| (r + dr, c + dc)).collect()
        };

        let mut board = board(20, 20, &offset(5, 5));
        for _ in 0..4 {
            board.update();
        }
        assert_eq!(board, Grid::new(20, 20, &offset(6, 6)).unwrap());
    }

    #[test]
    fn glider_traverses_the_torus() {
        // One cell of diagonal travel per 4 updates; 4 * 20 updates bring it
        // all the way around a 20x20 torus.
        let glider = [(5, 6), (6, 7), (7, 5), (7, 6), (7, 7)];
        let mut board = board(20, 20, &glider);
        let start = board.clone();
        for _ in 0..(4 * 20) {
            board.update();
        }
        assert_eq!(board, start);
    }

    #[test]
    fn update_is_deterministic() {
        let mut a = board(9, 9, &[(1, 1), (2, 2), (3, 3), (3, 4), (4, 3), (0, 8)]);
        let mut b = a.clone();
        for _ in 0..10 {
            a.update();
            b.update();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn parses_board_file() {
        let input = "5 7\n3\n0 0\n2 3\n4 6\n";
        let board = Grid::from_reader(input.as_bytes()).unwrap();
        assert_eq!((board.rows(), board.cols()), (5, 7));
        assert_eq!(live_cells(&board), vec![(0, 0), (2, 3), (4, 6)]);
    }

    #[test]
    fn parsing_ignores_extra_whitespace() {
        let input = "  3   3 \n\n 1 \n\t1  1  \n\n";
        let board = Grid::from_reader(input.as_bytes()).unwrap();
        assert_eq!(live_cells(&board), vec![(1, 1)]);
    }

    #[test]
    fn rejects_truncated_input() {
        let err = Grid::from_reader("4 4\n2\n1 1\n".as_bytes()).unwrap_err();
        assert_eq!(err, GridError::Malformed("missing cell row".into()));
    }

    #[test]
    fn rejects_garbage_tokens() {
        let err = Grid::from_reader("4 x\n0\n".as_bytes()).unwrap_err();
        assert_eq!(
            err,
            GridError::Malformed("expected column count, got `x`".into())
        );
    }

    #[test]
    fn file_coordinates_outside_extent_are_rejected() {
        let err = Grid::from_reader("4 4\n1\n4 0\n".as_bytes()).unwrap_err();
        assert_eq!(
            err,
            GridError::OutOfRange {
                row: 4,
                col: 0,
                rows: 4,
                cols: 4
            }
        );
    }

    #[test]
    fn zero_dimensions_in_file_are_rejected() {
        let err = Grid::from_reader("0 8\n0\n".as_bytes()).unwrap_err();
        assert_eq!(err, GridError::InvalidDimensions { rows: 0, cols: 8 });
    }
}

// main.rs - Conway's Game of Life on a toroidal board, with row coroutines

use clap::Parser;
use eframe::egui;
use egui::Color32;
use std::collections::hash_map::DefaultHasher;
use std::error::Error;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

mod grid;
mod patterns;
mod ui;

use grid::{DEFAULT_SIZE, Grid};

#[derive(Parser)]
#[command(about = "Conway's Game of Life on a toroidally wrapped grid")]
struct Args {
    /// Initial board file: `rows cols`, then the live-cell count, then one
    /// `row col` pair per live cell. Defaults to a built-in glider.
    board: Option<PathBuf>,
}

fn main() -> Result<(), eframe::Error> {
    env_logger::init();
    let args = Args::parse();

    let board = match load_board(args.board.as_deref()) {
        Ok(board) => board,
        Err(err) => {
            log::error!("could not load initial board: {err}");
            std::process::exit(1);
        }
    };
    log::info!(
        "starting with a {}x{} board, {} live cells",
        board.rows(),
        board.cols(),
        board.live_count()
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([800.0, 950.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Conway's Game of Life",
        options,
        Box::new(|_cc| Box::new(GameOfLife::new(board))),
    )
}

fn load_board(path: Option<&Path>) -> Result<Grid, Box<dyn Error>> {
    match path {
        Some(path) => {
            let file = File::open(path)?;
            Ok(Grid::from_reader(file)?)
        }
        None => Ok(patterns::board_with(
            &patterns::PATTERNS[0],
            DEFAULT_SIZE,
            DEFAULT_SIZE,
        )?),
    }
}

/// Row coroutine: compute one row of the successor generation from a shared
/// snapshot of the current one.
async fn process_row(row: usize, board: Arc<Grid>) -> (usize, Vec<u8>) {
    // Yield so rows interleave instead of running back to back.
    tokio::task::yield_now().await;
    (row, board.next_row(row))
}

pub struct GameOfLife {
    board: Grid,

    pub is_running: bool,
    pub last_update: Instant,
    pub update_interval: Duration,
    pub generation: u32,
    pub live_color: Color32,
    pub dead_color: Color32,
    pub selected_pattern: usize,

    runtime: tokio::runtime::Runtime,

    board_history: [u64; 10],
    history_count: usize,
}

impl GameOfLife {
    pub fn new(board: Grid) -> Self {
        let runtime = tokio::runtime::Runtime::new().expect("failed to start tokio runtime");

        Self {
            board,
            is_running: false,
            last_update: Instant::now(),
            update_interval: Duration::from_millis(200),
            generation: 0,
            live_color: Color32::from_rgb(0, 200, 0),
            dead_color: Color32::from_rgb(40, 40, 40),
            selected_pattern: 0,
            runtime,
            board_history: [0; 10],
            history_count: 0,
        }
    }

    pub fn board(&self) -> &Grid {
        &self.board
    }

    /// Advance the board exactly one generation.
    ///
    /// Spawns one coroutine per row over an explicit snapshot, so every row
    /// reads only the previous generation. The successor is published in one
    /// piece after all rows have joined.
    pub fn update_generation(&mut self) {
        let rows = self.board.rows();
        let snapshot = Arc::new(self.board.clone());

        let next_rows = self.runtime.block_on(async move {
            let mut handles = Vec::with_capacity(rows);
            for row in 0..rows {
                handles.push(tokio::spawn(process_row(row, Arc::clone(&snapshot))));
            }

            let mut next_rows = vec![Vec::new(); rows];
            for handle in handles {
                let (row, cells) = handle.await.expect("row coroutine panicked");
                next_rows[row] = cells;
            }
            next_rows
        });

        self.board.publish(next_rows.concat());
        self.generation += 1;

        if self.check_for_cycle() {
            log::info!("cycle detected at generation {}, pausing", self.generation);
            self.is_running = false;
        }
    }

    fn hash_board(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for row in 0..self.board.rows() {
            for col in 0..self.board.cols() {
                self.board.get(row, col).unwrap_or(0).hash(&mut hasher);
            }
        }
        hasher.finish()
    }

    fn check_for_cycle(&mut self) -> bool {
        let current_hash = self.hash_board();
        if self.board_history.contains(&current_hash) {
            return true;
        }
        self.board_history[self.history_count % self.board_history.len()] = current_hash;
        self.history_count += 1;
        false
    }

    fn reset_history(&mut self) {
        self.generation = 0;
        self.board_history = [0; 10];
        self.history_count = 0;
    }

    pub fn clear_board(&mut self) {
        // Dimensions are fixed at construction, so an empty board of the
        // same extent always exists.
        if let Ok(empty) = Grid::new(self.board.rows(), self.board.cols(), &[]) {
            self.board = empty;
        }
        self.reset_history();
    }

    /// Replace the board with the selected built-in pattern, keeping the
    /// current extent. A pattern that does not fit is rejected, not clamped.
    pub fn apply_selected_pattern(&mut self) {
        let Some(pattern) = patterns::PATTERNS.get(self.selected_pattern) else {
            return;
        };
        match patterns::board_with(pattern, self.board.rows(), self.board.cols()) {
            Ok(board) => {
                self.board = board;
                self.reset_history();
            }
            Err(err) => log::warn!("cannot place pattern `{}`: {err}", pattern.name),
        }
    }

    pub fn apply_random_pattern(&mut self) {
        match patterns::random_board(self.board.rows(), self.board.cols(), self.generation) {
            Ok(board) => {
                self.board = board;
                self.reset_history();
            }
            Err(err) => log::warn!("cannot build random board: {err}"),
        }
    }

    pub fn toggle_cell(&mut self, row: usize, col: usize) {
        if let Err(err) = self.board.toggle(row, col) {
            log::debug!("ignoring toggle: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coroutine_update_matches_sequential_update() {
        let start = patterns::board_with(&patterns::PATTERNS[0], DEFAULT_SIZE, DEFAULT_SIZE)
            .unwrap();
        let mut reference = start.clone();
        let mut app = GameOfLife::new(start);

        for _ in 0..8 {
            app.update_generation();
            reference.update();
            assert_eq!(app.board(), &reference);
        }
    }

    #[test]
    fn cycle_detection_pauses_a_still_life() {
        let block = Grid::new(8, 8, &[(2, 2), (2, 3), (3, 2), (3, 3)]).unwrap();
        let mut app = GameOfLife::new(block);
        app.is_running = true;

        // First generation stores the block's hash; the second sees the same
        // hash again and pauses.
        app.update_generation();
        app.update_generation();
        assert!(!app.is_running);
    }

    #[test]
    fn load_board_reports_missing_file() {
        assert!(load_board(Some(Path::new("/nonexistent/board.dat"))).is_err());
    }

    #[test]
    fn default_board_is_the_glider() {
        let board = load_board(None).unwrap();
        assert_eq!((board.rows(), board.cols()), (DEFAULT_SIZE, DEFAULT_SIZE));
        assert_eq!(board.live_count(), patterns::PATTERNS[0].cells.len());
    }
}

//! Board module - manages the game grid
//!
//! The board is a 10x20 grid where each cell can be empty or filled with a material.
//! Uses a flat array for better cache locality and zero-allocation.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..19 (top to bottom)
//!
//! The row count never changes: clears shift rows down and refill the top, garbage
//! injection shifts rows up and refills the bottom.

use arrayvec::ArrayVec;

use crate::types::{Cell, Material, BOARD_HEIGHT, BOARD_WIDTH};

/// Total number of cells on the board
const BOARD_SIZE: usize = (BOARD_WIDTH * BOARD_HEIGHT) as usize;

const WIDTH: usize = BOARD_WIDTH as usize;
const HEIGHT: usize = BOARD_HEIGHT as usize;

/// The game board - 10 columns x 20 rows using flat array storage
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_SIZE],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * WIDTH + (x as usize))
    }

    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is valid (within bounds and empty)
    pub fn is_valid(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(None))
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Check whether every offset of `shape`, placed at `(x, y)`, lands on an empty in-bounds cell.
    pub fn fits(&self, shape: &[(i8, i8)], x: i8, y: i8) -> bool {
        shape.iter().all(|&(dx, dy)| self.is_valid(x + dx, y + dy))
    }

    /// Like [`Board::is_valid`], but the space above row 0 between the walls is open.
    pub fn is_open(&self, x: i8, y: i8) -> bool {
        if y < 0 {
            return x >= 0 && (x as usize) < WIDTH;
        }
        self.is_valid(x, y)
    }

    /// Like [`Board::fits`], but minos above row 0 are allowed.
    pub fn fits_open(&self, shape: &[(i8, i8)], x: i8, y: i8) -> bool {
        shape.iter().all(|&(dx, dy)| self.is_open(x + dx, y + dy))
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= HEIGHT {
            return false;
        }
        let start = y * WIDTH;
        self.cells[start..start + WIDTH].iter().all(|cell| cell.is_some())
    }

    /// True when no cell is filled (perfect clear).
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_none())
    }

    /// Clear all full rows and return the row indices that were cleared (sorted bottom to top)
    ///
    /// Every full row clears in the same pass; rows above shift down and empty rows
    /// refill the top. Two-pointer compaction, zero-allocation.
    pub fn clear_full_rows(&mut self) -> ArrayVec<usize, HEIGHT> {
        let mut cleared_rows = ArrayVec::new();
        let mut write_y = HEIGHT;

        for read_y in (0..HEIGHT).rev() {
            if self.is_row_full(read_y) {
                cleared_rows.push(read_y);
            } else {
                write_y -= 1;
                if write_y != read_y {
                    let src_start = read_y * WIDTH;
                    self.cells
                        .copy_within(src_start..src_start + WIDTH, write_y * WIDTH);
                }
            }
        }

        for cell in &mut self.cells[..write_y * WIDTH] {
            *cell = None;
        }

        cleared_rows
    }

    /// Drop the top row, shift everything up by one and write a new bottom row
    /// of `material` with a single empty cell at `hole_x`.
    ///
    /// `hole_x` is clamped into the board so the row always keeps exactly one hole.
    pub fn push_garbage_row(&mut self, hole_x: usize, material: Material) {
        let hole_x = hole_x.min(WIDTH - 1);

        self.cells.copy_within(WIDTH..BOARD_SIZE, 0);

        let bottom = (HEIGHT - 1) * WIDTH;
        for (x, cell) in self.cells[bottom..].iter_mut().enumerate() {
            *cell = if x == hole_x { None } else { Some(material) };
        }
    }

    /// Lock a piece onto the board at given position with given shape
    ///
    /// Minos above row 0 are dropped. Returns false if any cell is outside the
    /// walls, below the floor or occupied.
    pub fn lock_piece(&mut self, shape: &[(i8, i8)], x: i8, y: i8, material: Material) -> bool {
        if !self.fits_open(shape, x, y) {
            return false;
        }

        for &(dx, dy) in shape {
            self.set(x + dx, y + dy, Some(material));
        }

        true
    }

    /// Height of each column measured from the floor (0 = empty column).
    pub fn column_heights(&self) -> [u8; WIDTH] {
        let mut heights = [0u8; WIDTH];
        for (x, h) in heights.iter_mut().enumerate() {
            if let Some(top) = (0..HEIGHT).find(|&y| self.cells[y * WIDTH + x].is_some()) {
                *h = (HEIGHT - top) as u8;
            }
        }
        heights
    }

    /// Export the grid as material tags (0 = empty).
    pub fn to_u8_grid(&self) -> [[u8; WIDTH]; HEIGHT] {
        let mut out = [[0u8; WIDTH]; HEIGHT];
        for (y, row) in out.iter_mut().enumerate() {
            for (x, v) in row.iter_mut().enumerate() {
                *v = self.cells[y * WIDTH + x].map(|m| m.tag()).unwrap_or(0);
            }
        }
        out
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells = [None; BOARD_SIZE];
    }

    /// Build a board from text rows, top to bottom; `.` is empty, anything else is garbage.
    ///
    /// Missing rows at the top are empty, so tests only spell out the stack.
    pub fn from_rows(rows: &[&str]) -> Self {
        let mut board = Self::new();
        let offset = HEIGHT.saturating_sub(rows.len());
        for (i, row) in rows.iter().take(HEIGHT).enumerate() {
            for (x, ch) in row.chars().take(WIDTH).enumerate() {
                if ch != '.' {
                    board.set(x as i8, (offset + i) as i8, Some(Material::Garbage));
                }
            }
        }
        board
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

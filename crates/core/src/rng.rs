//! RNG module - deterministic randomness for the simulations
//!
//! Implements the "7-bag" randomization algorithm used in modern Tetris.
//! Each bag contains one of each piece (I, O, T, S, Z, J, L), shuffled.
//! Draws from the bag until empty, then generates a new bag.
//!
//! The same LCG also picks garbage hole columns, so a seeded match replays
//! exactly, including every attack.

use crate::types::PieceKind;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        // High bits of an LCG are far better distributed than the low ones.
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Uniform float in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / (u32::MAX as f64 + 1.0)
    }

    /// Bernoulli trial; probabilities outside [0, 1] saturate.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

/// 7-bag piece generator
#[derive(Debug, Clone)]
pub struct PieceQueue {
    bag: [PieceKind; 7],
    bag_index: usize,
    rng: SimpleRng,
}

impl PieceQueue {
    /// Create a new piece queue with the given seed
    pub fn new(seed: u32) -> Self {
        let mut rng = SimpleRng::new(seed);
        let bag = Self::shuffled_bag(&mut rng);
        Self {
            bag,
            bag_index: 0,
            rng,
        }
    }

    fn shuffled_bag(rng: &mut SimpleRng) -> [PieceKind; 7] {
        let mut bag = PieceKind::ALL;
        rng.shuffle(&mut bag);
        bag
    }

    /// The bag that `draw()` will produce after the current one runs out.
    ///
    /// Shuffled with a copy of the RNG, so previewing never perturbs the sequence.
    fn preview_next_bag(&self) -> [PieceKind; 7] {
        let mut preview_rng = self.rng.clone();
        Self::shuffled_bag(&mut preview_rng)
    }

    /// Peek at the next piece without removing it
    pub fn peek(&self) -> PieceKind {
        self.peek_n::<1>()[0]
    }

    /// Peek at the next `N` pieces (N <= 7). Stack-only.
    pub fn peek_n<const N: usize>(&self) -> [PieceKind; N] {
        let mut out = [PieceKind::I; N];
        let remaining = &self.bag[self.bag_index.min(7)..];
        let next_bag = self.preview_next_bag();

        for (slot, kind) in out
            .iter_mut()
            .zip(remaining.iter().chain(next_bag.iter()))
        {
            *slot = *kind;
        }
        out
    }

    /// Draw the next piece from the queue
    pub fn draw(&mut self) -> PieceKind {
        if self.bag_index >= 7 {
            self.bag = Self::shuffled_bag(&mut self.rng);
            self.bag_index = 0;
        }

        let piece = self.bag[self.bag_index];
        self.bag_index += 1;
        piece
    }

    /// Pieces left in the current bag.
    pub fn remaining_in_bag(&self) -> &[PieceKind] {
        &self.bag[self.bag_index.min(7)..]
    }
}

impl Default for PieceQueue {
    fn default() -> Self {
        Self::new(1)
    }
}

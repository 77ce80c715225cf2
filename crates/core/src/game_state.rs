//! Game state module - the player simulation
//!
//! This module ties together all core components: board, pieces, RNG, and scoring.
//! It handles game timing, piece movement, rotation, line clears, and garbage
//! injection. Mode rules (targets, timers, overlays) live in the engine crate and
//! drive this through [`GameState::apply_action`], [`GameState::tick`] and the
//! lock events it emits.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::garbage::{inject_rows, Injection};
use crate::pieces::{try_rotate, Tetromino};
use crate::rng::{PieceQueue, SimpleRng};
use crate::scoring::{
    calculate_drop_score, calculate_level, calculate_score, get_soft_drop_interval_ms,
    scale_interval_ms, SpeedCurve,
};
use crate::types::*;

/// Salt mixed into the seed for the garbage hole RNG, so holes and pieces use separate streams.
const GARBAGE_SEED_SALT: u32 = 0x9E37_79B9;

/// Rule knobs a mode can set on the player simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    pub start_level: u32,
    pub max_level: u32,
    /// Lines needed per level; 0 keeps the level fixed.
    pub lines_per_level: u32,
    pub speed_curve: SpeedCurve,
    /// Divides the gravity interval (0.5 = twice as slow).
    pub gravity_multiplier: f64,
    pub hold_enabled: bool,
    /// Upcoming pieces exposed by `next_queue()`, at most `NEXT_QUEUE_LEN`.
    pub preview: usize,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            start_level: 0,
            max_level: 20,
            lines_per_level: 10,
            speed_curve: SpeedCurve::Modern,
            gravity_multiplier: 1.0,
            hold_enabled: true,
            preview: NEXT_QUEUE_LEN,
        }
    }
}

/// Running counters exported in the end-of-run stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayCounters {
    pub pieces_placed: u32,
    pub holds: u32,
    pub tspins: u32,
    pub perfect_clears: u32,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    active: Option<Tetromino>,
    hold: Option<PieceKind>,
    next_queue: [PieceKind; NEXT_QUEUE_LEN],
    piece_queue: PieceQueue,
    garbage_rng: SimpleRng,
    rules: RulesConfig,
    /// Overrides the curve-derived gravity interval (mode economies).
    gravity_override_ms: Option<u32>,
    last_event: Option<LockEvent>,
    counters: PlayCounters,
    score: u32,
    level: u32,
    lines: u32,
    /// Consecutive clearing locks; 0 when the last lock cleared nothing.
    combo: u32,
    back_to_back: bool,
    drop_timer_ms: u32,
    lock_timer_ms: u32,
    lock_reset_count: u8,
    line_clear_timer_ms: u32,
    paused: bool,
    game_over: bool,
    garbage_overflow: bool,
    started: bool,
    can_hold: bool,
    last_action_was_rotate: bool,
    soft_drop_timer_ms: u32,
    is_soft_dropping: bool,
}

impl GameState {
    /// Create a new game with the given RNG seed
    pub fn new(seed: u32) -> Self {
        Self::with_rules(seed, RulesConfig::default())
    }

    pub fn with_rules(seed: u32, rules: RulesConfig) -> Self {
        let piece_queue = PieceQueue::new(seed);
        let next_queue = piece_queue.peek_n::<NEXT_QUEUE_LEN>();

        Self {
            board: Board::new(),
            active: None,
            hold: None,
            next_queue,
            piece_queue,
            garbage_rng: SimpleRng::new(seed ^ GARBAGE_SEED_SALT),
            rules,
            gravity_override_ms: None,
            last_event: None,
            counters: PlayCounters::default(),
            score: 0,
            level: rules.start_level,
            lines: 0,
            combo: 0,
            back_to_back: false,
            drop_timer_ms: 0,
            lock_timer_ms: 0,
            lock_reset_count: 0,
            line_clear_timer_ms: 0,
            paused: false,
            game_over: false,
            garbage_overflow: false,
            started: false,
            can_hold: true,
            last_action_was_rotate: false,
            soft_drop_timer_ms: 0,
            is_soft_dropping: false,
        }
    }

    /// Start the game and spawn the first piece
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.spawn_piece();
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    /// A spawn was blocked.
    pub fn game_over(&self) -> bool {
        self.game_over
    }

    /// Garbage pushed the active piece out of the playfield.
    pub fn garbage_overflow(&self) -> bool {
        self.garbage_overflow
    }

    /// No further play is possible.
    pub fn finished(&self) -> bool {
        self.game_over || self.garbage_overflow
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold && self.rules.hold_enabled
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn back_to_back(&self) -> bool {
        self.back_to_back
    }

    pub fn counters(&self) -> PlayCounters {
        self.counters
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    pub fn hold_piece(&self) -> Option<PieceKind> {
        self.hold
    }

    pub fn next_queue(&self) -> &[PieceKind] {
        &self.next_queue[..self.rules.preview.min(NEXT_QUEUE_LEN)]
    }

    pub fn active(&self) -> Option<Tetromino> {
        self.active
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Add points awarded outside the line-clear table (mode bonuses, overlays).
    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Force the gravity interval; `None` restores the speed curve.
    pub fn set_gravity_override_ms(&mut self, interval_ms: Option<u32>) {
        self.gravity_override_ms = interval_ms.map(|ms| ms.max(1));
    }

    /// Spawn a new piece from the queue
    ///
    /// A blocked spawn ends the game; the blocked piece is not placed.
    pub fn spawn_piece(&mut self) -> bool {
        let kind = self.piece_queue.draw();
        self.next_queue = self.piece_queue.peek_n::<NEXT_QUEUE_LEN>();

        let piece = Tetromino::new(kind);
        if !piece.fits_in_bounds(&self.board) {
            self.game_over = true;
            self.active = None;
            return false;
        }

        self.active = Some(piece);
        self.can_hold = true;
        self.drop_timer_ms = 0;
        self.lock_timer_ms = 0;
        self.lock_reset_count = 0;
        self.last_action_was_rotate = false;

        true
    }

    /// Current drop interval from level, mode override and soft drop state
    pub fn drop_interval_ms(&self) -> u32 {
        let base = match self.gravity_override_ms {
            Some(ms) => ms,
            None => scale_interval_ms(
                self.rules.speed_curve.drop_interval_ms(self.level),
                self.rules.gravity_multiplier,
            ),
        };
        if self.is_soft_dropping {
            get_soft_drop_interval_ms(base, SOFT_DROP_MULTIPLIER)
        } else {
            base
        }
    }

    /// Try to move the active piece
    pub fn try_move(&mut self, dx: i8, dy: i8) -> bool {
        let Some(active) = self.active else {
            return false;
        };

        let moved = active.shifted(dx, dy);
        if !moved.is_valid(&self.board) {
            return false;
        }

        self.active = Some(moved);

        // Moving while grounded (or falling) refreshes the lock delay, up to the limit.
        if dy != 0 || (dx != 0 && self.is_grounded()) {
            self.reset_lock_timer();
        }
        if dx != 0 || dy != 0 {
            self.last_action_was_rotate = false;
        }

        true
    }

    /// Try to rotate the active piece with SRS wall kicks
    pub fn try_rotate(&mut self, clockwise: bool) -> bool {
        let Some(active) = self.active else {
            return false;
        };

        if active.kind == PieceKind::O {
            return false;
        }

        let board = &self.board;
        let result = try_rotate(
            active.kind,
            active.rotation,
            active.x,
            active.y,
            clockwise,
            |x, y| board.is_valid(x, y),
        );

        let Some((rotation, (dx, dy))) = result else {
            return false;
        };

        self.active = Some(Tetromino {
            rotation,
            x: active.x + dx,
            y: active.y + dy,
            ..active
        });
        self.reset_lock_timer();
        self.last_action_was_rotate = true;

        true
    }

    fn reset_lock_timer(&mut self) {
        if self.lock_reset_count < LOCK_RESET_LIMIT {
            self.lock_timer_ms = 0;
            self.lock_reset_count += 1;
        }
    }

    /// Hard drop the active piece and lock it. Returns the drop score awarded.
    pub fn hard_drop(&mut self) -> u32 {
        let Some(active) = self.active else {
            return 0;
        };

        let distance = active.drop_distance(&self.board) as u32;
        if distance > 0 {
            self.active = Some(active.dropped(&self.board));
            self.last_action_was_rotate = false;
        }

        let points = calculate_drop_score(distance, true);
        self.score = self.score.saturating_add(points);
        self.lock_piece();
        points
    }

    /// Swap active piece with hold piece
    pub fn hold(&mut self) -> bool {
        if !self.can_hold() {
            return false;
        }

        let Some(active) = self.active else {
            return false;
        };

        match self.hold.replace(active.kind) {
            Some(held) => {
                let piece = Tetromino::new(held);
                if !piece.fits_in_bounds(&self.board) {
                    self.game_over = true;
                    self.active = None;
                    return false;
                }
                self.active = Some(piece);
            }
            None => {
                if !self.spawn_piece() {
                    return false;
                }
            }
        }

        self.counters.holds += 1;
        self.can_hold = false;
        self.drop_timer_ms = 0;
        self.lock_timer_ms = 0;
        self.lock_reset_count = 0;
        self.last_action_was_rotate = false;

        true
    }

    /// Lock the active piece onto the board, clear lines and spawn the next piece
    pub fn lock_piece(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        // T-spin corners must be read before the piece's rows can clear.
        let tspin = if active.kind == PieceKind::T {
            self.t_spin_kind(&active)
        } else {
            TSpinKind::None
        };

        self.board
            .lock_piece(&active.shape(), active.x, active.y, active.material());
        self.counters.pieces_placed += 1;

        let lines_cleared = self.board.clear_full_rows().len();
        let perfect_clear = lines_cleared > 0 && self.board.is_empty();

        if tspin.is_spin() {
            self.counters.tspins += 1;
        }

        let mut line_clear_score = 0;
        if lines_cleared > 0 {
            self.combo += 1;
            self.lines += lines_cleared as u32;

            let result = calculate_score(
                lines_cleared,
                self.level,
                tspin,
                self.combo,
                self.back_to_back,
            );
            self.back_to_back = result.qualifies_for_b2b;
            line_clear_score = result.total;

            self.level = calculate_level(
                self.lines,
                self.rules.start_level,
                self.rules.lines_per_level,
                self.rules.max_level,
            );
            self.line_clear_timer_ms = LINE_CLEAR_PAUSE_MS;

            if perfect_clear {
                self.counters.perfect_clears += 1;
            }
        } else {
            self.combo = 0;
            // A spin with no lines still scores from the T-spin table.
            if tspin.is_spin() {
                line_clear_score =
                    calculate_score(0, self.level, tspin, 0, self.back_to_back).total;
            }
        }
        self.score = self.score.saturating_add(line_clear_score);

        self.last_event = Some(LockEvent {
            lines_cleared: lines_cleared as u32,
            line_clear_score,
            tspin,
            perfect_clear,
            combo: self.combo,
            back_to_back: self.back_to_back,
        });

        if !self.game_over {
            self.spawn_piece();
        }
    }

    /// Take and clear the last lock event.
    pub fn take_last_event(&mut self) -> Option<LockEvent> {
        self.last_event.take()
    }

    /// Detect T-spin type based on corner occupancy
    fn t_spin_kind(&self, piece: &Tetromino) -> TSpinKind {
        if !self.last_action_was_rotate {
            return TSpinKind::None;
        }

        // Corners of the 3x3 box around the T centre; walls and floor count as filled.
        let corner_filled =
            |(cx, cy): (i8, i8)| !self.board.is_valid(piece.x + cx, piece.y + cy);

        let filled = [(0, 0), (2, 0), (0, 2), (2, 2)]
            .into_iter()
            .filter(|&c| corner_filled(c))
            .count();
        if filled < 3 {
            return TSpinKind::None;
        }

        let front: [(i8, i8); 2] = match piece.rotation {
            Rotation::North => [(0, 0), (2, 0)],
            Rotation::East => [(2, 0), (2, 2)],
            Rotation::South => [(0, 2), (2, 2)],
            Rotation::West => [(0, 0), (0, 2)],
        };

        if front.into_iter().all(corner_filled) {
            TSpinKind::Full
        } else {
            TSpinKind::Mini
        }
    }

    /// Check if the active piece is on the ground
    pub fn is_grounded(&self) -> bool {
        self.active
            .map(|piece| piece.is_grounded(&self.board))
            .unwrap_or(false)
    }

    /// Where the active piece would land
    pub fn ghost_y(&self) -> Option<i8> {
        self.active.map(|piece| piece.dropped(&self.board).y)
    }

    /// Push `rows` garbage rows under the stack.
    ///
    /// Sets the overflow flag when the active piece cannot be lifted clear.
    pub fn inject_garbage(&mut self, rows: u32) -> Injection {
        if self.finished() {
            return Injection::default();
        }
        let outcome = inject_rows(
            &mut self.board,
            self.active.as_mut(),
            rows,
            &mut self.garbage_rng,
        );
        if outcome.overflow {
            self.garbage_overflow = true;
        }
        outcome
    }

    /// Main game tick - update timers and handle gravity
    ///
    /// Returns true when the piece moved or locked.
    pub fn tick(&mut self, elapsed_ms: u32, soft_drop: bool) -> bool {
        if self.paused || self.finished() || !self.started {
            return false;
        }

        if self.line_clear_timer_ms > 0 {
            self.line_clear_timer_ms = self.line_clear_timer_ms.saturating_sub(elapsed_ms);
            return false;
        }

        if self.active.is_none() {
            return false;
        }

        if soft_drop != self.is_soft_dropping {
            self.is_soft_dropping = soft_drop;
            self.soft_drop_timer_ms = if soft_drop { SOFT_DROP_GRACE_MS } else { 0 };
            self.drop_timer_ms = 0;
        }

        if self.is_soft_dropping && self.soft_drop_timer_ms > 0 {
            self.soft_drop_timer_ms = self.soft_drop_timer_ms.saturating_sub(elapsed_ms);
        }

        if self.is_grounded() {
            self.lock_timer_ms += elapsed_ms;
            if self.lock_timer_ms >= LOCK_DELAY_MS {
                self.lock_piece();
                return true;
            }
            return false;
        }

        self.drop_timer_ms += elapsed_ms;
        if self.drop_timer_ms < self.drop_interval_ms() {
            return false;
        }
        self.drop_timer_ms = 0;

        if !self.try_move(0, 1) {
            return false;
        }
        if self.is_soft_dropping && self.soft_drop_timer_ms == 0 {
            self.score = self.score.saturating_add(calculate_drop_score(1, false));
        }
        true
    }

    /// Apply a game action
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        if action == GameAction::Pause {
            if !self.finished() {
                self.paused = !self.paused;
            }
            return true;
        }
        if self.paused || self.finished() {
            return false;
        }

        match action {
            GameAction::MoveLeft => self.try_move(-1, 0),
            GameAction::MoveRight => self.try_move(1, 0),
            GameAction::SoftDrop => {
                let moved = self.try_move(0, 1);
                if moved {
                    self.score = self.score.saturating_add(calculate_drop_score(1, false));
                }
                moved
            }
            GameAction::HardDrop => {
                self.hard_drop();
                true
            }
            GameAction::RotateCw => self.try_rotate(true),
            GameAction::RotateCcw => self.try_rotate(false),
            GameAction::Hold => self.hold(),
            GameAction::Pause => true,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(seed: u32) -> GameState {
        let mut state = GameState::new(seed);
        state.start();
        state
    }

    fn fill_row_except(state: &mut GameState, y: i8, gaps: &[i8]) {
        for x in 0..BOARD_WIDTH as i8 {
            if !gaps.contains(&x) {
                state.board_mut().set(x, y, Some(Material::Garbage));
            }
        }
    }

    #[test]
    fn test_new_game_state() {
        let state = GameState::new(12345);

        assert!(!state.started());
        assert!(!state.game_over());
        assert!(!state.paused());
        assert_eq!(state.score(), 0);
        assert_eq!(state.level(), 0);
        assert_eq!(state.lines(), 0);
        assert!(state.active().is_none());
        assert!(state.hold_piece().is_none());
        assert_eq!(state.next_queue().len(), NEXT_QUEUE_LEN);
    }

    #[test]
    fn test_start_spawns_at_spawn_row() {
        let state = started(12345);
        let active = state.active().expect("active piece");
        assert_eq!((active.x, active.y), (3, 0));
    }

    #[test]
    fn test_preview_size_follows_rules() {
        let rules = RulesConfig {
            preview: 3,
            ..RulesConfig::default()
        };
        let state = GameState::with_rules(1, rules);
        assert_eq!(state.next_queue().len(), 3);
    }

    #[test]
    fn test_try_move_collision() {
        let mut state = started(12345);
        for _ in 0..BOARD_WIDTH {
            state.try_move(-1, 0);
        }
        let left = state.active().map(|p| p.x);
        assert!(!state.try_move(-1, 0));
        assert_eq!(state.active().map(|p| p.x), left);
    }

    #[test]
    fn test_hard_drop_scores_and_locks() {
        let mut state = started(12345);
        let distance = state.active().map(|p| p.drop_distance(state.board())).unwrap_or(0);
        let points = state.hard_drop();
        assert_eq!(points, distance as u32 * 2);
        assert_eq!(state.score(), points);
        assert_eq!(state.counters().pieces_placed, 1);

        let event = state.take_last_event().expect("lock event");
        assert_eq!(event.lines_cleared, 0);
        assert!(state.take_last_event().is_none());
    }

    #[test]
    fn test_hold_swaps_and_blocks_second_use() {
        let mut state = started(12345);
        let first = state.active().map(|p| p.kind);

        assert!(state.apply_action(GameAction::Hold));
        assert_eq!(state.hold_piece(), first);
        assert!(!state.apply_action(GameAction::Hold));
        assert_eq!(state.counters().holds, 1);

        state.hard_drop();
        assert!(state.apply_action(GameAction::Hold));
        assert_eq!(state.active().map(|p| p.kind), first);
    }

    #[test]
    fn test_hold_disabled_by_rules() {
        let rules = RulesConfig {
            hold_enabled: false,
            ..RulesConfig::default()
        };
        let mut state = GameState::with_rules(3, rules);
        state.start();
        assert!(!state.apply_action(GameAction::Hold));
    }

    #[test]
    fn test_line_clear_emits_event_and_levels() {
        let mut state = started(12345);
        let kind = state.active().map(|p| p.kind).unwrap_or(PieceKind::I);
        let piece = Tetromino::new(kind).dropped(state.board());
        let cells = piece.cells();
        let bottom = cells.iter().map(|c| c.1).max().unwrap_or(19);
        let gaps: Vec<i8> = cells
            .iter()
            .filter(|c| c.1 == bottom)
            .map(|c| c.0)
            .collect();
        fill_row_except(&mut state, bottom, &gaps);

        state.hard_drop();
        let event = state.take_last_event().expect("lock event");
        assert_eq!(event.lines_cleared, 1);
        assert_eq!(event.combo, 1);
        assert_eq!(state.lines(), 1);
        assert!(event.line_clear_score >= 40);
    }

    #[test]
    fn test_perfect_clear_detection() {
        let mut state = started(12345);
        state.active = Some(Tetromino {
            kind: PieceKind::I,
            rotation: Rotation::North,
            x: 0,
            y: 0,
        });
        fill_row_except(&mut state, 19, &[0, 1, 2, 3]);

        state.hard_drop();
        let event = state.take_last_event().expect("lock event");
        assert_eq!(event.lines_cleared, 1);
        assert!(event.perfect_clear);
        assert_eq!(state.counters().perfect_clears, 1);
    }

    #[test]
    fn test_t_spin_detection() {
        let mut state = GameState::new(12345);
        let piece = Tetromino {
            kind: PieceKind::T,
            rotation: Rotation::South,
            x: 3,
            y: 17,
        };
        state.last_action_was_rotate = true;
        state.board_mut().set(3, 17, Some(Material::Garbage));
        state.board_mut().set(5, 17, Some(Material::Garbage));
        state.board_mut().set(3, 19, Some(Material::Garbage));
        state.board_mut().set(5, 19, Some(Material::Garbage));

        assert_eq!(state.t_spin_kind(&piece), TSpinKind::Full);

        // Three corners with one front corner open.
        state.board_mut().set(3, 19, None);
        assert_eq!(state.t_spin_kind(&piece), TSpinKind::Mini);

        state.last_action_was_rotate = false;
        assert_eq!(state.t_spin_kind(&piece), TSpinKind::None);
    }

    #[test]
    fn test_tick_gravity() {
        let mut state = started(12345);
        let y0 = state.active().map(|p| p.y);
        let interval = state.drop_interval_ms();

        assert!(!state.tick(interval - 1, false));
        assert!(state.tick(1, false));
        assert_eq!(state.active().map(|p| p.y), y0.map(|y| y + 1));
    }

    #[test]
    fn test_gravity_override_and_multiplier() {
        let rules = RulesConfig {
            gravity_multiplier: 0.5,
            ..RulesConfig::default()
        };
        let mut state = GameState::with_rules(1, rules);
        assert_eq!(state.drop_interval_ms(), 2000);

        state.set_gravity_override_ms(Some(40));
        assert_eq!(state.drop_interval_ms(), 40);
        state.set_gravity_override_ms(None);
        assert_eq!(state.drop_interval_ms(), 2000);
    }

    #[test]
    fn test_lock_delay_locks_grounded_piece() {
        let mut state = started(12345);
        while state.try_move(0, 1) {}
        assert!(state.is_grounded());

        assert!(!state.tick(LOCK_DELAY_MS - 1, false));
        assert!(state.tick(1, false));
        assert!(state.take_last_event().is_some());
    }

    #[test]
    fn test_lock_reset_limit() {
        let mut state = started(12345);
        while state.try_move(0, 1) {}

        for _ in 0..20 {
            state.reset_lock_timer();
        }
        assert_eq!(state.lock_reset_count, LOCK_RESET_LIMIT);
    }

    #[test]
    fn test_line_clear_pause_blocks_gravity() {
        let mut state = started(12345);
        state.line_clear_timer_ms = LINE_CLEAR_PAUSE_MS;

        assert!(!state.tick(100, false));
        assert!(state.line_clear_timer_ms > 0);
        assert!(!state.tick(100, false));
        assert_eq!(state.line_clear_timer_ms, 0);
    }

    #[test]
    fn test_blocked_spawn_is_game_over() {
        let mut state = started(12345);
        for y in 0..2 {
            fill_row_except(&mut state, y, &[0]);
        }
        state.active = None;
        assert!(!state.spawn_piece());
        assert!(state.game_over());
        assert!(state.finished());
        assert!(!state.apply_action(GameAction::MoveLeft));
    }

    #[test]
    fn test_pause_stops_game() {
        let mut state = started(12345);
        assert!(state.apply_action(GameAction::Pause));
        assert!(state.paused());
        assert!(!state.tick(5000, false));
        assert!(!state.apply_action(GameAction::MoveLeft));
        assert!(state.apply_action(GameAction::Pause));
        assert!(!state.paused());
    }

    #[test]
    fn test_inject_garbage_keeps_piece_valid() {
        let mut state = started(12345);
        let out = state.inject_garbage(3);
        assert_eq!(out.rows, 3);
        assert!(!out.overflow);
        assert!(state.active().map(|p| p.is_valid(state.board())).unwrap_or(false));
        assert!(!state.garbage_overflow());
    }

    #[test]
    fn test_inject_garbage_overflow_sets_flag() {
        let mut state = started(12345);
        for y in 2..BOARD_HEIGHT as i8 {
            fill_row_except(&mut state, y, &[9]);
        }
        let out = state.inject_garbage(5);
        assert!(out.overflow);
        assert!(state.garbage_overflow());
        assert!(!state.game_over());
        assert!(!state.tick(TICK_MS, false));
    }

    #[test]
    fn test_inject_garbage_partial_lift_keeps_playing() {
        let mut state = started(12345);
        for y in 2..BOARD_HEIGHT as i8 {
            fill_row_except(&mut state, y, &[9]);
        }
        let out = state.inject_garbage(1);
        assert!(out.lifted);
        assert!(!out.overflow);
        assert!(!state.finished());
        assert_eq!(state.active().map(|p| p.y), Some(-1));

        state.hard_drop();
        assert_eq!(state.counters().pieces_placed, 1);
    }

    #[test]
    fn test_soft_drop_scoring() {
        let mut state = started(12345);
        assert!(state.apply_action(GameAction::SoftDrop));
        assert_eq!(state.score(), 1);
    }

    #[test]
    fn test_same_seed_same_game() {
        let mut a = started(777);
        let mut b = started(777);
        for _ in 0..20 {
            a.hard_drop();
            b.hard_drop();
        }
        assert_eq!(a.board(), b.board());
        assert_eq!(a.score(), b.score());
    }
}

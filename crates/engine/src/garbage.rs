//! Attack sizing and the per-side garbage ledger.
//!
//! Each battle side owns one [`GarbageLedger`]. Outgoing attacks are sized from
//! line clears; incoming attacks queue a delayed delivery on the receiver's
//! ledger. Board mutation itself happens in `tetris_arena_core::garbage`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::BattleConfig;
use crate::schedule::Schedule;

/// Rows sent for a line clear before any multiplier or bonus.
pub fn base_attack(lines: u32) -> u32 {
    match lines {
        0 | 1 => 0,
        2 => 1,
        3 => 2,
        n => 4 + (n - 4),
    }
}

/// Size of an attack: multiplier applies to the base, bonuses are added after.
pub fn attack_size(lines: u32, garbage_multiplier: f64, tspin: bool, perfect_clear: bool) -> u32 {
    let mut size = (base_attack(lines) as f64 * garbage_multiplier).floor().max(0.0) as u32;
    if tspin {
        size += 2;
    }
    if perfect_clear {
        size += 6;
    }
    size
}

/// The part of a lock event that matters to the garbage subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearInfo {
    pub lines: u32,
    pub tspin: bool,
    pub perfect_clear: bool,
}

/// Garbage bookkeeping for one side of a match.
#[derive(Debug, Clone, Default)]
pub struct GarbageLedger {
    lines_sent: u32,
    lines_received: u32,
    attacks_sent: u32,
    attacks_blocked: u32,
    pending: u32,
    deliveries: Schedule<u32>,
    defense_mode: bool,
    counter_multiplier: f64,
    overflow: bool,
}

/// Read-only copy of a ledger's counters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub lines_sent: u32,
    pub lines_received: u32,
    pub attacks_sent: u32,
    pub attacks_blocked: u32,
    pub pending: u32,
    pub defense_mode: bool,
}

impl GarbageLedger {
    pub fn new() -> Self {
        Self {
            counter_multiplier: 1.0,
            ..Self::default()
        }
    }

    /// Size the attack for a clear and record it as sent.
    ///
    /// A clear made in defense mode consumes it and is scaled by the counter
    /// multiplier. Returns the rows sent (0 = no attack).
    pub fn send(&mut self, clear: ClearInfo, config: &BattleConfig) -> u32 {
        if clear.lines == 0 {
            return 0;
        }

        let mut size = attack_size(
            clear.lines,
            config.garbage_multiplier,
            clear.tspin,
            clear.perfect_clear,
        );

        if self.defense_mode {
            size = (size as f64 * self.counter_multiplier).floor() as u32;
            self.defense_mode = false;
            self.attacks_blocked += 1;
            debug!(size, "counter-attack consumed defense mode");
        }

        if size > 0 {
            self.lines_sent += size;
            self.attacks_sent += 1;
        }
        size
    }

    /// Record an incoming attack and queue its delivery.
    pub fn receive(&mut self, lines: u32, now_ms: u64, config: &BattleConfig) {
        if lines == 0 {
            return;
        }
        self.lines_received += lines;
        self.pending += lines;
        self.deliveries
            .push(now_ms + config.attack_delay_ms, lines);
        self.defense_mode = true;
        self.counter_multiplier = config.counter_multiplier;
        debug!(lines, pending = self.pending, "attack incoming");
    }

    /// Next delivery whose deadline has passed.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<u32> {
        self.deliveries.pop_due(now_ms)
    }

    /// Rows a delivery of `lines` may actually push; reduces `pending` by that amount.
    pub fn take_delivery(&mut self, lines: u32, capacity: u32) -> u32 {
        let rows = lines.min(self.pending).min(capacity);
        self.pending -= rows;
        rows
    }

    pub fn mark_overflow(&mut self) {
        self.overflow = true;
    }

    pub fn overflow(&self) -> bool {
        self.overflow
    }

    pub fn defense_mode(&self) -> bool {
        self.defense_mode
    }

    pub fn counter_multiplier(&self) -> f64 {
        self.counter_multiplier
    }

    pub fn pending(&self) -> u32 {
        self.pending
    }

    pub fn queued_deliveries(&self) -> usize {
        self.deliveries.len()
    }

    /// Drop every queued delivery.
    pub fn cancel_deliveries(&mut self) {
        self.deliveries.clear();
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            lines_sent: self.lines_sent,
            lines_received: self.lines_received,
            attacks_sent: self.attacks_sent,
            attacks_blocked: self.attacks_blocked,
            pending: self.pending,
            defense_mode: self.defense_mode,
        }
    }
}

use tracing::debug;

use crate::collab::{PeerMessage, RecordStore};
use crate::condition::{Condition, ConditionList};
use crate::config::{BattleConfig, ModeConfig, OpponentKind};
use crate::core::GameState;
use crate::garbage::{ClearInfo, GarbageLedger};
use crate::lifecycle::{ModeCtx, ModeState, Outcome};
use crate::notify::Notification;
use crate::opponent::{DecisionPolicy, OpponentEvent, OpponentSim, OpponentSnapshot};
use crate::policy::HeuristicPolicy;
use crate::stats::{BattleExtras, ModeExtras};
use crate::types::LockEvent;

use super::ModeHooks;

/// Who the player is fighting.
#[derive(Debug)]
pub enum OpponentSide {
    /// Embedded simulator, with its own ledger and cadence accumulators.
    Simulated {
        sim: OpponentSim,
        ledger: GarbageLedger,
        cadence_ms: u64,
        gravity_ticks: u32,
    },
    /// A peer behind the transport; only what it reports is known.
    Remote { lines: u32, topped_out: bool },
}

/// Head-to-head garbage exchange.
#[derive(Debug)]
pub struct BattleMode {
    config: BattleConfig,
    ledger: GarbageLedger,
    opponent: OpponentSide,
}

impl BattleMode {
    pub(crate) fn new(config: &ModeConfig, policy: Option<Box<dyn DecisionPolicy>>) -> Self {
        let battle = config.battle;
        let opponent = match battle.opponent {
            OpponentKind::Simulated => {
                let policy =
                    policy.unwrap_or_else(|| Box::new(HeuristicPolicy::new(battle.difficulty)));
                OpponentSide::Simulated {
                    sim: OpponentSim::new(config.seed.wrapping_add(1), policy),
                    ledger: GarbageLedger::new(),
                    cadence_ms: 0,
                    gravity_ticks: 0,
                }
            }
            OpponentKind::Remote => OpponentSide::Remote {
                lines: 0,
                topped_out: false,
            },
        };

        Self {
            config: battle,
            ledger: GarbageLedger::new(),
            opponent,
        }
    }

    /// The player's ledger.
    pub fn ledger(&self) -> &GarbageLedger {
        &self.ledger
    }

    pub fn opponent(&self) -> &OpponentSide {
        &self.opponent
    }

    pub fn opponent_ledger(&self) -> Option<&GarbageLedger> {
        match &self.opponent {
            OpponentSide::Simulated { ledger, .. } => Some(ledger),
            OpponentSide::Remote { .. } => None,
        }
    }

    pub fn opponent_snapshot(&self) -> OpponentSnapshot {
        match &self.opponent {
            OpponentSide::Simulated { sim, ledger, .. } => OpponentSnapshot {
                overflowed: sim.snapshot().overflowed || ledger.overflow(),
                ..sim.snapshot()
            },
            OpponentSide::Remote { lines, topped_out } => OpponentSnapshot {
                lines: *lines,
                topped_out: *topped_out,
                ..OpponentSnapshot::default()
            },
        }
    }

    fn is_opponent_defeated(&self) -> bool {
        self.opponent_snapshot().defeated()
    }

    /// An attack aimed at the player.
    fn incoming(&mut self, ctx: &mut ModeCtx<'_>, lines: u32) {
        if lines == 0 {
            return;
        }
        self.ledger.receive(lines, ctx.now_ms, &self.config);
        ctx.fx.notify(Notification::AttackIncoming { lines });
    }

    fn deliver_to_player(&mut self, ctx: &mut ModeCtx<'_>) {
        while let Some(lines) = self.ledger.pop_due(ctx.now_ms) {
            let rows = self.ledger.take_delivery(lines, self.config.garbage_capacity);
            if rows == 0 {
                continue;
            }
            let injection = ctx.game.inject_garbage(rows);
            debug!(rows, overflow = injection.overflow, "garbage delivered to player");
            if injection.overflow {
                self.ledger.mark_overflow();
            }
        }
    }

    fn update_simulated(&mut self, ctx: &mut ModeCtx<'_>, dt_ms: u32) {
        let OpponentSide::Simulated {
            sim,
            ledger,
            cadence_ms,
            gravity_ticks,
        } = &mut self.opponent
        else {
            return;
        };

        while let Some(lines) = ledger.pop_due(ctx.now_ms) {
            let rows = ledger.take_delivery(lines, self.config.garbage_capacity);
            if rows == 0 {
                continue;
            }
            let injection = sim.inject_garbage(rows);
            debug!(rows, overflow = injection.overflow, "garbage delivered to opponent");
            if injection.overflow {
                ledger.mark_overflow();
            }
        }

        *cadence_ms += dt_ms as u64;
        while *cadence_ms >= self.config.opponent_update_ms {
            *cadence_ms -= self.config.opponent_update_ms;
            sim.update();
        }

        *gravity_ticks += 1;
        if *gravity_ticks >= self.config.opponent_gravity_ticks {
            *gravity_ticks = 0;
            sim.apply_gravity();
        }

        let mut attacks = Vec::new();
        for event in sim.drain_events() {
            match event {
                OpponentEvent::LinesCleared(count) => {
                    let size = ledger.send(
                        ClearInfo {
                            lines: count,
                            tspin: false,
                            perfect_clear: false,
                        },
                        &self.config,
                    );
                    if size > 0 {
                        attacks.push(size);
                    }
                }
                OpponentEvent::ToppedOut | OpponentEvent::Overflowed => {
                    ctx.fx.request_victory_check();
                }
            }
        }
        if ledger.overflow() {
            ctx.fx.request_victory_check();
        }

        for size in attacks {
            self.incoming(ctx, size);
        }
    }
}

impl ModeHooks for BattleMode {
    fn defeat_conditions(&self) -> ConditionList {
        ConditionList::from([Condition::GarbageOverflow, Condition::TopOut])
    }

    fn victory_conditions(&self) -> ConditionList {
        ConditionList::from([Condition::OpponentDefeated])
    }

    fn on_lock(&mut self, ctx: &mut ModeCtx<'_>, event: &LockEvent) {
        if !event.cleared_lines() {
            return;
        }

        let remote = matches!(self.opponent, OpponentSide::Remote { .. });
        if remote {
            ctx.fx
                .send(PeerMessage::OpponentLinesCleared(event.lines_cleared));
        }

        let size = self.ledger.send(
            ClearInfo {
                lines: event.lines_cleared,
                tspin: event.tspin.is_spin(),
                perfect_clear: event.perfect_clear,
            },
            &self.config,
        );
        if size == 0 {
            return;
        }

        ctx.fx.notify(Notification::AttackSent { lines: size });
        match &mut self.opponent {
            OpponentSide::Simulated { ledger, .. } => {
                ledger.receive(size, ctx.now_ms, &self.config);
            }
            OpponentSide::Remote { .. } => ctx.fx.send(PeerMessage::OpponentGarbage(size)),
        }
        debug!(size, "attack sent");
    }

    fn update(&mut self, ctx: &mut ModeCtx<'_>, dt_ms: u32) {
        self.deliver_to_player(ctx);
        self.update_simulated(ctx, dt_ms);
    }

    fn on_peer_message(&mut self, ctx: &mut ModeCtx<'_>, message: PeerMessage) {
        if !matches!(self.opponent, OpponentSide::Remote { .. }) {
            debug!(?message, "peer message ignored with a simulated opponent");
            return;
        }
        match message {
            PeerMessage::OpponentGarbage(size) => self.incoming(ctx, size),
            PeerMessage::OpponentLinesCleared(count) => {
                if let OpponentSide::Remote { lines, .. } = &mut self.opponent {
                    *lines += count;
                }
            }
            PeerMessage::OpponentToppedOut(true) => {
                if let OpponentSide::Remote { topped_out, .. } = &mut self.opponent {
                    *topped_out = true;
                }
                ctx.fx.request_victory_check();
            }
            PeerMessage::OpponentToppedOut(false) => {}
        }
    }

    fn on_end(&mut self, ctx: &mut ModeCtx<'_>, outcome: &Outcome, _records: &mut dyn RecordStore) {
        if !outcome.is_victory() && matches!(self.opponent, OpponentSide::Remote { .. }) {
            ctx.fx.send(PeerMessage::OpponentToppedOut(true));
        }
        self.destroy();
    }

    fn opponent_defeated(&self) -> bool {
        self.is_opponent_defeated()
    }

    fn ledger(&self) -> Option<&GarbageLedger> {
        Some(&self.ledger)
    }

    fn destroy(&mut self) {
        self.ledger.cancel_deliveries();
        if let OpponentSide::Simulated { ledger, .. } = &mut self.opponent {
            ledger.cancel_deliveries();
        }
    }

    fn extras(&self, _game: &GameState, _state: &ModeState, _duration_ms: u64) -> ModeExtras {
        let sent = self.ledger.snapshot();
        let opponent = self.opponent_snapshot();
        ModeExtras::Battle(BattleExtras {
            opponent: self.config.opponent,
            difficulty: self.config.difficulty,
            lines_sent: sent.lines_sent,
            lines_received: sent.lines_received,
            attacks_sent: sent.attacks_sent,
            attacks_blocked: sent.attacks_blocked,
            opponent_score: opponent.score,
            opponent_lines: opponent.lines,
        })
    }
}

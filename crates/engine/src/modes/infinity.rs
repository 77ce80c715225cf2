use crate::core::{scoring::frames_to_ms, GameState, SimpleRng};
use crate::lifecycle::{ModeCtx, ModeState};
use crate::notify::Notification;
use crate::stats::{InfinityExtras, ModeExtras};
use crate::types::LockEvent;

use super::ModeHooks;

const FIRST_LEVEL_EXP: u64 = 1_000;
const EXP_GROWTH: f64 = 1.2;
const LEVEL_DIFFICULTY: f64 = 1.05;
const MINUTE_DIFFICULTY: f64 = 1.01;
const MINUTE_MS: u64 = 60_000;
/// Gravity stops speeding up past this (1-based) level.
const SPEED_CAP: u32 = 20;
const PERFECT_CLEAR_BONUS: u32 = 5_000;
const ITEM_DROP_CHANCE: f64 = 0.1;

const LEVEL_ACHIEVEMENTS: [(u32, &str); 3] = [
    (10, "infinity_level_10"),
    (25, "infinity_level_25"),
    (50, "infinity_level_50"),
];
const PERFECT_CLEAR_ACHIEVEMENTS: [(u32, &str); 2] =
    [(5, "perfect_clear_5"), (10, "perfect_clear_10")];

/// Endless play with an experience economy layered over the score.
#[derive(Debug, Clone, PartialEq)]
pub struct InfinityMode {
    level: u32,
    experience: u64,
    next_level_exp: u64,
    difficulty: f64,
    minute_ms: u64,
    perfect_clears: u32,
    items: u32,
    skill_points: u32,
    achievements: Vec<String>,
    rng: SimpleRng,
}

impl InfinityMode {
    pub(crate) fn new(seed: u32) -> Self {
        Self {
            level: 1,
            experience: 0,
            next_level_exp: FIRST_LEVEL_EXP,
            difficulty: 1.0,
            minute_ms: 0,
            perfect_clears: 0,
            items: 0,
            skill_points: 0,
            achievements: Vec::new(),
            rng: SimpleRng::new(seed.wrapping_mul(31).wrapping_add(7)),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn experience(&self) -> u64 {
        self.experience
    }

    pub fn next_level_exp(&self) -> u64 {
        self.next_level_exp
    }

    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    pub fn items(&self) -> u32 {
        self.items
    }

    pub fn skill_points(&self) -> u32 {
        self.skill_points
    }

    pub fn achievements(&self) -> &[String] {
        &self.achievements
    }

    /// Gravity interval for the player's level under the current difficulty.
    pub fn gravity_ms(&self, game_level: u32) -> u32 {
        let level = (game_level + 1).min(SPEED_CAP);
        let base = 60u32.saturating_sub((level - 1) * 3).max(1);
        let frames = ((base as f64 / self.difficulty).round() as u32).max(1);
        frames_to_ms(frames)
    }

    fn add_experience(&mut self, ctx: &mut ModeCtx<'_>, amount: u64) {
        self.experience += amount;
        let mut leveled = false;
        while self.experience >= self.next_level_exp {
            self.experience -= self.next_level_exp;
            self.level += 1;
            self.next_level_exp = (self.next_level_exp as f64 * EXP_GROWTH).floor() as u64;
            self.difficulty *= LEVEL_DIFFICULTY;
            self.skill_points += 1;
            leveled = true;
            ctx.fx.notify(Notification::InfinityLevelUp {
                level: self.level,
                next_exp: self.next_level_exp,
            });
        }
        if leveled {
            self.check_achievements(ctx);
            self.apply_gravity(ctx);
        }
    }

    fn check_achievements(&mut self, ctx: &mut ModeCtx<'_>) {
        let earned = LEVEL_ACHIEVEMENTS
            .iter()
            .filter(|(at, _)| self.level >= *at)
            .chain(
                PERFECT_CLEAR_ACHIEVEMENTS
                    .iter()
                    .filter(|(at, _)| self.perfect_clears >= *at),
            )
            .map(|(_, name)| *name)
            .collect::<Vec<_>>();

        for name in earned {
            if !self.achievements.iter().any(|a| a == name) {
                self.achievements.push(name.to_string());
                ctx.fx.notify(Notification::AchievementUnlocked {
                    name: name.to_string(),
                });
            }
        }
    }

    fn apply_gravity(&self, ctx: &mut ModeCtx<'_>) {
        let interval = self.gravity_ms(ctx.game.level());
        ctx.game.set_gravity_override_ms(Some(interval));
    }
}

impl ModeHooks for InfinityMode {
    fn on_start(&mut self, ctx: &mut ModeCtx<'_>) {
        self.apply_gravity(ctx);
    }

    fn on_score_gain(&mut self, ctx: &mut ModeCtx<'_>, gain: u32) {
        self.add_experience(ctx, gain as u64 / 10);
    }

    fn on_lock(&mut self, ctx: &mut ModeCtx<'_>, event: &LockEvent) {
        if self.rng.chance(ITEM_DROP_CHANCE * 0.1) {
            self.items += 1;
        }
        if !event.cleared_lines() {
            return;
        }

        if event.perfect_clear {
            self.perfect_clears += 1;
            let bonus = PERFECT_CLEAR_BONUS * self.level;
            ctx.game.add_score(bonus);
            ctx.fx.notify(Notification::PerfectClear {
                bonus,
                total: self.perfect_clears,
            });
            self.items += 1;
            self.check_achievements(ctx);
            // Bonus points earn experience like any other gain.
            ctx.fx.request_victory_check();
            self.on_score_gain(ctx, bonus);
        }

        let lines = event.lines_cleared as u64;
        self.add_experience(ctx, lines * 100 * self.level as u64);

        if self.rng.chance(ITEM_DROP_CHANCE * lines as f64) {
            self.items += 1;
        }

        // Level progression on the player board may have changed the curve.
        self.apply_gravity(ctx);
    }

    fn update(&mut self, ctx: &mut ModeCtx<'_>, dt_ms: u32) {
        self.minute_ms += dt_ms as u64;
        if self.minute_ms >= MINUTE_MS {
            while self.minute_ms >= MINUTE_MS {
                self.minute_ms -= MINUTE_MS;
                self.difficulty *= MINUTE_DIFFICULTY;
            }
            self.apply_gravity(ctx);
        }
    }

    fn extras(&self, _game: &GameState, _state: &ModeState, _duration_ms: u64) -> ModeExtras {
        ModeExtras::Infinity(InfinityExtras {
            infinity_level: self.level,
            experience: self.experience,
            next_level_exp: self.next_level_exp,
            difficulty: self.difficulty,
            items: self.items,
            skill_points: self.skill_points,
            achievements: self.achievements.clone(),
        })
    }
}

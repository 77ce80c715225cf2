//! Whole-run tests driving `ModeEngine` through fixed-timestep ticks.

use std::cell::Cell;
use std::rc::Rc;

use tetris_arena_engine::types::GameAction;
use tetris_arena_engine::{
    Autoplayer, Condition, Difficulty, MemoryRecordStore, ModeConfig, ModeEngine, ModeExtras,
    ModeKind, ModeSettings, ModeVariant, Notification, Outcome, OutcomeReason, RecordStore,
};

/// Feed one autoplayer action per tick until the mode ends or the budget runs out.
fn autoplay(engine: &mut ModeEngine, max_ticks: u32) {
    let mut player = Autoplayer::new(Difficulty::Medium);
    for _ in 0..max_ticks {
        if !engine.state().is_active() {
            break;
        }
        if let Some(action) = player.next_action(engine.game()) {
            engine.push_action(action);
        }
        engine.tick();
    }
}

fn terminal_count(notes: &[Notification]) -> usize {
    notes.iter().filter(|n| n.is_terminal()).count()
}

#[test]
fn sprint_autoplay_reaches_forty_lines() {
    let calls = Rc::new(Cell::new(0u32));
    let seen = calls.clone();
    let mut engine = ModeEngine::builder(ModeConfig::new("sprint", 11))
        .victory_condition(Condition::custom("count_checks", move |_| {
            seen.set(seen.get() + 1);
            Ok(None)
        }))
        .build();
    engine.start();
    let mut player = Autoplayer::new(Difficulty::Medium);
    for _ in 0..40_000 {
        if let Some(action) = player.next_action(engine.game()) {
            engine.push_action(action);
        }
        engine.tick();
        if engine.game().lines() < 40 {
            assert!(engine.state().is_active(), "ended early at {} lines", engine.game().lines());
        } else {
            break;
        }
    }

    assert_eq!(
        engine.state().outcome(),
        Some(&Outcome::Victory(OutcomeReason::TargetReached))
    );
    assert!(engine.game().lines() >= 40);

    let notes = engine.drain_notifications();
    assert_eq!(terminal_count(&notes), 1);
    let Some(Notification::Victory { reason, stats }) = notes.last() else {
        panic!("last notification should be the victory");
    };
    assert_eq!(reason, "target_reached");
    assert_eq!(stats.victory, Some(true));

    let best = engine.records().get("tetris_sprint_best");
    assert_eq!(best, Some(engine.stats().duration_ms));
    match engine.stats().extras {
        ModeExtras::Sprint(extras) => {
            assert_eq!(extras.target_lines, 40);
            assert_eq!(extras.final_time_ms, best);
        }
        other => panic!("unexpected extras {other:?}"),
    }

    // Conditions are not evaluated once the run is over.
    let after_end = calls.get();
    engine.tick_n(100);
    assert_eq!(calls.get(), after_end);
}

#[test]
fn blitz_runs_out_of_time_at_two_minutes() {
    let settings = ModeSettings {
        gravity_multiplier: 0.01,
        ..ModeSettings::for_kind(ModeKind::Blitz)
    };
    let mut engine = ModeEngine::builder(ModeConfig::new("blitz", 3))
        .settings(settings)
        .build();
    engine.start();
    engine.tick_n(10_000);

    assert_eq!(
        engine.state().outcome(),
        Some(&Outcome::Defeat(OutcomeReason::TimeUp))
    );
    assert_eq!(engine.now_ms(), 120_000);

    let stats = engine.stats();
    assert_eq!(stats.duration_ms, 120_000);
    assert_eq!(stats.reason.as_deref(), Some("time_up"));
    match stats.extras {
        ModeExtras::Blitz(extras) => assert_eq!(extras.time_remaining_ms, 0),
        other => panic!("unexpected extras {other:?}"),
    }
}

#[test]
fn classic_persists_best_score_and_lines() {
    let mut engine = ModeEngine::new(ModeConfig::new("classic", 9));
    engine.start();
    for _ in 0..500 {
        if !engine.state().is_active() {
            break;
        }
        engine.push_action(GameAction::HardDrop);
        engine.tick();
    }

    assert_eq!(
        engine.state().outcome(),
        Some(&Outcome::Defeat(OutcomeReason::TopOut))
    );
    let score = engine.game().score() as u64;
    assert!(score > 0);
    assert_eq!(engine.records().get("tetris_marathon_best_score"), Some(score));

    // A worse run leaves a stored record alone.
    let mut records = MemoryRecordStore::new();
    records.set("tetris_marathon_best_score", score + 1_000);
    let mut engine = ModeEngine::builder(ModeConfig::new("classic", 9))
        .records(records)
        .build();
    engine.start();
    for _ in 0..500 {
        if !engine.state().is_active() {
            break;
        }
        engine.push_action(GameAction::HardDrop);
        engine.tick();
    }
    assert!(engine.state().ended());
    assert_eq!(
        engine.records().get("tetris_marathon_best_score"),
        Some(score + 1_000)
    );
}

#[test]
fn infinity_earns_experience_from_play() {
    let mut engine = ModeEngine::new(ModeConfig::new("marathon", 21));
    assert_eq!(engine.kind(), ModeKind::Infinity);
    engine.start();
    autoplay(&mut engine, 3_000);

    let ModeVariant::Infinity(mode) = engine.variant() else {
        panic!("marathon should run the infinity rules");
    };
    assert!(mode.experience() > 0 || mode.level() > 1);
    assert!(engine.game().counters().pieces_placed > 10);
}

#[test]
fn start_level_override_applies() {
    let mut config = ModeConfig::new("classic", 2);
    config.start_level = Some(5);
    let mut engine = ModeEngine::new(config);
    engine.start();
    assert_eq!(engine.settings().start_level, 5);
    assert_eq!(engine.game().level(), 5);
}

//! Headless arena runner (default binary).
//!
//! Plays one mode with the heuristic autoplayer and prints the final stats as
//! JSON on stdout. Logs go to stderr, filtered by `RUST_LOG`.
//!
//! Without a peer the run goes as fast as the CPU allows. With
//! `ARENA_LISTEN_ADDR` or `ARENA_PEER_ADDR` set, the run becomes a battle
//! against that peer and ticks are paced in real time so both sides advance
//! together.

use std::env;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use tetris_arena::adapter::{PeerConfig, PeerLink};
use tetris_arena::engine::{
    Autoplayer, ConfigError, Difficulty, ModeConfig, ModeEngine, ModeKind, Notification,
    OpponentKind,
};
use tetris_arena::types::TICK_MS;

/// Ten simulated minutes.
const DEFAULT_TICKS: u32 = 37_500;

fn main() -> Result<()> {
    init_tracing();

    let mut config = ModeConfig::from_env().context("invalid ARENA_* configuration")?;
    let max_ticks = ticks_from_env()?;
    let peer = PeerConfig::from_env().context("invalid peer address")?;

    let link = match peer {
        Some(peer) => {
            if config.kind() != ModeKind::Battle {
                warn!(mode = %config.mode, "peer configured, switching to battle");
                config.mode = ModeKind::Battle.as_str().to_string();
            }
            config.battle.opponent = OpponentKind::Remote;
            Some(PeerLink::start(peer)?)
        }
        None => None,
    };
    if let Some(addr) = link.as_ref().and_then(PeerLink::local_addr) {
        info!(%addr, "listening for peer");
    }
    let realtime = link.is_some();

    let mut builder = ModeEngine::builder(config);
    if let Some(link) = link {
        builder = builder.transport(link);
    }
    let mut engine = builder.build();

    run(&mut engine, max_ticks, realtime);

    let stats = engine.stats();
    println!("{}", serde_json::to_string_pretty(&stats)?);
    engine.destroy();
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn ticks_from_env() -> Result<u32, ConfigError> {
    match env::var("ARENA_TICKS") {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    var: "ARENA_TICKS",
                    value: raw.clone(),
                })
        }
        _ => Ok(DEFAULT_TICKS),
    }
}

fn run(engine: &mut ModeEngine, max_ticks: u32, realtime: bool) {
    let mut player = Autoplayer::new(Difficulty::Medium);
    let tick_duration = Duration::from_millis(TICK_MS as u64);

    engine.start();
    report(engine);

    let mut last_tick = Instant::now();
    for _ in 0..max_ticks {
        if !engine.state().is_active() {
            break;
        }
        if let Some(action) = player.next_action(engine.game()) {
            engine.push_action(action);
        }
        engine.tick();
        report(engine);

        if realtime {
            if let Some(wait) = tick_duration.checked_sub(last_tick.elapsed()) {
                thread::sleep(wait);
            }
            last_tick = Instant::now();
        }
    }

    if engine.state().is_active() {
        info!(ticks = max_ticks, "tick budget exhausted");
    }
}

fn report(engine: &mut ModeEngine) {
    for note in engine.drain_notifications() {
        match &note {
            Notification::Victory { reason, stats } | Notification::Defeat { reason, stats } => {
                info!(
                    victory = note_is_victory(&note),
                    reason = %reason,
                    score = stats.score,
                    lines = stats.lines,
                    duration_ms = stats.duration_ms,
                    "run finished"
                );
            }
            other => debug!(?other, "notification"),
        }
    }
}

fn note_is_victory(note: &Notification) -> bool {
    matches!(note, Notification::Victory { .. })
}

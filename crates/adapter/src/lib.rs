//! Peer adapter - battle messages over TCP with a line-delimited JSON protocol
//!
//! Lets two arena processes play a battle against each other. Each side runs
//! its own [`ModeEngine`](engine::ModeEngine) with a remote opponent and plugs a
//! [`PeerLink`] in as its [`Transport`](engine::Transport).
//!
//! # Protocol Overview
//!
//! One JSON object per line, UTF-8, `\n` terminated. Each line is a single
//! [`PeerMessage`](engine::PeerMessage) in its externally tagged form:
//!
//! ```text
//! {"opponentLinesCleared":2}
//! {"opponentGarbage":4}
//! {"opponentToppedOut":true}
//! ```
//!
//! Blank lines are skipped. Lines that fail to parse are logged and dropped;
//! they never reach the engine. Delivery order follows TCP order.
//!
//! # Roles
//!
//! - **Listen**: bind, accept exactly one peer, then exchange messages.
//! - **Connect**: dial the listening side, retrying briefly while it starts.
//!
//! # Environment Variables
//!
//! - `ARENA_LISTEN_ADDR`: bind address for the listening side (e.g. `127.0.0.1:7878`)
//! - `ARENA_PEER_ADDR`: address to dial; ignored when `ARENA_LISTEN_ADDR` is set
//!
//! # Implementation
//!
//! - Uses **tokio** on a runtime owned by the link; the game loop stays sync
//! - The loop talks to the socket tasks only through channels
//! - See [`protocol`] for the codec and [`runtime`] for the link itself

pub mod protocol;
pub mod runtime;

pub use tetris_arena_engine as engine;

pub use protocol::{decode_bytes, decode_line, encode_line, ProtocolError, MAX_LINE_LEN};
pub use runtime::{run_link, PeerConfig, PeerConfigError, PeerLink, PeerRole};

//! Collaborators injected into a [`ModeEngine`](crate::ModeEngine).
//!
//! - [`RecordStore`]: persisted personal bests, read at construction and written
//!   when a mode ends.
//! - [`Transport`]: peer messages for remote battles. Delivery is assumed
//!   reliable and ordered; the engine polls it once per tick.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

pub trait RecordStore {
    fn get(&self, key: &str) -> Option<u64>;
    fn set(&mut self, key: &str, value: u64);
}

/// In-memory store, enough for tests and the headless runner.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    values: HashMap<String, u64>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryRecordStore {
    fn get(&self, key: &str) -> Option<u64> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: u64) {
        self.values.insert(key.to_string(), value);
    }
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn get(&self, key: &str) -> Option<u64> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: u64) {
        (**self).set(key, value)
    }
}

/// Messages exchanged with a remote opponent.
///
/// Serialized externally tagged in camelCase: `{"opponentLinesCleared":3}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PeerMessage {
    /// Informational: how many lines the sender just cleared.
    OpponentLinesCleared(u32),
    /// An attack of this many garbage lines.
    OpponentGarbage(u32),
    /// The sender has lost.
    OpponentToppedOut(bool),
}

pub trait Transport {
    /// Next inbound message, if one is waiting.
    fn try_recv(&mut self) -> Option<PeerMessage>;
    fn send(&mut self, message: PeerMessage);
}

type Queue = Arc<Mutex<VecDeque<PeerMessage>>>;

/// In-process transport; [`LoopbackTransport::pair`] wires two ends together.
#[derive(Debug, Clone, Default)]
pub struct LoopbackTransport {
    inbound: Queue,
    outbound: Queue,
}

impl LoopbackTransport {
    pub fn pair() -> (Self, Self) {
        let a: Queue = Arc::default();
        let b: Queue = Arc::default();
        (
            Self {
                inbound: a.clone(),
                outbound: b.clone(),
            },
            Self {
                inbound: b,
                outbound: a,
            },
        )
    }

    /// Messages sent by this end and not yet received by the other.
    pub fn in_flight(&self) -> usize {
        self.outbound.lock().map(|q| q.len()).unwrap_or(0)
    }
}

impl Transport for LoopbackTransport {
    fn try_recv(&mut self) -> Option<PeerMessage> {
        self.inbound.lock().ok()?.pop_front()
    }

    fn send(&mut self, message: PeerMessage) {
        if let Ok(mut queue) = self.outbound.lock() {
            queue.push_back(message);
        }
    }
}

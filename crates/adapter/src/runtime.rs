//! Peer link runtime.
//!
//! Bridges the sync tick loop with an async TCP session to the other player.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::engine::{PeerMessage, Transport};
use crate::protocol::{decode_bytes_lossy, encode_line, MAX_LINE_LEN};

const CONNECT_ATTEMPTS: u32 = 50;
const CONNECT_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Debug, Error, PartialEq)]
pub enum PeerConfigError {
    #[error("invalid socket address in {var}: {value:?}")]
    InvalidAddr { var: &'static str, value: String },
}

/// Which end of the session this process is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerRole {
    Listen(SocketAddr),
    Connect(SocketAddr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeerConfig {
    pub role: PeerRole,
    /// Inbound messages buffered before the socket reader waits on the game loop.
    pub max_pending: usize,
}

impl PeerConfig {
    pub fn new(role: PeerRole) -> Self {
        Self {
            role,
            max_pending: 64,
        }
    }

    /// Read `ARENA_LISTEN_ADDR` / `ARENA_PEER_ADDR`. `Ok(None)` when neither is set.
    pub fn from_env() -> Result<Option<Self>, PeerConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, PeerConfigError> {
        let addr = |var: &'static str| -> Result<Option<SocketAddr>, PeerConfigError> {
            let Some(value) = lookup(var)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
            else {
                return Ok(None);
            };
            value
                .parse()
                .map(Some)
                .map_err(|_| PeerConfigError::InvalidAddr { var, value })
        };

        if let Some(listen) = addr("ARENA_LISTEN_ADDR")? {
            return Ok(Some(Self::new(PeerRole::Listen(listen))));
        }
        Ok(addr("ARENA_PEER_ADDR")?.map(|peer| Self::new(PeerRole::Connect(peer))))
    }
}

/// Running peer link. Implements [`Transport`] for the mode engine.
pub struct PeerLink {
    _rt: Runtime,
    local_addr: Option<SocketAddr>,
    inbound_rx: mpsc::Receiver<PeerMessage>,
    out_tx: mpsc::UnboundedSender<PeerMessage>,
}

impl PeerLink {
    /// Start the session task on a fresh runtime.
    ///
    /// A listening link is bound before this returns, so
    /// [`PeerLink::local_addr`] is known; the peer may connect later.
    pub fn start(config: PeerConfig) -> anyhow::Result<Self> {
        let (inbound_tx, inbound_rx) = mpsc::channel::<PeerMessage>(config.max_pending.max(1));
        let (out_tx, out_rx) = mpsc::unbounded_channel::<PeerMessage>();
        let (ready_tx, ready_rx) = oneshot::channel();

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        let role = config.role;
        rt.spawn(async move {
            if let Err(err) = run_link(role, inbound_tx, out_rx, Some(ready_tx)).await {
                warn!(error = %err, "peer link stopped");
            }
        });

        let local_addr = match role {
            PeerRole::Listen(_) => Some(
                rt.block_on(ready_rx)
                    .context("peer link failed before binding")?,
            ),
            PeerRole::Connect(_) => None,
        };

        Ok(Self {
            _rt: rt,
            local_addr,
            inbound_rx,
            out_tx,
        })
    }

    /// Bound address of a listening link.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

impl Transport for PeerLink {
    fn try_recv(&mut self) -> Option<PeerMessage> {
        self.inbound_rx.try_recv().ok()
    }

    fn send(&mut self, message: PeerMessage) {
        if self.out_tx.send(message).is_err() {
            debug!(?message, "peer link closed, message dropped");
        }
    }
}

/// Establish the session for `role` and pump messages until either side closes.
///
/// `ready_tx` receives the bound address once a listener is up.
pub async fn run_link(
    role: PeerRole,
    inbound_tx: mpsc::Sender<PeerMessage>,
    out_rx: mpsc::UnboundedReceiver<PeerMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let stream = match role {
        PeerRole::Listen(addr) => {
            let listener = TcpListener::bind(addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;
            let bound = listener.local_addr()?;
            info!(%bound, "waiting for peer");
            if let Some(tx) = ready_tx {
                let _ = tx.send(bound);
            }
            let (stream, peer) = listener.accept().await?;
            info!(%peer, "peer connected");
            stream
        }
        PeerRole::Connect(addr) => {
            let stream = connect_with_retry(addr).await?;
            info!(peer = %addr, "connected to peer");
            stream
        }
    };
    stream.set_nodelay(true)?;
    run_session(stream, inbound_tx, out_rx).await
}

async fn connect_with_retry(addr: SocketAddr) -> anyhow::Result<TcpStream> {
    let mut attempt = 1;
    loop {
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(err) if attempt < CONNECT_ATTEMPTS => {
                debug!(%addr, attempt, error = %err, "peer not reachable yet");
                attempt += 1;
                tokio::time::sleep(CONNECT_BACKOFF).await;
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to connect to {addr}"));
            }
        }
    }
}

async fn run_session(
    stream: TcpStream,
    inbound_tx: mpsc::Sender<PeerMessage>,
    mut out_rx: mpsc::UnboundedReceiver<PeerMessage>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let write_task = tokio::spawn(async move {
        while let Some(message) = out_rx.recv().await {
            let line = match encode_line(&message) {
                Ok(line) => line,
                Err(err) => {
                    warn!(%err, "failed to encode peer message");
                    continue;
                }
            };
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let mut line = Vec::with_capacity(MAX_LINE_LEN + 2);
    loop {
        match read_bounded_line(&mut reader, &mut line).await? {
            LineRead::Eof => {
                info!("peer disconnected");
                break;
            }
            LineRead::TooLong => {
                warn!(max = MAX_LINE_LEN, "dropping oversized peer line");
                continue;
            }
            LineRead::Line => {}
        }
        let Some(message) = decode_bytes_lossy(&line) else {
            continue;
        };
        if inbound_tx.send(message).await.is_err() {
            // Game loop dropped the link.
            break;
        }
    }

    write_task.abort();
    Ok(())
}

enum LineRead {
    Eof,
    Line,
    TooLong,
}

/// Read one `\n`-terminated line into `buf`, never buffering more than
/// `MAX_LINE_LEN` plus a line ending. The rest of a longer line is skipped.
async fn read_bounded_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    let limit = (MAX_LINE_LEN + 2) as u64;

    buf.clear();
    let read = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
    if read == 0 {
        return Ok(LineRead::Eof);
    }
    if buf.last() == Some(&b'\n') || (read as u64) < limit {
        return Ok(LineRead::Line);
    }

    loop {
        buf.clear();
        let read = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
        if read == 0 || buf.last() == Some(&b'\n') {
            break;
        }
    }
    buf.clear();
    Ok(LineRead::TooLong)
}

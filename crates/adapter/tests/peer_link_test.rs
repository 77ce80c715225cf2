use std::thread;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};

use tetris_arena_adapter::engine::{
    ModeConfig, ModeEngine, OpponentKind, Outcome, OutcomeReason, PeerMessage, Transport,
};
use tetris_arena_adapter::{run_link, PeerConfig, PeerLink, PeerRole, MAX_LINE_LEN};

fn poll_recv(link: &mut PeerLink) -> Option<PeerMessage> {
    for _ in 0..200 {
        if let Some(message) = link.try_recv() {
            return Some(message);
        }
        thread::sleep(Duration::from_millis(10));
    }
    None
}

fn linked_pair() -> (PeerLink, PeerLink) {
    let listener = PeerLink::start(PeerConfig::new(PeerRole::Listen(
        "127.0.0.1:0".parse().unwrap(),
    )))
    .expect("listen");
    let addr = listener.local_addr().expect("bound address");
    let dialer = PeerLink::start(PeerConfig::new(PeerRole::Connect(addr))).expect("connect");
    (listener, dialer)
}

#[test]
fn messages_cross_the_link_in_order() {
    let (mut a, mut b) = linked_pair();

    b.send(PeerMessage::OpponentLinesCleared(2));
    b.send(PeerMessage::OpponentGarbage(1));
    assert_eq!(poll_recv(&mut a), Some(PeerMessage::OpponentLinesCleared(2)));
    assert_eq!(poll_recv(&mut a), Some(PeerMessage::OpponentGarbage(1)));

    a.send(PeerMessage::OpponentToppedOut(true));
    assert_eq!(poll_recv(&mut b), Some(PeerMessage::OpponentToppedOut(true)));
}

#[test]
fn remote_battle_over_tcp() {
    let (local, mut peer) = linked_pair();

    let mut config = ModeConfig::new("battle", 6);
    config.battle.opponent = OpponentKind::Remote;
    let mut engine = ModeEngine::builder(config).transport(local).build();
    engine.start();

    peer.send(PeerMessage::OpponentToppedOut(true));
    for _ in 0..200 {
        engine.tick();
        if engine.state().ended() {
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }

    assert_eq!(
        engine.state().outcome(),
        Some(&Outcome::Victory(OutcomeReason::OpponentDefeated))
    );
}

#[tokio::test]
async fn malformed_lines_never_reach_the_game() {
    let (inbound_tx, mut inbound_rx) = mpsc::channel(8);
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let (ready_tx, ready_rx) = oneshot::channel();

    tokio::spawn(run_link(
        PeerRole::Listen("127.0.0.1:0".parse().unwrap()),
        inbound_tx,
        out_rx,
        Some(ready_tx),
    ));
    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("timeout waiting for bind")
        .expect("ready");

    let stream = TcpStream::connect(addr).await.unwrap();
    let (reader, mut writer) = stream.into_split();
    writer
        .write_all(b"garbage\n\n{\"opponentGarbage\":\"x\"}\n{\"opponentGarbage\":3}\n")
        .await
        .unwrap();

    let message = tokio::time::timeout(Duration::from_secs(2), inbound_rx.recv())
        .await
        .expect("timeout waiting for message");
    assert_eq!(message, Some(PeerMessage::OpponentGarbage(3)));

    out_tx.send(PeerMessage::OpponentLinesCleared(4)).unwrap();
    let mut lines = BufReader::new(reader).lines();
    let line = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
        .await
        .expect("timeout waiting for line")
        .expect("io error")
        .expect("expected line");
    assert_eq!(line, "{\"opponentLinesCleared\":4}");
}

#[tokio::test]
async fn invalid_utf8_and_oversized_lines_keep_the_session_alive() {
    let (inbound_tx, mut inbound_rx) = mpsc::channel(8);
    let (_out_tx, out_rx) = mpsc::unbounded_channel();
    let (ready_tx, ready_rx) = oneshot::channel();

    tokio::spawn(run_link(
        PeerRole::Listen("127.0.0.1:0".parse().unwrap()),
        inbound_tx,
        out_rx,
        Some(ready_tx),
    ));
    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("timeout waiting for bind")
        .expect("ready");

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"\xff\xfe\n{\"opponentGarbage\":3}\n")
        .await
        .unwrap();

    let message = tokio::time::timeout(Duration::from_secs(2), inbound_rx.recv())
        .await
        .expect("timeout waiting for message");
    assert_eq!(message, Some(PeerMessage::OpponentGarbage(3)));

    let mut oversized = vec![b'1'; MAX_LINE_LEN * 4];
    oversized.push(b'\n');
    stream.write_all(&oversized).await.unwrap();
    stream
        .write_all(b"{\"opponentLinesCleared\":2}\n")
        .await
        .unwrap();

    let message = tokio::time::timeout(Duration::from_secs(2), inbound_rx.recv())
        .await
        .expect("timeout waiting for message");
    assert_eq!(message, Some(PeerMessage::OpponentLinesCleared(2)));
}

//! Relay handler behaviour over real outbound queues (no sockets).

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message as WsMessage};
use serde_json::Value;
use tokio::sync::mpsc::Receiver;

use roomrelay_gateway::obs::RelayMetrics;
use roomrelay_gateway::relay::{Connection, ConnectionRegistry, Fanout, RelayHandler};

fn handler() -> Arc<RelayHandler> {
    Arc::new(RelayHandler::new(
        Arc::new(ConnectionRegistry::new()),
        Arc::new(RelayMetrics::default()),
    ))
}

fn join(h: &RelayHandler, id: &str) -> Receiver<WsMessage> {
    let (conn, rx) = Connection::channel(16);
    h.on_connect(id, conn).unwrap();
    rx
}

fn next_json(rx: &mut Receiver<WsMessage>) -> Value {
    match rx.try_recv().expect("expected a queued frame") {
        WsMessage::Text(s) => serde_json::from_str(&s).unwrap(),
        other => panic!("unexpected frame {other:?}"),
    }
}

fn ids(h: &RelayHandler) -> HashSet<String> {
    h.registry().ids().into_iter().collect()
}

#[test]
fn two_peer_scenario() {
    let h = handler();

    let mut a = join(&h, "A");
    assert_eq!(ids(&h), HashSet::from(["A".to_string()]));

    let mut b = join(&h, "B");
    assert_eq!(ids(&h), HashSet::from(["A".to_string(), "B".to_string()]));

    let notice = next_json(&mut a);
    assert_eq!(notice["sender"], "B");
    assert_eq!(notice["receiver"], "all");
    assert_eq!(notice["type"], "connect");
    assert!(b.try_recv().is_err(), "joiner must not hear its own connect");

    assert!(h.on_message("A", br#"{"body":"hi"}"#).unwrap());
    let echo = next_json(&mut a);
    assert_eq!(echo["sender"], "A");
    assert_eq!(echo["type"], "data");
    assert_eq!(echo["body"], "hi");
    assert!(b.try_recv().is_err(), "echo must not leak to other peers");

    let fanout = h.on_disconnect("A", None).unwrap();
    assert_eq!(fanout, Fanout { delivered: 1, failed: 0 });
    assert_eq!(ids(&h), HashSet::from(["B".to_string()]));

    let bye = next_json(&mut b);
    assert_eq!(bye["sender"], "A");
    assert_eq!(bye["type"], "disconnect");
    assert!(a.try_recv().is_err(), "leaver is already unregistered");
}

#[test]
fn connect_reaches_every_previous_peer() {
    let h = handler();
    let mut early: Vec<_> = (0..5).map(|i| join(&h, &format!("p{i}"))).collect();
    for rx in early.iter_mut() {
        while rx.try_recv().is_ok() {}
    }

    let mut late = join(&h, "late");
    for rx in early.iter_mut() {
        let notice = next_json(rx);
        assert_eq!(notice["sender"], "late");
        assert!(rx.try_recv().is_err());
    }
    assert!(late.try_recv().is_err());
}

#[test]
fn sender_field_is_never_trusted() {
    let h = handler();
    let mut a = join(&h, "A");
    let _b = join(&h, "B");
    while a.try_recv().is_ok() {}

    h.on_message("A", br#"{"sender":"B","receiver":"B","body":{"x":1}}"#)
        .unwrap();
    let echo = next_json(&mut a);
    assert_eq!(echo["sender"], "A");
    assert_eq!(echo["receiver"], "B");
    assert_eq!(echo["body"]["x"], 1);
}

#[test]
fn malformed_payload_changes_nothing() {
    let h = handler();
    let mut a = join(&h, "A");
    let mut b = join(&h, "B");
    while a.try_recv().is_ok() {}

    let cases: [&[u8]; 4] = [b"{", b"42", br#"{"type":"nope"}"#, br#"{"extra":1}"#];
    for raw in cases {
        let err = h.on_message("A", raw).expect_err("must reject");
        assert_eq!(err.client_code().as_str(), "BAD_PAYLOAD");
    }

    assert_eq!(ids(&h), HashSet::from(["A".to_string(), "B".to_string()]));
    assert!(a.try_recv().is_err());
    assert!(b.try_recv().is_err());
    assert_eq!(h.metrics().decode_errors.get(&[]), 4);
}

#[test]
fn failing_recipient_does_not_abort_broadcast() {
    let h = handler();
    let mut a = join(&h, "A");
    let dead = join(&h, "dead");
    let mut c = join(&h, "C");
    drop(dead);
    while a.try_recv().is_ok() {}
    while c.try_recv().is_ok() {}

    let fanout = h.on_disconnect("B-never-joined", None).unwrap();
    assert_eq!(fanout, Fanout { delivered: 2, failed: 1 });
    assert_eq!(next_json(&mut a)["type"], "disconnect");
    assert_eq!(next_json(&mut c)["type"], "disconnect");
    assert_eq!(h.metrics().send_failures.get(&[("kind", "closed")]), 1);
}

#[test]
fn saturated_recipient_is_isolated() {
    let h = handler();
    let (slow, _slow_rx) = Connection::channel(1);
    h.on_connect("slow", slow).unwrap();
    let mut fast = join(&h, "fast");

    // "slow" queue now holds fast's connect notice and is full
    let _ = join(&h, "third");
    assert_eq!(next_json(&mut fast)["sender"], "third");
    assert_eq!(h.metrics().send_failures.get(&[("kind", "full")]), 1);
}

#[test]
fn disconnect_carries_close_status() {
    let h = handler();
    let _a = join(&h, "A");
    let mut b = join(&h, "B");
    let frame = CloseFrame { code: 1001, reason: "going away".into() };
    h.on_disconnect("A", Some(&frame)).unwrap();
    assert_eq!(next_json(&mut b)["type"], "disconnect");
    assert!(!h.registry().contains("A"));
}

#[test]
fn transport_error_is_observed_only() {
    let h = handler();
    let mut a = join(&h, "A");
    let mut b = join(&h, "B");
    while a.try_recv().is_ok() {}

    let err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
    h.on_transport_error("A", &err);

    assert!(h.registry().contains("A"));
    assert!(a.try_recv().is_err());
    assert!(b.try_recv().is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn hundred_concurrent_connects() {
    let h = handler();
    let tasks: Vec<_> = (0..100)
        .map(|i| {
            let h = Arc::clone(&h);
            tokio::spawn(async move {
                let (conn, rx) = Connection::channel(256);
                h.on_connect(&format!("c{i}"), conn).unwrap();
                rx
            })
        })
        .collect();

    let mut receivers = Vec::new();
    for t in tasks {
        receivers.push(t.await.unwrap());
    }

    assert_eq!(h.registry().len(), 100);
    assert_eq!(h.metrics().connections_active.get(), 100);
    let expected: HashSet<String> = (0..100).map(|i| format!("c{i}")).collect();
    assert_eq!(ids(&h), expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_churn_leaves_only_survivors() {
    let h = handler();
    let tasks: Vec<_> = (0..50)
        .map(|i| {
            let h = Arc::clone(&h);
            tokio::spawn(async move {
                let id = format!("c{i}");
                let (conn, _rx) = Connection::channel(256);
                h.on_connect(&id, conn).unwrap();
                h.on_message(&id, br#"{"body":null}"#).unwrap();
                if i % 5 == 0 {
                    h.on_disconnect(&id, None).unwrap();
                }
            })
        })
        .collect();
    for t in tasks {
        t.await.unwrap();
    }

    assert_eq!(h.registry().len(), 40);
    assert!(h.registry().ids().iter().all(|id| {
        let n: usize = id[1..].parse().unwrap();
        n % 5 != 0
    }));
}

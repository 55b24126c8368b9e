//! Frame classifier for the transport layer.
//!
//! - Text and Binary frames => relay payload bytes (decoded by the relay)
//! - Ping/Pong/Close are surfaced for lifecycle management

use axum::extract::ws::{CloseFrame, Message};

#[derive(Debug)]
pub enum Inbound {
    Payload(Vec<u8>),
    Ping,
    Pong,
    Close(Option<CloseFrame<'static>>),
}

pub fn classify(msg: Message) -> Inbound {
    match msg {
        Message::Text(s) => Inbound::Payload(s.into_bytes()),
        Message::Binary(b) => Inbound::Payload(b),
        Message::Ping(_) => Inbound::Ping,
        Message::Pong(_) => Inbound::Pong,
        Message::Close(frame) => Inbound::Close(frame),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_binary_are_payloads() {
        assert!(matches!(classify(Message::Text("{}".into())), Inbound::Payload(b) if b == b"{}"));
        assert!(matches!(classify(Message::Binary(vec![1, 2])), Inbound::Payload(b) if b == [1, 2]));
    }

    #[test]
    fn control_frames_carry_no_payload() {
        assert!(matches!(classify(Message::Ping(vec![9])), Inbound::Ping));
        assert!(matches!(classify(Message::Pong(vec![9])), Inbound::Pong));
    }

    #[test]
    fn close_keeps_frame() {
        let frame = CloseFrame { code: 1000, reason: "bye".into() };
        match classify(Message::Close(Some(frame))) {
            Inbound::Close(Some(f)) => assert_eq!(f.code, 1000),
            other => panic!("unexpected {other:?}"),
        }
    }
}

//! Inbound frame routing
//!
//! Decodes one chat frame and applies it to the shared room. Decode
//! failures are returned to the caller, which logs and drops them.

use axum::extract::ws::Message;

use crate::error::FrameError;
use crate::protocol::InboundFrame;
use crate::state::{AppState, ExitOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// `send` frame relayed verbatim to this many connections
    Relayed { delivered: usize },
    Exited(ExitOutcome),
}

pub async fn handle_frame(message: Message, state: &AppState) -> Result<FrameOutcome, FrameError> {
    let frame = match &message {
        Message::Text(text) => InboundFrame::decode(text.as_str().as_bytes())?,
        Message::Binary(bytes) => InboundFrame::decode(bytes)?,
        _ => return Err(FrameError::NotData),
    };

    match frame {
        InboundFrame::Send => {
            let delivered = state.relay(message).await;
            tracing::debug!(delivered, "Relayed chat frame");
            Ok(FrameOutcome::Relayed { delivered })
        }
        InboundFrame::Exit { user } => {
            tracing::info!(name = %user.name, "Exit requested");
            Ok(FrameOutcome::Exited(state.exit(&user.name).await))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn text(s: &str) -> Message {
        Message::Text(s.to_string().into())
    }

    async fn connected(state: &AppState) -> mpsc::UnboundedReceiver<Message> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        state.admit(tx, None).await.unwrap();
        rx.try_recv().unwrap();
        rx
    }

    #[tokio::test]
    async fn test_send_frame_relayed_verbatim() {
        let state = AppState::new();
        let mut a = connected(&state).await;
        let mut b = connected(&state).await;

        // Field order and whitespace must survive untouched
        let raw = r#"{ "text": "hi",  "type": "send", "extra": [1, 2] }"#;
        let outcome = handle_frame(text(raw), &state).await.unwrap();
        assert_eq!(outcome, FrameOutcome::Relayed { delivered: 2 });

        for rx in [&mut a, &mut b] {
            match rx.try_recv().unwrap() {
                Message::Text(t) => assert_eq!(t.as_str(), raw),
                other => panic!("Expected text frame, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_binary_send_frame_stays_binary() {
        let state = AppState::new();
        let mut rx = connected(&state).await;

        let raw = br#"{"type":"send","text":"bin"}"#.to_vec();
        handle_frame(Message::Binary(raw.clone().into()), &state)
            .await
            .unwrap();

        match rx.try_recv().unwrap() {
            Message::Binary(b) => assert_eq!(b.as_ref(), raw.as_slice()),
            other => panic!("Expected binary frame, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_exit_frame_removes_participant() {
        let state = AppState::new();
        state.register("alice").await.unwrap();
        let mut rx = connected(&state).await;

        let outcome = handle_frame(text(r#"{"type":"exit","user":{"name":"alice"}}"#), &state)
            .await
            .unwrap();

        match outcome {
            FrameOutcome::Exited(exit) => {
                assert_eq!(exit.removed.map(|p| p.name).as_deref(), Some("alice"));
                assert_eq!(exit.delivered, 1);
            }
            other => panic!("Expected exit outcome, got {:?}", other),
        }
        assert!(state.snapshot().await.is_empty());
        match rx.try_recv().unwrap() {
            Message::Text(t) => assert_eq!(t.as_str(), "[]"),
            other => panic!("Expected text frame, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_frames_are_dropped() {
        let state = AppState::new();
        state.register("alice").await.unwrap();
        let mut rx = connected(&state).await;

        for raw in ["garbage", r#"{"text":"hi"}"#, r#"{"type":"shout"}"#, r#"{"type":"exit"}"#] {
            assert!(handle_frame(text(raw), &state).await.is_err());
        }
        assert!(matches!(
            handle_frame(Message::Ping(Vec::new().into()), &state).await,
            Err(FrameError::NotData)
        ));

        assert!(rx.try_recv().is_err());
        assert_eq!(state.snapshot().await.len(), 1);
        assert_eq!(state.connection_count().await, 1);
    }
}

use axum::extract::ws::Message;
use tokio::sync::mpsc;

use crate::types::{ConnectionId, ConnectionState, ParticipantId};

/// Sender half of a connection's outbound queue. The connection's writer
/// task owns the receiving end and the socket sink.
pub type ConnectionSender = mpsc::UnboundedSender<Message>;

#[derive(Debug)]
pub struct Connection {
    pub id: ConnectionId,
    pub state: ConnectionState,
    /// Identity presented at accept time, if any
    pub participant: Option<ParticipantId>,
    sender: ConnectionSender,
}

impl Connection {
    pub fn new(sender: ConnectionSender, participant: Option<ParticipantId>) -> Self {
        Self {
            id: ulid::Ulid::new(),
            state: ConnectionState::Connecting,
            participant,
            sender,
        }
    }

    /// Open means admitted, not closing, and the writer is still draining
    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open && !self.sender.is_closed()
    }

    fn send(&self, message: Message) -> bool {
        self.sender.send(message).is_ok()
    }
}

/// Live chat connections. Only the room owns this; frame handlers never
/// iterate it directly.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: Vec<Connection>,
}

impl ConnectionRegistry {
    /// Add a connection and queue `greeting` as its first outbound frame
    pub fn admit(&mut self, mut connection: Connection, greeting: Message) -> ConnectionId {
        connection.state = ConnectionState::Open;
        if !connection.send(greeting) {
            tracing::debug!(connection = %connection.id, "Writer gone before greeting");
        }

        let id = connection.id;
        self.connections.push(connection);
        id
    }

    pub fn remove(&mut self, id: &ConnectionId) -> Option<Connection> {
        let idx = self.connections.iter().position(|c| c.id == *id)?;
        Some(self.connections.remove(idx))
    }

    /// Flag a connection as closing so broadcasts skip it until removal
    pub fn mark_closing(&mut self, id: &ConnectionId) -> bool {
        match self.connections.iter_mut().find(|c| c.id == *id) {
            Some(connection) => {
                connection.state = ConnectionState::Closing;
                true
            }
            None => false,
        }
    }

    /// Queue `message` on every open connection. Non-open connections are
    /// skipped, never queued for later. Returns how many were reached.
    pub fn broadcast_all(&self, message: &Message) -> usize {
        self.connections
            .iter()
            .filter(|c| c.is_open())
            .filter(|c| c.send(message.clone()))
            .count()
    }

    /// Whether any live connection is bound to `participant`
    pub fn is_bound(&self, participant: &ParticipantId) -> bool {
        self.connections
            .iter()
            .any(|c| c.participant.as_ref() == Some(participant))
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn open_count(&self) -> usize {
        self.connections.iter().filter(|c| c.is_open()).count()
    }
}

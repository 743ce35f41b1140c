mod directory;
mod registry;

pub use directory::UserDirectory;
pub use registry::{Connection, ConnectionRegistry, ConnectionSender};

use axum::extract::ws::Message;
use tokio::sync::Mutex;

use crate::config::ServerConfig;
use crate::error::RegistrationError;
use crate::protocol::encode_snapshot;
use crate::types::{ConnectionId, Participant, ParticipantId};

/// Directory plus live connections. Always accessed through the single
/// lock in [`AppState`], so a mutation and the broadcast it triggers are
/// observed as one step by every other handler.
#[derive(Debug, Default)]
pub struct ChatRoom {
    directory: UserDirectory,
    connections: ConnectionRegistry,
}

impl ChatRoom {
    fn snapshot_message(&self) -> Result<Message, serde_json::Error> {
        let json = encode_snapshot(&self.directory.snapshot())?;
        Ok(Message::Text(json.into()))
    }

    /// Broadcast the current directory to every open connection
    fn broadcast_snapshot(&self) -> usize {
        match self.snapshot_message() {
            Ok(message) => self.connections.broadcast_all(&message),
            Err(e) => {
                tracing::error!("Failed to serialize directory snapshot: {}", e);
                0
            }
        }
    }
}

/// Outcome of an `exit` frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitOutcome {
    pub removed: Option<Participant>,
    pub delivered: usize,
}

/// Shared application state
#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    room: Mutex<ChatRoom>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            config,
            room: Mutex::new(ChatRoom::default()),
        }
    }

    /// Validate and insert a new participant. Does not broadcast.
    pub async fn register(&self, name: &str) -> Result<Participant, RegistrationError> {
        let mut room = self.room.lock().await;
        let participant = room.directory.try_register(name)?;
        tracing::info!(
            participant = %participant.id,
            name = %participant.name,
            total = room.directory.len(),
            "Participant registered"
        );
        Ok(participant)
    }

    pub async fn snapshot(&self) -> Vec<Participant> {
        self.room.lock().await.directory.snapshot()
    }

    pub async fn participant_by_id(&self, id: &ParticipantId) -> Option<Participant> {
        self.room.lock().await.directory.get(id).cloned()
    }

    /// Admit a connection and queue the current directory as its first frame.
    ///
    /// `identity` binds the connection to a directory entry. Ids that are
    /// not registered are ignored; the connection is admitted unbound.
    pub async fn admit(
        &self,
        sender: ConnectionSender,
        identity: Option<ParticipantId>,
    ) -> Result<ConnectionId, serde_json::Error> {
        let mut room = self.room.lock().await;

        let bound = identity.filter(|id| {
            let known = room.directory.get(id).is_some();
            if !known {
                tracing::warn!(participant = %id, "Ignoring unknown identity on connect");
            }
            known
        });

        let greeting = room.snapshot_message()?;
        let id = room
            .connections
            .admit(Connection::new(sender, bound), greeting);

        tracing::info!(
            connection = %id,
            bound = ?bound,
            live = room.connections.len(),
            "Connection admitted"
        );
        Ok(id)
    }

    /// Drop a connection from the live set.
    ///
    /// The directory is left alone unless `remove_on_disconnect` is enabled
    /// and the connection was bound to an identity at accept time that no
    /// other live connection still holds.
    pub async fn remove_connection(&self, id: &ConnectionId) -> Option<Connection> {
        let mut room = self.room.lock().await;
        let connection = room.connections.remove(id)?;

        tracing::info!(
            connection = %id,
            live = room.connections.len(),
            "Connection removed"
        );

        if self.config.remove_on_disconnect {
            // Another tab may still hold the same identity
            let name = connection
                .participant
                .filter(|pid| !room.connections.is_bound(pid))
                .and_then(|pid| room.directory.get(&pid).map(|p| p.name.clone()));
            if let Some(name) = name {
                room.directory.unregister(&name);
                let delivered = room.broadcast_snapshot();
                tracing::info!(name = %name, delivered, "Participant dropped on disconnect");
            }
        }

        Some(connection)
    }

    pub async fn mark_closing(&self, id: &ConnectionId) -> bool {
        self.room.lock().await.connections.mark_closing(id)
    }

    /// Remove `name` from the directory and broadcast the resulting snapshot.
    /// The snapshot goes out even when the name was not registered.
    pub async fn exit(&self, name: &str) -> ExitOutcome {
        let mut room = self.room.lock().await;
        let removed = room.directory.unregister(name);
        let delivered = room.broadcast_snapshot();

        match &removed {
            Some(p) => tracing::info!(name = %p.name, delivered, "Participant left"),
            None => tracing::debug!(name, "Exit for unknown participant"),
        }

        ExitOutcome { removed, delivered }
    }

    /// Relay a frame verbatim to every open connection, sender included
    pub async fn relay(&self, message: Message) -> usize {
        self.room.lock().await.connections.broadcast_all(&message)
    }

    pub async fn connection_count(&self) -> usize {
        self.room.lock().await.connections.len()
    }

    pub async fn open_connection_count(&self) -> usize {
        self.room.lock().await.connections.open_count()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

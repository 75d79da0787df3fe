//! Connection handler for individual WebSocket clients.
//!
//! Each client connection gets its own `ConnectionHandler` that:
//! - Announces the transport-assigned connection id
//! - Registers the session and its outbound queue with the registry
//! - Parses incoming frames and routes them to the registry
//! - Forwards roster broadcasts and navigation instructions to the socket
//!
//! # Panic-Free Guarantees
//!
//! This module follows the panic-free policy:
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - All fallible operations use `?`, pattern matching, or `unwrap_or`
//! - Connection errors are logged and result in graceful disconnect

use std::sync::atomic::Ordering;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use roster_core::ConnectionId;
use roster_protocol::{
    ClientMessage, ConnectParams, ProtocolError, ServerMessage, MAX_MESSAGE_SIZE,
};

use super::AppState;
use crate::registry::{MoveOutcome, OutboundSender, RegistryError, RegistryHandle};

/// Read timeout for idle connections (5 minutes)
const READ_TIMEOUT: Duration = Duration::from_secs(300);

/// Write timeout (10 seconds)
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// `GET /ws?role=&name=`
pub(super) async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<AppState>,
) -> Response {
    let sequence = state.connection_counter.fetch_add(1, Ordering::Relaxed) + 1;
    let connection_id = ConnectionId::from_sequence(sequence);

    // Frames over the cap fail the read and end the connection
    ws.max_message_size(MAX_MESSAGE_SIZE)
        .on_upgrade(move |socket| {
            let handler = ConnectionHandler::new(
                connection_id,
                params,
                state.registry.clone(),
                state.cancel_token.clone(),
            );
            handler.run(socket)
        })
}

/// Connection handler for a single client.
pub struct ConnectionHandler {
    /// Transport-assigned id, also the session key
    connection_id: ConnectionId,

    /// Role and display-name hints from the handshake query
    params: ConnectParams,

    /// Handle to the session registry
    registry: RegistryHandle,

    /// Closes the connection on daemon shutdown
    cancel_token: CancellationToken,
}

impl ConnectionHandler {
    pub fn new(
        connection_id: ConnectionId,
        params: ConnectParams,
        registry: RegistryHandle,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            connection_id,
            params,
            registry,
            cancel_token,
        }
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    /// Runs the connection until the client leaves, an unrecoverable error
    /// occurs, or the daemon shuts down. The session is always removed on
    /// the way out.
    pub async fn run(self, socket: WebSocket) {
        let (sink, mut stream) = socket.split();
        let (tx, rx) = mpsc::unbounded_channel();

        // Queued first so it precedes any roster broadcast
        let _ = tx.send(ServerMessage::connected(self.connection_id.clone()));

        let session = match self
            .registry
            .connect(
                self.connection_id.clone(),
                self.params.role.clone(),
                self.params.name.clone(),
                tx.clone(),
            )
            .await
        {
            Ok(session) => session,
            Err(e) => {
                error!(connection_id = %self.connection_id, error = %e, "Failed to register session");
                return;
            }
        };

        debug!(
            connection_id = %self.connection_id,
            role = %session.role,
            "WebSocket session registered"
        );

        let mut writer = tokio::spawn(write_loop(sink, rx, self.connection_id.clone()));

        let result = tokio::select! {
            result = self.read_loop(&mut stream, &tx) => result,
            _ = &mut writer => Err(ConnectionError::Io("writer closed".to_string())),
            _ = self.cancel_token.cancelled() => {
                debug!(connection_id = %self.connection_id, "Closing connection for shutdown");
                Ok(())
            }
        };

        if let Err(e) = result {
            debug!(connection_id = %self.connection_id, error = %e, "Connection ended with error");
        }

        // Dropping the last senders lets the writer drain and close the socket
        drop(tx);
        self.registry.disconnect(self.connection_id.clone()).await;

        debug!(connection_id = %self.connection_id, "WebSocket closed");
    }

    /// Reads and dispatches frames until the client closes the socket.
    async fn read_loop(
        &self,
        stream: &mut SplitStream<WebSocket>,
        tx: &OutboundSender,
    ) -> Result<(), ConnectionError> {
        loop {
            let frame = match timeout(READ_TIMEOUT, stream.next()).await {
                Ok(Some(Ok(frame))) => frame,
                Ok(Some(Err(e))) => return Err(ConnectionError::Io(e.to_string())),
                Ok(None) => return Ok(()),
                Err(_) => {
                    debug!(connection_id = %self.connection_id, "Connection timed out");
                    return Err(ConnectionError::Timeout);
                }
            };

            match frame {
                Message::Text(text) => match ClientMessage::parse(text.as_str()) {
                    Ok(msg) => self.handle_message(msg, tx).await?,
                    Err(ProtocolError::MessageTooLarge { size, max }) => {
                        return Err(ConnectionError::MessageTooLarge { size, max });
                    }
                    Err(e) => {
                        warn!(connection_id = %self.connection_id, error = %e, "Invalid frame");
                        let _ = tx.send(ServerMessage::error(&e.to_string()));
                    }
                },
                Message::Binary(data) => {
                    if data.len() > MAX_MESSAGE_SIZE {
                        return Err(ConnectionError::MessageTooLarge {
                            size: data.len(),
                            max: MAX_MESSAGE_SIZE,
                        });
                    }
                    let _ = tx.send(ServerMessage::error("Binary frames are not supported"));
                }
                Message::Close(_) => return Ok(()),
                // Pings are answered by the transport
                Message::Ping(_) | Message::Pong(_) => {}
            }
        }
    }

    /// Handles a single client message.
    async fn handle_message(
        &self,
        msg: ClientMessage,
        tx: &OutboundSender,
    ) -> Result<(), ConnectionError> {
        debug!(connection_id = %self.connection_id, kind = msg.kind(), "Received message");

        match msg {
            ClientMessage::PageUpdate { page } => {
                if !self
                    .registry
                    .page_update(self.connection_id.clone(), page)
                    .await
                {
                    debug!(connection_id = %self.connection_id, "Page update for unknown session");
                }
            }
            ClientMessage::MoveUser { target, page } => {
                let outcome = self
                    .registry
                    .move_user(self.connection_id.clone(), target.clone(), page)
                    .await?;
                if outcome != MoveOutcome::Moved {
                    debug!(
                        connection_id = %self.connection_id,
                        target = %target,
                        outcome = ?outcome,
                        "Move request ignored"
                    );
                }
            }
            ClientMessage::Ping { seq } => {
                let _ = tx.send(ServerMessage::pong(seq));
            }
        }

        Ok(())
    }
}

/// Serializes queued messages onto the socket until every sender is gone
/// or a write fails.
async fn write_loop(
    mut sink: SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<ServerMessage>,
    connection_id: ConnectionId,
) {
    while let Some(msg) = rx.recv().await {
        let json = match serde_json::to_string(&msg) {
            Ok(json) => json,
            Err(e) => {
                error!(connection_id = %connection_id, error = %e, "Failed to serialize message");
                continue;
            }
        };

        match timeout(WRITE_TIMEOUT, sink.send(Message::Text(json.into()))).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                debug!(connection_id = %connection_id, error = %e, "Write failed");
                return;
            }
            Err(_) => {
                debug!(connection_id = %connection_id, "Write timed out");
                return;
            }
        }
    }

    let _ = sink.close().await;
}

/// Errors that can occur during connection handling.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Read timeout")]
    Timeout,

    #[error("Message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_display() {
        let err = ConnectionError::MessageTooLarge {
            size: 2_000_000,
            max: 1_048_576,
        };
        assert_eq!(
            err.to_string(),
            "Message too large: 2000000 bytes (max: 1048576)"
        );

        let err = ConnectionError::from(RegistryError::ChannelClosed);
        assert!(err.to_string().starts_with("Registry error"));
    }
}

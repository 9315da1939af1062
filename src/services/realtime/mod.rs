//! Realtime match notifications over Socket.IO
//!
//! One long-lived websocket per screen, correlated by the session id sent
//! as the `user` handshake query parameter. Only the `match` event is
//! delivered; there is no acknowledgement, deduplication or reconnect.

pub mod packet;

use crate::models::{Profile, SessionId};
use futures_util::{SinkExt, StreamExt};
use packet::{EnginePacket, PacketError, SocketPacket, DEFAULT_NAMESPACE};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};

/// Event name the backend uses to announce a mutual like
pub const MATCH_EVENT: &str = "match";

/// Errors that end a realtime subscription
#[derive(Debug, Error)]
pub enum RealtimeError {
    #[error("websocket error: {0}")]
    Connect(#[from] tungstenite::Error),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("connection closed by server")]
    Closed,
}

impl From<PacketError> for RealtimeError {
    fn from(value: PacketError) -> Self {
        RealtimeError::Protocol(value.to_string())
    }
}

/// What a subscription delivers to its owner
#[derive(Debug)]
pub enum ChannelEvent {
    /// Namespace joined, matches will now be delivered
    Connected,
    Match(Profile),
    /// Terminal; nothing follows
    Disconnected(RealtimeError),
}

/// Live subscription owned by the screen
///
/// Dropping it tears the connection down.
#[derive(Debug)]
pub struct Subscription {
    events: mpsc::UnboundedReceiver<ChannelEvent>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(events: mpsc::UnboundedReceiver<ChannelEvent>, task: JoinHandle<()>) -> Self {
        Self {
            events,
            task: Some(task),
        }
    }

    /// Subscription fed by some other producer, with no connection task to manage
    pub fn from_receiver(events: mpsc::UnboundedReceiver<ChannelEvent>) -> Self {
        Self { events, task: None }
    }

    /// Next event, or `None` once the producer is gone
    pub async fn recv(&mut self) -> Option<ChannelEvent> {
        self.events.recv().await
    }

    pub fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.events.close();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

/// Source of match notifications for a session
pub trait MatchSource: Send + Sync {
    /// Start delivering events for `session`. Must not block; connecting
    /// happens in the background.
    fn open(&self, session: &SessionId) -> Subscription;
}

/// Socket.IO client for the backend's realtime endpoint
#[derive(Debug, Clone)]
pub struct RealtimeChannel {
    endpoint: String,
    namespace: String,
}

impl RealtimeChannel {
    /// `base_url` may use http(s) or ws(s); `path` is the Socket.IO mount point
    pub fn new(base_url: &str, path: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            base.to_string()
        };

        let path = format!("/{}/", path.trim_matches('/'));

        Self {
            endpoint: format!("{}{}", base, path),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    pub fn handshake_url(&self, session: &SessionId) -> String {
        format!(
            "{}?EIO=4&transport=websocket&user={}",
            self.endpoint,
            urlencoding::encode(session.as_str())
        )
    }
}

impl MatchSource for RealtimeChannel {
    fn open(&self, session: &SessionId) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let url = self.handshake_url(session);
        let namespace = self.namespace.clone();

        tracing::info!("Opening realtime channel for session {}", session);

        let task = tokio::spawn(async move {
            let reason = match drive(&url, &namespace, &tx).await {
                Ok(()) => RealtimeError::Closed,
                Err(e) => e,
            };
            tracing::warn!("Realtime channel stopped: {}", reason);
            let _ = tx.send(ChannelEvent::Disconnected(reason));
        });

        Subscription::new(rx, task)
    }
}

async fn drive(
    url: &str,
    namespace: &str,
    events: &mpsc::UnboundedSender<ChannelEvent>,
) -> Result<(), RealtimeError> {
    let (mut ws, _) = tokio_tungstenite::connect_async(url).await?;
    tracing::debug!("Websocket connected: {}", url);

    while let Some(frame) = ws.next().await {
        let text = match frame? {
            Message::Text(text) => text,
            Message::Close(_) => return Ok(()),
            _ => continue,
        };

        let packet = match EnginePacket::decode(&text) {
            Ok(packet) => packet,
            Err(e) => {
                tracing::warn!("Ignoring undecodable frame {:?}: {}", text, e);
                continue;
            }
        };

        match packet {
            EnginePacket::Open(handshake) => {
                tracing::debug!(
                    "Engine.IO open: sid={} ping_interval={}ms",
                    handshake.sid,
                    handshake.ping_interval
                );
                ws.send(Message::Text(SocketPacket::connect(namespace).to_frame()))
                    .await?;
            }
            EnginePacket::Ping(data) => {
                ws.send(Message::Text(EnginePacket::Pong(data).encode())).await?;
            }
            EnginePacket::Close => return Ok(()),
            EnginePacket::Message(data) => {
                if !dispatch(&data, namespace, events)? {
                    // Owner went away
                    let _ = ws.close(None).await;
                    return Ok(());
                }
            }
            EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => {}
        }
    }

    Ok(())
}

/// Route one Socket.IO packet. Returns `false` when the receiver is gone.
fn dispatch(
    data: &str,
    namespace: &str,
    events: &mpsc::UnboundedSender<ChannelEvent>,
) -> Result<bool, RealtimeError> {
    let packet = match SocketPacket::decode(data) {
        Ok(packet) => packet,
        Err(e) => {
            tracing::warn!("Ignoring socket packet {:?}: {}", data, e);
            return Ok(true);
        }
    };

    if packet.namespace() != namespace {
        return Ok(true);
    }

    let event = match packet {
        SocketPacket::Connect { .. } => ChannelEvent::Connected,
        SocketPacket::ConnectError { payload, .. } => {
            return Err(RealtimeError::Protocol(format!(
                "namespace connect refused: {}",
                payload.map(|p| p.to_string()).unwrap_or_default()
            )))
        }
        SocketPacket::Disconnect { .. } => return Err(RealtimeError::Closed),
        SocketPacket::Event { name, mut args, .. } if name == MATCH_EVENT => {
            if args.is_empty() {
                tracing::warn!("Match event without payload");
                return Ok(true);
            }
            match serde_json::from_value::<Profile>(args.swap_remove(0)) {
                Ok(profile) => ChannelEvent::Match(profile),
                Err(e) => {
                    tracing::warn!("Ignoring malformed match payload: {}", e);
                    return Ok(true);
                }
            }
        }
        SocketPacket::Event { name, .. } => {
            tracing::debug!("Ignoring event {:?}", name);
            return Ok(true);
        }
        SocketPacket::Ack { .. } => return Ok(true),
    };

    Ok(events.send(event).is_ok())
}

//! WebSocket transport running on its own thread.
//!
//! The render loop owns a [`Connection`] and talks to the socket thread over
//! two unbounded channels: [`Connection::emit`] queues outbound events and
//! [`Connection::poll`] drains whatever the server pushed since the last frame.

use crate::error::{ClientError, Result};
use futures::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::protocol::{self, ClientEvent, ServerEvent};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkEvent {
    Connected,
    Message(ServerEvent),
    /// Sent exactly once, after which the connection is dead.
    Disconnected { reason: String },
}

pub struct Connection {
    url: String,
    outbound: mpsc::UnboundedSender<ClientEvent>,
    inbound: mpsc::UnboundedReceiver<NetworkEvent>,
    connected: bool,
    closed: bool,
}

impl Connection {
    /// Starts connecting in the background. Progress is reported through
    /// [`Connection::poll`].
    pub fn open(url: &str) -> Result<Self> {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let target = url.to_string();
        std::thread::Builder::new()
            .name(format!("socket {}", url))
            .spawn(move || {
                runtime.block_on(async move {
                    if let Err(e) = run_socket(&target, outbound_rx, inbound_tx).await {
                        error!("Connection to {} failed: {}", target, e);
                    }
                });
            })?;

        info!("Connecting to {}", url);

        Ok(Self {
            url: url.to_string(),
            outbound: outbound_tx,
            inbound: inbound_rx,
            connected: false,
            closed: false,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Queues an event. Events emitted before the handshake completes are
    /// sent once it does.
    pub fn emit(&self, event: ClientEvent) -> Result<()> {
        self.outbound
            .send(event)
            .map_err(|_| ClientError::ChannelClosed)
    }

    /// Emits a batch, logging instead of failing so one dead socket does not
    /// take the frame down with it.
    pub fn emit_all(&self, events: impl IntoIterator<Item = ClientEvent>) {
        for event in events {
            let name = event.name();
            if let Err(e) = self.emit(event) {
                warn!("Dropping {} for {}: {}", name, self.url, e);
            }
        }
    }

    /// Drains pending events without blocking.
    pub fn poll(&mut self) -> Vec<NetworkEvent> {
        let mut events = Vec::new();

        while let Ok(event) = self.inbound.try_recv() {
            match &event {
                NetworkEvent::Connected => self.connected = true,
                NetworkEvent::Disconnected { .. } => {
                    self.connected = false;
                    self.closed = true;
                }
                NetworkEvent::Message(_) => {}
            }
            events.push(event);
        }

        events
    }
}

/// Connects to `url` and pumps events until either side closes.
///
/// Always reports the outcome on `inbound`: `Connected` after the handshake,
/// then a single `Disconnected` when the socket ends for any reason.
pub async fn run_socket(
    url: &str,
    outbound: mpsc::UnboundedReceiver<ClientEvent>,
    inbound: mpsc::UnboundedSender<NetworkEvent>,
) -> Result<()> {
    let result = pump(url, outbound, &inbound).await;

    let reason = match &result {
        Ok(reason) => reason.clone(),
        Err(e) => e.to_string(),
    };
    info!("Disconnected from {}: {}", url, reason);
    let _ = inbound.send(NetworkEvent::Disconnected { reason });

    result.map(|_| ())
}

async fn pump(
    url: &str,
    mut outbound: mpsc::UnboundedReceiver<ClientEvent>,
    inbound: &mpsc::UnboundedSender<NetworkEvent>,
) -> Result<String> {
    let (ws_stream, _response) = connect_async(url).await?;
    info!("Connected to {}", url);

    if inbound.send(NetworkEvent::Connected).is_err() {
        return Ok("client dropped".to_string());
    }

    let (mut sink, mut stream) = ws_stream.split();

    loop {
        tokio::select! {
            outgoing = outbound.recv() => match outgoing {
                Some(event) => {
                    debug!("-> {}", event.name());
                    let text = protocol::encode(&event)?;
                    sink.send(Message::text(text)).await?;
                }
                None => {
                    let _ = sink.send(Message::Close(None)).await;
                    return Ok("client closed".to_string());
                }
            },

            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    match protocol::decode::<ServerEvent>(text.as_str()) {
                        Ok(event) => {
                            debug!("<- {:?}", event);
                            if inbound.send(NetworkEvent::Message(event)).is_err() {
                                return Ok("client dropped".to_string());
                            }
                        }
                        Err(e) => warn!("Dropping frame from {}: {}", url, e),
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| f.reason.as_str().to_string())
                        .filter(|r| !r.is_empty())
                        .unwrap_or_else(|| "server closed".to_string());
                    return Ok(reason);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok("connection ended".to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_server_reports_disconnect() {
        let (_out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, mut in_rx) = mpsc::unbounded_channel();

        // Port 1 is never listening on loopback.
        let result = tokio_test::block_on(run_socket("ws://127.0.0.1:1", out_rx, in_tx));
        assert!(result.is_err());

        match in_rx.try_recv() {
            Ok(NetworkEvent::Disconnected { reason }) => assert!(!reason.is_empty()),
            other => panic!("expected disconnect, got {:?}", other),
        }
        assert!(in_rx.try_recv().is_err());
    }

    #[test]
    fn test_emit_after_thread_exit_fails() {
        let mut connection = Connection::open("ws://127.0.0.1:1").unwrap();

        let mut events = Vec::new();
        for _ in 0..200 {
            events.extend(connection.poll());
            if connection.is_closed() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }

        assert!(connection.is_closed());
        assert!(!connection.is_connected());
        assert!(matches!(events.last(), Some(NetworkEvent::Disconnected { .. })));
        assert!(connection.emit(ClientEvent::SetReady(shared::protocol::RoomRef {
            room: "sala1".to_string(),
        }))
        .is_err());
    }
}

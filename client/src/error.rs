use shared::ProtocolError;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("failed to start network runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("connection channel closed")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, ClientError>;

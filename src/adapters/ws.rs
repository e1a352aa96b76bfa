//! WebSocket implementation of the push transport.
//!
//! Thin shim over `tokio-tungstenite`: text frames become push messages,
//! pings are answered, binary frames are ignored, close and transport
//! errors end the session per the [`PushStream`] contract. Reconnection
//! policy lives entirely in the connection manager.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::SyncError;
use crate::ports::{PushStream, PushTransport};

/// Production push transport speaking WebSocket.
#[derive(Debug, Default)]
pub struct WsTransport;

impl WsTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PushTransport for WsTransport {
    async fn connect(&self, url: &str) -> Result<Box<dyn PushStream>, SyncError> {
        let (stream, _response) = connect_async(url)
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;
        Ok(Box::new(WsStream { inner: stream }))
    }
}

struct WsStream {
    inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl PushStream for WsStream {
    async fn next_message(&mut self) -> Option<Result<String, SyncError>> {
        loop {
            match self.inner.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Ping(payload)) => {
                    if let Err(err) = self.inner.send(Message::Pong(payload)).await {
                        return Some(Err(SyncError::Transport(err.to_string())));
                    }
                }
                Ok(Message::Close(_)) => return None,
                // The inventory service only pushes text frames.
                Ok(_) => {}
                Err(err) => return Some(Err(SyncError::Transport(err.to_string()))),
            }
        }
    }
}

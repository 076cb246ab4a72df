//! Channel-backed transport.
//!
//! Forwards every write into an `mpsc` channel. Useful for bridging to a
//! BLE stack running on its own task, and for tests.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use massager_protocol::transport::{ChannelTransport, Transport};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (transport, mut writes) = ChannelTransport::new(8);
//! transport.write(Bytes::from_static(b"\x68\x79")).await.unwrap();
//! assert_eq!(&writes.recv().await.unwrap()[..], b"\x68\x79");
//! # }
//! ```

use bytes::Bytes;
use tokio::sync::mpsc;

use super::{BoxFuture, Transport};
use crate::error::{ProtocolError, Result};

/// Transport that pushes frames into a channel.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::Sender<Bytes>,
}

impl ChannelTransport {
    /// Create a transport and the receiver its writes arrive on.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl Transport for ChannelTransport {
    fn write(&self, frame: Bytes) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.tx
                .send(frame)
                .await
                .map_err(|_| ProtocolError::ConnectionClosed)
        })
    }
}

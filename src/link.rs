//! Per-device link: builder, notification pump and command path.
//!
//! The [`DeviceLinkBuilder`] resolves a codec from the registry and a session
//! that speaks its protocol. The [`DeviceLink`] then owns everything that is
//! per-connection:
//! 1. Reassembler behind a mutex (notifications and disconnects race)
//! 2. Codec for decode and encode
//! 3. Session mapping intents to commands
//! 4. Telemetry snapshot
//!
//! # Example
//!
//! ```ignore
//! use massager_protocol::{DeviceLink, DeviceIntent};
//!
//! let link = DeviceLink::builder()
//!     .product_id(advertisement.product_id)
//!     .build(&registry, &sessions, transport)?;
//!
//! let (notifications_tx, notifications) = link.notification_channel();
//! ble.subscribe(notifications_tx);
//!
//! let (mut events, _pump) = link.spawn_pump(notifications);
//! link.send(DeviceIntent::SelectLevel(5)).await?;
//!
//! while let Some(event) = events.recv().await {
//!     println!("{:?}", event);
//! }
//! ```

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::codec::{ProtocolCodec, ProtocolCommand, ProtocolMessage};
use crate::config::LinkConfig;
use crate::error::{ProtocolError, Result};
use crate::protocol::StreamReassembler;
use crate::registry::ProtocolRegistry;
use crate::session::{select_session, DeviceIntent, DeviceSession, Telemetry, TelemetryMapper};
use crate::transport::Transport;

/// Something the pump publishes to the UI side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// A decoded message, in arrival order.
    Message(ProtocolMessage),
    /// The snapshot after a message changed it.
    Telemetry(Telemetry),
}

/// Builder for configuring and creating a [`DeviceLink`].
pub struct DeviceLinkBuilder {
    config: LinkConfig,
    product_id: Option<u32>,
}

impl DeviceLinkBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: LinkConfig::default(),
            product_id: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: LinkConfig) -> Self {
        self.config = config;
        self
    }

    /// Product id from discovery, if known.
    pub fn product_id(mut self, product_id: Option<u32>) -> Self {
        self.product_id = product_id;
        self
    }

    /// Set the reassembly buffer ceiling.
    ///
    /// Default: 256
    pub fn max_buffer_len(mut self, len: usize) -> Self {
        self.config.max_buffer_len = len;
        self
    }

    /// Set the notification channel capacity.
    ///
    /// Default: 64
    pub fn notification_channel_capacity(mut self, capacity: usize) -> Self {
        self.config.notification_channel_capacity = capacity;
        self
    }

    /// Set the event channel capacity.
    ///
    /// Default: 64
    pub fn telemetry_channel_capacity(mut self, capacity: usize) -> Self {
        self.config.telemetry_channel_capacity = capacity;
        self
    }

    /// Resolve codec and session, then build the link.
    ///
    /// An unknown product id falls back to the configured default product id,
    /// then to the registry's own default.
    pub fn build<T: Transport>(
        self,
        registry: &ProtocolRegistry,
        sessions: &[Arc<dyn DeviceSession>],
        transport: T,
    ) -> Result<DeviceLink> {
        self.config.validate()?;

        let product_id = self.product_id;
        let codec = registry
            .find_codec(product_id)
            .map_or_else(|| registry.resolve(self.config.default_product_id), Ok)
            .map_err(|_| ProtocolError::CodecNotFound(product_id))?;

        let key = codec.capabilities().protocol_key;
        let session = select_session(sessions, key).ok_or_else(|| {
            ProtocolError::Config(format!("No session supports protocol {}", key))
        })?;

        tracing::debug!(
            "Link for product {:?} using protocol {}",
            self.product_id,
            key
        );

        Ok(DeviceLink {
            codec,
            session,
            transport: Arc::new(transport),
            reassembler: Arc::new(Mutex::new(StreamReassembler::with_max_len(
                self.config.max_buffer_len,
            ))),
            telemetry: Arc::new(Mutex::new(TelemetryMapper::new())),
            notification_capacity: self.config.notification_channel_capacity,
            event_capacity: self.config.telemetry_channel_capacity,
        })
    }
}

impl Default for DeviceLinkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A connected device.
///
/// Cheap to clone; clones share the same buffer and snapshot.
#[derive(Clone)]
pub struct DeviceLink {
    codec: Arc<dyn ProtocolCodec>,
    session: Arc<dyn DeviceSession>,
    transport: Arc<dyn Transport>,
    reassembler: Arc<Mutex<StreamReassembler>>,
    telemetry: Arc<Mutex<TelemetryMapper>>,
    notification_capacity: usize,
    event_capacity: usize,
}

impl DeviceLink {
    /// Create a new link builder.
    pub fn builder() -> DeviceLinkBuilder {
        DeviceLinkBuilder::new()
    }

    /// Codec selected for this device.
    pub fn codec(&self) -> &Arc<dyn ProtocolCodec> {
        &self.codec
    }

    /// Translate an intent and write it to the device.
    pub async fn send(&self, intent: DeviceIntent) -> Result<()> {
        let command = self.session.command_for(&intent)?;
        self.send_command(&command).await
    }

    /// Ask the device for a status report.
    pub async fn request_status(&self) -> Result<()> {
        self.send(DeviceIntent::RequestStatus).await
    }

    /// Encode a command and write it to the device.
    pub async fn send_command(&self, command: &ProtocolCommand) -> Result<()> {
        let frame = self.codec.encode(command);
        tracing::trace!("Writing {}: {:02X?}", command.name(), &frame[..]);

        self.transport.write(frame).await.map_err(|e| {
            tracing::warn!("Write of {} failed: {}", command.name(), e);
            e
        })
    }

    /// Feed one notification chunk and decode every complete frame in it.
    ///
    /// Malformed frames are dropped silently.
    pub async fn on_notification(&self, chunk: &[u8]) -> Vec<ProtocolMessage> {
        let frames = self.reassembler.lock().await.append(chunk);

        frames
            .iter()
            .filter_map(|frame| {
                let message = self.codec.decode(frame);
                if message.is_none() {
                    tracing::debug!("Dropped malformed frame of {} bytes", frame.len());
                }
                message
            })
            .collect()
    }

    /// Drop buffered bytes and the telemetry snapshot.
    pub async fn disconnect(&self) {
        self.reassembler.lock().await.clear();
        self.telemetry.lock().await.reset();
        tracing::debug!("Link state cleared");
    }

    /// Current telemetry snapshot.
    pub async fn telemetry(&self) -> Telemetry {
        self.telemetry.lock().await.snapshot().clone()
    }

    /// Channel for the BLE stack to push notification chunks into.
    ///
    /// Sized by `notification_channel_capacity`. Hand the receiver to
    /// [`spawn_pump`](Self::spawn_pump).
    pub fn notification_channel(&self) -> (mpsc::Sender<Bytes>, mpsc::Receiver<Bytes>) {
        mpsc::channel(self.notification_capacity)
    }

    /// Spawn a task that drains `notifications` and publishes [`LinkEvent`]s.
    ///
    /// The task ends, clearing link state, when the notification channel
    /// closes. It also ends when the event receiver is dropped.
    pub fn spawn_pump(
        &self,
        notifications: mpsc::Receiver<Bytes>,
    ) -> (mpsc::Receiver<LinkEvent>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(self.event_capacity);
        let link = self.clone();

        let task = tokio::spawn(async move {
            link.pump(notifications, tx).await;
            link.disconnect().await;
        });

        (rx, task)
    }

    async fn pump(&self, mut notifications: mpsc::Receiver<Bytes>, tx: mpsc::Sender<LinkEvent>) {
        while let Some(chunk) = notifications.recv().await {
            for message in self.on_notification(&chunk).await {
                let changed = self.telemetry.lock().await.apply(&message);

                if tx.send(LinkEvent::Message(message)).await.is_err() {
                    return;
                }
                if changed {
                    let snapshot = self.telemetry().await;
                    if tx.send(LinkEvent::Telemetry(snapshot)).await.is_err() {
                        return;
                    }
                }
            }
        }
        tracing::debug!("Notification stream closed");
    }
}

//! Replay - feed a captured notification stream through a device link.
//!
//! This example demonstrates:
//! - Identifying a device from its scan record
//! - Building a link from a registry and session list
//! - Sending an intent and pumping notifications into telemetry
//!
//! # Running
//!
//! ```text
//! RUST_LOG=massager_protocol=trace cargo run --example replay
//! ```

use std::sync::Arc;

use bytes::Bytes;
use massager_protocol::codec::EmsV2Codec;
use massager_protocol::config::LinkConfig;
use massager_protocol::protocol::{build_frame, command, Direction};
use massager_protocol::session::EmsV2Session;
use massager_protocol::transport::ChannelTransport;
use massager_protocol::{
    decode_scan_record, DeviceIntent, DeviceLink, DeviceSession, LinkEvent, ProtocolRegistry,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = LinkConfig::from_json_str(r#"{ "default_product_id": 1 }"#)?;

    let mut registry = ProtocolRegistry::new();
    registry.set_default_product_id(config.default_product_id);
    registry.register(Arc::new(EmsV2Codec::new()));
    let sessions: Vec<Arc<dyn DeviceSession>> = vec![Arc::new(EmsV2Session::new())];

    // Scan result with the identity string only in the name.
    let adv = decode_scan_record(None, Some("HY1v2.0")).ok_or("unrecognized device")?;
    tracing::info!("Discovered {:?}", adv);

    let (transport, mut writes) = ChannelTransport::new(16);
    let link = DeviceLink::builder()
        .config(config)
        .product_id(adv.product_id)
        .build(&registry, &sessions, transport)?;

    link.send(DeviceIntent::SelectLevel(6)).await?;
    if let Some(frame) = writes.recv().await {
        tracing::info!("Wrote {:02X?}", &frame[..]);
    }

    // Noise, a heartbeat split across notifications, then a level report.
    let heartbeat = build_frame(
        Direction::DeviceToApp,
        command::STATUS,
        &[1, 3, 2, 6, 1, 0x03, 0x84, 1, 0],
    );
    let level = build_frame(Direction::DeviceToApp, command::INTENSITY, &[7]);
    let mut capture = vec![0x00, 0xFF, 0x13];
    capture.extend_from_slice(&heartbeat);
    capture.extend_from_slice(&level);

    let (notify_tx, notify_rx) = link.notification_channel();
    let (mut events, pump) = link.spawn_pump(notify_rx);

    tokio::spawn(async move {
        for chunk in capture.chunks(5) {
            if notify_tx.send(Bytes::copy_from_slice(chunk)).await.is_err() {
                break;
            }
        }
    });

    while let Some(event) = events.recv().await {
        match event {
            LinkEvent::Message(msg) => tracing::info!("Message: {:?}", msg),
            LinkEvent::Telemetry(t) => println!("{}", serde_json::to_string(&t)?),
        }
    }

    pump.await?;
    Ok(())
}

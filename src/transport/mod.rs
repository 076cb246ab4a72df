//! Transport boundary.
//!
//! The BLE stack itself lives outside this crate. It delivers notification
//! chunks over an `mpsc` channel and accepts characteristic writes through
//! the [`Transport`] trait. Write completion is reported back as a `Result`;
//! retries are the transport's business.

mod channel;

pub use channel::ChannelTransport;

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;

use crate::error::Result;

/// Boxed future for transport results.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Writes encoded frames to the device's write characteristic.
pub trait Transport: Send + Sync + 'static {
    /// Write one complete frame.
    fn write(&self, frame: Bytes) -> BoxFuture<'_, Result<()>>;
}

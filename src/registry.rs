//! Protocol registry for routing product ids to codecs.
//!
//! Built once at startup and passed by reference to whatever needs lookups.
//! Registration order is kept so that the fallback codec is deterministic.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use massager_protocol::codec::EmsV2Codec;
//! use massager_protocol::registry::ProtocolRegistry;
//!
//! let mut registry = ProtocolRegistry::new();
//! registry.register(Arc::new(EmsV2Codec::new()));
//!
//! assert!(registry.find_codec(Some(1)).is_some());
//! assert!(registry.find_codec(Some(99)).is_none());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::codec::ProtocolCodec;
use crate::error::{ProtocolError, Result};

/// Maps product ids to codec instances.
pub struct ProtocolRegistry {
    /// Codecs by product id.
    by_product: HashMap<u32, Arc<dyn ProtocolCodec>>,
    /// Codecs in registration order.
    codecs: Vec<Arc<dyn ProtocolCodec>>,
    /// Product id preferred when a device's id is unknown.
    default_product_id: Option<u32>,
}

impl ProtocolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            by_product: HashMap::new(),
            codecs: Vec::new(),
            default_product_id: None,
        }
    }

    /// Create a registry with a preferred default product id.
    pub fn with_default_product_id(product_id: u32) -> Self {
        Self {
            default_product_id: Some(product_id),
            ..Self::new()
        }
    }

    /// Register a codec under every product id it declares.
    ///
    /// A later codec claiming the same product id replaces the earlier one.
    pub fn register(&mut self, codec: Arc<dyn ProtocolCodec>) {
        for &product_id in &codec.capabilities().product_ids {
            if self.by_product.insert(product_id, codec.clone()).is_some() {
                tracing::warn!("Product id {} re-registered", product_id);
            }
        }
        self.codecs.push(codec);
    }

    /// Find the codec for a product id.
    pub fn find_codec(&self, product_id: Option<u32>) -> Option<Arc<dyn ProtocolCodec>> {
        product_id.and_then(|id| self.by_product.get(&id).cloned())
    }

    /// Codec for the default product id, else the first registered codec.
    pub fn default_codec(&self) -> Option<Arc<dyn ProtocolCodec>> {
        self.find_codec(self.default_product_id)
            .or_else(|| self.codecs.first().cloned())
    }

    /// Exact match, falling back to [`default_codec`](Self::default_codec).
    pub fn resolve(&self, product_id: Option<u32>) -> Result<Arc<dyn ProtocolCodec>> {
        self.find_codec(product_id)
            .or_else(|| {
                tracing::debug!("No codec for product id {:?}, using default", product_id);
                self.default_codec()
            })
            .ok_or(ProtocolError::CodecNotFound(product_id))
    }

    /// Configured default product id.
    pub fn default_product_id(&self) -> Option<u32> {
        self.default_product_id
    }

    /// Change the default product id.
    pub fn set_default_product_id(&mut self, product_id: Option<u32>) {
        self.default_product_id = product_id;
    }

    /// Number of registered codecs.
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    /// Check if no codec is registered.
    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}

impl Default for ProtocolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

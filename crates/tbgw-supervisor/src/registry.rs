//! Per-tenant pairing of a gateway with its extensions

use std::sync::Arc;

use tbgw_core::{Extension, GatewayService, HttpExtension};

/// A fully started tenant.
///
/// Only built once the gateway and every extension have initialized, so a
/// registry never describes a partially running tenant. Immutable after
/// construction.
pub struct TenantRegistry {
    label: String,
    gateway: Arc<dyn GatewayService>,
    extensions: Vec<Extension>,
}

impl TenantRegistry {
    pub(crate) fn new(
        label: impl Into<String>,
        gateway: Arc<dyn GatewayService>,
        extensions: Vec<Extension>,
    ) -> Self {
        Self {
            label: label.into(),
            gateway,
            extensions,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn gateway(&self) -> &Arc<dyn GatewayService> {
        &self.gateway
    }

    /// Extensions in declaration order
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    /// HTTP extensions in declaration order
    pub fn http_extensions(&self) -> impl Iterator<Item = &Arc<dyn HttpExtension>> + '_ {
        self.extensions.iter().filter_map(Extension::as_http)
    }

    pub(crate) fn into_parts(self) -> (String, Arc<dyn GatewayService>, Vec<Extension>) {
        (self.label, self.gateway, self.extensions)
    }
}

impl std::fmt::Debug for TenantRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantRegistry")
            .field("label", &self.label)
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

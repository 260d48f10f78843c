//! Construction seams for gateways and extensions

use std::sync::{Arc, Weak};

use serde_json::Value;
use tbgw_core::{
    Extension, ExtensionKind, ExtensionService, GatewayService, HttpExtension, ServiceResult,
    TenantConfig, TenantError, TenantResult,
};

/// Creates the gateway for a tenant.
///
/// Construction must not perform I/O; the supervisor calls
/// `initialize` separately so that a failure can be cleaned up.
pub trait GatewayProvider: Send + Sync {
    fn create_gateway(&self, tenant: &TenantConfig) -> Arc<dyn GatewayService>;
}

/// Constructors for each supported extension kind.
///
/// Each constructor receives a weak back-reference to the gateway the
/// extension reports through, plus its opaque configuration payload.
pub trait ExtensionProvider: Send + Sync {
    fn file_tail(
        &self,
        gateway: Weak<dyn GatewayService>,
        configuration: &Value,
    ) -> ServiceResult<Arc<dyn ExtensionService>>;

    fn opc_ua(
        &self,
        gateway: Weak<dyn GatewayService>,
        configuration: &Value,
    ) -> ServiceResult<Arc<dyn ExtensionService>>;

    fn http(
        &self,
        gateway: Weak<dyn GatewayService>,
        configuration: &Value,
    ) -> ServiceResult<Arc<dyn HttpExtension>>;

    fn mqtt_client(
        &self,
        gateway: Weak<dyn GatewayService>,
        configuration: &Value,
    ) -> ServiceResult<Arc<dyn ExtensionService>>;
}

/// Maps an extension type tag to a constructed [`Extension`]
#[derive(Clone)]
pub struct ExtensionFactory {
    provider: Arc<dyn ExtensionProvider>,
}

impl ExtensionFactory {
    pub fn new(provider: Arc<dyn ExtensionProvider>) -> Self {
        Self { provider }
    }

    /// Build the extension declared by `extension_type`, bound to `gateway`.
    ///
    /// Unknown tags fail with [`TenantError::UnsupportedExtension`]; a
    /// constructor that rejects its configuration fails with
    /// [`TenantError::ExtensionBuild`]. Nothing is initialized here.
    pub fn create_extension_service_by_type(
        &self,
        extension_type: &str,
        gateway: &Arc<dyn GatewayService>,
        configuration: &Value,
    ) -> TenantResult<Extension> {
        let kind = extension_type.parse::<ExtensionKind>().map_err(|err| match err {
            TenantError::UnsupportedExtension { tag, .. } => TenantError::UnsupportedExtension {
                tag,
                tenant: Some(gateway.tenant_label().to_string()),
            },
            other => other,
        })?;
        let gw = Arc::downgrade(gateway);

        let built = match kind {
            ExtensionKind::File => self
                .provider
                .file_tail(gw, configuration)
                .map(Extension::File),
            ExtensionKind::Opc => self.provider.opc_ua(gw, configuration).map(Extension::Opc),
            ExtensionKind::Http => self.provider.http(gw, configuration).map(Extension::Http),
            ExtensionKind::Mqtt => self
                .provider
                .mqtt_client(gw, configuration)
                .map(Extension::Mqtt),
        };

        built.map_err(|source| TenantError::ExtensionBuild {
            tenant: gateway.tenant_label().to_string(),
            kind,
            source,
        })
    }
}

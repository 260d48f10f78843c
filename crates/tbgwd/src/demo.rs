//! Stand-in gateway and extensions for running the daemon without a
//! platform connection.
//!
//! They validate their settings and log every lifecycle call, which is
//! enough to exercise tenant start-up, containment and shutdown end to end.

use std::path::PathBuf;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tbgw_core::{
    ExtensionKind, ExtensionService, GatewayService, HttpExtension, ServiceError, ServiceResult,
    TenantConfig,
};
use tbgw_supervisor::{ExtensionProvider, GatewayProvider};

/// Gateway that logs instead of connecting
pub struct LoggingGateway {
    label: String,
    settings: Value,
}

#[async_trait]
impl GatewayService for LoggingGateway {
    fn tenant_label(&self) -> &str {
        &self.label
    }

    async fn initialize(&self) -> ServiceResult<()> {
        tracing::info!(tenant = %self.label, settings = %self.settings, "Gateway connected");
        Ok(())
    }

    async fn destroy(&self) -> ServiceResult<()> {
        tracing::info!(tenant = %self.label, "Gateway disconnected");
        Ok(())
    }
}

/// Settings understood by the stand-in extensions
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExtensionSettings {
    /// File that must exist at start-up (file extensions)
    path: Option<PathBuf>,
    /// Token an HTTP extension accepts; any token when unset
    token: Option<String>,
    /// Converters an HTTP extension handles; all when empty
    converters: Vec<String>,
}

/// Extension that logs instead of talking to devices
pub struct LoggingExtension {
    kind: ExtensionKind,
    /// Label of the owning tenant, kept for logs after the gateway is gone
    tenant: String,
    gateway: Weak<dyn GatewayService>,
    settings: ExtensionSettings,
}

impl LoggingExtension {
    fn new(
        kind: ExtensionKind,
        gateway: Weak<dyn GatewayService>,
        configuration: &Value,
    ) -> ServiceResult<Self> {
        let tenant = gateway
            .upgrade()
            .map(|g| g.tenant_label().to_string())
            .ok_or_else(|| ServiceError::Internal("gateway is no longer available".to_string()))?;
        let settings = if configuration.is_null() {
            ExtensionSettings::default()
        } else {
            serde_json::from_value(configuration.clone())
                .map_err(|e| ServiceError::InvalidConfig(format!("{} extension: {}", kind, e)))?
        };
        Ok(Self {
            kind,
            tenant,
            gateway,
            settings,
        })
    }

    fn gateway(&self) -> ServiceResult<Arc<dyn GatewayService>> {
        self.gateway
            .upgrade()
            .ok_or_else(|| ServiceError::Connection("gateway is no longer available".to_string()))
    }

    fn accepts(&self, converter_id: &str, token: &str) -> bool {
        let token_ok = self.settings.token.as_deref().map_or(true, |t| t == token);
        let converter_ok = self.settings.converters.is_empty()
            || self.settings.converters.iter().any(|c| c == converter_id);
        token_ok && converter_ok
    }
}

#[async_trait]
impl ExtensionService for LoggingExtension {
    fn kind(&self) -> ExtensionKind {
        self.kind
    }

    async fn initialize(&self) -> ServiceResult<()> {
        self.gateway()?;
        if let Some(path) = &self.settings.path {
            if !path.exists() {
                return Err(ServiceError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{} does not exist", path.display()),
                )));
            }
        }
        tracing::info!(tenant = %self.tenant, extension = %self.kind, "Extension started");
        Ok(())
    }

    async fn destroy(&self) -> ServiceResult<()> {
        tracing::info!(tenant = %self.tenant, extension = %self.kind, "Extension stopped");
        Ok(())
    }
}

#[async_trait]
impl HttpExtension for LoggingExtension {
    async fn process_request(
        &self,
        converter_id: &str,
        token: &str,
        body: &str,
    ) -> ServiceResult<()> {
        self.gateway()?;
        if !self.accepts(converter_id, token) {
            tracing::debug!(
                tenant = %self.tenant,
                converter_id = %converter_id,
                "Request not addressed to this extension"
            );
            return Ok(());
        }
        tracing::info!(
            tenant = %self.tenant,
            converter_id = %converter_id,
            bytes = body.len(),
            "Request accepted"
        );
        Ok(())
    }
}

pub struct LoggingGateways;

impl GatewayProvider for LoggingGateways {
    fn create_gateway(&self, tenant: &TenantConfig) -> Arc<dyn GatewayService> {
        Arc::new(LoggingGateway {
            label: tenant.label.clone(),
            settings: tenant.gateway.clone(),
        })
    }
}

pub struct LoggingExtensions;

impl ExtensionProvider for LoggingExtensions {
    fn file_tail(
        &self,
        gateway: Weak<dyn GatewayService>,
        configuration: &Value,
    ) -> ServiceResult<Arc<dyn ExtensionService>> {
        Ok(Arc::new(LoggingExtension::new(
            ExtensionKind::File,
            gateway,
            configuration,
        )?))
    }

    fn opc_ua(
        &self,
        gateway: Weak<dyn GatewayService>,
        configuration: &Value,
    ) -> ServiceResult<Arc<dyn ExtensionService>> {
        Ok(Arc::new(LoggingExtension::new(
            ExtensionKind::Opc,
            gateway,
            configuration,
        )?))
    }

    fn http(
        &self,
        gateway: Weak<dyn GatewayService>,
        configuration: &Value,
    ) -> ServiceResult<Arc<dyn HttpExtension>> {
        Ok(Arc::new(LoggingExtension::new(
            ExtensionKind::Http,
            gateway,
            configuration,
        )?))
    }

    fn mqtt_client(
        &self,
        gateway: Weak<dyn GatewayService>,
        configuration: &Value,
    ) -> ServiceResult<Arc<dyn ExtensionService>> {
        Ok(Arc::new(LoggingExtension::new(
            ExtensionKind::Mqtt,
            gateway,
            configuration,
        )?))
    }
}

/// Configuration used when no config file is given
pub fn demo_tenants() -> Vec<TenantConfig> {
    vec![
        TenantConfig::new("demo")
            .with_extension("http", serde_json::json!({ "converters": ["sensors"] }))
            .with_extension("mqtt", Value::Null),
        TenantConfig::new("factory").with_extension("opc", Value::Null),
    ]
}

//! Error types for gateway and extension lifecycle

use thiserror::Error;

use crate::extension::ExtensionKind;

/// Result type for collaborator operations (gateways and extensions)
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result type for supervisor operations
pub type TenantResult<T> = Result<T, TenantError>;

/// Failure cause reported by a gateway or extension implementation
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Could not reach or keep a connection to a remote endpoint
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Configuration payload is missing fields or has wrong values
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Request was refused (bad token, unknown converter, etc.)
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// I/O error (file tailing, sockets)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised by the tenant supervisor.
///
/// Each variant names the lifecycle step that failed. During init these
/// abort only the tenant being built, during stop they are logged and
/// collected, and from `process_request` they reach the caller.
#[derive(Debug, Error)]
pub enum TenantError {
    /// Extension type tag has no matching implementation. `tenant` is
    /// filled in once the tag is resolved for a particular tenant.
    #[error("Extension: {tag} is not supported!")]
    UnsupportedExtension { tag: String, tenant: Option<String> },

    /// A tenant with this label is already running
    #[error("[{tenant}] Tenant label is already in use")]
    DuplicateTenant { tenant: String },

    #[error("[{tenant}] Failed to initialize the gateway: {source}")]
    GatewayInit {
        tenant: String,
        #[source]
        source: ServiceError,
    },

    #[error("[{tenant}] Failed to stop the gateway: {source}")]
    GatewayDestroy {
        tenant: String,
        #[source]
        source: ServiceError,
    },

    /// Extension constructor rejected its configuration
    #[error("[{tenant}] Failed to create extension [{kind}]: {source}")]
    ExtensionBuild {
        tenant: String,
        kind: ExtensionKind,
        #[source]
        source: ServiceError,
    },

    #[error("[{tenant}] Failed to initialize extension [{kind}]: {source}")]
    ExtensionInit {
        tenant: String,
        kind: ExtensionKind,
        #[source]
        source: ServiceError,
    },

    #[error("[{tenant}] Failed to stop extension [{kind}]: {source}")]
    ExtensionDestroy {
        tenant: String,
        kind: ExtensionKind,
        #[source]
        source: ServiceError,
    },

    /// An HTTP extension failed while handling a broadcast request
    #[error("[{tenant}] Failed to process request for converter {converter_id}: {source}")]
    RequestProcessing {
        tenant: String,
        converter_id: String,
        #[source]
        source: ServiceError,
    },
}

impl TenantError {
    /// Returns the tenant label this error belongs to, if any
    pub fn tenant(&self) -> Option<&str> {
        match self {
            TenantError::UnsupportedExtension { tenant, .. } => tenant.as_deref(),
            TenantError::DuplicateTenant { tenant }
            | TenantError::GatewayInit { tenant, .. }
            | TenantError::GatewayDestroy { tenant, .. }
            | TenantError::ExtensionBuild { tenant, .. }
            | TenantError::ExtensionInit { tenant, .. }
            | TenantError::ExtensionDestroy { tenant, .. }
            | TenantError::RequestProcessing { tenant, .. } => Some(tenant),
        }
    }

    /// True for errors caused by the tenant configuration itself.
    /// These are never retried.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            TenantError::UnsupportedExtension { .. } | TenantError::DuplicateTenant { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_extension_names_the_tag() {
        let err = TenantError::UnsupportedExtension {
            tag: "ftp".to_string(),
            tenant: None,
        };
        assert_eq!(err.to_string(), "Extension: ftp is not supported!");
        assert!(err.is_configuration_error());
        assert_eq!(err.tenant(), None);

        let err = TenantError::UnsupportedExtension {
            tag: "ftp".to_string(),
            tenant: Some("acme".to_string()),
        };
        assert_eq!(err.to_string(), "Extension: ftp is not supported!");
        assert_eq!(err.tenant(), Some("acme"));
    }

    #[test]
    fn lifecycle_errors_carry_tenant_and_source() {
        let err = TenantError::ExtensionInit {
            tenant: "acme".to_string(),
            kind: ExtensionKind::Opc,
            source: ServiceError::Connection("opc.tcp://plc:4840".to_string()),
        };
        assert_eq!(err.tenant(), Some("acme"));
        assert!(!err.is_configuration_error());
        assert_eq!(
            err.to_string(),
            "[acme] Failed to initialize extension [opc]: Connection failed: opc.tcp://plc:4840"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn io_errors_convert_into_service_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "telemetry.log");
        let err: ServiceError = io.into();
        assert!(matches!(err, ServiceError::Io(_)));
    }
}

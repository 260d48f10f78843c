//! Best-effort teardown that collects failures instead of stopping

use std::sync::Arc;

use tbgw_core::{Extension, GatewayService, TenantError};
use tracing::{debug, warn};

/// Failures collected while tearing tenants down.
///
/// Teardown never stops at the first error; every destroy step runs and
/// its outcome lands here for logging and inspection.
#[derive(Debug, Default)]
pub struct CleanupReport {
    failures: Vec<TenantError>,
}

impl CleanupReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the error from `result`, if any
    pub fn record(&mut self, result: Result<(), TenantError>) {
        if let Err(e) = result {
            self.failures.push(e);
        }
    }

    pub fn merge(&mut self, other: CleanupReport) {
        self.failures.extend(other.failures);
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[TenantError] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<TenantError> {
        self.failures
    }
}

/// Destroy every extension in order, then the gateway.
///
/// Each failure is logged with the tenant label and recorded; none of them
/// prevents the remaining steps.
pub async fn teardown(
    label: &str,
    gateway: &Arc<dyn GatewayService>,
    extensions: &[Extension],
) -> CleanupReport {
    let mut report = CleanupReport::new();

    for extension in extensions {
        let kind = extension.kind();
        debug!(tenant = %label, extension = %kind, "Stopping extension");
        report.record(extension.destroy().await.map_err(|source| {
            let err = TenantError::ExtensionDestroy {
                tenant: label.to_string(),
                kind,
                source,
            };
            warn!(tenant = %label, extension = %kind, error = %err, "Failed to stop the extension");
            err
        }));
    }

    debug!(tenant = %label, "Stopping gateway");
    report.record(gateway.destroy().await.map_err(|source| {
        let err = TenantError::GatewayDestroy {
            tenant: label.to_string(),
            source,
        };
        warn!(tenant = %label, error = %err, "Failed to stop the gateway");
        err
    }));

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tbgw_core::testing::{CallLog, MockExtension, MockGateway};
    use tbgw_core::ExtensionKind;

    #[tokio::test]
    async fn destroys_extensions_then_gateway() {
        let log = CallLog::new();
        let gateway: Arc<dyn GatewayService> = Arc::new(MockGateway::new("acme", log.clone()));
        let extensions = vec![
            Extension::File(Arc::new(MockExtension::new(
                "acme/file",
                ExtensionKind::File,
                log.clone(),
            ))),
            Extension::Http(Arc::new(MockExtension::new(
                "acme/http",
                ExtensionKind::Http,
                log.clone(),
            ))),
        ];

        let report = teardown("acme", &gateway, &extensions).await;

        assert!(report.is_clean());
        assert_eq!(
            log.entries(),
            vec!["acme/file.destroy", "acme/http.destroy", "acme/gateway.destroy"]
        );
    }

    #[tokio::test]
    async fn keeps_going_after_every_failure() {
        let log = CallLog::new();
        let gateway: Arc<dyn GatewayService> =
            Arc::new(MockGateway::new("acme", log.clone()).fail_destroy());
        let extensions = vec![
            Extension::Opc(Arc::new(
                MockExtension::new("acme/opc", ExtensionKind::Opc, log.clone()).fail_destroy(),
            )),
            Extension::Mqtt(Arc::new(MockExtension::new(
                "acme/mqtt",
                ExtensionKind::Mqtt,
                log.clone(),
            ))),
        ];

        let report = teardown("acme", &gateway, &extensions).await;

        assert_eq!(
            log.entries(),
            vec!["acme/opc.destroy", "acme/mqtt.destroy", "acme/gateway.destroy"]
        );
        let failures = report.into_failures();
        assert_eq!(failures.len(), 2);
        assert!(matches!(
            failures[0],
            TenantError::ExtensionDestroy {
                kind: ExtensionKind::Opc,
                ..
            }
        ));
        assert!(matches!(failures[1], TenantError::GatewayDestroy { .. }));
    }

    #[test]
    fn merge_accumulates() {
        let mut a = CleanupReport::new();
        a.record(Ok(()));
        a.record(Err(TenantError::DuplicateTenant {
            tenant: "acme".to_string(),
        }));

        let mut b = CleanupReport::new();
        b.record(Err(TenantError::UnsupportedExtension {
            tag: "ftp".to_string(),
            tenant: Some("globex".to_string()),
        }));

        a.merge(b);
        assert_eq!(a.failures().len(), 2);
        assert!(!a.is_clean());
    }
}

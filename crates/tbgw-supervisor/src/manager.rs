//! Tenant Manager - lifecycle supervisor for all tenants
//!
//! Brings tenants up one after another, keeps a failing tenant from
//! affecting the others, fans HTTP requests out to every HTTP extension,
//! and tears everything down on stop.

use std::sync::Arc;

use tbgw_core::{
    Extension, ExtensionConfig, GatewayService, HttpExtension, ServiceState, TenantConfig,
    TenantError, TenantResult,
};
use tracing::{debug, info, warn};

use crate::cleanup::{teardown, CleanupReport};
use crate::factory::{ExtensionFactory, GatewayProvider};
use crate::registry::TenantRegistry;

/// Supervisor owning every running tenant.
///
/// Created once by the process host, which calls [`init`](Self::init) at
/// start-up and [`stop`](Self::stop) at shutdown. Between the two the
/// tenant set is fixed, so [`process_request`](Self::process_request) only
/// needs shared access.
pub struct TenantManager {
    gateways: Arc<dyn GatewayProvider>,
    factory: ExtensionFactory,
    /// Running tenants in start-up order
    tenants: Vec<TenantRegistry>,
    /// HTTP extensions across all tenants: tenant order, then declaration order
    http_extensions: Vec<(String, Arc<dyn HttpExtension>)>,
    /// Destroy failures from tenants abandoned during init
    init_cleanup: CleanupReport,
    state: ServiceState,
}

impl TenantManager {
    pub fn new(gateways: Arc<dyn GatewayProvider>, factory: ExtensionFactory) -> Self {
        Self {
            gateways,
            factory,
            tenants: Vec::new(),
            http_extensions: Vec::new(),
            init_cleanup: CleanupReport::new(),
            state: ServiceState::Uninitialized,
        }
    }

    /// Start every configured tenant, in order.
    ///
    /// A tenant is published only after its gateway and all of its
    /// extensions initialized. Any failure abandons that tenant alone: what
    /// was already started for it is destroyed best-effort and the loop
    /// moves on. Outcomes are reported through logs and through which
    /// tenants end up in [`tenant_labels`](Self::tenant_labels).
    ///
    /// Tenants start sequentially and no timeout is applied; a gateway or
    /// extension whose `initialize` never returns blocks every tenant after
    /// it.
    ///
    /// Only the first call has an effect.
    pub async fn init(&mut self, tenants: &[TenantConfig]) {
        if !self.state.can_transition_to(ServiceState::Running) {
            warn!(state = %self.state, "Tenant manager already initialized, ignoring init");
            return;
        }

        for tenant in tenants {
            if self.registry(&tenant.label).is_some() {
                let err = TenantError::DuplicateTenant {
                    tenant: tenant.label.clone(),
                };
                warn!(tenant = %tenant.label, error = %err, "Skipping tenant");
                continue;
            }

            let mut cleanup = CleanupReport::new();
            match self.start_tenant(tenant, &mut cleanup).await {
                Ok(registry) => self.publish(registry),
                Err(err) => {
                    warn!(
                        tenant = %tenant.label,
                        error = %err,
                        configuration_error = err.is_configuration_error(),
                        cleanup_failures = cleanup.failures().len(),
                        "Failed to initialize the tenant"
                    );
                }
            }
            self.init_cleanup.merge(cleanup);
        }

        self.state = ServiceState::Running;
        info!(
            running = self.tenants.len(),
            configured = tenants.len(),
            http_extensions = self.http_extensions.len(),
            cleanup_failures = self.init_cleanup.failures().len(),
            "Tenant initialization complete"
        );
    }

    /// Broadcast a request to every HTTP extension of every tenant.
    ///
    /// Extensions are called one after another in stored order. The first
    /// failure is returned and the remaining extensions are not called.
    /// There is no routing by tenant or token here; each extension decides
    /// whether the request concerns it.
    ///
    /// Concurrent calls are safe as far as the supervisor is concerned.
    /// Whether they are safe overall depends on each extension's own
    /// `process_request`.
    pub async fn process_request(
        &self,
        converter_id: &str,
        token: &str,
        body: &str,
    ) -> TenantResult<()> {
        for (label, service) in &self.http_extensions {
            debug!(tenant = %label, converter_id = %converter_id, "Dispatching request");
            service
                .process_request(converter_id, token, body)
                .await
                .map_err(|source| TenantError::RequestProcessing {
                    tenant: label.clone(),
                    converter_id: converter_id.to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Tear down every running tenant: its extensions in declaration order,
    /// then its gateway.
    ///
    /// Never fails. Every destroy is attempted exactly once; failures are
    /// logged and returned in the report. Later calls are no-ops.
    pub async fn stop(&mut self) -> CleanupReport {
        let mut report = CleanupReport::new();
        if !self.state.can_transition_to(ServiceState::Destroyed) {
            debug!("Tenant manager already stopped");
            return report;
        }

        self.http_extensions.clear();
        for registry in std::mem::take(&mut self.tenants) {
            let (label, gateway, extensions) = registry.into_parts();
            info!(tenant = %label, "Stopping tenant");
            report.merge(teardown(&label, &gateway, &extensions).await);
        }
        self.state = ServiceState::Destroyed;

        if report.is_clean() {
            info!("All tenants stopped");
        } else {
            warn!(
                failures = report.failures().len(),
                "Tenants stopped with errors"
            );
        }
        report
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    /// Labels of running tenants, in start-up order
    pub fn tenant_labels(&self) -> Vec<&str> {
        self.tenants.iter().map(TenantRegistry::label).collect()
    }

    pub fn registry(&self, label: &str) -> Option<&TenantRegistry> {
        self.tenants.iter().find(|r| r.label() == label)
    }

    /// Destroy failures collected while abandoning tenants during init
    pub fn init_cleanup(&self) -> &CleanupReport {
        &self.init_cleanup
    }

    pub fn tenant_count(&self) -> usize {
        self.tenants.len()
    }

    pub fn http_extension_count(&self) -> usize {
        self.http_extensions.len()
    }

    /// Build and initialize one tenant. On error, everything created for
    /// the tenant has already been torn down and any destroy failures are
    /// in `cleanup`.
    async fn start_tenant(
        &self,
        tenant: &TenantConfig,
        cleanup: &mut CleanupReport,
    ) -> TenantResult<TenantRegistry> {
        let label = tenant.label.as_str();

        info!(tenant = %label, "Initializing gateway");
        let gateway = self.gateways.create_gateway(tenant);

        if let Err(source) = gateway.initialize().await {
            cleanup.merge(teardown(label, &gateway, &[]).await);
            return Err(TenantError::GatewayInit {
                tenant: label.to_string(),
                source,
            });
        }

        let mut extensions = Vec::with_capacity(tenant.extensions.len());
        for config in &tenant.extensions {
            if let Err(err) = self
                .start_extension(label, &gateway, config, &mut extensions)
                .await
            {
                cleanup.merge(teardown(label, &gateway, &extensions).await);
                return Err(err);
            }
        }

        Ok(TenantRegistry::new(label, gateway, extensions))
    }

    /// Build one extension and initialize it. The extension is added to
    /// `started` before `initialize`, so a failed one is torn down with the
    /// rest of the tenant.
    async fn start_extension(
        &self,
        label: &str,
        gateway: &Arc<dyn GatewayService>,
        config: &ExtensionConfig,
        started: &mut Vec<Extension>,
    ) -> TenantResult<()> {
        info!(tenant = %label, extension = %config.extension_type, "Initializing extension");

        let extension = self.factory.create_extension_service_by_type(
            &config.extension_type,
            gateway,
            &config.configuration,
        )?;
        let kind = extension.kind();
        started.push(extension.clone());

        extension
            .initialize()
            .await
            .map_err(|source| TenantError::ExtensionInit {
                tenant: label.to_string(),
                kind,
                source,
            })
    }

    fn publish(&mut self, registry: TenantRegistry) {
        let label = registry.label().to_string();
        self.http_extensions.extend(
            registry
                .http_extensions()
                .map(|http| (label.clone(), Arc::clone(http))),
        );
        info!(
            tenant = %label,
            extensions = registry.extensions().len(),
            "Tenant started"
        );
        self.tenants.push(registry);
    }
}

impl Drop for TenantManager {
    fn drop(&mut self) {
        if !self.tenants.is_empty() {
            warn!(
                running = self.tenants.len(),
                "Tenant manager dropped without stop, tenants were not destroyed"
            );
        }
    }
}

//! Shared fixtures for supervisor integration tests
//!
//! Failures are scripted through the opaque configuration payloads:
//! `{"fail": ["initialize", "destroy"]}` on a tenant's `gateway` section
//! or on an extension's `configuration`. Extensions additionally accept
//! `"build"` (constructor rejects) and `"process"`.

#![allow(dead_code)]

use std::sync::{Arc, Weak};

use serde_json::{json, Value};
use tbgw_core::testing::{CallLog, MockExtension, MockGateway};
use tbgw_core::{
    ExtensionKind, ExtensionService, GatewayService, HttpExtension, ServiceError, ServiceResult,
    TenantConfig,
};
use tbgw_supervisor::{ExtensionFactory, ExtensionProvider, GatewayProvider, TenantManager};

fn fails(config: &Value, op: &str) -> bool {
    config
        .get("fail")
        .and_then(Value::as_array)
        .map(|ops| ops.iter().any(|o| o.as_str() == Some(op)))
        .unwrap_or(false)
}

pub struct ScriptedGateways {
    pub log: CallLog,
}

impl GatewayProvider for ScriptedGateways {
    fn create_gateway(&self, tenant: &TenantConfig) -> Arc<dyn GatewayService> {
        let mut gateway = MockGateway::new(&tenant.label, self.log.clone());
        if fails(&tenant.gateway, "initialize") {
            gateway = gateway.fail_initialize();
        }
        if fails(&tenant.gateway, "destroy") {
            gateway = gateway.fail_destroy();
        }
        Arc::new(gateway)
    }
}

pub struct ScriptedExtensions {
    pub log: CallLog,
}

impl ScriptedExtensions {
    /// Journal name is `"<tenant>/<name>"`, where `name` defaults to the kind
    fn build(
        &self,
        gateway: Weak<dyn GatewayService>,
        kind: ExtensionKind,
        config: &Value,
    ) -> ServiceResult<MockExtension> {
        let tenant = gateway
            .upgrade()
            .map(|g| g.tenant_label().to_string())
            .ok_or_else(|| ServiceError::Internal("gateway dropped".to_string()))?;
        let name = config
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| kind.to_string());
        let full_name = format!("{}/{}", tenant, name);

        self.log.record(format!("{}.build", full_name));
        if fails(config, "build") {
            return Err(ServiceError::InvalidConfig(format!("{}: bad settings", full_name)));
        }

        let mut ext = MockExtension::new(full_name, kind, self.log.clone());
        if fails(config, "initialize") {
            ext = ext.fail_initialize();
        }
        if fails(config, "destroy") {
            ext = ext.fail_destroy();
        }
        if fails(config, "process") {
            ext = ext.fail_process();
        }
        Ok(ext)
    }
}

impl ExtensionProvider for ScriptedExtensions {
    fn file_tail(
        &self,
        gateway: Weak<dyn GatewayService>,
        configuration: &Value,
    ) -> ServiceResult<Arc<dyn ExtensionService>> {
        Ok(Arc::new(self.build(gateway, ExtensionKind::File, configuration)?))
    }

    fn opc_ua(
        &self,
        gateway: Weak<dyn GatewayService>,
        configuration: &Value,
    ) -> ServiceResult<Arc<dyn ExtensionService>> {
        Ok(Arc::new(self.build(gateway, ExtensionKind::Opc, configuration)?))
    }

    fn http(
        &self,
        gateway: Weak<dyn GatewayService>,
        configuration: &Value,
    ) -> ServiceResult<Arc<dyn HttpExtension>> {
        Ok(Arc::new(self.build(gateway, ExtensionKind::Http, configuration)?))
    }

    fn mqtt_client(
        &self,
        gateway: Weak<dyn GatewayService>,
        configuration: &Value,
    ) -> ServiceResult<Arc<dyn ExtensionService>> {
        Ok(Arc::new(self.build(gateway, ExtensionKind::Mqtt, configuration)?))
    }
}

pub fn scripted_manager(log: &CallLog) -> TenantManager {
    TenantManager::new(
        Arc::new(ScriptedGateways { log: log.clone() }),
        ExtensionFactory::new(Arc::new(ScriptedExtensions { log: log.clone() })),
    )
}

/// Tenant whose gateway fails the given operations
pub fn tenant_failing(label: &str, ops: &[&str]) -> TenantConfig {
    let mut tenant = TenantConfig::new(label);
    tenant.gateway = json!({ "fail": ops });
    tenant
}

/// Extension payload with a journal name and scripted failures
pub fn ext(name: &str, ops: &[&str]) -> Value {
    json!({ "name": name, "fail": ops })
}

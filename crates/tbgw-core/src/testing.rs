//! Test doubles for gateways and extensions
//!
//! [`MockGateway`] and [`MockExtension`] record every lifecycle call into a
//! shared [`CallLog`], so tests can assert on cross-component ordering
//! (e.g. "extensions destroyed before their gateway"). Failures are
//! scripted per operation.
//!
//! ```ignore
//! use tbgw_core::testing::{CallLog, MockGateway};
//!
//! let log = CallLog::new();
//! let gateway = MockGateway::new("acme", log.clone()).fail_initialize();
//! assert!(gateway.initialize().await.is_err());
//! assert_eq!(log.entries(), vec!["acme/gateway.initialize"]);
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{ServiceError, ServiceResult};
use crate::extension::{ExtensionKind, ExtensionService, HttpExtension};
use crate::gateway::GatewayService;
use crate::lifecycle::ServiceState;

/// Shared, ordered journal of calls made on test doubles
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    /// Snapshot of all entries, oldest first
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Entries that start with `prefix`
    pub fn entries_for(&self, prefix: &str) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Number of times `entry` was recorded
    pub fn count(&self, entry: &str) -> usize {
        self.entries.lock().iter().filter(|e| *e == entry).count()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Which operations of a double should fail
#[derive(Debug, Clone, Copy, Default)]
struct Failures {
    initialize: bool,
    destroy: bool,
    process: bool,
}

/// Recording gateway. Journal entries are `"<label>/gateway.<op>"`.
#[derive(Debug)]
pub struct MockGateway {
    label: String,
    log: CallLog,
    failures: Failures,
    state: Mutex<ServiceState>,
}

impl MockGateway {
    pub fn new(label: impl Into<String>, log: CallLog) -> Self {
        Self {
            label: label.into(),
            log,
            failures: Failures::default(),
            state: Mutex::new(ServiceState::Uninitialized),
        }
    }

    pub fn fail_initialize(mut self) -> Self {
        self.failures.initialize = true;
        self
    }

    pub fn fail_destroy(mut self) -> Self {
        self.failures.destroy = true;
        self
    }

    pub fn state(&self) -> ServiceState {
        *self.state.lock()
    }

    fn name(&self, op: &str) -> String {
        format!("{}/gateway.{}", self.label, op)
    }
}

#[async_trait]
impl GatewayService for MockGateway {
    fn tenant_label(&self) -> &str {
        &self.label
    }

    async fn initialize(&self) -> ServiceResult<()> {
        self.log.record(self.name("initialize"));
        if self.failures.initialize {
            return Err(ServiceError::Connection(format!(
                "{}: platform unreachable",
                self.label
            )));
        }
        *self.state.lock() = ServiceState::Running;
        Ok(())
    }

    async fn destroy(&self) -> ServiceResult<()> {
        self.log.record(self.name("destroy"));
        *self.state.lock() = ServiceState::Destroyed;
        if self.failures.destroy {
            return Err(ServiceError::Internal(format!(
                "{}: session did not close cleanly",
                self.label
            )));
        }
        Ok(())
    }
}

/// Recording extension of any kind. Journal entries are `"<name>.<op>"`.
///
/// Implements [`HttpExtension`] regardless of kind; only HTTP-tagged
/// handles ever reach `process_request` through the supervisor.
#[derive(Debug)]
pub struct MockExtension {
    name: String,
    kind: ExtensionKind,
    log: CallLog,
    failures: Failures,
    state: Mutex<ServiceState>,
    requests: Mutex<Vec<(String, String, String)>>,
}

impl MockExtension {
    pub fn new(name: impl Into<String>, kind: ExtensionKind, log: CallLog) -> Self {
        Self {
            name: name.into(),
            kind,
            log,
            failures: Failures::default(),
            state: Mutex::new(ServiceState::Uninitialized),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_initialize(mut self) -> Self {
        self.failures.initialize = true;
        self
    }

    pub fn fail_destroy(mut self) -> Self {
        self.failures.destroy = true;
        self
    }

    pub fn fail_process(mut self) -> Self {
        self.failures.process = true;
        self
    }

    pub fn state(&self) -> ServiceState {
        *self.state.lock()
    }

    /// Requests received so far as `(converter_id, token, body)`
    pub fn requests(&self) -> Vec<(String, String, String)> {
        self.requests.lock().clone()
    }

    fn op(&self, op: &str) -> String {
        format!("{}.{}", self.name, op)
    }
}

#[async_trait]
impl ExtensionService for MockExtension {
    fn kind(&self) -> ExtensionKind {
        self.kind
    }

    async fn initialize(&self) -> ServiceResult<()> {
        self.log.record(self.op("initialize"));
        if self.failures.initialize {
            return Err(ServiceError::InvalidConfig(format!(
                "{}: scripted initialize failure",
                self.name
            )));
        }
        *self.state.lock() = ServiceState::Running;
        Ok(())
    }

    async fn destroy(&self) -> ServiceResult<()> {
        self.log.record(self.op("destroy"));
        *self.state.lock() = ServiceState::Destroyed;
        if self.failures.destroy {
            return Err(ServiceError::Internal(format!(
                "{}: scripted destroy failure",
                self.name
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl HttpExtension for MockExtension {
    async fn process_request(
        &self,
        converter_id: &str,
        token: &str,
        body: &str,
    ) -> ServiceResult<()> {
        self.log.record(self.op("process_request"));
        self.requests
            .lock()
            .push((converter_id.to_string(), token.to_string(), body.to_string()));
        if self.failures.process {
            return Err(ServiceError::Rejected(format!(
                "{}: converter {} refused the payload",
                self.name, converter_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn gateway_records_calls_and_state() {
        let log = CallLog::new();
        let gateway = MockGateway::new("acme", log.clone());

        gateway.initialize().await.unwrap();
        assert_eq!(gateway.state(), ServiceState::Running);
        gateway.destroy().await.unwrap();
        assert_eq!(gateway.state(), ServiceState::Destroyed);

        assert_eq!(
            log.entries(),
            vec!["acme/gateway.initialize", "acme/gateway.destroy"]
        );
    }

    #[tokio::test]
    async fn scripted_failures_leave_state_untouched_on_init() {
        let log = CallLog::new();
        let ext = MockExtension::new("acme/opc", ExtensionKind::Opc, log.clone()).fail_initialize();

        assert!(ext.initialize().await.is_err());
        assert_eq!(ext.state(), ServiceState::Uninitialized);
        assert_eq!(log.count("acme/opc.initialize"), 1);
    }

    #[tokio::test]
    async fn requests_are_captured() {
        let log = CallLog::new();
        let ext = MockExtension::new("acme/http", ExtensionKind::Http, log.clone());

        ext.process_request("conv-1", "token", "{}").await.unwrap();

        assert_eq!(
            ext.requests(),
            vec![("conv-1".to_string(), "token".to_string(), "{}".to_string())]
        );
        assert_eq!(log.entries_for("acme/http"), vec!["acme/http.process_request"]);
    }
}

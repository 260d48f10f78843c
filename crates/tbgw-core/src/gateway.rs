//! GatewayService trait - the tenant's link to the backend platform

use async_trait::async_trait;

use crate::error::ServiceResult;

/// A tenant-scoped gateway instance.
///
/// Each tenant gets exactly one gateway, which owns the tenant's transport
/// connection to the platform (e.g. an MQTT session). Extensions bound to
/// the gateway push device data through it.
///
/// The supervisor calls [`initialize`](GatewayService::initialize) once
/// after construction and [`destroy`](GatewayService::destroy) at most once
/// afterwards, including when initialization failed.
#[async_trait]
pub trait GatewayService: Send + Sync {
    /// Label of the tenant this gateway belongs to
    fn tenant_label(&self) -> &str;

    /// Open the platform connection and start background work
    async fn initialize(&self) -> ServiceResult<()>;

    /// Release the connection and all resources.
    ///
    /// Must tolerate being called after a failed `initialize`.
    async fn destroy(&self) -> ServiceResult<()>;
}

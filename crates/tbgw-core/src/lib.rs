//! tbgw-core - Core traits and types for the tenant gateway supervisor
//!
//! This crate defines the contracts between the supervisor and the
//! components it manages: one [`GatewayService`] per tenant, bridging to
//! the backend platform, and any number of protocol extensions
//! ([`ExtensionService`]) bound to that gateway.
//!
//! Concrete transports and extension implementations live outside this
//! crate; the supervisor only drives their lifecycle.

pub mod config;
pub mod error;
pub mod extension;
pub mod gateway;
pub mod lifecycle;
pub mod testing;

pub use config::{ConfigError, ConfigIssue, ExtensionConfig, GatewayConfig, TenantConfig};
pub use error::{ServiceError, ServiceResult, TenantError, TenantResult};
pub use extension::{Extension, ExtensionKind, ExtensionService, HttpExtension};
pub use gateway::GatewayService;
pub use lifecycle::ServiceState;

//! tbgw-supervisor - Multi-tenant gateway supervisor
//!
//! The [`TenantManager`] builds one gateway per configured tenant, binds
//! the tenant's extensions to it, and owns the resulting
//! [`TenantRegistry`] entries until shutdown.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                        TenantManager                           │
//! │  - init(): build + initialize each tenant, contain failures    │
//! │  - process_request(): fan out to every HTTP extension          │
//! │  - stop(): best-effort teardown of every tenant                │
//! └──────────────┬──────────────────────────────┬──────────────────┘
//!                │                              │
//!                ▼                              ▼
//!  ┌───────────────────────────┐  ┌───────────────────────────┐
//!  │ TenantRegistry "acme"     │  │ TenantRegistry "globex"   │
//!  │  gateway                  │  │  gateway                  │
//!  │  [http, file, opc]        │  │  [mqtt]                   │
//!  └───────────────────────────┘  └───────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use tbgw_supervisor::{ExtensionFactory, TenantManager};
//!
//! let factory = ExtensionFactory::new(Arc::new(MyExtensions));
//! let mut manager = TenantManager::new(Arc::new(MyGateways), factory);
//!
//! manager.init(&config.tenants).await;
//! manager.process_request("sensors", token, &body).await?;
//! let report = manager.stop().await;
//! ```

mod cleanup;
mod factory;
mod manager;
mod registry;

pub use cleanup::{teardown, CleanupReport};
pub use factory::{ExtensionFactory, ExtensionProvider, GatewayProvider};
pub use manager::TenantManager;
pub use registry::TenantRegistry;

// Re-export core types for convenience
pub use tbgw_core::{
    Extension, ExtensionKind, GatewayService, ServiceState, TenantConfig, TenantError,
    TenantResult,
};

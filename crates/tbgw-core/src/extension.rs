//! Extension contracts and the tagged extension handle
//!
//! Extensions are protocol adapters (file tailing, OPC-UA polling, MQTT
//! subscription, HTTP ingestion) that feed a tenant's gateway. Every
//! extension shares the [`ExtensionService`] lifecycle; HTTP extensions
//! additionally accept pushed requests through [`HttpExtension`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ServiceResult, TenantError};

/// Supported extension types, as declared by the `type` tag in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionKind {
    /// Tails a local file and converts appended lines
    File,
    /// Polls an OPC-UA server
    Opc,
    /// Accepts requests pushed over HTTP
    Http,
    /// Subscribes to an external MQTT broker
    Mqtt,
}

impl ExtensionKind {
    pub const ALL: [ExtensionKind; 4] = [
        ExtensionKind::File,
        ExtensionKind::Opc,
        ExtensionKind::Http,
        ExtensionKind::Mqtt,
    ];

    /// Configuration tag for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtensionKind::File => "file",
            ExtensionKind::Opc => "opc",
            ExtensionKind::Http => "http",
            ExtensionKind::Mqtt => "mqtt",
        }
    }
}

impl std::fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExtensionKind {
    type Err = TenantError;

    /// Tags are matched exactly; `"HTTP"` is not `"http"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExtensionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| TenantError::UnsupportedExtension {
                tag: s.to_string(),
                tenant: None,
            })
    }
}

/// Lifecycle contract shared by all extensions
#[async_trait]
pub trait ExtensionService: Send + Sync {
    /// Which kind of extension this is
    fn kind(&self) -> ExtensionKind;

    /// Acquire resources and start producing data
    async fn initialize(&self) -> ServiceResult<()>;

    /// Stop and release resources. Must tolerate a failed or skipped `initialize`.
    async fn destroy(&self) -> ServiceResult<()>;
}

/// An extension that accepts requests delivered by an external HTTP layer.
///
/// `process_request` may be called concurrently from several request
/// handlers. Implementations are responsible for their own locking and for
/// deciding whether a request (token, converter) concerns them at all.
#[async_trait]
pub trait HttpExtension: ExtensionService {
    async fn process_request(&self, converter_id: &str, token: &str, body: &str)
        -> ServiceResult<()>;
}

/// Handle to a constructed extension, tagged by kind.
///
/// HTTP extensions keep their richer interface so the supervisor can fan
/// requests out to them without downcasting.
#[derive(Clone)]
pub enum Extension {
    File(Arc<dyn ExtensionService>),
    Opc(Arc<dyn ExtensionService>),
    Http(Arc<dyn HttpExtension>),
    Mqtt(Arc<dyn ExtensionService>),
}

impl Extension {
    pub fn kind(&self) -> ExtensionKind {
        match self {
            Extension::File(_) => ExtensionKind::File,
            Extension::Opc(_) => ExtensionKind::Opc,
            Extension::Http(_) => ExtensionKind::Http,
            Extension::Mqtt(_) => ExtensionKind::Mqtt,
        }
    }

    /// The HTTP interface, if this is an HTTP extension
    pub fn as_http(&self) -> Option<&Arc<dyn HttpExtension>> {
        match self {
            Extension::Http(http) => Some(http),
            _ => None,
        }
    }

    pub async fn initialize(&self) -> ServiceResult<()> {
        match self {
            Extension::File(svc) | Extension::Opc(svc) | Extension::Mqtt(svc) => {
                svc.initialize().await
            }
            Extension::Http(http) => http.initialize().await,
        }
    }

    pub async fn destroy(&self) -> ServiceResult<()> {
        match self {
            Extension::File(svc) | Extension::Opc(svc) | Extension::Mqtt(svc) => {
                svc.destroy().await
            }
            Extension::Http(http) => http.destroy().await,
        }
    }
}

impl std::fmt::Debug for Extension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Extension").field(&self.kind()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CallLog, MockExtension};

    #[test]
    fn parses_known_tags() {
        assert_eq!("file".parse::<ExtensionKind>().unwrap(), ExtensionKind::File);
        assert_eq!("opc".parse::<ExtensionKind>().unwrap(), ExtensionKind::Opc);
        assert_eq!("http".parse::<ExtensionKind>().unwrap(), ExtensionKind::Http);
        assert_eq!("mqtt".parse::<ExtensionKind>().unwrap(), ExtensionKind::Mqtt);
    }

    #[test]
    fn rejects_unknown_and_miscased_tags() {
        for tag in ["ftp", "HTTP", "", " http"] {
            match tag.parse::<ExtensionKind>() {
                Err(TenantError::UnsupportedExtension { tag: t, tenant }) => {
                    assert_eq!(t, tag);
                    assert_eq!(tenant, None);
                }
                other => panic!("expected unsupported extension for {:?}, got {:?}", tag, other),
            }
        }
    }

    #[test]
    fn kind_serializes_as_tag() {
        let json = serde_json::to_string(&ExtensionKind::Opc).unwrap();
        assert_eq!(json, "\"opc\"");
    }

    #[tokio::test]
    async fn handle_exposes_http_interface_only_for_http() {
        let log = CallLog::new();
        let http = Arc::new(MockExtension::new("t/http", ExtensionKind::Http, log.clone()));
        let mqtt = Arc::new(MockExtension::new("t/mqtt", ExtensionKind::Mqtt, log.clone()));

        let http = Extension::Http(http);
        let mqtt = Extension::Mqtt(mqtt);

        assert_eq!(http.kind(), ExtensionKind::Http);
        assert!(http.as_http().is_some());
        assert!(mqtt.as_http().is_none());

        mqtt.initialize().await.unwrap();
        assert_eq!(log.entries(), vec!["t/mqtt.initialize"]);
    }
}

//! Gateway configuration model
//!
//! Tenants and their extensions as declared in the gateway config file.
//! Transport and extension settings are kept as opaque JSON values; only
//! the matching implementation interprets them.
//!
//! ```toml
//! [[tenants]]
//! label = "acme"
//! gateway = { host = "platform.local", port = 1883, access_token = "..." }
//!
//! [[tenants.extensions]]
//! type = "http"
//! configuration = { converters = ["sensors"] }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extension::ExtensionKind;

/// Errors from reading or parsing a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported config format: {0} (expected .toml, .yaml, .yml or .json)")]
    UnsupportedFormat(String),
}

/// Top-level gateway configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Tenants in start-up order
    #[serde(default)]
    pub tenants: Vec<TenantConfig>,
}

/// One tenant: a gateway plus its extensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Unique tenant label
    pub label: String,
    /// Transport settings for the tenant's gateway (opaque)
    #[serde(default)]
    pub gateway: serde_json::Value,
    /// Extensions in declaration order
    #[serde(default)]
    pub extensions: Vec<ExtensionConfig>,
}

/// One extension entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionConfig {
    /// Extension type tag (`file`, `opc`, `http`, `mqtt`)
    #[serde(rename = "type")]
    pub extension_type: String,
    /// Implementation-specific settings (opaque)
    #[serde(default)]
    pub configuration: serde_json::Value,
}

/// Problem found by [`GatewayConfig::validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    EmptyLabel { index: usize },
    DuplicateLabel { label: String },
    UnknownExtensionType { label: String, tag: String },
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigIssue::EmptyLabel { index } => write!(f, "tenant #{} has an empty label", index),
            ConfigIssue::DuplicateLabel { label } => {
                write!(f, "[{}] label is declared more than once", label)
            }
            ConfigIssue::UnknownExtensionType { label, tag } => {
                write!(f, "[{}] extension type '{}' is not supported", label, tag)
            }
        }
    }
}

impl TenantConfig {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            gateway: serde_json::Value::Null,
            extensions: Vec::new(),
        }
    }

    /// Builder-style helper to append an extension entry
    pub fn with_extension(
        mut self,
        extension_type: impl Into<String>,
        configuration: serde_json::Value,
    ) -> Self {
        self.extensions.push(ExtensionConfig {
            extension_type: extension_type.into(),
            configuration,
        });
        self
    }
}

impl GatewayConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load configuration from a file, picking the format by extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let parse: fn(&str) -> Result<Self, ConfigError> = match ext.as_str() {
            "toml" => Self::from_toml_str,
            "yaml" | "yml" => Self::from_yaml_str,
            "json" => Self::from_json_str,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config = parse(&content)?;
        tracing::debug!(
            path = %path.display(),
            tenants = config.tenants.len(),
            "Loaded gateway configuration"
        );
        Ok(config)
    }

    /// Check the configuration for problems that will make tenants fail at
    /// start-up. Nothing is rejected here; the supervisor still contains
    /// each failure to its own tenant.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();

        for (index, tenant) in self.tenants.iter().enumerate() {
            if tenant.label.trim().is_empty() {
                issues.push(ConfigIssue::EmptyLabel { index });
            } else if !seen.insert(tenant.label.as_str()) {
                issues.push(ConfigIssue::DuplicateLabel {
                    label: tenant.label.clone(),
                });
            }

            for ext in &tenant.extensions {
                if ext.extension_type.parse::<ExtensionKind>().is_err() {
                    issues.push(ConfigIssue::UnknownExtensionType {
                        label: tenant.label.clone(),
                        tag: ext.extension_type.clone(),
                    });
                }
            }
        }

        issues
    }
}

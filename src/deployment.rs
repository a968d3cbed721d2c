//! Deployment configuration model.
//!
//! The orchestrator treats this as read-only input: built-in checks resolve
//! the URLs and flags they need from it, and anything they don't know about
//! lands in [`DeploymentConfig::extra`] for custom checks.
//!
//! Field names accept the legacy CloudFront/S3/API Gateway spellings as
//! aliases. The nested `backend.lambda_config` and `database.dynamodb`
//! sections are read too, and merged with their flat counterparts.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Build-time variable that turns on frontend debug mode.
const DEBUG_MODE_KEY: &str = "VITE_DEBUG_MODE";
/// Runtime variable holding the backend log level.
const LOG_LEVEL_KEY: &str = "LOG_LEVEL";
/// Runtime variable holding the backend CORS origin policy.
const CORS_ORIGINS_KEY: &str = "CORS_ORIGINS";

/// Configuration of one deployed environment.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Environment name: development, staging, production, ...
    pub environment: String,
    /// Cloud region, used to build storage-website endpoints.
    #[serde(default, alias = "aws_region")]
    pub region: Option<String>,
    #[serde(default)]
    pub frontend: FrontendConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Check-specific fields the orchestrator does not interpret.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Explicit public URL (custom domain). Takes precedence over the CDN
    /// and storage endpoints.
    #[serde(default)]
    pub url: Option<String>,
    /// CDN domain name (served over HTTPS).
    #[serde(default, alias = "cloudfront_domain")]
    pub cdn_domain: Option<String>,
    #[serde(default, alias = "cloudfront_distribution_id")]
    pub cdn_distribution_id: Option<String>,
    /// Static-website storage bucket (served over plain HTTP).
    #[serde(default, alias = "s3_bucket")]
    pub storage_bucket: Option<String>,
    /// Build-time environment baked into the frontend bundle.
    #[serde(default)]
    pub build_env: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Public API base URL, possibly including a `/v1...` stage path.
    #[serde(default, alias = "api_gateway_url")]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_gateway_id: Option<String>,
    /// Runtime environment of the API functions.
    #[serde(default)]
    pub environment_variables: BTreeMap<String, String>,
    /// Function runtime section. Its variables apply when the flat map
    /// does not set the same key.
    #[serde(default, alias = "lambda_config")]
    pub runtime: RuntimeConfig,
}

impl BackendConfig {
    /// Runtime variable from the flat map, else from the runtime section.
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.environment_variables
            .get(key)
            .or_else(|| self.runtime.environment_variables.get(key))
            .map(String::as_str)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub environment_variables: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub tables: Vec<String>,
    #[serde(default, alias = "dynamodb")]
    pub store: TableStore,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TableStore {
    #[serde(default)]
    pub tables: Vec<String>,
}

impl DatabaseConfig {
    /// Flat tables followed by any store tables not already listed.
    pub fn table_names(&self) -> Vec<String> {
        let mut names = self.tables.clone();
        for table in &self.store.tables {
            if !names.contains(table) {
                names.push(table.clone());
            }
        }
        names
    }
}

impl DeploymentConfig {
    /// Create a minimal configuration for an environment.
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            ..Default::default()
        }
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
            path: path.display().to_string(),
            error,
        })?;
        Self::from_json_str(&contents).map_err(|error| ConfigError::Json {
            path: path.display().to_string(),
            error,
        })
    }

    /// Reject configurations no check can meaningfully run against.
    pub fn validate(&self) -> Result<(), String> {
        if self.environment.trim().is_empty() {
            return Err("deployment configuration has no environment".to_string());
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Public frontend URL: the explicit URL, else the CDN domain, else the
    /// storage website.
    pub fn frontend_url(&self) -> Option<String> {
        if let Some(url) = non_empty(&self.frontend.url) {
            return Some(url.trim_end_matches('/').to_string());
        }
        if let Some(domain) = non_empty(&self.frontend.cdn_domain) {
            return Some(format!("https://{}", domain));
        }
        if let Some(bucket) = non_empty(&self.frontend.storage_bucket) {
            let region = non_empty(&self.region).unwrap_or("us-east-1");
            return Some(format!(
                "http://{}.s3-website-{}.amazonaws.com",
                bucket, region
            ));
        }
        None
    }

    /// API base URL with any `/v1...` stage path removed.
    pub fn api_base_url(&self) -> Option<String> {
        let url = non_empty(&self.backend.api_url)?;
        // Only the path may carry the stage; hosts like v1.example.com stay intact
        let authority_start = url.find("://").map(|i| i + 3).unwrap_or(0);
        let path_start = url[authority_start..]
            .find('/')
            .map(|i| authority_start + i)
            .unwrap_or(url.len());
        let base = match url[path_start..].find("/v1") {
            Some(idx) => &url[..path_start + idx],
            None => url,
        };
        Some(base.trim_end_matches('/').to_string())
    }

    /// `<api base>/health`.
    pub fn api_health_url(&self) -> Option<String> {
        self.api_base_url().map(|base| format!("{}/health", base))
    }

    /// Every endpoint served over HTTPS, for certificate checks.
    pub fn https_endpoints(&self) -> Vec<String> {
        let mut urls = Vec::new();
        if let Some(frontend) = self.frontend_url() {
            if frontend.starts_with("https://") {
                urls.push(frontend);
            }
        }
        if let Some(api) = non_empty(&self.backend.api_url) {
            if api.starts_with("https://") {
                urls.push(api.to_string());
            }
        }
        urls
    }

    /// Whether any frontend hosting is configured.
    pub fn has_frontend(&self) -> bool {
        non_empty(&self.frontend.url).is_some()
            || non_empty(&self.frontend.cdn_distribution_id).is_some()
            || non_empty(&self.frontend.storage_bucket).is_some()
    }

    pub fn debug_mode(&self) -> bool {
        self.frontend
            .build_env
            .get(DEBUG_MODE_KEY)
            .is_some_and(|v| v == "true")
    }

    pub fn log_level(&self) -> Option<&str> {
        self.backend.env_var(LOG_LEVEL_KEY)
    }

    pub fn cors_origins(&self) -> Option<&str> {
        self.backend.env_var(CORS_ORIGINS_KEY)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

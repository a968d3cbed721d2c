//! Check registry.
//!
//! Populated once at startup, then shared read-only (behind an `Arc`) with
//! every orchestration run.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::check::HealthCheck;
use super::RegistryError;
use crate::config::OrchestratorConfig;

/// Default category for checks registered without one.
pub const DEFAULT_CATEGORY: &str = "custom";

/// Per-registration policy. Unset fields inherit registry defaults.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub timeout: Option<Duration>,
    pub retry_count: Option<u32>,
    /// Defaults to critical.
    pub critical: Option<bool>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl CheckOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retry_count(mut self, attempts: u32) -> Self {
        self.retry_count = Some(attempts);
        self
    }

    pub fn critical(mut self, critical: bool) -> Self {
        self.critical = Some(critical);
        self
    }

    pub fn non_critical(self) -> Self {
        self.critical(false)
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A registered check and its execution policy.
#[derive(Clone)]
pub struct CheckDefinition {
    pub name: String,
    pub check: Arc<dyn HealthCheck>,
    pub timeout: Duration,
    /// Maximum attempts (never zero).
    pub retry_count: u32,
    pub critical: bool,
    pub category: String,
    pub description: String,
}

impl fmt::Debug for CheckDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckDefinition")
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .field("retry_count", &self.retry_count)
            .field("critical", &self.critical)
            .field("category", &self.category)
            .finish()
    }
}

/// Named collection of checks.
pub struct CheckRegistry {
    checks: HashMap<String, CheckDefinition>,
    default_timeout: Duration,
    default_retry_count: u32,
}

impl CheckRegistry {
    /// Create an empty registry whose defaults come from the orchestrator config.
    pub fn new(config: &OrchestratorConfig) -> Self {
        Self {
            checks: HashMap::new(),
            default_timeout: config.default_timeout,
            default_retry_count: config.default_retry_count.max(1),
        }
    }

    /// Register a check under a new name.
    ///
    /// Fails if the name is taken; use [`CheckRegistry::replace`] to overwrite.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        check: impl HealthCheck + 'static,
        options: CheckOptions,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.checks.contains_key(&name) {
            return Err(RegistryError::Duplicate { name });
        }
        let definition = self.build(name, Arc::new(check), options)?;
        self.checks.insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Register a check, overwriting any existing one with the same name.
    ///
    /// Returns the definition that was replaced.
    pub fn replace(
        &mut self,
        name: impl Into<String>,
        check: impl HealthCheck + 'static,
        options: CheckOptions,
    ) -> Result<Option<CheckDefinition>, RegistryError> {
        let definition = self.build(name.into(), Arc::new(check), options)?;
        tracing::debug!(check = %definition.name, "replacing health check");
        Ok(self.checks.insert(definition.name.clone(), definition))
    }

    fn build(
        &self,
        name: String,
        check: Arc<dyn HealthCheck>,
        options: CheckOptions,
    ) -> Result<CheckDefinition, RegistryError> {
        let retry_count = options.retry_count.unwrap_or(self.default_retry_count);
        if retry_count == 0 {
            return Err(RegistryError::ZeroRetries { name });
        }

        Ok(CheckDefinition {
            timeout: options.timeout.unwrap_or(self.default_timeout),
            retry_count,
            critical: options.critical.unwrap_or(true),
            category: options
                .category
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            description: options
                .description
                .unwrap_or_else(|| format!("Health check: {}", name)),
            check,
            name,
        })
    }

    /// All checks, critical first, then by name.
    ///
    /// This is the canonical execution order for sequential runs and the
    /// canonical log order for every run.
    pub fn get_all(&self) -> Vec<&CheckDefinition> {
        let mut checks: Vec<_> = self.checks.values().collect();
        checks.sort_by(|a, b| {
            b.critical
                .cmp(&a.critical)
                .then_with(|| a.name.cmp(&b.name))
        });
        checks
    }

    pub fn get(&self, name: &str) -> Option<&CheckDefinition> {
        self.checks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Position of a check in canonical order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.get_all().iter().position(|c| c.name == name)
    }
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::new(&OrchestratorConfig::default())
    }
}

impl fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckRegistry")
            .field("checks", &self.get_all())
            .field("default_timeout", &self.default_timeout)
            .field("default_retry_count", &self.default_retry_count)
            .finish()
    }
}

//! Engine settings with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Settings file (TOML), if given
//! 3. Environment variables: `CLKTREE_*` prefix

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::errors::SettingsError;

/// How the forwarding primitive treats a child whose `notify` fails.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum NotifyPolicy {
    /// Stop at the first failing child and report it as `Rejected`.
    #[default]
    ShortCircuit,
    /// Log the failure and keep notifying the remaining children.
    BestEffort,
}

impl NotifyPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            NotifyPolicy::ShortCircuit => "short-circuit",
            NotifyPolicy::BestEffort => "best-effort",
        }
    }
}

/// Tunables of the query/configure engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct EngineSettings {
    /// Child failure handling during notify fan-out
    pub notify_policy: NotifyPolicy,
    /// Fan-out nesting limit; 0 means "number of registered nodes"
    pub max_depth: usize,
}

fn config_err(e: ConfigError) -> SettingsError {
    SettingsError::Config {
        message: e.to_string(),
    }
}

impl EngineSettings {
    /// Effective fan-out nesting limit for a registry of `nodes` clocks.
    pub fn depth_limit(&self, nodes: usize) -> usize {
        if self.max_depth == 0 {
            nodes.max(1)
        } else {
            self.max_depth
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `path` - Optional settings file; it must exist when given
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("notify_policy", defaults.notify_policy.as_str())
            .map_err(config_err)?
            .set_default("max_depth", defaults.max_depth as u64)
            .map_err(config_err)?;

        if let Some(path) = path {
            if !path.exists() {
                return Err(SettingsError::Config {
                    message: format!("settings file not found: {}", path.display()),
                });
            }
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("CLKTREE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;
        config.try_deserialize().map_err(config_err)
    }
}

//! Process-wide scheduler defaults (ambient config layer).
//!
//! Individual handles are always free to pass their own `sync_notify`/
//! `concur_notify` flags to [`crate::handle::ScheduledFuture::schedule`];
//! this module only supplies the defaults an embedder wants applied when it
//! does not want every call site to repeat them, loaded the same way the
//! rest of the corpus loads configuration: a typed struct, `serde`-derived,
//! fed through the `config` crate so TOML/JSON/YAML files and
//! `CHRONOFUTURE_`-prefixed environment variables all work without writing
//! a bespoke parser.

use config::{Config as RawConfig, ConfigError as RawConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Process-wide defaults for handles that don't specify their own
/// notification policy or worker-pool sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Default `sync_notify` passed to `ScheduledFuture::schedule` when a
    /// call site doesn't override it.
    pub default_sync_notify: bool,

    /// Default `concur_notify` passed to `ScheduledFuture::schedule` when a
    /// call site doesn't override it.
    pub default_concur_notify: bool,

    /// Worker threads the built-in `LocalWorkerPool` is sized for.
    /// Informational only — `LocalWorkerPool` spawns onto the ambient
    /// Tokio runtime rather than owning a dedicated pool, so this exists
    /// for embedders that size their own runtime's worker threads from it.
    pub worker_pool_threads: usize,

    /// `tracing` level the built-in collaborators (`builtin::Local*`) log
    /// their internal diagnostics at.
    pub log_level: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            default_sync_notify: false,
            default_concur_notify: false,
            worker_pool_threads: 4,
            log_level: "info".to_string(),
        }
    }
}

impl SchedulerConfig {
    /// Load from a single file (format inferred from its extension by the
    /// `config` crate) layered over the compiled-in defaults, then
    /// overridden by any `CHRONOFUTURE_*` environment variable (e.g.
    /// `CHRONOFUTURE_LOG_LEVEL=debug`).
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, RawConfigError> {
        let defaults = Self::default();
        let raw = RawConfig::builder()
            .set_default("default_sync_notify", defaults.default_sync_notify)?
            .set_default("default_concur_notify", defaults.default_concur_notify)?
            .set_default("worker_pool_threads", defaults.worker_pool_threads as i64)?
            .set_default("log_level", defaults.log_level)?
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("CHRONOFUTURE"))
            .build()?;
        raw.try_deserialize()
    }

    /// Load from environment variables only (`CHRONOFUTURE_*`), layered
    /// over the compiled-in defaults. Useful for embedders that don't ship
    /// a config file at all.
    pub fn load_from_env() -> Result<Self, RawConfigError> {
        let defaults = Self::default();
        let raw = RawConfig::builder()
            .set_default("default_sync_notify", defaults.default_sync_notify)?
            .set_default("default_concur_notify", defaults.default_concur_notify)?
            .set_default("worker_pool_threads", defaults.worker_pool_threads as i64)?
            .set_default("log_level", defaults.log_level)?
            .add_source(Environment::with_prefix("CHRONOFUTURE"))
            .build()?;
        raw.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_values() {
        let cfg = SchedulerConfig::default();
        assert!(!cfg.default_sync_notify);
        assert!(!cfg.default_concur_notify);
        assert_eq!(cfg.worker_pool_threads, 4);
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn env_override_wins_over_compiled_in_default() {
        std::env::set_var("CHRONOFUTURE_LOG_LEVEL", "trace");
        std::env::set_var("CHRONOFUTURE_WORKER_POOL_THREADS", "16");
        let cfg = SchedulerConfig::load_from_env().expect("env-only config should load");
        assert_eq!(cfg.log_level, "trace");
        assert_eq!(cfg.worker_pool_threads, 16);
        std::env::remove_var("CHRONOFUTURE_LOG_LEVEL");
        std::env::remove_var("CHRONOFUTURE_WORKER_POOL_THREADS");
    }

    #[test]
    fn serializes_round_trip_through_json() {
        let cfg = SchedulerConfig {
            default_sync_notify: true,
            default_concur_notify: true,
            worker_pool_threads: 8,
            log_level: "warn".to_string(),
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SchedulerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}

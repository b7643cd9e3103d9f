use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::RwLock;

pub const MIN_DEBOUNCE_MS: u64 = 0;
pub const MAX_DEBOUNCE_MS: u64 = 5_000;
pub const MIN_BATCH_SIZE: usize = 1;
pub const MAX_BATCH_SIZE: usize = 16;
pub const MIN_BATCH_TIMEOUT_MS: u64 = 50;
pub const MAX_BATCH_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub source_lang: String,
    pub target_lang: String,
    pub debounce_ms: u64,
    pub batch_size: usize,
    pub batch_timeout_ms: u64,
    pub sync_display_mode: bool,
    pub interim_debounce_enabled: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            source_lang: "en".to_string(),
            target_lang: "zh".to_string(),
            debounce_ms: 500,
            batch_size: 3,
            batch_timeout_ms: 500,
            sync_display_mode: false,
            interim_debounce_enabled: true,
        }
    }
}

impl RuntimeConfig {
    /// Loads launch-time configuration from `TRANSLATE_*` environment
    /// variables, falling back to the documented defaults for anything
    /// unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            source_lang: std::env::var("TRANSLATE_SOURCE_LANG").unwrap_or(defaults.source_lang),
            target_lang: std::env::var("TRANSLATE_TARGET_LANG").unwrap_or(defaults.target_lang),
            debounce_ms: env_u64("TRANSLATE_DEBOUNCE_MS").unwrap_or(defaults.debounce_ms),
            batch_size: env_usize("TRANSLATE_BATCH_SIZE").unwrap_or(defaults.batch_size),
            batch_timeout_ms: env_u64("TRANSLATE_BATCH_TIMEOUT_MS")
                .unwrap_or(defaults.batch_timeout_ms),
            sync_display_mode: env_bool("TRANSLATE_SYNC_DISPLAY_MODE")
                .unwrap_or(defaults.sync_display_mode),
            interim_debounce_enabled: env_bool("TRANSLATE_INTERIM_DEBOUNCE_ENABLED")
                .unwrap_or(defaults.interim_debounce_enabled),
        }
        .clamped()
    }

    fn clamped(mut self) -> Self {
        self.debounce_ms = self.debounce_ms.clamp(MIN_DEBOUNCE_MS, MAX_DEBOUNCE_MS);
        self.batch_size = self.batch_size.clamp(MIN_BATCH_SIZE, MAX_BATCH_SIZE);
        self.batch_timeout_ms = self
            .batch_timeout_ms
            .clamp(MIN_BATCH_TIMEOUT_MS, MAX_BATCH_TIMEOUT_MS);
        self
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// The `update_translation_config` RPC payload; every field optional so a
/// caller can patch a single setting without restating the rest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigUpdate {
    pub source: Option<String>,
    pub target: Option<String>,
    pub debounce: Option<u64>,
    pub batch_size: Option<usize>,
    pub batch_timeout_ms: Option<u64>,
    pub sync_display_mode: Option<bool>,
    pub interim_debounce_enabled: Option<bool>,
}

/// Shared, lock-guarded `RuntimeConfig`, read by C3/C4 on every event and
/// mutated atomically by the config RPC — mirrors the settings plugin's
/// single `RwLock`-around-a-document pattern.
#[derive(Debug, Clone)]
pub struct ConfigHandle {
    inner: Arc<RwLock<RuntimeConfig>>,
}

impl ConfigHandle {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    pub async fn snapshot(&self) -> RuntimeConfig {
        self.inner.read().await.clone()
    }

    /// Applies a partial update, clamping out-of-range numeric fields, and
    /// returns `"ok"` — this RPC never fails; invalid ranges are corrected
    /// rather than rejected, per the config-update contract.
    pub async fn update_translation_config(&self, update: ConfigUpdate) -> String {
        let mut cfg = self.inner.write().await;
        if let Some(source) = update.source {
            cfg.source_lang = source;
        }
        if let Some(target) = update.target {
            cfg.target_lang = target;
        }
        if let Some(debounce) = update.debounce {
            cfg.debounce_ms = debounce.clamp(MIN_DEBOUNCE_MS, MAX_DEBOUNCE_MS);
        }
        if let Some(batch_size) = update.batch_size {
            cfg.batch_size = batch_size.clamp(MIN_BATCH_SIZE, MAX_BATCH_SIZE);
        }
        if let Some(batch_timeout_ms) = update.batch_timeout_ms {
            cfg.batch_timeout_ms = batch_timeout_ms.clamp(MIN_BATCH_TIMEOUT_MS, MAX_BATCH_TIMEOUT_MS);
        }
        if let Some(sync_display_mode) = update.sync_display_mode {
            cfg.sync_display_mode = sync_display_mode;
        }
        if let Some(interim_debounce_enabled) = update.interim_debounce_enabled {
            cfg.interim_debounce_enabled = interim_debounce_enabled;
        }
        "ok".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn defaults_match_spec() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.source_lang, "en");
        assert_eq!(cfg.target_lang, "zh");
        assert_eq!(cfg.debounce_ms, 500);
        assert_eq!(cfg.batch_size, 3);
        assert_eq!(cfg.batch_timeout_ms, 500);
        assert!(!cfg.sync_display_mode);
        assert!(cfg.interim_debounce_enabled);
    }

    #[tokio::test]
    async fn update_clamps_out_of_range_values() {
        let handle = ConfigHandle::new(RuntimeConfig::default());
        let result = handle
            .update_translation_config(ConfigUpdate {
                debounce: Some(999_999),
                batch_size: Some(0),
                batch_timeout_ms: Some(1),
                ..Default::default()
            })
            .await;
        assert_eq!(result, "ok");

        let cfg = handle.snapshot().await;
        assert_eq!(cfg.debounce_ms, MAX_DEBOUNCE_MS);
        assert_eq!(cfg.batch_size, MIN_BATCH_SIZE);
        assert_eq!(cfg.batch_timeout_ms, MIN_BATCH_TIMEOUT_MS);
    }

    #[tokio::test]
    async fn partial_update_leaves_other_fields_untouched() {
        let handle = ConfigHandle::new(RuntimeConfig::default());
        handle
            .update_translation_config(ConfigUpdate {
                target: Some("ja".to_string()),
                ..Default::default()
            })
            .await;

        let cfg = handle.snapshot().await;
        assert_eq!(cfg.target_lang, "ja");
        assert_eq!(cfg.source_lang, "en");
        assert_eq!(cfg.batch_size, 3);
    }
}

//! Tenant resolution and persisted selection
//!
//! The notification channel and the poller are both scoped to one
//! tenant/store id. Resolution precedence: explicit in-memory selection,
//! then the `store` launch query parameter, then the persisted selection
//! from the last session. The resolver re-resolves on every use so a
//! selection change always takes effect on the next connection attempt.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::{ClientError, ClientResult};

/// Persisted client state surviving restarts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedConfig {
    /// Last selected tenant/store id
    pub tenant_id: Option<String>,
    /// Auth token
    pub token: Option<String>,
}

impl PersistedConfig {
    /// Load the config from a file, falling back to defaults when absent
    pub fn load(path: &Path) -> ClientResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| ClientError::Config(e.to_string()))?;
            serde_json::from_str(&content).map_err(|e| ClientError::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save the config to a file
    pub fn save(&self, path: &Path) -> ClientResult<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ClientError::Config(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ClientError::Config(e.to_string()))
    }
}

struct ResolverState {
    /// Explicit in-memory selection (highest precedence)
    selected: Option<String>,
    persisted: PersistedConfig,
}

/// Resolves the active tenant/store id for the synchronization components
pub struct TenantResolver {
    state: RwLock<ResolverState>,
    /// `store` query parameter captured at launch, if any
    launch_param: Option<String>,
    config_path: Option<PathBuf>,
    generation_tx: watch::Sender<u64>,
}

impl TenantResolver {
    /// Create a resolver without persistence (in-memory only)
    pub fn new(launch_param: Option<String>) -> Self {
        let (generation_tx, _) = watch::channel(0);
        Self {
            state: RwLock::new(ResolverState {
                selected: None,
                persisted: PersistedConfig::default(),
            }),
            launch_param,
            config_path: None,
            generation_tx,
        }
    }

    /// Create a resolver backed by a persisted config file
    pub fn with_config_path(
        launch_param: Option<String>,
        config_path: impl Into<PathBuf>,
    ) -> ClientResult<Self> {
        let config_path = config_path.into();
        let persisted = PersistedConfig::load(&config_path)?;
        let (generation_tx, _) = watch::channel(0);
        Ok(Self {
            state: RwLock::new(ResolverState {
                selected: None,
                persisted,
            }),
            launch_param,
            config_path: Some(config_path),
            generation_tx,
        })
    }

    /// Resolve the active tenant id, if any
    pub fn resolve(&self) -> Option<String> {
        let state = self.state.read().expect("resolver lock poisoned");
        state
            .selected
            .clone()
            .or_else(|| self.launch_param.clone())
            .or_else(|| state.persisted.tenant_id.clone())
    }

    /// Current auth token, if any
    pub fn token(&self) -> Option<String> {
        let state = self.state.read().expect("resolver lock poisoned");
        state.persisted.token.clone()
    }

    /// Select a tenant explicitly; persists and bumps the change generation
    pub fn select(&self, tenant_id: impl Into<String>) -> ClientResult<()> {
        let tenant_id = tenant_id.into();
        {
            let mut state = self.state.write().expect("resolver lock poisoned");
            state.selected = Some(tenant_id.clone());
            state.persisted.tenant_id = Some(tenant_id.clone());
            if let Some(path) = &self.config_path {
                state.persisted.save(path)?;
            }
        }
        tracing::info!(tenant_id = %tenant_id, "Tenant selected");
        self.generation_tx.send_modify(|g| *g += 1);
        Ok(())
    }

    /// Store the auth token alongside the selection
    pub fn set_token(&self, token: impl Into<String>) -> ClientResult<()> {
        let mut state = self.state.write().expect("resolver lock poisoned");
        state.persisted.token = Some(token.into());
        if let Some(path) = &self.config_path {
            state.persisted.save(path)?;
        }
        Ok(())
    }

    /// Subscribe to selection changes
    ///
    /// The channel watches this to tear down and re-establish its stream
    /// whenever the resolved tenant changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolution_precedence() {
        let resolver = TenantResolver::new(Some("from-query".to_string()));
        assert_eq!(resolver.resolve().as_deref(), Some("from-query"));

        resolver.select("explicit").unwrap();
        assert_eq!(resolver.resolve().as_deref(), Some("explicit"));
    }

    #[test]
    fn test_no_tenant_resolves_to_none() {
        let resolver = TenantResolver::new(None);
        assert!(resolver.resolve().is_none());
    }

    #[test]
    fn test_persisted_selection_survives_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let resolver = TenantResolver::with_config_path(None, &path).unwrap();
        resolver.select("tenant-7").unwrap();
        resolver.set_token("tok-7").unwrap();
        drop(resolver);

        let reloaded = TenantResolver::with_config_path(None, &path).unwrap();
        assert_eq!(reloaded.resolve().as_deref(), Some("tenant-7"));
        assert_eq!(reloaded.token().as_deref(), Some("tok-7"));
    }

    #[test]
    fn test_launch_param_beats_persisted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        PersistedConfig {
            tenant_id: Some("old".to_string()),
            token: None,
        }
        .save(&path)
        .unwrap();

        let resolver =
            TenantResolver::with_config_path(Some("query-param".to_string()), &path).unwrap();
        assert_eq!(resolver.resolve().as_deref(), Some("query-param"));
    }

    #[test]
    fn test_select_bumps_generation() {
        let resolver = TenantResolver::new(None);
        let rx = resolver.subscribe();
        let before = *rx.borrow();
        resolver.select("t1").unwrap();
        assert_eq!(*rx.borrow(), before + 1);
    }
}

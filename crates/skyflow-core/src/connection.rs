//! Connection lifecycle and caching.
//!
//! A [`ClientCache`] maps a normalized [`ClientConfig`] to one long-lived
//! handle. The first caller for a key builds the handle; structurally equal
//! configs afterwards receive the very same `Arc`. Builds are single-flight:
//! concurrent callers for one key await one pending build instead of opening
//! duplicate handshakes.
//!
//! The cache is an explicit process-scoped value passed to commands, not a
//! module-level singleton, so tests can run against isolated instances.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::debug;

/// Identifies a connection target. Structural equality; cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientConfig {
    pub region: Option<String>,
    pub profile: Option<String>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Normalized form used as the cache key: values trimmed, empty → None.
    pub fn normalized(&self) -> Self {
        fn scrub(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        }
        Self {
            region: scrub(&self.region),
            profile: scrub(&self.profile),
        }
    }
}

/// Builds one live client handle for a connection target.
///
/// A build failure (no resolvable credentials or region) must surface as a
/// `Configuration` error.
#[async_trait]
pub trait Connect: Send + Sync {
    type Handle: Send + Sync + 'static;

    async fn connect(&self, config: &ClientConfig) -> Result<Self::Handle>;
}

/// Process-scoped cache of built handles, keyed by normalized config.
///
/// Handles live for the rest of the process once built; there is no TTL, so
/// a handle may go stale if external credentials rotate. A failed build is
/// not cached — the next caller for that key starts a fresh build.
pub struct ClientCache<C: Connect> {
    connector: C,
    entries: Mutex<HashMap<ClientConfig, Arc<OnceCell<Arc<C::Handle>>>>>,
}

impl<C: Connect> ClientCache<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the handle for `config`, building it on first use.
    ///
    /// The map lock is held only to look up the per-key cell; the build
    /// itself runs outside it, so one slow handshake never blocks lookups
    /// for other keys.
    pub async fn get(&self, config: &ClientConfig) -> Result<Arc<C::Handle>> {
        let key = config.normalized();
        let cell = {
            let mut entries = self.entries.lock().expect("client cache lock poisoned");
            Arc::clone(entries.entry(key.clone()).or_default())
        };

        if let Some(handle) = cell.get() {
            return Ok(Arc::clone(handle));
        }

        let handle = cell
            .get_or_try_init(|| async {
                debug!(region = ?key.region, profile = ?key.profile, "building client handle");
                self.connector.connect(&key).await.map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(handle))
    }

    /// Number of keys with a completed build.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .expect("client cache lock poisoned")
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

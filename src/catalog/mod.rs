//! Remote catalog access with time-bounded read-through caching.
//!
//! [`CatalogClient`] answers "what can I install" questions against the
//! store's JSON endpoints (`index.json`, `featured.json`,
//! `apps/{id}/metadata.json`). Every fetch goes through a read-through
//! cache with a stale-serve fallback:
//!
//! 1. A cached copy younger than the endpoint's max-age is served without
//!    any network call.
//! 2. Otherwise a live fetch is attempted; on success the document is
//!    persisted and returned.
//! 3. On fetch failure the cached copy — however old — is served instead,
//!    because a stale listing beats no listing.
//! 4. Only when the fetch fails *and* no cached copy exists does the
//!    network error propagate.
//!
//! Searching is a pure in-memory operation over an already-fetched
//! registry; see [`search`].

pub mod cache;

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::constants::{APP_METADATA_MAX_AGE, REGISTRY_MAX_AGE};
use crate::core::{KioskError, Result};
use crate::models::AppDescriptor;
use cache::CacheStore;

/// Client for the remote store catalog.
///
/// Cheap to construct; holds a reqwest client configured with the engine's
/// per-request timeouts, plus a [`CacheStore`] rooted in the scratch cache
/// directory.
pub struct CatalogClient {
    config: StoreConfig,
    client: reqwest::Client,
    store: CacheStore,
}

impl CatalogClient {
    /// Build a catalog client for the given configuration.
    ///
    /// # Errors
    ///
    /// Fails only when the HTTP client cannot be constructed.
    pub fn new(config: StoreConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()
            .map_err(|e| KioskError::Network {
                url: config.store_url.clone(),
                status: None,
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        let store = CacheStore::new(&config.cache_dir);
        Ok(Self {
            config,
            client,
            store,
        })
    }

    /// Fetch all apps in the store registry.
    pub async fn fetch_registry(&self) -> Result<Vec<AppDescriptor>> {
        let doc = self
            .get_cached(&self.config.registry_url(), "index.json", REGISTRY_MAX_AGE)
            .await?;
        Ok(serde_json::from_value(doc)?)
    }

    /// Fetch the curated featured-apps list.
    pub async fn fetch_featured(&self) -> Result<Vec<AppDescriptor>> {
        let doc = self
            .get_cached(
                &self.config.featured_url(),
                "featured.json",
                REGISTRY_MAX_AGE,
            )
            .await?;
        Ok(serde_json::from_value(doc)?)
    }

    /// Fetch one app's metadata document.
    ///
    /// Uses a shorter max-age than the registry: per-app metadata is what
    /// changes right after a release.
    pub async fn fetch_app(&self, id: &str) -> Result<AppDescriptor> {
        crate::models::validate_app_id(id)?;
        let doc = self
            .get_cached(
                &self.config.app_metadata_url(id),
                &format!("{id}.json"),
                APP_METADATA_MAX_AGE,
            )
            .await?;
        Ok(serde_json::from_value(doc)?)
    }

    /// Read-through fetch of a JSON document with stale-serve fallback.
    ///
    /// See the module docs for the full policy. Exposed so embedding shells
    /// can cache additional store documents with the same semantics.
    pub async fn get_cached(&self, url: &str, key: &str, max_age: Duration) -> Result<Value> {
        if self.store.is_fresh(key, max_age) {
            if let Some(doc) = self.store.load(key) {
                debug!("serving fresh cache entry '{key}'");
                return Ok(doc);
            }
        }

        match self.fetch_json(url).await {
            Ok(doc) => {
                if let Err(err) = self.store.store(key, &doc) {
                    // A cache that cannot persist still serves: the caller
                    // gets the live document either way.
                    warn!("failed to persist cache entry '{key}': {err}");
                }
                Ok(doc)
            }
            Err(err) => match self.store.load(key) {
                Some(stale) => {
                    warn!("serving stale cache entry '{key}' after fetch failure: {err}");
                    Ok(stale)
                }
                None => Err(err),
            },
        }
    }

    async fn fetch_json(&self, url: &str) -> Result<Value> {
        debug!("fetching catalog document {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| KioskError::network(url, &e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(KioskError::Network {
                url: url.to_string(),
                status: Some(status.as_u16()),
                reason: status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            });
        }
        response.json().await.map_err(|e| KioskError::network(url, &e))
    }
}

/// Case-insensitive substring search across name, description, and tags.
///
/// Pure and in-memory: callers fetch the registry once and filter as the
/// user types.
#[must_use]
pub fn search<'a>(registry: &'a [AppDescriptor], query: &str) -> Vec<&'a AppDescriptor> {
    let needle = query.to_lowercase();
    registry
        .iter()
        .filter(|app| {
            app.name.to_lowercase().contains(&needle)
                || app.description.to_lowercase().contains(&needle)
                || app
                    .tags
                    .iter()
                    .any(|tag| tag.to_lowercase().contains(&needle))
        })
        .collect()
}

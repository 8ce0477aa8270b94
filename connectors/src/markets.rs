use common::{models::Markets, Error, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Lazily populated market metadata.
///
/// The lock is never held across the load, so two tasks racing on first access
/// may both fetch; the second write replaces the first with equivalent data.
#[derive(Debug, Default)]
pub struct MarketCache {
    inner: RwLock<Option<Arc<Markets>>>,
}

impl MarketCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached markets, if a non-empty set has been loaded.
    pub async fn cached(&self) -> Option<Arc<Markets>> {
        self.inner
            .read()
            .await
            .as_ref()
            .filter(|markets| !markets.is_empty())
            .cloned()
    }

    /// Return the cached markets, running `load` first if nothing usable is cached.
    /// Load failures surface as `MarketInitialization`.
    pub async fn get_or_load<F, Fut>(&self, load: F) -> Result<Arc<Markets>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Markets>>,
    {
        if let Some(markets) = self.cached().await {
            return Ok(markets);
        }

        let markets = Arc::new(load().await.map_err(|e| Error::market_init(e))?);
        *self.inner.write().await = Some(Arc::clone(&markets));
        Ok(markets)
    }
}

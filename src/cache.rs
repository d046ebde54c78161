//! Per-session memoization of feed fetches.
//!
//! Each [`QueryWindow`] is fetched at most once until it is invalidated, so
//! re-rendering or re-selecting never repeats the network call. Failures are
//! remembered too; a reload invalidates the window to try again.

use crate::api::FeedClient;
use crate::error::FeedError;
use crate::models::{FeedResponse, QueryWindow};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Outcome of a fetch, shareable across the event loop.
pub type CachedFetch = Result<Arc<FeedResponse>, Arc<FeedError>>;

pub struct FeedCache<C> {
    client: C,
    entries: HashMap<QueryWindow, CachedFetch>,
}

impl<C: FeedClient> FeedCache<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            entries: HashMap::new(),
        }
    }

    /// Returns the memoized outcome for `window`, calling the client on a miss.
    pub async fn fetch(&mut self, window: QueryWindow) -> CachedFetch {
        if let Some(hit) = self.entries.get(&window) {
            debug!("Feed cache hit for {}", window);
            return hit.clone();
        }

        debug!("Feed cache miss for {}", window);
        let outcome = self
            .client
            .fetch(&window)
            .await
            .map(Arc::new)
            .map_err(Arc::new);
        self.entries.insert(window, outcome.clone());
        outcome
    }

    /// Forgets `window` so the next fetch goes to the client again.
    pub fn invalidate(&mut self, window: &QueryWindow) -> bool {
        self.entries.remove(window).is_some()
    }

    pub fn contains(&self, window: &QueryWindow) -> bool {
        self.entries.contains_key(window)
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

//! Background worker that owns the feed cache for one session.
//!
//! The UI never talks to the network directly. It sends [`FeedCommand`]s and
//! gets [`Event::FeedLoaded`] back on the event channel.

use crate::api::FeedClient;
use crate::cache::FeedCache;
use crate::events::Event;
use crate::models::QueryWindow;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedCommand {
    /// Fetch `window`, answering from the cache when possible.
    Load(QueryWindow),
    /// Drop any cached outcome for `window`, then fetch it.
    Reload(QueryWindow),
}

/// Handle to a running session worker.
pub struct Session {
    pub commands: mpsc::UnboundedSender<FeedCommand>,
    pub task: JoinHandle<()>,
}

/// Spawns the worker. It runs until every command sender is dropped or the
/// event receiver goes away.
pub fn spawn<C>(client: C, events: mpsc::UnboundedSender<Event>) -> Session
where
    C: FeedClient + 'static,
{
    let (commands, mut rx) = mpsc::unbounded_channel();

    let task = tokio::spawn(async move {
        let mut cache = FeedCache::new(client);

        while let Some(command) = rx.recv().await {
            let window = match command {
                FeedCommand::Load(window) => window,
                FeedCommand::Reload(window) => {
                    if cache.invalidate(&window) {
                        info!("Reloading feed for {}", window);
                    }
                    window
                }
            };

            let outcome = cache.fetch(window).await;
            if let Err(e) = &outcome {
                warn!("Feed unavailable: {}", e);
            }

            let event = Event::FeedLoaded {
                window,
                outcome,
                timestamp: Instant::now(),
            };
            if events.send(event).is_err() {
                break;
            }
        }
    });

    Session { commands, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::models::FeedResponse;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedCounter(Arc<AtomicUsize>);

    #[async_trait]
    impl FeedClient for SharedCounter {
        async fn fetch(&self, _window: &QueryWindow) -> Result<FeedResponse, FeedError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(FeedResponse::default())
        }
    }

    async fn next_loaded(rx: &mut mpsc::UnboundedReceiver<Event>) -> QueryWindow {
        match rx.recv().await {
            Some(Event::FeedLoaded { window, outcome, .. }) => {
                assert!(outcome.is_ok());
                window
            }
            other => panic!("expected FeedLoaded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn load_uses_cache_and_reload_bypasses_it() {
        let counter = SharedCounter::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let session = spawn(counter.clone(), tx);
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let window = QueryWindow::starting_on(start, 7).unwrap();

        session.commands.send(FeedCommand::Load(window)).unwrap();
        assert_eq!(next_loaded(&mut rx).await, window);
        session.commands.send(FeedCommand::Load(window)).unwrap();
        assert_eq!(next_loaded(&mut rx).await, window);
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);

        session.commands.send(FeedCommand::Reload(window)).unwrap();
        assert_eq!(next_loaded(&mut rx).await, window);
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);

        drop(session.commands);
        session.task.await.unwrap();
    }
}

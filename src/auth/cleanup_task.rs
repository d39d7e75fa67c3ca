use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, instrument};

use super::revocation::InMemoryRevocationStore;

/// Starts the background task that drops expired in-memory revocation entries
#[instrument(skip(store))]
pub async fn start_revocation_sweep(store: Arc<InMemoryRevocationStore>, every: Duration) {
    info!(
        sweep_interval_secs = every.as_secs(),
        "Starting revocation sweep background task"
    );

    let mut sweep_interval = interval(every);

    loop {
        sweep_interval.tick().await;
        sweep_once(&store);
    }
}

/// Runs a single sweep, returning how many entries were removed
pub fn sweep_once(store: &InMemoryRevocationStore) -> usize {
    let removed = store.evict_expired();
    if removed > 0 {
        info!(removed, remaining = store.len(), "Expired revocations swept");
    } else {
        debug!(remaining = store.len(), "Revocation sweep found nothing to remove");
    }
    removed
}

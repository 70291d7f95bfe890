use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::domain::order::{CustomerId, OrderSession};
use crate::metrics::Metrics;

// ============================================================================
// Session Registry
// ============================================================================
//
// Process-wide map of customer -> session. Each session sits behind its own
// async mutex so events from one customer serialize while other customers
// proceed in parallel. The outer map lock is only held to look up or insert
// an entry, never while a session is being worked on.
//
// Sessions are volatile; a restart forgets every dialog in progress.
//
// ============================================================================

pub type SessionHandle = Arc<Mutex<OrderSession>>;

struct Entry {
    session: SessionHandle,
    last_seen: Instant,
}

#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<CustomerId, Entry>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing session for the customer, or a fresh one in the initial state
    pub async fn get_or_create(&self, customer_id: CustomerId) -> SessionHandle {
        let mut sessions = self.sessions.lock().await;
        let entry = sessions.entry(customer_id).or_insert_with(|| {
            tracing::debug!(customer_id = %customer_id, "Creating order session");
            Entry {
                session: Arc::new(Mutex::new(OrderSession::new(customer_id))),
                last_seen: Instant::now(),
            }
        });
        entry.last_seen = Instant::now();
        entry.session.clone()
    }

    /// Put the customer's dialog back to its initial state, keeping the entry
    pub async fn reset(&self, customer_id: CustomerId) {
        let handle = self.get_or_create(customer_id).await;
        handle.lock().await.reset();
        tracing::debug!(customer_id = %customer_id, "Order session reset");
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop sessions untouched for longer than `ttl`.
    ///
    /// A session still referenced by an in-flight event, or currently locked,
    /// is kept regardless of age.
    pub async fn reap_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();

        sessions.retain(|customer_id, entry| {
            let idle = entry.last_seen.elapsed() > ttl;
            let unused = Arc::strong_count(&entry.session) == 1 && entry.session.try_lock().is_ok();
            let evict = idle && unused;
            if evict {
                tracing::debug!(customer_id = %customer_id, "Evicting idle order session");
            }
            !evict
        });

        before - sessions.len()
    }
}

/// Periodically evict idle sessions until the returned task is aborted
pub fn spawn_reaper(
    registry: Arc<SessionRegistry>,
    ttl: Duration,
    every: Duration,
    metrics: Option<Arc<Metrics>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;

            let evicted = registry.reap_idle(ttl).await;
            let remaining = registry.len().await;

            if let Some(ref metrics) = metrics {
                metrics.record_sessions_evicted(evicted);
                metrics.set_active_sessions(remaining);
            }

            if evicted > 0 {
                tracing::info!(evicted = evicted, remaining = remaining, "Reaped idle order sessions");
            }
        }
    })
}

// ============================================================================
// Store Status
// ============================================================================

/// Open/closed flag shared by every entry check, flipped only by the operator
#[derive(Debug, Default)]
pub struct StoreStatus {
    open: AtomicBool,
}

impl StoreStatus {
    pub fn new(open: bool) -> Self {
        Self { open: AtomicBool::new(open) }
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    pub fn set_open(&self, open: bool) {
        let was_open = self.open.swap(open, Ordering::AcqRel);
        if was_open != open {
            tracing::info!(open = open, "Store status changed");
        }
    }
}

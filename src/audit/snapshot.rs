//! Pending pre-mutation snapshots
//!
//! The pre-mutation hook stores the prior state of a record here and hands
//! back a [`SnapshotToken`]; the post-mutation hook redeems that token to get
//! the state back. Tokens are not `Clone`, and redeeming one consumes it, so
//! each pending snapshot is read and removed at most once.
//!
//! Every capture gets its own sequence number. Two in-flight mutations of the
//! same `(kind, id)` therefore hold distinct tokens and cannot overwrite each
//! other's snapshot. A token that is never redeemed (the mutation failed or
//! the process crashed mid-way) leaves its entry behind until the cache is
//! dropped; the entry is only advisory and lives in memory.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tracing::{debug, warn};

use super::value::Snapshot;
use crate::models::{EntityKind, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SnapshotKey {
    kind: EntityKind,
    id: RecordId,
    seq: u64,
}

/// Claim on one pending snapshot
#[derive(Debug, PartialEq, Eq)]
pub struct SnapshotToken(SnapshotKey);

impl SnapshotToken {
    pub fn kind(&self) -> EntityKind {
        self.0.kind
    }

    pub fn id(&self) -> RecordId {
        self.0.id
    }
}

/// In-memory store of pending snapshots
#[derive(Debug, Default)]
pub struct SnapshotCache {
    next_seq: AtomicU64,
    pending: Mutex<HashMap<SnapshotKey, Snapshot>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a snapshot, returning the token that redeems it
    ///
    /// Returns `None` if the cache lock is poisoned; the caller then proceeds
    /// as if no prior state had been captured.
    pub fn capture(
        &self,
        kind: EntityKind,
        id: RecordId,
        snapshot: Snapshot,
    ) -> Option<SnapshotToken> {
        let key = SnapshotKey {
            kind,
            id,
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
        };

        let mut pending = match self.pending.lock() {
            Ok(pending) => pending,
            Err(e) => {
                warn!(%kind, id, error = %e, "Snapshot cache unavailable; skipping capture");
                return None;
            }
        };

        pending.insert(key, snapshot);
        debug!(%kind, id, seq = key.seq, "Captured pre-mutation snapshot");
        Some(SnapshotToken(key))
    }

    /// Remove and return the snapshot a token refers to
    pub fn take(&self, token: SnapshotToken) -> Option<Snapshot> {
        let key = token.0;
        let mut pending = match self.pending.lock() {
            Ok(pending) => pending,
            Err(e) => {
                warn!(kind = %key.kind, id = key.id, error = %e, "Snapshot cache unavailable");
                return None;
            }
        };

        let snapshot = pending.remove(&key);
        debug!(
            kind = %key.kind,
            id = key.id,
            seq = key.seq,
            found = snapshot.is_some(),
            "Consumed pre-mutation snapshot"
        );
        snapshot
    }

    /// Number of snapshots captured but not yet redeemed
    pub fn pending(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Snapshot {
        Snapshot::new().field("name", name)
    }

    #[test]
    fn test_capture_and_take() {
        let cache = SnapshotCache::new();
        let token = cache.capture(EntityKind::Bill, 1, named("Rent")).unwrap();

        assert_eq!(token.kind(), EntityKind::Bill);
        assert_eq!(token.id(), 1);
        assert_eq!(cache.pending(), 1);

        assert_eq!(cache.take(token), Some(named("Rent")));
        assert_eq!(cache.pending(), 0);
    }

    #[test]
    fn test_distinct_entities_do_not_collide() {
        let cache = SnapshotCache::new();
        let bill = cache.capture(EntityKind::Bill, 1, named("Rent")).unwrap();
        let category = cache.capture(EntityKind::Category, 1, named("Housing")).unwrap();
        let other_bill = cache.capture(EntityKind::Bill, 2, named("Power")).unwrap();

        assert_eq!(cache.take(other_bill), Some(named("Power")));
        assert_eq!(cache.take(category), Some(named("Housing")));
        assert_eq!(cache.take(bill), Some(named("Rent")));
    }

    #[test]
    fn test_same_record_in_flight_twice() {
        let cache = SnapshotCache::new();
        let first = cache.capture(EntityKind::Bill, 7, named("before A")).unwrap();
        let second = cache.capture(EntityKind::Bill, 7, named("before B")).unwrap();

        assert_ne!(first, second);
        assert_eq!(cache.take(second), Some(named("before B")));
        assert_eq!(cache.take(first), Some(named("before A")));
    }

    #[test]
    fn test_concurrent_captures() {
        let cache = SnapshotCache::new();

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let cache = &cache;
                    s.spawn(move || {
                        let token = cache
                            .capture(EntityKind::DueBill, i, named(&format!("due {}", i)))
                            .unwrap();
                        cache.take(token)
                    })
                })
                .collect();

            for (i, handle) in handles.into_iter().enumerate() {
                assert_eq!(handle.join().unwrap(), Some(named(&format!("due {}", i))));
            }
        });

        assert_eq!(cache.pending(), 0);
    }
}

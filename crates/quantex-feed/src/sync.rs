/*
[INPUT]:  Decoded depth payloads, keyed by channel kind and instrument
[OUTPUT]: Ordered loadSnapshot/update calls against the external book store
[POS]:    State layer - per-instrument snapshot-before-delta enforcement
[UPDATE]: When depth channel variants or reset semantics change
*/

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::Result;
use crate::types::{AssetClass, ChannelKind, InstrumentKey, Level};

/// External order-book store seam. The store owns level-merge semantics
/// and consistency checks; this module only decides when to call which.
pub trait BookStore: Send + Sync {
    /// Full replacement of both sides for one instrument
    fn load_snapshot(
        &self,
        instrument: &InstrumentKey,
        asset: AssetClass,
        bids: &[Level],
        asks: &[Level],
    ) -> Result<()>;

    /// Incremental per-level upsert/remove against an installed snapshot
    fn update(
        &self,
        instrument: &InstrumentKey,
        asset: AssetClass,
        bids: &[Level],
        asks: &[Level],
    ) -> Result<()>;
}

/// Sync state is tracked per `(channel kind, instrument)` so a book-ticker
/// feed and a depth feed for the same instrument never share state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyncKey {
    pub channel: ChannelKind,
    pub instrument: InstrumentKey,
}

impl SyncKey {
    pub fn new(channel: ChannelKind, instrument: InstrumentKey) -> Self {
        Self {
            channel,
            instrument,
        }
    }
}

/// Registry of instruments that already received their snapshot.
///
/// The critical section is the set lookup/insert only; decode and store
/// calls happen outside the lock. A reconnect replaces the registry
/// instance wholesale rather than clearing entries one by one.
#[derive(Debug, Default)]
pub struct SyncRegistry {
    synced: Mutex<HashSet<SyncKey>>,
}

impl SyncRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the key was already synced, marking it if not
    pub fn check_and_mark_synced(&self, key: &SyncKey) -> bool {
        let mut synced = self.synced.lock();
        if synced.contains(key) {
            true
        } else {
            synced.insert(key.clone());
            false
        }
    }

    /// Roll back a mark after a failed snapshot install
    pub fn clear(&self, key: &SyncKey) {
        self.synced.lock().remove(key);
    }

    pub fn is_synced(&self, key: &SyncKey) -> bool {
        self.synced.lock().contains(key)
    }
}

/// Routes each decoded depth payload to `load_snapshot` or `update`.
///
/// State machine per key: Unsynced -> Synced, one-way; the only way back
/// is `reset`, which discards the whole registry.
pub struct BookSynchronizer {
    store: Arc<dyn BookStore>,
    registry: RwLock<Arc<SyncRegistry>>,
}

impl BookSynchronizer {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self {
            store,
            registry: RwLock::new(Arc::new(SyncRegistry::new())),
        }
    }

    /// Apply one fully-decoded book payload. Returns whether it was
    /// installed as the snapshot for its key.
    ///
    /// Callers must decode the frame completely before calling; a decode
    /// failure therefore never leaves a key marked synced.
    pub fn apply(
        &self,
        channel: ChannelKind,
        instrument: &InstrumentKey,
        asset: AssetClass,
        bids: &[Level],
        asks: &[Level],
    ) -> Result<bool> {
        let registry = self.registry.read().clone();
        let key = SyncKey::new(channel, instrument.clone());
        if registry.check_and_mark_synced(&key) {
            self.store.update(instrument, asset, bids, asks)?;
            Ok(false)
        } else {
            if let Err(err) = self.store.load_snapshot(instrument, asset, bids, asks) {
                registry.clear(&key);
                return Err(err);
            }
            Ok(true)
        }
    }

    /// Hard reset on reconnect: every instrument goes back to Unsynced
    pub fn reset(&self) {
        *self.registry.write() = Arc::new(SyncRegistry::new());
    }
}

//! Observable, persisted owner of the visitor's itinerary.
//!
//! The store is created once and handed to every surface that needs it
//! (catalog, drawer, checkout). Each surface either calls the mutation methods
//! or holds a `watch::Receiver` from [`ItineraryStore::subscribe`] and re-renders
//! when it changes. Every state-changing mutation also writes a snapshot to the
//! configured [`SnapshotStorage`]; write failures are logged and otherwise ignored.

use std::sync::Arc;

use jonco_common::{ExperienceInput, Itinerary};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::snapshot_storage::SnapshotStorage;

/// Storage key of the persisted snapshot.
pub const ITINERARY_STORAGE_KEY: &str = "jonco-itinerary-storage";

/// Snapshot layout version. Snapshots with another version are discarded.
pub const SNAPSHOT_VERSION: u32 = 0;

/// `state` deserializes through `ItineraryParts`, so a tampered snapshot
/// still yields a valid itinerary.
#[derive(Serialize, Deserialize)]
struct PersistedSnapshot<S> {
    state: S,
    version: u32,
}

/// Serialize an itinerary into the persisted snapshot format.
pub fn encode_snapshot(itinerary: &Itinerary) -> Result<String, serde_json::Error> {
    serde_json::to_string(&PersistedSnapshot {
        state: itinerary,
        version: SNAPSHOT_VERSION,
    })
}

/// Parse a persisted snapshot. Returns None for corrupt or foreign-version data.
pub fn decode_snapshot(raw: &str) -> Option<Itinerary> {
    let snapshot: PersistedSnapshot<Itinerary> = match serde_json::from_str(raw) {
        Ok(s) => s,
        Err(e) => {
            warn!("Discarding unreadable itinerary snapshot: {e}");
            return None;
        }
    };
    if snapshot.version != SNAPSHOT_VERSION {
        warn!(
            "Discarding itinerary snapshot with version {} (expected {})",
            snapshot.version, SNAPSHOT_VERSION
        );
        return None;
    }
    Some(snapshot.state)
}

pub struct ItineraryStore {
    state: watch::Sender<Itinerary>,
    storage: Arc<dyn SnapshotStorage>,
}

impl ItineraryStore {
    /// Rehydrate from storage, or start empty if there is nothing usable there.
    pub fn load(storage: Arc<dyn SnapshotStorage>) -> Self {
        let initial = match storage.get_item(ITINERARY_STORAGE_KEY) {
            Ok(Some(raw)) => decode_snapshot(&raw).unwrap_or_default(),
            Ok(None) => Itinerary::new(),
            Err(e) => {
                warn!("Failed to read itinerary snapshot: {e}");
                Itinerary::new()
            }
        };
        debug!("Itinerary loaded with {} items", initial.items().len());

        Self {
            state: watch::Sender::new(initial),
            storage,
        }
    }

    /// Receiver that observes every change made through this store.
    pub fn subscribe(&self) -> watch::Receiver<Itinerary> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> Itinerary {
        self.state.borrow().clone()
    }

    pub fn toggle_itinerary(&self, force: Option<bool>) {
        self.commit(|it| {
            let before = it.is_open();
            it.toggle(force);
            before != it.is_open()
        });
    }

    pub fn add_experience(&self, experience: ExperienceInput) {
        self.commit(|it| {
            it.add_experience(experience);
            true
        });
    }

    pub fn remove_experience(&self, id: &str) {
        self.commit(|it| it.remove_experience(id));
    }

    pub fn update_quantity(&self, id: &str, delta: i64) {
        self.commit(|it| it.update_quantity(id, delta));
    }

    pub fn total_price(&self) -> f64 {
        self.state.borrow().total_price()
    }

    pub fn item_count(&self) -> u64 {
        self.state.borrow().item_count()
    }

    /// Apply a mutation; notify subscribers and persist only if it changed state.
    fn commit(&self, mutate: impl FnOnce(&mut Itinerary) -> bool) {
        let changed = self.state.send_if_modified(mutate);
        if changed {
            self.persist();
        }
    }

    fn persist(&self) {
        let encoded = match encode_snapshot(&self.state.borrow()) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to encode itinerary snapshot: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.set_item(ITINERARY_STORAGE_KEY, &encoded) {
            warn!("Failed to persist itinerary snapshot: {e}");
        }
    }
}

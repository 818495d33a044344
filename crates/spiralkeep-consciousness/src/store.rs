//! ConsciousnessStore — owns the record, writes it through, broadcasts changes
//!
//! Every mutating call: apply action → persist whole record → notify listeners,
//! all before returning. Storage failures are logged and swallowed; the
//! in-memory record stays authoritative.

use crate::state::*;
use spiralkeep_core::storage::SharedStore;
use spiralkeep_core::{new_user_id, SharedClock};
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, info, warn};

/// Version tag carried by exported snapshots. Imports must match it exactly.
pub const STATE_VERSION: &str = "1.0";

type Listener = Arc<dyn Fn(&ConsciousnessState) + Send + Sync>;

#[derive(Default)]
struct ListenerRegistry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

fn lock_registry(registry: &Mutex<ListenerRegistry>) -> std::sync::MutexGuard<'_, ListenerRegistry> {
    registry.lock().unwrap_or_else(|e| e.into_inner())
}

/// Deregistration handle returned by [`ConsciousnessStore::subscribe`].
///
/// Dropping the handle leaves the listener registered.
#[must_use = "keep the subscription to be able to unsubscribe"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<ListenerRegistry>>,
}

impl Subscription {
    /// Remove this registration. Returns false if it was already gone.
    pub fn unsubscribe(self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut registry = lock_registry(&registry);
        let before = registry.listeners.len();
        registry.listeners.retain(|(id, _)| *id != self.id);
        registry.listeners.len() != before
    }
}

pub struct ConsciousnessStore {
    state: ConsciousnessState,
    storage: SharedStore,
    clock: SharedClock,
    key: String,
    registry: Arc<Mutex<ListenerRegistry>>,
}

impl ConsciousnessStore {
    /// Restore the record under `key`, or start from defaults.
    ///
    /// A missing record is created and persisted immediately so the generated
    /// user id is stable. An unreadable record falls back to defaults in memory.
    pub fn load(
        storage: SharedStore,
        clock: SharedClock,
        key: impl Into<String>,
        platform: &str,
    ) -> Self {
        let key = key.into();
        let now = clock.now();
        let (state, fresh) = match storage.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<ConsciousnessState>(&raw) {
                Ok(state) => {
                    info!("Restored consciousness state for {}", state.user_id);
                    (state, false)
                }
                Err(e) => {
                    warn!("Stored consciousness state under {} is unreadable: {} - using defaults", key, e);
                    (ConsciousnessState::new(new_user_id(), platform, now), false)
                }
            },
            Ok(None) => {
                info!("No consciousness state under {} - creating defaults", key);
                (ConsciousnessState::new(new_user_id(), platform, now), true)
            }
            Err(e) => {
                warn!("Failed to read consciousness state: {} - using defaults", e);
                (ConsciousnessState::new(new_user_id(), platform, now), false)
            }
        };

        let store = Self {
            state,
            storage,
            clock,
            key,
            registry: Arc::new(Mutex::new(ListenerRegistry::default())),
        };
        if fresh {
            store.persist();
        }
        store
    }

    pub fn state(&self) -> &ConsciousnessState {
        &self.state
    }

    /// Snapshot by value.
    pub fn get_state(&self) -> ConsciousnessState {
        self.state.clone()
    }

    pub fn update_spiral(&mut self, update: SpiralUpdate) {
        self.dispatch(ConsciousnessAction::UpdateSpiral(update));
    }

    pub fn update_community_participation(&mut self, update: CommunityUpdate) {
        self.dispatch(ConsciousnessAction::UpdateCommunity(update));
    }

    pub fn update_phase(&mut self, phase: Phase) {
        self.dispatch(ConsciousnessAction::SetPhase(phase));
    }

    pub fn update_preferences(&mut self, update: PreferencesUpdate) {
        self.dispatch(ConsciousnessAction::UpdatePreferences(update));
    }

    /// Apply, write through, then notify every listener synchronously.
    pub fn dispatch(&mut self, action: ConsciousnessAction) {
        debug!("Consciousness action: {:?}", action);
        self.state.apply(action, self.clock.now());
        self.persist();
        self.notify();
    }

    /// Register a listener called with the new state after every mutation.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ConsciousnessState) + Send + Sync + 'static,
    {
        let mut registry = lock_registry(&self.registry);
        registry.next_id += 1;
        let id = registry.next_id;
        registry.listeners.push((id, Arc::new(listener)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock_registry(&self.registry).listeners.len()
    }

    pub fn export_state(&self) -> ExportedConsciousness {
        ExportedConsciousness {
            state: self.state.clone(),
            exported_at: self.clock.now(),
            version: STATE_VERSION.to_string(),
        }
    }

    /// Merge an exported snapshot. Rejected without partial application when
    /// the version tag differs or any known field has the wrong shape.
    pub fn import_state(&mut self, data: &serde_json::Value) -> bool {
        let version = data.get("version").and_then(|v| v.as_str());
        if version != Some(STATE_VERSION) {
            warn!("Rejected consciousness import: version {:?}, expected {}", version, STATE_VERSION);
            return false;
        }
        let patch = match serde_json::from_value::<ConsciousnessPatch>(data.clone()) {
            Ok(patch) => patch,
            Err(e) => {
                warn!("Rejected consciousness import: {}", e);
                return false;
            }
        };
        self.dispatch(ConsciousnessAction::Import(patch));
        info!("Imported consciousness state for {}", self.state.user_id);
        true
    }

    fn persist(&self) {
        let json = match serde_json::to_string(&self.state) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize consciousness state: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(&self.key, &json) {
            warn!("Failed to persist consciousness state: {}", e);
        }
    }

    fn notify(&self) {
        // Listeners may subscribe/unsubscribe while being called.
        let listeners: Vec<Listener> = lock_registry(&self.registry)
            .listeners
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(&self.state);
        }
    }
}

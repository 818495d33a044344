//! CoordinationSystem — the facade presentation layers talk to

use crate::seed;
use crate::status::{CommunityStatus, SweepReport};
use crate::sync::SyncPayload;
use spiralkeep_community::{
    ConsensusEngine, EventScheduler, Ledger, NewConsensusItem, NewEvent, NewInput, NewPoll, Roadmap,
    RsvpStatus, Vote,
};
use spiralkeep_consciousness::{
    CommunityUpdate, ConsciousnessState, ConsciousnessStore, ParticipationLevel, Subscription,
};
use spiralkeep_core::storage::SharedStore;
use spiralkeep_core::{
    system_clock, FileStore, MemoryStore, Result, SharedClock, SpiralkeepConfig, Timestamp,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct CoordinationSystem {
    config: SpiralkeepConfig,
    clock: SharedClock,
    consciousness: ConsciousnessStore,
    ledger: Ledger,
    scheduler: EventScheduler,
    consensus: ConsensusEngine,
    roadmap: Roadmap,
}

impl CoordinationSystem {
    /// Build a session on the given storage with the real clock.
    pub fn new(config: SpiralkeepConfig, storage: SharedStore) -> Self {
        Self::with_clock(config, storage, system_clock())
    }

    /// Build a session on the configured storage: a file store under
    /// `storage.data_dir`, or memory when none is set.
    pub fn open(config: SpiralkeepConfig) -> Result<Self> {
        let storage = match &config.storage.data_dir {
            Some(dir) => Arc::new(FileStore::open(dir)?) as SharedStore,
            None => MemoryStore::shared() as SharedStore,
        };
        Ok(Self::new(config, storage))
    }

    pub fn with_clock(config: SpiralkeepConfig, storage: SharedStore, clock: SharedClock) -> Self {
        let consciousness = ConsciousnessStore::load(
            storage.clone(),
            clock.clone(),
            config.storage.consciousness_key.clone(),
            &config.sync.platform,
        );
        let roadmap = Roadmap::load(
            storage,
            &config.storage.pillars_key,
            &config.storage.projects_key,
        );
        let mut system = Self {
            ledger: Ledger::new(clock.clone(), &config),
            scheduler: EventScheduler::new(clock.clone(), &config),
            consensus: ConsensusEngine::new(clock.clone(), &config),
            consciousness,
            roadmap,
            clock,
            config,
        };
        if system.config.seed_demo_data {
            seed::seed_demo_data(&mut system);
        }
        info!("Coordination system ready for {}", system.consciousness.state().user_id);
        system
    }

    /// Current time on the session clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn config(&self) -> &SpiralkeepConfig {
        &self.config
    }

    pub fn consciousness(&self) -> &ConsciousnessStore {
        &self.consciousness
    }

    pub fn consciousness_mut(&mut self) -> &mut ConsciousnessStore {
        &mut self.consciousness
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub(crate) fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn scheduler(&self) -> &EventScheduler {
        &self.scheduler
    }

    pub fn consensus(&self) -> &ConsensusEngine {
        &self.consensus
    }

    pub fn roadmap(&self) -> &Roadmap {
        &self.roadmap
    }

    pub fn roadmap_mut(&mut self) -> &mut Roadmap {
        &mut self.roadmap
    }

    /// Fresh snapshot across every component. Nothing is cached.
    pub fn community_status(&self) -> CommunityStatus {
        CommunityStatus {
            consciousness: self.consciousness.get_state(),
            activity: self.ledger.get_community_activity(),
            upcoming_events: self
                .scheduler
                .get_upcoming_events(self.config.events.upcoming_limit)
                .into_iter()
                .cloned()
                .collect(),
            active_polls: self.ledger.get_active_polls().into_iter().cloned().collect(),
            consensus_items: self
                .consensus
                .get_active_consensus_items()
                .into_iter()
                .cloned()
                .collect(),
        }
    }

    /// Post to a channel and credit the local user with a contribution.
    ///
    /// Participation only ratchets upward: an observer becomes active, a
    /// contributor stays a contributor.
    pub fn add_community_input(&mut self, channel_id: &str, content: &str, author: &str) -> String {
        let id = self
            .ledger
            .add_input(channel_id, NewInput::message(content, author));

        let community = &self.consciousness.state().community;
        let update = CommunityUpdate {
            participation_level: Some(community.participation_level.max(ParticipationLevel::Active)),
            contribution_count: Some(community.contribution_count.saturating_add(1)),
            last_contribution: Some(self.clock.now()),
        };
        self.consciousness.update_community_participation(update);
        id
    }

    pub fn create_poll(&mut self, channel_id: &str, poll: NewPoll) -> String {
        self.ledger.create_poll(channel_id, poll)
    }

    pub fn vote_on_poll(&mut self, poll_id: &str, option_index: usize, user_id: &str) -> bool {
        self.ledger.vote_on_poll(poll_id, option_index, user_id)
    }

    pub fn schedule_event(&mut self, event: NewEvent) -> String {
        self.scheduler.schedule_event(event)
    }

    pub fn rsvp_to_event(&mut self, event_id: &str, member_id: &str, status: RsvpStatus) -> bool {
        self.scheduler.rsvp_to_event(event_id, member_id, status)
    }

    pub fn create_consensus_item(&mut self, item: NewConsensusItem) -> Result<String> {
        self.consensus.create_consensus_item(item)
    }

    pub fn vote_on_consensus(&mut self, item_id: &str, member_id: &str, vote: Vote) -> bool {
        self.consensus.vote_on_consensus(item_id, member_id, vote)
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ConsciousnessState) + Send + Sync + 'static,
    {
        self.consciousness.subscribe(listener)
    }

    /// Close polls and proposals whose deadlines passed without a closing vote.
    pub fn sweep_expired(&mut self) -> SweepReport {
        let report = SweepReport {
            closed_polls: self.ledger.close_expired_polls(),
            expired_items: self.consensus.expire_overdue(),
        };
        if report != SweepReport::default() {
            debug!("Expiry sweep: {:?}", report);
        }
        report
    }

    // ============================================================
    // Sync
    // ============================================================

    pub fn export_for_sync(&self) -> SyncPayload {
        SyncPayload {
            consciousness: self.consciousness.export_state(),
            timestamp: self.clock.now(),
            platform: self.config.sync.platform.clone(),
        }
    }

    /// Apply a payload produced by `export_for_sync` on another client.
    /// False when `consciousness` is missing or the store rejects it.
    pub fn import_from_sync(&mut self, sync_data: &serde_json::Value) -> bool {
        match sync_data.get("consciousness") {
            Some(consciousness) => self.consciousness.import_state(consciousness),
            None => {
                warn!("Sync payload has no consciousness section");
                false
            }
        }
    }

    /// `import_from_sync` for the pasted text form.
    pub fn import_sync_text(&mut self, text: &str) -> bool {
        match serde_json::from_str::<serde_json::Value>(text) {
            Ok(value) => self.import_from_sync(&value),
            Err(e) => {
                warn!("Sync text is not JSON: {}", e);
                false
            }
        }
    }
}

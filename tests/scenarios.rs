//! End-to-end scenarios across the whole crate graph.

use chrono::Duration;
use serde_json::json;
use spiralkeep::community::{NewConsensusItem, NewEvent, NewPoll, Vote};
use spiralkeep::consciousness::Phase;
use spiralkeep::foundation::storage::SharedStore;
use spiralkeep::foundation::{FileStore, ManualClock, MemoryStore, SharedClock};
use spiralkeep::{CoordinationSystem, SpiralkeepConfig};
use std::sync::Arc;

fn session(storage: SharedStore) -> CoordinationSystem {
    let clock: SharedClock = Arc::new(ManualClock::at_millis(1_750_000_000_000));
    let config = SpiralkeepConfig {
        seed_demo_data: false,
        ..Default::default()
    };
    CoordinationSystem::with_clock(config, storage, clock)
}

#[test]
fn poll_vote_moves_between_options() {
    let mut system = session(MemoryStore::shared());
    let poll = system.create_poll(
        "the-keep",
        NewPoll {
            question: "A or B?".into(),
            options: vec!["A".into(), "B".into()],
            author: "u1".into(),
            duration: None,
        },
    );

    assert!(system.vote_on_poll(&poll, 0, "u1"));
    assert_eq!(system.ledger().poll(&poll).unwrap().options[0].votes, 1);

    assert!(system.vote_on_poll(&poll, 1, "u1"));
    let options = &system.ledger().poll(&poll).unwrap().options;
    assert_eq!((options[0].votes, options[1].votes), (0, 1));
}

#[test]
fn channel_inputs_and_unknown_channels() {
    let mut system = session(MemoryStore::shared());
    system.add_community_input("sanctuary", "hi", "u1");
    let latest = system.ledger().get_channel_inputs("sanctuary", 1);
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].content, "hi");

    let id = system.add_community_input("unknown-channel", "x", "u1");
    assert!(!id.is_empty());
    assert!(system.ledger().get_channel_inputs("unknown-channel", 10).is_empty());
}

#[test]
fn empty_sync_payload_changes_nothing() {
    let mut system = session(MemoryStore::shared());
    let before = system.consciousness().get_state();
    assert!(!system.import_from_sync(&json!({})));
    assert_eq!(system.consciousness().get_state(), before);
}

#[test]
fn approved_proposal_rejects_further_ballots() {
    let mut system = session(MemoryStore::shared());
    let item = system
        .create_consensus_item(NewConsensusItem {
            title: "Open the keep on Sundays".into(),
            proposed_by: "u1".into(),
            consensus_threshold: Some(0.67),
            ..Default::default()
        })
        .unwrap();
    assert!(system.vote_on_consensus(&item, "a", Vote::Support));
    assert!(!system.vote_on_consensus(&item, "b", Vote::Oppose));
}

#[test]
fn file_backed_session_survives_restart_and_syncs() {
    let dir = tempfile::TempDir::new().unwrap();
    let storage: SharedStore = Arc::new(FileStore::open(dir.path()).unwrap());

    let text = {
        let mut system = session(storage.clone());
        system.consciousness_mut().update_phase(Phase::Memory);
        system.add_community_input("temple-of-flame", "a poem", "u1");
        system.export_for_sync().to_text().unwrap()
    };

    let restarted = session(storage);
    assert_eq!(restarted.consciousness().state().current_phase, Phase::Memory);
    assert_eq!(restarted.consciousness().state().community.contribution_count, 1);

    let mut other = session(MemoryStore::shared());
    assert!(other.import_sync_text(&text));
    assert_eq!(
        other.consciousness().state().user_id,
        restarted.consciousness().state().user_id
    );
}

#[test]
fn scheduled_events_show_up_until_they_start() {
    let clock = Arc::new(ManualClock::at_millis(1_750_000_000_000));
    let shared: SharedClock = clock.clone();
    let mut system = CoordinationSystem::with_clock(
        SpiralkeepConfig {
            seed_demo_data: false,
            ..Default::default()
        },
        MemoryStore::shared(),
        shared,
    );
    let start = system.now() + Duration::hours(3);
    system.schedule_event(NewEvent::new("Circle", "", start, "host"));
    assert_eq!(system.community_status().upcoming_events.len(), 1);

    clock.advance(Duration::hours(4));
    assert!(system.community_status().upcoming_events.is_empty());
}

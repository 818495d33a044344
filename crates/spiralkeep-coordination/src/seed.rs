//! Demonstration data loaded when `seed_demo_data` is on

use crate::system::CoordinationSystem;
use chrono::Duration;
use spiralkeep_community::{InputKind, NewConsensusItem, NewEvent, NewInput, NewPoll};
use tracing::{debug, warn};

pub(crate) fn seed_demo_data(system: &mut CoordinationSystem) {
    let now = system.now();

    let ledger = system.ledger_mut();
    ledger.add_input(
        "sanctuary",
        NewInput::message("Welcome to the sanctuary. Breathe, then share.", "Keeper"),
    );
    ledger.add_input(
        "tower-of-code",
        NewInput::message("Sync export is ready for testing across devices.", "Builder")
            .with_kind(InputKind::Discussion),
    );
    ledger.add_input(
        "temple-of-flame",
        NewInput::message("Posting sketches for the spiral mural tonight.", "Artist"),
    );
    ledger.create_poll(
        "the-keep",
        NewPoll {
            question: "Which gathering rhythm should we keep?".into(),
            options: vec!["Weekly".into(), "Fortnightly".into(), "Monthly".into()],
            author: "Keeper".into(),
            duration: None,
        },
    );

    system.schedule_event(NewEvent {
        location: Some("sanctuary".into()),
        ..NewEvent::new(
            "Community Circle",
            "Open circle to reflect on the season and plan the next one",
            now + Duration::days(1),
            "Keeper",
        )
    });

    let proposal = system.create_consensus_item(NewConsensusItem {
        title: "Adopt the community charter".into(),
        description: "Ratify the draft charter as our shared agreement".into(),
        proposed_by: "Keeper".into(),
        voting_period: None,
        consensus_threshold: None,
    });
    if let Err(e) = proposal {
        warn!("Skipped seeded proposal: {}", e);
    }
    debug!("Seeded demo community data");
}

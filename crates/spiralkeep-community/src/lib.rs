//! Spiralkeep Community — the coordination entities
//!
//! - `channel`: the four fixed channels and the immutable inputs posted to them
//! - `poll`: single-vote-per-user multiple choice polls
//! - `ledger`: owns channels, inputs and polls; activity aggregates
//! - `events`: scheduled gatherings with replace-on-resubmit RSVPs
//! - `consensus`: three-way ballots resolved against a support threshold
//! - `roadmap`: pillars, projects and milestone progress

pub mod channel;
pub mod consensus;
pub mod events;
pub mod ledger;
pub mod poll;
pub mod roadmap;

pub use channel::{Channel, ChannelKind, CommunityInput, InputKind, NewInput, CHANNEL_IDS};
pub use consensus::{
    Ballot, Ballots, ConsensusEngine, ConsensusItem, ConsensusStatus, NewConsensusItem, Tally, Vote,
};
pub use events::{Attendance, CommunityEvent, EventScheduler, NewEvent, Rsvp, RsvpStatus};
pub use ledger::{CommunityActivity, Ledger};
pub use poll::{NewPoll, Poll, PollOption};
pub use roadmap::{Milestone, Pillar, Project, ProjectStatus, Roadmap, RoadmapSummary};

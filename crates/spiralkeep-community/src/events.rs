//! Event scheduling and RSVPs

use chrono::serde::ts_milliseconds;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use spiralkeep_core::{
    new_entity_id, saturating_add, SharedClock, SpiralkeepConfig, Timestamp,
};
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsvpStatus {
    #[default]
    Attending,
    Maybe,
    Declined,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rsvp {
    pub member_id: String,
    pub status: RsvpStatus,
    #[serde(with = "ts_milliseconds")]
    pub rsvp_at: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(with = "ts_milliseconds")]
    pub scheduled_for: Timestamp,
    pub duration_minutes: i64,
    pub organizer: String,
    /// At most one record per member.
    pub attendees: Vec<Rsvp>,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    #[serde(with = "ts_milliseconds")]
    pub created_at: Timestamp,
}

impl CommunityEvent {
    pub fn rsvp_of(&self, member_id: &str) -> Option<&Rsvp> {
        self.attendees.iter().find(|a| a.member_id == member_id)
    }

    /// Start plus duration, pinned to the latest representable instant.
    pub fn ends_at(&self) -> Timestamp {
        let duration = Duration::try_minutes(self.duration_minutes).unwrap_or(
            if self.duration_minutes < 0 { Duration::MIN } else { Duration::MAX },
        );
        saturating_add(self.scheduled_for, duration)
    }
}

#[derive(Clone, Debug)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub scheduled_for: Timestamp,
    pub organizer: String,
    /// Defaults to one hour.
    pub duration: Option<Duration>,
    /// Defaults to "general".
    pub kind: Option<String>,
    /// Defaults to "virtual".
    pub location: Option<String>,
}

impl NewEvent {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        scheduled_for: Timestamp,
        organizer: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            scheduled_for,
            organizer: organizer.into(),
            duration: None,
            kind: None,
            location: None,
        }
    }
}

/// RSVP counts for one event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Attendance {
    pub attending: usize,
    pub maybe: usize,
    pub declined: usize,
}

pub struct EventScheduler {
    clock: SharedClock,
    default_duration: Duration,
    default_kind: String,
    default_location: String,
    events: Vec<CommunityEvent>,
}

impl EventScheduler {
    pub fn new(clock: SharedClock, config: &SpiralkeepConfig) -> Self {
        Self {
            clock,
            default_duration: config.event_duration(),
            default_kind: config.events.default_type.clone(),
            default_location: config.events.default_location.clone(),
            events: Vec::new(),
        }
    }

    pub fn event(&self, event_id: &str) -> Option<&CommunityEvent> {
        self.events.iter().find(|e| e.id == event_id)
    }

    pub fn events(&self) -> &[CommunityEvent] {
        &self.events
    }

    pub fn schedule_event(&mut self, event: NewEvent) -> String {
        let now = self.clock.now();
        let record = CommunityEvent {
            id: new_entity_id("event", now),
            title: event.title,
            description: event.description,
            scheduled_for: event.scheduled_for,
            duration_minutes: event.duration.unwrap_or(self.default_duration).num_minutes(),
            organizer: event.organizer,
            attendees: Vec::new(),
            kind: event.kind.unwrap_or_else(|| self.default_kind.clone()),
            location: event.location.unwrap_or_else(|| self.default_location.clone()),
            created_at: now,
        };
        let id = record.id.clone();
        info!("Scheduled event {} '{}' for {}", id, record.title, record.scheduled_for);
        self.events.push(record);
        id
    }

    /// Record `member_id`'s RSVP, replacing any earlier one. False if the event is unknown.
    pub fn rsvp_to_event(&mut self, event_id: &str, member_id: &str, status: RsvpStatus) -> bool {
        let now = self.clock.now();
        let Some(event) = self.events.iter_mut().find(|e| e.id == event_id) else {
            debug!("RSVP to unknown event {}", event_id);
            return false;
        };
        event.attendees.retain(|a| a.member_id != member_id);
        event.attendees.push(Rsvp {
            member_id: member_id.to_string(),
            status,
            rsvp_at: now,
        });
        debug!("{} RSVP {:?} to {}", member_id, status, event_id);
        true
    }

    /// Future events, soonest first, at most `limit`.
    pub fn get_upcoming_events(&self, limit: usize) -> Vec<&CommunityEvent> {
        let now = self.clock.now();
        let mut upcoming: Vec<&CommunityEvent> =
            self.events.iter().filter(|e| e.scheduled_for > now).collect();
        upcoming.sort_by_key(|e| e.scheduled_for);
        upcoming.truncate(limit);
        upcoming
    }

    pub fn attendance(&self, event_id: &str) -> Option<Attendance> {
        let event = self.event(event_id)?;
        let mut counts = Attendance::default();
        for rsvp in &event.attendees {
            match rsvp.status {
                RsvpStatus::Attending => counts.attending += 1,
                RsvpStatus::Maybe => counts.maybe += 1,
                RsvpStatus::Declined => counts.declined += 1,
            }
        }
        Some(counts)
    }
}

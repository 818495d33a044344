//! Ledger — owns the channels, the append-only input list, and polls
//!
//! Inputs are appended to one global list; each known channel keeps the
//! positions of its own inputs. An input posted to an unknown channel id is
//! still recorded globally but no channel query will ever return it.

use crate::channel::{Channel, CommunityInput, InputKind, NewInput};
use crate::poll::{NewPoll, Poll, PollOption};
use chrono::Duration;
use serde::Serialize;
use spiralkeep_core::{
    new_entity_id, saturating_add, saturating_sub, SharedClock, SpiralkeepConfig,
};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

const ANONYMOUS: &str = "Anonymous";

/// Aggregate counts over the ledger, anchored to the time of the call.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityActivity {
    pub total_inputs: usize,
    /// Inputs inside the recent window (24h by default).
    pub recent_inputs: usize,
    pub active_polls: usize,
    /// Discussions are not tracked yet; always zero.
    pub active_discussions: usize,
    /// Recent input count per known channel.
    pub channel_activity: BTreeMap<String, usize>,
}

pub struct Ledger {
    clock: SharedClock,
    default_poll_duration: Duration,
    recent_window: Duration,
    default_limit: usize,
    channels: Vec<Channel>,
    inputs: Vec<CommunityInput>,
    polls: Vec<Poll>,
}

impl Ledger {
    pub fn new(clock: SharedClock, config: &SpiralkeepConfig) -> Self {
        Self {
            clock,
            default_poll_duration: config.poll_duration(),
            recent_window: config.recent_window(),
            default_limit: config.activity.channel_input_limit,
            channels: Channel::fixed_set(),
            inputs: Vec::new(),
            polls: Vec::new(),
        }
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, channel_id: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == channel_id)
    }

    pub fn input(&self, input_id: &str) -> Option<&CommunityInput> {
        self.inputs.iter().find(|i| i.id == input_id)
    }

    pub fn inputs(&self) -> &[CommunityInput] {
        &self.inputs
    }

    pub fn poll(&self, poll_id: &str) -> Option<&Poll> {
        self.polls.iter().find(|p| p.id == poll_id)
    }

    pub fn polls(&self) -> &[Poll] {
        &self.polls
    }

    /// Record an input and return its id.
    pub fn add_input(&mut self, channel_id: &str, input: NewInput) -> String {
        let now = self.clock.now();
        let record = CommunityInput {
            id: new_entity_id("input", now),
            channel_id: channel_id.to_string(),
            content: input.content,
            author: input.author.unwrap_or_else(|| ANONYMOUS.to_string()),
            timestamp: now,
            kind: input.kind,
            reactions: Vec::new(),
            responses: Vec::new(),
        };
        let id = record.id.clone();
        let position = self.inputs.len();
        self.inputs.push(record);

        match self.channels.iter_mut().find(|c| c.id == channel_id) {
            Some(channel) => {
                channel.inputs.push(position);
                debug!("Input {} added to {}", id, channel_id);
            }
            None => warn!("Input {} recorded for unknown channel {}", id, channel_id),
        }
        id
    }

    /// Create a poll and announce it in the same channel.
    pub fn create_poll(&mut self, channel_id: &str, poll: NewPoll) -> String {
        let now = self.clock.now();
        let duration = poll.duration.unwrap_or(self.default_poll_duration);
        let record = Poll {
            id: new_entity_id("poll", now),
            channel_id: channel_id.to_string(),
            question: poll.question,
            options: poll.options.into_iter().map(PollOption::new).collect(),
            created_by: poll.author,
            created_at: now,
            ends_at: saturating_add(now, duration),
            active: true,
        };
        let id = record.id.clone();
        let announcement = NewInput {
            content: format!("New poll: {}", record.question),
            author: Some(record.created_by.clone()),
            kind: InputKind::Poll,
        };
        info!("Poll {} created in {} ({} options)", id, channel_id, record.options.len());
        self.polls.push(record);
        self.add_input(channel_id, announcement);
        id
    }

    /// Cast or move `user_id`'s vote. False for an unknown poll, an inactive
    /// poll, or an out-of-range option. The end time is not checked.
    pub fn vote_on_poll(&mut self, poll_id: &str, option_index: usize, user_id: &str) -> bool {
        let Some(poll) = self.polls.iter_mut().find(|p| p.id == poll_id) else {
            debug!("Vote on unknown poll {}", poll_id);
            return false;
        };
        let accepted = poll.cast(option_index, user_id);
        if accepted {
            debug!("{} voted option {} on poll {}", user_id, option_index, poll_id);
        }
        accepted
    }

    /// Flip a poll inactive. False if unknown or already closed.
    pub fn close_poll(&mut self, poll_id: &str) -> bool {
        match self.polls.iter_mut().find(|p| p.id == poll_id) {
            Some(poll) if poll.active => {
                poll.active = false;
                info!("Poll {} closed", poll_id);
                true
            }
            _ => false,
        }
    }

    /// Close every active poll whose end time has passed. Returns how many closed.
    pub fn close_expired_polls(&mut self) -> usize {
        let now = self.clock.now();
        let mut closed = 0;
        for poll in self.polls.iter_mut().filter(|p| p.active && p.ends_at <= now) {
            poll.active = false;
            closed += 1;
        }
        if closed > 0 {
            info!("Closed {} expired polls", closed);
        }
        closed
    }

    /// Up to `limit` most recent inputs of a channel, newest first.
    pub fn get_channel_inputs(&self, channel_id: &str, limit: usize) -> Vec<&CommunityInput> {
        let Some(channel) = self.channel(channel_id) else {
            return Vec::new();
        };
        channel
            .inputs
            .iter()
            .rev()
            .take(limit)
            .map(|&position| &self.inputs[position])
            .collect()
    }

    /// `get_channel_inputs` with the configured page size (50 by default).
    pub fn recent_channel_inputs(&self, channel_id: &str) -> Vec<&CommunityInput> {
        self.get_channel_inputs(channel_id, self.default_limit)
    }

    /// Polls that are active and have not reached their end time.
    pub fn get_active_polls(&self) -> Vec<&Poll> {
        let now = self.clock.now();
        self.polls.iter().filter(|p| p.is_open(now)).collect()
    }

    pub fn get_community_activity(&self) -> CommunityActivity {
        let since = saturating_sub(self.clock.now(), self.recent_window);
        let channel_activity = self
            .channels
            .iter()
            .map(|channel| {
                let recent = channel
                    .inputs
                    .iter()
                    .filter(|&&position| self.inputs[position].timestamp > since)
                    .count();
                (channel.id.clone(), recent)
            })
            .collect();

        CommunityActivity {
            total_inputs: self.inputs.len(),
            recent_inputs: self.inputs.iter().filter(|i| i.timestamp > since).count(),
            active_polls: self.get_active_polls().len(),
            active_discussions: 0,
            channel_activity,
        }
    }
}

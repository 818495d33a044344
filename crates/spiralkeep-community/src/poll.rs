//! Polls — multiple choice, one vote per user, time bounded

use chrono::serde::ts_milliseconds;
use serde::{Deserialize, Serialize};
use spiralkeep_core::Timestamp;
use std::collections::BTreeSet;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PollOption {
    pub text: String,
    pub votes: u32,
    pub voters: BTreeSet<String>,
}

impl PollOption {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            votes: 0,
            voters: BTreeSet::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: String,
    pub channel_id: String,
    pub question: String,
    pub options: Vec<PollOption>,
    pub created_by: String,
    #[serde(with = "ts_milliseconds")]
    pub created_at: Timestamp,
    #[serde(with = "ts_milliseconds")]
    pub ends_at: Timestamp,
    /// Only cleared by an explicit close; reaching `ends_at` alone does not clear it.
    pub active: bool,
}

#[derive(Clone, Debug, Default)]
pub struct NewPoll {
    pub question: String,
    pub options: Vec<String>,
    pub author: String,
    /// Defaults to the configured poll duration (24h).
    pub duration: Option<chrono::Duration>,
}

impl Poll {
    /// Active and not yet past its end time.
    pub fn is_open(&self, now: Timestamp) -> bool {
        self.active && self.ends_at > now
    }

    /// Index of the option currently holding `user_id`'s vote.
    pub fn vote_of(&self, user_id: &str) -> Option<usize> {
        self.options.iter().position(|o| o.voters.contains(user_id))
    }

    pub fn total_votes(&self) -> u32 {
        self.options.iter().map(|o| o.votes).sum()
    }

    /// Share of votes per option, 0-100. All zero when nobody voted.
    pub fn percentages(&self) -> Vec<f64> {
        let total = self.total_votes();
        self.options
            .iter()
            .map(|o| {
                if total == 0 {
                    0.0
                } else {
                    f64::from(o.votes) * 100.0 / f64::from(total)
                }
            })
            .collect()
    }

    /// Record `user_id`'s vote, moving any earlier vote. Does not look at `ends_at`.
    pub(crate) fn cast(&mut self, option_index: usize, user_id: &str) -> bool {
        if !self.active || option_index >= self.options.len() {
            return false;
        }
        for option in &mut self.options {
            if option.voters.remove(user_id) {
                option.votes = option.votes.saturating_sub(1);
            }
        }
        let target = &mut self.options[option_index];
        target.voters.insert(user_id.to_string());
        target.votes += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn poll(options: &[&str]) -> Poll {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        Poll {
            id: "poll_1".into(),
            channel_id: "the-keep".into(),
            question: "Which?".into(),
            options: options.iter().map(|o| PollOption::new(*o)).collect(),
            created_by: "tester".into(),
            created_at: now,
            ends_at: now + Duration::hours(24),
            active: true,
        }
    }

    #[test]
    fn revote_moves_the_vote() {
        let mut p = poll(&["A", "B", "C"]);
        assert!(p.cast(0, "u1"));
        assert!(p.cast(2, "u1"));
        assert!(p.cast(2, "u1"));
        assert_eq!(p.total_votes(), 1);
        assert_eq!(p.vote_of("u1"), Some(2));
        assert_eq!(p.options[0].votes, 0);
        assert_eq!(p.options[2].votes, 1);
    }

    #[test]
    fn out_of_range_is_rejected_without_side_effects() {
        let mut p = poll(&["A"]);
        assert!(p.cast(0, "u1"));
        assert!(!p.cast(1, "u1"));
        assert_eq!(p.vote_of("u1"), Some(0));
    }

    #[test]
    fn inactive_poll_rejects_votes() {
        let mut p = poll(&["A", "B"]);
        p.active = false;
        assert!(!p.cast(0, "u1"));
        assert_eq!(p.total_votes(), 0);
    }

    #[test]
    fn percentages_sum_to_hundred() {
        let mut p = poll(&["A", "B"]);
        assert_eq!(p.percentages(), vec![0.0, 0.0]);
        p.cast(0, "u1");
        p.cast(0, "u2");
        p.cast(1, "u3");
        p.cast(1, "u4");
        assert_eq!(p.percentages(), vec![50.0, 50.0]);
    }

    #[test]
    fn open_depends_on_end_time() {
        let p = poll(&["A"]);
        assert!(p.is_open(p.created_at));
        assert!(!p.is_open(p.ends_at));
    }
}

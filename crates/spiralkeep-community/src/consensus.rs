//! Consensus engine — proposals resolved by support ratio
//!
//! Resolution runs after every accepted ballot:
//!   total == 0                      → unchanged
//!   support / total >= threshold    → approved (terminal)
//!   now > voting_ends               → failed (terminal)
//!   otherwise                       → still voting
//!
//! Deadlines are only looked at when a ballot arrives, or when the caller
//! runs `expire_overdue`.

use chrono::serde::ts_milliseconds;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use spiralkeep_core::{
    new_entity_id, saturating_add, Error, Result, SharedClock, SpiralkeepConfig, Timestamp,
};
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Support,
    Oppose,
    Abstain,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsensusStatus {
    #[default]
    Voting,
    Approved,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ballot {
    pub member_id: String,
    #[serde(with = "ts_milliseconds")]
    pub timestamp: Timestamp,
}

/// Three disjoint ballot lists. A member sits in at most one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ballots {
    pub support: Vec<Ballot>,
    pub oppose: Vec<Ballot>,
    pub abstain: Vec<Ballot>,
}

impl Ballots {
    fn list_mut(&mut self, vote: Vote) -> &mut Vec<Ballot> {
        match vote {
            Vote::Support => &mut self.support,
            Vote::Oppose => &mut self.oppose,
            Vote::Abstain => &mut self.abstain,
        }
    }

    fn remove(&mut self, member_id: &str) {
        for list in [&mut self.support, &mut self.oppose, &mut self.abstain] {
            list.retain(|b| b.member_id != member_id);
        }
    }

    pub fn vote_of(&self, member_id: &str) -> Option<Vote> {
        let holds = |list: &[Ballot]| list.iter().any(|b| b.member_id == member_id);
        if holds(&self.support) {
            Some(Vote::Support)
        } else if holds(&self.oppose) {
            Some(Vote::Oppose)
        } else if holds(&self.abstain) {
            Some(Vote::Abstain)
        } else {
            None
        }
    }

    pub fn total(&self) -> usize {
        self.support.len() + self.oppose.len() + self.abstain.len()
    }
}

/// Ballot counts with the derived support ratio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    pub support: usize,
    pub oppose: usize,
    pub abstain: usize,
    pub total: usize,
    /// None while nobody has voted.
    pub support_ratio: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub proposed_by: String,
    #[serde(with = "ts_milliseconds")]
    pub created_at: Timestamp,
    #[serde(with = "ts_milliseconds")]
    pub voting_ends: Timestamp,
    pub votes: Ballots,
    pub status: ConsensusStatus,
    pub consensus_threshold: f64,
}

impl ConsensusItem {
    pub fn tally(&self) -> Tally {
        let total = self.votes.total();
        Tally {
            support: self.votes.support.len(),
            oppose: self.votes.oppose.len(),
            abstain: self.votes.abstain.len(),
            total,
            support_ratio: (total > 0).then(|| self.votes.support.len() as f64 / total as f64),
        }
    }

    fn meets_threshold(&self) -> bool {
        self.tally()
            .support_ratio
            .is_some_and(|ratio| ratio >= self.consensus_threshold)
    }

    fn resolve(&mut self, now: Timestamp) {
        if self.votes.total() == 0 {
            return;
        }
        if self.meets_threshold() {
            self.status = ConsensusStatus::Approved;
        } else if now > self.voting_ends {
            self.status = ConsensusStatus::Failed;
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct NewConsensusItem {
    pub title: String,
    pub description: String,
    pub proposed_by: String,
    /// Defaults to seven days.
    pub voting_period: Option<Duration>,
    /// Defaults to 0.67. Must lie in (0, 1].
    pub consensus_threshold: Option<f64>,
}

pub struct ConsensusEngine {
    clock: SharedClock,
    default_period: Duration,
    default_threshold: f64,
    items: Vec<ConsensusItem>,
}

impl ConsensusEngine {
    pub fn new(clock: SharedClock, config: &SpiralkeepConfig) -> Self {
        Self {
            clock,
            default_period: config.voting_period(),
            default_threshold: config.consensus.default_threshold,
            items: Vec::new(),
        }
    }

    pub fn item(&self, item_id: &str) -> Option<&ConsensusItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn items(&self) -> &[ConsensusItem] {
        &self.items
    }

    pub fn create_consensus_item(&mut self, item: NewConsensusItem) -> Result<String> {
        let threshold = item.consensus_threshold.unwrap_or(self.default_threshold);
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(Error::InvalidThreshold(threshold));
        }
        let now = self.clock.now();
        let record = ConsensusItem {
            id: new_entity_id("consensus", now),
            title: item.title,
            description: item.description,
            proposed_by: item.proposed_by,
            created_at: now,
            voting_ends: saturating_add(now, item.voting_period.unwrap_or(self.default_period)),
            votes: Ballots::default(),
            status: ConsensusStatus::Voting,
            consensus_threshold: threshold,
        };
        let id = record.id.clone();
        info!("Consensus item {} '{}' open until {}", id, record.title, record.voting_ends);
        self.items.push(record);
        Ok(id)
    }

    /// Cast or replace `member_id`'s ballot, then resolve. False if the item
    /// is unknown or no longer voting.
    pub fn vote_on_consensus(&mut self, item_id: &str, member_id: &str, vote: Vote) -> bool {
        let now = self.clock.now();
        let Some(item) = self.items.iter_mut().find(|i| i.id == item_id) else {
            debug!("Ballot on unknown consensus item {}", item_id);
            return false;
        };
        if item.status != ConsensusStatus::Voting {
            debug!("Ballot on closed consensus item {} ({:?})", item_id, item.status);
            return false;
        }

        item.votes.remove(member_id);
        item.votes.list_mut(vote).push(Ballot {
            member_id: member_id.to_string(),
            timestamp: now,
        });
        item.resolve(now);

        if item.status != ConsensusStatus::Voting {
            info!("Consensus item {} resolved: {:?}", item_id, item.status);
        }
        true
    }

    /// Items still open for ballots.
    pub fn get_active_consensus_items(&self) -> Vec<&ConsensusItem> {
        self.items
            .iter()
            .filter(|i| i.status == ConsensusStatus::Voting)
            .collect()
    }

    /// Close every voting item past its deadline: approved if the threshold is
    /// already met, failed otherwise (including items nobody voted on).
    /// Returns how many items changed.
    pub fn expire_overdue(&mut self) -> usize {
        let now = self.clock.now();
        let mut changed = 0;
        for item in self
            .items
            .iter_mut()
            .filter(|i| i.status == ConsensusStatus::Voting && now > i.voting_ends)
        {
            item.status = if item.meets_threshold() {
                ConsensusStatus::Approved
            } else {
                ConsensusStatus::Failed
            };
            info!("Consensus item {} expired: {:?}", item.id, item.status);
            changed += 1;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ballots_move_between_lists() {
        let mut ballots = Ballots::default();
        let at = chrono::Utc::now();
        ballots.list_mut(Vote::Support).push(Ballot { member_id: "m".into(), timestamp: at });
        ballots.remove("m");
        ballots.list_mut(Vote::Oppose).push(Ballot { member_id: "m".into(), timestamp: at });
        assert_eq!(ballots.vote_of("m"), Some(Vote::Oppose));
        assert_eq!(ballots.total(), 1);
    }

    #[test]
    fn empty_tally_has_no_ratio() {
        let item = ConsensusItem {
            id: "c".into(),
            title: "t".into(),
            description: String::new(),
            proposed_by: "p".into(),
            created_at: chrono::Utc::now(),
            voting_ends: chrono::Utc::now(),
            votes: Ballots::default(),
            status: ConsensusStatus::Voting,
            consensus_threshold: 0.5,
        };
        assert_eq!(item.tally().support_ratio, None);
        assert!(!item.meets_threshold());
    }
}

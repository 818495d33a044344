//! Channels and community inputs

use chrono::serde::ts_milliseconds;
use serde::{Deserialize, Serialize};
use spiralkeep_core::Timestamp;

/// Ids of the fixed channel set, in display order.
pub const CHANNEL_IDS: [&str; 4] = ["sanctuary", "tower-of-code", "temple-of-flame", "the-keep"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Reflection,
    Technical,
    Creative,
    Governance,
}

/// A fixed, named partition of community inputs.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ChannelKind,
    /// Positions in the ledger's global input list, oldest first.
    #[serde(skip)]
    pub(crate) inputs: Vec<usize>,
}

impl Channel {
    fn new(id: &str, name: &str, description: &str, kind: ChannelKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            kind,
            inputs: Vec::new(),
        }
    }

    /// The fixed channel set. Nothing adds or removes channels at runtime.
    pub fn fixed_set() -> Vec<Channel> {
        vec![
            Channel::new(
                CHANNEL_IDS[0],
                "Sanctuary",
                "A quiet space for reflection and sharing",
                ChannelKind::Reflection,
            ),
            Channel::new(
                CHANNEL_IDS[1],
                "Tower of Code",
                "Technical discussion and development",
                ChannelKind::Technical,
            ),
            Channel::new(
                CHANNEL_IDS[2],
                "Temple of Flame",
                "Creative expression and inspiration",
                ChannelKind::Creative,
            ),
            Channel::new(
                CHANNEL_IDS[3],
                "The Keep",
                "Governance, planning and community decisions",
                ChannelKind::Governance,
            ),
        ]
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Message,
    Poll,
    Discussion,
}

/// One post. Immutable once recorded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityInput {
    pub id: String,
    pub channel_id: String,
    pub content: String,
    pub author: String,
    #[serde(with = "ts_milliseconds")]
    pub timestamp: Timestamp,
    #[serde(rename = "type")]
    pub kind: InputKind,
    pub reactions: Vec<String>,
    pub responses: Vec<String>,
}

/// Caller-supplied part of an input. Content is not validated.
#[derive(Clone, Debug, Default)]
pub struct NewInput {
    pub content: String,
    /// Defaults to "Anonymous".
    pub author: Option<String>,
    pub kind: InputKind,
}

impl NewInput {
    pub fn message(content: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            author: Some(author.into()),
            kind: InputKind::Message,
        }
    }

    pub fn anonymous(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_kind(mut self, kind: InputKind) -> Self {
        self.kind = kind;
        self
    }
}

//! Per-connection subscription manager.
//!
//! Tracks which topics a WebSocket client is subscribed to and provides
//! server-side event filtering.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::{EventId, TicketingEvent};

/// A subscription topic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// `"*"`: every event, including chain-less ones.
    All,
    /// `"<chain>:*"`: every event on one chain.
    Chain(String),
    /// `"<chain>:<event id>"`: one ticketed event.
    Event(String, EventId),
}

/// Error returned for a malformed topic string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid topic {0:?}, expected \"<chain>:<event id>\", \"<chain>:*\" or \"*\"")]
pub struct InvalidTopic(pub String);

impl FromStr for Topic {
    type Err = InvalidTopic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == "*" {
            return Ok(Self::All);
        }
        let (chain, id) = trimmed
            .split_once(':')
            .ok_or_else(|| InvalidTopic(s.to_string()))?;
        let chain = chain.trim().to_ascii_lowercase();
        if chain.is_empty() {
            return Err(InvalidTopic(s.to_string()));
        }
        match id.trim() {
            "*" => Ok(Self::Chain(chain)),
            id => id
                .parse::<EventId>()
                .map(|id| Self::Event(chain, id))
                .map_err(|_| InvalidTopic(s.to_string())),
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("*"),
            Self::Chain(chain) => write!(f, "{chain}:*"),
            Self::Event(chain, id) => write!(f, "{chain}:{id}"),
        }
    }
}

/// Manages the set of topic subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed topics.
    topics: HashSet<Topic>,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds topics to the subscription set.
    pub fn subscribe(&mut self, topics: &[Topic]) {
        self.topics.extend(topics.iter().cloned());
    }

    /// Removes topics from the subscription set.
    pub fn unsubscribe(&mut self, topics: &[Topic]) {
        for topic in topics {
            self.topics.remove(topic);
        }
    }

    /// Returns `true` if the event matches the subscription filter.
    #[must_use]
    pub fn matches(&self, event: &TicketingEvent) -> bool {
        if self.topics.contains(&Topic::All) {
            return true;
        }
        let Some(chain) = event.chain() else {
            return false;
        };
        let chain = chain.to_ascii_lowercase();
        if let Some(id) = event.event_id()
            && self.topics.contains(&Topic::Event(chain.clone(), id))
        {
            return true;
        }
        self.topics.contains(&Topic::Chain(chain))
    }

    /// Returns the number of subscribed topics.
    #[must_use]
    pub fn count(&self) -> usize {
        self.topics.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.topics.contains(&Topic::All)
    }
}

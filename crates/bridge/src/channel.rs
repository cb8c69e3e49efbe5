// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unbuffered topic fan-out.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sw_core::SubscriberId;
use tokio::sync::mpsc;

use crate::topic::change_topics;

/// A message delivered on a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicMessage {
    pub topic: String,
    pub payload: serde_json::Value,
}

pub type TopicSender = mpsc::UnboundedSender<TopicMessage>;

/// Topic to subscriber fan-out.
///
/// Messages published while nobody listens are dropped; there is no
/// replay. A subscriber handle may follow any number of topics.
#[derive(Default)]
pub struct ChannelHub {
    topics: Mutex<HashMap<String, HashMap<SubscriberId, TopicSender>>>,
}

impl ChannelHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, topic: impl Into<String>, subscriber: SubscriberId, tx: TopicSender) {
        self.topics
            .lock()
            .entry(topic.into())
            .or_default()
            .insert(subscriber, tx);
    }

    /// Remove `subscriber` from one topic.
    pub fn unsubscribe_topic(&self, topic: &str, subscriber: &SubscriberId) -> bool {
        let mut topics = self.topics.lock();
        let Some(subs) = topics.get_mut(topic) else {
            return false;
        };
        let removed = subs.remove(subscriber).is_some();
        if subs.is_empty() {
            topics.remove(topic);
        }
        removed
    }

    /// Remove `subscriber` from every topic. Returns how many it left.
    pub fn unsubscribe(&self, subscriber: &SubscriberId) -> usize {
        let mut topics = self.topics.lock();
        let mut removed = 0;
        topics.retain(|_, subs| {
            if subs.remove(subscriber).is_some() {
                removed += 1;
            }
            !subs.is_empty()
        });
        removed
    }

    /// Deliver `payload` to everyone on `topic`. Returns the delivery count.
    pub fn publish(&self, topic: &str, payload: serde_json::Value) -> usize {
        let mut topics = self.topics.lock();
        let Some(subs) = topics.get_mut(topic) else {
            return 0;
        };
        let message = TopicMessage {
            topic: topic.to_string(),
            payload,
        };
        subs.retain(|_, tx| tx.send(message.clone()).is_ok());
        let delivered = subs.len();
        if subs.is_empty() {
            topics.remove(topic);
        }
        delivered
    }

    /// Announce a change at `path` on the exact topic and every ancestor
    /// wildcard topic. Returns the total delivery count.
    pub fn notify_change(&self, scope: &str, path: &str, payload: serde_json::Value) -> usize {
        let topics = change_topics(scope, path);
        tracing::debug!(scope, path, topics = topics.len(), "announcing change");
        topics
            .iter()
            .map(|topic| self.publish(topic, payload.clone()))
            .sum()
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.lock().get(topic).map_or(0, HashMap::len)
    }
}

#[cfg(test)]
#[path = "channel_tests.rs"]
mod tests;

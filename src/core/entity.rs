use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Per-message header as published by the producer.
///
/// `expired_time` and `deliver_limit` are the ceilings the redelivery scan
/// checks an entity against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    pub message_id: String,
    pub topic: String,
    pub message_type: String,
    pub expired_time: i64,
    pub deliver_limit: i32,
    pub group_id: String,
    pub commit: bool,
    pub fly: bool,
}

impl MessageHeader {
    pub fn new(message_id: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            topic: topic.into(),
            message_type: String::new(),
            expired_time: -1,
            deliver_limit: 100,
            group_id: String::new(),
            commit: false,
            fly: false,
        }
    }

    pub fn message_type(mut self, message_type: impl Into<String>) -> Self {
        self.message_type = message_type.into();
        self
    }

    pub fn expired_time(mut self, expired_time: i64) -> Self {
        self.expired_time = expired_time;
        self
    }

    pub fn deliver_limit(mut self, deliver_limit: i32) -> Self {
        self.deliver_limit = deliver_limit;
        self
    }

    pub fn group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = group_id.into();
        self
    }

    pub fn commit(mut self, commit: bool) -> Self {
        self.commit = commit;
        self
    }

    pub fn fly(mut self, fly: bool) -> Self {
        self.fly = fly;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageBody {
    Bytes(Vec<u8>),
    Text(String),
}

impl Default for MessageBody {
    fn default() -> Self {
        Self::Bytes(Vec::new())
    }
}

/// An in-flight message as held by a store backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntity {
    pub message_id: String,
    pub header: MessageHeader,
    pub topic: String,
    pub message_type: String,
    pub publish_group: String,
    pub commit: bool,
    pub expired_time: i64,
    pub publish_time: i64,
    pub deliver_count: i32,
    /// Earliest unix second at which the message may be redelivered.
    pub next_deliver_time: i64,
    pub succ_groups: BTreeSet<String>,
    pub fail_groups: BTreeSet<String>,
    pub kite_server: String,
    pub body: MessageBody,
}

impl MessageEntity {
    /// Build an entity from a freshly published message.
    pub fn new(header: MessageHeader, body: MessageBody) -> Self {
        let now = Utc::now().timestamp();
        Self {
            message_id: header.message_id.clone(),
            topic: header.topic.clone(),
            message_type: header.message_type.clone(),
            publish_group: header.group_id.clone(),
            commit: header.commit,
            expired_time: header.expired_time,
            publish_time: now,
            deliver_count: 0,
            next_deliver_time: now,
            succ_groups: BTreeSet::new(),
            fail_groups: BTreeSet::new(),
            kite_server: String::new(),
            body,
            header,
        }
    }

    pub fn kite_server(mut self, kite_server: impl Into<String>) -> Self {
        self.kite_server = kite_server.into();
        self
    }

    pub fn next_deliver_time(mut self, next_deliver_time: i64) -> Self {
        self.next_deliver_time = next_deliver_time;
        self
    }

    pub fn expired_time(mut self, expired_time: i64) -> Self {
        self.expired_time = expired_time;
        self
    }

    pub fn deliver_count(mut self, deliver_count: i32) -> Self {
        self.deliver_count = deliver_count;
        self
    }

    /// Due at `threshold`, under the header's deliver limit and not expired.
    pub fn is_redeliverable(&self, threshold: i64) -> bool {
        self.next_deliver_time <= threshold
            && self.deliver_count < self.header.deliver_limit
            && self.expired_time > self.header.expired_time
    }

    /// Overwrite the redelivery tracking fields from `other`.
    pub(crate) fn apply_delivery_state(&mut self, other: &MessageEntity) {
        self.deliver_count = other.deliver_count;
        self.next_deliver_time = other.next_deliver_time;
        self.succ_groups = other.succ_groups.clone();
        self.fail_groups = other.fail_groups.clone();
    }
}

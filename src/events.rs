use std::fmt;
use std::sync::mpsc::Sender;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::account::{Account, AccountId, OwnerId};
use crate::transaction::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    AccountCreated,
    Deposited,
    Withdrawn,
    Transferred,
    UserRegistered,
    FriendAdded,
    FriendRemoved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Account,
    Client,
}

impl Topic {
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::Account => "account-topic",
            Topic::Client => "client-topic",
        }
    }
}

/// Where an event is published: a topic plus a partition key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subject {
    pub topic: Topic,
    pub key: String,
}

impl Subject {
    pub fn account(id: AccountId) -> Self {
        Self {
            topic: Topic::Account,
            key: id.to_string(),
        }
    }

    pub fn client(login: &str) -> Self {
        Self {
            topic: Topic::Client,
            key: login.to_owned(),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.topic.as_str(), self.key)
    }
}

/// Notification about a committed ledger or user directory mutation.
///
/// Account events carry the accounts as they were right after the commit,
/// client events carry the logins involved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEvent {
    pub name: EventName,
    pub occurred_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<OwnerId>,
    pub accounts: Vec<Account>,
    pub transaction: Option<Transaction>,
}

impl LedgerEvent {
    pub fn new(name: EventName, accounts: Vec<Account>, transaction: Option<Transaction>) -> Self {
        Self {
            name,
            occurred_at: Utc::now(),
            users: Vec::new(),
            accounts,
            transaction,
        }
    }

    pub fn client(name: EventName, users: Vec<OwnerId>) -> Self {
        Self {
            name,
            occurred_at: Utc::now(),
            users,
            accounts: Vec::new(),
            transaction: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Event receiver is gone")]
    Disconnected,
    #[error("Failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Event history lock is poisoned")]
    Poisoned,
}

/// Best-effort publication channel.
///
/// Called after a mutation committed; errors are logged by the ledger and
/// never reach the caller of the mutation.
pub trait EventSink: Send + Sync {
    fn publish(&self, subject: &Subject, event: &LedgerEvent) -> Result<(), PublishError>;
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn publish(&self, subject: &Subject, event: &LedgerEvent) -> Result<(), PublishError> {
        (**self).publish(subject, event)
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn publish(&self, _subject: &Subject, _event: &LedgerEvent) -> Result<(), PublishError> {
        Ok(())
    }
}

/// Forwards events to an in-process receiver.
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    sender: Sender<(Subject, LedgerEvent)>,
}

impl ChannelEventSink {
    pub fn new(sender: Sender<(Subject, LedgerEvent)>) -> Self {
        Self { sender }
    }
}

impl EventSink for ChannelEventSink {
    fn publish(&self, subject: &Subject, event: &LedgerEvent) -> Result<(), PublishError> {
        // unbounded channel, so this never blocks
        self.sender
            .send((subject.clone(), event.clone()))
            .map_err(|_| PublishError::Disconnected)
    }
}

/// Logs every event as JSON at `info` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn publish(&self, subject: &Subject, event: &LedgerEvent) -> Result<(), PublishError> {
        let payload = serde_json::to_string(event)?;
        tracing::info!(%subject, %payload, "ledger event");
        Ok(())
    }
}

/// Keeps every published event in memory, queryable by account or by login.
///
/// Share it through an `Arc` to read back what a ledger published.
#[derive(Debug, Default)]
pub struct EventHistory {
    events: RwLock<Vec<(Subject, LedgerEvent)>>,
}

impl EventHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events published under the account's key, oldest first.
    pub fn account_events(&self, id: AccountId) -> Vec<LedgerEvent> {
        self.matching(&Subject::account(id))
    }

    /// Events published under the login's key, oldest first.
    pub fn client_events(&self, login: &str) -> Vec<LedgerEvent> {
        self.matching(&Subject::client(login))
    }

    fn matching(&self, subject: &Subject) -> Vec<LedgerEvent> {
        self.events
            .read()
            .map(|events| {
                events
                    .iter()
                    .filter(|(s, _)| s == subject)
                    .map(|(_, event)| event.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl EventSink for EventHistory {
    fn publish(&self, subject: &Subject, event: &LedgerEvent) -> Result<(), PublishError> {
        self.events
            .write()
            .map_err(|_| PublishError::Poisoned)?
            .push((subject.clone(), event.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    fn created() -> LedgerEvent {
        LedgerEvent::new(
            EventName::AccountCreated,
            vec![Account::open(5, "alice")],
            None,
        )
    }

    #[test]
    fn channel_sink_forwards() {
        let (tx, rx) = mpsc::channel();
        let sink = ChannelEventSink::new(tx);
        sink.publish(&Subject::account(5), &created()).unwrap();

        let (subject, event) = rx.try_recv().unwrap();
        assert_eq!(subject.to_string(), "account-topic/5");
        assert_eq!(event.name, EventName::AccountCreated);
    }

    #[test]
    fn channel_sink_reports_dropped_receiver() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let err = ChannelEventSink::new(tx)
            .publish(&Subject::account(5), &created())
            .unwrap_err();
        assert!(matches!(err, PublishError::Disconnected));
    }

    #[test]
    fn event_payload_shape() {
        let json = serde_json::to_value(created()).unwrap();
        assert_eq!(json["name"], "account_created");
        assert_eq!(json["accounts"][0]["owner_id"], "alice");
        assert!(json["transaction"].is_null());
        assert!(json.get("users").is_none());
    }

    #[test]
    fn client_event_payload_shape() {
        let event = LedgerEvent::client(EventName::FriendAdded, vec!["alice".into(), "bob".into()]);
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["name"], "friend_added");
        assert_eq!(json["users"][1], "bob");
        assert_eq!(json["accounts"].as_array().unwrap().len(), 0);
        assert_eq!(Subject::client("alice").to_string(), "client-topic/alice");
    }

    #[test]
    fn history_filters_by_account_and_login() {
        let history = Arc::new(EventHistory::new());
        // published through the shared handle, read back through the original
        let sink: Arc<dyn EventSink> = history.clone();
        sink.publish(&Subject::account(5), &created()).unwrap();
        sink.publish(&Subject::account(6), &created()).unwrap();
        let registered = LedgerEvent::client(EventName::UserRegistered, vec!["5".into()]);
        sink.publish(&Subject::client("5"), &registered).unwrap();

        let events = history.account_events(5);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].accounts[0].id(), 5);

        // same key, different topic
        assert_eq!(history.client_events("5"), vec![registered]);
        assert!(history.account_events(7).is_empty());
        assert!(history.client_events("alice").is_empty());
    }
}

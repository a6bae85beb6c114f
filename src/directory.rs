use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use thiserror::Error;
use tracing::warn;

use crate::account::OwnerId;
use crate::events::{EventName, EventSink, LedgerEvent, NullEventSink, Subject};

/// Answers whether an owner login belongs to a known user.
pub trait OwnerDirectory: Send + Sync {
    fn owner_exists(&self, owner: &str) -> bool;
}

/// Answers whether two owners are friends. The relation is symmetric.
pub trait RelationshipOracle: Send + Sync {
    fn are_friends(&self, a: &str, b: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("User login must not be empty")]
    EmptyLogin,
    #[error("User `{0}` already exists")]
    UserAlreadyExists(OwnerId),
    #[error("User `{0}` does not exist")]
    UserNotFound(OwnerId),
    #[error("User cannot befriend themselves")]
    SelfFriendship,
    #[error("Users are already friends")]
    AlreadyFriends,
    #[error("Users are not friends")]
    NotFriends,
    #[error("User registry lock is poisoned")]
    Poisoned,
}

/// In-memory users and their friendship edges.
///
/// Every successful mutation is published on the client topic, keyed by the
/// logins it touched.
#[derive(Debug, Default)]
pub struct UserRegistry<E = NullEventSink> {
    users: RwLock<HashMap<OwnerId, BTreeSet<OwnerId>>>,
    sink: E,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: EventSink> UserRegistry<E> {
    pub fn with_sink(sink: E) -> Self {
        Self {
            users: RwLock::default(),
            sink,
        }
    }

    pub fn register(&self, login: impl Into<OwnerId>) -> Result<(), RegistryError> {
        let login = login.into();
        if login.is_empty() {
            return Err(RegistryError::EmptyLogin);
        }
        let mut users = self.users.write().map_err(|_| RegistryError::Poisoned)?;
        if users.contains_key(&login) {
            return Err(RegistryError::UserAlreadyExists(login));
        }
        users.insert(login.clone(), BTreeSet::new());
        drop(users);

        self.notify(EventName::UserRegistered, &[login.as_str()]);
        Ok(())
    }

    pub fn add_friend(&self, a: &str, b: &str) -> Result<(), RegistryError> {
        if a == b {
            return Err(RegistryError::SelfFriendship);
        }
        let mut users = self.users.write().map_err(|_| RegistryError::Poisoned)?;
        for login in [a, b] {
            if !users.contains_key(login) {
                return Err(RegistryError::UserNotFound(login.to_owned()));
            }
        }
        if users.get(a).is_some_and(|friends| friends.contains(b)) {
            return Err(RegistryError::AlreadyFriends);
        }
        // both entries were checked above
        if let Some(friends) = users.get_mut(a) {
            friends.insert(b.to_owned());
        }
        if let Some(friends) = users.get_mut(b) {
            friends.insert(a.to_owned());
        }
        drop(users);

        self.notify(EventName::FriendAdded, &[a, b]);
        Ok(())
    }

    pub fn remove_friend(&self, a: &str, b: &str) -> Result<(), RegistryError> {
        let mut users = self.users.write().map_err(|_| RegistryError::Poisoned)?;
        for login in [a, b] {
            if !users.contains_key(login) {
                return Err(RegistryError::UserNotFound(login.to_owned()));
            }
        }
        let removed = users.get_mut(a).is_some_and(|friends| friends.remove(b));
        if !removed {
            return Err(RegistryError::NotFriends);
        }
        if let Some(friends) = users.get_mut(b) {
            friends.remove(a);
        }
        drop(users);

        self.notify(EventName::FriendRemoved, &[a, b]);
        Ok(())
    }

    /// Sorted friend logins, empty for unknown users.
    pub fn friends_of(&self, login: &str) -> Vec<OwnerId> {
        self.users
            .read()
            .ok()
            .and_then(|users| users.get(login).map(|f| f.iter().cloned().collect()))
            .unwrap_or_default()
    }

    /// One event per login involved, each under that login's key.
    fn notify(&self, name: EventName, logins: &[&str]) {
        let event = LedgerEvent::client(name, logins.iter().map(|l| l.to_string()).collect());
        for login in logins {
            let subject = Subject::client(login);
            if let Err(err) = self.sink.publish(&subject, &event) {
                warn!(%subject, %err, "failed to publish client event");
            }
        }
    }
}

impl<E: EventSink> OwnerDirectory for UserRegistry<E> {
    fn owner_exists(&self, owner: &str) -> bool {
        self.users
            .read()
            .is_ok_and(|users| users.contains_key(owner))
    }
}

impl<E: EventSink> RelationshipOracle for UserRegistry<E> {
    fn are_friends(&self, a: &str, b: &str) -> bool {
        self.users
            .read()
            .is_ok_and(|users| users.get(a).is_some_and(|friends| friends.contains(b)))
    }
}

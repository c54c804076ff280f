//! In-memory settings cache placed in front of the persistent store.
//!
//! Entries live for the whole process. Values are cloned on the way in and on
//! the way out, so nothing a caller does to a returned record can reach the
//! cached copy.
//!
//! Writers take a [`Ticket`] *before* reading the store and pass it to
//! [`KeyedCache::set`]. A write carrying an older ticket than the cached entry
//! is dropped, so a slow reader can never put a row back that a later write
//! already replaced.

use crate::core::settings::{GuildSettings, UserSettings};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::trace;

/// Orders cache writes by the moment their store read began
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug)]
struct Entry<V> {
    ticket: Ticket,
    value: V,
}

/// A map from Discord id to a settings record behind a reader/writer lock.
#[derive(Debug)]
pub struct KeyedCache<V> {
    entries: RwLock<HashMap<u64, Entry<V>>>,
    next_ticket: AtomicU64,
}

impl<V: Clone> KeyedCache<V> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            next_ticket: AtomicU64::new(0),
        }
    }

    /// A ticket newer than every ticket handed out before.
    ///
    /// Take it right before the store read whose result will be cached.
    pub fn ticket(&self) -> Ticket {
        Ticket(self.next_ticket.fetch_add(1, Ordering::SeqCst))
    }

    /// Returns a copy of the cached value, if any.
    pub async fn get(&self, id: u64) -> Option<V> {
        let entries = self.entries.read().await;
        let value = entries.get(&id).map(|entry| entry.value.clone());
        trace!(id, hit = value.is_some(), "Settings cache lookup");
        value
    }

    /// Stores a copy of the passed value unless the entry already holds a
    /// value read under a newer ticket. Returns whether the value was stored.
    pub async fn set(&self, id: u64, value: &V, ticket: Ticket) -> bool {
        let mut entries = self.entries.write().await;
        if entries.get(&id).is_some_and(|entry| entry.ticket > ticket) {
            trace!(id, "Dropping cache write from an older read");
            return false;
        }
        entries.insert(
            id,
            Entry {
                ticket,
                value: value.clone(),
            },
        );
        true
    }

    /// Number of cached entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether nothing is cached yet
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl<V: Clone> Default for KeyedCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Guild and user settings caches, locked independently.
#[derive(Debug, Default)]
pub struct SettingsCache {
    /// Cached guild settings by guild id
    pub guilds: KeyedCache<GuildSettings>,
    /// Cached user settings by user id
    pub users: KeyedCache<UserSettings>,
}

impl SettingsCache {
    /// Creates empty caches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The generic TTL-expiring, sharded store every concrete in-memory store
//! in this crate is built on. `DashMap` already shards its buckets
//! internally, which is what lets `take` be a true atomic single-use
//! consume without a crate-wide lock serializing unrelated keys.

use std::hash::Hash;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

struct Entry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// A concurrent map keyed by `K`, where every value carries its own
/// expiry and can be consumed (read-and-remove) exactly once.
pub struct TtlStore<K, V> {
    entries: DashMap<K, Entry<V>>,
}

impl<K, V> Default for TtlStore<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<K, V> TtlStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn insert(&self, key: K, value: V, expires_at: DateTime<Utc>) {
        self.entries.insert(key, Entry { value, expires_at });
    }

    /// Look up a value without consuming it, returning `None` if absent
    /// or expired. Expired entries are left for the sweeper rather than
    /// removed here, so a read-only lookup never needs exclusive access.
    #[must_use]
    pub fn peek(&self, key: &K, now: DateTime<Utc>) -> Option<V> {
        self.entries.get(key).and_then(|entry| {
            if entry.expires_at > now {
                Some(entry.value.clone())
            } else {
                None
            }
        })
    }

    /// Atomically remove and return the value for `key`, but only if it
    /// is present and not expired. This is the only operation that may
    /// observe and consume a single-use record (a code, a PAR, a
    /// challenge) without a second caller racing in between.
    pub fn take(&self, key: &K, now: DateTime<Utc>) -> Option<V> {
        let (_, entry) = self
            .entries
            .remove_if(key, |_, entry| entry.expires_at > now)?;
        Some(entry.value)
    }

    pub fn remove(&self, key: &K) {
        self.entries.remove(key);
    }

    /// Drop every entry whose expiry has passed. Call periodically from a
    /// background task; nothing here depends on it running for
    /// correctness, only for bounded memory.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_consumes_exactly_once() {
        let store: TtlStore<String, u32> = TtlStore::default();
        let now = Utc::now();
        store.insert("a".to_owned(), 1, now + chrono::Duration::seconds(60));

        assert_eq!(store.take(&"a".to_owned(), now), Some(1));
        assert_eq!(store.take(&"a".to_owned(), now), None);
    }

    #[test]
    fn expired_entries_are_not_returned() {
        let store: TtlStore<String, u32> = TtlStore::default();
        let now = Utc::now();
        store.insert("a".to_owned(), 1, now - chrono::Duration::seconds(1));

        assert_eq!(store.peek(&"a".to_owned(), now), None);
        assert_eq!(store.take(&"a".to_owned(), now), None);
    }

    #[test]
    fn sweep_drops_only_expired_entries() {
        let store: TtlStore<String, u32> = TtlStore::default();
        let now = Utc::now();
        store.insert("fresh".to_owned(), 1, now + chrono::Duration::seconds(60));
        store.insert("stale".to_owned(), 2, now - chrono::Duration::seconds(1));

        let swept = store.sweep_expired(now);
        assert_eq!(swept, 1);
        assert_eq!(store.len(), 1);
        assert!(store.peek(&"fresh".to_owned(), now).is_some());
    }
}

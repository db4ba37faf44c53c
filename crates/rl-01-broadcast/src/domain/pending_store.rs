//! # Pending Store
//!
//! Holds envelopes whose claims cannot be adjudicated yet because local
//! ground truth has not caught up.
//!
//! ## Invariants
//!
//! - At most one entry per [`ClaimKey`]. A newer `put` replaces the older
//!   envelope silently.
//! - Every removal (`try_resolve`, sweep, eviction) is an atomic
//!   remove-if-present under one lock, so when a resolution attempt races a
//!   sweep for the same key exactly one of them gets the envelope.
//! - Nothing here blocks on I/O and the lock is never held across an await.

use parking_lot::Mutex;
use shared_types::{ChainId, ClaimKey};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::Instant;

use super::envelope::MessageWithPeerMetadata;

/// An envelope waiting for ground truth.
#[derive(Clone, Debug)]
pub struct PendingEntry {
    pub envelope: MessageWithPeerMetadata,
    /// Re-offers that ended unresolved since the last `put`.
    pub attempts: u32,
    pub first_seen: Instant,
}

/// What a `put` displaced.
#[derive(Debug)]
pub enum PutOutcome {
    Inserted,
    /// An older envelope for the same claim was replaced.
    Replaced(MessageWithPeerMetadata),
    /// The store was full; the entry with the earliest deadline was dropped.
    Evicted(MessageWithPeerMetadata),
}

/// Result of putting an unresolved entry back after a re-offer.
#[derive(Debug)]
pub enum RequeueOutcome {
    Requeued,
    /// A newer envelope was `put` meanwhile and stays; the old one is gone.
    Superseded,
    AttemptsExhausted(MessageWithPeerMetadata),
    /// The store filled up while the entry was out.
    Full(MessageWithPeerMetadata),
}

/// Concurrent map of pending claims keyed by claim identity.
pub struct PendingStore {
    entries: Mutex<HashMap<ClaimKey, PendingEntry>>,
    max_entries: usize,
    max_attempts: u32,
}

impl PendingStore {
    pub fn new(max_entries: usize, max_attempts: u32) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries: max_entries.max(1),
            max_attempts,
        }
    }

    /// Insert or replace the entry for the envelope's claim.
    ///
    /// Resets attempts and first-seen time for that claim.
    pub fn put(&self, envelope: MessageWithPeerMetadata) -> PutOutcome {
        let key = envelope.key();
        let entry = PendingEntry {
            envelope,
            attempts: 0,
            first_seen: Instant::now(),
        };

        let mut entries = self.entries.lock();
        if let Some(old) = entries.insert(key, entry) {
            return PutOutcome::Replaced(old.envelope);
        }

        if entries.len() > self.max_entries {
            if let Some(evicted) = Self::evict_earliest(&mut entries, &key) {
                return PutOutcome::Evicted(evicted);
            }
        }
        PutOutcome::Inserted
    }

    /// Remove and return the envelope for `key`, if present.
    ///
    /// Does not judge validity or expiry.
    pub fn try_resolve(&self, key: &ClaimKey) -> Option<MessageWithPeerMetadata> {
        self.take_entry(key).map(|entry| entry.envelope)
    }

    /// Like [`PendingStore::try_resolve`] but keeps the bookkeeping.
    pub fn take_entry(&self, key: &ClaimKey) -> Option<PendingEntry> {
        self.entries.lock().remove(key)
    }

    /// Put back an entry that is still unresolved.
    ///
    /// Counts one more attempt. Drops the entry instead when a newer envelope
    /// for the same claim arrived while it was out, or when it has used up
    /// its attempts.
    pub fn requeue(&self, mut entry: PendingEntry) -> RequeueOutcome {
        let key = entry.envelope.key();
        entry.attempts = entry.attempts.saturating_add(1);

        let mut entries = self.entries.lock();
        if entries.contains_key(&key) {
            return RequeueOutcome::Superseded;
        }
        if entry.attempts > self.max_attempts {
            return RequeueOutcome::AttemptsExhausted(entry.envelope);
        }
        if entries.len() >= self.max_entries {
            return RequeueOutcome::Full(entry.envelope);
        }
        entries.insert(key, entry);
        RequeueOutcome::Requeued
    }

    /// Lazily remove and yield every entry whose deadline is at or before
    /// `now`.
    ///
    /// Candidates are snapshotted when the sweep starts. Each is removed only
    /// as it is yielded and only if the entry present at that moment is still
    /// expired, so a fresher envelope put in the meantime survives. Dropping
    /// the iterator early leaves the remaining candidates in place.
    pub fn sweep(&self, now: Instant) -> Sweep<'_> {
        let candidates: Vec<ClaimKey> = self
            .entries
            .lock()
            .iter()
            .filter(|(_, entry)| entry.envelope.is_expired(now))
            .map(|(key, _)| *key)
            .collect();

        Sweep {
            store: self,
            candidates: candidates.into_iter(),
            now,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn contains(&self, key: &ClaimKey) -> bool {
        self.entries.lock().contains_key(key)
    }

    /// Snapshot of the pending claim identities.
    pub fn keys(&self) -> Vec<ClaimKey> {
        self.entries.lock().keys().copied().collect()
    }

    /// Snapshot of the pending claims whose event lives on `chain`.
    pub fn keys_for(&self, chain: ChainId) -> Vec<ClaimKey> {
        self.entries
            .lock()
            .iter()
            .filter(|(_, entry)| entry.envelope.message().payload.source_chain() == chain)
            .map(|(key, _)| *key)
            .collect()
    }

    /// Snapshot of one entry.
    pub fn get(&self, key: &ClaimKey) -> Option<PendingEntry> {
        self.entries.lock().get(key).cloned()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    fn evict_earliest(
        entries: &mut HashMap<ClaimKey, PendingEntry>,
        keep: &ClaimKey,
    ) -> Option<MessageWithPeerMetadata> {
        let victim = entries
            .iter()
            .filter(|(key, _)| *key != keep)
            .min_by_key(|(_, entry)| entry.envelope.deadline())
            .map(|(key, _)| *key)?;
        entries.remove(&victim).map(|entry| entry.envelope)
    }
}

/// Iterator returned by [`PendingStore::sweep`].
pub struct Sweep<'a> {
    store: &'a PendingStore,
    candidates: std::vec::IntoIter<ClaimKey>,
    now: Instant,
}

impl Iterator for Sweep<'_> {
    type Item = MessageWithPeerMetadata;

    fn next(&mut self) -> Option<Self::Item> {
        for key in self.candidates.by_ref() {
            let mut entries = self.store.entries.lock();
            if let Entry::Occupied(slot) = entries.entry(key) {
                if slot.get().envelope.is_expired(self.now) {
                    return Some(slot.remove().envelope);
                }
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.candidates.len()))
    }
}

//! Append-only, hash-chained log of [`SwapEvent`]s.
//!
//! Each record commits to its predecessor:
//!
//! `hash = SHA-256(domain || sequence || prev_hash || recorded_at || event_json)`
//!
//! The first record chains from the all-zero hash. Editing, dropping or
//! reordering any record breaks every hash after it, which
//! [`EventLog::verify_chain`] reports as `EventChainBroken`.

use bundleswap_types::{Result, SwapError, SwapEvent, constants};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hash the first record chains from.
pub const GENESIS_HASH: [u8; 32] = [0u8; 32];

/// One committed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub sequence: u64,
    pub event: SwapEvent,
    pub recorded_at: DateTime<Utc>,
    pub prev_hash: [u8; 32],
    pub hash: [u8; 32],
}

impl EventRecord {
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    fn compute_hash(
        sequence: u64,
        prev_hash: &[u8; 32],
        recorded_at: &DateTime<Utc>,
        event: &SwapEvent,
    ) -> Result<[u8; 32]> {
        let body = serde_json::to_vec(event)?;
        let mut hasher = Sha256::new();
        hasher.update(constants::EVENT_HASH_DOMAIN);
        hasher.update(sequence.to_le_bytes());
        hasher.update(prev_hash);
        hasher.update(recorded_at.to_rfc3339().as_bytes());
        hasher.update(&body);
        Ok(hasher.finalize().into())
    }
}

/// The event log.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit `event` at the end of the chain.
    pub fn append(&mut self, event: SwapEvent) -> Result<&EventRecord> {
        let sequence = self.records.len() as u64;
        let prev_hash = self.head();
        let recorded_at = Utc::now();
        let hash = EventRecord::compute_hash(sequence, &prev_hash, &recorded_at, &event)?;

        tracing::debug!(
            sequence,
            event = %event,
            hash = %hex::encode(hash),
            "Event recorded"
        );

        let idx = self.records.len();
        self.records.push(EventRecord {
            sequence,
            event,
            recorded_at,
            prev_hash,
            hash,
        });
        Ok(&self.records[idx])
    }

    #[must_use]
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Hash of the newest record, or [`GENESIS_HASH`] when empty.
    #[must_use]
    pub fn head(&self) -> [u8; 32] {
        self.records.last().map_or(GENESIS_HASH, |r| r.hash)
    }

    /// Recompute every link of the chain.
    ///
    /// # Errors
    /// `EventChainBroken` naming the first record that does not verify.
    pub fn verify_chain(&self) -> Result<()> {
        let mut prev = GENESIS_HASH;
        for (idx, record) in self.records.iter().enumerate() {
            let expected_seq = idx as u64;
            let recomputed = EventRecord::compute_hash(
                record.sequence,
                &record.prev_hash,
                &record.recorded_at,
                &record.event,
            )?;
            if record.sequence != expected_seq || record.prev_hash != prev || record.hash != recomputed {
                tracing::error!(sequence = expected_seq, "Event chain verification failed");
                return Err(SwapError::EventChainBroken {
                    sequence: expected_seq,
                });
            }
            prev = record.hash;
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }

    /// Load a log exported with [`to_json`](Self::to_json), verifying it.
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<EventRecord> = serde_json::from_str(json)?;
        let log = Self { records };
        log.verify_chain()?;
        Ok(log)
    }

    #[cfg(any(test, feature = "test-helpers"))]
    pub fn records_mut(&mut self) -> &mut Vec<EventRecord> {
        &mut self.records
    }
}

//! Append-only per-subject ledger.
//!
//! Balance is never stored; it is always the running sum of a subject's
//! entry deltas. The store guarantees atomic read-modify-write per subject,
//! so a debit can never race another debit past the balance check.

use crate::errors::{GameError, GameResult};
use crate::types::Period;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Why an entry was appended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum EntryReason {
    /// Stake debited when a bet is placed.
    StakeDebit { period: Period },
    /// Payout credited at settlement.
    PayoutCredit { period: Period },
    /// Operator adjustment (deposits, corrections).
    Adjustment,
}

/// One signed movement on a subject's account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub subject_id: String,
    pub delta: i64,
    pub reason: EntryReason,
    pub timestamp: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(subject_id: &str, delta: i64, reason: EntryReason) -> Self {
        Self {
            subject_id: subject_id.to_string(),
            delta,
            reason,
            timestamp: Utc::now(),
        }
    }
}

/// Account store interface the engine settles against.
///
/// Implementations must make `debit_if_covered` atomic per subject: the
/// balance check and the appended debit happen under one exclusive hold.
pub trait AccountStore: Send + Sync {
    /// Current balance: sum of the subject's entry deltas.
    fn balance(&self, subject_id: &str) -> i64;

    /// Append an entry unconditionally (credits, adjustments).
    fn append(&self, entry: LedgerEntry) -> GameResult<()>;

    /// Debit `stake` iff the current balance covers it.
    fn debit_if_covered(&self, subject_id: &str, stake: u64, reason: EntryReason)
        -> GameResult<()>;

    /// Full entry history for a subject, oldest first.
    fn entries(&self, subject_id: &str) -> Vec<LedgerEntry>;
}

/// In-memory account store keyed by subject id.
///
/// The DashMap entry guard gives exclusive access to one subject's entry
/// vector, which is all the atomicity `debit_if_covered` needs.
#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: DashMap<String, Vec<LedgerEntry>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a subject with an opening deposit.
    pub fn deposit(&self, subject_id: &str, amount: u64) -> GameResult<()> {
        self.append(LedgerEntry::new(
            subject_id,
            amount as i64,
            EntryReason::Adjustment,
        ))
    }
}

impl AccountStore for InMemoryAccountStore {
    fn balance(&self, subject_id: &str) -> i64 {
        self.accounts
            .get(subject_id)
            .map(|entries| entries.iter().map(|e| e.delta).sum())
            .unwrap_or(0)
    }

    fn append(&self, entry: LedgerEntry) -> GameResult<()> {
        self.accounts
            .entry(entry.subject_id.clone())
            .or_default()
            .push(entry);
        Ok(())
    }

    fn debit_if_covered(
        &self,
        subject_id: &str,
        stake: u64,
        reason: EntryReason,
    ) -> GameResult<()> {
        let mut entries = self.accounts.entry(subject_id.to_string()).or_default();
        let balance: i64 = entries.iter().map(|e| e.delta).sum();
        if (stake as i64) > balance {
            return Err(GameError::InsufficientBalance { stake, balance });
        }
        entries.push(LedgerEntry::new(subject_id, -(stake as i64), reason));
        Ok(())
    }

    fn entries(&self, subject_id: &str) -> Vec<LedgerEntry> {
        self.accounts
            .get(subject_id)
            .map(|entries| entries.value().clone())
            .unwrap_or_default()
    }
}

//! Running engine statistics.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters updated on the bet and settlement paths.
#[derive(Default)]
pub struct EngineStats {
    bets_placed: AtomicU64,
    bets_rejected: AtomicU64,
    total_staked: AtomicU64,
    total_paid_out: AtomicU64,
    rounds_settled: AtomicU64,
    rounds_skipped: AtomicU64,
}

impl EngineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_bet(&self, stake: u64) {
        self.bets_placed.fetch_add(1, Ordering::Relaxed);
        self.total_staked.fetch_add(stake, Ordering::Relaxed);
    }

    pub fn record_rejected_bet(&self) {
        self.bets_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_settlement(&self, total_credited: u64) {
        self.rounds_settled.fetch_add(1, Ordering::Relaxed);
        self.total_paid_out.fetch_add(total_credited, Ordering::Relaxed);
    }

    pub fn record_skipped_round(&self) {
        self.rounds_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            bets_placed: self.bets_placed.load(Ordering::Relaxed),
            bets_rejected: self.bets_rejected.load(Ordering::Relaxed),
            total_staked: self.total_staked.load(Ordering::Relaxed),
            total_paid_out: self.total_paid_out.load(Ordering::Relaxed),
            rounds_settled: self.rounds_settled.load(Ordering::Relaxed),
            rounds_skipped: self.rounds_skipped.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the counters.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub bets_placed: u64,
    pub bets_rejected: u64,
    pub total_staked: u64,
    pub total_paid_out: u64,
    pub rounds_settled: u64,
    pub rounds_skipped: u64,
}

//! Settlement: resolve a round's pending selections against its outcome.
//!
//! Idempotent per selection: only Pending selections are resolved, so
//! replaying settlement over an already-resolved set credits nothing.

use crate::config::PayoutConfig;
use crate::errors::GameResult;
use crate::ledger::{AccountStore, EntryReason, LedgerEntry};
use crate::store::RoundStore;
use crate::types::{BetTarget, Color, Outcome, Period, SelectionStatus};
use serde::Serialize;

/// Summary of one settlement pass.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementReport {
    pub period: Period,
    pub outcome: Outcome,
    pub settled: usize,
    pub winners: usize,
    pub total_credited: u64,
}

pub struct SettlementProcessor {
    payout: PayoutConfig,
}

impl SettlementProcessor {
    pub fn new(payout: PayoutConfig) -> Self {
        Self { payout }
    }

    /// Fixed multiplier table: number 9x, Red/Green 2x, Violet 5x by default.
    pub fn multiplier(&self, target: &BetTarget) -> u64 {
        match target {
            BetTarget::Number(_) => self.payout.number_multiplier,
            BetTarget::Color(Color::Violet) => self.payout.violet_multiplier,
            BetTarget::Color(_) => self.payout.color_multiplier,
        }
    }

    /// Number bets win on exact match; color bets win when the color is
    /// among the outcome's derived colors (0 and 5 carry a pair).
    pub fn is_winner(target: &BetTarget, outcome: &Outcome) -> bool {
        match target {
            BetTarget::Number(n) => *n == outcome.number,
            BetTarget::Color(c) => outcome.has_color(*c),
        }
    }

    /// Resolve every Pending selection for the outcome's period. Winners are
    /// credited `multiplier * stake`; losers get no ledger entry (the stake
    /// was debited at placement).
    pub fn settle_round(
        &self,
        store: &RoundStore,
        accounts: &dyn AccountStore,
        outcome: &Outcome,
    ) -> GameResult<SettlementReport> {
        let mut settled = 0;
        let mut winners = 0;
        let mut total_credited = 0u64;

        for selection in store.selections_for(outcome.period) {
            if selection.status != SelectionStatus::Pending {
                continue;
            }

            if Self::is_winner(&selection.target, outcome) {
                let payout = selection.stake * self.multiplier(&selection.target);
                accounts.append(LedgerEntry::new(
                    &selection.subject_id,
                    payout as i64,
                    EntryReason::PayoutCredit {
                        period: outcome.period,
                    },
                ))?;
                store.set_selection_status(selection.id, SelectionStatus::Won { payout })?;
                tracing::debug!(
                    period = %outcome.period,
                    subject = %selection.subject_id,
                    target = %selection.target,
                    payout,
                    "selection won"
                );
                winners += 1;
                total_credited += payout;
            } else {
                store.set_selection_status(selection.id, SelectionStatus::Lost)?;
                tracing::debug!(
                    period = %outcome.period,
                    subject = %selection.subject_id,
                    target = %selection.target,
                    "selection lost"
                );
            }
            settled += 1;
        }

        Ok(SettlementReport {
            period: outcome.period,
            outcome: outcome.clone(),
            settled,
            winners,
            total_credited,
        })
    }
}

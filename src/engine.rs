//! Game engine: the single timeline driving rounds from open to settled.
//!
//! All mutating paths (bets, ticks, manual settlement) serialize on the
//! clock mutex, so a bet can never interleave with the settlement of the
//! round it targets.

use crate::clock::{ClockEvent, RoundClock};
use crate::config::GameConfig;
use crate::draw::ResultGenerator;
use crate::errors::{GameError, GameResult};
use crate::ledger::{AccountStore, EntryReason, LedgerEntry};
use crate::settlement::{SettlementProcessor, SettlementReport};
use crate::stats::{EngineStats, StatsSnapshot};
use crate::store::RoundStore;
use crate::types::{BetTarget, Outcome, Period, Round, RoundStatus, Selection, SelectionStatus};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

pub struct GameEngine {
    config: GameConfig,
    clock: Mutex<RoundClock>,
    store: RoundStore,
    accounts: Arc<dyn AccountStore>,
    generator: Mutex<Box<dyn ResultGenerator>>,
    /// Operator-pinned results, consumed oldest-first before the RNG.
    queued_results: Mutex<VecDeque<u8>>,
    processor: SettlementProcessor,
    stats: EngineStats,
}

impl GameEngine {
    pub fn new(
        config: GameConfig,
        accounts: Arc<dyn AccountStore>,
        generator: Box<dyn ResultGenerator>,
    ) -> GameResult<Self> {
        Self::new_at(config, accounts, generator, Utc::now())
    }

    /// Construct with an explicit start instant (tests drive time by hand).
    pub fn new_at(
        config: GameConfig,
        accounts: Arc<dyn AccountStore>,
        generator: Box<dyn ResultGenerator>,
        now: DateTime<Utc>,
    ) -> GameResult<Self> {
        config.validate()?;
        let clock = RoundClock::new(&config.round, now);
        let store = RoundStore::new(config.history.recent_results);
        store.insert_round(Round::open(clock.current_period(), now));
        tracing::info!(period = %clock.current_period(), "round opened");

        Ok(Self {
            processor: SettlementProcessor::new(config.payout.clone()),
            config,
            clock: Mutex::new(clock),
            store,
            accounts,
            generator: Mutex::new(generator),
            queued_results: Mutex::new(VecDeque::new()),
            stats: EngineStats::new(),
        })
    }

    pub fn current_period(&self) -> Period {
        self.clock.lock().unwrap().current_period()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.clock.lock().unwrap().remaining_secs()
    }

    pub fn betting_open(&self) -> bool {
        self.clock.lock().unwrap().betting_open()
    }

    pub fn balance(&self, subject_id: &str) -> i64 {
        self.accounts.balance(subject_id)
    }

    pub fn ledger_entries(&self, subject_id: &str) -> Vec<LedgerEntry> {
        self.accounts.entries(subject_id)
    }

    pub fn selection(&self, id: Uuid) -> Option<Selection> {
        self.store.selection(id)
    }

    pub fn round(&self, period: Period) -> Option<Round> {
        self.store.round(period)
    }

    pub fn outcome(&self, period: Period) -> Option<Outcome> {
        self.store.outcome(period)
    }

    pub fn recent_outcomes(&self) -> Vec<Outcome> {
        self.store.recent_outcomes()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Validate and record a bet for the current Open round.
    ///
    /// Checks run in order: round identity, lock window, stake bounds, then
    /// the atomic balance-checked debit. On success the stake is debited and
    /// a Pending selection is stored; there is no modification or
    /// cancellation afterwards.
    pub fn place_bet(
        &self,
        subject_id: &str,
        period: Period,
        target: BetTarget,
        stake: u64,
    ) -> GameResult<Uuid> {
        let clock = self.clock.lock().unwrap();
        let result = self.place_bet_locked(&clock, subject_id, period, target, stake);
        if result.is_err() {
            self.stats.record_rejected_bet();
        }
        result
    }

    fn place_bet_locked(
        &self,
        clock: &RoundClock,
        subject_id: &str,
        period: Period,
        target: BetTarget,
        stake: u64,
    ) -> GameResult<Uuid> {
        if period != clock.current_period() {
            return Err(GameError::UnknownRound { period });
        }
        if !clock.betting_open() {
            return Err(GameError::RoundLocked { period });
        }
        if let BetTarget::Number(n) = target {
            if n > 9 {
                return Err(GameError::InvalidResult(n));
            }
        }

        let bounds = &self.config.betting;
        if stake < bounds.min_bet || stake > bounds.max_bet {
            return Err(GameError::InvalidStake {
                stake,
                min: bounds.min_bet,
                max: bounds.max_bet,
            });
        }

        self.accounts
            .debit_if_covered(subject_id, stake, EntryReason::StakeDebit { period })?;

        let selection = Selection {
            id: Uuid::new_v4(),
            period,
            subject_id: subject_id.to_string(),
            target,
            stake,
            status: SelectionStatus::Pending,
            placed_at: Utc::now(),
        };
        let id = selection.id;
        self.store.add_selection(selection);
        self.stats.record_bet(stake);
        tracing::debug!(subject = subject_id, %period, %target, stake, "bet placed");
        Ok(id)
    }

    /// Pin the next drawn result (operator "manual" result mode). Pinned
    /// numbers are consumed oldest-first; the RNG takes over when the queue
    /// is empty.
    pub fn queue_result(&self, number: u8) -> GameResult<()> {
        if number > 9 {
            return Err(GameError::InvalidResult(number));
        }
        self.queued_results.lock().unwrap().push_back(number);
        Ok(())
    }

    /// Advance the round clock by one cadence step. Returns the settlement
    /// report when this tick expired the round.
    pub fn tick(&self) -> GameResult<Option<SettlementReport>> {
        self.tick_at(Utc::now())
    }

    pub fn tick_at(&self, now: DateTime<Utc>) -> GameResult<Option<SettlementReport>> {
        let mut clock = self.clock.lock().unwrap();
        match clock.tick(now) {
            ClockEvent::Tick { .. } => Ok(None),
            ClockEvent::Locked { remaining_secs } => {
                let period = clock.current_period();
                self.store.set_round_status(period, RoundStatus::Locked)?;
                tracing::info!(%period, remaining_secs, "betting locked");
                Ok(None)
            }
            ClockEvent::Expired => {
                let period = clock.current_period();
                let report = match self.settle_inner(period) {
                    Ok(report) => Some(report),
                    Err(GameError::DuplicateSettlement { .. }) => {
                        // Already force-settled by an operator; just roll on.
                        tracing::warn!(%period, "round settled before expiry, skipping draw");
                        None
                    }
                    Err(e) => return Err(e),
                };
                self.open_next_locked(&mut clock, now);
                Ok(report)
            }
            ClockEvent::GapSkipped { missed_period } => {
                self.stats.record_skipped_round();
                self.store
                    .set_round_status(missed_period, RoundStatus::Voided)?;
                tracing::warn!(
                    %missed_period,
                    "tick gap exceeded round duration; round voided without settlement"
                );
                self.open_next_locked(&mut clock, now);
                Ok(None)
            }
        }
    }

    /// Settle a round by period. The normal path is the expiry tick; this
    /// entry exists for operator intervention and replay protection checks.
    /// Settling an already-settled round is `DuplicateSettlement` and alters
    /// no balance.
    pub fn settle_period(&self, period: Period) -> GameResult<SettlementReport> {
        let _clock = self.clock.lock().unwrap();
        self.settle_inner(period)
    }

    fn settle_inner(&self, period: Period) -> GameResult<SettlementReport> {
        let round = self
            .store
            .round(period)
            .ok_or(GameError::UnknownRound { period })?;
        if round.status == RoundStatus::Settled {
            return Err(GameError::DuplicateSettlement { period });
        }
        if round.status == RoundStatus::Voided {
            return Err(GameError::RoundVoided { period });
        }

        let outcome = self.draw_outcome(period);
        self.store.record_outcome(outcome.clone());
        let report = self
            .processor
            .settle_round(&self.store, self.accounts.as_ref(), &outcome)?;
        self.store.set_round_status(period, RoundStatus::Settled)?;
        self.stats.record_settlement(report.total_credited);
        tracing::info!(
            %period,
            number = outcome.number,
            settled = report.settled,
            winners = report.winners,
            credited = report.total_credited,
            "round settled"
        );
        Ok(report)
    }

    fn draw_outcome(&self, period: Period) -> Outcome {
        if let Some(number) = self.queued_results.lock().unwrap().pop_front() {
            tracing::info!(%period, number, "using operator-pinned result");
            return Outcome::for_number(period, number);
        }
        self.generator.lock().unwrap().draw(period)
    }

    fn open_next_locked(&self, clock: &mut RoundClock, now: DateTime<Utc>) {
        let next = clock.open_next(now);
        self.store.insert_round(Round::open(next, now));
        tracing::info!(period = %next, "round opened");
    }

    /// Drive the clock on a 1 s cadence until the task is dropped.
    pub async fn run(self: Arc<Self>) {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if let Err(e) = self.tick() {
                tracing::error!(error = %e, "tick failed");
            }
        }
    }
}

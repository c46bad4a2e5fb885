//! Keyed in-memory store for rounds, selections, and outcomes.
//!
//! Thread-safe via sharded maps; selections are indexed by period so
//! settlement is a single pass over one round's bets.

use crate::errors::{GameError, GameResult};
use crate::types::{Outcome, Period, Round, RoundStatus, Selection, SelectionStatus};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use uuid::Uuid;

pub struct RoundStore {
    rounds: DashMap<Period, Round>,
    selections: DashMap<Uuid, Selection>,
    by_period: DashMap<Period, Vec<Uuid>>,
    outcomes: DashMap<Period, Outcome>,
    recent: Mutex<VecDeque<Outcome>>,
    recent_cap: usize,
}

impl RoundStore {
    pub fn new(recent_cap: usize) -> Self {
        Self {
            rounds: DashMap::new(),
            selections: DashMap::new(),
            by_period: DashMap::new(),
            outcomes: DashMap::new(),
            recent: Mutex::new(VecDeque::with_capacity(recent_cap)),
            recent_cap,
        }
    }

    pub fn insert_round(&self, round: Round) {
        self.rounds.insert(round.period, round);
    }

    pub fn round(&self, period: Period) -> Option<Round> {
        self.rounds.get(&period).map(|r| r.value().clone())
    }

    pub fn set_round_status(&self, period: Period, status: RoundStatus) -> GameResult<()> {
        match self.rounds.get_mut(&period) {
            Some(mut round) => {
                round.status = status;
                Ok(())
            }
            None => Err(GameError::Storage(format!(
                "round {} missing from store",
                period
            ))),
        }
    }

    pub fn add_selection(&self, selection: Selection) {
        self.by_period
            .entry(selection.period)
            .or_default()
            .push(selection.id);
        self.selections.insert(selection.id, selection);
    }

    pub fn selection(&self, id: Uuid) -> Option<Selection> {
        self.selections.get(&id).map(|s| s.value().clone())
    }

    /// All selections recorded for a period, in placement order.
    pub fn selections_for(&self, period: Period) -> Vec<Selection> {
        let Some(ids) = self.by_period.get(&period) else {
            return Vec::new();
        };
        ids.iter()
            .filter_map(|id| self.selections.get(id).map(|s| s.value().clone()))
            .collect()
    }

    pub fn set_selection_status(&self, id: Uuid, status: SelectionStatus) -> GameResult<()> {
        match self.selections.get_mut(&id) {
            Some(mut selection) => {
                selection.status = status;
                Ok(())
            }
            None => Err(GameError::Storage(format!(
                "selection {} missing from store",
                id
            ))),
        }
    }

    /// Record the drawn outcome and push it onto the capped recent history.
    pub fn record_outcome(&self, outcome: Outcome) {
        let mut recent = self.recent.lock().unwrap();
        recent.push_front(outcome.clone());
        recent.truncate(self.recent_cap);
        drop(recent);
        self.outcomes.insert(outcome.period, outcome);
    }

    pub fn outcome(&self, period: Period) -> Option<Outcome> {
        self.outcomes.get(&period).map(|o| o.value().clone())
    }

    /// Recently drawn outcomes, newest first.
    pub fn recent_outcomes(&self) -> Vec<Outcome> {
        self.recent.lock().unwrap().iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BetTarget;
    use chrono::{NaiveDate, Utc};

    fn period(seq: u32) -> Period {
        format!("250101{:03}", seq).parse().unwrap()
    }

    fn selection(p: Period, subject: &str, stake: u64) -> Selection {
        Selection {
            id: Uuid::new_v4(),
            period: p,
            subject_id: subject.to_string(),
            target: BetTarget::Number(7),
            stake,
            status: SelectionStatus::Pending,
            placed_at: Utc::now(),
        }
    }

    #[test]
    fn test_round_status_transitions() {
        let store = RoundStore::new(10);
        store.insert_round(Round::open(period(1), Utc::now()));

        store
            .set_round_status(period(1), RoundStatus::Locked)
            .unwrap();
        assert_eq!(store.round(period(1)).unwrap().status, RoundStatus::Locked);

        let err = store
            .set_round_status(period(2), RoundStatus::Settled)
            .unwrap_err();
        assert!(matches!(err, GameError::Storage(_)));
    }

    #[test]
    fn test_selections_indexed_by_period() {
        let store = RoundStore::new(10);
        let a = selection(period(1), "alice", 100);
        let b = selection(period(1), "bob", 50);
        let other = selection(period(2), "alice", 75);
        store.add_selection(a.clone());
        store.add_selection(b.clone());
        store.add_selection(other);

        let found = store.selections_for(period(1));
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, a.id);
        assert_eq!(found[1].id, b.id);
        assert!(store.selections_for(period(3)).is_empty());
    }

    #[test]
    fn test_recent_outcomes_capped_newest_first() {
        let store = RoundStore::new(3);
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut p = Period::first(date);
        for n in 0..5u8 {
            store.record_outcome(Outcome::for_number(p, n));
            p = p.next(date);
        }

        let recent = store.recent_outcomes();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].number, 4);
        assert_eq!(recent[2].number, 2);
        // Full outcome lookup still works beyond the recent cap.
        assert!(store.outcome(period(1)).is_some());
    }
}

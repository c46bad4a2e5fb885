//! End-to-end round lifecycle: open, bet, lock, draw, settle, repeat.

use chrono::{DateTime, TimeZone, Utc};
use colorwin::{
    AccountStore, BetTarget, Color, GameConfig, GameEngine, GameError, InMemoryAccountStore,
    Period, RngResultGenerator, RoundStatus,
};
use std::sync::Arc;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}

fn engine_at(now: DateTime<Utc>, deposits: &[(&str, u64)]) -> (Arc<GameEngine>, Arc<InMemoryAccountStore>) {
    let accounts = Arc::new(InMemoryAccountStore::new());
    for (subject, amount) in deposits {
        accounts.deposit(subject, *amount).unwrap();
    }
    let engine = GameEngine::new_at(
        GameConfig::default(),
        accounts.clone(),
        Box::new(RngResultGenerator::seeded(2025)),
        now,
    )
    .unwrap();
    (Arc::new(engine), accounts)
}

/// Tick the engine second-by-second until a round settles.
fn run_to_settlement(engine: &GameEngine, from: DateTime<Utc>) -> (colorwin::SettlementReport, DateTime<Utc>) {
    let mut now = from;
    loop {
        now += chrono::Duration::seconds(1);
        if let Some(report) = engine.tick_at(now).unwrap() {
            return (report, now);
        }
    }
}

#[test]
fn full_round_with_mixed_bets() {
    let (engine, accounts) =
        engine_at(start(), &[("alice", 500), ("bob", 1000), ("carol", 300)]);
    engine.queue_result(7).unwrap();
    let period = engine.current_period();
    assert_eq!(period.to_string(), "250101001");

    // Number 7 wins 9x, green wins 2x (7 derives green), red loses.
    engine
        .place_bet("alice", period, BetTarget::Number(7), 100)
        .unwrap();
    engine
        .place_bet("bob", period, BetTarget::Color(Color::Green), 200)
        .unwrap();
    engine
        .place_bet("carol", period, BetTarget::Color(Color::Red), 50)
        .unwrap();

    assert_eq!(engine.balance("alice"), 400);
    assert_eq!(engine.balance("bob"), 800);
    assert_eq!(engine.balance("carol"), 250);

    let (report, _) = run_to_settlement(&engine, start());
    assert_eq!(report.period, period);
    assert_eq!(report.outcome.number, 7);
    assert_eq!(report.settled, 3);
    assert_eq!(report.winners, 2);
    assert_eq!(report.total_credited, 900 + 400);

    assert_eq!(engine.balance("alice"), 1300);
    assert_eq!(engine.balance("bob"), 1200);
    assert_eq!(engine.balance("carol"), 250);

    // Balances always equal the ledger sum.
    for subject in ["alice", "bob", "carol"] {
        let sum: i64 = accounts.entries(subject).iter().map(|e| e.delta).sum();
        assert_eq!(engine.balance(subject), sum);
    }

    // Round is settled and the next one is open.
    assert_eq!(engine.round(period).unwrap().status, RoundStatus::Settled);
    assert_eq!(engine.current_period().to_string(), "250101002");
    assert_eq!(
        engine.round(engine.current_period()).unwrap().status,
        RoundStatus::Open
    );
}

#[test]
fn resettlement_is_rejected_and_balance_neutral() {
    let (engine, _) = engine_at(start(), &[("alice", 500)]);
    engine.queue_result(7).unwrap();
    engine
        .place_bet("alice", engine.current_period(), BetTarget::Number(7), 100)
        .unwrap();

    let (report, _) = run_to_settlement(&engine, start());
    let after_first = engine.balance("alice");
    assert_eq!(after_first, 1300);

    let err = engine.settle_period(report.period).unwrap_err();
    assert!(matches!(err, GameError::DuplicateSettlement { .. }));
    assert_eq!(engine.balance("alice"), after_first);

    // Unknown periods are a distinct error.
    let unknown: Period = "240101001".parse().unwrap();
    assert!(matches!(
        engine.settle_period(unknown).unwrap_err(),
        GameError::UnknownRound { .. }
    ));
}

#[test]
fn rejected_bets_leave_balance_untouched() {
    let (engine, _) = engine_at(start(), &[("alice", 500)]);
    let period = engine.current_period();

    // Below minimum.
    assert!(matches!(
        engine
            .place_bet("alice", period, BetTarget::Number(7), 5)
            .unwrap_err(),
        GameError::InvalidStake { .. }
    ));
    // Above maximum.
    assert!(matches!(
        engine
            .place_bet("alice", period, BetTarget::Number(7), 10_001)
            .unwrap_err(),
        GameError::InvalidStake { .. }
    ));
    // Beyond balance.
    assert!(matches!(
        engine
            .place_bet("alice", period, BetTarget::Number(7), 600)
            .unwrap_err(),
        GameError::InsufficientBalance { .. }
    ));

    assert_eq!(engine.balance("alice"), 500);
    assert_eq!(engine.stats().bets_placed, 0);
    assert_eq!(engine.stats().bets_rejected, 3);
}

#[test]
fn betting_closes_in_lock_window_and_reopens_next_round() {
    let (engine, _) = engine_at(start(), &[("alice", 500)]);
    let mut now = start();
    for _ in 0..55 {
        now += chrono::Duration::seconds(1);
        engine.tick_at(now).unwrap();
    }
    assert!(!engine.betting_open());
    assert!(matches!(
        engine
            .place_bet("alice", engine.current_period(), BetTarget::Number(7), 100)
            .unwrap_err(),
        GameError::RoundLocked { .. }
    ));

    // Expire the round; the next one accepts bets again.
    run_to_settlement(&engine, now);
    assert!(engine.betting_open());
    engine
        .place_bet("alice", engine.current_period(), BetTarget::Number(7), 100)
        .unwrap();
}

#[test]
fn sequences_increase_within_day_and_reset_at_midnight() {
    let late = Utc.with_ymd_and_hms(2025, 1, 1, 23, 59, 0).unwrap();
    let (engine, _) = engine_at(late, &[]);
    assert_eq!(engine.current_period().to_string(), "250101001");

    // The round expires at exactly midnight, so the next period belongs to
    // the new day and restarts the sequence.
    let (report, _) = run_to_settlement(&engine, late);
    assert_eq!(report.period.to_string(), "250101001");
    assert_eq!(engine.current_period().to_string(), "250102001");
}

#[test]
fn suspension_skips_forward_without_fabricated_results() {
    let (engine, _) = engine_at(start(), &[("alice", 500)]);
    let first = engine.current_period();
    engine
        .place_bet("alice", first, BetTarget::Number(7), 100)
        .unwrap();

    // Ten minutes of suspension: the missed round is voided, gets no
    // outcome, and the pending selection is not resolved with a stale draw.
    let resumed = start() + chrono::Duration::minutes(10);
    assert!(engine.tick_at(resumed).unwrap().is_none());

    assert!(engine.outcome(first).is_none());
    assert_eq!(engine.round(first).unwrap().status, RoundStatus::Voided);
    assert_eq!(engine.balance("alice"), 400);
    assert_eq!(engine.stats().rounds_skipped, 1);

    // A voided round stays closed to manual settlement too.
    assert!(matches!(
        engine.settle_period(first).unwrap_err(),
        GameError::RoundVoided { .. }
    ));
    assert!(engine.outcome(first).is_none());
    assert_eq!(engine.balance("alice"), 400);

    // The fresh round runs normally.
    engine.queue_result(2).unwrap();
    let (report, _) = run_to_settlement(&engine, resumed);
    assert_eq!(report.outcome.number, 2);
}

#[test]
fn recent_outcomes_accumulate_newest_first() {
    let (engine, _) = engine_at(start(), &[]);
    for n in [4u8, 9, 0] {
        engine.queue_result(n).unwrap();
    }

    let mut now = start();
    for _ in 0..3 {
        let (_, settled_at) = run_to_settlement(&engine, now);
        now = settled_at;
    }

    let recent: Vec<u8> = engine.recent_outcomes().iter().map(|o| o.number).collect();
    assert_eq!(recent, vec![0, 9, 4]);
    assert_eq!(engine.stats().rounds_settled, 3);
}

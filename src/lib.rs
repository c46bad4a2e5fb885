//! Colorwin - Server-Authoritative Color Prediction Round Engine
//!
//! Timed betting rounds over colors and numbers: a round clock owns period
//! identity and the countdown, bets debit an append-only per-subject ledger,
//! a swappable generator draws the outcome, and settlement credits winners
//! by a fixed multiplier table. Settlement is idempotent per selection and
//! per round.

pub mod clock;
pub mod config;
pub mod draw;
pub mod engine;
pub mod errors;
pub mod ledger;
pub mod settlement;
pub mod stats;
pub mod store;
pub mod types;

pub use config::{ConfigLoader, GameConfig};
pub use draw::{ResultGenerator, RngResultGenerator};
pub use engine::GameEngine;
pub use errors::{GameError, GameResult};
pub use ledger::{AccountStore, InMemoryAccountStore, LedgerEntry};
pub use settlement::SettlementReport;
pub use types::{BetTarget, Color, Outcome, Period, Round, RoundStatus, Selection, SelectionStatus};

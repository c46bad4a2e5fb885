//! Colorwin demo runner.
//!
//! Seeds a few accounts, drives the round clock in real time, and places
//! random bets while the betting window is open. Useful for watching the
//! engine's logs and statistics without any frontend.

use chrono::Utc;
use clap::Parser;
use colorwin::{
    BetTarget, Color, ConfigLoader, GameConfig, GameEngine, InMemoryAccountStore,
    RngResultGenerator,
};
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "colorwin", about = "Color prediction round engine demo")]
struct Args {
    /// Optional TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after this many settled rounds.
    #[arg(long, default_value_t = 3)]
    rounds: u64,

    /// Use short rounds instead of the production 60 s cadence.
    #[arg(long)]
    fast: bool,

    /// Simulated bettors.
    #[arg(long, default_value_t = 4)]
    bettors: usize,

    /// Opening balance for each simulated bettor.
    #[arg(long, default_value_t = 1_000)]
    balance: u64,
}

const TARGETS: &[BetTarget] = &[
    BetTarget::Color(Color::Red),
    BetTarget::Color(Color::Green),
    BetTarget::Color(Color::Violet),
    BetTarget::Number(0),
    BetTarget::Number(3),
    BetTarget::Number(7),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "colorwin=info".into()),
        )
        .init();

    let args = Args::parse();

    let config = match (&args.config, args.fast) {
        (Some(path), _) => ConfigLoader::new().with_path(path).load()?,
        (None, true) => GameConfig::fast_rounds(),
        (None, false) => ConfigLoader::new().load()?,
    };
    info!(
        duration_secs = config.round.duration_secs,
        lock_window_secs = config.round.lock_window_secs,
        min_bet = config.betting.min_bet,
        max_bet = config.betting.max_bet,
        "starting colorwin engine"
    );

    let accounts = Arc::new(InMemoryAccountStore::new());
    let subjects: Vec<String> = (1..=args.bettors).map(|i| format!("player-{}", i)).collect();
    for subject in &subjects {
        accounts.deposit(subject, args.balance)?;
    }

    let engine = Arc::new(GameEngine::new(
        config,
        accounts.clone(),
        Box::new(RngResultGenerator::from_entropy()),
    )?);

    let mut rng = rand::thread_rng();
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut settled = 0u64;

    while settled < args.rounds {
        interval.tick().await;

        // A bettor occasionally wanders in while the window is open.
        if engine.betting_open() && rng.gen_bool(0.5) {
            let subject = subjects.choose(&mut rng).expect("bettors configured");
            let target = *TARGETS.choose(&mut rng).expect("targets are non-empty");
            let stake = rng.gen_range(10..=100);
            if let Err(e) = engine.place_bet(subject, engine.current_period(), target, stake) {
                warn!(subject = %subject, error = %e, "bet rejected");
            }
        }

        if let Some(report) = engine.tick_at(Utc::now())? {
            settled += 1;
            info!(
                period = %report.period,
                number = report.outcome.number,
                winners = report.winners,
                credited = report.total_credited,
                "round complete"
            );
        }
    }

    for subject in &subjects {
        info!(subject = %subject, balance = engine.balance(subject), "final balance");
    }
    println!("{}", serde_json::to_string_pretty(&engine.stats())?);

    Ok(())
}

//! Core entities: periods, rounds, bet selections, and outcomes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Round identifier: a `YYMMDD` date prefix plus a 3-digit zero-padded
/// sequence that resets to 001 at date rollover.
///
/// Ordering follows (date, sequence), so periods are strictly increasing
/// within a day and across days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    date: NaiveDate,
    sequence: u32,
}

impl Period {
    /// First period of the given day (`<prefix>001`).
    pub fn first(date: NaiveDate) -> Self {
        Self { date, sequence: 1 }
    }

    /// Successor period: next sequence on the same day, or `001` of `today`
    /// when the date rolled over.
    pub fn next(&self, today: NaiveDate) -> Self {
        if today != self.date {
            Self::first(today)
        } else {
            Self {
                date: self.date,
                sequence: self.sequence + 1,
            }
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.date.format("%y%m%d"), self.sequence)
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 7 || !s.is_ascii() {
            return Err(format!("malformed period '{}'", s));
        }
        let date = NaiveDate::parse_from_str(&s[..6], "%y%m%d")
            .map_err(|e| format!("invalid period date prefix '{}': {}", &s[..6], e))?;
        let sequence: u32 = s[6..]
            .parse()
            .map_err(|_| format!("invalid period sequence '{}'", &s[6..]))?;
        if sequence == 0 {
            return Err("period sequence starts at 001".to_string());
        }
        Ok(Self { date, sequence })
    }
}

impl Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Bet colors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Green,
    Violet,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => write!(f, "red"),
            Color::Green => write!(f, "green"),
            Color::Violet => write!(f, "violet"),
        }
    }
}

/// Fixed number-to-color map. 0 and 5 carry a color pair.
pub fn colors_for_number(number: u8) -> &'static [Color] {
    match number {
        0 => &[Color::Violet, Color::Red],
        5 => &[Color::Violet, Color::Green],
        1 | 3 | 7 | 9 => &[Color::Green],
        2 | 4 | 6 | 8 => &[Color::Red],
        _ => panic!("outcome number {} outside [0, 9]", number),
    }
}

/// What a selection bets on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum BetTarget {
    Color(Color),
    Number(u8),
}

impl fmt::Display for BetTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetTarget::Color(c) => write!(f, "color:{}", c),
            BetTarget::Number(n) => write!(f, "number:{}", n),
        }
    }
}

/// Lifecycle of a round.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoundStatus {
    Open,
    Locked,
    /// Terminal: the round was abandoned after a suspension. A voided round
    /// never receives an outcome.
    Voided,
    Settled,
}

/// A betting round. Exactly one round is Open at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub period: Period,
    pub status: RoundStatus,
    pub opened_at: DateTime<Utc>,
}

impl Round {
    pub fn open(period: Period, opened_at: DateTime<Utc>) -> Self {
        Self {
            period,
            status: RoundStatus::Open,
            opened_at,
        }
    }
}

/// Resolution state of a selection. `Won` carries the credited payout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SelectionStatus {
    Pending,
    Won { payout: u64 },
    Lost,
}

/// A recorded bet. Immutable once created; only the status transitions,
/// exactly once, at settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selection {
    pub id: Uuid,
    pub period: Period,
    pub subject_id: String,
    pub target: BetTarget,
    pub stake: u64,
    pub status: SelectionStatus,
    pub placed_at: DateTime<Utc>,
}

/// The drawn result of a round. One outcome per settled round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Outcome {
    pub period: Period,
    pub number: u8,
    pub colors: Vec<Color>,
}

impl Outcome {
    /// Build the outcome for a drawn number, deriving colors from the fixed
    /// map. Panics on a number outside [0, 9]; generators never produce one.
    pub fn for_number(period: Period, number: u8) -> Self {
        Self {
            period,
            number,
            colors: colors_for_number(number).to_vec(),
        }
    }

    pub fn has_color(&self, color: Color) -> bool {
        self.colors.contains(&color)
    }
}

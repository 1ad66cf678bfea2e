//! Game engines.
//!
//! Each engine is a pure function of bet parameters, its fixed
//! enumerations and the entropy source. Engines never touch the ledger or
//! the session store; the coordinator orchestrates persistence.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod blackjack;
pub mod cards;
pub mod chess;
pub mod poker;
pub mod roulette;

pub use cards::{Card, Deck, Rank, Suit};
pub use chess::ChessBet;
pub use poker::PokerStage;
pub use roulette::RouletteBet;

/// Transaction category. The four games plus the balance top-up path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Roulette,
    Blackjack,
    Poker,
    Chess,
    Purchase,
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameType::Roulette => "roulette",
            GameType::Blackjack => "blackjack",
            GameType::Poker => "poker",
            GameType::Chess => "chess",
            GameType::Purchase => "purchase",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for GameType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "roulette" => Ok(GameType::Roulette),
            "blackjack" => Ok(GameType::Blackjack),
            "poker" => Ok(GameType::Poker),
            "chess" => Ok(GameType::Chess),
            "purchase" => Ok(GameType::Purchase),
            other => Err(format!("unknown game type: {}", other)),
        }
    }
}

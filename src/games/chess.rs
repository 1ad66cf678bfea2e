//! Chess betting simulator.
//!
//! This is a probability-weighted outcome draw with flavor text, not a
//! legal-move engine. Callers bet on a side; the simulated result decides
//! the payout.

use crate::rng::EntropySource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opening names used for flavor only.
const OPENINGS: [&str; 8] = [
    "King's Gambit",
    "Sicilian Defence",
    "French Defence",
    "Ruy Lopez",
    "Italian Game",
    "Slav Defence",
    "Caro-Kann Defence",
    "Queen's Gambit",
];

const WHITE_FINISHES: [&str; 4] = [
    "The black king is mated.",
    "Black resigns.",
    "White breaks through on the kingside.",
    "A decisive combination in the endgame.",
];

const BLACK_FINISHES: [&str; 4] = [
    "The white king is mated.",
    "White resigns.",
    "Black lands a crushing counterattack.",
    "Black dominates the middlegame.",
];

const DRAW_FINISHES: [&str; 5] = [
    "Threefold repetition.",
    "Draw by agreement.",
    "Stalemate.",
    "Fifty-move rule.",
    "Insufficient mating material.",
];

/// Side the player bets on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChessBet {
    White,
    Black,
    Draw,
}

impl fmt::Display for ChessBet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChessBet::White => "white",
            ChessBet::Black => "black",
            ChessBet::Draw => "draw",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ChessBet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "white" => Ok(ChessBet::White),
            "black" => Ok(ChessBet::Black),
            "draw" => Ok(ChessBet::Draw),
            other => Err(format!("unknown chess bet: {}", other)),
        }
    }
}

/// Simulated game result
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChessOutcome {
    White,
    Black,
    Draw,
}

/// One simulated game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedGame {
    pub outcome: ChessOutcome,
    pub opening: &'static str,
    pub moves: u32,
    pub summary: String,
}

/// Draw an outcome with weights close to real chess: white ~37%,
/// black ~27%, draw ~36%.
pub fn simulate(rng: &mut EntropySource) -> SimulatedGame {
    let opening = OPENINGS[rng.draw_uniform(OPENINGS.len())];
    let moves = rng.range_inclusive(25, 80);

    let roll = rng.chance();
    let outcome = if roll < 0.37 {
        ChessOutcome::White
    } else if roll < 0.64 {
        ChessOutcome::Black
    } else {
        ChessOutcome::Draw
    };

    let (headline, finishes): (&str, &[&'static str]) = match outcome {
        ChessOutcome::White => ("White wins!", &WHITE_FINISHES),
        ChessOutcome::Black => ("Black wins!", &BLACK_FINISHES),
        ChessOutcome::Draw => ("Draw!", &DRAW_FINISHES),
    };
    let finish = finishes[rng.draw_uniform(finishes.len())];

    let summary = format!(
        "Game over! Opening: {}. Moves played: {}. {} {}",
        opening, moves, headline, finish
    );

    SimulatedGame {
        outcome,
        opening,
        moves,
        summary,
    }
}

/// Payout for a settled bet: white/black pay x2.2, draw pays x3,
/// anything else loses.
pub fn payout(bet: ChessBet, amount: u64, outcome: ChessOutcome) -> u64 {
    if amount == 0 {
        return 0;
    }

    match (bet, outcome) {
        (ChessBet::White, ChessOutcome::White) | (ChessBet::Black, ChessOutcome::Black) => {
            amount * 22 / 10
        }
        (ChessBet::Draw, ChessOutcome::Draw) => amount * 3,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payout_table() {
        assert_eq!(payout(ChessBet::White, 10, ChessOutcome::White), 22);
        assert_eq!(payout(ChessBet::Black, 10, ChessOutcome::Black), 22);
        assert_eq!(payout(ChessBet::Draw, 10, ChessOutcome::Draw), 30);
        assert_eq!(payout(ChessBet::White, 10, ChessOutcome::Black), 0);
        assert_eq!(payout(ChessBet::Draw, 10, ChessOutcome::White), 0);
        assert_eq!(payout(ChessBet::White, 0, ChessOutcome::White), 0);
    }

    #[test]
    fn test_payout_rounds_down() {
        assert_eq!(payout(ChessBet::White, 5, ChessOutcome::White), 11);
        assert_eq!(payout(ChessBet::Black, 9, ChessOutcome::Black), 19);
    }

    #[test]
    fn test_simulate_shape() {
        let mut rng = EntropySource::new();
        for _ in 0..50 {
            let game = simulate(&mut rng);
            assert!((25..=80).contains(&game.moves));
            assert!(OPENINGS.contains(&game.opening));
            assert!(game.summary.contains(game.opening));
        }
    }
}

//! American roulette engine.
//!
//! Wheel of 38 positions: 0, 00 and 1-36. The engine validates the bet,
//! draws one position and settles against the fixed payout table. It never
//! touches the ledger; callers orchestrate persistence.

use crate::errors::ValidationError;
use crate::rng::EntropySource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wheel encoding for the double zero.
pub const DOUBLE_ZERO: u8 = 37;

/// Red pockets on a standard American wheel.
const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

/// Bet types the wheel accepts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RouletteBet {
    Red,
    Black,
    Zero,
    Low,
    High,
    Even,
    Odd,
}

impl fmt::Display for RouletteBet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RouletteBet::Red => "red",
            RouletteBet::Black => "black",
            RouletteBet::Zero => "zero",
            RouletteBet::Low => "low",
            RouletteBet::High => "high",
            RouletteBet::Even => "even",
            RouletteBet::Odd => "odd",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for RouletteBet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "red" => Ok(RouletteBet::Red),
            "black" => Ok(RouletteBet::Black),
            "zero" => Ok(RouletteBet::Zero),
            "low" => Ok(RouletteBet::Low),
            "high" => Ok(RouletteBet::High),
            "even" => Ok(RouletteBet::Even),
            "odd" => Ok(RouletteBet::Odd),
            other => Err(format!("unknown roulette bet: {}", other)),
        }
    }
}

/// Pocket color
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WheelColor {
    Red,
    Black,
    Green,
}

/// Result of one spin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpinOutcome {
    /// Drawn position (37 encodes 00)
    pub position: u8,
    pub color: WheelColor,
    /// Total returned to the player (0 on a losing spin)
    pub payout: u64,
    pub message: String,
}

/// Color of a wheel position.
pub fn color_of(position: u8) -> WheelColor {
    if RED_NUMBERS.contains(&position) {
        WheelColor::Red
    } else if (1..=36).contains(&position) {
        WheelColor::Black
    } else {
        WheelColor::Green
    }
}

/// Display label for a position ("00" for the double zero).
pub fn position_label(position: u8) -> String {
    if position == DOUBLE_ZERO {
        "00".to_string()
    } else {
        position.to_string()
    }
}

/// Spin the wheel and settle the bet.
pub fn spin(
    bet: RouletteBet,
    amount: u64,
    rng: &mut EntropySource,
) -> Result<SpinOutcome, ValidationError> {
    let position = rng.draw_uniform(38) as u8;
    settle(bet, amount, position)
}

/// Settle a bet against a known position. Pure; forced draws use this
/// directly.
pub fn settle(bet: RouletteBet, amount: u64, position: u8) -> Result<SpinOutcome, ValidationError> {
    if amount == 0 {
        return Err(ValidationError::ZeroBet);
    }

    let color = color_of(position);
    let hit = match bet {
        RouletteBet::Red => color == WheelColor::Red,
        RouletteBet::Black => color == WheelColor::Black,
        RouletteBet::Zero => position == 0,
        RouletteBet::Low => (1..=18).contains(&position),
        RouletteBet::High => (19..=36).contains(&position),
        // 0 and 00 are neither even nor odd on the wheel
        RouletteBet::Even => (1..=36).contains(&position) && position % 2 == 0,
        RouletteBet::Odd => (1..=36).contains(&position) && position % 2 == 1,
    };

    let payout = if hit {
        match bet {
            RouletteBet::Zero => amount * 35,
            _ => amount * 2,
        }
    } else {
        0
    };

    let label = position_label(position);
    let message = if payout > 0 {
        format!("The wheel lands on {} ({:?}). You win {} stars!", label, color, payout)
    } else {
        format!("The wheel lands on {} ({:?}). You lose {} stars.", label, color, amount)
    };

    Ok(SpinOutcome {
        position,
        color,
        payout,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_red_bet_on_red_pocket_pays_double() {
        let outcome = settle(RouletteBet::Red, 10, 1).unwrap();
        assert_eq!(outcome.payout, 20);
        assert_eq!(outcome.position, 1);
        assert_eq!(outcome.color, WheelColor::Red);
    }

    #[test]
    fn test_red_bet_on_zero_loses() {
        let outcome = settle(RouletteBet::Red, 10, 0).unwrap();
        assert_eq!(outcome.payout, 0);
        assert_eq!(outcome.color, WheelColor::Green);
    }

    #[test]
    fn test_zero_bet_jackpot() {
        let outcome = settle(RouletteBet::Zero, 10, 0).unwrap();
        assert_eq!(outcome.payout, 350);
    }

    #[test]
    fn test_double_zero_misses_even_and_zero() {
        assert_eq!(settle(RouletteBet::Even, 10, DOUBLE_ZERO).unwrap().payout, 0);
        assert_eq!(settle(RouletteBet::Zero, 10, DOUBLE_ZERO).unwrap().payout, 0);
        assert_eq!(position_label(DOUBLE_ZERO), "00");
    }

    #[test]
    fn test_low_high_even_odd() {
        assert_eq!(settle(RouletteBet::Low, 5, 18).unwrap().payout, 10);
        assert_eq!(settle(RouletteBet::High, 5, 19).unwrap().payout, 10);
        assert_eq!(settle(RouletteBet::Even, 5, 20).unwrap().payout, 10);
        assert_eq!(settle(RouletteBet::Odd, 5, 21).unwrap().payout, 10);
        assert_eq!(settle(RouletteBet::High, 5, 18).unwrap().payout, 0);
    }

    #[test]
    fn test_zero_amount_rejected() {
        let err = settle(RouletteBet::Red, 0, 1).unwrap_err();
        assert_eq!(err, ValidationError::ZeroBet);
    }

    #[test]
    fn test_spin_position_in_wheel() {
        let mut rng = EntropySource::new();
        for _ in 0..100 {
            let outcome = spin(RouletteBet::Red, 10, &mut rng).unwrap();
            assert!(outcome.position <= DOUBLE_ZERO);
        }
    }
}

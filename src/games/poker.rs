//! Texas hold'em subset: staged community dealing and a 7-card evaluator.
//!
//! The house hand has no decision logic; it always calls. Showdown picks
//! the best 5-card subset of the 7 available cards per side.

use crate::games::cards::Card;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Community dealing stages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PokerStage {
    Preflop,
    Flop,
    Turn,
    River,
}

impl PokerStage {
    /// Cards dealt to the board when advancing out of this stage.
    pub fn cards_to_deal(&self) -> usize {
        match self {
            PokerStage::Preflop => 3,
            PokerStage::Flop | PokerStage::Turn => 1,
            PokerStage::River => 0,
        }
    }

    pub fn next(&self) -> Option<PokerStage> {
        match self {
            PokerStage::Preflop => Some(PokerStage::Flop),
            PokerStage::Flop => Some(PokerStage::Turn),
            PokerStage::Turn => Some(PokerStage::River),
            PokerStage::River => None,
        }
    }
}

impl fmt::Display for PokerStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PokerStage::Preflop => "preflop",
            PokerStage::Flop => "flop",
            PokerStage::Turn => "turn",
            PokerStage::River => "river",
        };
        write!(f, "{}", s)
    }
}

/// Standard 10-tier hand ranking, weakest first
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum HandCategory {
    HighCard = 1,
    Pair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush = 10,
}

impl HandCategory {
    pub fn label(&self) -> &'static str {
        match self {
            HandCategory::HighCard => "high card",
            HandCategory::Pair => "pair",
            HandCategory::TwoPair => "two pair",
            HandCategory::ThreeOfAKind => "three of a kind",
            HandCategory::Straight => "straight",
            HandCategory::Flush => "flush",
            HandCategory::FullHouse => "full house",
            HandCategory::FourOfAKind => "four of a kind",
            HandCategory::StraightFlush => "straight flush",
            HandCategory::RoyalFlush => "royal flush",
        }
    }
}

/// Evaluated strength of a hand. Ordering is lexicographic on
/// (category, tiebreak), which is exactly the showdown comparison.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct HandRank {
    pub category: HandCategory,
    /// Sum of the five card values (wheel straights score the ace as 1)
    pub tiebreak: u32,
}

/// Showdown result from the player's side
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PokerResult {
    Win,
    Push,
    Loss,
}

/// Best 5-card rank from up to 7 cards.
///
/// The search is bounded at C(7,5) = 21 combinations; extra cards beyond
/// seven are ignored.
pub fn evaluate_hand(cards: &[Card]) -> HandRank {
    let cards: Vec<Card> = cards.iter().copied().take(7).collect();

    cards
        .iter()
        .copied()
        .combinations(5)
        .map(|five| evaluate_five(&five))
        .max()
        .unwrap_or(HandRank {
            category: HandCategory::HighCard,
            tiebreak: cards.iter().map(|c| c.rank.poker_value()).sum(),
        })
}

/// Rank exactly five cards.
fn evaluate_five(hand: &[Card]) -> HandRank {
    let mut values: Vec<u32> = hand.iter().map(|c| c.rank.poker_value()).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));

    let is_flush = hand.iter().all(|c| c.suit == hand[0].suit);

    let mut is_straight = values.windows(2).all(|w| w[0] == w[1] + 1);
    if !is_straight && values == [14, 5, 4, 3, 2] {
        // The wheel: the ace plays low and scores 1
        is_straight = true;
        values = vec![5, 4, 3, 2, 1];
    }

    let mut rank_counts: HashMap<u32, u32> = HashMap::new();
    for v in &values {
        *rank_counts.entry(*v).or_insert(0) += 1;
    }
    let mut shape: Vec<u32> = rank_counts.values().copied().collect();
    shape.sort_unstable_by(|a, b| b.cmp(a));

    let tiebreak: u32 = values.iter().sum();

    let category = if is_flush && is_straight && values[0] == 14 && values[4] == 10 {
        HandCategory::RoyalFlush
    } else if is_flush && is_straight {
        HandCategory::StraightFlush
    } else if shape == [4, 1] {
        HandCategory::FourOfAKind
    } else if shape == [3, 2] {
        HandCategory::FullHouse
    } else if is_flush {
        HandCategory::Flush
    } else if is_straight {
        HandCategory::Straight
    } else if shape == [3, 1, 1] {
        HandCategory::ThreeOfAKind
    } else if shape == [2, 2, 1] {
        HandCategory::TwoPair
    } else if shape == [2, 1, 1, 1] {
        HandCategory::Pair
    } else {
        HandCategory::HighCard
    };

    HandRank { category, tiebreak }
}

/// Compare the two sides at showdown.
pub fn showdown(player: HandRank, house: HandRank) -> PokerResult {
    match player.cmp(&house) {
        std::cmp::Ordering::Greater => PokerResult::Win,
        std::cmp::Ordering::Equal => PokerResult::Push,
        std::cmp::Ordering::Less => PokerResult::Loss,
    }
}

/// Payout multiplier for a showdown result: win pays double, a push
/// returns the stake.
pub fn multiplier(result: PokerResult) -> u64 {
    match result {
        PokerResult::Win => 2,
        PokerResult::Push => 1,
        PokerResult::Loss => 0,
    }
}

//! Blackjack engine.
//!
//! Hand scoring, the dealer's fixed drawing policy and winner settlement.
//! Deck and session state live with the coordinator.

use crate::games::cards::{Card, Deck, Rank};
use serde::{Deserialize, Serialize};

/// Dealer draws to 17; capped as a bound against deck exhaustion.
const DEALER_STAND_VALUE: u32 = 17;
const DEALER_MAX_DRAWS: usize = 10;

/// Terminal result of a round
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BlackjackResult {
    PlayerBust,
    DealerBust,
    PlayerWin,
    Push,
    DealerWin,
}

impl BlackjackResult {
    pub fn message(&self) -> &'static str {
        match self {
            BlackjackResult::PlayerBust => "Bust! You lose.",
            BlackjackResult::DealerBust => "Dealer busts! You win!",
            BlackjackResult::PlayerWin => "You win!",
            BlackjackResult::Push => "Push. Your stake is returned.",
            BlackjackResult::DealerWin => "Dealer wins.",
        }
    }
}

/// Score a hand. Aces start at 11 and downgrade to 1 one at a time while
/// the total is over 21. Invariant to card order.
pub fn hand_value(hand: &[Card]) -> u32 {
    let mut value: u32 = hand.iter().map(|c| c.rank.blackjack_value()).sum();
    let mut soft_aces = hand.iter().filter(|c| c.rank == Rank::Ace).count();

    while value > 21 && soft_aces > 0 {
        value -= 10;
        soft_aces -= 1;
    }

    value
}

/// Natural blackjack: 21 from exactly two cards.
pub fn is_blackjack(hand: &[Card]) -> bool {
    hand.len() == 2 && hand_value(hand) == 21
}

/// Dealer draws while under 17, stopping on the draw cap or an empty deck.
pub fn dealer_play(deck: &mut Deck, dealer_hand: &mut Vec<Card>) {
    let mut draws = 0;
    while hand_value(dealer_hand) < DEALER_STAND_VALUE && draws < DEALER_MAX_DRAWS {
        match deck.draw() {
            Some(card) => dealer_hand.push(card),
            None => break,
        }
        draws += 1;
    }
}

/// Determine the winner and the payout multiplier.
///
/// Checked in order: player bust, dealer bust, player ahead, push, else
/// dealer wins. A push returns the stake (multiplier 1).
pub fn settle(player_value: u32, dealer_value: u32) -> (u64, BlackjackResult) {
    if player_value > 21 {
        (0, BlackjackResult::PlayerBust)
    } else if dealer_value > 21 {
        (2, BlackjackResult::DealerBust)
    } else if player_value > dealer_value {
        (2, BlackjackResult::PlayerWin)
    } else if player_value == dealer_value {
        (1, BlackjackResult::Push)
    } else {
        (0, BlackjackResult::DealerWin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::cards::Suit;
    use crate::rng::EntropySource;

    fn card(rank: Rank) -> Card {
        Card::new(rank, Suit::Spades)
    }

    #[test]
    fn test_ace_king_is_blackjack() {
        let hand = vec![
            Card::new(Rank::Ace, Suit::Spades),
            Card::new(Rank::King, Suit::Hearts),
        ];
        assert_eq!(hand_value(&hand), 21);
        assert!(is_blackjack(&hand));
    }

    #[test]
    fn test_two_aces_downgrade() {
        let hand = vec![
            Card::new(Rank::Ace, Suit::Spades),
            Card::new(Rank::Ace, Suit::Hearts),
            Card::new(Rank::Nine, Suit::Clubs),
        ];
        // 11 + 11 + 9 = 31, one ace drops to 1
        assert_eq!(hand_value(&hand), 21);
        assert!(!is_blackjack(&hand));
    }

    #[test]
    fn test_hand_value_order_invariant() {
        let mut hand = vec![card(Rank::Ace), card(Rank::Seven), card(Rank::Five)];
        let forward = hand_value(&hand);
        hand.reverse();
        assert_eq!(hand_value(&hand), forward);
    }

    #[test]
    fn test_all_aces_never_bust_until_forced() {
        let hand = vec![card(Rank::Ace); 4];
        // 11 + 1 + 1 + 1
        assert_eq!(hand_value(&hand), 14);
    }

    #[test]
    fn test_settle_ordering() {
        assert_eq!(settle(22, 18), (0, BlackjackResult::PlayerBust));
        assert_eq!(settle(20, 22), (2, BlackjackResult::DealerBust));
        assert_eq!(settle(20, 18), (2, BlackjackResult::PlayerWin));
        assert_eq!(settle(19, 19), (1, BlackjackResult::Push));
        assert_eq!(settle(17, 19), (0, BlackjackResult::DealerWin));
        // Both over 21 counts against the player first
        assert_eq!(settle(22, 23), (0, BlackjackResult::PlayerBust));
    }

    #[test]
    fn test_dealer_stands_at_17() {
        let mut rng = EntropySource::new();
        let mut deck = Deck::shuffled(&mut rng);
        let mut dealer = vec![deck.draw().unwrap(), deck.draw().unwrap()];
        dealer_play(&mut deck, &mut dealer);

        let value = hand_value(&dealer);
        assert!(value >= DEALER_STAND_VALUE || dealer.len() >= 2 + DEALER_MAX_DRAWS);
    }
}

//! Bet validation.
//!
//! Pure checks run before any ledger mutation; a rejected bet leaves no
//! trace anywhere.

use crate::config::BetRange;
use crate::errors::ValidationError;

/// Validate a stake against the game's limits and the player's balance.
pub fn validate_bet(amount: u64, range: BetRange, balance: u64) -> Result<(), ValidationError> {
    if amount == 0 {
        return Err(ValidationError::ZeroBet);
    }
    if amount < range.min {
        return Err(ValidationError::BelowMinimum { min: range.min });
    }
    if amount > range.max {
        return Err(ValidationError::AboveMaximum { max: range.max });
    }
    if amount > balance {
        return Err(ValidationError::InsufficientBalance {
            balance,
            bet: amount,
        });
    }

    Ok(())
}

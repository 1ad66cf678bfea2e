//! Stars Casino core.
//!
//! A coordination layer for a chat casino: a persistent star ledger, four
//! game engines (roulette, blackjack, poker, chess) and a per-user session
//! model that keeps every user's rounds strictly serialized.

pub mod bets;
pub mod casino;
pub mod config;
pub mod errors;
pub mod games;
pub mod ledger;
pub mod rng;
pub mod session;
pub mod storage;

pub use casino::{Action, Casino, Outcome, RoundPayout};
pub use config::{CasinoConfig, ConfigLoader};
pub use errors::{CasinoError, CasinoResult};
pub use games::{ChessBet, GameType, RouletteBet};
pub use ledger::{GameStats, Ledger, LedgerTransaction, TransactionKind};
pub use rng::EntropySource;
pub use session::SessionStore;
pub use storage::Storage;

//! Persistent balance ledger, transaction log and per-game statistics.
//!
//! Records are JSON values under prefixed keys:
//!   `user:{id}`                     account record
//!   `tx:{id}:{inverted seq}`        append-only transactions, newest first
//!   `txseq:{id}`                    per-user transaction counter
//!   `stats:{id}:{game}`             per-game aggregates
//!
//! Every balance mutation happens under a per-user lock and lands in one
//! atomic batch together with its transaction record, so a debit can never
//! exist without the record that explains it. Distinct users never contend.

use crate::errors::{CasinoResult, LedgerError, StorageError};
use crate::games::GameType;
use crate::storage::Storage;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Transaction kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Bet,
    Win,
    Purchase,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionKind::Bet => "bet",
            TransactionKind::Win => "win",
            TransactionKind::Purchase => "purchase",
        };
        write!(f, "{}", s)
    }
}

/// Account record. Never deleted; mutated only through ledger operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub user_id: u64,
    pub username: String,
    pub balance: u64,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    #[serde(default)]
    pub banned: bool,
}

/// Immutable append-only transaction record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub id: Uuid,
    pub user_id: u64,
    pub game: GameType,
    /// Signed: debits negative, credits positive
    pub amount: i64,
    pub kind: TransactionKind,
    pub timestamp: DateTime<Utc>,
}

/// Per (user, game) aggregate; every field is monotonically non-decreasing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStats {
    pub games_played: u64,
    pub games_won: u64,
    pub total_bet: u64,
    pub total_won: u64,
}

fn user_key(user_id: u64) -> Vec<u8> {
    format!("user:{}", user_id).into_bytes()
}

fn tx_key(user_id: u64, seq: u64) -> Vec<u8> {
    // Inverted sequence so a forward prefix scan yields newest first
    format!("tx:{}:{:020}", user_id, u64::MAX - seq).into_bytes()
}

fn tx_prefix(user_id: u64) -> Vec<u8> {
    format!("tx:{}:", user_id).into_bytes()
}

fn tx_seq_key(user_id: u64) -> Vec<u8> {
    format!("txseq:{}", user_id).into_bytes()
}

fn stats_key(user_id: u64, game: GameType) -> Vec<u8> {
    format!("stats:{}:{}", user_id, game).into_bytes()
}

fn stats_prefix(user_id: u64) -> Vec<u8> {
    format!("stats:{}:", user_id).into_bytes()
}

/// The ledger. Cheap to clone; clones share storage and locks.
#[derive(Clone)]
pub struct Ledger {
    storage: Storage,
    ceiling: u64,
    locks: Arc<DashMap<u64, Arc<Mutex<()>>>>,
}

impl Ledger {
    pub fn new(storage: Storage, ceiling: u64) -> Self {
        Self {
            storage,
            ceiling,
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Serialization point for one user's read-modify-write cycles.
    fn user_lock(&self, user_id: u64) -> Arc<Mutex<()>> {
        self.locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn load_account(&self, user_id: u64) -> CasinoResult<Option<UserAccount>> {
        match self.storage.get(&user_key(user_id)) {
            Some(bytes) => {
                let account: UserAccount = serde_json::from_slice(&bytes).map_err(|e| {
                    StorageError::CorruptedData(format!(
                        "Failed to decode account {}: {}",
                        user_id, e
                    ))
                })?;
                Ok(Some(account))
            }
            None => Ok(None),
        }
    }

    fn require_account(&self, user_id: u64) -> CasinoResult<UserAccount> {
        self.load_account(user_id)?
            .ok_or_else(|| LedgerError::UnknownUser(user_id).into())
    }

    /// Idempotent upsert on first interaction.
    pub fn create_user_if_absent(
        &self,
        user_id: u64,
        username: &str,
        start_balance: u64,
    ) -> CasinoResult<UserAccount> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().map_err(|_| poisoned())?;

        if let Some(existing) = self.load_account(user_id)? {
            return Ok(existing);
        }

        let now = Utc::now();
        let account = UserAccount {
            user_id,
            username: username.to_string(),
            balance: start_balance,
            created_at: now,
            last_active: now,
            banned: false,
        };
        self.storage
            .put(&user_key(user_id), &serde_json::to_vec(&account)?)?;

        tracing::info!(user_id, username, start_balance, "created user account");
        Ok(account)
    }

    pub fn get_balance(&self, user_id: u64) -> CasinoResult<u64> {
        Ok(self.require_account(user_id)?.balance)
    }

    pub fn is_banned(&self, user_id: u64) -> CasinoResult<bool> {
        Ok(self
            .load_account(user_id)?
            .map(|a| a.banned)
            .unwrap_or(false))
    }

    /// Flip the banned flag (operator action).
    pub fn set_banned(&self, user_id: u64, banned: bool) -> CasinoResult<()> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().map_err(|_| poisoned())?;

        let mut account = self.require_account(user_id)?;
        account.banned = banned;
        self.storage
            .put(&user_key(user_id), &serde_json::to_vec(&account)?)
    }

    /// Atomic balance adjustment with no transaction record.
    ///
    /// Rejects any result below zero or above the ceiling, leaving the
    /// balance untouched. Returns the new balance.
    pub fn adjust_balance(&self, user_id: u64, delta: i64) -> CasinoResult<u64> {
        self.mutate(user_id, delta, None)
    }

    /// Debit a stake and record the bet transaction in one atomic batch.
    pub fn debit_stake(&self, user_id: u64, game: GameType, amount: u64) -> CasinoResult<u64> {
        self.mutate(
            user_id,
            -(amount as i64),
            Some((game, -(amount as i64), TransactionKind::Bet)),
        )
    }

    /// Credit a payout and record the win transaction in one atomic batch.
    pub fn credit_win(&self, user_id: u64, game: GameType, amount: u64) -> CasinoResult<u64> {
        self.mutate(
            user_id,
            amount as i64,
            Some((game, amount as i64, TransactionKind::Win)),
        )
    }

    /// Credit a balance top-up (payment path).
    pub fn credit_purchase(&self, user_id: u64, amount: u64) -> CasinoResult<u64> {
        self.mutate(
            user_id,
            amount as i64,
            Some((GameType::Purchase, amount as i64, TransactionKind::Purchase)),
        )
    }

    /// Append a transaction record without touching the balance.
    pub fn record_transaction(
        &self,
        user_id: u64,
        game: GameType,
        amount: i64,
        kind: TransactionKind,
    ) -> CasinoResult<()> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().map_err(|_| poisoned())?;

        let items = self.transaction_items(user_id, game, amount, kind)?;
        self.storage.batch_write(&items)
    }

    /// The single balance mutation path. Holds the user lock across the
    /// read-check-write cycle and batches the account update with the
    /// optional transaction record.
    fn mutate(
        &self,
        user_id: u64,
        delta: i64,
        record: Option<(GameType, i64, TransactionKind)>,
    ) -> CasinoResult<u64> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().map_err(|_| poisoned())?;

        let mut account = self.require_account(user_id)?;
        let new_balance = account.balance as i128 + delta as i128;

        if new_balance < 0 {
            return Err(LedgerError::InsufficientFunds {
                balance: account.balance,
                debit: delta.unsigned_abs(),
            }
            .into());
        }
        if new_balance > self.ceiling as i128 {
            return Err(LedgerError::BalanceOverflow {
                ceiling: self.ceiling,
            }
            .into());
        }

        account.balance = new_balance as u64;
        account.last_active = Utc::now();

        let mut items = vec![(user_key(user_id), serde_json::to_vec(&account)?)];
        if let Some((game, amount, kind)) = record {
            items.extend(self.transaction_items(user_id, game, amount, kind)?);
        }
        self.storage.batch_write(&items)?;

        tracing::debug!(user_id, delta, balance = account.balance, "balance adjusted");
        Ok(account.balance)
    }

    /// Build the batch items for one transaction record plus its counter.
    fn transaction_items(
        &self,
        user_id: u64,
        game: GameType,
        amount: i64,
        kind: TransactionKind,
    ) -> CasinoResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let seq = self
            .storage
            .get(&tx_seq_key(user_id))
            .and_then(|bytes| bytes.try_into().ok().map(u64::from_be_bytes))
            .unwrap_or(0);

        let record = LedgerTransaction {
            id: Uuid::new_v4(),
            user_id,
            game,
            amount,
            kind,
            timestamp: Utc::now(),
        };

        Ok(vec![
            (tx_key(user_id, seq), serde_json::to_vec(&record)?),
            (tx_seq_key(user_id), (seq + 1).to_be_bytes().to_vec()),
        ])
    }

    /// Record one completed or forfeited round in the aggregates.
    pub fn upsert_game_stats(
        &self,
        user_id: u64,
        game: GameType,
        won: bool,
        bet_amount: u64,
        win_amount: u64,
    ) -> CasinoResult<()> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().map_err(|_| poisoned())?;

        let key = stats_key(user_id, game);
        let mut stats: GameStats = match self.storage.get(&key) {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                StorageError::CorruptedData(format!("Failed to decode stats: {}", e))
            })?,
            None => GameStats::default(),
        };

        stats.games_played += 1;
        if won {
            stats.games_won += 1;
        }
        stats.total_bet += bet_amount;
        stats.total_won += win_amount;

        self.storage.put(&key, &serde_json::to_vec(&stats)?)
    }

    /// All per-game aggregates for one user.
    pub fn get_stats(&self, user_id: u64) -> CasinoResult<Vec<(GameType, GameStats)>> {
        let prefix = stats_prefix(user_id);
        let mut out = Vec::new();

        for (key, value) in self.storage.scan_prefix(&prefix, 16) {
            let suffix = String::from_utf8_lossy(&key[prefix.len()..]).to_string();
            let Ok(game) = suffix.parse::<GameType>() else {
                tracing::warn!(user_id, key = %suffix, "skipping unknown stats key");
                continue;
            };
            let stats: GameStats = serde_json::from_slice(&value).map_err(|e| {
                StorageError::CorruptedData(format!("Failed to decode stats: {}", e))
            })?;
            out.push((game, stats));
        }

        Ok(out)
    }

    /// Newest-first transaction history (snapshot read for reporting).
    pub fn transactions(&self, user_id: u64, limit: usize) -> CasinoResult<Vec<LedgerTransaction>> {
        let prefix = tx_prefix(user_id);
        let mut out = Vec::new();

        for (_key, value) in self.storage.scan_prefix(&prefix, limit) {
            let record: LedgerTransaction = serde_json::from_slice(&value).map_err(|e| {
                StorageError::CorruptedData(format!("Failed to decode transaction: {}", e))
            })?;
            out.push(record);
        }

        Ok(out)
    }

    /// Settle one finished round: credit any payout and bump the stats,
    /// exactly once. Returns the resulting balance.
    pub fn settle_round(
        &self,
        user_id: u64,
        game: GameType,
        bet: u64,
        payout: u64,
        won: bool,
    ) -> CasinoResult<u64> {
        if payout > 0 {
            self.credit_win(user_id, game, payout)?;
        }
        self.upsert_game_stats(user_id, game, won, bet, payout)?;
        self.get_balance(user_id)
    }
}

fn poisoned() -> crate::errors::CasinoError {
    StorageError::WriteFailed("user lock poisoned".to_string()).into()
}

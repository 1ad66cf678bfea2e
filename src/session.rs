//! In-memory game sessions.
//!
//! At most one active session per user. Sessions hold the full state of a
//! multi-step round; roulette resolves in one step and never creates one.
//! An idle session past its deadline is swept by the reaper and the stake
//! forfeited.

use crate::errors::{CasinoResult, SessionError};
use crate::games::{Card, ChessBet, Deck, GameType, PokerStage};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Full state of one in-flight round. Tagged per game so the coordinator
/// can never apply a blackjack action to a poker session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum SessionState {
    Blackjack {
        deck: Deck,
        player_hand: Vec<Card>,
        dealer_hand: Vec<Card>,
    },
    Poker {
        deck: Deck,
        player_hand: Vec<Card>,
        house_hand: Vec<Card>,
        community: Vec<Card>,
        stage: PokerStage,
    },
    Chess {
        pick: ChessBet,
    },
}

impl SessionState {
    pub fn game(&self) -> GameType {
        match self {
            SessionState::Blackjack { .. } => GameType::Blackjack,
            SessionState::Poker { .. } => GameType::Poker,
            SessionState::Chess { .. } => GameType::Chess,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub user_id: u64,
    pub bet: u64,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every action; the reaper sweeps past it
    pub deadline: DateTime<Utc>,
    pub state: SessionState,
}

impl GameSession {
    pub fn game(&self) -> GameType {
        self.state.game()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.deadline
    }
}

/// Session registry. Cheap to clone; clones share the maps.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<u64, GameSession>>,
    locks: Arc<DashMap<u64, Arc<Mutex<()>>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            locks: Arc::new(DashMap::new()),
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    /// The per-user lock serializing every action of one user, including
    /// the reaper's forfeit of that user's session.
    pub fn user_lock(&self, user_id: u64) -> Arc<Mutex<()>> {
        self.locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Start a session. Rejects with the existing session's game if one is
    /// already active.
    pub fn begin(&self, user_id: u64, bet: u64, state: SessionState) -> CasinoResult<()> {
        let now = Utc::now();
        let session = GameSession {
            user_id,
            bet,
            created_at: now,
            deadline: now + self.ttl,
            state,
        };

        match self.sessions.entry(user_id) {
            dashmap::mapref::entry::Entry::Occupied(existing) => {
                Err(SessionError::Conflict {
                    game: existing.get().game().to_string(),
                }
                .into())
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                tracing::debug!(user_id, game = %session.game(), bet, "session started");
                slot.insert(session);
                Ok(())
            }
        }
    }

    /// Mutate the active session in place and refresh its deadline.
    pub fn with_session<T>(
        &self,
        user_id: u64,
        f: impl FnOnce(&mut GameSession) -> T,
    ) -> CasinoResult<T> {
        let mut entry = self
            .sessions
            .get_mut(&user_id)
            .ok_or(SessionError::NotFound)?;
        entry.deadline = Utc::now() + self.ttl;
        Ok(f(entry.value_mut()))
    }

    /// Remove and return the active session.
    pub fn take(&self, user_id: u64) -> CasinoResult<GameSession> {
        self.sessions
            .remove(&user_id)
            .map(|(_, session)| session)
            .ok_or_else(|| SessionError::NotFound.into())
    }

    pub fn active_game(&self, user_id: u64) -> Option<GameType> {
        self.sessions.get(&user_id).map(|s| s.game())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Users whose sessions have passed their deadline as of `now`.
    pub fn expired_ids(&self, now: DateTime<Utc>) -> Vec<u64> {
        self.sessions
            .iter()
            .filter(|entry| entry.value().is_expired(now))
            .map(|entry| *entry.key())
            .collect()
    }

    /// Remove one session only if it is still expired. Called under the
    /// user lock so an action that raced the reaper and refreshed the
    /// deadline wins.
    pub fn take_if_expired(&self, user_id: u64, now: DateTime<Utc>) -> Option<GameSession> {
        self.sessions
            .remove_if(&user_id, |_, session| session.is_expired(now))
            .map(|(_, session)| session)
    }
}

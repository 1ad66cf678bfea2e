//! The coordinator: one entry point tying bets, sessions, engines and the
//! ledger together.
//!
//! Every action of one user runs under that user's session lock, so a
//! user's rounds are strictly serialized while distinct users proceed in
//! parallel. The reaper takes the same lock before forfeiting an idle
//! session, which makes forfeit and a late action mutually exclusive.

use crate::bets::validate_bet;
use crate::config::{BetLimits, CasinoConfig};
use crate::errors::{CasinoResult, LedgerError, SessionError};
use crate::games::blackjack;
use crate::games::cards::{format_hand, Deck};
use crate::games::chess::{self, ChessBet};
use crate::games::poker::{self, PokerStage};
use crate::games::roulette::{self, RouletteBet};
use crate::games::GameType;
use crate::ledger::Ledger;
use crate::rng::EntropySource;
use crate::session::{GameSession, SessionState, SessionStore};
use crate::storage::Storage;
use chrono::{DateTime, Utc};

/// Everything a user can ask the casino to do.
#[derive(Debug, Clone)]
pub enum Action {
    Register { username: String },
    Balance,
    Stats,
    Purchase { amount: u64 },
    RouletteSpin { bet: RouletteBet, amount: u64 },
    BlackjackDeal { amount: u64 },
    BlackjackHit,
    BlackjackStand,
    PokerDeal { amount: u64 },
    PokerAdvance,
    PokerFold,
    ChessBet { pick: ChessBet, amount: u64 },
    ChessReveal,
    ChessResign,
    QuitToMenu,
}

/// Money movement of one settled round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundPayout {
    pub game: GameType,
    pub bet: u64,
    /// Total returned to the player, stake included on a win or push
    pub payout: u64,
    pub balance: u64,
}

/// What the user sees after an action.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub text: String,
    /// Present only when a round settled in this action
    pub payout: Option<RoundPayout>,
    /// Suggested follow-up commands
    pub next: Vec<&'static str>,
}

impl Outcome {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            payout: None,
            next: Vec::new(),
        }
    }

    fn with_next(mut self, next: &[&'static str]) -> Self {
        self.next = next.to_vec();
        self
    }
}

/// The casino core. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct Casino {
    ledger: Ledger,
    sessions: SessionStore,
    limits: BetLimits,
    start_balance: u64,
}

impl Casino {
    /// Open the ledger storage and wire up the coordinator.
    pub fn open(config: &CasinoConfig) -> CasinoResult<Self> {
        let storage = Storage::open(&config.storage.data_dir)?;
        Ok(Self::with_storage(storage, config))
    }

    pub fn with_storage(storage: Storage, config: &CasinoConfig) -> Self {
        Self {
            ledger: Ledger::new(storage, config.balances.ceiling),
            sessions: SessionStore::new(config.sessions.ttl_secs),
            limits: config.limits.clone(),
            start_balance: config.balances.start_balance,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Run one action for one user, serialized against every other action
    /// and reaper sweep for the same user.
    pub async fn dispatch(&self, user_id: u64, action: Action) -> CasinoResult<Outcome> {
        let lock = self.sessions.user_lock(user_id);
        let _guard = lock.lock().await;

        if let Action::Register { username } = &action {
            return self.register(user_id, username);
        }

        if self.ledger.is_banned(user_id)? {
            return Err(LedgerError::UserBanned(user_id).into());
        }

        match action {
            Action::Register { .. } => unreachable!("handled above"),
            Action::Balance => self.balance(user_id),
            Action::Stats => self.stats(user_id),
            Action::Purchase { amount } => self.purchase(user_id, amount),
            Action::RouletteSpin { bet, amount } => self.roulette_spin(user_id, bet, amount),
            Action::BlackjackDeal { amount } => self.blackjack_deal(user_id, amount),
            Action::BlackjackHit => self.blackjack_hit(user_id),
            Action::BlackjackStand => self.blackjack_stand(user_id),
            Action::PokerDeal { amount } => self.poker_deal(user_id, amount),
            Action::PokerAdvance => self.poker_advance(user_id),
            Action::PokerFold => self.forfeit(
                user_id,
                GameType::Poker,
                "You fold. The pot goes to the house.",
            ),
            Action::ChessBet { pick, amount } => self.chess_bet(user_id, pick, amount),
            Action::ChessReveal => self.chess_reveal(user_id),
            Action::ChessResign => self.forfeit(
                user_id,
                GameType::Chess,
                "You resign. Your stake is forfeited.",
            ),
            Action::QuitToMenu => self.quit_to_menu(user_id),
        }
    }

    fn register(&self, user_id: u64, username: &str) -> CasinoResult<Outcome> {
        let account = self
            .ledger
            .create_user_if_absent(user_id, username, self.start_balance)?;
        Ok(Outcome::text(format!(
            "Welcome, {}! Your balance is {} stars.",
            account.username, account.balance
        ))
        .with_next(&["balance", "roulette", "blackjack", "poker", "chess"]))
    }

    fn balance(&self, user_id: u64) -> CasinoResult<Outcome> {
        let balance = self.ledger.get_balance(user_id)?;
        Ok(Outcome::text(format!("Your balance: {} stars", balance)))
    }

    fn stats(&self, user_id: u64) -> CasinoResult<Outcome> {
        // Validates the user exists before reading aggregates
        self.ledger.get_balance(user_id)?;
        let stats = self.ledger.get_stats(user_id)?;

        if stats.is_empty() {
            return Ok(Outcome::text("No games played yet."));
        }

        let mut lines = vec!["Your statistics:".to_string()];
        for (game, s) in stats {
            lines.push(format!(
                "  {}: {} played, {} won, {} bet, {} won back",
                game, s.games_played, s.games_won, s.total_bet, s.total_won
            ));
        }
        Ok(Outcome::text(lines.join("\n")))
    }

    fn purchase(&self, user_id: u64, amount: u64) -> CasinoResult<Outcome> {
        if amount == 0 {
            return Err(crate::errors::ValidationError::ZeroBet.into());
        }
        let balance = self.ledger.credit_purchase(user_id, amount)?;
        tracing::info!(user_id, amount, balance, "purchase credited");
        Ok(Outcome::text(format!(
            "Purchased {} stars. New balance: {}",
            amount, balance
        )))
    }

    /// Ensure no session is active, check limits and take the stake.
    fn stake(&self, user_id: u64, game: GameType, amount: u64) -> CasinoResult<()> {
        if let Some(active) = self.sessions.active_game(user_id) {
            return Err(SessionError::Conflict {
                game: active.to_string(),
            }
            .into());
        }

        let balance = self.ledger.get_balance(user_id)?;
        validate_bet(amount, self.limits.for_game(game), balance)?;
        self.ledger.debit_stake(user_id, game, amount)?;
        Ok(())
    }

    /// Credit the payout, bump the stats and build the settlement record.
    fn settle(
        &self,
        user_id: u64,
        game: GameType,
        bet: u64,
        payout: u64,
    ) -> CasinoResult<RoundPayout> {
        let won = payout > bet;
        let balance = self.ledger.settle_round(user_id, game, bet, payout, won)?;
        tracing::info!(user_id, game = %game, bet, payout, balance, "round settled");
        Ok(RoundPayout {
            game,
            bet,
            payout,
            balance,
        })
    }

    // ---- roulette (single step, no session) ----

    fn roulette_spin(&self, user_id: u64, bet: RouletteBet, amount: u64) -> CasinoResult<Outcome> {
        self.stake(user_id, GameType::Roulette, amount)?;

        let mut rng = EntropySource::new();
        let spin = roulette::spin(bet, amount, &mut rng)?;
        let round = self.settle(user_id, GameType::Roulette, amount, spin.payout)?;

        Ok(Outcome {
            text: format!("{} Balance: {}", spin.message, round.balance),
            payout: Some(round),
            next: vec!["roulette", "balance"],
        })
    }

    // ---- blackjack ----

    fn blackjack_deal(&self, user_id: u64, amount: u64) -> CasinoResult<Outcome> {
        self.stake(user_id, GameType::Blackjack, amount)?;

        let mut rng = EntropySource::new();
        let mut deck = Deck::shuffled(&mut rng);
        let player_hand = vec![draw(&mut deck), draw(&mut deck)];
        let dealer_hand = vec![draw(&mut deck), draw(&mut deck)];

        if blackjack::is_blackjack(&player_hand) {
            // Natural 21 resolves without a session
            return self.blackjack_resolve(user_id, amount, deck, player_hand, dealer_hand);
        }

        let text = format!(
            "Your hand: {} ({})\nDealer shows: {}",
            format_hand(&player_hand),
            blackjack::hand_value(&player_hand),
            dealer_hand[0]
        );
        self.sessions.begin(
            user_id,
            amount,
            SessionState::Blackjack {
                deck,
                player_hand,
                dealer_hand,
            },
        )?;

        Ok(Outcome::text(text).with_next(&["hit", "stand"]))
    }

    fn blackjack_hit(&self, user_id: u64) -> CasinoResult<Outcome> {
        let hit = self.sessions.with_session(user_id, |session| {
            let SessionState::Blackjack {
                deck, player_hand, ..
            } = &mut session.state
            else {
                return None;
            };
            if let Some(card) = deck.draw() {
                player_hand.push(card);
            }
            Some((format_hand(player_hand), blackjack::hand_value(player_hand)))
        })?;

        let Some((hand, value)) = hit else {
            return Err(wrong_game(self.sessions.active_game(user_id)));
        };

        if value >= 21 {
            // Bust or 21; either way the player has no further decision
            return self.blackjack_stand(user_id);
        }

        Ok(Outcome::text(format!("Your hand: {} ({})", hand, value))
            .with_next(&["hit", "stand"]))
    }

    fn blackjack_stand(&self, user_id: u64) -> CasinoResult<Outcome> {
        let session = self.take_session(user_id, GameType::Blackjack)?;
        let SessionState::Blackjack {
            deck,
            player_hand,
            dealer_hand,
        } = session.state
        else {
            unreachable!("checked by take_session");
        };

        self.blackjack_resolve(user_id, session.bet, deck, player_hand, dealer_hand)
    }

    fn blackjack_resolve(
        &self,
        user_id: u64,
        bet: u64,
        mut deck: Deck,
        player_hand: Vec<crate::games::Card>,
        mut dealer_hand: Vec<crate::games::Card>,
    ) -> CasinoResult<Outcome> {
        let player_value = blackjack::hand_value(&player_hand);
        if player_value <= 21 {
            blackjack::dealer_play(&mut deck, &mut dealer_hand);
        }
        let dealer_value = blackjack::hand_value(&dealer_hand);

        let (mult, result) = blackjack::settle(player_value, dealer_value);
        let payout = bet * mult;
        let round = self.settle(user_id, GameType::Blackjack, bet, payout)?;

        let text = format!(
            "Your hand: {} ({})\nDealer: {} ({})\n{} Balance: {}",
            format_hand(&player_hand),
            player_value,
            format_hand(&dealer_hand),
            dealer_value,
            result.message(),
            round.balance
        );

        Ok(Outcome {
            text,
            payout: Some(round),
            next: vec!["blackjack", "balance"],
        })
    }

    // ---- poker ----

    fn poker_deal(&self, user_id: u64, amount: u64) -> CasinoResult<Outcome> {
        self.stake(user_id, GameType::Poker, amount)?;

        let mut rng = EntropySource::new();
        let mut deck = Deck::shuffled(&mut rng);
        let player_hand = vec![draw(&mut deck), draw(&mut deck)];
        let house_hand = vec![draw(&mut deck), draw(&mut deck)];

        let text = format!("Your hole cards: {}", format_hand(&player_hand));
        self.sessions.begin(
            user_id,
            amount,
            SessionState::Poker {
                deck,
                player_hand,
                house_hand,
                community: Vec::new(),
                stage: PokerStage::Preflop,
            },
        )?;

        Ok(Outcome::text(text).with_next(&["advance", "fold"]))
    }

    fn poker_advance(&self, user_id: u64) -> CasinoResult<Outcome> {
        let advanced = self.sessions.with_session(user_id, |session| {
            let SessionState::Poker {
                deck,
                community,
                stage,
                ..
            } = &mut session.state
            else {
                return None;
            };
            for _ in 0..stage.cards_to_deal() {
                if let Some(card) = deck.draw() {
                    community.push(card);
                }
            }
            if let Some(next) = stage.next() {
                *stage = next;
            }
            Some((format_hand(community), *stage))
        })?;

        let Some((board, stage)) = advanced else {
            return Err(wrong_game(self.sessions.active_game(user_id)));
        };

        if stage == PokerStage::River {
            return self.poker_showdown(user_id);
        }

        Ok(
            Outcome::text(format!("Board after the {}: {}", stage, board))
                .with_next(&["advance", "fold"]),
        )
    }

    fn poker_showdown(&self, user_id: u64) -> CasinoResult<Outcome> {
        let session = self.take_session(user_id, GameType::Poker)?;
        let SessionState::Poker {
            player_hand,
            house_hand,
            community,
            ..
        } = session.state
        else {
            unreachable!("checked by take_session");
        };

        let mut player_cards = player_hand.clone();
        player_cards.extend_from_slice(&community);
        let mut house_cards = house_hand.clone();
        house_cards.extend_from_slice(&community);

        let player_rank = poker::evaluate_hand(&player_cards);
        let house_rank = poker::evaluate_hand(&house_cards);
        let result = poker::showdown(player_rank, house_rank);

        let payout = session.bet * poker::multiplier(result);
        let round = self.settle(user_id, GameType::Poker, session.bet, payout)?;

        let verdict = match result {
            poker::PokerResult::Win => "You win!",
            poker::PokerResult::Push => "Push. Your stake is returned.",
            poker::PokerResult::Loss => "The house wins.",
        };
        let text = format!(
            "Board: {}\nYour hand: {} ({})\nHouse: {} ({})\n{} Balance: {}",
            format_hand(&community),
            format_hand(&player_hand),
            player_rank.category.label(),
            format_hand(&house_hand),
            house_rank.category.label(),
            verdict,
            round.balance
        );

        Ok(Outcome {
            text,
            payout: Some(round),
            next: vec!["poker", "balance"],
        })
    }

    // ---- chess ----

    fn chess_bet(&self, user_id: u64, pick: ChessBet, amount: u64) -> CasinoResult<Outcome> {
        self.stake(user_id, GameType::Chess, amount)?;
        self.sessions
            .begin(user_id, amount, SessionState::Chess { pick })?;

        Ok(Outcome::text(format!(
            "You bet {} stars on {}. The game is underway.",
            amount, pick
        ))
        .with_next(&["reveal", "resign"]))
    }

    fn chess_reveal(&self, user_id: u64) -> CasinoResult<Outcome> {
        let session = self.take_session(user_id, GameType::Chess)?;
        let SessionState::Chess { pick } = session.state else {
            unreachable!("checked by take_session");
        };

        let mut rng = EntropySource::new();
        let game = chess::simulate(&mut rng);
        let payout = chess::payout(pick, session.bet, game.outcome);
        let round = self.settle(user_id, GameType::Chess, session.bet, payout)?;

        let verdict = if payout > 0 {
            format!("Your bet on {} pays {} stars!", pick, payout)
        } else {
            format!("Your bet on {} loses.", pick)
        };
        Ok(Outcome {
            text: format!("{}\n{} Balance: {}", game.summary, verdict, round.balance),
            payout: Some(round),
            next: vec!["chess", "balance"],
        })
    }

    // ---- session plumbing ----

    /// Take the active session, requiring it to belong to `game`.
    fn take_session(&self, user_id: u64, game: GameType) -> CasinoResult<GameSession> {
        match self.sessions.active_game(user_id) {
            Some(active) if active == game => self.sessions.take(user_id),
            other => Err(wrong_game(other)),
        }
    }

    /// Forfeit the active session of `game`: the stake stays debited and
    /// the round counts as a loss.
    fn forfeit(&self, user_id: u64, game: GameType, text: &str) -> CasinoResult<Outcome> {
        let session = self.take_session(user_id, game)?;
        let round = self.settle(user_id, game, session.bet, 0)?;
        Ok(Outcome {
            text: format!("{} Balance: {}", text, round.balance),
            payout: Some(round),
            next: vec!["balance"],
        })
    }

    fn quit_to_menu(&self, user_id: u64) -> CasinoResult<Outcome> {
        if let Some(game) = self.sessions.active_game(user_id) {
            let mut outcome =
                self.forfeit(user_id, game, "Round abandoned; your stake is forfeited.")?;
            outcome.next = vec!["balance", "roulette", "blackjack", "poker", "chess"];
            return Ok(outcome);
        }
        Ok(Outcome::text("Back to the menu.")
            .with_next(&["balance", "stats", "roulette", "blackjack", "poker", "chess"]))
    }

    /// Sweep sessions idle past their deadline as of `now`, forfeiting each
    /// stake exactly once. Returns the number of sessions swept.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut swept = 0;

        for user_id in self.sessions.expired_ids(now) {
            let lock = self.sessions.user_lock(user_id);
            let _guard = lock.lock().await;

            // An action may have refreshed the deadline while we waited
            let Some(session) = self.sessions.take_if_expired(user_id, now) else {
                continue;
            };

            let game = session.game();
            match self.settle(user_id, game, session.bet, 0) {
                Ok(_) => {
                    tracing::warn!(user_id, game = %game, bet = session.bet, "idle session forfeited");
                    swept += 1;
                }
                Err(e) => {
                    tracing::error!(user_id, error = %e, "failed to settle forfeited session");
                }
            }
        }

        swept
    }
}

fn draw(deck: &mut Deck) -> crate::games::Card {
    // A fresh 52-card deck always covers the opening deal
    deck.draw().unwrap_or_else(|| {
        unreachable!("fresh deck exhausted during deal")
    })
}

fn wrong_game(active: Option<GameType>) -> crate::errors::CasinoError {
    match active {
        Some(game) => SessionError::Conflict {
            game: game.to_string(),
        }
        .into(),
        None => SessionError::NotFound.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CasinoError;

    fn casino() -> (tempfile::TempDir, Casino) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        let config = CasinoConfig::default();
        (dir, Casino::with_storage(storage, &config))
    }

    async fn registered(casino: &Casino, user_id: u64) {
        casino
            .dispatch(
                user_id,
                Action::Register {
                    username: "player".to_string(),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_register_and_balance() {
        let (_dir, casino) = casino();
        registered(&casino, 1).await;

        let outcome = casino.dispatch(1, Action::Balance).await.unwrap();
        assert!(outcome.text.contains("1000"));
    }

    #[tokio::test]
    async fn test_roulette_round_conserves_money() {
        let (_dir, casino) = casino();
        registered(&casino, 1).await;

        let outcome = casino
            .dispatch(
                1,
                Action::RouletteSpin {
                    bet: RouletteBet::Red,
                    amount: 10,
                },
            )
            .await
            .unwrap();

        let round = outcome.payout.unwrap();
        assert_eq!(round.bet, 10);
        assert_eq!(round.balance, 1_000 - 10 + round.payout);
        // Roulette never leaves a session behind
        assert!(casino.sessions().active_game(1).is_none());
    }

    #[tokio::test]
    async fn test_rejected_bet_leaves_no_trace() {
        let (_dir, casino) = casino();
        registered(&casino, 1).await;

        let err = casino
            .dispatch(
                1,
                Action::RouletteSpin {
                    bet: RouletteBet::Red,
                    amount: 3,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CasinoError::Validation(_)));

        let balance = casino.ledger().get_balance(1).unwrap();
        assert_eq!(balance, 1_000);
        assert!(casino.ledger().transactions(1, 10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_game_conflicts_until_resolved() {
        let (_dir, casino) = casino();
        registered(&casino, 1).await;

        casino
            .dispatch(
                1,
                Action::ChessBet {
                    pick: ChessBet::White,
                    amount: 10,
                },
            )
            .await
            .unwrap();

        let err = casino
            .dispatch(1, Action::BlackjackDeal { amount: 10 })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CasinoError::Session(SessionError::Conflict { .. })
        ));

        casino.dispatch(1, Action::ChessReveal).await.unwrap();

        // Resolved; a new round is accepted
        casino
            .dispatch(1, Action::BlackjackDeal { amount: 10 })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_blackjack_round_settles_consistently() {
        let (_dir, casino) = casino();
        registered(&casino, 1).await;

        let deal = casino
            .dispatch(1, Action::BlackjackDeal { amount: 10 })
            .await
            .unwrap();

        let round = if let Some(round) = deal.payout {
            // Natural 21 settled immediately
            round
        } else {
            casino
                .dispatch(1, Action::BlackjackStand)
                .await
                .unwrap()
                .payout
                .unwrap()
        };

        assert_eq!(round.game, GameType::Blackjack);
        assert_eq!(round.balance, 1_000 - 10 + round.payout);
        assert!(casino.sessions().active_game(1).is_none());

        let stats = casino.ledger().get_stats(1).unwrap();
        assert_eq!(stats[0].1.games_played, 1);
    }

    #[tokio::test]
    async fn test_poker_plays_to_showdown() {
        let (_dir, casino) = casino();
        registered(&casino, 1).await;

        casino
            .dispatch(1, Action::PokerDeal { amount: 10 })
            .await
            .unwrap();

        // Preflop -> flop -> turn -> river showdown
        let flop = casino.dispatch(1, Action::PokerAdvance).await.unwrap();
        assert!(flop.payout.is_none());
        let turn = casino.dispatch(1, Action::PokerAdvance).await.unwrap();
        assert!(turn.payout.is_none());
        let river = casino.dispatch(1, Action::PokerAdvance).await.unwrap();

        let round = river.payout.unwrap();
        assert_eq!(round.game, GameType::Poker);
        assert!(round.payout == 0 || round.payout == 10 || round.payout == 20);
        assert_eq!(round.balance, 1_000 - 10 + round.payout);
        assert!(casino.sessions().active_game(1).is_none());
    }

    #[tokio::test]
    async fn test_fold_forfeits_stake() {
        let (_dir, casino) = casino();
        registered(&casino, 1).await;

        casino
            .dispatch(1, Action::PokerDeal { amount: 20 })
            .await
            .unwrap();
        let outcome = casino.dispatch(1, Action::PokerFold).await.unwrap();

        let round = outcome.payout.unwrap();
        assert_eq!(round.payout, 0);
        assert_eq!(round.balance, 980);

        let stats = casino.ledger().get_stats(1).unwrap();
        assert_eq!(stats[0].1.games_played, 1);
        assert_eq!(stats[0].1.games_won, 0);
    }

    #[tokio::test]
    async fn test_fold_rejected_for_wrong_game() {
        let (_dir, casino) = casino();
        registered(&casino, 1).await;

        casino
            .dispatch(
                1,
                Action::ChessBet {
                    pick: ChessBet::White,
                    amount: 10,
                },
            )
            .await
            .unwrap();

        let err = casino.dispatch(1, Action::PokerFold).await.unwrap_err();
        assert!(matches!(
            err,
            CasinoError::Session(SessionError::Conflict { .. })
        ));
        // The chess session is still live
        assert_eq!(casino.sessions().active_game(1), Some(GameType::Chess));
    }

    #[tokio::test]
    async fn test_quit_to_menu_forfeits_active_round() {
        let (_dir, casino) = casino();
        registered(&casino, 1).await;

        casino
            .dispatch(
                1,
                Action::ChessBet {
                    pick: ChessBet::Draw,
                    amount: 10,
                },
            )
            .await
            .unwrap();
        let outcome = casino.dispatch(1, Action::QuitToMenu).await.unwrap();
        assert_eq!(outcome.payout.unwrap().payout, 0);

        // No active round; quitting again is a plain menu hop
        let idle = casino.dispatch(1, Action::QuitToMenu).await.unwrap();
        assert!(idle.payout.is_none());
    }

    #[tokio::test]
    async fn test_purchase_credits_balance() {
        let (_dir, casino) = casino();
        registered(&casino, 1).await;

        let outcome = casino
            .dispatch(1, Action::Purchase { amount: 500 })
            .await
            .unwrap();
        assert!(outcome.text.contains("1500"));
    }

    #[tokio::test]
    async fn test_banned_user_rejected() {
        let (_dir, casino) = casino();
        registered(&casino, 1).await;
        casino.ledger().set_banned(1, true).unwrap();

        let err = casino.dispatch(1, Action::Balance).await.unwrap_err();
        assert!(matches!(
            err,
            CasinoError::Ledger(LedgerError::UserBanned(1))
        ));
    }

    #[tokio::test]
    async fn test_sweep_forfeits_exactly_once() {
        let (_dir, casino) = casino();
        registered(&casino, 1).await;

        casino
            .dispatch(
                1,
                Action::ChessBet {
                    pick: ChessBet::White,
                    amount: 10,
                },
            )
            .await
            .unwrap();

        let later = Utc::now() + chrono::Duration::seconds(601);
        assert_eq!(casino.sweep_expired(later).await, 1);
        assert_eq!(casino.sweep_expired(later).await, 0);

        assert!(casino.sessions().active_game(1).is_none());
        assert_eq!(casino.ledger().get_balance(1).unwrap(), 990);

        let stats = casino.ledger().get_stats(1).unwrap();
        assert_eq!(stats[0].1.games_played, 1);
        assert_eq!(stats[0].1.games_won, 0);
    }

    #[tokio::test]
    async fn test_sweep_skips_live_sessions() {
        let (_dir, casino) = casino();
        registered(&casino, 1).await;

        casino
            .dispatch(
                1,
                Action::ChessBet {
                    pick: ChessBet::White,
                    amount: 10,
                },
            )
            .await
            .unwrap();

        assert_eq!(casino.sweep_expired(Utc::now()).await, 0);
        assert_eq!(casino.sessions().active_game(1), Some(GameType::Chess));
    }

    #[tokio::test]
    async fn test_hit_without_session_rejected() {
        let (_dir, casino) = casino();
        registered(&casino, 1).await;

        let err = casino.dispatch(1, Action::BlackjackHit).await.unwrap_err();
        assert!(matches!(
            err,
            CasinoError::Session(SessionError::NotFound)
        ));
    }
}

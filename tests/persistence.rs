//! Test to verify ledger persistence across restarts
//! This validates that balances, transactions and stats survive reopening

use stars_casino::casino::{Action, Casino};
use stars_casino::config::CasinoConfig;
use stars_casino::games::{GameType, RouletteBet};
use stars_casino::storage::Storage;

#[tokio::test]
async fn test_ledger_persists_across_restarts() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = CasinoConfig::default();

    // === PHASE 1: Register, play, buy, record the balance, drop ===
    let balance_before = {
        let storage = Storage::open(dir.path()).expect("open storage");
        let casino = Casino::with_storage(storage, &config);

        casino
            .dispatch(
                7,
                Action::Register {
                    username: "alice".to_string(),
                },
            )
            .await
            .expect("register");

        casino
            .dispatch(7, Action::Purchase { amount: 250 })
            .await
            .expect("purchase");

        casino
            .dispatch(
                7,
                Action::RouletteSpin {
                    bet: RouletteBet::Red,
                    amount: 10,
                },
            )
            .await
            .expect("spin");

        casino.ledger().get_balance(7).expect("balance")
        // Casino dropped here, releasing the database lock
    };

    // === PHASE 2: Reopen and verify everything survived ===
    let storage = Storage::open(dir.path()).expect("reopen storage");
    let casino = Casino::with_storage(storage, &config);

    assert_eq!(
        casino.ledger().get_balance(7).expect("balance"),
        balance_before,
        "balance should survive a restart"
    );

    // Registration is idempotent and must not reset the balance
    casino
        .dispatch(
            7,
            Action::Register {
                username: "alice".to_string(),
            },
        )
        .await
        .expect("re-register");
    assert_eq!(casino.ledger().get_balance(7).expect("balance"), balance_before);

    // Transactions: purchase, roulette bet and maybe a win, newest first
    let txs = casino.ledger().transactions(7, 10).expect("transactions");
    assert!(txs.len() >= 2, "expected purchase and bet records");
    assert!(txs.iter().any(|tx| tx.game == GameType::Purchase));
    assert!(txs.iter().any(|tx| tx.game == GameType::Roulette && tx.amount == -10));

    // Stats recorded exactly one roulette round
    let stats = casino.ledger().get_stats(7).expect("stats");
    let (_, roulette) = stats
        .iter()
        .find(|(game, _)| *game == GameType::Roulette)
        .expect("roulette stats");
    assert_eq!(roulette.games_played, 1);
    assert_eq!(roulette.total_bet, 10);
}

#[tokio::test]
async fn test_sessions_do_not_survive_restart() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = CasinoConfig::default();

    {
        let storage = Storage::open(dir.path()).expect("open storage");
        let casino = Casino::with_storage(storage, &config);
        casino
            .dispatch(
                7,
                Action::Register {
                    username: "alice".to_string(),
                },
            )
            .await
            .expect("register");
        casino
            .dispatch(7, Action::BlackjackDeal { amount: 10 })
            .await
            .expect("deal");
    }

    // Sessions are in-memory; a restart starts clean and a new round
    // is accepted immediately
    let storage = Storage::open(dir.path()).expect("reopen storage");
    let casino = Casino::with_storage(storage, &config);
    assert!(casino.sessions().active_game(7).is_none());
}

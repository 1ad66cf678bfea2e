//! Stars Casino Binary
//!
//! Interactive console front end over the casino core. One local user,
//! the full game loop: roulette, blackjack, poker and chess.

use clap::Parser;
use stars_casino::casino::{Action, Casino, Outcome};
use stars_casino::config::ConfigLoader;
use stars_casino::games::{ChessBet, RouletteBet};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stars-casino")]
#[command(about = "Stars Casino console", long_about = None)]
struct Args {
    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<String>,

    /// Ledger database directory (overrides the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// User id to play as
    #[arg(long, default_value = "1")]
    user: u64,

    /// Username registered on first run
    #[arg(long, default_value = "player")]
    username: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_path(path);
    }
    let mut config = loader.load()?;
    if let Some(dir) = &args.data_dir {
        config.storage.data_dir = dir.clone();
    }

    println!("📂 Opening ledger database: {}", config.storage.data_dir);
    let casino = Casino::open(&config)?;
    println!("✅ Ledger opened successfully");

    // Background reaper sweeping idle sessions
    let reaper = casino.clone();
    let interval_secs = config.sessions.reaper_interval_secs;
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            let swept = reaper.sweep_expired(chrono::Utc::now()).await;
            if swept > 0 {
                tracing::info!(swept, "reaper forfeited idle sessions");
            }
        }
    });

    let outcome = casino
        .dispatch(
            args.user,
            Action::Register {
                username: args.username.clone(),
            },
        )
        .await?;
    println!("🎰 {}", outcome.text);
    print_hints(&outcome);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }

        let action = match parse_command(&line) {
            Ok(action) => action,
            Err(usage) => {
                println!("❓ {}", usage);
                continue;
            }
        };

        match casino.dispatch(args.user, action).await {
            Ok(outcome) => {
                println!("{}", outcome.text);
                print_hints(&outcome);
            }
            Err(e) => println!("⚠️  {}", e),
        }
    }

    println!("👋 Goodbye!");
    Ok(())
}

fn print_hints(outcome: &Outcome) {
    if !outcome.next.is_empty() {
        println!("   ({})", outcome.next.join(", "));
    }
}

/// Map one console line onto an action.
fn parse_command(line: &str) -> Result<Action, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    match parts.as_slice() {
        ["balance"] => Ok(Action::Balance),
        ["stats"] => Ok(Action::Stats),
        ["menu"] => Ok(Action::QuitToMenu),
        ["buy", amount] => Ok(Action::Purchase {
            amount: parse_amount(amount)?,
        }),
        ["roulette", bet, amount] => Ok(Action::RouletteSpin {
            bet: bet
                .parse::<RouletteBet>()
                .map_err(|_| "bets: red black zero low high even odd".to_string())?,
            amount: parse_amount(amount)?,
        }),
        ["blackjack", amount] => Ok(Action::BlackjackDeal {
            amount: parse_amount(amount)?,
        }),
        ["hit"] => Ok(Action::BlackjackHit),
        ["stand"] => Ok(Action::BlackjackStand),
        ["poker", amount] => Ok(Action::PokerDeal {
            amount: parse_amount(amount)?,
        }),
        ["advance"] => Ok(Action::PokerAdvance),
        ["fold"] => Ok(Action::PokerFold),
        ["chess", pick, amount] => Ok(Action::ChessBet {
            pick: pick
                .parse::<ChessBet>()
                .map_err(|_| "picks: white black draw".to_string())?,
            amount: parse_amount(amount)?,
        }),
        ["reveal"] => Ok(Action::ChessReveal),
        ["resign"] => Ok(Action::ChessResign),
        _ => Err(
            "commands: balance | stats | buy N | roulette <bet> N | blackjack N | hit | stand \
             | poker N | advance | fold | chess <pick> N | reveal | resign | menu | quit"
                .to_string(),
        ),
    }
}

fn parse_amount(s: &str) -> Result<u64, String> {
    s.parse::<u64>()
        .map_err(|_| format!("not an amount: {}", s))
}

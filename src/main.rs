//! Squares - Super Bowl squares pool backend
//! Mission: Resolve each quarter's winning squares and notify the owners
//!
//! Usage:
//!   squares board draw --seed 2024
//!   squares claim --quarter 1 --row 0 --col 3 --user-id u1 --name Alice
//!   squares resolve --quarter 2 --home 10 --away 3
//!   squares winners --quarter 2 --home 10 --away 3

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use squares_backend::{
    models::Config,
    notify::{notify_winners, LogSink},
    squares::{Claim, DigitPermutation, Resolver, ScoreEvent},
    store::PoolStore,
};

/// Squares pool winner resolution
#[derive(Parser, Debug)]
#[command(name = "squares")]
#[command(about = "Resolve squares pool winners and manage the board")]
struct Cli {
    /// Path to the SQLite pool database
    #[arg(long, env = "DATABASE_PATH")]
    db_path: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct ScoreArgs {
    /// Quarter (1-4)
    #[arg(short, long)]
    quarter: u8,

    /// Home team score
    #[arg(long)]
    home: u32,

    /// Away team score
    #[arg(long)]
    away: u32,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the winning squares for a score as JSON
    Resolve {
        #[command(flatten)]
        score: ScoreArgs,

        /// Row digits, comma separated (defaults to the active board)
        #[arg(long, value_delimiter = ',')]
        rows: Option<Vec<u8>>,

        /// Column digits, comma separated (defaults to the active board)
        #[arg(long, value_delimiter = ',')]
        cols: Option<Vec<u8>>,
    },

    /// Resolve against the active board, match claims and notify winners
    Winners {
        #[command(flatten)]
        score: ScoreArgs,

        /// Print summaries without dispatching notices
        #[arg(long)]
        dry_run: bool,
    },

    /// Manage board numbers
    Board {
        #[command(subcommand)]
        action: BoardCommand,
    },

    /// Set team names
    Teams {
        #[arg(long)]
        home: String,

        #[arg(long)]
        away: String,
    },

    /// Claim a square for a participant
    Claim {
        #[arg(short, long)]
        quarter: u8,

        #[arg(long)]
        row: usize,

        #[arg(long)]
        col: usize,

        #[arg(long)]
        user_id: String,

        #[arg(long, default_value = "")]
        name: String,

        #[arg(long, default_value = "1")]
        entry: u32,
    },
}

#[derive(Subcommand, Debug)]
enum BoardCommand {
    /// Set explicit board numbers
    Set {
        #[arg(long, value_delimiter = ',')]
        rows: Vec<u8>,

        #[arg(long, value_delimiter = ',')]
        cols: Vec<u8>,
    },

    /// Draw random board numbers
    Draw {
        /// Seed for a reproducible draw
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show the active board numbers
    Show,
}

fn main() -> Result<()> {
    let config = Config::from_env()?;
    let cli = Cli::parse();

    init_tracing();

    let db_path = cli.db_path.unwrap_or_else(|| config.database_path.clone());
    let open_store = || PoolStore::new(&db_path);

    match cli.command {
        Commands::Resolve { score, rows, cols } => {
            let score = score_event(&score)?;
            let (rows, cols) = match (rows, cols) {
                (Some(rows), Some(cols)) => (DigitPermutation::new(rows), DigitPermutation::new(cols)),
                (None, None) => {
                    let board = open_store()?
                        .active_board()?
                        .context("No board numbers set yet")?;
                    (board.home_numbers, board.away_numbers)
                }
                _ => bail!("--rows and --cols must be given together"),
            };

            let resolver = Resolver::new(config.prize_schedule()?);
            let cells = resolver.resolve(&score, &rows, &cols)?;
            println!("{}", serde_json::to_string_pretty(&cells)?);
        }
        Commands::Winners { score, dry_run } => {
            let score = score_event(&score)?;
            let resolver = Resolver::new(config.prize_schedule()?);
            let outcome =
                notify_winners(&open_store()?, &resolver, &score, &mut LogSink, dry_run)?;
            println!("{}", serde_json::to_string_pretty(&outcome.summaries)?);

            let report = outcome.report;
            info!(
                notices_sent = report.notices_sent,
                total_winners = report.total_winners,
                "{}",
                report.message
            );
        }
        Commands::Board { action } => {
            let store = open_store()?;
            match action {
                BoardCommand::Set { rows, cols } => {
                    let board = store
                        .set_active_board(&DigitPermutation::new(rows), &DigitPermutation::new(cols))?;
                    println!("{}", serde_json::to_string_pretty(&board)?);
                }
                BoardCommand::Draw { seed } => {
                    let mut rng = match seed {
                        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                        None => ChaCha8Rng::from_entropy(),
                    };
                    let rows = DigitPermutation::shuffled(&mut rng);
                    let cols = DigitPermutation::shuffled(&mut rng);
                    let board = store.set_active_board(&rows, &cols)?;
                    println!("{}", serde_json::to_string_pretty(&board)?);
                }
                BoardCommand::Show => match store.active_board()? {
                    Some(board) => println!("{}", serde_json::to_string_pretty(&board)?),
                    None => warn!("No board numbers set yet"),
                },
            }
        }
        Commands::Teams { home, away } => {
            open_store()?.set_team_names(&home, &away)?;
        }
        Commands::Claim {
            quarter,
            row,
            col,
            user_id,
            name,
            entry,
        } => {
            let claim = Claim::new(quarter, row, col, user_id, name).with_entry_number(entry);
            open_store()?.add_claim(&claim)?;
        }
    }

    Ok(())
}

fn score_event(args: &ScoreArgs) -> Result<ScoreEvent> {
    Ok(ScoreEvent::new(args.quarter, args.home, args.away)?)
}

/// Initialize tracing, logging to stderr so stdout stays clean JSON
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "squares_backend=info,squares=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

//! Pot Ledger CLI
//!
//! Records buy-ins, cash-outs and mints against a ledger file and prints
//! balances and histories derived from it.
//!
//! # Usage
//!
//! ```bash
//! pot-ledger --ledger ledger.json add-player alice
//! pot-ledger --ledger ledger.json buy-in alice 100
//! pot-ledger --ledger ledger.json --name 1001=Alice leaderboard
//! ```
//!
//! # Environment Variables
//!
//! - `POT_LEDGER_PATH`: ledger file used when `--ledger` is not given
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use clap::{Parser, Subcommand};
use pot_ledger::{
    projector, report, Clock, LedgerEntry, NameDirectory, NameResolver, Result, SystemClock,
    TransactionLog, DEFAULT_STARTING_BANK,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "pot-ledger")]
#[command(about = "Record transfers to and from a shared pot and report on them")]
struct Cli {
    /// Ledger file (also read from `POT_LEDGER_PATH`).
    #[arg(long, env = "POT_LEDGER_PATH", default_value = "ledger.json")]
    ledger: PathBuf,

    /// Display name for an identifier, as `ID=NAME`. May be repeated.
    #[arg(long = "name", value_name = "ID=NAME", value_parser = parse_name)]
    names: Vec<(String, String)>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a new player and mint their starting bank.
    AddPlayer {
        who: String,
        #[arg(long, default_value_t = DEFAULT_STARTING_BANK, allow_negative_numbers = true)]
        bank: i64,
    },
    /// Move AMOUNT from a participant into the pot.
    BuyIn {
        who: String,
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    /// Pay AMOUNT out of the pot to a participant.
    CashOut {
        who: String,
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    /// Create AMOUNT of new value for a participant.
    Mint {
        who: String,
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    /// Move AMOUNT between two arbitrary identifiers.
    Transfer {
        from: String,
        to: String,
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    /// Print one identifier's balance.
    Balance { who: String },
    /// Print one participant's balance and pot activity.
    Stats { who: String },
    /// Print participants ranked by balance.
    Leaderboard,
    /// Print one participant's balance after each of their entries.
    History { who: String },
    /// Print everyone's balances at the end of each settlement round.
    Rounds,
    /// Print the raw log as CSV.
    Export,
}

fn parse_name(pair: &str) -> std::result::Result<(String, String), String> {
    NameDirectory::parse_pair(pair).ok_or_else(|| format!("expected ID=NAME, got `{}`", pair))
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let log = TransactionLog::load(&cli.ledger)?;
    let names: NameDirectory = cli.names.into_iter().collect();
    let clock = SystemClock;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match cli.command {
        Command::AddPlayer { who, bank } => {
            log.register_player(&who, bank, clock.now())?;
        }
        Command::BuyIn { who, amount } => {
            log.append(LedgerEntry::buy_in(who, amount, clock.now()))?;
        }
        Command::CashOut { who, amount } => {
            log.append(LedgerEntry::cash_out(who, amount, clock.now()))?;
        }
        Command::Mint { who, amount } => {
            log.append(LedgerEntry::mint(who, amount, clock.now()))?;
        }
        Command::Transfer { from, to, amount } => {
            log.append(LedgerEntry::transfer(from, to, amount, clock.now()))?;
        }
        Command::Balance { who } => {
            let snapshot = log.snapshot();
            let balance = projector::balance(&snapshot, &who);
            writeln!(handle, "{} {}", names.resolve_name(&who), balance)?;
        }
        Command::Stats { who } => {
            let snapshot = log.snapshot();
            report::write_stats(&snapshot, &who, &names, handle)?;
        }
        Command::Leaderboard => {
            let snapshot = log.snapshot();
            report::write_leaderboard(&snapshot, &names, handle)?;
        }
        Command::History { who } => {
            let snapshot = log.snapshot();
            report::write_history(&snapshot, &who, handle)?;
        }
        Command::Rounds => {
            let snapshot = log.snapshot();
            report::write_rounds(&snapshot, &names, handle)?;
        }
        Command::Export => {
            log.export_csv(handle)?;
        }
    }

    Ok(())
}

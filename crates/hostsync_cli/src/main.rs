//! Operator CLI over the hostsync configuration store.
//!
//! # Responsibility
//! - List hosts, compare two hosts and copy slots for one category.
//! - Keep output line-oriented so it can be piped into other tools.

use clap::{Parser, Subcommand, ValueEnum};
use hostsync_core::db::open_db;
use hostsync_core::{
    default_log_level, init_logging, JumpPoints, Keybindings, ReconcileService,
    Settings, SqliteConfigStore, TableSchema,
};
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "hostsync")]
#[command(about = "Compare and copy per-host settings, keybindings and jump points")]
struct Cli {
    /// SQLite configuration store; created and migrated when missing.
    #[arg(long, global = true, default_value = "hostsync.sqlite3")]
    db: PathBuf,
    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, global = true)]
    log_dir: Option<String>,
    /// Log level for `--log-dir`; defaults to `debug` in debug builds, `info` otherwise.
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print core linkage and version.
    Version,
    /// List hosts discovered for a category.
    Hosts { category: CategoryArg },
    /// Classify slots between two hosts.
    Compare {
        category: CategoryArg,
        host1: String,
        host2: String,
        /// Emit the comparison as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Copy slot values from one host to another.
    ///
    /// Keybinding slots are written as `context:action`.
    Copy {
        category: CategoryArg,
        from: String,
        to: String,
        slots: Vec<String>,
        /// Copy every slot whose values differ between the two hosts.
        #[arg(long, conflicts_with = "slots")]
        different: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryArg {
    Settings,
    Keybindings,
    Jumppoints,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    let category = match &cli.cmd {
        Command::Version => {
            println!("hostsync_core ping={}", hostsync_core::ping());
            println!("hostsync_core version={}", hostsync_core::core_version());
            return Ok(());
        }
        Command::Hosts { category }
        | Command::Compare { category, .. }
        | Command::Copy { category, .. } => *category,
    };

    let conn = open_db(&cli.db)?;
    let store = SqliteConfigStore::try_new(&conn)?;
    match category {
        CategoryArg::Settings => run_category::<Settings>(store, &cli.cmd),
        CategoryArg::Keybindings => run_category::<Keybindings>(store, &cli.cmd),
        CategoryArg::Jumppoints => run_category::<JumpPoints>(store, &cli.cmd),
    }
}

fn run_category<C>(store: SqliteConfigStore<'_>, cmd: &Command) -> CliResult<()>
where
    C: TableSchema,
    C::Slot: FromStr + Serialize,
    <C::Slot as FromStr>::Err: Error + 'static,
    C::Value: Display + Serialize,
{
    let mut service = ReconcileService::<C, _>::load(store)?;

    match cmd {
        Command::Version => {}
        Command::Hosts { .. } => {
            for host in service.hosts() {
                println!("{host}");
            }
        }
        Command::Compare {
            host1, host2, json, ..
        } => {
            let result = service.compare(host1, host2)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }
            println!("only on {host1}:");
            for entry in &result.only_host1 {
                println!("  {} = {}", entry.slot, entry.value);
            }
            println!("only on {host2}:");
            for entry in &result.only_host2 {
                println!("  {} = {}", entry.slot, entry.value);
            }
            println!("matching:");
            for entry in &result.matching {
                println!("  {} = {}", entry.slot, entry.value);
            }
            println!("different ({host1} | {host2}):");
            for entry in &result.different {
                println!(
                    "  {} = {} | {}",
                    entry.slot, entry.host1_value, entry.host2_value
                );
            }
        }
        Command::Copy {
            from,
            to,
            slots,
            different,
            ..
        } => {
            let slots = if *different {
                service.compare(from, to)?.different_slots()
            } else {
                slots
                    .iter()
                    .map(|slot| slot.parse::<C::Slot>())
                    .collect::<Result<Vec<_>, _>>()?
            };
            info!(
                "event=cli_copy module=cli status=start category={} from_host={} to_host={} requested={}",
                C::NAME,
                from,
                to,
                slots.len()
            );
            let outcome = service.copy(from, to, &slots)?;
            for slot in &outcome.copied {
                println!("copied {slot}");
            }
            for slot in &outcome.unchanged {
                println!("unchanged {slot}");
            }
        }
    }

    Ok(())
}

//! StrataKV CLI
//!
//! Runs single set/get/del operations against a local data directory.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use stratakv::{Config, Engine, StrataError};
use tracing_subscriber::{fmt, EnvFilter};

/// StrataKV CLI
#[derive(Parser, Debug)]
#[command(name = "stratakv-cli")]
#[command(about = "CLI for the StrataKV storage engine")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./stratakv_data")]
    data_dir: PathBuf,

    /// MemTable size limit in KB before flush
    #[arg(short = 'm', long, default_value = "16")]
    memtable_kb: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Flush the memtable to a new segment
    Flush,

    /// Merge segments until at most one remains
    Compact,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stratakv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(message) = validate(&args.command) {
        eprintln!("{}", message);
        return ExitCode::from(2);
    }

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .memtable_size_limit(args.memtable_kb * 1024)
        .background_compaction(false)
        .build();

    let engine = match Engine::open(config) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = run(&engine, args.command);
    if let Err(e) = settle(&engine) {
        tracing::error!("Failed to compact segments: {}", e);
        return ExitCode::FAILURE;
    }
    if let Err(e) = engine.close() {
        tracing::error!("Failed to close engine: {}", e);
        return ExitCode::FAILURE;
    }

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(StrataError::KeyDeleted) => {
            eprintln!("Key does not exist");
            ExitCode::from(1)
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(engine: &Engine, command: Commands) -> stratakv::Result<()> {
    match command {
        Commands::Get { key } => {
            let value = engine.get(key.as_bytes())?;
            println!("{} : {}", key, String::from_utf8_lossy(&value));
        }
        Commands::Set { key, value } => {
            engine.set(key.as_bytes(), value.as_bytes())?;
            println!("The key-value pair was set successfully");
        }
        Commands::Del { key } => {
            let prior = engine.del(key.as_bytes())?;
            println!("Deleted successfully : {} : {}", key, String::from_utf8_lossy(&prior));
        }
        Commands::Flush => match engine.flush()? {
            Some(segment) => println!(
                "Flushed {} entries to {}",
                segment.entry_count,
                segment.path.display()
            ),
            None => println!("Memtable is empty"),
        },
        Commands::Compact => {
            let merges = engine.compact()?;
            println!("{} merge(s), {} segment(s) left", merges.len(), engine.segment_count());
        }
    }
    Ok(())
}

/// Flush and merge before exiting, since no compactor thread runs here
fn settle(engine: &Engine) -> stratakv::Result<()> {
    engine.flush()?;
    let merges = engine.compact_if_needed()?;
    if !merges.is_empty() {
        tracing::debug!(
            merges = merges.len(),
            segments = engine.segment_count(),
            "Segments compacted on exit"
        );
    }
    Ok(())
}

/// Keys and values must be non-empty printable ASCII
fn validate(command: &Commands) -> Result<(), String> {
    let check = |what: &str, s: &str| {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_graphic() || b == b' ') {
            Err(format!("Invalid {}: {:?}", what, s))
        } else {
            Ok(())
        }
    };

    match command {
        Commands::Get { key } | Commands::Del { key } => check("key", key),
        Commands::Set { key, value } => {
            check("key", key)?;
            check("value", value)
        }
        Commands::Flush | Commands::Compact => Ok(()),
    }
}

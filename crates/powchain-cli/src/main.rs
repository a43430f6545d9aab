use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use powchain_core::{constants::POW_TARGET_DIFFICULTY, Block, Chain, ChainConfig};
use powchain_storage::SledStore;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_DB_PATH: &str = "blockchain.db";

#[derive(Parser, Debug)]
#[command(name = "powchain")]
#[command(about = "Proof-of-work block chain stored in a local sled database")]
struct Cli {
    /// Database directory
    #[arg(long, global = true, default_value = DEFAULT_DB_PATH)]
    db: PathBuf,

    /// Leading zero bits required of every mined block
    #[arg(long, global = true, default_value_t = POW_TARGET_DIFFICULTY)]
    difficulty: u32,

    /// Search nonces on every core
    #[arg(long, global = true)]
    parallel: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mine a block holding DATA and append it to the chain
    #[command(name = "addblock")]
    AddBlock {
        #[arg(long)]
        data: String,
    },
    /// Print every block, newest first
    #[command(name = "printchain")]
    PrintChain {
        /// Emit a JSON array instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct BlockRow {
    timestamp: u64,
    prev_hash: String,
    data: String,
    hash: String,
    nonce: u64,
    difficulty_bits: u32,
    pow_valid: bool,
}

impl From<&Block> for BlockRow {
    fn from(block: &Block) -> Self {
        Self {
            timestamp: block.timestamp,
            prev_hash: block.prev_hash_hex(),
            data: block.payload_lossy(),
            hash: block.hash_hex(),
            nonce: block.nonce,
            difficulty_bits: block.difficulty_bits,
            pow_valid: block.verify(block.difficulty_bits),
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // help and version go to stdout and are not failures
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = ChainConfig {
        parallel: cli.parallel,
        ..ChainConfig::with_difficulty(cli.difficulty)
    };
    let store = SledStore::open(&cli.db)
        .with_context(|| format!("failed to open database at {}", cli.db.display()))?;
    let mut chain = Chain::open(store, config).context("failed to open chain")?;
    debug!(config = ?chain.config(), db = %cli.db.display(), "chain opened");

    match cli.cmd {
        Command::AddBlock { data } => {
            let block = chain.add_block(data).context("failed to add block")?;
            println!("Success!");
            println!("Hash: {}", block.hash_hex());
        }
        Command::PrintChain { json } => {
            if json {
                let rows = chain
                    .iter()?
                    .map(|block| block.map(|b| BlockRow::from(&b)))
                    .collect::<powchain_core::Result<Vec<_>>>()?;
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for block in chain.iter()? {
                    print_block(&BlockRow::from(&block?));
                }
            }
        }
    }

    chain.close().context("failed to close database")?;
    Ok(())
}

fn print_block(row: &BlockRow) {
    println!("Timestamp: {}", row.timestamp);
    println!("Prev. hash: {}", row.prev_hash);
    println!("Data: {}", row.data);
    println!("Hash: {}", row.hash);
    println!("Nonce: {}", row.nonce);
    println!("PoW valid: {}", row.pow_valid);
    println!();
}

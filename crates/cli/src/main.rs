// nftl - fetch, enrich and reconcile NFT ledger data
// Every command: resolve settings, call the node / indexer, print a summary,
// write reports into the output directory.

mod commands;
mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use nftledger_client::{ClientError, APT_COIN};
use nftledger_config::{ConfigError, Settings};
use nftledger_core::{FallbackError, FetchError};
use nftledger_io::IoError;
use tracing_subscriber::EnvFilter;

use commands::CursorArg;
use exit_codes::{
    EXIT_CONFIG, EXIT_DATA, EXIT_ERROR, EXIT_IO, EXIT_REMOTE_AUTH, EXIT_REMOTE_NOT_FOUND,
    EXIT_REMOTE_RATE_LIMIT, EXIT_REMOTE_UPSTREAM, EXIT_REMOTE_VALIDATION, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "nftl")]
#[command(about = "Fetch, enrich and reconcile NFT ledger data")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides applied on top of config file and environment.
#[derive(Args, Debug, Clone, Default)]
struct GlobalArgs {
    /// Config file (default: <config dir>/nftledger/config.toml if present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// mainnet, testnet, devnet or local (default: NETWORK env, else testnet)
    #[arg(long, global = true)]
    network: Option<String>,

    /// Directory for report files
    #[arg(long, global = true, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Records per page request
    #[arg(long, global = true)]
    page_size: Option<u32>,

    /// Max enrichment requests in flight
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Retries per request on 429 / 5xx / network errors
    #[arg(long, global = true)]
    retries: Option<u32>,

    /// Debug logging on stderr
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Warnings and errors only on stderr
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch an account's complete transaction history
    #[command(after_help = "\
Examples:
  nftl transactions 0x80f6...6cdb
  nftl transactions 0x80f6...6cdb --cursor version --page-size 50")]
    Transactions {
        address: String,

        /// Pagination cursor
        #[arg(long, value_enum, default_value = "offset")]
        cursor: CursorArg,

        /// How many first/last versions to show in the summary
        #[arg(long, default_value_t = 5)]
        edge: usize,
    },

    /// Save an account's calls to one entry function as per-page snapshot files
    #[command(after_help = "\
Examples:
  nftl snapshot 0x80f6...6cdb
  nftl snapshot 0x80f6...6cdb --function mint_for --dir snapshots/")]
    Snapshot {
        address: String,

        /// Substring of the entry function name to keep
        #[arg(long, default_value = "mint_for")]
        function: String,

        /// Snapshot directory (default: output dir)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Compare an account's live transaction hashes against saved snapshot files
    #[command(after_help = "\
Every live transaction is compared by default, so live transactions that are
not snapshot calls show up as missing from the snapshot side.

Examples:
  nftl compare-live 0x80f6...6cdb --snapshots snapshots/
  nftl compare-live 0x80f6...6cdb --snapshots snapshots/ --only-function mint_for")]
    CompareLive {
        address: String,

        /// Directory holding mint-for-page-*.json snapshots
        #[arg(long)]
        snapshots: PathBuf,

        /// Keep only live calls whose entry function contains this
        #[arg(long, value_name = "FUNCTION")]
        only_function: Option<String>,
    },

    /// Compare snapshot hashes against a CSV export (offline)
    #[command(after_help = "\
Examples:
  nftl compare-hashes --snapshots snapshots/ --csv export.csv")]
    CompareHashes {
        #[arg(long)]
        snapshots: PathBuf,

        /// CSV with transaction hashes in the first column
        #[arg(long)]
        csv: PathBuf,
    },

    /// List a wallet's assets with full asset data
    Assets {
        owner: String,

        /// Restrict to one collection address
        #[arg(long)]
        collection: Option<String>,

        /// Join assets to this metadata CSV by IPFS hash
        #[arg(long, value_name = "FILE")]
        metadata_csv: Option<PathBuf>,
    },

    /// Assets of one wallet across a list of collections
    BulkAssets {
        owner: String,

        /// JSON array of {"address", "name"}
        #[arg(long)]
        collections: PathBuf,
    },

    /// Total, burned and circulating supply of a collection
    Supply {
        creator: String,
        collection_name: String,
    },

    /// Serial numbers a wallet holds in one collection, ascending
    Serials {
        owner: String,
        collection: String,
    },

    /// Check a CSV of (user, collection, serial) rows against live holdings
    CheckSerials {
        csv: PathBuf,
    },

    /// Fetch one transaction and extract its events, tokens and transfers
    AnalyzeTx {
        hash: String,
    },

    /// Group transfer records by recipient address (offline)
    GroupTransfers {
        /// Directory of *.json transfer arrays
        dir: PathBuf,

        /// How many top recipients to print
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Coin balance of an account
    Balance {
        address: String,

        #[arg(long, default_value = APT_COIN)]
        coin: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose, cli.global.quiet);

    let result = match resolve_settings(&cli.global) {
        Ok(settings) => run(cli.command, settings).await,
        Err(e) => Err(CliError::config(e)),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

async fn run(command: Commands, settings: Settings) -> Result<(), CliError> {
    let ctx = commands::Context::new(settings)?;
    match command {
        Commands::Transactions { address, cursor, edge } => {
            commands::transactions::cmd_transactions(&ctx, &address, cursor, edge).await
        }
        Commands::Snapshot { address, function, dir } => {
            commands::transactions::cmd_snapshot(&ctx, &address, &function, dir).await
        }
        Commands::CompareLive { address, snapshots, only_function } => {
            commands::transactions::cmd_compare_live(&ctx, &address, &snapshots, only_function.as_deref())
                .await
        }
        Commands::CompareHashes { snapshots, csv } => {
            commands::transactions::cmd_compare_hashes(&ctx, &snapshots, &csv)
        }
        Commands::Assets { owner, collection, metadata_csv } => {
            commands::assets::cmd_assets(&ctx, &owner, collection.as_deref(), metadata_csv.as_deref()).await
        }
        Commands::BulkAssets { owner, collections } => {
            commands::assets::cmd_bulk_assets(&ctx, &owner, &collections).await
        }
        Commands::Supply { creator, collection_name } => {
            commands::supply::cmd_supply(&ctx, &creator, &collection_name).await
        }
        Commands::Serials { owner, collection } => {
            commands::assets::cmd_serials(&ctx, &owner, &collection).await
        }
        Commands::CheckSerials { csv } => commands::assets::cmd_check_serials(&ctx, &csv).await,
        Commands::AnalyzeTx { hash } => commands::analyze::cmd_analyze_tx(&ctx, &hash).await,
        Commands::GroupTransfers { dir, top } => commands::analyze::cmd_group_transfers(&ctx, &dir, top),
        Commands::Balance { address, coin } => commands::supply::cmd_balance(&ctx, &address, &coin).await,
    }
}

/// defaults -> config file -> environment -> flags
fn resolve_settings(args: &GlobalArgs) -> Result<Settings, ConfigError> {
    let mut settings = Settings::load(args.config.as_deref())?;
    settings.apply_env(|var| std::env::var(var).ok())?;

    if let Some(network) = &args.network {
        settings.network = network.parse()?;
    }
    if let Some(dir) = &args.output_dir {
        settings.output_dir = dir.clone();
    }
    if let Some(n) = args.page_size {
        settings.page_size = n;
    }
    if let Some(n) = args.concurrency {
        settings.concurrency = n;
    }
    if let Some(n) = args.retries {
        settings.max_retries = n;
    }

    settings.validate()?;
    Ok(settings)
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn config(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::UnknownNetwork(_) => Some("use --network mainnet|testnet|devnet|local".to_string()),
            ConfigError::Invalid { field, .. } if field.ends_with("_url") => {
                Some("check APTOS_NODE_URL / APTOS_INDEXER_URL".to_string())
            }
            _ => None,
        };
        Self { code: EXIT_CONFIG, message: err.to_string(), hint }
    }

    /// Local file error: unreadable is IO, malformed is data.
    pub fn file(err: IoError) -> Self {
        let (code, hint) = if err.is_data_error() {
            (EXIT_DATA, Some(format!("fix or replace {}", err.path().display())))
        } else {
            (EXIT_IO, None)
        };
        Self { code, message: err.to_string(), hint }
    }

    /// One side of a comparison has nothing to compare.
    pub fn empty_side(what: impl Into<String>) -> Self {
        Self { code: EXIT_DATA, message: what.into(), hint: None }
    }

    /// Remote error with its registered exit code.
    pub fn client(err: ClientError) -> Self {
        Self::remote(&err, err.to_string())
    }

    /// A page of a multi-page fetch failed. Nothing fetched so far is kept.
    pub fn fetch(err: FetchError<ClientError>) -> Self {
        let message = err.to_string();
        match &err {
            FetchError::Page { source, .. } => Self::remote(source, message),
            FetchError::InvalidPageSize => Self { code: EXIT_CONFIG, message, hint: None },
            FetchError::UnsupportedCursor(_) => Self::args(message),
            FetchError::Cursor { .. } => Self { code: EXIT_REMOTE_UPSTREAM, message, hint: None },
        }
    }

    /// Every fallback strategy failed; the code follows the last failure.
    pub fn fallback(err: FallbackError<ClientError>) -> Self {
        let message = err.to_string();
        match err.last() {
            Some(last) => Self::remote(last, message),
            None => Self::general(message),
        }
    }

    fn remote(err: &ClientError, message: String) -> Self {
        let (code, hint) = match err {
            ClientError::Auth { .. } => (EXIT_REMOTE_AUTH, Some("check APTOS_API_KEY")),
            ClientError::Validation { .. } => (EXIT_REMOTE_VALIDATION, None),
            ClientError::RateLimited { .. } => {
                (EXIT_REMOTE_RATE_LIMIT, Some("set APTOS_API_KEY or retry with --retries 3"))
            }
            ClientError::NotFound(_) => (EXIT_REMOTE_NOT_FOUND, None),
            ClientError::Network(_) => {
                (EXIT_REMOTE_UPSTREAM, Some("check --network or APTOS_NODE_URL"))
            }
            ClientError::Build(_) => (EXIT_ERROR, None),
            ClientError::Upstream { .. }
            | ClientError::Decode(_)
            | ClientError::GraphQl(_)
            | ClientError::Normalize(_) => (EXIT_REMOTE_UPSTREAM, None),
        };
        Self { code, message, hint: hint.map(str::to_string) }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

use clap::{Parser, Subcommand};
use std::error::Error;
use std::io::{self, Read};

use shardwallet::utils::logging;
use shardwallet::{
    group_of_address, wallet, DiscoveryConfig, DiscoveryEngine, ExplorerClient,
    DEFAULT_GAP_LIMIT, DEFAULT_GROUP_SCAN_BUDGET, TOTAL_GROUPS,
};

#[derive(Parser)]
#[command(name = "shardwallet", about = "Multi-group HD wallet tool")]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new wallet and print its mnemonic and first address
    New {
        /// Emit machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Classify an address into its group
    Group {
        address: String,
        /// Total number of groups
        #[arg(long, default_value_t = TOTAL_GROUPS)]
        groups: u32,
    },
    /// Discover all active addresses for a wallet.
    /// The mnemonic is read from stdin to keep it out of the process list.
    Discover {
        /// Base URL of the explorer backend
        #[arg(long)]
        url: String,
        /// Gap limit per group
        #[arg(long, default_value_t = DEFAULT_GAP_LIMIT)]
        gap: usize,
        /// Total number of groups
        #[arg(long, default_value_t = TOTAL_GROUPS)]
        groups: u32,
        /// Maximum addresses scanned per group
        #[arg(long, default_value_t = DEFAULT_GROUP_SCAN_BUDGET)]
        budget: usize,
        /// Derivation indices already known to the wallet, skipped during discovery
        #[arg(long, value_delimiter = ',')]
        skip: Vec<u32>,
        /// Emit machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.verbose {
        logging::enable_debug();
    }

    match cli.command {
        Command::New { json } => run_new(json),
        Command::Group { address, groups } => run_group(&address, groups),
        Command::Discover {
            url,
            gap,
            groups,
            budget,
            skip,
            json,
        } => run_discover(&url, gap, groups, budget, &skip, json),
    }
}

fn run_new(json: bool) -> Result<(), Box<dyn Error>> {
    let (mnemonic, master) = wallet::create_wallet()?;

    let secp = bitcoin::secp256k1::Secp256k1::new();
    let root = wallet::discovery_root(&secp, &master)?;
    let first = wallet::derive_address_at(&secp, &root, 0)?;
    let group = first.group(TOTAL_GROUPS)?;

    if json {
        let out = serde_json::json!({
            "mnemonic": mnemonic,
            "address": first.hash,
            "index": first.index,
            "group": group,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Mnemonic:      {}", mnemonic);
        println!("First address: {} (index 0, group {})", first.hash, group);
    }

    Ok(())
}

fn run_group(address: &str, groups: u32) -> Result<(), Box<dyn Error>> {
    let group = group_of_address(address, groups)?;
    println!("{}", group);
    Ok(())
}

fn run_discover(
    url: &str,
    gap: usize,
    groups: u32,
    budget: usize,
    skip: &[u32],
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let mut mnemonic = String::new();
    io::stdin().read_to_string(&mut mnemonic)?;
    let master = wallet::master_key_from_mnemonic(mnemonic.trim())?;

    let client = ExplorerClient::new(url);
    let config = DiscoveryConfig {
        group_count: groups,
        group_scan_budget: budget,
    };
    let engine = DiscoveryEngine::with_config(&client, config);

    let active = engine.discover(&master, skip, gap)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&active)?);
    } else if active.is_empty() {
        println!("No active addresses found");
    } else {
        for pair in &active {
            let group = pair.group(groups)?;
            println!("{:>8}  group {}  {}", pair.index, group, pair.hash);
        }
    }

    Ok(())
}

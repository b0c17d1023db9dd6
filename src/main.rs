//! Mosaic Node - validator and committee tooling
//!
//! Usage:
//!   mosaic-node --help

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use mosaic_core::{
    Address, Committee, Genesis, Link, LocalCommittee, Reputation,
    DEFAULT_COMMITTEE_SIZE, DEFAULT_MIN_ACTIVE_REPUTATION, MAX_HEIGHT, MOSAIC_VERSION,
};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "mosaic-node")]
#[command(version = MOSAIC_VERSION)]
#[command(about = "Mosaic validator and committee tooling", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show node info
    Info,

    /// Write a sample genesis file
    Genesis {
        /// Output directory
        #[arg(short, long, default_value = "./genesis")]
        output: PathBuf,

        /// Number of validators
        #[arg(long, default_value = "4")]
        validators: u32,
    },

    /// Show validator window and reputation
    Inspect {
        /// Genesis file
        #[arg(short, long)]
        genesis: PathBuf,

        /// Validator identity (base58 or 0x-hex)
        identity: Address,

        /// Height to check activity at
        #[arg(long)]
        height: Option<u64>,
    },

    /// Propose a further member to join a committee
    Enter {
        /// Genesis file
        #[arg(short, long)]
        genesis: PathBuf,

        /// Committee identity
        #[arg(long)]
        committee: Address,

        /// Acting validator
        #[arg(long)]
        validator: Address,

        /// Member to enter in front of, or "sentinel" to enter last
        #[arg(long, default_value = "sentinel")]
        further_member: String,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    let result = match cli.command {
        Commands::Info => {
            show_info();
            Ok(())
        }
        Commands::Genesis { output, validators } => create_genesis(output, validators),
        Commands::Inspect { genesis, identity, height } => inspect(genesis, identity, height),
        Commands::Enter { genesis, committee, validator, further_member } => {
            enter_committee(genesis, committee, validator, further_member)
        }
    };

    if let Err(e) = result {
        error!("{}", e);
        process::exit(1);
    }
}

fn show_info() {
    println!();
    println!("Mosaic Core");
    println!("===========");
    println!();
    println!("Version:                {}", MOSAIC_VERSION);
    println!("Committee size:         {}", DEFAULT_COMMITTEE_SIZE);
    println!("Min active reputation:  {}", DEFAULT_MIN_ACTIVE_REPUTATION);
    println!("Sentinel address:       {}", Address::SENTINEL);
    println!();
    println!("Commands:");
    println!("  genesis   Write a sample genesis file");
    println!("  inspect   Show validator window and reputation");
    println!("  enter     Propose a further member to join a committee");
    println!();
}

fn create_genesis(output: PathBuf, validator_count: u32) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&output)?;

    let genesis = Genesis::sample(validator_count);
    let path = output.join("genesis.json");
    genesis.save(&path)?;

    info!("Genesis written to {}", path.display());
    for validator in &genesis.validators {
        println!("validator  {}", validator.identity);
    }
    for committee in &genesis.committees {
        println!("committee  {}", committee.id);
        for member in &committee.members {
            println!("  member   {}", member);
        }
    }
    Ok(())
}

fn inspect(
    genesis: PathBuf,
    identity: Address,
    height: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let node = Genesis::load(&genesis)?.build()?;

    let Some(validator) = node.validators.get(&identity) else {
        println!("{} is not a validator", identity);
        return Ok(());
    };

    let end = if validator.end_height == MAX_HEIGHT {
        "open".to_string()
    } else {
        validator.end_height.to_string()
    };
    let next = match node.validators.next_validator(&identity) {
        Some(Link::Key(next)) => next.to_string(),
        _ => "sentinel".to_string(),
    };

    println!("Validator:     {}", identity);
    println!("Begin height:  {}", validator.begin_height);
    println!("End height:    {}", end);
    println!("Next:          {}", next);
    println!("Reputation:    {}", node.reputation.get_reputation(&identity));
    println!("Active:        {}", node.reputation.is_active(&identity));
    if let Some(height) = height {
        println!(
            "In window at {}: {}",
            height,
            node.validators.is_validator_at(&identity, height)
        );
    }
    Ok(())
}

fn enter_committee(
    genesis: PathBuf,
    committee: Address,
    validator: Address,
    further_member: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let further_member = if further_member.eq_ignore_ascii_case("sentinel") {
        Address::SENTINEL
    } else {
        further_member.parse()?
    };

    let node = Genesis::load(&genesis)?.build()?;
    node.consensus.enter_committee(&committee, validator, further_member)?;

    if let Some(committee) = node.committee(&committee) {
        println!("Members of {}:", committee_label(&committee));
        for member in committee.members() {
            println!("  {}", member);
        }
    }
    Ok(())
}

fn committee_label(committee: &LocalCommittee) -> String {
    format!("{} ({}/{} seats)", committee.id(), committee.len(), committee.capacity())
}

//! move-publisher: build Move package publish transactions from the CLI.
//!
//! ## Example Usage
//!
//! ```bash
//! # Inspect a build output directory
//! move-publisher preview ./my_package
//!
//! # Build the unsigned publish transaction for a multisig sender
//! move-publisher build ./my_package --sender 0x7af2... --network testnet
//!
//! # Publish under a new resource account
//! move-publisher build ./my_package --sender 0x7af2... --network testnet \
//!     --resource-seed seed1 --seed-encoding utf8
//! ```
//!
//! The CLI stops at the unsigned transaction; signing and submission belong
//! to the connected wallet.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;

use move_publisher::{
    package, publish_package_call, resource_account_publish_call, AccountAddress, LoadedPackage,
    NetworkConfig, RawTransactionBuilder, SeedEncoding,
};

#[derive(Parser)]
#[command(
    name = "move-publisher",
    version,
    about = "Build Move package publish transactions for multisig deployment"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a build output directory and print the package metadata.
    Preview {
        /// Move build output directory (contains package-metadata.bcs).
        dir: std::path::PathBuf,
    },
    /// Build the unsigned publish transaction against a live node.
    Build {
        /// Move build output directory (contains package-metadata.bcs).
        dir: std::path::PathBuf,
        /// Sender (multisig) account address.
        #[arg(long)]
        sender: String,
        /// Named network: mainnet, testnet, or devnet.
        #[arg(long, default_value = "testnet")]
        network: String,
        /// Publish under a new resource account derived from this seed.
        #[arg(long)]
        resource_seed: Option<String>,
        /// How the seed string is interpreted.
        #[arg(long, value_enum, default_value = "utf8")]
        seed_encoding: SeedArg,
        /// Override the default max gas units (2,000,000).
        #[arg(long)]
        max_gas: Option<u64>,
        /// Override the default gas unit price (0).
        #[arg(long)]
        gas_unit_price: Option<u64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SeedArg {
    Utf8,
    Hex,
}

impl From<SeedArg> for SeedEncoding {
    fn from(arg: SeedArg) -> Self {
        match arg {
            SeedArg::Utf8 => SeedEncoding::Utf8,
            SeedArg::Hex => SeedEncoding::Hex,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Preview { dir } => preview(&dir),
        Command::Build {
            dir,
            sender,
            network,
            resource_seed,
            seed_encoding,
            max_gas,
            gas_unit_price,
        } => build(
            &dir,
            &sender,
            &network,
            resource_seed.as_deref(),
            seed_encoding.into(),
            max_gas,
            gas_unit_price,
        ),
    }
}

fn load_package(dir: &std::path::Path) -> Result<LoadedPackage> {
    let files = package::read_package_dir(dir)?;
    LoadedPackage::load(&files).map_err(|e| anyhow!(e))
}

fn preview(dir: &std::path::Path) -> Result<()> {
    let pkg = load_package(dir)?;
    println!("{}", serde_json::to_string_pretty(&package_summary(&pkg))?);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn build(
    dir: &std::path::Path,
    sender: &str,
    network: &str,
    resource_seed: Option<&str>,
    seed_encoding: SeedEncoding,
    max_gas: Option<u64>,
    gas_unit_price: Option<u64>,
) -> Result<()> {
    let sender = AccountAddress::parse(sender)
        .ok_or_else(|| anyhow!("invalid sender address `{sender}`"))?;
    let config = NetworkConfig::named(network)
        .ok_or_else(|| anyhow!("unknown network `{network}` (mainnet/testnet/devnet)"))?;

    let pkg = load_package(dir)?;
    let call = match resource_seed {
        None => publish_package_call(&pkg),
        Some(seed) => resource_account_publish_call(&pkg, seed, seed_encoding)?,
    };

    let mut builder = RawTransactionBuilder::new(config.clone(), sender);
    if let Some(max_gas) = max_gas {
        builder = builder.max_gas_amount(max_gas);
    }
    if let Some(price) = gas_unit_price {
        builder = builder.gas_unit_price(price);
    }
    let txn = builder.build(call)?;

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "package": package_summary(&pkg),
            "network": config.name,
            "sender": txn.sender.to_full_hex(),
            "sequence_number": txn.sequence_number,
            "function": txn.payload.function.to_string(),
            "max_gas_amount": txn.max_gas_amount,
            "gas_unit_price": txn.gas_unit_price,
            "expiration_timestamp_secs": txn.expiration_timestamp_secs,
            "chain_id": txn.chain_id,
            "raw_transaction_bcs": hex::encode(txn.to_bcs_bytes()),
        }))?
    );
    Ok(())
}

fn package_summary(pkg: &LoadedPackage) -> serde_json::Value {
    let metadata = &pkg.metadata;
    json!({
        "name": metadata.name,
        "upgrade_policy": metadata.upgrade_policy.as_str(),
        "upgrade_number": metadata.upgrade_number,
        "source_digest": metadata.source_digest,
        "modules": metadata
            .modules
            .iter()
            .zip(&pkg.bytecode)
            .map(|(m, code)| json!({ "name": m.name, "bytecode_bytes": code.len() }))
            .collect::<Vec<_>>(),
        "dependencies": metadata
            .dependencies
            .iter()
            .map(|d| json!({
                "account": d.account.to_short_hex(),
                "package_name": d.package_name,
            }))
            .collect::<Vec<_>>(),
    })
}

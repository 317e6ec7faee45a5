//! Unsigned transaction assembly.
//!
//! [`RawTransactionBuilder`] combines an encoded entry-function call with
//! live chain state (chain id, sender sequence number) and fixed gas and
//! expiration defaults into a [`RawTransaction`] ready for an external
//! signer. It never signs or submits.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::info;

use crate::address::AccountAddress;
use crate::codec::Encoder;
use crate::error::PublishError;
use crate::network::NetworkConfig;
use crate::node::NodeClient;

/// Simulation-time default; wallets are expected to override with an
/// estimated price before signing.
pub const DEFAULT_GAS_UNIT_PRICE: u64 = 0;
pub const DEFAULT_MAX_GAS_AMOUNT: u64 = 2_000_000;
/// One week, in seconds.
pub const DEFAULT_EXPIRATION_WINDOW_SECS: u64 = 60 * 60 * 24 * 7;

/// `TransactionPayload` enum variant index for an entry-function call.
const PAYLOAD_VARIANT_ENTRY_FUNCTION: u64 = 2;

/// Fully-qualified entry function: address + module + function name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFunctionId {
    pub address: AccountAddress,
    pub module: String,
    pub function: String,
}

impl EntryFunctionId {
    pub fn new(
        address: AccountAddress,
        module: impl Into<String>,
        function: impl Into<String>,
    ) -> Self {
        Self {
            address,
            module: module.into(),
            function: function.into(),
        }
    }
}

impl fmt::Display for EntryFunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}::{}",
            self.address.to_short_hex(),
            self.module,
            self.function
        )
    }
}

/// An entry-function call description: the target function, its type
/// arguments (always empty for the publish entry points), and the ordered
/// BCS-encoded argument blobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFunctionCall {
    pub function: EntryFunctionId,
    pub type_args: Vec<String>,
    pub args: Vec<Vec<u8>>,
}

/// A complete unsigned transaction envelope.
///
/// Built fresh per publish attempt from live chain state; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransaction {
    pub sender: AccountAddress,
    pub sequence_number: u64,
    pub payload: EntryFunctionCall,
    pub max_gas_amount: u64,
    pub gas_unit_price: u64,
    pub expiration_timestamp_secs: u64,
    pub chain_id: u8,
}

impl RawTransaction {
    /// Canonical BCS envelope the signer hashes: sender, sequence number,
    /// entry-function payload, gas parameters, expiration, chain id.
    pub fn to_bcs_bytes(&self) -> Vec<u8> {
        let mut e = Encoder::new();
        e.write_fixed(self.sender.as_bytes());
        e.write_u64(self.sequence_number);

        e.write_uleb128(PAYLOAD_VARIANT_ENTRY_FUNCTION);
        e.write_fixed(self.payload.function.address.as_bytes());
        e.write_str(&self.payload.function.module);
        e.write_str(&self.payload.function.function);
        // Type arguments are always empty for the publish entry points.
        e.write_uleb128(self.payload.type_args.len() as u64);
        e.write_seq(&self.payload.args, |e, arg| e.write_bytes(arg));

        e.write_u64(self.max_gas_amount);
        e.write_u64(self.gas_unit_price);
        e.write_u64(self.expiration_timestamp_secs);
        e.write_u8(self.chain_id);
        e.into_bytes()
    }
}

/// Builds one unsigned transaction per call, fetching chain id and the
/// sender's sequence number from the configured node.
pub struct RawTransactionBuilder {
    network: NetworkConfig,
    client: NodeClient,
    sender: AccountAddress,
    max_gas_amount: u64,
    gas_unit_price: u64,
    expiration_window_secs: u64,
}

impl RawTransactionBuilder {
    pub fn new(network: NetworkConfig, sender: AccountAddress) -> Self {
        let client = NodeClient::new(&network);
        Self {
            network,
            client,
            sender,
            max_gas_amount: DEFAULT_MAX_GAS_AMOUNT,
            gas_unit_price: DEFAULT_GAS_UNIT_PRICE,
            expiration_window_secs: DEFAULT_EXPIRATION_WINDOW_SECS,
        }
    }

    pub fn max_gas_amount(mut self, max_gas_amount: u64) -> Self {
        self.max_gas_amount = max_gas_amount;
        self
    }

    pub fn gas_unit_price(mut self, gas_unit_price: u64) -> Self {
        self.gas_unit_price = gas_unit_price;
        self
    }

    pub fn expiration_window_secs(mut self, secs: u64) -> Self {
        self.expiration_window_secs = secs;
        self
    }

    /// Fetch live chain state and assemble the unsigned transaction.
    ///
    /// Either a complete transaction comes back or a typed error does;
    /// there is no partial result and no retry.
    pub fn build(&self, payload: EntryFunctionCall) -> Result<RawTransaction, PublishError> {
        let chain_id = self.client.chain_id()?;
        let account = self.client.account(&self.sender)?;
        let txn = RawTransaction {
            sender: self.sender,
            sequence_number: account.sequence_number,
            payload,
            max_gas_amount: self.max_gas_amount,
            gas_unit_price: self.gas_unit_price,
            expiration_timestamp_secs: expiration_timestamp(self.expiration_window_secs),
            chain_id,
        };
        info!(
            network = %self.network.name,
            sender = %txn.sender,
            sequence_number = txn.sequence_number,
            function = %txn.payload.function,
            chain_id,
            "built unsigned transaction"
        );
        Ok(txn)
    }
}

/// Whole seconds since epoch, `window_secs` from now.
pub fn expiration_timestamp(window_secs: u64) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    now + window_secs
}

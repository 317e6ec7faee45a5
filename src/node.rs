//! Fullnode REST client.
//!
//! Two read operations back the transaction builder: ledger info (for the
//! chain id) and account state (for the sequence number). Calls are blocking
//! and are issued once per publish attempt with no retry; any transport or
//! node error surfaces as [`PublishError::AccountLookupFailed`].

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::address::AccountAddress;
use crate::error::PublishError;
use crate::network::NetworkConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// REST client bound to one network's fullnode.
#[derive(Clone)]
pub struct NodeClient {
    base: String,
    agent: ureq::Agent,
}

/// Subset of the ledger info response.
#[derive(Debug, Deserialize)]
struct LedgerInfo {
    chain_id: u8,
}

/// Raw account resource; the node returns u64 fields as decimal strings.
#[derive(Debug, Deserialize)]
struct AccountRaw {
    sequence_number: String,
    #[serde(default)]
    authentication_key: String,
}

/// Account state needed to build a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub sequence_number: u64,
    pub authentication_key: String,
}

impl NodeClient {
    pub fn new(network: &NetworkConfig) -> Self {
        Self {
            base: network.rest_base(),
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
        }
    }

    /// Current chain id from `GET /v1` ledger info.
    pub fn chain_id(&self) -> Result<u8, PublishError> {
        let info: LedgerInfo = self.get_json(&self.base, "ledger info")?;
        debug!(chain_id = info.chain_id, "fetched chain id");
        Ok(info.chain_id)
    }

    /// Account state from `GET /v1/accounts/{address}`.
    pub fn account(&self, address: &AccountAddress) -> Result<AccountInfo, PublishError> {
        let url = format!("{}/accounts/{}", self.base, address.to_full_hex());
        let raw: AccountRaw = self.get_json(&url, "account")?;
        let sequence_number = raw.sequence_number.parse::<u64>().map_err(|e| {
            PublishError::AccountLookupFailed(format!(
                "account {address} returned non-numeric sequence_number `{}`: {e}",
                raw.sequence_number
            ))
        })?;
        debug!(%address, sequence_number, "fetched account state");
        Ok(AccountInfo {
            sequence_number,
            authentication_key: raw.authentication_key,
        })
    }

    fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        what: &str,
    ) -> Result<T, PublishError> {
        let response = self.agent.get(url).call().map_err(|e| match e {
            ureq::Error::Status(code, _) => {
                PublishError::AccountLookupFailed(format!("{what} request returned HTTP {code}"))
            }
            ureq::Error::Transport(t) => {
                PublishError::AccountLookupFailed(format!("{what} request failed: {t}"))
            }
        })?;
        response.into_json::<T>().map_err(|e| {
            PublishError::AccountLookupFailed(format!("{what} response is not valid JSON: {e}"))
        })
    }
}

// Live-endpoint tests, gated like the rest of the networked suite.
#[cfg(all(test, feature = "network-tests"))]
mod network_tests {
    use super::*;

    #[test]
    fn devnet_chain_id_is_reachable() {
        let config = NetworkConfig::named("devnet").unwrap();
        let client = NodeClient::new(&config);
        let chain_id = client.chain_id().unwrap();
        assert!(chain_id > 0);
    }

    #[test]
    fn missing_account_fails_lookup() {
        let config = NetworkConfig::named("devnet").unwrap();
        let client = NodeClient::new(&config);
        let unknown = AccountAddress::parse("0xdead").unwrap();
        assert!(matches!(
            client.account(&unknown),
            Err(PublishError::AccountLookupFailed(_))
        ));
    }
}

//! Named network to fullnode endpoint table.
//!
//! An explicit, immutable configuration structure handed to the transaction
//! builder rather than ambient global state. One endpoint per network.

const MAINNET_NODE: &str = "https://mainnet.movementnetwork.xyz/v1";
const TESTNET_NODE: &str = "https://fullnode.testnet.aptoslabs.com";
const DEVNET_NODE: &str = "https://fullnode.devnet.aptoslabs.com";

pub const KNOWN_NETWORKS: [(&str, &str); 3] = [
    ("mainnet", MAINNET_NODE),
    ("testnet", TESTNET_NODE),
    ("devnet", DEVNET_NODE),
];

/// One network's node endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub name: String,
    pub node_url: String,
}

impl NetworkConfig {
    /// Look up a network by name, case-insensitively.
    pub fn named(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        KNOWN_NETWORKS
            .iter()
            .find(|(n, _)| *n == lower)
            .map(|(n, url)| NetworkConfig {
                name: (*n).to_string(),
                node_url: (*url).to_string(),
            })
    }

    /// A custom endpoint (local node, private fullnode).
    pub fn custom(name: impl Into<String>, node_url: impl Into<String>) -> Self {
        NetworkConfig {
            name: name.into(),
            node_url: node_url.into(),
        }
    }

    /// REST API base with the `/v1` suffix normalized on.
    pub fn rest_base(&self) -> String {
        let trimmed = self.node_url.trim_end_matches('/');
        if trimmed.ends_with("/v1") {
            trimmed.to_string()
        } else {
            format!("{trimmed}/v1")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(
            NetworkConfig::named("Testnet").unwrap().node_url,
            TESTNET_NODE
        );
        assert_eq!(NetworkConfig::named("MAINNET").unwrap().name, "mainnet");
        assert!(NetworkConfig::named("localnet").is_none());
    }

    #[test]
    fn rest_base_normalizes_v1_suffix() {
        assert_eq!(
            NetworkConfig::named("mainnet").unwrap().rest_base(),
            "https://mainnet.movementnetwork.xyz/v1"
        );
        assert_eq!(
            NetworkConfig::named("testnet").unwrap().rest_base(),
            "https://fullnode.testnet.aptoslabs.com/v1"
        );
        assert_eq!(
            NetworkConfig::custom("local", "http://127.0.0.1:8080/").rest_base(),
            "http://127.0.0.1:8080/v1"
        );
    }
}

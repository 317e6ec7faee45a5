//! One-attempt publish orchestration.
//!
//! Drives a single publish attempt through its states:
//!
//! `Idle → Loading → Encoding → FetchingAccountState → Built →
//! {Submitted | Failed}`
//!
//! Any failure aborts the attempt and surfaces as a typed
//! [`PublishError`]; there are no retries between states and a new attempt
//! starts over from `Idle`. Attempts are numbered so a caller observing
//! state can never confuse a stale attempt's outcome with a newer one.

use tracing::{info, warn};

use crate::error::PublishError;
use crate::metadata::PackageMetadata;
use crate::network::NetworkConfig;
use crate::package::{LoadedPackage, PackageFile};
use crate::payload::{publish_package_call, resource_account_publish_call, SeedEncoding};
use crate::transaction::{EntryFunctionCall, RawTransaction, RawTransactionBuilder};

/// External signer seam. The connected wallet signs and submits; this core
/// never holds key material.
pub trait WalletSigner {
    /// Name of the connected network, if any.
    fn network(&self) -> Option<String>;

    /// The signing account's address, if connected.
    fn sender_address(&self) -> Option<crate::address::AccountAddress>;

    /// Sign and submit an entry-function call, returning the submitted
    /// transaction hash. User rejection must map to
    /// [`PublishError::SigningRejected`].
    fn sign_and_submit(&self, call: &EntryFunctionCall) -> Result<String, PublishError>;
}

/// Which publish entry point to target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishMode {
    /// `0x1::code::publish_package_txn` under the sender account.
    Package,
    /// `0x1::resource_account::create_resource_account_and_publish_package`
    /// with a caller-supplied seed.
    ResourceAccount { seed: String, encoding: SeedEncoding },
}

/// Observable state of the current attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Idle,
    Loading,
    Encoding,
    FetchingAccountState,
    Built,
    Submitted,
    Failed,
}

/// Publish driver over a connected wallet.
pub struct MovePublisher<S: WalletSigner> {
    signer: S,
    attempt_id: u64,
    state: AttemptState,
}

impl<S: WalletSigner> MovePublisher<S> {
    pub fn new(signer: S) -> Self {
        Self {
            signer,
            attempt_id: 0,
            state: AttemptState::Idle,
        }
    }

    /// Current attempt id and state.
    pub fn state(&self) -> (u64, AttemptState) {
        (self.attempt_id, self.state)
    }

    /// Decode a file set's metadata for display, without touching the
    /// network or the wallet.
    pub fn preview(files: &[PackageFile]) -> Result<PackageMetadata, PublishError> {
        Ok(LoadedPackage::load(files)?.metadata)
    }

    /// Build the unsigned transaction for one attempt, stopping at `Built`.
    pub fn build_publish(
        &mut self,
        files: &[PackageFile],
        mode: &PublishMode,
    ) -> Result<RawTransaction, PublishError> {
        let attempt = self.begin();
        let result = self.run_build(files, mode);
        self.conclude(attempt, result.is_ok(), AttemptState::Built);
        result
    }

    /// Run a full attempt: build the call and hand it to the wallet for
    /// signing and submission. Returns the submitted transaction hash.
    pub fn publish(
        &mut self,
        files: &[PackageFile],
        mode: &PublishMode,
    ) -> Result<String, PublishError> {
        let attempt = self.begin();
        let result = self.run_publish(files, mode);
        self.conclude(attempt, result.is_ok(), AttemptState::Submitted);
        result
    }

    fn run_build(
        &mut self,
        files: &[PackageFile],
        mode: &PublishMode,
    ) -> Result<RawTransaction, PublishError> {
        let (network, sender) = self.wallet_context()?;
        let (_, call) = self.load_and_encode(files, mode)?;
        self.state = AttemptState::FetchingAccountState;
        RawTransactionBuilder::new(network, sender).build(call)
    }

    fn run_publish(
        &mut self,
        files: &[PackageFile],
        mode: &PublishMode,
    ) -> Result<String, PublishError> {
        // The wallet context is validated up front even though the wallet
        // does its own account resolution at signing time.
        self.wallet_context()?;
        let (package, call) = self.load_and_encode(files, mode)?;
        info!(
            package = %package.metadata.name,
            function = %call.function,
            "handing call to wallet signer"
        );
        self.state = AttemptState::Built;
        self.signer.sign_and_submit(&call)
    }

    fn load_and_encode(
        &mut self,
        files: &[PackageFile],
        mode: &PublishMode,
    ) -> Result<(LoadedPackage, EntryFunctionCall), PublishError> {
        self.state = AttemptState::Loading;
        let package = LoadedPackage::load(files)?;
        self.state = AttemptState::Encoding;
        let call = match mode {
            PublishMode::Package => publish_package_call(&package),
            PublishMode::ResourceAccount { seed, encoding } => {
                resource_account_publish_call(&package, seed, *encoding)?
            }
        };
        Ok((package, call))
    }

    fn wallet_context(&self) -> Result<(NetworkConfig, crate::address::AccountAddress), PublishError> {
        let name = self
            .signer
            .network()
            .ok_or_else(|| PublishError::NoWalletNetwork("wallet is not connected".into()))?;
        let network = NetworkConfig::named(&name)
            .ok_or_else(|| PublishError::NoWalletNetwork(format!("unknown network `{name}`")))?;
        let sender = self.signer.sender_address().ok_or_else(|| {
            PublishError::NoWalletNetwork("wallet has no account address".into())
        })?;
        Ok((network, sender))
    }

    fn begin(&mut self) -> u64 {
        self.attempt_id += 1;
        self.state = AttemptState::Loading;
        info!(attempt = self.attempt_id, "starting publish attempt");
        self.attempt_id
    }

    fn conclude(&mut self, attempt: u64, ok: bool, success_state: AttemptState) {
        // Stale attempts must never clobber a newer attempt's state.
        if attempt != self.attempt_id {
            warn!(attempt, current = self.attempt_id, "ignoring stale attempt result");
            return;
        }
        self.state = if ok { success_state } else { AttemptState::Failed };
        info!(attempt, state = ?self.state, "publish attempt concluded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::AccountAddress;
    use crate::metadata::{ModuleMetadata, UpgradePolicy};
    use crate::package::METADATA_FILE;

    struct FakeWallet {
        network: Option<String>,
        address: Option<AccountAddress>,
        reject: bool,
    }

    impl FakeWallet {
        fn connected() -> Self {
            Self {
                network: Some("devnet".to_string()),
                address: AccountAddress::parse("0x7af2"),
                reject: false,
            }
        }
    }

    impl WalletSigner for FakeWallet {
        fn network(&self) -> Option<String> {
            self.network.clone()
        }

        fn sender_address(&self) -> Option<AccountAddress> {
            self.address
        }

        fn sign_and_submit(&self, call: &EntryFunctionCall) -> Result<String, PublishError> {
            if self.reject {
                Err(PublishError::SigningRejected("user dismissed".into()))
            } else {
                Ok(format!("0xhash-{}", call.args.len()))
            }
        }
    }

    fn fixture_files() -> Vec<PackageFile> {
        let metadata = PackageMetadata {
            name: "demo".to_string(),
            upgrade_policy: UpgradePolicy::Compatible,
            upgrade_number: 0,
            source_digest: String::new(),
            manifest: vec![],
            modules: vec![ModuleMetadata {
                name: "alpha".to_string(),
                source: vec![],
                source_map: vec![],
                extension: None,
            }],
            dependencies: vec![],
            extension: None,
        };
        vec![
            PackageFile::new(METADATA_FILE, metadata.encode()),
            PackageFile::new("build/demo/bytecode_modules/alpha.mv", vec![0xca, 0xfe]),
        ]
    }

    #[test]
    fn preview_returns_metadata_without_network() {
        let metadata = MovePublisher::<FakeWallet>::preview(&fixture_files()).unwrap();
        assert_eq!(metadata.name, "demo");
        assert_eq!(metadata.modules.len(), 1);
    }

    #[test]
    fn publish_submits_through_the_wallet() {
        let mut publisher = MovePublisher::new(FakeWallet::connected());
        let hash = publisher
            .publish(&fixture_files(), &PublishMode::Package)
            .unwrap();
        assert_eq!(hash, "0xhash-2");
        assert_eq!(publisher.state(), (1, AttemptState::Submitted));
    }

    #[test]
    fn rejection_fails_the_attempt() {
        let mut wallet = FakeWallet::connected();
        wallet.reject = true;
        let mut publisher = MovePublisher::new(wallet);
        let err = publisher
            .publish(&fixture_files(), &PublishMode::Package)
            .unwrap_err();
        assert!(matches!(err, PublishError::SigningRejected(_)));
        assert_eq!(publisher.state(), (1, AttemptState::Failed));
    }

    #[test]
    fn no_network_context_is_rejected_up_front() {
        let mut publisher = MovePublisher::new(FakeWallet {
            network: None,
            address: AccountAddress::parse("0x1"),
            reject: false,
        });
        let err = publisher
            .publish(&fixture_files(), &PublishMode::Package)
            .unwrap_err();
        assert!(matches!(err, PublishError::NoWalletNetwork(_)));
    }

    #[test]
    fn unknown_network_name_is_rejected() {
        let mut publisher = MovePublisher::new(FakeWallet {
            network: Some("singlenet".to_string()),
            address: AccountAddress::parse("0x1"),
            reject: false,
        });
        let err = publisher
            .publish(&fixture_files(), &PublishMode::Package)
            .unwrap_err();
        assert!(matches!(err, PublishError::NoWalletNetwork(_)));
    }

    #[test]
    fn bad_seed_fails_during_encoding() {
        let mut publisher = MovePublisher::new(FakeWallet::connected());
        let mode = PublishMode::ResourceAccount {
            seed: "zz".to_string(),
            encoding: SeedEncoding::Hex,
        };
        let err = publisher.publish(&fixture_files(), &mode).unwrap_err();
        assert!(matches!(err, PublishError::InvalidHexSeed(_)));
        assert_eq!(publisher.state().1, AttemptState::Failed);
    }

    #[test]
    fn attempt_ids_increment_per_attempt() {
        let mut publisher = MovePublisher::new(FakeWallet::connected());
        publisher.publish(&fixture_files(), &PublishMode::Package).unwrap();
        publisher.publish(&fixture_files(), &PublishMode::Package).unwrap();
        assert_eq!(publisher.state().0, 2);
    }
}

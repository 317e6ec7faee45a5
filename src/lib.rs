//! Move package publishing core for multisig deployment.
//!
//! Parses a locally-built Move package (metadata + compiled bytecode) and
//! constructs the byte-exact on-chain "publish" transaction, for hand-off to
//! an external wallet signer.
//!
//! Pipeline:
//!
//! ```text
//! package loader -> metadata decoder -> payload encoder -> raw transaction
//! builder -> (external: wallet signs/submits)
//! ```
//!
//! - [`package::LoadedPackage`] validates a user-selected file set.
//! - [`metadata::PackageMetadata`] is the decoded `package-metadata.bcs`.
//! - [`payload`] encodes the entry-function arguments for the two publish
//!   entry points (plain, and under a new resource account).
//! - [`transaction::RawTransactionBuilder`] combines the payload with live
//!   chain state into an unsigned transaction.
//! - [`publisher::MovePublisher`] drives one attempt end to end over a
//!   [`publisher::WalletSigner`].

pub mod address;
pub mod codec;
pub mod error;
pub mod metadata;
pub mod network;
pub mod node;
pub mod package;
pub mod payload;
pub mod publisher;
pub mod transaction;

pub use address::AccountAddress;
pub use error::{CodecError, PublishError};
pub use metadata::{ModuleMetadata, PackageDep, PackageMetadata, UpgradePolicy};
pub use network::NetworkConfig;
pub use package::{LoadedPackage, PackageFile, METADATA_FILE};
pub use payload::{publish_package_call, resource_account_publish_call, SeedEncoding};
pub use publisher::{AttemptState, MovePublisher, PublishMode, WalletSigner};
pub use transaction::{
    EntryFunctionCall, EntryFunctionId, RawTransaction, RawTransactionBuilder,
};

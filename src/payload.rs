//! Entry-function argument encoding for the two publish entry points.
//!
//! Both on-chain functions take the raw metadata bytes and the compiled
//! module blobs as BCS-encoded arguments. Module order is exactly the load
//! order: the framework indexes bytecode by position, not by name.

use crate::address::AccountAddress;
use crate::codec::Encoder;
use crate::error::PublishError;
use crate::package::LoadedPackage;
use crate::transaction::{EntryFunctionCall, EntryFunctionId};

/// `0x1::code::publish_package_txn`
pub fn publish_entry_function() -> EntryFunctionId {
    EntryFunctionId::new(AccountAddress::ONE, "code", "publish_package_txn")
}

/// `0x1::resource_account::create_resource_account_and_publish_package`
pub fn resource_account_entry_function() -> EntryFunctionId {
    EntryFunctionId::new(
        AccountAddress::ONE,
        "resource_account",
        "create_resource_account_and_publish_package",
    )
}

/// How a user-supplied resource-account seed string is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedEncoding {
    /// Raw UTF-8 bytes of the string.
    Utf8,
    /// Two case-insensitive hex digits per byte.
    Hex,
}

/// Decode a seed string into its byte form.
pub fn seed_bytes(seed: &str, encoding: SeedEncoding) -> Result<Vec<u8>, PublishError> {
    match encoding {
        SeedEncoding::Utf8 => Ok(seed.as_bytes().to_vec()),
        SeedEncoding::Hex => {
            hex::decode(seed).map_err(|e| PublishError::InvalidHexSeed(e.to_string()))
        }
    }
}

/// Arguments for `publish_package_txn`:
/// `[ bytes(metadata), vector<bytes>(code) ]`.
pub fn publish_package_call(pkg: &LoadedPackage) -> EntryFunctionCall {
    EntryFunctionCall {
        function: publish_entry_function(),
        type_args: vec![],
        args: vec![
            encode_bytes_arg(&pkg.raw_metadata),
            encode_code_arg(&pkg.bytecode),
        ],
    }
}

/// Arguments for `create_resource_account_and_publish_package`:
/// `[ bytes(seed), bytes(metadata), vector<bytes>(code) ]`.
pub fn resource_account_publish_call(
    pkg: &LoadedPackage,
    seed: &str,
    encoding: SeedEncoding,
) -> Result<EntryFunctionCall, PublishError> {
    let seed = seed_bytes(seed, encoding)?;
    Ok(EntryFunctionCall {
        function: resource_account_entry_function(),
        type_args: vec![],
        args: vec![
            encode_bytes_arg(&seed),
            encode_bytes_arg(&pkg.raw_metadata),
            encode_code_arg(&pkg.bytecode),
        ],
    })
}

fn encode_bytes_arg(bytes: &[u8]) -> Vec<u8> {
    let mut e = Encoder::new();
    e.write_bytes(bytes);
    e.into_bytes()
}

fn encode_code_arg(modules: &[Vec<u8>]) -> Vec<u8> {
    let mut e = Encoder::new();
    e.write_seq(modules, |e, m| e.write_bytes(m));
    e.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Decoder;
    use crate::metadata::{ModuleMetadata, PackageMetadata, UpgradePolicy};
    use crate::package::{LoadedPackage, PackageFile, METADATA_FILE};

    fn fixture_package() -> LoadedPackage {
        let metadata = PackageMetadata {
            name: "demo".to_string(),
            upgrade_policy: UpgradePolicy::Compatible,
            upgrade_number: 0,
            source_digest: String::new(),
            manifest: vec![],
            modules: ["alpha", "beta"]
                .iter()
                .map(|m| ModuleMetadata {
                    name: m.to_string(),
                    source: vec![],
                    source_map: vec![],
                    extension: None,
                })
                .collect(),
            dependencies: vec![],
            extension: None,
        };
        let files = vec![
            PackageFile::new(METADATA_FILE, metadata.encode()),
            PackageFile::new("build/demo/bytecode_modules/alpha.mv", vec![0xa1, 0xa1]),
            PackageFile::new("build/demo/bytecode_modules/beta.mv", vec![0xb2]),
        ];
        LoadedPackage::load(&files).unwrap()
    }

    #[test]
    fn hex_seed_decodes_byte_pairs() {
        assert_eq!(seed_bytes("ab", SeedEncoding::Hex).unwrap(), vec![0xab]);
        assert_eq!(seed_bytes("AB", SeedEncoding::Hex).unwrap(), vec![0xab]);
        assert_eq!(
            seed_bytes("deadBEEF", SeedEncoding::Hex).unwrap(),
            vec![0xde, 0xad, 0xbe, 0xef]
        );
    }

    #[test]
    fn bad_hex_seeds_are_rejected() {
        for seed in ["a", "zz", "0x12"] {
            assert!(matches!(
                seed_bytes(seed, SeedEncoding::Hex),
                Err(PublishError::InvalidHexSeed(_))
            ));
        }
    }

    #[test]
    fn utf8_seed_is_raw_bytes() {
        assert_eq!(seed_bytes("seed1", SeedEncoding::Utf8).unwrap(), b"seed1");
    }

    #[test]
    fn publish_args_round_trip() {
        let pkg = fixture_package();
        let call = publish_package_call(&pkg);
        assert_eq!(call.function.to_string(), "0x1::code::publish_package_txn");
        assert!(call.type_args.is_empty());
        assert_eq!(call.args.len(), 2);

        // First argument is the metadata file bytes, length-prefixed.
        let mut d = Decoder::new(&call.args[0]);
        assert_eq!(d.read_bytes().unwrap(), pkg.raw_metadata);
        d.finish("metadata arg").unwrap();

        // Second argument decodes back to the bytecode blobs in load order.
        let mut d = Decoder::new(&call.args[1]);
        let code = d.read_seq(|d| d.read_bytes()).unwrap();
        d.finish("code arg").unwrap();
        assert_eq!(code, pkg.bytecode);
    }

    #[test]
    fn resource_account_args_include_seed_first() {
        let pkg = fixture_package();
        let call = resource_account_publish_call(&pkg, "seed1", SeedEncoding::Utf8).unwrap();
        assert_eq!(
            call.function.to_string(),
            "0x1::resource_account::create_resource_account_and_publish_package"
        );
        assert_eq!(call.args.len(), 3);

        let mut d = Decoder::new(&call.args[0]);
        assert_eq!(d.read_bytes().unwrap(), b"seed1");
        d.finish("seed arg").unwrap();
    }

    #[test]
    fn code_arg_matches_reference_bcs() {
        let pkg = fixture_package();
        let call = publish_package_call(&pkg);
        assert_eq!(call.args[1], bcs::to_bytes(&pkg.bytecode).unwrap());
    }
}

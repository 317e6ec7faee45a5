//! Move package metadata record.
//!
//! Decodes the `package-metadata.bcs` record that the Move build writes next
//! to the compiled bytecode. Field order is fixed by the on-chain
//! `0x1::code::PackageMetadata` struct: name, upgrade policy byte, upgrade
//! number, source digest, manifest blob, modules, dependencies, extension.
//!
//! Extension fields are `Option<0x1::any::Any>` on chain; their schema is
//! not fixed here, so a present extension is carried as an opaque byte blob
//! and re-emitted verbatim on encode.

use crate::address::AccountAddress;
use crate::codec::{Decoder, Encoder};
use crate::error::CodecError;

/// Upgrade policy byte values defined by the framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradePolicy {
    /// No compatibility check on upgrade.
    Arbitrary,
    /// Upgrades must be layout/API compatible.
    Compatible,
    /// The package can never be upgraded.
    Immutable,
}

impl UpgradePolicy {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(UpgradePolicy::Arbitrary),
            1 => Some(UpgradePolicy::Compatible),
            2 => Some(UpgradePolicy::Immutable),
            _ => None,
        }
    }

    pub fn as_byte(&self) -> u8 {
        match self {
            UpgradePolicy::Arbitrary => 0,
            UpgradePolicy::Compatible => 1,
            UpgradePolicy::Immutable => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradePolicy::Arbitrary => "arbitrary",
            UpgradePolicy::Compatible => "compatible",
            UpgradePolicy::Immutable => "immutable",
        }
    }
}

/// Per-module entry inside the package metadata.
///
/// `name` matches the base name of the compiled `<name>.mv` bytecode file.
/// `source` and `source_map` are zipped blobs and may be empty when the
/// package was built without source inclusion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMetadata {
    pub name: String,
    pub source: Vec<u8>,
    pub source_map: Vec<u8>,
    pub extension: Option<Vec<u8>>,
}

impl ModuleMetadata {
    fn decode(d: &mut Decoder<'_>) -> Result<Self, CodecError> {
        Ok(ModuleMetadata {
            name: d.read_str()?,
            source: d.read_bytes()?,
            source_map: d.read_bytes()?,
            extension: decode_extension(d)?,
        })
    }

    fn encode(&self, e: &mut Encoder) {
        e.write_str(&self.name);
        e.write_bytes(&self.source);
        e.write_bytes(&self.source_map);
        encode_extension(e, &self.extension);
    }
}

/// An upstream package this package was compiled against. Informational
/// only; nothing is fetched from it during publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDep {
    pub account: AccountAddress,
    pub package_name: String,
}

impl PackageDep {
    fn decode(d: &mut Decoder<'_>) -> Result<Self, CodecError> {
        Ok(PackageDep {
            account: AccountAddress::new(d.read_fixed("dependency account address")?),
            package_name: d.read_str()?,
        })
    }

    fn encode(&self, e: &mut Encoder) {
        e.write_fixed(self.account.as_bytes());
        e.write_str(&self.package_name);
    }
}

/// The decoded `package-metadata.bcs` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    pub name: String,
    pub upgrade_policy: UpgradePolicy,
    pub upgrade_number: u64,
    pub source_digest: String,
    pub manifest: Vec<u8>,
    /// Order here dictates the order bytecode blobs must be supplied in the
    /// publish payload.
    pub modules: Vec<ModuleMetadata>,
    pub dependencies: Vec<PackageDep>,
    pub extension: Option<Vec<u8>>,
}

impl PackageMetadata {
    /// Decode a full metadata record. The buffer must be consumed exactly;
    /// trailing bytes are malformed.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut d = Decoder::new(bytes);
        let metadata = Self::decode_fields(&mut d)?;
        d.finish("package metadata")?;
        Ok(metadata)
    }

    fn decode_fields(d: &mut Decoder<'_>) -> Result<Self, CodecError> {
        let name = d.read_str()?;
        let policy_offset = d.position();
        let policy_byte = d.read_u8()?;
        let upgrade_policy = UpgradePolicy::from_byte(policy_byte).ok_or_else(|| {
            CodecError::at(
                policy_offset,
                format!("unknown upgrade policy byte {policy_byte:#04x}"),
            )
        })?;
        Ok(PackageMetadata {
            name,
            upgrade_policy,
            upgrade_number: d.read_u64()?,
            source_digest: d.read_str()?,
            manifest: d.read_bytes()?,
            modules: d.read_seq(ModuleMetadata::decode)?,
            dependencies: d.read_seq(PackageDep::decode)?,
            extension: decode_extension(d)?,
        })
    }

    /// Re-encode to the canonical byte form; `decode(encode(m)) == m`.
    pub fn encode(&self) -> Vec<u8> {
        let mut e = Encoder::new();
        e.write_str(&self.name);
        e.write_u8(self.upgrade_policy.as_byte());
        e.write_u64(self.upgrade_number);
        e.write_str(&self.source_digest);
        e.write_bytes(&self.manifest);
        e.write_seq(&self.modules, |e, m| m.encode(e));
        e.write_seq(&self.dependencies, |e, dep| dep.encode(e));
        encode_extension(&mut e, &self.extension);
        e.into_bytes()
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.name.as_str())
    }
}

/// Decode an `Option<0x1::any::Any>` field, keeping the payload opaque.
///
/// The `Any` payload is a type-name string followed by a data blob; both are
/// length-prefixed, so consumption is well defined, but the parsed span is
/// captured verbatim rather than interpreted.
fn decode_extension(d: &mut Decoder<'_>) -> Result<Option<Vec<u8>>, CodecError> {
    if !d.read_option_tag()? {
        return Ok(None);
    }
    let start = d.position();
    d.read_bytes_raw()?;
    d.read_bytes_raw()?;
    Ok(Some(d.span_from(start).to_vec()))
}

fn encode_extension(e: &mut Encoder, extension: &Option<Vec<u8>>) {
    match extension {
        None => e.write_option_tag(false),
        Some(raw) => {
            e.write_option_tag(true);
            e.write_fixed(raw);
        }
    }
}

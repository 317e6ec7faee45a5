//! 32-byte on-chain account addresses.
//!
//! Addresses show up in several formats:
//! - Short form: "0x1"
//! - Full form: "0x0000...0001" (64 hex characters)
//! - Without prefix: "1"
//!
//! This module is the canonical source for parsing and formatting them;
//! other modules should import from here rather than defining their own
//! logic.

use std::fmt;

/// A 32-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountAddress([u8; 32]);

impl AccountAddress {
    pub const LENGTH: usize = 32;

    /// The framework address (0x1) hosting the publish entry points.
    pub const ONE: AccountAddress = {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        AccountAddress(bytes)
    };

    pub const fn new(bytes: [u8; 32]) -> Self {
        AccountAddress(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse a hex address in short or full form, with or without the `0x`
    /// prefix. Returns `None` for non-hex input or more than 64 digits.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let hex_digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if hex_digits.is_empty() || hex_digits.len() > 64 {
            return None;
        }
        // Left-pad odd/short forms to the full 64 hex characters.
        let padded = format!("{hex_digits:0>64}");
        let raw = hex::decode(padded).ok()?;
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&raw);
        Some(AccountAddress(bytes))
    }

    /// Full-form hex string: `0x` + 64 lowercase hex characters.
    pub fn to_full_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Short-form hex string with leading zeros trimmed (`0x1`, `0xabc`).
    pub fn to_short_hex(&self) -> String {
        let hex = hex::encode(self.0);
        let trimmed = hex.trim_start_matches('0');
        if trimmed.is_empty() {
            "0x0".to_string()
        } else {
            format!("0x{trimmed}")
        }
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_full_hex())
    }
}

impl fmt::Debug for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_short_hex())
    }
}

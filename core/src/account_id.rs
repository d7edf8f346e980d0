//! A minimal 32-byte account identifier.
//!
//! This mirrors `subxt`'s own simplified `AccountId32`: a plain wrapper around the
//! 32 raw bytes, with just enough functionality (ordering, hashing, codec, hex
//! display) for the pipeline to use addresses as map keys and log them, without
//! pulling in a full `sp-core` dependency for SS58 checksum formatting.

use std::fmt;
use std::str::FromStr;

use codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Encode, Decode, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId32(pub [u8; 32]);

impl AccountId32 {
    pub const fn new(bytes: [u8; 32]) -> Self {
        AccountId32(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl AsRef<[u8]> for AccountId32 {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

impl From<[u8; 32]> for AccountId32 {
    fn from(bytes: [u8; 32]) -> Self {
        AccountId32(bytes)
    }
}

impl fmt::Debug for AccountId32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for AccountId32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid account id: {0}")]
pub struct ParseAccountIdError(String);

impl FromStr for AccountId32 {
    type Err = ParseAccountIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|e| ParseAccountIdError(e.to_string()))?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ParseAccountIdError(format!("expected 32 bytes, got a different length in {s}")))?;
        Ok(AccountId32(array))
    }
}

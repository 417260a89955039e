use sha1::{Digest, Sha1};
use std::fmt::{Debug, Display};

use crate::error::{Error, Result};

/// Raw digest width in bytes, as embedded in tree entries.
pub const RAW_LEN: usize = 20;

/// Hex digest width in characters, the user-facing form.
pub const HEX_LEN: usize = 2 * RAW_LEN;

/// A 160-bit object id: the SHA-1 of an object's canonical bytes.
///
/// Two objects with identical canonical bytes share an id, which is what
/// makes the store content-addressed.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Oid {
    hash: [u8; RAW_LEN],
}

impl Oid {
    /// Digest canonical object bytes.
    pub fn hash(data: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(data);
        let hash = hasher.finalize();
        Self { hash: hash.into() }
    }

    /// Wrap 20 raw digest bytes.
    pub fn from_raw(hash: [u8; RAW_LEN]) -> Self {
        Self { hash }
    }

    /// Parse the 40-character hex form.
    pub fn from_hex(hex_digest: &str) -> Result<Self> {
        if hex_digest.len() != HEX_LEN {
            return Err(Error::InvalidDigest(hex_digest.to_string()));
        }

        let mut hash = [0u8; RAW_LEN];
        hex::decode_to_slice(hex_digest, &mut hash)
            .map_err(|_| Error::InvalidDigest(hex_digest.to_string()))?;

        Ok(Self { hash })
    }

    pub fn as_bytes(&self) -> &[u8; RAW_LEN] {
        &self.hash
    }

    pub fn to_hex(&self) -> String {
        base16ct::lower::encode_string(&self.hash)
    }
}

impl Debug for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<Oid> for String {
    fn from(value: Oid) -> Self {
        value.to_string()
    }
}

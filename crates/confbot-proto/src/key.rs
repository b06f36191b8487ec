//! Public keys and friend addresses.
//!
//! A friend address is what a user shares to be added: the long-term public
//! key, a 4-byte "nospam" value, and a 2-byte checksum. Authorization only
//! ever looks at the public key part.

use std::fmt;
use std::str::FromStr;

use crate::error::KeyError;
use crate::limits::{ADDRESS_SIZE, PUBLIC_KEY_SIZE};

/// Long-term public key of a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey(pub [u8; PUBLIC_KEY_SIZE]);

impl PublicKey {
    /// Build a key from the first [`PUBLIC_KEY_SIZE`] bytes of `bytes`.
    ///
    /// Accepts a bare key or a full address.
    pub fn from_prefix(bytes: &[u8]) -> Result<Self, KeyError> {
        let head = bytes.get(..PUBLIC_KEY_SIZE).ok_or(KeyError::InvalidLength {
            expected: PUBLIC_KEY_SIZE,
            actual: bytes.len(),
        })?;
        let mut key = [0u8; PUBLIC_KEY_SIZE];
        key.copy_from_slice(head);
        Ok(Self(key))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.0
    }

    /// Upper-case hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;

    /// Parse a hex key. A full hex address is accepted as well; only its
    /// key part is kept.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim())?;
        if bytes.len() != PUBLIC_KEY_SIZE && bytes.len() != ADDRESS_SIZE {
            return Err(KeyError::InvalidLength {
                expected: PUBLIC_KEY_SIZE,
                actual: bytes.len(),
            });
        }
        Self::from_prefix(&bytes)
    }
}

/// Shareable friend address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    /// Assemble an address from a key and nospam value, computing the
    /// checksum.
    pub fn new(key: PublicKey, nospam: u32) -> Self {
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes[..PUBLIC_KEY_SIZE].copy_from_slice(&key.0);
        bytes[PUBLIC_KEY_SIZE..PUBLIC_KEY_SIZE + 4].copy_from_slice(&nospam.to_be_bytes());
        let checksum = checksum(&bytes[..PUBLIC_KEY_SIZE + 4]);
        bytes[PUBLIC_KEY_SIZE + 4..].copy_from_slice(&checksum);
        Self(bytes)
    }

    /// The public key part of the address.
    pub fn public_key(&self) -> PublicKey {
        let mut key = [0u8; PUBLIC_KEY_SIZE];
        key.copy_from_slice(&self.0[..PUBLIC_KEY_SIZE]);
        PublicKey(key)
    }

    /// The nospam part of the address.
    pub fn nospam(&self) -> u32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.0[PUBLIC_KEY_SIZE..PUBLIC_KEY_SIZE + 4]);
        u32::from_be_bytes(raw)
    }

    /// Raw address bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    /// Upper-case hex encoding (76 characters).
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Address {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim())?;
        if bytes.len() != ADDRESS_SIZE {
            return Err(KeyError::InvalidLength {
                expected: ADDRESS_SIZE,
                actual: bytes.len(),
            });
        }
        let address = Self::new(PublicKey::from_prefix(&bytes)?, {
            let mut raw = [0u8; 4];
            raw.copy_from_slice(&bytes[PUBLIC_KEY_SIZE..PUBLIC_KEY_SIZE + 4]);
            u32::from_be_bytes(raw)
        });
        if address.0[..] != bytes[..] {
            return Err(KeyError::BadChecksum);
        }
        Ok(address)
    }
}

/// XOR of the input folded into two bytes.
fn checksum(data: &[u8]) -> [u8; 2] {
    let mut sum = [0u8; 2];
    for (i, byte) in data.iter().enumerate() {
        sum[i % 2] ^= byte;
    }
    sum
}

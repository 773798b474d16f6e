//
// Copyright 2020-2021 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

mod curve25519;

use std::fmt;

use curve25519_dalek::scalar;
use rand::{CryptoRng, Rng};
use subtle::ConstantTimeEq;

/// Length of a serialized public key: one type byte followed by the key.
pub const SERIALIZED_PUBLIC_KEY_LENGTH: usize = curve25519::PUBLIC_KEY_LENGTH + 1;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum KeyType {
    Djb,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl KeyType {
    fn value(&self) -> u8 {
        match &self {
            KeyType::Djb => 0x05u8,
        }
    }
}

#[derive(Debug, displaydoc::Display)]
pub enum CurveError {
    /// no key type identifier
    NoKeyTypeIdentifier,
    /// bad key type <{0:#04x}>
    BadKeyType(u8),
    /// bad key length <{1}> for key with type <{0}>
    BadKeyLength(KeyType, usize),
}

impl std::error::Error for CurveError {}

impl TryFrom<u8> for KeyType {
    type Error = CurveError;

    fn try_from(x: u8) -> Result<Self, CurveError> {
        match x {
            0x05u8 => Ok(KeyType::Djb),
            t => Err(CurveError::BadKeyType(t)),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum PublicKeyData {
    DjbPublicKey([u8; curve25519::PUBLIC_KEY_LENGTH]),
}

#[derive(Clone, Copy, Eq)]
pub struct PublicKey {
    key: PublicKeyData,
}

impl PublicKey {
    /// Parses a serialized key (type byte plus key bytes).
    ///
    /// Trailing bytes are rejected so that [`Self::serialize`] reproduces the
    /// input exactly.
    pub fn deserialize(value: &[u8]) -> Result<Self, CurveError> {
        let Some((&type_byte, key_bytes)) = value.split_first() else {
            return Err(CurveError::NoKeyTypeIdentifier);
        };
        match KeyType::try_from(type_byte)? {
            KeyType::Djb => {
                let key = <[u8; curve25519::PUBLIC_KEY_LENGTH]>::try_from(key_bytes)
                    .map_err(|_| CurveError::BadKeyLength(KeyType::Djb, value.len()))?;
                Ok(PublicKey {
                    key: PublicKeyData::DjbPublicKey(key),
                })
            }
        }
    }

    pub fn public_key_bytes(&self) -> &[u8] {
        match &self.key {
            PublicKeyData::DjbPublicKey(v) => v,
        }
    }

    /// Serialize the public key to a fixed-size array (1 type byte + 32 key bytes).
    pub fn serialize(&self) -> [u8; SERIALIZED_PUBLIC_KEY_LENGTH] {
        let mut result = [0u8; SERIALIZED_PUBLIC_KEY_LENGTH];
        result[0] = self.key_type().value();
        match &self.key {
            PublicKeyData::DjbPublicKey(v) => result[1..].copy_from_slice(v),
        }
        result
    }

    fn key_data(&self) -> &[u8] {
        match &self.key {
            PublicKeyData::DjbPublicKey(k) => k.as_ref(),
        }
    }

    pub fn key_type(&self) -> KeyType {
        match &self.key {
            PublicKeyData::DjbPublicKey(_) => KeyType::Djb,
        }
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = CurveError;

    fn try_from(value: &[u8]) -> Result<Self, CurveError> {
        Self::deserialize(value)
    }
}

impl subtle::ConstantTimeEq for PublicKey {
    /// A constant-time comparison as long as the two keys have a matching type.
    ///
    /// If the two keys have different types, the comparison short-circuits,
    /// much like comparing two slices of different lengths.
    fn ct_eq(&self, other: &PublicKey) -> subtle::Choice {
        if self.key_type() != other.key_type() {
            return 0.ct_eq(&1);
        }
        self.key_data().ct_eq(other.key_data())
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &PublicKey) -> bool {
        bool::from(self.ct_eq(other))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "PublicKey {{ key_type={}, serialize={} }}",
            self.key_type(),
            hex::encode(self.serialize())
        )
    }
}

#[derive(Clone, Copy, Eq, PartialEq)]
enum PrivateKeyData {
    DjbPrivateKey([u8; curve25519::PRIVATE_KEY_LENGTH]),
}

#[derive(Clone, Eq, PartialEq)]
pub struct PrivateKey {
    key: PrivateKeyData,
}

impl PrivateKey {
    pub fn deserialize(value: &[u8]) -> Result<Self, CurveError> {
        let key = <[u8; curve25519::PRIVATE_KEY_LENGTH]>::try_from(value)
            .map_err(|_| CurveError::BadKeyLength(KeyType::Djb, value.len()))?;
        // Clamping is not necessary but is kept for backward compatibility
        Ok(Self {
            key: PrivateKeyData::DjbPrivateKey(scalar::clamp_integer(key)),
        })
    }

    pub fn serialize(&self) -> &[u8; curve25519::PRIVATE_KEY_LENGTH] {
        match &self.key {
            PrivateKeyData::DjbPrivateKey(key) => key,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        match &self.key {
            PrivateKeyData::DjbPrivateKey(key) => {
                let private_key = curve25519::PrivateKey::from(*key);
                PublicKey {
                    key: PublicKeyData::DjbPublicKey(private_key.derive_public_key_bytes()),
                }
            }
        }
    }

    pub fn key_type(&self) -> KeyType {
        match &self.key {
            PrivateKeyData::DjbPrivateKey(_) => KeyType::Djb,
        }
    }
}

impl TryFrom<&[u8]> for PrivateKey {
    type Error = CurveError;

    fn try_from(value: &[u8]) -> Result<Self, CurveError> {
        Self::deserialize(value)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PrivateKey {{ key_type={} }}", self.key_type())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub private_key: PrivateKey,
}

impl KeyPair {
    pub fn generate<R: Rng + CryptoRng>(csprng: &mut R) -> Self {
        let temp = curve25519::PrivateKey::new(csprng);

        let public_key = PublicKey {
            key: PublicKeyData::DjbPublicKey(temp.derive_public_key_bytes()),
        };
        let private_key = PrivateKey {
            key: PrivateKeyData::DjbPrivateKey(temp.private_key_bytes()),
        };

        Self {
            public_key,
            private_key,
        }
    }

    pub fn new(public_key: PublicKey, private_key: PrivateKey) -> Self {
        Self {
            public_key,
            private_key,
        }
    }

    pub fn from_public_and_private(
        public_key: &[u8],
        private_key: &[u8],
    ) -> Result<Self, CurveError> {
        let public_key = PublicKey::try_from(public_key)?;
        let private_key = PrivateKey::try_from(private_key)?;
        Ok(Self {
            public_key,
            private_key,
        })
    }
}

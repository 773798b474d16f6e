//
// Copyright 2020-2022 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

use std::fmt;

use prekey_proto::prekey::{SignedPreKeyRecordStructure, SignedPublicPreKeyStructure};
use prost::Message;

use crate::core::{KeyPair, PrivateKey, PublicKey};
use crate::error::{Result, SignalProtocolError};
use crate::timestamp::Timestamp;

/// A unique identifier selecting among this client's known signed pre-keys.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignedPreKeyId(u32);

impl From<u32> for SignedPreKeyId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<SignedPreKeyId> for u32 {
    fn from(value: SignedPreKeyId) -> Self {
        value.0
    }
}

impl fmt::Display for SignedPreKeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fields shared by the public and the locally held signed pre-key records.
pub trait GenericSignedPreKey {
    fn id(&self) -> SignedPreKeyId;
    fn timestamp(&self) -> Timestamp;
    fn public_key(&self) -> &PublicKey;
    fn signature(&self) -> &[u8];
}

/// The published half of a signed pre-key: id, timestamp, public key and the
/// identity key's signature over that public key.
///
/// Values are immutable once built. [`SignedPreKeyRecord::new`] trusts its
/// inputs; [`SignedPreKeyRecord::deserialize`] is the path for untrusted bytes
/// and only yields fully populated records.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedPreKeyRecord {
    id: SignedPreKeyId,
    timestamp: Timestamp,
    public_key: PublicKey,
    signature: Box<[u8]>,
}

impl SignedPreKeyRecord {
    const NAME: &'static str = "SignedPreKeyRecord";

    pub fn new(
        id: SignedPreKeyId,
        timestamp: Timestamp,
        public_key: PublicKey,
        signature: &[u8],
    ) -> Self {
        Self {
            id,
            timestamp,
            public_key,
            signature: signature.into(),
        }
    }

    /// Decodes a record, failing with [`SignalProtocolError::InvalidEncoding`]
    /// if the bytes do not parse, a field is absent, or the key is malformed.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        SignedPublicPreKeyStructure::decode(data)
            .map_err(SignalProtocolError::from)
            .and_then(Self::try_from)
            .inspect(|record| log::trace!("decoded signed pre-key {}", record.id))
            .inspect_err(|e| {
                log::debug!("rejected signed pre-key record ({} bytes): {e}", data.len())
            })
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        let structure = self.as_protobuf();
        let mut serialized = Vec::with_capacity(structure.encoded_len());
        structure.encode(&mut serialized)?;
        log::trace!(
            "encoded signed pre-key {} into {} bytes",
            self.id,
            serialized.len()
        );
        Ok(serialized)
    }

    fn as_protobuf(&self) -> SignedPublicPreKeyStructure {
        SignedPublicPreKeyStructure {
            id: Some(self.id.into()),
            public_key: Some(self.public_key.serialize().to_vec()),
            signature: Some(self.signature.to_vec()),
            timestamp: Some(self.timestamp.epoch_millis()),
        }
    }
}

impl GenericSignedPreKey for SignedPreKeyRecord {
    fn id(&self) -> SignedPreKeyId {
        self.id
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    fn signature(&self) -> &[u8] {
        &self.signature
    }
}

impl TryFrom<SignedPublicPreKeyStructure> for SignedPreKeyRecord {
    type Error = SignalProtocolError;

    fn try_from(structure: SignedPublicPreKeyStructure) -> Result<Self> {
        // Every field is optional on the wire, so presence is checked here
        // before any of them is interpreted.
        let id = structure
            .id
            .ok_or_else(|| SignalProtocolError::missing_field(Self::NAME, "id"))?;
        let public_key = structure
            .public_key
            .ok_or_else(|| SignalProtocolError::missing_field(Self::NAME, "public_key"))?;
        let signature = structure
            .signature
            .ok_or_else(|| SignalProtocolError::missing_field(Self::NAME, "signature"))?;
        let timestamp = structure
            .timestamp
            .ok_or_else(|| SignalProtocolError::missing_field(Self::NAME, "timestamp"))?;

        Ok(Self::new(
            id.into(),
            Timestamp::from_epoch_millis(timestamp),
            PublicKey::deserialize(&public_key)?,
            &signature,
        ))
    }
}

impl TryFrom<&[u8]> for SignedPreKeyRecord {
    type Error = SignalProtocolError;

    fn try_from(value: &[u8]) -> Result<Self> {
        Self::deserialize(value)
    }
}

impl From<&LocalSignedPreKeyRecord> for SignedPreKeyRecord {
    fn from(record: &LocalSignedPreKeyRecord) -> Self {
        Self::new(
            record.id,
            record.timestamp,
            record.key_pair.public_key,
            &record.signature,
        )
    }
}

impl fmt::Debug for SignedPreKeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedPreKeyRecord")
            .field("id", &self.id)
            .field("timestamp", &self.timestamp)
            .field("public_key", &self.public_key)
            .field("signature", &hex::encode(&self.signature))
            .finish()
    }
}

/// A signed pre-key as held by its owner, private half included.
#[derive(Clone, PartialEq, Eq)]
pub struct LocalSignedPreKeyRecord {
    id: SignedPreKeyId,
    timestamp: Timestamp,
    key_pair: KeyPair,
    signature: Box<[u8]>,
}

impl LocalSignedPreKeyRecord {
    const NAME: &'static str = "LocalSignedPreKeyRecord";

    pub fn new(
        id: SignedPreKeyId,
        timestamp: Timestamp,
        key_pair: &KeyPair,
        signature: &[u8],
    ) -> Self {
        Self {
            id,
            timestamp,
            key_pair: key_pair.clone(),
            signature: signature.into(),
        }
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.key_pair.private_key
    }

    /// The part of this record that is safe to publish.
    pub fn public_record(&self) -> SignedPreKeyRecord {
        SignedPreKeyRecord::from(self)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self> {
        SignedPreKeyRecordStructure::decode(data)
            .map_err(SignalProtocolError::from)
            .and_then(Self::try_from)
            .inspect(|record| log::trace!("decoded local signed pre-key {}", record.id))
            .inspect_err(|e| {
                log::debug!(
                    "rejected local signed pre-key record ({} bytes): {e}",
                    data.len()
                )
            })
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        let structure = SignedPreKeyRecordStructure {
            id: Some(self.id.into()),
            public_key: Some(self.key_pair.public_key.serialize().to_vec()),
            private_key: Some(self.key_pair.private_key.serialize().to_vec()),
            signature: Some(self.signature.to_vec()),
            timestamp: Some(self.timestamp.epoch_millis()),
        };
        let mut serialized = Vec::with_capacity(structure.encoded_len());
        structure.encode(&mut serialized)?;
        log::trace!(
            "encoded local signed pre-key {} into {} bytes",
            self.id,
            serialized.len()
        );
        Ok(serialized)
    }
}

impl GenericSignedPreKey for LocalSignedPreKeyRecord {
    fn id(&self) -> SignedPreKeyId {
        self.id
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    fn public_key(&self) -> &PublicKey {
        &self.key_pair.public_key
    }

    fn signature(&self) -> &[u8] {
        &self.signature
    }
}

impl TryFrom<SignedPreKeyRecordStructure> for LocalSignedPreKeyRecord {
    type Error = SignalProtocolError;

    fn try_from(structure: SignedPreKeyRecordStructure) -> Result<Self> {
        let id = structure
            .id
            .ok_or_else(|| SignalProtocolError::missing_field(Self::NAME, "id"))?;
        let public_key = structure
            .public_key
            .ok_or_else(|| SignalProtocolError::missing_field(Self::NAME, "public_key"))?;
        let private_key = structure
            .private_key
            .ok_or_else(|| SignalProtocolError::missing_field(Self::NAME, "private_key"))?;
        let signature = structure
            .signature
            .ok_or_else(|| SignalProtocolError::missing_field(Self::NAME, "signature"))?;
        let timestamp = structure
            .timestamp
            .ok_or_else(|| SignalProtocolError::missing_field(Self::NAME, "timestamp"))?;

        let key_pair = KeyPair::from_public_and_private(&public_key, &private_key)?;
        Ok(Self::new(
            id.into(),
            Timestamp::from_epoch_millis(timestamp),
            &key_pair,
            &signature,
        ))
    }
}

impl TryFrom<&[u8]> for LocalSignedPreKeyRecord {
    type Error = SignalProtocolError;

    fn try_from(value: &[u8]) -> Result<Self> {
        Self::deserialize(value)
    }
}

impl fmt::Debug for LocalSignedPreKeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSignedPreKeyRecord")
            .field("id", &self.id)
            .field("timestamp", &self.timestamp)
            .field("public_key", &self.key_pair.public_key)
            .field("signature", &hex::encode(&self.signature))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn public_structure() -> SignedPublicPreKeyStructure {
        let key_pair = KeyPair::generate(&mut rand::rng());
        SignedPublicPreKeyStructure {
            id: Some(7),
            public_key: Some(key_pair.public_key.serialize().to_vec()),
            signature: Some(vec![0xAB; 64]),
            timestamp: Some(1000),
        }
    }

    fn assert_missing(result: Result<SignedPreKeyRecord>, field: &str) {
        match result {
            Err(SignalProtocolError::InvalidEncoding(message)) => {
                assert!(message.contains(field), "unexpected message: {message}")
            }
            other => panic!("expected InvalidEncoding for `{field}`, got {other:?}"),
        }
    }

    #[test]
    fn test_each_missing_field_is_rejected() {
        let mut s = public_structure();
        s.id = None;
        assert_missing(SignedPreKeyRecord::try_from(s), "`id`");

        let mut s = public_structure();
        s.public_key = None;
        assert_missing(SignedPreKeyRecord::try_from(s), "`public_key`");

        let mut s = public_structure();
        s.signature = None;
        assert_missing(SignedPreKeyRecord::try_from(s), "`signature`");

        let mut s = public_structure();
        s.timestamp = None;
        assert_missing(SignedPreKeyRecord::try_from(s), "`timestamp`");
    }

    #[test]
    fn test_single_present_field_is_rejected() {
        let full = public_structure();
        let only_id = SignedPublicPreKeyStructure {
            id: full.id,
            ..Default::default()
        };
        let only_key = SignedPublicPreKeyStructure {
            public_key: full.public_key.clone(),
            ..Default::default()
        };
        let only_signature = SignedPublicPreKeyStructure {
            signature: full.signature.clone(),
            ..Default::default()
        };
        let only_timestamp = SignedPublicPreKeyStructure {
            timestamp: full.timestamp,
            ..Default::default()
        };

        for structure in [only_id, only_key, only_signature, only_timestamp] {
            assert!(matches!(
                SignedPreKeyRecord::deserialize(&structure.encode_to_vec()),
                Err(SignalProtocolError::InvalidEncoding(_))
            ));
        }
    }

    #[test]
    fn test_empty_signature_is_present() {
        let mut s = public_structure();
        s.signature = Some(Vec::new());
        let record = SignedPreKeyRecord::try_from(s).expect("empty signature is still present");
        assert!(record.signature().is_empty());
    }

    #[test]
    fn test_malformed_public_key_is_rejected() {
        let mut s = public_structure();
        s.public_key = Some(vec![0x05; 10]);
        let err = SignedPreKeyRecord::try_from(s).expect_err("short key");
        assert!(matches!(
            err,
            SignalProtocolError::InvalidEncoding(ref m) if m.contains("bad key length")
        ));

        let mut s = public_structure();
        if let Some(key) = s.public_key.as_mut() {
            key[0] = 0x06;
        }
        assert!(matches!(
            SignedPreKeyRecord::try_from(s),
            Err(SignalProtocolError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        let err = SignedPreKeyRecord::deserialize(&[0xFF, 0xFF, 0xFF]).expect_err("garbage");
        assert!(matches!(
            err,
            SignalProtocolError::InvalidEncoding(ref m) if m.contains("protobuf decode failed")
        ));
    }

    #[test]
    fn test_encoding_is_protobuf_of_all_fields() -> Result<()> {
        let structure = public_structure();
        let record = SignedPreKeyRecord::try_from(structure.clone())?;
        let decoded = SignedPublicPreKeyStructure::decode(record.serialize()?.as_slice())
            .expect("serialize emits valid protobuf");
        assert_eq!(decoded, structure);
        Ok(())
    }

    #[test]
    fn test_local_record_requires_private_key() {
        let key_pair = KeyPair::generate(&mut rand::rng());
        let structure = SignedPreKeyRecordStructure {
            id: Some(1),
            public_key: Some(key_pair.public_key.serialize().to_vec()),
            private_key: None,
            signature: Some(vec![1; 64]),
            timestamp: Some(5),
        };
        let err = LocalSignedPreKeyRecord::try_from(structure.clone()).expect_err("no private key");
        assert!(matches!(
            err,
            SignalProtocolError::InvalidEncoding(ref m) if m.contains("`private_key`")
        ));

        let structure = SignedPreKeyRecordStructure {
            private_key: Some(vec![0; 12]),
            ..structure
        };
        assert!(matches!(
            LocalSignedPreKeyRecord::try_from(structure),
            Err(SignalProtocolError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_local_debug_hides_private_key() {
        let key_pair = KeyPair::generate(&mut rand::rng());
        let record = LocalSignedPreKeyRecord::new(
            3.into(),
            Timestamp::from_epoch_millis(9),
            &key_pair,
            &[0xCD; 4],
        );
        let rendered = format!("{record:?}");
        assert!(rendered.contains("cdcdcdcd"));
        assert!(!rendered.contains(&hex::encode(key_pair.private_key.serialize())));
    }
}

//
// Copyright 2020-2021 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

use displaydoc::Display;
use thiserror::Error;

use crate::core::CurveError;

pub type Result<T> = std::result::Result<T, SignalProtocolError>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum SignalProtocolError {
    /// invalid encoding: {0}
    InvalidEncoding(String),
    /// encoding failed: {0}
    EncodingFailure(String),
}

impl SignalProtocolError {
    /// Shorthand for a record that decoded but lacks a required field.
    pub(crate) fn missing_field(record: &'static str, field: &'static str) -> Self {
        Self::InvalidEncoding(format!("{record} is missing required field `{field}`"))
    }
}

impl From<CurveError> for SignalProtocolError {
    fn from(e: CurveError) -> Self {
        Self::InvalidEncoding(format!("malformed key material: {e}"))
    }
}

impl From<prost::DecodeError> for SignalProtocolError {
    fn from(e: prost::DecodeError) -> Self {
        Self::InvalidEncoding(format!("protobuf decode failed: {e}"))
    }
}

impl From<prost::EncodeError> for SignalProtocolError {
    fn from(e: prost::EncodeError) -> Self {
        Self::EncodingFailure(format!("protobuf encode failed: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::KeyType;
    use prekey_proto::prekey::SignedPublicPreKeyStructure;
    use prost::Message;

    #[test]
    fn test_curve_error_becomes_invalid_encoding() {
        let err = SignalProtocolError::from(CurveError::BadKeyLength(KeyType::Djb, 5));
        assert_eq!(
            err.to_string(),
            "invalid encoding: malformed key material: bad key length <5> for key with type <Djb>"
        );
    }

    #[test]
    fn test_missing_field_message_names_the_field() {
        let err = SignalProtocolError::missing_field("SignedPreKeyRecord", "timestamp");
        assert!(matches!(
            err,
            SignalProtocolError::InvalidEncoding(ref m) if m.contains("`timestamp`")
        ));
    }

    #[test]
    fn test_encode_error_becomes_encoding_failure() {
        let structure = SignedPublicPreKeyStructure {
            id: Some(7),
            public_key: Some(vec![0x05; 33]),
            signature: Some(vec![0xAB; 64]),
            timestamp: Some(1000),
        };
        let mut buffer = [0u8; 4];
        let encode_error = structure
            .encode(&mut &mut buffer[..])
            .expect_err("buffer is too small for the structure");
        let cause = encode_error.to_string();

        let err = SignalProtocolError::from(encode_error);
        match &err {
            SignalProtocolError::EncodingFailure(message) => {
                assert!(message.contains(&cause), "unexpected message: {message}")
            }
            other => panic!("expected EncodingFailure, got {other:?}"),
        }
        assert!(err.to_string().starts_with("encoding failed: "));
    }
}

//
// Copyright 2020-2021 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Signed pre-key records for the **[X3DH]** key agreement protocol.
//!
//! A signed pre-key is a medium-term public key published alongside a
//! signature made with the owner's identity key. This crate converts the
//! public form of that record to and from its protobuf encoding, refusing
//! any encoding in which a field is missing, and projects the locally held
//! record (private key included) down to the public one.
//!
//! Computing or checking the signature, rotating keys and storing records
//! are left to the caller.
//!
//! [X3DH]: https://signal.org/docs/specifications/x3dh/

#![warn(clippy::unwrap_used)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
mod state;
mod timestamp;

pub use crate::core::curve::{CurveError, KeyPair, KeyType, PrivateKey, PublicKey};
pub use error::{Result, SignalProtocolError};
pub use state::{GenericSignedPreKey, LocalSignedPreKeyRecord, SignedPreKeyId, SignedPreKeyRecord};
pub use timestamp::Timestamp;
// Re-exporting structures from the proto crate for callers that store them directly
pub use prekey_proto::prekey::{SignedPreKeyRecordStructure, SignedPublicPreKeyStructure};

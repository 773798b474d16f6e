mod signed_prekey;

pub use signed_prekey::{
    GenericSignedPreKey, LocalSignedPreKeyRecord, SignedPreKeyId, SignedPreKeyRecord,
};

pub mod curve;

pub use curve::{CurveError, KeyPair, KeyType, PrivateKey, PublicKey};

//! Small encrypted-at-rest credential store. Registered users are kept as
//! hashed username/password pairs, serialized to JSON and sealed with an RSA
//! public key before they ever touch disk. The store self-heals from a
//! corrupt backing file so a bad byte never takes the process down.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod store;

//! Cryptography module covering the two primitives the store needs:
//! one-way credential digests and the asymmetric seal around the backing
//! file. Each submodule has a single responsibility so the security model
//! stays simple and auditable.

pub mod asymmetric;
pub mod hashing;

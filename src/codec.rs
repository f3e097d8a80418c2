//! JSON codec for the user collection. This is deliberately a bounded schema
//! rather than a generic serializer: the store only ever persists one shape.
//! Both directions have failure-as-absent semantics; malformed input yields
//! `None`, never a panic and never a zero-initialized stand-in.

use crate::store::User;

/// Encodes the user collection as JSON text. Returns `None` if serialization
/// fails for any reason.
pub fn encode_users(users: &[User]) -> Option<String> {
    serde_json::to_string(users).ok()
}

/// Decodes JSON text back into a user collection. Returns `None` on malformed
/// or shape-mismatched input.
pub fn decode_users(text: &str) -> Option<Vec<User>> {
    serde_json::from_str(text).ok()
}

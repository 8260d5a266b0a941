//! Resolved caller identity.

use serde::{Deserialize, Serialize};

/// Identity resolved from a bearer token.
///
/// Created per request by the token authenticator (from the identity
/// authority's introspection response), handed to downstream handlers through
/// request extensions and discarded when the request ends. Never persisted.
///
/// The serialized form is also the introspection wire format:
///
/// ```json
/// { "id": 1, "username": "alice", "is_admin": false }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
}

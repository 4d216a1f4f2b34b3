use bson::DateTime;
use serde::{Deserialize, Serialize};

/// An admin account in the `users` collection.
///
/// `password` is an opaque PHC hash string, never plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password: String,
    pub created_at: DateTime,
}

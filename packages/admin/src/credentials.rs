use std::fmt;

use bson::{Bson, DateTime, Document};
use common::storage::{DocumentStore, Filter, IndexSpec, StoreError};
use tracing::{debug, info, instrument};

use crate::entity::UserRecord;
use crate::error::{AdminError, Result};
use crate::utils::hash::{self, HashCost};

pub const USERS_COLLECTION: &str = "users";

/// Username must be 1-32 letters, digits or underscores; password 8-128 bytes.
pub fn validate_registration(username: &str, password: &str) -> Result<()> {
    let username = username.trim();
    if username.is_empty() || username.chars().count() > 32 {
        return Err(AdminError::Validation(
            "Username must be 1-32 characters".into(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AdminError::Validation(
            "Username must contain only letters, digits, and underscores".into(),
        ));
    }
    if password.len() < 8 || password.len() > 128 {
        return Err(AdminError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}

/// The stored hash as text. Records migrated from the earlier tooling hold
/// the bcrypt output as binary.
fn stored_hash(document: &Document) -> Result<String> {
    match document.get("password") {
        Some(Bson::String(hash)) => Ok(hash.clone()),
        Some(Bson::Binary(binary)) => String::from_utf8(binary.bytes.clone())
            .map_err(|_| AdminError::Hash("stored password is not valid UTF-8".into())),
        _ => Err(AdminError::Hash(
            "stored password is missing or not a hash".into(),
        )),
    }
}

/// Create the unique `username` index unless it is already there.
pub async fn ensure_user_index(store: &dyn DocumentStore) -> std::result::Result<(), StoreError> {
    let index = IndexSpec::unique("username");
    let present = store.index_names(USERS_COLLECTION).await?;
    if present.contains(&index.name()) {
        return Ok(());
    }
    store.create_index(USERS_COLLECTION, &index).await?;
    info!("Ensured unique index on {}.username", USERS_COLLECTION);
    Ok(())
}

/// Store a new admin user with a salted Argon2id hash of `password`.
///
/// Fails with [`AdminError::UsernameTaken`] if the username exists; the
/// stored record is left untouched in that case.
#[instrument(skip_all, fields(username = %username))]
pub async fn register(
    store: &dyn DocumentStore,
    cost: HashCost,
    username: &str,
    password: &str,
) -> Result<()> {
    validate_registration(username, password)?;
    let username = username.trim();

    ensure_user_index(store).await?;

    let argon = hash::hasher(cost)?;
    let hashed = hash::hash_password(&argon, password)?;

    let record = UserRecord {
        username: username.to_string(),
        password: hashed,
        created_at: DateTime::now(),
    };
    let document = bson::to_document(&record).map_err(StoreError::from)?;

    store
        .insert_one(USERS_COLLECTION, document)
        .await
        .map_err(|e| {
            if e.is_duplicate_key() {
                debug!("Unique username index rejected insert");
                AdminError::UsernameTaken(username.to_string())
            } else {
                AdminError::from(e)
            }
        })?;

    info!("User registered");
    Ok(())
}

/// Result of a credential check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated,
    UnknownUser,
    WrongPassword,
}

impl AuthOutcome {
    pub fn is_authenticated(self) -> bool {
        self == Self::Authenticated
    }
}

impl fmt::Display for AuthOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Authenticated => "Authentication successful",
            Self::UnknownUser => "User not found",
            Self::WrongPassword => "Invalid password",
        })
    }
}

/// Check `password` against the stored hash for `username`.
///
/// New hashes are Argon2id; bcrypt hashes from migrated records still verify.
#[instrument(skip_all, fields(username = %username))]
pub async fn authenticate(
    store: &dyn DocumentStore,
    username: &str,
    password: &str,
) -> Result<AuthOutcome> {
    let Some(document) = store
        .find_one(USERS_COLLECTION, &Filter::eq("username", username.trim()))
        .await?
    else {
        return Ok(AuthOutcome::UnknownUser);
    };

    let stored = stored_hash(&document)?;
    let matched = if hash::is_bcrypt(&stored) {
        hash::verify_bcrypt(password, &stored)?
    } else {
        hash::verify_password(password, &stored)?
    };

    let outcome = if matched {
        AuthOutcome::Authenticated
    } else {
        AuthOutcome::WrongPassword
    };
    debug!(?outcome, "Credential check finished");
    Ok(outcome)
}

use std::fmt;

use common::storage::{DocumentStore, Filter};
use tracing::{info, instrument};

use crate::credentials::{USERS_COLLECTION, ensure_user_index};
use crate::error::{AdminError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    Copied,
    AlreadyPresent,
    NotInSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    pub username: String,
    pub source: String,
    pub destination: String,
    pub outcome: TransferOutcome,
}

impl fmt::Display for TransferReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            TransferOutcome::Copied => write!(
                f,
                "User {} copied to {} DB successfully!",
                self.username, self.destination
            ),
            TransferOutcome::AlreadyPresent => write!(
                f,
                "User {} already exists in {} DB",
                self.username, self.destination
            ),
            TransferOutcome::NotInSource => write!(
                f,
                "User {} not found in {} DB",
                self.username, self.source
            ),
        }
    }
}

/// Copy one user record, unchanged, from `source` to `destination`.
///
/// Does nothing when the destination already has the username. The unique
/// username index is ensured on the destination in every case.
#[instrument(skip_all, fields(username = %username))]
pub async fn move_user(
    source: &dyn DocumentStore,
    destination: &dyn DocumentStore,
    username: &str,
) -> Result<TransferReport> {
    let filter = Filter::eq("username", username);

    let outcome = match source.find_one(USERS_COLLECTION, &filter).await? {
        None => TransferOutcome::NotInSource,
        Some(user) => {
            if destination.find_one(USERS_COLLECTION, &filter).await?.is_some() {
                TransferOutcome::AlreadyPresent
            } else {
                match destination.insert_one(USERS_COLLECTION, user).await {
                    Ok(()) => TransferOutcome::Copied,
                    Err(e) if e.is_duplicate_key() => TransferOutcome::AlreadyPresent,
                    Err(e) => return Err(AdminError::from(e)),
                }
            }
        }
    };

    ensure_user_index(destination).await?;
    info!(
        source = source.database_name(),
        destination = destination.database_name(),
        ?outcome,
        "User transfer finished"
    );

    Ok(TransferReport {
        username: username.to_string(),
        source: source.database_name().to_string(),
        destination: destination.database_name().to_string(),
        outcome,
    })
}

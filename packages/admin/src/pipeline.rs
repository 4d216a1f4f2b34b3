use std::io::Write;
use std::path::Path;

use common::storage::DocumentStore;
use tracing::error;

use crate::entity::EntityKind;
use crate::error::Result;
use crate::seed::{self, default_collections};
use crate::{loader, verify};

fn separator(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "\n{}", "=".repeat(50))
}

/// Bootstrap, load, verify and inspect one entity kind, writing each step's
/// report to `out`.
///
/// A failed load is reported and the remaining read-only steps still run;
/// the load error is then returned.
pub async fn seed(
    store: &dyn DocumentStore,
    kind: EntityKind,
    file: &Path,
    out: &mut impl Write,
) -> Result<()> {
    writeln!(out, "Setting up collections and indexes...")?;
    let report = seed::bootstrap(store, &default_collections()).await?;
    writeln!(out, "{report}")?;

    separator(out)?;
    writeln!(out, "Inserting {kind} from {}...", file.display())?;
    let loaded = loader::load_kind(store, kind, file).await;
    match &loaded {
        Ok(report) => writeln!(out, "{report}")?,
        Err(e) => {
            error!("Load failed: {}", e);
            writeln!(out, "Error: {e}")?;
        }
    }

    separator(out)?;
    writeln!(out, "Verifying inserted {kind}:")?;
    writeln!(out, "{}", verify::verify(store, kind).await?)?;

    separator(out)?;
    writeln!(out, "Current database state:")?;
    writeln!(out, "{}", verify::inspect_state(store, kind).await?)?;

    separator(out)?;
    loaded?;
    writeln!(out, "{} setup completed successfully!", kind.singular())?;
    Ok(())
}

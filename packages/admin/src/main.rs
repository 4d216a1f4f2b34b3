use std::path::PathBuf;

use admin::cleanup::{self, PurgeMode};
use admin::config::AppConfig;
use admin::credentials;
use admin::database;
use admin::entity::EntityKind;
use admin::loader;
use admin::pipeline;
use admin::seed::{self, default_collections};
use admin::transfer;
use admin::verify;
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use common::storage::mongo::MongoStore;
use dialoguer::{Confirm, Password};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "folio", version)]
#[command(about = "Seed, migrate and inspect the portfolio document store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create missing collections and indexes.
    Bootstrap,
    /// Insert blogs or projects from a JSON file.
    Load {
        kind: EntityKind,
        /// Input file. Defaults to the configured seed file.
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Count stored documents and show the first few.
    Verify { kind: EntityKind },
    /// Report which documents carry assets and card assets.
    State { kind: EntityKind },
    /// Bootstrap, load and verify in one run.
    Seed {
        kind: EntityKind,
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Register the admin user.
    Register {
        username: String,
        /// Prompted for when not given.
        #[arg(long, env = "FOLIO_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Check a username and password against the stored hash.
    Authenticate {
        username: String,
        #[arg(long, env = "FOLIO_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Copy a user record from another database into the configured one.
    MoveUser {
        /// Defaults to `transfer.username` from the configuration.
        #[arg(long)]
        username: Option<String>,
        /// Source database. Defaults to `transfer.source_database`.
        #[arg(long)]
        from: Option<String>,
    },
    /// Delete every document in a collection.
    Purge {
        collection: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
        /// Only report how many documents would be deleted.
        #[arg(long)]
        dry_run: bool,
    },
    /// Delete documents that lack a generated identifier.
    CleanSamples { kind: EntityKind },
}

/// A command with every interactive input already collected.
enum Job {
    Bootstrap,
    Load(EntityKind, PathBuf),
    Verify(EntityKind),
    State(EntityKind),
    Seed(EntityKind, PathBuf),
    Register { username: String, password: String },
    Authenticate { username: String, password: String },
    MoveUser { username: String, from: String },
    Purge { collection: String, mode: PurgeMode },
    CleanSamples(EntityKind),
}

fn read_password(given: Option<String>, confirm: bool) -> anyhow::Result<String> {
    if let Some(password) = given {
        return Ok(password);
    }
    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
    }
    prompt.interact().context("Failed to read password")
}

fn prepare(command: Command, config: &AppConfig) -> anyhow::Result<Job> {
    let job = match command {
        Command::Bootstrap => Job::Bootstrap,
        Command::Load { kind, file } => {
            Job::Load(kind, file.unwrap_or_else(|| config.seed.source_file(kind)))
        }
        Command::Verify { kind } => Job::Verify(kind),
        Command::State { kind } => Job::State(kind),
        Command::Seed { kind, file } => {
            Job::Seed(kind, file.unwrap_or_else(|| config.seed.source_file(kind)))
        }
        Command::Register { username, password } => Job::Register {
            password: read_password(password, true)?,
            username,
        },
        Command::Authenticate { username, password } => Job::Authenticate {
            password: read_password(password, false)?,
            username,
        },
        Command::MoveUser { username, from } => {
            let Some(username) = username.or_else(|| config.transfer.username.clone()) else {
                bail!("No username given: pass --username or set transfer.username");
            };
            Job::MoveUser {
                username,
                from: from.unwrap_or_else(|| config.transfer.source_database.clone()),
            }
        }
        Command::Purge {
            collection,
            yes,
            dry_run,
        } => {
            let confirmed = yes
                || dry_run
                || Confirm::new()
                    .with_prompt(format!(
                        "Delete every document in {}.{collection}?",
                        config.database.name
                    ))
                    .default(false)
                    .interact()
                    .context("Failed to read confirmation")?;
            Job::Purge {
                mode: PurgeMode::from_flags(dry_run, confirmed)?,
                collection,
            }
        }
        Command::CleanSamples { kind } => Job::CleanSamples(kind),
    };
    Ok(job)
}

async fn run(job: Job, config: &AppConfig, store: &MongoStore) -> anyhow::Result<()> {
    match job {
        Job::Bootstrap => {
            println!("{}", seed::bootstrap(store, &default_collections()).await?);
        }
        Job::Load(kind, file) => {
            println!("{}", loader::load_kind(store, kind, &file).await?);
        }
        Job::Verify(kind) => {
            println!("{}", verify::verify(store, kind).await?);
        }
        Job::State(kind) => {
            println!("{}", verify::inspect_state(store, kind).await?);
        }
        Job::Seed(kind, file) => {
            pipeline::seed(store, kind, &file, &mut std::io::stdout())
                .await
                .with_context(|| format!("{kind} setup failed"))?;
        }
        Job::Register { username, password } => {
            credentials::register(store, config.auth.cost(), &username, &password).await?;
            println!("User registered successfully");
        }
        Job::Authenticate { username, password } => {
            let outcome = credentials::authenticate(store, &username, &password).await?;
            println!("{outcome}");
            if !outcome.is_authenticated() {
                bail!("Authentication failed for {username}");
            }
        }
        Job::MoveUser { username, from } => {
            let source = store.with_database(&from);
            println!("{}", transfer::move_user(&source, store, &username).await?);
            println!("Index ensured on username");
        }
        Job::Purge { collection, mode } => {
            println!("{}", cleanup::purge(store, &collection, mode).await?);
        }
        Job::CleanSamples(kind) => {
            let removed = cleanup::clean_samples(store, kind).await?;
            if removed > 0 {
                println!(
                    "Cleaned up {removed} sample documents without {}",
                    kind.ident_field()
                );
            } else {
                println!("No sample documents found in {kind}");
            }
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load config")?;
    let job = prepare(cli.command, &config)?;

    info!(database = %config.database.name, "Connecting");
    let database = config.database.clone();
    database::scoped(&database, async move |store| run(job, &config, store).await).await
}

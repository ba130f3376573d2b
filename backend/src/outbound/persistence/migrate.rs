//! Embedded schema migrations.
//!
//! Migrations run over a plain synchronous connection inside
//! `spawn_blocking`; they execute once at startup, so a dedicated async
//! migration stack is not worth carrying.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Errors raised while applying migrations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// Could not connect to the database.
    #[error("failed to connect for migrations: {message}")]
    Connect { message: String },

    /// A migration failed to apply.
    #[error("failed to apply migrations: {message}")]
    Apply { message: String },
}

impl MigrationError {
    fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    fn apply(message: impl Into<String>) -> Self {
        Self::Apply {
            message: message.into(),
        }
    }
}

/// Apply all pending migrations against the given database.
pub async fn run_pending(database_url: &str) -> Result<(), MigrationError> {
    let database_url = database_url.to_owned();
    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&database_url)
            .map_err(|error| MigrationError::connect(error.to_string()))?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|error| MigrationError::apply(error.to_string()))?;
        info!(count = applied.len(), "schema migrations applied");
        Ok(())
    })
    .await
    .map_err(|error| MigrationError::apply(error.to_string()))?
}

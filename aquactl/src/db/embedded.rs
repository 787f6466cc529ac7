//! Embedded PostgreSQL for local development.
//!
//! Only available with the `embedded-db` feature. Without it, [`EmbeddedDatabase`] still exists
//! so that callers can name the type, but it can never be constructed.

#[cfg(feature = "embedded-db")]
use std::path::PathBuf;
#[cfg(feature = "embedded-db")]
use tracing::{debug, info};

#[cfg(feature = "embedded-db")]
const DATABASE_NAME: &str = "aquactl";

/// A PostgreSQL server owned by this process.
#[cfg(feature = "embedded-db")]
pub struct EmbeddedDatabase {
    postgres: postgresql_embedded::PostgreSQL,
    connection_string: String,
}

#[cfg(not(feature = "embedded-db"))]
pub enum EmbeddedDatabase {}

#[cfg(feature = "embedded-db")]
impl EmbeddedDatabase {
    /// Install (if needed) and start a server, creating the application database on first run.
    ///
    /// Non-persistent databases live in a temporary directory that is removed on stop.
    pub async fn start(data_dir: Option<PathBuf>, persistent: bool) -> anyhow::Result<Self> {
        let mut settings = postgresql_embedded::Settings::default();
        if persistent {
            settings.data_dir = data_dir.unwrap_or_else(|| PathBuf::from(".aquactl_data/postgres"));
            settings.temporary = false;
        } else if let Some(dir) = data_dir {
            settings.data_dir = dir;
        }
        debug!("Embedded database data directory: {}", settings.data_dir.display());

        let mut postgres = postgresql_embedded::PostgreSQL::new(settings);
        postgres.setup().await?;
        postgres.start().await?;

        if !postgres.database_exists(DATABASE_NAME).await? {
            info!("Creating embedded database {DATABASE_NAME}");
            postgres.create_database(DATABASE_NAME).await?;
        }

        let connection_string = postgres.settings().url(DATABASE_NAME);
        info!("Embedded database started on port {}", postgres.settings().port);

        Ok(Self {
            postgres,
            connection_string,
        })
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    pub async fn stop(self) -> anyhow::Result<()> {
        self.postgres.stop().await?;
        Ok(())
    }
}

#[cfg(not(feature = "embedded-db"))]
impl EmbeddedDatabase {
    pub async fn stop(self) -> anyhow::Result<()> {
        match self {}
    }
}

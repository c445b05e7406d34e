//! SurrealDB connection management.

use std::time::Duration;

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::{info, warn};

/// Configuration for connecting to SurrealDB.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket URL (e.g., `127.0.0.1:8000`).
    pub url: String,
    /// SurrealDB namespace.
    pub namespace: String,
    /// SurrealDB database name.
    pub database: String,
    /// Root username for authentication.
    pub username: String,
    /// Root password for authentication.
    pub password: String,
    /// Connection attempts before giving up (the database usually
    /// comes up alongside the server in deployment).
    pub connect_attempts: u32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "vendora".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
            connect_attempts: 3,
        }
    }
}

/// Manages a connection to SurrealDB.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Connect to SurrealDB using the provided configuration.
    ///
    /// Authenticates as root, selects the configured namespace and
    /// database, and returns a ready-to-use manager. Connection
    /// failures are retried up to `connect_attempts` times with a
    /// short backoff.
    pub async fn connect(config: &DbConfig) -> Result<Self, surrealdb::Error> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to SurrealDB"
        );

        let attempts = config.connect_attempts.max(1);
        let mut attempt = 0;
        let db = loop {
            attempt += 1;
            match Surreal::new::<Ws>(&config.url).await {
                Ok(db) => break db,
                Err(e) if attempt < attempts => {
                    warn!(attempt, error = %e, "SurrealDB connection failed, retrying");
                    tokio::time::sleep(Duration::from_millis(250 * u64::from(attempt))).await;
                }
                Err(e) => return Err(e),
            }
        };

        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!("Successfully connected to SurrealDB");

        Ok(Self { db })
    }

    /// Returns a reference to the underlying SurrealDB client.
    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }

    /// Cheap liveness probe for readiness endpoints.
    pub async fn health_check(&self) -> Result<(), surrealdb::Error> {
        self.db.query("RETURN true").await?.check()?;
        Ok(())
    }
}

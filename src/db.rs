use crate::config::{StoreConfig, StoreMode};
use crate::error::StoreError;
use libsql::{Builder, Connection, Database as LibsqlDatabase};

const LOCAL_BUSY_TIMEOUT_MS: u32 = 5000;

/// Hands out one store connection per logical operation.
///
/// The libsql database value built here is only a connection factory: every
/// [`acquire`](ConnectionManager::acquire) opens a fresh connection, and
/// nothing is pooled or shared between operations.
pub struct ConnectionManager {
    db: LibsqlDatabase,
    mode: StoreMode,
    host: String,
    port: u16,
    database: String,
}

impl ConnectionManager {
    pub async fn open(cfg: &StoreConfig) -> Result<Self, StoreError> {
        let db = match cfg.mode {
            StoreMode::Remote => {
                let token = cfg.auth_token.clone().unwrap_or_default();
                Builder::new_remote(cfg.url(), token).build().await
            }
            StoreMode::Local => {
                let path = Self::ensure_local_database(cfg)?;
                Builder::new_local(&path).build().await
            }
        }
        .map_err(|source| StoreError::Connection {
            host: cfg.host.clone(),
            port: cfg.port,
            source,
        })?;

        Ok(ConnectionManager {
            db,
            mode: cfg.mode,
            host: cfg.host.clone(),
            port: cfg.port,
            database: cfg.database.clone(),
        })
    }

    fn ensure_local_database(cfg: &StoreConfig) -> Result<std::path::PathBuf, StoreError> {
        std::fs::create_dir_all(cfg.data_dir())?;
        let path = cfg.database_path();
        if path.exists() {
            tracing::info!(database = %cfg.database, path = ?path, "[db] database already exists");
        } else {
            tracing::info!(database = %cfg.database, path = ?path, "[db] creating database");
        }
        Ok(path)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn mode(&self) -> StoreMode {
        self.mode
    }

    /// Opens and probes a new connection. The returned handle is released
    /// when it goes out of scope.
    pub async fn acquire(&self) -> Result<Handle, StoreError> {
        let conn = match self.connect().await {
            Ok(conn) => conn,
            Err(source) => {
                tracing::error!(
                    host = %self.host,
                    port = self.port,
                    error = %source,
                    "[db] failed to acquire store handle"
                );
                return Err(StoreError::Connection {
                    host: self.host.clone(),
                    port: self.port,
                    source,
                });
            }
        };

        tracing::debug!(host = %self.host, port = self.port, "[db] acquired store handle");
        Ok(Handle { conn })
    }

    async fn connect(&self) -> Result<Connection, libsql::Error> {
        let conn = self.db.connect()?;
        let mut rows = conn.query("SELECT 1", ()).await?;
        rows.next().await?;

        if self.mode == StoreMode::Local {
            let mut rows = conn
                .query(&format!("PRAGMA busy_timeout = {}", LOCAL_BUSY_TIMEOUT_MS), ())
                .await?;
            rows.next().await?;
        }

        Ok(conn)
    }
}

/// A single-use store connection scoped to one operation.
pub struct Handle {
    conn: Connection,
}

impl Handle {
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Releases the handle explicitly. Dropping it has the same effect.
    pub fn release(self) {}
}

impl Drop for Handle {
    fn drop(&mut self) {
        // Closing never reports failure to the owning operation.
        tracing::debug!("[db] released store handle");
    }
}

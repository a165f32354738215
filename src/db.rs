use anyhow::{Context, Result};
use base64::Engine;
use directories::ProjectDirs;
use sqlx::any::AnyPoolOptions;
use sqlx::{any::AnyConnectOptions, migrate::Migrator, AnyPool, ConnectOptions};
use std::sync::Once;
use std::{path::PathBuf, str::FromStr};

use crate::storage::{OfflineStore, StoredResponse};

// Ensure drivers are installed exactly once for sqlx::any
static INSTALL_DRIVERS: Once = Once::new();

// Embed SQL migrations from the migrations/ directory
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
}

impl Database {
    // Create a connection pool. If database_url is None, use a sensible default
    // (SQLite file in the user's data directory).
    pub async fn connect(database_url: Option<&str>) -> Result<Self> {
        // Register compiled-in drivers for sqlx::any
        INSTALL_DRIVERS.call_once(|| sqlx::any::install_default_drivers());

        let url = match database_url {
            Some(u) if !u.trim().is_empty() => u.to_string(),
            _ => default_sqlite_url()?,
        };

        // Parse options to tweak connection settings (e.g., logging)
        let opts = AnyConnectOptions::from_str(&url)
            .with_context(|| format!("invalid database URL: {url}"))?;
        // Quiet by default; callers can enable SQLX_LOG if they want
        let opts = opts.disable_statement_logging();

        let pool = AnyPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .with_context(|| format!("failed to connect to database: {url}"))?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.context("running migrations")
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub async fn offline_entry_count(&self) -> Result<i64> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM offline_cache")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    pub async fn vacuum(&self) -> Result<()> {
        // Best-effort: works on SQLite
        let _ = sqlx::query("VACUUM").execute(&self.pool).await;
        Ok(())
    }
}

#[async_trait::async_trait]
impl OfflineStore for Database {
    async fn get_response(&self, generation: &str, url: &str) -> Result<Option<StoredResponse>> {
        let row = sqlx::query_as::<_, (String, String)>(
            "SELECT content_type, body FROM offline_cache WHERE generation = ? AND url = ?",
        )
        .bind(generation)
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some((content_type, body_b64)) => {
                let body = base64::engine::general_purpose::STANDARD
                    .decode(body_b64)
                    .context("decoding stored response body")?;
                Ok(Some(StoredResponse::new(url, content_type, body)))
            }
            None => Ok(None),
        }
    }

    async fn put_response(
        &self,
        generation: &str,
        response: &StoredResponse,
        stored_at: i64,
    ) -> Result<()> {
        // Bodies travel as base64 TEXT so the any-driver stays portable.
        let body_b64 = base64::engine::general_purpose::STANDARD.encode(&response.body);
        sqlx::query(
            "INSERT INTO offline_cache(generation, url, content_type, body, stored_at) VALUES (?, ?, ?, ?, ?)\n             ON CONFLICT(generation, url) DO UPDATE SET content_type=excluded.content_type, body=excluded.body, stored_at=excluded.stored_at",
        )
        .bind(generation)
        .bind(&response.url)
        .bind(&response.content_type)
        .bind(body_b64)
        .bind(stored_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_generations(&self) -> Result<Vec<String>> {
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT generation FROM offline_cache ORDER BY generation",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn purge_generation(&self, generation: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM offline_cache WHERE generation = ?")
            .bind(generation)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn default_sqlite_url() -> Result<String> {
    let proj = ProjectDirs::from("dev", "wallfeed", "wallfeed")
        .context("unable to determine data directory for default sqlite path")?;
    let mut path: PathBuf = proj.data_dir().to_path_buf();
    std::fs::create_dir_all(&path).with_context(|| format!("creating data dir: {}", path.display()))?;
    path.push("wallfeed.db");

    // Ensure the file exists so SQLite can open it in rw mode
    let _ = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .open(&path);

    // Encode spaces in the path for a valid sqlite URL
    let mut path_str = path.to_string_lossy().to_string();
    if path_str.contains(' ') {
        path_str = path_str.replace(' ', "%20");
    }
    Ok(format!("sqlite:///{path_str}?mode=rwc"))
}

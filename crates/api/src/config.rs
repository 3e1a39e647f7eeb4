/// Which backend the [`upkeep_db::Store`] is built on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgreSQL via `DATABASE_URL`.
    Postgres { database_url: String },
    /// The in-memory mock store. State is lost on shutdown.
    Memory,
}

impl StorageBackend {
    /// Short name used in logs and the health endpoint.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Postgres { .. } => "postgres",
            Self::Memory => "memory",
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Overdue sweep cadence in seconds (default: `3600`).
    pub overdue_sweep_interval_secs: u64,
    /// Notification sweep cadence in seconds (default: `3600`).
    pub notification_sweep_interval_secs: u64,
    /// Selected storage backend.
    pub storage: StorageBackend,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                            | Default                 |
    /// |------------------------------------|-------------------------|
    /// | `HOST`                             | `0.0.0.0`               |
    /// | `PORT`                             | `3000`                  |
    /// | `CORS_ORIGINS`                     | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`             | `30`                    |
    /// | `OVERDUE_SWEEP_INTERVAL_SECS`      | `3600`                  |
    /// | `NOTIFICATION_SWEEP_INTERVAL_SECS` | `3600`                  |
    /// | `STORAGE_BACKEND`                  | (see below)             |
    /// | `DATABASE_URL`                     | unset                   |
    ///
    /// The backend is PostgreSQL when `DATABASE_URL` is set, the in-memory
    /// store otherwise; `STORAGE_BACKEND=memory` forces the in-memory store
    /// regardless.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = env_u64("REQUEST_TIMEOUT_SECS", 30);
        let overdue_sweep_interval_secs = env_u64("OVERDUE_SWEEP_INTERVAL_SECS", 3600);
        let notification_sweep_interval_secs = env_u64("NOTIFICATION_SWEEP_INTERVAL_SECS", 3600);

        let forced_memory = std::env::var("STORAGE_BACKEND")
            .map(|v| v.eq_ignore_ascii_case("memory"))
            .unwrap_or(false);
        let storage = match std::env::var("DATABASE_URL") {
            Ok(database_url) if !forced_memory => StorageBackend::Postgres { database_url },
            _ => StorageBackend::Memory,
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            overdue_sweep_interval_secs,
            notification_sweep_interval_secs,
            storage,
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

use std::env;
use std::str::FromStr;

/// Which repository implementation the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    /// Process-local storage; data is lost on restart. Meant for demos and
    /// local development.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            other => Err(format!(
                "unknown STORAGE_BACKEND '{}', expected postgres or memory",
                other
            )),
        }
    }
}

impl StorageBackend {
    pub fn from_env() -> anyhow::Result<Self> {
        match env::var("STORAGE_BACKEND") {
            Ok(raw) => raw.parse().map_err(|e: String| anyhow::anyhow!(e)),
            Err(_) => Ok(StorageBackend::Postgres),
        }
    }
}

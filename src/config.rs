use crate::query::DEFAULT_MAX_LIMIT;
use std::env;

const DEFAULT_CSV_UPLOAD_LIMIT_BYTES: u64 = 5 * 1024 * 1024;

fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_i64(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<i64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

/// Which record store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Some(StoreBackend::Postgres),
            "memory" | "mem" => Some(StoreBackend::Memory),
            _ => None,
        }
    }
}

/// Runtime settings that are not part of Rocket's own figment.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub store: StoreBackend,
    pub max_page_size: i64,
    pub csv_upload_limit_bytes: u64,
}

impl DirectoryConfig {
    pub fn from_env() -> Self {
        let raw_store = env_string("DIRECTORY_STORE", "postgres");
        let store = StoreBackend::parse(&raw_store).unwrap_or_else(|| {
            log::warn!(
                "unknown DIRECTORY_STORE '{}', falling back to postgres",
                raw_store
            );
            StoreBackend::Postgres
        });

        Self {
            store,
            max_page_size: env_i64("DIRECTORY_MAX_PAGE_SIZE", DEFAULT_MAX_LIMIT),
            csv_upload_limit_bytes: env_u64(
                "DIRECTORY_CSV_UPLOAD_LIMIT_BYTES",
                DEFAULT_CSV_UPLOAD_LIMIT_BYTES,
            ),
        }
    }

    /// Settings for an in-memory deployment, independent of the environment.
    pub fn in_memory() -> Self {
        Self {
            store: StoreBackend::Memory,
            max_page_size: DEFAULT_MAX_LIMIT,
            csv_upload_limit_bytes: DEFAULT_CSV_UPLOAD_LIMIT_BYTES,
        }
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

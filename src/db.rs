use anyhow::{Context, Result};
use sqlx::MySqlPool;

use crate::{
    config::{Config, StoreBackend},
    store::{MemoryStore, MySqlStore, Stores},
};

pub async fn init_db(database_url: &str) -> Result<MySqlPool> {
    MySqlPool::connect(database_url)
        .await
        .context("Failed to connect to database")
}

/// Builds the store handles selected by `STORE_BACKEND`.
pub async fn init_stores(config: &Config) -> Result<Stores> {
    match config.store_backend {
        StoreBackend::Mysql => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set for the mysql backend")?;
            let pool = init_db(url).await?;
            log::info!("Connected to MySQL store");
            Ok(Stores::mysql(MySqlStore::new(pool)))
        }
        StoreBackend::Memory => {
            log::warn!("Using in-memory store; data is lost on restart");
            Ok(Stores::memory(MemoryStore::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    #[actix_web::test]
    async fn mysql_backend_without_url_is_an_error() {
        let config = Config {
            store_backend: StoreBackend::Mysql,
            database_url: None,
            ..test_config()
        };

        let err = init_stores(&config).await.err().expect("missing url must fail");
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[actix_web::test]
    async fn memory_backend_needs_no_url() {
        assert!(init_stores(&test_config()).await.is_ok());
    }
}

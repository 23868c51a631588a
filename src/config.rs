use std::env;
use std::str::FromStr;

use dotenvy::dotenv;
use strum_macros::{Display, EnumString};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum StoreBackend {
    Mysql,
    Memory,
}

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub jwt_secret: String,

    pub store_backend: StoreBackend,
    /// required when `store_backend` is MySQL
    pub database_url: Option<String>,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let store_backend = env::var("STORE_BACKEND")
            .map(|v| {
                StoreBackend::from_str(&v.to_lowercase())
                    .expect("STORE_BACKEND must be mysql or memory")
            })
            .unwrap_or(StoreBackend::Mysql);

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            store_backend,
            // checked by db::init_stores when the mysql backend is selected
            database_url: env::var("DATABASE_URL").ok(),

            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .expect("RATE_PROTECTED_PER_MIN must be a number"),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
        }
    }
}

#[cfg(test)]
pub fn test_config() -> Config {
    Config {
        server_addr: "127.0.0.1:0".into(),
        jwt_secret: "test-secret".into(),
        store_backend: StoreBackend::Memory,
        database_url: None,
        rate_protected_per_min: 1000,
        api_prefix: "/api".into(),
        log_dir: "logs".into(),
    }
}

use anyhow::Context;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::library_store::PostgresLibraryStoreConfig;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DatabaseSettings {
    pub hostname: String,
    pub username: String,
    pub password: String,
}

impl From<DatabaseSettings> for PostgresLibraryStoreConfig {
    fn from(settings: DatabaseSettings) -> Self {
        Self {
            hostname: settings.hostname,
            username: settings.username,
            password: settings.password,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub port: u16,
    pub use_in_memory_db: bool,
    pub db: DatabaseSettings,
}

impl Settings {
    /// Reads optional `bookshelf_library` config file, then `BOOKSHELF_*` environment variables,
    /// nested keys are separated with `__`, e.g. `BOOKSHELF_DB__HOSTNAME`
    pub fn load() -> anyhow::Result<Self> {
        Self::build(
            Config::builder()
                .add_source(File::with_name("bookshelf_library").required(false))
                .add_source(
                    Environment::with_prefix("BOOKSHELF")
                        .prefix_separator("_")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Self> {
        builder
            .set_default("port", 8080_i64)?
            .set_default("use_in_memory_db", false)?
            .set_default("db.hostname", "127.0.0.1")?
            .set_default("db.username", "postgres")?
            .set_default("db.password", "postgres")?
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }
}

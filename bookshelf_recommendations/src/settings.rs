use anyhow::Context;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::recommendations::{RecommenderConfig, DEFAULT_NO_OF_RECOMMENDATIONS};

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub port: u16,
    /// Base url of the bookshelf library service
    pub library_url: String,
    /// Number of recommendations when request does not specify it
    pub default_count: usize,
    #[serde(default)]
    pub recommender: RecommenderConfig,
}

impl Settings {
    /// Reads optional `bookshelf_recommendations` config file, then `BOOKSHELF_*` environment variables,
    /// e.g. `BOOKSHELF_RECOMMENDER__NEIGHBOURS_PER_SOURCE=10`
    pub fn load() -> anyhow::Result<Self> {
        Self::build(
            Config::builder()
                .add_source(File::with_name("bookshelf_recommendations").required(false))
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
            .set_default("port", 8081_i64)?
            .set_default("library_url", "http://localhost:8080")?
            .set_default("default_count", DEFAULT_NO_OF_RECOMMENDATIONS as i64)?
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }
}

//! API key resolution for the external clients
//!
//! Priority: Database → ENV → TOML. A missing key is not an error: the
//! corresponding client reports itself unavailable and the pipeline degrades.

use roamwise_common::config::TomlConfig;
use roamwise_common::Result;
use sqlx::{Pool, Sqlite};
use tracing::{info, warn};

pub const PROVIDER_API_KEY_ENV: &str = "ROAMWISE_PROVIDER_API_KEY";
pub const GENERATOR_API_KEY_ENV: &str = "ROAMWISE_GENERATOR_API_KEY";

/// Resolve the geo-data provider key
pub async fn resolve_provider_api_key(
    db: &Pool<Sqlite>,
    toml_config: &TomlConfig,
) -> Result<Option<String>> {
    let db_key = crate::db::settings::get_provider_api_key(db).await?;
    Ok(pick_key(
        "Provider",
        db_key,
        std::env::var(PROVIDER_API_KEY_ENV).ok(),
        toml_config.provider.api_key.clone(),
    ))
}

/// Resolve the generative backend key
pub async fn resolve_generator_api_key(
    db: &Pool<Sqlite>,
    toml_config: &TomlConfig,
) -> Result<Option<String>> {
    let db_key = crate::db::settings::get_generator_api_key(db).await?;
    Ok(pick_key(
        "Generator",
        db_key,
        std::env::var(GENERATOR_API_KEY_ENV).ok(),
        toml_config.generator.api_key.clone(),
    ))
}

/// First valid key of the three tiers, warning when several supply one
fn pick_key(
    label: &str,
    db_key: Option<String>,
    env_key: Option<String>,
    toml_key: Option<String>,
) -> Option<String> {
    let tiers = [
        ("database", db_key.filter(|k| is_valid_key(k))),
        ("environment", env_key.filter(|k| is_valid_key(k))),
        ("TOML", toml_key.filter(|k| is_valid_key(k))),
    ];

    let sources: Vec<&str> = tiers
        .iter()
        .filter(|(_, key)| key.is_some())
        .map(|(source, _)| *source)
        .collect();

    if sources.len() > 1 {
        warn!(
            "{} API key found in multiple sources: {}. Using {} (highest priority).",
            label,
            sources.join(", "),
            sources[0]
        );
    }

    for (source, key) in tiers {
        if let Some(key) = key {
            info!("{} API key loaded from {}", label, source);
            return Some(key);
        }
    }

    warn!(
        "{} API key not configured; set it via PUT /settings/api-keys, the environment or the TOML config",
        label
    );
    None
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

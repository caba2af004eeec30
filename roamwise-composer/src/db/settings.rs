//! Settings database operations
//!
//! Key-value accessors over the `settings` table. API keys stored here take
//! precedence over environment variables and the TOML file.

use roamwise_common::{Error, Result};
use sqlx::{Pool, Sqlite};

const PROVIDER_API_KEY: &str = "provider_api_key";
const GENERATOR_API_KEY: &str = "generator_api_key";

/// Geo-data provider API key, if stored
pub async fn get_provider_api_key(db: &Pool<Sqlite>) -> Result<Option<String>> {
    get_setting::<String>(db, PROVIDER_API_KEY).await
}

pub async fn set_provider_api_key(db: &Pool<Sqlite>, key: String) -> Result<()> {
    set_setting(db, PROVIDER_API_KEY, key).await
}

/// Generative backend API key, if stored
pub async fn get_generator_api_key(db: &Pool<Sqlite>) -> Result<Option<String>> {
    get_setting::<String>(db, GENERATOR_API_KEY).await
}

pub async fn set_generator_api_key(db: &Pool<Sqlite>, key: String) -> Result<()> {
    set_setting(db, GENERATOR_API_KEY, key).await
}

async fn get_setting<T>(db: &Pool<Sqlite>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await
        .map_err(Error::Database)?;

    match row {
        Some((value,)) => {
            let parsed = value
                .parse::<T>()
                .map_err(|e| Error::Config(format!("Parse setting {} failed: {}", key, e)))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

async fn set_setting<T>(db: &Pool<Sqlite>, key: &str, value: T) -> Result<()>
where
    T: std::fmt::Display,
{
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value.to_string())
    .execute(db)
    .await
    .map_err(Error::Database)?;

    Ok(())
}

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Config {
    /// Reads settings from the environment, after loading `.env` if present.
    /// The database URL is checked by [`Config::require_database_url`], so
    /// commands that never open a pool are not affected by it.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let max_connections = match std::env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(value) => value
                .trim()
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a positive number")?,
            Err(_) => 5,
        };

        if max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be a positive number");
        }

        Ok(Self {
            database_url,
            max_connections,
        })
    }

    pub fn require_database_url(&self) -> anyhow::Result<&str> {
        let url = self
            .database_url
            .as_deref()
            .context("DATABASE_URL must be set to a production Postgres instance")?;
        if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
            anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
        }
        Ok(url)
    }
}

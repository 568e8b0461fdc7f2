//! Connecting a BK deployment to its SurrealDB instance.

use std::env;

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;

/// Where the case records live and how to sign in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Host and port of the WebSocket endpoint, without scheme.
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "bk".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl DbConfig {
    /// Read `BK_DB_URL`, `BK_DB_NAMESPACE`, `BK_DB_DATABASE`, `BK_DB_USER`
    /// and `BK_DB_PASSWORD` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from any key source. Unset or blank keys keep
    /// their [`DbConfig::default`] value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let slots = [
            ("BK_DB_URL", &mut config.url),
            ("BK_DB_NAMESPACE", &mut config.namespace),
            ("BK_DB_DATABASE", &mut config.database),
            ("BK_DB_USER", &mut config.username),
            ("BK_DB_PASSWORD", &mut config.password),
        ];
        for (key, slot) in slots {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *slot = value.trim().to_string();
            }
        }
        config
    }
}

/// Shared handle to the BK database.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Sign in as root and select the configured namespace and database.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        let db = Surreal::new::<Ws>(&config.url).await?;
        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;
        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "BK database connected"
        );
        Ok(Self { db })
    }

    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn default_targets_bk_namespace() {
        let config = DbConfig::default();
        assert_eq!(config.namespace, "bk");
        assert_eq!(config.database, "main");
    }

    #[test]
    fn lookup_overrides_only_present_keys() {
        let vars = HashMap::from([
            ("BK_DB_URL", "db.school.local:8000"),
            ("BK_DB_DATABASE", "  smk1  "),
            ("BK_DB_PASSWORD", " "),
        ]);
        let config = DbConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.url, "db.school.local:8000");
        assert_eq!(config.database, "smk1");
        assert_eq!(config.namespace, "bk");
        assert_eq!(config.password, "root");
    }
}

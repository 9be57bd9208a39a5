//! Configuration for the postbox server

use anyhow::{Context, bail};
use std::{env, str::FromStr};

#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listener
    pub server: ServerConfig,

    /// Document store selection and connection
    pub store: StoreConfig,

    /// GraphQL limits and developer tooling
    pub graphql: GraphQLConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    MongoDb,
    Memory,
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StoreKind::MongoDb),
            "memory" => Ok(StoreKind::Memory),
            other => bail!("unknown STORE_BACKEND {other:?}, expected \"mongodb\" or \"memory\""),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreKind,
    /// Required when `backend` is `mongodb`.
    pub mongo_url: Option<String>,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct GraphQLConfig {
    /// Serve GraphiQL on `GET /graphql`
    pub playground: bool,
    /// Max query depth
    pub max_depth: usize,
    /// Max query complexity
    pub max_complexity: usize,
    /// Enable introspection
    pub introspection: bool,
}

impl Default for GraphQLConfig {
    fn default() -> Self {
        Self {
            playground: false,
            max_depth: 10,
            max_complexity: 200,
            introspection: true,
        }
    }
}

impl Config {
    /// Load configuration from the process environment, after reading `.env`
    /// if one is present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("STORE_BACKEND") {
            Some(value) => value.parse()?,
            None => StoreKind::MongoDb,
        };

        let mongo_url = lookup("MONGO_URL").filter(|url| !url.is_empty());
        if backend == StoreKind::MongoDb && mongo_url.is_none() {
            bail!("MONGO_URL must be set when STORE_BACKEND is mongodb");
        }

        let defaults = GraphQLConfig::default();

        Ok(Self {
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&lookup, "SERVER_PORT", 4000)?,
            },
            store: StoreConfig {
                backend,
                mongo_url,
                database: lookup("MONGO_DATABASE").unwrap_or_else(|| "P5DB".to_string()),
            },
            graphql: GraphQLConfig {
                playground: parse_or(&lookup, "GRAPHQL_PLAYGROUND", defaults.playground)?,
                max_depth: parse_or(&lookup, "GRAPHQL_MAX_DEPTH", defaults.max_depth)?,
                max_complexity: parse_or(&lookup, "GRAPHQL_MAX_COMPLEXITY", defaults.max_complexity)?,
                introspection: parse_or(&lookup, "GRAPHQL_INTROSPECTION", defaults.introspection)?,
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value {raw:?} for {key}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_with_mongo_url() {
        let config = Config::from_vars(vars(&[("MONGO_URL", "mongodb://localhost:27017")])).unwrap();

        assert_eq!(config.store.backend, StoreKind::MongoDb);
        assert_eq!(config.store.database, "P5DB");
        assert_eq!(config.bind_addr(), "0.0.0.0:4000");
        assert_eq!(config.graphql.max_depth, 10);
        assert!(config.graphql.introspection);
        assert!(!config.graphql.playground);
    }

    #[test]
    fn mongodb_backend_requires_url() {
        let err = Config::from_vars(vars(&[])).unwrap_err();
        assert!(err.to_string().contains("MONGO_URL"));
    }

    #[test]
    fn memory_backend_needs_no_url() {
        let config = Config::from_vars(vars(&[
            ("STORE_BACKEND", "memory"),
            ("SERVER_PORT", "8081"),
            ("GRAPHQL_PLAYGROUND", "true"),
        ]))
        .unwrap();

        assert_eq!(config.store.backend, StoreKind::Memory);
        assert_eq!(config.server.port, 8081);
        assert!(config.graphql.playground);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = Config::from_vars(vars(&[("STORE_BACKEND", "memory"), ("SERVER_PORT", "http")]))
            .unwrap_err();
        assert!(err.to_string().contains("SERVER_PORT"));

        assert!(Config::from_vars(vars(&[("STORE_BACKEND", "redis")])).is_err());
    }
}

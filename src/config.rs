use std::{net::IpAddr, path::PathBuf};

use playtrack_app::domain::social_distance::DEFAULT_MAX_FRONTIER;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_UPLOADS_DIR: &str = "./uploads";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    SeaOrm,
    Memory,
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub graph_database_url: Option<String>,
    pub analytics_database_url: Option<String>,
    pub uploads_dir: PathBuf,
    pub bcrypt_cost: u32,
    pub max_frontier: usize,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("PLAYTRACK_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        if host.parse::<IpAddr>().is_err() && host != "localhost" {
            return Err(ConfigError::Invalid {
                name: "PLAYTRACK_HOST",
                value: host,
            });
        }

        let storage = match lookup("PLAYTRACK_STORAGE").as_deref() {
            None | Some("sea-orm") => StorageBackend::SeaOrm,
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "PLAYTRACK_STORAGE",
                    value: other.to_string(),
                });
            }
        };

        let graph_database_url = lookup("GRAPH_DATABASE_URL");
        let analytics_database_url = lookup("ANALYTICS_DATABASE_URL");
        if storage == StorageBackend::SeaOrm {
            if graph_database_url.is_none() {
                return Err(ConfigError::Missing("GRAPH_DATABASE_URL"));
            }
            if analytics_database_url.is_none() {
                return Err(ConfigError::Missing("ANALYTICS_DATABASE_URL"));
            }
        }

        Ok(Self {
            host,
            port: parse_or(&lookup, "PLAYTRACK_PORT", DEFAULT_PORT)?,
            storage,
            graph_database_url,
            analytics_database_url,
            uploads_dir: lookup("PLAYTRACK_UPLOADS_DIR")
                .unwrap_or_else(|| DEFAULT_UPLOADS_DIR.to_string())
                .into(),
            bcrypt_cost: parse_or(&lookup, "PLAYTRACK_BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            max_frontier: parse_or(&lookup, "PLAYTRACK_MAX_FRONTIER", DEFAULT_MAX_FRONTIER)?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_memory_defaults() {
        let config = config(&[("PLAYTRACK_STORAGE", "memory")]).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3001);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.uploads_dir, PathBuf::from("./uploads"));
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(config.max_frontier, 1000);
    }

    #[test]
    fn test_sea_orm_requires_urls() {
        assert_eq!(
            config(&[]).unwrap_err(),
            ConfigError::Missing("GRAPH_DATABASE_URL")
        );
        assert_eq!(
            config(&[("GRAPH_DATABASE_URL", "mysql://localhost/graph")]).unwrap_err(),
            ConfigError::Missing("ANALYTICS_DATABASE_URL")
        );
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config(&[("PLAYTRACK_STORAGE", "neo4j")]),
            Err(ConfigError::Invalid { name: "PLAYTRACK_STORAGE", .. })
        ));
        assert!(matches!(
            config(&[("PLAYTRACK_STORAGE", "memory"), ("PLAYTRACK_PORT", "http")]),
            Err(ConfigError::Invalid { name: "PLAYTRACK_PORT", .. })
        ));
    }
}

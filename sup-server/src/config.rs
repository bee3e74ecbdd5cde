use std::{env, fmt::Display, net::SocketAddr, str::FromStr};

use anyhow::{bail, Context};
use tracing::info;

pub const DEFAULT_DATABASE_URL: &str = "sup.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: &str = "8080";
pub const DEFAULT_BCRYPT_COST: &str = "10";

// limiti accettati da bcrypt
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub port: u16,
    pub bcrypt_cost: u32,
}

impl Config {
    /// Legge la configurazione dalle variabili d'ambiente, con i default documentati.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        // DATABASE_URI è il nome storico della variabile, accettato come alias
        let database_lookup = |key: &str| lookup(key).or_else(|| lookup("DATABASE_URI"));
        let config = Self {
            database_url: try_load(&database_lookup, "DATABASE_URL", DEFAULT_DATABASE_URL)?,
            bind_addr: try_load(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR)?,
            port: try_load(&lookup, "PORT", DEFAULT_PORT)?,
            bcrypt_cost: try_load(&lookup, "BCRYPT_COST", DEFAULT_BCRYPT_COST)?,
        };
        if !BCRYPT_COST_RANGE.contains(&config.bcrypt_cost) {
            bail!(
                "BCRYPT_COST must be between {} and {}, got {}",
                BCRYPT_COST_RANGE.start(),
                BCRYPT_COST_RANGE.end(),
                config.bcrypt_cost
            );
        }
        Ok(config)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let bind = format!("{}:{}", self.bind_addr, self.port);
        bind.parse().with_context(|| format!("parse listen address {bind}"))
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse()
        .map_err(|e| anyhow::anyhow!("Invalid {key} value {raw:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database_url, "sup.db");
        assert_eq!(config.port, 8080);
        assert_eq!(config.bcrypt_cost, 10);
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("PORT", "3000"),
            ("BIND_ADDR", "127.0.0.1"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn database_uri_is_an_alias() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URI", "legacy.db")])).unwrap();
        assert_eq!(config.database_url, "legacy.db");

        // DATABASE_URL vince se sono impostate entrambe
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URI", "legacy.db"),
            ("DATABASE_URL", "current.db"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "current.db");
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(Config::from_lookup(lookup(&[("PORT", "eighty")])).is_err());
        assert!(Config::from_lookup(lookup(&[("BCRYPT_COST", "2")])).is_err());
    }
}

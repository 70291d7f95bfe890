use std::path::PathBuf;
use std::time::Duration;

use crate::domain::menu::{MenuCatalog, MenuError};
use crate::domain::order::CustomerId;

// ============================================================================
// Application Configuration
// ============================================================================
//
// Read once at startup from the environment (a `.env` file is loaded first
// when present). Any invalid value aborts startup.
//
// ============================================================================

pub const DEFAULT_MAX_ITEMS: usize = 4;
pub const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 3600;
pub const DEFAULT_HEALTH_PORT: u16 = 10000;
pub const DEFAULT_ABA_PAYMENT_LINK: &str = "https://link.payway.com.kh/ABAPAYz6370245E";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: '{value}' ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Menu configuration error: {0}")]
    Menu(#[from] MenuError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub operator_id: CustomerId,
    pub database_url: Option<String>,
    pub max_items: usize,
    /// `None` disables idle session eviction
    pub session_idle_ttl: Option<Duration>,
    pub health_port: u16,
    pub menu_path: Option<PathBuf>,
    pub payment_link: String,
    pub store_open_on_start: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "Failed to load .env file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let operator_raw = get("OPERATOR_ID")
            .or_else(|| get("OWNER_CHAT_ID"))
            .ok_or(ConfigError::Missing("OPERATOR_ID"))?;
        let operator_id = operator_raw.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
            name: "OPERATOR_ID",
            value: operator_raw.clone(),
            reason: e.to_string(),
        })?;

        let max_items = match get("MAX_ITEMS_PER_ORDER") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n >= 1 => n,
                Ok(_) => {
                    return Err(ConfigError::Invalid {
                        name: "MAX_ITEMS_PER_ORDER",
                        value: raw,
                        reason: "must be at least 1".to_string(),
                    })
                }
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        name: "MAX_ITEMS_PER_ORDER",
                        value: raw,
                        reason: e.to_string(),
                    })
                }
            },
            None => DEFAULT_MAX_ITEMS,
        };

        let ttl_secs: u64 = parse_or("SESSION_IDLE_TTL_SECS", get("SESSION_IDLE_TTL_SECS"), DEFAULT_SESSION_IDLE_TTL_SECS)?;
        let session_idle_ttl = (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs));

        let health_port = match get("HEALTH_PORT") {
            Some(raw) => parse_or("HEALTH_PORT", Some(raw), DEFAULT_HEALTH_PORT)?,
            None => parse_or("PORT", get("PORT"), DEFAULT_HEALTH_PORT)?,
        };

        let store_open_on_start = match get("STORE_OPEN_ON_START") {
            Some(raw) => parse_bool("STORE_OPEN_ON_START", &raw)?,
            None => false,
        };

        Ok(Self {
            operator_id,
            database_url: get("DATABASE_URL"),
            max_items,
            session_idle_ttl,
            health_port,
            menu_path: get("MENU_PATH").map(PathBuf::from),
            payment_link: get("ABA_PAYMENT_LINK").unwrap_or_else(|| DEFAULT_ABA_PAYMENT_LINK.to_string()),
            store_open_on_start,
        })
    }

    /// Menu from `menu_path`, or the built-in menu
    pub fn load_catalog(&self) -> Result<MenuCatalog, ConfigError> {
        match self.menu_path {
            Some(ref path) => Ok(MenuCatalog::from_path(path)?),
            None => {
                tracing::info!("Using built-in menu");
                Ok(MenuCatalog::builtin())
            }
        }
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "open" => Ok(true),
        "0" | "false" | "no" | "off" | "closed" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: raw.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("OPERATOR_ID", "42")])).unwrap();

        assert_eq!(config.operator_id, CustomerId(42));
        assert_eq!(config.max_items, DEFAULT_MAX_ITEMS);
        assert_eq!(config.session_idle_ttl, Some(Duration::from_secs(3600)));
        assert_eq!(config.health_port, DEFAULT_HEALTH_PORT);
        assert_eq!(config.payment_link, DEFAULT_ABA_PAYMENT_LINK);
        assert!(config.database_url.is_none());
        assert!(!config.store_open_on_start);
    }

    #[test]
    fn test_operator_required() {
        assert_eq!(
            AppConfig::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::Missing("OPERATOR_ID")
        );
        let legacy = AppConfig::from_lookup(lookup(&[("OWNER_CHAT_ID", "7")])).unwrap();
        assert_eq!(legacy.operator_id, CustomerId(7));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("OPERATOR_ID", "1"),
            ("MAX_ITEMS_PER_ORDER", "6"),
            ("SESSION_IDLE_TTL_SECS", "0"),
            ("PORT", "8080"),
            ("STORE_OPEN_ON_START", "true"),
            ("DATABASE_URL", "postgres://localhost/boba"),
        ]))
        .unwrap();

        assert_eq!(config.max_items, 6);
        assert_eq!(config.session_idle_ttl, None);
        assert_eq!(config.health_port, 8080);
        assert!(config.store_open_on_start);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/boba"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        for (key, value) in [
            ("MAX_ITEMS_PER_ORDER", "0"),
            ("MAX_ITEMS_PER_ORDER", "four"),
            ("HEALTH_PORT", "99999"),
            ("STORE_OPEN_ON_START", "maybe"),
            ("OPERATOR_ID", "operator"),
        ] {
            let mut pairs = vec![("OPERATOR_ID", "1")];
            pairs.retain(|(k, _)| *k != key);
            pairs.push((key, value));

            let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { .. }), "{}={} gave {:?}", key, value, err);
        }
    }

    #[test]
    fn test_builtin_catalog_when_no_path() {
        let config = AppConfig::from_lookup(lookup(&[("OPERATOR_ID", "1")])).unwrap();
        let catalog = config.load_catalog().unwrap();
        assert_eq!(catalog.categories(), vec!["Coffee", "Matcha", "Soda"]);
    }

    #[test]
    fn test_missing_menu_file_is_fatal() {
        let config = AppConfig {
            menu_path: Some(PathBuf::from("/nonexistent/menu.json")),
            ..AppConfig::from_lookup(lookup(&[("OPERATOR_ID", "1")])).unwrap()
        };
        assert!(matches!(config.load_catalog(), Err(ConfigError::Menu(MenuError::Io(_)))));
    }
}

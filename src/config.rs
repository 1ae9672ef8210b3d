use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::clients::eosio::is_valid_name;
use crate::error::{HemertonError, Result};
use crate::form::PromptTheme;

/// Main configuration loaded from hemerton.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub chain: ChainConfig,
    pub admin: AdminConfig,
    pub prompt: PromptTheme,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Where the contract lives and how to reach it
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    pub nodeos_url: String,
    pub wallet_url: String,
    pub contract: String,
    pub scope: String,
    pub lists_table: String,
    pub proofs_table: String,
    pub table_limit: u32,
    pub request_timeout_ms: u64,
    pub expiration_secs: u32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            nodeos_url: "http://127.0.0.1:8888".to_string(),
            wallet_url: "http://127.0.0.1:8900".to_string(),
            contract: "hemerton".to_string(),
            scope: "hemerton".to_string(),
            lists_table: "lists".to_string(),
            proofs_table: "proofs".to_string(),
            table_limit: 99_999,
            request_timeout_ms: 10_000,
            expiration_secs: 30,
        }
    }
}

/// The administrator principal that authorizes every action
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    pub account: String,
    pub permission: String,
    /// Public key the wallet signs with; the private key never leaves keosd
    pub public_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            account: "eosio".to_string(),
            permission: "owner".to_string(),
            // Well-known development key of a fresh local chain
            public_key: "EOS6MRyAjQq8ud7hVNYcfnVPJqcVpscN5So8BhtHuGYqET5GDW5CV".to_string(),
        }
    }
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub log_level: String,
    /// File the configuration was read from, if any
    pub source: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: "hemerton=warn".to_string(),
            source: None,
        }
    }
}

impl RuntimeConfig {
    pub fn load_from_env() -> Self {
        Self {
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "hemerton=warn".to_string()),
            source: None,
        }
    }

    /// Filter directive for the log subscriber; `-v` flags win over `RUST_LOG`.
    pub fn log_filter(&self, verbose: u8) -> String {
        match verbose {
            0 => self.log_level.clone(),
            1 => "hemerton=info".to_string(),
            _ => "hemerton=debug".to_string(),
        }
    }
}

fn env_override<T: std::str::FromStr>(key: &str, target: &mut T) {
    if let Ok(raw) = std::env::var(key) {
        match raw.parse() {
            Ok(v) => {
                *target = v;
                tracing::debug!("{} env override applied", key);
            }
            Err(_) => tracing::warn!("Ignoring {}: cannot parse '{}'", key, raw),
        }
    }
}

/// Candidate config files, most specific first
fn config_candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }
    if let Ok(path) = std::env::var("HEMERTON_CONFIG") {
        return vec![PathBuf::from(path)];
    }
    let mut candidates = vec![PathBuf::from("hemerton.toml")];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("hemerton").join("hemerton.toml"));
    }
    candidates
}

impl Config {
    /// Load configuration from TOML file and environment variables
    ///
    /// An explicit path (from `--config` or HEMERTON_CONFIG) must exist;
    /// otherwise ./hemerton.toml and the user config dir are tried before
    /// falling back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Ok(env_path) = std::env::var("HEMERTON_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::dotenv();
        }

        let must_exist = explicit.is_some() || std::env::var("HEMERTON_CONFIG").is_ok();
        let mut config = None;
        for path in config_candidates(explicit) {
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    let mut parsed: Config = toml::from_str(&content)?;
                    parsed.runtime.source = Some(path);
                    config = Some(parsed);
                    break;
                }
                Err(e) if must_exist => {
                    return Err(HemertonError::Config {
                        message: format!("cannot read {}: {}", path.display(), e),
                    });
                }
                Err(_) => continue,
            }
        }
        let mut config = config.unwrap_or_else(|| {
            tracing::warn!("No hemerton.toml found, using defaults");
            Self::default()
        });

        let source = config.runtime.source.take();
        config.runtime = RuntimeConfig::load_from_env();
        config.runtime.source = source;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply HEMERTON_* overrides (env-first)
    pub fn apply_env(&mut self) {
        env_override("HEMERTON_NODEOS_URL", &mut self.chain.nodeos_url);
        env_override("HEMERTON_WALLET_URL", &mut self.chain.wallet_url);
        env_override("HEMERTON_CONTRACT", &mut self.chain.contract);
        env_override("HEMERTON_SCOPE", &mut self.chain.scope);
        env_override("HEMERTON_TABLE_LIMIT", &mut self.chain.table_limit);
        env_override("HEMERTON_REQUEST_TIMEOUT_MS", &mut self.chain.request_timeout_ms);
        env_override("HEMERTON_EXPIRATION_SECS", &mut self.chain.expiration_secs);
        env_override("HEMERTON_ADMIN", &mut self.admin.account);
        env_override("HEMERTON_PERMISSION", &mut self.admin.permission);
        env_override("HEMERTON_PUBLIC_KEY", &mut self.admin.public_key);
    }

    /// Validate the configuration, clamping limits that are merely out of range
    pub fn validate(&mut self) -> Result<()> {
        for (key, url) in [
            ("chain.nodeos_url", &self.chain.nodeos_url),
            ("chain.wallet_url", &self.chain.wallet_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(HemertonError::Config {
                    message: format!("{} '{}' must start with http:// or https://", key, url),
                });
            }
        }

        for (key, name) in [
            ("chain.contract", &self.chain.contract),
            ("chain.scope", &self.chain.scope),
            ("chain.lists_table", &self.chain.lists_table),
            ("chain.proofs_table", &self.chain.proofs_table),
            ("admin.account", &self.admin.account),
            ("admin.permission", &self.admin.permission),
        ] {
            if !is_valid_name(name) {
                return Err(HemertonError::Config {
                    message: format!("{} '{}' is not a valid account/action name", key, name),
                });
            }
        }

        if self.admin.public_key.trim().is_empty() {
            return Err(HemertonError::Config {
                message: "admin.public_key is required to sign transactions".into(),
            });
        }

        if self.chain.table_limit == 0 {
            tracing::warn!("chain.table_limit 0 is not allowed, using 1");
            self.chain.table_limit = 1;
        }
        if self.chain.expiration_secs == 0 || self.chain.expiration_secs > 3600 {
            tracing::warn!(
                "chain.expiration_secs {} out of range, clamping to 1..=3600",
                self.chain.expiration_secs
            );
            self.chain.expiration_secs = self.chain.expiration_secs.clamp(1, 3600);
        }
        if self.prompt.qmark.is_empty() {
            self.prompt.qmark = PromptTheme::default().qmark;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chain.contract, "hemerton");
        assert_eq!(config.admin.account, "eosio");
        assert_eq!(config.prompt.qmark, "-");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [chain]
            nodeos_url = "https://jungle.example:443"

            [prompt]
            qmark = "?"
            "#,
        )
        .unwrap();
        assert_eq!(config.chain.nodeos_url, "https://jungle.example:443");
        assert_eq!(config.chain.wallet_url, "http://127.0.0.1:8900");
        assert_eq!(config.prompt.qmark, "?");
        assert_eq!(config.prompt.answer_color, "#3ba09d");
    }

    #[test]
    fn test_rejects_bad_url_and_name() {
        let mut config = Config::default();
        config.chain.nodeos_url = "127.0.0.1:8888".into();
        assert!(matches!(
            config.validate(),
            Err(HemertonError::Config { .. })
        ));

        let mut config = Config::default();
        config.admin.account = "Not_A_Name".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_limits_are_clamped() {
        let mut config = Config::default();
        config.chain.table_limit = 0;
        config.chain.expiration_secs = 10_000;
        config.validate().unwrap();
        assert_eq!(config.chain.table_limit, 1);
        assert_eq!(config.chain.expiration_secs, 3600);
    }

    #[test]
    fn test_log_filter_prefers_verbosity() {
        let runtime = RuntimeConfig {
            log_level: "hemerton=trace,reqwest=info".to_string(),
            source: None,
        };
        assert_eq!(runtime.log_filter(0), "hemerton=trace,reqwest=info");
        assert_eq!(runtime.log_filter(1), "hemerton=info");
        assert_eq!(runtime.log_filter(3), "hemerton=debug");
        assert_eq!(RuntimeConfig::default().log_filter(0), "hemerton=warn");
    }

    #[test]
    fn test_env_overrides() {
        unsafe {
            std::env::set_var("HEMERTON_CONTRACT", "othercontract");
            std::env::set_var("HEMERTON_TABLE_LIMIT", "not-a-number");
        }

        let mut config = Config::default();
        config.apply_env();
        assert_eq!(config.chain.contract, "othercontract");
        assert_eq!(config.chain.table_limit, 99_999);

        unsafe {
            std::env::remove_var("HEMERTON_CONTRACT");
            std::env::remove_var("HEMERTON_TABLE_LIMIT");
        }
    }
}

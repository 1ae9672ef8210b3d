//! HTTP client construction shared by the chain clients

use reqwest::Client;
use std::time::Duration;

/// Configuration for an RPC HTTP client
pub struct HttpClientConfig {
    pub component: String,
    pub contract: String,
    pub timeout_ms: u64,
}

impl HttpClientConfig {
    /// Create from a Config object
    pub fn from_config(config: &crate::config::Config, component: &str) -> Self {
        Self {
            component: component.to_string(),
            contract: config.chain.contract.clone(),
            timeout_ms: config.chain.request_timeout_ms,
        }
    }

    /// Build the User-Agent string
    pub fn user_agent(&self) -> String {
        let mut ua = format!(
            "hemerton/{} (component={}; contract={})",
            env!("CARGO_PKG_VERSION"),
            self.component,
            self.contract
        );
        if let Ok(commit) = std::env::var("HEMERTON_COMMIT_HASH") {
            ua.push_str(&format!("; commit={}", &commit[..7.min(commit.len())]));
        }
        ua
    }

    /// Create an HTTP client with timeout and user agent applied
    pub fn build_client(&self) -> reqwest::Result<Client> {
        Client::builder()
            .timeout(Duration::from_millis(self.timeout_ms))
            .user_agent(self.user_agent())
            .build()
    }
}

/// Joins a base URL and an absolute API path
pub fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_slashes() {
        assert_eq!(
            endpoint("http://127.0.0.1:8888/", "/v1/chain/get_info"),
            "http://127.0.0.1:8888/v1/chain/get_info"
        );
        assert_eq!(endpoint("http://h", "v1/x"), "http://h/v1/x");
    }

    #[test]
    fn test_user_agent_names_component() {
        let cfg = HttpClientConfig {
            component: "nodeos".into(),
            contract: "hemerton".into(),
            timeout_ms: 1000,
        };
        assert!(cfg.user_agent().contains("component=nodeos"));
        assert!(cfg.user_agent().starts_with("hemerton/"));
    }
}

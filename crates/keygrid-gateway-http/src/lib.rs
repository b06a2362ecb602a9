//! HTTP implementation of the keygrid [`KvGateway`] trait.
//!
//! Speaks the Consul-compatible KV HTTP API:
//! - `GET /v1/kv/<key>?raw` reads one value
//! - `GET /v1/kv/<prefix>?keys[&separator=<sep>]` lists keys
//! - `GET /v1/status/leader` is the liveness probe
//!
//! The engine never sees any of this; it only consumes the trait. Settings
//! (store address, optional access token) arrive as opaque instance
//! configuration and are handed straight to gateway construction.

use async_trait::async_trait;
use keygrid_query::{GatewayError, GatewayResult, KvGateway};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use url::Url;

/// Connection settings for one store instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// Base address of the store's HTTP API, e.g. `http://127.0.0.1:8500`.
    pub address: String,
    /// Optional access token sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl GatewaySettings {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// `reqwest`-backed gateway for a single store instance.
pub struct HttpGateway {
    client: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl HttpGateway {
    pub fn new(settings: &GatewaySettings) -> GatewayResult<Self> {
        if settings.address.is_empty() {
            return Err(GatewayError::Transport(
                "store address must not be empty".to_string(),
            ));
        }

        let mut base = Url::parse(&settings.address).map_err(|e| {
            GatewayError::Transport(format!("invalid store address {}: {}", settings.address, e))
        })?;
        // Joining endpoint paths requires a directory-style base.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to build http client: {}", e)))?;

        debug!(address = %settings.address, "created http gateway");

        Ok(Self {
            client,
            base,
            token: settings.token.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> GatewayResult<Url> {
        self.base
            .join(path)
            .map_err(|e| GatewayError::Transport(format!("invalid endpoint {}: {}", path, e)))
    }

    fn kv_endpoint(&self, key: &str) -> GatewayResult<Url> {
        self.endpoint(&format!("v1/kv/{}", key))
    }

    fn request(&self, url: Url) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.header("X-Consul-Token", token);
        }
        request
    }

    async fn send(&self, url: Url) -> GatewayResult<reqwest::Response> {
        self.request(url)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))
    }
}

#[async_trait]
impl KvGateway for HttpGateway {
    async fn get(&self, key: &str) -> GatewayResult<Option<String>> {
        let mut url = self.kv_endpoint(key)?;
        url.query_pairs_mut().append_key_only("raw");
        debug!(key, "kv get");

        let response = self.send(url).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
                Ok(Some(body))
            }
            status => {
                error!(key, status = %status, "kv get failed");
                Err(GatewayError::UnexpectedStatus(status.as_u16()))
            }
        }
    }

    async fn list_keys(&self, prefix: &str, separator: &str) -> GatewayResult<Vec<String>> {
        let mut url = self.kv_endpoint(prefix)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_key_only("keys");
            if !separator.is_empty() {
                pairs.append_pair("separator", separator);
            }
        }
        debug!(prefix, separator, "kv list");

        let response = self.send(url).await?;
        match response.status() {
            // An unknown prefix simply has no keys.
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            status if status.is_success() => response
                .json::<Vec<String>>()
                .await
                .map_err(|e| GatewayError::InvalidResponse(e.to_string())),
            status => {
                error!(prefix, status = %status, "kv list failed");
                Err(GatewayError::UnexpectedStatus(status.as_u16()))
            }
        }
    }

    async fn probe(&self) -> GatewayResult<()> {
        let url = self.endpoint("v1/status/leader")?;
        let response = self.send(url).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(GatewayError::UnexpectedStatus(response.status().as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_builder() {
        let settings = GatewaySettings::new("http://127.0.0.1:8500").with_token("secret");
        assert_eq!(settings.address, "http://127.0.0.1:8500");
        assert_eq!(settings.token.as_deref(), Some("secret"));
    }

    #[test]
    fn empty_address_is_rejected() {
        let err = HttpGateway::new(&GatewaySettings::new("")).unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn unparseable_address_is_rejected() {
        let err = HttpGateway::new(&GatewaySettings::new("not a url")).unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }

    #[test]
    fn kv_endpoint_keeps_key_path() {
        let gateway = HttpGateway::new(&GatewaySettings::new("http://127.0.0.1:8500")).unwrap();
        let url = gateway.kv_endpoint("env/prod/replicas").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8500/v1/kv/env/prod/replicas");
    }

    #[test]
    fn base_path_gains_trailing_slash() {
        let gateway =
            HttpGateway::new(&GatewaySettings::new("http://127.0.0.1:8500/store")).unwrap();
        let url = gateway.endpoint("v1/status/leader").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8500/store/v1/status/leader");
    }
}

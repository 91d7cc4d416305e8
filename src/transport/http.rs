// MIT License - Copyright (c) 2026 garnet-bridge contributors
// Garnet Control HTTP client
//
// Thin wrapper over `reqwest::Client`: URL construction, the access-token
// header and the `{ success, message }` envelope. Session policy (token
// lifetime, re-login, sequence numbers) lives in `comm`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::config::PanelConfig;
use crate::error::{GarnetError, Result};
use crate::transport::models::{LoginRequest, LoginResponse, SystemResponse, WireSystem};

const API_PREFIX: &str = "/users_api/v1/";
const TOKEN_HEADER: &str = "x-access-token";

/// Raw client for the Garnet Control users API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &PanelConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("garnet-bridge/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let base_url = Url::parse(&config.api_base_url)?;
        Ok(Self { http, base_url })
    }

    fn api_url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(&format!("{API_PREFIX}{path}"))?)
    }

    /// `POST auth/login`.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let url = self.api_url("auth/login")?;
        debug!("POST {}", url);
        let resp = self
            .http
            .post(url)
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        parse_envelope(resp).await
    }

    /// `GET systems/{id}`.
    pub async fn get_system(&self, token: &str, system_id: &str) -> Result<WireSystem> {
        let url = self.api_url(&format!("systems/{system_id}"))?;
        debug!("GET {}", url);
        let resp = self.http.get(url).header(TOKEN_HEADER, token).send().await?;
        let body: SystemResponse = parse_envelope(resp).await?;
        Ok(body.message.system)
    }

    /// `POST systems/{id}/commands/{command}`.
    pub async fn post_command<B, T>(
        &self,
        token: &str,
        system_id: &str,
        command: &str,
        body: &B,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.api_url(&format!("systems/{system_id}/commands/{command}"))?;
        debug!("POST {}", url);
        let resp = self
            .http
            .post(url)
            .header(TOKEN_HEADER, token)
            .json(body)
            .send()
            .await?;
        parse_envelope(resp).await
    }
}

/// Unwrap the `{ success, message }` envelope.
///
/// `success: true` deserializes the whole body as `T`. Otherwise a string
/// `message` is classified into busy, token or generic API errors.
async fn parse_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    let body = resp.text().await?;
    trace!("HTTP {}: {}", status, body);

    let value: Value = serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        GarnetError::InvalidResponse {
            details: format!("HTTP {status}: {e} (body preview: {preview:?})"),
        }
    })?;

    if value.get("success").and_then(Value::as_bool) == Some(true) {
        return serde_json::from_value(value).map_err(|e| GarnetError::InvalidResponse {
            details: e.to_string(),
        });
    }

    match value.get("message").and_then(Value::as_str) {
        Some(message) => Err(GarnetError::from_api_message(message)),
        None => Err(GarnetError::InvalidResponse {
            details: format!("HTTP {status}: {value}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        let config = PanelConfig::builder()
            .api_base_url("https://web.garnetcontrol.app")
            .build();
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(
            client.api_url("systems/abc/commands/arm/away").unwrap().as_str(),
            "https://web.garnetcontrol.app/users_api/v1/systems/abc/commands/arm/away"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let config = PanelConfig::builder().api_base_url("not a url").build();
        assert!(matches!(
            ApiClient::new(&config),
            Err(GarnetError::InvalidUrl(_))
        ));
    }
}

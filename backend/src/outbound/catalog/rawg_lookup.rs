//! Reqwest-backed catalog lookup against the RAWG games API.
//!
//! This adapter owns transport details only: query construction, timeout
//! and HTTP error mapping, and JSON decoding into a catalog entry. Lookup
//! failures are mapped into port errors and left to the caller, which
//! treats the catalog as best-effort.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::dto::SearchResponseDto;
use crate::domain::ports::{CatalogEntry, CatalogLookup, CatalogLookupError};

const DEFAULT_ENDPOINT: &str = "https://api.rawg.io/api/games";
const DEFAULT_TIMEOUT_SECONDS: u64 = 5;
const DEFAULT_USER_AGENT: &str = "cartshare-backend-catalog/0.1";

/// Endpoint and identity settings for RAWG requests.
#[derive(Debug, Clone)]
pub struct RawgConfig {
    /// Search endpoint URL.
    pub endpoint: Url,
    /// API key sent as the `key` query parameter.
    pub api_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// HTTP user-agent sent to the catalog.
    pub user_agent: String,
}

impl RawgConfig {
    /// Build a configuration for the public RAWG endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error when the built-in endpoint URL fails to parse,
    /// which only happens if the constant itself is broken.
    pub fn new(api_key: impl Into<String>) -> Result<Self, url::ParseError> {
        Ok(Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT)?,
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        })
    }
}

/// Catalog lookup adapter performing HTTP GET searches against RAWG.
pub struct RawgCatalogLookup {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl RawgCatalogLookup {
    /// Build an adapter using a reqwest client with an explicit timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: RawgConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint,
            api_key: config.api_key,
        })
    }
}

#[async_trait]
impl CatalogLookup for RawgCatalogLookup {
    async fn lookup(&self, title: &str) -> Result<Option<CatalogEntry>, CatalogLookupError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("key", self.api_key.as_str()),
                ("search", title),
                ("page_size", "1"),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_best_match(body.as_ref())
    }
}

fn parse_best_match(body: &[u8]) -> Result<Option<CatalogEntry>, CatalogLookupError> {
    let decoded: SearchResponseDto = serde_json::from_slice(body).map_err(|error| {
        CatalogLookupError::decode(format!("invalid catalog JSON payload: {error}"))
    })?;
    Ok(decoded.into_best_match())
}

fn map_transport_error(error: reqwest::Error) -> CatalogLookupError {
    CatalogLookupError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> CatalogLookupError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };
    CatalogLookupError::transport(message)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for the non-network decoding and mapping helpers.

    use super::*;

    #[test]
    fn parses_first_result_as_best_match() {
        let body = r#"{
            "count": 2,
            "results": [
                {
                    "name": "Hollow Knight",
                    "background_image": "https://media.example/hollow-knight.jpg"
                },
                { "name": "Hollow Knight: Silksong", "background_image": null }
            ]
        }"#;

        let entry = parse_best_match(body.as_bytes())
            .expect("JSON should decode")
            .expect("a result should match");
        assert_eq!(entry.title, "Hollow Knight");
        assert_eq!(
            entry.cover_url.as_deref(),
            Some("https://media.example/hollow-knight.jpg")
        );
    }

    #[test]
    fn empty_result_list_means_no_match() {
        let entry = parse_best_match(br#"{ "results": [] }"#).expect("JSON should decode");
        assert!(entry.is_none());
    }

    #[test]
    fn missing_result_list_means_no_match() {
        let entry = parse_best_match(br#"{ "count": 0 }"#).expect("JSON should decode");
        assert!(entry.is_none());
    }

    #[test]
    fn malformed_payloads_map_to_decode_errors() {
        let error = parse_best_match(b"not json").expect_err("decode should fail");
        assert!(matches!(error, CatalogLookupError::Decode { .. }));
    }

    #[test]
    fn error_statuses_keep_a_body_preview() {
        let error = map_status_error(
            StatusCode::UNAUTHORIZED,
            br#"{"error":"The provided API key is invalid."}"#,
        );
        let CatalogLookupError::Transport { message } = error else {
            panic!("expected transport error");
        };
        assert!(message.contains("status 401"));
        assert!(message.contains("invalid"));
    }
}

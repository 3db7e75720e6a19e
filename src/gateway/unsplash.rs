use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::future::Future;
use tracing::debug;

use super::SearchGateway;
use crate::config::Config;
use crate::error::GatewayError;
use crate::state::data::{PageRequest, Photo, ResultSet};

/// Path of the photo search endpoint, relative to the API base URL
const SEARCH_PATH: &str = "search/photos";

/// Body of a successful `GET /search/photos`
#[derive(Debug, Deserialize)]
struct SearchResponse {
    total: u64,
    total_pages: u32,
    results: Vec<Photo>,
}

/// Body of an Unsplash error response
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    errors: Vec<String>,
}

/// `SearchGateway` backed by the Unsplash REST API
#[derive(Debug, Clone)]
pub struct UnsplashGateway {
    client: Client,
    base_url: Url,
    auth_header: String,
}

impl UnsplashGateway {
    /// Build a gateway from the application config.
    /// The HTTP client carries the configured request timeout.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("photo-search/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            auth_header: format!("Client-ID {}", config.access_key),
        })
    }
}

impl SearchGateway for UnsplashGateway {
    fn search(
        &self,
        query: &str,
        page: PageRequest,
    ) -> impl Future<Output = Result<ResultSet, GatewayError>> + Send {
        let url = build_search_url(&self.base_url, query, page);
        let client = self.client.clone();
        let auth_header = self.auth_header.clone();

        async move {
            // Invalid base URLs surface as a search error
            let url = url?;
            debug!(%url, "GET search/photos");

            // Send the request with the API key and version headers
            let response = client
                .get(url)
                .header(AUTHORIZATION, auth_header)
                .header(ACCEPT, HeaderValue::from_static("application/json"))
                .header("Accept-Version", HeaderValue::from_static("v1"))
                .send()
                .await
                .map_err(GatewayError::from_reqwest)?;

            let status = response.status();
            if let Some(remaining) = response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
            {
                debug!(remaining, "Unsplash rate limit");
            }

            // Read the whole body; error replies carry their message in it
            let body = response.bytes().await.map_err(GatewayError::from_reqwest)?;

            if !status.is_success() {
                return Err(GatewayError::Status {
                    status: status.as_u16(),
                    message: error_message(status, &body),
                });
            }

            parse_search_response(&body)
        }
    }
}

/// `{base}/search/photos?query=..&page=..&per_page=..`, query percent-encoded
pub fn build_search_url(base: &Url, query: &str, page: PageRequest) -> Result<Url, GatewayError> {
    let mut url = base
        .join(SEARCH_PATH)
        .map_err(|e| GatewayError::InvalidUrl(e.to_string()))?;

    url.query_pairs_mut()
        .append_pair("query", query)
        .append_pair("page", &page.page.to_string())
        .append_pair("per_page", &page.per_page.get().to_string());

    Ok(url)
}

/// Decode a successful search body into a `ResultSet`
pub fn parse_search_response(body: &[u8]) -> Result<ResultSet, GatewayError> {
    let response: SearchResponse =
        serde_json::from_slice(body).map_err(|e| GatewayError::Decode(e.to_string()))?;

    Ok(ResultSet {
        items: response.results,
        total_items: response.total,
        total_pages: response.total_pages,
    })
}

/// Human-readable message for a failed request.
/// Prefers the API's own `errors` list, then the raw body, then the status reason.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(parsed) = serde_json::from_slice::<ErrorResponse>(body) {
        if !parsed.errors.is_empty() {
            return parsed.errors.join("; ");
        }
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() && text.len() <= 200 {
        return text.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}

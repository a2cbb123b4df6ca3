use crate::config::MarketplaceConfig;
use crate::error::{MirrorError, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE, REFERER};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36";

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One marketplace collection. Only `name` is interpreted; every other field
/// the API returns is carried in `extra` so snapshot files round-trip the
/// upstream payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One plugin record inside a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginRecord {
    pub plugin_id: String,
    pub latest_version: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// Response envelopes: {"data": {"collections": [...]}} and
// {"data": {"plugins": [...]}}.

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct CollectionsPage {
    collections: Vec<Collection>,
}

#[derive(Deserialize)]
struct PluginsPage {
    plugins: Vec<PluginRecord>,
}

// ---------------------------------------------------------------------------
// MarketClient
// ---------------------------------------------------------------------------

/// Blocking HTTP client for the plugin marketplace API.
#[derive(Debug)]
pub struct MarketClient {
    http: Client,
    base_url: String,
    page_size: u32,
}

impl MarketClient {
    pub fn new(config: &MarketplaceConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(COOKIE, HeaderValue::from_static("locale=en-US"));
        if let Ok(referer) = HeaderValue::from_str(&format!("{}/", config.base_url)) {
            headers.insert(REFERER, referer);
        }

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
        })
    }

    /// List all collections.
    pub fn collections(&self) -> Result<Vec<Collection>> {
        let url = format!(
            "{}/api/v1/collections?page=1&page_size={}",
            self.base_url, self.page_size
        );
        let response = self.http.get(&url).send()?;
        let page: Envelope<CollectionsPage> = check(response, &url)?.json()?;
        Ok(page.data.collections)
    }

    /// List the plugin records of one collection.
    pub fn collection_plugins(&self, collection: &str) -> Result<Vec<PluginRecord>> {
        let url = format!("{}/api/v1/collections/{collection}/plugins", self.base_url);
        // The marketplace expects a POST with an empty JSON object body.
        let response = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body("{}")
            .send()?;
        let page: Envelope<PluginsPage> = check(response, &url)?.json()?;
        Ok(page.data.plugins)
    }

    /// Download one packaged plugin bundle.
    pub fn download_package(&self, plugin_id: &str, version: &str) -> Result<Vec<u8>> {
        let url = format!(
            "{}/api/v1/plugins/{plugin_id}/{version}/download",
            self.base_url
        );
        let response = self.http.get(&url).send()?;
        let bytes = check(response, &url)?.bytes()?;
        Ok(bytes.to_vec())
    }
}

/// Map a non-2xx response to an API error carrying status and body.
fn check(response: Response, url: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(MirrorError::Api {
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

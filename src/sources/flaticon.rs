use futures::future::join_all;
use reqwest::{
    header::ACCEPT,
    Client,
    Url,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{
    debug,
    warn,
};

use crate::core::{
    PickerError,
    SourceKind,
    SymbolCandidate,
};

const API_KEY_HEADER: &str = "x-freepik-api-key";

#[derive(Debug, Deserialize)]
struct Listing {
    #[serde(default)]
    data: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct DownloadResponse {
    #[serde(default)]
    data: Option<DownloadData>,
}

#[derive(Debug, Deserialize)]
struct DownloadData {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IconRef {
    pub id: String,
    pub name: String,
}

/// Client for the Freepik (Flaticon) icon API. Each search costs one
/// listing request plus one download-link request per icon.
#[derive(Debug, Clone)]
pub struct FlaticonClient {
    base_url: String,
    api_key: Option<String>,
    limit: usize,
}

impl FlaticonClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, limit: usize) -> Self {
        Self { base_url: base_url.into(), api_key, limit }
    }

    pub fn search_url(&self, query: &str) -> Result<Url, PickerError> {
        let mut url = self.api_url(&["v1", "icons"])?;
        url.query_pairs_mut()
            .append_pair("term", query)
            .append_pair("limit", &self.limit.to_string())
            .append_pair("order", "relevance");
        Ok(url)
    }

    pub fn download_url(&self, id: &str) -> Result<Url, PickerError> {
        let mut url = self.api_url(&["v1", "icons", id, "download"])?;
        url.query_pairs_mut().append_pair("format", "png");
        Ok(url)
    }

    fn api_url(&self, segments: &[&str]) -> Result<Url, PickerError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| PickerError::Custom(format!("Invalid Flaticon URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| PickerError::Custom("Flaticon URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn search(
        &self,
        client: &Client,
        query: &str,
    ) -> Result<Vec<SymbolCandidate>, PickerError> {
        let api_key = self.api_key.as_deref().ok_or(PickerError::MissingApiKey("Flaticon"))?;

        let url = self.search_url(query)?;
        let resp = client
            .get(url.clone())
            .header(API_KEY_HEADER, api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(PickerError::Custom(format!(
                "HTTP error {} from {}: {}",
                status, url, text
            )));
        }
        let icons = self.parse_listing(&resp.text().await?)?;
        debug!(query, icons = icons.len(), "Flaticon listing");

        let lookups = icons.into_iter().map(|icon| async move {
            match self.resolve_download(client, api_key, &icon.id).await {
                Ok(Some(link)) => Some(SymbolCandidate::remote(icon.name, SourceKind::Flaticon, link)),
                Ok(None) => {
                    warn!(id = %icon.id, "Flaticon returned no download link");
                    None
                }
                Err(e) => {
                    warn!(id = %icon.id, "Failed to get Flaticon download link: {e}");
                    None
                }
            }
        });

        Ok(join_all(lookups).await.into_iter().flatten().collect())
    }

    async fn resolve_download(
        &self,
        client: &Client,
        api_key: &str,
        id: &str,
    ) -> Result<Option<String>, PickerError> {
        let url = self.download_url(id)?;
        let resp = client
            .get(url.clone())
            .header(API_KEY_HEADER, api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(PickerError::Custom(format!("HTTP error {} from {}", resp.status(), url)));
        }
        parse_download_link(&resp.text().await?)
    }

    /// Icon ids and names from a listing response. Items without an id are
    /// dropped.
    pub fn parse_listing(&self, body: &str) -> Result<Vec<IconRef>, PickerError> {
        let listing: Listing = serde_json::from_str(body)?;

        Ok(listing
            .data
            .into_iter()
            .filter_map(|item| {
                let id = match item.get("id")? {
                    Value::Number(n) => n.to_string(),
                    Value::String(s) if !s.is_empty() => s.clone(),
                    _ => return None,
                };
                let name = item
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("N/A")
                    .to_string();
                Some(IconRef { id, name })
            })
            .take(self.limit)
            .collect())
    }
}

pub fn parse_download_link(body: &str) -> Result<Option<String>, PickerError> {
    let response: DownloadResponse = serde_json::from_str(body)?;
    Ok(response.data.and_then(|d| d.url).filter(|url| !url.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> FlaticonClient {
        FlaticonClient::new("https://api.freepik.com", Some("key".to_string()), 4)
    }

    #[test]
    fn builds_search_and_download_urls() {
        let client = client();
        assert_eq!(
            client.search_url("red apple").unwrap().as_str(),
            "https://api.freepik.com/v1/icons?term=red+apple&limit=4&order=relevance"
        );
        assert_eq!(
            client.download_url("123").unwrap().as_str(),
            "https://api.freepik.com/v1/icons/123/download?format=png"
        );
    }

    #[test]
    fn listing_skips_items_without_id() {
        let body = r#"{"data": [
            {"id": 123, "name": "apple"},
            {"name": "orphan"},
            {"id": "abc"},
            {"id": null, "name": "null id"}
        ], "meta": {}}"#;

        let icons = client().parse_listing(body).unwrap();
        assert_eq!(
            icons,
            vec![
                IconRef { id: "123".to_string(), name: "apple".to_string() },
                IconRef { id: "abc".to_string(), name: "N/A".to_string() },
            ]
        );
    }

    #[test]
    fn download_link_may_be_missing() {
        assert_eq!(
            parse_download_link(r#"{"data": {"url": "https://cdn.example/icon.png?t=1"}}"#).unwrap(),
            Some("https://cdn.example/icon.png?t=1".to_string())
        );
        assert_eq!(parse_download_link(r#"{"data": {}}"#).unwrap(), None);
        assert_eq!(parse_download_link(r#"{}"#).unwrap(), None);
    }

    #[tokio::test]
    async fn search_without_key_makes_no_request() {
        let client = FlaticonClient::new("http://127.0.0.1:9", None, 4);
        let http = Client::new();
        let err = client.search(&http, "apple").await.unwrap_err();
        assert!(matches!(err, PickerError::MissingApiKey("Flaticon")));
    }
}

use reqwest::{
    Client,
    StatusCode,
    Url,
};
use serde::Deserialize;
use tracing::debug;

use crate::core::{
    PickerError,
    SourceKind,
    SymbolCandidate,
};

#[derive(Debug, Deserialize)]
struct Pictogram {
    #[serde(rename = "_id")]
    id: u64,
    #[serde(default)]
    keywords: Vec<Keyword>,
}

#[derive(Debug, Deserialize)]
struct Keyword {
    #[serde(default)]
    keyword: Option<String>,
}

/// Client for the ARASAAC pictogram search API.
#[derive(Debug, Clone)]
pub struct ArasaacClient {
    base_url: String,
    language: String,
    limit: usize,
}

impl ArasaacClient {
    pub fn new(base_url: impl Into<String>, language: impl Into<String>, limit: usize) -> Self {
        Self { base_url: base_url.into(), language: language.into(), limit }
    }

    pub fn search_url(&self, query: &str) -> Result<Url, PickerError> {
        self.api_url(&["api", "pictograms", &self.language, "search", query])
    }

    pub fn pictogram_url(&self, id: u64) -> Result<Url, PickerError> {
        self.api_url(&["api", "pictograms", &id.to_string()])
    }

    fn api_url(&self, segments: &[&str]) -> Result<Url, PickerError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| PickerError::Custom(format!("Invalid ARASAAC URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| PickerError::Custom("ARASAAC URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn search(
        &self,
        client: &Client,
        query: &str,
    ) -> Result<Vec<SymbolCandidate>, PickerError> {
        let url = self.search_url(query)?;
        let resp = client.get(url.clone()).send().await?;

        // The API answers 404 when nothing matches.
        if resp.status() == StatusCode::NOT_FOUND {
            debug!(query, "ARASAAC returned no pictograms");
            return Ok(Vec::new());
        }
        if !resp.status().is_success() {
            return Err(PickerError::Custom(format!(
                "HTTP error {} from {}",
                resp.status(),
                url
            )));
        }

        let body = resp.text().await?;
        self.parse_search(&body)
    }

    pub fn parse_search(&self, body: &str) -> Result<Vec<SymbolCandidate>, PickerError> {
        let pictograms: Vec<Pictogram> = serde_json::from_str(body)?;

        pictograms
            .into_iter()
            .take(self.limit)
            .map(|pictogram| {
                let name = pictogram
                    .keywords
                    .into_iter()
                    .next()
                    .and_then(|k| k.keyword)
                    .unwrap_or_else(|| "N/A".to_string());
                let url = self.pictogram_url(pictogram.id)?;
                Ok(SymbolCandidate::remote(name, SourceKind::Arasaac, url.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SymbolLocation;

    fn client() -> ArasaacClient {
        ArasaacClient::new("https://api.arasaac.org", "en", 2)
    }

    #[test]
    fn search_url_escapes_query() {
        let url = client().search_url("ice cream/cone").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.arasaac.org/api/pictograms/en/search/ice%20cream%2Fcone"
        );
    }

    #[test]
    fn base_url_with_trailing_slash() {
        let client = ArasaacClient::new("http://localhost:8080/", "es", 4);
        assert_eq!(
            client.pictogram_url(2462).unwrap().as_str(),
            "http://localhost:8080/api/pictograms/2462"
        );
    }

    #[test]
    fn parses_first_keyword_and_respects_limit() {
        let body = r#"[
            {"_id": 2462, "keywords": [{"keyword": "apple", "type": 2}, {"keyword": "fruit"}]},
            {"_id": 8, "keywords": []},
            {"_id": 99, "keywords": [{"keyword": "pear"}]}
        ]"#;

        let results = client().parse_search(body).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "apple");
        assert_eq!(results[0].source, SourceKind::Arasaac);
        assert_eq!(
            results[0].location,
            SymbolLocation::Remote("https://api.arasaac.org/api/pictograms/2462".to_string())
        );
        assert_eq!(results[1].name, "N/A");
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(client().parse_search(r#"{"error": "nope"}"#).is_err());
    }
}

use crate::config::ClientConfig;
use crate::error::{Result, SearchError};
use crate::query::SearchRequest;
use crate::types::{BulkResponse, GetResponse, SearchResponse, WriteResponse};
use http::StatusCode;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

const NDJSON: &str = "application/x-ndjson";

/// HTTP client for the engine's REST surface.
///
/// Every method is one request/response. Non-2xx answers become
/// [`SearchError::Api`] except where a 404 is a normal answer (`get`,
/// document `delete`).
#[derive(Debug, Clone)]
pub struct EsClient {
    base_url: Url,
    http_client: reqwest::Client,
}

impl EsClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            SearchError::Config(format!("invalid base_url '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SearchError::Config(format!(
                "base_url '{}' cannot carry a path",
                config.base_url
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            base_url,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Append `segments` to the base URL, percent-encoding each one, so an id
    /// such as `a/b` or `c?x` stays a single path segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn refresh_query(refresh: Option<&str>) -> Vec<(&'static str, &str)> {
        refresh.map(|r| vec![("refresh", r)]).unwrap_or_default()
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<(StatusCode, String)> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }

    fn parse<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T> {
        if !status.is_success() {
            return Err(SearchError::from_response(status, body));
        }
        Ok(serde_json::from_str(body)?)
    }

    pub async fn delete_index(&self, index: &str) -> Result<()> {
        tracing::debug!(index, "DELETE index");
        let (status, body) = self.send(self.http_client.delete(self.url(&[index]))).await?;
        Self::parse::<Value>(status, &body).map(|_| ())
    }

    /// Create an index. `body` may carry settings and mappings; `None` leaves
    /// everything to dynamic mapping.
    pub async fn create_index(&self, index: &str, body: Option<&Value>) -> Result<()> {
        tracing::debug!(index, "PUT index");
        let mut request = self.http_client.put(self.url(&[index]));
        if let Some(body) = body {
            request = request.json(body);
        }
        let (status, body) = self.send(request).await?;
        Self::parse::<Value>(status, &body).map(|_| ())
    }

    pub async fn refresh(&self, index: &str) -> Result<()> {
        tracing::debug!(index, "POST _refresh");
        let (status, body) = self
            .send(self.http_client.post(self.url(&[index, "_refresh"])))
            .await?;
        Self::parse::<Value>(status, &body).map(|_| ())
    }

    /// Create a document; fails with a 409 [`SearchError::Api`] if the id exists.
    pub async fn create<T: Serialize>(
        &self,
        index: &str,
        id: &str,
        doc: &T,
        refresh: Option<&str>,
    ) -> Result<WriteResponse> {
        tracing::debug!(index, id, "PUT _create");
        let request = self
            .http_client
            .put(self.url(&[index, "_create", id]))
            .query(&Self::refresh_query(refresh))
            .json(doc);
        let (status, body) = self.send(request).await?;
        Self::parse(status, &body)
    }

    /// Index (create or replace) a document.
    pub async fn index<T: Serialize>(
        &self,
        index: &str,
        id: &str,
        doc: &T,
        refresh: Option<&str>,
    ) -> Result<WriteResponse> {
        tracing::debug!(index, id, "PUT _doc");
        let request = self
            .http_client
            .put(self.url(&[index, "_doc", id]))
            .query(&Self::refresh_query(refresh))
            .json(doc);
        let (status, body) = self.send(request).await?;
        Self::parse(status, &body)
    }

    pub async fn get<T: DeserializeOwned>(&self, index: &str, id: &str) -> Result<GetResponse<T>> {
        tracing::debug!(index, id, "GET _doc");
        let (status, body) = self
            .send(self.http_client.get(self.url(&[index, "_doc", id])))
            .await?;

        // A missing document answers 404 with `"found": false`; a missing
        // index answers 404 with an error envelope.
        if status == StatusCode::NOT_FOUND {
            if let Ok(res) = serde_json::from_str::<GetResponse<T>>(&body) {
                return Ok(res);
            }
        }
        Self::parse(status, &body)
    }

    pub async fn delete(
        &self,
        index: &str,
        id: &str,
        refresh: Option<&str>,
    ) -> Result<WriteResponse> {
        tracing::debug!(index, id, "DELETE _doc");
        let request = self
            .http_client
            .delete(self.url(&[index, "_doc", id]))
            .query(&Self::refresh_query(refresh));
        let (status, body) = self.send(request).await?;

        if status == StatusCode::NOT_FOUND {
            if let Ok(res) = serde_json::from_str::<WriteResponse>(&body) {
                return Ok(res);
            }
        }
        Self::parse(status, &body)
    }

    /// Send pre-encoded NDJSON bulk lines. Per-item failures stay inside the
    /// returned [`BulkResponse`].
    pub async fn bulk(
        &self,
        index: &str,
        ndjson: String,
        refresh: Option<&str>,
    ) -> Result<BulkResponse> {
        tracing::debug!(index, bytes = ndjson.len(), "POST _bulk");
        let request = self
            .http_client
            .post(self.url(&[index, "_bulk"]))
            .query(&Self::refresh_query(refresh))
            .header(reqwest::header::CONTENT_TYPE, NDJSON)
            .body(ndjson);
        let (status, body) = self.send(request).await?;
        Self::parse(status, &body)
    }

    pub async fn search<T: DeserializeOwned>(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse<T>> {
        if tracing::enabled!(tracing::Level::DEBUG) {
            let body = serde_json::to_string(request)?;
            tracing::debug!(index, body = %body, "POST _search");
        }
        let (status, body) = self
            .send(
                self.http_client
                    .post(self.url(&[index, "_search"]))
                    .json(request),
            )
            .await?;
        Self::parse(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation_trims_trailing_slash() {
        let config = ClientConfig::default().with_base_url("http://localhost:9200/");
        let client = EsClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9200");
        assert_eq!(
            client.url(&["student", "_search"]).as_str(),
            "http://localhost:9200/student/_search"
        );
    }

    #[test]
    fn test_url_encodes_each_segment() {
        let client = EsClient::new(&ClientConfig::default()).unwrap();
        assert_eq!(
            client.url(&["student", "_doc", "a/b"]).as_str(),
            "http://localhost:9200/student/_doc/a%2Fb"
        );
        let url = client.url(&["student", "_doc", "c?refresh=true#x"]);
        assert_eq!(url.path(), "/student/_doc/c%3Frefresh=true%23x");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_url_keeps_base_path() {
        let config = ClientConfig::default().with_base_url("http://proxy:8080/es/");
        let client = EsClient::new(&config).unwrap();
        assert_eq!(
            client.url(&["student", "_refresh"]).as_str(),
            "http://proxy:8080/es/student/_refresh"
        );
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let config = ClientConfig::default().with_base_url("not a url");
        assert!(matches!(
            EsClient::new(&config),
            Err(SearchError::Config(_))
        ));
    }

    #[test]
    fn test_refresh_query() {
        assert_eq!(EsClient::refresh_query(Some("true")), vec![("refresh", "true")]);
        assert!(EsClient::refresh_query(None).is_empty());
    }

    #[test]
    fn test_parse_maps_errors() {
        let err = EsClient::parse::<Value>(
            StatusCode::NOT_FOUND,
            r#"{"error":{"type":"index_not_found_exception","reason":"no such index"},"status":404}"#,
        )
        .unwrap_err();
        assert!(err.is_not_found());

        let ok: Value = EsClient::parse(StatusCode::OK, r#"{"acknowledged":true}"#).unwrap();
        assert_eq!(ok["acknowledged"], true);
    }
}

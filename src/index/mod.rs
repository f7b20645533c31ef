pub mod bulk;

use crate::client::EsClient;
use crate::config::{ClientConfig, Visibility};
use crate::error::Result;
use crate::query::SearchRequest;
use crate::types::{
    BulkAction, BulkResponse, GetResponse, Indexable, SearchResponse, WriteResponse,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// Lifecycle wrapper around one named index holding documents of type `T`.
///
/// Every write goes through the configured [`Visibility`] barrier, so a
/// search issued after a write returns observes it.
///
/// # Examples
///
/// ```rust,no_run
/// use student_search::{fixture, ClientConfig, DocumentIndex, Student};
/// use student_search::query::{Query, SearchRequest};
///
/// # async fn run() -> student_search::Result<()> {
/// let index: DocumentIndex<Student> = DocumentIndex::new(ClientConfig::default())?;
/// index.reset().await?;
/// index.bulk_create(&fixture::load_default()?).await?;
///
/// let res = index.search(&SearchRequest::new(Query::term("grade", 3))).await?;
/// assert_eq!(res.hits.hits[0].id, "102");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DocumentIndex<T> {
    client: EsClient,
    name: String,
    visibility: Visibility,
    _doc: PhantomData<fn() -> T>,
}

impl<T> DocumentIndex<T>
where
    T: Serialize + DeserializeOwned + Indexable,
{
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = EsClient::new(&config)?;
        Ok(Self::with_client(client, config.index, config.visibility))
    }

    pub fn with_client(client: EsClient, name: impl Into<String>, visibility: Visibility) -> Self {
        DocumentIndex {
            client,
            name: name.into(),
            visibility,
            _doc: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn client(&self) -> &EsClient {
        &self.client
    }

    /// Drop and recreate the index. A missing index is not an error.
    pub async fn reset(&self) -> Result<()> {
        match self.client.delete_index(&self.name).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!(index = %self.name, "Index did not exist before reset");
            }
            Err(e) => return Err(e),
        }
        self.client.create_index(&self.name, None).await?;
        tracing::info!(index = %self.name, "Index reset");
        Ok(())
    }

    /// Create a document under its own id; a 409 error if the id exists.
    pub async fn create(&self, doc: &T) -> Result<WriteResponse> {
        let res = self
            .client
            .create(&self.name, doc.doc_id(), doc, self.visibility.refresh_param())
            .await?;
        self.await_visibility().await;
        Ok(res)
    }

    /// Create every document in one `_bulk` request.
    ///
    /// Item-level failures (e.g. an id that already exists) are reported in
    /// the returned [`BulkResponse`] rather than as an error.
    pub async fn bulk_create(&self, docs: &[T]) -> Result<BulkResponse> {
        let body = bulk::encode(BulkAction::Create, docs)?;
        let res = self
            .client
            .bulk(&self.name, body, self.visibility.refresh_param())
            .await?;

        if res.errors {
            for item in res.failed_items() {
                let status = item.status();
                tracing::warn!(
                    index = %self.name,
                    id = item.id().unwrap_or("-"),
                    status = status.status,
                    error = ?status.error,
                    "Bulk item failed"
                );
            }
        }
        tracing::debug!(
            index = %self.name,
            items = res.items.len(),
            took = res.took,
            "Bulk create done"
        );

        self.await_visibility().await;
        Ok(res)
    }

    pub async fn get(&self, id: &str) -> Result<GetResponse<T>> {
        self.client.get(&self.name, id).await
    }

    /// Index the document under its id, replacing any existing version.
    pub async fn replace(&self, doc: &T) -> Result<WriteResponse> {
        let res = self
            .client
            .index(&self.name, doc.doc_id(), doc, self.visibility.refresh_param())
            .await?;
        self.await_visibility().await;
        Ok(res)
    }

    /// Delete by id. A missing document answers with `result = not_found`.
    pub async fn delete(&self, id: &str) -> Result<WriteResponse> {
        let res = self
            .client
            .delete(&self.name, id, self.visibility.refresh_param())
            .await?;
        self.await_visibility().await;
        Ok(res)
    }

    /// Explicit refresh, independent of the configured barrier.
    pub async fn refresh(&self) -> Result<()> {
        self.client.refresh(&self.name).await
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse<T>> {
        let res: SearchResponse<T> = self.client.search(&self.name, request).await?;
        tracing::debug!(
            index = %self.name,
            hits = res.hits.hits.len(),
            took = res.took,
            "Search done"
        );
        Ok(res)
    }

    async fn await_visibility(&self) {
        if let Some(delay) = self.visibility.delay() {
            tokio::time::sleep(delay).await;
        }
    }
}

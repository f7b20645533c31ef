use super::{Query, SortOptions};
use serde::Serialize;

/// Body of a `_search` request.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Query>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_scores: Option<bool>,
}

impl SearchRequest {
    pub fn new(query: impl Into<Query>) -> Self {
        SearchRequest {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    pub fn sort(mut self, sort: SortOptions) -> Self {
        self.sort.push(sort);
        self
    }

    /// Offset-based paging: skip `from` hits, return at most `size`.
    pub fn page(mut self, from: u64, size: u64) -> Self {
        self.from = Some(from);
        self.size = Some(size);
        self
    }

    pub fn track_scores(mut self, track: bool) -> Self {
        self.track_scores = Some(track);
        self
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Document identifier, supplied by the client on every write.
pub type DocumentId = String;

/// A document that carries its own id.
///
/// [`DocumentIndex`](crate::index::DocumentIndex) uses this to address
/// create/replace requests without a separate id argument.
pub trait Indexable {
    fn doc_id(&self) -> &str;
}

/// The indexed record.
///
/// Field names follow the engine-side camelCase convention so dynamic mapping
/// produces `departments.keyword`, `courses.name.keyword`, `conductScore` and
/// so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: DocumentId,
    pub name: String,
    #[serde(default)]
    pub departments: Vec<String>,
    #[serde(default)]
    pub courses: Vec<Course>,
    pub grade: i64,
    pub conduct_score: i64,
    pub job: Job,
    pub introduction: String,
    #[serde(with = "flexible_date")]
    pub english_issued_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub name: String,
    pub point: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
}

impl Indexable for Student {
    fn doc_id(&self) -> &str {
        &self.id
    }
}

impl Student {
    /// Highest course point, the value a `mode: max` sort on `courses.point` uses.
    pub fn max_course_point(&self) -> Option<i64> {
        self.courses.iter().map(|c| c.point).max()
    }

    pub fn takes_course(&self, course: &str) -> bool {
        self.courses.iter().any(|c| c.name == course)
    }

    pub fn in_department(&self, department: &str) -> bool {
        self.departments.iter().any(|d| d == department)
    }
}

/// Dates are written as RFC 3339 so the engine maps them as `date`, and read
/// back from either RFC 3339 strings or epoch milliseconds.
mod flexible_date {
    use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
    use serde::{de, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DateVisitor;

        impl<'de> de::Visitor<'de> for DateVisitor {
            type Value = DateTime<Utc>;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("an RFC 3339 date string or epoch milliseconds")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Utc.timestamp_millis_opt(v)
                    .single()
                    .ok_or_else(|| E::custom(format!("epoch millis out of range: {}", v)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                let v = i64::try_from(v)
                    .map_err(|_| E::custom(format!("epoch millis out of range: {}", v)))?;
                self.visit_i64(v)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                DateTime::parse_from_rfc3339(v)
                    .map(|d| d.with_timezone(&Utc))
                    .map_err(|e| E::custom(format!("invalid date '{}': {}", v, e)))
            }
        }

        deserializer.deserialize_any(DateVisitor)
    }
}

/// Structured error cause as reported by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorCause {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Outcome of a single-document write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteResult {
    Created,
    Updated,
    Deleted,
    NotFound,
    Noop,
}

/// Response to `_create`, `_doc` (index) and delete requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteResponse {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(rename = "_version", default)]
    pub version: Option<i64>,
    pub result: WriteResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetResponse<T> {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub found: bool,
    #[serde(rename = "_version", default)]
    pub version: Option<i64>,
    #[serde(rename = "_source", default = "Option::default")]
    pub source: Option<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    Create,
    Index,
    Update,
    Delete,
}

impl BulkAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkAction::Create => "create",
            BulkAction::Index => "index",
            BulkAction::Update => "update",
            BulkAction::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkItemStatus {
    #[serde(rename = "_index", default)]
    pub index: Option<String>,
    #[serde(rename = "_id", default)]
    pub id: Option<DocumentId>,
    pub status: u16,
    #[serde(default)]
    pub result: Option<WriteResult>,
    #[serde(default)]
    pub error: Option<ErrorCause>,
}

/// One entry of a bulk response, keyed by the action that produced it:
/// `{"create": {"_id": "101", "status": 201, ...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkResponseItem {
    Create(BulkItemStatus),
    Index(BulkItemStatus),
    Update(BulkItemStatus),
    Delete(BulkItemStatus),
}

impl BulkResponseItem {
    pub fn action(&self) -> BulkAction {
        match self {
            BulkResponseItem::Create(_) => BulkAction::Create,
            BulkResponseItem::Index(_) => BulkAction::Index,
            BulkResponseItem::Update(_) => BulkAction::Update,
            BulkResponseItem::Delete(_) => BulkAction::Delete,
        }
    }

    pub fn status(&self) -> &BulkItemStatus {
        match self {
            BulkResponseItem::Create(s)
            | BulkResponseItem::Index(s)
            | BulkResponseItem::Update(s)
            | BulkResponseItem::Delete(s) => s,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.status().id.as_deref()
    }

    pub fn is_success(&self) -> bool {
        let status = self.status();
        status.error.is_none() && (200..300).contains(&status.status)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkResponse {
    pub took: u64,
    pub errors: bool,
    pub items: Vec<BulkResponseItem>,
}

impl BulkResponse {
    pub fn failed_items(&self) -> impl Iterator<Item = &BulkResponseItem> {
        self.items.iter().filter(|item| !item.is_success())
    }

    pub fn item_ids(&self) -> Vec<&str> {
        self.items.iter().filter_map(BulkResponseItem::id).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalHits {
    pub value: u64,
    pub relation: String,
}

/// A single search hit. `score` is `None` when sorting by field without
/// `track_scores`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit<T> {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default = "Option::default")]
    pub source: Option<T>,
    #[serde(default)]
    pub sort: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitsMetadata<T> {
    #[serde(default)]
    pub total: Option<TotalHits>,
    #[serde(default)]
    pub max_score: Option<f64>,
    pub hits: Vec<Hit<T>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse<T> {
    pub took: u64,
    pub timed_out: bool,
    pub hits: HitsMetadata<T>,
}

impl<T> SearchResponse<T> {
    pub fn sources(&self) -> impl Iterator<Item = &T> {
        self.hits.hits.iter().filter_map(|h| h.source.as_ref())
    }
}

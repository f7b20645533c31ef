use super::serialize_field_keyed;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Which value of an array field a document is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    Min,
    Max,
    Sum,
    Avg,
    Median,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortOptions {
    pub field: String,
    pub order: SortOrder,
    pub mode: Option<SortMode>,
}

impl SortOptions {
    pub fn asc(field: impl Into<String>) -> Self {
        SortOptions {
            field: field.into(),
            order: SortOrder::Asc,
            mode: None,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        SortOptions {
            field: field.into(),
            order: SortOrder::Desc,
            mode: None,
        }
    }

    pub fn mode(mut self, mode: SortMode) -> Self {
        self.mode = Some(mode);
        self
    }
}

#[derive(Serialize)]
struct SortBody {
    order: SortOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<SortMode>,
}

impl Serialize for SortOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = SortBody {
            order: self.order,
            mode: self.mode,
        };
        serialize_field_keyed(serializer, &self.field, &body)
    }
}

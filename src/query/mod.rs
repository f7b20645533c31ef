//! Typed query DSL.
//!
//! Every type here serializes to the engine's JSON request body, e.g.
//! `Query::term("grade", 3)` becomes `{"term": {"grade": {"value": 3}}}`.
//! Nothing is evaluated locally.

pub mod compound;
pub mod function_score;
pub mod request;
pub mod sort;

pub use compound::BoolQuery;
pub use function_score::{
    BoostMode, DecayFunction, DecayPlacement, FieldValueFactor, FieldValueFactorModifier,
    FunctionScore, FunctionScoreQuery, MultiValueMode, ScoreFunction, ScoreMode,
};
pub use request::SearchRequest;
pub use sort::{SortMode, SortOptions, SortOrder};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Term(TermQuery),
    Terms(TermsQuery),
    Range(RangeQuery),
    Match(MatchQuery),
    Bool(BoolQuery),
    MatchAll,
    FunctionScore(Box<FunctionScoreQuery>),
}

impl Query {
    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::Term(TermQuery {
            field: field.into(),
            value: value.into(),
            boost: None,
        })
    }

    pub fn terms<V: Into<Value>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Query::Terms(TermsQuery {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    /// Analyzed full-text match; tokens are OR-ed unless an operator is set.
    pub fn match_text(field: impl Into<String>, query: impl Into<String>) -> Self {
        Query::Match(MatchQuery {
            field: field.into(),
            query: query.into(),
            operator: None,
        })
    }

    pub fn match_all() -> Self {
        Query::MatchAll
    }
}

impl From<RangeQuery> for Query {
    fn from(q: RangeQuery) -> Self {
        Query::Range(q)
    }
}

impl From<BoolQuery> for Query {
    fn from(q: BoolQuery) -> Self {
        Query::Bool(q)
    }
}

impl From<FunctionScoreQuery> for Query {
    fn from(q: FunctionScoreQuery) -> Self {
        Query::FunctionScore(Box::new(q))
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Query::Term(q) => map.serialize_entry("term", q)?,
            Query::Terms(q) => map.serialize_entry("terms", q)?,
            Query::Range(q) => map.serialize_entry("range", q)?,
            Query::Match(q) => map.serialize_entry("match", q)?,
            Query::Bool(q) => map.serialize_entry("bool", q)?,
            Query::MatchAll => map.serialize_entry("match_all", &serde_json::Map::new())?,
            Query::FunctionScore(q) => map.serialize_entry("function_score", q)?,
        }
        map.end()
    }
}

/// Serialize `{field: body}`, the shape shared by all field-level queries.
pub(crate) fn serialize_field_keyed<S, B>(
    serializer: S,
    field: &str,
    body: &B,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    B: Serialize + ?Sized,
{
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry(field, body)?;
    map.end()
}

/// Exact match against an indexed token.
#[derive(Debug, Clone, PartialEq)]
pub struct TermQuery {
    pub field: String,
    pub value: Value,
    pub boost: Option<f64>,
}

#[derive(Serialize)]
struct TermBody<'a> {
    value: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    boost: Option<f64>,
}

impl Serialize for TermQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = TermBody {
            value: &self.value,
            boost: self.boost,
        };
        serialize_field_keyed(serializer, &self.field, &body)
    }
}

/// Matches when the field holds any of the listed values.
#[derive(Debug, Clone, PartialEq)]
pub struct TermsQuery {
    pub field: String,
    pub values: Vec<Value>,
}

impl Serialize for TermsQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_field_keyed(serializer, &self.field, &self.values)
    }
}

/// Bounds are JSON values so the same type covers numbers, date strings and
/// epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RangeBounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeQuery {
    pub field: String,
    pub bounds: RangeBounds,
}

impl RangeQuery {
    pub fn new(field: impl Into<String>) -> Self {
        RangeQuery {
            field: field.into(),
            bounds: RangeBounds::default(),
        }
    }

    pub fn gte(mut self, v: impl Into<Value>) -> Self {
        self.bounds.gte = Some(v.into());
        self
    }

    pub fn gt(mut self, v: impl Into<Value>) -> Self {
        self.bounds.gt = Some(v.into());
        self
    }

    pub fn lte(mut self, v: impl Into<Value>) -> Self {
        self.bounds.lte = Some(v.into());
        self
    }

    pub fn lt(mut self, v: impl Into<Value>) -> Self {
        self.bounds.lt = Some(v.into());
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.bounds.format = Some(format.into());
        self
    }
}

impl Serialize for RangeQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_field_keyed(serializer, &self.field, &self.bounds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Or,
    And,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchQuery {
    pub field: String,
    pub query: String,
    pub operator: Option<Operator>,
}

#[derive(Serialize)]
struct MatchBody<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    operator: Option<Operator>,
}

impl Serialize for MatchQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = MatchBody {
            query: &self.query,
            operator: self.operator,
        };
        serialize_field_keyed(serializer, &self.field, &body)
    }
}

use super::{serialize_field_keyed, Query};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// How the scores of the matching functions are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreMode {
    Multiply,
    Sum,
    Avg,
    First,
    Max,
    Min,
}

/// How the combined function score is merged with the query score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoostMode {
    Multiply,
    Replace,
    Sum,
    Avg,
    Max,
    Min,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldValueFactorModifier {
    None,
    Log,
    Log1p,
    Log2p,
    Ln,
    Ln1p,
    Ln2p,
    Square,
    Sqrt,
    Reciprocal,
}

/// `score = modifier(factor * doc[field])`, with `missing` substituted when
/// the document has no value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValueFactor {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier: Option<FieldValueFactorModifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<f64>,
}

impl FieldValueFactor {
    pub fn new(field: impl Into<String>) -> Self {
        FieldValueFactor {
            field: field.into(),
            factor: None,
            modifier: None,
            missing: None,
        }
    }

    pub fn factor(mut self, factor: f64) -> Self {
        self.factor = Some(factor);
        self
    }

    pub fn modifier(mut self, modifier: FieldValueFactorModifier) -> Self {
        self.modifier = Some(modifier);
        self
    }

    pub fn missing(mut self, missing: f64) -> Self {
        self.missing = Some(missing);
        self
    }
}

/// Where a decay curve sits. `origin`, `scale` and `offset` are plain numbers
/// for numeric fields and may be time values (`"90d"`) or epoch millis for
/// date fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecayPlacement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Value>,
    pub scale: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decay: Option<f64>,
}

impl DecayPlacement {
    pub fn new(scale: impl Into<Value>) -> Self {
        DecayPlacement {
            origin: None,
            scale: scale.into(),
            offset: None,
            decay: None,
        }
    }

    pub fn origin(mut self, origin: impl Into<Value>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn offset(mut self, offset: impl Into<Value>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    pub fn decay(mut self, decay: f64) -> Self {
        self.decay = Some(decay);
        self
    }
}

/// Which value of a multi-valued field the decay is computed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiValueMode {
    Min,
    Max,
    Avg,
    Sum,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecayFunction {
    pub field: String,
    pub placement: DecayPlacement,
    pub multi_value_mode: Option<MultiValueMode>,
}

impl DecayFunction {
    pub fn new(field: impl Into<String>, placement: DecayPlacement) -> Self {
        DecayFunction {
            field: field.into(),
            placement,
            multi_value_mode: None,
        }
    }
}

impl Serialize for DecayFunction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.multi_value_mode {
            None => serialize_field_keyed(serializer, &self.field, &self.placement),
            Some(mode) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(&self.field, &self.placement)?;
                map.serialize_entry("multi_value_mode", &mode)?;
                map.end()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScoreFunction {
    FieldValueFactor(FieldValueFactor),
    Gauss(DecayFunction),
    Exp(DecayFunction),
    Linear(DecayFunction),
}

impl ScoreFunction {
    fn key(&self) -> &'static str {
        match self {
            ScoreFunction::FieldValueFactor(_) => "field_value_factor",
            ScoreFunction::Gauss(_) => "gauss",
            ScoreFunction::Exp(_) => "exp",
            ScoreFunction::Linear(_) => "linear",
        }
    }
}

/// One entry of `functions`: an optional filter restricting which documents
/// it applies to, an optional weight, and an optional scoring function. A
/// filter with only a weight scores every matching document `weight`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionScore {
    pub filter: Option<Query>,
    pub weight: Option<f64>,
    pub function: Option<ScoreFunction>,
}

impl FunctionScore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, q: impl Into<Query>) -> Self {
        self.filter = Some(q.into());
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn function(mut self, function: ScoreFunction) -> Self {
        self.function = Some(function);
        self
    }
}

impl From<ScoreFunction> for FunctionScore {
    fn from(function: ScoreFunction) -> Self {
        FunctionScore::new().function(function)
    }
}

impl Serialize for FunctionScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(filter) = &self.filter {
            map.serialize_entry("filter", filter)?;
        }
        if let Some(weight) = self.weight {
            map.serialize_entry("weight", &weight)?;
        }
        if let Some(function) = &self.function {
            match function {
                ScoreFunction::FieldValueFactor(fvf) => {
                    map.serialize_entry(function.key(), fvf)?
                }
                ScoreFunction::Gauss(decay)
                | ScoreFunction::Exp(decay)
                | ScoreFunction::Linear(decay) => map.serialize_entry(function.key(), decay)?,
            }
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FunctionScoreQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Box<Query>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<FunctionScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_mode: Option<ScoreMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boost_mode: Option<BoostMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_boost: Option<f64>,
}

impl FunctionScoreQuery {
    pub fn new(query: impl Into<Query>) -> Self {
        FunctionScoreQuery {
            query: Some(Box::new(query.into())),
            ..Default::default()
        }
    }

    pub fn functions(mut self, functions: impl IntoIterator<Item = FunctionScore>) -> Self {
        self.functions.extend(functions);
        self
    }

    pub fn score_mode(mut self, mode: ScoreMode) -> Self {
        self.score_mode = Some(mode);
        self
    }

    pub fn boost_mode(mut self, mode: BoostMode) -> Self {
        self.boost_mode = Some(mode);
        self
    }

    pub fn max_boost(mut self, max_boost: f64) -> Self {
        self.max_boost = Some(max_boost);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_value_factor_shape() {
        let f: FunctionScore = ScoreFunction::FieldValueFactor(
            FieldValueFactor::new("grade")
                .factor(0.5)
                .modifier(FieldValueFactorModifier::Square)
                .missing(0.0),
        )
        .into();

        assert_eq!(
            serde_json::to_value(&f).unwrap(),
            json!({"field_value_factor": {
                "field": "grade", "factor": 0.5, "modifier": "square", "missing": 0.0
            }})
        );
    }

    #[test]
    fn test_filter_weight_shape() {
        let f = FunctionScore::new()
            .filter(Query::term("courses.name.keyword", "程式設計"))
            .weight(1.5);
        assert_eq!(
            serde_json::to_value(&f).unwrap(),
            json!({
                "filter": {"term": {"courses.name.keyword": {"value": "程式設計"}}},
                "weight": 1.5
            })
        );
    }

    #[test]
    fn test_decay_shapes() {
        let placement = DecayPlacement::new("270d")
            .origin(1658592000000_i64)
            .offset("90d")
            .decay(0.5);
        let gauss: FunctionScore =
            ScoreFunction::Gauss(DecayFunction::new("englishIssuedDate", placement.clone())).into();
        assert_eq!(
            serde_json::to_value(&gauss).unwrap(),
            json!({"gauss": {"englishIssuedDate": {
                "origin": 1658592000000_i64, "scale": "270d", "offset": "90d", "decay": 0.5
            }}})
        );

        let mut decay = DecayFunction::new("courses.point", DecayPlacement::new(10).origin(100));
        decay.multi_value_mode = Some(MultiValueMode::Max);
        let linear: FunctionScore = ScoreFunction::Linear(decay).into();
        assert_eq!(
            serde_json::to_value(&linear).unwrap(),
            json!({"linear": {
                "courses.point": {"origin": 100, "scale": 10},
                "multi_value_mode": "max"
            }})
        );

        let exp: FunctionScore =
            ScoreFunction::Exp(DecayFunction::new("conductScore", DecayPlacement::new(5))).into();
        assert_eq!(
            serde_json::to_value(&exp).unwrap(),
            json!({"exp": {"conductScore": {"scale": 5}}})
        );
    }

    #[test]
    fn test_function_score_query_shape() {
        let q: Query = FunctionScoreQuery::new(Query::match_all())
            .functions([FunctionScore::new()
                .filter(Query::term("departments.keyword", "財務金融"))
                .weight(3.0)])
            .score_mode(ScoreMode::Sum)
            .boost_mode(BoostMode::Replace)
            .max_boost(100.0)
            .into();

        assert_eq!(
            serde_json::to_value(&q).unwrap(),
            json!({"function_score": {
                "query": {"match_all": {}},
                "functions": [{
                    "filter": {"term": {"departments.keyword": {"value": "財務金融"}}},
                    "weight": 3.0
                }],
                "score_mode": "sum",
                "boost_mode": "replace",
                "max_boost": 100.0
            }})
        );
    }
}

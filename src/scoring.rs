//! Function-score arithmetic.
//!
//! These mirror what the engine computes for `function_score` so expected
//! scores can be derived from fixture values instead of hard-coded.

use crate::error::{Result, SearchError};
use crate::query::{BoostMode, DecayPlacement, FieldValueFactorModifier, ScoreMode};
use serde_json::Value;

const DEFAULT_DECAY: f64 = 0.5;

const MS_PER_SECOND: f64 = 1_000.0;
const MS_PER_MINUTE: f64 = 60.0 * MS_PER_SECOND;
const MS_PER_HOUR: f64 = 60.0 * MS_PER_MINUTE;
const MS_PER_DAY: f64 = 24.0 * MS_PER_HOUR;

fn excess(distance: f64, offset: f64) -> f64 {
    (distance.abs() - offset).max(0.0)
}

/// `exp(max(0, |d| - offset)^2 * ln(decay) / scale^2)`
pub fn gauss(distance: f64, offset: f64, scale: f64, decay: f64) -> f64 {
    let x = excess(distance, offset);
    (x * x * decay.ln() / (scale * scale)).exp()
}

/// `exp(ln(decay) / scale * max(0, |d| - offset))`
pub fn exp_decay(distance: f64, offset: f64, scale: f64, decay: f64) -> f64 {
    (decay.ln() / scale * excess(distance, offset)).exp()
}

/// `max(0, (s - max(0, |d| - offset)) / s)` with `s = scale / (1 - decay)`
pub fn linear(distance: f64, offset: f64, scale: f64, decay: f64) -> f64 {
    let s = scale / (1.0 - decay);
    ((s - excess(distance, offset)) / s).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecayKind {
    Gauss,
    Exp,
    Linear,
}

impl DecayKind {
    pub fn apply(&self, distance: f64, offset: f64, scale: f64, decay: f64) -> f64 {
        match self {
            DecayKind::Gauss => gauss(distance, offset, scale, decay),
            DecayKind::Exp => exp_decay(distance, offset, scale, decay),
            DecayKind::Linear => linear(distance, offset, scale, decay),
        }
    }
}

/// Parse a time value such as `"90d"` or `"12h"` into milliseconds.
/// A bare number is taken as milliseconds.
pub fn parse_time_value(s: &str) -> Result<f64> {
    let s = s.trim();
    let invalid = || SearchError::InvalidTimeValue(s.to_string());

    const UNITS: [(&str, f64); 7] = [
        ("nanos", 1e-6),
        ("micros", 1e-3),
        ("ms", 1.0),
        ("s", MS_PER_SECOND),
        ("m", MS_PER_MINUTE),
        ("h", MS_PER_HOUR),
        ("d", MS_PER_DAY),
    ];

    for (suffix, multiplier) in UNITS {
        if let Some(number) = s.strip_suffix(suffix) {
            let n: f64 = number.trim().parse().map_err(|_| invalid())?;
            return Ok(n * multiplier);
        }
    }

    s.parse::<f64>().map_err(|_| invalid())
}

/// Epoch millis of an RFC 3339 timestamp or a `yyyy-MM-dd` date (midnight
/// UTC), the two shapes `strict_date_optional_time` takes for origins.
fn date_millis(s: &str) -> Option<f64> {
    if let Ok(d) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(d.timestamp_millis() as f64);
    }
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis() as f64)
}

/// Numeric reading of a placement value: numbers as-is, strings as time
/// values or dates (epoch millis).
pub fn placement_value(v: &Value) -> Result<f64> {
    match v {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| SearchError::InvalidTimeValue(n.to_string())),
        Value::String(s) => parse_time_value(s).or_else(|e| date_millis(s.trim()).ok_or(e)),
        other => Err(SearchError::InvalidTimeValue(other.to_string())),
    }
}

/// Decay score of `value` under `placement`. `origin` is required; `offset`
/// defaults to 0 and `decay` to 0.5.
pub fn decay_score(kind: DecayKind, placement: &DecayPlacement, value: f64) -> Result<f64> {
    let origin = placement
        .origin
        .as_ref()
        .ok_or_else(|| SearchError::InvalidTimeValue("missing origin".to_string()))
        .and_then(placement_value)?;
    let scale = placement_value(&placement.scale)?;
    let offset = match &placement.offset {
        Some(v) => placement_value(v)?,
        None => 0.0,
    };
    let decay = placement.decay.unwrap_or(DEFAULT_DECAY);

    Ok(kind.apply(value - origin, offset, scale, decay))
}

impl FieldValueFactorModifier {
    pub fn apply(&self, v: f64) -> f64 {
        match self {
            FieldValueFactorModifier::None => v,
            FieldValueFactorModifier::Log => v.log10(),
            FieldValueFactorModifier::Log1p => (v + 1.0).log10(),
            FieldValueFactorModifier::Log2p => (v + 2.0).log10(),
            FieldValueFactorModifier::Ln => v.ln(),
            FieldValueFactorModifier::Ln1p => v.ln_1p(),
            FieldValueFactorModifier::Ln2p => (v + 2.0).ln(),
            FieldValueFactorModifier::Square => v * v,
            FieldValueFactorModifier::Sqrt => v.sqrt(),
            FieldValueFactorModifier::Reciprocal => 1.0 / v,
        }
    }
}

/// `modifier(factor * value)`, substituting `missing` for an absent value.
/// Returns `None` when the value is absent and no `missing` is configured.
pub fn field_value_factor(
    value: Option<f64>,
    factor: f64,
    modifier: FieldValueFactorModifier,
    missing: Option<f64>,
) -> Option<f64> {
    value
        .or(missing)
        .map(|v| modifier.apply(v * factor))
}

/// A matching function's raw score and its weight (1.0 when unset).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionScoreTerm {
    pub score: f64,
    pub weight: f64,
}

impl FunctionScoreTerm {
    pub fn new(score: f64, weight: f64) -> Self {
        FunctionScoreTerm { score, weight }
    }

    /// A filter+weight function with no scoring function scores `weight`.
    pub fn weight_only(weight: f64) -> Self {
        FunctionScoreTerm { score: 1.0, weight }
    }

    pub fn weighted(&self) -> f64 {
        self.score * self.weight
    }
}

impl ScoreMode {
    /// Combine the terms of the functions that matched a document. With no
    /// matching function the result is 1.0.
    pub fn combine(&self, terms: &[FunctionScoreTerm]) -> f64 {
        if terms.is_empty() {
            return 1.0;
        }
        let weighted = terms.iter().map(FunctionScoreTerm::weighted);
        match self {
            ScoreMode::First => terms[0].weighted(),
            ScoreMode::Multiply => weighted.product(),
            ScoreMode::Sum => weighted.sum(),
            ScoreMode::Avg => {
                let weight_sum: f64 = terms.iter().map(|t| t.weight).sum();
                if weight_sum == 0.0 {
                    1.0
                } else {
                    weighted.sum::<f64>() / weight_sum
                }
            }
            ScoreMode::Max => weighted.fold(f64::NEG_INFINITY, f64::max),
            ScoreMode::Min => weighted.fold(f64::INFINITY, f64::min),
        }
    }
}

impl BoostMode {
    pub fn apply(&self, query_score: f64, function_score: f64) -> f64 {
        match self {
            BoostMode::Multiply => query_score * function_score,
            BoostMode::Replace => function_score,
            BoostMode::Sum => query_score + function_score,
            BoostMode::Avg => (query_score + function_score) / 2.0,
            BoostMode::Max => query_score.max(function_score),
            BoostMode::Min => query_score.min(function_score),
        }
    }
}

/// Final document score: combine, cap at `max_boost`, then merge with the
/// query score.
pub fn function_score(
    query_score: f64,
    terms: &[FunctionScoreTerm],
    score_mode: ScoreMode,
    boost_mode: BoostMode,
    max_boost: f64,
) -> f64 {
    let combined = score_mode.combine(terms).min(max_boost);
    boost_mode.apply(query_score, combined)
}

use crate::types::SearchResponse;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Default score tolerance for function-score comparisons.
pub const SCORE_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdOrder {
    /// Hit ids must equal the expected sequence.
    Exact,
    /// Hit ids and expected ids must contain the same elements.
    AnyOrder,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mismatch {
    Ids {
        order: IdOrder,
        expected: Vec<String>,
        actual: Vec<String>,
    },
    MissingScore {
        id: String,
    },
    Score {
        id: String,
        expected: f64,
        actual: f64,
        tolerance: f64,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Ids {
                order,
                expected,
                actual,
            } => write!(
                f,
                "hit ids differ ({:?}): expected {:?}, got {:?}",
                order, expected, actual
            ),
            Mismatch::MissingScore { id } => write!(f, "no scored hit for document {}", id),
            Mismatch::Score {
                id,
                expected,
                actual,
                tolerance,
            } => write!(
                f,
                "score for {} is {}, expected {} (±{})",
                id, actual, expected, tolerance
            ),
        }
    }
}

impl std::error::Error for Mismatch {}

pub fn hit_ids<T>(res: &SearchResponse<T>) -> Vec<&str> {
    res.hits.hits.iter().map(|h| h.id.as_str()).collect()
}

pub fn ids_match(order: IdOrder, actual: &[&str], expected: &[&str]) -> bool {
    match order {
        IdOrder::Exact => actual == expected,
        IdOrder::AnyOrder => {
            let a: BTreeSet<&str> = actual.iter().copied().collect();
            let e: BTreeSet<&str> = expected.iter().copied().collect();
            a == e
        }
    }
}

pub fn compare_ids<T>(
    order: IdOrder,
    res: &SearchResponse<T>,
    expected: &[&str],
) -> Result<(), Mismatch> {
    let actual = hit_ids(res);
    if ids_match(order, &actual, expected) {
        Ok(())
    } else {
        Err(Mismatch::Ids {
            order,
            expected: expected.iter().map(|s| s.to_string()).collect(),
            actual: actual.iter().map(|s| s.to_string()).collect(),
        })
    }
}

/// Score per hit id; hits without a score are left out.
pub fn score_map<T>(res: &SearchResponse<T>) -> HashMap<String, f64> {
    res.hits
        .hits
        .iter()
        .filter_map(|h| h.score.map(|s| (h.id.clone(), s)))
        .collect()
}

/// Check every expected id has a score within `tolerance`. Extra hits are
/// ignored.
pub fn scores_match(
    actual: &HashMap<String, f64>,
    expected: &HashMap<String, f64>,
    tolerance: f64,
) -> Result<(), Mismatch> {
    let mut ids: Vec<&String> = expected.keys().collect();
    ids.sort();

    for id in ids {
        let want = expected[id];
        let got = *actual
            .get(id)
            .ok_or_else(|| Mismatch::MissingScore { id: id.clone() })?;
        if (got - want).abs() > tolerance {
            return Err(Mismatch::Score {
                id: id.clone(),
                expected: want,
                actual: got,
                tolerance,
            });
        }
    }
    Ok(())
}

pub fn compare_scores<T>(
    res: &SearchResponse<T>,
    expected: &HashMap<String, f64>,
    tolerance: f64,
) -> Result<(), Mismatch> {
    scores_match(&score_map(res), expected, tolerance)
}

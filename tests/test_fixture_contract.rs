//! Offline checks that every scenario's expected result follows from the
//! fixture.
//!
//! Each test evaluates the scenario's predicate, ordering or score formula
//! directly over `students.json` and feeds the outcome through
//! `Scenario::verify`, so a fixture edit that would break a live run fails
//! here first.

use chrono::{TimeZone, Utc};
use serde_json::json;
use std::collections::BTreeSet;
use student_search::query::{BoostMode, FieldValueFactorModifier, ScoreMode};
use student_search::scoring::{self, DecayKind, FunctionScoreTerm};
use student_search::{
    scenarios, Hit, HitsMetadata, Scenario, SearchResponse, Student, TotalHits, Visibility,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

fn response(hits: Vec<(&Student, Option<f64>)>) -> SearchResponse<Student> {
    let max_score = hits.iter().filter_map(|(_, s)| *s).fold(None, |acc: Option<f64>, s| {
        Some(acc.map_or(s, |a| a.max(s)))
    });
    SearchResponse {
        took: 0,
        timed_out: false,
        hits: HitsMetadata {
            total: Some(TotalHits {
                value: hits.len() as u64,
                relation: "eq".to_string(),
            }),
            max_score,
            hits: hits
                .into_iter()
                .map(|(s, score)| Hit {
                    index: "student".to_string(),
                    id: s.id.clone(),
                    score,
                    source: Some(s.clone()),
                    sort: vec![],
                })
                .collect(),
        },
    }
}

fn matching<'a>(
    students: &'a [Student],
    pred: impl Fn(&Student) -> bool,
) -> Vec<(&'a Student, Option<f64>)> {
    students.iter().filter(|s| pred(s)).map(|s| (s, None)).collect()
}

fn scored<'a>(
    students: &'a [Student],
    score: impl Fn(&Student) -> f64,
) -> Vec<(&'a Student, Option<f64>)> {
    let mut hits: Vec<_> = students.iter().map(|s| (s, Some(score(s)))).collect();
    hits.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    hits
}

fn assert_verifies(scenario: Scenario, hits: Vec<(&Student, Option<f64>)>) {
    let res = response(hits);
    if let Err(mismatch) = scenario.verify(&res) {
        panic!("{}: {}", scenario.name, mismatch);
    }
}

/// Lowercased word tokens, roughly what the standard analyzer emits for
/// ASCII text.
fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn replace_sum(terms: &[FunctionScoreTerm]) -> f64 {
    scoring::function_score(
        1.0,
        terms,
        ScoreMode::Sum,
        BoostMode::Replace,
        scenarios::FUNCTION_SCORE_MAX_BOOST,
    )
}

#[test]
fn test_fixture_shape() {
    let students = common::students();
    let names: Vec<&str> = students.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Dora", "Mario", "Vincent", "Winnie"]);

    let ids: Vec<&str> = students.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["101", "102", "103", "104"]);
    let unique: BTreeSet<&str> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());
}

#[test]
fn test_exact_term() {
    let students = common::students();
    assert_verifies(scenarios::exact_term(), matching(&students, |s| s.grade == 3));
}

#[test]
fn test_multi_value_terms() {
    let students = common::students();
    let hits = matching(&students, |s| {
        s.in_department("資訊管理") || s.in_department("企業管理")
    });
    assert_verifies(scenarios::multi_value_terms(), hits);
}

#[test]
fn test_numeric_range() {
    let students = common::students();
    let hits = matching(&students, |s| (2..=4).contains(&s.grade));
    assert_verifies(scenarios::numeric_range(), hits);
}

#[test]
fn test_date_range() {
    let students = common::students();
    let from = Utc.with_ymd_and_hms(2021, 7, 1, 0, 0, 0).unwrap();
    let to = Utc.with_ymd_and_hms(2022, 7, 1, 0, 0, 0).unwrap();
    let hits = matching(&students, |s| {
        s.english_issued_date >= from && s.english_issued_date < to
    });
    assert_verifies(scenarios::date_range(), hits);
}

#[test]
fn test_match_introduction() {
    let students = common::students();
    let query = tokens("company career");
    let hits = matching(&students, |s| {
        tokens(&s.introduction).iter().any(|t| query.contains(t))
    });
    assert_verifies(scenarios::match_introduction(), hits);
}

#[test]
fn test_complex_bool() {
    let students = common::students();
    let hits = matching(&students, |s| s.grade < 4 && s.job.primary != Some(false));
    assert_verifies(scenarios::complex_bool(), hits);
}

#[test]
fn test_bool_depends_on_primary_flags() {
    // Every grade<4 student other than 103 must be excluded by must_not.
    let students = common::students();
    for s in students.iter().filter(|s| s.grade < 4 && s.id != "103") {
        assert_eq!(s.job.primary, Some(false), "student {}", s.id);
    }
}

#[test]
fn test_sort_by_course_point_then_name() {
    let students = common::students();
    let mut sorted: Vec<&Student> = students.iter().collect();
    sorted.sort_by(|a, b| {
        b.max_course_point()
            .cmp(&a.max_course_point())
            .then_with(|| a.name.cmp(&b.name))
    });
    let hits = sorted.into_iter().map(|s| (s, None)).collect();
    assert_verifies(scenarios::sort_by_course_point_then_name(), hits);
}

#[test]
fn test_sort_tie_is_broken_by_name() {
    let dora = common::student("101");
    let winnie = common::student("104");
    assert_eq!(dora.max_course_point(), winnie.max_course_point());
    assert!(dora.name < winnie.name);
}

/// Serve the fixture sorted ascending on `key` the way the engine answers a
/// field sort: no score, the key in `sort`.
fn sorted_response(key: fn(&Student) -> i64) -> serde_json::Value {
    let mut students = common::students();
    students.sort_by_key(|s| (key(s), s.id.clone()));
    let hits: Vec<_> = students
        .iter()
        .map(|s| {
            json!({
                "_index": "student",
                "_id": s.id,
                "_score": null,
                "_source": serde_json::to_value(s).unwrap(),
                "sort": [key(s)]
            })
        })
        .collect();
    json!({
        "took": 1,
        "timed_out": false,
        "hits": {
            "total": {"value": hits.len(), "relation": "eq"},
            "max_score": null,
            "hits": hits
        }
    })
}

#[tokio::test]
async fn test_ascending_sort_is_non_decreasing() {
    for (field, key) in common::ASCENDING_SORT_FIELDS {
        let server = MockServer::start().await;
        let request = common::match_all_ascending(field);
        Mock::given(method("POST"))
            .and(path("/student/_search"))
            .and(body_json(json!({
                "query": {"match_all": {}},
                "sort": [{field: {"order": "asc"}}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(sorted_response(key)))
            .expect(1)
            .mount(&server)
            .await;

        let index = common::mock_index(&server, Visibility::Refresh);
        let res = index.search(&request).await.unwrap();

        assert_eq!(res.hits.hits.len(), 4, "{field}");
        let keys = common::primary_sort_keys(&res);
        common::assert_non_decreasing(field, &keys);

        let from_sources: Vec<f64> = res.sources().map(|s| key(s) as f64).collect();
        assert_eq!(keys, from_sources, "{field}: sort values disagree with sources");
    }
}

#[test]
fn test_paging_by_conduct_score() {
    let students = common::students();
    let mut sorted: Vec<&Student> = students.iter().collect();
    sorted.sort_by(|a, b| b.conduct_score.cmp(&a.conduct_score));
    let hits = sorted.into_iter().take(2).map(|s| (s, None)).collect();
    assert_verifies(scenarios::paging_by_conduct_score(), hits);
}

#[test]
fn test_field_value_factor_grade() {
    let students = common::students();
    let hits = scored(&students, |s| {
        let score = scoring::field_value_factor(
            Some(s.grade as f64),
            0.5,
            FieldValueFactorModifier::Square,
            Some(0.0),
        )
        .unwrap();
        replace_sum(&[FunctionScoreTerm::new(score, 1.0)])
    });
    assert_verifies(scenarios::field_value_factor_grade(), hits);
}

#[test]
fn test_filter_and_weight() {
    let students = common::students();
    let hits = scored(&students, |s| {
        let mut terms = Vec::new();
        if s.in_department("財務金融") {
            terms.push(FunctionScoreTerm::weight_only(3.0));
        }
        if s.takes_course("程式設計") {
            terms.push(FunctionScoreTerm::weight_only(1.5));
        }
        terms.push(FunctionScoreTerm::new(s.grade as f64, 0.5));
        replace_sum(&terms)
    });
    assert_verifies(scenarios::filter_and_weight(), hits);
}

#[test]
fn test_gauss_conduct_score() {
    let students = common::students();
    let placement = scenarios::conduct_score_placement();
    let hits = scored(&students, |s| {
        let score =
            scoring::decay_score(DecayKind::Gauss, &placement, s.conduct_score as f64).unwrap();
        replace_sum(&[FunctionScoreTerm::new(score, 1.0)])
    });
    assert_verifies(scenarios::gauss_conduct_score(), hits);
}

#[test]
fn test_gauss_english_issued_date() {
    let students = common::students();
    let placement = scenarios::english_issued_date_placement();
    let hits = scored(&students, |s| {
        let millis = s.english_issued_date.timestamp_millis() as f64;
        let score = scoring::decay_score(DecayKind::Gauss, &placement, millis).unwrap();
        replace_sum(&[FunctionScoreTerm::new(score, 1.0)])
    });
    assert_verifies(scenarios::gauss_english_issued_date(), hits);
}

#[test]
fn test_every_scenario_has_a_contract() {
    // Keep this list in step with the tests above.
    let covered = [
        "term_grade",
        "terms_departments",
        "range_grade",
        "range_english_issued_date",
        "match_introduction",
        "bool_grade_job_course",
        "sort_course_point_name",
        "paging_conduct_score",
        "field_value_factor_grade",
        "filter_and_weight",
        "gauss_conduct_score",
        "gauss_english_issued_date",
    ];
    let names: Vec<&str> = scenarios::all().iter().map(|s| s.name).collect();
    assert_eq!(names, covered);
}

//! Named query scenarios over the student fixture, each with the result it
//! must produce.

use crate::query::{
    BoolQuery, BoostMode, DecayFunction, DecayPlacement, FieldValueFactor,
    FieldValueFactorModifier, FunctionScore, FunctionScoreQuery, Query, RangeQuery, ScoreFunction,
    ScoreMode, SearchRequest, SortMode, SortOptions,
};
use crate::results::{self, IdOrder, Mismatch, SCORE_TOLERANCE};
use crate::types::SearchResponse;
use std::collections::HashMap;

/// 2022-07-24T00:00:00+08:00.
pub const ENGLISH_ISSUED_ORIGIN_MS: i64 = 1_658_592_000_000;

pub const FUNCTION_SCORE_MAX_BOOST: f64 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    Ids {
        order: IdOrder,
        ids: Vec<&'static str>,
    },
    Scores {
        scores: Vec<(&'static str, f64)>,
        tolerance: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: &'static str,
    pub request: SearchRequest,
    pub expectation: Expectation,
}

impl Scenario {
    fn ids(name: &'static str, request: SearchRequest, order: IdOrder, ids: &[&'static str]) -> Self {
        Scenario {
            name,
            request,
            expectation: Expectation::Ids {
                order,
                ids: ids.to_vec(),
            },
        }
    }

    fn scores(name: &'static str, request: SearchRequest, scores: &[(&'static str, f64)]) -> Self {
        Scenario {
            name,
            request,
            expectation: Expectation::Scores {
                scores: scores.to_vec(),
                tolerance: SCORE_TOLERANCE,
            },
        }
    }

    pub fn verify<T>(&self, res: &SearchResponse<T>) -> Result<(), Mismatch> {
        match &self.expectation {
            Expectation::Ids { order, ids } => results::compare_ids(*order, res, ids),
            Expectation::Scores { scores, tolerance } => {
                let expected: HashMap<String, f64> =
                    scores.iter().map(|(id, s)| (id.to_string(), *s)).collect();
                results::compare_scores(res, &expected, *tolerance)
            }
        }
    }
}

/// Match-all wrapped in a function score: functions summed, result replaces
/// the query score, capped at [`FUNCTION_SCORE_MAX_BOOST`].
pub fn function_score_request(functions: Vec<FunctionScore>) -> SearchRequest {
    SearchRequest::new(
        FunctionScoreQuery::new(Query::match_all())
            .functions(functions)
            .score_mode(ScoreMode::Sum)
            .boost_mode(BoostMode::Replace)
            .max_boost(FUNCTION_SCORE_MAX_BOOST),
    )
}

pub fn exact_term() -> Scenario {
    Scenario::ids(
        "term_grade",
        SearchRequest::new(Query::term("grade", 3)),
        IdOrder::AnyOrder,
        &["102"],
    )
}

pub fn multi_value_terms() -> Scenario {
    Scenario::ids(
        "terms_departments",
        SearchRequest::new(Query::terms("departments.keyword", ["資訊管理", "企業管理"])),
        IdOrder::AnyOrder,
        &["103", "104"],
    )
}

pub fn numeric_range() -> Scenario {
    Scenario::ids(
        "range_grade",
        SearchRequest::new(RangeQuery::new("grade").gte(2).lte(4)),
        IdOrder::AnyOrder,
        &["103", "101", "102"],
    )
}

pub fn date_range() -> Scenario {
    Scenario::ids(
        "range_english_issued_date",
        SearchRequest::new(
            RangeQuery::new("englishIssuedDate")
                .gte("2021-07-01")
                .lt("2022-07-01")
                .format("yyyy-MM-dd"),
        ),
        IdOrder::AnyOrder,
        &["104", "102"],
    )
}

pub fn match_introduction() -> Scenario {
    Scenario::ids(
        "match_introduction",
        SearchRequest::new(Query::match_text("introduction", "company career")),
        IdOrder::AnyOrder,
        &["103", "104"],
    )
}

/// `should` only boosts here; `must` and `must_not` decide membership.
pub fn complex_bool() -> Scenario {
    let query = BoolQuery::new()
        .must(RangeQuery::new("grade").lt(4))
        .must_not(Query::term("job.primary", false))
        .should(Query::term("courses.name.keyword", "會計學"))
        .should(Query::term("departments.keyword", "財務金融"));

    Scenario::ids(
        "bool_grade_job_course",
        SearchRequest::new(query),
        IdOrder::AnyOrder,
        &["103"],
    )
}

pub fn sort_by_course_point_then_name() -> Scenario {
    let request = SearchRequest::new(Query::match_all())
        .sort(SortOptions::desc("courses.point").mode(SortMode::Max))
        .sort(SortOptions::asc("name.keyword"));

    Scenario::ids(
        "sort_course_point_name",
        request,
        IdOrder::Exact,
        &["102", "103", "101", "104"],
    )
}

pub fn paging_by_conduct_score() -> Scenario {
    let request = SearchRequest::new(Query::match_all())
        .sort(SortOptions::desc("conductScore"))
        .page(0, 2);

    Scenario::ids("paging_conduct_score", request, IdOrder::Exact, &["103", "102"])
}

pub fn field_value_factor_grade() -> Scenario {
    let grade = ScoreFunction::FieldValueFactor(
        FieldValueFactor::new("grade")
            .factor(0.5)
            .modifier(FieldValueFactorModifier::Square)
            .missing(0.0),
    );

    Scenario::scores(
        "field_value_factor_grade",
        function_score_request(vec![grade.into()]),
        &[("101", 4.0), ("102", 2.25), ("103", 1.0), ("104", 0.25)],
    )
}

/// Filters on `departments.keyword`; the singular `department.keyword`
/// matches nothing under dynamic mapping.
pub fn filter_and_weight() -> Scenario {
    let functions = vec![
        FunctionScore::new()
            .filter(Query::term("departments.keyword", "財務金融"))
            .weight(3.0),
        FunctionScore::new()
            .filter(Query::term("courses.name.keyword", "程式設計"))
            .weight(1.5),
        FunctionScore::new()
            .function(ScoreFunction::FieldValueFactor(FieldValueFactor::new("grade")))
            .weight(0.5),
    ];

    Scenario::scores(
        "filter_and_weight",
        function_score_request(functions),
        &[("103", 5.5), ("101", 5.0), ("102", 1.5), ("104", 0.5)],
    )
}

pub fn conduct_score_placement() -> DecayPlacement {
    DecayPlacement::new(10).origin(100).offset(15).decay(0.5)
}

pub fn english_issued_date_placement() -> DecayPlacement {
    DecayPlacement::new("270d")
        .origin(ENGLISH_ISSUED_ORIGIN_MS)
        .offset("90d")
        .decay(0.5)
}

pub fn gauss_conduct_score() -> Scenario {
    let gauss = ScoreFunction::Gauss(DecayFunction::new(
        "conductScore",
        conduct_score_placement(),
    ));

    Scenario::scores(
        "gauss_conduct_score",
        function_score_request(vec![gauss.into()]),
        &[("103", 1.0), ("102", 0.9726), ("101", 0.4322), ("104", 0.2570)],
    )
}

pub fn gauss_english_issued_date() -> Scenario {
    let gauss = ScoreFunction::Gauss(DecayFunction::new(
        "englishIssuedDate",
        english_issued_date_placement(),
    ));

    Scenario::scores(
        "gauss_english_issued_date",
        function_score_request(vec![gauss.into()]),
        &[("102", 1.0), ("104", 0.8195), ("101", 0.2378), ("103", 0.1132)],
    )
}

pub fn all() -> Vec<Scenario> {
    vec![
        exact_term(),
        multi_value_terms(),
        numeric_range(),
        date_range(),
        match_introduction(),
        complex_bool(),
        sort_by_course_point_then_name(),
        paging_by_conduct_score(),
        field_value_factor_grade(),
        filter_and_weight(),
        gauss_conduct_score(),
        gauss_english_issued_date(),
    ]
}

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use student_search::query::{Query, SearchRequest, SortOptions};
use student_search::{fixture, ClientConfig, DocumentIndex, SearchResponse, Student, Visibility};
use wiremock::MockServer;

fn manifest_dir() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
}

pub fn init() {
    let _ = dotenv::dotenv();
    student_search::init_tracing();
}

pub fn students() -> Vec<Student> {
    let path: PathBuf = manifest_dir().join(fixture::STUDENTS_FILE);
    fixture::load_students(path).unwrap()
}

pub fn student(id: &str) -> Student {
    students()
        .into_iter()
        .find(|s| s.id == id)
        .unwrap_or_else(|| panic!("no student {id} in fixture"))
}

/// Index against the engine named by `search.json` / `STUDENT_SEARCH_URL`.
pub fn live_index() -> DocumentIndex<Student> {
    init();
    let config = ClientConfig::load_or_default(manifest_dir());
    DocumentIndex::new(config).unwrap()
}

/// Index whose client talks to a wiremock server.
pub fn mock_index(server: &MockServer, visibility: Visibility) -> DocumentIndex<Student> {
    let config = ClientConfig::default()
        .with_base_url(server.uri())
        .with_index("student")
        .with_visibility(visibility);
    DocumentIndex::new(config).unwrap()
}

fn conduct_score(s: &Student) -> i64 {
    s.conduct_score
}

fn grade(s: &Student) -> i64 {
    s.grade
}

/// Numeric fields a match-all search is sorted on ascending, with the
/// fixture accessor for each.
pub const ASCENDING_SORT_FIELDS: [(&str, fn(&Student) -> i64); 2] =
    [("conductScore", conduct_score), ("grade", grade)];

pub fn match_all_ascending(field: &str) -> SearchRequest {
    SearchRequest::new(Query::match_all()).sort(SortOptions::asc(field))
}

/// First `sort` value of every hit, in hit order.
pub fn primary_sort_keys<T>(res: &SearchResponse<T>) -> Vec<f64> {
    res.hits
        .hits
        .iter()
        .map(|h| {
            h.sort
                .first()
                .and_then(serde_json::Value::as_f64)
                .unwrap_or_else(|| panic!("hit {} has no numeric sort value: {:?}", h.id, h.sort))
        })
        .collect()
}

pub fn assert_non_decreasing(field: &str, keys: &[f64]) {
    for pair in keys.windows(2) {
        assert!(
            pair[0] <= pair[1],
            "{field} ascending: {} came before {} in {keys:?}",
            pair[0],
            pair[1]
        );
    }
}

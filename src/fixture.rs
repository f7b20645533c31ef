use crate::error::{Result, SearchError};
use crate::types::Student;
use std::path::Path;

/// Fixture file, resolved against the working directory.
pub const STUDENTS_FILE: &str = "students.json";

/// Load the student fixture from a JSON array, in file order.
///
/// Every call re-reads the file, so callers that mutate the returned records
/// always start again from the on-disk state.
pub fn load_students(path: impl AsRef<Path>) -> Result<Vec<Student>> {
    let path = path.as_ref();
    let fixture_err = |reason: String| SearchError::Fixture {
        path: path.display().to_string(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| fixture_err(e.to_string()))?;
    let students: Vec<Student> =
        serde_json::from_str(&content).map_err(|e| fixture_err(e.to_string()))?;

    tracing::debug!(path = %path.display(), count = students.len(), "Loaded fixture");
    Ok(students)
}

pub fn load_default() -> Result<Vec<Student>> {
    load_students(STUDENTS_FILE)
}

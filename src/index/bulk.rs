use crate::error::Result;
use crate::types::{BulkAction, Indexable};
use serde::Serialize;
use serde_json::json;

/// Encode documents as `_bulk` NDJSON: one action line and one source line
/// per document, each terminated by `\n` (the trailing newline is required).
pub fn encode<T: Serialize + Indexable>(action: BulkAction, docs: &[T]) -> Result<String> {
    let mut body = String::new();
    for doc in docs {
        let header = json!({ action.as_str(): { "_id": doc.doc_id() } });
        body.push_str(&serde_json::to_string(&header)?);
        body.push('\n');
        if action != BulkAction::Delete {
            body.push_str(&serde_json::to_string(doc)?);
            body.push('\n');
        }
    }
    Ok(body)
}

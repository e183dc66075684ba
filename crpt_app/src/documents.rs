use std::fs;
use std::io;
use std::path::Path;

use crpt_http::Document;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentsError {
    #[error("Failed to read documents file: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse documents: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentsFile {
    Many(Vec<Document>),
    One(Box<Document>),
}

/// Parse a single document or an array of documents
pub fn parse_documents(json: &str) -> Result<Vec<Document>, DocumentsError> {
    let documents = match serde_json::from_str(json)? {
        DocumentsFile::Many(documents) => documents,
        DocumentsFile::One(document) => vec![*document],
    };
    Ok(documents)
}

/// Load documents from a JSON file
pub fn load_documents<P: AsRef<Path>>(path: P) -> Result<Vec<Document>, DocumentsError> {
    let json = fs::read_to_string(path)?;
    parse_documents(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_document() {
        let documents = parse_documents(r#"{"doc_id":"a","importRequest":true}"#).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].doc_id.as_deref(), Some("a"));
        assert!(documents[0].import_request);
    }

    #[test]
    fn test_document_array() {
        let documents = parse_documents(r#"[{"doc_id":"a"},{"doc_id":"b","products":[]}]"#).unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[1].products, Some(Vec::new()));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse_documents("[{"), Err(DocumentsError::Json(_))));
        assert!(matches!(parse_documents("42"), Err(DocumentsError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(load_documents("/nonexistent/documents.json"), Err(DocumentsError::Io(_))));
    }
}

//! Input files and response bodies

use std::path::PathBuf;

use serde_json::{Value, json};
use tempfile::TempDir;

/// API key accepted by the mock service
pub const API_KEY: &str = "01234567-89ab-cdef-0123-456789abcdef";

/// Write small placeholder files named `names` into a fresh temp dir
pub fn input_files(names: &[&str]) -> (TempDir, Vec<PathBuf>) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let paths = names
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            std::fs::write(&path, format!("contents of {name}")).expect("Failed to write input");
            path
        })
        .collect();
    (dir, paths)
}

/// A page as the service encodes it, with one text region
pub fn page_json(file_index: usize, page_number: i64, of: usize) -> Value {
    json!({
        "Error": "",
        "FileIndex": file_index,
        "PageNumber": page_number,
        "NumberOfPagesInFile": of,
        "RecognizedText": [{
            "Text": format!("file {file_index} page {page_number}"),
            "TopLeftX": 0, "TopLeftY": 0,
            "TopRightX": 100, "TopRightY": 0,
            "BottomLeftX": 0, "BottomLeftY": 20,
            "BottomRightX": 100, "BottomRightY": 20,
            "Confidence": 0.99
        }]
    })
}

/// An error placeholder page
pub fn error_page_json(file_index: usize, message: &str) -> Value {
    json!({
        "Error": message,
        "FileIndex": file_index,
        "PageNumber": 0,
        "NumberOfPagesInFile": 0,
        "RecognizedText": null
    })
}

/// Poll reply body
pub fn pages_body(pages: Vec<Value>) -> Value {
    json!({ "Pages": pages })
}

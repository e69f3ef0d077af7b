#![allow(dead_code)]

use serde_json::{json, Value};

pub const SAMPLE_DATE: &str = "2024-03-09";

/// 3x3 record with one block; clues are deliberately out of order.
pub fn sample_record(date: &str, kind: &str) -> Value {
    json!({
        "id": 41234,
        "date": date,
        "type": kind,
        "author": "Jane Doe",
        "grid": [["C", "A", "T"], ["A", ".", "O"], ["B", "E", "E"]],
        "clues": {
            "across": [
                {"position": 3, "question": "Buzzing insect (3)", "answer": "BEE"},
                {"position": 1, "question": "Feline (3)", "answer": "CAT"}
            ],
            "down": [
                {"position": 2, "question": "Digit on foot (3)", "answer": "TOE"},
                {"position": 1, "question": "Taxi (3)", "answer": "CAB"}
            ]
        },
        "specialInstructions": "",
        "summary": "A gentle start"
    })
}

/// Page state the way the site nests it.
pub fn state_with(record: Value) -> Value {
    json!({
        "crosswords": {"crossword": record},
        "page": {"title": "Crosswords"}
    })
}

/// Escape `text` as the body of a double-quoted JS string literal.
pub fn js_escape(text: &str) -> String {
    let quoted = serde_json::to_string(text).unwrap();
    quoted[1..quoted.len() - 1].to_string()
}

pub fn page_html(state: &Value) -> String {
    let literal = js_escape(&serde_json::to_string(state).unwrap());
    format!(
        "<!doctype html><html><head><title>Cryptic</title>\
         <script>window.dataLayer = [];</script>\
         <script>window.INITIAL_STATE = JSON.parse(\"{literal}\");</script>\
         </head><body><div id=\"app\"></div></body></html>"
    )
}

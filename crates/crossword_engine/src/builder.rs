use engine_logging::engine_debug;
use serde::Deserialize;
use serde_json::Value;

use crate::audit::ConversionAudit;
use crate::sanitize::TextSanitizer;
use crate::PuzzleRequest;

pub const COPYRIGHT: &str = "The Sydney Morning Herald";
pub const BLOCK: char = '.';
pub const EMPTY_CELL: char = '-';

/// The crossword record embedded in the page state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCrosswordRecord {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub author: String,
    pub grid: Vec<Vec<String>>,
    pub clues: RawClues,
    #[serde(default)]
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawClues {
    pub across: Vec<ClueRecord>,
    pub down: Vec<ClueRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClueRecord {
    /// Starting cell number, shared by both directions.
    pub position: u32,
    pub question: String,
}

/// Normalized puzzle, ready for a file writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleModel {
    pub copyright: String,
    pub title: String,
    pub author: String,
    pub width: usize,
    pub height: usize,
    pub solution: String,
    pub fill: String,
    pub clues: Vec<String>,
    pub notes: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("page state carries no crossword record")]
    MissingRecord,
    #[error("crossword record is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("record date {found} does not match requested date {expected}")]
    DateMismatch { expected: String, found: String },
    #[error("record type {found} does not match requested type {expected}")]
    TypeMismatch { expected: String, found: String },
    #[error("grid has no cells")]
    EmptyGrid,
    #[error("grid row {row} has {found} cells, expected {expected}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("grid cell ({row}, {col}) is {cell:?}, expected a single character")]
    InvalidCell { row: usize, col: usize, cell: String },
}

#[derive(Default)]
pub struct PuzzleBuilder {
    sanitizer: TextSanitizer,
}

impl PuzzleBuilder {
    pub fn new(sanitizer: TextSanitizer) -> Self {
        Self { sanitizer }
    }

    /// Validate the extracted record against `request` and build the model.
    pub fn build(
        &self,
        record: Option<Value>,
        request: &PuzzleRequest,
        audit: &mut ConversionAudit,
    ) -> Result<PuzzleModel, ValidationError> {
        let record = record.ok_or(ValidationError::MissingRecord)?;
        let record: RawCrosswordRecord = serde_json::from_value(record)?;
        self.build_record(record, request, audit)
    }

    pub fn build_record(
        &self,
        record: RawCrosswordRecord,
        request: &PuzzleRequest,
        audit: &mut ConversionAudit,
    ) -> Result<PuzzleModel, ValidationError> {
        let expected_date = request.iso_date();
        if record.date != expected_date {
            return Err(ValidationError::DateMismatch {
                expected: expected_date,
                found: record.date,
            });
        }
        let expected_kind = request.kind.as_str().to_uppercase();
        if record.kind.to_uppercase() != expected_kind {
            return Err(ValidationError::TypeMismatch {
                expected: expected_kind,
                found: record.kind,
            });
        }

        let title = format!(
            "{}, {}",
            capitalize(&record.kind),
            request.date.format("%A, %B %d, %Y")
        );
        let (width, height, solution) = flatten_grid(&record.grid)?;
        let fill = solution
            .chars()
            .map(|c| if c == BLOCK { BLOCK } else { EMPTY_CELL })
            .collect();

        let mut ordered = record.clues.across;
        ordered.extend(record.clues.down);
        // stable: across stays ahead of down at a shared position
        ordered.sort_by_key(|clue| clue.position);
        let clues = ordered
            .iter()
            .map(|clue| {
                let context = format!("clue {} {}", clue.position, title);
                self.sanitizer
                    .sanitize(Some(&clue.question), &context, audit)
                    .unwrap_or_default()
            })
            .collect();

        let joined_notes = [record.special_instructions, record.summary]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        let notes = self.sanitizer.sanitize(
            Some(joined_notes.as_str()).filter(|n| !n.is_empty()),
            &format!("notes {title}"),
            audit,
        );

        let author = self
            .sanitizer
            .sanitize(Some(&record.author), &format!("author {title}"), audit)
            .unwrap_or_default();

        engine_debug!("built {title}: {width}x{height}");
        Ok(PuzzleModel {
            copyright: COPYRIGHT.to_string(),
            author: format!("Created by {author}"),
            title,
            width,
            height,
            solution,
            fill,
            clues,
            notes,
        })
    }
}

fn flatten_grid(grid: &[Vec<String>]) -> Result<(usize, usize, String), ValidationError> {
    let width = grid.first().map(Vec::len).unwrap_or(0);
    if width == 0 {
        return Err(ValidationError::EmptyGrid);
    }

    let mut solution = String::with_capacity(width * grid.len());
    for (row, cells) in grid.iter().enumerate() {
        if cells.len() != width {
            return Err(ValidationError::RaggedGrid {
                row,
                expected: width,
                found: cells.len(),
            });
        }
        for (col, cell) in cells.iter().enumerate() {
            let mut chars = cell.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => solution.push(c),
                _ => {
                    return Err(ValidationError::InvalidCell {
                        row,
                        col,
                        cell: cell.clone(),
                    })
                }
            }
        }
    }
    Ok((width, grid.len(), solution))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

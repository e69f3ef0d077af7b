//! Across Lite `.puz` encoding (format version 1.3).
//!
//! Layout: a 0x34 byte header, the solution and fill grids, then the
//! NUL-terminated strings title, author, copyright, each clue and the notes.
//! Strings are Windows-1252.

use std::borrow::Cow;

use encoding_rs::WINDOWS_1252;

use crate::builder::PuzzleModel;

const MAGIC: &[u8; 12] = b"ACROSS&DOWN\0";
const VERSION: &[u8; 4] = b"1.3\0";
const MASK: &[u8; 8] = b"ICHEATED";
const HEADER_LEN: usize = 0x34;
const CIB_OFFSET: usize = 0x2C;
const PUZZLE_TYPE_NORMAL: u16 = 0x0001;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PuzError {
    #[error("grid {width}x{height} exceeds the 255x255 limit")]
    GridTooLarge { width: usize, height: usize },
    #[error("{0} clues exceed the 65535 limit")]
    TooManyClues(usize),
    #[error("{field} has {found} cells, expected {expected}")]
    GridLength {
        field: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Serialize a puzzle into `.puz` bytes.
pub fn encode_puz(puzzle: &PuzzleModel) -> Result<Vec<u8>, PuzError> {
    let (width, height) = match (u8::try_from(puzzle.width), u8::try_from(puzzle.height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(PuzError::GridTooLarge {
                width: puzzle.width,
                height: puzzle.height,
            })
        }
    };
    let clue_count =
        u16::try_from(puzzle.clues.len()).map_err(|_| PuzError::TooManyClues(puzzle.clues.len()))?;

    let cells = puzzle.width * puzzle.height;
    let solution = encode_text(&puzzle.solution);
    let fill = encode_text(&puzzle.fill);
    for (field, grid) in [("solution", &solution), ("fill", &fill)] {
        if grid.len() != cells {
            return Err(PuzError::GridLength {
                field,
                expected: cells,
                found: grid.len(),
            });
        }
    }

    let strings = PuzStrings {
        title: encode_text(&puzzle.title),
        author: encode_text(&puzzle.author),
        copyright: encode_text(&puzzle.copyright),
        clues: puzzle.clues.iter().map(|c| encode_text(c)).collect(),
        notes: encode_text(puzzle.notes.as_deref().unwrap_or("")),
    };

    let mut out = vec![0u8; HEADER_LEN];
    out[0x02..0x0E].copy_from_slice(MAGIC);
    out[0x18..0x1C].copy_from_slice(VERSION);
    out[0x2C] = width;
    out[0x2D] = height;
    out[0x2E..0x30].copy_from_slice(&clue_count.to_le_bytes());
    out[0x30..0x32].copy_from_slice(&PUZZLE_TYPE_NORMAL.to_le_bytes());
    // 0x32..0x34: scramble tag, always 0 (unscrambled)

    let cib = checksum(&out[CIB_OFFSET..HEADER_LEN], 0);
    let sol = checksum(&solution, 0);
    let grid = checksum(&fill, 0);
    let part = strings.checksum(0);

    let mut file_sum = cib;
    file_sum = checksum(&solution, file_sum);
    file_sum = checksum(&fill, file_sum);
    file_sum = strings.checksum(file_sum);

    out[0x00..0x02].copy_from_slice(&file_sum.to_le_bytes());
    out[0x0E..0x10].copy_from_slice(&cib.to_le_bytes());
    for (i, sum) in [cib, sol, grid, part].into_iter().enumerate() {
        let [low, high] = sum.to_le_bytes();
        out[0x10 + i] = MASK[i] ^ low;
        out[0x14 + i] = MASK[i + 4] ^ high;
    }

    out.extend_from_slice(&solution);
    out.extend_from_slice(&fill);
    for text in [&strings.title, &strings.author, &strings.copyright]
        .into_iter()
        .chain(strings.clues.iter())
        .chain(std::iter::once(&strings.notes))
    {
        out.extend_from_slice(text);
        out.push(0);
    }
    Ok(out)
}

struct PuzStrings<'a> {
    title: Cow<'a, [u8]>,
    author: Cow<'a, [u8]>,
    copyright: Cow<'a, [u8]>,
    clues: Vec<Cow<'a, [u8]>>,
    notes: Cow<'a, [u8]>,
}

impl PuzStrings<'_> {
    /// Checksum over the text section. Clues are summed without their
    /// terminator, the other strings with it, and empty strings are skipped.
    fn checksum(&self, seed: u16) -> u16 {
        let mut sum = seed;
        for text in [&self.title, &self.author, &self.copyright] {
            sum = checksum_terminated(text, sum);
        }
        for clue in &self.clues {
            sum = checksum(clue, sum);
        }
        checksum_terminated(&self.notes, sum)
    }
}

fn checksum_terminated(text: &[u8], seed: u16) -> u16 {
    if text.is_empty() {
        return seed;
    }
    checksum(&[0], checksum(text, seed))
}

/// The rotate-and-add checksum used throughout the format.
pub fn checksum(data: &[u8], seed: u16) -> u16 {
    data.iter().fold(seed, |sum, &byte| {
        sum.rotate_right(1).wrapping_add(u16::from(byte))
    })
}

fn encode_text(text: &str) -> Cow<'_, [u8]> {
    let (bytes, _, _) = WINDOWS_1252.encode(text);
    bytes
}

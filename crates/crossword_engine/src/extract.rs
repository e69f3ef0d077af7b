use std::str::CharIndices;

use engine_logging::engine_debug;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::decode::{decode_page, CharsetError};
use crate::FetchOutput;

static INITIAL_STATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"window\.INITIAL_STATE = JSON\.parse\("(.+)"\);"#)
        .expect("INITIAL_STATE pattern compiles")
});

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("response content is empty")]
    EmptyContent,
    #[error("crossword data not found in the page")]
    NotFound,
    #[error(transparent)]
    Charset(#[from] CharsetError),
    #[error("invalid escape sequence at offset {offset} of the embedded state")]
    InvalidEscape { offset: usize },
    #[error("embedded state is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

pub trait Extractor: Send + Sync {
    /// Consume a fetched page and return the embedded crossword record, if the
    /// state carries one.
    fn extract(&self, page: FetchOutput) -> Result<Option<Value>, ExtractError>;
}

/// Reads the `window.INITIAL_STATE` hydration payload out of a crossword page.
#[derive(Debug, Default, Clone, Copy)]
pub struct InitialStateExtractor;

impl Extractor for InitialStateExtractor {
    fn extract(&self, page: FetchOutput) -> Result<Option<Value>, ExtractError> {
        if page.bytes.is_empty() {
            return Err(ExtractError::EmptyContent);
        }
        let decoded = decode_page(&page.bytes, page.metadata.content_type.as_deref())?;
        engine_debug!(
            "decoded {} bytes from {} as {}",
            page.metadata.byte_len,
            page.metadata.final_url,
            decoded.encoding_label
        );
        drop(page);

        let json_text = extract_embedded_json(&decoded.text)?;
        crossword_record(&json_text)
    }
}

/// Locate the first `<script>` assigning `window.INITIAL_STATE` and return the
/// JSON document it embeds, with the JS string escaping reversed.
pub fn extract_embedded_json(html: &str) -> Result<String, ExtractError> {
    let doc = Html::parse_document(html);
    let script_sel = Selector::parse("script").ok();

    let escaped = script_sel
        .as_ref()
        .and_then(|sel| {
            doc.select(sel).find_map(|script| {
                let text = script.text().collect::<String>();
                INITIAL_STATE
                    .captures(&text)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string())
            })
        })
        .ok_or(ExtractError::NotFound)?;

    unescape_js_string(&escaped)
}

/// Parse the state document and take `crosswords.crossword` out of it.
pub fn crossword_record(json_text: &str) -> Result<Option<Value>, ExtractError> {
    let mut state: Value = serde_json::from_str(json_text)?;
    let record = state
        .pointer_mut("/crosswords/crossword")
        .map(Value::take)
        .filter(|value| !value.is_null());
    Ok(record)
}

/// Reverse JavaScript string-literal escaping.
///
/// Handles `\"`, `\\`, `\/`, `\'`, `\n`, `\r`, `\t`, `\b`, `\f`, `\v`, `\0`,
/// `\xHH` and `\uXXXX` (surrogate pairs are joined, a lone surrogate becomes
/// U+FFFD). Any other escaped character stands for itself; an escaped line
/// break is a continuation and produces nothing.
pub fn unescape_js_string(escaped: &str) -> Result<String, ExtractError> {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.char_indices();

    while let Some((offset, ch)) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let invalid = ExtractError::InvalidEscape { offset };
        let Some((_, esc)) = chars.next() else {
            return Err(invalid);
        };
        match esc {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            '\n' => {}
            'x' => {
                let code = read_hex(&mut chars, 2).ok_or(invalid)?;
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            'u' => {
                let unit = read_hex(&mut chars, 4).ok_or(invalid)?;
                out.push(utf16_unit(unit, &mut chars));
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

fn read_hex(chars: &mut CharIndices<'_>, digits: usize) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..digits {
        let (_, c) = chars.next()?;
        value = value * 16 + c.to_digit(16)?;
    }
    Some(value)
}

/// Resolve one `\uXXXX` unit, consuming a following low surrogate escape when
/// `unit` is a high surrogate.
fn utf16_unit(unit: u32, chars: &mut CharIndices<'_>) -> char {
    if !(0xD800..=0xDBFF).contains(&unit) {
        return char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER);
    }
    let rest = chars.as_str();
    let low = rest
        .strip_prefix("\\u")
        .and_then(|tail| tail.get(..4))
        .and_then(|hex| u32::from_str_radix(hex, 16).ok())
        .filter(|low| (0xDC00..=0xDFFF).contains(low));
    match low {
        Some(low) => {
            chars.nth(5);
            let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
            char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
        }
        None => char::REPLACEMENT_CHARACTER,
    }
}

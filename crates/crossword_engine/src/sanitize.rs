use engine_logging::engine_debug;
use unicode_segmentation::UnicodeSegmentation;

use crate::audit::{ConversionAudit, ConversionRecord};
use crate::convert::{Converter, Html2MdConverter};

/// Reduces free text to plain ASCII, which every single-byte puzzle encoding
/// can carry.
pub struct TextSanitizer {
    converter: Box<dyn Converter>,
}

impl Default for TextSanitizer {
    fn default() -> Self {
        Self::new(Box::new(Html2MdConverter))
    }
}

impl TextSanitizer {
    pub fn new(converter: Box<dyn Converter>) -> Self {
        Self { converter }
    }

    /// Sanitize `text`, recording the change in `audit` when the result differs.
    ///
    /// `None` and empty strings pass through untouched.
    pub fn sanitize(
        &self,
        text: Option<&str>,
        context: &str,
        audit: &mut ConversionAudit,
    ) -> Option<String> {
        let text = text?;
        if text.is_empty() {
            return Some(String::new());
        }

        let sanitized = self.clean(text);
        if sanitized != text {
            engine_debug!("[{}] {:?} -> {:?}", context, text, sanitized);
            audit.record(ConversionRecord {
                original: text.to_string(),
                sanitized: sanitized.clone(),
                context: context.to_string(),
            });
        }
        Some(sanitized)
    }

    /// Markup to text, emoji to `:shortcode:`, everything else to ASCII, trimmed.
    pub fn clean(&self, text: &str) -> String {
        let plain = self.converter.to_plain_text(text);
        let named = demojize(&plain);
        deunicode::deunicode(&named).trim().to_string()
    }
}

/// Replace each emoji grapheme cluster with its `:shortcode:`.
pub fn demojize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for grapheme in text.graphemes(true) {
        match emoji_name(grapheme) {
            Some(name) => {
                out.push(':');
                out.push_str(&name);
                out.push(':');
            }
            None => out.push_str(grapheme),
        }
    }
    out
}

fn emoji_name(grapheme: &str) -> Option<String> {
    // keycap bases and the like are only emoji with their modifiers attached
    if grapheme.is_ascii() {
        return None;
    }
    let emoji = emojis::get(grapheme)?;
    let name = match emoji.shortcode() {
        Some(code) => code.to_string(),
        None => name_to_shortcode(emoji.name()),
    };
    Some(name)
}

/// `thumbs up: medium skin tone` becomes `thumbs_up_medium_skin_tone`.
fn name_to_shortcode(name: &str) -> String {
    name.split(|c: char| c.is_whitespace() || c == ':' || c == ',')
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::{demojize, name_to_shortcode};

    #[test]
    fn demojize_leaves_plain_text_alone() {
        assert_eq!(demojize("Clue (5) #1"), "Clue (5) #1");
    }

    #[test]
    fn demojize_wraps_names_in_colons() {
        let out = demojize("hi 🚀");
        assert!(out.starts_with("hi :"));
        assert!(out.ends_with(':'));
        assert!(!out.contains('🚀'));
    }

    #[test]
    fn skin_tone_names_carry_no_inner_colon() {
        assert_eq!(
            name_to_shortcode("thumbs up: medium skin tone"),
            "thumbs_up_medium_skin_tone"
        );
        let out = demojize("ok \u{1F44D}\u{1F3FD}");
        let inner = out
            .strip_prefix("ok :")
            .and_then(|rest| rest.strip_suffix(':'))
            .unwrap();
        assert!(!inner.is_empty());
        assert!(!inner.contains(':'));
    }
}

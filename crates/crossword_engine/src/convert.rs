/// Turns markup into readable plain text.
pub trait Converter: Send + Sync {
    fn to_plain_text(&self, html: &str) -> String;
}

/// `html2md`-backed converter. Works line by line so that line breaks in the
/// source survive, and leaves lines without tags or entities untouched.
///
/// html2md emits Markdown, so its backslash escapes and hard-break padding are
/// removed from the result.
#[derive(Debug, Default, Clone, Copy)]
pub struct Html2MdConverter;

impl Converter for Html2MdConverter {
    fn to_plain_text(&self, html: &str) -> String {
        html.split('\n')
            .map(|line| {
                if has_markup(line) {
                    markdown_to_text(&html2md::parse_html(line))
                } else {
                    line.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn has_markup(line: &str) -> bool {
    line.contains('<') || line.contains('&')
}

fn markdown_to_text(markdown: &str) -> String {
    let lines: Vec<String> = markdown
        .split('\n')
        .map(|line| unescape_markdown(line).trim_end().to_string())
        .collect();
    lines.join("\n").trim().to_string()
}

/// Drop the backslash in front of escaped ASCII punctuation.
fn unescape_markdown(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(&next) = chars.peek() {
                if next.is_ascii_punctuation() {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(ch);
    }
    out
}

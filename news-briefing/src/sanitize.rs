/// Plain-text extraction for feed-supplied fields.

use html_escape::decode_html_entities;

/// Marker the feed generator appends to some titles.
const TITLE_NOISE: &str = "[.txt]";

fn opens_tag(next: Option<char>) -> bool {
    matches!(next, Some(c) if c.is_ascii_alphabetic() || c == '/' || c == '!' || c == '?')
}

/// Replaces every markup tag with a space. A `<` that does not start a tag, or a tag that
/// never closes, is kept as text.
fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        let (before, from_lt) = rest.split_at(start);
        text.push_str(before);

        match from_lt[1..].find('>') {
            Some(end) if opens_tag(from_lt[1..].chars().next()) => {
                text.push(' ');
                rest = &from_lt[end + 2..];
            }
            _ => {
                text.push('<');
                rest = &from_lt[1..];
            }
        }
    }
    text.push_str(rest);
    text
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn sanitize_once(input: &str) -> String {
    collapse_whitespace(&decode_html_entities(&strip_tags(input)))
}

/// Strips markup, decodes character references, collapses whitespace and trims.
///
/// Escaped markup such as `&lt;b&gt;` decodes into a tag that is stripped in turn, so the
/// result is stable: sanitizing it again changes nothing. The cost is that escaped text
/// which merely looks like a tag is lost too: `"x &lt;y and z&gt; w"` becomes `"x w"`.
pub fn sanitize_text(input: &str) -> String {
    let mut current = sanitize_once(input);
    loop {
        let next = sanitize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Absent fields sanitize to the empty string.
pub fn sanitize_field(input: Option<&str>) -> String {
    input.map(sanitize_text).unwrap_or_default()
}

/// Sanitized title with the feed generator's `[.txt]` marker removed.
pub fn clean_title(input: Option<&str>) -> String {
    sanitize_text(&sanitize_field(input).replace(TITLE_NOISE, ""))
}

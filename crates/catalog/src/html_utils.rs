// ABOUTME: HTML text helpers for descriptions taken from feeds and API payloads.
// ABOUTME: Provides tag stripping, <br> to newline conversion and entity decoding incl. German umlauts.

use once_cell::sync::Lazy;
use regex::Regex;

static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid br regex"));

/// Replaces `<br>`, `<br/>` and `<br />` (any case) with newlines.
pub fn br2nl(s: &str) -> String {
    BR_RE.replace_all(s, "\n").into_owned()
}

/// Strips HTML tags from a string, returning plain text.
///
/// Whitespace runs collapse to one space within a line; line breaks survive,
/// blank lines do not.
pub fn strip_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;

    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    collapse_whitespace(&decode_entities(&result))
}

/// Decodes common named HTML entities and numeric entities.
pub fn decode_entities(s: &str) -> String {
    let entities = [
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
        ("&apos;", "'"),
        ("&nbsp;", " "),
        ("&ndash;", "\u{2013}"),
        ("&mdash;", "\u{2014}"),
        ("&bdquo;", "\u{201E}"),
        ("&ldquo;", "\u{201C}"),
        ("&rdquo;", "\u{201D}"),
        ("&sbquo;", "\u{201A}"),
        ("&lsquo;", "\u{2018}"),
        ("&rsquo;", "\u{2019}"),
        ("&hellip;", "\u{2026}"),
        ("&auml;", "ä"),
        ("&ouml;", "ö"),
        ("&uuml;", "ü"),
        ("&Auml;", "Ä"),
        ("&Ouml;", "Ö"),
        ("&Uuml;", "Ü"),
        ("&szlig;", "ß"),
        ("&euro;", "€"),
        ("&copy;", "©"),
    ];

    let mut result = s.to_string();
    for (entity, replacement) in &entities {
        result = result.replace(entity, replacement);
    }
    // Last, so "&amp;lt;" stays "&lt;"
    decode_numeric_entities(&result).replace("&amp;", "&")
}

/// Decodes numeric HTML entities like &#123; and &#x7B;
fn decode_numeric_entities(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find("&#") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let decoded = after.find(';').and_then(|end| {
            let body = &after[..end];
            let code = match body.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => body.parse::<u32>().ok(),
            };
            code.and_then(char::from_u32).map(|c| (c, end))
        });

        match decoded {
            Some((c, end)) => {
                result.push(c);
                rest = &after[end + 1..];
            }
            None => {
                result.push_str("&#");
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

fn collapse_whitespace(s: &str) -> String {
    s.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

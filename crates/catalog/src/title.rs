// ABOUTME: Title cleanup applied to every normalized item title.
// ABOUTME: Trims whitespace and removes a symmetric pair of wrapping double quotes.

/// Trims a title and strips one pair of double quotes wrapping all of it.
///
/// A quote on only one side is left alone.
pub fn optimize_title(title: &str) -> String {
    let trimmed = title.trim();
    match trimmed
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
    {
        Some(inner) => inner.trim().to_string(),
        None => trimmed.to_string(),
    }
}

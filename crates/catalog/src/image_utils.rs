// ABOUTME: URL helpers for media streams and image variants.
// ABOUTME: Normalizes protocol-relative URLs and expands image templates and layout maps into variants.

use url::Url;

use crate::models::ImageVariant;

/// Makes an upstream media or image URL absolute.
///
/// Protocol-relative URLs (`//host/path`) get `https:`, absolute http(s)
/// URLs pass through unchanged, and anything else is resolved against `base`.
/// Returns None if the URL is empty or cannot be resolved.
pub fn resolve_media_url(src: &str, base_url: Option<&str>) -> Option<String> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }

    if src.starts_with("//") {
        return Some(format!("https:{}", src));
    }

    if src.starts_with("http://") || src.starts_with("https://") {
        return Some(src.to_string());
    }

    let base = Url::parse(base_url?).ok()?;
    let resolved = base.join(src).ok()?;
    Some(resolved.to_string())
}

/// Expands a URL template containing `{width}` into one variant per size.
///
/// Only the width is substituted; heights come from the size table.
pub fn variants_from_template(template: &str, sizes: &[(u32, u32)]) -> Vec<ImageVariant> {
    let Some(template) = resolve_media_url(template, None) else {
        return Vec::new();
    };
    sizes
        .iter()
        .map(|&(width, height)| ImageVariant {
            url: template.replace("{width}", &width.to_string()),
            width: Some(width),
            height: Some(height),
        })
        .collect()
}

/// Parses a layout key such as "768x432" into width and height.
/// Non-numeric sides come back as None.
pub fn parse_layout_size(key: &str) -> (Option<u32>, Option<u32>) {
    match key.split_once('x') {
        Some((w, h)) => (w.trim().parse().ok(), h.trim().parse().ok()),
        None => (None, None),
    }
}

/// Builds variants from a "WxH" -> URL layout map, skipping the "original" entry.
/// Variants are ordered largest first.
pub fn variants_from_layouts<'a, I>(layouts: I) -> Vec<ImageVariant>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut variants: Vec<ImageVariant> = layouts
        .into_iter()
        .filter(|(key, _)| *key != "original")
        .filter_map(|(key, url)| {
            let url = resolve_media_url(url, None)?;
            let (width, height) = parse_layout_size(key);
            Some(ImageVariant { url, width, height })
        })
        .collect();
    variants.sort_by(|a, b| b.width.unwrap_or(0).cmp(&a.width.unwrap_or(0)));
    variants
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_relative_gets_https() {
        assert_eq!(
            resolve_media_url("//pdvideosdaserste-a.akamaihd.net/x.mp4", None),
            Some("https://pdvideosdaserste-a.akamaihd.net/x.mp4".to_string())
        );
    }

    #[test]
    fn test_absolute_passes_through() {
        for url in ["https://example.com/a.mp4", "http://example.com/a.mp4"] {
            assert_eq!(resolve_media_url(url, Some("https://other.example")), Some(url.to_string()));
        }
    }

    #[test]
    fn test_relative_needs_base() {
        assert_eq!(resolve_media_url("/a.mp4", None), None);
        assert_eq!(
            resolve_media_url("/a.mp4", Some("https://www.ardmediathek.de/")),
            Some("https://www.ardmediathek.de/a.mp4".to_string())
        );
        assert_eq!(resolve_media_url("  ", None), None);
    }

    #[test]
    fn test_template_substitutes_width_only() {
        let v = variants_from_template("https://img.ard.de/image?w={width}", &[(640, 360), (256, 144)]);
        assert_eq!(v.len(), 2);
        assert_eq!(v[0].url, "https://img.ard.de/image?w=640");
        assert_eq!((v[0].width, v[0].height), (Some(640), Some(360)));
        assert_eq!(v[1].url, "https://img.ard.de/image?w=256");
    }

    #[test]
    fn test_parse_layout_size() {
        assert_eq!(parse_layout_size("768x432"), (Some(768), Some(432)));
        assert_eq!(parse_layout_size("autoxauto"), (None, None));
        assert_eq!(parse_layout_size("original"), (None, None));
    }

    #[test]
    fn test_layouts_sorted_and_original_skipped() {
        let v = variants_from_layouts([
            ("384x216", "https://zdf.de/a"),
            ("original", "https://zdf.de/o"),
            ("1280x720", "https://zdf.de/b"),
        ]);
        let urls: Vec<_> = v.iter().map(|v| v.url.as_str()).collect();
        assert_eq!(urls, ["https://zdf.de/b", "https://zdf.de/a"]);
    }
}

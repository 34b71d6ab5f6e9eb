// src/feed/extract.rs
// Best-effort price and image extraction from feed entries. Pure functions,
// pattern precedence is fixed and first match wins.

use once_cell::sync::OnceCell;
use regex::Regex;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

/// Sentinel for titles carrying no recognizable price.
pub const PRICE_NOT_SPECIFIED: &str = "Price not specified";

fn price_patterns() -> &'static [Regex] {
    static PATTERNS: OnceCell<Vec<Regex>> = OnceCell::new();
    PATTERNS.get_or_init(|| {
        [
            // $19.99, €1,999.99
            r"(?i)[$€£]\s?\d+(?:,\d{3})*(?:\.\d{2})?",
            // 19.99$, 1,999.99€
            r"(?i)\d+(?:,\d{3})*(?:\.\d{2})?\s?[$€£]",
            // USD 19.99
            r"(?i)USD\s?\d+(?:,\d{3})*(?:\.\d{2})?",
            // EUR 19.99
            r"(?i)EUR\s?\d+(?:,\d{3})*(?:\.\d{2})?",
            // GBP 19.99
            r"(?i)GBP\s?\d+(?:,\d{3})*(?:\.\d{2})?",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("price pattern"))
        .collect()
    })
}

/// Pull a price string out of an alert title, or the sentinel when none of
/// the currency patterns match.
pub fn extract_price(title: &str) -> String {
    for re in price_patterns() {
        if let Some(m) = re.find(title) {
            return m.as_str().to_string();
        }
    }
    PRICE_NOT_SPECIFIED.to_string()
}

fn looks_like_image(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.contains("jpg") || lower.contains("jpeg") || lower.contains("png")
}

/// Pick an image URL for an entry. Precedence: enclosure tag (when the URL
/// looks like an image) → inline `<img src=...>` in the description (query
/// string stripped) → media:content → media:thumbnail.
pub fn extract_image_url(
    enclosure_url: Option<&str>,
    description: &str,
    media_content_url: Option<&str>,
    media_thumbnail_url: Option<&str>,
) -> Option<String> {
    if let Some(url) = enclosure_url {
        if !url.is_empty() && looks_like_image(url) {
            return Some(url.to_string());
        }
    }

    static RE_IMG: OnceCell<Regex> = OnceCell::new();
    let re_img = RE_IMG.get_or_init(|| {
        Regex::new(r#"(?i)<img[^>]+src=["']([^"']+)["']"#).expect("img pattern")
    });
    if let Some(cap) = re_img.captures(description) {
        let src = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
        if !src.is_empty() {
            let trimmed = src.split('?').next().unwrap_or(src);
            return Some(trimmed.to_string());
        }
    }

    if let Some(url) = media_content_url.filter(|u| !u.is_empty()) {
        return Some(url.to_string());
    }
    if let Some(url) = media_thumbnail_url.filter(|u| !u.is_empty()) {
        return Some(url.to_string());
    }

    None
}

/// RFC-2822 pubDate → unix seconds, 0 on any parse failure.
pub fn parse_rfc2822_to_unix(ts: &str) -> u64 {
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|x| u64::try_from(x).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_with_dollar_sign() {
        assert_eq!(extract_price("Echo Dot - $19.99"), "$19.99");
    }

    #[test]
    fn price_with_currency_code_and_thousands() {
        assert_eq!(extract_price("Echo Dot - USD 1,999.99"), "USD 1,999.99");
    }

    #[test]
    fn price_trailing_symbol() {
        assert_eq!(extract_price("Kindle 129.00€ today"), "129.00€");
    }

    #[test]
    fn no_price_yields_sentinel() {
        assert_eq!(extract_price("Echo Dot back in stock"), PRICE_NOT_SPECIFIED);
    }

    #[test]
    fn enclosure_wins_when_it_is_an_image() {
        let got = extract_image_url(
            Some("https://img.example.com/a.jpg"),
            r#"<img src="https://img.example.com/b.png">"#,
            Some("https://img.example.com/c.png"),
            None,
        );
        assert_eq!(got.as_deref(), Some("https://img.example.com/a.jpg"));
    }

    #[test]
    fn non_image_enclosure_falls_through_to_img_tag() {
        let got = extract_image_url(
            Some("https://example.com/audio.mp3"),
            r#"<p>deal!</p><img src="https://img.example.com/b.png?w=300&h=300">"#,
            None,
            None,
        );
        // query string is stripped from inline images
        assert_eq!(got.as_deref(), Some("https://img.example.com/b.png"));
    }

    #[test]
    fn media_content_then_thumbnail() {
        let got = extract_image_url(None, "", Some("https://m.example.com/c"), None);
        assert_eq!(got.as_deref(), Some("https://m.example.com/c"));

        let got = extract_image_url(None, "", None, Some("https://m.example.com/t"));
        assert_eq!(got.as_deref(), Some("https://m.example.com/t"));
    }

    #[test]
    fn no_source_yields_none() {
        assert_eq!(extract_image_url(None, "plain text only", None, None), None);
    }

    #[test]
    fn pubdate_parses_to_unix() {
        assert_eq!(
            parse_rfc2822_to_unix("Sat, 01 Jan 2022 00:00:00 +0000"),
            1_640_995_200
        );
        assert_eq!(parse_rfc2822_to_unix("not a date"), 0);
    }
}

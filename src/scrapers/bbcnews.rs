//! BBC News homepage link discovery and article field extraction.
//!
//! Both functions are pure over the markup they are given; fetching is the
//! caller's business.
//!
//! # URL Pattern
//!
//! Only links on `www.bbc.com` / `bbc.com` whose path starts with `/news/`
//! (which includes `/news/articles/...`) are treated as articles.

use crate::models::ArticleFields;
use crate::utils::collapse_whitespace;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

/// Hosts whose links are eligible for harvesting.
pub const BBC_HOSTS: &[&str] = &["www.bbc.com", "bbc.com"];

/// Paragraphs must be longer than this (in characters) to count as the lead.
const MIN_PARAGRAPH_CHARS: usize = 60;

static NEWS_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/news(/|/articles/)").expect("news path pattern is valid"));
static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("link selector is valid"));
static H1_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1").expect("h1 selector is valid"));
static TIME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("time").expect("time selector is valid"));
static P_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("p selector is valid"));

/// Collect article URLs from homepage markup.
///
/// # Arguments
///
/// * `html` - Homepage markup
/// * `base` - URL every `href` is resolved against
///
/// # Returns
///
/// Absolute article URLs on an allowed host under `/news/`.
///
/// Every `href` is resolved against `base`, filtered by host and path,
/// stripped of its fragment, and de-duplicated keeping the first occurrence
/// in document order. Hrefs that are empty or do not resolve are skipped.
#[instrument(level = "info", skip_all, fields(base = %base))]
pub fn discover_article_urls(html: &str, base: &Url) -> Vec<String> {
    let document = Html::parse_document(html);

    let urls: Vec<String> = document
        .select(&LINK_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .filter_map(|href| base.join(href).ok())
        .filter(is_news_article)
        .map(|mut url| {
            url.set_fragment(None);
            url.to_string()
        })
        .unique()
        .collect();

    debug!(count = urls.len(), "Discovered article URLs");
    urls
}

fn is_news_article(url: &Url) -> bool {
    let host_ok = url
        .host_str()
        .map(|h| BBC_HOSTS.contains(&h.to_ascii_lowercase().as_str()))
        .unwrap_or(false);
    host_ok && NEWS_PATH_RE.is_match(url.path())
}

/// Pull the title, raw publication time, and lead paragraph out of one
/// article page. Missing elements come back as `None`; this never fails.
///
/// # Arguments
///
/// * `html` - Article page markup
/// * `url` - The page's URL, used only for tracing
///
/// # Returns
///
/// An [`ArticleFields`] where:
/// - `title` is the first `<h1>`, whitespace-collapsed
/// - `published_raw` is the first `<time>`'s `datetime` attribute, or its
///   text when the attribute is absent or blank
/// - `first_paragraph` is the first `<p>` longer than 60 characters
#[instrument(level = "debug", skip_all, fields(%url))]
pub fn extract_fields(html: &str, url: &str) -> ArticleFields {
    let document = Html::parse_document(html);

    let title = document.select(&H1_SELECTOR).next().map(element_text);

    let published_raw = document.select(&TIME_SELECTOR).next().map(|t| {
        match t.value().attr("datetime").map(str::trim) {
            Some(dt) if !dt.is_empty() => dt.to_string(),
            _ => element_text(t),
        }
    });

    let first_paragraph = document
        .select(&P_SELECTOR)
        .map(element_text)
        .find(|txt| txt.chars().count() > MIN_PARAGRAPH_CHARS);

    debug!(
        has_title = title.is_some(),
        has_time = published_raw.is_some(),
        has_paragraph = first_paragraph.is_some(),
        "Extracted article fields"
    );

    ArticleFields {
        title,
        published_raw,
        first_paragraph,
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.bbc.com").unwrap()
    }

    const LONG_P: &str = "This is a long paragraph that should be picked as the first \
                          paragraph because it is definitely longer than sixty characters.";

    #[test]
    fn test_discover_dedupes_in_first_seen_order() {
        let html = r##"
            <a href="/news/articles/a1">A</a>
            <a href="/news/world-1">B</a>
            <a href="/news/articles/a1#comments">A again</a>
            <a href="https://www.bbc.com/news/articles/c3">C</a>
            <a href="/news/articles/a1">A third</a>
            <a href="/news/business-4">D</a>
            <a href="https://bbc.com/news/articles/e5">E</a>
        "##;
        let urls = discover_article_urls(html, &base());
        assert_eq!(
            urls,
            vec![
                "https://www.bbc.com/news/articles/a1",
                "https://www.bbc.com/news/world-1",
                "https://www.bbc.com/news/articles/c3",
                "https://www.bbc.com/news/business-4",
                "https://bbc.com/news/articles/e5",
            ]
        );
    }

    #[test]
    fn test_discover_filters_hosts_and_paths() {
        let html = r#"
            <a href="https://www.bbc.co.uk/news/articles/x">other host</a>
            <a href="https://evil.example/news/articles/x">evil</a>
            <a href="/sport/football/1">sport</a>
            <a href="/news">bare news index</a>
            <a href="/newsbeat/1">newsbeat</a>
            <a href="">empty</a>
            <a>no href</a>
            <a href="/news/uk-1?at_medium=x">kept with query</a>
        "#;
        let urls = discover_article_urls(html, &base());
        assert_eq!(urls, vec!["https://www.bbc.com/news/uk-1?at_medium=x"]);
        for u in &urls {
            let host = Url::parse(u).unwrap().host_str().unwrap().to_string();
            assert!(BBC_HOSTS.contains(&host.as_str()));
        }
    }

    #[test]
    fn test_discover_empty_markup() {
        assert!(discover_article_urls("", &base()).is_empty());
    }

    #[test]
    fn test_extract_basic() {
        let html = format!(
            r#"<html><body>
                <h1>Test Title</h1>
                <time datetime="2026-02-25T04:32:30Z"></time>
                <p>{LONG_P}</p>
            </body></html>"#
        );
        let fields = extract_fields(&html, "https://example.com/test");
        assert_eq!(fields.title.as_deref(), Some("Test Title"));
        assert_eq!(fields.published_raw.as_deref(), Some("2026-02-25T04:32:30Z"));
        assert!(
            fields
                .first_paragraph
                .unwrap()
                .to_lowercase()
                .contains("long paragraph")
        );
    }

    #[test]
    fn test_extract_time_text_fallback() {
        let html = r#"<time datetime="  ">  3 hours
            ago </time><time datetime="2020-01-01T00:00:00Z"></time>"#;
        let fields = extract_fields(html, "u");
        assert_eq!(fields.published_raw.as_deref(), Some("3 hours ago"));
    }

    #[test]
    fn test_extract_skips_short_paragraphs() {
        let html = format!("<p>Short.</p><p>  </p><p>{LONG_P}</p><p>{LONG_P} again</p>");
        let fields = extract_fields(&html, "u");
        assert_eq!(fields.first_paragraph.as_deref(), Some(LONG_P));
    }

    #[test]
    fn test_extract_missing_everything() {
        let fields = extract_fields("<div>nothing here</div>", "u");
        assert_eq!(fields, ArticleFields::default());
    }

    #[test]
    fn test_extract_title_whitespace_collapsed() {
        let html = "<h1>\n  Big <span>news</span>\n today </h1><h1>Second</h1>";
        let fields = extract_fields(html, "u");
        assert_eq!(fields.title.as_deref(), Some("Big news today"));
    }
}

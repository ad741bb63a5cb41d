use crate::error::Result;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("hardcoded selector is valid"));

/// A hyperlink found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub text: String,
}

/// Pulls hyperlinks out of a fetched document.
pub trait LinkExtractor: Send + Sync {
    fn extract_links(&self, body: &str) -> Result<Vec<Link>>;
}

/// Extracts every `<a>` element of an HTML document. Anchors without an
/// `href` yield an empty href.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, body: &str) -> Result<Vec<Link>> {
        let document = Html::parse_document(body);

        let links = document
            .select(&ANCHOR_SELECTOR)
            .map(|anchor| {
                let href = anchor.value().attr("href").unwrap_or_default().trim();
                let text = anchor.text().collect::<String>();
                Link {
                    href: href.to_string(),
                    text: text.split_whitespace().collect::<Vec<_>>().join(" "),
                }
            })
            .collect();

        Ok(links)
    }
}

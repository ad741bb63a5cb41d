// Sitemap rendering (https://www.sitemaps.org/protocol.html)

use chrono::SecondsFormat;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use sitemapper_scanner::result::{CrawlResult, VisitEntry};
use std::io::Write;
use thiserror::Error;

pub const SITEMAP_XMLNS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Error, Debug)]
pub enum SitemapError {
    #[error("Failed to write sitemap: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode sitemap: {0}")]
    Xml(#[from] quick_xml::Error),
}

#[derive(Debug, Clone, Default)]
pub struct SitemapOptions {
    /// Add a `<lastmod>` element holding the time each page was discovered.
    pub include_lastmod: bool,
}

/// Write `result` as a sitemap document to `writer`.
pub fn render<W: Write>(result: &CrawlResult, writer: W) -> Result<(), SitemapError> {
    render_with(result, writer, &SitemapOptions::default())
}

pub fn render_with<W: Write>(
    result: &CrawlResult,
    writer: W,
    options: &SitemapOptions,
) -> Result<(), SitemapError> {
    let mut xml = Writer::new_with_indent(writer, b' ', 2);

    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", SITEMAP_XMLNS));
    xml.write_event(Event::Start(urlset))?;

    for entry in &result.entries {
        write_url(&mut xml, entry, options)?;
    }

    xml.write_event(Event::End(BytesEnd::new("urlset")))?;
    xml.get_mut().write_all(b"\n")?;
    xml.get_mut().flush()?;
    Ok(())
}

pub fn render_to_string(result: &CrawlResult, options: &SitemapOptions) -> Result<String, SitemapError> {
    let mut buffer = Vec::new();
    render_with(result, &mut buffer, options)?;
    String::from_utf8(buffer)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
}

fn write_url<W: Write>(
    xml: &mut Writer<W>,
    entry: &VisitEntry,
    options: &SitemapOptions,
) -> Result<(), SitemapError> {
    xml.write_event(Event::Start(BytesStart::new("url")))?;
    write_text_element(xml, "loc", &entry.url)?;
    if options.include_lastmod {
        let lastmod = entry
            .discovered_at
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        write_text_element(xml, "lastmod", &lastmod)?;
    }
    xml.write_event(Event::End(BytesEnd::new("url")))?;
    Ok(())
}

fn write_text_element<W: Write>(
    xml: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), SitemapError> {
    xml.write_event(Event::Start(BytesStart::new(name)))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

pub mod crawl;
pub mod sitemap;

pub use crawl::{CrawlOptions, execute_crawl, execute_crawl_with, write_sitemap};
pub use sitemap::{SITEMAP_XMLNS, SitemapError, SitemapOptions, render, render_with};

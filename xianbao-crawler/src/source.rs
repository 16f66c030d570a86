//! Common interface for forum crawlers

use async_trait::async_trait;

use crate::CrawlError;
use xianbao_core::Post;

/// A crawlable deal-tip source
///
/// `crawl` returns the posts currently visible on the source. Total failure
/// (network down, page layout gone) is an error; a single malformed post is
/// skipped with a log line, never propagated.
#[async_trait]
pub trait Source: Send + Sync {
    /// Human-readable source name
    fn name(&self) -> &str;

    /// Landing page URL
    fn base_url(&self) -> &str;

    /// Fetch and parse the source's current posts
    async fn crawl(&self) -> Result<Vec<Post>, CrawlError>;
}

//! ixbk.net crawler (线报酷)
//!
//! Parses the landing page's article list and optionally visits each
//! detail page to pull the full tip text, the original-offer link and any
//! links posted in the comment section.

use chrono::{DateTime, FixedOffset, Utc};
use futures::stream::{self, StreamExt};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use async_trait::async_trait;

use crate::{create_client, fetch_page, CrawlError, HttpConfig, Source};
use xianbao_core::Post;

const SOURCE_NAME: &str = "线报酷";
const BASE_URL: &str = "https://new.ixbk.net/";

/// Parallel detail-page fetches
const DETAIL_CONCURRENCY: usize = 4;

/// Comment containers to scan for links on a detail page
const MAX_COMMENTS_SCANNED: usize = 10;

/// A link-less comment mentioning one of these likely explains how to
/// claim the deal
const HOWTO_KEYWORDS: &[&str] = &["口令", "密令", "链接", "进入", "搜索", "打开"];

/// Link-less comments longer than this are discussion, not instructions
const MAX_HOWTO_CHARS: usize = 200;

/// The forum's local timezone (Asia/Shanghai, +08:00)
fn forum_tz() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).expect("+08:00 is a valid offset")
}

/// ixbk.net crawler
pub struct IxbkSource {
    config: HttpConfig,
    /// Visit each post's detail page for the full content
    fetch_detail: bool,
    /// Cap on posts taken from the list page
    max_posts: usize,
}

impl Default for IxbkSource {
    fn default() -> Self {
        Self::new(HttpConfig::default(), true, 50)
    }
}

impl IxbkSource {
    pub fn new(config: HttpConfig, fetch_detail: bool, max_posts: usize) -> Self {
        Self {
            config,
            fetch_detail,
            max_posts,
        }
    }
}

#[async_trait]
impl Source for IxbkSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn base_url(&self) -> &str {
        BASE_URL
    }

    async fn crawl(&self) -> Result<Vec<Post>, CrawlError> {
        let client = create_client(&self.config)?;
        let html = fetch_page(&client, BASE_URL, &self.config).await?;

        let now = Utc::now();
        let mut stubs = parse_list(&html, now)?;
        info!("Found {} articles on list page", stubs.len());
        stubs.truncate(self.max_posts);

        let contents: Vec<Option<String>> = if self.fetch_detail {
            let detail_futures: Vec<_> = stubs
                .iter()
                .map(|stub| {
                    let client = client.clone();
                    let config = self.config.clone();
                    let url = stub.url.clone();
                    async move {
                        match fetch_page(&client, &url, &config).await {
                            Ok(html) => parse_detail(&html),
                            Err(e) => {
                                warn!("Detail fetch failed for {url}: {e}");
                                None
                            }
                        }
                    }
                })
                .collect();
            stream::iter(detail_futures)
            .buffered(DETAIL_CONCURRENCY)
            .collect()
            .await
        } else {
            vec![None; stubs.len()]
        };

        let posts: Vec<Post> = stubs
            .into_iter()
            .zip(contents)
            .map(|(stub, detail)| {
                let content = detail
                    .or_else(|| {
                        if stub.summary.is_empty() {
                            None
                        } else {
                            Some(stub.summary.clone())
                        }
                    })
                    .unwrap_or_else(|| stub.title.clone());

                Post::builder(&stub.title, &stub.url)
                    .author(&stub.author)
                    .source(SOURCE_NAME)
                    .category(&stub.category)
                    .content(&content)
                    .publish_time(stub.publish_time)
                    .comments(stub.comments)
                    .crawl_time(now)
                    .build()
            })
            .collect();

        info!("Parsed {} posts from {}", posts.len(), SOURCE_NAME);
        Ok(posts)
    }
}

/// List-page fields for one article, before detail enrichment
#[derive(Debug, Clone)]
struct ArticleStub {
    title: String,
    url: String,
    author: String,
    category: String,
    summary: String,
    comments: u32,
    publish_time: DateTime<Utc>,
}

/// Parse the landing page's article list
fn parse_list(html: &str, now: DateTime<Utc>) -> Result<Vec<ArticleStub>, CrawlError> {
    let document = Html::parse_document(html);
    let list_selector = Selector::parse("ul.new-post").unwrap();
    let item_selector = Selector::parse("li.article-list").unwrap();
    let link_selector = Selector::parse("a").unwrap();
    let time_selector = Selector::parse("time.badge").unwrap();
    let comment_selector = Selector::parse("span.badge.com").unwrap();

    let list = document
        .select(&list_selector)
        .next()
        .ok_or_else(|| CrawlError::Parse("article list (ul.new-post) not found".to_string()))?;

    let mut stubs = Vec::new();

    for item in list.select(&item_selector) {
        let Some(anchor) = item.select(&link_selector).next() else {
            continue;
        };

        let title = anchor.value().attr("title").unwrap_or("").trim().to_string();
        let href = anchor.value().attr("href").unwrap_or("").trim();
        if title.is_empty() || href.is_empty() {
            debug!("Skipping list item without title/href");
            continue;
        }

        let url = if href.starts_with('/') {
            format!("{}{}", BASE_URL.trim_end_matches('/'), href)
        } else {
            href.to_string()
        };

        let time_text = item
            .select(&time_selector)
            .next()
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default();

        let comments = item
            .select(&comment_selector)
            .next()
            .map(|el| extract_count(&el.text().collect::<String>()))
            .unwrap_or(0);

        stubs.push(ArticleStub {
            title,
            url,
            author: attr_or(&anchor, "data-louzhu", "匿名"),
            category: attr_or(&anchor, "data-catename", "未分类"),
            summary: anchor.value().attr("data-content").unwrap_or("").trim().to_string(),
            comments,
            publish_time: parse_clock_time(time_text.trim(), now),
        });
    }

    Ok(stubs)
}

fn attr_or(anchor: &ElementRef, name: &str, default: &str) -> String {
    let value = anchor.value().attr(name).unwrap_or("").trim();
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// First run of digits in a badge text, e.g. "12条评论" -> 12
fn extract_count(text: &str) -> u32 {
    let re = regex::Regex::new(r"\d+").unwrap();
    re.find(text)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Resolve an "HH:MM" badge to an instant
///
/// The badge carries wall-clock time in the forum's timezone; a moment
/// later than "now" belongs to yesterday. Anything unparseable resolves
/// to "now".
fn parse_clock_time(time_str: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let re = regex::Regex::new(r"^(\d{1,2}):(\d{2})").unwrap();
    let Some(caps) = re.captures(time_str) else {
        return now;
    };

    let (Ok(hour), Ok(minute)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>()) else {
        return now;
    };

    let local_now = now.with_timezone(&forum_tz());
    let Some(candidate) = local_now
        .date_naive()
        .and_hms_opt(hour, minute, 0)
        .and_then(|naive| naive.and_local_timezone(forum_tz()).single())
    else {
        return now;
    };

    let resolved = if candidate > local_now {
        candidate - chrono::Duration::days(1)
    } else {
        candidate
    };

    resolved.with_timezone(&Utc)
}

/// Extract the useful parts of a detail page
///
/// Joins the article body, the original-offer link and links mined from the
/// comment section into one text block. Returns `None` when nothing useful
/// was found, so the caller can fall back to the list-page summary.
fn parse_detail(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let mut parts = Vec::new();

    let content_selector = Selector::parse("div.article-content").unwrap();
    if let Some(content) = document.select(&content_selector).next() {
        let text = content
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        if !text.is_empty() {
            parts.push(text);
        }
    }

    let link_selector = Selector::parse("a").unwrap();
    if let Some(source_link) = document
        .select(&link_selector)
        .find(|a| a.text().collect::<String>().contains("原文地址"))
    {
        if let Some(href) = source_link.value().attr("href") {
            if !href.is_empty() {
                parts.push(format!("🔗 原文链接: {href}"));
            }
        }
    }

    let comment_links = extract_comment_links(&document);
    if !comment_links.is_empty() {
        parts.push(format!("💬 评论区补充:\n{}", comment_links.join("\n")));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}

/// Mine the comment section for links and claiming instructions
///
/// Anchors win; a comment without any anchor falls back to plain-text URL
/// extraction, then to keeping short comments that read like instructions
/// (deal codes are often posted as bare text).
fn extract_comment_links(document: &Html) -> Vec<String> {
    let comment_selector = Selector::parse("div.comment-list div.ul").unwrap();
    let body_selector = Selector::parse("div.li div.c-neirong").unwrap();
    let link_selector = Selector::parse("a").unwrap();
    let url_re = regex::Regex::new(r#"https?://[^\s<>"{}|\\^`\[\]]+"#).unwrap();

    let mut links = Vec::new();

    for (i, comment) in document
        .select(&comment_selector)
        .take(MAX_COMMENTS_SCANNED)
        .enumerate()
    {
        let Some(body) = comment.select(&body_selector).next() else {
            continue;
        };

        let anchors: Vec<_> = body.select(&link_selector).collect();
        if !anchors.is_empty() {
            for link in anchors {
                let Some(href) = link.value().attr("href") else {
                    continue;
                };
                if href.is_empty() {
                    continue;
                }
                let text = link.text().collect::<String>().trim().to_string();
                links.push(format!("[{}] {}: {}", i + 1, text, href));
            }
            continue;
        }

        let comment_text = body.text().collect::<String>().trim().to_string();

        let urls: Vec<_> = url_re.find_iter(&comment_text).collect();
        if !urls.is_empty() {
            for url in urls {
                links.push(format!("[{}] {}", i + 1, url.as_str()));
            }
        } else if HOWTO_KEYWORDS.iter().any(|k| comment_text.contains(k))
            && comment_text.chars().count() < MAX_HOWTO_CHARS
        {
            links.push(format!("[{}] {}", i + 1, comment_text));
        }
    }

    links
}

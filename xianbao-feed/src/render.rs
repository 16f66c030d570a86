//! RSS / Atom / JSON renderers
//!
//! All three formats consume the same filtered, sorted slice; truncation to
//! a maximum item count happens before the posts reach this module.

use atom_syndication::{
    ContentBuilder, EntryBuilder, FeedBuilder, LinkBuilder, Person, Text,
};
use chrono::{DateTime, Utc};
use rss::{CategoryBuilder, ChannelBuilder, GuidBuilder, ItemBuilder};
use serde::Serialize;
use tracing::info;

use crate::{feed_tz, FeedConfig, FeedError};
use xianbao_core::ScoredPost;

/// Render an RSS 2.0 document
pub fn render_rss(config: &FeedConfig, posts: &[ScoredPost], now: DateTime<Utc>) -> String {
    let build_date = now.with_timezone(&feed_tz()).to_rfc2822();

    let items: Vec<rss::Item> = posts
        .iter()
        .map(|scored| {
            let mut item = ItemBuilder::default();
            item.title(Some(scored.post.title.clone()))
                .link(Some(scored.post.url.clone()))
                .description(Some(build_description(scored)))
                .guid(Some(
                    GuidBuilder::default()
                        .value(scored.post.url.clone())
                        .permalink(true)
                        .build(),
                ));

            if let Some(pub_time) = scored.post.publish_time {
                item.pub_date(Some(pub_time.with_timezone(&feed_tz()).to_rfc2822()));
            }
            if !scored.post.category.is_empty() {
                item.categories(vec![CategoryBuilder::default()
                    .name(scored.post.category.clone())
                    .build()]);
            }
            if !scored.post.author.is_empty() {
                item.author(Some(scored.post.author.clone()));
            }

            item.build()
        })
        .collect();

    let channel = ChannelBuilder::default()
        .title(config.title.clone())
        .link(config.link.clone())
        .description(config.description.clone())
        .language(Some(config.language.clone()))
        .generator(Some(config.generator.clone()))
        .last_build_date(Some(build_date.clone()))
        .pub_date(Some(build_date))
        .items(items)
        .build();

    info!("Rendered RSS feed with {} items", posts.len());
    channel.to_string()
}

/// Render an Atom 1.0 document
pub fn render_atom(config: &FeedConfig, posts: &[ScoredPost], now: DateTime<Utc>) -> String {
    let updated = now.with_timezone(&feed_tz());

    let entries: Vec<atom_syndication::Entry> = posts
        .iter()
        .map(|scored| {
            let entry_updated = scored
                .post
                .publish_time
                .map(|t| t.with_timezone(&feed_tz()))
                .unwrap_or(updated);

            let mut entry = EntryBuilder::default();
            entry
                .title(Text::plain(scored.post.title.clone()))
                .id(scored.post.url.clone())
                .updated(entry_updated)
                .links(vec![LinkBuilder::default()
                    .href(scored.post.url.clone())
                    .rel("alternate".to_string())
                    .build()])
                .content(Some(
                    ContentBuilder::default()
                        .value(Some(build_description(scored)))
                        .content_type(Some("html".to_string()))
                        .build(),
                ));

            if !scored.post.author.is_empty() {
                entry.authors(vec![Person {
                    name: scored.post.author.clone(),
                    email: None,
                    uri: None,
                    extensions: Default::default(),
                }]);
            }
            if !scored.post.category.is_empty() {
                entry.categories(vec![atom_syndication::Category {
                    term: scored.post.category.clone(),
                    scheme: None,
                    label: None,
                }]);
            }

            entry.build()
        })
        .collect();

    let feed = FeedBuilder::default()
        .title(Text::plain(config.title.clone()))
        .id(config.link.clone())
        .updated(updated)
        .links(vec![LinkBuilder::default()
            .href(config.link.clone())
            .rel("alternate".to_string())
            .build()])
        .subtitle(Some(Text::plain(config.description.clone())))
        .generator(Some(atom_syndication::Generator {
            value: config.generator.clone(),
            uri: None,
            version: None,
        }))
        .entries(entries)
        .build();

    info!("Rendered Atom feed with {} items", posts.len());
    feed.to_string()
}

/// JSON feed document
#[derive(Debug, Serialize)]
struct JsonFeed<'a> {
    title: &'a str,
    description: &'a str,
    link: &'a str,
    updated: String,
    items: Vec<JsonItem<'a>>,
}

/// One post in the JSON feed
#[derive(Debug, Serialize)]
struct JsonItem<'a> {
    title: &'a str,
    url: &'a str,
    category: &'a str,
    content: &'a str,
    author: &'a str,
    publish_time: String,
    quality_score: f64,
}

/// Render the JSON document consumed by the web UI
pub fn render_json(
    config: &FeedConfig,
    posts: &[ScoredPost],
    now: DateTime<Utc>,
) -> Result<String, FeedError> {
    let feed = JsonFeed {
        title: &config.title,
        description: &config.description,
        link: &config.link,
        updated: now.with_timezone(&feed_tz()).to_rfc3339(),
        items: posts
            .iter()
            .map(|scored| JsonItem {
                title: &scored.post.title,
                url: &scored.post.url,
                category: &scored.post.category,
                content: &scored.post.content,
                author: &scored.post.author,
                publish_time: scored
                    .post
                    .publish_time
                    .map(|t| t.with_timezone(&feed_tz()).to_rfc3339())
                    .unwrap_or_default(),
                quality_score: scored.quality_score,
            })
            .collect(),
    };

    info!("Rendered JSON feed with {} items", posts.len());
    serde_json::to_string_pretty(&feed).map_err(|e| FeedError::Serialize(e.to_string()))
}

/// HTML description for one post: bold category line, then the content
/// with newlines as line breaks
fn build_description(scored: &ScoredPost) -> String {
    let mut parts = Vec::new();

    if !scored.post.category.is_empty() {
        parts.push(format!("<b>📂 {}</b><br />", scored.post.category));
    }
    if !scored.post.content.is_empty() {
        parts.push(scored.post.content.replace('\n', "<br />"));
    }

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use xianbao_core::Post;

    fn sample_posts() -> Vec<ScoredPost> {
        vec![
            ScoredPost {
                post: Post::builder("京东红包包邮", "https://new.ixbk.net/p/1.html")
                    .author("楼主甲")
                    .category("京东")
                    .content("实物包邮\n速度上车")
                    .publish_time(now())
                    .build(),
                quality_score: 95.5,
            },
            ScoredPost {
                post: Post::builder("话费充值", "https://new.ixbk.net/p/2.html").build(),
                quality_score: 74.0,
            },
        ]
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_render_rss() {
        let xml = render_rss(&FeedConfig::default(), &sample_posts(), now());

        assert!(xml.contains("<rss"));
        assert!(xml.contains("高质量羊毛线报"));
        assert!(xml.contains("京东红包包邮"));
        assert!(xml.contains("https://new.ixbk.net/p/1.html"));
        assert!(xml.contains("zh-CN"));
        // second post has no category/author and still renders
        assert!(xml.contains("话费充值"));
    }

    #[test]
    fn test_render_atom() {
        let xml = render_atom(&FeedConfig::default(), &sample_posts(), now());

        assert!(xml.contains("<feed"));
        assert!(xml.contains("京东红包包邮"));
        assert!(xml.contains("楼主甲"));
    }

    #[test]
    fn test_render_json() {
        let json = render_json(&FeedConfig::default(), &sample_posts(), now()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["items"].as_array().unwrap().len(), 2);
        assert_eq!(value["items"][0]["quality_score"], 95.5);
        assert_eq!(value["items"][0]["category"], "京东");
        // publish time carries the +08:00 offset
        assert!(value["items"][0]["publish_time"]
            .as_str()
            .unwrap()
            .contains("+08:00"));
        assert_eq!(value["items"][1]["publish_time"], "");
    }

    #[test]
    fn test_render_json_empty_batch() {
        let json = render_json(&FeedConfig::default(), &[], now()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["items"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_build_description() {
        let posts = sample_posts();
        let desc = build_description(&posts[0]);

        assert!(desc.contains("<b>📂 京东</b><br />"));
        assert!(desc.contains("实物包邮<br />速度上车"));

        // no category, no content -> empty description
        let bare = ScoredPost {
            post: Post::builder("标题", "u").build(),
            quality_score: 50.0,
        };
        assert_eq!(build_description(&bare), "");
    }
}

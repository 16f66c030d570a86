//! Post domain types
//!
//! A `Post` is one crawled forum entry. The quality filter never mutates a
//! post; it wraps it in a `ScoredPost` that carries the computed score
//! alongside the untouched original fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One crawled forum entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Post title
    pub title: String,

    /// Canonical URL of the post
    pub url: String,

    /// Author / poster name
    #[serde(default)]
    pub author: String,

    /// Name of the source site this was crawled from
    #[serde(default)]
    pub source: String,

    /// Category label, may be empty or "未分类"
    #[serde(default)]
    pub category: String,

    /// Body text or summary, may be empty
    #[serde(default)]
    pub content: String,

    /// Publish time if the source exposed one
    #[serde(default)]
    pub publish_time: Option<DateTime<Utc>>,

    /// Comment count
    #[serde(default)]
    pub comments: u32,

    /// View count
    #[serde(default)]
    pub views: u32,

    /// When the crawler picked this post up
    #[serde(default)]
    pub crawl_time: Option<DateTime<Utc>>,
}

impl Post {
    /// Start building a post from its two mandatory fields
    pub fn builder(title: &str, url: &str) -> PostBuilder {
        PostBuilder::new(title, url)
    }
}

/// A post plus its computed quality score
///
/// Serializes flat, so downstream consumers see the score as just another
/// field on the post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPost {
    #[serde(flatten)]
    pub post: Post,

    /// Rule-based quality score, rounded to one decimal, always in [0, 100]
    pub quality_score: f64,
}

/// Builder for [`Post`]
pub struct PostBuilder {
    post: Post,
}

impl PostBuilder {
    pub fn new(title: &str, url: &str) -> Self {
        Self {
            post: Post {
                title: title.trim().to_string(),
                url: url.to_string(),
                ..Post::default()
            },
        }
    }

    pub fn author(mut self, author: &str) -> Self {
        self.post.author = author.trim().to_string();
        self
    }

    pub fn source(mut self, source: &str) -> Self {
        self.post.source = source.to_string();
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.post.category = category.trim().to_string();
        self
    }

    pub fn content(mut self, content: &str) -> Self {
        self.post.content = content.trim().to_string();
        self
    }

    pub fn publish_time(mut self, time: DateTime<Utc>) -> Self {
        self.post.publish_time = Some(time);
        self
    }

    pub fn comments(mut self, comments: u32) -> Self {
        self.post.comments = comments;
        self
    }

    pub fn views(mut self, views: u32) -> Self {
        self.post.views = views;
        self
    }

    pub fn crawl_time(mut self, time: DateTime<Utc>) -> Self {
        self.post.crawl_time = Some(time);
        self
    }

    pub fn build(self) -> Post {
        self.post
    }
}

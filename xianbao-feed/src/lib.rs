//! xianbao-feed - Feed rendering
//!
//! Renders a filtered, ranked batch of scored posts into three formats
//! sharing the same data: RSS 2.0, Atom 1.0 and JSON. Also owns file
//! output (with parent directory creation).

pub mod render;

pub use render::*;

use std::fs;
use std::path::Path;

use chrono::FixedOffset;
use thiserror::Error;
use tracing::info;

/// Errors from feed rendering and output
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Failed to write feed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize feed: {0}")]
    Serialize(String),
}

/// Feed channel metadata
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub title: String,
    pub link: String,
    pub description: String,
    pub language: String,
    pub generator: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            title: "高质量羊毛线报".to_string(),
            link: "https://new.ixbk.net/".to_string(),
            description: "精选高质量羊毛线报，自动过滤低质量内容".to_string(),
            language: "zh-CN".to_string(),
            generator: "xianbao-rss v0.1".to_string(),
        }
    }
}

/// Timezone feeds are rendered in (Asia/Shanghai, +08:00)
pub fn feed_tz() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).expect("+08:00 is a valid offset")
}

/// Write feed content to a file, creating parent directories as needed
pub fn save_to_file(path: &Path, content: &str) -> Result<(), FeedError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    info!("Feed saved to {}", path.display());
    Ok(())
}

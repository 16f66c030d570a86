//! xianbao-crawler - Forum crawlers
//!
//! Fetches deal-tip posts from source forums:
//! - HTTP client construction with User-Agent rotation and retry
//! - The `Source` trait every crawler implements
//! - The ixbk.net crawler (list page + optional detail enrichment)

pub mod client;
pub mod ixbk;
pub mod source;

pub use client::*;
pub use ixbk::*;
pub use source::*;

//! xianbao-core - Domain model and quality filter for deal-tip feeds
//!
//! This crate provides the foundational pieces:
//! - `Post` / `ScoredPost` domain types
//! - Compiled-in keyword and category weight tables
//! - The rule-based quality filter (scoring, thresholding, ranking, stats)

pub mod post;
pub mod quality;
pub mod rules;

pub use post::*;
pub use quality::*;
pub use rules::*;

/// Base score every post starts from
pub const BASE_SCORE: f64 = 50.0;

/// Lower bound of a quality score
pub const MIN_SCORE: f64 = 0.0;

/// Upper bound of a quality score
pub const MAX_SCORE: f64 = 100.0;

/// Default passing threshold
pub const DEFAULT_THRESHOLD: f64 = 60.0;

/// Maximum bonus from comment engagement
pub const MAX_COMMENT_BONUS: f64 = 10.0;

/// Score contributed per comment (capped at [`MAX_COMMENT_BONUS`])
pub const COMMENT_BONUS_STEP: f64 = 0.5;

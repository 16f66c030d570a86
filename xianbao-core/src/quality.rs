//! Rule-based quality filter
//!
//! Scores each post on a 0-100 scale from keyword signals, publish-time
//! recency, category weight and comment engagement, then drops everything
//! below a threshold and ranks the survivors.
//!
//! Scoring order matters: the category weight multiplies the whole
//! accumulated score (base + keyword + time), not just a category component.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    Post, ScoredPost, ScoringRules, BASE_SCORE, COMMENT_BONUS_STEP, DEFAULT_THRESHOLD,
    MAX_COMMENT_BONUS, MAX_SCORE, MIN_SCORE,
};

/// Keywords matched in a post's text, with their combined score delta
#[derive(Debug, Clone, Default)]
pub struct KeywordMatch<'a> {
    /// Signed sum of all matched keyword weights
    pub delta: i32,
    /// Positive keywords found in the text
    pub positive: Vec<&'a str>,
    /// Negative keywords found in the text
    pub negative: Vec<&'a str>,
}

/// Summary statistics over a scored batch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterStats {
    pub total: usize,
    pub avg_score: f64,
    pub max_score: f64,
    pub min_score: f64,
    pub passed: usize,
    pub filtered: usize,
    pub pass_rate: f64,
}

/// The quality filter
#[derive(Debug, Clone)]
pub struct QualityFilter {
    threshold: f64,
    rules: ScoringRules,
}

impl Default for QualityFilter {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl QualityFilter {
    /// Create a filter with the built-in rule tables
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            rules: ScoringRules::default(),
        }
    }

    /// Create a filter with a caller-supplied rule set
    pub fn with_rules(threshold: f64, rules: ScoringRules) -> Self {
        Self { threshold, rules }
    }

    /// Minimum passing score
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Match both keyword tables against a text blob
    ///
    /// Each table entry contributes its weight at most once, however many
    /// times it occurs in the text. Empty text matches nothing.
    pub fn score_keywords<'a>(&'a self, text: &str) -> KeywordMatch<'a> {
        let mut matched = KeywordMatch::default();

        for (keyword, points) in &self.rules.positive_keywords {
            if text.contains(keyword.as_str()) {
                matched.delta += points;
                matched.positive.push(keyword.as_str());
            }
        }

        for (keyword, points) in &self.rules.negative_keywords {
            if text.contains(keyword.as_str()) {
                matched.delta += points;
                matched.negative.push(keyword.as_str());
            }
        }

        matched
    }

    /// Recency bonus or penalty for a publish time, relative to `now`
    ///
    /// A missing publish time contributes nothing. A future publish time
    /// falls into the freshest bucket.
    pub fn score_time(publish_time: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i32 {
        let Some(pub_time) = publish_time else {
            return 0;
        };

        let age = now - pub_time;

        if age < Duration::hours(2) {
            10
        } else if age < Duration::hours(6) {
            5
        } else if age < Duration::hours(12) {
            0
        } else if age < Duration::hours(24) {
            -5
        } else {
            -10
        }
    }

    /// Resolve the multiplier for a category string
    ///
    /// Every table keyword contained in the category is a candidate; the
    /// maximum candidate wins, folded from a neutral 1.0. A category hitting
    /// both a premium and a discount keyword resolves to the premium one.
    pub fn category_weight(&self, category: &str) -> f64 {
        self.rules
            .category_weights
            .iter()
            .filter(|(keyword, _)| category.contains(keyword.as_str()))
            .fold(1.0, |weight, (_, multiplier)| weight.max(*multiplier))
    }

    /// Compute a post's quality score at an explicit instant
    ///
    /// Total for any post shape: missing fields degrade to neutral
    /// contributions rather than failing.
    pub fn calculate_score_at(&self, post: &Post, now: DateTime<Utc>) -> f64 {
        let mut score = BASE_SCORE;

        let text = format!("{} {} {}", post.title, post.content, post.category);
        let matched = self.score_keywords(&text);
        score += matched.delta as f64;

        let time_delta = Self::score_time(post.publish_time, now);
        score += time_delta as f64;

        // Multiplies everything accumulated so far, base included
        let weight = self.category_weight(&post.category);
        score *= weight;

        let comment_bonus = if post.comments > 0 {
            (post.comments as f64 * COMMENT_BONUS_STEP).min(MAX_COMMENT_BONUS)
        } else {
            0.0
        };
        score += comment_bonus;

        score = score.clamp(MIN_SCORE, MAX_SCORE);
        let rounded = (score * 10.0).round() / 10.0;

        debug!(
            title = %truncate(&post.title, 30),
            keyword_delta = matched.delta,
            positive = ?matched.positive,
            negative = ?matched.negative,
            time_delta,
            weight,
            comment_bonus,
            score = rounded,
            "scored post"
        );

        rounded
    }

    /// Compute a post's quality score against the current wall clock
    pub fn calculate_score(&self, post: &Post) -> f64 {
        self.calculate_score_at(post, Utc::now())
    }

    /// Score every post at an explicit instant, without filtering
    pub fn score_posts_at(&self, posts: Vec<Post>, now: DateTime<Utc>) -> Vec<ScoredPost> {
        posts
            .into_iter()
            .map(|post| {
                let quality_score = self.calculate_score_at(&post, now);
                ScoredPost {
                    post,
                    quality_score,
                }
            })
            .collect()
    }

    /// Score, threshold and rank a batch at an explicit instant
    ///
    /// Keeps posts scoring at or above the threshold, sorted descending by
    /// score. Ties keep their input order.
    pub fn filter_posts_at(&self, posts: Vec<Post>, now: DateTime<Utc>) -> Vec<ScoredPost> {
        let total = posts.len();

        let mut survivors: Vec<ScoredPost> = self
            .score_posts_at(posts, now)
            .into_iter()
            .filter(|scored| scored.quality_score >= self.threshold)
            .collect();

        // sort_by is stable, so equal scores keep input order
        survivors.sort_by(|a, b| b.quality_score.total_cmp(&a.quality_score));

        let drop_rate = if total > 0 {
            (1.0 - survivors.len() as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        info!(
            input = total,
            output = survivors.len(),
            "filter pass complete ({drop_rate:.1}% dropped)"
        );

        survivors
    }

    /// Score, threshold and rank a batch, snapshotting the clock once
    pub fn filter_posts(&self, posts: Vec<Post>) -> Vec<ScoredPost> {
        self.filter_posts_at(posts, Utc::now())
    }

    /// Summary statistics over an already-scored batch
    ///
    /// Works on either a pre-filter or post-filter collection; the caller's
    /// choice of input decides what the pass rate means.
    pub fn filter_stats(&self, scored: &[ScoredPost]) -> FilterStats {
        if scored.is_empty() {
            return FilterStats::default();
        }

        let total = scored.len();
        let sum: f64 = scored.iter().map(|p| p.quality_score).sum();
        let max_score = scored
            .iter()
            .map(|p| p.quality_score)
            .fold(f64::MIN, f64::max);
        let min_score = scored
            .iter()
            .map(|p| p.quality_score)
            .fold(f64::MAX, f64::min);
        let passed = scored
            .iter()
            .filter(|p| p.quality_score >= self.threshold)
            .count();

        FilterStats {
            total,
            avg_score: round1(sum / total as f64),
            max_score,
            min_score,
            passed,
            filtered: total - passed,
            pass_rate: round1(passed as f64 / total as f64 * 100.0),
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> QualityFilter {
        QualityFilter::new(60.0)
    }

    fn now() -> DateTime<Utc> {
        // Fixed instant so every test is reproducible
        DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_keyword_scoring_mixed_signals() {
        let filter = filter();
        let matched = filter.score_keywords("包邮好物，无需贷款");
        assert_eq!(matched.delta, 15 - 35);
        assert_eq!(matched.positive, vec!["包邮"]);
        assert_eq!(matched.negative, vec!["贷款"]);
    }

    #[test]
    fn test_keyword_scoring_counts_each_keyword_once() {
        let filter = filter();
        let once = filter.score_keywords("红包");
        let thrice = filter.score_keywords("红包红包红包");
        assert_eq!(once.delta, thrice.delta);
    }

    #[test]
    fn test_keyword_scoring_empty_text() {
        let filter = filter();
        let matched = filter.score_keywords("");
        assert_eq!(matched.delta, 0);
        assert!(matched.positive.is_empty());
        assert!(matched.negative.is_empty());
    }

    #[test]
    fn test_time_decay_buckets() {
        let now = now();
        let cases = [
            (Duration::minutes(60), 10),
            (Duration::hours(3), 5),
            (Duration::hours(8), 0),
            (Duration::hours(20), -5),
            (Duration::hours(30), -10),
        ];
        for (age, expected) in cases {
            assert_eq!(
                QualityFilter::score_time(Some(now - age), now),
                expected,
                "age {age}"
            );
        }
    }

    #[test]
    fn test_time_decay_boundary_falls_into_next_bucket() {
        let now = now();
        // exactly 2h old is no longer "< 2h"
        assert_eq!(
            QualityFilter::score_time(Some(now - Duration::hours(2)), now),
            5
        );
        assert_eq!(
            QualityFilter::score_time(Some(now - Duration::hours(24)), now),
            -10
        );
    }

    #[test]
    fn test_time_decay_future_and_missing() {
        let now = now();
        assert_eq!(
            QualityFilter::score_time(Some(now + Duration::hours(1)), now),
            10
        );
        assert_eq!(QualityFilter::score_time(None, now), 0);
    }

    #[test]
    fn test_category_weight_maximum_wins() {
        let f = filter();
        // contains both 京东 (1.2) and 抽奖 (0.7)
        assert_eq!(f.category_weight("京东抽奖"), 1.2);
        assert_eq!(f.category_weight("话费"), 1.3);
        assert_eq!(f.category_weight("未分类"), 1.0);
        assert_eq!(f.category_weight(""), 1.0);
    }

    #[test]
    fn test_category_weight_never_discounts_below_neutral() {
        // 砍价 maps to 0.4 but the fold starts at 1.0
        assert_eq!(filter().category_weight("砍价"), 1.0);
    }

    #[test]
    fn test_calculate_score_full_pipeline() {
        // 红包 +10, 京东 +10, 包邮 +15 => 85; fresh +10 => 95; 京东 * 1.2
        // => 114; clamped to 100
        let post = Post::builder("京东红包包邮", "https://example.com/p/1")
            .category("京东")
            .publish_time(now() - Duration::minutes(30))
            .build();

        assert_eq!(filter().calculate_score_at(&post, now()), 100.0);
    }

    #[test]
    fn test_calculate_score_unsaturated() {
        // 话费 +15, 充值 +12 => 77; 20h old -5 => 72; no category weight;
        // 4 comments => +2.0 => 74.0
        let post = Post::builder("话费充值", "https://example.com/p/2")
            .publish_time(now() - Duration::hours(20))
            .comments(4)
            .build();

        assert_eq!(filter().calculate_score_at(&post, now()), 74.0);
    }

    #[test]
    fn test_calculate_score_clamps_to_zero() {
        // 砍价 -30, 助力 -25, 拉人 -30 => 50 - 85 = -35, clamped to 0
        let post = Post::builder("砍价助力拉人", "https://example.com/p/3")
            .category("砍价")
            .build();

        assert_eq!(filter().calculate_score_at(&post, now()), 0.0);
    }

    #[test]
    fn test_comment_bonus_caps_at_ten() {
        let few = Post::builder("普通帖子", "https://example.com/p/4")
            .comments(6)
            .build();
        let many = Post::builder("普通帖子", "https://example.com/p/4")
            .comments(500)
            .build();

        let f = filter();
        assert_eq!(f.calculate_score_at(&few, now()), 53.0);
        assert_eq!(f.calculate_score_at(&many, now()), 60.0);
    }

    #[test]
    fn test_score_always_bounded() {
        let f = filter();
        let extremes = [
            Post::builder("0元购免单实物包邮话费流量红包京东", "u")
                .category("话费")
                .comments(1000)
                .publish_time(now() - Duration::minutes(1))
                .build(),
            Post::builder("贷款借款理财投资砍价拉人躺赚必中", "u")
                .publish_time(now() - Duration::days(30))
                .build(),
            Post::default(),
        ];

        for post in &extremes {
            let score = f.calculate_score_at(post, now());
            assert!((0.0..=100.0).contains(&score), "score {score} out of range");
        }
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let post = Post::builder("淘宝特价优惠券", "https://example.com/p/5")
            .publish_time(now() - Duration::hours(4))
            .comments(3)
            .build();

        let f = filter();
        assert_eq!(
            f.calculate_score_at(&post, now()),
            f.calculate_score_at(&post, now())
        );
    }

    #[test]
    fn test_filter_keeps_threshold_inclusive() {
        // 红包 +10 and nothing else => exactly 60.0
        let post = Post::builder("红包", "https://example.com/p/6").build();
        let f = filter();
        assert_eq!(f.calculate_score_at(&post, now()), 60.0);

        let kept = f.filter_posts_at(vec![post], now());
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_filter_sorts_descending_and_never_grows() {
        let posts = vec![
            Post::builder("红包", "https://example.com/a").build(),
            Post::builder("砍价拉人", "https://example.com/b").build(),
            Post::builder("0元购包邮", "https://example.com/c").build(),
        ];

        let n = posts.len();
        let kept = filter().filter_posts_at(posts, now());

        assert!(kept.len() <= n);
        for pair in kept.windows(2) {
            assert!(pair[0].quality_score >= pair[1].quality_score);
        }
        assert_eq!(kept[0].post.url, "https://example.com/c");
    }

    #[test]
    fn test_filter_ties_keep_input_order() {
        let posts = vec![
            Post::builder("红包", "https://example.com/first").build(),
            Post::builder("红包", "https://example.com/second").build(),
        ];

        let kept = filter().filter_posts_at(posts, now());
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].quality_score, kept[1].quality_score);
        assert_eq!(kept[0].post.url, "https://example.com/first");
        assert_eq!(kept[1].post.url, "https://example.com/second");
    }

    #[test]
    fn test_filter_preserves_passthrough_fields() {
        let post = Post::builder("京东红包包邮", "https://example.com/p/7")
            .author("楼主甲")
            .source("线报酷")
            .category("京东")
            .views(321)
            .build();

        let kept = filter().filter_posts_at(vec![post.clone()], now());
        assert_eq!(kept[0].post, post);
    }

    #[test]
    fn test_stats_empty_input() {
        let stats = filter().filter_stats(&[]);
        assert_eq!(stats, FilterStats::default());
    }

    #[test]
    fn test_stats_mixed_batch() {
        let f = filter();
        let scored = f.score_posts_at(
            vec![
                Post::builder("红包", "a").build(),           // 60.0
                Post::builder("砍价拉人", "b").build(),       // 0.0
                Post::builder("0元购包邮实物", "c").build(),  // 100.0
            ],
            now(),
        );

        let stats = f.filter_stats(&scored);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.avg_score, 53.3);
        assert_eq!(stats.max_score, 100.0);
        assert_eq!(stats.min_score, 0.0);
        assert_eq!(stats.passed, 2);
        assert_eq!(stats.filtered, 1);
        assert_eq!(stats.pass_rate, 66.7);
    }

    #[test]
    fn test_injected_rules() {
        let rules = ScoringRules {
            positive_keywords: vec![("gold".to_string(), 30)],
            negative_keywords: vec![("spam".to_string(), -40)],
            category_weights: vec![("vip".to_string(), 1.5)],
        };
        let f = QualityFilter::with_rules(60.0, rules);

        let post = Post::builder("gold deal", "u").category("vip").build();
        // (50 + 30) * 1.5 = 120 -> clamped
        assert_eq!(f.calculate_score_at(&post, now()), 100.0);
    }
}

//! Scoring rule tables
//!
//! Keyword weights and category multipliers are compiled-in constants.
//! `ScoringRules` wraps them in an owned value so a caller can inject an
//! alternative rule set; the tables themselves are never mutated after
//! construction.

/// Positive keywords and their score bonus
pub const POSITIVE_KEYWORDS: &[(&str, i32)] = &[
    // 实物类
    ("实物", 20),
    ("包邮", 15),
    ("0元购", 25),
    ("免单", 25),
    // 话费/充值类
    ("话费", 15),
    ("流量", 15),
    ("充值", 12),
    ("红包", 10),
    // 大平台
    ("京东", 10),
    ("淘宝", 10),
    ("天猫", 10),
    ("拼多多", 10),
    ("支付宝", 12),
    ("微信", 12),
    ("美团", 10),
    ("饿了么", 10),
    // 优惠力度
    ("限时", 8),
    ("秒杀", 8),
    ("特价", 5),
    ("优惠券", 5),
    ("满减", 5),
    ("折扣", 5),
    // 质量标识
    ("品牌", 5),
    ("官方", 8),
    ("正品", 5),
];

/// Negative keywords and their score penalty (weights are already negative)
pub const NEGATIVE_KEYWORDS: &[(&str, i32)] = &[
    // 高风险操作
    ("砍价", -30),
    ("拉人", -30),
    ("助力", -25),
    ("邀请", -20),
    ("组队", -25),
    ("分享", -18),
    ("转发", -18),
    // 诱导行为
    ("下载app", -20),
    ("注册", -15),
    ("实名", -15),
    ("绑卡", -20),
    ("贷款", -35),
    ("借款", -35),
    ("理财", -25),
    ("投资", -25),
    // 不确定性
    ("抽奖", -15),
    ("概率", -12),
    ("随机", -12),
    ("可能", -8),
    ("试试", -10),
    ("碰运气", -12),
    // 虚假诱导
    ("必中", -25),
    ("100%", -20),
    ("秒到", -15),
    ("躺赚", -30),
    // 复杂操作
    ("需要", -8),
    ("步骤", -10),
    ("教程", -8),
];

/// Category keywords and their score multiplier
///
/// Resolution folds `max` starting from 1.0, so sub-1.0 entries mark a
/// category as unremarkable rather than discounting it below neutral.
pub const CATEGORY_WEIGHTS: &[(&str, f64)] = &[
    ("京东", 1.2),
    ("淘宝", 1.1),
    ("支付宝", 1.2),
    ("话费", 1.3),
    ("实物", 1.2),
    ("红包", 1.1),
    ("抽奖", 0.7),
    ("助力", 0.5),
    ("砍价", 0.4),
];

/// An injectable set of scoring tables
#[derive(Debug, Clone)]
pub struct ScoringRules {
    pub positive_keywords: Vec<(String, i32)>,
    pub negative_keywords: Vec<(String, i32)>,
    pub category_weights: Vec<(String, f64)>,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            positive_keywords: owned(POSITIVE_KEYWORDS),
            negative_keywords: owned(NEGATIVE_KEYWORDS),
            category_weights: CATEGORY_WEIGHTS
                .iter()
                .map(|(k, w)| (k.to_string(), *w))
                .collect(),
        }
    }
}

fn owned(table: &[(&str, i32)]) -> Vec<(String, i32)> {
    table.iter().map(|(k, w)| (k.to_string(), *w)).collect()
}

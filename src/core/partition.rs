// src/core/partition.rs

//! Splits a scan result into the checks shown for free and the checks kept
//! behind the paywall.

use crate::core::models::{CheckResult, ScanResult};
use lazy_static::lazy_static;
use std::collections::BTreeSet;

lazy_static! {
    /// Check ids disclosed when the configuration does not name any.
    pub static ref DEFAULT_FREE_CHECKS: Vec<&'static str> = vec![
        "https_redirect",
        "ssl_valid",
        "hsts",
        "x_frame_options",
        "x_content_type_options",
    ];
}

/// Half-width of the score band shown before purchase.
pub const SCORE_BAND_SPREAD: u8 = 8;

/// Fixed set of check ids that are shown for free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisclosurePolicy {
    free_ids: BTreeSet<String>,
}

impl DisclosurePolicy {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { free_ids: ids.into_iter().map(Into::into).collect() }
    }

    pub fn is_free(&self, check_id: &str) -> bool {
        self.free_ids.contains(check_id)
    }

    pub fn len(&self) -> usize {
        self.free_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free_ids.is_empty()
    }
}

impl Default for DisclosurePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_FREE_CHECKS.iter().copied())
    }
}

/// Widened range around the true score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBand {
    pub low: u8,
    pub high: u8,
}

impl ScoreBand {
    pub fn around(score: u8) -> Self {
        let score = score.min(100);
        Self {
            low: score.saturating_sub(SCORE_BAND_SPREAD),
            high: score.saturating_add(SCORE_BAND_SPREAD).min(100),
        }
    }
}

impl std::fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}–{}", self.low, self.high)
    }
}

/// Everything the result view needs, derived from one scan.
#[derive(Debug, Clone)]
pub struct Partition<'a> {
    pub free_checks: Vec<&'a CheckResult>,
    pub hidden_checks: Vec<&'a CheckResult>,
    pub free_categories: Vec<&'a str>,
    pub hidden_categories: Vec<&'a str>,
    pub hidden_vulnerability_count: usize,
    pub score_band: ScoreBand,
}

/// Partitions `result.checks` using `policy` as the only discriminator.
pub fn partition<'a>(result: &'a ScanResult, policy: &DisclosurePolicy) -> Partition<'a> {
    let (free_checks, hidden_checks): (Vec<_>, Vec<_>) =
        result.checks.iter().partition(|check| policy.is_free(&check.id));

    let hidden_vulnerability_count = hidden_checks.iter().filter(|c| c.status.is_vulnerability()).count();

    Partition {
        free_categories: categories(&free_checks),
        hidden_categories: categories(&hidden_checks),
        free_checks,
        hidden_checks,
        hidden_vulnerability_count,
        score_band: ScoreBand::around(result.score),
    }
}

/// Distinct categories in first-occurrence order.
pub fn categories<'a>(checks: &[&'a CheckResult]) -> Vec<&'a str> {
    let mut seen = Vec::new();
    for check in checks {
        if !seen.contains(&check.category.as_str()) {
            seen.push(check.category.as_str());
        }
    }
    seen
}

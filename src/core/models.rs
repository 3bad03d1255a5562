// src/core/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// --- Check Models ---

/// Outcome of a single security check as reported by the scanning service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl CheckStatus {
    /// Warnings and failures both count as vulnerabilities for the teaser.
    pub fn is_vulnerability(self) -> bool {
        matches!(self, CheckStatus::Warn | CheckStatus::Fail)
    }
}

/// One check inside a scan result. Identity is `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckResult {
    pub id: String,
    pub name: String,
    pub category: String,
    pub status: CheckStatus,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Letter grade attached to a scan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

// --- Scan Result ---

/// The full result of one successful scan.
///
/// Instances handed to the session always satisfy
/// `passed + warnings + failed == total_checks == checks.len()`; a body that
/// breaks this is rejected by [`ScanResult::verify`] before it gets that far.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanResult {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    pub score: u8,
    pub grade: Grade,
    pub checks: Vec<CheckResult>,
    pub scan_time_seconds: f64,
    pub total_checks: usize,
    pub passed: usize,
    pub warnings: usize,
    pub failed: usize,
}

/// Tally of check statuses, used to cross-check the counts the service sends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatusTally {
    pub passed: usize,
    pub warnings: usize,
    pub failed: usize,
}

impl StatusTally {
    pub fn of(checks: &[CheckResult]) -> Self {
        checks.iter().fold(Self::default(), |mut tally, check| {
            match check.status {
                CheckStatus::Pass => tally.passed += 1,
                CheckStatus::Warn => tally.warnings += 1,
                CheckStatus::Fail => tally.failed += 1,
            }
            tally
        })
    }
}

impl ScanResult {
    /// Checks the structural invariants of a freshly decoded result.
    ///
    /// Returns a short description of the first violation found.
    pub fn verify(&self) -> Result<(), String> {
        if self.score > 100 {
            return Err(format!("score {} is outside 0-100", self.score));
        }
        if !self.scan_time_seconds.is_finite() || self.scan_time_seconds < 0.0 {
            return Err(format!("invalid scan time {}", self.scan_time_seconds));
        }
        if self.total_checks != self.checks.len() {
            return Err(format!(
                "total_checks is {} but {} checks were returned",
                self.total_checks,
                self.checks.len()
            ));
        }
        let tally = StatusTally::of(&self.checks);
        if tally.passed != self.passed || tally.warnings != self.warnings || tally.failed != self.failed {
            return Err(format!(
                "status counts {}/{}/{} do not match checks {}/{}/{}",
                self.passed, self.warnings, self.failed, tally.passed, tally.warnings, tally.failed
            ));
        }
        Ok(())
    }

    /// Host to show in titles; falls back to the scanned URL.
    pub fn display_host(&self) -> &str {
        self.hostname.as_deref().unwrap_or(&self.url)
    }
}

// --- Wire Payloads ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanRequest {
    pub url: String,
}

/// Body shared by `/checkout` and `/report`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderRequest {
    pub url: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutResponse {
    #[serde(default)]
    pub init_point: Option<String>,
}

/// Confirmation returned by the email-delivery variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportReceipt {
    pub grade: Grade,
    pub score: u8,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

/// Page-view beacon payload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TrackEvent {
    pub path: String,
    pub referrer: String,
}

// --- Order Models ---

/// What the user asked for when requesting the full report.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub email: String,
    pub url: String,
    pub grade: Grade,
    pub score: u8,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum OrderOutcome {
    Pending,
    Sent,
    Failed,
}

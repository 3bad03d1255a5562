// src/core/session.rs

//! State machines for one scan session: the scan itself, the offer
//! countdown and the report-unlock order.
//!
//! Every outbound request gets a [`RequestToken`]. Completions carry the
//! token back, and a completion whose token is no longer current is
//! rejected with [`SessionError::StaleResponse`] without touching state.

use crate::core::countdown::Countdown;
use crate::core::error::{Action, ApiError, SessionError, ValidationError};
use crate::core::models::{OrderOutcome, OrderRecord, ReportReceipt, ScanResult};
use crate::core::validator::{validate_order, validate_url};
use chrono::Utc;
use serde::Deserialize;
use strum::{Display, EnumString};
use tracing::{debug, info, warn};

pub const SCAN_FAILED: &str = "Scan failed";
pub const CHECKOUT_FAILED: &str = "Failed to create checkout";
pub const REPORT_FAILED: &str = "Failed to generate report";

/// Correlates a response with the request that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Which report-unlock path this deployment wires to the unlock action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Display, EnumString, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum UnlockVariant {
    /// Redirect to the external payment page.
    #[default]
    Checkout,
    /// Legacy flow: email the full report directly.
    EmailReport,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanState {
    Idle,
    Scanning { token: RequestToken, url: String },
    Result(Box<ScanResult>),
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderState {
    Idle,
    Ordering { token: RequestToken, record: OrderRecord },
    /// Payment page issued; control leaves the application.
    Redirected { target: String, record: OrderRecord },
    /// Report emailed (legacy variant). Terminal until the next scan.
    Sent(OrderRecord),
    Error { message: String, record: Option<OrderRecord> },
}

impl OrderState {
    pub fn outcome(&self) -> Option<OrderOutcome> {
        match self {
            OrderState::Idle => None,
            OrderState::Ordering { .. } | OrderState::Redirected { .. } => Some(OrderOutcome::Pending),
            OrderState::Sent(_) => Some(OrderOutcome::Sent),
            OrderState::Error { .. } => Some(OrderOutcome::Failed),
        }
    }
}

/// A scan that has been accepted and must now be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTicket {
    pub token: RequestToken,
    pub url: String,
}

/// An order that has been accepted and must now be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTicket {
    pub token: RequestToken,
    pub variant: UnlockVariant,
    pub url: String,
    pub email: String,
}

/// All state owned by the running session.
#[derive(Debug)]
pub struct Session {
    variant: UnlockVariant,
    scan: ScanState,
    order: OrderState,
    countdown: Option<Countdown>,
    target: Option<String>,
    next_token: u64,
}

impl Session {
    pub fn new(variant: UnlockVariant) -> Self {
        Self {
            variant,
            scan: ScanState::Idle,
            order: OrderState::Idle,
            countdown: None,
            target: None,
            next_token: 0,
        }
    }

    pub fn variant(&self) -> UnlockVariant {
        self.variant
    }

    pub fn scan(&self) -> &ScanState {
        &self.scan
    }

    pub fn order(&self) -> &OrderState {
        &self.order
    }

    pub fn countdown(&self) -> Option<&Countdown> {
        self.countdown.as_ref()
    }

    /// The last URL accepted for scanning.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn result(&self) -> Option<&ScanResult> {
        match &self.scan {
            ScanState::Result(result) => Some(result.as_ref()),
            _ => None,
        }
    }

    pub fn is_scanning(&self) -> bool {
        matches!(self.scan, ScanState::Scanning { .. })
    }

    pub fn is_ordering(&self) -> bool {
        matches!(self.order, OrderState::Ordering { .. })
    }

    fn issue_token(&mut self) -> RequestToken {
        self.next_token += 1;
        RequestToken(self.next_token)
    }

    // --- Scan Dispatcher ---

    /// Accepts a scan submission. On validation failure nothing changes.
    ///
    /// Starting a new scan discards the previous result, order and countdown.
    pub fn begin_scan(&mut self, raw: &str) -> Result<ScanTicket, SessionError> {
        let url = validate_url(raw)?;
        let token = self.issue_token();
        info!(url = %url, token = token.value(), "Scan submitted.");

        self.scan = ScanState::Scanning { token, url: url.clone() };
        self.order = OrderState::Idle;
        self.countdown = None;
        self.target = Some(url.clone());
        Ok(ScanTicket { token, url })
    }

    pub fn complete_scan(
        &mut self,
        token: RequestToken,
        response: Result<ScanResult, ApiError>,
    ) -> Result<(), SessionError> {
        match &self.scan {
            ScanState::Scanning { token: current, .. } if *current == token => {}
            _ => {
                debug!(token = token.value(), "Ignoring stale scan response.");
                return Err(SessionError::StaleResponse { action: Action::Scan, token: token.value() });
            }
        }

        self.scan = match response {
            Ok(result) => {
                info!(score = result.score, grade = %result.grade, checks = result.total_checks, "Scan finished.");
                self.countdown = Some(Countdown::start());
                ScanState::Result(Box::new(result))
            }
            Err(err) => {
                warn!(error = %err, "Scan failed.");
                ScanState::Error(err.user_message(SCAN_FAILED))
            }
        };
        Ok(())
    }

    /// Dismisses a scan error so the user can try again.
    pub fn acknowledge_scan_error(&mut self) {
        if let ScanState::Error(_) = self.scan {
            self.scan = ScanState::Idle;
        }
    }

    // --- Urgency Timer ---

    pub fn tick(&mut self) {
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.tick();
        }
    }

    // --- Checkout / Report Delivery ---

    /// Accepts an unlock request for the current target.
    ///
    /// Fails locally, without a request, when the email or URL is missing, an
    /// order is already in flight, or this result was already unlocked.
    pub fn begin_order(&mut self, email: &str) -> Result<OrderTicket, SessionError> {
        match self.order {
            OrderState::Idle | OrderState::Error { .. } => {}
            OrderState::Ordering { .. } => return Err(SessionError::OrderInFlight),
            OrderState::Redirected { .. } | OrderState::Sent(_) => return Err(SessionError::OrderClosed),
        }
        let (url, email) = validate_order(self.target.as_deref(), email)?;
        let result = self.result().ok_or(SessionError::Validation(ValidationError::MissingUrl))?;

        let record = OrderRecord {
            email: email.clone(),
            url: url.clone(),
            grade: result.grade,
            score: result.score,
            requested_at: Utc::now(),
        };
        let token = self.issue_token();
        info!(variant = %self.variant, token = token.value(), "Unlock requested.");
        self.order = OrderState::Ordering { token, record };
        Ok(OrderTicket { token, variant: self.variant, url, email })
    }

    /// Applies a checkout response. Returns the redirect target on success.
    pub fn complete_checkout(
        &mut self,
        token: RequestToken,
        response: Result<String, ApiError>,
    ) -> Result<Option<String>, SessionError> {
        let record = self.take_ordering(token)?;
        match response {
            Ok(target) => {
                info!(target = %target, "Checkout created, redirecting.");
                self.order = OrderState::Redirected { target: target.clone(), record };
                Ok(Some(target))
            }
            Err(err) => {
                warn!(error = %err, "Checkout failed.");
                self.order = OrderState::Error { message: err.user_message(CHECKOUT_FAILED), record: Some(record) };
                Ok(None)
            }
        }
    }

    /// Applies an email-report response (legacy variant).
    pub fn complete_report(
        &mut self,
        token: RequestToken,
        response: Result<ReportReceipt, ApiError>,
    ) -> Result<(), SessionError> {
        let mut record = self.take_ordering(token)?;
        match response {
            Ok(receipt) => {
                info!(email = %record.email, grade = %receipt.grade, "Report sent.");
                record.grade = receipt.grade;
                record.score = receipt.score;
                self.order = OrderState::Sent(record);
            }
            Err(err) => {
                warn!(error = %err, "Report request failed.");
                self.order = OrderState::Error { message: err.user_message(REPORT_FAILED), record: Some(record) };
            }
        }
        Ok(())
    }

    /// Records a local validation failure so the form can show it.
    pub fn reject_order(&mut self, err: &ValidationError) {
        match self.order {
            OrderState::Idle | OrderState::Error { .. } => {
                self.order = OrderState::Error { message: err.to_string(), record: None };
            }
            OrderState::Ordering { .. } | OrderState::Redirected { .. } | OrderState::Sent(_) => {}
        }
    }

    /// Dismisses an order error so the user can retry.
    pub fn acknowledge_order_error(&mut self) {
        if let OrderState::Error { .. } = self.order {
            self.order = OrderState::Idle;
        }
    }

    fn take_ordering(&mut self, token: RequestToken) -> Result<OrderRecord, SessionError> {
        match &self.order {
            OrderState::Ordering { token: current, record } if *current == token => Ok(record.clone()),
            _ => {
                debug!(token = token.value(), "Ignoring stale order response.");
                Err(SessionError::StaleResponse { action: Action::Order, token: token.value() })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Grade;
    use crate::core::models::fixtures::example_result;

    fn session_with_result() -> Session {
        let mut session = Session::new(UnlockVariant::Checkout);
        let ticket = session.begin_scan("example.com").unwrap();
        session.complete_scan(ticket.token, Ok(example_result())).unwrap();
        session
    }

    #[test]
    fn blank_submission_changes_nothing() {
        let mut session = Session::new(UnlockVariant::Checkout);
        let err = session.begin_scan("   ").unwrap_err();
        assert_eq!(err, SessionError::Validation(ValidationError::EmptyUrl));
        assert_eq!(session.scan(), &ScanState::Idle);
        assert!(session.target().is_none());
    }

    #[test]
    fn idle_scanning_result() {
        let mut session = Session::new(UnlockVariant::Checkout);
        let ticket = session.begin_scan(" example.com ").unwrap();
        assert_eq!(ticket.url, "example.com");
        assert!(session.is_scanning());
        assert!(session.countdown().is_none());

        session.complete_scan(ticket.token, Ok(example_result())).unwrap();
        assert_eq!(session.result(), Some(&example_result()));
        assert_eq!(session.countdown().map(|c| c.seconds_remaining()), Some(900));
    }

    #[test]
    fn scan_error_uses_detail_then_returns_to_idle() {
        let mut session = Session::new(UnlockVariant::Checkout);
        let ticket = session.begin_scan("example.com").unwrap();
        let err = ApiError::transport(Some(504), Some("Target site did not respond in time.".into()));
        session.complete_scan(ticket.token, Err(err)).unwrap();
        assert_eq!(session.scan(), &ScanState::Error("Target site did not respond in time.".into()));
        assert!(session.countdown().is_none());

        session.acknowledge_scan_error();
        assert_eq!(session.scan(), &ScanState::Idle);
    }

    #[test]
    fn malformed_scan_uses_fallback() {
        let mut session = Session::new(UnlockVariant::Checkout);
        let ticket = session.begin_scan("example.com").unwrap();
        session.complete_scan(ticket.token, Err(ApiError::MalformedResponse("bad json".into()))).unwrap();
        assert_eq!(session.scan(), &ScanState::Error(SCAN_FAILED.into()));
    }

    #[test]
    fn stale_scan_response_is_discarded() {
        let mut session = Session::new(UnlockVariant::Checkout);
        let first = session.begin_scan("first.example").unwrap();
        let second = session.begin_scan("second.example").unwrap();

        let mut newer = example_result();
        newer.url = "second.example".into();
        session.complete_scan(second.token, Ok(newer.clone())).unwrap();

        let mut older = example_result();
        older.url = "first.example".into();
        let err = session.complete_scan(first.token, Ok(older)).unwrap_err();
        assert_eq!(err, SessionError::StaleResponse { action: Action::Scan, token: first.token.value() });
        assert_eq!(session.result(), Some(&newer));
    }

    #[test]
    fn stale_response_while_newer_in_flight() {
        let mut session = Session::new(UnlockVariant::Checkout);
        let first = session.begin_scan("first.example").unwrap();
        let second = session.begin_scan("second.example").unwrap();

        assert!(session.complete_scan(first.token, Ok(example_result())).is_err());
        assert!(session.is_scanning());
        session.complete_scan(second.token, Err(ApiError::transport(None, None))).unwrap();
        assert_eq!(session.scan(), &ScanState::Error(SCAN_FAILED.into()));
    }

    #[test]
    fn rescan_discards_order_and_countdown() {
        let mut session = session_with_result();
        session.tick();
        let ticket = session.begin_order("me@example.com").unwrap();
        session.complete_checkout(ticket.token, Err(ApiError::transport(Some(500), None))).unwrap();

        session.begin_scan("other.example").unwrap();
        assert_eq!(session.order(), &OrderState::Idle);
        assert!(session.countdown().is_none());
        assert!(session.result().is_none());
    }

    #[test]
    fn countdown_ignores_errors_and_orders() {
        let mut session = session_with_result();
        for _ in 0..10 {
            session.tick();
        }
        let ticket = session.begin_order("me@example.com").unwrap();
        session.complete_checkout(ticket.token, Err(ApiError::transport(None, None))).unwrap();
        session.acknowledge_order_error();
        assert_eq!(session.countdown().map(|c| c.seconds_remaining()), Some(890));
    }

    #[test]
    fn order_without_email_fails_locally() {
        let mut session = session_with_result();
        let err = session.begin_order("  ").unwrap_err();
        assert_eq!(err, SessionError::Validation(ValidationError::MissingEmail));
        assert_eq!(session.order(), &OrderState::Idle);
    }

    #[test]
    fn order_without_result_fails_locally() {
        let mut session = Session::new(UnlockVariant::Checkout);
        let err = session.begin_order("me@example.com").unwrap_err();
        assert_eq!(err, SessionError::Validation(ValidationError::MissingUrl));
    }

    #[test]
    fn second_order_while_ordering_is_refused() {
        let mut session = session_with_result();
        session.begin_order("me@example.com").unwrap();
        assert_eq!(session.begin_order("me@example.com").unwrap_err(), SessionError::OrderInFlight);
    }

    #[test]
    fn checkout_redirects() {
        let mut session = session_with_result();
        let ticket = session.begin_order(" me@example.com ").unwrap();
        assert_eq!(ticket.email, "me@example.com");
        assert_eq!(ticket.url, "example.com");
        assert_eq!(session.order().outcome(), Some(OrderOutcome::Pending));

        let target = session
            .complete_checkout(ticket.token, Ok("https://pay.example/checkout/123".into()))
            .unwrap();
        assert_eq!(target.as_deref(), Some("https://pay.example/checkout/123"));
        assert!(matches!(session.order(), OrderState::Redirected { .. }));
    }

    #[test]
    fn checkout_failure_is_retriable() {
        let mut session = session_with_result();
        let ticket = session.begin_order("me@example.com").unwrap();
        let err = ApiError::MalformedResponse("missing init_point".into());
        assert_eq!(session.complete_checkout(ticket.token, Err(err)).unwrap(), None);
        match session.order() {
            OrderState::Error { message, .. } => assert_eq!(message, CHECKOUT_FAILED),
            other => panic!("unexpected order state {other:?}"),
        }
        assert_eq!(session.order().outcome(), Some(OrderOutcome::Failed));

        session.acknowledge_order_error();
        assert!(session.begin_order("me@example.com").is_ok());
    }

    #[test]
    fn report_variant_stores_sent_state() {
        let mut session = Session::new(UnlockVariant::EmailReport);
        let scan = session.begin_scan("example.com").unwrap();
        session.complete_scan(scan.token, Ok(example_result())).unwrap();

        let ticket = session.begin_order("me@example.com").unwrap();
        assert_eq!(ticket.variant, UnlockVariant::EmailReport);
        session
            .complete_report(ticket.token, Ok(ReportReceipt { grade: Grade::C, score: 72 }))
            .unwrap();
        match session.order() {
            OrderState::Sent(record) => {
                assert_eq!(record.email, "me@example.com");
                assert_eq!((record.grade, record.score), (Grade::C, 72));
            }
            other => panic!("unexpected order state {other:?}"),
        }
        assert_eq!(session.order().outcome(), Some(OrderOutcome::Sent));
    }

    #[test]
    fn unlocked_order_stays_closed_until_rescan() {
        let mut session = Session::new(UnlockVariant::EmailReport);
        let scan = session.begin_scan("example.com").unwrap();
        session.complete_scan(scan.token, Ok(example_result())).unwrap();
        let ticket = session.begin_order("me@example.com").unwrap();
        session
            .complete_report(ticket.token, Ok(ReportReceipt { grade: Grade::C, score: 72 }))
            .unwrap();

        assert_eq!(session.begin_order("other@example.com").unwrap_err(), SessionError::OrderClosed);
        session.reject_order(&ValidationError::MissingEmail);
        assert_eq!(session.order().outcome(), Some(OrderOutcome::Sent));

        session.begin_scan("example.com").unwrap();
        assert_eq!(session.order(), &OrderState::Idle);
    }

    #[test]
    fn redirected_order_is_closed() {
        let mut session = session_with_result();
        let ticket = session.begin_order("me@example.com").unwrap();
        session.complete_checkout(ticket.token, Ok("https://pay.example/c/9".into())).unwrap();

        assert_eq!(session.begin_order("me@example.com").unwrap_err(), SessionError::OrderClosed);
        session.reject_order(&ValidationError::MissingEmail);
        assert!(matches!(session.order(), OrderState::Redirected { .. }));
    }

    #[test]
    fn report_failure_uses_fallback() {
        let mut session = Session::new(UnlockVariant::EmailReport);
        let scan = session.begin_scan("example.com").unwrap();
        session.complete_scan(scan.token, Ok(example_result())).unwrap();
        let ticket = session.begin_order("me@example.com").unwrap();
        session.complete_report(ticket.token, Err(ApiError::transport(None, None))).unwrap();
        assert!(matches!(session.order(), OrderState::Error { message, .. } if message == REPORT_FAILED));
    }

    #[test]
    fn stale_order_response_is_discarded() {
        let mut session = session_with_result();
        let ticket = session.begin_order("me@example.com").unwrap();
        session.begin_scan("example.com").unwrap();
        let err = session.complete_checkout(ticket.token, Ok("https://pay.example".into())).unwrap_err();
        assert_eq!(err, SessionError::StaleResponse { action: Action::Order, token: ticket.token.value() });
        assert_eq!(session.order(), &OrderState::Idle);
    }

    #[test]
    fn variant_parses_from_config_text() {
        assert_eq!("email-report".parse::<UnlockVariant>().unwrap(), UnlockVariant::EmailReport);
        assert_eq!(UnlockVariant::default().to_string(), "checkout");
    }
}

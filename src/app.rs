// src/app.rs

use crate::core::dispatcher::{AppEvent, Request};
use crate::core::error::SessionError;
use crate::core::partition::{DisclosurePolicy, Partition, partition};
use crate::core::session::{OrderState, OrderTicket, ScanState, ScanTicket, Session, UnlockVariant};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ScrollbarState;
use tracing::debug;

pub const SPINNER_CHARS: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Which input field receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Url,
    Email,
}

/// Coarse screen the user is looking at, reported to the page-view beacon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Scanning,
    Result,
    ScanError,
    ReportSent,
    Checkout,
}

impl View {
    pub fn path(self) -> &'static str {
        match self {
            View::Home => "/",
            View::Scanning => "/scan",
            View::Result => "/result",
            View::ScanError => "/scan/error",
            View::ReportSent => "/report/sent",
            View::Checkout => "/report/pending",
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub session: Session,
    pub policy: DisclosurePolicy,
    pub url_input: String,
    pub email_input: String,
    pub focus: Focus,
    pub scroll_offset: usize,
    /// Line count of the report pane as last rendered.
    pub report_length: usize,
    pub report_scroll_state: ScrollbarState,
    pub spinner_frame: usize,
    /// Checkout page to open once the terminal is restored.
    pub redirect: Option<String>,
    last_view: Option<View>,
}

impl App {
    pub fn new(variant: UnlockVariant, policy: DisclosurePolicy) -> Self {
        Self {
            should_quit: false,
            session: Session::new(variant),
            policy,
            url_input: String::new(),
            email_input: String::new(),
            focus: Focus::Url,
            scroll_offset: 0,
            report_length: 0,
            report_scroll_state: ScrollbarState::default(),
            spinner_frame: 0,
            redirect: None,
            last_view: None,
        }
    }

    /// The free/hidden split of the current result, if there is one.
    pub fn partition(&self) -> Option<Partition<'_>> {
        self.session.result().map(|result| partition(result, &self.policy))
    }

    pub fn view(&self) -> View {
        match (self.session.scan(), self.session.order()) {
            (ScanState::Idle, _) => View::Home,
            (ScanState::Scanning { .. }, _) => View::Scanning,
            (ScanState::Error(_), _) => View::ScanError,
            (ScanState::Result(_), OrderState::Sent(_)) => View::ReportSent,
            (ScanState::Result(_), OrderState::Redirected { .. }) => View::Checkout,
            (ScanState::Result(_), _) => View::Result,
        }
    }

    /// Returns `(path, referrer)` when the view changed since the last call.
    pub fn take_view_change(&mut self) -> Option<(&'static str, &'static str)> {
        let view = self.view();
        if self.last_view == Some(view) {
            return None;
        }
        let referrer = self.last_view.map(View::path).unwrap_or("");
        self.last_view = Some(view);
        Some((view.path(), referrer))
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
        self.report_scroll_state = self.report_scroll_state.position(self.scroll_offset);
    }

    pub fn scroll_down(&mut self) {
        let last_line = self.report_length.saturating_sub(1);
        self.scroll_offset = self.scroll_offset.saturating_add(1).min(last_line);
        self.report_scroll_state = self.report_scroll_state.position(self.scroll_offset);
    }

    /// Called once per second.
    pub fn on_tick(&mut self) {
        self.session.tick();
    }

    pub fn advance_spinner(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_CHARS.len();
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Submits the URL field. Ignored while a scan is running.
    pub fn submit_scan(&mut self) -> Option<ScanTicket> {
        if self.session.is_scanning() {
            return None;
        }
        match self.session.begin_scan(&self.url_input) {
            Ok(ticket) => {
                self.focus = Focus::Url;
                self.scroll_offset = 0;
                self.report_scroll_state = ScrollbarState::default();
                Some(ticket)
            }
            Err(err) => {
                debug!(error = %err, "Scan submission rejected.");
                None
            }
        }
    }

    /// Submits the email field for the active unlock variant.
    pub fn submit_order(&mut self) -> Option<OrderTicket> {
        self.session.acknowledge_order_error();
        match self.session.begin_order(&self.email_input) {
            Ok(ticket) => Some(ticket),
            Err(SessionError::Validation(err)) => {
                self.session.reject_order(&err);
                None
            }
            Err(err) => {
                debug!(error = %err, "Order submission ignored.");
                None
            }
        }
    }

    /// Applies a network completion. Stale completions change nothing.
    pub fn apply(&mut self, event: AppEvent) {
        let outcome = match event {
            AppEvent::ScanFinished { token, response } => {
                let applied = self.session.complete_scan(token, response);
                if applied.is_ok() && self.session.result().is_some() {
                    self.focus = Focus::Email;
                }
                applied
            }
            AppEvent::CheckoutFinished { token, response } => {
                self.session.complete_checkout(token, response).map(|target| {
                    if let Some(target) = target {
                        self.redirect = Some(target);
                        self.quit();
                    }
                })
            }
            AppEvent::ReportFinished { token, response } => self.session.complete_report(token, response),
        };
        match outcome {
            Ok(()) => debug!(order = ?self.session.order().outcome(), "Completion applied."),
            Err(err) => debug!(error = %err, "Completion dropped."),
        }
    }

    /// Handles one key press and returns any request that must be sent.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Request> {
        if key.code == KeyCode::Esc || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)) {
            self.quit();
            return None;
        }

        if let ScanState::Error(_) = self.session.scan() {
            if key.code == KeyCode::Enter {
                self.session.acknowledge_scan_error();
            }
            return None;
        }

        match key.code {
            KeyCode::Up => self.scroll_up(),
            KeyCode::Down => self.scroll_down(),
            KeyCode::Tab | KeyCode::BackTab => {
                if self.session.result().is_some() {
                    self.focus = match self.focus {
                        Focus::Url => Focus::Email,
                        Focus::Email => Focus::Url,
                    };
                }
            }
            _ => {
                return match self.focus {
                    Focus::Url => self.handle_url_key(key.code),
                    Focus::Email => self.handle_email_key(key.code),
                };
            }
        }
        None
    }

    fn handle_url_key(&mut self, code: KeyCode) -> Option<Request> {
        if self.session.is_scanning() {
            return None;
        }
        match code {
            KeyCode::Char(c) => self.url_input.push(c),
            KeyCode::Backspace => {
                self.url_input.pop();
            }
            KeyCode::Enter => return self.submit_scan().map(Request::Scan),
            _ => {}
        }
        None
    }

    fn handle_email_key(&mut self, code: KeyCode) -> Option<Request> {
        match self.session.order() {
            OrderState::Ordering { .. } | OrderState::Redirected { .. } | OrderState::Sent(_) => return None,
            OrderState::Idle | OrderState::Error { .. } => {}
        }
        match code {
            KeyCode::Char(c) => {
                self.session.acknowledge_order_error();
                self.email_input.push(c);
            }
            KeyCode::Backspace => {
                self.session.acknowledge_order_error();
                self.email_input.pop();
            }
            KeyCode::Enter => return self.submit_order().map(Request::Order),
            _ => {}
        }
        None
    }
}

// src/core/dispatcher.rs

//! Runs backend calls off the UI loop and reports back over a channel.
//!
//! Each completion carries the [`RequestToken`] it was issued with so the
//! session can drop responses that arrive after a newer request.

use crate::core::api::Backend;
use crate::core::error::ApiError;
use crate::core::models::{ReportReceipt, ScanResult, TrackEvent};
use crate::core::session::{OrderTicket, RequestToken, ScanTicket, UnlockVariant};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// A request the event loop must send on the app's behalf.
#[derive(Debug, PartialEq, Eq)]
pub enum Request {
    Scan(ScanTicket),
    Order(OrderTicket),
}

/// Network completions delivered to the event loop.
#[derive(Debug)]
pub enum AppEvent {
    ScanFinished { token: RequestToken, response: Result<ScanResult, ApiError> },
    CheckoutFinished { token: RequestToken, response: Result<String, ApiError> },
    ReportFinished { token: RequestToken, response: Result<ReportReceipt, ApiError> },
}

pub fn dispatch(backend: Arc<dyn Backend>, request: Request, tx: mpsc::Sender<AppEvent>) {
    match request {
        Request::Scan(ticket) => spawn_scan(backend, ticket, tx),
        Request::Order(ticket) => spawn_order(backend, ticket, tx),
    }
}

pub fn spawn_scan(backend: Arc<dyn Backend>, ticket: ScanTicket, tx: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        let response = backend.scan(&ticket.url).await;
        if tx.send(AppEvent::ScanFinished { token: ticket.token, response }).await.is_err() {
            debug!("Event loop gone before scan completed.");
        }
    });
}

/// Sends the order through whichever unlock path the ticket was issued for.
pub fn spawn_order(backend: Arc<dyn Backend>, ticket: OrderTicket, tx: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        let event = match ticket.variant {
            UnlockVariant::Checkout => AppEvent::CheckoutFinished {
                token: ticket.token,
                response: backend.checkout(&ticket.url, &ticket.email).await,
            },
            UnlockVariant::EmailReport => AppEvent::ReportFinished {
                token: ticket.token,
                response: backend.report(&ticket.url, &ticket.email).await,
            },
        };
        if tx.send(event).await.is_err() {
            debug!("Event loop gone before order completed.");
        }
    });
}

/// Fire-and-forget page-view beacon.
pub fn spawn_beacon(backend: Arc<dyn Backend>, path: &'static str, referrer: &'static str) {
    tokio::spawn(async move {
        send_beacon(backend.as_ref(), path, referrer).await;
    });
}

/// Sends the beacon inline. Used for the last view before exit, when a
/// spawned task would be dropped with the runtime.
pub async fn send_beacon(backend: &dyn Backend, path: &str, referrer: &str) {
    backend
        .track(TrackEvent { path: path.to_string(), referrer: referrer.to_string() })
        .await;
}

// src/core/mod.rs

/// Data structures exchanged with the WebSecCheck API.
pub mod models;

/// Error types for validation, transport and session state.
pub mod error;

/// Input checks run before anything is sent.
pub mod validator;

/// Free/locked split of a scan result and the obfuscated score band.
pub mod partition;

/// Offer countdown shown next to the unlock form.
pub mod countdown;

/// Scan and order state machines with request correlation.
pub mod session;

/// The `Backend` trait and its HTTP implementation.
pub mod api;

/// Spawns backend calls and reports completions to the event loop.
pub mod dispatcher;

//! Client reconciliation and intent-dispatch engine for the two-player UNO
//! app.
//!
//! The authoritative server pushes complete state snapshots; this crate turns
//! that stream into a consistent local view, mirrors play legality for
//! instant feedback, manages the room lobby, sequences the two-step wild
//! color flow, and reports game outcomes exactly once. It never becomes a
//! second source of truth: every local check is advisory and the latest
//! accepted snapshot always wins.

pub mod channel;
pub mod controller;
pub mod lobby;
pub mod origin;
pub mod results;
pub mod state;
pub mod transport;

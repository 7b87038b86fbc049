//! Core client library for a comic reading platform.
//!
//! This crate holds the non-visual logic shared by the reading site and the
//! admin dashboard: the authenticated session and its persisted credentials,
//! the watchdog that invalidates a stale session, the reading-reward state
//! machine, and the deduplication layer that keeps purchase and follow
//! actions from being submitted twice.
//!
//! The UI layer owns rendering, routing, and event wiring; it drives this
//! crate by constructing one [`auth::SessionContext`] per application load
//! and per-view engagement state machines as views come and go.

pub mod api;
pub mod auth;
pub mod config;
pub mod engagement;
pub mod models;

//! REST API client module for the comic platform backend.
//!
//! This module provides the `ApiClient` for calling the backend's
//! envelope-based endpoints: authentication, email verification, the
//! reading reward grant, chapter purchase, and comic follow state.
//!
//! Authenticated endpoints use JWT bearer tokens obtained at login.

pub mod client;
pub mod error;

pub use client::{ApiClient, Envelope, LoginRequest, RegisterRequest};
pub use error::ApiError;

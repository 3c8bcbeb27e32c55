//! HTTP client for the DBOps clinic-management backend.
//!
//! The backend is an opaque REST store: this crate is a thin, observable
//! transport over it. It injects the bearer token, enforces timeouts,
//! translates non-2xx responses into errors carrying status and body, and
//! never retries; retry policy belongs to callers.

pub mod client;
pub mod error;

pub use client::DbOpsClient;
pub use error::DbOpsError;

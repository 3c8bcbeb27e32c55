//! Shared types for the CareBot MCP server.
//!
//! This crate holds the configuration surface (backend connection, MCP
//! transport, cache TTLs) and the serde models mirroring entities the DBOps
//! backend returns. Nothing here performs I/O.

pub mod config;
pub mod models;

pub use config::{BackendConfig, CacheConfig, CarebotConfig, ConfigError, McpConfig, Transport};
pub use models::{Appointment, AvailabilitySlot, Clinic, Doctor, Medication, Patient};

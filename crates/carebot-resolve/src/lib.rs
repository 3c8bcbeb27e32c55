//! Entity resolution for CareBot MCP.
//!
//! Agents speak in names and phone numbers; the backend speaks in opaque
//! identifiers. This crate translates between the two:
//!
//! - [`ListingCache`]: TTL-bounded snapshots of bulk listings, so resolution
//!   does not refetch the full registry on every lookup.
//! - [`EntityDirectory`]: name-to-id and phone-to-record resolvers, plus the
//!   derived lookups (last appointment, medication by name, default clinic)
//!   that write operations need.
//!
//! Resolution failure is a value, not an error: every resolver returns
//! `Option`, and transport failures during resolution are logged and
//! reported as not-found so a flaky lookup cannot crash a larger workflow.
//!
//! Matching favors recall over precision: the first substring match in
//! listing order wins, with no disambiguation between candidates sharing a
//! name. Treat a "found" result as best-effort.

pub mod cache;
pub mod directory;
pub mod phone;

pub use cache::ListingCache;
pub use directory::EntityDirectory;
pub use phone::phone_candidates;

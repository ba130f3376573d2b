//! Obligation & reminder ledger backend.
//!
//! Tracks vehicle compliance deadlines (city stickers, emissions tests,
//! license-plate renewals) as obligations, imports the legacy signup table
//! into the normalised schema, and dispatches daily reminders idempotently.

pub mod api;
pub mod doc;
pub mod domain;
pub mod outbound;
pub mod server;

pub use doc::ApiDoc;

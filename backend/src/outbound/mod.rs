//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! Following the hexagonal layout, adapters here are thin translators
//! between domain types and infrastructure-specific representations:
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **notify**: notification delivery gateways
//!
//! No business logic lives in this module tree.

pub mod notify;
pub mod persistence;

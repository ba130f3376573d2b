//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports, backed by
//! PostgreSQL via Diesel with async support through `diesel-async` and
//! `bb8` connection pooling.
//!
//! The adapters are thin translators: Diesel row structs (`models`) and
//! table definitions (`schema`) stay internal, every database error is
//! mapped to the owning port's error type, and no business logic lives
//! here.

pub(crate) mod diesel_helpers;
mod diesel_legacy_source;
mod diesel_obligation_repository;
mod diesel_reminder_repository;
mod diesel_user_repository;
mod diesel_vehicle_repository;
pub mod migrate;
mod models;
mod pool;
mod schema;

pub use diesel_legacy_source::DieselLegacySignupSource;
pub use diesel_obligation_repository::DieselObligationRepository;
pub use diesel_reminder_repository::DieselReminderRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_vehicle_repository::DieselVehicleRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

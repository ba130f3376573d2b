//! Domain entities, services, and ports for the obligation ledger.
//!
//! Types here are transport and storage agnostic. Persistence adapters live
//! under [`crate::outbound`], HTTP adapters under [`crate::api`]; both depend
//! on this module, never the other way round.

pub mod dispatch;
pub mod error;
pub mod importer;
pub mod obligation;
pub mod ports;
pub mod reminder;
pub mod user;
pub mod vehicle;
pub mod views;

pub use self::dispatch::{DispatchReport, ReminderDispatchService};
pub use self::error::{LedgerError, LedgerResult};
pub use self::importer::{ImportReport, LegacyImportService, ObligationCounts, RowOutcome};
pub use self::obligation::{NewObligation, Obligation, ObligationId, ObligationKind};
pub use self::reminder::{NewReminder, Reminder, ReminderId, ReminderMethod, ReminderStatus};
pub use self::user::{
    EmailAddress, NewUser, NotificationPreferences, User, UserId, UserUpdate, UserValidationError,
};
pub use self::vehicle::{
    LicensePlate, MailingAddress, NewVehicle, Vehicle, VehicleId, VehicleValidationError,
};
pub use self::views::{
    DueObligation, ObligationViewService, OverdueObligation, UpcomingObligation,
};

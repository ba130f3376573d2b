//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod legacy_source;
mod notification_gateway;
mod obligation_repository;
mod obligation_views;
mod reminder_repository;
mod user_repository;
mod vehicle_repository;

#[cfg(test)]
pub use legacy_source::MockLegacySignupSource;
pub use legacy_source::{LegacySignup, LegacySignupSource, LegacySourceError};
#[cfg(test)]
pub use notification_gateway::MockNotificationGateway;
pub use notification_gateway::{NotificationGateway, NotificationGatewayError, ReminderNotice};
#[cfg(test)]
pub use obligation_repository::MockObligationRepository;
pub use obligation_repository::{ObligationRepository, ObligationRepositoryError};
#[cfg(test)]
pub use obligation_views::MockObligationViews;
pub use obligation_views::ObligationViews;
#[cfg(test)]
pub use reminder_repository::MockReminderRepository;
pub use reminder_repository::{ReminderRepository, ReminderRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
#[cfg(test)]
pub use vehicle_repository::MockVehicleRepository;
pub use vehicle_repository::{VehicleRepository, VehicleRepositoryError};

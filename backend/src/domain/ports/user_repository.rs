//! Port for user persistence.

use async_trait::async_trait;

use crate::domain::{EmailAddress, NewUser, User, UserId, UserUpdate};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user repository query failed: {message}",
        /// The unique email constraint rejected an insert.
        DuplicateEmail { email: String } =>
            "a user already exists for email {email}",
    }
}

/// Port for user storage and lookup.
///
/// Fill-if-null merge semantics live in the domain ([`User::merged_update`]);
/// adapters only execute the resulting partial update, so the merge rules
/// stay unit-testable without a database.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user.
    ///
    /// Fails with [`UserRepositoryError::DuplicateEmail`] when the email is
    /// already registered; callers wanting upsert semantics should look up
    /// by email first and merge.
    async fn create(&self, user: &NewUser) -> Result<User, UserRepositoryError>;

    /// Fetch a user by email, the business key for legacy deduplication.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Apply a partial update; `None` fields are left untouched.
    async fn update(&self, id: UserId, update: &UserUpdate) -> Result<(), UserRepositoryError>;
}

//! PostgreSQL-backed `UserRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{
    EmailAddress, NewUser, NotificationPreferences, User, UserId, UserUpdate,
};

use super::diesel_helpers::{DieselErrorClass, classify_diesel_error, pool_error_message};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    UserRepositoryError::connection(pool_error_message(error))
}

/// Map Diesel errors for reads and updates, where a unique violation cannot
/// legitimately occur.
fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    match classify_diesel_error(error) {
        DieselErrorClass::Connection { message } => UserRepositoryError::connection(message),
        DieselErrorClass::UniqueViolation { message }
        | DieselErrorClass::ForeignKeyViolation { message }
        | DieselErrorClass::UndefinedTable { message }
        | DieselErrorClass::Query { message } => UserRepositoryError::query(message),
    }
}

/// Map Diesel errors for inserts, where a unique violation means the email
/// is already registered.
fn map_insert_error(error: diesel::result::Error, email: &EmailAddress) -> UserRepositoryError {
    match classify_diesel_error(error) {
        DieselErrorClass::UniqueViolation { .. } => {
            UserRepositoryError::duplicate_email(email.as_ref())
        }
        DieselErrorClass::Connection { message } => UserRepositoryError::connection(message),
        DieselErrorClass::ForeignKeyViolation { message }
        | DieselErrorClass::UndefinedTable { message }
        | DieselErrorClass::Query { message } => UserRepositoryError::query(message),
    }
}

/// Convert a database row to a domain user.
///
/// A stored email that no longer validates is corrupt data and fails the
/// conversion; unreadable preferences degrade to the defaults with a
/// warning, matching what a missing JSONB key would do.
fn row_to_user(row: UserRow) -> Result<User, String> {
    let email = EmailAddress::new(row.email)
        .map_err(|error| format!("stored email failed validation: {error}"))?;
    let preferences = match serde_json::from_value::<NotificationPreferences>(
        row.notification_preferences,
    ) {
        Ok(preferences) => preferences,
        Err(error) => {
            warn!(
                user_id = %row.id,
                %error,
                "unreadable notification_preferences, falling back to defaults"
            );
            NotificationPreferences::default()
        }
    };
    Ok(User {
        id: UserId::from_uuid(row.id),
        email,
        phone: row.phone,
        first_name: row.first_name,
        last_name: row.last_name,
        email_verified: row.email_verified,
        phone_verified: row.phone_verified,
        preferences,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let preferences = user
            .preferences
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|error| UserRepositoryError::query(error.to_string()))?;
        let new_row = NewUserRow {
            id: Uuid::new_v4(),
            email: user.email.as_ref(),
            phone: user.phone.as_deref(),
            first_name: user.first_name.as_deref(),
            last_name: user.last_name.as_deref(),
            notification_preferences: preferences,
        };

        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|error| map_insert_error(error, &user.email))?;

        row_to_user(row).map_err(UserRepositoryError::query)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user)
            .transpose()
            .map_err(UserRepositoryError::query)
    }

    async fn update(&self, id: UserId, update: &UserUpdate) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let preferences = update
            .preferences
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|error| UserRepositoryError::query(error.to_string()))?;
        let changeset = UserChangeset {
            phone: update.phone.as_deref(),
            first_name: update.first_name.as_deref(),
            last_name: update.last_name.as_deref(),
            notification_preferences: preferences,
            updated_at: chrono::Utc::now(),
        };

        diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(&changeset)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

//! Shared helpers for Diesel repository adapters.
//!
//! Every repository maps the same three infrastructure failures (pool
//! checkout, connection loss, query failure) plus a table-specific
//! constraint violation. The classification lives here; the translation to
//! each port's error enum stays in the adapter that owns it.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Extract a readable message from a pool error.
pub(crate) fn pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Infrastructure-level classification of a Diesel error.
///
/// Constraint violations keep the server message so adapters can attach it
/// to their duplicate/missing-reference variants; plain query failures are
/// redacted to a generic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselErrorClass {
    UniqueViolation { message: String },
    ForeignKeyViolation { message: String },
    /// The queried relation does not exist. Only the legacy source treats
    /// this as meaningful; everywhere else it is a deployment bug.
    UndefinedTable { message: String },
    Connection { message: String },
    Query { message: String },
}

/// Classify a Diesel error and emit debug context.
pub(crate) fn classify_diesel_error(error: DieselError) -> DieselErrorClass {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselErrorClass::UniqueViolation {
                message: info.message().to_owned(),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            DieselErrorClass::ForeignKeyViolation {
                message: info.message().to_owned(),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselErrorClass::Connection {
                message: "database connection error".to_owned(),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::Unknown, info)
            if is_undefined_table_message(info.message()) =>
        {
            DieselErrorClass::UndefinedTable {
                message: info.message().to_owned(),
            }
        }
        DieselError::NotFound => DieselErrorClass::Query {
            message: "record not found".to_owned(),
        },
        _ => DieselErrorClass::Query {
            message: "database error".to_owned(),
        },
    }
}

/// PostgreSQL reports a missing relation (SQLSTATE 42P01) with this message
/// shape; Diesel folds it into `DatabaseErrorKind::Unknown`.
fn is_undefined_table_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("relation") && lower.contains("does not exist")
}

/// Collect row conversion results, mapping the first failure through
/// `map_err`.
pub(crate) fn collect_rows<T, E>(
    results: impl Iterator<Item = Result<T, String>>,
    map_err: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    results.collect::<Result<Vec<_>, _>>().map_err(map_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn db_error(kind: DatabaseErrorKind, message: &str) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(message.to_owned()))
    }

    #[rstest]
    fn unique_violations_keep_the_server_message() {
        let class = classify_diesel_error(db_error(
            DatabaseErrorKind::UniqueViolation,
            "duplicate key value violates unique constraint \"users_email_key\"",
        ));
        assert!(matches!(
            class,
            DieselErrorClass::UniqueViolation { message } if message.contains("users_email_key")
        ));
    }

    #[rstest]
    fn closed_connection_classifies_as_connection() {
        let class = classify_diesel_error(db_error(
            DatabaseErrorKind::ClosedConnection,
            "server closed the connection unexpectedly",
        ));
        assert!(matches!(class, DieselErrorClass::Connection { .. }));
    }

    #[rstest]
    fn missing_relation_classifies_as_undefined_table() {
        let class = classify_diesel_error(db_error(
            DatabaseErrorKind::Unknown,
            "relation \"legacy_signups\" does not exist",
        ));
        assert!(matches!(class, DieselErrorClass::UndefinedTable { .. }));
    }

    #[rstest]
    fn other_unknown_errors_are_redacted_query_failures() {
        let class = classify_diesel_error(db_error(
            DatabaseErrorKind::Unknown,
            "out of shared memory",
        ));
        assert_eq!(
            class,
            DieselErrorClass::Query {
                message: "database error".to_owned()
            }
        );
    }

    #[rstest]
    fn not_found_is_a_query_failure() {
        let class = classify_diesel_error(DieselError::NotFound);
        assert_eq!(
            class,
            DieselErrorClass::Query {
                message: "record not found".to_owned()
            }
        );
    }

    #[rstest]
    fn pool_error_message_unwraps_both_variants() {
        assert_eq!(
            pool_error_message(PoolError::checkout("timed out")),
            "timed out"
        );
        assert_eq!(pool_error_message(PoolError::build("bad url")), "bad url");
    }

    #[rstest]
    fn collect_rows_surfaces_the_first_conversion_failure() {
        let results = vec![Ok(1), Err("bad row".to_owned()), Ok(3)];
        let collected: Result<Vec<i32>, String> =
            collect_rows(results.into_iter(), |message| message);
        assert_eq!(collected, Err("bad row".to_owned()));
    }
}

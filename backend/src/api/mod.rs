//! REST API modules.

pub mod error;
pub mod health;
pub mod obligations;

pub use error::{ApiError, ApiErrorCode, ApiResult};
pub use obligations::AppState;

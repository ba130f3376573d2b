//! Driving port exposed to the HTTP adapter.

use async_trait::async_trait;

use crate::domain::views::{OverdueObligation, UpcomingObligation};
use crate::domain::{LedgerResult, ObligationId};

/// Read models and the single command the admin surface needs.
///
/// Implemented by [`crate::domain::ObligationViewService`]; the HTTP handlers
/// depend on this trait so they can be exercised against mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObligationViews: Send + Sync {
    /// Open obligations due today or later, soonest first.
    async fn upcoming(&self) -> LedgerResult<Vec<UpcomingObligation>>;

    /// Open obligations past their due date, most overdue first.
    async fn overdue(&self) -> LedgerResult<Vec<OverdueObligation>>;

    /// Mark an obligation completed (idempotent).
    async fn complete(&self, id: ObligationId) -> LedgerResult<()>;
}

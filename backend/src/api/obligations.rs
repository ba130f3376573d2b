//! Obligation view and completion handlers.

use std::sync::Arc;

use actix_web::{HttpResponse, get, post, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::ObligationViews;
use crate::domain::views::{OverdueObligation, UpcomingObligation};
use crate::domain::{ObligationId, ObligationKind};

use super::error::ApiResult;

/// Shared handler state.
pub struct AppState {
    pub views: Arc<dyn ObligationViews>,
}

/// An open obligation due today or later.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpcomingObligationDto {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub user_id: Uuid,
    pub kind: ObligationKind,
    pub due_date: NaiveDate,
    pub license_plate: String,
    pub email: String,
    /// Whole days until the due date; 0 means due today.
    pub days_until_due: i64,
}

impl From<UpcomingObligation> for UpcomingObligationDto {
    fn from(value: UpcomingObligation) -> Self {
        Self {
            id: *value.obligation.id.as_uuid(),
            vehicle_id: *value.obligation.vehicle_id.as_uuid(),
            user_id: *value.obligation.user_id.as_uuid(),
            kind: value.obligation.kind,
            due_date: value.obligation.due_date,
            license_plate: value.obligation.license_plate.to_string(),
            email: value.obligation.email.to_string(),
            days_until_due: value.days_until_due,
        }
    }
}

/// An open obligation past its due date.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OverdueObligationDto {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub user_id: Uuid,
    pub kind: ObligationKind,
    pub due_date: NaiveDate,
    pub license_plate: String,
    pub email: String,
    /// Whole days past the due date; always positive.
    pub days_overdue: i64,
}

impl From<OverdueObligation> for OverdueObligationDto {
    fn from(value: OverdueObligation) -> Self {
        Self {
            id: *value.obligation.id.as_uuid(),
            vehicle_id: *value.obligation.vehicle_id.as_uuid(),
            user_id: *value.obligation.user_id.as_uuid(),
            kind: value.obligation.kind,
            due_date: value.obligation.due_date,
            license_plate: value.obligation.license_plate.to_string(),
            email: value.obligation.email.to_string(),
            days_overdue: value.days_overdue,
        }
    }
}

/// List open obligations due today or later, soonest first.
#[utoipa::path(
    get,
    path = "/api/v1/obligations/upcoming",
    responses(
        (status = 200, description = "Upcoming obligations", body = [UpcomingObligationDto]),
        (status = 503, description = "Storage unavailable")
    ),
    tags = ["obligations"],
    operation_id = "listUpcomingObligations"
)]
#[get("/obligations/upcoming")]
pub async fn list_upcoming(
    state: web::Data<AppState>,
) -> ApiResult<web::Json<Vec<UpcomingObligationDto>>> {
    let rows = state.views.upcoming().await?;
    Ok(web::Json(rows.into_iter().map(Into::into).collect()))
}

/// List open obligations past their due date, most overdue first.
#[utoipa::path(
    get,
    path = "/api/v1/obligations/overdue",
    responses(
        (status = 200, description = "Overdue obligations", body = [OverdueObligationDto]),
        (status = 503, description = "Storage unavailable")
    ),
    tags = ["obligations"],
    operation_id = "listOverdueObligations"
)]
#[get("/obligations/overdue")]
pub async fn list_overdue(
    state: web::Data<AppState>,
) -> ApiResult<web::Json<Vec<OverdueObligationDto>>> {
    let rows = state.views.overdue().await?;
    Ok(web::Json(rows.into_iter().map(Into::into).collect()))
}

/// Mark an obligation completed. Idempotent: repeating the call leaves the
/// original completion timestamp in place.
#[utoipa::path(
    post,
    path = "/api/v1/obligations/{id}/complete",
    params(("id" = Uuid, Path, description = "Obligation identifier")),
    responses(
        (status = 204, description = "Obligation completed"),
        (status = 404, description = "No such obligation"),
        (status = 503, description = "Storage unavailable")
    ),
    tags = ["obligations"],
    operation_id = "completeObligation"
)]
#[post("/obligations/{id}/complete")]
pub async fn complete(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state
        .views
        .complete(ObligationId::from_uuid(id.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] generates the OpenAPI specification for the REST surface:
//! obligation views, the completion command, and health probes. Swagger UI
//! serves the document in debug builds.

use utoipa::OpenApi;

use crate::api::error::{ApiError, ApiErrorCode};
use crate::api::obligations::{OverdueObligationDto, UpcomingObligationDto};
use crate::domain::ObligationKind;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Obligation ledger API",
        description = "Due-date views and completion for vehicle compliance obligations."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::api::obligations::list_upcoming,
        crate::api::obligations::list_overdue,
        crate::api::obligations::complete,
        crate::api::health::ready,
        crate::api::health::live,
    ),
    components(schemas(
        UpcomingObligationDto,
        OverdueObligationDto,
        ObligationKind,
        ApiError,
        ApiErrorCode
    )),
    tags(
        (name = "obligations", description = "Due-date views and completion"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

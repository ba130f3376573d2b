//! Server construction and wiring.

use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::ApiDoc;
use crate::api::health::{HealthState, live, ready};
use crate::api::obligations::{AppState, complete, list_overdue, list_upcoming};
use crate::domain::ObligationViewService;
use crate::outbound::persistence::{DbPool, DieselObligationRepository};

/// Listener settings for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_owned(),
        }
    }
}

/// Construct the Actix HTTP server over the given connection pool.
///
/// Marks the health state ready once the listener is bound; awaiting the
/// returned [`Server`] drives the listener.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    pool: DbPool,
    config: &ServerConfig,
    health_state: web::Data<HealthState>,
) -> std::io::Result<Server> {
    let views = ObligationViewService::new(
        Arc::new(DieselObligationRepository::new(pool)),
        Arc::new(DefaultClock),
    );
    let state = web::Data::new(AppState {
        views: Arc::new(views),
    });

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        let api = web::scope("/api/v1")
            .service(list_upcoming)
            .service(list_overdue)
            .service(complete);

        let app = App::new()
            .app_data(server_health_state.clone())
            .app_data(state.clone())
            .service(api)
            .service(ready)
            .service(live);

        #[cfg(debug_assertions)]
        let app =
            app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
        #[cfg(not(debug_assertions))]
        let app = app;

        app
    })
    .bind(config.bind_addr.as_str())?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn default_config_binds_all_interfaces() {
        assert_eq!(ServerConfig::default().bind_addr, "0.0.0.0:8080");
    }
}

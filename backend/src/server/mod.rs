//! Server construction and middleware wiring.

mod config;
mod error_listener;
mod settings;
mod state_builders;
mod token;

pub use config::{ServerConfig, StoreConfig};
pub use settings::ServerSettings;

use state_builders::{build_http_state, build_store};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use carehub::Trace;
#[cfg(debug_assertions)]
use carehub::doc::ApiDoc;
use carehub::domain::ErrorEventBus;
use carehub::inbound::http::configure;
use carehub::inbound::http::health::{HealthState, live, ready};
use carehub::inbound::http::state::HttpState;
use carehub::inbound::http::validation::json_config;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let mut app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(configure))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    {
        app = app.service(
            SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );
    }

    app
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// Builds the document store, installs the single permission error listener
/// on a fresh error event bus and wires every domain service over the store.
///
/// # Errors
/// Propagates [`std::io::Error`] when the store cannot be built or binding
/// the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let bind_addr = config.bind_addr();
    let store = build_store(config.store)?;
    let bus = ErrorEventBus::new();
    // The listener lives as long as the bus; the handle is not needed.
    let _listener = error_listener::install(&bus);
    let http_state = web::Data::new(build_http_state(&store, &bus));

    #[cfg(feature = "metrics")]
    let metrics = make_metrics()?;

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        });
        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics.clone());
        app
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "carehub listening");
    health_state.mark_ready();
    Ok(server)
}

/// Prometheus middleware serving `/metrics`.
#[cfg(feature = "metrics")]
fn make_metrics() -> std::io::Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new("carehub")
        .endpoint("/metrics")
        .build()
        .map_err(|error| std::io::Error::other(format!("configure Prometheus metrics: {error}")))
}

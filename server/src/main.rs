use anyhow::Context;
use axum::http::{HeaderValue, Method, Request};
use kooking_server::clock::{Clock, SystemClock};
use kooking_server::config::CorsConfig;
use kooking_server::store::{MemoryStore, PgStore, Store};
use kooking_server::{api, config, db, telemetry, AppContext};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Span;
use utoipa_swagger_ui::SwaggerUi;

fn cors_layer(cors: &CorsConfig) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let origins = cors.origins();
    if origins.iter().any(|o| o == "*") {
        return Ok(layer.allow_origin(Any));
    }
    let parsed = origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin {o}")))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(layer.allow_origin(parsed))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Check for --openapi flag to dump spec and exit
    if env::args().any(|arg| arg == "--openapi") {
        println!("{}", api::openapi().to_pretty_json()?);
        return Ok(());
    }

    let cfg = config::load().context("failed to load configuration")?;
    telemetry::init_telemetry()?;

    let store: Arc<dyn Store> = if env::args().any(|arg| arg == "--memory") {
        tracing::warn!("serving from the in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        let pool = db::create_pool(&cfg.database)?;
        Arc::new(PgStore::new(pool))
    };
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let state = AppContext::build(&cfg.auth, store, clock)
        .context("refusing to start with an unusable auth.jwt_secret")?;

    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::openapi());

    let app = api::router(state)
        .merge(swagger_ui)
        .layer(cors_layer(&cfg.cors)?)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| telemetry::request_span(request))
                .on_request(|_request: &Request<_>, _span: &Span| {})
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        telemetry::log_response(response, latency, span)
                    },
                )
                .on_failure(
                    |error: tower_http::classify::ServerErrorsFailureClass,
                     latency: Duration,
                     _span: &Span| {
                        tracing::error!(
                            error = %error,
                            latency_ms = %latency.as_millis(),
                            "request failed"
                        );
                    },
                ),
        );

    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    let local = listener.local_addr()?;
    tracing::info!("Server listening on {}", local);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", local);
    tracing::info!("OpenAPI spec available at http://{}/api-docs/openapi.json", local);

    axum::serve(listener, app).await?;
    Ok(())
}

//! HTTP server core implementation
//!
//! This module provides the HttpServer struct and the application factory.

use crate::config::ServerConfig;
use crate::core::Gateway;
use crate::server::middleware::{AuthMiddleware, RequestIdMiddleware};
use crate::server::routes;
use crate::server::state::AppState;
use crate::utils::error::{GatewayError, Result};
use actix_cors::Cors;
use actix_web::error::JsonPayloadError;
use actix_web::http::{Method, header};
use actix_web::{
    App, HttpServer as ActixHttpServer,
    middleware::{DefaultHeaders, Logger},
    web,
};
use tracing::info;

/// HTTP server
pub struct HttpServer {
    /// Server configuration
    config: ServerConfig,
    /// Application state
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server around an initialised gateway
    pub fn new(gateway: Gateway) -> Self {
        info!("Creating HTTP server");
        Self {
            config: gateway.config().server.clone(),
            state: AppState::new(gateway),
        }
    }

    /// Start the HTTP server; the artifact sweeper runs for its lifetime
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.address();
        let workers = self.config.worker_count();

        info!("Starting HTTP server on {} ({} workers)", bind_addr, workers);

        let sweeper = self.state.gateway.artifacts().start_sweeper();
        let state = web::Data::new(self.state);

        let server = ActixHttpServer::new(move || create_app(state.clone()))
            .workers(workers)
            .bind(&bind_addr)
            .map_err(|e| {
                GatewayError::server(format!("Failed to bind to {}: {}", bind_addr, e))
            })?
            .run();

        info!("HTTP server listening on {}", bind_addr);

        let outcome = server
            .await
            .map_err(|e| GatewayError::server(format!("Server error: {}", e)));
        sweeper.abort();

        info!("HTTP server stopped");
        outcome
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// CORS: any origin, the methods and headers browser clients use
fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allowed_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(3600)
}

/// Malformed or oversized JSON bodies use the standard error envelope
fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(move |err, _req| {
            let error = match &err {
                JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                    GatewayError::payload_too_large(limit)
                }
                JsonPayloadError::ContentType => GatewayError::invalid_request_with_code(
                    "Content-Type must be application/json",
                    "invalid_json",
                ),
                other => GatewayError::invalid_request_with_code(
                    format!("Invalid JSON body: {}", other),
                    "invalid_json",
                ),
            };
            error.into()
        })
}

/// Create the Actix-web application
pub fn create_app(
    state: web::Data<AppState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let limit = state.config().server.max_body_size;

    App::new()
        .app_data(state)
        .app_data(json_config(limit))
        .wrap(AuthMiddleware)
        .wrap(RequestIdMiddleware)
        .wrap(cors())
        .wrap(Logger::new("%r %s %b %Dms"))
        .wrap(DefaultHeaders::new().add(("Server", crate::NAME)))
        .configure(routes::health::configure_health_routes)
        .configure(routes::ai::configure_routes)
        .default_service(web::to(routes::not_found))
}

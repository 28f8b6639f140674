//! Health check and service index endpoints

use crate::core::capabilities::CapabilityDescriptor;
use crate::server::state::AppState;
use crate::{BuildInfo, build_info};
use actix_web::{HttpResponse, web};
use serde::Serialize;
use std::collections::BTreeMap;

/// Configure health routes
pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/", web::get().to(service_index));
}

/// Health check endpoint
///
/// Reports the availability computed at startup; no backend is probed per call.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.gateway.health_check())
}

/// Service index returned by `GET /`
#[derive(Debug, Serialize)]
pub struct ServiceIndex<'a> {
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub build: BuildInfo,
    pub endpoints: BTreeMap<&'static str, &'static str>,
    pub capabilities: &'a [CapabilityDescriptor],
    pub upstream: String,
    pub documentation: &'static str,
}

/// Service index endpoint
pub async fn service_index(state: web::Data<AppState>) -> HttpResponse {
    let endpoints = BTreeMap::from([
        ("health", "/health"),
        ("models", "/v1/models"),
        ("tts", "/v1/audio/speech"),
        ("stt", "/v1/audio/transcriptions"),
        ("translation", "/v1/audio/translations"),
        ("images", "/v1/images/generations"),
        ("chat", "/v1/chat/completions"),
        ("embeddings", "/v1/embeddings"),
    ]);

    HttpResponse::Ok().json(ServiceIndex {
        name: crate::NAME,
        description: crate::DESCRIPTION,
        version: crate::VERSION,
        build: build_info(),
        endpoints,
        capabilities: state.gateway.capabilities().descriptors(),
        upstream: state.gateway.upstream().target().base_url.to_string(),
        documentation: "https://platform.openai.com/docs/api-reference/audio",
    })
}

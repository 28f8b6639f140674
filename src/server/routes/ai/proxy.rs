//! Pass-through of unclaimed `/v1/*` requests to the upstream completion service

use crate::core::proxy::ForwardRequest;
use crate::server::middleware::get_request_context;
use crate::server::state::AppState;
use crate::utils::error::GatewayError;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use bytes::BytesMut;
use futures::StreamExt;
use tracing::info;

/// Forward the request as-is and stream the upstream reply back
pub async fn forward_upstream(
    state: web::Data<AppState>,
    req: HttpRequest,
    mut payload: web::Payload,
) -> Result<HttpResponse, GatewayError> {
    let context = get_request_context(&req)?;
    let limit = state.config().server.max_body_size;

    let mut body = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| {
            GatewayError::invalid_request_with_code(
                format!("Failed to read request body: {}", e),
                "invalid_body",
            )
        })?;
        if body.len() + chunk.len() > limit {
            return Err(GatewayError::payload_too_large(limit));
        }
        body.extend_from_slice(&chunk);
    }

    let path_and_query = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.path().to_string(), |pq| pq.as_str().to_string());

    let request = ForwardRequest {
        method: req.method().to_string(),
        path_and_query,
        headers: req
            .headers()
            .iter()
            .map(|(name, value)| (name.as_str().to_string(), value.as_bytes().to_vec()))
            .collect(),
        body: body.freeze(),
    };

    let upstream = state
        .gateway
        .upstream()
        .forward(request, &context.request_id)
        .await?;

    info!(
        request_id = %context.request_id,
        method = %context.method,
        path = %context.path,
        status = upstream.status,
        "Proxied upstream"
    );

    let status = StatusCode::from_u16(upstream.status)
        .map_err(|_| GatewayError::upstream_unavailable("Invalid upstream status"))?;
    let mut response = HttpResponse::build(status);
    for (name, value) in upstream.headers {
        response.append_header((name, value));
    }
    Ok(response.streaming(upstream.body))
}

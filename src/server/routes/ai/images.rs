//! Image generation endpoint

use crate::core::images::ImageGenerationRequest;
use crate::server::middleware::get_request_context;
use crate::server::state::AppState;
use crate::utils::error::GatewayError;
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::info;

/// Image generation endpoint
///
/// OpenAI-compatible image generation backed by Draw Things.
pub async fn image_generations(
    state: web::Data<AppState>,
    req: HttpRequest,
    request: web::Json<ImageGenerationRequest>,
) -> Result<HttpResponse, GatewayError> {
    let context = get_request_context(&req)?;
    info!(
        request_id = %context.request_id,
        "Image generation request: n={:?}, size={:?}",
        request.n,
        request.size
    );

    let response = state
        .gateway
        .images()
        .generate(request.into_inner(), &context.request_id)
        .await?;

    Ok(HttpResponse::Ok().json(response))
}

//! Audio speech endpoint (text-to-speech)

use crate::core::audio::SpeechRequest;
use crate::server::middleware::get_request_context;
use crate::server::state::AppState;
use crate::utils::error::GatewayError;
use actix_web::http::header::CONTENT_DISPOSITION;
use actix_web::{HttpRequest, HttpResponse, web};
use futures::TryStreamExt;
use tracing::{error, info};

/// Audio speech endpoint
///
/// OpenAI-compatible text-to-speech API. The synthesized file is streamed
/// back and deleted once the body has been sent.
pub async fn audio_speech(
    state: web::Data<AppState>,
    req: HttpRequest,
    request: web::Json<SpeechRequest>,
) -> Result<HttpResponse, GatewayError> {
    let context = get_request_context(&req)?;
    let request = request.into_inner();

    info!(
        request_id = %context.request_id,
        "Audio speech request: model={}, voice={}, text_len={}",
        request.model,
        request.voice.as_deref().unwrap_or("default"),
        request.input.as_deref().map_or(0, |t| t.chars().count())
    );

    let speech = state
        .gateway
        .speech()
        .synthesize(request, &context.request_id)
        .await?;

    let served = state
        .gateway
        .artifacts()
        .open_served(speech.artifact)
        .await
        .map_err(|e| GatewayError::synthesis(format!("Failed to open synthesized audio: {}", e)))?;

    let request_id = context.request_id.clone();
    let body = served.stream.inspect_err(move |e| {
        error!(request_id = %request_id, "Audio stream interrupted: {}", e);
    });

    Ok(HttpResponse::Ok()
        .content_type(speech.format.content_type())
        .insert_header((
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"speech.{}\"", speech.format.extension()),
        ))
        .no_chunking(served.size)
        .streaming(body))
}

//! Audio transcriptions endpoint

use super::form::read_recognition_form;
use crate::core::audio::{RecognitionTask, render};
use crate::server::middleware::get_request_context;
use crate::server::state::AppState;
use crate::utils::error::GatewayError;
use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::info;

/// Audio transcriptions endpoint
///
/// OpenAI-compatible audio transcription API (Whisper).
/// Accepts multipart/form-data with audio file.
pub async fn audio_transcriptions(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: Multipart,
) -> Result<HttpResponse, GatewayError> {
    recognize(state, req, payload, RecognitionTask::Transcribe).await
}

/// Shared body of the transcription and translation endpoints
pub(super) async fn recognize(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: Multipart,
    task: RecognitionTask,
) -> Result<HttpResponse, GatewayError> {
    let context = get_request_context(&req)?;
    let service = state.gateway.transcription();

    let request = read_recognition_form(payload, service.config(), task).await?;
    let format = request.response_format;
    let granularities = request.granularities;

    info!(
        request_id = %context.request_id,
        task = task.as_str(),
        "Audio {} request: model={:?}, format={:?}",
        task.as_str(),
        request.model,
        format
    );

    let result = service.transcribe(request, &context.request_id).await?;
    let rendered = render(&result, format, granularities)?;

    Ok(HttpResponse::Ok()
        .content_type(rendered.content_type)
        .body(rendered.body))
}

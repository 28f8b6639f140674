//! Audio translations endpoint

use super::transcriptions::recognize;
use crate::core::audio::RecognitionTask;
use crate::server::state::AppState;
use crate::utils::error::GatewayError;
use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, web};

/// Audio translations endpoint
///
/// Translates speech in any language to English text. Any `language` field
/// is ignored.
pub async fn audio_translations(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: Multipart,
) -> Result<HttpResponse, GatewayError> {
    recognize(state, req, payload, RecognitionTask::Translate).await
}

//! Model listing endpoint

use crate::core::audio::{SUPPORTED_LANGUAGES, SystemVoice, VOICE_ALIASES};
use crate::server::state::AppState;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use tracing::debug;

/// OpenAI model object
#[derive(Debug, Clone, Serialize)]
pub struct Model {
    pub id: String,
    pub object: &'static str,
    pub created: i64,
    pub owned_by: &'static str,
}

#[derive(Debug, Serialize)]
pub struct VoiceAlias {
    pub name: &'static str,
    pub system_voice: &'static str,
}

#[derive(Debug, Serialize)]
pub struct VoiceCatalog {
    pub openai: Vec<VoiceAlias>,
    pub system: Vec<SystemVoice>,
}

#[derive(Debug, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

/// List response: the OpenAI list object plus voice and language catalogues
#[derive(Debug, Serialize)]
pub struct ModelListResponse {
    pub object: &'static str,
    pub data: Vec<Model>,
    pub voices: VoiceCatalog,
    pub languages: Vec<Language>,
}

/// List available models
///
/// Served locally; the upstream completion service is not consulted.
pub async fn list_models(state: web::Data<AppState>) -> HttpResponse {
    debug!("Listing available models");

    let created = chrono::Utc::now().timestamp();
    let speech = state.gateway.speech();
    let transcription = state.gateway.transcription();

    let data = speech
        .model_ids()
        .into_iter()
        .map(|id| (id, "system-tts"))
        .chain(
            transcription
                .model_ids()
                .into_iter()
                .map(|id| (id, "mlx-whisper")),
        )
        .map(|(id, owned_by)| Model {
            id,
            object: "model",
            created,
            owned_by,
        })
        .collect();

    let voices = VoiceCatalog {
        openai: VOICE_ALIASES
            .iter()
            .map(|&(name, system_voice)| VoiceAlias { name, system_voice })
            .collect(),
        system: speech.list_system_voices().await,
    };

    let languages = SUPPORTED_LANGUAGES
        .iter()
        .map(|&(code, name)| Language { code, name })
        .collect();

    HttpResponse::Ok().json(ModelListResponse {
        object: "list",
        data,
        voices,
        languages,
    })
}

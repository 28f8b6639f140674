//! AI API endpoints (OpenAI compatible)
//!
//! Capability routes are registered from the capability table. Anything else
//! under `/v1`, including other methods on a capability path, is forwarded
//! upstream.

mod audio;
mod images;
mod models;
mod proxy;

pub use audio::{audio_speech, audio_transcriptions, audio_translations};
pub use images::image_generations;
pub use models::list_models;
pub use proxy::forward_upstream;

use crate::core::capabilities::{API_PREFIX, Capability};
use actix_web::web;

/// Configure AI API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    let mut scope = web::scope(API_PREFIX);

    for capability in Capability::ALL {
        let route = match capability {
            Capability::SpeechSynthesis => web::post().to(audio_speech),
            Capability::Transcription => web::post().to(audio_transcriptions),
            Capability::Translation => web::post().to(audio_translations),
            Capability::ImageGeneration => web::post().to(image_generations),
        };
        scope = scope.service(
            web::resource(capability.scoped_path())
                .route(route)
                .default_service(web::to(forward_upstream)),
        );
    }

    cfg.service(
        scope
            .service(
                web::resource("/models")
                    .route(web::get().to(list_models))
                    .default_service(web::to(forward_upstream)),
            )
            .default_service(web::to(forward_upstream)),
    );
}

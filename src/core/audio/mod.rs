//! Audio API module for speech-to-text and text-to-speech
//!
//! Both directions are backed by local command-line tools.

pub mod speech;
pub mod transcription;
pub mod types;
pub mod voices;

pub use speech::{CLONE_SUFFIX, SpeechService, sanitize_text};
pub use transcription::{
    AUTO_LANGUAGE, SUPPORTED_LANGUAGES, TranscriptionService, WHISPER_MODELS, format_timestamp,
    render,
};
pub use types::{
    AudioFormat, Granularities, RecognitionTask, RenderedTranscript, SegmentInfo, SpeechRequest,
    SynthesizedSpeech, TranscriptFormat, TranscriptionRequest, TranscriptionResult, WordInfo,
    format_to_content_type,
};
pub use voices::{SystemVoice, VOICE_ALIASES, parse_say_voices, resolve_voice};

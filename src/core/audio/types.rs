//! Audio API type definitions
//!
//! Request and response shapes for the OpenAI-compatible speech endpoints.

use crate::core::artifacts::{ArtifactId, ScratchFile};
use crate::utils::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};

/// Maximum number of characters accepted for synthesis
pub const MAX_INPUT_CHARS: usize = 4096;

/// Baseline speaking rate of `say`, in words per minute
pub const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// Text-to-speech request (OpenAI compatible)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeechRequest {
    /// Model to use: "tts-1", "tts-1-hd" or "<model>:clone"
    #[serde(default = "default_speech_model")]
    pub model: String,

    /// Text to convert to speech
    #[serde(default)]
    pub input: Option<String>,

    /// Voice to use (e.g., "alloy", "echo", "fable", "onyx", "nova", "shimmer")
    #[serde(default)]
    pub voice: Option<String>,

    /// Audio format: "mp3", "wav", "aac", "flac", "opus", "aiff"
    #[serde(default)]
    pub response_format: Option<String>,

    /// Speed of speech (0.25 to 4.0)
    #[serde(default)]
    pub speed: Option<f32>,
}

fn default_speech_model() -> String {
    "tts-1".to_string()
}

/// Output audio formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Wav,
    Aac,
    Flac,
    Opus,
    Aiff,
}

impl AudioFormat {
    pub const ALL: [AudioFormat; 6] = [
        AudioFormat::Mp3,
        AudioFormat::Wav,
        AudioFormat::Aac,
        AudioFormat::Flac,
        AudioFormat::Opus,
        AudioFormat::Aiff,
    ];

    pub fn parse(format: &str) -> Option<Self> {
        match format.trim().to_ascii_lowercase().as_str() {
            "mp3" => Some(Self::Mp3),
            "wav" => Some(Self::Wav),
            "aac" => Some(Self::Aac),
            "flac" => Some(Self::Flac),
            "opus" => Some(Self::Opus),
            "aiff" => Some(Self::Aiff),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Aac => "aac",
            Self::Flac => "flac",
            Self::Opus => "opus",
            Self::Aiff => "aiff",
        }
    }

    pub fn content_type(self) -> &'static str {
        format_to_content_type(self.extension())
    }
}

/// Get content type from format
pub fn format_to_content_type(format: &str) -> &'static str {
    match format.to_lowercase().as_str() {
        "mp3" => "audio/mpeg",
        "opus" => "audio/opus",
        "aac" => "audio/aac",
        "flac" => "audio/flac",
        "wav" => "audio/wav",
        "aiff" => "audio/aiff",
        _ => "application/octet-stream",
    }
}

/// Result of a successful synthesis: a ready artifact
#[derive(Debug, Clone, Copy)]
pub struct SynthesizedSpeech {
    pub artifact: ArtifactId,
    pub format: AudioFormat,
}

/// Recognition response formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranscriptFormat {
    Text,
    #[default]
    Json,
    VerboseJson,
    Srt,
    Vtt,
}

impl TranscriptFormat {
    pub fn parse(format: &str) -> Result<Self> {
        match format.trim() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "verbose_json" => Ok(Self::VerboseJson),
            "srt" => Ok(Self::Srt),
            "vtt" => Ok(Self::Vtt),
            other => Err(GatewayError::invalid_request_with_code(
                format!(
                    "Unsupported response_format '{}'; expected one of json, text, srt, verbose_json, vtt",
                    other
                ),
                "unsupported_format",
            )),
        }
    }
}

/// Requested timing detail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Granularities {
    pub segment: bool,
    pub word: bool,
}

impl Default for Granularities {
    fn default() -> Self {
        Self {
            segment: true,
            word: false,
        }
    }
}

impl Granularities {
    /// Parse repeated and/or comma separated values; nothing given means segment only
    pub fn parse<S: AsRef<str>>(values: &[S]) -> Result<Self> {
        let mut parsed = Self {
            segment: false,
            word: false,
        };
        let mut any = false;

        for value in values
            .iter()
            .flat_map(|v| v.as_ref().split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            any = true;
            match value {
                "segment" => parsed.segment = true,
                "word" => parsed.word = true,
                other => {
                    return Err(GatewayError::invalid_request_with_code(
                        format!(
                            "Unsupported timestamp granularity '{}'; expected segment or word",
                            other
                        ),
                        "invalid_timestamp_granularity",
                    ));
                }
            }
        }

        Ok(if any { parsed } else { Self::default() })
    }
}

/// What the recognizer is asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecognitionTask {
    Transcribe,
    Translate,
}

impl RecognitionTask {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transcribe => "transcribe",
            Self::Translate => "translate",
        }
    }

    /// Map a failure message onto this task's error variant
    pub fn error(self, message: impl Into<String>) -> GatewayError {
        match self {
            Self::Transcribe => GatewayError::recognition(message),
            Self::Translate => GatewayError::translation(message),
        }
    }
}

/// Audio transcription or translation request
#[derive(Debug)]
pub struct TranscriptionRequest {
    /// Staged upload; removed once the tool has run
    pub upload: ScratchFile,
    pub task: RecognitionTask,
    pub model: Option<String>,
    /// Ignored for translation
    pub language: Option<String>,
    pub prompt: Option<String>,
    pub response_format: TranscriptFormat,
    pub temperature: Option<f32>,
    pub granularities: Granularities,
}

/// Word-level timestamp information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordInfo {
    /// The word
    pub word: String,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
}

/// Segment-level timestamp information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentInfo {
    /// Segment ID
    pub id: u32,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Transcribed text for this segment
    pub text: String,
}

/// Parsed recognition output
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionResult {
    pub task: RecognitionTask,
    pub language: String,
    /// Seconds; end of the last segment
    pub duration: f64,
    pub text: String,
    pub segments: Vec<SegmentInfo>,
    pub words: Vec<WordInfo>,
}

/// `json` response body
#[derive(Debug, Serialize)]
pub struct TranscriptionResponse<'a> {
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<&'a [SegmentInfo]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub words: Option<&'a [WordInfo]>,
}

/// `verbose_json` response body
#[derive(Debug, Serialize)]
pub struct VerboseTranscriptionResponse<'a> {
    pub task: &'static str,
    pub language: &'a str,
    pub duration: f64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<&'a [SegmentInfo]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub words: Option<&'a [WordInfo]>,
}

/// A rendered recognition response body
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTranscript {
    pub content_type: &'static str,
    pub body: String,
}

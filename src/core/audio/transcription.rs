//! Speech-to-text functionality
//!
//! Drives `mlx_whisper` for both transcription and translation. The tool
//! writes `<output_dir>/<upload stem>.json`, which is read once and removed.

use crate::config::TranscriptionConfig;
use crate::core::artifacts::ArtifactManager;
use crate::core::process::{ToolCommand, ToolRunner, locate_binary};
use crate::utils::error::{GatewayError, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::types::{
    Granularities, RecognitionTask, RenderedTranscript, SegmentInfo, TranscriptFormat,
    TranscriptionRequest, TranscriptionResponse, TranscriptionResult,
    VerboseTranscriptionResponse, WordInfo,
};

/// Language value that lets the recognizer detect the language itself
pub const AUTO_LANGUAGE: &str = "auto";

/// Recognition models that can be requested by repository id
pub const WHISPER_MODELS: [&str; 12] = [
    "mlx-community/whisper-tiny",
    "mlx-community/whisper-tiny-en",
    "mlx-community/whisper-base",
    "mlx-community/whisper-base-en",
    "mlx-community/whisper-small",
    "mlx-community/whisper-small-en",
    "mlx-community/whisper-medium",
    "mlx-community/whisper-medium-en",
    "mlx-community/whisper-large-v2",
    "mlx-community/whisper-large-v3",
    "mlx-community/whisper-large-v3-mlx",
    "mlx-community/whisper-large-v3-turbo",
];

/// Languages accepted by the `language` field
pub const SUPPORTED_LANGUAGES: [(&str, &str); 10] = [
    ("zh", "中文"),
    ("en", "English"),
    ("ja", "日本語"),
    ("ko", "한국어"),
    ("es", "Español"),
    ("fr", "Français"),
    ("de", "Deutsch"),
    ("ru", "Русский"),
    ("ar", "العربية"),
    ("auto", "Auto Detect"),
];

/// Raw `mlx_whisper --output-format json` document
#[derive(Debug, Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    text: String,
    #[serde(default)]
    segments: Vec<WhisperSegment>,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    #[serde(default)]
    id: u32,
    start: f64,
    end: f64,
    #[serde(default)]
    text: String,
    #[serde(default)]
    words: Vec<WhisperWord>,
}

#[derive(Debug, Deserialize)]
struct WhisperWord {
    word: String,
    start: f64,
    end: f64,
}

/// Speech recognition adapter
pub struct TranscriptionService {
    config: TranscriptionConfig,
    runner: Arc<dyn ToolRunner>,
    artifacts: ArtifactManager,
}

impl TranscriptionService {
    /// Create a new transcription service
    pub fn new(
        config: TranscriptionConfig,
        runner: Arc<dyn ToolRunner>,
        artifacts: ArtifactManager,
    ) -> Self {
        Self {
            config,
            runner,
            artifacts,
        }
    }

    pub fn config(&self) -> &TranscriptionConfig {
        &self.config
    }

    /// Whether `mlx_whisper` can be found
    pub fn is_available(&self) -> bool {
        locate_binary(&self.config.whisper_bin).is_some()
    }

    /// Transcribe (or translate) a staged upload
    pub async fn transcribe(
        &self,
        request: TranscriptionRequest,
        request_id: &str,
    ) -> Result<TranscriptionResult> {
        let TranscriptionRequest {
            upload,
            task,
            model,
            language,
            prompt,
            temperature,
            granularities,
            ..
        } = request;

        let model = self.resolve_model(model.as_deref());
        let language = match task {
            RecognitionTask::Transcribe => language
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| self.config.language.clone()),
            RecognitionTask::Translate => AUTO_LANGUAGE.to_string(),
        };

        info!(
            request_id = request_id,
            task = task.as_str(),
            model = %model,
            language = %language,
            "Running speech recognition"
        );

        let outcome = async {
            tokio::fs::create_dir_all(&self.config.output_dir)
                .await
                .map_err(|e| {
                    task.error(format!(
                        "Failed to create output directory {}: {}",
                        self.config.output_dir.display(),
                        e
                    ))
                })?;

            let stem = upload
                .path()
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .ok_or_else(|| task.error("Upload has no file name"))?;
            let output_path = self.config.output_dir.join(format!("{}.json", stem));
            let artifact = self
                .artifacts
                .register(request_id, output_path.clone(), "json");

            let command = self.whisper_command(
                upload.path(),
                &model,
                &language,
                task,
                prompt.as_deref(),
                temperature,
                granularities,
            );

            let raw = match self.runner.run(command).await {
                Ok(_) => tokio::fs::read_to_string(&output_path).await.map_err(|e| {
                    task.error(format!(
                        "Recognition output not found at {}: {}",
                        output_path.display(),
                        e
                    ))
                }),
                Err(e) => Err(task.error(e.to_string())),
            };
            self.artifacts.discard(artifact).await;

            parse_whisper_output(&raw?, task, &language)
        }
        .await;

        upload.remove().await;

        match &outcome {
            Ok(result) => debug!(
                request_id = request_id,
                text_len = result.text.len(),
                segments = result.segments.len(),
                "Recognition finished"
            ),
            Err(e) => warn!(request_id = request_id, "Recognition failed: {}", e),
        }
        outcome
    }

    /// Repository ids are used as given; anything else maps to the configured model
    fn resolve_model(&self, requested: Option<&str>) -> String {
        match requested.map(str::trim) {
            Some(model) if model.contains('/') => model.to_string(),
            _ => self.config.model.clone(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn whisper_command(
        &self,
        input: &Path,
        model: &str,
        language: &str,
        task: RecognitionTask,
        prompt: Option<&str>,
        temperature: Option<f32>,
        granularities: Granularities,
    ) -> ToolCommand {
        let mut command = ToolCommand::new(&self.config.whisper_bin, self.config.tool_timeout())
            .arg(input.as_os_str())
            .args(["--model", model, "--output-format", "json", "--output-dir"])
            .arg(self.config.output_dir.as_os_str())
            .env("TRANSFORMERS_OFFLINE", "1");

        if language != AUTO_LANGUAGE {
            command = command.args(["--language", language]);
        }
        if task == RecognitionTask::Translate {
            command = command.args(["--task", "translate"]);
        }
        if granularities.word {
            command = command.args(["--word-timestamps", "True"]);
        }
        if let Some(prompt) = prompt.filter(|p| !p.trim().is_empty()) {
            command = command.arg("--initial-prompt").arg(prompt);
        }
        if let Some(temperature) = temperature {
            command = command.arg("--temperature").arg(temperature.to_string());
        }
        command
    }

    /// Model ids served by this adapter
    pub fn model_ids(&self) -> Vec<String> {
        let mut models = vec!["whisper-1".to_string()];
        models.extend(WHISPER_MODELS.iter().map(|m| m.to_string()));
        if !models.contains(&self.config.model) {
            models.push(self.config.model.clone());
        }
        models
    }
}

fn parse_whisper_output(
    raw: &str,
    task: RecognitionTask,
    requested_language: &str,
) -> Result<TranscriptionResult> {
    let output: WhisperOutput = serde_json::from_str(raw)
        .map_err(|e| task.error(format!("Malformed recognition output: {}", e)))?;

    let duration = output.segments.last().map_or(0.0, |s| s.end);
    let mut segments = Vec::with_capacity(output.segments.len());
    let mut words = Vec::new();

    for segment in output.segments {
        words.extend(segment.words.into_iter().map(|w| WordInfo {
            word: w.word.trim().to_string(),
            start: w.start,
            end: w.end,
        }));
        segments.push(SegmentInfo {
            id: segment.id,
            start: segment.start,
            end: segment.end,
            text: segment.text.trim().to_string(),
        });
    }

    let language = output
        .language
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| requested_language.to_string());

    Ok(TranscriptionResult {
        task,
        language,
        duration,
        text: output.text.trim().to_string(),
        segments,
        words,
    })
}

/// Shape a recognition result into the requested response format
pub fn render(
    result: &TranscriptionResult,
    format: TranscriptFormat,
    granularities: Granularities,
) -> Result<RenderedTranscript> {
    let segments = granularities.segment.then_some(result.segments.as_slice());
    let words = granularities.word.then_some(result.words.as_slice());

    let rendered = match format {
        TranscriptFormat::Text => RenderedTranscript {
            content_type: "text/plain; charset=utf-8",
            body: result.text.clone(),
        },
        TranscriptFormat::Json => RenderedTranscript {
            content_type: "application/json",
            body: serde_json::to_string(&TranscriptionResponse {
                text: &result.text,
                segments,
                words,
            })?,
        },
        TranscriptFormat::VerboseJson => RenderedTranscript {
            content_type: "application/json",
            body: serde_json::to_string(&VerboseTranscriptionResponse {
                task: result.task.as_str(),
                language: &result.language,
                duration: result.duration,
                text: &result.text,
                segments,
                words,
            })?,
        },
        TranscriptFormat::Srt => RenderedTranscript {
            content_type: "text/plain; charset=utf-8",
            body: to_srt(&result.segments),
        },
        TranscriptFormat::Vtt => RenderedTranscript {
            content_type: "text/vtt; charset=utf-8",
            body: to_vtt(&result.segments),
        },
    };
    Ok(rendered)
}

/// `HH:MM:SS<sep>mmm`
pub fn format_timestamp(seconds: f64, separator: char) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let ms = total_ms % 1000;
    format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, secs, separator, ms)
}

fn to_srt(segments: &[SegmentInfo]) -> String {
    segments
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                "{}\n{} --> {}\n{}\n",
                i + 1,
                format_timestamp(s.start, ','),
                format_timestamp(s.end, ','),
                s.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn to_vtt(segments: &[SegmentInfo]) -> String {
    let mut out = String::from("WEBVTT\n");
    for s in segments {
        out.push_str(&format!(
            "\n{} --> {}\n{}\n",
            format_timestamp(s.start, '.'),
            format_timestamp(s.end, '.'),
            s.text
        ));
    }
    out
}

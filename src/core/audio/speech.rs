//! Text-to-speech functionality
//!
//! Standard mode drives `say`; clone mode drives `mlx_audio.tts.generate`.
//! Either may be followed by an `ffmpeg` transcode to the requested format.

use crate::config::SpeechConfig;
use crate::core::artifacts::{ArtifactManager, remove_file_logged};
use crate::core::process::{ToolCommand, ToolRunner, locate_binary};
use crate::utils::error::{GatewayError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::types::{
    AudioFormat, BASE_WORDS_PER_MINUTE, MAX_INPUT_CHARS, SpeechRequest, SynthesizedSpeech,
};
use super::voices::{SystemVoice, parse_say_voices, resolve_voice};

/// Suffix on the model name that selects voice cloning
pub const CLONE_SUFFIX: &str = ":clone";

/// Markdown control characters removed before synthesis
const MARKDOWN_CHARS: [char; 7] = ['*', '_', '~', '`', '#', '[', ']'];

const VOICE_LIST_TIMEOUT: Duration = Duration::from_secs(10);

/// Strip markdown and control characters, collapse whitespace, trim
pub fn sanitize_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;

    for c in input.chars() {
        if MARKDOWN_CHARS.contains(&c) {
            continue;
        }
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if c.is_control() {
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }

    out
}

/// A validated synthesis job
#[derive(Debug, Clone, PartialEq)]
struct SpeechJob {
    text: String,
    format: AudioFormat,
    speed: Option<f32>,
    mode: SynthesisMode,
}

#[derive(Debug, Clone, PartialEq)]
enum SynthesisMode {
    Standard { voice: String },
    Clone { model: String },
}

impl SynthesisMode {
    fn native_format(&self) -> AudioFormat {
        match self {
            Self::Standard { .. } => AudioFormat::Aiff,
            Self::Clone { .. } => AudioFormat::Wav,
        }
    }
}

/// Speech synthesis adapter
pub struct SpeechService {
    config: SpeechConfig,
    runner: Arc<dyn ToolRunner>,
    artifacts: ArtifactManager,
}

impl SpeechService {
    /// Create a new speech service
    pub fn new(config: SpeechConfig, runner: Arc<dyn ToolRunner>, artifacts: ArtifactManager) -> Self {
        Self {
            config,
            runner,
            artifacts,
        }
    }

    pub fn config(&self) -> &SpeechConfig {
        &self.config
    }

    /// Whether `say` can be found
    pub fn is_available(&self) -> bool {
        locate_binary(&self.config.say_bin).is_some()
    }

    /// Whether clone mode is switched on and fully configured
    pub fn clone_ready(&self) -> bool {
        self.check_clone_config().is_ok()
    }

    /// Convert text to speech, producing one ready artifact
    pub async fn synthesize(&self, request: SpeechRequest, request_id: &str) -> Result<SynthesizedSpeech> {
        let job = self.validate(&request)?;

        info!(
            request_id = request_id,
            model = %request.model,
            format = job.format.extension(),
            text_len = job.text.chars().count(),
            "Generating speech"
        );

        tokio::fs::create_dir_all(&self.config.temp_dir)
            .await
            .map_err(|e| {
                GatewayError::synthesis(format!(
                    "Failed to create temp directory {}: {}",
                    self.config.temp_dir.display(),
                    e
                ))
            })?;

        let stem = format!("speech_{}", Uuid::new_v4());
        let native_format = job.mode.native_format();
        let native_path = self
            .config
            .temp_dir
            .join(format!("{}.{}", stem, native_format.extension()));
        let final_path = self
            .config
            .temp_dir
            .join(format!("{}.{}", stem, job.format.extension()));

        let artifact = self
            .artifacts
            .register(request_id, final_path.clone(), job.format.extension());

        let produced = self
            .produce(&job, &stem, &native_path, &final_path)
            .await;

        if native_path != final_path {
            remove_file_logged(&native_path).await;
        }

        match produced {
            Ok(()) => {
                self.artifacts.mark_ready(artifact)?;
                debug!(request_id = request_id, path = ?final_path, "Speech artifact ready");
                Ok(SynthesizedSpeech {
                    artifact,
                    format: job.format,
                })
            }
            Err(e) => {
                warn!(request_id = request_id, "Speech synthesis failed: {}", e);
                self.artifacts.discard(artifact).await;
                Err(e)
            }
        }
    }

    async fn produce(
        &self,
        job: &SpeechJob,
        stem: &str,
        native_path: &Path,
        final_path: &Path,
    ) -> Result<()> {
        let command = match &job.mode {
            SynthesisMode::Standard { voice } => self.say_command(voice, job, native_path),
            SynthesisMode::Clone { model } => {
                let prefix = self.config.temp_dir.join(stem);
                self.clone_command(model, job, &prefix)?
            }
        };

        self.runner
            .run(command)
            .await
            .map_err(|e| GatewayError::synthesis(e.to_string()))?;

        if !path_exists(native_path).await {
            return Err(GatewayError::synthesis(format!(
                "Synthesis tool produced no output at {}",
                native_path.display()
            )));
        }

        if native_path != final_path {
            self.runner
                .run(self.transcode_command(native_path, final_path))
                .await
                .map_err(|e| GatewayError::synthesis(format!("Transcoding failed: {}", e)))?;

            if !path_exists(final_path).await {
                return Err(GatewayError::synthesis(format!(
                    "Transcoder produced no output at {}",
                    final_path.display()
                )));
            }
        }

        Ok(())
    }

    fn validate(&self, request: &SpeechRequest) -> Result<SpeechJob> {
        let input = request
            .input
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| GatewayError::missing_parameter("input"))?;

        if input.chars().count() > MAX_INPUT_CHARS {
            return Err(GatewayError::invalid_request_with_code(
                format!("Input text too long (max {} characters)", MAX_INPUT_CHARS),
                "input_too_long",
            ));
        }

        let requested_format = request
            .response_format
            .as_deref()
            .unwrap_or(&self.config.default_format);
        let format = AudioFormat::parse(requested_format).ok_or_else(|| {
            GatewayError::invalid_request_with_code(
                format!(
                    "Unsupported response_format '{}'; expected one of mp3, wav, aac, flac, opus, aiff",
                    requested_format
                ),
                "unsupported_format",
            )
        })?;

        if let Some(speed) = request.speed {
            if !(0.25..=4.0).contains(&speed) {
                return Err(GatewayError::invalid_request_with_code(
                    format!("Speed must be between 0.25 and 4.0, got {}", speed),
                    "invalid_speed",
                ));
            }
        }

        let text = sanitize_text(input);
        if text.is_empty() {
            return Err(GatewayError::invalid_request_with_code(
                "Input contains no speakable text",
                "invalid_input",
            ));
        }

        let mode = match request.model.strip_suffix(CLONE_SUFFIX) {
            Some(prefix) => {
                self.check_clone_config()?;
                let model = if prefix.contains('/') {
                    prefix.to_string()
                } else {
                    self.config.clone.model.clone()
                };
                SynthesisMode::Clone { model }
            }
            None => SynthesisMode::Standard {
                voice: resolve_voice(request.voice.as_deref(), &self.config.default_voice)
                    .to_string(),
            },
        };

        Ok(SpeechJob {
            text,
            format,
            speed: request.speed,
            mode,
        })
    }

    /// Clone mode needs the feature on plus an existing reference sample and transcript
    fn check_clone_config(&self) -> Result<(&Path, &str)> {
        let clone = &self.config.clone;
        if !clone.enabled {
            return Err(GatewayError::config(
                "Voice cloning is disabled (set TTS_CLONE_ENABLED=true)",
            ));
        }
        let ref_audio = clone.ref_audio.as_deref().ok_or_else(|| {
            GatewayError::config("Voice cloning requires TTS_CLONE_REF_AUDIO")
        })?;
        if !ref_audio.is_file() {
            return Err(GatewayError::config(format!(
                "Voice clone reference audio not found: {}",
                ref_audio.display()
            )));
        }
        let ref_text = clone
            .ref_text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| GatewayError::config("Voice cloning requires TTS_CLONE_REF_TEXT"))?;
        Ok((ref_audio, ref_text))
    }

    fn say_command(&self, voice: &str, job: &SpeechJob, output: &Path) -> ToolCommand {
        let mut command = ToolCommand::new(&self.config.say_bin, self.config.tool_timeout())
            .args(["-v", voice]);
        if let Some(speed) = job.speed.filter(|s| (*s - 1.0).abs() > f32::EPSILON) {
            let wpm = (speed * BASE_WORDS_PER_MINUTE).round() as u32;
            command = command.arg("-r").arg(wpm.to_string());
        }
        command
            .arg("-o")
            .arg(output.as_os_str())
            .stdin(job.text.clone())
    }

    fn clone_command(&self, model: &str, job: &SpeechJob, prefix: &Path) -> Result<ToolCommand> {
        let (ref_audio, ref_text) = self.check_clone_config()?;
        let clone = &self.config.clone;
        let speed = job.speed.unwrap_or(clone.speed);

        Ok(
            ToolCommand::new(&clone.python_bin, self.config.tool_timeout())
                .args(["-m", "mlx_audio.tts.generate", "--model", model])
                .arg(format!("--text={}", job.text))
                .arg("--ref_audio")
                .arg(ref_audio.as_os_str())
                .arg(format!("--ref_text={}", ref_text))
                .args(["--lang_code", clone.lang_code.as_str()])
                .args(["--speed".to_string(), speed.to_string()])
                .arg("--file_prefix")
                .arg(prefix.as_os_str())
                .args(["--audio_format", "wav", "--join_audio"]),
        )
    }

    fn transcode_command(&self, input: &Path, output: &Path) -> ToolCommand {
        ToolCommand::new(&self.config.ffmpeg_bin, self.config.tool_timeout())
            .args(["-y", "-hide_banner", "-loglevel", "error", "-i"])
            .arg(input.as_os_str())
            .arg(output.as_os_str())
    }

    /// Installed system voices; empty when `say` is unavailable
    pub async fn list_system_voices(&self) -> Vec<SystemVoice> {
        let command = ToolCommand::new(&self.config.say_bin, VOICE_LIST_TIMEOUT).args(["-v", "?"]);
        match self.runner.run(command).await {
            Ok(output) => parse_say_voices(&output.stdout_lossy()),
            Err(e) => {
                debug!("Could not list system voices: {}", e);
                Vec::new()
            }
        }
    }

    /// Model ids served by this adapter
    pub fn model_ids(&self) -> Vec<String> {
        let mut models = vec!["tts-1".to_string(), "tts-1-hd".to_string()];
        if self.config.clone.enabled {
            models.push(format!("{}{}", self.config.clone.model, CLONE_SUFFIX));
        }
        models
    }

    /// Directory holding synthesized artifacts
    pub fn temp_dir(&self) -> PathBuf {
        self.config.temp_dir.clone()
    }
}

async fn path_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

//! Configuration loading utilities
//!
//! Reads every setting from a key lookup (normally the process environment).
//! Empty values count as unset.

use super::models::*;
use super::Config;
use crate::utils::error::{GatewayError, Result};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

/// Key/value source for configuration
pub struct EnvSource<F> {
    lookup: F,
}

impl<F> EnvSource<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub fn new(lookup: F) -> Self {
        Self { lookup }
    }

    fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn string_or(&self, key: &str, default: String) -> String {
        self.string(key).unwrap_or(default)
    }

    fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.string(key)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|e| GatewayError::Config(format!("Invalid {} '{}': {}", key, raw, e)))
            })
            .transpose()
    }

    fn flag(&self, key: &str) -> Result<Option<bool>> {
        self.string(key)
            .map(|raw| match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                _ => Err(GatewayError::Config(format!(
                    "Invalid {} '{}': expected true or false",
                    key, raw
                ))),
            })
            .transpose()
    }

    /// Build the whole configuration
    pub fn load(&self) -> Result<Config> {
        debug!("Loading configuration from environment variables");

        let tool_timeout_secs = self
            .parse("TOOL_TIMEOUT_SECS")?
            .unwrap_or_else(default_tool_timeout);

        let defaults = ServerConfig::default();
        let server = ServerConfig {
            host: self.string_or("HOST", defaults.host),
            port: self.parse("PORT")?.unwrap_or(defaults.port),
            workers: self.parse("SERVER_WORKERS")?,
            max_body_size: self.parse("MAX_BODY_SIZE")?.unwrap_or(defaults.max_body_size),
        };

        let auth = AuthConfig {
            key_required: self.flag("API_KEY_REQUIRED")?.unwrap_or(false),
            api_key: self.string("API_KEY").unwrap_or_default(),
        };

        let defaults = CloneConfig::default();
        let clone = CloneConfig {
            enabled: self.flag("TTS_CLONE_ENABLED")?.unwrap_or(defaults.enabled),
            model: self.string_or("TTS_CLONE_MODEL", defaults.model),
            ref_audio: self.string("TTS_CLONE_REF_AUDIO").map(PathBuf::from),
            ref_text: self.string("TTS_CLONE_REF_TEXT"),
            lang_code: self.string_or("TTS_CLONE_LANG_CODE", defaults.lang_code),
            speed: self.parse("TTS_CLONE_SPEED")?.unwrap_or(defaults.speed),
            python_bin: self.string_or("TTS_CLONE_PYTHON", defaults.python_bin),
        };

        let defaults = SpeechConfig::default();
        let speech = SpeechConfig {
            default_voice: self.string_or("TTS_VOICE", defaults.default_voice),
            default_format: self
                .string_or("TTS_OUTPUT_FORMAT", defaults.default_format)
                .to_ascii_lowercase(),
            temp_dir: self
                .string("TTS_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.temp_dir),
            say_bin: self.string_or("TTS_SAY_BIN", defaults.say_bin),
            ffmpeg_bin: self.string_or("FFMPEG_BIN", defaults.ffmpeg_bin),
            tool_timeout_secs,
            clone,
        };

        let defaults = TranscriptionConfig::default();
        let transcription = TranscriptionConfig {
            whisper_bin: self.string_or("STT_BIN", defaults.whisper_bin),
            model: self.string_or("STT_MODEL", defaults.model),
            language: self.string_or("STT_LANGUAGE", defaults.language),
            output_dir: self
                .string("STT_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            upload_dir: self
                .string("STT_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            max_upload_bytes: self
                .parse("STT_MAX_UPLOAD_BYTES")?
                .unwrap_or(defaults.max_upload_bytes),
            tool_timeout_secs,
        };

        let defaults = UpstreamConfig::default();
        let upstream = UpstreamConfig {
            base_url: self
                .string_or("LMSTUDIO_BASE_URL", defaults.base_url)
                .trim_end_matches('/')
                .to_string(),
            api_key: self.string("LMSTUDIO_API_KEY"),
            timeout_ms: self.parse("LMSTUDIO_TIMEOUT")?.unwrap_or(defaults.timeout_ms),
        };

        let outbound_proxy = OutboundProxyConfig {
            enabled: self.flag("LOCAL_PROXY_ENABLED")?.unwrap_or(false),
            url: ["https_proxy", "HTTPS_PROXY", "http_proxy", "HTTP_PROXY"]
                .iter()
                .find_map(|key| self.string(key)),
        };

        let defaults = ImageBackendConfig::default();
        let images = ImageBackendConfig {
            enabled: self.flag("DRAW_THINGS_ENABLED")?.unwrap_or(defaults.enabled),
            base_url: self
                .string_or("DRAW_THINGS_BASE_URL", defaults.base_url)
                .trim_end_matches('/')
                .to_string(),
            timeout_ms: self
                .parse("DRAW_THINGS_TIMEOUT")?
                .unwrap_or(defaults.timeout_ms),
        };

        let defaults = ArtifactConfig::default();
        let artifacts = ArtifactConfig {
            sweep_interval_secs: self
                .parse("ARTIFACT_SWEEP_INTERVAL_SECS")?
                .unwrap_or(defaults.sweep_interval_secs),
            max_age_secs: self
                .parse("ARTIFACT_MAX_AGE_SECS")?
                .unwrap_or(defaults.max_age_secs),
            grace_ms: self.parse("ARTIFACT_GRACE_MS")?.unwrap_or(defaults.grace_ms),
        };

        debug!("Configuration loaded from environment variables");
        Ok(Config {
            server,
            auth,
            speech,
            transcription,
            upstream,
            outbound_proxy,
            images,
            artifacts,
        })
    }
}

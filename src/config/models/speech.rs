//! Speech synthesis configuration

use super::default_tool_timeout;
use std::path::PathBuf;
use std::time::Duration;

/// Voice clone settings
#[derive(Debug, Clone)]
pub struct CloneConfig {
    pub enabled: bool,
    /// Default clone model repository
    pub model: String,
    /// Reference voice sample
    pub ref_audio: Option<PathBuf>,
    /// Transcript of the reference sample
    pub ref_text: Option<String>,
    pub lang_code: String,
    pub speed: f32,
    /// Python interpreter that has `mlx_audio` installed
    pub python_bin: String,
}

impl Default for CloneConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: "mlx-community/Spark-TTS-0.5B-16bf".to_string(),
            ref_audio: None,
            ref_text: None,
            lang_code: "z".to_string(),
            speed: 1.0,
            python_bin: "python3".to_string(),
        }
    }
}

/// Speech synthesis configuration
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    /// System voice used when no mapping applies
    pub default_voice: String,
    pub default_format: String,
    /// Directory holding synthesized artifacts
    pub temp_dir: PathBuf,
    pub say_bin: String,
    pub ffmpeg_bin: String,
    /// Timeout for one tool invocation, in seconds
    pub tool_timeout_secs: u64,
    pub clone: CloneConfig,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            default_voice: "Yue".to_string(),
            default_format: "mp3".to_string(),
            temp_dir: PathBuf::from("/tmp/miniAiApi"),
            say_bin: "say".to_string(),
            ffmpeg_bin: "ffmpeg".to_string(),
            tool_timeout_secs: default_tool_timeout(),
            clone: CloneConfig::default(),
        }
    }
}

impl SpeechConfig {
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    /// Validate speech configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.tool_timeout_secs == 0 {
            return Err("Tool timeout cannot be 0".to_string());
        }
        if !(0.25..=4.0).contains(&self.clone.speed) {
            return Err(format!(
                "Clone speed must be between 0.25 and 4.0, got {}",
                self.clone.speed
            ));
        }
        Ok(())
    }
}

//! Speech recognition configuration

use super::default_tool_timeout;
use std::path::PathBuf;
use std::time::Duration;

/// Speech recognition configuration
#[derive(Debug, Clone)]
pub struct TranscriptionConfig {
    /// The `mlx_whisper` executable
    pub whisper_bin: String,
    pub model: String,
    /// Default language code, or `auto`
    pub language: String,
    /// Where the tool writes its JSON result
    pub output_dir: PathBuf,
    /// Where uploads are staged before the tool runs
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Timeout for one tool invocation, in seconds
    pub tool_timeout_secs: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            whisper_bin: "mlx_whisper".to_string(),
            model: "mlx-community/whisper-large-v3-mlx".to_string(),
            language: "zh".to_string(),
            output_dir: PathBuf::from("/tmp/whisper_output"),
            upload_dir: PathBuf::from("/tmp/miniAiApi/uploads"),
            max_upload_bytes: 50 * 1024 * 1024,
            tool_timeout_secs: default_tool_timeout(),
        }
    }
}

impl TranscriptionConfig {
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    /// Validate recognition configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_upload_bytes == 0 {
            return Err("Max upload size cannot be 0".to_string());
        }
        if self.tool_timeout_secs == 0 {
            return Err("Tool timeout cannot be 0".to_string());
        }
        if self.output_dir == self.upload_dir {
            return Err("STT_OUTPUT_DIR and STT_UPLOAD_DIR must differ".to_string());
        }
        Ok(())
    }
}

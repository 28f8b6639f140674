//! Test fixtures
//!
//! `TestEnv` owns a scratch directory holding every gateway directory and
//! points the tool binaries at stand-in scripts, so requests run the real
//! process runner end to end without the macOS tool chain.

use actix_web::web;
use mini_ai_gateway::server::AppState;
use mini_ai_gateway::{Config, Gateway};
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Writes `voice:<name>` followed by stdin to the `-o` path
const FAKE_SAY: &str = r#"#!/bin/sh
voice=""
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -v) voice="$2"; shift 2 ;;
    -o) out="$2"; shift 2 ;;
    *) shift ;;
  esac
done
if [ "$voice" = "?" ]; then
  echo "Alex                en_US    # Most people recognize me by my voice."
  echo "Tingting            zh_CN    # 你好，我叫婷婷。"
  exit 0
fi
printf 'voice:%s\n' "$voice" > "$out"
cat >> "$out"
"#;

/// Copies the `-i` input to the final argument
const FAKE_FFMPEG: &str = r#"#!/bin/sh
in=""
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -i) in="$2"; shift 2 ;;
    *) out="$1"; shift ;;
  esac
done
cp "$in" "$out"
"#;

/// Writes a fixed recognition document to `<output-dir>/<stem>.json`,
/// recording its arguments next to it for inspection
const FAKE_WHISPER: &str = r#"#!/bin/sh
input="$1"
shift
all="$*"
dir=""
while [ $# -gt 0 ]; do
  case "$1" in
    --output-dir) dir="$2"; shift 2 ;;
    *) shift ;;
  esac
done
stem=$(basename "$input")
stem="${stem%.*}"
printf '%s\n' "$all" > "$dir/../whisper_args.txt"
cat > "$dir/$stem.json" <<'EOF'
{"text": " hello world", "language": "en", "segments": [{"id": 0, "start": 0.0, "end": 1.5, "text": " hello world", "words": [{"word": " hello", "start": 0.0, "end": 0.7}, {"word": " world", "start": 0.8, "end": 1.5}]}]}
EOF
"#;

const FAILING_TOOL: &str = "#!/bin/sh\necho 'model weights missing' >&2\nexit 3\n";

pub const TEST_API_KEY: &str = "test-secret";

/// Stand-in tools, written once per test process
static TOOLS: Lazy<TempDir> = Lazy::new(|| {
    let dir = tempfile::tempdir().expect("Failed to create tool dir");
    for (name, script) in [
        ("say", FAKE_SAY),
        ("ffmpeg", FAKE_FFMPEG),
        ("mlx_whisper", FAKE_WHISPER),
        ("failing", FAILING_TOOL),
    ] {
        install(&dir.path().join(name), script);
    }
    dir
});

fn install(path: &Path, script: &str) {
    std::fs::write(path, script).expect("Failed to write tool script");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to mark tool script executable");
    }
}

fn tool(name: &str) -> String {
    TOOLS.path().join(name).display().to_string()
}

/// Scratch directory plus a gateway configuration rooted in it
pub struct TestEnv {
    dir: TempDir,
    pub config: Config,
}

impl TestEnv {
    /// Directories only; tool binaries point at nothing runnable
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = dir.path();

        let mut config = Config::default();
        config.speech.temp_dir = root.join("speech");
        config.speech.say_bin = root.join("missing/say").display().to_string();
        config.speech.ffmpeg_bin = root.join("missing/ffmpeg").display().to_string();
        config.speech.tool_timeout_secs = 10;
        config.transcription.whisper_bin = root.join("missing/mlx_whisper").display().to_string();
        config.transcription.output_dir = root.join("stt/output");
        config.transcription.upload_dir = root.join("stt/uploads");
        config.transcription.tool_timeout_secs = 10;
        config.artifacts.grace_ms = 10;

        for sub in ["speech", "stt/output", "stt/uploads"] {
            std::fs::create_dir_all(root.join(sub)).expect("Failed to create test directory");
        }

        Self { dir, config }
    }

    /// Directories plus working stand-ins for every tool
    pub fn with_tools() -> Self {
        let mut env = Self::new();
        env.config.speech.say_bin = tool("say");
        env.config.speech.ffmpeg_bin = tool("ffmpeg");
        env.config.transcription.whisper_bin = tool("mlx_whisper");
        env
    }

    /// Require `TEST_API_KEY` on protected routes
    pub fn protected(mut self) -> Self {
        self.config.auth.key_required = true;
        self.config.auth.api_key = TEST_API_KEY.to_string();
        self
    }

    /// Replace one tool with a script that exits non-zero
    pub fn failing(mut self, name: &str) -> Self {
        let failing = tool("failing");
        match name {
            "say" => self.config.speech.say_bin = failing,
            "ffmpeg" => self.config.speech.ffmpeg_bin = failing,
            "mlx_whisper" => self.config.transcription.whisper_bin = failing,
            other => panic!("Unknown tool: {}", other),
        }
        self
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn speech_dir(&self) -> PathBuf {
        self.config.speech.temp_dir.clone()
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.config.transcription.upload_dir.clone()
    }

    pub fn output_dir(&self) -> PathBuf {
        self.config.transcription.output_dir.clone()
    }

    /// Arguments the last whisper invocation received
    pub fn whisper_args(&self) -> String {
        std::fs::read_to_string(self.root().join("stt/whisper_args.txt")).unwrap_or_default()
    }

    /// Build the shared application state
    pub fn state(&self) -> web::Data<AppState> {
        let gateway = Gateway::new(self.config.clone()).expect("Failed to build gateway");
        web::Data::new(AppState::new(gateway))
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Hand-built `multipart/form-data` body
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: format!("----gateway-test-{}", uuid::Uuid::new_v4().simple()),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                self.boundary, name, filename
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(content);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (self.content_type(), self.body)
    }
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

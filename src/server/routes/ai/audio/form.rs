//! Multipart form parsing shared by transcription and translation

use crate::config::TranscriptionConfig;
use crate::core::artifacts::ScratchFile;
use crate::core::audio::{Granularities, RecognitionTask, TranscriptFormat, TranscriptionRequest};
use crate::utils::error::{GatewayError, Result};
use actix_multipart::{Field, Multipart, MultipartError};
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

/// Upper bound for a single text field
const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

fn invalid_multipart(e: MultipartError) -> GatewayError {
    GatewayError::invalid_request_with_code(
        format!("Invalid multipart data: {}", e),
        "invalid_multipart",
    )
}

/// Keep a short alphanumeric extension from the client file name
fn upload_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    (!ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .then(|| ext.to_ascii_lowercase())
}

async fn read_text(field: &mut Field) -> Result<String> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(invalid_multipart)?;
        if buf.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
            return Err(GatewayError::invalid_request_with_code(
                "Form field too large",
                "invalid_multipart",
            ));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&buf).trim().to_string())
}

async fn drain(field: &mut Field) -> Result<()> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(invalid_multipart)?;
    }
    Ok(())
}

/// Stream the uploaded file to `<upload_dir>/upload_<uuid>.<ext>`, parking it
/// in `staged` before the first byte is written
async fn save_upload(
    field: &mut Field,
    config: &TranscriptionConfig,
    task: RecognitionTask,
    staged: &mut Option<ScratchFile>,
) -> Result<u64> {
    let extension = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .and_then(upload_extension)
        .unwrap_or_else(|| "bin".to_string());

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .map_err(|e| task.error(format!("Failed to create upload directory: {}", e)))?;

    let path = staged
        .insert(ScratchFile::new(
            config
                .upload_dir
                .join(format!("upload_{}.{}", Uuid::new_v4(), extension)),
        ))
        .path()
        .to_path_buf();
    let mut file = tokio::fs::File::create(&path)
        .await
        .map_err(|e| task.error(format!("Failed to stage upload: {}", e)))?;

    let mut size: u64 = 0;
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(invalid_multipart)?;
        size += chunk.len() as u64;
        if size > config.max_upload_bytes as u64 {
            return Err(GatewayError::invalid_request_with_code(
                format!(
                    "Uploaded file exceeds the {} byte limit",
                    config.max_upload_bytes
                ),
                "file_too_large",
            ));
        }
        file.write_all(&chunk)
            .await
            .map_err(|e| task.error(format!("Failed to stage upload: {}", e)))?;
    }
    file.flush()
        .await
        .map_err(|e| task.error(format!("Failed to stage upload: {}", e)))?;

    debug!(path = ?path, size, "Staged upload");
    Ok(size)
}

/// Read a recognition form; the staged upload is removed on any error
pub async fn read_recognition_form(
    payload: Multipart,
    config: &TranscriptionConfig,
    task: RecognitionTask,
) -> Result<TranscriptionRequest> {
    let mut staged = None;
    let result = parse_recognition_form(payload, config, task, &mut staged).await;
    if result.is_err() {
        if let Some(upload) = staged.take() {
            upload.remove().await;
        }
    }
    result
}

async fn parse_recognition_form(
    mut payload: Multipart,
    config: &TranscriptionConfig,
    task: RecognitionTask,
    staged: &mut Option<ScratchFile>,
) -> Result<TranscriptionRequest> {
    let mut size = 0;
    let mut model = None;
    let mut language = None;
    let mut prompt = None;
    let mut response_format = None;
    let mut temperature = None;
    let mut granularities: Vec<String> = Vec::new();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(invalid_multipart)?;
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" if staged.is_none() => {
                size = save_upload(&mut field, config, task, staged).await?;
            }
            "model" => model = Some(read_text(&mut field).await?),
            "language" => language = Some(read_text(&mut field).await?),
            "prompt" => prompt = Some(read_text(&mut field).await?),
            "response_format" => response_format = Some(read_text(&mut field).await?),
            "temperature" => temperature = Some(read_text(&mut field).await?),
            "timestamp_granularities" | "timestamp_granularities[]" => {
                granularities.push(read_text(&mut field).await?)
            }
            _ => drain(&mut field).await?,
        }
    }

    if size == 0 {
        return Err(GatewayError::missing_parameter("file"));
    }

    let response_format = match response_format.as_deref().filter(|f| !f.is_empty()) {
        Some(format) => TranscriptFormat::parse(format)?,
        None => TranscriptFormat::default(),
    };
    let granularities = Granularities::parse(&granularities)?;
    let temperature = match temperature.as_deref().filter(|t| !t.is_empty()) {
        Some(raw) => Some(raw.parse::<f32>().map_err(|_| {
            GatewayError::invalid_request_with_code(
                format!("Invalid temperature '{}'", raw),
                "invalid_temperature",
            )
        })?),
        None => None,
    };

    let upload = staged
        .take()
        .ok_or_else(|| GatewayError::missing_parameter("file"))?;
    Ok(TranscriptionRequest {
        upload,
        task,
        model: model.filter(|m| !m.is_empty()),
        language: match task {
            RecognitionTask::Transcribe => language.filter(|l| !l.is_empty()),
            RecognitionTask::Translate => None,
        },
        prompt: prompt.filter(|p| !p.is_empty()),
        response_format,
        temperature,
        granularities,
    })
}

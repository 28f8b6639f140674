//! Image generation through the Draw Things HTTP API
//!
//! Accepts OpenAI-shaped requests, calls `POST /sdapi/v1/txt2img` and reshapes
//! the base64 images into an OpenAI image response.

use crate::config::ImageBackendConfig;
use crate::utils::error::{GatewayError, Result};
use crate::utils::net::{ClientUtils, HttpClientConfig};
use crate::utils::truncate_string;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const TXT2IMG_PATH: &str = "/sdapi/v1/txt2img";
const MAX_IMAGES: u32 = 10;
const DEFAULT_SIZE: &str = "1024x1024";

/// Image generation request (OpenAI compatible)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageGenerationRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub n: Option<u32>,
    /// "WIDTHxHEIGHT"
    #[serde(default)]
    pub size: Option<String>,
    /// "b64_json" (default) or "url" (returned as a data URL)
    #[serde(default)]
    pub response_format: Option<String>,
    /// Draw Things extension, passed through
    #[serde(default)]
    pub negative_prompt: Option<String>,
    #[serde(default)]
    pub steps: Option<u32>,
    #[serde(default)]
    pub seed: Option<i64>,
}

/// Image generation response (OpenAI compatible)
#[derive(Debug, Clone, Serialize)]
pub struct ImageGenerationResponse {
    pub created: i64,
    pub data: Vec<ImageData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b64_json: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
struct Txt2ImgRequest<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<&'a str>,
    width: u32,
    height: u32,
    batch_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    steps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Txt2ImgResponse {
    #[serde(default)]
    images: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageResponseFormat {
    B64Json,
    DataUrl,
}

/// Image generation adapter
pub struct ImageService {
    config: ImageBackendConfig,
    client: Client,
}

impl ImageService {
    pub fn new(config: ImageBackendConfig) -> Result<Self> {
        let client = ClientUtils::create_http_client(&HttpClientConfig {
            connect_timeout: config.timeout(),
            timeout: Some(config.timeout()),
            ..HttpClientConfig::default()
        })?;
        Ok(Self { config, client })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Generate images for one request
    pub async fn generate(
        &self,
        request: ImageGenerationRequest,
        request_id: &str,
    ) -> Result<ImageGenerationResponse> {
        if !self.config.enabled {
            return Err(GatewayError::config(
                "Image generation is disabled (set DRAW_THINGS_ENABLED=true)",
            ));
        }

        let prompt = request
            .prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| GatewayError::missing_parameter("prompt"))?;

        let n = request.n.unwrap_or(1);
        if !(1..=MAX_IMAGES).contains(&n) {
            return Err(GatewayError::invalid_request_with_code(
                format!("n must be between 1 and {}, got {}", MAX_IMAGES, n),
                "invalid_n",
            ));
        }

        let (width, height) = parse_size(request.size.as_deref().unwrap_or(DEFAULT_SIZE))?;

        let format = match request.response_format.as_deref() {
            None | Some("b64_json") => ImageResponseFormat::B64Json,
            Some("url") => ImageResponseFormat::DataUrl,
            Some(other) => {
                return Err(GatewayError::invalid_request_with_code(
                    format!(
                        "Unsupported response_format '{}'; expected b64_json or url",
                        other
                    ),
                    "unsupported_format",
                ));
            }
        };

        info!(
            request_id = request_id,
            model = request.model.as_deref().unwrap_or("default"),
            width,
            height,
            n,
            "Generating image"
        );

        let body = Txt2ImgRequest {
            prompt,
            negative_prompt: request.negative_prompt.as_deref(),
            width,
            height,
            batch_size: n,
            steps: request.steps,
            seed: request.seed,
        };

        let url = format!("{}{}", self.config.base_url, TXT2IMG_PATH);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                GatewayError::image_generation(format!("Image backend unreachable: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(request_id = request_id, status = status.as_u16(), "Image backend error");
            return Err(GatewayError::image_generation(format!(
                "Image backend returned {}: {}",
                status,
                truncate_string(&detail, 200)
            )));
        }

        let parsed: Txt2ImgResponse = response.json().await.map_err(|e| {
            GatewayError::image_generation(format!("Malformed image backend response: {}", e))
        })?;
        if parsed.images.is_empty() {
            return Err(GatewayError::image_generation(
                "Image backend returned no images",
            ));
        }

        let data = parsed
            .images
            .into_iter()
            .map(|image| match format {
                ImageResponseFormat::B64Json => ImageData {
                    b64_json: Some(image),
                    url: None,
                },
                ImageResponseFormat::DataUrl => ImageData {
                    b64_json: None,
                    url: Some(format!("data:image/png;base64,{}", image)),
                },
            })
            .collect();

        Ok(ImageGenerationResponse {
            created: chrono::Utc::now().timestamp(),
            data,
        })
    }
}

fn parse_size(size: &str) -> Result<(u32, u32)> {
    let invalid = || {
        GatewayError::invalid_request_with_code(
            format!("Invalid size '{}'; expected WIDTHxHEIGHT", size),
            "invalid_size",
        )
    };
    let (w, h) = size.split_once('x').ok_or_else(invalid)?;
    let width: u32 = w.trim().parse().map_err(|_| invalid())?;
    let height: u32 = h.trim().parse().map_err(|_| invalid())?;
    if width == 0 || height == 0 || width > 4096 || height > 4096 {
        return Err(invalid());
    }
    Ok((width, height))
}

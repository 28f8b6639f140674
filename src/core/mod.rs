//! Core functionality for the Gateway
//!
//! Capability adapters, the upstream forwarder, the artifact lifecycle and the
//! process runner they share.

pub mod artifacts;
pub mod audio;
pub mod capabilities;
pub mod images;
pub mod process;
pub mod proxy;

use crate::config::Config;
use crate::utils::error::Result;
use artifacts::ArtifactManager;
use audio::{SpeechService, TranscriptionService};
use capabilities::{Availability, Capability, CapabilityTable};
use images::ImageService;
use process::{SystemToolRunner, ToolRunner};
use proxy::UpstreamForwarder;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Main Gateway struct that owns every service
///
/// Built once at startup and shared read-only with all request handlers.
#[derive(Clone)]
pub struct Gateway {
    config: Arc<Config>,
    artifacts: ArtifactManager,
    speech: Arc<SpeechService>,
    transcription: Arc<TranscriptionService>,
    images: Arc<ImageService>,
    upstream: Arc<UpstreamForwarder>,
    capabilities: Arc<CapabilityTable>,
}

impl Gateway {
    /// Create a gateway that runs real system tools
    pub fn new(config: Config) -> Result<Self> {
        Self::with_runner(config, Arc::new(SystemToolRunner))
    }

    /// Create a gateway with an explicit process runner
    pub fn with_runner(config: Config, runner: Arc<dyn ToolRunner>) -> Result<Self> {
        info!("Initializing Gateway");

        let artifacts = ArtifactManager::new(config.artifacts.clone(), watched_dirs(&config));

        debug!("Initializing capability adapters");
        let speech = Arc::new(SpeechService::new(
            config.speech.clone(),
            runner.clone(),
            artifacts.clone(),
        ));
        let transcription = Arc::new(TranscriptionService::new(
            config.transcription.clone(),
            runner,
            artifacts.clone(),
        ));
        let images = Arc::new(ImageService::new(config.images.clone())?);

        debug!("Initializing upstream forwarder");
        let upstream = Arc::new(UpstreamForwarder::new(
            &config.upstream,
            &config.outbound_proxy,
        )?);

        let capabilities = Arc::new(CapabilityTable::probe(|capability| match capability {
            Capability::SpeechSynthesis => Availability::from_probe(speech.is_available()),
            Capability::Transcription | Capability::Translation => {
                Availability::from_probe(transcription.is_available())
            }
            Capability::ImageGeneration if images.is_enabled() => Availability::Available,
            Capability::ImageGeneration => Availability::Disabled,
        }));

        for descriptor in capabilities.descriptors() {
            info!(
                capability = descriptor.id,
                path = descriptor.path,
                availability = ?descriptor.availability,
                "Capability registered"
            );
        }
        if speech.clone_ready() {
            info!(model = %config.speech.clone.model, "Voice cloning ready");
        }

        info!("Gateway initialized successfully");

        Ok(Self {
            config: Arc::new(config),
            artifacts,
            speech,
            transcription,
            images,
            upstream,
            capabilities,
        })
    }

    /// Get gateway configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn artifacts(&self) -> &ArtifactManager {
        &self.artifacts
    }

    pub fn speech(&self) -> &SpeechService {
        &self.speech
    }

    pub fn transcription(&self) -> &TranscriptionService {
        &self.transcription
    }

    pub fn images(&self) -> &ImageService {
        &self.images
    }

    pub fn upstream(&self) -> &UpstreamForwarder {
        &self.upstream
    }

    pub fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    /// Health snapshot; reads only startup state, so repeated calls agree
    pub fn health_check(&self) -> HealthStatus {
        let availability = |c: Capability| self.capabilities.availability(c);
        HealthStatus {
            status: "ok",
            timestamp: chrono::Utc::now(),
            version: crate::VERSION,
            services: ServiceHealth {
                tts: availability(Capability::SpeechSynthesis),
                stt: availability(Capability::Transcription),
                translation: availability(Capability::Translation),
                images: availability(Capability::ImageGeneration),
                upstream: Availability::Available,
            },
        }
    }
}

/// Directories covered by the artifact sweep
fn watched_dirs(config: &Config) -> Vec<PathBuf> {
    let mut dirs = vec![
        config.speech.temp_dir.clone(),
        config.transcription.output_dir.clone(),
        config.transcription.upload_dir.clone(),
    ];
    dirs.dedup();
    dirs
}

/// Health status response
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: &'static str,
    pub services: ServiceHealth,
}

/// Per-service availability
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceHealth {
    pub tts: Availability,
    pub stt: Availability,
    pub translation: Availability,
    pub images: Availability,
    pub upstream: Availability,
}

//! Capability table and request dispatch
//!
//! The route table and the auth gate both read from [`Capability::ALL`] and
//! [`resolve`], so the two can never disagree about what a path means.

use serde::Serialize;

/// Prefix under which every protected endpoint lives
pub const API_PREFIX: &str = "/v1";

/// A locally implemented machine capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    SpeechSynthesis,
    Transcription,
    Translation,
    ImageGeneration,
}

/// Request body shape a capability accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputShape {
    Json,
    Multipart,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::SpeechSynthesis,
        Capability::Transcription,
        Capability::Translation,
        Capability::ImageGeneration,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::SpeechSynthesis => "speech-synthesis",
            Self::Transcription => "transcription",
            Self::Translation => "translation",
            Self::ImageGeneration => "image-generation",
        }
    }

    /// Full request path
    pub fn path(&self) -> &'static str {
        match self {
            Self::SpeechSynthesis => "/v1/audio/speech",
            Self::Transcription => "/v1/audio/transcriptions",
            Self::Translation => "/v1/audio/translations",
            Self::ImageGeneration => "/v1/images/generations",
        }
    }

    /// Path relative to [`API_PREFIX`], as registered inside the `/v1` scope
    pub fn scoped_path(&self) -> &'static str {
        &self.path()[API_PREFIX.len()..]
    }

    pub fn input_shape(&self) -> InputShape {
        match self {
            Self::SpeechSynthesis | Self::ImageGeneration => InputShape::Json,
            Self::Transcription | Self::Translation => InputShape::Multipart,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::SpeechSynthesis => "Text to speech with system voices or voice cloning",
            Self::Transcription => "Speech to text in the spoken language",
            Self::Translation => "Speech to English text",
            Self::ImageGeneration => "Text to image through Draw Things",
        }
    }
}

/// Whether a capability can currently serve requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Unavailable,
    Disabled,
}

impl Availability {
    pub fn from_probe(found: bool) -> Self {
        if found {
            Self::Available
        } else {
            Self::Unavailable
        }
    }
}

/// One row of the capability table, computed once at startup
#[derive(Debug, Clone, Serialize)]
pub struct CapabilityDescriptor {
    pub id: &'static str,
    pub path: &'static str,
    pub input: InputShape,
    pub availability: Availability,
    pub description: &'static str,
    #[serde(skip)]
    pub capability: Capability,
}

impl CapabilityDescriptor {
    pub fn new(capability: Capability, availability: Availability) -> Self {
        Self {
            id: capability.id(),
            path: capability.path(),
            input: capability.input_shape(),
            availability,
            description: capability.description(),
            capability,
        }
    }
}

/// Read-only table shared through the application state
#[derive(Debug, Clone)]
pub struct CapabilityTable {
    descriptors: Vec<CapabilityDescriptor>,
}

impl CapabilityTable {
    /// Build the table from an availability probe per capability
    pub fn probe<F>(mut availability: F) -> Self
    where
        F: FnMut(Capability) -> Availability,
    {
        Self {
            descriptors: Capability::ALL
                .iter()
                .map(|c| CapabilityDescriptor::new(*c, availability(*c)))
                .collect(),
        }
    }

    pub fn get(&self, capability: Capability) -> Option<&CapabilityDescriptor> {
        self.descriptors.iter().find(|d| d.capability == capability)
    }

    pub fn availability(&self, capability: Capability) -> Availability {
        self.get(capability)
            .map_or(Availability::Unavailable, |d| d.availability)
    }

    pub fn descriptors(&self) -> &[CapabilityDescriptor] {
        &self.descriptors
    }
}

/// Endpoints answered by the gateway itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalEndpoint {
    Root,
    Health,
    Models,
}

/// Where a request path is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Local(LocalEndpoint),
    Capability(Capability),
    Proxy,
    NotFound,
}

impl Dispatch {
    /// Everything under `/v1` is protected
    pub fn requires_auth(&self) -> bool {
        match self {
            Self::Local(LocalEndpoint::Models) | Self::Capability(_) | Self::Proxy => true,
            Self::Local(_) | Self::NotFound => false,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Local(LocalEndpoint::Root) => "root",
            Self::Local(LocalEndpoint::Health) => "health",
            Self::Local(LocalEndpoint::Models) => "models",
            Self::Capability(c) => c.id(),
            Self::Proxy => "proxy",
            Self::NotFound => "not-found",
        }
    }
}

/// Resolve a request path with fixed priority: local endpoints, capabilities,
/// the `/v1` pass-through, then not found.
pub fn resolve(path: &str) -> Dispatch {
    match path {
        "/" | "" => return Dispatch::Local(LocalEndpoint::Root),
        "/health" => return Dispatch::Local(LocalEndpoint::Health),
        "/v1/models" => return Dispatch::Local(LocalEndpoint::Models),
        _ => {}
    }

    if let Some(capability) = Capability::ALL.iter().find(|c| c.path() == path) {
        return Dispatch::Capability(*capability);
    }

    if path == API_PREFIX || path.starts_with("/v1/") {
        return Dispatch::Proxy;
    }

    Dispatch::NotFound
}

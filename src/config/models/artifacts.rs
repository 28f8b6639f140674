//! Artifact lifecycle configuration

use std::time::Duration;

/// Timings for artifact cleanup
#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    /// How often the sweep runs, in seconds
    pub sweep_interval_secs: u64,
    /// Files older than this are swept, in seconds
    pub max_age_secs: u64,
    /// Delay between end of transmission and deletion, in milliseconds
    pub grace_ms: u64,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 3600,
            max_age_secs: 3600,
            grace_ms: 1000,
        }
    }
}

impl ArtifactConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sweep_interval_secs == 0 {
            return Err("Sweep interval cannot be 0".to_string());
        }
        if self.max_age_secs == 0 {
            return Err("Artifact max age cannot be 0".to_string());
        }
        Ok(())
    }
}

use std::time::Duration;

use anyhow::{Context, Result};
use reimage_orchestrations::gcp_client::DEFAULT_COMPUTE_ENDPOINT;
use reimage_orchestrations::names::DEFAULT_IMAGE_PREFIX;

#[derive(Clone)]
pub struct Config {
    pub project: String,
    pub zone: String,
    pub access_token: String,
    pub compute_endpoint: String,
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub image_prefix: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("project", &self.project)
            .field("zone", &self.zone)
            .field("compute_endpoint", &self.compute_endpoint)
            .field("timeout", &self.timeout)
            .field("poll_interval", &self.poll_interval)
            .field("image_prefix", &self.image_prefix)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            project: lookup("GCP_PROJECT").context("GCP_PROJECT must be set")?,
            zone: lookup("GCP_ZONE").context("GCP_ZONE must be set")?,
            access_token: lookup("GCP_ACCESS_TOKEN").context("GCP_ACCESS_TOKEN must be set")?,
            compute_endpoint: lookup("GCP_COMPUTE_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_COMPUTE_ENDPOINT.to_string()),
            timeout: Duration::from_secs(
                lookup("REIMAGE_TIMEOUT_SECS")
                    .unwrap_or_else(|| "300".to_string())
                    .parse()
                    .context("REIMAGE_TIMEOUT_SECS must be a number of seconds")?,
            ),
            poll_interval: Duration::from_secs(
                lookup("REIMAGE_POLL_INTERVAL_SECS")
                    .unwrap_or_else(|| "5".to_string())
                    .parse()
                    .context("REIMAGE_POLL_INTERVAL_SECS must be a number of seconds")?,
            ),
            image_prefix: lookup("REIMAGE_IMAGE_PREFIX").unwrap_or_else(|| DEFAULT_IMAGE_PREFIX.to_string()),
        })
    }
}

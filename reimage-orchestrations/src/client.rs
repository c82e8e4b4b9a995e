//! Provider-neutral instance control
//!
//! Orchestrations depend only on [`InstanceControl`]. [`GcpClient`] is the
//! Compute Engine implementation, built over any [`ComputeApi`] transport.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reimage_models::{Disk, Filter, Instance, InstanceStatus, Location};

use crate::activities::create_image::ImageBuilder;
use crate::activities::find_instance::InstanceDirectory;
use crate::activities::lifecycle;
use crate::activities::wait_for_status::wait_for_status;
use crate::error::IaasError;
use crate::names::DEFAULT_IMAGE_PREFIX;
use crate::polling::WaitConfig;
use crate::provider::ComputeApi;
use crate::types::{ImageSource, StopReport};

#[async_trait]
pub trait InstanceControl: Send + Sync {
    /// The single instance matching `filter`
    async fn find(&self, filter: &Filter) -> Result<Instance, IaasError>;

    /// The single disk matching `filter`
    async fn find_disk(&self, filter: &Filter) -> Result<Disk, IaasError>;

    async fn stop(&self, name: &str) -> Result<StopReport, IaasError>;

    async fn create(&self, spec: &Instance) -> Result<(), IaasError>;

    async fn delete(&self, name: &str) -> Result<(), IaasError>;

    /// Build an image and return its identifier once it is ready to boot from
    async fn create_image(&self, source: &ImageSource, disk_size_gb: i64) -> Result<String, IaasError>;

    /// Bounded wait for `name` to report `desired`
    async fn wait_for_status(&self, name: &str, desired: InstanceStatus) -> Result<(), IaasError>;

    /// Provider reference for a disk name, as accepted by [`ImageSource::Disk`]
    fn disk_reference(&self, disk_name: &str) -> String;
}

pub struct GcpClient {
    api: Arc<dyn ComputeApi>,
    location: Location,
    directory: InstanceDirectory,
    images: ImageBuilder,
    wait: WaitConfig,
}

impl GcpClient {
    pub fn builder() -> GcpClientBuilder {
        GcpClientBuilder::default()
    }

    pub fn location(&self) -> &Location {
        &self.location
    }
}

#[derive(Default)]
pub struct GcpClientBuilder {
    api: Option<Arc<dyn ComputeApi>>,
    project: Option<String>,
    zone: Option<String>,
    timeout: Option<Duration>,
    poll_interval: Option<Duration>,
    image_prefix: Option<String>,
}

impl GcpClientBuilder {
    pub fn compute_api(mut self, api: Arc<dyn ComputeApi>) -> Self {
        self.api = Some(api);
        self
    }

    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    /// Ceiling for every bounded wait (default five minutes)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = Some(poll_interval);
        self
    }

    pub fn image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.image_prefix = Some(prefix.into());
        self
    }

    pub fn build(self) -> Result<GcpClient, IaasError> {
        let api = self
            .api
            .ok_or_else(|| IaasError::Config("incomplete client: no compute API".to_string()))?;
        let project = non_empty(self.project, "project")?;
        let zone = non_empty(self.zone, "zone")?;

        let defaults = WaitConfig::default();
        let wait = WaitConfig::new(
            self.timeout.unwrap_or(defaults.timeout),
            self.poll_interval.unwrap_or(defaults.poll_interval),
        );
        if wait.timeout.is_zero() {
            return Err(IaasError::Config("timeout must be greater than zero".to_string()));
        }

        let location = Location::new(project, zone);
        let directory = InstanceDirectory::new(api.clone(), location.clone());
        let images = ImageBuilder::new(api.clone(), location.clone(), wait)
            .with_prefix(self.image_prefix.unwrap_or_else(|| DEFAULT_IMAGE_PREFIX.to_string()));

        Ok(GcpClient {
            api,
            location,
            directory,
            images,
            wait,
        })
    }
}

fn non_empty(value: Option<String>, field: &str) -> Result<String, IaasError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(IaasError::Config(format!("incomplete client: no {}", field))),
    }
}

#[async_trait]
impl InstanceControl for GcpClient {
    async fn find(&self, filter: &Filter) -> Result<Instance, IaasError> {
        self.directory.find(filter).await
    }

    async fn find_disk(&self, filter: &Filter) -> Result<Disk, IaasError> {
        self.directory.find_disk(filter).await
    }

    async fn stop(&self, name: &str) -> Result<StopReport, IaasError> {
        lifecycle::stop_instance(self.api.as_ref(), &self.location, name).await
    }

    async fn create(&self, spec: &Instance) -> Result<(), IaasError> {
        lifecycle::create_instance(self.api.as_ref(), &self.location, spec).await
    }

    async fn delete(&self, name: &str) -> Result<(), IaasError> {
        lifecycle::delete_instance(self.api.as_ref(), &self.location, name).await
    }

    async fn create_image(&self, source: &ImageSource, disk_size_gb: i64) -> Result<String, IaasError> {
        self.images.create_image(source, disk_size_gb).await
    }

    async fn wait_for_status(&self, name: &str, desired: InstanceStatus) -> Result<(), IaasError> {
        wait_for_status(&self.directory, name, desired, self.wait).await
    }

    fn disk_reference(&self, disk_name: &str) -> String {
        self.location.disk_path(disk_name)
    }
}

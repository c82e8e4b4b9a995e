//! Image builder: submit a disk image and wait for it to become usable

use std::sync::Arc;

use chrono::{DateTime, Utc};
use reimage_models::{last_segment, Image, ImageStatus, Location, RawDisk};

use crate::activities::check_operation;
use crate::error::IaasError;
use crate::names::{timestamp_suffix, DEFAULT_IMAGE_PREFIX};
use crate::polling::{poll_until, Probe, WaitConfig};
use crate::provider::ComputeApi;
use crate::types::ImageSource;

const STORAGE_BASE_URL: &str = "https://storage.googleapis.com";

#[derive(Clone)]
pub struct ImageBuilder {
    api: Arc<dyn ComputeApi>,
    location: Location,
    prefix: String,
    config: WaitConfig,
}

impl ImageBuilder {
    pub fn new(api: Arc<dyn ComputeApi>, location: Location, config: WaitConfig) -> Self {
        Self {
            api,
            location,
            prefix: DEFAULT_IMAGE_PREFIX.to_string(),
            config,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Create an image from `source` and return its fully-qualified identifier once Ready
    pub async fn create_image(&self, source: &ImageSource, disk_size_gb: i64) -> Result<String, IaasError> {
        self.create_image_at(source, disk_size_gb, Utc::now()).await
    }

    async fn create_image_at(
        &self,
        source: &ImageSource,
        disk_size_gb: i64,
        now: DateTime<Utc>,
    ) -> Result<String, IaasError> {
        let name = format!("{}-{}", self.prefix, timestamp_suffix(now));
        let image = self.image_request(&name, source, disk_size_gb)?;

        tracing::info!("Creating image '{}' from {} with disk size {}GB", name, source, disk_size_gb);
        let operation = self.api.insert_image(&self.location, &image).await?;
        check_operation(&operation, &format!("insert image {}", name))?;

        let api = self.api.clone();
        let location = self.location.clone();
        let image_name = name.clone();
        poll_until(format!("image {} to become READY", name), self.config, move || {
            let api = api.clone();
            let location = location.clone();
            let name = image_name.clone();
            async move {
                let image = api.get_image(&location, &name).await?;
                match image.status {
                    ImageStatus::Ready => Ok(Probe::Done(())),
                    ImageStatus::Failed => Err(IaasError::CreationFailed { image: name }),
                    ImageStatus::Pending => Ok(Probe::Pending(image.status.to_string())),
                }
            }
        })
        .await?;

        tracing::info!("Image '{}' is ready", name);
        Ok(self.location.image_path(&name))
    }

    fn image_request(&self, name: &str, source: &ImageSource, disk_size_gb: i64) -> Result<Image, IaasError> {
        let mut image = Image {
            name: name.to_string(),
            disk_size_gb,
            ..Default::default()
        };
        match source {
            ImageSource::Tarball(tarball) => {
                image.raw_disk = Some(RawDisk {
                    source: tarball_url(tarball),
                });
            }
            ImageSource::Disk(disk) => {
                image.source_disk = Some(self.disk_reference(disk));
            }
            ImageSource::BootDisk => {
                return Err(IaasError::InvalidSpec(
                    "boot disk sources must be resolved to a disk before imaging".to_string(),
                ));
            }
        }
        Ok(image)
    }

    fn disk_reference(&self, disk: &str) -> String {
        if disk.contains('/') {
            disk.to_string()
        } else {
            self.location.disk_path(last_segment(disk))
        }
    }
}

/// Storage URL for a tarball given as `gs://bucket/object`, `bucket/object` or an http(s) URL
pub fn tarball_url(tarball: &str) -> String {
    if tarball.starts_with("https://") || tarball.starts_with("http://") {
        return tarball.to_string();
    }
    let path = tarball.strip_prefix("gs://").unwrap_or(tarball);
    format!("{}/{}", STORAGE_BASE_URL, path.trim_start_matches('/'))
}

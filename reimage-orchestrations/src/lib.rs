//! Reimage Orchestrations - replace a cloud instance in place with a fresh image
//!
//! The replace run locates one instance, stops it, builds an image, clones the
//! instance onto that image under a new name and waits for the clone to run.
//! Orchestrations only see [`InstanceControl`]; [`GcpClient`] implements it
//! over any [`ComputeApi`] transport such as [`gcp_client::GcpComputeApi`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use reimage_orchestrations::gcp_client::{GcpComputeApi, GcpCredentials, DEFAULT_COMPUTE_ENDPOINT};
//! use reimage_orchestrations::{replace_instance_orchestration, GcpClient, ImageSource, ReplaceInstanceInput};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = GcpComputeApi::new(GcpCredentials {
//!     access_token: "ya29...".to_string(),
//!     endpoint: DEFAULT_COMPUTE_ENDPOINT.to_string(),
//! })?;
//! let client = GcpClient::builder()
//!     .compute_api(Arc::new(api))
//!     .project("my-project")
//!     .zone("us-central1-a")
//!     .build()?;
//!
//! let output = replace_instance_orchestration(
//!     &client,
//!     ReplaceInstanceInput {
//!         identifier: "vm-a".to_string(),
//!         source: ImageSource::Tarball("bucket/img.tar.gz".to_string()),
//!         disk_size_gb: 50,
//!         tag_pattern: None,
//!         external_address: None,
//!     },
//! )
//! .await?;
//! println!("{} replaced by {}", output.original_instance, output.new_instance);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod gcp_client;
pub mod names;
pub mod polling;
pub mod provider;
pub mod types;

mod activities;
mod orchestrations;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{GcpClient, GcpClientBuilder, InstanceControl};
pub use error::{IaasError, StepError};
pub use orchestrations::flows;
pub use orchestrations::{delete_instance_orchestration, get_disk_orchestration, replace_instance_orchestration};
pub use polling::WaitConfig;
pub use provider::ComputeApi;
pub use types::*;

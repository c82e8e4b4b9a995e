//! Raw provider transport

use async_trait::async_trait;
use reimage_models::{Disk, Image, Instance, Location, Operation};

use crate::error::IaasError;

/// Primitive calls against a compute provider.
///
/// Implementations only move requests and responses; filtering, polling and
/// operation-error inspection live above this trait.
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// All instances in the zone, every page
    async fn list_instances(&self, location: &Location) -> Result<Vec<Instance>, IaasError>;

    /// All disks in the zone, every page
    async fn list_disks(&self, location: &Location) -> Result<Vec<Disk>, IaasError>;

    async fn get_instance(&self, location: &Location, name: &str) -> Result<Instance, IaasError>;

    async fn insert_instance(
        &self,
        location: &Location,
        instance: &Instance,
    ) -> Result<Operation, IaasError>;

    async fn delete_instance(&self, location: &Location, name: &str) -> Result<Operation, IaasError>;

    async fn stop_instance(&self, location: &Location, name: &str) -> Result<Operation, IaasError>;

    async fn delete_access_config(
        &self,
        location: &Location,
        instance: &str,
        access_config: &str,
        network_interface: &str,
    ) -> Result<Operation, IaasError>;

    /// Images are global, only `location.project` is used
    async fn insert_image(&self, location: &Location, image: &Image) -> Result<Operation, IaasError>;

    async fn get_image(&self, location: &Location, name: &str) -> Result<Image, IaasError>;
}

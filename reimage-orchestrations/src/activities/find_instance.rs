//! Instance directory: fresh provider listings filtered down to exactly one resource

use std::sync::Arc;

use reimage_models::{Disk, Filter, Instance, Location};

use crate::error::IaasError;
use crate::provider::ComputeApi;

#[derive(Clone)]
pub struct InstanceDirectory {
    api: Arc<dyn ComputeApi>,
    location: Location,
}

impl InstanceDirectory {
    pub fn new(api: Arc<dyn ComputeApi>, location: Location) -> Self {
        Self { api, location }
    }

    /// The single instance matching `filter`, from a fresh provider listing
    pub async fn find(&self, filter: &Filter) -> Result<Instance, IaasError> {
        let matcher = filter.compile()?;
        let instances = self.api.list_instances(&self.location).await?;

        let matches: Vec<Instance> = instances
            .into_iter()
            .filter(|instance| matcher.matches_instance(instance))
            .collect();

        single("instance", filter, matches, |instance| &instance.name)
    }

    /// The single disk whose name matches `filter`
    pub async fn find_disk(&self, filter: &Filter) -> Result<Disk, IaasError> {
        let matcher = filter.compile()?;
        let disks = self.api.list_disks(&self.location).await?;

        let matches: Vec<Disk> = disks
            .into_iter()
            .filter(|disk| matcher.matches_disk(disk))
            .collect();

        single("disk", filter, matches, |disk| &disk.name)
    }
}

fn single<T>(
    resource: &'static str,
    filter: &Filter,
    mut matches: Vec<T>,
    name: impl Fn(&T) -> &str,
) -> Result<T, IaasError> {
    match matches.len() {
        0 => Err(IaasError::NotFound {
            resource,
            filter: describe(filter),
        }),
        1 => Ok(matches.remove(0)),
        count => Err(IaasError::AmbiguousMatch {
            resource,
            filter: describe(filter),
            count,
            names: matches.iter().map(|item| name(item).to_string()).collect(),
        }),
    }
}

fn describe(filter: &Filter) -> String {
    match &filter.tag_pattern {
        Some(tags) => format!("name ~ {}, tags ~ {}", filter.name_pattern, tags),
        None => format!("name ~ {}", filter.name_pattern),
    }
}

//! Instance lifecycle control: create, stop and delete
//!
//! Every call inspects the returned operation, so a submission that succeeds
//! at the transport layer but carries an embedded error is still a failure.

use reimage_models::{Instance, Location};

use crate::activities::check_operation;
use crate::error::IaasError;
use crate::provider::ComputeApi;
use crate::types::StopReport;

pub async fn create_instance(
    api: &dyn ComputeApi,
    location: &Location,
    spec: &Instance,
) -> Result<(), IaasError> {
    tracing::info!("Creating instance '{}'", spec.name);
    let operation = api.insert_instance(location, spec).await?;
    check_operation(&operation, &format!("insert instance {}", spec.name))
}

pub async fn delete_instance(api: &dyn ComputeApi, location: &Location, name: &str) -> Result<(), IaasError> {
    tracing::info!("Deleting instance '{}'", name);
    let operation = api.delete_instance(location, name).await?;
    check_operation(&operation, &format!("delete instance {}", name))
}

/// Detach the external access config (best-effort), then stop the instance.
///
/// A detach failure is reported in the returned [`StopReport`]; the stop is
/// attempted regardless and only its own failure is an error.
pub async fn stop_instance(
    api: &dyn ComputeApi,
    location: &Location,
    name: &str,
) -> Result<StopReport, IaasError> {
    let report = match detach_access_config(api, location, name).await {
        Ok(detached) => StopReport {
            access_config_detached: detached,
            detach_error: None,
        },
        Err(e) => {
            tracing::warn!("Could not detach access config from '{}': {}", name, e);
            StopReport {
                access_config_detached: false,
                detach_error: Some(e.to_string()),
            }
        }
    };

    tracing::info!("Stopping instance '{}'", name);
    let operation = api.stop_instance(location, name).await?;
    check_operation(&operation, &format!("stop instance {}", name))?;

    Ok(report)
}

/// Some providers keep the external address while the instance stays associated with it
async fn detach_access_config(api: &dyn ComputeApi, location: &Location, name: &str) -> Result<bool, IaasError> {
    let instance = api.get_instance(location, name).await?;

    let Some(nic) = instance.network_interfaces.first() else {
        return Ok(false);
    };
    let Some(access_config) = nic.access_configs.first() else {
        return Ok(false);
    };

    let access_config_name = access_config.name.as_deref().unwrap_or("External NAT");
    let nic_name = nic.name.as_deref().unwrap_or("nic0");

    tracing::info!(
        "Detaching access config '{}' from '{}' on instance '{}'",
        access_config_name,
        nic_name,
        name
    );
    let operation = api
        .delete_access_config(location, name, access_config_name, nic_name)
        .await?;
    check_operation(&operation, &format!("delete access config on {}", name))?;

    Ok(true)
}

//! Replace instance orchestration

use std::time::Instant;

use chrono::Utc;
use reimage_models::{last_segment, AccessConfig, AttachedDisk, Filter, Instance, InstanceStatus, Tags};
use tracing::Instrument;
use uuid::Uuid;

use crate::client::InstanceControl;
use crate::error::{IaasError, StepContext, StepError};
use crate::names::successor_name;
use crate::types::{ImageSource, ReplaceInstanceInput, ReplaceInstanceOutput, Step};

/// State threaded through one replacement run; never persisted
#[derive(Debug, Clone)]
struct ReplacementPlan {
    original: Instance,
    image: String,
    new_name: String,
}

/// Stop the instance matching `input.identifier` and bring up a clone booted from a fresh image.
///
/// The first failing step aborts the run. The original instance is left
/// stopped: deciding whether to restart it is up to the operator.
pub async fn replace_instance_orchestration(
    control: &dyn InstanceControl,
    input: ReplaceInstanceInput,
) -> Result<ReplaceInstanceOutput, StepError> {
    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("replace_instance", %run_id, identifier = %input.identifier);

    async move {
        tracing::info!("Replacing instance '{}' using {}", input.identifier, input.source);
        let result = replace_instance_impl(control, &input, run_id).await;
        match &result {
            Ok(output) => tracing::info!(
                "Replaced '{}' with '{}' in {} seconds",
                output.original_instance,
                output.new_instance,
                output.elapsed_seconds
            ),
            Err(e) => tracing::error!("Replacement aborted: {}", e),
        }
        result
    }
    .instrument(span)
    .await
}

async fn replace_instance_impl(
    control: &dyn InstanceControl,
    input: &ReplaceInstanceInput,
    run_id: Uuid,
) -> Result<ReplaceInstanceOutput, StepError> {
    let started = Instant::now();

    validate(input).at(Step::Validate)?;

    // Step 1: Locate
    let mut filter = Filter::name_prefix(&input.identifier);
    if let Some(tags) = &input.tag_pattern {
        filter = filter.with_tag_pattern(tags.clone());
    }
    tracing::info!("Step 1: Locating running instance (name ~ {})", filter.name_pattern);
    let original = control.find(&filter).await.at(Step::Locate)?;

    // Step 2: Stop
    tracing::info!("Step 2: Stopping instance '{}'", original.name);
    let stop = control.stop(&original.name).await.at(Step::Stop)?;
    if let Some(detach_error) = &stop.detach_error {
        tracing::warn!("External access config was not detached: {}", detach_error);
    }

    // Step 3: ConfirmStopped
    tracing::info!("Step 3: Waiting for '{}' to terminate", original.name);
    control
        .wait_for_status(&original.name, InstanceStatus::Terminated)
        .await
        .at(Step::ConfirmStopped)?;

    // Step 4: Snapshot
    let source = resolve_source(control, &input.source, &original).at(Step::Snapshot)?;
    tracing::info!(
        "Step 4: Creating image from {} with disk size {}GB",
        source,
        input.disk_size_gb
    );
    let image = control
        .create_image(&source, input.disk_size_gb)
        .await
        .at(Step::Snapshot)?;

    let plan = ReplacementPlan {
        original,
        image,
        new_name: successor_name(&input.identifier, Utc::now()),
    };

    // Step 5: Clone
    tracing::info!(
        "Step 5: Cloning '{}' as '{}' on image '{}'",
        plan.original.name,
        plan.new_name,
        plan.image
    );
    let spec = clone_spec(&plan, input.disk_size_gb, input.external_address.as_deref()).at(Step::Clone)?;

    // Step 6: Create
    tracing::info!("Step 6: Creating instance '{}'", spec.name);
    control.create(&spec).await.at(Step::Create)?;

    // Step 7: ConfirmRunning
    tracing::info!("Step 7: Waiting for '{}' to start", spec.name);
    control
        .wait_for_status(&spec.name, InstanceStatus::Running)
        .await
        .at(Step::ConfirmRunning)?;

    Ok(ReplaceInstanceOutput {
        run_id: run_id.to_string(),
        original_instance: plan.original.name,
        new_instance: plan.new_name,
        image: plan.image,
        disk_size_gb: input.disk_size_gb,
        stop,
        elapsed_seconds: started.elapsed().as_secs(),
    })
}

fn validate(input: &ReplaceInstanceInput) -> Result<(), IaasError> {
    if input.identifier.trim().is_empty() {
        return Err(IaasError::InvalidSpec("identifier must not be empty".to_string()));
    }
    if input.disk_size_gb <= 0 {
        return Err(IaasError::InvalidSpec(format!(
            "disk size must be positive, got {}GB",
            input.disk_size_gb
        )));
    }
    Ok(())
}

/// Turn a boot-disk source into a concrete disk reference
fn resolve_source(
    control: &dyn InstanceControl,
    source: &ImageSource,
    original: &Instance,
) -> Result<ImageSource, IaasError> {
    match source {
        ImageSource::BootDisk => {
            let link = original
                .boot_disk()
                .and_then(|disk| disk.source.as_deref())
                .ok_or_else(|| {
                    IaasError::InvalidSpec(format!("instance {} has no boot disk", original.name))
                })?;
            Ok(ImageSource::Disk(control.disk_reference(last_segment(link))))
        }
        other => Ok(other.clone()),
    }
}

/// Successor spec: the original's network interfaces, machine type and tags on a fresh boot disk
fn clone_spec(
    plan: &ReplacementPlan,
    disk_size_gb: i64,
    external_address: Option<&str>,
) -> Result<Instance, IaasError> {
    let original = &plan.original;
    if original.network_interfaces.is_empty() {
        return Err(IaasError::InvalidSpec(format!(
            "instance {} has no network interfaces to inherit",
            original.name
        )));
    }

    let mut network_interfaces = original.network_interfaces.clone();
    for nic in &mut network_interfaces {
        nic.network_ip = None;
    }

    if let Some(address) = external_address {
        let nic = &mut network_interfaces[0];
        match nic.access_configs.first_mut() {
            Some(config) => config.nat_ip = Some(address.to_string()),
            None => nic.access_configs.push(AccessConfig::external_nat(address)),
        }
    }

    Ok(Instance {
        name: plan.new_name.clone(),
        machine_type: original.machine_type.clone(),
        tags: Tags::new(original.tags.items.iter().cloned()),
        network_interfaces,
        disks: vec![AttachedDisk::boot_from_image(plan.image.clone(), disk_size_gb)],
        ..Default::default()
    })
}

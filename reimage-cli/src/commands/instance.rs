use std::sync::Arc;

use anyhow::{Context, Result};
use reimage_models::{last_segment, Filter, Instance};
use reimage_orchestrations::gcp_client::{GcpComputeApi, GcpCredentials};
use reimage_orchestrations::types::*;
use reimage_orchestrations::{
    delete_instance_orchestration, get_disk_orchestration, replace_instance_orchestration, GcpClient,
    InstanceControl,
};
use serde::Serialize;

use crate::config::Config;

fn build_client(config: &Config) -> Result<GcpClient> {
    let api = GcpComputeApi::new(GcpCredentials {
        access_token: config.access_token.clone(),
        endpoint: config.compute_endpoint.clone(),
    })?;

    let client = GcpClient::builder()
        .compute_api(Arc::new(api))
        .project(&config.project)
        .zone(&config.zone)
        .timeout(config.timeout)
        .poll_interval(config.poll_interval)
        .image_prefix(&config.image_prefix)
        .build()
        .context("Failed to create compute client")?;

    tracing::debug!("Using {:?}", config);
    Ok(client)
}

/// Exactly one of the source flags is set (enforced by clap)
pub fn image_source(tarball: Option<String>, disk: Option<String>, from_boot_disk: bool) -> Result<ImageSource> {
    match (tarball, disk, from_boot_disk) {
        (Some(tarball), None, false) => Ok(ImageSource::Tarball(tarball)),
        (None, Some(disk), false) => Ok(ImageSource::Disk(disk)),
        (None, None, true) => Ok(ImageSource::BootDisk),
        _ => anyhow::bail!("Specify exactly one of --tarball, --disk or --from-boot-disk"),
    }
}

pub async fn run_replace(
    identifier: String,
    source: ImageSource,
    disk_size_gb: i64,
    tag_pattern: Option<String>,
    external_address: Option<String>,
    output: String,
) -> Result<()> {
    let config = Config::load()?;
    let client = build_client(&config)?;

    let input = ReplaceInstanceInput {
        identifier,
        source,
        disk_size_gb,
        tag_pattern,
        external_address,
    };
    let result = replace_instance_orchestration(&client, input).await?;

    if output == "json" {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("✓ Instance replaced");
        println!();
        println!("  Original (stopped): {}", result.original_instance);
        println!("  New instance:       {}", result.new_instance);
        println!("  Image:              {}", result.image);
        println!("  Disk size:          {} GB", result.disk_size_gb);
        println!("  Address detached:   {}", result.stop.access_config_detached);
        if let Some(detach_error) = &result.stop.detach_error {
            println!("  Detach warning:     {}", detach_error);
        }
        println!("  Duration:           {}s", result.elapsed_seconds);
        println!("  Run ID:             {}", result.run_id);
    }

    Ok(())
}

pub async fn run_delete(identifier: String) -> Result<()> {
    let config = Config::load()?;
    let client = build_client(&config)?;

    let result = delete_instance_orchestration(&client, DeleteInstanceInput { name: identifier }).await?;

    if result.deleted {
        println!("✓ Instance '{}' deleted", result.instance_name);
    } else {
        println!("Instance '{}' not found, nothing to delete", result.instance_name);
    }
    Ok(())
}

pub async fn run_disk(identifier: String, output: String) -> Result<()> {
    let config = Config::load()?;
    let client = build_client(&config)?;

    let disk = get_disk_orchestration(&client, GetDiskInput { identifier }).await?;

    if output == "json" {
        println!("{}", serde_json::to_string_pretty(&disk)?);
    } else {
        println!("{:<40} {:<10} {:<10} {}", "NAME", "SIZE", "STATUS", "ATTACHED TO");
        println!("{}", "-".repeat(80));
        println!(
            "{:<40} {:<10} {:<10} {}",
            disk.name,
            format!("{}GB", disk.size_gb),
            disk.status.as_deref().unwrap_or("-"),
            disk.owner.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

#[derive(Debug, Serialize, PartialEq)]
struct InstanceSummary {
    name: String,
    status: String,
    machine_type: String,
    tags: Vec<String>,
    internal_ip: Option<String>,
    external_ip: Option<String>,
    boot_disk: Option<String>,
}

impl From<&Instance> for InstanceSummary {
    fn from(instance: &Instance) -> Self {
        let nic = instance.network_interfaces.first();
        Self {
            name: instance.name.clone(),
            status: instance.status.to_string(),
            machine_type: last_segment(&instance.machine_type).to_string(),
            tags: instance.tags.items.clone(),
            internal_ip: nic.and_then(|nic| nic.network_ip.clone()),
            external_ip: nic
                .and_then(|nic| nic.access_configs.first())
                .and_then(|access_config| access_config.nat_ip.clone()),
            boot_disk: instance
                .boot_disk()
                .and_then(|disk| disk.source.as_deref())
                .map(|source| last_segment(source).to_string()),
        }
    }
}

pub async fn run_find(identifier: String, tag_pattern: Option<String>, output: String) -> Result<()> {
    let config = Config::load()?;
    let client = build_client(&config)?;

    let mut filter = Filter::name_prefix(&identifier);
    if let Some(tags) = tag_pattern {
        filter = filter.with_tag_pattern(tags);
    }
    let instance = client.find(&filter).await?;
    let summary = InstanceSummary::from(&instance);

    if output == "json" {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Instance: {}", summary.name);
        println!("{}", "=".repeat(60));
        println!("  Status:        {}", summary.status);
        println!("  Machine type:  {}", summary.machine_type);
        println!("  Tags:          {}", summary.tags.join(", "));
        println!("  Internal IP:   {}", summary.internal_ip.as_deref().unwrap_or("-"));
        println!("  External IP:   {}", summary.external_ip.as_deref().unwrap_or("-"));
        println!("  Boot disk:     {}", summary.boot_disk.as_deref().unwrap_or("-"));
    }
    Ok(())
}

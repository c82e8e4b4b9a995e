//! Data model shared by the reimage crates
//!
//! Field names follow the Compute Engine REST representation (camelCase,
//! int64 values encoded as strings) so provider responses deserialize
//! directly into these types.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod filter;

pub use filter::{CompiledFilter, Filter, StatusFilter};

/// Lifecycle status of an instance
///
/// Transitions are monotonic along Provisioning -> Running -> Stopping -> Terminated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstanceStatus {
    Provisioning,
    Running,
    Stopping,
    Terminated,
    #[default]
    Unknown,
}

impl InstanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceStatus::Provisioning => "PROVISIONING",
            InstanceStatus::Running => "RUNNING",
            InstanceStatus::Stopping => "STOPPING",
            InstanceStatus::Terminated => "TERMINATED",
            InstanceStatus::Unknown => "UNKNOWN",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, InstanceStatus::Unknown)
    }

    /// Position along the lifecycle, `None` for Unknown
    pub fn progress(&self) -> Option<u8> {
        match self {
            InstanceStatus::Provisioning => Some(0),
            InstanceStatus::Running => Some(1),
            InstanceStatus::Stopping => Some(2),
            InstanceStatus::Terminated => Some(3),
            InstanceStatus::Unknown => None,
        }
    }

    /// True when `self` is already beyond `desired`, so `desired` can no longer be reached
    pub fn is_past(&self, desired: InstanceStatus) -> bool {
        match (self.progress(), desired.progress()) {
            (Some(current), Some(wanted)) => current > wanted,
            _ => false,
        }
    }
}

impl From<String> for InstanceStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "PROVISIONING" | "STAGING" => InstanceStatus::Provisioning,
            "RUNNING" => InstanceStatus::Running,
            "STOPPING" | "SUSPENDING" => InstanceStatus::Stopping,
            "TERMINATED" | "STOPPED" => InstanceStatus::Terminated,
            _ => InstanceStatus::Unknown,
        }
    }
}

impl From<InstanceStatus> for String {
    fn from(value: InstanceStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a disk image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImageStatus {
    #[default]
    Pending,
    Ready,
    Failed,
}

impl ImageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageStatus::Pending => "PENDING",
            ImageStatus::Ready => "READY",
            ImageStatus::Failed => "FAILED",
        }
    }
}

impl From<String> for ImageStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "READY" => ImageStatus::Ready,
            "FAILED" => ImageStatus::Failed,
            _ => ImageStatus::Pending,
        }
    }
}

impl From<ImageStatus> for String {
    fn from(value: ImageStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project and zone every provider call is addressed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub project: String,
    pub zone: String,
}

impl Location {
    pub fn new(project: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            zone: zone.into(),
        }
    }

    /// Fully-qualified identifier of a global image in this project
    pub fn image_path(&self, image_name: &str) -> String {
        format!("projects/{}/global/images/{}", self.project, image_name)
    }

    /// Fully-qualified identifier of a zonal disk
    pub fn disk_path(&self, disk_name: &str) -> String {
        format!("projects/{}/zones/{}/disks/{}", self.project, self.zone, disk_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tags {
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl Tags {
    pub fn new(items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            fingerprint: None,
        }
    }

    /// Tag set joined with single spaces, the string tag patterns match against
    pub fn joined(&self) -> String {
        self.items.join(" ")
    }
}

/// External (NAT) address binding on a network interface
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "natIP", default, skip_serializing_if = "Option::is_none")]
    pub nat_ip: Option<String>,
}

impl AccessConfig {
    /// One-to-one NAT binding for the given external address
    pub fn external_nat(address: impl Into<String>) -> Self {
        Self {
            name: Some("External NAT".to_string()),
            kind: Some("ONE_TO_ONE_NAT".to_string()),
            nat_ip: Some(address.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnetwork: Option<String>,
    /// Private address; cleared on clones so the provider assigns a fresh one
    #[serde(rename = "networkIP", default, skip_serializing_if = "Option::is_none")]
    pub network_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub access_configs: Vec<AccessConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedDiskInitializeParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_image: Option<String>,
    #[serde(default, with = "int64_string")]
    pub disk_size_gb: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedDisk {
    #[serde(default)]
    pub boot: bool,
    #[serde(default)]
    pub auto_delete: bool,
    /// Link to the backing disk resource (set by the provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initialize_params: Option<AttachedDiskInitializeParams>,
}

impl AttachedDisk {
    /// Boot disk created from `source_image` at the given size
    pub fn boot_from_image(source_image: impl Into<String>, disk_size_gb: i64) -> Self {
        Self {
            boot: true,
            auto_delete: true,
            source: None,
            device_name: None,
            initialize_params: Some(AttachedDiskInitializeParams {
                source_image: Some(source_image.into()),
                disk_size_gb,
            }),
        }
    }
}

/// A provider virtual machine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub machine_type: String,
    #[serde(default, skip_serializing_if = "InstanceStatus::is_unknown")]
    pub status: InstanceStatus,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterface>,
    #[serde(default)]
    pub disks: Vec<AttachedDisk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

impl Instance {
    pub fn boot_disk(&self) -> Option<&AttachedDisk> {
        self.disks.iter().find(|disk| disk.boot)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disk {
    pub name: String,
    #[serde(default, with = "int64_string")]
    pub size_gb: i64,
    /// Links to the instances this disk is attached to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

impl Disk {
    /// Name of the first instance using this disk
    pub fn owner(&self) -> Option<&str> {
        self.users.first().map(|link| last_segment(link))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDisk {
    pub source: String,
}

/// A bootable disk image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub name: String,
    #[serde(default, skip_serializing)]
    pub status: ImageStatus,
    #[serde(default, with = "int64_string")]
    pub disk_size_gb: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_disk: Option<RawDisk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_disk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationErrorItem {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub errors: Vec<OperationErrorItem>,
}

/// Provider operation returned by every mutating call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
}

impl Operation {
    /// Embedded failure carried by an operation whose submission itself succeeded
    pub fn failure(&self) -> Option<String> {
        let error = self.error.as_ref()?;
        if error.errors.is_empty() {
            return Some("operation reported an unspecified error".to_string());
        }
        Some(
            error
                .errors
                .iter()
                .map(|item| format!("{}: {}", item.code, item.message))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// One page of a provider list call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Last path segment of a resource link
pub fn last_segment(link: &str) -> &str {
    link.rsplit('/').next().unwrap_or(link)
}

mod int64_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text.parse().map_err(de::Error::custom),
            Raw::Number(number) => Ok(number),
        }
    }
}

//! Input and output types for reimage orchestrations

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Steps
// ============================================================================

/// Orchestration steps, used to tag errors and log progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    Validate,
    Locate,
    Stop,
    ConfirmStopped,
    Snapshot,
    Clone,
    Create,
    ConfirmRunning,
    Delete,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Validate => "validate",
            Step::Locate => "locate",
            Step::Stop => "stop",
            Step::ConfirmStopped => "confirm-stopped",
            Step::Snapshot => "snapshot",
            Step::Clone => "clone",
            Step::Create => "create",
            Step::ConfirmRunning => "confirm-running",
            Step::Delete => "delete",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Image Source
// ============================================================================

/// Where the replacement image comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ImageSource {
    /// Tarball in object storage (`gs://bucket/object`, `bucket/object` or an http(s) URL)
    Tarball(String),
    /// An existing disk, by name or link
    Disk(String),
    /// The boot disk of the instance being replaced
    BootDisk,
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Tarball(url) => write!(f, "tarball {}", url),
            ImageSource::Disk(disk) => write!(f, "disk {}", disk),
            ImageSource::BootDisk => f.write_str("boot disk"),
        }
    }
}

// ============================================================================
// Stop Instance
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StopReport {
    /// Whether an external access config was removed before stopping
    pub access_config_detached: bool,
    /// Best-effort detach failure, if any (the stop was still issued)
    pub detach_error: Option<String>,
}

// ============================================================================
// Replace Instance Orchestration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReplaceInstanceInput {
    /// Name (prefix) of the instance to replace
    pub identifier: String,
    /// Image source for the successor's boot disk
    pub source: ImageSource,
    /// Boot disk size of the successor in GB
    pub disk_size_gb: i64,
    /// Optional regex over the joined tag set
    #[serde(default)]
    pub tag_pattern: Option<String>,
    /// External address to bind to the successor's first network interface
    #[serde(default)]
    pub external_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReplaceInstanceOutput {
    /// Identifier of this replacement run
    pub run_id: String,
    /// Instance that was stopped
    pub original_instance: String,
    /// Successor instance name
    pub new_instance: String,
    /// Fully-qualified image the successor boots from
    pub image: String,
    /// Boot disk size in GB
    pub disk_size_gb: i64,
    /// Outcome of the stop step's access config detach
    pub stop: StopReport,
    /// Wall-clock duration of the run (seconds)
    pub elapsed_seconds: u64,
}

// ============================================================================
// Delete Instance Orchestration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteInstanceInput {
    /// Instance name
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteInstanceOutput {
    /// Instance name
    pub instance_name: String,
    pub deleted: bool,
}

// ============================================================================
// Get Disk Orchestration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GetDiskInput {
    /// Name (prefix) of the disk
    pub identifier: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GetDiskOutput {
    pub name: String,
    pub size_gb: i64,
    /// Instance the disk is attached to
    pub owner: Option<String>,
    /// Provider disk status (READY, CREATING, ...)
    pub status: Option<String>,
}

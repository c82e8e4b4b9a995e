//! Name constants and naming policy
//!
//! Orchestration names follow the convention: {crate-name}::{type}::{name}

use chrono::{DateTime, Utc};

/// Orchestration names
pub mod orchestrations {
    /// Replace an instance with a clone booted from a fresh image
    ///
    /// **Input:** [`crate::types::ReplaceInstanceInput`]
    /// **Output:** [`crate::types::ReplaceInstanceOutput`]
    /// **Steps:** locate, stop, confirm-stopped, snapshot, clone, create, confirm-running
    /// **Note:** the original instance is left stopped on success and on failure
    pub const REPLACE_INSTANCE: &str = "reimage-orchestrations::orchestration::replace-instance";

    /// Delete an instance by name
    ///
    /// **Input:** [`crate::types::DeleteInstanceInput`]
    /// **Output:** [`crate::types::DeleteInstanceOutput`]
    pub const DELETE_INSTANCE: &str = "reimage-orchestrations::orchestration::delete-instance";

    /// Describe the disk matching an identifier
    ///
    /// **Input:** [`crate::types::GetDiskInput`]
    /// **Output:** [`crate::types::GetDiskOutput`]
    pub const GET_DISK: &str = "reimage-orchestrations::orchestration::get-disk";
}

/// Prefix for generated image names
pub const DEFAULT_IMAGE_PREFIX: &str = "opsman-disk";

/// Second-resolution timestamp used to make generated names unique across runs
pub fn timestamp_suffix(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d-%H-%M-%S").to_string()
}

/// Name of the instance replacing `identifier`
pub fn successor_name(identifier: &str, now: DateTime<Utc>) -> String {
    format!("{}-{}", identifier, timestamp_suffix(now))
}

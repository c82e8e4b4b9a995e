//! Name/tag/status filters used to select exactly one instance or disk

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Disk, Instance, InstanceStatus};

/// Status constraint applied after the name and tag patterns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// Normal lookups only consider running instances
    #[default]
    Running,
    /// Post-stop polling needs to see the instance whatever its status
    Any,
}

impl StatusFilter {
    pub fn admits(&self, status: InstanceStatus) -> bool {
        match self {
            StatusFilter::Running => status == InstanceStatus::Running,
            StatusFilter::Any => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Regex matched against the resource name
    pub name_pattern: String,
    /// Regex matched against the space-joined tag set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_pattern: Option<String>,
    #[serde(default)]
    pub status: StatusFilter,
}

impl Filter {
    /// Names starting with `prefix`, so `vm-a` also finds its `vm-a-<timestamp>` successors
    pub fn name_prefix(prefix: &str) -> Self {
        Self {
            name_pattern: format!("^{}", regex::escape(prefix)),
            ..Default::default()
        }
    }

    /// Exactly the resource called `name`
    pub fn exact(name: &str) -> Self {
        Self {
            name_pattern: format!("^{}$", regex::escape(name)),
            ..Default::default()
        }
    }

    pub fn with_tag_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.tag_pattern = Some(pattern.into());
        self
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn any_status(self) -> Self {
        self.with_status(StatusFilter::Any)
    }

    pub fn compile(&self) -> Result<CompiledFilter, regex::Error> {
        Ok(CompiledFilter {
            name: Regex::new(&self.name_pattern)?,
            tag: self.tag_pattern.as_deref().map(Regex::new).transpose()?,
            status: self.status,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CompiledFilter {
    name: Regex,
    tag: Option<Regex>,
    status: StatusFilter,
}

impl CompiledFilter {
    /// Tags first, then name, then status
    pub fn matches_instance(&self, instance: &Instance) -> bool {
        let tag_match = self
            .tag
            .as_ref()
            .map_or(true, |tag| tag.is_match(&instance.tags.joined()));
        tag_match && self.name.is_match(&instance.name) && self.status.admits(instance.status)
    }

    /// Disks carry no tags or lifecycle status, only the name pattern applies
    pub fn matches_disk(&self, disk: &Disk) -> bool {
        self.name.is_match(&disk.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tags;

    fn instance(name: &str, tags: &[&str], status: InstanceStatus) -> Instance {
        Instance {
            name: name.to_string(),
            status,
            tags: Tags::new(tags.iter().copied()),
            ..Default::default()
        }
    }

    #[test]
    fn test_name_prefix_matches_successors_but_not_lookalikes() {
        let filter = Filter::name_prefix("vm-a").compile().unwrap();
        assert!(filter.matches_instance(&instance("vm-a", &[], InstanceStatus::Running)));
        assert!(filter.matches_instance(&instance("vm-a-2026-10-16-10-00-00", &[], InstanceStatus::Running)));
        assert!(!filter.matches_instance(&instance("old-vm-a", &[], InstanceStatus::Running)));
    }

    #[test]
    fn test_prefix_is_escaped() {
        let filter = Filter::name_prefix("vm.a").compile().unwrap();
        assert!(!filter.matches_instance(&instance("vmxa", &[], InstanceStatus::Running)));
    }

    #[test]
    fn test_exact_rejects_longer_names() {
        let filter = Filter::exact("vm-a").any_status().compile().unwrap();
        assert!(filter.matches_instance(&instance("vm-a", &[], InstanceStatus::Terminated)));
        assert!(!filter.matches_instance(&instance("vm-a-1", &[], InstanceStatus::Terminated)));
    }

    #[test]
    fn test_default_status_is_running_only() {
        let filter = Filter::name_prefix("vm").compile().unwrap();
        assert!(!filter.matches_instance(&instance("vm", &[], InstanceStatus::Terminated)));
        assert!(!filter.matches_instance(&instance("vm", &[], InstanceStatus::Provisioning)));
    }

    #[test]
    fn test_tag_pattern_matches_joined_tags() {
        let filter = Filter::name_prefix("vm")
            .with_tag_pattern("prod web")
            .compile()
            .unwrap();
        assert!(filter.matches_instance(&instance("vm", &["prod", "web"], InstanceStatus::Running)));
        assert!(!filter.matches_instance(&instance("vm", &["web", "prod"], InstanceStatus::Running)));
    }

    #[test]
    fn test_invalid_pattern_fails_to_compile() {
        let filter = Filter {
            name_pattern: "vm-(".to_string(),
            ..Default::default()
        };
        assert!(filter.compile().is_err());
    }
}

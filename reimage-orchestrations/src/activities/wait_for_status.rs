//! Status waiter: bounded polling until an instance reports a lifecycle status

use reimage_models::{Filter, InstanceStatus};

use crate::activities::find_instance::InstanceDirectory;
use crate::error::IaasError;
use crate::polling::{poll_until, Probe, WaitConfig};

/// Wait until the instance called `name` reports `desired`.
///
/// Each poll re-resolves the instance by exact name with any status. A lookup
/// failure (including the instance disappearing) ends the wait with that error.
pub async fn wait_for_status(
    directory: &InstanceDirectory,
    name: &str,
    desired: InstanceStatus,
    config: WaitConfig,
) -> Result<(), IaasError> {
    tracing::info!("Waiting up to {:?} for instance '{}' to become {}", config.timeout, name, desired);

    let directory = directory.clone();
    let filter = Filter::exact(name).any_status();
    let instance_name = name.to_string();

    poll_until(
        format!("instance {} to become {}", name, desired),
        config,
        move || {
            let directory = directory.clone();
            let filter = filter.clone();
            let name = instance_name.clone();
            async move {
                let instance = directory.find(&filter).await?;
                if instance.status == desired {
                    return Ok(Probe::Done(()));
                }
                if instance.status.is_past(desired) {
                    return Err(IaasError::UnreachableStatus {
                        name,
                        observed: instance.status,
                        desired,
                    });
                }
                Ok(Probe::Pending(instance.status.to_string()))
            }
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{location, running_instance, Call, FakeComputeApi};
    use std::sync::Arc;
    use std::time::Duration;

    fn fast() -> WaitConfig {
        WaitConfig::new(Duration::from_secs(2), Duration::from_millis(5))
    }

    fn setup(api: FakeComputeApi) -> (Arc<FakeComputeApi>, InstanceDirectory) {
        let api = Arc::new(api);
        let directory = InstanceDirectory::new(api.clone(), location());
        (api, directory)
    }

    #[tokio::test]
    async fn test_ok_on_third_poll() {
        let (api, directory) = setup(
            FakeComputeApi::new()
                .with_instance(running_instance("vm-a", &[]))
                .script_instance(
                    "vm-a",
                    &[
                        InstanceStatus::Provisioning,
                        InstanceStatus::Provisioning,
                        InstanceStatus::Running,
                    ],
                ),
        );

        wait_for_status(&directory, "vm-a", InstanceStatus::Running, fast())
            .await
            .unwrap();
        assert_eq!(api.count(|call| *call == Call::ListInstances), 3);
    }

    #[tokio::test]
    async fn test_times_out_when_status_never_observed() {
        let (_, directory) = setup(
            FakeComputeApi::new()
                .with_instance(running_instance("vm-a", &[]))
                .script_instance("vm-a", &[InstanceStatus::Provisioning]),
        );

        let config = WaitConfig::new(Duration::from_millis(60), Duration::from_millis(5));
        let err = wait_for_status(&directory, "vm-a", InstanceStatus::Running, config)
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_missing_instance_fails_immediately() {
        let (api, directory) = setup(FakeComputeApi::new());

        let err = wait_for_status(&directory, "vm-a", InstanceStatus::Running, fast())
            .await
            .unwrap_err();
        assert!(matches!(err, IaasError::NotFound { .. }));
        assert_eq!(api.count(|call| *call == Call::ListInstances), 1);
    }

    #[tokio::test]
    async fn test_provider_error_is_not_a_timeout() {
        let (_, directory) = setup(
            FakeComputeApi::new()
                .with_instance(running_instance("vm-a", &[]))
                .fail_transport("list_instances", "permission denied"),
        );

        let err = wait_for_status(&directory, "vm-a", InstanceStatus::Terminated, fast())
            .await
            .unwrap_err();
        assert!(matches!(err, IaasError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_status_already_past_desired_fails_fast() {
        let (_, directory) = setup(
            FakeComputeApi::new()
                .with_instance(running_instance("vm-a", &[]))
                .script_instance("vm-a", &[InstanceStatus::Provisioning, InstanceStatus::Terminated]),
        );

        let err = wait_for_status(&directory, "vm-a", InstanceStatus::Running, fast())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IaasError::UnreachableStatus {
                observed: InstanceStatus::Terminated,
                desired: InstanceStatus::Running,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_exact_name_ignores_successors() {
        let (_, directory) = setup(
            FakeComputeApi::new()
                .with_instance(running_instance("vm-a", &[]))
                .with_instance(running_instance("vm-a-2026-01-01-00-00-00", &[])),
        );

        wait_for_status(&directory, "vm-a", InstanceStatus::Running, fast())
            .await
            .unwrap();
    }
}

//! Delete instance orchestration

use crate::client::InstanceControl;
use crate::error::{IaasError, StepContext, StepError};
use crate::types::{DeleteInstanceInput, DeleteInstanceOutput, Step};

/// Delete the named instance; an instance that is already gone is not an error
pub async fn delete_instance_orchestration(
    control: &dyn InstanceControl,
    input: DeleteInstanceInput,
) -> Result<DeleteInstanceOutput, StepError> {
    tracing::info!("Deleting instance '{}'", input.name);

    let deleted = match control.delete(&input.name).await {
        Ok(()) => true,
        Err(IaasError::NotFound { .. }) => {
            tracing::info!("Instance '{}' not found, nothing to delete", input.name);
            false
        }
        Err(e) => return Err(e).at(Step::Delete),
    };

    Ok(DeleteInstanceOutput {
        instance_name: input.name,
        deleted,
    })
}

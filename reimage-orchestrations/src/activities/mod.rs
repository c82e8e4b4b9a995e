//! Single-purpose provider steps composed by the orchestrations

pub mod create_image;
pub mod find_instance;
pub mod lifecycle;
pub mod wait_for_status;

use reimage_models::Operation;

use crate::error::IaasError;

/// Surface an error embedded in an operation whose submission succeeded
pub fn check_operation(operation: &Operation, what: &str) -> Result<(), IaasError> {
    match operation.failure() {
        Some(message) => Err(IaasError::ProviderOperationFailed {
            operation: what.to_string(),
            message,
        }),
        None => Ok(()),
    }
}

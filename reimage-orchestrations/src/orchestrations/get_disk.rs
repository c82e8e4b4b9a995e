//! Get disk orchestration

use reimage_models::Filter;

use crate::client::InstanceControl;
use crate::error::{StepContext, StepError};
use crate::types::{GetDiskInput, GetDiskOutput, Step};

pub async fn get_disk_orchestration(
    control: &dyn InstanceControl,
    input: GetDiskInput,
) -> Result<GetDiskOutput, StepError> {
    let disk = control
        .find_disk(&Filter::name_prefix(&input.identifier))
        .await
        .at(Step::Locate)?;

    Ok(GetDiskOutput {
        owner: disk.owner().map(str::to_string),
        name: disk.name,
        size_gb: disk.size_gb,
        status: disk.status,
    })
}

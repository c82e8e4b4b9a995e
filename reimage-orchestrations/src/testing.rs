//! In-memory compute provider for tests
//!
//! Statuses are scripted per resource: every list/get pops the next scripted
//! status, and the last one sticks.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use reimage_models::{
    AccessConfig, AttachedDisk, Disk, Image, ImageStatus, Instance, InstanceStatus, Location,
    NetworkInterface, Operation, OperationError, OperationErrorItem, Tags,
};

use crate::error::IaasError;
use crate::provider::ComputeApi;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListInstances,
    ListDisks,
    GetInstance(String),
    InsertInstance(Instance),
    DeleteInstance(String),
    StopInstance(String),
    DeleteAccessConfig {
        instance: String,
        access_config: String,
        network_interface: String,
    },
    InsertImage(Image),
    GetImage(String),
}

#[derive(Default)]
struct State {
    instances: Vec<Instance>,
    disks: Vec<Disk>,
    images: Vec<Image>,
    instance_scripts: HashMap<String, VecDeque<InstanceStatus>>,
    image_scripts: HashMap<String, VecDeque<ImageStatus>>,
    next_image_script: Option<Vec<ImageStatus>>,
    next_instance_script: Option<Vec<InstanceStatus>>,
    stop_scripts: HashMap<String, Vec<InstanceStatus>>,
    transport_errors: HashMap<&'static str, String>,
    operation_errors: HashMap<&'static str, String>,
    calls: Vec<Call>,
}

impl State {
    fn check(&self, call: &'static str) -> Result<(), IaasError> {
        match self.transport_errors.get(call) {
            Some(message) => Err(IaasError::transport(call, message.clone())),
            None => Ok(()),
        }
    }

    fn operation(&self, call: &'static str, target: &str) -> Operation {
        Operation {
            name: format!("operation-{}-{}", call, target),
            status: Some("DONE".to_string()),
            operation_type: Some(call.to_string()),
            target_link: Some(target.to_string()),
            error: self.operation_errors.get(call).map(|message| OperationError {
                errors: vec![OperationErrorItem {
                    code: "FAKE_FAILURE".to_string(),
                    message: message.clone(),
                    location: None,
                }],
            }),
        }
    }

    fn advance_instances(&mut self) {
        for instance in &mut self.instances {
            if let Some(script) = self.instance_scripts.get_mut(&instance.name) {
                if let Some(status) = pop_sticky(script) {
                    instance.status = status;
                }
            }
        }
    }
}

fn pop_sticky<T: Copy>(script: &mut VecDeque<T>) -> Option<T> {
    if script.len() > 1 {
        script.pop_front()
    } else {
        script.front().copied()
    }
}

#[derive(Default)]
pub struct FakeComputeApi {
    state: Mutex<State>,
}

impl FakeComputeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instance(self, instance: Instance) -> Self {
        self.state.lock().unwrap().instances.push(instance);
        self
    }

    pub fn with_disk(self, disk: Disk) -> Self {
        self.state.lock().unwrap().disks.push(disk);
        self
    }

    /// Statuses the named instance reports on successive lookups
    pub fn script_instance(self, name: &str, statuses: &[InstanceStatus]) -> Self {
        self.state
            .lock()
            .unwrap()
            .instance_scripts
            .insert(name.to_string(), statuses.iter().copied().collect());
        self
    }

    /// Statuses the next inserted instance reports (default: Provisioning, Running)
    pub fn script_next_instance(self, statuses: &[InstanceStatus]) -> Self {
        self.state.lock().unwrap().next_instance_script = Some(statuses.to_vec());
        self
    }

    /// Statuses the named instance reports once stopped (default: Stopping, Terminated)
    pub fn script_stop(self, name: &str, statuses: &[InstanceStatus]) -> Self {
        self.state
            .lock()
            .unwrap()
            .stop_scripts
            .insert(name.to_string(), statuses.to_vec());
        self
    }

    /// Statuses the next inserted image reports (default: Pending, Ready)
    pub fn script_next_image(self, statuses: &[ImageStatus]) -> Self {
        self.state.lock().unwrap().next_image_script = Some(statuses.to_vec());
        self
    }

    /// Make `call` fail at the transport layer
    pub fn fail_transport(self, call: &'static str, message: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .transport_errors
            .insert(call, message.to_string());
        self
    }

    /// Make `call` succeed at the transport layer but return an operation carrying an error
    pub fn fail_operation(self, call: &'static str, message: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .operation_errors
            .insert(call, message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.lock().unwrap().calls.iter().filter(|call| pred(call)).count()
    }

    pub fn inserted_instances(&self) -> Vec<Instance> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::InsertInstance(instance) => Some(instance),
                _ => None,
            })
            .collect()
    }

    pub fn inserted_images(&self) -> Vec<Image> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::InsertImage(image) => Some(image),
                _ => None,
            })
            .collect()
    }

    pub fn instance(&self, name: &str) -> Option<Instance> {
        self.state
            .lock()
            .unwrap()
            .instances
            .iter()
            .find(|instance| instance.name == name)
            .cloned()
    }
}

#[async_trait]
impl ComputeApi for FakeComputeApi {
    async fn list_instances(&self, _location: &Location) -> Result<Vec<Instance>, IaasError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListInstances);
        state.check("list_instances")?;
        state.advance_instances();
        Ok(state.instances.clone())
    }

    async fn list_disks(&self, _location: &Location) -> Result<Vec<Disk>, IaasError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListDisks);
        state.check("list_disks")?;
        Ok(state.disks.clone())
    }

    async fn get_instance(&self, _location: &Location, name: &str) -> Result<Instance, IaasError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::GetInstance(name.to_string()));
        state.check("get_instance")?;
        state
            .instances
            .iter()
            .find(|instance| instance.name == name)
            .cloned()
            .ok_or_else(|| IaasError::NotFound {
                resource: "instance",
                filter: name.to_string(),
            })
    }

    async fn insert_instance(
        &self,
        _location: &Location,
        instance: &Instance,
    ) -> Result<Operation, IaasError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::InsertInstance(instance.clone()));
        state.check("insert_instance")?;
        let operation = state.operation("insert_instance", &instance.name);
        if operation.error.is_none() {
            let script = state
                .next_instance_script
                .take()
                .unwrap_or_else(|| vec![InstanceStatus::Provisioning, InstanceStatus::Running]);
            let mut created = instance.clone();
            created.status = InstanceStatus::Provisioning;
            state
                .instance_scripts
                .insert(created.name.clone(), script.into_iter().collect());
            state.instances.push(created);
        }
        Ok(operation)
    }

    async fn delete_instance(&self, _location: &Location, name: &str) -> Result<Operation, IaasError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::DeleteInstance(name.to_string()));
        state.check("delete_instance")?;
        if !state.instances.iter().any(|instance| instance.name == name) {
            return Err(IaasError::NotFound {
                resource: "resource",
                filter: format!("delete instance {}", name),
            });
        }
        let operation = state.operation("delete_instance", name);
        if operation.error.is_none() {
            state.instances.retain(|instance| instance.name != name);
        }
        Ok(operation)
    }

    async fn stop_instance(&self, _location: &Location, name: &str) -> Result<Operation, IaasError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::StopInstance(name.to_string()));
        state.check("stop_instance")?;
        let operation = state.operation("stop_instance", name);
        if operation.error.is_none() {
            let script = state
                .stop_scripts
                .remove(name)
                .unwrap_or_else(|| vec![InstanceStatus::Stopping, InstanceStatus::Terminated]);
            state
                .instance_scripts
                .insert(name.to_string(), script.into_iter().collect());
        }
        Ok(operation)
    }

    async fn delete_access_config(
        &self,
        _location: &Location,
        instance: &str,
        access_config: &str,
        network_interface: &str,
    ) -> Result<Operation, IaasError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::DeleteAccessConfig {
            instance: instance.to_string(),
            access_config: access_config.to_string(),
            network_interface: network_interface.to_string(),
        });
        state.check("delete_access_config")?;
        let operation = state.operation("delete_access_config", instance);
        if operation.error.is_none() {
            if let Some(target) = state.instances.iter_mut().find(|i| i.name == instance) {
                for nic in &mut target.network_interfaces {
                    if nic.name.as_deref() == Some(network_interface) {
                        nic.access_configs
                            .retain(|config| config.name.as_deref() != Some(access_config));
                    }
                }
            }
        }
        Ok(operation)
    }

    async fn insert_image(&self, _location: &Location, image: &Image) -> Result<Operation, IaasError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::InsertImage(image.clone()));
        state.check("insert_image")?;
        let operation = state.operation("insert_image", &image.name);
        if operation.error.is_none() {
            let script = state
                .next_image_script
                .take()
                .unwrap_or_else(|| vec![ImageStatus::Pending, ImageStatus::Ready]);
            state
                .image_scripts
                .insert(image.name.clone(), script.into_iter().collect());
            state.images.push(image.clone());
        }
        Ok(operation)
    }

    async fn get_image(&self, _location: &Location, name: &str) -> Result<Image, IaasError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::GetImage(name.to_string()));
        state.check("get_image")?;
        let status = state
            .image_scripts
            .get_mut(name)
            .and_then(pop_sticky)
            .unwrap_or_default();
        let mut image = state
            .images
            .iter()
            .find(|image| image.name == name)
            .cloned()
            .ok_or_else(|| IaasError::NotFound {
                resource: "image",
                filter: name.to_string(),
            })?;
        image.status = status;
        Ok(image)
    }
}

pub fn location() -> Location {
    Location::new("test-project", "us-central1-a")
}

/// A running instance shaped like a provider response
pub fn running_instance(name: &str, tags: &[&str]) -> Instance {
    Instance {
        name: name.to_string(),
        id: Some("1234567890".to_string()),
        machine_type: "https://www.googleapis.com/compute/v1/projects/test-project/zones/us-central1-a/machineTypes/n1-standard-2".to_string(),
        status: InstanceStatus::Running,
        tags: Tags {
            items: tags.iter().map(|tag| tag.to_string()).collect(),
            fingerprint: Some("42WmSpB8rSM=".to_string()),
        },
        network_interfaces: vec![NetworkInterface {
            name: Some("nic0".to_string()),
            network: Some("https://www.googleapis.com/compute/v1/projects/test-project/global/networks/default".to_string()),
            subnetwork: None,
            network_ip: Some("10.128.0.7".to_string()),
            access_configs: vec![AccessConfig {
                name: Some("External NAT".to_string()),
                kind: Some("ONE_TO_ONE_NAT".to_string()),
                nat_ip: Some("35.200.1.2".to_string()),
            }],
        }],
        disks: vec![AttachedDisk {
            boot: true,
            auto_delete: true,
            source: Some(format!(
                "https://www.googleapis.com/compute/v1/projects/test-project/zones/us-central1-a/disks/{}",
                name
            )),
            device_name: Some("persistent-disk-0".to_string()),
            initialize_params: None,
        }],
        self_link: None,
    }
}

pub fn instance_with_status(name: &str, status: InstanceStatus) -> Instance {
    Instance {
        status,
        ..running_instance(name, &[])
    }
}

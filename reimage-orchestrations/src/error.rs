//! Error taxonomy for provider calls and orchestration steps

use std::time::Duration;

use reimage_models::InstanceStatus;
use thiserror::Error;

use crate::types::Step;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum IaasError {
    #[error("no {resource} matches filter '{filter}'")]
    NotFound { resource: &'static str, filter: String },

    #[error("{count} {resource}s match filter '{filter}': {}", .names.join(", "))]
    AmbiguousMatch {
        resource: &'static str,
        filter: String,
        count: usize,
        names: Vec<String>,
    },

    #[error("timed out after {timeout:?} waiting for {what}")]
    TimedOut { what: String, timeout: Duration },

    #[error("{operation} was accepted but the provider reported: {message}")]
    ProviderOperationFailed { operation: String, message: String },

    #[error("image {image} failed to build")]
    CreationFailed { image: String },

    #[error("{context}: {source}")]
    Transport {
        context: String,
        #[source]
        source: BoxError,
    },

    #[error("invalid filter pattern: {0}")]
    InvalidFilter(#[from] regex::Error),

    #[error("invalid instance spec: {0}")]
    InvalidSpec(String),

    #[error("instance {name} is already {observed} and can no longer become {desired}")]
    UnreachableStatus {
        name: String,
        observed: InstanceStatus,
        desired: InstanceStatus,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl IaasError {
    pub fn transport(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        IaasError::Transport {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, IaasError::TimedOut { .. })
    }
}

/// An error tagged with the orchestration step that produced it
#[derive(Error, Debug)]
#[error("{step} failed: {source}")]
pub struct StepError {
    pub step: Step,
    #[source]
    pub source: IaasError,
}

pub trait StepContext<T> {
    fn at(self, step: Step) -> Result<T, StepError>;
}

impl<T> StepContext<T> for Result<T, IaasError> {
    fn at(self, step: Step) -> Result<T, StepError> {
        self.map_err(|source| StepError { step, source })
    }
}

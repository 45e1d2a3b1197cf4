//! # Service Errors
//!
//! This module defines the error types used by the lifecycle controller and the cycle runner.
//! Lifecycle errors ([`ServiceError`]) are structural and propagate to the host. Cycle errors
//! ([`CycleFailure`]) never leave the cycle task; they are logged and counted.

use crate::service::ServiceState;
use std::time::Duration;

/// Errors returned by [`HostedService`](crate::HostedService) lifecycle calls.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ServiceError {
    #[error("Cannot {action} a service that is {from}")]
    InvalidTransition {
        from: ServiceState,
        action: &'static str,
    },
    #[error("Trigger interval must be greater than zero")]
    InvalidInterval,
    #[error("Trigger delay or interval is too far in the future to schedule")]
    InvalidDelay,
    #[error("No tokio runtime available to drive the trigger")]
    RuntimeUnavailable,
    #[error("Start cancelled by host before the trigger was armed")]
    StartCancelled,
}

/// Why a single cycle did not complete successfully.
#[derive(Debug, thiserror::Error)]
pub enum CycleFailure {
    #[error("Job error: {0}")]
    Job(Box<dyn std::error::Error + Send + Sync>),
    #[error("Cycle exceeded deadline of {0:?}")]
    TimedOut(Duration),
    #[error("Cycle panicked: {0}")]
    Panicked(String),
    #[error("Cycle task aborted")]
    Aborted,
}

//! Trait abstraction for the registration service to enable mocking in tests

use crate::state::forms::RegistrationPayload;
use anyhow::Result;
use async_trait::async_trait;

/// Persists a patient registration and returns the created record id
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Create a patient record from a validated intake form
    async fn register_patient(&self, payload: RegistrationPayload) -> Result<String>;
}

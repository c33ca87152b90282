//! Submission pipeline: validate, build the payload, call the registration
//! service and branch on the outcome
//!
//! State machine: `Idle -> Submitting -> (Success | Failure) -> Idle`.
//! The controller flips to `Submitting` inside the same call that decides to
//! submit, so a second submit before the first resolves is ignored.

use super::attachment::Attachment;
use super::intake::fields;
use super::session::IntakeSession;
use super::validation::ValidationVerdict;
use crate::registration::RegistrationService;
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Everything the registration service needs to create a patient record
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationPayload {
    pub submission_id: Uuid,
    pub user_id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: String,
    pub address: String,
    pub occupation: String,
    pub emergency_contact_name: String,
    pub emergency_contact_number: String,
    pub primary_physician: String,
    pub insurance_provider: String,
    pub insurance_policy_number: String,
    pub allergies: String,
    pub current_medications: String,
    pub family_medical_history: String,
    pub past_medical_history: String,
    pub identification_type: String,
    pub identification_number: String,
    pub identification_document: Option<Attachment>,
    pub treatment_consent: bool,
    pub disclosure_consent: bool,
    pub privacy_consent: bool,
}

impl RegistrationPayload {
    /// Flatten the session's values into a service request
    pub fn from_session(session: &IntakeSession, submission_id: Uuid) -> Self {
        let state = session.state();
        let text = |name: &str| state.text(name).trim().to_string();
        Self {
            submission_id,
            user_id: session.user_id().map(str::to_string),
            name: text(fields::NAME),
            email: text(fields::EMAIL),
            phone: text(fields::PHONE),
            birth_date: state.date(fields::BIRTH_DATE),
            gender: text(fields::GENDER),
            address: text(fields::ADDRESS),
            occupation: text(fields::OCCUPATION),
            emergency_contact_name: text(fields::EMERGENCY_CONTACT_NAME),
            emergency_contact_number: text(fields::EMERGENCY_CONTACT_NUMBER),
            primary_physician: text(fields::PRIMARY_PHYSICIAN),
            insurance_provider: text(fields::INSURANCE_PROVIDER),
            insurance_policy_number: text(fields::INSURANCE_POLICY_NUMBER),
            allergies: text(fields::ALLERGIES),
            current_medications: text(fields::CURRENT_MEDICATIONS),
            family_medical_history: text(fields::FAMILY_MEDICAL_HISTORY),
            past_medical_history: text(fields::PAST_MEDICAL_HISTORY),
            identification_type: text(fields::IDENTIFICATION_TYPE),
            identification_number: text(fields::IDENTIFICATION_NUMBER),
            identification_document: state
                .files(fields::IDENTIFICATION_DOCUMENT)
                .and_then(|files| files.first().cloned()),
            treatment_consent: state.flag(fields::TREATMENT_CONSENT),
            disclosure_consent: state.flag(fields::DISCLOSURE_CONSENT),
            privacy_consent: state.flag(fields::PRIVACY_CONSENT),
        }
    }
}

/// How a submission attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Success { created_id: String },
    Failure { reason: String },
}

/// A settled submission and, on success, where to navigate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub submission_id: Uuid,
    pub outcome: SubmissionOutcome,
    pub redirect: Option<String>,
}

/// Immediate answer to a submit action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAttempt {
    Started { submission_id: Uuid },
    /// Validation failed; errors are now visible on the form
    Blocked(ValidationVerdict),
    /// A submission is already in flight; this action was ignored
    InFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Submitting,
}

struct PendingSubmission {
    submission_id: Uuid,
    receiver: oneshot::Receiver<Result<String>>,
}

/// Drives submissions of an intake session to the registration service
pub struct SubmissionController {
    service: Arc<dyn RegistrationService>,
    route_prefix: String,
    phase: SubmissionPhase,
    pending: Option<PendingSubmission>,
}

impl SubmissionController {
    pub fn new(service: Arc<dyn RegistrationService>, route_prefix: impl Into<String>) -> Self {
        Self {
            service,
            route_prefix: route_prefix.into(),
            phase: SubmissionPhase::Idle,
            pending: None,
        }
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    /// The loading flag: true exactly while a submission is in flight
    pub fn is_loading(&self) -> bool {
        self.phase == SubmissionPhase::Submitting
    }

    /// Path of the follow-up screen for a created record. The id must fit
    /// in a single path segment.
    pub fn redirect_path(&self, created_id: &str) -> Result<String> {
        let unroutable = created_id.is_empty()
            || created_id.chars().any(|c| {
                matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_whitespace() || c.is_control()
            });
        if unroutable {
            return Err(anyhow!("service returned an unroutable patient id {created_id:?}"));
        }
        Ok(format!(
            "/{}/{}/register",
            self.route_prefix.trim_matches('/'),
            created_id
        ))
    }

    /// Handle a submit action. Runs full validation first; only a valid form
    /// moves the controller to `Submitting` and spawns the service call.
    pub fn submit(&mut self, session: &mut IntakeSession) -> SubmitAttempt {
        if self.is_loading() {
            tracing::debug!("Submit ignored, a submission is already in flight");
            return SubmitAttempt::InFlight;
        }

        let verdict = session.validate_all();
        if !verdict.is_valid() {
            tracing::warn!(
                errors = verdict.error_count(),
                "Registration blocked by validation"
            );
            return SubmitAttempt::Blocked(verdict);
        }

        let submission_id = Uuid::new_v4();
        let payload = RegistrationPayload::from_session(session, submission_id);
        tracing::info!(
            %submission_id,
            has_document = payload.identification_document.is_some(),
            "Submitting patient registration"
        );

        let (sender, receiver) = oneshot::channel();
        let service = Arc::clone(&self.service);
        tokio::spawn(async move {
            let result = service.register_patient(payload).await;
            // The receiver is gone only if the controller was dropped
            let _ = sender.send(result);
        });

        self.phase = SubmissionPhase::Submitting;
        self.pending = Some(PendingSubmission {
            submission_id,
            receiver,
        });
        SubmitAttempt::Started { submission_id }
    }

    /// Non-blocking check for a finished submission
    pub fn poll(&mut self) -> Option<SubmissionResult> {
        let pending = self.pending.as_mut()?;
        let result = match pending.receiver.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => return None,
            Err(oneshot::error::TryRecvError::Closed) => {
                Err(anyhow!("registration task ended without a result"))
            }
        };
        let submission_id = pending.submission_id;
        self.pending = None;
        Some(self.finish(submission_id, result))
    }

    /// Wait for the in-flight submission, if any, to finish
    #[cfg(test)]
    pub async fn settle(&mut self) -> Option<SubmissionResult> {
        let pending = self.pending.take()?;
        let result = pending
            .receiver
            .await
            .unwrap_or_else(|_| Err(anyhow!("registration task ended without a result")));
        Some(self.finish(pending.submission_id, result))
    }

    fn finish(&mut self, submission_id: Uuid, result: Result<String>) -> SubmissionResult {
        self.phase = SubmissionPhase::Idle;
        let routed = result.and_then(|created_id| {
            let redirect = self.redirect_path(&created_id)?;
            Ok((created_id, redirect))
        });
        let (outcome, redirect) = match routed {
            Ok((created_id, redirect)) => {
                tracing::info!(%submission_id, patient_id = %created_id, "Patient registered");
                (SubmissionOutcome::Success { created_id }, Some(redirect))
            }
            Err(err) => {
                tracing::error!(%submission_id, error = %err, "Patient registration failed");
                (
                    SubmissionOutcome::Failure {
                        reason: err.to_string(),
                    },
                    None,
                )
            }
        };
        SubmissionResult {
            submission_id,
            outcome,
            redirect,
        }
    }
}

//! Form domain layer
//!
//! Schema-driven form values with incremental and full validation, plus the
//! patient registration form and its submission pipeline.

mod attachment;
mod composite;
mod controls;
mod field;
mod form_state;
pub mod intake;
mod schema;
mod session;
mod submission;
mod validation;

pub use attachment::Attachment;
pub use composite::{CompositeControl, ControlItem, ControlLayout, Emphasis, FieldBinding};
pub use field::{FieldDefinition, FieldKind, FieldValue};
pub use form_state::Form;
pub use schema::FormSchema;
pub use session::{EditOutcome, IntakeSession, Prefill};
pub use submission::{
    RegistrationPayload, SubmissionController, SubmissionOutcome, SubmissionPhase,
    SubmissionResult, SubmitAttempt,
};

#[cfg(test)]
pub use attachment::AttachmentSet;
#[cfg(test)]
pub use controls::{FileUploader, RadioGroup};

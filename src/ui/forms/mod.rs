//! Form rendering module
//!
//! This module contains UI components for rendering forms:
//! - `field_renderer`: uniform field rendering from a binding
//! - `controls`: composite control rendering
//! - `intake_form`: the patient intake form view

mod controls;
mod field_renderer;
mod intake_form;

pub use intake_form::draw_intake;

//! Application state definitions

use std::collections::VecDeque;

/// Current view in the application
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    /// The patient intake form
    #[default]
    Intake,
    /// Follow-up screen after a successful registration
    Registered,
}

/// View parameters for navigation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewParams {
    pub patient_id: Option<String>,
    /// Route path the view was reached through
    pub path: Option<String>,
}

/// Open file path prompt for an attachment field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePrompt {
    /// Field the selected file is attached to
    pub field: &'static str,
    pub label: &'static str,
    /// Path typed so far
    pub path: String,
    /// Why the last attempt failed
    pub error: Option<String>,
}

impl FilePrompt {
    pub fn new(field: &'static str, label: &'static str) -> Self {
        Self {
            field,
            label,
            ..Default::default()
        }
    }
}

/// Main application state
#[derive(Debug, Default)]
pub struct AppState {
    // Navigation
    pub current_view: View,
    pub view_params: ViewParams,
    pub view_history: Vec<(View, ViewParams)>,

    // Modals
    pub file_prompt: Option<FilePrompt>,
    pub error_queue: VecDeque<String>,

    // Status bar
    pub status_message: Option<String>,
    pub service_address: String,
}

impl AppState {
    /// Queue an error for the error dialog
    pub fn push_error(&mut self, message: String) {
        self.error_queue.push_back(message);
    }

    pub fn has_errors(&self) -> bool {
        !self.error_queue.is_empty()
    }

    /// Error currently shown, oldest first
    pub fn current_error(&self) -> Option<&str> {
        self.error_queue.front().map(String::as_str)
    }

    pub fn dismiss_error(&mut self) {
        self.error_queue.pop_front();
    }
}

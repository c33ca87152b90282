//! Application state and core logic

use crate::config::IntakeConfig;
use crate::platform::PASTE_MODIFIER;
use crate::registration::{RegistrationClient, RegistrationService};
use crate::state::forms::intake::{patient_registration_schema, prefill_for};
use crate::state::forms::{
    Attachment, EditOutcome, FieldValue, Form, FormSchema, IntakeSession, Prefill,
    SubmissionController, SubmissionOutcome, SubmissionResult, SubmitAttempt,
};
use crate::state::{AppState, FilePrompt, View, ViewParams};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::Path;
use std::sync::Arc;

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    /// Intake form session; present only while the intake view is active
    pub session: Option<IntakeSession>,
    /// Submission pipeline to the registration service
    pub controller: SubmissionController,
    schema: Arc<FormSchema>,
    prefill: Prefill,
    /// Whether the app should quit
    quit: bool,
}

impl App {
    /// Create a new App instance from the loaded configuration
    pub fn new(config: &IntakeConfig) -> Result<Self> {
        let address = config.service_address();
        let client = RegistrationClient::new(&address)?;
        tracing::info!(address = %client.address(), "Using registration service");

        let today = chrono::Local::now().date_naive();
        let schema = Arc::new(patient_registration_schema(today)?);
        let mut app = Self::with_service(
            Arc::new(client),
            schema,
            prefill_for(config.user.as_ref()),
            config.patient_route_prefix(),
        );
        app.state.service_address = address;
        Ok(app)
    }

    /// Create an App around an arbitrary registration service
    pub fn with_service(
        service: Arc<dyn RegistrationService>,
        schema: Arc<FormSchema>,
        prefill: Prefill,
        route_prefix: &str,
    ) -> Self {
        let session = IntakeSession::with_prefill(Arc::clone(&schema), prefill.clone());
        Self {
            state: AppState::default(),
            session: Some(session),
            controller: SubmissionController::new(service, route_prefix),
            schema,
            prefill,
            quit: false,
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn quit(&mut self) {
        self.quit = true;
    }

    /// Push an error message to the error queue for display
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.state.push_error(message.into());
    }

    /// Apply a finished submission, if there is one. Called every tick.
    pub fn tick(&mut self) {
        if let Some(result) = self.controller.poll() {
            self.apply_submission(result);
        }
    }

    /// Wait for the in-flight submission and apply it
    #[cfg(test)]
    pub async fn settle_submission(&mut self) {
        if let Some(result) = self.controller.settle().await {
            self.apply_submission(result);
        }
    }

    fn apply_submission(&mut self, result: SubmissionResult) {
        // Failures are logged by the controller; the form stays as it was
        if let (SubmissionOutcome::Success { created_id }, Some(path)) =
            (result.outcome, result.redirect)
        {
            // The form session ends with a successful registration
            self.session = None;
            self.navigate(
                View::Registered,
                ViewParams {
                    patient_id: Some(created_id),
                    path: Some(path),
                },
            );
        }
    }

    /// Handle a key event
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle error dialog dismissal first (modal)
        if self.state.has_errors() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.state.dismiss_error();
            }
            return Ok(());
        }

        // Handle file prompt (modal)
        if self.state.file_prompt.is_some() {
            self.handle_file_prompt_key(key);
            return Ok(());
        }

        // Clear any status messages on key press
        self.state.status_message = None;

        match self.state.current_view {
            View::Intake => self.handle_intake_key(key)?,
            View::Registered => self.handle_registered_key(key),
        }
        Ok(())
    }

    /// Navigate to a new view
    pub fn navigate(&mut self, view: View, params: ViewParams) {
        self.state.view_history.push((
            self.state.current_view.clone(),
            self.state.view_params.clone(),
        ));
        self.state.current_view = view;
        self.state.view_params = params;
    }

    /// Go back to previous view
    pub fn go_back(&mut self) {
        if let Some((view, params)) = self.state.view_history.pop() {
            self.state.current_view = view;
            self.state.view_params = params;
        }
        if self.state.current_view == View::Intake && self.session.is_none() {
            self.session = Some(self.new_session());
        }
    }

    fn new_session(&self) -> IntakeSession {
        IntakeSession::with_prefill(Arc::clone(&self.schema), self.prefill.clone())
    }

    /// Handle keys in the intake form
    fn handle_intake_key(&mut self, key: KeyEvent) -> Result<()> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let Some(session) = self.session.as_mut() else {
            self.session = Some(self.new_session());
            return Ok(());
        };

        match key.code {
            KeyCode::Tab => session.next_field(),
            KeyCode::BackTab => session.prev_field(),
            KeyCode::Char('s') if ctrl => self.submit(),
            KeyCode::Char('r') if ctrl => {
                session.reset();
                self.state.status_message = Some("Form reset".to_string());
            }
            KeyCode::Char('v') if key.modifiers.contains(PASTE_MODIFIER) => {
                self.paste_clipboard();
            }
            KeyCode::Esc => self.quit(),
            KeyCode::Enter if session.is_submit_row_active() => self.submit(),
            _ => match session.edit_active(key)? {
                EditOutcome::RequestFile(field) => self.open_file_prompt(field),
                EditOutcome::Changed | EditOutcome::Unchanged => {}
            },
        }
        Ok(())
    }

    /// Submit the intake form
    fn submit(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match self.controller.submit(session) {
            SubmitAttempt::Blocked(verdict) => {
                self.state.status_message = Some(format!(
                    "{} field(s) need attention",
                    verdict.error_count()
                ));
                // Jump to the first failing field in form order
                let first_failing = session
                    .schema()
                    .fields()
                    .iter()
                    .position(|field| verdict.error_for(field.name).is_some());
                if let Some(index) = first_failing {
                    session.set_active_field(index);
                }
            }
            SubmitAttempt::Started { .. } | SubmitAttempt::InFlight => {}
        }
    }

    fn paste_clipboard(&mut self) {
        let text = match self.read_clipboard() {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "Clipboard read failed");
                self.push_error(format!("Failed to read clipboard: {err}"));
                return;
            }
        };
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.paste_into_active(&text) {
            Ok(EditOutcome::Changed) => {
                self.state.status_message =
                    Some(format!("Pasted {} chars", text.chars().count()));
            }
            Ok(_) => {}
            Err(err) => self.push_error(err.to_string()),
        }
    }

    fn read_clipboard(&self) -> Result<String> {
        use arboard::Clipboard;
        let mut clipboard = Clipboard::new()?;
        Ok(clipboard.get_text()?)
    }

    fn open_file_prompt(&mut self, field: &'static str) {
        let label = self
            .schema
            .field(field)
            .map(|f| f.label)
            .unwrap_or(field);
        self.state.file_prompt = Some(FilePrompt::new(field, label));
    }

    /// Handle keys in the file path prompt
    fn handle_file_prompt_key(&mut self, key: KeyEvent) {
        let Some(prompt) = self.state.file_prompt.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.state.file_prompt = None,
            KeyCode::Enter => self.attach_prompted_file(),
            KeyCode::Backspace => {
                prompt.path.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                prompt.path.push(c);
            }
            _ => {}
        }
    }

    /// Read the prompted file and replace the field's selection with it
    fn attach_prompted_file(&mut self) {
        let Some(prompt) = self.state.file_prompt.as_mut() else {
            return;
        };
        let path = prompt.path.trim();
        if path.is_empty() {
            prompt.error = Some("Enter a file path".to_string());
            return;
        }

        let attachment = match Attachment::from_path(Path::new(path)) {
            Ok(attachment) => attachment,
            Err(err) => {
                tracing::warn!(field = prompt.field, error = %err, "Could not read attachment");
                prompt.error = Some(format!("{err:#}"));
                return;
            }
        };

        let field = prompt.field;
        let Some(session) = self.session.as_mut() else {
            self.state.file_prompt = None;
            return;
        };
        let current = session.state().files(field).cloned().unwrap_or_default();
        let file_name = attachment.file_name.clone();
        match session.set_value(field, FieldValue::Files(current.with_selection(attachment))) {
            Ok(()) => {
                self.state.file_prompt = None;
                self.state.status_message = Some(format!("Attached {file_name}"));
            }
            Err(err) => {
                self.state.file_prompt = None;
                self.push_error(err.to_string());
            }
        }
    }

    /// Handle keys on the registration confirmation screen
    fn handle_registered_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace => self.go_back(),
            KeyCode::Char('q') => self.quit(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::MockRegistrationService;
    use crate::state::forms::intake::fields;
    use crate::state::forms::intake::tests::{filled_session, today};
    use anyhow::anyhow;
    use uuid::Uuid;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn app_with(mock: MockRegistrationService) -> App {
        let schema = Arc::new(patient_registration_schema(today()).unwrap());
        App::with_service(Arc::new(mock), schema, Prefill::default(), "patients")
    }

    fn filled_app(mock: MockRegistrationService) -> App {
        let mut app = app_with(mock);
        app.session = Some(filled_session());
        app
    }

    fn session(app: &App) -> &IntakeSession {
        app.session.as_ref().unwrap()
    }

    fn focus(app: &mut App, field: &str) {
        let index = app.schema.index_of(field).unwrap();
        app.session.as_mut().unwrap().set_active_field(index);
    }

    mod navigation {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_starts_on_intake_with_session() {
            let app = app_with(MockRegistrationService::new());
            assert_eq!(app.state.current_view, View::Intake);
            assert!(app.session.is_some());
            assert!(!app.should_quit());
        }

        #[test]
        fn test_tab_moves_between_fields() {
            let mut app = app_with(MockRegistrationService::new());
            app.handle_key(key(KeyCode::Tab)).unwrap();
            assert_eq!(session(&app).active_field_index, 1);
            app.handle_key(key(KeyCode::BackTab)).unwrap();
            app.handle_key(key(KeyCode::BackTab)).unwrap();
            assert!(session(&app).is_submit_row_active());
        }

        #[test]
        fn test_esc_quits_from_intake() {
            let mut app = app_with(MockRegistrationService::new());
            app.handle_key(key(KeyCode::Esc)).unwrap();
            assert!(app.should_quit());
        }

        #[test]
        fn test_go_back_from_registered_starts_fresh_session() {
            let mut app = app_with(MockRegistrationService::new());
            app.session = None;
            app.navigate(View::Registered, ViewParams::default());

            app.handle_key(key(KeyCode::Esc)).unwrap();

            assert_eq!(app.state.current_view, View::Intake);
            assert!(app.state.view_history.is_empty());
            assert_eq!(session(&app).state().text(fields::NAME), "");
        }

        #[test]
        fn test_go_back_empty_history_keeps_view() {
            let mut app = app_with(MockRegistrationService::new());
            app.go_back();
            assert_eq!(app.state.current_view, View::Intake);
        }
    }

    mod editing {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_typing_updates_active_field() {
            let mut app = app_with(MockRegistrationService::new());
            app.handle_key(key(KeyCode::Char('J'))).unwrap();
            app.handle_key(key(KeyCode::Char('o'))).unwrap();
            assert_eq!(session(&app).state().text(fields::NAME), "Jo");
            assert!(session(&app).state().error(fields::NAME).is_none());
        }

        #[test]
        fn test_single_character_shows_error() {
            let mut app = app_with(MockRegistrationService::new());
            app.handle_key(key(KeyCode::Char('J'))).unwrap();
            assert_eq!(
                session(&app).state().error(fields::NAME),
                Some("Name must be at least 2 characters")
            );
        }

        #[test]
        fn test_space_toggles_consent() {
            let mut app = app_with(MockRegistrationService::new());
            focus(&mut app, fields::PRIVACY_CONSENT);
            app.handle_key(key(KeyCode::Char(' '))).unwrap();
            assert!(session(&app).state().flag(fields::PRIVACY_CONSENT));
        }

        #[test]
        fn test_ctrl_r_resets_form() {
            let mut app = filled_app(MockRegistrationService::new());
            app.handle_key(ctrl('r')).unwrap();
            assert_eq!(session(&app).state().text(fields::NAME), "");
            assert_eq!(app.state.status_message.as_deref(), Some("Form reset"));
        }
    }

    mod file_prompt {
        use super::*;
        use pretty_assertions::assert_eq;

        fn temp_file(contents: &[u8]) -> std::path::PathBuf {
            let path = std::env::temp_dir().join(format!("intake-app-{}.png", Uuid::new_v4()));
            std::fs::write(&path, contents).unwrap();
            path
        }

        fn type_text(app: &mut App, text: &str) {
            for c in text.chars() {
                app.handle_key(key(KeyCode::Char(c))).unwrap();
            }
        }

        #[test]
        fn test_enter_on_document_field_opens_prompt() {
            let mut app = app_with(MockRegistrationService::new());
            focus(&mut app, fields::IDENTIFICATION_DOCUMENT);
            app.handle_key(key(KeyCode::Enter)).unwrap();
            let prompt = app.state.file_prompt.as_ref().unwrap();
            assert_eq!(prompt.field, fields::IDENTIFICATION_DOCUMENT);
        }

        #[test]
        fn test_selecting_file_replaces_attachment() {
            let mut app = app_with(MockRegistrationService::new());
            focus(&mut app, fields::IDENTIFICATION_DOCUMENT);
            let first = temp_file(b"first");
            let second = temp_file(b"second-scan");

            for path in [&first, &second] {
                app.handle_key(key(KeyCode::Enter)).unwrap();
                type_text(&mut app, &path.to_string_lossy());
                app.handle_key(key(KeyCode::Enter)).unwrap();
                assert!(app.state.file_prompt.is_none());
            }

            let files = session(&app)
                .state()
                .files(fields::IDENTIFICATION_DOCUMENT)
                .unwrap();
            assert_eq!(files.len(), 1);
            let attached = files.first().unwrap();
            assert_eq!(attached.content, b"second-scan".to_vec());
            assert_eq!(attached.mime_type, "image/png");

            let _ = std::fs::remove_file(first);
            let _ = std::fs::remove_file(second);
        }

        #[test]
        fn test_missing_file_keeps_prompt_open() {
            let mut app = app_with(MockRegistrationService::new());
            focus(&mut app, fields::IDENTIFICATION_DOCUMENT);
            app.handle_key(key(KeyCode::Enter)).unwrap();
            type_text(&mut app, "/definitely/not/here.png");
            app.handle_key(key(KeyCode::Enter)).unwrap();

            let prompt = app.state.file_prompt.as_ref().unwrap();
            assert!(prompt.error.is_some());
            assert!(session(&app)
                .state()
                .files(fields::IDENTIFICATION_DOCUMENT)
                .unwrap()
                .is_empty());
        }

        #[test]
        fn test_esc_cancels_prompt() {
            let mut app = app_with(MockRegistrationService::new());
            focus(&mut app, fields::IDENTIFICATION_DOCUMENT);
            app.handle_key(key(KeyCode::Enter)).unwrap();
            app.handle_key(key(KeyCode::Esc)).unwrap();
            assert!(app.state.file_prompt.is_none());
            assert!(!app.should_quit());
        }
    }

    mod submission {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_invalid_submit_shows_errors_without_calling_service() {
            let mut mock = MockRegistrationService::new();
            mock.expect_register_patient().times(0);
            let mut app = app_with(mock);

            app.handle_key(ctrl('s')).unwrap();

            assert!(!app.controller.is_loading());
            assert_eq!(app.state.current_view, View::Intake);
            assert!(session(&app).state().error(fields::EMAIL).is_some());
            assert_eq!(
                app.state.status_message.as_deref(),
                Some("13 field(s) need attention")
            );
        }

        #[tokio::test]
        async fn test_blocked_submit_focuses_first_failing_field() {
            let mut mock = MockRegistrationService::new();
            mock.expect_register_patient().times(0);
            let mut app = filled_app(mock);
            app.session
                .as_mut()
                .unwrap()
                .set_value(fields::PRIVACY_CONSENT, FieldValue::Bool(false))
                .unwrap();

            app.handle_key(ctrl('s')).unwrap();

            let privacy = app.schema.index_of(fields::PRIVACY_CONSENT).unwrap();
            assert_eq!(session(&app).active_field_index, privacy);
            assert_eq!(
                app.state.status_message.as_deref(),
                Some("1 field(s) need attention")
            );
        }

        #[tokio::test]
        async fn test_success_navigates_to_registered() {
            let mut mock = MockRegistrationService::new();
            mock.expect_register_patient()
                .times(1)
                .returning(|_| Ok("p-1".to_string()));
            let mut app = filled_app(mock);

            app.handle_key(ctrl('s')).unwrap();
            assert!(app.controller.is_loading());
            app.settle_submission().await;

            assert_eq!(app.state.current_view, View::Registered);
            assert_eq!(
                app.state.view_params,
                ViewParams {
                    patient_id: Some("p-1".to_string()),
                    path: Some("/patients/p-1/register".to_string()),
                }
            );
            assert!(app.session.is_none());
            assert!(!app.controller.is_loading());
        }

        #[tokio::test]
        async fn test_failure_stays_on_form() {
            let mut mock = MockRegistrationService::new();
            mock.expect_register_patient()
                .times(1)
                .returning(|_| Err(anyhow!("unavailable")));
            let mut app = filled_app(mock);

            app.handle_key(ctrl('s')).unwrap();
            app.settle_submission().await;

            assert_eq!(app.state.current_view, View::Intake);
            assert_eq!(session(&app).state().text(fields::NAME), "Jane Doe");
            assert!(!app.controller.is_loading());
            assert!(!app.state.has_errors());
        }

        #[tokio::test]
        async fn test_repeated_submit_is_single_flight() {
            let mut mock = MockRegistrationService::new();
            mock.expect_register_patient()
                .times(1)
                .returning(|_| Ok("p-2".to_string()));
            let mut app = filled_app(mock);

            app.handle_key(ctrl('s')).unwrap();
            app.handle_key(ctrl('s')).unwrap();
            focus(&mut app, fields::NAME);
            app.session.as_mut().unwrap().prev_field();
            app.handle_key(key(KeyCode::Enter)).unwrap();
            app.settle_submission().await;

            assert_eq!(app.state.current_view, View::Registered);
        }

        #[tokio::test]
        async fn test_tick_applies_outcome() {
            let mut mock = MockRegistrationService::new();
            mock.expect_register_patient()
                .times(1)
                .returning(|_| Ok("p-3".to_string()));
            let mut app = filled_app(mock);

            app.handle_key(ctrl('s')).unwrap();
            for _ in 0..100 {
                app.tick();
                if app.state.current_view == View::Registered {
                    break;
                }
                tokio::task::yield_now().await;
            }

            assert_eq!(app.state.current_view, View::Registered);
            assert_eq!(app.state.view_params.patient_id.as_deref(), Some("p-3"));
        }
    }
}

//! Composite field controls: grouped single choice and file picker

use super::composite::{
    CompositeControl, ControlItem, ControlLayout, ControlResponse, Emphasis, FieldBinding,
};
use super::field::{cycle_option, FieldValue, ValueShape};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Horizontal radio group over a fixed option set
#[derive(Debug, Clone)]
pub struct RadioGroup {
    options: &'static [&'static str],
}

impl RadioGroup {
    pub fn new(options: &'static [&'static str]) -> Self {
        Self { options }
    }
}

impl CompositeControl for RadioGroup {
    fn name(&self) -> &'static str {
        "radio-group"
    }

    fn value_shape(&self) -> ValueShape {
        ValueShape::Text
    }

    fn items(&self, binding: &FieldBinding<'_>) -> Vec<ControlItem> {
        let selected = binding.value.as_text();
        self.options
            .iter()
            .map(|option| {
                if *option == selected {
                    ControlItem::new(format!("(•) {option}"), Emphasis::Selected)
                } else {
                    ControlItem::new(format!("( ) {option}"), Emphasis::Muted)
                }
            })
            .collect()
    }

    fn on_key(&self, binding: &FieldBinding<'_>, key: KeyEvent) -> ControlResponse {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return ControlResponse::Ignored;
        }
        let forward = match key.code {
            KeyCode::Right | KeyCode::Down | KeyCode::Char(' ') => true,
            KeyCode::Left | KeyCode::Up => false,
            _ => return ControlResponse::Ignored,
        };
        match cycle_option(self.options, binding.value.as_text(), forward) {
            Some(next) => ControlResponse::Change(FieldValue::text(next)),
            None => ControlResponse::Ignored,
        }
    }

    fn layout(&self) -> ControlLayout {
        ControlLayout::Inline
    }
}

/// File picker bound to an attachment set. Selection itself happens in the
/// host's path prompt; the control only asks for it and shows the result.
#[derive(Debug, Clone, Copy)]
pub struct FileUploader;

impl CompositeControl for FileUploader {
    fn name(&self) -> &'static str {
        "file-uploader"
    }

    fn value_shape(&self) -> ValueShape {
        ValueShape::Files
    }

    fn items(&self, binding: &FieldBinding<'_>) -> Vec<ControlItem> {
        match binding.value.as_files() {
            Some(files) if !files.is_empty() => files
                .files()
                .iter()
                .map(|file| {
                    ControlItem::new(file.file_name.clone(), Emphasis::Normal)
                        .with_detail(format!("{} · {}", file.display_size(), file.mime_type))
                })
                .collect(),
            _ if binding.is_active => vec![ControlItem::new(
                "Press Enter to choose a file",
                Emphasis::Muted,
            )],
            _ => vec![ControlItem::new("No file selected", Emphasis::Muted)],
        }
    }

    fn on_key(&self, binding: &FieldBinding<'_>, key: KeyEvent) -> ControlResponse {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => ControlResponse::RequestFile,
            KeyCode::Delete | KeyCode::Backspace => match binding.value.as_files() {
                Some(files) if !files.is_empty() => {
                    ControlResponse::Change(FieldValue::Files(files.cleared()))
                }
                _ => ControlResponse::Ignored,
            },
            _ => ControlResponse::Ignored,
        }
    }
}

//! File attachments for document upload fields

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Upper bound of files the identification document field keeps
pub const MAX_DOCUMENT_FILES: usize = 1;

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// A selected file with its content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub content: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            size_bytes: content.len() as u64,
            content,
        }
    }

    /// Read a file from disk. The type is inferred from the extension and
    /// neither type nor size is restricted here.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(file_name, mime_type_for(path), content))
    }

    /// Human readable size, e.g. "1.5 KB"
    pub fn display_size(&self) -> String {
        const KB: u64 = 1024;
        const MB: u64 = 1024 * 1024;
        match self.size_bytes {
            s if s >= MB => format!("{:.1} MB", s as f64 / MB as f64),
            s if s >= KB => format!("{:.1} KB", s as f64 / KB as f64),
            s => format!("{s} B"),
        }
    }
}

/// Guess a MIME type from the file extension
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",
        "pdf" => "application/pdf",
        _ => FALLBACK_MIME_TYPE,
    }
}

/// Ordered, bounded set of attachments for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentSet {
    files: Vec<Attachment>,
    max_files: usize,
}

impl Default for AttachmentSet {
    fn default() -> Self {
        Self::new(MAX_DOCUMENT_FILES)
    }
}

impl AttachmentSet {
    pub fn new(max_files: usize) -> Self {
        Self {
            files: Vec::new(),
            max_files,
        }
    }

    pub fn files(&self) -> &[Attachment] {
        &self.files
    }

    pub fn first(&self) -> Option<&Attachment> {
        self.files.first()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    #[cfg(test)]
    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// Replace the whole selection. Files beyond `max_files` are dropped.
    pub fn replace(&mut self, mut files: Vec<Attachment>) {
        if files.len() > self.max_files {
            tracing::warn!(
                selected = files.len(),
                max = self.max_files,
                "Dropping files beyond the selection limit"
            );
            files.truncate(self.max_files);
        }
        self.files = files;
    }

    /// A copy of this set holding only `attachment`
    pub fn with_selection(&self, attachment: Attachment) -> Self {
        let mut next = Self::new(self.max_files);
        next.replace(vec![attachment]);
        next
    }

    /// An empty set with the same limit
    pub fn cleared(&self) -> Self {
        Self::new(self.max_files)
    }
}

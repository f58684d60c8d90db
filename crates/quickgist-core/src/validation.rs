//! Client-side form rules for creating a gist.
//!
//! Everything here runs before a request is built. A form that fails
//! validation never reaches the network.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::models::gist::{FileUpload, format_file_size};

pub const TITLE_MAX_LENGTH: usize = 100;
pub const DESCRIPTION_MAX_LENGTH: usize = 500;
pub const CONTENT_MAX_LENGTH: usize = 100_000;
pub const FILE_MAX_BYTES: usize = 5 * 1024 * 1024;

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>?").expect("tag pattern is a valid regex"));

/// Strip HTML-like tags from a text field.
///
/// An unterminated `<` swallows the rest of the input, matching how
/// browsers would treat it as an open tag.
pub fn sanitize(input: &str) -> String {
    TAG_PATTERN.replace_all(input, "").into_owned()
}

/// Upper bounds applied to the create form. Lengths are in characters,
/// the file bound in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub title_max: usize,
    pub description_max: usize,
    pub content_max: usize,
    pub file_max_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            title_max: TITLE_MAX_LENGTH,
            description_max: DESCRIPTION_MAX_LENGTH,
            content_max: CONTENT_MAX_LENGTH,
            file_max_bytes: FILE_MAX_BYTES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Description,
    Content,
    File,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::Content => "content",
            Field::File => "file",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// One or more field-level problems with the create form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid gist: {}", summary(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// First message recorded for `field`, for inline display.
    pub fn message_for(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn has(&self, field: Field) -> bool {
        self.message_for(field).is_some()
    }
}

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Check the (already sanitized) form fields against `limits`.
///
/// All violations are collected so every field can show its own message.
pub fn validate(
    title: &str,
    description: &str,
    content: &str,
    file: Option<&FileUpload>,
    limits: &Limits,
) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    let mut push = |field, message: String| errors.push(FieldError { field, message });

    if title.trim().is_empty() {
        push(Field::Title, "Title is required".to_string());
    } else if title.chars().count() > limits.title_max {
        push(
            Field::Title,
            format!("Title must be under {} characters", limits.title_max),
        );
    }

    if description.chars().count() > limits.description_max {
        push(
            Field::Description,
            format!("Description must be under {} characters", limits.description_max),
        );
    }

    if content.trim().is_empty() && file.is_none() {
        push(
            Field::Content,
            "Content is required unless a file is attached".to_string(),
        );
    } else if content.chars().count() > limits.content_max {
        push(Field::Content, "Content is too large".to_string());
    }

    if let Some(file) = file {
        if file.file_name.trim().is_empty() {
            push(Field::File, "File must have a name".to_string());
        }
        if file.size() > limits.file_max_bytes {
            push(
                Field::File,
                format!(
                    "File is {} but the limit is {}",
                    format_file_size(file.size()),
                    format_file_size(limits.file_max_bytes)
                ),
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { errors })
    }
}

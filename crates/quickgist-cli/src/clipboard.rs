//! Clipboard access behind the `--copy` flags.
//!
//! Copying never fails a command: the outcome is turned into a one-line
//! notice for stderr.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error(transparent)]
    Platform(#[from] arboard::Error),

    #[error("clipboard error: {0}")]
    Other(String),
}

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The operating system clipboard.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn open() -> Result<Self, ClipboardError> {
        Ok(Self {
            inner: arboard::Clipboard::new()?,
        })
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.inner.set_text(text.to_owned())?;
        Ok(())
    }
}

/// Copy `text` and describe the outcome. `what` names the copied thing,
/// e.g. "share link".
pub fn copy_with(clipboard: &mut impl Clipboard, text: &str, what: &str) -> String {
    match clipboard.set_text(text) {
        Ok(()) => format!("Copied {what} to clipboard"),
        Err(e) => {
            tracing::warn!(error = %e, "clipboard write failed");
            format!("Could not copy {what}: {e}")
        }
    }
}

/// [`copy_with`] on the system clipboard.
pub fn copy(text: &str, what: &str) -> String {
    match SystemClipboard::open() {
        Ok(mut clipboard) => copy_with(&mut clipboard, text, what),
        Err(e) => {
            tracing::warn!(error = %e, "clipboard unavailable");
            format!("Could not copy {what}: {e}")
        }
    }
}

//! Create-gist form and its submission state machine.
//!
//! `Idle -> Validating -> Submitting -> (Success | Failed)`. Validation
//! failures never reach the network, and only one submission can be in
//! flight per flow.

use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

use quickgist_auth::Identity;
use quickgist_client::{ClientError, GistApi};
use quickgist_core::links::share_url;
use quickgist_core::models::gist::{CreateGistParams, FileUpload, Gist};
use quickgist_core::validation::{Limits, ValidationError, sanitize, validate};
use quickgist_query::Queries;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Submitting,
    Success,
    Failed,
}

/// Field values of the create form as the user entered them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GistForm {
    pub title: String,
    pub description: String,
    pub content: String,
    pub file: Option<FileUpload>,
    pub is_draft: bool,
    /// Publish without attribution even when signed in.
    pub post_anonymously: bool,
}

impl GistForm {
    /// Clear every field except the anonymity toggle.
    pub fn reset(&mut self) {
        *self = GistForm {
            post_anonymously: self.post_anonymously,
            ..GistForm::default()
        };
    }
}

/// A gist that was created, with its share link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub gist: Gist,
    pub share_url: String,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to create gist: {0}")]
    Api(#[from] ClientError),

    #[error("a submission is already in progress")]
    InFlight,
}

/// Sanitize and validate the form, then decide ownership.
///
/// Title and description lose any HTML-like tags; content is kept verbatim.
/// The gist is attributed to the signed-in user unless the form asks to
/// post anonymously.
pub fn build_params(
    form: &GistForm,
    identity: &Identity,
    limits: &Limits,
) -> Result<CreateGistParams, ValidationError> {
    let title = sanitize(form.title.trim());
    let description = sanitize(form.description.trim());

    validate(
        &title,
        &description,
        &form.content,
        form.file.as_ref(),
        limits,
    )?;

    let user_id = if form.post_anonymously {
        None
    } else {
        identity.user_id().map(str::to_string)
    };

    Ok(CreateGistParams {
        title,
        description,
        content: form.content.clone(),
        is_draft: form.is_draft,
        user_id,
        file: form.file.clone(),
    })
}

struct Inner {
    state: SubmissionState,
    form: GistForm,
}

pub struct SubmissionFlow {
    frontend_origin: String,
    limits: Limits,
    inner: Mutex<Inner>,
}

impl SubmissionFlow {
    pub fn new(frontend_origin: impl Into<String>, limits: Limits) -> Self {
        Self {
            frontend_origin: frontend_origin.into(),
            limits,
            inner: Mutex::new(Inner {
                state: SubmissionState::Idle,
                form: GistForm::default(),
            }),
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.lock().state
    }

    pub fn form(&self) -> GistForm {
        self.lock().form.clone()
    }

    pub fn set_form(&self, form: GistForm) {
        self.lock().form = form;
    }

    pub fn update_form(&self, edit: impl FnOnce(&mut GistForm)) {
        edit(&mut self.lock().form);
    }

    /// Validate the current form and create the gist.
    ///
    /// The create mutation runs at most once per call. On success the form
    /// is reset (keeping the anonymity toggle); on failure it is kept so the
    /// user can retry.
    pub async fn submit<A: GistApi>(
        &self,
        queries: &Queries<A>,
        identity: &Identity,
    ) -> Result<Submission, SubmitError> {
        let params = {
            let mut inner = self.lock();
            if inner.state == SubmissionState::Submitting {
                return Err(SubmitError::InFlight);
            }
            inner.state = SubmissionState::Validating;

            match build_params(&inner.form, identity, &self.limits) {
                Ok(params) => {
                    inner.state = SubmissionState::Submitting;
                    params
                }
                Err(e) => {
                    tracing::debug!(error = %e, "gist form rejected");
                    inner.state = SubmissionState::Failed;
                    return Err(e.into());
                }
            }
        };

        let guard = InFlightGuard { flow: self };
        let result = queries.create_gist(&params).await;
        std::mem::forget(guard);

        let mut inner = self.lock();
        match result {
            Ok(gist) => {
                inner.state = SubmissionState::Success;
                inner.form.reset();
                let share_url = share_url(&self.frontend_origin, &gist.snippet_id);
                tracing::info!(snippet_id = %gist.snippet_id, %share_url, "gist submitted");
                Ok(Submission { gist, share_url })
            }
            Err(e) => {
                inner.state = SubmissionState::Failed;
                Err(e.into())
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// Returns the flow to `Idle` if a submission future is dropped mid-request.
struct InFlightGuard<'a> {
    flow: &'a SubmissionFlow,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.flow.lock();
        if inner.state == SubmissionState::Submitting {
            inner.state = SubmissionState::Idle;
        }
    }
}

use crate::api::{ApiError, ApiErrorKind, IdentityService, RecordStore};
use crate::models::NewBookmark;
use crate::validation::{validate_bookmark, FormField, ValidationError};
use thiserror::Error;

pub(crate) const SUCCESS_DISMISS_MS: u64 = 3_000;
pub(crate) const INSERT_FAILED_MESSAGE: &str = "Failed to add bookmark. Please try again.";

#[derive(Clone, Debug, Error)]
pub(crate) enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Remote(#[from] ApiError),
}

impl SubmitError {
    /// Message shown in the form. Remote details go to the console, not the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Remote(_) => INSERT_FAILED_MESSAGE.to_string(),
        }
    }

    pub fn field(&self) -> Option<FormField> {
        match self {
            Self::Validation(e) => Some(e.field()),
            Self::Remote(_) => None,
        }
    }
}

/// Validates, looks up the acting user and inserts the bookmark under that user.
/// Nothing touches the network when validation fails.
pub(crate) async fn submit_bookmark<I, R>(
    identity: &I,
    store: &R,
    title: &str,
    url: &str,
) -> Result<NewBookmark, SubmitError>
where
    I: IdentityService,
    R: RecordStore,
{
    let draft = validate_bookmark(title, url)?;

    let user = identity.current_user().await?.ok_or_else(|| ApiError {
        kind: ApiErrorKind::Unauthorized,
        message: "No active session while adding a bookmark".to_string(),
    })?;

    let record = NewBookmark {
        title: draft.title,
        url: draft.url,
        user_id: user.id,
    };
    store.insert_bookmark(&record).await?;
    Ok(record)
}

/// UI state of one form instance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct FormModel {
    pub title: String,
    pub url: String,
    pub in_flight: bool,
    pub error: Option<String>,
    pub error_field: Option<FormField>,
    pub success_visible: bool,
    success_seq: u64,
}

impl FormModel {
    /// Single-flight guard. `false` means a submission is already running.
    pub fn begin_submit(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        self.error = None;
        self.error_field = None;
        true
    }

    /// Clears both fields and shows the success indicator. Returns the token
    /// the dismiss timer must present.
    pub fn submit_succeeded(&mut self) -> u64 {
        self.in_flight = false;
        self.title.clear();
        self.url.clear();
        self.success_seq = self.success_seq.saturating_add(1);
        self.success_visible = true;
        self.success_seq
    }

    pub fn submit_failed(&mut self, error: &SubmitError) {
        self.in_flight = false;
        self.error = Some(error.user_message());
        self.error_field = error.field();
    }

    /// Hides the indicator only if no newer success replaced it.
    pub fn dismiss_success(&mut self, token: u64) {
        if token == self.success_seq {
            self.success_visible = false;
        }
    }
}

use std::time::Duration;

use thiserror::Error;

use crate::core::{
    importer::{ImportError, RepositoryImporter},
    storage::StorageArea,
    store::PersistedValue,
    validation::{RepoUrl, ValidationError},
};

/// Where one import attempt currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    /// The input has been edited and is being validated as it changes.
    Validating,
    Submitting,
    Succeeded,
    Failed(ImportError),
}

/// Why a submit request was refused before anything was imported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("An import is already in progress.")]
    InFlight,
    #[error("This repository has already been imported.")]
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Rejected(#[from] SubmitRejected),
    #[error(transparent)]
    Import(#[from] ImportError),
}

/// The import form: the user's input, its validation result and the state
/// of the submission it drives.
#[derive(Debug, Clone)]
pub struct ImportForm {
    input: String,
    validation: Result<RepoUrl, ValidationError>,
    state: SubmissionState,
}

impl ImportForm {
    /// A fresh form in the `Idle` state, pre-filled with `initial`.
    pub fn new(initial: impl Into<String>) -> Self {
        let input = initial.into();
        let validation = RepoUrl::parse(&input);
        Self {
            input,
            validation,
            state: SubmissionState::Idle,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn validation_error(&self) -> Option<ValidationError> {
        self.validation.as_ref().err().copied()
    }

    pub fn is_valid(&self) -> bool {
        self.validation.is_ok()
    }

    pub fn is_submitting(&self) -> bool {
        self.state == SubmissionState::Submitting
    }

    /// The input can be changed unless an import is running or done.
    pub fn is_editable(&self) -> bool {
        !matches!(
            self.state,
            SubmissionState::Submitting | SubmissionState::Succeeded
        )
    }

    pub fn can_submit(&self) -> bool {
        self.is_valid() && self.is_editable()
    }

    /// The error of the last failed attempt, while it is still shown.
    pub fn import_error(&self) -> Option<&ImportError> {
        match &self.state {
            SubmissionState::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        if !self.is_editable() {
            tracing::debug!(state = ?self.state, "Ignoring input while the form is locked");
            return;
        }
        self.input = value.into();
        self.validation = RepoUrl::parse(&self.input);
        self.state = SubmissionState::Validating;
    }

    /// Move to `Submitting` and hand back the URL to import.
    pub fn begin_submit(&mut self) -> Result<RepoUrl, SubmitRejected> {
        match self.state {
            SubmissionState::Submitting => return Err(SubmitRejected::InFlight),
            SubmissionState::Succeeded => return Err(SubmitRejected::Finished),
            _ => {}
        }
        let url = self.validation.clone()?;
        self.state = SubmissionState::Submitting;
        Ok(url)
    }

    /// Record the outcome of the import started by [`ImportForm::begin_submit`].
    pub fn complete(&mut self, outcome: Result<(), ImportError>) {
        if !self.is_submitting() {
            tracing::warn!(state = ?self.state, "Import finished while no submission was running");
            return;
        }
        self.state = match outcome {
            Ok(()) => SubmissionState::Succeeded,
            Err(error) => SubmissionState::Failed(error),
        };
    }

    /// Hide the failure banner.
    pub fn dismiss_error(&mut self) {
        if matches!(self.state, SubmissionState::Failed(_)) {
            self.state = SubmissionState::Idle;
        }
    }

    /// Run a whole attempt against `importer`.
    pub async fn submit<I: RepositoryImporter>(
        &mut self,
        importer: &I,
    ) -> Result<RepoUrl, SubmitError> {
        let url = self.begin_submit()?;
        let outcome = importer.import_repository(&url).await;
        self.complete(outcome.clone());
        outcome?;
        Ok(url)
    }
}

/// What happens after a successful import: give the user a moment to see
/// the confirmation, then remember the project. Returns the stored URL.
pub async fn finish_import<S: StorageArea>(
    store: &PersistedValue<S>,
    url: RepoUrl,
    confirmation_delay: Duration,
) -> String {
    tokio::time::sleep(confirmation_delay).await;
    let url = url.into_string();
    store.write(Some(url.clone())).await;
    url
}

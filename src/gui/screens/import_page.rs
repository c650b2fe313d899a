use iced::{
    Element, Length, Task,
    widget::{button, column, container, text, text_input},
};

use crate::{
    core::{
        ImportError, ImportForm, RepoUrl, RepositoryImporter, SubmissionState, finish_import,
    },
    gui::{
        AppState,
        screens::{Screen, ScreenMessage},
        widgets::{BannerKind, banner},
    },
};

const INPUT_PLACEHOLDER: &str = "e.g. https://github.com/your-user/your-repository";

#[derive(Debug, Clone)]
pub struct ImportPageScreen {
    form: ImportForm,
}

#[derive(Debug, Clone)]
pub enum ImportPageMessage {
    InputChanged(String),
    Submit,
    Imported(RepoUrl, Result<(), ImportError>),
    DismissError,
}

#[derive(Debug, Clone)]
pub enum ParentMessage {
    /// The import succeeded and the URL has been stored.
    ProjectImported(String),
}

impl ImportPageScreen {
    pub fn new(default_repo_url: &str) -> Self {
        Self {
            form: ImportForm::new(default_repo_url),
        }
    }

    pub fn form(&self) -> &ImportForm {
        &self.form
    }

    fn feedback(&self) -> Option<Element<'_, ScreenMessage<Self>>> {
        match self.form.state() {
            SubmissionState::Idle | SubmissionState::Validating => None,
            SubmissionState::Submitting => Some(banner(
                BannerKind::Info,
                "Please wait, importing the repository...",
                None,
            )),
            SubmissionState::Succeeded => Some(banner(
                BannerKind::Success,
                "Repository imported successfully! Redirecting...",
                None,
            )),
            SubmissionState::Failed(error) => Some(banner(
                BannerKind::Error,
                error.to_string(),
                Some(ScreenMessage::ScreenMessage(ImportPageMessage::DismissError)),
            )),
        }
    }
}

impl Screen for ImportPageScreen {
    type Message = ImportPageMessage;
    type ParentMessage = ParentMessage;

    fn view(&self) -> Element<'_, ScreenMessage<Self>> {
        let form = &self.form;

        let mut input = text_input(INPUT_PLACEHOLDER, form.input()).padding(12).size(16);
        if form.is_editable() {
            input = input.on_input(|value| {
                ScreenMessage::ScreenMessage(ImportPageMessage::InputChanged(value))
            });
        }
        if form.can_submit() {
            input = input.on_submit(ScreenMessage::ScreenMessage(ImportPageMessage::Submit));
        }

        let label = if form.is_submitting() {
            "Importing..."
        } else {
            "Import repository"
        };
        let submit = button(container(text(label)).center_x(Length::Fill))
            .width(Length::Fill)
            .padding(12)
            .on_press_maybe(
                form.can_submit()
                    .then_some(ScreenMessage::ScreenMessage(ImportPageMessage::Submit)),
            );

        let mut content = column![
            text("New project").size(28),
            text("Import a GitHub repository to start your new project."),
            text("GitHub repository URL").size(14),
            input,
        ]
        .spacing(12)
        .padding(24)
        .max_width(600);

        if let Some(error) = form.validation_error() {
            content = content.push(text(error.to_string()).size(14).style(text::danger));
        }
        content = content.push(submit);
        if let Some(feedback) = self.feedback() {
            content = content.push(feedback);
        }

        container(content)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn update<I: RepositoryImporter>(
        &mut self,
        message: Self::Message,
        state: &mut AppState<I>,
    ) -> Task<ScreenMessage<Self>> {
        match message {
            ImportPageMessage::InputChanged(value) => {
                self.form.set_input(value);
                Task::none()
            }
            ImportPageMessage::Submit => match self.form.begin_submit() {
                Ok(url) => {
                    tracing::info!(%url, "Importing repository");
                    let importer = state.importer.clone();
                    Task::perform(
                        async move {
                            let outcome = importer.import_repository(&url).await;
                            (url, outcome)
                        },
                        |(url, outcome)| {
                            ScreenMessage::ScreenMessage(ImportPageMessage::Imported(url, outcome))
                        },
                    )
                }
                Err(rejected) => {
                    tracing::debug!(%rejected, "Submit refused");
                    Task::none()
                }
            },
            ImportPageMessage::Imported(url, outcome) => {
                if let Err(error) = &outcome {
                    tracing::warn!(%url, %error, "Import failed");
                }
                self.form.complete(outcome);
                if self.form.state() != &SubmissionState::Succeeded {
                    return Task::none();
                }
                let store = state.store.clone();
                let delay = state.confirmation_delay;
                Task::perform(
                    async move { finish_import(&store, url, delay).await },
                    |url| ScreenMessage::ParentMessage(ParentMessage::ProjectImported(url)),
                )
            }
            ImportPageMessage::DismissError => {
                self.form.dismiss_error();
                Task::none()
            }
        }
    }
}

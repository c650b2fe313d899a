use iced::{
    Alignment::Center,
    Element, Length, Task,
    widget::{button, column, container, row, text},
};

use crate::{
    core::{ConnectionStatus, ProjectOverview, RepositoryImporter, project::open_repository},
    gui::{
        AppState,
        screens::{Screen, ScreenMessage},
        widgets::{BadgeKind, badge, detail_box},
    },
};

#[derive(Debug, Clone)]
pub struct ProjectPageScreen {
    overview: ProjectOverview,
}

#[derive(Debug, Clone)]
pub enum ProjectPageMessage {
    OpenRepository,
    ClearProject,
    BackToImport,
}

#[derive(Debug, Clone)]
pub enum ParentMessage {
    Cleared,
    BackToImport,
}

impl ProjectPageScreen {
    pub fn new(overview: ProjectOverview) -> Self {
        Self { overview }
    }

    pub fn overview(&self) -> &ProjectOverview {
        &self.overview
    }
}

impl Screen for ProjectPageScreen {
    type Message = ProjectPageMessage;
    type ParentMessage = ParentMessage;

    fn view(&self) -> Element<'_, ScreenMessage<Self>> {
        let overview = &self.overview;

        let action = if overview.can_clear() {
            button(text("Import another"))
                .style(button::secondary)
                .on_press(ScreenMessage::ScreenMessage(ProjectPageMessage::ClearProject))
        } else {
            button(text("< Back to import"))
                .style(button::text)
                .on_press(ScreenMessage::ScreenMessage(ProjectPageMessage::BackToImport))
        };

        let header = row![
            column![
                text(overview.name.as_str()).size(30),
                text("Overview of your imported project."),
            ]
            .spacing(4)
            .width(Length::Fill),
            action,
        ]
        .align_y(Center);

        let status: Element<'_, ScreenMessage<Self>> = match overview.status {
            ConnectionStatus::Connected => row![
                badge(BadgeKind::Neutral, "Connected"),
                button(text("Open on GitHub"))
                    .style(button::text)
                    .on_press(ScreenMessage::ScreenMessage(ProjectPageMessage::OpenRepository)),
            ]
            .spacing(8)
            .align_y(Center)
            .into(),
            ConnectionStatus::NotFound => badge(BadgeKind::Danger, "Not found"),
        };

        let mut details = column![
            text("Details").size(18),
            detail_box(
                row![text("GitHub repository").width(Length::Fill), status].align_y(Center)
            ),
        ]
        .spacing(12);
        if let Some(repo_url) = &overview.repo_url {
            details = details.push(detail_box(text(repo_url.as_str()).size(14)));
        }

        let content = column![header, details]
            .spacing(24)
            .padding(24)
            .max_width(760);

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
            ProjectPageMessage::OpenRepository => {
                if let Some(url) = &self.overview.repo_url {
                    if let Err(error) = open_repository(url) {
                        tracing::warn!(%url, %error, "Failed to open repository in browser");
                    }
                }
                Task::none()
            }
            ProjectPageMessage::ClearProject => {
                if !self.overview.can_clear() {
                    return Task::none();
                }
                let store = state.store.clone();
                Task::perform(async move { store.clear().await }, |()| {
                    ScreenMessage::ParentMessage(ParentMessage::Cleared)
                })
            }
            ProjectPageMessage::BackToImport => {
                Task::done(ScreenMessage::ParentMessage(ParentMessage::BackToImport))
            }
        }
    }
}

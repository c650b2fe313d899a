pub mod import_page;
pub mod project_page;

use iced::{Element, Task};

use crate::{
    core::{ProjectOverview, RepositoryImporter, Route},
    gui::{AppState, Message},
};

#[derive(Debug, Clone)]
pub enum ScreenMessage<S: Screen> {
    ScreenMessage(S::Message),
    ParentMessage(S::ParentMessage),
}

pub trait Screen: Sized {
    type Message: std::fmt::Debug;
    type ParentMessage: std::fmt::Debug;
    fn view(&self) -> Element<'_, ScreenMessage<Self>>;
    fn update<I: RepositoryImporter>(
        &mut self,
        message: Self::Message,
        state: &mut AppState<I>,
    ) -> Task<ScreenMessage<Self>>;
}

#[derive(Debug, Clone)]
pub enum ScreenData {
    ImportPage(import_page::ImportPageScreen),
    ProjectPage(project_page::ProjectPageScreen),
}

impl ScreenData {
    /// The screen a route shows given what is currently stored.
    pub fn for_route<I>(state: &AppState<I>) -> Self {
        match &state.route {
            Route::Home => match state.store.read() {
                Some(url) => ScreenData::ProjectPage(project_page::ProjectPageScreen::new(
                    ProjectOverview::from_stored(&url),
                )),
                None => ScreenData::ImportPage(import_page::ImportPageScreen::new(
                    &state.default_repo_url,
                )),
            },
            Route::Project { repo_url } => ScreenData::ProjectPage(
                project_page::ProjectPageScreen::new(ProjectOverview::from_query(repo_url.as_deref())),
            ),
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            ScreenData::ImportPage(_) => None,
            ScreenData::ProjectPage(page) => Some(&page.overview().name),
        }
    }

    /// Follow a change of the stored project on the home route. The project
    /// route ignores the store.
    fn sync_with_store<I>(&mut self, state: &AppState<I>, stored: Option<String>) {
        if state.route != Route::Home {
            return;
        }
        let next = match (&*self, stored) {
            (ScreenData::ImportPage(_), None) => None,
            (ScreenData::ProjectPage(page), Some(url))
                if page.overview().repo_url.as_deref() == Some(url.as_str()) =>
            {
                None
            }
            (_, Some(url)) => Some(ScreenData::ProjectPage(project_page::ProjectPageScreen::new(
                ProjectOverview::from_stored(&url),
            ))),
            (_, None) => Some(ScreenData::ImportPage(import_page::ImportPageScreen::new(
                &state.default_repo_url,
            ))),
        };
        if let Some(next) = next {
            *self = next;
        }
    }
}

impl Screen for ScreenData {
    type Message = Message;
    type ParentMessage = std::convert::Infallible;
    fn view(&self) -> Element<'_, ScreenMessage<Self>> {
        match self {
            ScreenData::ImportPage(screen) => screen.view().map(Message::ImportPage),
            ScreenData::ProjectPage(screen) => screen.view().map(Message::ProjectPage),
        }
        .map(ScreenMessage::ScreenMessage)
    }

    fn update<I: RepositoryImporter>(
        &mut self,
        message: Self::Message,
        state: &mut AppState<I>,
    ) -> Task<ScreenMessage<Self>> {
        match (self, message) {
            (x, Message::ChangeScreen(screen)) => {
                *x = screen;
                Task::none()
            }
            (x, Message::StoredUrlChanged(stored)) => {
                x.sync_with_store(state, stored);
                Task::none()
            }
            (ScreenData::ImportPage(page), Message::ImportPage(msg)) => match msg {
                ScreenMessage::ScreenMessage(msg) => page
                    .update(msg, state)
                    .map(Message::ImportPage)
                    .map(ScreenMessage::ScreenMessage),
                ScreenMessage::ParentMessage(parent_msg) => match parent_msg {
                    import_page::ParentMessage::ProjectImported(url) => {
                        tracing::info!(%url, "Switching to imported project");
                        Task::done(ScreenMessage::ScreenMessage(Message::ChangeScreen(
                            ScreenData::ProjectPage(project_page::ProjectPageScreen::new(
                                ProjectOverview::from_stored(&url),
                            )),
                        )))
                    }
                },
            },
            (
                ScreenData::ProjectPage(page),
                Message::ProjectPage(ScreenMessage::ScreenMessage(msg)),
            ) => page
                .update(msg, state)
                .map(Message::ProjectPage)
                .map(ScreenMessage::ScreenMessage),
            (x, Message::ProjectPage(ScreenMessage::ParentMessage(parent_msg))) => {
                match parent_msg {
                    project_page::ParentMessage::Cleared => {
                        tracing::info!("Project cleared, back to import");
                    }
                    project_page::ParentMessage::BackToImport => {
                        state.route = Route::Home;
                    }
                }
                *x = ScreenData::for_route(state);
                Task::none()
            }
            _ => Task::none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::*;
    use crate::core::{
        ImportError, PROJECT_URL_STORAGE_KEY, PersistedValue, RepoUrl, SimulatedImporter,
        SqliteStorage, UNNAMED_PROJECT,
    };

    const DEFAULT_URL: &str = "https://github.com/shadcn-ui/ui";
    const STORED_URL: &str = "https://github.com/foo/bar";

    async fn app_state(route: Route) -> AppState {
        let storage = SqliteStorage::in_memory().await.unwrap();
        AppState {
            store: PersistedValue::load(storage, PROJECT_URL_STORAGE_KEY).await,
            importer: Arc::new(SimulatedImporter::with_seed(Duration::ZERO, 1.0, 1)),
            route,
            default_repo_url: DEFAULT_URL.to_string(),
            confirmation_delay: Duration::ZERO,
        }
    }

    fn project_name(screen: &ScreenData) -> Option<&str> {
        match screen {
            ScreenData::ProjectPage(page) => Some(&page.overview().name),
            ScreenData::ImportPage(_) => None,
        }
    }

    fn import_input(screen: &ScreenData) -> Option<&str> {
        match screen {
            ScreenData::ImportPage(page) => Some(page.form().input()),
            ScreenData::ProjectPage(_) => None,
        }
    }

    #[tokio::test]
    async fn home_without_project_shows_import_form() {
        let state = app_state(Route::Home).await;
        let screen = ScreenData::for_route(&state);
        assert_eq!(import_input(&screen), Some(DEFAULT_URL));
        assert_eq!(screen.title(), None);
    }

    #[tokio::test]
    async fn home_shows_stored_project() {
        let state = app_state(Route::Home).await;
        state.store.write(Some(STORED_URL.to_string())).await;

        let screen = ScreenData::for_route(&state);
        assert_eq!(project_name(&screen), Some("bar"));
        assert_eq!(screen.title(), Some("bar"));
    }

    #[tokio::test]
    async fn home_follows_stored_project_changes() {
        let mut state = app_state(Route::Home).await;
        let mut screen = ScreenData::for_route(&state);

        let _ = screen.update(Message::StoredUrlChanged(Some(STORED_URL.to_string())), &mut state);
        assert_eq!(project_name(&screen), Some("bar"));

        let _ = screen.update(
            Message::StoredUrlChanged(Some("https://github.com/acme/widgets.git".to_string())),
            &mut state,
        );
        assert_eq!(project_name(&screen), Some("widgets"));

        let _ = screen.update(Message::StoredUrlChanged(None), &mut state);
        assert_eq!(import_input(&screen), Some(DEFAULT_URL));
    }

    #[tokio::test]
    async fn project_route_ignores_the_store() {
        let mut state = app_state(Route::Project { repo_url: None }).await;
        state.store.write(Some(STORED_URL.to_string())).await;

        let mut screen = ScreenData::for_route(&state);
        assert_eq!(project_name(&screen), Some(UNNAMED_PROJECT));

        let _ = screen.update(Message::StoredUrlChanged(None), &mut state);
        let _ = screen.update(
            Message::StoredUrlChanged(Some("https://github.com/acme/widgets".to_string())),
            &mut state,
        );
        assert_eq!(project_name(&screen), Some(UNNAMED_PROJECT));
    }

    #[tokio::test]
    async fn project_route_shows_query_url() {
        let state = app_state(Route::project("https://github.com/acme/widgets.git")).await;
        let screen = ScreenData::for_route(&state);
        assert_eq!(project_name(&screen), Some("widgets"));
    }

    struct OfflineImporter;

    impl RepositoryImporter for OfflineImporter {
        async fn import_repository(&self, _url: &RepoUrl) -> Result<(), ImportError> {
            Err(ImportError::Unavailable("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn screens_run_with_any_importer() {
        let base = app_state(Route::Home).await;
        let mut state = AppState {
            store: base.store,
            importer: Arc::new(OfflineImporter),
            route: base.route,
            default_repo_url: base.default_repo_url,
            confirmation_delay: base.confirmation_delay,
        };
        let mut screen = ScreenData::for_route(&state);

        let _ = screen.update(Message::StoredUrlChanged(Some(STORED_URL.to_string())), &mut state);
        assert_eq!(project_name(&screen), Some("bar"));
    }

    #[tokio::test]
    async fn back_to_import_returns_home() {
        let mut state = app_state(Route::project("https://github.com/acme/widgets")).await;
        state.store.write(Some(STORED_URL.to_string())).await;
        let mut screen = ScreenData::for_route(&state);

        let _ = screen.update(
            Message::ProjectPage(ScreenMessage::ParentMessage(
                project_page::ParentMessage::BackToImport,
            )),
            &mut state,
        );

        assert_eq!(state.route, Route::Home);
        assert_eq!(project_name(&screen), Some("bar"));
    }
}

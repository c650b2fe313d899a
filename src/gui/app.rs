use iced::{Element, Task, futures::stream};

use super::{
    AppState, Message,
    screens::{Screen, ScreenData, ScreenMessage},
    widgets::layout,
};
use crate::core::{RepositoryImporter, SqliteStorage, store::Subscription};

const APP_TITLE: &str = "Project Importer";

pub struct ImporterApp<I> {
    state: AppState<I>,
    screen: ScreenData,
}

/// Turn a store subscription into a stream of stored values.
fn stored_url_changes(
    subscription: Subscription<SqliteStorage>,
) -> impl stream::Stream<Item = Option<String>> {
    stream::unfold(subscription, |mut subscription| async move {
        subscription
            .changed()
            .await
            .map(|value| (value, subscription))
    })
}

fn unwrap_screen_message(message: ScreenMessage<ScreenData>) -> Message {
    match message {
        ScreenMessage::ScreenMessage(message) => message,
        ScreenMessage::ParentMessage(never) => match never {},
    }
}

impl<I: RepositoryImporter> ImporterApp<I> {
    pub fn new(state: AppState<I>) -> (Self, Task<Message>) {
        tracing::info!(route = %state.route.to_location(), "Starting importer");
        let screen = ScreenData::for_route(&state);
        let changes = stored_url_changes(state.store.subscribe());
        (
            Self { state, screen },
            Task::run(changes, Message::StoredUrlChanged),
        )
    }

    pub fn title(&self) -> String {
        match self.screen.title() {
            Some(project) => format!("{project} - {APP_TITLE}"),
            None => APP_TITLE.to_string(),
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        self.screen
            .update(message, &mut self.state)
            .map(unwrap_screen_message)
    }

    pub fn view(&self) -> Element<'_, Message> {
        layout(self.screen.view().map(unwrap_screen_message))
    }
}

/// Run the GUI until the window is closed.
pub fn run<I: RepositoryImporter>(state: AppState<I>) -> iced::Result {
    iced::application(
        move || ImporterApp::new(state.clone()),
        ImporterApp::<I>::update,
        ImporterApp::<I>::view,
    )
    .title(ImporterApp::<I>::title)
    .run()
}

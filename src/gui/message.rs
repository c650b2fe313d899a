use crate::gui::screens::{
    ScreenData, ScreenMessage, import_page::ImportPageScreen, project_page::ProjectPageScreen,
};

#[derive(Debug, Clone)]
pub enum Message {
    ImportPage(ScreenMessage<ImportPageScreen>),
    ProjectPage(ScreenMessage<ProjectPageScreen>),
    ChangeScreen(ScreenData),
    /// The remembered project changed, here or in another window.
    StoredUrlChanged(Option<String>),
}

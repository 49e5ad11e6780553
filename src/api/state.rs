use super::*;

#[derive(Resource)]
pub(super) struct ApiChannels {
    pub(super) receiver: Receiver<ApiCommand>,
}

#[derive(Clone)]
pub(super) struct AppState {
    pub(super) sender: Sender<ApiCommand>,
}

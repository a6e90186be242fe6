use crate::directory::UserDirectory;
use crate::draw::DrawService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Sole owner of the draw record; handlers never touch the file directly.
    pub draws: DrawService,
    /// Default participant set when a draw request does not name one.
    pub users: UserDirectory,
}

// Gift-exchange draw: exclusion parsing, constrained assignment search, and the
// persisted draw record. The search is CPU-bound and runs inside
// tokio::task::spawn_blocking when called from handlers.

pub mod engine;
pub mod errors;
pub mod exclusions;
pub mod handlers;
pub mod service;
pub mod store;

pub use engine::AssignmentEngine;
pub use errors::DrawError;
pub use service::DrawService;
pub use store::DrawStore;

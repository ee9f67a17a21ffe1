pub mod auth;
pub mod error;
pub mod extract;
pub mod flash;
pub mod middleware;
pub mod posts;
pub mod routes;
pub mod votes;

pub use error::ApiError;
pub use routes::router;

use std::sync::Arc;

use squawk_db::{Database, TallyPolicy};
use squawk_gen::TextGenerator;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub generator: Arc<dyn TextGenerator>,
    pub jwt_secret: String,
    pub session_days: i64,
    pub tally_policy: TallyPolicy,
}

/// Run a database closure on the blocking pool.
pub(crate) async fn blocking<F, T>(state: &AppState, f: F) -> error::Result<T>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    Ok(tokio::task::spawn_blocking(move || f(&state.db)).await??)
}

//! Shared router state.

use voltreon::app::App;
use voltreon::dependency::DependencyService;
use voltreon::store::EntityStore;
use voltreon::summary::SummaryService;

/// State handed to every handler. Cloning shares the underlying store.
#[derive(Clone, Debug)]
pub struct AppState {
    app: App,
}

impl AppState {
    /// Wrap an opened workspace.
    pub fn new(app: App) -> Self {
        Self { app }
    }

    /// The workspace.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// The entity store.
    pub fn store(&self) -> &dyn EntityStore {
        self.app.store()
    }

    /// Dependency operations.
    pub fn dependencies(&self) -> &DependencyService {
        self.app.dependencies()
    }

    /// Summarization.
    pub fn summaries(&self) -> &SummaryService {
        self.app.summaries()
    }
}

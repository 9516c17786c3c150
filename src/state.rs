use crate::config::Config;
use crate::dashboard::Dashboard;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dashboard: Arc<Dashboard>,
}

impl AppState {
    pub fn new(config: Config, dashboard: Dashboard) -> Self {
        Self {
            config: Arc::new(config),
            dashboard: Arc::new(dashboard),
        }
    }
}

use std::sync::Arc;

use crate::config::settings::AppConfig;
use crate::infrastructure::storage::registry::JobRegistry;
use crate::pipeline::runner::{CommandRunner, ProcessRunner};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registry: JobRegistry,
    pub runner: Arc<dyn CommandRunner>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self::with_runner(config, Arc::new(ProcessRunner))
    }

    pub fn with_runner(config: AppConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let registry = JobRegistry::new(&config);
        Self {
            config: Arc::new(config),
            registry,
            runner,
        }
    }
}

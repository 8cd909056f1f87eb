use std::sync::Arc;

use crate::config::Config;
use crate::core::data::{AttributeKeys, Database};
use crate::core::suggest::SuggestionEngine;
use crate::core::usage::UsageLocator;
use crate::error::Result;

pub struct SimpleServices {
    config: Arc<Config>,
}

impl SimpleServices {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> Arc<Config> {
        self.config.clone()
    }

    pub async fn create_database(&self) -> Result<Database> {
        Database::new(&self.config.database_path, AttributeKeys::from(self.config.as_ref())).await
    }

    pub fn create_locator(&self) -> Result<UsageLocator> {
        UsageLocator::from_config(&self.config)
    }

    pub fn create_suggestion_engine(&self) -> Result<SuggestionEngine> {
        Ok(SuggestionEngine::new(self.create_locator()?))
    }
}

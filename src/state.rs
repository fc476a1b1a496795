use std::sync::Arc;

use crate::clients::{ClientError, ClioClient, GhlClient, Transport};
use crate::config::{AppConfig, Environment};
use crate::database::Store;
use crate::services::{IntakeService, IntegrationService};

/// Shared handler state: one store, one HTTP transport, the services built on them
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub integration: IntegrationService,
    pub intake: IntakeService,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Result<Self, ClientError> {
        let transport = Transport::new(store.clone(), &config.http)?;
        let ghl = GhlClient::new(transport.clone(), config.ghl.clone());
        let clio = ClioClient::new(transport.clone(), config.clio.clone());
        let integration = IntegrationService::new(store.clone(), ghl, clio.clone(), config.http.sync_concurrency)
            .with_page_size(config.http.bulk_page_size);
        let intake = IntakeService::new(clio, transport.audit().clone());

        Ok(Self {
            config: Arc::new(config),
            store,
            integration,
            intake,
        })
    }

    pub fn ghl(&self) -> &GhlClient {
        self.integration.ghl()
    }

    pub fn clio(&self) -> &ClioClient {
        self.integration.clio()
    }

    pub fn is_development(&self) -> bool {
        matches!(self.config.environment, Environment::Development)
    }
}

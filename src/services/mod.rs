pub mod intake;
pub mod integration_service;
pub mod mapping;

pub use intake::{IntakeError, IntakeOutcome, IntakeService};
pub use integration_service::{ContactSyncResult, IntegrationService, SyncDirection, SyncError, SyncOutcome};
pub use mapping::{clio_to_ghl_contact, ghl_to_clio_contact, MappingError};

//! Application state shared across handlers.

use std::sync::Arc;

use alert_service::{AlertService, CallLogService};
use database::Database;
use merchant_data::{MerchantDirectory, PaymentLedger};
use slack_notifier::Notifier;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub alerts: AlertService,
    pub call_logs: CallLogService,
    /// Slack forwarder.
    pub notifier: Notifier,
    /// Merchant directory used to enrich alert lookups, when configured.
    pub directory: Option<Arc<dyn MerchantDirectory>>,
    /// Payment ledger used for plan names, when configured.
    pub ledger: Option<Arc<dyn PaymentLedger>>,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: Database, notifier: Notifier) -> Self {
        Self {
            alerts: AlertService::new(db.clone()),
            call_logs: CallLogService::new(db),
            notifier,
            directory: None,
            ledger: None,
        }
    }

    /// Attach the auxiliary merchant sources.
    pub fn with_sources(
        mut self,
        directory: Option<Arc<dyn MerchantDirectory>>,
        ledger: Option<Arc<dyn PaymentLedger>>,
    ) -> Self {
        self.directory = directory;
        self.ledger = ledger;
        self
    }
}

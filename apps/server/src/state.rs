use std::sync::Arc;

use crate::{config::ReportsConfig, db::OrderRepository, reports::ReportContext};

#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<dyn OrderRepository>,
    pub reports: Arc<ReportsConfig>,
}

impl AppState {
    pub fn new(orders: Arc<dyn OrderRepository>, reports: ReportsConfig) -> Self {
        Self {
            orders,
            reports: Arc::new(reports),
        }
    }

    /// Export context for a report generated right now.
    pub fn report_context(&self) -> ReportContext {
        ReportContext::now(self.reports.timezone)
    }
}

use crate::app::report::QueryReport;
use crate::config::cli::LocalStorage;
use crate::config::settings::Settings;
use crate::core::etl::EtlEngine;
use crate::core::pipeline::EmployeePipeline;
use crate::core::query::query;
use crate::core::summary::DashboardSummary;
use crate::core::NormalizedTable;
use crate::utils::error::Result;

/// Optional presentation features, decided by whoever builds the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub dashboard: bool,
}

impl Capabilities {
    pub fn detect() -> Self {
        Self {
            dashboard: cfg!(feature = "dashboard"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Query,
    Dashboard,
}

/// Fetch, normalize, persist and render. Relative output paths resolve against `base_dir`.
pub async fn run(
    settings: Settings,
    view: View,
    capabilities: Capabilities,
    base_dir: &str,
) -> Result<String> {
    let storage = LocalStorage::new(base_dir);
    let pipeline = EmployeePipeline::new(storage, settings.clone())?;
    let outcome = EtlEngine::new(pipeline).run().await?;

    Ok(present(&outcome.table, &settings, view, capabilities))
}

pub fn present(
    table: &NormalizedTable,
    settings: &Settings,
    view: View,
    capabilities: Capabilities,
) -> String {
    match view {
        View::Dashboard if capabilities.dashboard => {
            DashboardSummary::build(table, &settings.selection()).to_string()
        }
        View::Dashboard => {
            tracing::warn!("Dashboard requested but not available in this build");
            "Dashboard is not available in this build (enable the `dashboard` feature)".to_string()
        }
        View::Query => {
            let result = query(table, &settings.query_request());
            tracing::debug!(
                "Query matched {} rows, showing {}",
                result.total_matches,
                result.returned()
            );
            QueryReport(&result).to_string()
        }
    }
}

//! ClassroomHub
//!
//! Loads configuration, connects to the record store and reports the
//! reachability of every table.

use anyhow::Context;
use tracing::{info, error};

use ClassroomHub::{config::Settings, utils::logging, ServiceFactory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate()?;

    // Initialize logging; the guard flushes file output on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}", ClassroomHub::info());

    let services = ServiceFactory::new(&settings)?;
    let health = services.health_check().await;

    for table in &health.tables {
        if table.reachable {
            info!(table = %table.table, "Table reachable");
        } else {
            error!(table = %table.table, error = ?table.error, "Table unreachable");
        }
    }

    if !health.is_healthy() {
        anyhow::bail!("record store health check failed: {}", health.get_issues().join("; "));
    }

    info!("All tables reachable");
    Ok(())
}

//! # sadhak-clinic - Clinic operations over the Sadhak document store
//!
//! This crate builds the practice-level views on top of
//! [`sadhak_persistence`]: the patient detail summary, the dashboard metrics,
//! the explicit cascading patient delete and the demo data set. It also owns
//! the command-line configuration shared by the `sadhak` tool.
//!
//! ## Modules
//!
//! - [`config`] - CLI/environment configuration and its mapping to a store
//!   configuration
//! - [`reports`] - Patient summary and dashboard aggregations
//! - [`patients`] - Multi-collection patient operations
//! - [`seed`] - Demo clinic data
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sadhak_clinic::{ClinicConfig, reports};
//! use sadhak_persistence::{DocumentAccess, StoreConnection};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClinicConfig::for_testing();
//! let access = DocumentAccess::new(StoreConnection::from_config(&config.to_store_config())?);
//!
//! let metrics = reports::dashboard(&access).await?;
//! println!("{} patients, {} low-stock items", metrics.total_patients, metrics.low_stock_items);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod patients;
pub mod reports;
pub mod seed;

pub use config::ClinicConfig;
pub use patients::{CascadeReport, delete_with_dependents};
pub use reports::{DashboardMetrics, PatientSummary, PaymentTotals, dashboard, patient_summary};
pub use seed::{SeededIds, seed_demo_data};

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence; otherwise both Sadhak crates log at `level`.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "sadhak_persistence={},sadhak_clinic={},sadhak={}",
            level, level, level
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

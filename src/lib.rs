pub mod config;
pub mod csv;
pub mod fetch; // Report client, bundle coordinator, cycle sequencing
pub mod metrics;
pub mod models;
pub mod normalize; // Raw backend records -> typed entities
pub mod reports;

use tracing_subscriber::EnvFilter;

/// Install the `tracing` subscriber. `RUST_LOG` overrides the default
/// filter. Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} v{} logging initialized", config::APP_NAME, config::APP_VERSION);
    }
}
